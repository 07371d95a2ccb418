//! Session gateway test client
//!
//! Spawns the gateway and speaks its JSON frames over tokio-tungstenite.

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{anyhow, bail, Result};
use chat_common::AppConfig;
use chat_gateway::{create_app, create_gateway_state, GatewayState};
use futures_util::{SinkExt, StreamExt};
use serde_json::{json, Value};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

/// How long a test waits for one frame
pub const FRAME_TIMEOUT: Duration = Duration::from_secs(5);

/// Running gateway bound to 127.0.0.1
pub struct TestGateway {
    pub addr: SocketAddr,
    pub state: GatewayState,
    _handle: JoinHandle<()>,
}

impl TestGateway {
    pub async fn start(config: AppConfig) -> Result<Self> {
        let state = create_gateway_state(config).await?;
        let app = create_app(state.clone());

        let listener = TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0))).await?;
        let addr = listener.local_addr()?;

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        Ok(Self {
            addr,
            state,
            _handle: handle,
        })
    }

    /// Connect and consume Hello
    pub async fn connect(&self) -> Result<GatewayClient> {
        let (socket, _) = connect_async(format!("ws://{}/gateway", self.addr)).await?;
        let mut client = GatewayClient { socket };

        let hello = client.next_frame().await?;
        if hello["op"] != 10 {
            bail!("expected Hello, got {hello}");
        }
        Ok(client)
    }

    /// Connect, identify and wait for READY
    pub async fn connect_as(&self, token: &str) -> Result<GatewayClient> {
        let mut client = self.connect().await?;
        client.identify(token).await?;
        client.wait_for("READY").await?;
        Ok(client)
    }
}

/// How a connection ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Closed {
    Code(u16),
    WithoutFrame,
}

pub struct GatewayClient {
    socket: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl GatewayClient {
    pub async fn send(&mut self, frame: Value) -> Result<()> {
        self.socket.send(Message::Text(frame.to_string())).await?;
        Ok(())
    }

    pub async fn identify(&mut self, token: &str) -> Result<()> {
        self.send(json!({ "op": 2, "d": { "token": token } })).await
    }

    pub async fn heartbeat(&mut self, seq: Option<u64>) -> Result<()> {
        self.send(json!({ "op": 1, "d": seq })).await
    }

    /// Send a request; `data` is omitted for operations without one
    pub async fn request(&mut self, nonce: &str, op_type: &str, data: Option<Value>) -> Result<()> {
        let mut d = json!({ "nonce": nonce, "type": op_type });
        if let Some(data) = data {
            d["data"] = data;
        }
        self.send(json!({ "op": 3, "d": d })).await
    }

    /// Next text frame as JSON
    pub async fn next_frame(&mut self) -> Result<Value> {
        loop {
            let message = timeout(FRAME_TIMEOUT, self.socket.next())
                .await
                .map_err(|_| anyhow!("timed out waiting for a frame"))?
                .ok_or_else(|| anyhow!("connection closed"))??;

            match message {
                Message::Text(text) => return Ok(serde_json::from_str(&text)?),
                Message::Close(frame) => bail!("connection closed: {frame:?}"),
                _ => continue,
            }
        }
    }

    /// Skip frames until a dispatch of `event` arrives; returns its `d`
    pub async fn wait_for(&mut self, event: &str) -> Result<Value> {
        loop {
            let frame = self.next_frame().await?;
            if frame["op"] == 0 && frame["t"] == event {
                return Ok(frame["d"].clone());
            }
        }
    }

    /// Skip frames until one with `op` arrives
    pub async fn wait_for_op(&mut self, op: u8) -> Result<Value> {
        loop {
            let frame = self.next_frame().await?;
            if frame["op"] == op {
                return Ok(frame);
            }
        }
    }

    /// Read until the server closes the connection
    pub async fn wait_for_close(&mut self) -> Result<Closed> {
        loop {
            let next = timeout(FRAME_TIMEOUT, self.socket.next())
                .await
                .map_err(|_| anyhow!("timed out waiting for close"))?;

            match next {
                Some(Ok(Message::Close(Some(frame)))) => return Ok(Closed::Code(frame.code.into())),
                Some(Ok(Message::Close(None))) | None | Some(Err(_)) => {
                    return Ok(Closed::WithoutFrame)
                }
                Some(Ok(_)) => continue,
            }
        }
    }
}
