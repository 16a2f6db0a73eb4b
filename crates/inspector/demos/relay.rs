//! Relay demo - accept debuggers and proxy each one to a device
//!
//! Usage: relay <device-ws-url> [listen-addr] [project-root]

use inspector::{serve, DebuggerType, ProxyConfig};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};
use tokio_tungstenite::{accept_hdr_async, connect_async};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let mut args = std::env::args().skip(1);
    let device_url = args.next().ok_or("missing device websocket url")?;
    let listen_addr = args.next().unwrap_or_else(|| "127.0.0.1:8082".to_string());

    let mut config = ProxyConfig::default();
    if let Some(root) = args.next() {
        config.project_root = PathBuf::from(root);
    }
    let config = Arc::new(config);

    let listener = TcpListener::bind(&listen_addr).await?;
    println!("Waiting for debuggers on ws://{}", listen_addr);

    loop {
        let (stream, peer) = listener.accept().await?;
        let device_url = device_url.clone();
        let config = config.clone();

        tokio::spawn(async move {
            let mut user_agent = None;
            let debugger = match accept_hdr_async(stream, |req: &Request, resp: Response| -> Result<Response, ErrorResponse> {
                user_agent = req
                    .headers()
                    .get("user-agent")
                    .and_then(|v| v.to_str().ok())
                    .map(str::to_string);
                Ok(resp)
            })
            .await
            {
                Ok(ws) => ws,
                Err(e) => {
                    eprintln!("Handshake with {} failed: {}", peer, e);
                    return;
                }
            };

            let device = match connect_async(device_url.as_str()).await {
                Ok((ws, _)) => ws,
                Err(e) => {
                    eprintln!("Device connection failed: {}", e);
                    return;
                }
            };

            let debugger_type = DebuggerType::from_user_agent(user_agent.as_deref());
            if let Err(e) = serve(&config, debugger_type, device, debugger).await {
                eprintln!("Session for {} ended with error: {}", peer, e);
            }
        });
    }
}
