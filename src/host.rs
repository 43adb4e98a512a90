//! Command transport towards the host backend.
//!
//! Commands are addressed to this plugin's backend by name and answered
//! asynchronously. The in-process transport forwards each command over an
//! mpsc channel and waits for the reply on a oneshot, so whichever task
//! services the channel plays the role of the host.

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};

/// Command names accepted by the backend.
pub mod commands {
    pub const TEST_ALERT: &str = "test_alert";
    pub const TEST_EMERGENCY_ACTIONS: &str = "test_emergency_actions";
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("host connection closed")]
    ChannelClosed,
    #[error("host rejected command: {reason}")]
    Rejected { reason: String },
}

/// Asynchronous request/response channel to the host's command API.
#[async_trait]
pub trait CommandTransport: Send + Sync {
    async fn send_command(&self, command: &str) -> Result<serde_json::Value, TransportError>;
}

/// A command in flight towards whichever task services the host side.
#[derive(Debug)]
pub struct HostRequest {
    pub command: String,
    pub respond_to: oneshot::Sender<Result<serde_json::Value, String>>,
}

/// Transport backed by an in-process request channel.
#[derive(Clone)]
pub struct ChannelTransport {
    requests: mpsc::Sender<HostRequest>,
}

impl ChannelTransport {
    pub fn new(requests: mpsc::Sender<HostRequest>) -> Self {
        Self { requests }
    }
}

#[async_trait]
impl CommandTransport for ChannelTransport {
    async fn send_command(&self, command: &str) -> Result<serde_json::Value, TransportError> {
        let (respond_to, response) = oneshot::channel();
        self.requests
            .send(HostRequest {
                command: command.to_string(),
                respond_to,
            })
            .await
            .map_err(|_| TransportError::ChannelClosed)?;

        match response.await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(reason)) => Err(TransportError::Rejected { reason }),
            Err(_) => Err(TransportError::ChannelClosed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn command_round_trip() {
        tokio_test::block_on(async {
            let (tx, mut rx) = mpsc::channel::<HostRequest>(4);
            let transport = ChannelTransport::new(tx);

            tokio::spawn(async move {
                while let Some(request) = rx.recv().await {
                    let reply = match request.command.as_str() {
                        commands::TEST_ALERT => Ok(json!({ "success": true })),
                        other => Err(format!("unknown command: {other}")),
                    };
                    let _ = request.respond_to.send(reply);
                }
            });

            let response = transport.send_command(commands::TEST_ALERT).await.unwrap();
            assert_eq!(response["success"], json!(true));

            let err = transport.send_command("bogus").await.unwrap_err();
            assert!(matches!(err, TransportError::Rejected { .. }));
        });
    }

    #[test]
    fn closed_channel_reports_unavailable() {
        tokio_test::block_on(async {
            let (tx, rx) = mpsc::channel::<HostRequest>(1);
            drop(rx);
            let transport = ChannelTransport::new(tx);

            let err = transport
                .send_command(commands::TEST_ALERT)
                .await
                .unwrap_err();
            assert!(matches!(err, TransportError::ChannelClosed));
        });
    }

    #[test]
    fn dropped_responder_reports_closed() {
        tokio_test::block_on(async {
            let (tx, mut rx) = mpsc::channel::<HostRequest>(1);
            let transport = ChannelTransport::new(tx);

            tokio::spawn(async move {
                // Drop the request without answering.
                let _ = rx.recv().await;
            });

            let err = transport
                .send_command(commands::TEST_EMERGENCY_ACTIONS)
                .await
                .unwrap_err();
            assert!(matches!(err, TransportError::ChannelClosed));
        });
    }
}
