//! Backend worker thread
//!
//! Owns a tokio runtime and the HTTP client. The UI talks to it through a
//! [`BackendHandle`]: commands go in, events come out, nothing blocks.

use crate::backend::client::BackendClient;
use crate::backend::types::{ChatReply, ChatRequest, InstructionCatalog, SessionId};
use crate::config::BackendConfig;
use crate::{ParleyError, Result};
use crossbeam_channel::{bounded, unbounded, Receiver, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Commands sent to the backend worker
#[derive(Clone, Debug)]
pub enum BackendCommand {
    /// Fetch the instruction-set catalog
    FetchInstructionSets,
    /// Ask for a new session identifier
    NewSession,
    /// Send a chat turn
    Chat {
        request_id: Uuid,
        request: ChatRequest,
    },
    /// Stop the worker
    Shutdown,
}

/// Events emitted by the backend worker
#[derive(Clone, Debug)]
pub enum BackendEvent {
    InstructionSets(InstructionCatalog),
    InstructionSetsFailed(String),
    Session(SessionId),
    SessionFailed(String),
    ChatReply { request_id: Uuid, reply: ChatReply },
    ChatFailed { request_id: Uuid, error: String },
}

/// UI-side endpoint of the backend worker
pub struct BackendHandle {
    command_tx: Sender<BackendCommand>,
    event_rx: Receiver<BackendEvent>,
}

impl BackendHandle {
    pub fn new(command_tx: Sender<BackendCommand>, event_rx: Receiver<BackendEvent>) -> Self {
        Self {
            command_tx,
            event_rx,
        }
    }

    /// Queue a command for the worker
    pub fn send(&self, command: BackendCommand) -> Result<()> {
        self.command_tx
            .send(command)
            .map_err(|e| ParleyError::ChannelError(format!("Backend worker is gone: {}", e)))
    }

    /// Try to receive the next event without blocking
    pub fn try_recv(&self) -> Option<BackendEvent> {
        self.event_rx.try_recv().ok()
    }
}

impl Drop for BackendHandle {
    fn drop(&mut self) {
        let _ = self.command_tx.try_send(BackendCommand::Shutdown);
    }
}

pub struct BackendWorker;

impl BackendWorker {
    /// Spawn the worker thread
    pub fn spawn(config: &BackendConfig) -> Result<(BackendHandle, JoinHandle<()>)> {
        let client = Arc::new(BackendClient::new(config)?);

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .thread_name("parley-backend")
            .enable_all()
            .build()
            .map_err(|e| ParleyError::ConfigError(format!("Failed to start runtime: {}", e)))?;

        let (command_tx, command_rx) = bounded(32);
        let (event_tx, event_rx) = unbounded();

        let handle = thread::Builder::new()
            .name("parley-backend".to_string())
            .spawn(move || {
                info!("Backend worker started for {}", client.base_url());

                loop {
                    match command_rx.recv() {
                        Ok(BackendCommand::Shutdown) => {
                            info!("Backend worker shutting down");
                            break;
                        }
                        Ok(command) => {
                            let client = Arc::clone(&client);
                            let event_tx = event_tx.clone();
                            runtime.spawn(async move {
                                let event = execute(&client, command).await;
                                if let Some(event) = event {
                                    if event_tx.send(event).is_err() {
                                        debug!("Event receiver dropped");
                                    }
                                }
                            });
                        }
                        Err(_) => {
                            debug!("Command channel closed");
                            break;
                        }
                    }
                }

                runtime.shutdown_background();
                info!("Backend worker stopped");
            })?;

        Ok((BackendHandle::new(command_tx, event_rx), handle))
    }
}

async fn execute(client: &BackendClient, command: BackendCommand) -> Option<BackendEvent> {
    match command {
        BackendCommand::FetchInstructionSets => Some(match client.fetch_instruction_sets().await {
            Ok(catalog) => BackendEvent::InstructionSets(catalog),
            Err(e) => {
                error!("Failed to fetch instruction sets: {}", e);
                BackendEvent::InstructionSetsFailed(e.to_string())
            }
        }),
        BackendCommand::NewSession => Some(match client.new_session().await {
            Ok(session_id) => {
                info!("Session ID: {}", session_id);
                BackendEvent::Session(session_id)
            }
            Err(e) => {
                error!("Failed to fetch session ID: {}", e);
                BackendEvent::SessionFailed(e.to_string())
            }
        }),
        BackendCommand::Chat {
            request_id,
            request,
        } => {
            debug!(
                "Chat request {} (instruction {})",
                request_id, request.instruction_id
            );
            Some(match client.chat(&request).await {
                Ok(reply) => BackendEvent::ChatReply { request_id, reply },
                Err(e) => {
                    if e.is_recoverable() {
                        warn!("Failed to send message: {}", e);
                    } else {
                        error!("Failed to send message: {}", e);
                    }
                    BackendEvent::ChatFailed {
                        request_id,
                        error: e.to_string(),
                    }
                }
            })
        }
        BackendCommand::Shutdown => None,
    }
}
