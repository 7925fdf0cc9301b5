//! Chat backend access
//!
//! - `client`: async HTTP calls (`/instruction_sets`, `/new_session`, `/chat`)
//! - `worker`: thread + tokio runtime bridging the client to the UI

pub mod client;
pub mod types;
pub mod worker;

pub use client::{resolve_audio_url, BackendClient, PROXY_WARNING_HEADER};
pub use types::{ChatReply, ChatRequest, InstructionCatalog, SessionId, DEFAULT_INSTRUCTION_ID};
pub use worker::{BackendCommand, BackendEvent, BackendHandle, BackendWorker};
