//! Parley: a voice-enabled chat client
//!
//! Text typed or spoken by the user is sent to a remote chat backend; replies
//! are shown in a transcript and read aloud.

pub mod audio;
pub mod backend;
pub mod config;
pub mod error;
pub mod messages;
pub mod speech;
pub mod ui;

pub use config::ParleyConfig;
pub use error::{ParleyError, Result};
