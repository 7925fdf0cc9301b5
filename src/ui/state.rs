//! Chat widget state
//!
//! One `WidgetState` holds the session, the transcript, the instruction
//! selection and the speech controllers. The UI thread calls
//! [`WidgetState::poll_events`] once per frame; everything else reacts to
//! user actions.

use crate::audio::{AudioUrlPlayer, RemoteAudioPlayer};
use crate::backend::{
    resolve_audio_url, BackendCommand, BackendEvent, BackendHandle, ChatReply, ChatRequest,
    SessionId,
};
use crate::config::ParleyConfig;
use crate::messages::{Message, Transcript};
use crate::speech::{
    SherpaSynthesizer, SpeechInputController, SpeechInputUpdate, SpeechOutputController,
    SpeechRecognizer, SpeechSynthesizer,
};
use crate::ui::selection::InstructionSelection;
use std::time::Instant;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Speech and audio capabilities of the host. Any of them may be missing.
#[derive(Default)]
pub struct Platform {
    pub recognizer: Option<Box<dyn SpeechRecognizer>>,
    pub synthesizer: Option<Box<dyn SpeechSynthesizer>>,
    pub audio_player: Option<Box<dyn AudioUrlPlayer>>,
}

impl Platform {
    /// No speech input, no speech output
    pub fn none() -> Self {
        Self::default()
    }

    /// Native capabilities; whatever fails to start is left out
    pub fn native(config: &ParleyConfig) -> Self {
        #[cfg(feature = "audio-io")]
        let recognizer: Option<Box<dyn SpeechRecognizer>> =
            match crate::speech::WhisperRecognizer::new((&config.speech).into()) {
                Ok(recognizer) => Some(Box::new(recognizer)),
                Err(e) => {
                    warn!("Speech recognition unavailable: {}", e);
                    None
                }
            };
        #[cfg(not(feature = "audio-io"))]
        let recognizer: Option<Box<dyn SpeechRecognizer>> = None;

        let synthesizer: Option<Box<dyn SpeechSynthesizer>> =
            match SherpaSynthesizer::spawn(&config.speech.voices_dir) {
                Ok(synth) => Some(Box::new(synth)),
                Err(e) => {
                    warn!("Speech synthesis unavailable: {}", e);
                    None
                }
            };

        let audio_player: Option<Box<dyn AudioUrlPlayer>> =
            match RemoteAudioPlayer::spawn(&config.backend) {
                Ok(player) => Some(Box::new(player)),
                Err(e) => {
                    warn!("Reply audio playback unavailable: {}", e);
                    None
                }
            };

        Self {
            recognizer,
            synthesizer,
            audio_player,
        }
    }
}

/// Central state of the chat widget
pub struct WidgetState {
    /// Conversation so far
    pub transcript: Transcript,

    /// Instruction set for the next turn
    pub instructions: InstructionSelection,

    /// Text in the input field
    pub input_text: String,

    /// A chat request is in flight
    pub loading: bool,

    pub speech_input: SpeechInputController,
    pub speech_output: SpeechOutputController,

    session: Option<SessionId>,
    pending_request: Option<Uuid>,
    backend: BackendHandle,
    base_url: String,
    synthesize_with_audio_url: bool,
    initialized: bool,
}

impl WidgetState {
    pub fn new(config: &ParleyConfig, backend: BackendHandle, platform: Platform) -> Self {
        Self {
            transcript: Transcript::new(),
            instructions: InstructionSelection::new(),
            input_text: String::new(),
            loading: false,
            speech_input: SpeechInputController::new(
                platform.recognizer,
                config.speech.silence_timeout(),
            ),
            speech_output: SpeechOutputController::new(
                platform.synthesizer,
                platform.audio_player,
            ),
            session: None,
            pending_request: None,
            backend,
            base_url: config.backend.base_url.clone(),
            synthesize_with_audio_url: config.speech.synthesize_with_audio_url,
            initialized: false,
        }
    }

    /// Request the instruction catalog and a session. Runs once.
    pub fn initialize(&mut self) {
        if self.initialized {
            return;
        }
        self.initialized = true;

        info!("Initializing chat session");
        for command in [BackendCommand::FetchInstructionSets, BackendCommand::NewSession] {
            if let Err(e) = self.backend.send(command) {
                error!("Failed to reach backend worker: {}", e);
            }
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn session_id(&self) -> Option<&SessionId> {
        self.session.as_ref()
    }

    /// Id of the chat request awaiting a reply
    pub fn pending_request(&self) -> Option<Uuid> {
        self.pending_request
    }

    /// Send one chat turn
    ///
    /// Returns false when nothing was sent: blank text, or a reply is still
    /// outstanding.
    pub fn send(&mut self, text: &str) -> bool {
        let text = text.trim();
        if text.is_empty() {
            return false;
        }
        if self.loading {
            warn!("Chat request already in flight, ignoring {:?}", text);
            return false;
        }

        self.transcript.push(Message::user(text));
        self.input_text.clear();

        let request_id = Uuid::new_v4();
        let request = ChatRequest {
            session_id: self.session.clone(),
            instruction_id: self.instructions.active().to_string(),
            question: text.to_string(),
        };
        debug!(
            "Sending chat turn {} with instruction {}",
            request_id, request.instruction_id
        );

        match self.backend.send(BackendCommand::Chat {
            request_id,
            request,
        }) {
            Ok(()) => {
                self.loading = true;
                self.pending_request = Some(request_id);
            }
            Err(e) => error!("Failed to send chat request: {}", e),
        }
        true
    }

    /// Send whatever is in the input field
    pub fn submit(&mut self) -> bool {
        let text = self.input_text.clone();
        self.send(&text)
    }

    pub fn can_submit(&self) -> bool {
        !self.loading && !self.input_text.trim().is_empty()
    }

    /// Microphone button
    pub fn toggle_listening(&mut self) {
        self.speech_input.toggle();
    }

    /// Speaker button: stop speech, or replay the last assistant reply
    pub fn toggle_speaker(&mut self) {
        let last = self.transcript.last_assistant();
        self.speech_output
            .toggle(last.as_ref().map(|message| message.content.as_str()));
    }

    /// Pick a catalog entry
    pub fn select_instruction(&mut self, id: &str) {
        self.instructions.select(id);
    }

    /// Type a custom instruction id
    pub fn set_custom_instruction(&mut self, raw: &str) {
        self.instructions.set_custom(raw);
    }

    /// Drain backend, recognizer and synthesizer events and run timers
    pub fn poll_events(&mut self, now: Instant) {
        while let Some(event) = self.backend.try_recv() {
            self.handle_backend_event(event);
        }

        for update in self.speech_input.poll(now) {
            match update {
                SpeechInputUpdate::Transcribing(text) => {
                    if !text.is_empty() {
                        self.input_text = text;
                    }
                }
                SpeechInputUpdate::Finalized(text) => {
                    self.send(&text);
                }
                SpeechInputUpdate::Stopped => {}
            }
        }

        self.speech_output.poll();
    }

    fn handle_backend_event(&mut self, event: BackendEvent) {
        match event {
            BackendEvent::InstructionSets(catalog) => {
                info!("Loaded {} instruction set(s)", catalog.len());
                self.instructions.set_catalog(catalog);
            }
            BackendEvent::InstructionSetsFailed(e) => {
                error!("Error fetching instruction sets: {}", e);
            }
            BackendEvent::Session(session_id) => {
                info!("Session {} started", session_id);
                self.session = Some(session_id);
            }
            BackendEvent::SessionFailed(e) => {
                error!("Error creating new session: {}", e);
            }
            BackendEvent::ChatReply { request_id, reply } => {
                if self.pending_request != Some(request_id) {
                    debug!("Ignoring reply for stale request {}", request_id);
                    return;
                }
                self.finish_request();
                self.handle_reply(reply);
            }
            BackendEvent::ChatFailed { request_id, error } => {
                if self.pending_request != Some(request_id) {
                    debug!("Ignoring failure for stale request {}", request_id);
                    return;
                }
                self.finish_request();
                error!("Error sending message: {}", error);
            }
        }
    }

    fn finish_request(&mut self) {
        self.pending_request = None;
        self.loading = false;
    }

    fn handle_reply(&mut self, reply: ChatReply) {
        self.transcript.push(Message::assistant(reply.response.clone()));

        let has_audio = match reply.audio_url.as_deref() {
            Some(raw) => match resolve_audio_url(&self.base_url, raw) {
                Ok(url) => {
                    self.speech_output.play_url(url);
                    true
                }
                Err(e) => {
                    error!("Unusable audio URL {:?}: {}", raw, e);
                    false
                }
            },
            None => false,
        };

        if !has_audio || self.synthesize_with_audio_url {
            self.speech_output.speak(&reply.response);
        }
    }

    /// Earliest instant at which `poll_events` has timed work to do
    pub fn next_deadline(&self) -> Option<Instant> {
        self.speech_input.next_deadline()
    }

    /// Something is in progress that needs frequent repaints
    pub fn is_busy(&self) -> bool {
        self.loading || self.speech_input.is_listening() || self.speech_output.is_speaking()
    }
}
