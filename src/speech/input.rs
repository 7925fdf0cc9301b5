//! Speech input controller
//!
//! Two states, idle and listening. Listening ends on an explicit toggle, a
//! recognizer error, or when no new result has arrived for the silence
//! timeout; only the last case hands the transcript on as a message.

use crate::speech::recognition::{join_transcript, RecognitionEvent, SpeechRecognizer};
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// Listening state of the speech input
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ListeningState {
    #[default]
    Idle,
    Listening,
}

impl ListeningState {
    pub fn is_listening(&self) -> bool {
        matches!(self, ListeningState::Listening)
    }
}

impl std::fmt::Display for ListeningState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ListeningState::Idle => write!(f, "Idle"),
            ListeningState::Listening => write!(f, "Listening"),
        }
    }
}

/// Cancellable one-shot deadline, re-armed on every new input
#[derive(Debug, Clone)]
pub struct DebounceTimer {
    delay: Duration,
    deadline: Option<Instant>,
}

impl DebounceTimer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    /// Cancel any pending deadline and start a new one from `now`
    pub fn arm(&mut self, now: Instant) {
        self.deadline = Some(now + self.delay);
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Returns true exactly once when the deadline has passed
    pub fn fire_if_due(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

/// What the widget should do after speech input activity
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpeechInputUpdate {
    /// Latest recognised transcript, to show in the input field
    Transcribing(String),
    /// Listening finished with a transcript to send
    Finalized(String),
    /// Listening finished with nothing to send
    Stopped,
}

pub struct SpeechInputController {
    recognizer: Option<Box<dyn SpeechRecognizer>>,
    state: ListeningState,
    debounce: DebounceTimer,
    transcript: String,
}

impl SpeechInputController {
    pub fn new(recognizer: Option<Box<dyn SpeechRecognizer>>, silence_timeout: Duration) -> Self {
        Self {
            recognizer,
            state: ListeningState::Idle,
            debounce: DebounceTimer::new(silence_timeout),
            transcript: String::new(),
        }
    }

    /// Whether a recognizer is present at all
    pub fn is_available(&self) -> bool {
        self.recognizer.is_some()
    }

    pub fn state(&self) -> ListeningState {
        self.state
    }

    pub fn is_listening(&self) -> bool {
        self.state.is_listening()
    }

    /// Most recent transcript of the current (or last) session
    pub fn transcript(&self) -> &str {
        &self.transcript
    }

    /// When the pending debounce will fire, if armed
    pub fn next_deadline(&self) -> Option<Instant> {
        self.debounce.deadline()
    }

    /// Microphone button
    pub fn toggle(&mut self) -> ListeningState {
        match self.state {
            ListeningState::Idle => self.start(),
            ListeningState::Listening => {
                info!("Listening stopped by user");
                self.stop();
            }
        }
        self.state
    }

    fn start(&mut self) {
        let Some(recognizer) = self.recognizer.as_mut() else {
            warn!("Speech recognition is not available");
            return;
        };

        match recognizer.start() {
            Ok(()) => {
                self.transcript.clear();
                self.debounce.cancel();
                self.state = ListeningState::Listening;
                info!("Listening started");
            }
            Err(e) => {
                error!("Failed to start speech recognition: {}", e);
            }
        }
    }

    /// Stop capture and return to idle without sending anything
    pub fn stop(&mut self) {
        self.debounce.cancel();
        if let Some(recognizer) = self.recognizer.as_mut() {
            recognizer.stop();
        }
        self.state = ListeningState::Idle;
    }

    /// Apply one recognizer event
    pub fn handle_event(
        &mut self,
        event: RecognitionEvent,
        now: Instant,
    ) -> Option<SpeechInputUpdate> {
        if !self.is_listening() {
            debug!("Ignoring recognition event while idle: {:?}", event);
            return None;
        }

        match event {
            RecognitionEvent::Result(results) => {
                self.transcript = join_transcript(&results);
                self.debounce.arm(now);
                debug!("Transcript so far: {:?}", self.transcript);
                Some(SpeechInputUpdate::Transcribing(self.transcript.clone()))
            }
            RecognitionEvent::Error(e) => {
                error!("Speech recognition error: {}", e);
                self.stop();
                Some(SpeechInputUpdate::Stopped)
            }
            RecognitionEvent::End => {
                if self.debounce.is_armed() {
                    None
                } else {
                    debug!("Recognizer ended without results");
                    self.stop();
                    Some(SpeechInputUpdate::Stopped)
                }
            }
        }
    }

    /// Drain recognizer events and run the silence timer
    pub fn poll(&mut self, now: Instant) -> Vec<SpeechInputUpdate> {
        let mut events = Vec::new();
        if let Some(recognizer) = self.recognizer.as_mut() {
            while let Some(event) = recognizer.try_recv() {
                events.push(event);
            }
        }

        let mut updates: Vec<SpeechInputUpdate> = events
            .into_iter()
            .filter_map(|event| self.handle_event(event, now))
            .collect();

        if self.debounce.fire_if_due(now) {
            self.stop();
            let text = self.transcript.trim();
            if text.is_empty() {
                updates.push(SpeechInputUpdate::Stopped);
            } else {
                info!("Silence timeout, finalizing transcript");
                updates.push(SpeechInputUpdate::Finalized(text.to_string()));
            }
        }

        updates
    }
}
