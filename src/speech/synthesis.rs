//! Speech-synthesis capability and the voice catalog

use crate::Result;
use uuid::Uuid;

/// A synthesis voice offered by the platform
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Voice {
    pub name: String,
    pub lang: String,
}

impl Voice {
    pub fn new(name: impl Into<String>, lang: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            lang: lang.into(),
        }
    }

    /// Label shown in the voice selector
    pub fn label(&self) -> String {
        format!("{} ({})", self.name, self.lang)
    }
}

/// One unit of speech to synthesize
#[derive(Debug, Clone, PartialEq)]
pub struct Utterance {
    pub id: Uuid,
    pub text: String,
    /// Voice name; None lets the synthesizer pick
    pub voice: Option<String>,
}

impl Utterance {
    pub fn new(text: impl Into<String>, voice: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            text: text.into(),
            voice,
        }
    }
}

/// Events reported by a synthesizer
#[derive(Debug, Clone, PartialEq)]
pub enum SynthesisEvent {
    /// The set of available voices changed
    VoicesChanged,
    /// An utterance finished playing or was cancelled
    Finished(Uuid),
    /// An utterance could not be synthesized or played
    Error { id: Option<Uuid>, error: String },
}

/// Platform text-to-speech
pub trait SpeechSynthesizer {
    /// Currently available voices
    fn voices(&self) -> Vec<Voice>;

    /// Queue an utterance for playback
    fn speak(&mut self, utterance: Utterance) -> Result<()>;

    /// Stop the current utterance and drop anything queued
    fn cancel(&mut self);

    /// Next pending event, if any
    fn try_recv(&mut self) -> Option<SynthesisEvent>;
}

/// Available voices plus the user's pick
#[derive(Debug, Clone, Default)]
pub struct VoiceCatalog {
    voices: Vec<Voice>,
    selected: Option<String>,
}

impl VoiceCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn voices(&self) -> &[Voice] {
        &self.voices
    }

    /// Replace the voice list, dropping a selection that no longer exists
    pub fn refresh(&mut self, voices: Vec<Voice>) {
        self.voices = voices;
        let still_there = self
            .selected
            .as_ref()
            .map(|name| self.voices.iter().any(|v| &v.name == name))
            .unwrap_or(false);
        if !still_there {
            self.selected = None;
        }
    }

    /// Select a voice by name. Unknown names are ignored.
    pub fn select(&mut self, name: &str) -> bool {
        if self.voices.iter().any(|v| v.name == name) {
            self.selected = Some(name.to_string());
            true
        } else {
            false
        }
    }

    pub fn selected(&self) -> Option<&Voice> {
        self.selected
            .as_ref()
            .and_then(|name| self.voices.iter().find(|v| &v.name == name))
    }

    pub fn selected_name(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn is_empty(&self) -> bool {
        self.voices.is_empty()
    }
}
