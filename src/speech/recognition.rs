//! Speech-recognition capability
//!
//! A recognizer captures one listening session at a time and reports what it
//! heard as result events. Each event carries every result of the session so
//! far, and each result lists its alternatives best-first.

use crate::Result;

/// One candidate transcription of a stretch of speech
#[derive(Debug, Clone, PartialEq)]
pub struct Alternative {
    pub transcript: String,
    pub confidence: Option<f32>,
}

impl Alternative {
    pub fn new(transcript: impl Into<String>) -> Self {
        Self {
            transcript: transcript.into(),
            confidence: None,
        }
    }
}

/// A recognised stretch of speech with its alternatives, best first
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RecognitionResult {
    pub alternatives: Vec<Alternative>,
}

impl RecognitionResult {
    pub fn single(transcript: impl Into<String>) -> Self {
        Self {
            alternatives: vec![Alternative::new(transcript)],
        }
    }

    pub fn best(&self) -> Option<&Alternative> {
        self.alternatives.first()
    }
}

/// Events reported by a recognizer
#[derive(Debug, Clone, PartialEq)]
pub enum RecognitionEvent {
    /// All results of the current session so far
    Result(Vec<RecognitionResult>),
    /// Capture or recognition failed
    Error(String),
    /// The recognizer stopped on its own
    End,
}

/// Join the best alternative of every result, in order, with no separator.
pub fn join_transcript(results: &[RecognitionResult]) -> String {
    results
        .iter()
        .filter_map(|r| r.best())
        .map(|alt| alt.transcript.as_str())
        .collect()
}

/// Platform speech recognition
pub trait SpeechRecognizer {
    /// Begin a listening session
    fn start(&mut self) -> Result<()>;

    /// End the current listening session
    fn stop(&mut self);

    /// Next pending event, if any
    fn try_recv(&mut self) -> Option<RecognitionEvent>;
}
