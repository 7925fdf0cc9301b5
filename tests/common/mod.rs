//! Fakes shared by the integration tests
//!
//! Speech and audio capabilities record what they were asked to do in a
//! shared recorder; the backend worker is replaced by a pair of channels.

#![allow(dead_code)]

use crossbeam_channel::{unbounded, Receiver, Sender};
use parking_lot::Mutex;
use parley::audio::AudioUrlPlayer;
use parley::backend::{BackendCommand, BackendEvent, BackendHandle};
use parley::speech::{
    RecognitionEvent, RecognitionResult, SpeechRecognizer, SpeechSynthesizer, SynthesisEvent,
    Utterance, Voice,
};
use parley::ui::{Platform, WidgetState};
use parley::ParleyConfig;
use std::collections::VecDeque;
use std::sync::Arc;

#[derive(Default)]
pub struct Recorder {
    pub recognition_events: VecDeque<RecognitionEvent>,
    pub recognizer_starts: usize,
    pub recognizer_stops: usize,

    pub voices: Vec<Voice>,
    pub spoken: Vec<Utterance>,
    pub cancels: usize,
    pub synthesis_events: VecDeque<SynthesisEvent>,

    pub played_urls: Vec<String>,
}

pub type SharedRecorder = Arc<Mutex<Recorder>>;

pub struct FakeRecognizer(pub SharedRecorder);

impl SpeechRecognizer for FakeRecognizer {
    fn start(&mut self) -> parley::Result<()> {
        self.0.lock().recognizer_starts += 1;
        Ok(())
    }

    fn stop(&mut self) {
        self.0.lock().recognizer_stops += 1;
    }

    fn try_recv(&mut self) -> Option<RecognitionEvent> {
        self.0.lock().recognition_events.pop_front()
    }
}

pub struct FakeSynthesizer(pub SharedRecorder);

impl SpeechSynthesizer for FakeSynthesizer {
    fn voices(&self) -> Vec<Voice> {
        self.0.lock().voices.clone()
    }

    fn speak(&mut self, utterance: Utterance) -> parley::Result<()> {
        self.0.lock().spoken.push(utterance);
        Ok(())
    }

    fn cancel(&mut self) {
        self.0.lock().cancels += 1;
    }

    fn try_recv(&mut self) -> Option<SynthesisEvent> {
        self.0.lock().synthesis_events.pop_front()
    }
}

pub struct FakePlayer(pub SharedRecorder);

impl AudioUrlPlayer for FakePlayer {
    fn play_url(&mut self, url: &str) -> parley::Result<()> {
        self.0.lock().played_urls.push(url.to_string());
        Ok(())
    }
}

/// A widget wired to fakes, plus the other ends of its channels
pub struct Fixture {
    pub state: WidgetState,
    pub recorder: SharedRecorder,
    pub commands: Receiver<BackendCommand>,
    pub events: Sender<BackendEvent>,
}

impl Fixture {
    pub fn new() -> Self {
        Self::with_config(ParleyConfig::default())
    }

    pub fn with_config(config: ParleyConfig) -> Self {
        let recorder: SharedRecorder = Arc::new(Mutex::new(Recorder {
            voices: vec![
                Voice::new("en_US-amy-medium", "en-US"),
                Voice::new("en_GB-alba-medium", "en-GB"),
            ],
            ..Default::default()
        }));
        let platform = Platform {
            recognizer: Some(Box::new(FakeRecognizer(Arc::clone(&recorder)))),
            synthesizer: Some(Box::new(FakeSynthesizer(Arc::clone(&recorder)))),
            audio_player: Some(Box::new(FakePlayer(Arc::clone(&recorder)))),
        };
        Self::build(config, platform, recorder)
    }

    /// No recognizer, synthesizer or player
    pub fn without_speech() -> Self {
        let recorder: SharedRecorder = Arc::new(Mutex::new(Recorder::default()));
        Self::build(ParleyConfig::default(), Platform::none(), recorder)
    }

    fn build(config: ParleyConfig, platform: Platform, recorder: SharedRecorder) -> Self {
        let (command_tx, commands) = unbounded();
        let (events, event_rx) = unbounded();
        let backend = BackendHandle::new(command_tx, event_rx);
        Self {
            state: WidgetState::new(&config, backend, platform),
            recorder,
            commands,
            events,
        }
    }

    /// Everything the widget has sent to the backend so far
    pub fn drain_commands(&self) -> Vec<BackendCommand> {
        self.commands.try_iter().collect()
    }

    pub fn push_backend(&self, event: BackendEvent) {
        self.events.send(event).unwrap();
    }

    pub fn push_recognition(&self, transcripts: &[&str]) {
        let results = transcripts
            .iter()
            .map(|t| RecognitionResult::single(*t))
            .collect();
        self.recorder
            .lock()
            .recognition_events
            .push_back(RecognitionEvent::Result(results));
    }
}
