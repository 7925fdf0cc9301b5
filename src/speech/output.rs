//! Speech output controller
//!
//! Replies are heard either through the synthesizer or by playing an audio
//! file the backend pointed at. The two paths are independent.

use crate::audio::player::AudioUrlPlayer;
use crate::speech::synthesis::{SpeechSynthesizer, SynthesisEvent, Utterance, VoiceCatalog};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

pub struct SpeechOutputController {
    synthesizer: Option<Box<dyn SpeechSynthesizer>>,
    player: Option<Box<dyn AudioUrlPlayer>>,
    voices: VoiceCatalog,
    speaking: bool,
    current: Option<Uuid>,
    audio_url: Option<String>,
}

impl SpeechOutputController {
    pub fn new(
        synthesizer: Option<Box<dyn SpeechSynthesizer>>,
        player: Option<Box<dyn AudioUrlPlayer>>,
    ) -> Self {
        let mut voices = VoiceCatalog::new();
        if let Some(synth) = synthesizer.as_ref() {
            voices.refresh(synth.voices());
        }

        Self {
            synthesizer,
            player,
            voices,
            speaking: false,
            current: None,
            audio_url: None,
        }
    }

    pub fn can_speak(&self) -> bool {
        self.synthesizer.is_some()
    }

    pub fn is_speaking(&self) -> bool {
        self.speaking
    }

    pub fn voices(&self) -> &VoiceCatalog {
        &self.voices
    }

    pub fn voices_mut(&mut self) -> &mut VoiceCatalog {
        &mut self.voices
    }

    /// Last audio URL handed to the player
    pub fn current_audio_url(&self) -> Option<&str> {
        self.audio_url.as_deref()
    }

    /// Synthesize `text` with the selected voice
    pub fn speak(&mut self, text: &str) -> bool {
        if text.trim().is_empty() {
            return false;
        }
        let Some(synth) = self.synthesizer.as_mut() else {
            debug!("No synthesizer, not speaking");
            return false;
        };

        let utterance = Utterance::new(text, self.voices.selected_name().map(str::to_string));
        let id = utterance.id;

        match synth.speak(utterance) {
            Ok(()) => {
                self.current = Some(id);
                self.speaking = true;
                true
            }
            Err(e) => {
                error!("Speech synthesis failed: {}", e);
                false
            }
        }
    }

    /// Cancel synthesis immediately
    pub fn stop(&mut self) {
        if let Some(synth) = self.synthesizer.as_mut() {
            synth.cancel();
        }
        self.current = None;
        self.speaking = false;
    }

    /// Speaker button: stop if speaking, otherwise replay `last_reply`
    pub fn toggle(&mut self, last_reply: Option<&str>) {
        if self.speaking {
            self.stop();
        } else if let Some(text) = last_reply {
            self.speak(text);
        }
    }

    /// Record and start playing an audio file
    pub fn play_url(&mut self, url: String) {
        self.audio_url = Some(url.clone());
        let Some(player) = self.player.as_mut() else {
            warn!("No audio player, skipping {}", url);
            return;
        };

        info!("Playing reply audio from {}", url);
        if let Err(e) = player.play_url(&url) {
            error!("Audio playback failed: {}", e);
        }
    }

    /// Drain synthesizer events
    pub fn poll(&mut self) {
        let mut events = Vec::new();
        if let Some(synth) = self.synthesizer.as_mut() {
            while let Some(event) = synth.try_recv() {
                events.push(event);
            }
        }

        for event in events {
            match event {
                SynthesisEvent::VoicesChanged => {
                    if let Some(synth) = self.synthesizer.as_ref() {
                        self.voices.refresh(synth.voices());
                        debug!("Voices changed: {} available", self.voices.voices().len());
                    }
                }
                SynthesisEvent::Finished(id) => {
                    if self.current == Some(id) {
                        self.current = None;
                        self.speaking = false;
                    }
                }
                SynthesisEvent::Error { id, error } => {
                    error!("Speech synthesis error: {}", error);
                    if id.is_none() || id == self.current {
                        self.current = None;
                        self.speaking = false;
                    }
                }
            }
        }
    }
}
