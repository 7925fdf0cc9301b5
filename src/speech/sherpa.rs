//! Text-to-speech with sherpa-rs (VITS models)
//!
//! Each subdirectory of the voices directory holding an `.onnx` model and a
//! `tokens.txt` is one voice. Directory names follow the Piper convention
//! (`en_US-amy-medium`), so the language is the part before the first `-`.
//!
//! Synthesis and playback run on a worker thread. Utterances play one after
//! another; cancelling stops the current one and drops the queue.

use crate::speech::synthesis::{SpeechSynthesizer, SynthesisEvent, Utterance, Voice};
use crate::{ParleyError, Result};
use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError, Sender};
use parking_lot::RwLock;
use rodio::buffer::SamplesBuffer;
use rodio::{OutputStream, OutputStreamHandle, Sink};
use sherpa_rs::tts::{VitsTts, VitsTtsConfig};
use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// How often the worker checks on the playing utterance
const PLAYBACK_POLL: Duration = Duration::from_millis(25);

/// Files making up one VITS voice
#[derive(Clone, Debug, PartialEq)]
pub struct VoiceModel {
    pub voice: Voice,
    pub model: PathBuf,
    pub tokens: PathBuf,
    pub lexicon: Option<PathBuf>,
    pub data_dir: Option<PathBuf>,
}

impl VoiceModel {
    /// Inspect one voice directory
    pub fn from_dir(dir: &Path) -> Option<Self> {
        let name = dir.file_name()?.to_str()?.to_string();

        let tokens = dir.join("tokens.txt");
        if !tokens.is_file() {
            return None;
        }

        let mut models: Vec<PathBuf> = std::fs::read_dir(dir)
            .ok()?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.extension().and_then(|e| e.to_str()) == Some("onnx"))
            .collect();
        models.sort();
        let model = models.into_iter().next()?;

        let lexicon = Some(dir.join("lexicon.txt")).filter(|p| p.is_file());
        let data_dir = Some(dir.join("espeak-ng-data")).filter(|p| p.is_dir());

        Some(Self {
            voice: Voice::new(name.clone(), voice_language(&name)),
            model,
            tokens,
            lexicon,
            data_dir,
        })
    }

    fn tts_config(&self) -> VitsTtsConfig {
        let path = |p: &Path| p.to_string_lossy().into_owned();
        VitsTtsConfig {
            model: path(&self.model),
            tokens: path(&self.tokens),
            lexicon: self.lexicon.as_deref().map(path).unwrap_or_default(),
            data_dir: self.data_dir.as_deref().map(path).unwrap_or_default(),
            length_scale: 1.0,
            noise_scale: 0.667,
            noise_scale_w: 0.8,
            ..Default::default()
        }
    }
}

/// `en_US-amy-medium` -> `en-US`
fn voice_language(name: &str) -> String {
    name.split('-').next().unwrap_or(name).replace('_', "-")
}

/// Find every usable voice below `voices_dir`, sorted by name
pub fn scan_voices(voices_dir: &Path) -> Vec<VoiceModel> {
    let entries = match std::fs::read_dir(voices_dir) {
        Ok(entries) => entries,
        Err(e) => {
            warn!("Cannot read voices directory {:?}: {}", voices_dir, e);
            return Vec::new();
        }
    };

    let mut voices: Vec<VoiceModel> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_dir())
        .filter_map(|dir| VoiceModel::from_dir(&dir))
        .collect();
    voices.sort_by(|a, b| a.voice.name.cmp(&b.voice.name));
    voices
}

/// Clean text before handing it to the model
pub fn normalize_text_for_tts(text: &str) -> String {
    let mut result = text.to_string();
    for (symbol, spoken) in [
        ("&", " and "),
        ("%", " percent"),
        ("@", " at "),
        ("+", " plus "),
        ("=", " equals "),
    ] {
        result = result.replace(symbol, spoken);
    }

    result
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace() || ".,!?;:'-\"".contains(*c))
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

enum SynthCommand {
    Speak(Utterance),
    Cancel,
    Shutdown,
}

/// sherpa-rs backed [`SpeechSynthesizer`]
pub struct SherpaSynthesizer {
    voices: Arc<RwLock<Vec<Voice>>>,
    command_tx: Sender<SynthCommand>,
    event_rx: Receiver<SynthesisEvent>,
}

impl SherpaSynthesizer {
    /// Start the synthesis worker for the voices in `voices_dir`
    ///
    /// # Errors
    /// Fails when the directory is missing
    pub fn spawn(voices_dir: &Path) -> Result<Self> {
        if !voices_dir.is_dir() {
            return Err(ParleyError::ModelLoadError(format!(
                "Voices directory not found: {:?}",
                voices_dir
            )));
        }

        let voices = Arc::new(RwLock::new(Vec::new()));
        let (command_tx, command_rx) = unbounded();
        let (event_tx, event_rx) = unbounded();

        let dir = voices_dir.to_path_buf();
        let shared = Arc::clone(&voices);
        thread::Builder::new()
            .name("parley-tts".to_string())
            .spawn(move || run_worker(dir, shared, command_rx, event_tx))?;

        Ok(Self {
            voices,
            command_tx,
            event_rx,
        })
    }
}

impl SpeechSynthesizer for SherpaSynthesizer {
    fn voices(&self) -> Vec<Voice> {
        self.voices.read().clone()
    }

    fn speak(&mut self, utterance: Utterance) -> Result<()> {
        self.command_tx
            .send(SynthCommand::Speak(utterance))
            .map_err(|_| ParleyError::TTSError("Synthesis worker is not running".to_string()))
    }

    fn cancel(&mut self) {
        let _ = self.command_tx.send(SynthCommand::Cancel);
    }

    fn try_recv(&mut self) -> Option<SynthesisEvent> {
        self.event_rx.try_recv().ok()
    }
}

impl Drop for SherpaSynthesizer {
    fn drop(&mut self) {
        let _ = self.command_tx.send(SynthCommand::Shutdown);
    }
}

/// Loaded models, created on first use of each voice
struct VoiceBank {
    models: Vec<VoiceModel>,
    loaded: HashMap<String, VitsTts>,
}

impl VoiceBank {
    fn synthesize(&mut self, utterance: &Utterance) -> Result<(Vec<f32>, u32)> {
        let model = match utterance.voice.as_deref() {
            Some(name) => self.models.iter().find(|m| m.voice.name == name),
            None => self.models.first(),
        }
        .ok_or_else(|| ParleyError::TTSError("No voice available".to_string()))?;

        let name = model.voice.name.clone();
        if !self.loaded.contains_key(&name) {
            info!("Loading VITS voice {} from {:?}", name, model.model);
            let tts = VitsTts::new(model.tts_config());
            self.loaded.insert(name.clone(), tts);
        }
        let tts = self
            .loaded
            .get_mut(&name)
            .ok_or_else(|| ParleyError::TTSError(format!("Voice {} failed to load", name)))?;

        let text = normalize_text_for_tts(&utterance.text);
        if text.is_empty() {
            return Ok((Vec::new(), 0));
        }

        debug!("Synthesizing with {}: {}", name, text);
        let audio = tts
            .create(&text, 0, 1.0)
            .map_err(|e| ParleyError::TTSError(format!("Synthesis failed: {}", e)))?;

        Ok((audio.samples, audio.sample_rate as u32))
    }
}

fn play(handle: &OutputStreamHandle, samples: Vec<f32>, sample_rate: u32) -> Result<Sink> {
    let sink = Sink::try_new(handle)
        .map_err(|e| ParleyError::PlaybackError(format!("Failed to create sink: {}", e)))?;
    sink.append(SamplesBuffer::new(1, sample_rate, samples));
    Ok(sink)
}

fn run_worker(
    voices_dir: PathBuf,
    voices: Arc<RwLock<Vec<Voice>>>,
    command_rx: Receiver<SynthCommand>,
    event_tx: Sender<SynthesisEvent>,
) {
    info!("TTS worker starting");

    let models = scan_voices(&voices_dir);
    info!("Found {} voice(s) in {:?}", models.len(), voices_dir);
    *voices.write() = models.iter().map(|m| m.voice.clone()).collect();
    let _ = event_tx.send(SynthesisEvent::VoicesChanged);

    let (_stream, stream_handle) = match OutputStream::try_default() {
        Ok(output) => output,
        Err(e) => {
            error!("No audio output for speech: {}", e);
            return;
        }
    };

    let mut bank = VoiceBank {
        models,
        loaded: HashMap::new(),
    };
    let mut queue: VecDeque<Utterance> = VecDeque::new();
    let mut playing: Option<(Uuid, Sink)> = None;

    loop {
        let command = if playing.is_some() || !queue.is_empty() {
            match command_rx.recv_timeout(PLAYBACK_POLL) {
                Ok(command) => Some(command),
                Err(RecvTimeoutError::Timeout) => None,
                Err(RecvTimeoutError::Disconnected) => break,
            }
        } else {
            match command_rx.recv() {
                Ok(command) => Some(command),
                Err(_) => break,
            }
        };

        match command {
            Some(SynthCommand::Speak(utterance)) => queue.push_back(utterance),
            Some(SynthCommand::Cancel) => {
                for dropped in queue.drain(..) {
                    let _ = event_tx.send(SynthesisEvent::Finished(dropped.id));
                }
                if let Some((id, sink)) = playing.take() {
                    sink.stop();
                    let _ = event_tx.send(SynthesisEvent::Finished(id));
                }
            }
            Some(SynthCommand::Shutdown) => break,
            None => {}
        }

        if let Some((id, sink)) = playing.as_ref() {
            if sink.empty() {
                let _ = event_tx.send(SynthesisEvent::Finished(*id));
                playing = None;
            }
        }

        if playing.is_none() {
            if let Some(utterance) = queue.pop_front() {
                let started = bank
                    .synthesize(&utterance)
                    .and_then(|(samples, rate)| play(&stream_handle, samples, rate.max(1)));
                match started {
                    Ok(sink) => playing = Some((utterance.id, sink)),
                    Err(e) => {
                        warn!("Speech failed: {}", e);
                        let _ = event_tx.send(SynthesisEvent::Error {
                            id: Some(utterance.id),
                            error: e.to_string(),
                        });
                    }
                }
            }
        }
    }

    if let Some((_, sink)) = playing {
        sink.stop();
    }
    info!("TTS worker stopped");
}
