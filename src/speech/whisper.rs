//! Native speech recognition with Whisper
//!
//! Microphone audio is resampled to 16kHz and cut into utterances by the VAD
//! on a capture thread. A second thread transcribes the utterances, so
//! capture never stalls behind Whisper. Every transcribed utterance adds one
//! result to the listening session and the whole list is reported again.
//! A session that stays quiet for the no-speech timeout ends on its own.

use crate::audio::{MicCapture, StreamResampler, VoiceActivityDetector};
use crate::config::SpeechConfig;
use crate::speech::recognition::{
    Alternative, RecognitionEvent, RecognitionResult, SpeechRecognizer,
};
use crate::{ParleyError, Result};
use crossbeam_channel::{bounded, select, unbounded, Receiver, Sender};
use std::path::PathBuf;
use std::thread;
use tracing::{debug, error, info, warn};
use whisper_rs::{FullParams, SamplingStrategy, WhisperContext, WhisperContextParameters};

const WHISPER_SAMPLE_RATE: u32 = 16000;

/// Configuration for the Whisper recognizer
#[derive(Clone, Debug)]
pub struct WhisperConfig {
    /// Path to the Whisper model file
    pub model_path: PathBuf,

    /// Language to transcribe (None for auto-detection)
    pub language: Option<String>,

    /// Number of threads to use for transcription
    pub n_threads: i32,

    /// VAD speech probability threshold
    pub vad_threshold: f32,

    /// Minimum utterance duration in seconds
    pub min_segment_duration: f32,

    /// Maximum utterance duration in seconds
    pub max_segment_duration: f32,

    /// Trailing silence that closes an utterance (seconds)
    pub silence_threshold: f32,

    /// Quiet audio that ends the listening session (seconds)
    pub no_speech_timeout: f32,
}

impl Default for WhisperConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from("models/ggml-base.en.bin"),
            language: Some("en".to_string()),
            n_threads: 4,
            vad_threshold: 0.5,
            min_segment_duration: 0.3,
            max_segment_duration: 30.0,
            silence_threshold: 0.5,
            no_speech_timeout: 8.0,
        }
    }
}

impl From<&SpeechConfig> for WhisperConfig {
    fn from(speech: &SpeechConfig) -> Self {
        Self {
            model_path: speech.whisper_model.clone(),
            language: speech.language.clone(),
            n_threads: speech.n_threads,
            vad_threshold: speech.vad_threshold,
            no_speech_timeout: speech.no_speech_timeout_ms as f32 / 1000.0,
            ..Default::default()
        }
    }
}

/// Whisper speech-to-text engine
struct WhisperEngine {
    config: WhisperConfig,
    context: WhisperContext,
}

/// Turns one utterance of 16kHz audio into text
trait Transcribe {
    fn transcribe(&self, samples: &[f32]) -> Result<String>;
}

impl WhisperEngine {
    fn new(config: WhisperConfig) -> Result<Self> {
        info!("Loading Whisper model from: {:?}", config.model_path);

        let path = config
            .model_path
            .to_str()
            .ok_or_else(|| ParleyError::ModelLoadError("Invalid model path".to_string()))?;

        let context = WhisperContext::new_with_params(path, WhisperContextParameters::default())
            .map_err(|e| {
                ParleyError::ModelLoadError(format!("Failed to load Whisper model: {:?}", e))
            })?;

        info!("Whisper model loaded successfully");
        Ok(Self { config, context })
    }
}

impl Transcribe for WhisperEngine {
    fn transcribe(&self, samples: &[f32]) -> Result<String> {
        let mut params = FullParams::new(SamplingStrategy::Greedy { best_of: 1 });
        params.set_n_threads(self.config.n_threads);
        params.set_translate(false);
        params.set_print_special(false);
        params.set_print_progress(false);
        params.set_print_realtime(false);
        params.set_print_timestamps(false);
        if let Some(lang) = self.config.language.as_deref() {
            params.set_language(Some(lang));
        }

        let mut state = self.context.create_state().map_err(|e| {
            ParleyError::TranscriptionError(format!("Failed to create state: {:?}", e))
        })?;

        state.full(params, samples).map_err(|e| {
            ParleyError::TranscriptionError(format!("Transcription failed: {:?}", e))
        })?;

        let num_segments = state.full_n_segments().map_err(|e| {
            ParleyError::TranscriptionError(format!("Failed to get segments: {:?}", e))
        })?;

        let mut text = String::new();
        for i in 0..num_segments {
            let segment = state.full_get_segment_text(i).map_err(|e| {
                ParleyError::TranscriptionError(format!("Failed to get segment text: {:?}", e))
            })?;
            text.push_str(&segment);
        }

        Ok(clean_transcript(&text))
    }
}

/// Strip whitespace and whisper's non-speech markers such as `[BLANK_AUDIO]`
fn clean_transcript(raw: &str) -> String {
    let text = raw.trim();
    let is_marker = (text.starts_with('[') && text.ends_with(']'))
        || (text.starts_with('(') && text.ends_with(')'));
    if is_marker {
        String::new()
    } else {
        text.to_string()
    }
}

/// Cuts a stream of classified 16kHz frames into utterances
#[derive(Debug)]
struct Segmenter {
    buffer: Vec<f32>,
    in_speech: bool,
    silence: f32,
    min_segment: f32,
    max_segment: f32,
    silence_threshold: f32,
}

impl Segmenter {
    fn new(config: &WhisperConfig) -> Self {
        Self {
            buffer: Vec::new(),
            in_speech: false,
            silence: 0.0,
            min_segment: config.min_segment_duration,
            max_segment: config.max_segment_duration,
            silence_threshold: config.silence_threshold,
        }
    }

    fn duration(&self) -> f32 {
        self.buffer.len() as f32 / WHISPER_SAMPLE_RATE as f32
    }

    /// Feed one frame; returns a finished utterance when one closes
    fn push(&mut self, frame: &[f32], is_speech: bool) -> Option<Vec<f32>> {
        let frame_duration = frame.len() as f32 / WHISPER_SAMPLE_RATE as f32;

        if is_speech {
            if !self.in_speech {
                self.in_speech = true;
                self.buffer.clear();
            }
            self.buffer.extend_from_slice(frame);
            self.silence = 0.0;

            if self.duration() >= self.max_segment {
                return self.take();
            }
        } else if self.in_speech {
            self.buffer.extend_from_slice(frame);
            self.silence += frame_duration;

            if self.silence >= self.silence_threshold {
                if self.duration() >= self.min_segment {
                    return self.take();
                }
                debug!("Utterance too short ({:.2}s), discarding", self.duration());
                self.reset();
            }
        }

        None
    }

    fn take(&mut self) -> Option<Vec<f32>> {
        let segment = std::mem::take(&mut self.buffer);
        self.reset();
        Some(segment)
    }

    fn reset(&mut self) {
        self.buffer.clear();
        self.in_speech = false;
        self.silence = 0.0;
    }
}

/// Ends a listening session once the audio stays quiet for too long
#[derive(Debug)]
struct NoSpeechTimer {
    timeout: f32,
    quiet: f32,
}

impl NoSpeechTimer {
    fn new(timeout: f32) -> Self {
        Self {
            timeout,
            quiet: 0.0,
        }
    }

    /// Account for one classified frame; true once the timeout is reached
    fn advance(&mut self, frame_len: usize, is_speech: bool) -> bool {
        if is_speech {
            self.quiet = 0.0;
            return false;
        }
        self.quiet += frame_len as f32 / WHISPER_SAMPLE_RATE as f32;
        self.quiet >= self.timeout
    }
}

enum WorkerCommand {
    Begin { session: u64, sample_rate: u32 },
    End,
    Shutdown,
}

/// Work handed from the capture thread to the transcriber
#[derive(Debug, PartialEq)]
enum Job {
    Utterance { session: u64, samples: Vec<f32> },
    Finished { session: u64 },
}

/// Per-session framing state on the capture thread
struct SessionFramer {
    id: u64,
    segmenter: Segmenter,
    no_speech: NoSpeechTimer,
}

impl SessionFramer {
    fn new(id: u64, config: &WhisperConfig) -> Self {
        Self {
            id,
            segmenter: Segmenter::new(config),
            no_speech: NoSpeechTimer::new(config.no_speech_timeout),
        }
    }

    /// Feed one classified frame; `Job::Finished` is always the last job
    fn push(&mut self, frame: &[f32], is_speech: bool) -> Option<Job> {
        let utterance = self.segmenter.push(frame, is_speech);
        let timed_out = self.no_speech.advance(frame.len(), is_speech);

        // A timeout on the closing frame is reported with the next one
        if let Some(samples) = utterance {
            return Some(Job::Utterance {
                session: self.id,
                samples,
            });
        }
        timed_out.then_some(Job::Finished { session: self.id })
    }
}

struct ListeningSession {
    resampler: StreamResampler,
    framer: SessionFramer,
}

/// Whisper-backed [`SpeechRecognizer`]
pub struct WhisperRecognizer {
    mic: MicCapture,
    audio_tx: Sender<Vec<f32>>,
    command_tx: Sender<WorkerCommand>,
    event_rx: Receiver<(u64, RecognitionEvent)>,
    session: u64,
}

impl WhisperRecognizer {
    /// Open the microphone and start the capture and transcription threads
    ///
    /// # Errors
    /// Fails when the model file is missing or no microphone is available
    pub fn new(config: WhisperConfig) -> Result<Self> {
        if !config.model_path.exists() {
            return Err(ParleyError::ModelLoadError(format!(
                "Model file not found: {:?}",
                config.model_path
            )));
        }

        let mic = MicCapture::new()?;

        let (audio_tx, audio_rx) = bounded(256);
        let (command_tx, command_rx) = unbounded();
        let (job_tx, job_rx) = unbounded();
        let (event_tx, event_rx) = unbounded();

        let transcriber_config = config.clone();
        let transcriber_events = event_tx.clone();
        thread::Builder::new()
            .name("parley-whisper".to_string())
            .spawn(move || match WhisperEngine::new(transcriber_config) {
                Ok(engine) => run_transcriber(&engine, job_rx, transcriber_events),
                Err(e) => error!("Failed to initialize Whisper engine: {}", e),
            })?;

        thread::Builder::new()
            .name("parley-stt".to_string())
            .spawn(move || run_capture(config, command_rx, audio_rx, job_tx, event_tx))?;

        Ok(Self {
            mic,
            audio_tx,
            command_tx,
            event_rx,
            session: 0,
        })
    }
}

impl SpeechRecognizer for WhisperRecognizer {
    fn start(&mut self) -> Result<()> {
        self.session += 1;
        self.command_tx
            .send(WorkerCommand::Begin {
                session: self.session,
                sample_rate: self.mic.sample_rate(),
            })
            .map_err(|_| {
                ParleyError::TranscriptionError("Capture worker is not running".to_string())
            })?;
        self.mic.start(self.audio_tx.clone())
    }

    fn stop(&mut self) {
        self.mic.stop();
        let _ = self.command_tx.send(WorkerCommand::End);
    }

    fn try_recv(&mut self) -> Option<RecognitionEvent> {
        while let Ok((session, event)) = self.event_rx.try_recv() {
            if session == self.session {
                return Some(event);
            }
        }
        None
    }
}

impl Drop for WhisperRecognizer {
    fn drop(&mut self) {
        self.mic.stop();
        let _ = self.command_tx.send(WorkerCommand::Shutdown);
    }
}

fn run_capture(
    config: WhisperConfig,
    command_rx: Receiver<WorkerCommand>,
    audio_rx: Receiver<Vec<f32>>,
    job_tx: Sender<Job>,
    event_tx: Sender<(u64, RecognitionEvent)>,
) {
    info!("Capture worker started");

    let mut vad = match VoiceActivityDetector::new(config.vad_threshold) {
        Ok(vad) => vad,
        Err(e) => {
            error!("Failed to initialize VAD: {}", e);
            return;
        }
    };

    let mut session: Option<ListeningSession> = None;

    loop {
        select! {
            recv(command_rx) -> command => match command {
                Ok(WorkerCommand::Begin { session: id, sample_rate }) => {
                    vad.reset();
                    session = match StreamResampler::new(sample_rate, WHISPER_SAMPLE_RATE) {
                        Ok(resampler) => Some(ListeningSession {
                            resampler,
                            framer: SessionFramer::new(id, &config),
                        }),
                        Err(e) => {
                            let _ = event_tx.send((id, RecognitionEvent::Error(e.to_string())));
                            None
                        }
                    };
                }
                Ok(WorkerCommand::End) => {
                    session = None;
                }
                Ok(WorkerCommand::Shutdown) | Err(_) => break,
            },
            recv(audio_rx) -> chunk => {
                let Ok(chunk) = chunk else { break };
                let Some(active) = session.as_mut() else { continue };

                match feed(active, &mut vad, &chunk, &job_tx) {
                    Ok(true) => session = None,
                    Ok(false) => {}
                    Err(e) => {
                        warn!("Speech capture error: {}", e);
                        let id = active.framer.id;
                        let _ = event_tx.send((id, RecognitionEvent::Error(e.to_string())));
                        session = None;
                    }
                }
            }
        }
    }

    info!("Capture worker stopped");
}

/// Returns true once the session has finished
fn feed(
    session: &mut ListeningSession,
    vad: &mut VoiceActivityDetector,
    chunk: &[f32],
    job_tx: &Sender<Job>,
) -> Result<bool> {
    let audio = session.resampler.push(chunk)?;

    for (frame, is_speech) in vad.process(&audio) {
        let Some(job) = session.framer.push(&frame, is_speech) else {
            continue;
        };

        let finished = matches!(job, Job::Finished { .. });
        if let Job::Utterance { samples, .. } = &job {
            debug!(
                "Queued utterance of {:.2}s",
                samples.len() as f32 / WHISPER_SAMPLE_RATE as f32
            );
        }
        job_tx.send(job).map_err(|_| {
            ParleyError::TranscriptionError("Transcription worker is not running".to_string())
        })?;

        if finished {
            debug!("No speech heard, ending listening session");
            return Ok(true);
        }
    }

    Ok(false)
}

fn run_transcriber(
    engine: &impl Transcribe,
    job_rx: Receiver<Job>,
    event_tx: Sender<(u64, RecognitionEvent)>,
) {
    info!("Transcription worker started");

    let mut current = 0;
    let mut results: Vec<RecognitionResult> = Vec::new();

    for job in job_rx {
        match job {
            Job::Utterance { session, samples } => {
                if session != current {
                    current = session;
                    results.clear();
                }

                let text = match engine.transcribe(&samples) {
                    Ok(text) => text,
                    Err(e) => {
                        warn!("Transcription error: {}", e);
                        let _ = event_tx.send((session, RecognitionEvent::Error(e.to_string())));
                        continue;
                    }
                };
                if text.is_empty() {
                    continue;
                }

                let transcript = if results.is_empty() {
                    text
                } else {
                    format!(" {}", text)
                };
                results.push(RecognitionResult {
                    alternatives: vec![Alternative::new(transcript)],
                });

                let _ = event_tx.send((session, RecognitionEvent::Result(results.clone())));
            }
            Job::Finished { session } => {
                let _ = event_tx.send((session, RecognitionEvent::End));
            }
        }
    }

    info!("Transcription worker stopped");
}
