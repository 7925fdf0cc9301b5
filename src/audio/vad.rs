use crate::{ParleyError, Result};
use tracing::info;
use voice_activity_detector::VoiceActivityDetector as VadDetector;

/// Samples per VAD frame at 16kHz (32ms)
pub const VAD_CHUNK_16KHZ: usize = 512;

/// Voice Activity Detection using Silero VAD
///
/// Input may arrive in any chunk size; it is regrouped into the fixed frames
/// the model expects.
pub struct VoiceActivityDetector {
    detector: VadDetector,
    threshold: f32,
    pending: Vec<f32>,
}

impl VoiceActivityDetector {
    /// Create a VAD for 16kHz mono audio
    ///
    /// # Arguments
    /// * `threshold` - Probability threshold for speech detection (0.0-1.0)
    pub fn new(threshold: f32) -> Result<Self> {
        let detector = VadDetector::builder()
            .sample_rate(16000)
            .chunk_size(VAD_CHUNK_16KHZ)
            .build()
            .map_err(|e| {
                ParleyError::AudioProcessingError(format!("Failed to create VAD: {:?}", e))
            })?;

        info!("Initialized VAD with threshold: {}", threshold);

        Ok(Self {
            detector,
            threshold: threshold.clamp(0.0, 1.0),
            pending: Vec::with_capacity(VAD_CHUNK_16KHZ * 2),
        })
    }

    /// Classify incoming audio, one verdict per complete frame.
    ///
    /// Returns `(frame, is_speech)` pairs; a trailing partial frame is kept
    /// for the next call.
    pub fn process(&mut self, audio: &[f32]) -> Vec<(Vec<f32>, bool)> {
        self.pending.extend_from_slice(audio);

        let mut frames = Vec::new();
        while self.pending.len() >= VAD_CHUNK_16KHZ {
            let frame: Vec<f32> = self.pending.drain(..VAD_CHUNK_16KHZ).collect();
            let probability = self.detector.predict(frame.iter().copied());
            frames.push((frame, probability >= self.threshold));
        }
        frames
    }

    /// Reset the VAD session state
    pub fn reset(&mut self) {
        self.detector.reset();
        self.pending.clear();
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }
}
