//! Microphone capture
//!
//! Captures the default input device with cpal, downmixes to mono and sends
//! sample chunks over a crossbeam channel.

use crate::{ParleyError, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, Stream, StreamConfig};
use crossbeam_channel::Sender;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{error, info, warn};

pub struct MicCapture {
    stream: Option<Stream>,
    sample_rate: u32,
    channels: u16,
    is_capturing: Arc<AtomicBool>,
    dropped: Arc<AtomicUsize>,
    device: Device,
    config: StreamConfig,
}

impl MicCapture {
    /// Open the default input device
    ///
    /// # Errors
    /// Returns an error if no input device is available or configuration fails
    pub fn new() -> Result<Self> {
        let host = cpal::default_host();

        let device = host
            .default_input_device()
            .ok_or_else(|| ParleyError::AudioDeviceError("No input device available".into()))?;

        info!(
            "Using input device: {}",
            device.name().unwrap_or_else(|_| "Unknown".to_string())
        );

        let supported_config = device.default_input_config().map_err(|e| {
            ParleyError::AudioDeviceError(format!("Failed to get input config: {}", e))
        })?;

        let config: StreamConfig = supported_config.into();

        Ok(Self {
            stream: None,
            sample_rate: config.sample_rate.0,
            channels: config.channels,
            is_capturing: Arc::new(AtomicBool::new(false)),
            dropped: Arc::new(AtomicUsize::new(0)),
            device,
            config,
        })
    }

    /// Start capturing into `audio_tx`
    pub fn start(&mut self, audio_tx: Sender<Vec<f32>>) -> Result<()> {
        if self.is_capturing.load(Ordering::SeqCst) {
            warn!("Already capturing, ignoring start request");
            return Ok(());
        }

        let channels = self.channels as usize;
        let is_capturing = Arc::clone(&self.is_capturing);
        let dropped = Arc::clone(&self.dropped);

        let stream = self
            .device
            .build_input_stream(
                &self.config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    if !is_capturing.load(Ordering::SeqCst) {
                        return;
                    }

                    let samples = if channels == 1 {
                        data.to_vec()
                    } else {
                        data.chunks(channels)
                            .map(|frame| frame.iter().sum::<f32>() / channels as f32)
                            .collect()
                    };

                    // No logging on the audio thread; drops are reported on stop
                    if audio_tx.try_send(samples).is_err() {
                        dropped.fetch_add(1, Ordering::Relaxed);
                    }
                },
                |err| error!("Audio input stream error: {}", err),
                None,
            )
            .map_err(|e| {
                ParleyError::AudioDeviceError(format!("Failed to build input stream: {}", e))
            })?;

        stream.play().map_err(|e| {
            ParleyError::AudioDeviceError(format!("Failed to start input stream: {}", e))
        })?;

        self.is_capturing.store(true, Ordering::SeqCst);
        self.stream = Some(stream);

        info!(
            "Microphone capture started: {}Hz, {} channel(s)",
            self.sample_rate, self.channels
        );
        Ok(())
    }

    /// Stop capturing
    pub fn stop(&mut self) {
        self.is_capturing.store(false, Ordering::SeqCst);
        if self.stream.take().is_some() {
            info!("Microphone capture stopped");
        }
        let dropped = self.dropped.swap(0, Ordering::Relaxed);
        if dropped > 0 {
            warn!("Dropped {} microphone chunks while capturing", dropped);
        }
    }

    pub fn is_capturing(&self) -> bool {
        self.is_capturing.load(Ordering::SeqCst)
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }
}

impl Drop for MicCapture {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::bounded;

    #[test]
    fn test_capture_start_stop() {
        // No input device in CI; only exercise the state machine when one exists
        match MicCapture::new() {
            Ok(mut mic) => {
                assert!(mic.sample_rate() > 0);
                assert!(!mic.is_capturing());

                let (tx, _rx) = bounded(10);
                if mic.start(tx).is_ok() {
                    assert!(mic.is_capturing());
                    mic.stop();
                    assert!(!mic.is_capturing());
                }
            }
            Err(e) => println!("Could not open microphone (expected in CI): {}", e),
        }
    }

    #[test]
    fn test_stop_when_not_capturing() {
        if let Ok(mut mic) = MicCapture::new() {
            mic.stop();
            assert!(!mic.is_capturing());
        }
    }
}
