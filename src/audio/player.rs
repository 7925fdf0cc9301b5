//! Playback of reply audio the backend links to
//!
//! The player thread fetches the file, decodes it with rodio and starts it
//! on a fresh sink, so a new reply never waits behind the previous one.

use crate::backend::PROXY_WARNING_HEADER;
use crate::config::BackendConfig;
use crate::{ParleyError, Result};
use crossbeam_channel::{unbounded, Sender};
use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink, Source};
use std::io::Cursor;
use std::thread;
use tracing::{debug, error, info};

/// Something that can play audio from a URL
pub trait AudioUrlPlayer {
    fn play_url(&mut self, url: &str) -> Result<()>;
}

enum PlayerCommand {
    Play(String),
    Shutdown,
}

pub struct RemoteAudioPlayer {
    command_tx: Sender<PlayerCommand>,
}

impl RemoteAudioPlayer {
    /// Start the playback thread
    pub fn spawn(config: &BackendConfig) -> Result<Self> {
        let mut builder = reqwest::blocking::Client::builder();
        if config.skip_proxy_warning {
            let mut headers = reqwest::header::HeaderMap::new();
            headers.insert(
                PROXY_WARNING_HEADER,
                reqwest::header::HeaderValue::from_static("true"),
            );
            builder = builder.default_headers(headers);
        }
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }

        let (command_tx, command_rx) = unbounded();

        thread::Builder::new()
            .name("parley-player".to_string())
            .spawn(move || {
                // reqwest's blocking client must not be built inside an async context.
                let client = match builder.build() {
                    Ok(client) => client,
                    Err(e) => {
                        error!("Failed to build audio HTTP client: {}", e);
                        return;
                    }
                };

                let (_stream, stream_handle) = match OutputStream::try_default() {
                    Ok(output) => output,
                    Err(e) => {
                        error!("No audio output for reply playback: {}", e);
                        return;
                    }
                };

                let mut sinks = ReplySinks::default();

                info!("Reply audio player ready");

                while let Ok(command) = command_rx.recv() {
                    match command {
                        PlayerCommand::Play(url) => {
                            let played = fetch(&client, &url).and_then(|bytes| {
                                let source = Decoder::new(Cursor::new(bytes)).map_err(|e| {
                                    ParleyError::PlaybackError(format!("Decode failed: {}", e))
                                })?;
                                let source = Box::new(source.convert_samples::<f32>());
                                sinks.play(&stream_handle, source)
                            });
                            match played {
                                Ok(()) => debug!("Playing reply audio {}", url),
                                Err(e) => error!("Audio playback failed for {}: {}", url, e),
                            }
                        }
                        PlayerCommand::Shutdown => break,
                    }
                }

                sinks.stop();
                info!("Reply audio player stopped");
            })?;

        Ok(Self { command_tx })
    }
}

impl AudioUrlPlayer for RemoteAudioPlayer {
    fn play_url(&mut self, url: &str) -> Result<()> {
        self.command_tx
            .send(PlayerCommand::Play(url.to_string()))
            .map_err(|_| ParleyError::PlaybackError("Audio player is not running".to_string()))
    }
}

impl Drop for RemoteAudioPlayer {
    fn drop(&mut self) {
        let _ = self.command_tx.send(PlayerCommand::Shutdown);
    }
}

/// One sink per reply, pruned once drained
#[derive(Default)]
struct ReplySinks {
    sinks: Vec<Sink>,
}

impl ReplySinks {
    fn play(
        &mut self,
        handle: &OutputStreamHandle,
        source: Box<dyn Source<Item = f32> + Send>,
    ) -> Result<()> {
        self.sinks.retain(|sink| !sink.empty());

        let sink = Sink::try_new(handle).map_err(|e| {
            ParleyError::PlaybackError(format!("Failed to create playback sink: {}", e))
        })?;
        sink.append(source);
        self.sinks.push(sink);
        Ok(())
    }

    fn active(&self) -> usize {
        self.sinks.iter().filter(|sink| !sink.empty()).count()
    }

    fn stop(&mut self) {
        for sink in self.sinks.drain(..) {
            sink.stop();
        }
    }
}

fn fetch(client: &reqwest::blocking::Client, url: &str) -> Result<Vec<u8>> {
    let response = client
        .get(url)
        .send()
        .map_err(|e| ParleyError::PlaybackError(format!("Fetch failed: {}", e)))?;

    let status = response.status();
    if !status.is_success() {
        return Err(ParleyError::PlaybackError(format!(
            "Fetch failed with status {}",
            status
        )));
    }

    let bytes = response
        .bytes()
        .map_err(|e| ParleyError::PlaybackError(format!("Read failed: {}", e)))?;
    Ok(bytes.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rodio::source::SineWave;
    use std::time::Duration;

    fn tone() -> Box<dyn Source<Item = f32> + Send> {
        Box::new(
            SineWave::new(440.0)
                .take_duration(Duration::from_secs(2))
                .amplify(0.0),
        )
    }

    #[test]
    fn test_replies_play_side_by_side() {
        // No output device in CI; only exercise playback when one exists
        let Ok((_stream, handle)) = OutputStream::try_default() else {
            return;
        };

        let mut sinks = ReplySinks::default();
        sinks.play(&handle, tone()).unwrap();
        sinks.play(&handle, tone()).unwrap();
        assert_eq!(sinks.active(), 2);

        sinks.stop();
        assert_eq!(sinks.active(), 0);
    }
}
