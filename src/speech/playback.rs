//! Blocking PCM playback via rodio.

use rodio::buffer::SamplesBuffer;
use rodio::{OutputStream, Sink};

/// Plays f32 PCM samples through the default output device.
///
/// `OutputStream` is not `Send`, so create the player on the thread that
/// plays.
pub struct AudioPlayer {
    _stream: OutputStream,
    sink: Sink,
}

impl AudioPlayer {
    /// Open the default audio output device.
    pub fn new() -> anyhow::Result<Self> {
        let (stream, stream_handle) = OutputStream::try_default()
            .map_err(|e| anyhow::anyhow!("Failed to open audio output: {}", e))?;
        let sink = Sink::try_new(&stream_handle)
            .map_err(|e| anyhow::anyhow!("Failed to create audio sink: {}", e))?;

        Ok(Self {
            _stream: stream,
            sink,
        })
    }

    /// Play mono samples at `sample_rate`, blocking until done.
    pub fn play(&self, samples: Vec<f32>, sample_rate: u32) {
        if samples.is_empty() {
            return;
        }
        self.sink.append(SamplesBuffer::new(1, sample_rate, samples));
        self.sink.sleep_until_end();
    }

    /// Set playback volume (0.0 = silent, 1.0 = full volume).
    pub fn set_volume(&self, volume: f32) {
        self.sink.set_volume(volume.clamp(0.0, 1.0));
    }
}
