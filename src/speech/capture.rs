//! One-shot microphone capture via cpal.
//!
//! Opens the default (or named) input device, records for a fixed duration
//! at the device's native rate, then down-mixes to mono and resamples to
//! 16 kHz for transcription.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::StreamConfig;
use tracing::{error, info};

/// Sample rate expected by the transcription endpoints.
pub const TARGET_SAMPLE_RATE: u32 = 16_000;

/// Record `duration` of audio. Blocks the calling thread.
pub fn record(duration: Duration, device_name: Option<&str>) -> anyhow::Result<Vec<f32>> {
    let host = cpal::default_host();

    let device = if let Some(name) = device_name {
        host.input_devices()
            .map_err(|e| anyhow::anyhow!("Failed to enumerate input devices: {e}"))?
            .find(|d| d.name().map(|n| n == name).unwrap_or(false))
            .ok_or_else(|| anyhow::anyhow!("Input device not found: {name}"))?
    } else {
        host.default_input_device()
            .ok_or_else(|| anyhow::anyhow!("No default input device available"))?
    };

    let default_config = device
        .default_input_config()
        .map_err(|e| anyhow::anyhow!("Failed to get default input config: {e}"))?;
    let native_rate = default_config.sample_rate().0;
    let channels = default_config.channels();

    info!(
        device = %device.name().unwrap_or_else(|_| "unknown".into()),
        native_rate,
        channels,
        seconds = duration.as_secs_f32(),
        "Recording command"
    );

    let stream_config = StreamConfig {
        channels,
        sample_rate: cpal::SampleRate(native_rate),
        buffer_size: cpal::BufferSize::Default,
    };

    let captured: Arc<Mutex<Vec<f32>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&captured);

    let stream = device
        .build_input_stream(
            &stream_config,
            move |data: &[f32], _info: &cpal::InputCallbackInfo| {
                if let Ok(mut buf) = sink.lock() {
                    buf.extend_from_slice(data);
                }
            },
            move |err| {
                error!("Audio input stream error: {}", err);
            },
            None,
        )
        .map_err(|e| anyhow::anyhow!("Failed to build input stream: {e}"))?;

    stream
        .play()
        .map_err(|e| anyhow::anyhow!("Failed to start input stream: {e}"))?;
    std::thread::sleep(duration);
    drop(stream);

    let raw = captured
        .lock()
        .map(|buf| buf.clone())
        .map_err(|_| anyhow::anyhow!("capture buffer poisoned"))?;

    let mono = to_mono(&raw, channels);
    Ok(resample_linear(&mono, native_rate, TARGET_SAMPLE_RATE))
}

/// Simple linear resampler from `from_rate` to `to_rate` (mono).
pub fn resample_linear(input: &[f32], from_rate: u32, to_rate: u32) -> Vec<f32> {
    if from_rate == to_rate {
        return input.to_vec();
    }
    let ratio = from_rate as f64 / to_rate as f64;
    let out_len = ((input.len() as f64) / ratio).floor() as usize;
    let mut output = Vec::with_capacity(out_len);
    for i in 0..out_len {
        let src_idx = i as f64 * ratio;
        let idx0 = src_idx.floor() as usize;
        let frac = (src_idx - idx0 as f64) as f32;
        let s0 = input.get(idx0).copied().unwrap_or(0.0);
        let s1 = input.get(idx0 + 1).copied().unwrap_or(s0);
        output.push(s0 + frac * (s1 - s0));
    }
    output
}

/// Down-mix interleaved multi-channel audio to mono by averaging.
pub fn to_mono(samples: &[f32], channels: u16) -> Vec<f32> {
    if channels <= 1 {
        return samples.to_vec();
    }
    let ch = channels as usize;
    samples
        .chunks_exact(ch)
        .map(|frame| frame.iter().sum::<f32>() / ch as f32)
        .collect()
}
