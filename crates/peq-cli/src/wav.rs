//! WAV file reading and writing, one buffer per channel.

use hound::{SampleFormat, WavReader, WavWriter};
use std::path::Path;

/// Error types for WAV I/O.
#[derive(Debug, thiserror::Error)]
pub enum WavError {
    /// WAV file read/write error.
    #[error("WAV file error: {0}")]
    Wav(#[from] hound::Error),

    /// Output bit depth the writer does not support.
    #[error("Unsupported bit depth: {0} (expected 16, 24 or 32)")]
    UnsupportedBitDepth(u16),

    /// Channel buffers passed to the writer differ in length or count.
    #[error("Expected {expected} channel(s) of equal length, got {actual}")]
    ChannelMismatch {
        /// Channel count from the `WavSpec`.
        expected: u16,
        /// Description of what was passed.
        actual: String,
    },
}

/// Result alias for WAV operations.
pub type Result<T> = std::result::Result<T, WavError>;

/// WAV file specification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WavSpec {
    /// Number of audio channels.
    pub channels: u16,
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Bit depth per sample. 32 is written as float, lower depths as integer PCM.
    pub bits_per_sample: u16,
}

impl Default for WavSpec {
    fn default() -> Self {
        Self {
            channels: 2,
            sample_rate: 48000,
            bits_per_sample: 32,
        }
    }
}

impl From<hound::WavSpec> for WavSpec {
    fn from(spec: hound::WavSpec) -> Self {
        Self {
            channels: spec.channels,
            sample_rate: spec.sample_rate,
            bits_per_sample: spec.bits_per_sample,
        }
    }
}

impl From<WavSpec> for hound::WavSpec {
    fn from(spec: WavSpec) -> Self {
        hound::WavSpec {
            channels: spec.channels,
            sample_rate: spec.sample_rate,
            bits_per_sample: spec.bits_per_sample,
            sample_format: if spec.bits_per_sample == 32 {
                SampleFormat::Float
            } else {
                SampleFormat::Int
            },
        }
    }
}

/// Read a WAV file into one `Vec<f32>` per channel.
///
/// Integer PCM is scaled to [-1.0, 1.0). A trailing partial frame is dropped.
pub fn read_wav_channels<P: AsRef<Path>>(path: P) -> Result<(Vec<Vec<f32>>, WavSpec)> {
    let reader = WavReader::open(path)?;
    let spec = WavSpec::from(reader.spec());
    let channels = spec.channels.max(1) as usize;

    let interleaved: Vec<f32> = match reader.spec().sample_format {
        SampleFormat::Float => reader
            .into_samples::<f32>()
            .collect::<std::result::Result<Vec<_>, _>>()?,
        SampleFormat::Int => {
            let max_val = (1i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|v| v as f32 / max_val))
                .collect::<std::result::Result<Vec<_>, _>>()?
        }
    };

    let frames = interleaved.len() / channels;
    let mut out: Vec<Vec<f32>> = (0..channels).map(|_| Vec::with_capacity(frames)).collect();
    for frame in interleaved.chunks_exact(channels) {
        for (buffer, &sample) in out.iter_mut().zip(frame) {
            buffer.push(sample);
        }
    }

    Ok((out, spec))
}

/// Write one buffer per channel to a WAV file.
///
/// Integer output is clamped to the representable range.
pub fn write_wav_channels<P: AsRef<Path>>(path: P, channels: &[Vec<f32>], spec: WavSpec) -> Result<()> {
    if !matches!(spec.bits_per_sample, 16 | 24 | 32) {
        return Err(WavError::UnsupportedBitDepth(spec.bits_per_sample));
    }
    let frames = channels.first().map_or(0, Vec::len);
    if channels.len() != spec.channels as usize || channels.iter().any(|c| c.len() != frames) {
        return Err(WavError::ChannelMismatch {
            expected: spec.channels,
            actual: format!(
                "lengths {:?}",
                channels.iter().map(Vec::len).collect::<Vec<_>>()
            ),
        });
    }

    let mut writer = WavWriter::create(path, hound::WavSpec::from(spec))?;

    if spec.bits_per_sample == 32 {
        for i in 0..frames {
            for channel in channels {
                writer.write_sample(channel[i])?;
            }
        }
    } else {
        let max_val = (1i32 << (spec.bits_per_sample - 1)) as f32;
        for i in 0..frames {
            for channel in channels {
                let int_sample = (channel[i] * max_val).clamp(-max_val, max_val - 1.0) as i32;
                writer.write_sample(int_sample)?;
            }
        }
    }

    writer.finalize()?;
    Ok(())
}
