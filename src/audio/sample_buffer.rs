use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

use thiserror::Error;

use super::frame::StereoFrame;

static NEXT_ID: AtomicU64 = AtomicU64::new(0);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SampleId(pub u64);

// atomic counter so ids stay unique no matter which thread decodes
pub fn next_sample_id() -> SampleId {
    SampleId(NEXT_ID.fetch_add(1, Ordering::Relaxed))
}

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("WAV decode error: {0}")]
    Wav(#[from] hound::Error),
    #[error("unsupported WAV layout: {0}")]
    UnsupportedFormat(String),
}

#[derive(Clone, Debug, Default)]
pub struct SampleBuffer {
    pub data: Vec<StereoFrame>,
}

impl SampleBuffer {
    pub fn new(data: Vec<StereoFrame>) -> Self {
        Self { data }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    // Decode a WAV file into stereo frames at `target_rate`
    pub fn load_wav(path: &Path, target_rate: u32) -> Result<Self, LoadError> {
        let reader = hound::WavReader::open(path)?;
        Self::decode(reader, target_rate)
    }

    fn decode<R: std::io::Read>(
        mut reader: hound::WavReader<R>,
        target_rate: u32,
    ) -> Result<Self, LoadError> {
        let spec = reader.spec();

        let samples: Vec<f32> = match spec.sample_format {
            hound::SampleFormat::Float => reader.samples::<f32>().collect::<Result<Vec<_>, _>>()?,
            hound::SampleFormat::Int => {
                // full scale of a signed int with this many bits
                let max = (1i64 << (spec.bits_per_sample - 1)) as f32;
                reader
                    .samples::<i32>()
                    .map(|s| s.map(|x| x as f32 / max))
                    .collect::<Result<Vec<_>, _>>()?
            }
        };

        let frames: Vec<StereoFrame> = match spec.channels {
            1 => samples.into_iter().map(StereoFrame::mono).collect(),
            2 => samples
                .chunks_exact(2)
                .map(|c| StereoFrame { left: c[0], right: c[1] })
                .collect(),
            n => {
                return Err(LoadError::UnsupportedFormat(format!("{} channels", n)));
            }
        };

        Ok(Self::new(resample_linear(&frames, spec.sample_rate, target_rate)))
    }
}

// Plain linear interpolation; clips are short one-shots and loops so this is
// good enough for matching the device rate.
fn resample_linear(frames: &[StereoFrame], source_rate: u32, target_rate: u32) -> Vec<StereoFrame> {
    if source_rate == target_rate || frames.is_empty() || source_rate == 0 {
        return frames.to_vec();
    }
    let ratio = target_rate as f64 / source_rate as f64;
    let out_len = (frames.len() as f64 * ratio).ceil() as usize;
    let last = frames.len() - 1;

    (0..out_len)
        .map(|i| {
            let src_pos = i as f64 / ratio;
            let idx = src_pos.floor() as usize;
            if idx >= last {
                frames[last]
            } else {
                let frac = (src_pos - idx as f64) as f32;
                frames[idx].lerp(frames[idx + 1], frac)
            }
        })
        .collect()
}
