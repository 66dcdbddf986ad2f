use std::path::Path;
use std::sync::Arc;

use anyhow::Context;

use super::frame::StereoFrame;

// Decoded, device-rate audio for one sound. Shared with the audio thread
// behind an Arc so registering never copies the frames.
#[derive(Clone, Debug)]
pub struct SampleBuffer {
    pub data: Arc<[StereoFrame]>,
}

impl SampleBuffer {
    pub fn from_frames(frames: Vec<StereoFrame>) -> Self {
        Self { data: frames.into() }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    // Decode a WAV file and convert it to stereo frames at `target_rate`
    pub fn load_wav(path: &Path, target_rate: u32) -> anyhow::Result<Self> {
        let mut reader = hound::WavReader::open(path)
            .with_context(|| format!("cannot open {}", path.display()))?;
        let spec = reader.spec();

        let samples: Vec<f32> = match spec.sample_format {
            hound::SampleFormat::Float => reader
                .samples::<f32>()
                .collect::<Result<Vec<_>, _>>()?,
            hound::SampleFormat::Int => {
                let max = (1i64 << (spec.bits_per_sample - 1)) as f32;
                reader
                    .samples::<i32>()
                    .map(|s| s.map(|x| x as f32 / max))
                    .collect::<Result<Vec<_>, _>>()?
            }
        };

        let channels = spec.channels.max(1) as usize;
        let frames: Vec<StereoFrame> = samples
            .chunks_exact(channels)
            .map(|c| match c {
                [m] => StereoFrame { left: *m, right: *m }, // mono, duplicate
                [l, r, ..] => StereoFrame { left: *l, right: *r }, // extra channels dropped
                [] => StereoFrame::zero(),
            })
            .collect();

        if frames.is_empty() {
            anyhow::bail!("{} contains no audio", path.display());
        }

        let frames = if spec.sample_rate != target_rate {
            resample_linear(&frames, spec.sample_rate, target_rate)
        } else {
            frames
        };
        Ok(Self::from_frames(frames))
    }
}

fn resample_linear(frames: &[StereoFrame], source_rate: u32, target_rate: u32) -> Vec<StereoFrame> {
    let ratio = target_rate as f64 / source_rate as f64;
    let out_len = (frames.len() as f64 * ratio).ceil() as usize;
    let last = frames.len().saturating_sub(1);

    (0..out_len)
        .map(|i| {
            let src_pos = i as f64 / ratio;
            let idx = src_pos.floor() as usize;
            if idx >= last {
                return frames[last];
            }
            let t = (src_pos - idx as f64) as f32;
            let (a, b) = (frames[idx], frames[idx + 1]);
            StereoFrame {
                left: a.left + (b.left - a.left) * t,
                right: a.right + (b.right - a.right) * t,
            }
        })
        .collect()
}
