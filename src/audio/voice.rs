use super::frame::StereoFrame;
use super::sample_buffer::SampleBuffer;
use super::sample_id::SampleId;

// A looping playback head over one registered buffer. Pausing keeps `pos`,
// stopping rewinds it; reaching the end wraps back to frame 0.
#[derive(Clone, Debug)]
pub struct LoopVoice {
    pub id: SampleId,
    pub buffer: SampleBuffer,
    pub pos: usize,
    pub playing: bool,
    gain: f32,        // applied at the start of the next block
    target_gain: f32, // last value the control thread asked for
}

impl LoopVoice {
    pub fn new(id: SampleId, buffer: SampleBuffer) -> Self {
        Self {
            id,
            buffer,
            pos: 0,
            playing: false,
            gain: 0.0,
            target_gain: 0.0,
        }
    }

    pub fn set_gain(&mut self, gain: f32) {
        self.target_gain = gain.clamp(0.0, 1.0);
    }

    pub fn gain(&self) -> f32 {
        self.target_gain
    }

    pub fn stop(&mut self) {
        self.playing = false;
        self.pos = 0;
    }

    pub fn render_into(&mut self, out: &mut [StereoFrame]) {
        let len = self.buffer.len();
        if !self.playing || len == 0 || out.is_empty() {
            self.gain = self.target_gain;
            return;
        }

        // linear ramp over the block so slider moves don't click
        let step = (self.target_gain - self.gain) / out.len() as f32;
        let data = &self.buffer.data;

        for frame in out.iter_mut() {
            self.gain += step;
            let s = data[self.pos];
            frame.left += s.left * self.gain;
            frame.right += s.right * self.gain;

            self.pos += 1;
            if self.pos >= len {
                self.pos = 0;
            }
        }
        self.gain = self.target_gain;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp_voice(len: usize) -> LoopVoice {
        let frames = (0..len)
            .map(|i| StereoFrame { left: i as f32, right: i as f32 })
            .collect();
        let mut v = LoopVoice::new(SampleId(0), SampleBuffer::from_frames(frames));
        v.set_gain(1.0);
        v.gain = 1.0;
        v
    }

    #[test]
    fn wraps_at_end_of_buffer() {
        let mut v = ramp_voice(3);
        v.playing = true;
        let mut out = vec![StereoFrame::zero(); 5];
        v.render_into(&mut out);
        let lefts: Vec<f32> = out.iter().map(|f| f.left).collect();
        assert_eq!(lefts, vec![0.0, 1.0, 2.0, 0.0, 1.0]);
        assert_eq!(v.pos, 2);
    }

    #[test]
    fn paused_voice_is_silent_and_keeps_position() {
        let mut v = ramp_voice(8);
        v.pos = 5;
        let mut out = vec![StereoFrame::zero(); 4];
        v.render_into(&mut out);
        assert!(out.iter().all(|f| *f == StereoFrame::zero()));
        assert_eq!(v.pos, 5);

        v.stop();
        assert_eq!(v.pos, 0);
    }
}
