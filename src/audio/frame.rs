// One stereo frame; the unit the audio thread mixes in
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct StereoFrame {
    pub left: f32,
    pub right: f32,
}

impl StereoFrame {
    pub fn zero() -> Self {
        Self::default()
    }

    pub fn mono(self) -> f32 {
        0.5 * (self.left + self.right)
    }
}
