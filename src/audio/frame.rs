// One stereo frame, the unit the engine mixes in
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct StereoFrame {
    pub left: f32,
    pub right: f32,
}

impl StereoFrame {
    pub fn silent() -> Self {
        Self::default()
    }

    pub fn mono(x: f32) -> Self {
        Self { left: x, right: x }
    }

    // blend towards `other` by t in [0, 1]
    #[inline]
    pub fn lerp(self, other: StereoFrame, t: f32) -> Self {
        Self {
            left: self.left * (1.0 - t) + other.left * t,
            right: self.right * (1.0 - t) + other.right * t,
        }
    }

    #[inline]
    pub fn mix_in(&mut self, other: StereoFrame, gain: f32) {
        self.left += other.left * gain;
        self.right += other.right * gain;
    }

    pub fn downmix(self) -> f32 {
        (self.left + self.right) * 0.5
    }
}
