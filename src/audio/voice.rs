use super::frame::StereoFrame;
use super::sample_buffer::SampleBuffer;

// What happened to a voice during one render call
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RenderOutcome {
    Idle,
    Playing,
    Ended, // reached the end of a non-looped clip in this block
}

// A clip voice bound to one registered sample. Position is in frames and
// fractional so rate changes don't step.
#[derive(Clone, Debug)]
pub struct ClipVoice {
    pub sample: usize, // index into the engine's sample table
    pub pos: f64,
    pub rate: f32,
    pub volume: f32,
    pub looped: bool,
    pub playing: bool,
}

impl ClipVoice {
    pub fn new(sample: usize, volume: f32, looped: bool) -> Self {
        Self {
            sample,
            pos: 0.0,
            rate: 1.0,
            volume,
            looped,
            playing: false,
        }
    }

    pub fn seek(&mut self, frame: usize, len: usize) {
        self.pos = frame.min(len) as f64;
    }

    pub fn render_into(&mut self, buffer: &SampleBuffer, out: &mut [StereoFrame]) -> RenderOutcome {
        if !self.playing {
            return RenderOutcome::Idle;
        }
        let len = buffer.len();
        if len == 0 {
            self.playing = false;
            return RenderOutcome::Ended;
        }
        let data = &buffer.data;
        let step = self.rate.max(0.0) as f64;

        for frame in out.iter_mut() {
            if self.pos >= len as f64 {
                if self.looped {
                    self.pos %= len as f64;
                } else {
                    self.playing = false;
                    self.pos = 0.0;
                    return RenderOutcome::Ended;
                }
            }

            let i = self.pos as usize;
            let frac = (self.pos - i as f64) as f32;
            let s0 = data[i];
            // a looped clip interpolates across the seam back to its start
            let s1 = match data.get(i + 1) {
                Some(s) => *s,
                None if self.looped => data[0],
                None => s0,
            };
            frame.mix_in(s0.lerp(s1, frac), self.volume);

            self.pos += step;
        }
        RenderOutcome::Playing
    }
}
