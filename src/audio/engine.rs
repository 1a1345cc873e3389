use crossbeam_channel::Sender;

use crate::audio_api::{AudioCommand, AudioEvent, ClipId, RejectReason};

use super::frame::StereoFrame;
use super::sample_buffer::{SampleBuffer, SampleId};
use super::voice::{ClipVoice, RenderOutcome};

// Room reserved up front; the callback never grows past it. AudioHandle
// refuses commands beyond these limits before they reach the engine.
pub const MAX_CLIPS: usize = 64;
pub const MAX_SAMPLES: usize = 16;

pub struct Engine {
    unlocked: bool,
    samples: Vec<(SampleId, SampleBuffer)>,
    clips: Vec<Option<ClipVoice>>, // indexed by ClipId
    events_tx: Option<Sender<AudioEvent>>,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine {
    pub fn new() -> Self {
        Self {
            unlocked: false,
            samples: Vec::with_capacity(MAX_SAMPLES),
            clips: Vec::with_capacity(MAX_CLIPS),
            events_tx: None,
        }
    }

    pub fn set_events_tx(&mut self, tx: Sender<AudioEvent>) {
        self.events_tx = Some(tx);
    }

    pub fn handle_cmd(&mut self, cmd: AudioCommand) {
        match cmd {
            AudioCommand::RegisterSample { id, buffer } => {
                // first registration wins; bound clips refer to samples by index
                let known = self.samples.iter().any(|(existing, _)| *existing == id);
                if !known && self.samples.len() < MAX_SAMPLES {
                    self.samples.push((id, buffer));
                }
            }
            AudioCommand::BindClip { clip, sample, volume, looped } => {
                let Some(index) = self.samples.iter().position(|(id, _)| *id == sample) else {
                    return;
                };
                let slot = clip.0 as usize;
                if slot >= MAX_CLIPS {
                    return;
                }
                if self.clips.len() <= slot {
                    self.clips.resize(slot + 1, None);
                }
                self.clips[slot] = Some(ClipVoice::new(index, volume, looped));
            }
            AudioCommand::Play { clip } => self.play(clip),
            AudioCommand::Pause { clip } => {
                if let Some(v) = self.voice_mut(clip) {
                    v.playing = false;
                }
            }
            AudioCommand::Seek { clip, frame } => {
                let Some(v) = self.clips.get_mut(clip.0 as usize).and_then(Option::as_mut) else {
                    return;
                };
                let len = self.samples.get(v.sample).map_or(0, |(_, b)| b.len());
                v.seek(frame, len);
            }
            AudioCommand::SetRate { clip, rate } => {
                if let Some(v) = self.voice_mut(clip) {
                    v.rate = rate;
                }
            }
            AudioCommand::SetVolume { clip, volume } => {
                if let Some(v) = self.voice_mut(clip) {
                    v.volume = volume;
                }
            }
            AudioCommand::Unlock => self.unlocked = true,
        }
    }

    fn play(&mut self, clip: ClipId) {
        if !self.unlocked {
            self.emit(AudioEvent::PlayRejected { clip, reason: RejectReason::Locked });
            return;
        }
        match self.voice_mut(clip) {
            Some(v) => v.playing = true,
            None => self.emit(AudioEvent::PlayRejected { clip, reason: RejectReason::Unbound }),
        }
    }

    fn voice_mut(&mut self, clip: ClipId) -> Option<&mut ClipVoice> {
        self.clips.get_mut(clip.0 as usize).and_then(Option::as_mut)
    }

    fn emit(&self, event: AudioEvent) {
        if let Some(tx) = &self.events_tx {
            let _ = tx.try_send(event);
        }
    }

    pub fn is_playing(&self, clip: ClipId) -> bool {
        self.clips
            .get(clip.0 as usize)
            .and_then(Option::as_ref)
            .is_some_and(|v| v.playing)
    }

    // Mix every playing clip into `out`, which is cleared first
    pub fn render_block(&mut self, out: &mut [StereoFrame]) {
        out.fill(StereoFrame::silent());
        for (i, slot) in self.clips.iter_mut().enumerate() {
            let Some(voice) = slot else { continue };
            let Some((_, buffer)) = self.samples.get(voice.sample) else { continue };
            if voice.render_into(buffer, out) == RenderOutcome::Ended {
                if let Some(tx) = &self.events_tx {
                    let _ = tx.try_send(AudioEvent::Ended { clip: ClipId(i as u32) });
                }
            }
        }
    }
}
