use std::time::Duration;

use crate::audio_api::{AudioOutput, ClipId};
use crate::pool::{ClipLease, SoundPool};
use crate::shared::{PULSE_PERIOD, PadView};

// how much of each pulse period the pad glows for
const GLOW_FRACTION: f64 = 0.4;

// Re-triggers the glow animation every PULSE_PERIOD while a pad is held
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pulse {
    pub fired_at: Duration,
    pub next_at: Duration,
}

impl Pulse {
    fn start(now: Duration) -> Self {
        Self { fired_at: now, next_at: now + PULSE_PERIOD }
    }

    // returns how many cycles fired since the last call
    fn tick(&mut self, now: Duration) -> u32 {
        let mut fired = 0;
        while now >= self.next_at {
            self.fired_at = self.next_at;
            self.next_at += PULSE_PERIOD;
            fired += 1;
        }
        fired
    }

    fn glowing(&self, now: Duration) -> bool {
        let since = now.saturating_sub(self.fired_at).as_secs_f64();
        since < PULSE_PERIOD.as_secs_f64() * GLOW_FRACTION
    }
}

// A hold-to-play pad. Idle -> Playing on press, back to Idle on release.
#[derive(Debug)]
pub struct Pad {
    pub label: String,
    pub sound: String,
    pub key: char,
    playing: bool,
    lease: Option<ClipLease>, // borrowed from the pool while playing
    pulse: Option<Pulse>,
}

impl Pad {
    pub fn new(label: impl Into<String>, sound: impl Into<String>, key: char) -> Self {
        Self {
            label: label.into(),
            sound: sound.into(),
            key,
            playing: false,
            lease: None,
            pulse: None,
        }
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn lease(&self) -> Option<ClipLease> {
        self.lease
    }

    pub fn pulse(&self) -> Option<Pulse> {
        self.pulse
    }

    pub fn holds(&self, clip: ClipId) -> bool {
        self.lease.is_some_and(|l| l.clip == clip)
    }

    pub fn press<O: AudioOutput>(&mut self, pool: &mut SoundPool<O>, now: Duration) {
        if self.playing {
            return;
        }
        let Some(lease) = pool.acquire(&self.sound) else {
            return; // unknown sound, already logged by the pool
        };
        if let Err(e) = pool.play(lease) {
            log::warn!("pad '{}': playback failed to start: {}", self.label, e);
            // a taken-over handle may still carry its previous holder's loop
            if pool.is_playing(lease) {
                if let Err(e) = pool.stop(lease) {
                    log::warn!("pad '{}': could not stop clip: {}", self.label, e);
                }
            }
            pool.release(lease);
            return;
        }
        log::debug!("pad '{}' playing on {:?}", self.label, lease.clip);
        self.playing = true;
        self.lease = Some(lease);
        self.pulse = Some(Pulse::start(now));
    }

    pub fn release<O: AudioOutput>(&mut self, pool: &mut SoundPool<O>) {
        if !self.playing {
            return;
        }
        if let Some(lease) = self.lease.take() {
            if pool.is_current(lease) {
                if let Err(e) = pool.stop(lease) {
                    log::warn!("pad '{}': could not stop clip: {}", self.label, e);
                }
                pool.release(lease);
            } else if let Err(e) = pool.stop_unowned(lease.clip) {
                // taken over: the new holder owns the sound, unless its start
                // failed and left the loop running with no one holding it
                log::warn!("pad '{}': could not stop clip: {}", self.label, e);
            }
        }
        log::debug!("pad '{}' idle", self.label);
        self.playing = false;
        self.pulse = None;
    }

    // The engine refused to start our clip: back to Idle without claiming it
    pub fn playback_rejected<O: AudioOutput>(&mut self, pool: &mut SoundPool<O>) {
        if let Some(lease) = self.lease.take() {
            log::warn!("pad '{}': playback rejected, staying idle", self.label);
            pool.release(lease);
        }
        self.playing = false;
        self.pulse = None;
    }

    pub fn tick(&mut self, now: Duration) -> u32 {
        self.pulse.as_mut().map_or(0, |p| p.tick(now))
    }

    // Lit only while this pad still owns the sound it started
    pub fn view<O: AudioOutput>(&self, pool: &SoundPool<O>, now: Duration) -> PadView {
        let active = self.playing && self.lease.is_some_and(|l| pool.is_current(l));
        PadView {
            label: self.label.clone(),
            key: self.key,
            active,
            glow: active && self.pulse.is_some_and(|p| p.glowing(now)),
            silent: !pool.contains(&self.sound),
        }
    }
}
