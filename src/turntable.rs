// Drag-to-scratch turntable.
//
// Idle -> Dragging -> Idle, with a moving / not-moving flag while dragging.
// The pointer angle around the platter centre is sampled on every move; the
// change since the last sample spins the platter visual and, once it clears
// the motion threshold, plays the scratch clip at a rate that follows the
// angular velocity. Holding still (or only jittering) silences the clip.

use std::time::Duration;

use crate::audio_api::{AudioOutput, ClipId};
use crate::pool::{ClipLease, SoundPool};
use crate::shared::{
    DEFAULT_VOLUME, DeckId, DeckView, MAX_RATE, MIN_RATE, MOTION_THRESHOLD_DEG, Point,
    RATE_PER_VELOCITY,
};

// Angle of `p` around the surface centre in degrees, in (-180, 180]
pub fn angle_of(p: Point) -> f64 {
    p.y.atan2(p.x).to_degrees()
}

// Signed change from `from` to `to`, folded into (-180, 180] so crossing the
// ±180 seam doesn't read as a near full turn
pub fn angle_delta(from: f64, to: f64) -> f64 {
    let mut d = to - from;
    if d > 180.0 {
        d -= 360.0;
    }
    if d <= -180.0 {
        d += 360.0;
    }
    d
}

// degrees/ms -> playback rate multiplier
pub fn rate_for_velocity(velocity: f64) -> f32 {
    ((1.0 + velocity * RATE_PER_VELOCITY) as f32).clamp(MIN_RATE, MAX_RATE)
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct Drag {
    last_angle: f64,
    last_time: Duration,
    moving: bool,
}

#[derive(Debug)]
pub struct Turntable {
    pub deck: DeckId,
    drag: Option<Drag>, // Some while dragging; carries the last sample
    rotation: f64,      // unbounded, visual only
    velocity: f64,      // degrees/ms
    ring_active: bool,
    scratch: Option<ClipLease>,
}

impl Turntable {
    // `scratch` is this deck's own clip; without one the platter still
    // spins, it just makes no sound
    pub fn new(deck: DeckId, scratch: Option<ClipLease>) -> Self {
        Self {
            deck,
            drag: None,
            rotation: 0.0,
            velocity: 0.0,
            ring_active: false,
            scratch,
        }
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    pub fn is_moving(&self) -> bool {
        self.drag.is_some_and(|d| d.moving)
    }

    pub fn rotation(&self) -> f64 {
        self.rotation
    }

    pub fn velocity(&self) -> f64 {
        self.velocity
    }

    pub fn ring_active(&self) -> bool {
        self.ring_active
    }

    pub fn scratch(&self) -> Option<ClipLease> {
        self.scratch
    }

    pub fn holds(&self, clip: ClipId) -> bool {
        self.scratch.is_some_and(|l| l.clip == clip)
    }

    pub fn start_drag(&mut self, at: Point, now: Duration) {
        if self.drag.is_some() {
            return;
        }
        self.drag = Some(Drag {
            last_angle: angle_of(at),
            last_time: now,
            moving: false,
        });
        self.velocity = 0.0;
        log::debug!("deck {} drag start at {:.1}°", self.deck.0, angle_of(at));
    }

    pub fn on_move<O: AudioOutput>(&mut self, pool: &mut SoundPool<O>, at: Point, now: Duration) {
        let Some(mut drag) = self.drag else {
            return;
        };
        let angle = angle_of(at);
        let delta = angle_delta(drag.last_angle, angle);
        self.rotation += delta;

        if delta.abs() > MOTION_THRESHOLD_DEG {
            drag.moving = true;
            self.ensure_scratching(pool);
            self.ring_active = true;

            let elapsed_ms = now.saturating_sub(drag.last_time).as_secs_f64() * 1000.0;
            if elapsed_ms > 0.0 {
                self.velocity = delta.abs() / elapsed_ms;
                if let Some(lease) = self.scratch {
                    if let Err(e) = pool.set_rate(lease, rate_for_velocity(self.velocity)) {
                        log::warn!("deck {}: could not set scratch rate: {}", self.deck.0, e);
                    }
                }
            }
        } else if drag.moving {
            drag.moving = false;
            self.velocity = 0.0;
            self.silence(pool);
            self.ring_active = false;
        }

        drag.last_angle = angle;
        drag.last_time = now;
        self.drag = Some(drag);
    }

    pub fn end_drag<O: AudioOutput>(&mut self, pool: &mut SoundPool<O>) {
        if self.drag.take().is_none() {
            return;
        }
        self.velocity = 0.0;
        self.silence(pool);
        if let Some(lease) = self.scratch {
            if let Err(e) = pool.set_volume(lease, DEFAULT_VOLUME) {
                log::warn!("deck {}: could not reset scratch volume: {}", self.deck.0, e);
            }
        }
        self.ring_active = false;
        log::debug!("deck {} drag end, rotation {:.1}°", self.deck.0, self.rotation);
    }

    // start the scratch clip unless it is already going
    fn ensure_scratching<O: AudioOutput>(&mut self, pool: &mut SoundPool<O>) {
        let Some(lease) = self.scratch else { return };
        if pool.is_playing(lease) {
            return;
        }
        if let Err(e) = pool.play(lease) {
            log::warn!("deck {}: scratch failed to start: {}", self.deck.0, e);
        }
    }

    // pause, rewind and put the rate back to normal
    fn silence<O: AudioOutput>(&mut self, pool: &mut SoundPool<O>) {
        let Some(lease) = self.scratch else { return };
        let stopped = pool.stop(lease).and_then(|_| pool.set_rate(lease, 1.0));
        if let Err(e) = stopped {
            log::warn!("deck {}: could not stop scratch: {}", self.deck.0, e);
        }
    }

    // The engine refused the scratch clip; the next real movement retries
    pub fn playback_rejected(&mut self) {
        log::warn!("deck {}: scratch playback rejected", self.deck.0);
        self.ring_active = false;
    }

    pub fn view(&self) -> DeckView {
        DeckView {
            rotation_deg: self.rotation,
            ring_active: self.ring_active,
            dragging: self.is_dragging(),
        }
    }
}
