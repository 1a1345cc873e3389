// Fixed pools of clip handles per sound name.
//
// Handles are created once when a sound is registered and never added or
// removed afterwards. Callers check a handle out with `acquire` (pads) or
// `reserve` (turntables) and get a `ClipLease` back; every playback call
// goes through the lease, so a handle that has been handed to someone else
// can't be driven by its previous holder. Reserved handles belong to their
// holder for good and are never taken over by `acquire`.

use std::collections::HashMap;

use crate::audio_api::{AudioCommand, AudioError, AudioOutput, ClipId, SampleId};
use crate::shared::DEFAULT_VOLUME;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ClipLease {
    pub clip: ClipId,
    generation: u64,
}

// Main-thread mirror of a clip voice in the engine
#[derive(Clone, Debug, PartialEq)]
pub struct ClipHandle {
    pub id: ClipId,
    pub sample: SampleId,
    pub volume: f32,
    pub looped: bool,
    pub rate: f32,
    pub playing: bool,
}

#[derive(Debug)]
struct PooledClip {
    handle: ClipHandle,
    lease: Option<u64>,
    reserved: bool,
}

pub struct SoundPool<O: AudioOutput> {
    output: O,
    clips: Vec<PooledClip>, // indexed by ClipId
    groups: HashMap<String, Vec<ClipId>>,
    next_generation: u64,
}

impl<O: AudioOutput> SoundPool<O> {
    pub fn new(output: O) -> Self {
        Self {
            output,
            clips: Vec::new(),
            groups: HashMap::new(),
            next_generation: 1,
        }
    }

    pub fn output(&self) -> &O {
        &self.output
    }

    pub fn output_mut(&mut self) -> &mut O {
        &mut self.output
    }

    pub fn contains(&self, name: &str) -> bool {
        self.groups.contains_key(name)
    }

    // Create `size` handles for `name`, all bound to `sample`. The sample has
    // to be registered with the engine before this is called.
    pub fn register(&mut self, name: &str, sample: SampleId, size: usize, looped: bool) -> Result<(), AudioError> {
        if self.groups.contains_key(name) {
            return Err(AudioError::DuplicateSound);
        }
        let mut ids = Vec::with_capacity(size);
        for _ in 0..size {
            let id = ClipId(self.clips.len() as u32);
            self.output.send(AudioCommand::BindClip {
                clip: id,
                sample,
                volume: DEFAULT_VOLUME,
                looped,
            })?;
            self.clips.push(PooledClip {
                handle: ClipHandle {
                    id,
                    sample,
                    volume: DEFAULT_VOLUME,
                    looped,
                    rate: 1.0,
                    playing: false,
                },
                lease: None,
                reserved: false,
            });
            ids.push(id);
        }
        log::debug!("pool '{}': {} handles", name, size);
        self.groups.insert(name.to_string(), ids);
        Ok(())
    }

    // First free handle for `name`. When all of them are out, the first
    // unreserved one is taken over: the newest trigger wins and the old
    // holder's lease goes stale. `None` for names that were never registered
    // or whose handles are all reserved.
    pub fn acquire(&mut self, name: &str) -> Option<ClipLease> {
        let Some(ids) = self.groups.get(name) else {
            log::warn!("no sound registered as '{}'", name);
            return None;
        };
        let mut shared = ids.iter().copied().filter(|id| !self.clips[id.0 as usize].reserved);
        let first = shared.clone().next();
        let Some(id) = shared.find(|id| self.is_free(*id)).or(first) else {
            log::warn!("every '{}' handle is reserved", name);
            return None;
        };
        Some(self.lease(id))
    }

    // Like `acquire`, but never takes a handle away from anyone, and the
    // handle stays out of `acquire`'s reach from then on
    pub fn reserve(&mut self, name: &str) -> Option<ClipLease> {
        let Some(ids) = self.groups.get(name) else {
            log::warn!("no sound registered as '{}'", name);
            return None;
        };
        let id = ids.iter().copied().find(|id| self.is_free(*id))?;
        self.clips[id.0 as usize].reserved = true;
        Some(self.lease(id))
    }

    fn is_free(&self, id: ClipId) -> bool {
        let c = &self.clips[id.0 as usize];
        c.lease.is_none() && !c.handle.playing
    }

    fn lease(&mut self, id: ClipId) -> ClipLease {
        let generation = self.next_generation;
        self.next_generation += 1;
        self.clips[id.0 as usize].lease = Some(generation);
        ClipLease { clip: id, generation }
    }

    pub fn is_current(&self, lease: ClipLease) -> bool {
        self.clips
            .get(lease.clip.0 as usize)
            .is_some_and(|c| c.lease == Some(lease.generation))
    }

    fn checked(&mut self, lease: ClipLease) -> Result<&mut ClipHandle, AudioError> {
        match self.clips.get_mut(lease.clip.0 as usize) {
            Some(c) if c.lease == Some(lease.generation) => Ok(&mut c.handle),
            _ => Err(AudioError::StaleLease),
        }
    }

    pub fn handle(&self, lease: ClipLease) -> Option<&ClipHandle> {
        self.clips
            .get(lease.clip.0 as usize)
            .filter(|c| c.lease == Some(lease.generation))
            .map(|c| &c.handle)
    }

    pub fn is_playing(&self, lease: ClipLease) -> bool {
        self.handle(lease).is_some_and(|h| h.playing)
    }

    // Rewind and start. The handle only counts as playing once the output
    // took the command; the engine can still refuse it later, see
    // `playback_rejected`. A refused start leaves a taken-over handle
    // sounding as before.
    pub fn play(&mut self, lease: ClipLease) -> Result<(), AudioError> {
        self.checked(lease)?;
        let clip = lease.clip;
        let sent = self
            .output
            .send(AudioCommand::Seek { clip, frame: 0 })
            .and_then(|_| self.output.send(AudioCommand::Play { clip }));
        let handle = self.checked(lease)?;
        handle.playing |= sent.is_ok();
        sent
    }

    // Pause and rewind to the start. The handle stays playing if the pause
    // never reached the output.
    pub fn stop(&mut self, lease: ClipLease) -> Result<(), AudioError> {
        self.checked(lease)?;
        let clip = lease.clip;
        self.output.send(AudioCommand::Pause { clip })?;
        self.checked(lease)?.playing = false;
        self.output.send(AudioCommand::Seek { clip, frame: 0 })
    }

    pub fn set_rate(&mut self, lease: ClipLease, rate: f32) -> Result<(), AudioError> {
        let handle = self.checked(lease)?;
        handle.rate = rate;
        self.output.send(AudioCommand::SetRate { clip: lease.clip, rate })
    }

    pub fn set_volume(&mut self, lease: ClipLease, volume: f32) -> Result<(), AudioError> {
        let handle = self.checked(lease)?;
        handle.volume = volume;
        self.output.send(AudioCommand::SetVolume { clip: lease.clip, volume })
    }

    // Hand the handle back. A stale lease is ignored. A handle released
    // while still sounding is not free until someone stops it, see
    // `stop_unowned`.
    pub fn release(&mut self, lease: ClipLease) {
        if self.checked(lease).is_ok() {
            self.clips[lease.clip.0 as usize].lease = None;
        }
    }

    // Silence a clip nobody holds. Returns false when the clip has an owner
    // or is already quiet.
    pub fn stop_unowned(&mut self, clip: ClipId) -> Result<bool, AudioError> {
        let Some(c) = self.clips.get_mut(clip.0 as usize) else {
            return Ok(false);
        };
        if c.lease.is_some() || !c.handle.playing {
            return Ok(false);
        }
        self.output.send(AudioCommand::Pause { clip })?;
        c.handle.playing = false;
        self.output.send(AudioCommand::Seek { clip, frame: 0 })?;
        Ok(true)
    }

    // The engine refused to start this clip
    pub fn playback_rejected(&mut self, clip: ClipId) {
        if let Some(c) = self.clips.get_mut(clip.0 as usize) {
            c.handle.playing = false;
        }
    }

    // A one-shot clip ran out
    pub fn playback_ended(&mut self, clip: ClipId) {
        self.playback_rejected(clip);
    }

    pub fn poll_event(&mut self) -> Option<crate::audio_api::AudioEvent> {
        self.output.poll_event()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio_api::testing::RecordingOutput;

    fn pool() -> SoundPool<RecordingOutput> {
        let mut pool = SoundPool::new(RecordingOutput::default());
        pool.register("drum", SampleId(1), 3, true).unwrap();
        pool.register("scratch", SampleId(2), 1, true).unwrap();
        pool.output_mut().clear();
        pool
    }

    #[test]
    fn test_register_binds_every_handle() {
        let mut pool = SoundPool::new(RecordingOutput::default());
        pool.register("drum", SampleId(1), 3, true).unwrap();
        let binds = pool
            .output()
            .sent
            .iter()
            .filter(|c| matches!(c, AudioCommand::BindClip { volume, looped: true, .. } if *volume == DEFAULT_VOLUME))
            .count();
        assert_eq!(binds, 3);
        assert_eq!(pool.register("drum", SampleId(3), 3, true), Err(AudioError::DuplicateSound));
    }

    #[test]
    fn test_acquire_hands_out_free_handles_in_order() {
        let mut pool = pool();
        let a = pool.acquire("drum").unwrap();
        let b = pool.acquire("drum").unwrap();
        let c = pool.acquire("drum").unwrap();
        assert_eq!([a.clip, b.clip, c.clip], [ClipId(0), ClipId(1), ClipId(2)]);
    }

    #[test]
    fn test_exhausted_pool_still_returns_first_handle() {
        let mut pool = pool();
        let leases: Vec<_> = (0..3).map(|_| pool.acquire("drum").unwrap()).collect();
        for l in &leases {
            pool.play(*l).unwrap();
        }

        let stolen = pool.acquire("drum").unwrap();
        assert_eq!(stolen.clip, leases[0].clip);
        assert!(!pool.is_current(leases[0]));
        assert_eq!(pool.stop(leases[0]), Err(AudioError::StaleLease));
        // the takeover keeps the clip audible for its new holder
        assert!(pool.is_playing(stolen));
    }

    #[test]
    fn test_reserved_handle_is_never_taken_over() {
        let mut pool = SoundPool::new(RecordingOutput::default());
        pool.register("vinyl", SampleId(4), 3, true).unwrap();
        let deck = pool.reserve("vinyl").unwrap();
        let pads: Vec<_> = (0..2).map(|_| pool.acquire("vinyl").unwrap()).collect();
        for l in &pads {
            pool.play(*l).unwrap();
        }

        let stolen = pool.acquire("vinyl").unwrap();
        assert_eq!(stolen.clip, pads[0].clip);
        assert!(pool.is_current(deck));
    }

    #[test]
    fn test_fully_reserved_sound_cannot_be_acquired() {
        let mut pool = pool();
        let deck = pool.reserve("scratch").unwrap();
        assert!(pool.acquire("scratch").is_none());
        assert!(pool.is_current(deck));
    }

    #[test]
    fn test_refused_restart_keeps_stolen_clip_sounding() {
        let mut pool = pool();
        let leases: Vec<_> = (0..3).map(|_| pool.acquire("drum").unwrap()).collect();
        for l in &leases {
            pool.play(*l).unwrap();
        }
        let stolen = pool.acquire("drum").unwrap();
        pool.output_mut().refuse = true;
        assert_eq!(pool.play(stolen), Err(AudioError::QueueFull));
        assert!(pool.is_playing(stolen));

        pool.release(stolen);
        pool.output_mut().refuse = false;
        pool.output_mut().clear();
        assert_eq!(pool.stop_unowned(stolen.clip), Ok(true));
        assert_eq!(pool.output().pauses(stolen.clip), 1);
        // quiet now, and free again
        assert_eq!(pool.stop_unowned(stolen.clip), Ok(false));
        assert_eq!(pool.acquire("drum").unwrap().clip, stolen.clip);
    }

    #[test]
    fn test_owned_clip_is_not_stopped_as_unowned() {
        let mut pool = pool();
        let a = pool.acquire("drum").unwrap();
        pool.play(a).unwrap();
        pool.output_mut().clear();
        assert_eq!(pool.stop_unowned(a.clip), Ok(false));
        assert!(pool.output().sent.is_empty());
        assert!(pool.is_playing(a));
    }

    #[test]
    fn test_unknown_sound_is_none() {
        let mut pool = pool();
        assert!(pool.acquire("cowbell").is_none());
        assert!(pool.reserve("cowbell").is_none());
    }

    #[test]
    fn test_released_handle_is_reused() {
        let mut pool = pool();
        let a = pool.acquire("drum").unwrap();
        pool.play(a).unwrap();
        pool.stop(a).unwrap();
        pool.release(a);
        let again = pool.acquire("drum").unwrap();
        assert_eq!(again.clip, a.clip);
        assert_ne!(again, a);
    }

    #[test]
    fn test_reserve_never_steals() {
        let mut pool = pool();
        let first = pool.reserve("scratch").unwrap();
        assert!(pool.reserve("scratch").is_none());
        assert!(pool.is_current(first));
    }

    #[test]
    fn test_play_rewinds_before_starting() {
        let mut pool = pool();
        let a = pool.acquire("drum").unwrap();
        pool.play(a).unwrap();
        let sent = &pool.output().sent;
        assert!(matches!(sent[0], AudioCommand::Seek { frame: 0, .. }));
        assert!(matches!(sent[1], AudioCommand::Play { .. }));
        assert!(pool.is_playing(a));
    }

    #[test]
    fn test_refused_play_leaves_handle_paused() {
        let mut pool = pool();
        let a = pool.acquire("drum").unwrap();
        pool.output_mut().refuse = true;
        assert_eq!(pool.play(a), Err(AudioError::QueueFull));
        assert!(!pool.is_playing(a));
    }

    #[test]
    fn test_rejection_from_engine_clears_playing() {
        let mut pool = pool();
        let a = pool.acquire("drum").unwrap();
        pool.play(a).unwrap();
        pool.playback_rejected(a.clip);
        assert!(!pool.is_playing(a));
        // still leased to the same holder
        assert!(pool.is_current(a));
    }

    #[test]
    fn test_rate_and_volume_follow_the_handle() {
        let mut pool = pool();
        let a = pool.reserve("scratch").unwrap();
        pool.set_rate(a, 1.5).unwrap();
        pool.set_volume(a, 0.2).unwrap();
        let h = pool.handle(a).unwrap();
        assert_eq!(h.rate, 1.5);
        assert_eq!(h.volume, 0.2);
        assert_eq!(pool.output().last_rate(a.clip), Some(1.5));
    }
}
