// The board sits between the tui and the audio engine: it owns the sound
// pool, the pads, both turntables and the screen gate. The tui feeds it
// semantic input events, the main loop feeds it engine events and ticks,
// and every frame it produces a DisplayState for the tui to draw.

use std::time::Duration;

use crate::audio_api::{AudioCommand, AudioEvent, AudioOutput, ClipId};
use crate::config::BoardConfig;
use crate::loader::sample_loader::LoadedSound;
use crate::orientation::OrientationGate;
use crate::pad::Pad;
use crate::pool::SoundPool;
use crate::shared::{
    AudioStatus, DeckId, DisplayState, InputEvent, NUM_DECKS, POOL_SIZE, Screen,
};
use crate::turntable::Turntable;

pub struct Board<O: AudioOutput> {
    pool: SoundPool<O>,
    pads: Vec<Pad>,
    decks: [Turntable; NUM_DECKS],
    gate: OrientationGate,
    audio: AudioStatus,
}

impl<O: AudioOutput> Board<O> {
    // Registers every loaded sound with the engine and builds its handles.
    // Sounds that didn't load simply have no pool entry.
    pub fn new(output: O, config: &BoardConfig, sounds: Vec<LoadedSound>, muted: bool) -> Self {
        let mut pool = SoundPool::new(output);

        for sound in sounds {
            let for_pads = config.pads.iter().any(|p| p.sound == sound.name);
            let for_decks = config.scratch_sound == sound.name;
            // a sound can serve pads and decks at once; decks reserve their
            // handles up front so the pads keep a full pool
            let size = (if for_pads { POOL_SIZE } else { 0 }) + (if for_decks { NUM_DECKS } else { 0 });
            if size == 0 {
                continue;
            }
            let registered = pool
                .output_mut()
                .send(AudioCommand::RegisterSample { id: sound.id, buffer: sound.buffer })
                .and_then(|_| pool.register(&sound.name, sound.id, size, true));
            if let Err(e) = registered {
                log::warn!("could not register sound '{}': {}", sound.name, e);
            }
        }

        let decks = std::array::from_fn(|i| {
            let scratch = pool.reserve(&config.scratch_sound);
            Turntable::new(DeckId(i as u8), scratch)
        });
        let pads = config
            .pads
            .iter()
            .map(|p| Pad::new(p.label.clone(), p.sound.clone(), p.key))
            .collect();

        Self {
            pool,
            pads,
            decks,
            gate: OrientationGate::default(),
            audio: if muted { AudioStatus::Muted } else { AudioStatus::Locked },
        }
    }

    pub fn screen(&self) -> Screen {
        self.gate.screen()
    }

    pub fn pads(&self) -> &[Pad] {
        &self.pads
    }

    pub fn deck(&self, deck: DeckId) -> &Turntable {
        &self.decks[deck.index()]
    }

    pub fn pool(&self) -> &SoundPool<O> {
        &self.pool
    }

    pub fn handle_input(&mut self, event: InputEvent, now: Duration) {
        match event {
            InputEvent::Resize { cols, rows } => {
                let before = self.gate.screen();
                let after = self.gate.update_cells(cols, rows);
                if before == Screen::Main && after != Screen::Main {
                    // the surfaces are gone; nothing may keep sounding
                    self.cancel_gestures();
                }
            }
            InputEvent::Start => self.start(),
            InputEvent::PadPress(n) => {
                if self.surfaces_alive() {
                    if let Some(pad) = self.pads.get_mut(n as usize) {
                        pad.press(&mut self.pool, now);
                    }
                }
            }
            InputEvent::PadRelease(n) => {
                if let Some(pad) = self.pads.get_mut(n as usize) {
                    pad.release(&mut self.pool);
                }
            }
            InputEvent::TurntableDown { deck, at, contacts } => {
                if self.surfaces_alive() && contacts == 1 {
                    if let Some(tt) = self.decks.get_mut(deck.index()) {
                        tt.start_drag(at, now);
                    }
                }
            }
            InputEvent::TurntableMove { deck, at, contacts } => {
                if self.surfaces_alive() && contacts == 1 {
                    if let Some(tt) = self.decks.get_mut(deck.index()) {
                        tt.on_move(&mut self.pool, at, now);
                    }
                }
            }
            InputEvent::TurntableUp { deck } => {
                if let Some(tt) = self.decks.get_mut(deck.index()) {
                    tt.end_drag(&mut self.pool);
                }
            }
            InputEvent::CancelGestures => self.cancel_gestures(),
            InputEvent::Quit => {}
        }
    }

    fn surfaces_alive(&self) -> bool {
        self.gate.screen() == Screen::Main
    }

    fn start(&mut self) {
        if !self.gate.start() {
            return;
        }
        log::info!("board started");
        if self.audio == AudioStatus::Muted {
            return;
        }
        match self.pool.output_mut().send(AudioCommand::Unlock) {
            Ok(()) => self.audio = AudioStatus::Live,
            Err(e) => log::warn!("could not unlock audio: {}", e),
        }
    }

    pub fn cancel_gestures(&mut self) {
        for tt in self.decks.iter_mut() {
            tt.end_drag(&mut self.pool);
        }
        for pad in self.pads.iter_mut() {
            pad.release(&mut self.pool);
        }
    }

    // Drain what the engine reported since the last frame
    pub fn poll_audio(&mut self) {
        while let Some(event) = self.pool.poll_event() {
            match event {
                AudioEvent::PlayRejected { clip, reason } => {
                    log::warn!("engine rejected {:?}: {:?}", clip, reason);
                    self.pool.playback_rejected(clip);
                    self.route_rejection(clip);
                }
                AudioEvent::Ended { clip } => {
                    self.pool.playback_ended(clip);
                    if let Some(n) = self.pad_holding(clip) {
                        self.pads[n].release(&mut self.pool);
                    }
                }
            }
        }
    }

    // only the current holder; a pad whose handle was taken over still
    // carries the old clip id but no longer owns it
    fn pad_holding(&self, clip: ClipId) -> Option<usize> {
        self.pads
            .iter()
            .position(|p| p.holds(clip) && p.lease().is_some_and(|l| self.pool.is_current(l)))
    }

    fn route_rejection(&mut self, clip: ClipId) {
        if let Some(n) = self.pad_holding(clip) {
            self.pads[n].playback_rejected(&mut self.pool);
        }
        if let Some(tt) = self.decks.iter_mut().find(|t| t.holds(clip)) {
            tt.playback_rejected();
        }
    }

    pub fn tick(&mut self, now: Duration) {
        for pad in self.pads.iter_mut() {
            pad.tick(now);
        }
    }

    pub fn display_state(&self, now: Duration) -> DisplayState {
        DisplayState {
            screen: self.gate.screen(),
            audio: self.audio,
            pads: self
                .pads
                .iter()
                .map(|p| p.view(&self.pool, now))
                .collect(),
            decks: std::array::from_fn(|i| self.decks[i].view()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::{SampleBuffer, StereoFrame};
    use crate::audio_api::testing::RecordingOutput;
    use crate::audio_api::{RejectReason, SampleId};
    use crate::config::PadConfig;
    use crate::shared::Point;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn sound(name: &str, id: u64) -> LoadedSound {
        LoadedSound {
            name: name.into(),
            id: SampleId(id),
            buffer: SampleBuffer::new(vec![StereoFrame::silent(); 16]),
        }
    }

    fn config() -> BoardConfig {
        BoardConfig {
            pads: vec![
                PadConfig { label: "Drum".into(), sound: "drum".into(), key: 'a' },
                PadConfig { label: "Bass".into(), sound: "bass".into(), key: 's' },
            ],
            ..BoardConfig::default()
        }
    }

    // a started board on the main screen; bass never loaded
    fn board() -> Board<RecordingOutput> {
        let sounds = vec![sound("drum", 101), sound("scratch", 102)];
        let mut board = Board::new(RecordingOutput::default(), &config(), sounds, false);
        board.handle_input(InputEvent::Resize { cols: 120, rows: 40 }, ms(0));
        board.handle_input(InputEvent::Start, ms(0));
        assert_eq!(board.screen(), Screen::Main);
        board
    }

    fn down(deck: u8, deg: f64) -> InputEvent {
        InputEvent::TurntableDown { deck: DeckId(deck), at: Point::at_angle(deg), contacts: 1 }
    }

    fn drag(deck: u8, deg: f64, contacts: u8) -> InputEvent {
        InputEvent::TurntableMove { deck: DeckId(deck), at: Point::at_angle(deg), contacts }
    }

    #[test]
    fn test_new_registers_samples_before_binding() {
        let board = board();
        let sent = &board.pool().output().sent;
        assert!(matches!(sent[0], AudioCommand::RegisterSample { id: SampleId(101), .. }));
        assert!(matches!(sent[1], AudioCommand::BindClip { sample: SampleId(101), .. }));
        assert!(sent.iter().any(|c| matches!(c, AudioCommand::Unlock)));
    }

    #[test]
    fn test_each_deck_gets_its_own_scratch() {
        let board = board();
        let a = board.deck(DeckId(0)).scratch().unwrap();
        let b = board.deck(DeckId(1)).scratch().unwrap();
        assert_ne!(a.clip, b.clip);
    }

    #[test]
    fn test_pads_sharing_the_scratch_sound_leave_decks_alone() {
        let config = BoardConfig {
            pads: (0..4)
                .map(|i| PadConfig { label: format!("S{i}"), sound: "scratch".into(), key: (b'a' + i) as char })
                .collect(),
            ..BoardConfig::default()
        };
        let mut board = Board::new(RecordingOutput::default(), &config, vec![sound("scratch", 7)], false);
        board.handle_input(InputEvent::Resize { cols: 120, rows: 40 }, ms(0));
        board.handle_input(InputEvent::Start, ms(0));
        let scratch = board.deck(DeckId(0)).scratch().unwrap();

        for n in 0..4 {
            board.handle_input(InputEvent::PadPress(n), ms(10));
        }
        assert!(board.pads().iter().all(|p| !p.holds(scratch.clip)));
        for n in 0..4 {
            board.handle_input(InputEvent::PadRelease(n), ms(20));
        }

        board.handle_input(down(0, 0.0), ms(30));
        board.handle_input(drag(0, 45.0, 1), ms(40));
        assert!(board.pool().is_current(scratch));
        assert!(board.pool().is_playing(scratch));
    }

    #[test]
    fn test_pad_press_release_end_to_end() {
        let mut board = board();
        board.handle_input(InputEvent::PadPress(0), ms(10));
        let pad = &board.pads()[0];
        assert!(pad.is_playing());
        let lease = pad.lease().unwrap();
        assert!(board.pool().is_playing(lease));
        assert!(board.display_state(ms(10)).pads[0].active);

        board.handle_input(InputEvent::PadRelease(0), ms(500));
        assert!(!board.pads()[0].is_playing());
        assert!(!board.display_state(ms(500)).pads[0].active);
    }

    #[test]
    fn test_missing_sound_pad_is_silent_noop() {
        let mut board = board();
        board.handle_input(InputEvent::PadPress(1), ms(10));
        assert!(!board.pads()[1].is_playing());
        let ds = board.display_state(ms(10));
        assert!(ds.pads[1].silent);
        assert!(!ds.pads[0].silent);
    }

    #[test]
    fn test_gestures_ignored_off_main_screen() {
        let sounds = vec![sound("drum", 1), sound("scratch", 2)];
        let mut board = Board::new(RecordingOutput::default(), &config(), sounds, false);
        board.handle_input(InputEvent::Resize { cols: 120, rows: 40 }, ms(0));
        assert_eq!(board.screen(), Screen::Instruction);

        board.handle_input(InputEvent::PadPress(0), ms(10));
        board.handle_input(down(0, 0.0), ms(10));
        assert!(!board.pads()[0].is_playing());
        assert!(!board.deck(DeckId(0)).is_dragging());
    }

    #[test]
    fn test_leaving_main_screen_stops_everything() {
        let mut board = board();
        board.handle_input(InputEvent::PadPress(0), ms(0));
        board.handle_input(down(0, 0.0), ms(0));
        board.handle_input(drag(0, 45.0, 1), ms(20));
        let scratch = board.deck(DeckId(0)).scratch().unwrap();
        assert!(board.pool().is_playing(scratch));

        board.handle_input(InputEvent::Resize { cols: 40, rows: 40 }, ms(30));
        assert_eq!(board.screen(), Screen::Orientation);
        assert!(!board.pads()[0].is_playing());
        assert!(!board.deck(DeckId(0)).is_dragging());
        assert!(!board.pool().is_playing(scratch));

        // a straggling move after the surface went away does nothing
        board.handle_input(drag(0, 90.0, 1), ms(40));
        assert!((board.deck(DeckId(0)).rotation() - 45.0).abs() < 1e-6);
    }

    #[test]
    fn test_multi_touch_is_ignored() {
        let mut board = board();
        board.handle_input(
            InputEvent::TurntableDown { deck: DeckId(1), at: Point::at_angle(0.0), contacts: 2 },
            ms(0),
        );
        assert!(!board.deck(DeckId(1)).is_dragging());

        board.handle_input(down(1, 0.0), ms(0));
        board.handle_input(drag(1, 60.0, 2), ms(10));
        assert_eq!(board.deck(DeckId(1)).rotation(), 0.0);
        board.handle_input(drag(1, 60.0, 1), ms(20));
        assert!((board.deck(DeckId(1)).rotation() - 60.0).abs() < 1e-6);
    }

    #[test]
    fn test_decks_are_independent() {
        let mut board = board();
        board.handle_input(down(0, 0.0), ms(0));
        board.handle_input(drag(0, 30.0, 1), ms(10));
        let ds = board.display_state(ms(10));
        assert!(ds.decks[0].ring_active);
        assert!(!ds.decks[1].ring_active);
        assert_eq!(ds.decks[1].rotation_deg, 0.0);
    }

    #[test]
    fn test_engine_rejection_returns_pad_to_idle() {
        let mut board = board();
        board.handle_input(InputEvent::PadPress(0), ms(0));
        let clip = board.pads()[0].lease().unwrap().clip;

        board
            .pool
            .output_mut()
            .events
            .push_back(AudioEvent::PlayRejected { clip, reason: RejectReason::Locked });
        board.poll_audio();
        assert!(!board.pads()[0].is_playing());

        // the next press tries again, and gets the same free handle
        board.handle_input(InputEvent::PadPress(0), ms(100));
        assert!(board.pads()[0].is_playing());
        assert_eq!(board.pads()[0].lease().unwrap().clip, clip);
    }

    #[test]
    fn test_cancel_ends_gestures() {
        let mut board = board();
        board.handle_input(InputEvent::PadPress(0), ms(0));
        board.handle_input(down(1, 10.0), ms(0));
        board.handle_input(InputEvent::CancelGestures, ms(5));
        assert!(!board.pads()[0].is_playing());
        assert!(!board.deck(DeckId(1)).is_dragging());
    }

    #[test]
    fn test_muted_board_never_unlocks() {
        let mut board = Board::new(RecordingOutput::default(), &config(), vec![], true);
        board.handle_input(InputEvent::Resize { cols: 120, rows: 40 }, ms(0));
        board.handle_input(InputEvent::Start, ms(0));
        assert_eq!(board.display_state(ms(0)).audio, AudioStatus::Muted);
        assert!(board.pool().output().sent.is_empty());
        // still usable, just silent
        board.handle_input(down(0, 0.0), ms(0));
        board.handle_input(drag(0, 20.0, 1), ms(10));
        assert!(board.display_state(ms(10)).decks[0].ring_active);
    }

    #[test]
    fn test_tick_drives_pulse() {
        let mut board = board();
        board.handle_input(InputEvent::PadPress(0), ms(0));
        board.tick(ms(1000));
        assert!(!board.display_state(ms(1000)).pads[0].glow);
        board.tick(ms(1550));
        assert!(board.display_state(ms(1550)).pads[0].glow);
    }
}
