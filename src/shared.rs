// Types shared between the tui, the board and the audio side.
//
// The tui never touches controller state directly: it resolves raw terminal
// events into the semantic `InputEvent`s below, and every frame it renders
// whatever `DisplayState` the board hands back.
//
// Mouse:
//   press on a turntable     //  TurntableDown(deck, offset) then TurntableMove... / TurntableUp
//   press on a pad           //  PadPress(n), released by mouse up or by dragging off the pad
//   click on instructions    //  Start
//
// Keys:
//   pad keys (deckpad.json)  //  PadPress(n) / PadRelease(n)
//   Space / Enter            //  Start
//   Esc                      //  Quit

use std::time::Duration;

// handles created per sound name
pub const POOL_SIZE: usize = 3;
pub const DEFAULT_VOLUME: f32 = 0.7;

// playback rate clamp for the scratch clip, and how hard velocity pushes on it
pub const MIN_RATE: f32 = 0.5;
pub const MAX_RATE: f32 = 2.0;
pub const RATE_PER_VELOCITY: f64 = 0.01; // per degree/ms

// deltas at or below this many degrees count as jitter
pub const MOTION_THRESHOLD_DEG: f64 = 1.0;

pub const PULSE_PERIOD: Duration = Duration::from_millis(1500);

// terminal cells are roughly twice as tall as they are wide
pub const CELL_ASPECT: f64 = 2.0;

pub const NUM_DECKS: usize = 2;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct DeckId(pub u8);

impl DeckId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

// pointer position relative to the centre of a surface, y pointing down,
// in units where x and y are the same physical length
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    // a point on the unit circle at `deg`, handy for driving turntables by angle
    pub fn at_angle(deg: f64) -> Self {
        let rad = deg.to_radians();
        Self { x: rad.cos(), y: rad.sin() }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum InputEvent {
    // terminal size in cells
    Resize { cols: u16, rows: u16 },

    // the activation gesture; the first one unlocks audio
    Start,

    PadPress(u8),
    PadRelease(u8),

    // `contacts` is how many contact points are down on the surface; only
    // single-contact gestures drive a turntable
    TurntableDown { deck: DeckId, at: Point, contacts: u8 },
    TurntableMove { deck: DeckId, at: Point, contacts: u8 },
    TurntableUp { deck: DeckId },

    // focus loss and similar: every gesture in flight is dropped
    CancelGestures,

    Quit,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Screen {
    Orientation,
    Instruction,
    Main,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AudioStatus {
    Muted,  // no output device, running silent
    Locked, // waiting for the start gesture
    Live,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PadView {
    pub label: String,
    pub key: char,
    pub active: bool,
    pub glow: bool, // inside the bright part of a pulse cycle
    pub silent: bool, // sound name had nothing loaded
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct DeckView {
    pub rotation_deg: f64, // unbounded, drives the platter marker
    pub ring_active: bool,
    pub dragging: bool,
}

#[derive(Clone, Debug)]
pub struct DisplayState {
    pub screen: Screen,
    pub audio: AudioStatus,
    pub pads: Vec<PadView>,
    pub decks: [DeckView; NUM_DECKS],
}
