use crate::shared::Screen;

use super::layout::{BoardLayout, Surface};

// state local to the tui: which surface the pointer is holding, which pad
// keys are down, and the bits of board state needed to resolve input.
// screen and layout are synced from the board every frame
#[derive(Clone, Debug)]
pub struct TuiState {
    pub screen: Screen,
    pub layout: BoardLayout,
    // the surface the pointer went down on gets every drag and the release
    pub capture: Option<Surface>,
    pub pad_keys: Vec<char>,
    // terminals without release reporting toggle pads on each press instead
    pub key_release: bool,
    pub keys_down: Vec<u8>,
}

impl TuiState {
    pub fn new(pad_keys: Vec<char>, key_release: bool) -> Self {
        Self {
            screen: Screen::Orientation,
            layout: BoardLayout::default(),
            capture: None,
            pad_keys,
            key_release,
            keys_down: Vec::new(),
        }
    }

    pub fn pad_for_key(&self, c: char) -> Option<u8> {
        let c = c.to_ascii_lowercase();
        self.pad_keys
            .iter()
            .position(|k| k.to_ascii_lowercase() == c)
            .map(|i| i as u8)
    }
}
