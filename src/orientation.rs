use crate::shared::{CELL_ASPECT, Screen};

// Which screen is showing, driven by viewport shape and the start gesture
#[derive(Debug)]
pub struct OrientationGate {
    screen: Screen,
    started: bool, // the start gesture has happened at least once
}

impl Default for OrientationGate {
    fn default() -> Self {
        Self { screen: Screen::Orientation, started: false }
    }
}

impl OrientationGate {
    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn is_landscape(width: f64, height: f64) -> bool {
        width > height
    }

    // terminal size in cells; rows count double since cells are tall
    pub fn update_cells(&mut self, cols: u16, rows: u16) -> Screen {
        self.update(cols as f64, rows as f64 * CELL_ASPECT)
    }

    pub fn update(&mut self, width: f64, height: f64) -> Screen {
        if !Self::is_landscape(width, height) {
            self.screen = Screen::Orientation;
        } else if self.screen == Screen::Orientation {
            self.screen = Screen::Instruction;
        }
        self.screen
    }

    // Instruction -> Main. Returns true only for the very first start, which
    // is the one that unlocks audio.
    pub fn start(&mut self) -> bool {
        if self.screen != Screen::Instruction {
            return false;
        }
        self.screen = Screen::Main;
        !std::mem::replace(&mut self.started, true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_portrait_shows_orientation_screen() {
        let mut gate = OrientationGate::default();
        assert_eq!(gate.update(600.0, 800.0), Screen::Orientation);
        assert_eq!(gate.update(800.0, 800.0), Screen::Orientation);
    }

    #[test]
    fn test_landscape_moves_to_instructions_then_main() {
        let mut gate = OrientationGate::default();
        assert_eq!(gate.update(1024.0, 768.0), Screen::Instruction);
        // further resizes don't skip the instructions
        assert_eq!(gate.update(1280.0, 768.0), Screen::Instruction);
        assert!(gate.start());
        assert_eq!(gate.screen(), Screen::Main);
        assert_eq!(gate.update(1300.0, 700.0), Screen::Main);
    }

    #[test]
    fn test_rotating_back_requires_another_start() {
        let mut gate = OrientationGate::default();
        gate.update(1024.0, 768.0);
        assert!(gate.start());
        assert_eq!(gate.update(768.0, 1024.0), Screen::Orientation);
        assert_eq!(gate.update(1024.0, 768.0), Screen::Instruction);
        // not the first start any more
        assert!(!gate.start());
        assert_eq!(gate.screen(), Screen::Main);
    }

    #[test]
    fn test_start_outside_instructions_is_ignored() {
        let mut gate = OrientationGate::default();
        assert!(!gate.start());
        assert_eq!(gate.screen(), Screen::Orientation);
    }

    #[test]
    fn test_cells_are_scaled_by_aspect() {
        let mut gate = OrientationGate::default();
        // 80x24 cells is 80 wide by 48 tall
        assert_eq!(gate.update_cells(80, 24), Screen::Instruction);
        // 80x40 cells is 80 by 80, not landscape
        assert_eq!(gate.update_cells(80, 40), Screen::Orientation);
    }
}
