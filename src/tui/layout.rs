use ratatui::layout::{Constraint, Direction, Layout, Position, Rect};

use crate::shared::{CELL_ASPECT, DeckId, NUM_DECKS, Point};

// What a screen cell belongs to
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Surface {
    Deck(DeckId),
    Pad(u8),
}

// Where everything sits on the main screen; shared by view and input so a
// click always lands on what was drawn there
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BoardLayout {
    pub status: Rect,
    pub decks: [Rect; NUM_DECKS],
    pub pads: Vec<Rect>,
}

impl BoardLayout {
    pub fn new(area: Rect, num_pads: usize) -> Self {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1), // status line
                Constraint::Min(4),    // decks + pads
            ])
            .split(area);

        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage(40), // deck 1
                Constraint::Percentage(20), // pads
                Constraint::Percentage(40), // deck 2
            ])
            .split(rows[1]);

        let pads = if num_pads == 0 {
            Vec::new()
        } else {
            let pad_constraints = vec![Constraint::Ratio(1, num_pads as u32); num_pads];
            Layout::default()
                .direction(Direction::Vertical)
                .constraints(pad_constraints)
                .split(cols[1])
                .to_vec()
        };

        Self {
            status: rows[0],
            decks: [cols[0], cols[2]],
            pads,
        }
    }

    pub fn hit(&self, col: u16, row: u16) -> Option<Surface> {
        let pos = Position::new(col, row);
        if let Some(i) = self.decks.iter().position(|r| r.contains(pos)) {
            return Some(Surface::Deck(DeckId(i as u8)));
        }
        self.pads
            .iter()
            .position(|r| r.contains(pos))
            .map(|i| Surface::Pad(i as u8))
    }

    pub fn contains(&self, surface: Surface, col: u16, row: u16) -> bool {
        let rect = match surface {
            Surface::Deck(d) => self.decks.get(d.index()),
            Surface::Pad(n) => self.pads.get(n as usize),
        };
        rect.is_some_and(|r| r.contains(Position::new(col, row)))
    }

    pub fn deck_offset(&self, deck: DeckId, col: u16, row: u16) -> Point {
        surface_offset(self.decks[deck.index()], col, row)
    }
}

// Offset of a cell's centre from the centre of `rect`, rows stretched so both
// axes are in the same physical unit
pub fn surface_offset(rect: Rect, col: u16, row: u16) -> Point {
    let cx = rect.x as f64 + rect.width as f64 / 2.0;
    let cy = rect.y as f64 + rect.height as f64 / 2.0;
    Point {
        x: col as f64 + 0.5 - cx,
        y: (row as f64 + 0.5 - cy) * CELL_ASPECT,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_splits_decks_and_pads() {
        let layout = BoardLayout::new(Rect::new(0, 0, 100, 31), 3);
        assert_eq!(layout.status.height, 1);
        assert_eq!(layout.decks[0].x, 0);
        assert_eq!(layout.decks[0].width, 40);
        assert_eq!(layout.decks[1].x, 60);
        assert_eq!(layout.pads.len(), 3);
        assert_eq!(layout.pads[0].x, 40);
        assert_eq!(layout.pads.iter().map(|r| r.height).sum::<u16>(), 30);
    }

    #[test]
    fn test_hit_finds_surfaces() {
        let layout = BoardLayout::new(Rect::new(0, 0, 100, 31), 2);
        assert_eq!(layout.hit(5, 10), Some(Surface::Deck(DeckId(0))));
        assert_eq!(layout.hit(95, 10), Some(Surface::Deck(DeckId(1))));
        assert_eq!(layout.hit(50, 2), Some(Surface::Pad(0)));
        assert_eq!(layout.hit(50, 29), Some(Surface::Pad(1)));
        assert_eq!(layout.hit(50, 0), None); // status line
    }

    #[test]
    fn test_surface_offset_is_aspect_corrected() {
        let rect = Rect::new(0, 0, 10, 10);
        let p = surface_offset(rect, 4, 4);
        assert_eq!(p, Point::new(-0.5, -1.0));
        let right = surface_offset(rect, 9, 4);
        assert_eq!(right.x, 4.5);
    }
}
