use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::symbols::Marker;
use ratatui::widgets::canvas::{Canvas, Circle, Line};
use ratatui::widgets::Block;
use ratatui::Frame;

use crate::shared::{CELL_ASPECT, DeckView};

// A turntable: platter circle, label ring, and a marker showing rotation.
// Canvas bounds are in the same aspect-corrected units the input side uses,
// so the circle comes out round.
pub fn draw_deck(frame: &mut Frame, area: Rect, title: &str, deck: &DeckView) {
    let ring = if deck.ring_active { Color::Cyan } else { Color::DarkGray };
    let platter = if deck.dragging { Color::Gray } else { Color::DarkGray };

    let half_w = area.width.saturating_sub(2) as f64 / 2.0;
    let half_h = area.height.saturating_sub(2) as f64 * CELL_ASPECT / 2.0;
    let radius = half_w.min(half_h) * 0.9;

    // marker points up at rotation 0 and turns clockwise, like the pointer
    let theta = (deck.rotation_deg - 90.0).to_radians();
    let (mx, my) = (theta.cos() * radius, -theta.sin() * radius);

    let canvas = Canvas::default()
        .block(Block::bordered().title(title.to_string()).border_style(Style::default().fg(ring)))
        .marker(Marker::Braille)
        .x_bounds([-half_w.max(1.0), half_w.max(1.0)])
        .y_bounds([-half_h.max(1.0), half_h.max(1.0)])
        .paint(move |ctx| {
            ctx.draw(&Circle { x: 0.0, y: 0.0, radius, color: platter });
            ctx.draw(&Circle { x: 0.0, y: 0.0, radius: radius * 0.3, color: ring });
            ctx.draw(&Line { x1: mx * 0.3, y1: my * 0.3, x2: mx, y2: my, color: Color::White });
        });
    frame.render_widget(canvas, area);
}

// neon ring indicator as text, for the status line
pub fn ring_label(deck: &DeckView) -> &'static str {
    match (deck.ring_active, deck.dragging) {
        (true, _) => "SCRATCH",
        (false, true) => "HOLD",
        (false, false) => "-",
    }
}
