use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Paragraph};
use ratatui::Frame;

use crate::shared::PadView;

// The pad column: one bordered cell per pad, lit while held and brighter
// during the first part of each pulse
pub fn draw_pads(frame: &mut Frame, rects: &[Rect], pads: &[PadView]) {
    for (pad, area) in pads.iter().zip(rects) {
        let style = pad_style(pad);
        let label = if pad.silent {
            format!("{}\n[{}] no sound", pad.label, pad.key)
        } else {
            format!("{}\n[{}]", pad.label, pad.key)
        };
        let block = Block::bordered().border_style(style).style(style);
        let inner = block.inner(*area);
        frame.render_widget(block, *area);

        // centre the two label lines vertically
        let top = inner.height.saturating_sub(2) / 2;
        let text_area = Rect { y: inner.y + top, height: inner.height - top, ..inner };
        frame.render_widget(
            Paragraph::new(label).alignment(Alignment::Center).style(style),
            text_area,
        );
    }
}

fn pad_style(pad: &PadView) -> Style {
    if pad.active && pad.glow {
        Style::default()
            .fg(Color::White)
            .bg(Color::LightMagenta)
            .add_modifier(Modifier::BOLD)
    } else if pad.active {
        Style::default().fg(Color::LightMagenta).bg(Color::Magenta)
    } else if pad.silent {
        Style::default().fg(Color::Red)
    } else {
        Style::default().fg(Color::DarkGray)
    }
}
