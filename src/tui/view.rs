use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph};
use ratatui::Frame;

use crate::shared::{AudioStatus, DisplayState, Screen};

use super::deck::{draw_deck, ring_label};
use super::grid::draw_pads;
use super::layout::BoardLayout;

pub fn render(frame: &mut Frame, state: &DisplayState, layout: &BoardLayout) {
    let area = frame.area();
    match state.screen {
        Screen::Orientation => draw_message(
            frame,
            area,
            &["Rotate to landscape", "", "(make the terminal wider than it is tall)"],
        ),
        Screen::Instruction => draw_message(
            frame,
            area,
            &[
                "DECKPAD",
                "",
                "Drag a turntable in a circle to scratch.",
                "Hold a pad (mouse or its key) to loop its sound.",
                "",
                "[ click or press Space to start ]",
            ],
        ),
        Screen::Main => {
            draw_status(frame, layout.status, state);
            draw_deck(frame, layout.decks[0], " Deck 1 ", &state.decks[0]);
            draw_deck(frame, layout.decks[1], " Deck 2 ", &state.decks[1]);
            draw_pads(frame, &layout.pads, &state.pads);
        }
    }
}

fn draw_message(frame: &mut Frame, area: Rect, lines: &[&str]) {
    let height = lines.len() as u16 + 2;
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Fill(1),
            Constraint::Length(height),
            Constraint::Fill(1),
        ])
        .split(area);

    let text: Vec<Line> = lines.iter().map(|l| Line::from(*l)).collect();
    let para = Paragraph::new(text)
        .alignment(Alignment::Center)
        .block(Block::default())
        .style(Style::default().fg(Color::LightMagenta));
    frame.render_widget(para, rows[1]);
}

fn draw_status(frame: &mut Frame, area: Rect, state: &DisplayState) {
    let (audio, color) = match state.audio {
        AudioStatus::Live => ("LIVE", Color::Green),
        AudioStatus::Locked => ("LOCKED", Color::Yellow),
        AudioStatus::Muted => ("MUTED", Color::Red),
    };
    let line = Line::from(vec![
        Span::styled(" DECKPAD ", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(" audio: "),
        Span::styled(audio, Style::default().fg(color)),
        Span::raw(format!(
            "   deck1: {}  deck2: {}",
            ring_label(&state.decks[0]),
            ring_label(&state.decks[1])
        )),
        Span::styled("   Esc quit", Style::default().fg(Color::DarkGray)),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}
