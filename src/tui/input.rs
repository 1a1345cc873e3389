use std::time::Duration;

use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyEventKind, MouseButton, MouseEvent, MouseEventKind,
};

use crate::shared::{InputEvent, Screen};

use super::layout::Surface;
use super::mode::TuiState;

// poll for input from the terminal, tracking pointer capture and held keys
// in tuistate, and resolve it into semantic input events for the board.
// everything already queued is drained so fast drags aren't left behind
pub fn poll_input(timeout: Duration, ts: &mut TuiState) -> anyhow::Result<Vec<InputEvent>> {
    let mut out = Vec::new();
    if !event::poll(timeout)? {
        return Ok(out);
    }
    loop {
        let ev = event::read()?;
        out.extend(resolve_event(ev, ts));
        if !event::poll(Duration::ZERO)? {
            break;
        }
    }
    Ok(out)
}

pub fn resolve_event(ev: Event, ts: &mut TuiState) -> Vec<InputEvent> {
    match ev {
        Event::Key(key) => handle_key(key, ts),
        Event::Mouse(mouse) => handle_mouse(mouse, ts),
        Event::Resize(cols, rows) => vec![InputEvent::Resize { cols, rows }],
        Event::FocusLost => {
            // like a touch-cancel: nothing stays held
            ts.capture = None;
            ts.keys_down.clear();
            vec![InputEvent::CancelGestures]
        }
        _ => vec![],
    }
}

fn handle_key(key: KeyEvent, ts: &mut TuiState) -> Vec<InputEvent> {
    match (key.code, key.kind) {
        (KeyCode::Esc, KeyEventKind::Press) => vec![InputEvent::Quit],
        (KeyCode::Char(' ') | KeyCode::Enter, KeyEventKind::Press) => vec![InputEvent::Start],
        (KeyCode::Char(c), kind) => match ts.pad_for_key(c) {
            Some(n) => resolve_pad_key(n, kind, ts),
            None => vec![],
        },
        _ => vec![],
    }
}

fn resolve_pad_key(n: u8, kind: KeyEventKind, ts: &mut TuiState) -> Vec<InputEvent> {
    let held = ts.keys_down.contains(&n);
    match kind {
        // auto-repeat, or a second press we already know about
        KeyEventKind::Repeat => vec![],
        KeyEventKind::Press if ts.key_release && held => vec![],
        KeyEventKind::Press if !ts.key_release && held => {
            // no release reports from this terminal: press again to let go
            ts.keys_down.retain(|k| *k != n);
            vec![InputEvent::PadRelease(n)]
        }
        KeyEventKind::Press => {
            ts.keys_down.push(n);
            vec![InputEvent::PadPress(n)]
        }
        KeyEventKind::Release if held => {
            ts.keys_down.retain(|k| *k != n);
            vec![InputEvent::PadRelease(n)]
        }
        KeyEventKind::Release => vec![],
    }
}

fn handle_mouse(mouse: MouseEvent, ts: &mut TuiState) -> Vec<InputEvent> {
    let (col, row) = (mouse.column, mouse.row);
    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => {
            if ts.screen == Screen::Instruction {
                return vec![InputEvent::Start];
            }
            if ts.screen != Screen::Main {
                return vec![];
            }
            // a press while something is still captured means we missed its
            // release; let go of it first
            let mut out = release_capture(ts);
            match ts.layout.hit(col, row) {
                Some(Surface::Deck(deck)) => {
                    ts.capture = Some(Surface::Deck(deck));
                    let at = ts.layout.deck_offset(deck, col, row);
                    out.push(InputEvent::TurntableDown { deck, at, contacts: 1 });
                }
                Some(Surface::Pad(n)) => {
                    ts.capture = Some(Surface::Pad(n));
                    out.push(InputEvent::PadPress(n));
                }
                None => {}
            }
            out
        }
        MouseEventKind::Drag(MouseButton::Left) => match ts.capture {
            Some(Surface::Deck(deck)) => {
                let at = ts.layout.deck_offset(deck, col, row);
                vec![InputEvent::TurntableMove { deck, at, contacts: 1 }]
            }
            Some(Surface::Pad(n)) if !ts.layout.contains(Surface::Pad(n), col, row) => {
                // pointer left the pad
                ts.capture = None;
                vec![InputEvent::PadRelease(n)]
            }
            _ => vec![],
        },
        MouseEventKind::Up(MouseButton::Left) => release_capture(ts),
        _ => vec![],
    }
}

fn release_capture(ts: &mut TuiState) -> Vec<InputEvent> {
    match ts.capture.take() {
        Some(Surface::Deck(deck)) => vec![InputEvent::TurntableUp { deck }],
        Some(Surface::Pad(n)) => vec![InputEvent::PadRelease(n)],
        None => vec![],
    }
}
