use crossterm::event::{
    self, Event, KeyCode, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use std::time::Duration;

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Action {
    Quit,
    /// Toggle the fish at this index.
    ToggleFish(usize),
    /// Toggle whatever fish is under this terminal cell.
    Click { col: u16, row: u16 },
    AddFish,
    HudToggle,
    HelpToggle,
    Redraw,
    Resize { cols: u16, rows: u16 },
}

/// Drains pending terminal events without blocking the frame.
pub(crate) fn collect_actions(max_wait: Duration) -> anyhow::Result<Vec<Action>> {
    let mut out = Vec::new();
    let timeout = std::cmp::min(Duration::from_millis(1), max_wait);
    while event::poll(timeout)? {
        if let Some(action) = map_event(event::read()?) {
            out.push(action);
        }
        if out.len() >= 32 {
            break;
        }
    }
    Ok(out)
}

pub(crate) fn map_event(ev: Event) -> Option<Action> {
    match ev {
        Event::Resize(cols, rows) => Some(Action::Resize { cols, rows }),
        Event::Mouse(MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column,
            row,
            ..
        }) => Some(Action::Click { col: column, row }),
        Event::Key(k) if k.kind == KeyEventKind::Press => {
            if k.modifiers.contains(KeyModifiers::CONTROL) {
                return match k.code {
                    KeyCode::Char('c') => Some(Action::Quit),
                    KeyCode::Char('l') => Some(Action::Redraw),
                    _ => None,
                };
            }
            match k.code {
                KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => Some(Action::Quit),
                KeyCode::Char(c @ '1'..='9') => {
                    let n = c.to_digit(10)? as usize;
                    Some(Action::ToggleFish(n - 1))
                }
                KeyCode::Char('+') | KeyCode::Char('=') => Some(Action::AddFish),
                KeyCode::Char('h') | KeyCode::Char('H') => Some(Action::HudToggle),
                KeyCode::Char('?') => Some(Action::HelpToggle),
                _ => None,
            }
        }
        _ => None,
    }
}
