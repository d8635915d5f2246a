// Keyboard input handling.
//
// Translates crossterm key events into menu navigation, action dispatch and
// text scrolling on the screen state.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::dispatch::{dispatch, Outcome};
use crate::{AnalyzerState, FigureViewer};

/// Rows moved per PageUp/PageDown.
const PAGE: u16 = 10;

/// Whether the event loop keeps running after a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

fn is_ctrl_c(key: &KeyEvent) -> bool {
    key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c')
}

/// Scroll keys shared by both screens. Returns true when handled.
fn handle_scroll(key: &KeyEvent, scroll: &mut u16) -> bool {
    match key.code {
        KeyCode::PageDown => *scroll = scroll.saturating_add(PAGE),
        KeyCode::PageUp => *scroll = scroll.saturating_sub(PAGE),
        _ => return false,
    }
    true
}

pub fn handle_analyzer_key(key: KeyEvent, state: &mut AnalyzerState) -> Flow {
    // crossterm reports releases on some platforms.
    if key.kind != KeyEventKind::Press {
        return Flow::Continue;
    }
    if is_ctrl_c(&key) {
        return Flow::Quit;
    }
    if handle_scroll(&key, &mut state.scroll) {
        return Flow::Continue;
    }

    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => return Flow::Quit,
        KeyCode::Up | KeyCode::Char('k') => state.select_previous(),
        KeyCode::Down | KeyCode::Char('j') => state.select_next(),
        KeyCode::Home => state.selected = 0,
        KeyCode::End => state.selected = state.actions.len().saturating_sub(1),
        KeyCode::Enter | KeyCode::Char(' ') => {
            let Some(action) = state.actions.get(state.selected) else {
                return Flow::Continue;
            };
            match dispatch(action, &state.summary) {
                Outcome::Quit => return Flow::Quit,
                Outcome::Show(figure) => {
                    state.figure = Some(figure);
                    state.scroll = 0;
                }
            }
        }
        _ => {}
    }
    Flow::Continue
}

pub fn handle_viewer_key(key: KeyEvent, viewer: &mut FigureViewer) -> Flow {
    if key.kind != KeyEventKind::Press {
        return Flow::Continue;
    }
    if is_ctrl_c(&key) {
        return Flow::Quit;
    }
    if handle_scroll(&key, &mut viewer.scroll) {
        return Flow::Continue;
    }
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc | KeyCode::Enter => Flow::Quit,
        _ => Flow::Continue,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
