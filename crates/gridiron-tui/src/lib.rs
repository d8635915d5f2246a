// Terminal presentation for league analysis and training curves.
//
// The analyzer owns an `AnalyzerState` built from one `LeagueSummary`. Key
// presses move through the action menu; Enter dispatches the selected action
// and the resulting figure is drawn beside the menu on every render tick.
// Closing the session discards everything.

pub mod dispatch;
pub mod figure;
pub mod input;
pub mod layout;
pub mod render;

use std::time::Duration;

use crossterm::event::{Event, EventStream, KeyEvent};
use futures_util::StreamExt;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};
use ratatui::Frame;
use tracing::{debug, info};

use gridiron_football::LeagueSummary;

use dispatch::{actions, Action};
use figure::Figure;
use input::{handle_analyzer_key, handle_viewer_key, Flow};
use layout::{build_layout, build_viewer_layout};
use render::render_figure;

// ---------------------------------------------------------------------------
// Screen state
// ---------------------------------------------------------------------------

/// Menu selection and the figure currently shown.
pub struct AnalyzerState {
    pub summary: LeagueSummary,
    pub actions: Vec<Action>,
    pub selected: usize,
    pub figure: Option<Figure>,
    /// Vertical offset for text figures.
    pub scroll: u16,
}

impl AnalyzerState {
    pub fn new(summary: LeagueSummary) -> Self {
        let actions = actions(&summary);
        AnalyzerState {
            summary,
            actions,
            selected: 0,
            figure: None,
            scroll: 0,
        }
    }

    pub fn select_next(&mut self) {
        if self.selected + 1 < self.actions.len() {
            self.selected += 1;
        }
    }

    pub fn select_previous(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }
}

/// A single figure on the whole screen.
pub struct FigureViewer {
    pub figure: Figure,
    pub scroll: u16,
}

impl FigureViewer {
    pub fn new(figure: Figure) -> Self {
        FigureViewer { figure, scroll: 0 }
    }
}

/// What the event loop needs from a screen.
trait Screen {
    fn draw(&self, frame: &mut Frame);
    fn on_key(&mut self, key: KeyEvent) -> Flow;
}

impl Screen for AnalyzerState {
    fn draw(&self, frame: &mut Frame) {
        render_analyzer(frame, self);
    }

    fn on_key(&mut self, key: KeyEvent) -> Flow {
        handle_analyzer_key(key, self)
    }
}

impl Screen for FigureViewer {
    fn draw(&self, frame: &mut Frame) {
        render_viewer(frame, self);
    }

    fn on_key(&mut self, key: KeyEvent) -> Flow {
        handle_viewer_key(key, self)
    }
}

// ---------------------------------------------------------------------------
// Render frame
// ---------------------------------------------------------------------------

fn help_bar(text: &str) -> Paragraph<'_> {
    Paragraph::new(Line::from(vec![Span::styled(
        text,
        Style::default().fg(Color::White).add_modifier(Modifier::DIM),
    )]))
    .style(Style::default().bg(Color::DarkGray))
}

pub fn render_analyzer(frame: &mut Frame, state: &AnalyzerState) {
    let layout = build_layout(frame.area());

    let lineup = state
        .summary
        .lineup_week
        .map(|w| format!(" | Lineups: week {w}"))
        .unwrap_or_default();
    let title = format!(
        " Fantasy Football Data Analysis | Week {} | Teams: {}{}",
        state.summary.current_week,
        state.summary.teams.len(),
        lineup
    );
    let title_bar = Paragraph::new(Line::from(vec![Span::styled(
        title,
        Style::default().fg(Color::White),
    )]))
    .style(Style::default().bg(Color::DarkGray));
    frame.render_widget(title_bar, layout.title_bar);

    let items: Vec<ListItem> = state
        .actions
        .iter()
        .map(|a| ListItem::new(a.label()))
        .collect();
    let menu = List::new(items)
        .block(Block::default().borders(Borders::ALL).title("Actions"))
        .highlight_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");
    let mut list_state = ListState::default().with_selected(Some(state.selected));
    frame.render_stateful_widget(menu, layout.menu, &mut list_state);

    match &state.figure {
        Some(figure) => render_figure(frame, layout.figure, figure, state.scroll),
        None => {
            let placeholder = Paragraph::new("  Select an action and press Enter.")
                .style(Style::default().fg(Color::DarkGray))
                .block(Block::default().borders(Borders::ALL).title("Figure"));
            frame.render_widget(placeholder, layout.figure);
        }
    }

    frame.render_widget(
        help_bar(" q:Quit | Up/Down:Select | Enter:Show | PgUp/PgDn:Scroll"),
        layout.help_bar,
    );
}

pub fn render_viewer(frame: &mut Frame, viewer: &FigureViewer) {
    let (body, help) = build_viewer_layout(frame.area());
    render_figure(frame, body, &viewer.figure, viewer.scroll);
    frame.render_widget(help_bar(" q/Enter:Close | PgUp/PgDn:Scroll"), help);
}

// ---------------------------------------------------------------------------
// Event loop
// ---------------------------------------------------------------------------

async fn event_loop<S: Screen>(screen: &mut S) -> anyhow::Result<()> {
    let mut terminal = ratatui::init();

    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        ratatui::restore();
        original_hook(panic_info);
    }));

    let mut event_stream = EventStream::new();
    let mut render_tick = tokio::time::interval(Duration::from_millis(33));
    render_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    let result = loop {
        tokio::select! {
            maybe_event = event_stream.next() => {
                match maybe_event {
                    Some(Ok(Event::Key(key))) => {
                        if screen.on_key(key) == Flow::Quit {
                            break Ok(());
                        }
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => break Err(anyhow::Error::from(e)),
                    None => break Ok(()),
                }
            }

            _ = render_tick.tick() => {
                if let Err(e) = terminal.draw(|frame| screen.draw(frame)) {
                    break Err(e.into());
                }
            }
        }
    };

    ratatui::restore();
    result
}

/// Run the interactive analysis session until the user quits.
pub async fn run_analyzer(summary: LeagueSummary) -> anyhow::Result<()> {
    info!(
        teams = summary.teams.len(),
        week = summary.current_week,
        "starting analysis session"
    );
    let mut state = AnalyzerState::new(summary);
    event_loop(&mut state).await?;
    debug!("analysis session closed");
    Ok(())
}

/// Show one figure full-screen until dismissed.
pub async fn show_figure(figure: Figure) -> anyhow::Result<()> {
    let mut viewer = FigureViewer::new(figure);
    event_loop(&mut viewer).await
}

// ---------------------------------------------------------------------------
// Test support
// ---------------------------------------------------------------------------


// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
