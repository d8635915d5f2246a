// Figure rendering: scatter and box plots on a braille canvas, line series
// on a ratatui chart, grids as tiled sub-areas.

use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::symbols::Marker;
use ratatui::text::Span;
use ratatui::widgets::canvas::{Canvas, Context, Line as CanvasLine, Points};
use ratatui::widgets::{
    Axis, Block, Borders, Chart, Dataset, GraphType, LegendPosition, Paragraph,
};
use ratatui::Frame;

use crate::figure::{padded_bounds, BoxStats, Figure, ScatterPoint, Series};

/// Series colors, cycled.
const PALETTE: [Color; 8] = [
    Color::Cyan,
    Color::Yellow,
    Color::Green,
    Color::Magenta,
    Color::LightRed,
    Color::LightBlue,
    Color::White,
    Color::LightGreen,
];

const POINT_COLOR: Color = Color::Gray;
const HIGHLIGHT_COLOR: Color = Color::Red;
const BOX_HALF_WIDTH: f64 = 0.25;

pub fn series_color(index: usize) -> Color {
    PALETTE[index % PALETTE.len()]
}

fn figure_block<'a>(title: &'a str, x_label: &str, y_label: &str) -> Block<'a> {
    Block::default()
        .borders(Borders::ALL)
        .title(Span::styled(title, Style::default().add_modifier(Modifier::BOLD)))
        .title_bottom(format!(" x: {x_label} | y: {y_label} "))
}

/// Draw `figure` into `area`. `scroll` only applies to text figures.
pub fn render_figure(frame: &mut Frame, area: Rect, figure: &Figure, scroll: u16) {
    match figure {
        Figure::Scatter {
            title,
            x_label,
            y_label,
            categories,
            points,
        } => render_scatter(frame, area, figure_block(title, x_label, y_label), categories, points),
        Figure::BoxPlot {
            title,
            x_label,
            y_label,
            boxes,
        } => render_box_plot(frame, area, figure_block(title, x_label, y_label), boxes),
        Figure::Lines {
            title,
            x_label,
            y_label,
            series,
            legend,
        } => render_lines(frame, area, title, x_label, y_label, series, *legend),
        Figure::Grid { title, figures } => render_grid(frame, area, title, figures),
        Figure::Text { title, body } => {
            let paragraph = Paragraph::new(body.as_str())
                .block(Block::default().borders(Borders::ALL).title(title.as_str()))
                .scroll((scroll, 0));
            frame.render_widget(paragraph, area);
        }
    }
}

/// Rows and columns for tiling `n` figures, columns first.
pub fn grid_shape(n: usize) -> (usize, usize) {
    if n == 0 {
        return (0, 0);
    }
    let cols = (n as f64).sqrt().ceil() as usize;
    let rows = n.div_ceil(cols);
    (rows, cols)
}

fn render_grid(frame: &mut Frame, area: Rect, title: &str, figures: &[Figure]) {
    let block = Block::default().borders(Borders::ALL).title(title);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let (rows, cols) = grid_shape(figures.len());
    if rows == 0 {
        return;
    }
    let row_areas = Layout::vertical(vec![Constraint::Ratio(1, rows as u32); rows]).split(inner);
    let mut remaining = figures.iter();
    for row_area in row_areas.iter() {
        let cells = Layout::horizontal(vec![Constraint::Ratio(1, cols as u32); cols]).split(*row_area);
        for cell in cells.iter() {
            match remaining.next() {
                Some(figure) => render_figure(frame, *cell, figure, 0),
                None => return,
            }
        }
    }
}

/// Category names along the bottom edge of a canvas.
fn print_categories(ctx: &mut Context, categories: &[String], y: f64) {
    for (i, name) in categories.iter().enumerate() {
        ctx.print(i as f64 - 0.1, y, name.clone());
    }
}

/// Top and middle tick values along the left edge.
fn print_y_ticks(ctx: &mut Context, x: f64, y_bounds: [f64; 2]) {
    let mid = (y_bounds[0] + y_bounds[1]) / 2.0;
    ctx.print(x, y_bounds[1], format!("{:.1}", y_bounds[1]));
    ctx.print(x, mid, format!("{mid:.1}"));
}

/// Canvas bounds for `n` categories with a spare row under the data for
/// the category names.
fn category_bounds(n: usize, values: impl IntoIterator<Item = f64>) -> ([f64; 2], [f64; 2]) {
    let x_bounds = [-0.75, n.max(1) as f64 - 0.25];
    let [lo, hi] = padded_bounds(values);
    let y_bounds = [lo - (hi - lo) * 0.1, hi];
    (x_bounds, y_bounds)
}

fn render_scatter(
    frame: &mut Frame,
    area: Rect,
    block: Block,
    categories: &[String],
    points: &[ScatterPoint],
) {
    let (x_bounds, y_bounds) = category_bounds(categories.len(), points.iter().map(|p| p.y));
    let canvas = Canvas::default()
        .block(block)
        .marker(Marker::Braille)
        .x_bounds(x_bounds)
        .y_bounds(y_bounds)
        .paint(|ctx| {
            for point in points.iter().filter(|p| !p.highlight) {
                ctx.draw(&Points {
                    coords: &[(point.x as f64, point.y)],
                    color: POINT_COLOR,
                });
            }
            // Highlights drawn last so they sit on top.
            for point in points.iter().filter(|p| p.highlight) {
                ctx.draw(&Points {
                    coords: &[(point.x as f64, point.y)],
                    color: HIGHLIGHT_COLOR,
                });
            }
            for point in points {
                if let Some(label) = &point.label {
                    let style = if point.highlight {
                        Style::default().fg(HIGHLIGHT_COLOR)
                    } else {
                        Style::default().fg(Color::White)
                    };
                    ctx.print(point.x as f64 + 0.08, point.y, Span::styled(label.clone(), style));
                }
            }
            print_categories(ctx, categories, y_bounds[0]);
            print_y_ticks(ctx, x_bounds[0], y_bounds);
        });
    frame.render_widget(canvas, area);
}

fn draw_box(ctx: &mut Context, x: f64, b: &BoxStats, color: Color) {
    let (left, right) = (x - BOX_HALF_WIDTH, x + BOX_HALF_WIDTH);
    let segments = [
        // Box outline.
        (left, b.q1, right, b.q1),
        (left, b.q3, right, b.q3),
        (left, b.q1, left, b.q3),
        (right, b.q1, right, b.q3),
        // Whiskers and caps.
        (x, b.whisker_low, x, b.q1),
        (x, b.q3, x, b.whisker_high),
        (x - BOX_HALF_WIDTH / 2.0, b.whisker_low, x + BOX_HALF_WIDTH / 2.0, b.whisker_low),
        (x - BOX_HALF_WIDTH / 2.0, b.whisker_high, x + BOX_HALF_WIDTH / 2.0, b.whisker_high),
    ];
    for (x1, y1, x2, y2) in segments {
        ctx.draw(&CanvasLine::new(x1, y1, x2, y2, color));
    }
    ctx.draw(&CanvasLine::new(left, b.median, right, b.median, Color::Yellow));
    let outliers: Vec<(f64, f64)> = b.outliers.iter().map(|&y| (x, y)).collect();
    ctx.draw(&Points {
        coords: &outliers,
        color: HIGHLIGHT_COLOR,
    });
}

fn render_box_plot(frame: &mut Frame, area: Rect, block: Block, boxes: &[BoxStats]) {
    let categories: Vec<String> = boxes.iter().map(|b| b.label.clone()).collect();
    let (x_bounds, y_bounds) = category_bounds(
        boxes.len(),
        boxes.iter().flat_map(|b| [b.min(), b.max()]),
    );
    let canvas = Canvas::default()
        .block(block)
        .marker(Marker::Braille)
        .x_bounds(x_bounds)
        .y_bounds(y_bounds)
        .paint(|ctx| {
            for (i, b) in boxes.iter().enumerate() {
                draw_box(ctx, i as f64, b, Color::Cyan);
            }
            print_categories(ctx, &categories, y_bounds[0]);
            print_y_ticks(ctx, x_bounds[0], y_bounds);
        });
    frame.render_widget(canvas, area);
}

/// Smallest and largest x over all series, widened when degenerate.
fn x_bounds(series: &[Series]) -> [f64; 2] {
    let xs = series.iter().flat_map(|s| s.points.iter().map(|p| p.0));
    let (lo, hi) = xs.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), x| {
        (lo.min(x), hi.max(x))
    });
    if lo > hi {
        [0.0, 1.0]
    } else if lo == hi {
        [lo - 0.5, hi + 0.5]
    } else {
        [lo, hi]
    }
}

fn render_lines(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    x_label: &str,
    y_label: &str,
    series: &[Series],
    legend: bool,
) {
    let datasets: Vec<Dataset> = series
        .iter()
        .enumerate()
        .map(|(i, s)| {
            Dataset::default()
                .name(s.name.clone())
                .marker(Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(series_color(i)))
                .data(&s.points)
        })
        .collect();

    let xb = x_bounds(series);
    let yb = padded_bounds(series.iter().flat_map(|s| s.points.iter().map(|p| p.1)));
    let chart = Chart::new(datasets)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(Span::styled(title, Style::default().add_modifier(Modifier::BOLD))),
        )
        .x_axis(
            Axis::default()
                .title(x_label.to_string())
                .style(Style::default().fg(Color::Gray))
                .bounds(xb)
                .labels([format!("{:.0}", xb[0]), format!("{:.0}", xb[1])]),
        )
        .y_axis(
            Axis::default()
                .title(y_label.to_string())
                .style(Style::default().fg(Color::Gray))
                .bounds(yb)
                .labels([
                    format!("{:.1}", yb[0]),
                    format!("{:.1}", (yb[0] + yb[1]) / 2.0),
                    format!("{:.1}", yb[1]),
                ]),
        )
        .legend_position(legend.then_some(LegendPosition::TopRight))
        .hidden_legend_constraints((Constraint::Ratio(1, 1), Constraint::Ratio(1, 1)));
    frame.render_widget(chart, area);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::{dispatch, Action, Outcome};
    use crate::test_support::{buffer_text, sample_league};
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    fn draw(figure: &Figure, width: u16, height: u16) -> String {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal
            .draw(|frame| render_figure(frame, frame.area(), figure, 0))
            .unwrap();
        buffer_text(terminal.backend().buffer())
    }

    fn figure_for(action: Action) -> Figure {
        match dispatch(&action, &sample_league()) {
            Outcome::Show(figure) => figure,
            Outcome::Quit => panic!("unexpected quit"),
        }
    }

    #[test]
    fn grid_shapes() {
        assert_eq!(grid_shape(0), (0, 0));
        assert_eq!(grid_shape(1), (1, 1));
        assert_eq!(grid_shape(4), (2, 2));
        assert_eq!(grid_shape(5), (2, 3));
        assert_eq!(grid_shape(10), (3, 4));
    }

    #[test]
    fn line_bounds_cover_all_series() {
        let series = vec![
            Series::indexed("a", &[1.0, 2.0]),
            Series::indexed("b", &[1.0, 2.0, 3.0]),
        ];
        assert_eq!(x_bounds(&series), [1.0, 3.0]);
        assert_eq!(x_bounds(&[Series::indexed("a", &[4.0])]), [0.5, 1.5]);
        assert_eq!(x_bounds(&[]), [0.0, 1.0]);
    }

    #[test]
    fn scatter_shows_title_categories_and_labels() {
        let text = draw(&figure_for(Action::StarterRanks), 120, 30);
        assert!(text.contains("Starting Lineups (Week 3)"));
        assert!(text.contains("AAA"));
        assert!(text.contains("BBB"));
        assert!(text.contains("6.0"));
    }

    #[test]
    fn box_plot_renders_team_names() {
        let text = draw(&figure_for(Action::ScoreBoxPlot), 100, 30);
        assert!(text.contains("Scores of Each Team (Week 3)"));
        assert!(text.contains("AAA"));
    }

    #[test]
    fn line_chart_shows_legend_when_requested() {
        let text = draw(&figure_for(Action::ScoresTogether), 100, 30);
        assert!(text.contains("Scores of Each Team Over Time"));
        assert!(text.contains("AAA"));
        assert!(text.contains("Week"));
    }

    #[test]
    fn grid_and_text_render_in_small_areas() {
        draw(&figure_for(Action::PlotAll), 60, 20);
        draw(&figure_for(Action::ScoresSeparately), 40, 12);
        let text = draw(&figure_for(Action::DebugDump), 80, 10);
        assert!(text.contains("Debug"));
    }

    #[test]
    fn empty_figures_do_not_panic() {
        draw(
            &Figure::Grid {
                title: "Empty".into(),
                figures: vec![],
            },
            40,
            10,
        );
        draw(&Figure::loss_curve(&[], &[]), 40, 10);
        draw(
            &Figure::Scatter {
                title: "None".into(),
                x_label: "Team".into(),
                y_label: "Rank".into(),
                categories: vec![],
                points: vec![],
            },
            40,
            10,
        );
    }
}
