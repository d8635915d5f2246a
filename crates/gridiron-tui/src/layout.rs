// Screen layout for the analysis session.
//
// +--------------------------------------------------+
// | Title Bar (1 row)                                 |
// +------------------+-------------------------------+
// | Menu (38 cols)   | Figure (fill)                 |
// |                  |                               |
// +------------------+-------------------------------+
// | Help Bar (1 row)                                  |
// +--------------------------------------------------+

use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Width of the action menu column.
pub const MENU_WIDTH: u16 = 38;

#[derive(Debug, Clone)]
pub struct AnalyzerLayout {
    pub title_bar: Rect,
    pub menu: Rect,
    pub figure: Rect,
    pub help_bar: Rect,
}

pub fn build_layout(area: Rect) -> AnalyzerLayout {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(5),
            Constraint::Length(1),
        ])
        .split(area);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(MENU_WIDTH), Constraint::Min(10)])
        .split(vertical[1]);

    AnalyzerLayout {
        title_bar: vertical[0],
        menu: horizontal[0],
        figure: horizontal[1],
        help_bar: vertical[2],
    }
}

/// Figure-only layout used when a single chart is shown: body plus help bar.
pub fn build_viewer_layout(area: Rect) -> (Rect, Rect) {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(5), Constraint::Length(1)])
        .split(area);
    (vertical[0], vertical[1])
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn test_area() -> Rect {
        Rect::new(0, 0, 160, 50)
    }

    #[test]
    fn layout_all_rects_nonzero() {
        let layout = build_layout(test_area());
        for (name, rect) in [
            ("title_bar", layout.title_bar),
            ("menu", layout.menu),
            ("figure", layout.figure),
            ("help_bar", layout.help_bar),
        ] {
            assert!(rect.width > 0 && rect.height > 0, "{name} has zero area: {rect:?}");
        }
    }

    #[test]
    fn layout_bars_are_one_row() {
        let layout = build_layout(test_area());
        assert_eq!(layout.title_bar.height, 1);
        assert_eq!(layout.help_bar.height, 1);
    }

    #[test]
    fn layout_menu_is_fixed_width_and_left_of_figure() {
        let layout = build_layout(test_area());
        assert_eq!(layout.menu.width, MENU_WIDTH);
        assert!(layout.menu.x < layout.figure.x);
        assert_eq!(layout.menu.width + layout.figure.width, 160);
    }

    #[test]
    fn viewer_layout_leaves_help_row() {
        let (body, help) = build_viewer_layout(test_area());
        assert_eq!(help.height, 1);
        assert_eq!(body.height, 49);
    }
}
