//! Layout calculations for the Hawas TUI

use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Areas of the gameplay screen
pub struct GameLayout {
    pub header: Rect,
    pub topic: Rect,
    pub aids: Rect,
    pub hint: Rect,
    pub statements: Rect,
    pub status_bar: Rect,
}

impl GameLayout {
    pub fn calculate(area: Rect) -> Self {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1), // Level and question counter
                Constraint::Length(1), // Topic
                Constraint::Length(3), // Aid buttons
                Constraint::Length(2), // Hint
                Constraint::Min(6),    // Statements
                Constraint::Length(1), // Status bar
            ])
            .split(area);

        Self {
            header: chunks[0],
            topic: chunks[1],
            aids: chunks[2],
            hint: chunks[3],
            statements: chunks[4],
            status_bar: chunks[5],
        }
    }
}

/// Areas of the home screen
pub struct HomeLayout {
    pub title: Rect,
    pub note: Rect,
    pub chart: Rect,
    pub status_bar: Rect,
}

impl HomeLayout {
    pub fn calculate(area: Rect) -> Self {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Name, level, XP
                Constraint::Length(4), // Personalized note
                Constraint::Min(8),    // Chart
                Constraint::Length(1), // Status bar
            ])
            .split(area);

        Self {
            title: chunks[0],
            note: chunks[1],
            chart: chunks[2],
            status_bar: chunks[3],
        }
    }
}

/// Calculate fixed-size centered popup
pub fn centered_rect_fixed(width: u16, height: u16, area: Rect) -> Rect {
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;

    Rect::new(x, y, width.min(area.width), height.min(area.height))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_centered_rect_fits_small_area() {
        let area = Rect::new(0, 0, 20, 10);
        let popup = centered_rect_fixed(60, 20, area);
        assert_eq!(popup, Rect::new(0, 0, 20, 10));

        let popup = centered_rect_fixed(10, 4, area);
        assert_eq!(popup, Rect::new(5, 3, 10, 4));
    }
}
