//! Color theme and styling for the Hawas TUI

use hawas_core::StatementState;
use ratatui::style::{Color, Modifier, Style};

/// Game UI color theme
#[derive(Debug, Clone)]
pub struct HawasTheme {
    // Base colors
    pub foreground: Color,
    pub border: Color,
    pub accent: Color,
    pub accent_dark: Color,
    pub muted: Color,

    // Verdict colors
    pub correct: Color,
    pub wrong: Color,

    // Aids
    pub aid_ready: Color,
    pub aid_blocked: Color,
    pub hint: Color,
}

impl Default for HawasTheme {
    fn default() -> Self {
        Self {
            foreground: Color::White,
            border: Color::DarkGray,
            accent: Color::Rgb(34, 211, 238),
            accent_dark: Color::Rgb(8, 145, 178),
            muted: Color::Rgb(148, 163, 184),

            correct: Color::Green,
            wrong: Color::Red,

            aid_ready: Color::Yellow,
            aid_blocked: Color::DarkGray,
            hint: Color::LightYellow,
        }
    }
}

impl HawasTheme {
    /// Get border style
    pub fn border_style(&self, focused: bool) -> Style {
        Style::default().fg(if focused { self.accent } else { self.border })
    }

    pub fn title_style(&self) -> Style {
        Style::default()
            .fg(self.accent)
            .add_modifier(Modifier::BOLD)
    }

    pub fn muted_style(&self) -> Style {
        Style::default().fg(self.muted)
    }

    /// Highlighted list entry
    pub fn selected_style(&self) -> Style {
        Style::default().bg(self.accent_dark).fg(self.foreground)
    }

    pub fn hint_style(&self) -> Style {
        Style::default()
            .fg(self.hint)
            .add_modifier(Modifier::ITALIC)
    }

    pub fn aid_style(&self, usable: bool) -> Style {
        if usable {
            Style::default()
                .fg(self.aid_ready)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default()
                .fg(self.aid_blocked)
                .add_modifier(Modifier::DIM)
        }
    }

    pub fn verdict_style(&self, correct: bool) -> Style {
        Style::default()
            .fg(if correct { self.correct } else { self.wrong })
            .add_modifier(Modifier::BOLD)
    }

    /// Get style for a statement button
    pub fn statement_style(&self, state: StatementState) -> Style {
        match state {
            StatementState::Open => Style::default().fg(self.foreground),
            StatementState::DisabledByAid => Style::default()
                .fg(self.aid_blocked)
                .add_modifier(Modifier::CROSSED_OUT | Modifier::DIM),
            StatementState::Correct => Style::default()
                .fg(self.correct)
                .add_modifier(Modifier::BOLD),
            StatementState::ChosenWrong => Style::default()
                .fg(self.wrong)
                .add_modifier(Modifier::BOLD),
            StatementState::Dimmed => Style::default()
                .fg(self.muted)
                .add_modifier(Modifier::DIM),
        }
    }
}
