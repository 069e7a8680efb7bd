//! Statement buttons widget

use hawas_core::StatementState;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget, Wrap},
};

use crate::ui::theme::HawasTheme;

/// The statements of the current question, one numbered line each
pub struct StatementsWidget<'a> {
    statements: &'a [String],
    states: &'a [StatementState],
    theme: &'a HawasTheme,
    title: Option<&'a str>,
}

impl<'a> StatementsWidget<'a> {
    pub fn new(statements: &'a [String], states: &'a [StatementState], theme: &'a HawasTheme) -> Self {
        Self {
            statements,
            states,
            theme,
            title: None,
        }
    }

    pub fn title(mut self, title: &'a str) -> Self {
        self.title = Some(title);
        self
    }
}

fn marker(state: StatementState) -> &'static str {
    match state {
        StatementState::Open => "   ",
        StatementState::DisabledByAid => " ✗ ",
        StatementState::Correct => " ✓ ",
        StatementState::ChosenWrong => " ✗ ",
        StatementState::Dimmed => "   ",
    }
}

impl Widget for StatementsWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let mut block = Block::default()
            .borders(Borders::ALL)
            .border_style(self.theme.border_style(false));
        if let Some(title) = self.title {
            block = block.title(format!(" {title} "));
        }

        let mut lines = Vec::with_capacity(self.statements.len() * 2);
        for (i, statement) in self.statements.iter().enumerate() {
            let state = self.states.get(i).copied().unwrap_or(StatementState::Open);
            let style = self.theme.statement_style(state);
            lines.push(Line::from(vec![
                Span::styled(format!("[{}]", i + 1), self.theme.muted_style()),
                Span::styled(marker(state), style),
                Span::styled(statement.as_str(), style),
            ]));
            lines.push(Line::from(""));
        }

        Paragraph::new(lines)
            .block(block)
            .wrap(Wrap { trim: true })
            .render(area, buf);
    }
}
