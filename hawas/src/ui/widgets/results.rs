//! Results modal widget

use hawas_core::results::{ResultsPhase, END_ROUND_LABEL, EXPLANATION_HEADING, FACT_CHECK_HEADING};
use hawas_core::{FactCheck, ResultsView};
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Widget, Wrap},
};

use crate::ui::theme::HawasTheme;

/// The verdict flash, then the full breakdown
pub struct ResultsWidget<'a> {
    view: &'a ResultsView<'a>,
    phase: ResultsPhase,
    theme: &'a HawasTheme,
    animation_frame: u8,
}

impl<'a> ResultsWidget<'a> {
    pub fn new(view: &'a ResultsView<'a>, phase: ResultsPhase, theme: &'a HawasTheme) -> Self {
        Self {
            view,
            phase,
            theme,
            animation_frame: 0,
        }
    }

    pub fn animation_frame(mut self, frame: u8) -> Self {
        self.animation_frame = frame;
        self
    }

    fn verdict_lines(&self) -> Vec<Line<'a>> {
        vec![
            Line::from(""),
            Line::from(Span::styled(
                self.view.verdict,
                self.theme.verdict_style(self.view.correct),
            )),
            Line::from(self.view.verdict_line),
        ]
    }

    fn detail_lines(&self) -> Vec<Line<'a>> {
        let mut lines = self.verdict_lines();
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            self.view.progress_label(),
            self.theme.muted_style(),
        )));
        lines.push(Line::from(vec![
            Span::styled("SCORE ", self.theme.muted_style()),
            Span::styled(self.view.score.to_string(), self.theme.title_style()),
            Span::styled("   STREAK ", self.theme.muted_style()),
            Span::styled(self.view.streak.to_string(), self.theme.title_style()),
            Span::styled("   ACCURACY ", self.theme.muted_style()),
            Span::styled(self.view.accuracy_label(), self.theme.title_style()),
        ]));
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            EXPLANATION_HEADING,
            Style::default().add_modifier(Modifier::UNDERLINED),
        )));
        lines.push(Line::from(self.view.explanation));

        match self.view.fact_check {
            Some(FactCheck::Loading) => {
                let dots = ".".repeat(usize::from(self.animation_frame / 3 % 4));
                lines.push(Line::from(""));
                lines.push(Line::from(Span::styled(
                    format!("{FACT_CHECK_HEADING}{dots}"),
                    self.theme.muted_style(),
                )));
            }
            Some(FactCheck::Resolved { title, url }) => {
                lines.push(Line::from(""));
                lines.push(Line::from(Span::styled(
                    FACT_CHECK_HEADING,
                    Style::default().add_modifier(Modifier::UNDERLINED),
                )));
                lines.push(Line::from(title.as_str()));
                lines.push(Line::from(Span::styled(url.as_str(), self.theme.muted_style())));
            }
            None => {}
        }

        lines.push(Line::from(""));
        lines.push(Line::from(vec![
            Span::styled(format!("Enter {}", self.view.continue_label), self.theme.title_style()),
            Span::raw("   "),
            Span::styled(format!("h {END_ROUND_LABEL}"), self.theme.muted_style()),
        ]));
        lines
    }
}

impl Widget for ResultsWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Clear.render(area, buf);

        let lines = match self.phase {
            ResultsPhase::Flash => self.verdict_lines(),
            ResultsPhase::Details => self.detail_lines(),
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(self.theme.verdict_style(self.view.correct));

        Paragraph::new(lines)
            .block(block)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .render(area, buf);
    }
}
