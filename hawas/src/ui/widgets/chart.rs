//! Recent-rounds bar chart widget

use hawas_core::performance::{PerformanceChart, CHART_TITLE, EMPTY_HISTORY_MESSAGE};
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    text::Line,
    widgets::{Bar, BarChart, BarGroup, Block, Borders, Paragraph, Widget, Wrap},
};

use crate::ui::theme::HawasTheme;

/// Bar chart of the last rounds' scores, or a prompt to play the first one
pub struct PerformanceChartWidget<'a> {
    chart: Option<&'a PerformanceChart>,
    max_score: u64,
    theme: &'a HawasTheme,
}

impl<'a> PerformanceChartWidget<'a> {
    pub fn new(chart: Option<&'a PerformanceChart>, theme: &'a HawasTheme) -> Self {
        Self {
            chart,
            max_score: 0,
            theme,
        }
    }

    /// Score of a perfect round; sets the top of the axis.
    pub fn max_score(mut self, max_score: usize) -> Self {
        self.max_score = max_score as u64;
        self
    }
}

impl Widget for PerformanceChartWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title(format!(" {CHART_TITLE} "))
            .title_alignment(Alignment::Right)
            .borders(Borders::ALL)
            .border_style(self.theme.border_style(false));

        let Some(chart) = self.chart else {
            Paragraph::new(Line::styled(EMPTY_HISTORY_MESSAGE, self.theme.muted_style()))
                .block(block)
                .alignment(Alignment::Center)
                .wrap(Wrap { trim: true })
                .render(area, buf);
            return;
        };

        let bars: Vec<Bar> = chart
            .bars()
            .iter()
            .map(|bar| {
                Bar::default()
                    .value(u64::from(bar.score))
                    .text_value(bar.score_label.clone())
                    .label(Line::from(bar.date_label.clone()))
                    .style(self.theme.muted_style().fg(self.theme.accent))
            })
            .collect();

        let mut bar_chart = BarChart::default()
            .block(block)
            .data(BarGroup::default().bars(&bars))
            .bar_width(7)
            .bar_gap(2)
            .value_style(self.theme.selected_style());
        if self.max_score > 0 {
            bar_chart = bar_chart.max(self.max_score);
        }
        bar_chart.render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rendered(widget: PerformanceChartWidget<'_>) -> String {
        let area = Rect::new(0, 0, 60, 12);
        let mut buf = Buffer::empty(area);
        widget.render(area, &mut buf);
        buf.content().iter().map(|c| c.symbol()).collect()
    }

    #[test]
    fn test_empty_history_shows_prompt() {
        let theme = HawasTheme::default();
        let text = rendered(PerformanceChartWidget::new(None, &theme));
        assert!(text.contains("أكمل"));
    }
}
