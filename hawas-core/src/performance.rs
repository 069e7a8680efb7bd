//! Recent-rounds bar chart.

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Write;

pub const CHART_TITLE: &str = "أداء آخر 7 ألعاب";
pub const EMPTY_HISTORY_MESSAGE: &str = "أكمل أول لعبة لك لترى أدائك";

/// How many rounds the chart shows.
pub const CHART_WINDOW: usize = 7;
pub const CHART_HEIGHT: f64 = 150.0;
pub const BAR_WIDTH: f64 = 30.0;
pub const BAR_MARGIN: f64 = 15.0;
/// Space reserved under the bars for the date labels.
pub const LABEL_GUTTER: f64 = 20.0;

const ARABIC_MONTHS: [&str; 12] = [
    "يناير", "فبراير", "مارس", "أبريل", "مايو", "يونيو", "يوليو", "أغسطس", "سبتمبر", "أكتوبر",
    "نوفمبر", "ديسمبر",
];

/// One finished round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreEntry {
    pub score: u32,
    pub date: DateTime<Utc>,
}

impl ScoreEntry {
    pub fn new(score: u32, date: DateTime<Utc>) -> Self {
        Self { score, date }
    }

    pub fn now(score: u32) -> Self {
        Self::new(score, Utc::now())
    }
}

/// Geometry and labels for one bar.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartBar {
    pub score: u32,
    pub x: f64,
    pub y: f64,
    pub height: f64,
    pub score_label: String,
    pub date_label: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PerformanceChart {
    bars: Vec<ChartBar>,
}

impl PerformanceChart {
    /// Lay out the last [`CHART_WINDOW`] entries. `None` for an empty history.
    pub fn new(history: &[ScoreEntry], questions_per_round: usize) -> Option<Self> {
        if history.is_empty() {
            return None;
        }
        let plot = CHART_HEIGHT - LABEL_GUTTER;
        let per_round = questions_per_round.max(1) as f64;
        let start = history.len().saturating_sub(CHART_WINDOW);

        let bars = history[start..]
            .iter()
            .enumerate()
            .map(|(i, entry)| {
                let height = (f64::from(entry.score) / per_round * plot).clamp(0.0, plot);
                ChartBar {
                    score: entry.score,
                    x: i as f64 * (BAR_WIDTH + BAR_MARGIN),
                    y: CHART_HEIGHT - height - LABEL_GUTTER,
                    height,
                    score_label: arabic_digits(entry.score),
                    date_label: date_label(&entry.date),
                }
            })
            .collect();
        Some(Self { bars })
    }

    pub fn bars(&self) -> &[ChartBar] {
        &self.bars
    }

    pub fn width(&self) -> f64 {
        self.bars.len() as f64 * (BAR_WIDTH + BAR_MARGIN)
    }

    pub fn to_svg(&self) -> String {
        let mut svg = format!(
            r#"<svg width="{}" height="{}" aria-label="Performance Graph"><g>"#,
            self.width(),
            CHART_HEIGHT
        );
        for bar in &self.bars {
            let center = bar.x + BAR_WIDTH / 2.0;
            // Writing into a String cannot fail.
            let _ = write!(
                svg,
                r##"<g><rect x="{x}" y="{y}" width="{w}" height="{h}" fill="url(#barGradient)" rx="4"/><text x="{center}" y="{score_y}" fill="white" text-anchor="middle" font-size="12" font-family="monospace">{score}</text><text x="{center}" y="{date_y}" fill="#94a3b8" text-anchor="middle" font-size="10">{date}</text></g>"##,
                x = bar.x,
                y = bar.y,
                w = BAR_WIDTH,
                h = bar.height,
                score_y = bar.y - 5.0,
                score = bar.score,
                date_y = CHART_HEIGHT - 5.0,
                date = bar.date_label,
            );
        }
        svg.push_str(
            r##"</g><defs><linearGradient id="barGradient" x1="0" x2="0" y1="0" y2="1"><stop offset="0%" stop-color="#22d3ee"/><stop offset="100%" stop-color="#0891b2"/></linearGradient></defs></svg>"##,
        );
        svg
    }
}

/// Render a number with Arabic-Indic digits.
pub fn arabic_digits(n: impl ToString) -> String {
    n.to_string()
        .chars()
        .map(|c| match c.to_digit(10) {
            Some(d) => char::from_u32(0x0660 + d).unwrap_or(c),
            None => c,
        })
        .collect()
}

/// "day month", e.g. "١٥ مارس".
pub fn date_label(date: &DateTime<Utc>) -> String {
    let month = ARABIC_MONTHS[date.month0() as usize];
    format!("{} {}", arabic_digits(date.day()), month)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn entry(score: u32, day: u32) -> ScoreEntry {
        ScoreEntry::new(score, Utc.with_ymd_and_hms(2024, 3, day, 12, 0, 0).unwrap())
    }

    #[test]
    fn test_empty_history_has_no_chart() {
        assert!(PerformanceChart::new(&[], 5).is_none());
    }

    #[test]
    fn test_bar_geometry() {
        let chart = PerformanceChart::new(&[entry(5, 1), entry(2, 2), entry(0, 3)], 5).unwrap();
        let bars = chart.bars();
        assert_eq!(bars.len(), 3);
        assert_eq!(chart.width(), 135.0);

        assert_eq!(bars[0].x, 0.0);
        assert_eq!(bars[0].height, 130.0);
        assert_eq!(bars[0].y, 0.0);

        assert_eq!(bars[1].x, 45.0);
        assert_eq!(bars[1].height, 52.0);
        assert_eq!(bars[1].y, 78.0);

        assert_eq!(bars[2].height, 0.0);
        assert_eq!(bars[2].y, 130.0);
    }

    #[test]
    fn test_keeps_last_seven() {
        let history: Vec<ScoreEntry> = (1..=10).map(|d| entry(d % 6, d)).collect();
        let chart = PerformanceChart::new(&history, 5).unwrap();
        assert_eq!(chart.bars().len(), CHART_WINDOW);
        assert_eq!(chart.bars()[0].date_label, "٤ مارس");
        assert_eq!(chart.bars()[6].date_label, "١٠ مارس");
    }

    #[test]
    fn test_score_above_round_length_is_clamped() {
        let chart = PerformanceChart::new(&[entry(9, 1)], 5).unwrap();
        assert_eq!(chart.bars()[0].height, CHART_HEIGHT - LABEL_GUTTER);
    }

    #[test]
    fn test_arabic_labels() {
        assert_eq!(arabic_digits(2024), "٢٠٢٤");
        assert_eq!(arabic_digits(0), "٠");
        let date = Utc.with_ymd_and_hms(2023, 12, 25, 0, 0, 0).unwrap();
        assert_eq!(date_label(&date), "٢٥ ديسمبر");
    }

    #[test]
    fn test_svg_output() {
        let svg = PerformanceChart::new(&[entry(3, 1)], 5).unwrap().to_svg();
        assert!(svg.starts_with(r#"<svg width="45" height="150""#));
        assert!(svg.contains(r#"fill="url(#barGradient)""#));
        assert!(svg.contains("#22d3ee"));
        assert!(svg.contains(">3</text>"));
        assert!(svg.contains("١ مارس"));
        assert!(svg.ends_with("</svg>"));
    }
}
