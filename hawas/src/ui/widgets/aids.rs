//! Aid buttons widget

use hawas_core::AidKind;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

use crate::ui::theme::HawasTheme;

/// One aid button: kind, remaining count, cost and whether it can be used now.
#[derive(Debug, Clone, Copy)]
pub struct AidButton {
    pub kind: AidKind,
    pub count: u32,
    pub cost: u32,
    pub usable: bool,
}

/// Row of aid buttons with their hotkeys
pub struct AidBarWidget<'a> {
    buttons: &'a [AidButton],
    theme: &'a HawasTheme,
}

impl<'a> AidBarWidget<'a> {
    pub fn new(buttons: &'a [AidButton], theme: &'a HawasTheme) -> Self {
        Self { buttons, theme }
    }
}

fn hotkey(kind: AidKind) -> &'static str {
    match kind {
        AidKind::Reveal => "r",
        AidKind::Narrow => "n",
    }
}

impl Widget for AidBarWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let mut spans = Vec::new();
        for button in self.buttons {
            spans.push(Span::styled(
                format!("{} ", hotkey(button.kind)),
                self.theme.muted_style(),
            ));
            spans.push(Span::styled(
                button.kind.button_label(button.count, button.cost),
                self.theme.aid_style(button.usable),
            ));
            spans.push(Span::raw("  "));
        }

        Paragraph::new(Line::from(spans))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(self.theme.border_style(false)),
            )
            .render(area, buf);
    }
}
