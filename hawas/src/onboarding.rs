//! Onboarding questionnaire screen.
//!
//! Four single-choice questions; the last choice hands the flow off to be
//! finalized while the loader message shows.

use crossterm::event::{KeyCode, KeyEvent};
use hawas_core::{OnboardingFlow, OnboardingProgress};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Gauge, List, ListItem, ListState, Paragraph, Wrap};

use crate::ui::theme::HawasTheme;

/// What the app should do after a key press.
pub enum OnboardingAction {
    None,
    Quit,
    /// Every question is answered; finalize this flow.
    Finish(OnboardingFlow),
}

/// The questionnaire screen.
pub struct OnboardingScreen {
    /// Taken once the last answer is in.
    flow: Option<OnboardingFlow>,
    greeting: String,
    pub list_state: ListState,
}

impl OnboardingScreen {
    pub fn new(flow: OnboardingFlow) -> Self {
        let greeting = flow.greeting();
        Self {
            flow: Some(flow),
            greeting,
            list_state: ListState::default().with_selected(Some(0)),
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> OnboardingAction {
        let Some(flow) = &self.flow else {
            // Waiting on the note; only quitting is possible.
            return match key.code {
                KeyCode::Esc => OnboardingAction::Quit,
                _ => OnboardingAction::None,
            };
        };
        let option_count = flow
            .current_question()
            .map(|q| q.options.len())
            .unwrap_or(0);
        if option_count == 0 {
            return OnboardingAction::None;
        }

        match key.code {
            KeyCode::Up | KeyCode::Char('k') => {
                let i = self.list_state.selected().unwrap_or(0);
                self.list_state
                    .select(Some(if i == 0 { option_count - 1 } else { i - 1 }));
                OnboardingAction::None
            }
            KeyCode::Down | KeyCode::Char('j') => {
                let i = self.list_state.selected().unwrap_or(0);
                self.list_state.select(Some((i + 1) % option_count));
                OnboardingAction::None
            }
            KeyCode::Enter => {
                let i = self.list_state.selected().unwrap_or(0);
                self.choose(i)
            }
            KeyCode::Char(c @ '1'..='9') => self.choose(c as usize - '1' as usize),
            KeyCode::Esc | KeyCode::Char('q') => OnboardingAction::Quit,
            _ => OnboardingAction::None,
        }
    }

    fn choose(&mut self, option: usize) -> OnboardingAction {
        let Some(flow) = self.flow.as_mut() else {
            return OnboardingAction::None;
        };
        match flow.select(option) {
            Ok(OnboardingProgress::Next { .. }) => {
                self.list_state.select(Some(0));
                OnboardingAction::None
            }
            Ok(OnboardingProgress::ReadyToFinish) => match self.flow.take() {
                Some(flow) => OnboardingAction::Finish(flow),
                None => OnboardingAction::None,
            },
            Ok(OnboardingProgress::Complete(_)) => OnboardingAction::None,
            Err(e) => {
                tracing::debug!(error = %e, "onboarding choice ignored");
                OnboardingAction::None
            }
        }
    }

    pub fn render(&mut self, frame: &mut Frame, area: Rect, theme: &HawasTheme, loading: Option<&str>) {
        frame.render_widget(Clear, area);

        let block = Block::default()
            .title(" هَوَسْ ")
            .borders(Borders::ALL)
            .border_style(theme.border_style(true));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2), // Greeting
                Constraint::Length(1), // Subtitle
                Constraint::Length(2), // Progress
                Constraint::Length(3), // Prompt
                Constraint::Min(0),    // Options
            ])
            .split(inner);

        frame.render_widget(
            Paragraph::new(Line::from(Span::styled(
                self.greeting.as_str(),
                theme.title_style(),
            )))
            .alignment(Alignment::Right),
            chunks[0],
        );

        let Some(flow) = &self.flow else {
            let message = loading.unwrap_or("...");
            let spinner = Paragraph::new(Line::from(Span::styled(message, theme.muted_style())))
                .alignment(Alignment::Center);
            frame.render_widget(spinner, chunks[3]);
            return;
        };

        frame.render_widget(
            Paragraph::new(Span::styled(flow.subtitle(), theme.muted_style()))
                .alignment(Alignment::Right),
            chunks[1],
        );

        let gauge = Gauge::default()
            .block(Block::default())
            .gauge_style(Style::default().fg(theme.accent))
            .percent(flow.progress_percentage())
            .label(format!("{}%", flow.progress_percentage()));
        frame.render_widget(gauge, chunks[2]);

        let Some(question) = flow.current_question() else {
            return;
        };
        frame.render_widget(
            Paragraph::new(question.prompt)
                .alignment(Alignment::Right)
                .wrap(Wrap { trim: true }),
            chunks[3],
        );

        let items: Vec<ListItem> = question
            .options
            .iter()
            .enumerate()
            .map(|(i, option)| ListItem::new(format!("{}. {}", i + 1, option.text)))
            .collect();
        let list = List::new(items)
            .block(Block::default().borders(Borders::ALL))
            .highlight_style(theme.selected_style())
            .highlight_symbol("> ");
        frame.render_stateful_widget(list, chunks[4], &mut self.list_state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;
    use hawas_core::MockNoteGenerator;
    use std::sync::Arc;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn screen() -> OnboardingScreen {
        let flow = OnboardingFlow::new("ليلى", Arc::new(MockNoteGenerator::ok("أهلاً")));
        OnboardingScreen::new(flow)
    }

    #[test]
    fn test_list_navigation_wraps() {
        let mut screen = screen();
        screen.handle_key(key(KeyCode::Up));
        assert_eq!(screen.list_state.selected(), Some(2));
        screen.handle_key(key(KeyCode::Down));
        assert_eq!(screen.list_state.selected(), Some(0));
    }

    #[test]
    fn test_last_answer_hands_off_flow() {
        let mut screen = screen();
        for _ in 0..3 {
            assert!(matches!(
                screen.handle_key(key(KeyCode::Char('1'))),
                OnboardingAction::None
            ));
        }
        match screen.handle_key(key(KeyCode::Enter)) {
            OnboardingAction::Finish(flow) => assert!(flow.is_finalizing()),
            _ => panic!("expected the flow to be handed off"),
        }
        assert!(screen.flow.is_none());
        assert!(matches!(
            screen.handle_key(key(KeyCode::Char('1'))),
            OnboardingAction::None
        ));
    }

    #[test]
    fn test_out_of_range_digit_is_ignored() {
        let mut screen = screen();
        screen.handle_key(key(KeyCode::Char('9')));
        let Some(flow) = &screen.flow else {
            panic!("flow should still be here");
        };
        assert_eq!(flow.step(), 0);
    }
}
