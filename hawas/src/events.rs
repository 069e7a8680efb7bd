//! Event handling for the Hawas TUI

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use hawas_core::results::ResultsPhase;
use hawas_core::AidKind;

use crate::app::{App, Screen};
use crate::onboarding::OnboardingAction;

/// Result of handling an event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventResult {
    Continue,
    Quit,
    NeedsRedraw,
}

/// Handle a terminal event
pub fn handle_event(app: &mut App, event: Event) -> EventResult {
    match event {
        Event::Key(key) if key.kind == KeyEventKind::Press => handle_key_event(app, key),
        Event::Resize(_, _) => EventResult::NeedsRedraw,
        _ => EventResult::Continue,
    }
}

/// Handle a key event
fn handle_key_event(app: &mut App, key: KeyEvent) -> EventResult {
    // Global shortcuts (always work)
    if let (KeyCode::Char('c'), KeyModifiers::CONTROL) = (key.code, key.modifiers) {
        return EventResult::Quit;
    }

    if app.has_overlay() {
        return handle_overlay_key(app, key);
    }

    match app.screen {
        Screen::Onboarding(_) => handle_onboarding_key(app, key),
        Screen::Home => handle_home_key(app, key),
        Screen::Playing => match app.results_phase() {
            Some(_) if app.reward_visible() => handle_reward_key(app, key),
            Some(phase) => handle_results_key(app, key, phase),
            None => handle_question_key(app, key),
        },
    }
}

fn handle_overlay_key(app: &mut App, key: KeyEvent) -> EventResult {
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('?') => {
            app.close_overlay();
            EventResult::NeedsRedraw
        }
        _ => EventResult::Continue,
    }
}

fn handle_onboarding_key(app: &mut App, key: KeyEvent) -> EventResult {
    let Screen::Onboarding(screen) = &mut app.screen else {
        return EventResult::Continue;
    };
    match screen.handle_key(key) {
        OnboardingAction::None => EventResult::NeedsRedraw,
        OnboardingAction::Quit => EventResult::Quit,
        OnboardingAction::Finish(flow) => {
            app.finish_onboarding(flow);
            EventResult::NeedsRedraw
        }
    }
}

fn handle_home_key(app: &mut App, key: KeyEvent) -> EventResult {
    match key.code {
        KeyCode::Enter | KeyCode::Char('s') => {
            app.start_round();
            EventResult::NeedsRedraw
        }
        KeyCode::Char('?') | KeyCode::F(1) => {
            app.toggle_help();
            EventResult::NeedsRedraw
        }
        KeyCode::Char('q') | KeyCode::Esc => EventResult::Quit,
        _ => EventResult::Continue,
    }
}

/// Keys while a question is open
fn handle_question_key(app: &mut App, key: KeyEvent) -> EventResult {
    match key.code {
        KeyCode::Char(c @ '1'..='9') => {
            let index = c as usize - '1' as usize;
            app.select_answer(index);
            EventResult::NeedsRedraw
        }
        KeyCode::Char('r') => {
            app.use_aid(AidKind::Reveal);
            EventResult::NeedsRedraw
        }
        KeyCode::Char('n') => {
            app.use_aid(AidKind::Narrow);
            EventResult::NeedsRedraw
        }
        KeyCode::Char('e') => {
            app.end_round();
            EventResult::NeedsRedraw
        }
        KeyCode::Char('?') | KeyCode::F(1) => {
            app.toggle_help();
            EventResult::NeedsRedraw
        }
        KeyCode::Char('q') => EventResult::Quit,
        _ => EventResult::Continue,
    }
}

/// Keys while the results modal is up
fn handle_results_key(app: &mut App, key: KeyEvent, phase: ResultsPhase) -> EventResult {
    // The verdict flash takes no input.
    if phase != ResultsPhase::Details {
        return EventResult::Continue;
    }
    match key.code {
        KeyCode::Enter | KeyCode::Char(' ') => {
            app.continue_round(false);
            EventResult::NeedsRedraw
        }
        KeyCode::Char('h') | KeyCode::Char('e') => {
            app.continue_round(true);
            EventResult::NeedsRedraw
        }
        KeyCode::Char('q') => EventResult::Quit,
        _ => EventResult::Continue,
    }
}

/// Keys while the free-aid picker is up
fn handle_reward_key(app: &mut App, key: KeyEvent) -> EventResult {
    match key.code {
        KeyCode::Char('r') => {
            app.claim_aid(AidKind::Reveal);
            EventResult::NeedsRedraw
        }
        KeyCode::Char('n') => {
            app.claim_aid(AidKind::Narrow);
            EventResult::NeedsRedraw
        }
        KeyCode::Esc => {
            app.dismiss_reward();
            EventResult::NeedsRedraw
        }
        _ => EventResult::Continue,
    }
}
