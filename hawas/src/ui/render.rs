//! Render orchestration for the Hawas TUI

use ratatui::{
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use hawas_core::{AidKind, PerformanceChart};

use crate::app::{App, Screen};
use crate::ui::layout::{centered_rect_fixed, GameLayout, HomeLayout};
use crate::ui::widgets::aids::AidButton;
use crate::ui::widgets::{AidBarWidget, PerformanceChartWidget, ResultsWidget, StatementsWidget};

const TAGLINE: &str = "اكتشف الوهم بين الحقائق";

/// Overlay types
#[derive(Debug, Clone)]
pub enum Overlay {
    Help,
}

/// Main render function
pub fn render(frame: &mut Frame, app: &mut App) {
    let area = frame.area();

    let loading = app.loading_message();
    if let Screen::Onboarding(screen) = &mut app.screen {
        screen.render(frame, area, &app.theme, loading.as_deref());
    } else if matches!(app.screen, Screen::Home) {
        render_home(frame, app, area);
    } else {
        render_game(frame, app, area);
    }

    if let Some(overlay) = app.overlay() {
        render_overlay(frame, app, overlay, area);
    }
}

/// Render the home screen: profile, note and recent rounds
fn render_home(frame: &mut Frame, app: &App, area: Rect) {
    let layout = HomeLayout::calculate(area);
    let player = app.session.player();

    let title = Paragraph::new(Line::from(vec![
        Span::styled(" هَوَسْ ", app.theme.title_style()),
        Span::raw("  "),
        Span::styled(player.username.as_str(), Style::default().add_modifier(Modifier::BOLD)),
        Span::raw("  "),
        Span::styled(format!("[ LVL {} ]", player.level), app.theme.title_style()),
        Span::raw("  "),
        Span::styled(format!("XP {}", player.xp), app.theme.muted_style()),
    ]))
    .block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(app.theme.border_style(false)),
    );
    frame.render_widget(title, layout.title);

    if let Some(profile) = &app.profile {
        let note = Paragraph::new(profile.personalized_note.as_str())
            .alignment(Alignment::Right)
            .wrap(Wrap { trim: true });
        frame.render_widget(note, layout.note);
    }

    let per_round = app.session.config().questions_per_round;
    let chart = PerformanceChart::new(app.session.history(), per_round);
    frame.render_widget(
        PerformanceChartWidget::new(chart.as_ref(), &app.theme).max_score(per_round),
        layout.chart,
    );

    render_status_bar(frame, app, layout.status_bar, "Enter start  ? help  q quit");
}

/// Render the gameplay screen
fn render_game(frame: &mut Frame, app: &App, area: Rect) {
    let Some(round) = app.round() else {
        return;
    };
    let Some(question) = &round.state().current_question else {
        return;
    };
    let layout = GameLayout::calculate(area);
    let player = app.session.player();

    let header = Paragraph::new(Line::from(vec![
        Span::styled(format!("[ LVL {} ]", player.level), app.theme.title_style()),
        Span::raw("  "),
        Span::styled(
            format!(
                "[ Q {}/{} ]",
                round.question_number(),
                round.questions_per_round()
            ),
            app.theme.title_style(),
        ),
        Span::raw("  "),
        Span::styled(format!("XP {}", player.xp), app.theme.muted_style()),
    ]));
    frame.render_widget(header, layout.header);

    let topic = Paragraph::new(Line::from(Span::styled(
        round.topic(),
        Style::default().add_modifier(Modifier::BOLD),
    )))
    .alignment(Alignment::Right);
    frame.render_widget(topic, layout.topic);

    let aids = round.state().aids;
    let buttons: Vec<AidButton> = AidKind::all()
        .into_iter()
        .map(|kind| AidButton {
            kind,
            count: aids.count(kind),
            cost: round.economy().cost(kind),
            usable: round.can_use_aid(kind, player),
        })
        .collect();
    frame.render_widget(AidBarWidget::new(&buttons, &app.theme), layout.aids);

    if let Some(hint) = round.current_hint() {
        let hint = Paragraph::new(Span::styled(format!("تلميح: {hint}"), app.theme.hint_style()))
            .alignment(Alignment::Right)
            .wrap(Wrap { trim: true });
        frame.render_widget(hint, layout.hint);
    }

    let states = round.statement_states();
    frame.render_widget(
        StatementsWidget::new(&question.statements, &states, &app.theme).title(TAGLINE),
        layout.statements,
    );

    render_status_bar(
        frame,
        app,
        layout.status_bar,
        "1-9 pick  r reveal  n narrow  e end  ? help  q quit",
    );

    if let (Some(view), Some(phase)) = (app.results_view(), app.results_phase()) {
        let popup = centered_rect_fixed(64, 20, area);
        frame.render_widget(
            ResultsWidget::new(&view, phase, &app.theme).animation_frame(app.animation_frame),
            popup,
        );
    }

    if app.reward_visible() {
        render_reward_overlay(frame, app, area);
    }
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect, hotkeys: &str) {
    let line = match app.status_message() {
        Some(message) => Line::from(Span::styled(message, app.theme.title_style())),
        None => Line::from(Span::styled(hotkeys, app.theme.muted_style())),
    };
    frame.render_widget(Paragraph::new(line), area);
}

fn render_overlay(frame: &mut Frame, app: &App, overlay: &Overlay, area: Rect) {
    match overlay {
        Overlay::Help => render_help_overlay(frame, app, area),
    }
}

/// Free aid picker offered on a level-up
fn render_reward_overlay(frame: &mut Frame, app: &App, area: Rect) {
    let popup_area = centered_rect_fixed(44, 9, area);
    frame.render_widget(Clear, popup_area);

    let amount = app.session.config().aid_reward_amount;
    let text = vec![
        Line::from(Span::styled("اختر مساعدة مجانية", app.theme.title_style())),
        Line::from(""),
        Line::from(format!("r  {} +{amount}", AidKind::Reveal.label())),
        Line::from(format!("n  {} +{amount}", AidKind::Narrow.label())),
        Line::from(""),
        Line::from(Span::styled("Esc to skip", app.theme.muted_style())),
    ];

    let block = Block::default()
        .title(" LEVEL UP ")
        .borders(Borders::ALL)
        .border_style(app.theme.border_style(true));

    frame.render_widget(
        Paragraph::new(text).block(block).alignment(Alignment::Center),
        popup_area,
    );
}

/// Render help overlay
fn render_help_overlay(frame: &mut Frame, app: &App, area: Rect) {
    let popup_area = centered_rect_fixed(50, 18, area);

    // Clear the background
    frame.render_widget(Clear, popup_area);

    let help_text = vec![
        Line::from(Span::styled(
            " هَوَسْ - Help ",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "Question:",
            Style::default().add_modifier(Modifier::UNDERLINED),
        )),
        Line::from("  1-9     Pick the invented statement"),
        Line::from("  r       Reveal: show a hint"),
        Line::from("  n       Narrow: disable wrong choices"),
        Line::from("  e       End the round"),
        Line::from(""),
        Line::from(Span::styled(
            "Results:",
            Style::default().add_modifier(Modifier::UNDERLINED),
        )),
        Line::from("  Enter   Next question"),
        Line::from("  h       End the round and go home"),
        Line::from(""),
        Line::from("  q       Quit"),
        Line::from(""),
        Line::from(Span::styled(
            "Press Esc or q to close",
            Style::default().add_modifier(Modifier::DIM),
        )),
    ];

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_style(app.theme.border_style(true));

    let paragraph = Paragraph::new(help_text)
        .block(block)
        .wrap(Wrap { trim: false });

    frame.render_widget(paragraph, popup_area);
}
