//! Headless game interface for programmatic use.
//!
//! Plays a [`GameSession`] through short text commands and returns plain
//! text, for scripted runs, coding agents and the `--headless` client mode.
//!
//! # Example
//!
//! ```ignore
//! use hawas_core::headless::HeadlessGame;
//!
//! let mut game = HeadlessGame::new(session, Arc::new(SourceFactChecker));
//! println!("{}", game.send("start").await?);
//! println!("{}", game.send("2").await?);
//! println!("{}", game.send("next").await?);
//! ```

use crate::aid::{AidEffect, AidKind};
use crate::performance::{PerformanceChart, EMPTY_HISTORY_MESSAGE};
use crate::question::FactCheck;
use crate::results::{ResultsView, EXPLANATION_HEADING, FACT_CHECK_HEADING};
use crate::round::{Continuation, Round, RoundSummary, StatementState};
use crate::services::FactChecker;
use crate::session::{GameSession, SessionError};
use std::fmt::Write;
use std::sync::Arc;

pub const HELP: &str = "\
commands:
  start            start a round
  1..9             pick the statement you think is the illusion
  reveal | r       use a reveal aid
  narrow | n       use a narrow aid
  claim <aid>      take the offered reward (reveal or narrow)
  next             continue after the results
  home             leave the round after the results
  end              end the round now
  status           show XP, level and recent rounds
  help             show this text";

/// A text-driven game.
pub struct HeadlessGame {
    session: GameSession,
    fact_checker: Arc<dyn FactChecker>,
}

impl HeadlessGame {
    pub fn new(session: GameSession, fact_checker: Arc<dyn FactChecker>) -> Self {
        Self {
            session,
            fact_checker,
        }
    }

    pub fn session(&self) -> &GameSession {
        &self.session
    }

    /// Run one command and describe what happened.
    pub async fn send(&mut self, input: &str) -> Result<String, SessionError> {
        let input = input.trim();
        let (command, argument) = match input.split_once(char::is_whitespace) {
            Some((command, rest)) => (command, rest.trim()),
            None => (input, ""),
        };

        if let Ok(number) = command.parse::<usize>() {
            return Ok(self.select(number).await);
        }
        match command.to_lowercase().as_str() {
            "start" => {
                self.session.start_round()?;
                Ok(self.describe_question())
            }
            "claim" => Ok(self.claim(argument)),
            "next" | "" => self.proceed(false),
            "home" => self.proceed(true),
            "end" => Ok(match self.session.end_round() {
                Some(summary) => describe_summary(&summary),
                None => "no round in progress".to_string(),
            }),
            "status" => Ok(self.describe_status()),
            "help" => Ok(HELP.to_string()),
            other => match AidKind::parse(other) {
                Some(kind) => Ok(self.use_aid(kind)),
                None => Ok(format!("unknown command '{other}'\n{HELP}")),
            },
        }
    }

    async fn select(&mut self, number: usize) -> String {
        let Some(index) = number.checked_sub(1) else {
            return "statements are numbered from 1".to_string();
        };
        let Some(report) = self.session.select_answer(index) else {
            return "that statement can't be picked now".to_string();
        };

        self.run_fact_check().await;
        self.session.wait_for_details().await;

        let mut out = match self.session.round().and_then(ResultsView::from_round) {
            Some(view) => describe_results(&view),
            None => String::new(),
        };
        if report.progression.xp_earned > 0 {
            let _ = write!(out, "\n+{} XP", report.progression.xp_earned);
        }
        if report.progression.leveled_up {
            let _ = write!(out, "\nLEVEL UP → {}", self.session.player().level);
        }
        if report.progression.reward_earned {
            out.push_str("\nاختر مساعدة مجانية: claim reveal | claim narrow");
        }
        out
    }

    async fn run_fact_check(&mut self) {
        let Some(ticket) = self.session.fact_check_ticket() else {
            return;
        };
        let Some(question) = self
            .session
            .round()
            .and_then(|round| round.state().current_question.clone())
        else {
            return;
        };

        self.session.set_fact_check(ticket, Some(FactCheck::Loading));
        let result = match self.fact_checker.check(&question).await {
            Ok(result) => result,
            Err(e) => {
                tracing::warn!(error = %e, "fact check failed");
                None
            }
        };
        self.session.set_fact_check(ticket, result);
    }

    fn use_aid(&mut self, kind: AidKind) -> String {
        let blocked = self
            .session
            .round()
            .map(|round| round.aid_status(kind, self.session.player()));
        match self.session.use_aid(kind) {
            Some(AidEffect::Hint(hint)) => format!("تلميح: {hint}"),
            Some(AidEffect::Narrowed(disabled)) => {
                let numbers: Vec<String> = disabled.iter().map(|i| (i + 1).to_string()).collect();
                format!("disabled: {}\n{}", numbers.join(", "), self.describe_question())
            }
            None => match blocked {
                Some(Err(reason)) => format!("{kind} unavailable: {reason}"),
                _ => format!("{kind} unavailable"),
            },
        }
    }

    fn claim(&mut self, argument: &str) -> String {
        let Some(kind) = AidKind::parse(argument) else {
            return "claim what? reveal or narrow".to_string();
        };
        if self.session.claim_aid(kind) {
            format!(
                "+{} {} ({} left)",
                self.session.config().aid_reward_amount,
                kind.label(),
                self.session.aids().count(kind)
            )
        } else {
            "no reward to claim".to_string()
        }
    }

    fn proceed(&mut self, return_home: bool) -> Result<String, SessionError> {
        match self.session.continue_round(return_home)? {
            Continuation::NextQuestion { .. } => Ok(self.describe_question()),
            Continuation::RoundEnded(summary) => Ok(describe_summary(&summary)),
        }
    }

    fn describe_question(&self) -> String {
        match self.session.round() {
            Some(round) => describe_round(round, &self.session),
            None => "no round in progress".to_string(),
        }
    }

    fn describe_status(&self) -> String {
        let player = self.session.player();
        let mut out = format!(
            "{}  [ LVL {} ]  XP {}",
            player.username, player.level, player.xp
        );
        let per_round = self.session.config().questions_per_round;
        match PerformanceChart::new(self.session.history(), per_round) {
            Some(chart) => {
                for bar in chart.bars() {
                    let _ = write!(
                        out,
                        "\n{:>10}  {} {}",
                        bar.date_label,
                        "█".repeat((bar.score as usize).min(per_round)),
                        bar.score_label
                    );
                }
            }
            None => {
                let _ = write!(out, "\n{EMPTY_HISTORY_MESSAGE}");
            }
        }
        out
    }
}

fn describe_round(round: &Round, session: &GameSession) -> String {
    let Some(question) = &round.state().current_question else {
        return String::new();
    };
    let aids = round.state().aids;
    let mut out = format!(
        "[ LVL {} ]  [ Q {}/{} ]  {}\nاكتشف الوهم بين الحقائق\n",
        session.player().level,
        round.question_number(),
        round.questions_per_round(),
        round.topic()
    );
    for kind in AidKind::all() {
        let _ = write!(
            out,
            "{} ",
            kind.button_label(aids.count(kind), round.economy().cost(kind))
        );
    }
    if let Some(hint) = round.current_hint() {
        let _ = write!(out, "\nتلميح: {hint}");
    }
    for (i, (statement, state)) in question
        .statements
        .iter()
        .zip(round.statement_states())
        .enumerate()
    {
        let marker = match state {
            StatementState::Open => " ",
            StatementState::DisabledByAid => "x",
            StatementState::Correct => "✓",
            StatementState::ChosenWrong => "✗",
            StatementState::Dimmed => "·",
        };
        let _ = write!(out, "\n{marker} {}. {statement}", i + 1);
    }
    out
}

fn describe_results(view: &ResultsView<'_>) -> String {
    let mut out = format!(
        "{}  {}\n{}\nscore {}  streak {}  accuracy {}\n{EXPLANATION_HEADING} {}",
        view.verdict,
        view.verdict_line,
        view.progress_label(),
        view.score,
        view.streak,
        view.accuracy_label(),
        view.explanation
    );
    match view.fact_check {
        Some(FactCheck::Resolved { title, url }) => {
            let _ = write!(out, "\n{FACT_CHECK_HEADING}: {title} <{url}>");
        }
        Some(FactCheck::Loading) => {
            let _ = write!(out, "\n{FACT_CHECK_HEADING}: ...");
        }
        None => {}
    }
    let _ = write!(out, "\n{}", view.continue_label);
    out
}

fn describe_summary(summary: &RoundSummary) -> String {
    format!(
        "round over: {}/{} correct, accuracy {}%, best streak {}",
        summary.score, summary.questions_per_round, summary.accuracy, summary.best_streak
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::performance::ScoreEntry;
    use crate::player::PlayerData;
    use crate::question::{QuestionBank, Topic};
    use crate::testing::{fixture_question, MockFactChecker};
    use chrono::Utc;
    use std::time::Duration;

    fn game(checker: MockFactChecker) -> HeadlessGame {
        let bank = QuestionBank::new(vec![Topic {
            name: "اختبار".into(),
            questions: (0..3).map(|_| fixture_question(1)).collect(),
        }])
        .unwrap();
        let session = GameSession::new(
            GameConfig::default()
                .with_questions_per_round(2)
                .with_reveal_dwell(Duration::from_millis(10)),
            bank,
            PlayerData::new("p").with_xp(100),
        )
        .unwrap();
        HeadlessGame::new(session, Arc::new(checker))
    }

    #[tokio::test]
    async fn test_headless_round() {
        let mut game = game(MockFactChecker::resolving("Source", "https://example.org"));
        let question = game.send("start").await.unwrap();
        assert!(question.contains("[ Q 1/2 ]"));
        assert!(question.contains("[ كَشْف (1) | 25 XP ]"));

        let results = game.send("2").await.unwrap();
        assert!(results.contains("[ صَوَاب ]"));
        assert!(results.contains("Source <https://example.org>"));
        assert!(results.contains("+10 XP"));

        assert!(game.send("next").await.unwrap().contains("[ Q 2/2 ]"));
        game.send("1").await.unwrap();
        let summary = game.send("next").await.unwrap();
        assert!(summary.starts_with("round over: 1/2"));
        assert_eq!(game.session().history().len(), 1);
    }

    #[tokio::test]
    async fn test_headless_aids_and_errors() {
        let mut game = game(MockFactChecker::failing());
        assert!(game.send("r").await.unwrap().contains("unavailable"));
        assert!(game.send("frobnicate").await.unwrap().contains("unknown command"));
        assert!(game.send("next").await.is_err());

        game.send("start").await.unwrap();
        assert!(game.send("reveal").await.unwrap().starts_with("تلميح:"));
        assert!(game.send("reveal").await.unwrap().contains("no aids of this kind left"));
        assert_eq!(game.send("0").await.unwrap(), "statements are numbered from 1");

        let results = game.send("3").await.unwrap();
        assert!(results.contains("[ خَطَأ ]"));
        assert!(!results.contains("تحقق من المصدر"));
        assert_eq!(game.send("claim narrow").await.unwrap(), "no reward to claim");
    }

    #[tokio::test]
    async fn test_status_shows_empty_history() {
        let mut game = game(MockFactChecker::empty());
        let status = game.send("status").await.unwrap();
        assert!(status.contains("[ LVL 1 ]"));
        assert!(status.contains(EMPTY_HISTORY_MESSAGE));
    }

    #[tokio::test]
    async fn test_status_bar_capped_at_round_length() {
        let game = game(MockFactChecker::empty());
        let history = vec![
            ScoreEntry::new(1, Utc::now()),
            ScoreEntry::new(u32::MAX, Utc::now()),
        ];
        let session = game.session.with_history(history);
        let mut game = HeadlessGame::new(session, Arc::new(MockFactChecker::empty()));

        let status = game.send("status").await.unwrap();
        let bars: Vec<usize> = status
            .lines()
            .skip(1)
            .map(|line| line.matches('█').count())
            .collect();
        assert_eq!(bars, vec![1, 2]);
    }
}
