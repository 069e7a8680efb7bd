//! GameSession - the round controller every client drives.
//!
//! A session owns the player, the aids carried between rounds, the score
//! history of this run and, while a round is in progress, the [`Round`] and
//! its [`ResultsSequencer`]. Clients forward user actions here and read the
//! round back for rendering.

use crate::aid::{AidEffect, AidInventory, AidKind};
use crate::config::{ConfigError, GameConfig};
use crate::performance::ScoreEntry;
use crate::player::PlayerData;
use crate::progression::{Progression, ProgressionUpdate};
use crate::question::{FactCheck, Question, QuestionBank};
use crate::results::{ResultsPhase, ResultsSequencer};
use crate::round::{AnswerOutcome, Continuation, Round, RoundError, RoundSummary};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::VecDeque;
use thiserror::Error;
use tokio::sync::watch;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Round error: {0}")]
    Round(#[from] RoundError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("question bank has no playable topic")]
    NoQuestions,

    #[error("a round is already in progress")]
    RoundInProgress,

    #[error("no round in progress")]
    NoRound,
}

/// What selecting an answer did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnswerReport {
    pub outcome: AnswerOutcome,
    pub progression: ProgressionUpdate,
}

/// Identifies the question a fact check was started for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FactCheckTicket {
    round: u64,
    question: usize,
}

impl FactCheckTicket {
    pub fn question_number(&self) -> usize {
        self.question
    }
}

struct ActiveRound {
    id: u64,
    round: Round,
    upcoming: VecDeque<Question>,
    sequencer: Option<ResultsSequencer>,
}

/// A play session over any number of rounds.
pub struct GameSession {
    config: GameConfig,
    bank: QuestionBank,
    progression: Progression,
    player: PlayerData,
    aids: AidInventory,
    history: Vec<ScoreEntry>,
    active: Option<ActiveRound>,
    rounds_started: u64,
    rng: StdRng,
}

impl GameSession {
    pub fn new(
        config: GameConfig,
        bank: QuestionBank,
        player: PlayerData,
    ) -> Result<Self, SessionError> {
        config.validate()?;
        if bank.question_count() == 0 {
            return Err(SessionError::NoQuestions);
        }
        Ok(Self {
            progression: Progression::new(config.progression),
            aids: AidInventory::new(config.starting_reveal, config.starting_narrow),
            config,
            bank,
            player,
            history: Vec::new(),
            active: None,
            rounds_started: 0,
            rng: StdRng::from_entropy(),
        })
    }

    /// Seed question dealing and the aids of every round.
    pub fn with_rng_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// Past rounds, oldest first.
    pub fn with_history(mut self, history: Vec<ScoreEntry>) -> Self {
        self.history = history;
        self
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn player(&self) -> &PlayerData {
        &self.player
    }

    pub fn history(&self) -> &[ScoreEntry] {
        &self.history
    }

    /// Aids available: the live round's inventory while one is running.
    pub fn aids(&self) -> AidInventory {
        match &self.active {
            Some(active) => active.round.state().aids,
            None => self.aids,
        }
    }

    pub fn round(&self) -> Option<&Round> {
        self.active.as_ref().map(|a| &a.round)
    }

    /// Mutable access, e.g. to subscribe to round events.
    pub fn round_mut(&mut self) -> Option<&mut Round> {
        self.active.as_mut().map(|a| &mut a.round)
    }

    pub fn in_round(&self) -> bool {
        self.active.is_some()
    }

    /// Deal a topic and start a round on its first question.
    pub fn start_round(&mut self) -> Result<&mut Round, SessionError> {
        if self.active.is_some() {
            return Err(SessionError::RoundInProgress);
        }
        let (topic, questions) = self
            .bank
            .deal(self.config.questions_per_round, &mut self.rng)
            .ok_or(SessionError::NoQuestions)?;
        let mut upcoming = VecDeque::from(questions);
        let first = upcoming.pop_front().ok_or(SessionError::NoQuestions)?;

        // A small topic makes a shorter round.
        let config = self
            .config
            .clone()
            .with_questions_per_round(upcoming.len() + 1);
        let seed = self.rng.gen();
        let round = Round::new(config, first, self.aids)?
            .with_topic(topic)
            .with_rng_seed(seed);

        self.rounds_started += 1;
        let active = self.active.insert(ActiveRound {
            id: self.rounds_started,
            round,
            upcoming,
            sequencer: None,
        });
        Ok(&mut active.round)
    }

    pub fn can_use_aid(&self, kind: AidKind) -> bool {
        self.round()
            .is_some_and(|round| round.can_use_aid(kind, &self.player))
    }

    pub fn use_aid(&mut self, kind: AidKind) -> Option<AidEffect> {
        let active = self.active.as_mut()?;
        active.round.use_aid(kind, &mut self.player)
    }

    pub fn claim_aid(&mut self, kind: AidKind) -> bool {
        self.active
            .as_mut()
            .is_some_and(|active| active.round.claim_aid(kind))
    }

    /// Grade a selection, credit XP, open a reward on streak milestones and
    /// start the results reveal.
    ///
    /// Must be called from within a tokio runtime.
    pub fn select_answer(&mut self, index: usize) -> Option<AnswerReport> {
        let active = self.active.as_mut()?;
        let outcome = active.round.select_answer(index)?;

        let progression = self.progression.apply(&outcome, &mut self.player);
        if progression.reward_earned {
            active.round.offer_reward();
        }
        if progression.leveled_up {
            tracing::info!(level = self.player.level, "player leveled up");
        }
        active.sequencer = Some(ResultsSequencer::start(self.config.reveal_dwell()));

        Some(AnswerReport {
            outcome,
            progression,
        })
    }

    /// Phase of the results on screen, if any.
    pub fn results_phase(&self) -> Option<ResultsPhase> {
        self.active
            .as_ref()
            .and_then(|a| a.sequencer.as_ref())
            .map(ResultsSequencer::phase)
    }

    pub fn results_watch(&self) -> Option<watch::Receiver<ResultsPhase>> {
        self.active
            .as_ref()
            .and_then(|a| a.sequencer.as_ref())
            .map(ResultsSequencer::subscribe)
    }

    /// Wait for the details of the current results. `None` when no results
    /// are showing.
    pub async fn wait_for_details(&mut self) -> Option<ResultsPhase> {
        let sequencer = self.active.as_mut()?.sequencer.as_mut()?;
        Some(sequencer.wait_for_details().await)
    }

    /// Ticket for a fact check of the question whose results are showing.
    pub fn fact_check_ticket(&self) -> Option<FactCheckTicket> {
        let active = self.active.as_ref()?;
        active.sequencer.as_ref()?;
        Some(FactCheckTicket {
            round: active.id,
            question: active.round.question_number(),
        })
    }

    /// Update the fact-check panel. Ignored unless the results the ticket
    /// was taken for are still showing.
    pub fn set_fact_check(&mut self, ticket: FactCheckTicket, fact_check: Option<FactCheck>) {
        if self.fact_check_ticket() != Some(ticket) {
            tracing::debug!(question = ticket.question, "dropping stale fact check");
            return;
        }
        if let Some(active) = self.active.as_mut() {
            active.round.set_fact_check(fact_check);
        }
    }

    /// Leave the results: present the next question or end the round.
    pub fn continue_round(&mut self, return_home: bool) -> Result<Continuation, SessionError> {
        let active = self.active.as_mut().ok_or(SessionError::NoRound)?;
        let continuation = active
            .round
            .continue_round(return_home)
            .ok_or(RoundError::WrongPhase(active.round.phase()))?;
        if let Some(mut sequencer) = active.sequencer.take() {
            sequencer.cancel();
        }

        match continuation {
            Continuation::NextQuestion { .. } => match active.upcoming.pop_front() {
                Some(question) => active.round.present(question)?,
                None => {
                    // Dealt fewer questions than the round length.
                    if let Some(summary) = active.round.end_round() {
                        self.close_round(summary);
                        return Ok(Continuation::RoundEnded(summary));
                    }
                }
            },
            Continuation::RoundEnded(summary) => self.close_round(summary),
        }
        Ok(continuation)
    }

    /// End the round wherever it is.
    pub fn end_round(&mut self) -> Option<RoundSummary> {
        let active = self.active.as_mut()?;
        let summary = active.round.end_round()?;
        self.close_round(summary);
        Some(summary)
    }

    fn close_round(&mut self, summary: RoundSummary) {
        if let Some(active) = self.active.take() {
            self.aids = active.round.state().aids;
        }
        self.history.push(ScoreEntry::now(summary.score));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::question::Topic;

    fn bank(size: usize) -> QuestionBank {
        let questions = (0..size)
            .map(|i| {
                Question::new(
                    vec![format!("a{i}"), format!("b{i}"), format!("c{i}")],
                    0,
                    "a is invented",
                )
                .unwrap()
            })
            .collect();
        QuestionBank::new(vec![Topic {
            name: "topic".into(),
            questions,
        }])
        .unwrap()
    }

    fn session(size: usize, per_round: usize) -> GameSession {
        GameSession::new(
            GameConfig::default().with_questions_per_round(per_round),
            bank(size),
            PlayerData::new("p"),
        )
        .unwrap()
        .with_rng_seed(7)
    }

    #[tokio::test(start_paused = true)]
    async fn test_full_round_records_history() {
        let mut session = session(5, 3);
        session.start_round().unwrap();
        assert_eq!(session.round().unwrap().questions_per_round(), 3);

        for number in 1..=3 {
            assert_eq!(session.round().unwrap().question_number(), number);
            let report = session.select_answer(0).unwrap();
            assert!(report.outcome.correct);
            assert_eq!(session.results_phase(), Some(ResultsPhase::Flash));
            assert_eq!(
                session.wait_for_details().await,
                Some(ResultsPhase::Details)
            );
            session.continue_round(false).unwrap();
        }

        assert!(!session.in_round());
        assert_eq!(session.history().len(), 1);
        assert_eq!(session.history()[0].score, 3);
        assert_eq!(session.player().xp, 30);
    }

    #[tokio::test]
    async fn test_short_topic_shortens_round() {
        let mut session = session(2, 5);
        session.start_round().unwrap();
        assert_eq!(session.round().unwrap().questions_per_round(), 2);
    }

    #[tokio::test]
    async fn test_reward_on_third_streak_and_aids_carry_over() {
        let mut session = session(5, 5);
        session.start_round().unwrap();
        for _ in 0..2 {
            session.select_answer(0).unwrap();
            session.continue_round(false).unwrap();
        }
        let report = session.select_answer(0).unwrap();
        assert!(report.progression.reward_earned);
        assert!(session.round().unwrap().reward_pending());

        assert!(session.claim_aid(AidKind::Narrow));
        assert!(!session.claim_aid(AidKind::Reveal));
        assert_eq!(session.aids(), AidInventory::new(1, 2));

        session.end_round().unwrap();
        assert_eq!(session.aids(), AidInventory::new(1, 2));
        session.start_round().unwrap();
        assert_eq!(session.round().unwrap().state().aids, AidInventory::new(1, 2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_continue_cancels_reveal_timer() {
        let mut session = session(5, 5);
        session.start_round().unwrap();
        session.select_answer(1).unwrap();
        let observer = session.results_watch().unwrap();

        session.continue_round(false).unwrap();
        assert_eq!(session.results_phase(), None);
        tokio::time::sleep(std::time::Duration::from_secs(5)).await;
        assert_eq!(*observer.borrow(), ResultsPhase::Flash);
    }

    #[tokio::test]
    async fn test_stale_fact_check_is_ignored() {
        let mut session = session(5, 5);
        assert_eq!(session.fact_check_ticket(), None);
        session.start_round().unwrap();
        session.select_answer(0).unwrap();
        let first = session.fact_check_ticket().unwrap();
        assert_eq!(first.question_number(), 1);
        session.continue_round(false).unwrap();

        session.set_fact_check(first, Some(FactCheck::Loading));
        assert_eq!(session.round().unwrap().state().current_fact_check, None);

        session.select_answer(0).unwrap();
        let second = session.fact_check_ticket().unwrap();
        session.set_fact_check(second, Some(FactCheck::Loading));
        assert_eq!(
            session.round().unwrap().state().current_fact_check,
            Some(FactCheck::Loading)
        );
    }

    #[tokio::test]
    async fn test_fact_check_from_previous_round_is_ignored() {
        let mut session = session(5, 5);
        session.start_round().unwrap();
        session.select_answer(0).unwrap();
        let old = session.fact_check_ticket().unwrap();
        session.end_round().unwrap();

        session.start_round().unwrap();
        session.select_answer(0).unwrap();
        let current = session.fact_check_ticket().unwrap();
        assert_eq!(old.question_number(), current.question_number());
        assert_ne!(old, current);

        session.set_fact_check(current, Some(FactCheck::Loading));
        session.set_fact_check(
            old,
            Some(FactCheck::Resolved {
                title: "stale".into(),
                url: "https://example.com".into(),
            }),
        );
        assert_eq!(
            session.round().unwrap().state().current_fact_check,
            Some(FactCheck::Loading)
        );
    }

    #[test]
    fn test_misuse_is_reported() {
        let mut session = session(5, 5);
        assert!(matches!(
            session.continue_round(false),
            Err(SessionError::NoRound)
        ));
        session.start_round().unwrap();
        assert!(matches!(
            session.start_round(),
            Err(SessionError::RoundInProgress)
        ));
        assert!(matches!(
            session.continue_round(false),
            Err(SessionError::Round(RoundError::WrongPhase(_)))
        ));
        assert!(GameSession::new(
            GameConfig::default(),
            QuestionBank { topics: Vec::new() },
            PlayerData::new("p")
        )
        .is_err());
    }
}
