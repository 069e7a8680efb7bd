//! The round state machine.
//!
//! A [`Round`] drives one fixed-length sequence of questions:
//!
//! ```text
//! Unanswered ──select──▶ Answered ──(auto)──▶ ResultsShown ──continue──▶ NextQuestion ──present──▶ Unanswered
//!                                                 │
//!                                                 └──continue (last / home)──▶ RoundEnded
//! ```
//!
//! `end_round` reaches `RoundEnded` from any other phase. `RoundEnded` is
//! terminal; the controller builds a new `Round` for the next one.
//!
//! Every transition is published as a [`RoundEvent`] to subscribed listeners,
//! so clients re-render on events instead of diffing state. A listener that
//! subscribes while a question awaits its answer is first sent that
//! question's `QuestionPresented`.

use crate::aid::{AidBlocked, AidContext, AidEconomy, AidEffect, AidInventory, AidKind, AidUsage};
use crate::config::GameConfig;
use crate::player::PlayerData;
use crate::question::{FactCheck, Question, QuestionError};
use rand::rngs::StdRng;
use rand::SeedableRng;
use thiserror::Error;

/// Errors from controller-side misuse of a round.
#[derive(Debug, Error)]
pub enum RoundError {
    #[error("invalid question: {0}")]
    InvalidQuestion(#[from] QuestionError),

    #[error("invalid configuration: {0}")]
    InvalidConfig(#[from] crate::config::ConfigError),

    #[error("cannot present a question while the round is {0:?}")]
    WrongPhase(RoundPhase),
}

/// Where the current question is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundPhase {
    Unanswered,
    Answered,
    ResultsShown,
    NextQuestion,
    RoundEnded,
}

/// Observable game state for the question on screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameState {
    pub current_question: Option<Question>,
    pub selected_answer: Option<usize>,
    pub score: u32,
    pub streak: u32,
    /// Integer percentage, 0-100.
    pub accuracy: u8,
    pub aids: AidInventory,
    pub current_fact_check: Option<FactCheck>,
}

/// Result of grading one selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnswerOutcome {
    pub index: usize,
    pub correct: bool,
    pub score: u32,
    pub streak: u32,
    pub accuracy: u8,
}

/// Totals for a finished round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundSummary {
    pub score: u32,
    pub answered: u32,
    pub accuracy: u8,
    pub best_streak: u32,
    pub questions_per_round: usize,
}

/// What `continue_round` led to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Continuation {
    NextQuestion { number: usize },
    RoundEnded(RoundSummary),
}

/// How a statement button should look.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementState {
    Open,
    DisabledByAid,
    /// After answering: the illusion the player had to find.
    Correct,
    /// After answering: the player's wrong pick.
    ChosenWrong,
    /// After answering: everything else.
    Dimmed,
}

/// Notifications published on every transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoundEvent {
    QuestionPresented { number: usize },
    AidUsed { kind: AidKind, effect: AidEffect },
    RewardOffered,
    AidClaimed { kind: AidKind, remaining: u32 },
    AnswerRecorded(AnswerOutcome),
    ResultsOpened,
    FactCheckUpdated(Option<FactCheck>),
    AwaitingNextQuestion { number: usize },
    RoundEnded(RoundSummary),
}

type Listener = Box<dyn FnMut(&RoundEvent) + Send>;

/// One round of questions.
pub struct Round {
    config: GameConfig,
    economy: AidEconomy,
    topic: String,
    state: GameState,
    usage: AidUsage,
    phase: RoundPhase,
    question_number: usize,
    answered: u32,
    correct: u32,
    best_streak: u32,
    reward_open: bool,
    listeners: Vec<Listener>,
    rng: StdRng,
}

impl Round {
    /// Start a round on its first question with the aids carried over from
    /// earlier rounds.
    pub fn new(config: GameConfig, first: Question, aids: AidInventory) -> Result<Self, RoundError> {
        config.validate()?;
        first.validate()?;

        let economy = AidEconomy::new(config.aid_costs, config.aid_reward_amount);
        let mut round = Self {
            config,
            economy,
            topic: String::new(),
            state: GameState {
                current_question: None,
                selected_answer: None,
                score: 0,
                streak: 0,
                accuracy: 0,
                aids,
                current_fact_check: None,
            },
            usage: AidUsage::default(),
            phase: RoundPhase::NextQuestion,
            question_number: 0,
            answered: 0,
            correct: 0,
            best_streak: 0,
            reward_open: false,
            listeners: Vec::new(),
            rng: StdRng::from_entropy(),
        };
        round.enter_question(first);
        tracing::info!(
            questions = round.config.questions_per_round,
            "round started"
        );
        Ok(round)
    }

    /// Set the topic shown in the header.
    pub fn with_topic(mut self, topic: impl Into<String>) -> Self {
        self.topic = topic.into();
        self
    }

    /// Seed the RNG used by the aids.
    pub fn with_rng_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// Register a listener for round events.
    pub fn subscribe<F>(&mut self, mut listener: F)
    where
        F: FnMut(&RoundEvent) + Send + 'static,
    {
        if self.phase == RoundPhase::Unanswered {
            listener(&RoundEvent::QuestionPresented {
                number: self.question_number,
            });
        }
        self.listeners.push(Box::new(listener));
    }

    fn emit(&mut self, event: RoundEvent) {
        for listener in &mut self.listeners {
            listener(&event);
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn phase(&self) -> RoundPhase {
        self.phase
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn economy(&self) -> &AidEconomy {
        &self.economy
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// 1-based number of the question on screen.
    pub fn question_number(&self) -> usize {
        self.question_number
    }

    pub fn questions_per_round(&self) -> usize {
        self.config.questions_per_round
    }

    pub fn is_last_question(&self) -> bool {
        self.question_number >= self.config.questions_per_round
    }

    pub fn usage(&self) -> &AidUsage {
        &self.usage
    }

    pub fn current_hint(&self) -> Option<&str> {
        self.usage.current_hint.as_deref()
    }

    pub fn has_answered(&self) -> bool {
        self.state.selected_answer.is_some()
    }

    /// Whether the last answer was right. `None` before answering.
    pub fn last_answer_correct(&self) -> Option<bool> {
        let question = self.state.current_question.as_ref()?;
        let selected = self.state.selected_answer?;
        Some(grade(question, &self.usage, selected))
    }

    pub fn is_finished(&self) -> bool {
        self.phase == RoundPhase::RoundEnded
    }

    pub fn reward_pending(&self) -> bool {
        self.reward_open
    }

    pub fn summary(&self) -> RoundSummary {
        RoundSummary {
            score: self.state.score,
            answered: self.answered,
            accuracy: self.state.accuracy,
            best_streak: self.best_streak,
            questions_per_round: self.config.questions_per_round,
        }
    }

    /// Per-statement display state for the question on screen.
    pub fn statement_states(&self) -> Vec<StatementState> {
        let Some(question) = &self.state.current_question else {
            return Vec::new();
        };
        (0..question.len())
            .map(|i| match self.state.selected_answer {
                Some(_) if question.is_correct(i) => StatementState::Correct,
                Some(selected) if selected == i => StatementState::ChosenWrong,
                Some(_) => StatementState::Dimmed,
                None if self.usage.is_disabled(i) => StatementState::DisabledByAid,
                None => StatementState::Open,
            })
            .collect()
    }

    // ========================================================================
    // Aids
    // ========================================================================

    /// Check whether `kind` can be used right now by `player`.
    pub fn aid_status(&self, kind: AidKind, player: &PlayerData) -> Result<(), AidBlocked> {
        if self.phase != RoundPhase::Unanswered {
            return Err(AidBlocked::AlreadyAnswered);
        }
        self.economy.eligibility(
            kind,
            AidContext {
                question: self.state.current_question.as_ref(),
                usage: &self.usage,
                inventory: &self.state.aids,
                player,
                answered: self.has_answered(),
            },
        )
    }

    pub fn can_use_aid(&self, kind: AidKind, player: &PlayerData) -> bool {
        self.aid_status(kind, player).is_ok()
    }

    /// Use an aid on the current question. A no-op returning `None` when the
    /// aid isn't usable.
    pub fn use_aid(&mut self, kind: AidKind, player: &mut PlayerData) -> Option<AidEffect> {
        if self.phase != RoundPhase::Unanswered {
            tracing::debug!(aid = %kind, phase = ?self.phase, "aid refused outside of an open question");
            return None;
        }
        let answered = self.has_answered();
        let effect = self.economy.use_aid(
            kind,
            self.state.current_question.as_ref(),
            answered,
            &mut self.usage,
            &mut self.state.aids,
            player,
            &mut self.rng,
        )?;
        self.emit(RoundEvent::AidUsed {
            kind,
            effect: effect.clone(),
        });
        Some(effect)
    }

    /// Open a reward opportunity. Called by the controller after a
    /// qualifying event.
    pub fn offer_reward(&mut self) {
        if self.is_finished() || self.reward_open {
            return;
        }
        self.reward_open = true;
        self.emit(RoundEvent::RewardOffered);
    }

    /// Claim one aid kind from the open reward opportunity. Returns false
    /// when no opportunity is open.
    pub fn claim_aid(&mut self, kind: AidKind) -> bool {
        if !self.reward_open {
            tracing::debug!(aid = %kind, "no reward to claim");
            return false;
        }
        self.reward_open = false;
        self.economy.claim(kind, &mut self.state.aids);
        let remaining = self.state.aids.count(kind);
        self.emit(RoundEvent::AidClaimed { kind, remaining });
        true
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Select a statement. Accepted once per question; disabled and
    /// out-of-range indices are ignored.
    pub fn select_answer(&mut self, index: usize) -> Option<AnswerOutcome> {
        if self.phase != RoundPhase::Unanswered {
            return None;
        }
        let question = self.state.current_question.as_ref()?;
        if index >= question.len() || self.usage.is_disabled(index) {
            tracing::debug!(index, "selection ignored");
            return None;
        }

        let correct = grade(question, &self.usage, index);
        self.state.selected_answer = Some(index);
        self.answered += 1;
        if correct {
            self.correct += 1;
            self.state.score += 1;
            self.state.streak += 1;
            self.best_streak = self.best_streak.max(self.state.streak);
        } else {
            self.state.streak = 0;
        }
        self.state.accuracy = accuracy_percent(self.correct, self.answered);
        self.phase = RoundPhase::Answered;

        let outcome = AnswerOutcome {
            index,
            correct,
            score: self.state.score,
            streak: self.state.streak,
            accuracy: self.state.accuracy,
        };
        tracing::debug!(?outcome, "answer recorded");
        self.emit(RoundEvent::AnswerRecorded(outcome));

        self.phase = RoundPhase::ResultsShown;
        self.emit(RoundEvent::ResultsOpened);
        Some(outcome)
    }

    /// Update the fact-check panel for the current question.
    pub fn set_fact_check(&mut self, fact_check: Option<FactCheck>) {
        if self.state.current_question.is_none() || self.is_finished() {
            return;
        }
        self.state.current_fact_check = fact_check.clone();
        self.emit(RoundEvent::FactCheckUpdated(fact_check));
    }

    /// Leave the results. `return_home` ends the round outright; otherwise it
    /// ends after the last question. Only valid while results are shown.
    pub fn continue_round(&mut self, return_home: bool) -> Option<Continuation> {
        if self.phase != RoundPhase::ResultsShown {
            return None;
        }
        if return_home || self.is_last_question() {
            return Some(Continuation::RoundEnded(self.finish()));
        }
        self.phase = RoundPhase::NextQuestion;
        let number = self.question_number + 1;
        self.emit(RoundEvent::AwaitingNextQuestion { number });
        Some(Continuation::NextQuestion { number })
    }

    /// End the round now, whatever the progress. `None` if already ended.
    pub fn end_round(&mut self) -> Option<RoundSummary> {
        if self.is_finished() {
            return None;
        }
        Some(self.finish())
    }

    /// Present the next question after `continue_round` asked for one.
    pub fn present(&mut self, question: Question) -> Result<(), RoundError> {
        if self.phase != RoundPhase::NextQuestion {
            return Err(RoundError::WrongPhase(self.phase));
        }
        question.validate()?;
        self.enter_question(question);
        Ok(())
    }

    fn enter_question(&mut self, question: Question) {
        self.state.current_question = Some(question);
        self.state.selected_answer = None;
        self.state.current_fact_check = None;
        self.usage = AidUsage::default();
        self.question_number += 1;
        self.phase = RoundPhase::Unanswered;
        let number = self.question_number;
        self.emit(RoundEvent::QuestionPresented { number });
    }

    fn finish(&mut self) -> RoundSummary {
        self.phase = RoundPhase::RoundEnded;
        self.reward_open = false;
        let summary = self.summary();
        tracing::info!(
            score = summary.score,
            answered = summary.answered,
            accuracy = summary.accuracy,
            "round ended"
        );
        self.emit(RoundEvent::RoundEnded(summary));
        summary
    }
}

/// A disabled statement never counts as the right answer.
fn grade(question: &Question, usage: &AidUsage, index: usize) -> bool {
    question.is_correct(index) && !usage.is_disabled(index)
}

/// `round(100 * correct / answered)` with halves rounded up.
pub fn accuracy_percent(correct: u32, answered: u32) -> u8 {
    if answered == 0 {
        return 0;
    }
    let (correct, answered) = (u64::from(correct), u64::from(answered));
    ((200 * correct + answered) / (2 * answered)) as u8
}
