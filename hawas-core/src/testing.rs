//! Testing utilities for the quiz.
//!
//! - `MockNoteGenerator` and `MockFactChecker` stand in for Claude
//! - `RecordingLoader` keeps every show/hide call
//! - `TestHarness` drives a scripted round and records its events
//! - assertion helpers for the round state

use crate::aid::{AidEffect, AidInventory, AidKind};
use crate::config::GameConfig;
use crate::onboarding::OnboardingAnswers;
use crate::player::PlayerData;
use crate::question::{FactCheck, Question};
use crate::round::{AnswerOutcome, Continuation, Round, RoundEvent, RoundPhase};
use crate::services::{FactCheckError, FactChecker, Loader, NoteError, NoteGenerator};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// A note generator with a fixed answer.
#[derive(Debug, Default)]
pub struct MockNoteGenerator {
    note: Option<String>,
    calls: AtomicUsize,
}

impl MockNoteGenerator {
    /// Always returns `note`.
    pub fn ok(note: impl Into<String>) -> Self {
        Self {
            note: Some(note.into()),
            calls: AtomicUsize::new(0),
        }
    }

    /// Always fails.
    pub fn failing() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl NoteGenerator for MockNoteGenerator {
    async fn generate_note(&self, _answers: &OnboardingAnswers) -> Result<String, NoteError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.note
            .clone()
            .ok_or_else(|| NoteError::Unavailable("mock generator set to fail".to_string()))
    }
}

/// A fact checker with a fixed answer.
#[derive(Debug, Default)]
pub struct MockFactChecker {
    result: Option<FactCheck>,
    fail: bool,
    calls: AtomicUsize,
}

impl MockFactChecker {
    pub fn resolving(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            result: Some(FactCheck::Resolved {
                title: title.into(),
                url: url.into(),
            }),
            ..Self::default()
        }
    }

    /// Finds nothing to show.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FactChecker for MockFactChecker {
    async fn check(&self, _question: &Question) -> Result<Option<FactCheck>, FactCheckError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(FactCheckError::NoCitation);
        }
        Ok(self.result.clone())
    }
}

/// Records loader calls as `show:<message>` and `hide`.
#[derive(Debug, Default)]
pub struct RecordingLoader {
    events: Mutex<Vec<String>>,
}

impl RecordingLoader {
    pub fn events(&self) -> Vec<String> {
        lock(&self.events).clone()
    }
}

impl Loader for RecordingLoader {
    fn show(&self, message: &str) {
        lock(&self.events).push(format!("show:{message}"));
    }

    fn hide(&self) {
        lock(&self.events).push("hide".to_string());
    }
}

/// A four-statement question whose illusion is statement `correct`.
pub fn fixture_question(correct: usize) -> Question {
    let statements = (1..=4).map(|i| format!("العبارة {i}")).collect();
    Question::new(statements, correct, format!("العبارة {} مختلقة", correct + 1))
        .unwrap_or_else(|e| panic!("fixture question is invalid: {e}"))
}

/// Test harness for scripted rounds.
pub struct TestHarness {
    pub round: Round,
    pub player: PlayerData,
    upcoming: VecDeque<Question>,
    events: Arc<Mutex<Vec<RoundEvent>>>,
}

impl TestHarness {
    /// A round of `config.questions_per_round` fixture questions, all with
    /// the illusion at index 2, and a player with 100 XP.
    pub fn new(config: GameConfig) -> Self {
        let questions = (0..config.questions_per_round.max(1))
            .map(|_| fixture_question(2))
            .collect();
        Self::with_questions(config, questions)
    }

    /// A round over the given questions. The first one is presented
    /// immediately.
    pub fn with_questions(config: GameConfig, questions: Vec<Question>) -> Self {
        let mut upcoming = VecDeque::from(questions);
        let first = upcoming
            .pop_front()
            .unwrap_or_else(|| panic!("harness needs at least one question"));
        let aids = AidInventory::new(config.starting_reveal, config.starting_narrow);
        let mut round = Round::new(config, first, aids)
            .unwrap_or_else(|e| panic!("harness round is invalid: {e}"))
            .with_topic("اختبار")
            .with_rng_seed(42);

        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        round.subscribe(move |event| lock(&sink).push(event.clone()));

        Self {
            round,
            player: PlayerData::new("tester").with_xp(100),
            upcoming,
            events,
        }
    }

    pub fn with_player(mut self, player: PlayerData) -> Self {
        self.player = player;
        self
    }

    pub fn answer(&mut self, index: usize) -> Option<AnswerOutcome> {
        self.round.select_answer(index)
    }

    pub fn use_aid(&mut self, kind: AidKind) -> Option<AidEffect> {
        self.round.use_aid(kind, &mut self.player)
    }

    /// Continue from the results, presenting the next queued question when
    /// the round asks for one.
    pub fn advance(&mut self) -> Option<Continuation> {
        let continuation = self.round.continue_round(false)?;
        if let Continuation::NextQuestion { .. } = continuation {
            let question = self.upcoming.pop_front()?;
            self.round
                .present(question)
                .unwrap_or_else(|e| panic!("could not present next question: {e}"));
        }
        Some(continuation)
    }

    /// Every event published so far.
    pub fn events(&self) -> Vec<RoundEvent> {
        lock(&self.events).clone()
    }

    pub fn clear_events(&self) {
        lock(&self.events).clear();
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new(GameConfig::default())
    }
}

// ============================================================================
// Assertion Helpers
// ============================================================================

/// Assert score, streak and accuracy together.
#[track_caller]
pub fn assert_stats(harness: &TestHarness, score: u32, streak: u32, accuracy: u8) {
    let state = harness.round.state();
    assert_eq!(
        (state.score, state.streak, state.accuracy),
        (score, streak, accuracy),
        "Expected score/streak/accuracy {score}/{streak}/{accuracy}%, got {}/{}/{}%",
        state.score,
        state.streak,
        state.accuracy
    );
}

#[track_caller]
pub fn assert_phase(harness: &TestHarness, phase: RoundPhase) {
    assert_eq!(harness.round.phase(), phase, "Unexpected round phase");
}

#[track_caller]
pub fn assert_aids(harness: &TestHarness, reveal: u32, narrow: u32) {
    let aids = harness.round.state().aids;
    assert_eq!(
        (aids.reveal, aids.narrow),
        (reveal, narrow),
        "Expected {reveal} reveal / {narrow} narrow aids, got {} / {}",
        aids.reveal,
        aids.narrow
    );
}

/// Assert the event log contains `event`.
#[track_caller]
pub fn assert_emitted(harness: &TestHarness, event: &RoundEvent) {
    assert!(
        harness.events().contains(event),
        "Expected event {event:?} in {:?}",
        harness.events()
    );
}
