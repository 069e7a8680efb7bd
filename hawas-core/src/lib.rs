//! Game logic for هَوَسْ (Hawas), an Arabic trivia game where the player
//! spots the one invented statement among true ones.
//!
//! This crate provides:
//! - The per-question round state machine with scoring, streak and accuracy
//! - The aid economy (reveal and narrow power-ups paid for with XP)
//! - The two-phase results reveal
//! - The onboarding questionnaire with a generated welcome note
//! - Progression, the recent-rounds chart and a question bank
//!
//! # Quick Start
//!
//! ```ignore
//! use hawas_core::{GameConfig, GameSession, PlayerData, QuestionBank};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut session = GameSession::new(
//!         GameConfig::default(),
//!         QuestionBank::sample(),
//!         PlayerData::new("ليلى"),
//!     )?;
//!
//!     session.start_round()?;
//!     if let Some(report) = session.select_answer(1) {
//!         println!("correct: {}", report.outcome.correct);
//!     }
//!     session.wait_for_details().await;
//!     session.continue_round(false)?;
//!     Ok(())
//! }
//! ```

pub mod aid;
pub mod config;
pub mod headless;
pub mod onboarding;
pub mod performance;
pub mod player;
pub mod progression;
pub mod question;
pub mod results;
pub mod round;
pub mod services;
pub mod session;
pub mod testing;

// Primary public API
pub use aid::{AidBlocked, AidEconomy, AidEffect, AidInventory, AidKind, AidUsage};
pub use config::{AidCosts, ConfigError, GameConfig, ProgressionConfig};
pub use headless::HeadlessGame;
pub use onboarding::{
    OnboardingAnswers, OnboardingError, OnboardingFlow, OnboardingProfile, OnboardingProgress,
    FALLBACK_NOTE,
};
pub use performance::{PerformanceChart, ScoreEntry};
pub use player::PlayerData;
pub use progression::{Progression, ProgressionUpdate};
pub use question::{FactCheck, FactSource, Question, QuestionBank, QuestionError, Topic};
pub use results::{ResultsPhase, ResultsSequencer, ResultsView};
pub use round::{
    AnswerOutcome, Continuation, GameState, Round, RoundError, RoundEvent, RoundPhase,
    RoundSummary, StatementState,
};
pub use services::{
    ClaudeFactChecker, ClaudeNoteGenerator, FactChecker, Loader, NoopLoader, NoteGenerator,
    OfflineNoteGenerator, SourceFactChecker,
};
pub use session::{AnswerReport, FactCheckTicket, GameSession, SessionError};
pub use testing::{MockFactChecker, MockNoteGenerator, TestHarness};
