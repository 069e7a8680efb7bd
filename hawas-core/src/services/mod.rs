//! External collaborators.
//!
//! The round and onboarding flow never reach out on their own; they are
//! handed these traits by the controller. Each trait has a Claude-backed
//! implementation and an offline one.

pub mod fact_check;
pub mod loader;
pub mod notes;

pub use fact_check::{ClaudeFactChecker, FactCheckError, FactChecker, SourceFactChecker};
pub use loader::{Loader, NoopLoader};
pub use notes::{ClaudeNoteGenerator, NoteError, NoteGenerator, OfflineNoteGenerator};
