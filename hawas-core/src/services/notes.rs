//! Personalized welcome notes.

use crate::onboarding::{CulturalDepth, ExperienceLevel, Interest, LearningGoal, OnboardingAnswers};
use async_trait::async_trait;
use claude::Claude;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NoteError {
    #[error("Claude request failed: {0}")]
    Claude(#[from] claude::Error),

    #[error("generator returned an empty note")]
    Empty,

    #[error("note generator unavailable: {0}")]
    Unavailable(String),
}

/// Writes the short note shown on the home screen after onboarding.
#[async_trait]
pub trait NoteGenerator: Send + Sync {
    async fn generate_note(&self, answers: &OnboardingAnswers) -> Result<String, NoteError>;
}

const NOTE_SYSTEM_PROMPT: &str = "أنت مضيف لعبة \"هَوَسْ\"، لعبة عربية يكشف فيها اللاعب العبارة \
المختلقة بين عبارات حقيقية. اكتب رسالة ترحيب قصيرة بالعربية الفصحى، جملتين على الأكثر، \
بلا علامات تنسيق ولا رموز تعبيرية.";

const NOTE_MAX_TOKENS: usize = 200;

/// Claude-backed note generator.
#[derive(Clone)]
pub struct ClaudeNoteGenerator {
    client: Claude,
}

impl ClaudeNoteGenerator {
    pub fn new(client: Claude) -> Self {
        Self { client }
    }

    /// Build from `ANTHROPIC_API_KEY`.
    pub fn from_env() -> Result<Self, NoteError> {
        Ok(Self::new(Claude::from_env()?))
    }

    fn prompt(answers: &OnboardingAnswers) -> String {
        format!(
            "ملف اللاعب:\n- مستوى المعرفة: {}\n- الاهتمامات: {}\n- الهدف: {}\n- العمق الثقافي: {}\n\
             اكتب رسالة ترحيب تناسب هذا الملف وتشجعه على كشف الأوهام.",
            experience_text(answers.experience_level),
            interest_text(answers.interests),
            goal_text(answers.learning_goals),
            depth_text(answers.cultural_depth),
        )
    }
}

#[async_trait]
impl NoteGenerator for ClaudeNoteGenerator {
    async fn generate_note(&self, answers: &OnboardingAnswers) -> Result<String, NoteError> {
        let text = self
            .client
            .ask(NOTE_SYSTEM_PROMPT, Self::prompt(answers), NOTE_MAX_TOKENS)
            .await?;
        let note = text.trim();
        if note.is_empty() {
            return Err(NoteError::Empty);
        }
        tracing::debug!(chars = note.chars().count(), "personalized note generated");
        Ok(note.to_string())
    }
}

/// Never generates; onboarding falls back to its fixed note.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineNoteGenerator;

#[async_trait]
impl NoteGenerator for OfflineNoteGenerator {
    async fn generate_note(&self, _answers: &OnboardingAnswers) -> Result<String, NoteError> {
        Err(NoteError::Unavailable("offline".to_string()))
    }
}

fn experience_text(level: ExperienceLevel) -> &'static str {
    match level {
        ExperienceLevel::Beginner => "مبتدئ",
        ExperienceLevel::Intermediate => "متوسط",
        ExperienceLevel::Advanced => "متقدم",
    }
}

fn interest_text(interest: Interest) -> &'static str {
    match interest {
        Interest::Science => "العلوم والاكتشافات",
        Interest::Culture => "الثقافة",
        Interest::Arts => "الفنون والثقافة",
        Interest::Mixed => "مزيج من كل شيء",
    }
}

fn goal_text(goal: LearningGoal) -> &'static str {
    match goal {
        LearningGoal::Education => "التعلم",
        LearningGoal::Entertainment => "التسلية",
        LearningGoal::Mixed => "التعلم والتسلية",
    }
}

fn depth_text(depth: CulturalDepth) -> &'static str {
    match depth {
        CulturalDepth::Minimal => "بسيط",
        CulturalDepth::Moderate => "معتدل",
        CulturalDepth::Rich => "غني",
    }
}
