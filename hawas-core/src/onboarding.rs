//! Onboarding questionnaire.
//!
//! Four fixed questions build the player's profile one answer at a time.
//! Answering the last one finalizes the profile: a personalized note is
//! requested from a [`NoteGenerator`], and if that fails a fixed fallback
//! note is used instead. Finalization happens exactly once and always
//! completes.

use crate::services::{Loader, NoopLoader, NoteGenerator};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Note used when the generator fails.
pub const FALLBACK_NOTE: &str = "تم إعداد تجربتك لكشف أوهام الذكاء الاصطناعي. استعد.";

/// Loader message shown while the note is generated.
pub const LOADER_MESSAGE: &str = "تخصيص تجربتك...";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExperienceLevel {
    Beginner,
    Intermediate,
    Advanced,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Interest {
    Science,
    Culture,
    Arts,
    Mixed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LearningGoal {
    Education,
    Entertainment,
    Mixed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CulturalDepth {
    Minimal,
    Moderate,
    Rich,
}

/// The profile field a question fills in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProfileKey {
    ExperienceLevel,
    Interests,
    LearningGoals,
    CulturalDepth,
}

impl fmt::Display for ProfileKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let key = match self {
            ProfileKey::ExperienceLevel => "experience_level",
            ProfileKey::Interests => "interests",
            ProfileKey::LearningGoals => "learning_goals",
            ProfileKey::CulturalDepth => "cultural_depth",
        };
        f.write_str(key)
    }
}

/// A value chosen for one of the profile fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerValue {
    Experience(ExperienceLevel),
    Interest(Interest),
    Goal(LearningGoal),
    Depth(CulturalDepth),
}

impl AnswerValue {
    pub fn key(&self) -> ProfileKey {
        match self {
            AnswerValue::Experience(_) => ProfileKey::ExperienceLevel,
            AnswerValue::Interest(_) => ProfileKey::Interests,
            AnswerValue::Goal(_) => ProfileKey::LearningGoals,
            AnswerValue::Depth(_) => ProfileKey::CulturalDepth,
        }
    }
}

/// One selectable option.
#[derive(Debug, Clone, Copy)]
pub struct OnboardingOption {
    pub text: &'static str,
    pub value: AnswerValue,
}

/// One step of the questionnaire.
#[derive(Debug, Clone, Copy)]
pub struct OnboardingQuestion {
    pub key: ProfileKey,
    pub prompt: &'static str,
    pub options: &'static [OnboardingOption],
}

pub const ONBOARDING_QUESTIONS: [OnboardingQuestion; 4] = [
    OnboardingQuestion {
        key: ProfileKey::ExperienceLevel,
        prompt: "ما هو مستوى معرفتك بالمواضيع العامة والتاريخية؟",
        options: &[
            OnboardingOption {
                text: "مبتدئ، أتعلم الأساسيات",
                value: AnswerValue::Experience(ExperienceLevel::Beginner),
            },
            OnboardingOption {
                text: "متوسط، لدي معرفة جيدة",
                value: AnswerValue::Experience(ExperienceLevel::Intermediate),
            },
            OnboardingOption {
                text: "متقدم، أحب التفاصيل الدقيقة",
                value: AnswerValue::Experience(ExperienceLevel::Advanced),
            },
        ],
    },
    OnboardingQuestion {
        key: ProfileKey::Interests,
        prompt: "أي من هذه المجالات يثير اهتمامك أكثر؟",
        options: &[
            OnboardingOption {
                text: "العلوم والاكتشافات",
                value: AnswerValue::Interest(Interest::Science),
            },
            OnboardingOption {
                text: "الفنون والثقافة",
                value: AnswerValue::Interest(Interest::Arts),
            },
            OnboardingOption {
                text: "مزيج من كل شيء",
                value: AnswerValue::Interest(Interest::Mixed),
            },
        ],
    },
    OnboardingQuestion {
        key: ProfileKey::LearningGoals,
        prompt: "ما هو هدفك الأساسي من لعب هَوَسْ؟",
        options: &[
            OnboardingOption {
                text: "التعلم وتوسيع معرفتي",
                value: AnswerValue::Goal(LearningGoal::Education),
            },
            OnboardingOption {
                text: "التسلية وتمضية الوقت",
                value: AnswerValue::Goal(LearningGoal::Entertainment),
            },
            OnboardingOption {
                text: "مزيج من الاثنين",
                value: AnswerValue::Goal(LearningGoal::Mixed),
            },
        ],
    },
    OnboardingQuestion {
        key: ProfileKey::CulturalDepth,
        prompt: "إلى أي مدى تفضل التعمق في التفاصيل الثقافية؟",
        options: &[
            OnboardingOption {
                text: "بشكل بسيط ومباشر",
                value: AnswerValue::Depth(CulturalDepth::Minimal),
            },
            OnboardingOption {
                text: "بشكل معتدل مع بعض التفاصيل",
                value: AnswerValue::Depth(CulturalDepth::Moderate),
            },
            OnboardingOption {
                text: "بشكل غني ومليء بالمعلومات",
                value: AnswerValue::Depth(CulturalDepth::Rich),
            },
        ],
    },
];

/// Answers collected so far.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PartialAnswers {
    pub experience_level: Option<ExperienceLevel>,
    pub interests: Option<Interest>,
    pub learning_goals: Option<LearningGoal>,
    pub cultural_depth: Option<CulturalDepth>,
}

impl PartialAnswers {
    pub fn record(&mut self, value: AnswerValue) {
        match value {
            AnswerValue::Experience(v) => self.experience_level = Some(v),
            AnswerValue::Interest(v) => self.interests = Some(v),
            AnswerValue::Goal(v) => self.learning_goals = Some(v),
            AnswerValue::Depth(v) => self.cultural_depth = Some(v),
        }
    }

    /// All four answers, if every one has been given.
    pub fn complete(&self) -> Option<OnboardingAnswers> {
        Some(OnboardingAnswers {
            experience_level: self.experience_level?,
            interests: self.interests?,
            learning_goals: self.learning_goals?,
            cultural_depth: self.cultural_depth?,
        })
    }
}

/// The full answer set handed to the note generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OnboardingAnswers {
    pub experience_level: ExperienceLevel,
    pub interests: Interest,
    pub learning_goals: LearningGoal,
    pub cultural_depth: CulturalDepth,
}

/// A finished profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OnboardingProfile {
    pub experience_level: ExperienceLevel,
    pub interests: Interest,
    pub learning_goals: LearningGoal,
    pub cultural_depth: CulturalDepth,
    pub personalized_note: String,
}

impl OnboardingProfile {
    pub fn new(answers: OnboardingAnswers, personalized_note: impl Into<String>) -> Self {
        Self {
            experience_level: answers.experience_level,
            interests: answers.interests,
            learning_goals: answers.learning_goals,
            cultural_depth: answers.cultural_depth,
            personalized_note: personalized_note.into(),
        }
    }

    pub fn used_fallback_note(&self) -> bool {
        self.personalized_note == FALLBACK_NOTE
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum OnboardingError {
    #[error("option {option} does not exist on step {step}")]
    InvalidOption { step: usize, option: usize },

    #[error("onboarding is not waiting to be finalized")]
    NotReady,

    #[error("onboarding already completed")]
    AlreadyComplete,
}

/// What a choice led to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OnboardingProgress {
    /// Moved on to another question.
    Next { step: usize },
    /// Every question answered; call [`OnboardingFlow::finish`].
    ReadyToFinish,
    /// Finalized.
    Complete(OnboardingProfile),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FlowState {
    Collecting { step: usize },
    Finalizing(OnboardingAnswers),
    Complete,
}

/// Linear questionnaire flow for one player.
pub struct OnboardingFlow {
    username: String,
    state: FlowState,
    answers: PartialAnswers,
    generator: Arc<dyn NoteGenerator>,
    loader: Arc<dyn Loader>,
}

impl OnboardingFlow {
    pub fn new(username: impl Into<String>, generator: Arc<dyn NoteGenerator>) -> Self {
        Self {
            username: username.into(),
            state: FlowState::Collecting { step: 0 },
            answers: PartialAnswers::default(),
            generator,
            loader: Arc::new(NoopLoader),
        }
    }

    pub fn with_loader(mut self, loader: Arc<dyn Loader>) -> Self {
        self.loader = loader;
        self
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn step_count(&self) -> usize {
        ONBOARDING_QUESTIONS.len()
    }

    /// 0-based index of the question on screen. Stays on the last step once
    /// all answers are in.
    pub fn step(&self) -> usize {
        match self.state {
            FlowState::Collecting { step } => step,
            FlowState::Finalizing(_) | FlowState::Complete => self.step_count() - 1,
        }
    }

    pub fn current_question(&self) -> Option<&'static OnboardingQuestion> {
        match self.state {
            FlowState::Collecting { step } => ONBOARDING_QUESTIONS.get(step),
            _ => None,
        }
    }

    pub fn answers(&self) -> &PartialAnswers {
        &self.answers
    }

    pub fn is_finalizing(&self) -> bool {
        matches!(self.state, FlowState::Finalizing(_))
    }

    pub fn is_complete(&self) -> bool {
        self.state == FlowState::Complete
    }

    /// Width of the progress bar, in percent.
    pub fn progress_percentage(&self) -> u16 {
        ((self.step() + 1) * 100 / self.step_count()) as u16
    }

    /// "مرحباً بك، {name}!"
    pub fn greeting(&self) -> String {
        format!("مرحباً بك، {}!", self.username)
    }

    /// Subtitle with the step counter.
    pub fn subtitle(&self) -> String {
        format!(
            "لنبني لك تجربة فريدة. ({}/{})",
            self.step() + 1,
            self.step_count()
        )
    }

    /// Record the option picked on the current step and advance.
    pub fn select(&mut self, option: usize) -> Result<OnboardingProgress, OnboardingError> {
        let step = match self.state {
            FlowState::Collecting { step } => step,
            FlowState::Finalizing(_) => return Err(OnboardingError::NotReady),
            FlowState::Complete => return Err(OnboardingError::AlreadyComplete),
        };
        let question = &ONBOARDING_QUESTIONS[step];
        let choice = question
            .options
            .get(option)
            .ok_or(OnboardingError::InvalidOption { step, option })?;

        self.answers.record(choice.value);
        tracing::debug!(key = %question.key, step, "onboarding answer recorded");

        if step + 1 < self.step_count() {
            self.state = FlowState::Collecting { step: step + 1 };
            return Ok(OnboardingProgress::Next { step: step + 1 });
        }

        match self.answers.complete() {
            Some(answers) => {
                self.state = FlowState::Finalizing(answers);
                Ok(OnboardingProgress::ReadyToFinish)
            }
            // Each step writes its own key, so this can't be reached after
            // the last step; restart rather than finalize with holes.
            None => {
                self.state = FlowState::Collecting { step: 0 };
                Ok(OnboardingProgress::Next { step: 0 })
            }
        }
    }

    /// Generate the personalized note and complete the profile.
    ///
    /// Generator failures are logged and replaced by [`FALLBACK_NOTE`]; they
    /// never reach the caller.
    pub async fn finish(&mut self) -> Result<OnboardingProfile, OnboardingError> {
        let answers = match self.state {
            FlowState::Finalizing(answers) => answers,
            FlowState::Collecting { .. } => return Err(OnboardingError::NotReady),
            FlowState::Complete => return Err(OnboardingError::AlreadyComplete),
        };

        // If this future is dropped while waiting, the loader is hidden and
        // the flow stays finalizing.
        let loading = Loading::show(self.loader.as_ref());
        let note = match self.generator.generate_note(&answers).await {
            Ok(note) => note,
            Err(e) => {
                tracing::warn!(error = %e, "failed to generate personalized note, using fallback");
                FALLBACK_NOTE.to_string()
            }
        };
        drop(loading);
        self.state = FlowState::Complete;

        let profile = OnboardingProfile::new(answers, note);
        tracing::info!(
            username = %self.username,
            fallback = profile.used_fallback_note(),
            "onboarding complete"
        );
        Ok(profile)
    }

    /// Select an option and, if that was the last step, finalize.
    pub async fn choose(&mut self, option: usize) -> Result<OnboardingProgress, OnboardingError> {
        match self.select(option)? {
            OnboardingProgress::ReadyToFinish => {
                Ok(OnboardingProgress::Complete(self.finish().await?))
            }
            progress => Ok(progress),
        }
    }
}

/// Shows the loader message until dropped.
struct Loading<'a> {
    loader: &'a dyn Loader,
}

impl<'a> Loading<'a> {
    fn show(loader: &'a dyn Loader) -> Self {
        loader.show(LOADER_MESSAGE);
        Self { loader }
    }
}

impl Drop for Loading<'_> {
    fn drop(&mut self) {
        self.loader.hide();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::NoteError;
    use crate::testing::{MockNoteGenerator, RecordingLoader};
    use async_trait::async_trait;
    use std::time::Duration;

    /// Never produces a note.
    struct StalledNoteGenerator;

    #[async_trait]
    impl NoteGenerator for StalledNoteGenerator {
        async fn generate_note(&self, _answers: &OnboardingAnswers) -> Result<String, NoteError> {
            std::future::pending().await
        }
    }

    #[test]
    fn test_questions_cover_every_key_once() {
        let keys: Vec<ProfileKey> = ONBOARDING_QUESTIONS.iter().map(|q| q.key).collect();
        assert_eq!(
            keys,
            vec![
                ProfileKey::ExperienceLevel,
                ProfileKey::Interests,
                ProfileKey::LearningGoals,
                ProfileKey::CulturalDepth,
            ]
        );
        for question in &ONBOARDING_QUESTIONS {
            assert!(question.options.iter().all(|o| o.value.key() == question.key));
        }
    }

    #[test]
    fn test_select_advances_steps() {
        let mut flow = OnboardingFlow::new("ليلى", Arc::new(MockNoteGenerator::ok("note")));
        assert_eq!(flow.step(), 0);
        assert_eq!(flow.progress_percentage(), 25);
        assert_eq!(flow.subtitle(), "لنبني لك تجربة فريدة. (1/4)");

        assert_eq!(flow.select(2), Ok(OnboardingProgress::Next { step: 1 }));
        assert_eq!(flow.answers().experience_level, Some(ExperienceLevel::Advanced));
        assert_eq!(flow.select(0), Ok(OnboardingProgress::Next { step: 2 }));
        assert_eq!(flow.select(1), Ok(OnboardingProgress::Next { step: 3 }));
        assert_eq!(flow.progress_percentage(), 100);
        assert_eq!(flow.select(1), Ok(OnboardingProgress::ReadyToFinish));
        assert!(flow.is_finalizing());
        assert_eq!(flow.select(0), Err(OnboardingError::NotReady));
    }

    #[test]
    fn test_invalid_option_keeps_step() {
        let mut flow = OnboardingFlow::new("p", Arc::new(MockNoteGenerator::ok("note")));
        assert_eq!(
            flow.select(3),
            Err(OnboardingError::InvalidOption { step: 0, option: 3 })
        );
        assert_eq!(flow.step(), 0);
        assert_eq!(flow.answers(), &PartialAnswers::default());
    }

    #[tokio::test]
    async fn test_finish_with_generated_note() {
        let generator = Arc::new(MockNoteGenerator::ok("أهلاً بالمكتشف"));
        let loader = Arc::new(RecordingLoader::default());
        let mut flow = OnboardingFlow::new("p", generator.clone()).with_loader(loader.clone());

        for option in [0, 1, 2] {
            flow.choose(option).await.unwrap();
        }
        let progress = flow.choose(0).await.unwrap();

        let OnboardingProgress::Complete(profile) = progress else {
            panic!("expected completion, got {progress:?}");
        };
        assert_eq!(profile.personalized_note, "أهلاً بالمكتشف");
        assert_eq!(profile.experience_level, ExperienceLevel::Beginner);
        assert_eq!(profile.interests, Interest::Arts);
        assert_eq!(profile.learning_goals, LearningGoal::Mixed);
        assert_eq!(profile.cultural_depth, CulturalDepth::Minimal);
        assert_eq!(generator.calls(), 1);
        assert_eq!(
            loader.events(),
            vec![format!("show:{LOADER_MESSAGE}"), "hide".to_string()]
        );
    }

    #[tokio::test]
    async fn test_generator_failure_uses_fallback() {
        let generator = Arc::new(MockNoteGenerator::failing());
        let mut flow = OnboardingFlow::new("p", generator.clone());
        for _ in 0..3 {
            flow.choose(1).await.unwrap();
        }

        let Ok(OnboardingProgress::Complete(profile)) = flow.choose(1).await else {
            panic!("flow must complete on generator failure");
        };
        assert_eq!(profile.personalized_note, FALLBACK_NOTE);
        assert!(profile.used_fallback_note());
        assert!(flow.is_complete());
        assert_eq!(generator.calls(), 1);
    }

    #[tokio::test]
    async fn test_finish_runs_once() {
        let generator = Arc::new(MockNoteGenerator::ok("n"));
        let mut flow = OnboardingFlow::new("p", generator.clone());
        assert_eq!(flow.finish().await, Err(OnboardingError::NotReady));

        for _ in 0..4 {
            flow.select(0).unwrap();
        }
        assert!(flow.finish().await.is_ok());
        assert_eq!(flow.finish().await, Err(OnboardingError::AlreadyComplete));
        assert_eq!(flow.choose(0).await, Err(OnboardingError::AlreadyComplete));
        assert_eq!(generator.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_abandoned_finish_hides_loader() {
        let loader = Arc::new(RecordingLoader::default());
        let mut flow =
            OnboardingFlow::new("p", Arc::new(StalledNoteGenerator)).with_loader(loader.clone());
        for _ in 0..4 {
            flow.select(0).unwrap();
        }

        let abandoned = tokio::time::timeout(Duration::from_secs(5), flow.finish()).await;
        assert!(abandoned.is_err());
        assert_eq!(
            loader.events(),
            vec![format!("show:{LOADER_MESSAGE}"), "hide".to_string()]
        );
        assert!(flow.is_finalizing());
        assert!(!flow.is_complete());
    }
}
