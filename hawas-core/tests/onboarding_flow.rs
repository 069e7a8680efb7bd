//! Onboarding from first question to finished profile.

use hawas_core::onboarding::{
    CulturalDepth, ExperienceLevel, Interest, LearningGoal, LOADER_MESSAGE, ONBOARDING_QUESTIONS,
};
use hawas_core::testing::{MockNoteGenerator, RecordingLoader};
use hawas_core::{OnboardingError, OnboardingFlow, OnboardingProgress, FALLBACK_NOTE};
use std::sync::Arc;

#[tokio::test]
async fn test_walkthrough_builds_profile() {
    let generator = Arc::new(MockNoteGenerator::ok("مرحباً أيها المحقق"));
    let loader = Arc::new(RecordingLoader::default());
    let mut flow = OnboardingFlow::new("سامي", generator.clone()).with_loader(loader.clone());
    assert_eq!(flow.greeting(), "مرحباً بك، سامي!");

    let mut percentages = Vec::new();
    let mut prompts = Vec::new();
    let mut last = None;
    for option in [1, 2, 0, 2] {
        percentages.push(flow.progress_percentage());
        prompts.push(flow.current_question().unwrap().prompt);
        last = Some(flow.choose(option).await.unwrap());
    }

    assert_eq!(percentages, vec![25, 50, 75, 100]);
    assert_eq!(
        prompts,
        ONBOARDING_QUESTIONS.iter().map(|q| q.prompt).collect::<Vec<_>>()
    );

    let Some(OnboardingProgress::Complete(profile)) = last else {
        panic!("expected a finished profile");
    };
    assert_eq!(profile.experience_level, ExperienceLevel::Intermediate);
    assert_eq!(profile.interests, Interest::Mixed);
    assert_eq!(profile.learning_goals, LearningGoal::Education);
    assert_eq!(profile.cultural_depth, CulturalDepth::Rich);
    assert_eq!(profile.personalized_note, "مرحباً أيها المحقق");
    assert_eq!(generator.calls(), 1);
    assert_eq!(
        loader.events(),
        vec![format!("show:{LOADER_MESSAGE}"), "hide".to_string()]
    );
}

#[tokio::test]
async fn test_rejected_note_falls_back_and_completes() {
    let generator = Arc::new(MockNoteGenerator::failing());
    let loader = Arc::new(RecordingLoader::default());
    let mut flow = OnboardingFlow::new("p", generator.clone()).with_loader(loader.clone());

    for _ in 0..3 {
        assert!(matches!(
            flow.choose(0).await,
            Ok(OnboardingProgress::Next { .. })
        ));
    }
    let Ok(OnboardingProgress::Complete(profile)) = flow.choose(0).await else {
        panic!("failure must not escape onboarding");
    };

    assert_eq!(profile.personalized_note, FALLBACK_NOTE);
    assert_eq!(generator.calls(), 1);
    assert_eq!(loader.events().last().map(String::as_str), Some("hide"));
    assert_eq!(flow.choose(0).await, Err(OnboardingError::AlreadyComplete));
}

#[test]
fn test_profile_serializes_with_snake_case_values() {
    let profile = hawas_core::OnboardingProfile::new(
        hawas_core::OnboardingAnswers {
            experience_level: ExperienceLevel::Beginner,
            interests: Interest::Science,
            learning_goals: LearningGoal::Entertainment,
            cultural_depth: CulturalDepth::Moderate,
        },
        "note",
    );
    let json = serde_json::to_value(&profile).unwrap();
    assert_eq!(json["experience_level"], "beginner");
    assert_eq!(json["learning_goals"], "entertainment");
    assert_eq!(json["cultural_depth"], "moderate");
}
