//! XP awards and aid reward opportunities.

use crate::config::ProgressionConfig;
use crate::player::PlayerData;
use crate::round::AnswerOutcome;

/// What one answer did for the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProgressionUpdate {
    pub xp_earned: u32,
    pub leveled_up: bool,
    /// The streak hit a reward milestone.
    pub reward_earned: bool,
}

/// Applies [`ProgressionConfig`] to answer outcomes.
#[derive(Debug, Clone, Copy)]
pub struct Progression {
    config: ProgressionConfig,
}

impl Progression {
    pub fn new(config: ProgressionConfig) -> Self {
        Self { config }
    }

    /// Credit XP for a correct answer and report whether a reward opened.
    pub fn apply(&self, outcome: &AnswerOutcome, player: &mut PlayerData) -> ProgressionUpdate {
        if !outcome.correct {
            return ProgressionUpdate::default();
        }

        let level_before = player.level;
        let xp_earned = self.config.xp_per_correct.saturating_mul(player.level);
        player.earn(xp_earned, self.config.xp_per_level);

        let interval = self.config.reward_streak_interval.max(1);
        ProgressionUpdate {
            xp_earned,
            leveled_up: player.level > level_before,
            reward_earned: outcome.streak > 0 && outcome.streak % interval == 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(correct: bool, streak: u32) -> AnswerOutcome {
        AnswerOutcome {
            index: 0,
            correct,
            score: 0,
            streak,
            accuracy: 0,
        }
    }

    #[test]
    fn test_xp_scales_with_level() {
        let progression = Progression::new(ProgressionConfig {
            xp_per_correct: 10,
            reward_streak_interval: 3,
            xp_per_level: 1000,
        });
        let mut player = PlayerData::new("p");
        player.level = 3;

        let update = progression.apply(&outcome(true, 1), &mut player);
        assert_eq!(update.xp_earned, 30);
        assert_eq!(player.xp, 30);
        assert!(!update.reward_earned);
    }

    #[test]
    fn test_wrong_answer_earns_nothing() {
        let progression = Progression::new(ProgressionConfig::default());
        let mut player = PlayerData::new("p");
        assert_eq!(
            progression.apply(&outcome(false, 0), &mut player),
            ProgressionUpdate::default()
        );
        assert_eq!(player.xp, 0);
    }

    #[test]
    fn test_reward_on_streak_multiples() {
        let progression = Progression::new(ProgressionConfig::default());
        let mut player = PlayerData::new("p");
        let rewards: Vec<bool> = (1..=6)
            .map(|streak| progression.apply(&outcome(true, streak), &mut player).reward_earned)
            .collect();
        assert_eq!(rewards, vec![false, false, true, false, false, true]);
    }

    #[test]
    fn test_level_up_reported() {
        let progression = Progression::new(ProgressionConfig {
            xp_per_correct: 50,
            reward_streak_interval: 3,
            xp_per_level: 100,
        });
        let mut player = PlayerData::new("p");
        assert!(!progression.apply(&outcome(true, 1), &mut player).leveled_up);
        assert!(progression.apply(&outcome(true, 2), &mut player).leveled_up);
        assert_eq!(player.level, 2);
    }
}
