//! Game configuration.
//!
//! Constants the round and aid economy consume, gathered into one struct that
//! is passed in at construction. Values can be tweaked with builder methods or
//! read from a TOML file; anything missing from the file keeps its default.

use crate::aid::AidKind;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Errors from loading a configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// XP price of each aid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AidCosts {
    pub reveal: u32,
    pub narrow: u32,
}

impl Default for AidCosts {
    fn default() -> Self {
        Self {
            reveal: 25,
            narrow: 40,
        }
    }
}

impl AidCosts {
    pub fn cost(&self, kind: AidKind) -> u32 {
        match kind {
            AidKind::Reveal => self.reveal,
            AidKind::Narrow => self.narrow,
        }
    }
}

/// XP and reward pacing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgressionConfig {
    /// XP credited per correct answer, multiplied by the player's level.
    pub xp_per_correct: u32,
    /// A reward opportunity opens every time the streak hits a multiple of this.
    pub reward_streak_interval: u32,
    /// XP needed per level.
    pub xp_per_level: u32,
}

impl Default for ProgressionConfig {
    fn default() -> Self {
        Self {
            xp_per_correct: 10,
            reward_streak_interval: 3,
            xp_per_level: 200,
        }
    }
}

/// Configuration for rounds and the aid economy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Number of questions in one round.
    pub questions_per_round: usize,

    /// Per-aid XP cost table.
    pub aid_costs: AidCosts,

    /// How many of each aid a claimed reward grants.
    pub aid_reward_amount: u32,

    /// Aid counts a brand new player starts with.
    pub starting_reveal: u32,
    pub starting_narrow: u32,

    /// How long the verdict flash stays up before the details appear.
    pub reveal_dwell_ms: u64,

    pub progression: ProgressionConfig,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            questions_per_round: 5,
            aid_costs: AidCosts::default(),
            aid_reward_amount: 1,
            starting_reveal: 1,
            starting_narrow: 1,
            reveal_dwell_ms: 1200,
            progression: ProgressionConfig::default(),
        }
    }
}

impl GameConfig {
    /// Load a TOML file. Missing keys fall back to the defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config: GameConfig = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.questions_per_round == 0 {
            return Err(ConfigError::Invalid(
                "questions_per_round must be at least 1".to_string(),
            ));
        }
        if self.progression.reward_streak_interval == 0 {
            return Err(ConfigError::Invalid(
                "progression.reward_streak_interval must be at least 1".to_string(),
            ));
        }
        if self.progression.xp_per_level == 0 {
            return Err(ConfigError::Invalid(
                "progression.xp_per_level must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Set the number of questions per round.
    pub fn with_questions_per_round(mut self, count: usize) -> Self {
        self.questions_per_round = count;
        self
    }

    /// Set the aid cost table.
    pub fn with_aid_costs(mut self, reveal: u32, narrow: u32) -> Self {
        self.aid_costs = AidCosts { reveal, narrow };
        self
    }

    /// Set how many aids one claimed reward grants.
    pub fn with_aid_reward_amount(mut self, amount: u32) -> Self {
        self.aid_reward_amount = amount;
        self
    }

    /// Set the aid counts for a new player.
    pub fn with_starting_aids(mut self, reveal: u32, narrow: u32) -> Self {
        self.starting_reveal = reveal;
        self.starting_narrow = narrow;
        self
    }

    /// Set the verdict flash dwell time.
    pub fn with_reveal_dwell(mut self, dwell: Duration) -> Self {
        self.reveal_dwell_ms = dwell.as_millis() as u64;
        self
    }

    /// Set the progression constants.
    pub fn with_progression(mut self, progression: ProgressionConfig) -> Self {
        self.progression = progression;
        self
    }

    pub fn reveal_dwell(&self) -> Duration {
        Duration::from_millis(self.reveal_dwell_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = GameConfig::default();
        assert_eq!(config.questions_per_round, 5);
        assert_eq!(config.reveal_dwell(), Duration::from_millis(1200));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder() {
        let config = GameConfig::default()
            .with_questions_per_round(10)
            .with_aid_costs(5, 15)
            .with_aid_reward_amount(2)
            .with_starting_aids(0, 3)
            .with_reveal_dwell(Duration::from_millis(500));

        assert_eq!(config.questions_per_round, 10);
        assert_eq!(config.aid_costs.cost(AidKind::Reveal), 5);
        assert_eq!(config.aid_costs.cost(AidKind::Narrow), 15);
        assert_eq!(config.aid_reward_amount, 2);
        assert_eq!((config.starting_reveal, config.starting_narrow), (0, 3));
        assert_eq!(config.reveal_dwell_ms, 500);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: GameConfig = toml::from_str(
            r#"
            questions_per_round = 7

            [aid_costs]
            narrow = 60
            "#,
        )
        .unwrap();

        assert_eq!(config.questions_per_round, 7);
        assert_eq!(config.aid_costs.narrow, 60);
        assert_eq!(config.aid_costs.reveal, AidCosts::default().reveal);
        assert_eq!(config.reveal_dwell_ms, 1200);
    }

    #[test]
    fn test_zero_questions_is_invalid() {
        let config = GameConfig::default().with_questions_per_round(0);
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }
}
