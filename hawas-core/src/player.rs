//! Cross-round player resources.

use serde::{Deserialize, Serialize};

/// What the game knows about the player between rounds.
///
/// `xp` is the spendable balance. `lifetime_xp` only ever grows and drives
/// the level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerData {
    pub username: String,
    pub xp: u32,
    #[serde(default)]
    pub lifetime_xp: u32,
    #[serde(default = "first_level")]
    pub level: u32,
}

fn first_level() -> u32 {
    1
}

impl PlayerData {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            xp: 0,
            lifetime_xp: 0,
            level: 1,
        }
    }

    pub fn with_xp(mut self, xp: u32) -> Self {
        self.xp = xp;
        self
    }

    pub fn can_afford(&self, cost: u32) -> bool {
        self.xp >= cost
    }

    /// Debit `cost` XP. Returns false and leaves the balance alone when the
    /// player can't pay.
    pub fn spend(&mut self, cost: u32) -> bool {
        match self.xp.checked_sub(cost) {
            Some(rest) => {
                self.xp = rest;
                true
            }
            None => false,
        }
    }

    /// Credit earned XP and recompute the level.
    pub fn earn(&mut self, amount: u32, xp_per_level: u32) {
        self.xp = self.xp.saturating_add(amount);
        self.lifetime_xp = self.lifetime_xp.saturating_add(amount);
        self.level = 1 + self.lifetime_xp / xp_per_level.max(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spend_requires_balance() {
        let mut player = PlayerData::new("ليلى").with_xp(30);
        assert!(!player.spend(31));
        assert_eq!(player.xp, 30);
        assert!(player.spend(30));
        assert_eq!(player.xp, 0);
    }

    #[test]
    fn test_earn_levels_up_on_lifetime_xp() {
        let mut player = PlayerData::new("sami");
        player.earn(150, 100);
        assert_eq!(player.level, 2);
        assert!(player.spend(150));
        // Spending never lowers the level.
        assert_eq!(player.level, 2);
        player.earn(50, 100);
        assert_eq!(player.level, 3);
        assert_eq!(player.xp, 50);
    }

    #[test]
    fn test_deserialize_defaults() {
        let player: PlayerData = serde_json::from_str(r#"{"username": "a", "xp": 5}"#).unwrap();
        assert_eq!(player.level, 1);
        assert_eq!(player.lifetime_xp, 0);
    }
}
