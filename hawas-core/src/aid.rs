//! The aid economy.
//!
//! Two independent consumables, each gated by a remaining count and an XP
//! price:
//! - **Reveal** (كَشْف) produces a text hint.
//! - **Narrow** (تَقْلِيص) disables wrong statements, leaving the answer and
//!   exactly one decoy selectable.
//!
//! Ineligible uses are refused without touching any state. The refusal reason
//! is exposed as [`AidBlocked`] so a client can grey out the button.

use crate::config::AidCosts;
use crate::player::PlayerData;
use crate::question::Question;
use rand::seq::IteratorRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// The two kinds of aid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AidKind {
    Reveal,
    Narrow,
}

impl AidKind {
    pub fn all() -> [AidKind; 2] {
        [AidKind::Reveal, AidKind::Narrow]
    }

    /// Label shown on the aid button.
    pub fn label(&self) -> &'static str {
        match self {
            AidKind::Reveal => "كَشْف",
            AidKind::Narrow => "تَقْلِيص",
        }
    }

    /// "[ كَشْف (1) | 25 XP ]"
    pub fn button_label(&self, count: u32, cost: u32) -> String {
        format!("[ {} ({count}) | {cost} XP ]", self.label())
    }

    /// Parse "reveal"/"narrow" or their first letter.
    pub fn parse(name: &str) -> Option<AidKind> {
        match name.trim().to_lowercase().as_str() {
            "reveal" | "r" => Some(AidKind::Reveal),
            "narrow" | "n" => Some(AidKind::Narrow),
            _ => None,
        }
    }
}

impl fmt::Display for AidKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AidKind::Reveal => write!(f, "reveal"),
            AidKind::Narrow => write!(f, "narrow"),
        }
    }
}

/// Remaining aid counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AidInventory {
    pub reveal: u32,
    pub narrow: u32,
}

impl AidInventory {
    pub fn new(reveal: u32, narrow: u32) -> Self {
        Self { reveal, narrow }
    }

    pub fn count(&self, kind: AidKind) -> u32 {
        match kind {
            AidKind::Reveal => self.reveal,
            AidKind::Narrow => self.narrow,
        }
    }

    fn slot(&mut self, kind: AidKind) -> &mut u32 {
        match kind {
            AidKind::Reveal => &mut self.reveal,
            AidKind::Narrow => &mut self.narrow,
        }
    }
}

/// What aids did to the current question. Cleared for every new question.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AidUsage {
    /// Statements greyed out by the narrow aid. Never holds the answer.
    pub disabled_answers: BTreeSet<usize>,
    /// Hint text from the reveal aid.
    pub current_hint: Option<String>,
    used: BTreeSet<AidKind>,
}

impl AidUsage {
    pub fn is_disabled(&self, index: usize) -> bool {
        self.disabled_answers.contains(&index)
    }

    pub fn has_used(&self, kind: AidKind) -> bool {
        self.used.contains(&kind)
    }

    /// Statement indices still selectable.
    pub fn enabled_answers<'a>(&'a self, question: &'a Question) -> impl Iterator<Item = usize> + 'a {
        (0..question.len()).filter(move |i| !self.is_disabled(*i))
    }
}

/// Side effect of a successful aid use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AidEffect {
    Hint(String),
    Narrowed(BTreeSet<usize>),
}

/// Why an aid can't be used right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AidBlocked {
    NoQuestion,
    AlreadyAnswered,
    NoneLeft,
    NotEnoughXp { cost: u32, available: u32 },
    AlreadyUsed,
    NothingToNarrow,
}

impl fmt::Display for AidBlocked {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AidBlocked::NoQuestion => write!(f, "no question on screen"),
            AidBlocked::AlreadyAnswered => write!(f, "question already answered"),
            AidBlocked::NoneLeft => write!(f, "no aids of this kind left"),
            AidBlocked::NotEnoughXp { cost, available } => {
                write!(f, "costs {cost} XP, only {available} available")
            }
            AidBlocked::AlreadyUsed => write!(f, "already used on this question"),
            AidBlocked::NothingToNarrow => write!(f, "only two choices left"),
        }
    }
}

/// Everything the economy looks at when deciding whether an aid is usable.
#[derive(Debug, Clone, Copy)]
pub struct AidContext<'a> {
    pub question: Option<&'a Question>,
    pub usage: &'a AidUsage,
    pub inventory: &'a AidInventory,
    pub player: &'a PlayerData,
    pub answered: bool,
}

/// Prices, reward size and the rules for using aids.
#[derive(Debug, Clone, Copy)]
pub struct AidEconomy {
    costs: AidCosts,
    reward_amount: u32,
}

impl AidEconomy {
    pub fn new(costs: AidCosts, reward_amount: u32) -> Self {
        Self {
            costs,
            reward_amount,
        }
    }

    pub fn cost(&self, kind: AidKind) -> u32 {
        self.costs.cost(kind)
    }

    pub fn reward_amount(&self) -> u32 {
        self.reward_amount
    }

    /// Check every precondition for using `kind`.
    pub fn eligibility(&self, kind: AidKind, ctx: AidContext<'_>) -> Result<(), AidBlocked> {
        let Some(question) = ctx.question else {
            return Err(AidBlocked::NoQuestion);
        };
        if ctx.answered {
            return Err(AidBlocked::AlreadyAnswered);
        }
        if ctx.inventory.count(kind) == 0 {
            return Err(AidBlocked::NoneLeft);
        }
        let cost = self.cost(kind);
        if !ctx.player.can_afford(cost) {
            return Err(AidBlocked::NotEnoughXp {
                cost,
                available: ctx.player.xp,
            });
        }
        if ctx.usage.has_used(kind) {
            return Err(AidBlocked::AlreadyUsed);
        }
        if kind == AidKind::Narrow && ctx.usage.enabled_answers(question).count() <= 2 {
            return Err(AidBlocked::NothingToNarrow);
        }
        Ok(())
    }

    /// Use an aid on `question`.
    ///
    /// On success the XP cost and one aid are debited, the usage records the
    /// effect and the effect is returned. Returns `None` and changes nothing
    /// when any precondition fails.
    pub fn use_aid<R: Rng + ?Sized>(
        &self,
        kind: AidKind,
        question: Option<&Question>,
        answered: bool,
        usage: &mut AidUsage,
        inventory: &mut AidInventory,
        player: &mut PlayerData,
        rng: &mut R,
    ) -> Option<AidEffect> {
        let ctx = AidContext {
            question,
            usage,
            inventory,
            player,
            answered,
        };
        if let Err(blocked) = self.eligibility(kind, ctx) {
            tracing::debug!(aid = %kind, reason = %blocked, "aid refused");
            return None;
        }
        let question = question?;

        let effect = match kind {
            AidKind::Reveal => AidEffect::Hint(reveal_hint(question, usage, rng)),
            AidKind::Narrow => AidEffect::Narrowed(narrow_choices(question, usage, rng)),
        };

        if !player.spend(self.cost(kind)) {
            return None;
        }
        *inventory.slot(kind) -= 1;
        usage.used.insert(kind);
        match &effect {
            AidEffect::Hint(hint) => usage.current_hint = Some(hint.clone()),
            AidEffect::Narrowed(disabled) => usage.disabled_answers.extend(disabled.iter().copied()),
        }

        tracing::debug!(aid = %kind, xp_left = player.xp, "aid used");
        Some(effect)
    }

    /// Grant the reward amount of `kind`.
    pub fn claim(&self, kind: AidKind, inventory: &mut AidInventory) {
        let slot = inventory.slot(kind);
        *slot = slot.saturating_add(self.reward_amount);
    }
}

/// Pick which wrong statements to disable: every enabled decoy but one.
///
/// The answer and the surviving decoy stay selectable, so at least two
/// choices always remain.
pub fn narrow_choices<R: Rng + ?Sized>(
    question: &Question,
    usage: &AidUsage,
    rng: &mut R,
) -> BTreeSet<usize> {
    let decoys: Vec<usize> = question
        .wrong_answers()
        .filter(|i| !usage.is_disabled(*i))
        .collect();

    let Some(&keep) = decoys.iter().choose(rng) else {
        return BTreeSet::new();
    };

    decoys.into_iter().filter(|&i| i != keep).collect()
}

/// Produce the reveal hint: the authored one, or a line vouching for one of
/// the genuine statements still on screen.
pub fn reveal_hint<R: Rng + ?Sized>(question: &Question, usage: &AidUsage, rng: &mut R) -> String {
    if let Some(hint) = &question.hint {
        return hint.clone();
    }

    match question
        .wrong_answers()
        .filter(|i| !usage.is_disabled(*i))
        .choose(rng)
    {
        Some(genuine) => format!("العبارة رقم {} حقيقة مؤكدة.", genuine + 1),
        None => "الوهم واحد فقط بين العبارات، ابحث عن التفصيل المبالغ فيه.".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn question(n: usize, correct: usize) -> Question {
        Question::new((0..n).map(|i| format!("s{i}")).collect(), correct, "because").unwrap()
    }

    fn economy() -> AidEconomy {
        AidEconomy::new(AidCosts { reveal: 10, narrow: 20 }, 1)
    }

    #[test]
    fn test_narrow_keeps_answer_and_one_decoy() {
        let q = question(5, 3);
        for seed in 0..50 {
            let mut rng = StdRng::seed_from_u64(seed);
            let disabled = narrow_choices(&q, &AidUsage::default(), &mut rng);
            assert!(!disabled.contains(&3));
            assert_eq!(disabled.len(), 3);
        }
    }

    #[test]
    fn test_narrow_on_two_statements_disables_nothing() {
        let q = question(2, 0);
        let mut rng = StdRng::seed_from_u64(1);
        assert!(narrow_choices(&q, &AidUsage::default(), &mut rng).is_empty());
    }

    #[test]
    fn test_use_aid_debits_xp_and_count() {
        let q = question(4, 1);
        let mut usage = AidUsage::default();
        let mut inventory = AidInventory::new(1, 1);
        let mut player = PlayerData::new("p").with_xp(30);
        let mut rng = StdRng::seed_from_u64(3);

        let effect = economy().use_aid(
            AidKind::Narrow,
            Some(&q),
            false,
            &mut usage,
            &mut inventory,
            &mut player,
            &mut rng,
        );

        let Some(AidEffect::Narrowed(disabled)) = effect else {
            panic!("expected narrow effect");
        };
        assert_eq!(disabled.len(), 2);
        assert_eq!(usage.disabled_answers, disabled);
        assert_eq!(player.xp, 10);
        assert_eq!(inventory.narrow, 0);
        assert!(usage.has_used(AidKind::Narrow));
    }

    #[test]
    fn test_refused_aid_changes_nothing() {
        let q = question(4, 1);
        let mut rng = StdRng::seed_from_u64(3);

        // Not enough XP.
        let mut usage = AidUsage::default();
        let mut inventory = AidInventory::new(1, 1);
        let mut player = PlayerData::new("p").with_xp(9);
        let effect = economy().use_aid(
            AidKind::Reveal,
            Some(&q),
            false,
            &mut usage,
            &mut inventory,
            &mut player,
            &mut rng,
        );
        assert_eq!(effect, None);
        assert_eq!(player.xp, 9);
        assert_eq!(inventory, AidInventory::new(1, 1));
        assert_eq!(usage, AidUsage::default());

        // None left.
        let mut inventory = AidInventory::new(0, 1);
        let mut player = PlayerData::new("p").with_xp(100);
        let effect = economy().use_aid(
            AidKind::Reveal,
            Some(&q),
            false,
            &mut usage,
            &mut inventory,
            &mut player,
            &mut rng,
        );
        assert_eq!(effect, None);
        assert_eq!(player.xp, 100);

        // Already answered.
        let mut inventory = AidInventory::new(1, 1);
        let effect = economy().use_aid(
            AidKind::Reveal,
            Some(&q),
            true,
            &mut usage,
            &mut inventory,
            &mut player,
            &mut rng,
        );
        assert_eq!(effect, None);
        assert_eq!(inventory.reveal, 1);
    }

    #[test]
    fn test_eligibility_reasons() {
        let q = question(2, 0);
        let usage = AidUsage::default();
        let inventory = AidInventory::new(1, 1);
        let player = PlayerData::new("p").with_xp(15);
        let ctx = AidContext {
            question: Some(&q),
            usage: &usage,
            inventory: &inventory,
            player: &player,
            answered: false,
        };

        assert_eq!(economy().eligibility(AidKind::Reveal, ctx), Ok(()));
        assert_eq!(
            economy().eligibility(AidKind::Narrow, ctx),
            Err(AidBlocked::NotEnoughXp {
                cost: 20,
                available: 15
            })
        );

        let rich = PlayerData::new("p").with_xp(100);
        let ctx = AidContext { player: &rich, ..ctx };
        assert_eq!(
            economy().eligibility(AidKind::Narrow, ctx),
            Err(AidBlocked::NothingToNarrow)
        );

        let ctx = AidContext { question: None, ..ctx };
        assert_eq!(
            economy().eligibility(AidKind::Reveal, ctx),
            Err(AidBlocked::NoQuestion)
        );
    }

    #[test]
    fn test_reveal_prefers_authored_hint() {
        let mut rng = StdRng::seed_from_u64(0);
        let q = question(3, 2).with_hint("look at the dates");
        assert_eq!(reveal_hint(&q, &AidUsage::default(), &mut rng), "look at the dates");

        let plain = question(3, 2);
        let hint = reveal_hint(&plain, &AidUsage::default(), &mut rng);
        assert!(hint.contains("رقم 1") || hint.contains("رقم 2"));
        assert!(!hint.contains("رقم 3"));
    }

    #[test]
    fn test_claim_adds_reward_amount() {
        let economy = AidEconomy::new(AidCosts::default(), 2);
        let mut inventory = AidInventory::default();
        economy.claim(AidKind::Reveal, &mut inventory);
        assert_eq!(inventory, AidInventory::new(2, 0));
    }

    #[test]
    fn test_labels_and_parsing() {
        assert_eq!(AidKind::Reveal.button_label(1, 25), "[ كَشْف (1) | 25 XP ]");
        assert_eq!(AidKind::parse("N"), Some(AidKind::Narrow));
        assert_eq!(AidKind::parse(" reveal "), Some(AidKind::Reveal));
        assert_eq!(AidKind::parse("x"), None);
    }
}
