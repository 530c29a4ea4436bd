//! Effective stat aggregation.
//!
//! Effective stats are recomputed from scratch whenever they are needed,
//! because modifiers and statuses change from turn to turn:
//!
//! ```text
//! stat = base + cultivation + title bonus + temporary modifier + Σ status deltas
//! ```
//!
//! Per-turn hp/mp drains on statuses are not stat deltas; the status
//! processor owns those.

use serde::{Deserialize, Serialize};

use crate::combatant::{Combatant, OwnerContext};
use crate::components::{ModStat, StatDeltas};
use crate::ruleset::Ruleset;

/// A combatant's stats at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct EffectiveStats {
    /// Current hp.
    pub hp: i32,
    /// Current mp.
    pub mp: i32,
    /// Maximum hp.
    pub max_hp: i32,
    /// Maximum mp.
    pub max_mp: i32,
    /// Attack.
    pub attack: i32,
    /// Defense. May be zero or negative; damage math floors it at 1.
    pub defense: i32,
    /// Speed.
    pub speed: i32,
    /// Crit chance in percent, capped by the ruleset.
    pub crit: i32,
    /// Accuracy bonus in percent points.
    pub accuracy: i32,
    /// Evasion bonus in percent points.
    pub evasion: i32,
}

/// Sum of stat deltas from every active status with a known template.
#[must_use]
pub fn status_deltas(combatant: &Combatant, ruleset: &Ruleset) -> StatDeltas {
    let mut total = StatDeltas::default();
    for active in &combatant.statuses {
        if let Some(template) = ruleset.status(&active.id) {
            for stat in [
                ModStat::Attack,
                ModStat::Defense,
                ModStat::Speed,
                ModStat::Crit,
                ModStat::Accuracy,
                ModStat::Evasion,
            ] {
                total.accumulate(stat, template.stat_deltas.get(stat));
            }
        }
    }
    total
}

/// Maximum hp and mp, which do not depend on modifiers or statuses.
#[must_use]
pub fn max_pools(combatant: &Combatant, owner: &OwnerContext) -> (i32, i32) {
    let permanent = combatant.base + combatant.cultivation + owner.title_bonus();
    (permanent.hp.max(0), permanent.mp.max(0))
}

/// Compute effective stats for the current instant. Pure.
#[must_use]
pub fn effective_stats(combatant: &Combatant, owner: &OwnerContext, ruleset: &Ruleset) -> EffectiveStats {
    let permanent = combatant.base + combatant.cultivation + owner.title_bonus();
    let temp = combatant.modifiers;
    let status = status_deltas(combatant, ruleset);
    let (max_hp, max_mp) = max_pools(combatant, owner);

    let fold = |base: i32, stat: ModStat| {
        base.saturating_add(temp.get(stat))
            .saturating_add(status.get(stat))
    };

    EffectiveStats {
        hp: combatant.hp().clamp(0, max_hp),
        mp: combatant.mp().clamp(0, max_mp),
        max_hp,
        max_mp,
        attack: fold(permanent.attack, ModStat::Attack),
        defense: fold(permanent.defense, ModStat::Defense),
        speed: fold(permanent.speed, ModStat::Speed),
        crit: fold(permanent.crit, ModStat::Crit).min(ruleset.tunables().crit_cap),
        accuracy: fold(0, ModStat::Accuracy),
        evasion: fold(0, ModStat::Evasion),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combatant::{ActiveStatus, TitleBuff};
    use crate::components::StatBlock;

    fn poisoned_fighter() -> Combatant {
        let mut c = Combatant::new("f", "Fighter", StatBlock::new(100, 20, 20, 10, 10, 45));
        c.cultivation = StatBlock::new(10, 5, 2, 1, 0, 10);
        c.modifiers.accumulate(ModStat::Attack, 3);
        c.modifiers.accumulate(ModStat::Evasion, 5);
        c.current_hp = Some(80);
        c.current_mp = Some(25);
        c.statuses.push(ActiveStatus {
            id: "burn".to_string(),
            name: "Burned".to_string(),
            remaining: 2,
        });
        c
    }

    #[test]
    fn test_all_sources_fold_in() {
        let ruleset = Ruleset::default();
        let owner = OwnerContext {
            owner_id: "p".to_string(),
            title: Some(TitleBuff {
                name: "Brawler".to_string(),
                bonus: StatBlock::new(0, 0, 4, 0, 1, 0),
            }),
        };
        let stats = effective_stats(&poisoned_fighter(), &owner, &ruleset);

        assert_eq!(stats.max_hp, 110);
        assert_eq!(stats.max_mp, 25);
        assert_eq!(stats.hp, 80);
        // 20 base + 2 cultivation + 4 title + 3 modifier - 3 burn
        assert_eq!(stats.attack, 26);
        assert_eq!(stats.defense, 11);
        assert_eq!(stats.speed, 11);
        assert_eq!(stats.evasion, 5);
        assert_eq!(stats.accuracy, 0);
    }

    #[test]
    fn test_crit_is_capped() {
        let ruleset = Ruleset::default();
        let stats = effective_stats(&poisoned_fighter(), &OwnerContext::default(), &ruleset);
        // 45 + 10 = 55, capped at 50
        assert_eq!(stats.crit, 50);
    }

    #[test]
    fn test_unknown_status_contributes_nothing() {
        let ruleset = Ruleset::default();
        let mut c = Combatant::new("x", "X", StatBlock::new(50, 0, 10, 10, 10, 0));
        c.statuses.push(ActiveStatus {
            id: "mystery".to_string(),
            name: "Mystery".to_string(),
            remaining: 3,
        });
        assert!(status_deltas(&c, &ruleset).is_zero());
    }

    #[test]
    fn test_hp_clamped_to_max() {
        let ruleset = Ruleset::default();
        let c = Combatant::new("x", "X", StatBlock::new(50, 0, 10, 10, 10, 0)).with_hp(80);
        let stats = effective_stats(&c, &OwnerContext::default(), &ruleset);
        assert_eq!(stats.hp, 50);
    }
}
