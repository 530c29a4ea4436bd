//! Determinism testing utilities.
//!
//! Provides a harness for verifying that the battle simulation
//! produces identical results given identical inputs.
//!
//! # Testing Strategy
//!
//! A seeded battle must be bit-for-bit reproducible so that replays,
//! balance runs and bug reports can be trusted. Sources of
//! non-determinism include:
//!
//! - **Floating-point math**: Different CPUs can produce different results.
//!   We use fixed-point arithmetic via [`arena_core::math::Fixed`] throughout.
//!
//! - **HashMap iteration order**: Rust's default hasher is randomized.
//!   Rulesets and personalities use ordered maps.
//!
//! - **System randomness**: Every roll draws from the injected, seeded RNG.
//!
//! - **Shared mutable state**: Each battle works on private clones; the
//!   ruleset is read-only.
//!
//! # Test Levels
//!
//! 1. **Unit tests**: Individual rolls and effects
//! 2. **Property tests**: Random combatants still produce deterministic outputs
//! 3. **Integration tests**: Full battles are reproducible
//! 4. **Parallel tests**: Running N battles on N threads all match

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::thread;

use arena_core::combatant::Entrant;
use arena_core::outcome::BattleResult;
use arena_core::replay::BattleReplay;
use arena_core::ruleset::Ruleset;
use arena_core::simulation::Simulator;

/// Result of a determinism test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeterminismResult {
    /// Whether all runs produced identical results.
    pub is_deterministic: bool,
    /// Hashes from each run.
    pub hashes: Vec<u64>,
    /// Seed the runs used.
    pub seed: u64,
}

impl DeterminismResult {
    /// Get all unique hashes (should be 1 for a deterministic battle).
    #[must_use]
    pub fn unique_hashes(&self) -> Vec<u64> {
        let mut unique: Vec<u64> = self.hashes.clone();
        unique.sort_unstable();
        unique.dedup();
        unique
    }

    /// Assert that the battle was deterministic, with a detailed error message.
    ///
    /// # Panics
    ///
    /// Panics if the battle produced different hashes across runs.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic {
            let unique = self.unique_hashes();
            panic!(
                "Battle is non-deterministic!\n\
                 Runs: {}\n\
                 Seed: {}\n\
                 Unique hashes: {} (expected 1)\n\
                 All hashes: {:?}",
                self.hashes.len(),
                self.seed,
                unique.len(),
                self.hashes
            );
        }
    }
}

/// Result of parallel battle runs.
#[derive(Debug, Clone)]
pub struct ParallelBattleResult {
    /// State hash from each battle.
    pub hashes: Vec<u64>,
    /// Seed every battle used.
    pub seed: u64,
    /// Number of battles run.
    pub num_battles: usize,
}

impl ParallelBattleResult {
    /// Check if all battles produced identical results.
    #[must_use]
    pub fn is_deterministic(&self) -> bool {
        self.hashes.windows(2).all(|w| w[0] == w[1])
    }

    /// Assert all battles matched.
    ///
    /// # Panics
    ///
    /// Panics if battles produced different hashes.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic() {
            let mut unique: Vec<u64> = self.hashes.clone();
            unique.sort_unstable();
            unique.dedup();
            panic!(
                "Parallel battles diverged!\n\
                 Battles: {}\n\
                 Seed: {}\n\
                 Unique hashes: {}\n\
                 All hashes: {:?}",
                self.num_battles,
                self.seed,
                unique.len(),
                self.hashes
            );
        }
    }
}

/// Run the same seeded battle several times and verify determinism.
///
/// # Example
///
/// ```
/// use arena_core::ruleset::Ruleset;
/// use arena_test_utils::determinism::verify_determinism;
/// use arena_test_utils::fixtures::{brawler, caster, entrant};
///
/// let result = verify_determinism(
///     &Ruleset::default(),
///     &entrant(brawler("a")),
///     &entrant(caster("b")),
///     42,
///     3,
/// );
/// result.assert_deterministic();
/// ```
#[must_use]
pub fn verify_determinism(
    ruleset: &Ruleset,
    player: &Entrant,
    opponent: &Entrant,
    seed: u64,
    runs: usize,
) -> DeterminismResult {
    let sim = Simulator::new(ruleset);
    let hashes: Vec<u64> = (0..runs)
        .map(|_| sim.run_seeded(player, opponent, seed).state_hash())
        .collect();
    let is_deterministic = hashes.windows(2).all(|w| w[0] == w[1]);

    DeterminismResult {
        is_deterministic,
        hashes,
        seed,
    }
}

/// Verify determinism for every seed in a range.
///
/// Returns the first seed whose battles diverge, if any.
#[must_use]
pub fn first_nondeterministic_seed(
    ruleset: &Ruleset,
    player: &Entrant,
    opponent: &Entrant,
    seeds: std::ops::Range<u64>,
) -> Option<u64> {
    seeds
        .into_iter()
        .find(|&seed| !verify_determinism(ruleset, player, opponent, seed, 2).is_deterministic)
}

/// Run the same seeded battle on N scoped threads and collect the hashes.
///
/// Catches non-determinism that only shows up under thread scheduling
/// variations, such as accidental shared state.
///
/// # Panics
///
/// Panics if a battle thread panics.
#[must_use]
pub fn run_parallel_battles(
    ruleset: &Ruleset,
    player: &Entrant,
    opponent: &Entrant,
    seed: u64,
    num_battles: usize,
) -> ParallelBattleResult {
    let hashes = thread::scope(|s| {
        let handles: Vec<_> = (0..num_battles)
            .map(|_| {
                s.spawn(move || {
                    Simulator::new(ruleset)
                        .run_seeded(player, opponent, seed)
                        .state_hash()
                })
            })
            .collect();

        handles
            .into_iter()
            .map(|h| match h.join() {
                Ok(hash) => hash,
                Err(_) => panic!("battle thread panicked"),
            })
            .collect()
    });

    ParallelBattleResult {
        hashes,
        seed,
        num_battles,
    }
}

/// Compare two battle logs line by line, finding the first divergence.
///
/// # Returns
///
/// `None` if the logs are identical, `Some(index)` of the first differing
/// line otherwise (a length mismatch counts at the shorter length).
#[must_use]
pub fn find_first_divergence(a: &BattleResult, b: &BattleResult) -> Option<usize> {
    let common = a.log.len().min(b.log.len());
    (0..common)
        .find(|&i| a.log[i] != b.log[i])
        .or_else(|| (a.log.len() != b.log.len()).then_some(common))
}

/// Verify that encoding a replay and decoding it reproduces the battle.
#[must_use]
pub fn verify_replay_determinism(
    ruleset: &Ruleset,
    player: &Entrant,
    opponent: &Entrant,
    seed: u64,
) -> bool {
    let (replay, _) = BattleReplay::record(ruleset, player, opponent, seed);
    replay
        .to_bytes()
        .and_then(|bytes| BattleReplay::from_bytes(&bytes))
        .and_then(|decoded| decoded.verify())
        .is_ok()
}

/// Compute a hash of any hashable value.
#[must_use]
pub fn compute_hash<T: Hash>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

/// Proptest strategies for battle testing.
///
/// These strategies generate random but reproducible inputs for
/// property-based testing of the simulator.
pub mod strategies {
    use arena_core::combatant::{ActiveStatus, Combatant, Entrant, EquippedSkill};
    use arena_core::components::{Element, StatBlock};
    use arena_core::data::DurationSpec;
    use proptest::prelude::*;

    use crate::fixtures::sample_skills;

    /// Status ids present in the standard ruleset.
    pub const STANDARD_STATUS_IDS: [&str; 8] = [
        "poison", "burn", "stun", "sleep", "weaken", "fortify", "haste", "blind",
    ];

    /// Generate any element.
    pub fn arb_element() -> impl Strategy<Value = Element> {
        proptest::sample::select(Element::ALL.to_vec())
    }

    /// Generate a list of one or two elements.
    pub fn arb_elements() -> impl Strategy<Value = Vec<Element>> {
        proptest::collection::vec(arb_element(), 1..3)
    }

    /// Generate base stats in playable ranges.
    ///
    /// Defense may be zero or negative to exercise the defense floor.
    pub fn arb_stat_block() -> impl Strategy<Value = StatBlock> {
        (20i32..300, 0i32..80, 1i32..60, -5i32..40, 1i32..30, 0i32..60).prop_map(
            |(hp, mp, attack, defense, speed, crit)| {
                StatBlock::new(hp, mp, attack, defense, speed, crit)
            },
        )
    }

    /// Generate a duration spec, including inverted ranges.
    pub fn arb_duration() -> impl Strategy<Value = DurationSpec> {
        prop_oneof![
            (0u32..6).prop_map(DurationSpec::Turns),
            (0u32..5, 0u32..5).prop_map(|(min, max)| DurationSpec::Range { min, max }),
            Just(DurationSpec::Persistent),
        ]
    }

    /// Generate an active status from the standard catalog.
    pub fn arb_active_status() -> impl Strategy<Value = ActiveStatus> {
        (proptest::sample::select(STANDARD_STATUS_IDS.to_vec()), 1u32..5).prop_map(
            |(id, remaining)| ActiveStatus {
                id: id.to_string(),
                name: id.to_string(),
                remaining,
            },
        )
    }

    /// Generate a subset of the fixture skills, each at level 1-5.
    pub fn arb_equipped_skills() -> impl Strategy<Value = Vec<EquippedSkill>> {
        let catalog = sample_skills();
        let len = catalog.len();
        proptest::collection::vec((0..len, 1u32..6), 0..4).prop_map(move |picks| {
            picks
                .into_iter()
                .map(|(i, level)| EquippedSkill::new(catalog[i].clone()).at_level(level))
                .collect()
        })
    }

    /// Generate a combatant with random stats, skills and statuses.
    pub fn arb_combatant(id: &'static str) -> impl Strategy<Value = Combatant> {
        (
            arb_stat_block(),
            arb_elements(),
            arb_equipped_skills(),
            proptest::collection::vec(arb_active_status(), 0..3),
        )
            .prop_map(move |(base, elements, skills, mut statuses)| {
                statuses.sort_by(|a, b| a.id.cmp(&b.id));
                statuses.dedup_by(|a, b| a.id == b.id);
                let mut c = Combatant::new(id, id.to_uppercase(), base).with_elements(&elements);
                c.skills = skills;
                c.statuses = statuses;
                c
            })
    }

    /// Generate an entrant with no owner title.
    pub fn arb_entrant(id: &'static str) -> impl Strategy<Value = Entrant> {
        arb_combatant(id).prop_map(Entrant::new)
    }

    /// Generate a battle seed.
    pub fn arb_seed() -> impl Strategy<Value = u64> {
        any::<u64>()
    }
}
