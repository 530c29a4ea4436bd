//! Battle log assembly and the sentinel micro-format.
//!
//! The log is a flat list of lines. Narrative lines are free text; lines
//! starting with [`SENTINEL_PREFIX`] are machine-readable and consumed by
//! presentation layers:
//!
//! ```text
//! --- Turn 3 ---
//! @@PlayerHP:84/120
//! @@PlayerMP:12/40
//! @@PlayerCondition:poison,haste
//! @@OpponentHP:0/95
//! @@OpponentMP:40/40
//! @@OpponentCondition:none
//! ...
//! @@BattleEnd:m-001
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::combatant::Combatant;

/// Prefix marking machine-readable lines.
pub const SENTINEL_PREFIX: &str = "@@";

/// The closing sentinel naming the winner id, or the draw marker.
#[must_use]
pub fn battle_end_line(winner: &str) -> String {
    format!("{SENTINEL_PREFIX}BattleEnd:{winner}")
}

/// Which side of the battle a combatant is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    /// The challenging side. Processed first on ties.
    Player,
    /// The defending side.
    Opponent,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Player => write!(f, "Player"),
            Side::Opponent => write!(f, "Opponent"),
        }
    }
}

impl Side {
    fn parse_prefix(s: &str) -> Option<(Self, &str)> {
        if let Some(rest) = s.strip_prefix("Player") {
            Some((Side::Player, rest))
        } else {
            s.strip_prefix("Opponent").map(|rest| (Side::Opponent, rest))
        }
    }
}

/// A parsed sentinel line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sentinel {
    /// `@@<Side>HP:cur/max`
    Hp {
        /// Side.
        side: Side,
        /// Current hp.
        current: i32,
        /// Max hp.
        max: i32,
    },
    /// `@@<Side>MP:cur/max`
    Mp {
        /// Side.
        side: Side,
        /// Current mp.
        current: i32,
        /// Max mp.
        max: i32,
    },
    /// `@@<Side>Condition:ids|none`
    Condition {
        /// Side.
        side: Side,
        /// Active status ids; empty for `none`.
        statuses: Vec<String>,
    },
    /// `@@BattleEnd:<winner id|draw>`
    BattleEnd {
        /// Winner id or the draw sentinel.
        winner: String,
    },
}

fn parse_pair(value: &str) -> Option<(i32, i32)> {
    let (current, max) = value.split_once('/')?;
    Some((current.parse().ok()?, max.parse().ok()?))
}

/// Parse a sentinel line. Returns `None` for narrative lines and malformed sentinels.
#[must_use]
pub fn parse_sentinel(line: &str) -> Option<Sentinel> {
    let body = line.strip_prefix(SENTINEL_PREFIX)?;
    let (key, value) = body.split_once(':')?;

    if key == "BattleEnd" {
        return Some(Sentinel::BattleEnd {
            winner: value.to_string(),
        });
    }

    let (side, quantity) = Side::parse_prefix(key)?;
    match quantity {
        "HP" => parse_pair(value).map(|(current, max)| Sentinel::Hp { side, current, max }),
        "MP" => parse_pair(value).map(|(current, max)| Sentinel::Mp { side, current, max }),
        "Condition" => {
            let statuses = if value == "none" {
                Vec::new()
            } else {
                value.split(',').map(str::to_string).collect()
            };
            Some(Sentinel::Condition { side, statuses })
        }
        _ => None,
    }
}

/// Append-only battle log.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattleLog {
    lines: Vec<String>,
}

impl BattleLog {
    /// Create an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a narrative line.
    pub fn push(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }

    /// Append several narrative lines.
    pub fn extend(&mut self, lines: impl IntoIterator<Item = String>) {
        self.lines.extend(lines);
    }

    /// Append a turn header.
    pub fn turn_header(&mut self, turn: u32) {
        self.lines.push(format!("--- Turn {turn} ---"));
    }

    /// Append the three sentinel lines for one side.
    pub fn snapshot(&mut self, side: Side, combatant: &Combatant, max_hp: i32, max_mp: i32) {
        self.lines.push(format!(
            "{SENTINEL_PREFIX}{side}HP:{}/{max_hp}",
            combatant.hp()
        ));
        self.lines.push(format!(
            "{SENTINEL_PREFIX}{side}MP:{}/{max_mp}",
            combatant.mp()
        ));
        self.lines.push(format!(
            "{SENTINEL_PREFIX}{side}Condition:{}",
            combatant.condition()
        ));
    }

    /// Append the closing marker.
    pub fn close(&mut self, winner: &str) {
        self.lines.push(battle_end_line(winner));
    }

    /// Lines so far.
    #[must_use]
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Number of lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Whether nothing has been logged.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Consume the log.
    #[must_use]
    pub fn into_lines(self) -> Vec<String> {
        self.lines
    }
}
