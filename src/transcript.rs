//! Append-only record of resolved turns.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::agent::{ItemKind, Side};

/// One resolved turn. Immutable once appended to a match transcript.
///
/// `logic_score` and `item_used` are post-resolution values: the score
/// reflects any item adjustment, and a requested item the agent did not
/// actually hold is recorded as `NONE`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnRecord {
    /// Id of the acting agent.
    pub agent_id: String,
    /// Side of the acting agent.
    pub side: Side,
    /// Argument text, verbatim from the reasoning service.
    pub message: String,
    pub timestamp: DateTime<Utc>,
    /// Final logic score after item adjustment.
    pub logic_score: f64,
    /// The hidden judge's one-line verdict on the argument.
    pub judge_comment: String,
    /// Damage actually dealt this turn (zero unless the action was an
    /// attack with a sufficient score).
    pub damage_dealt: u32,
    /// Item consumed this turn, `NONE` if none survived validation.
    pub item_used: ItemKind,
}
