//! Match state machine — phases, guarded transitions, and the owned
//! match state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::agent::{starting_roster, AgentState, Side};
use crate::topics::Language;
use crate::transcript::TurnRecord;

/// Phase of a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchPhase {
    /// No active match.
    Idle,
    /// Turns are being taken.
    Running,
    /// Exactly one reasoning call is in flight.
    AwaitingReasoning,
    /// Winner decided or the match was stopped.
    Finished,
}

impl MatchPhase {
    /// Whether a match is actively being played in this phase.
    pub fn is_live(self) -> bool {
        matches!(self, Self::Running | Self::AwaitingReasoning)
    }

    /// Valid transitions out of this phase.
    pub fn valid_transitions(self) -> &'static [MatchPhase] {
        match self {
            Self::Idle => &[Self::Running],
            Self::Running => &[Self::AwaitingReasoning, Self::Finished, Self::Idle],
            Self::AwaitingReasoning => &[Self::Running, Self::Finished, Self::Idle],
            Self::Finished => &[Self::Idle],
        }
    }
}

impl std::fmt::Display for MatchPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Running => write!(f, "running"),
            Self::AwaitingReasoning => write!(f, "awaiting_reasoning"),
            Self::Finished => write!(f, "finished"),
        }
    }
}

/// A recorded phase transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseTransition {
    pub from: MatchPhase,
    pub to: MatchPhase,
    pub timestamp: DateTime<Utc>,
    /// Why the transition happened.
    pub reason: String,
}

/// Error for transitions the phase table does not allow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("invalid phase transition {from} → {to}")]
pub struct TransitionError {
    pub from: MatchPhase,
    pub to: MatchPhase,
}

/// Complete state of one match, owned by the engine driver and handed
/// to observers only as cloned snapshots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchState {
    pub id: Uuid,
    pub topic: String,
    pub language: Language,
    pub phase: MatchPhase,
    /// Fixed order: proponent first, opponent second.
    pub agents: [AgentState; 2],
    /// Side that takes turn zero, chosen at random on start.
    pub opening_side: Side,
    /// Completed turns so far. Always equals `transcript.len()`.
    pub turn_index: u32,
    pub transcript: Vec<TurnRecord>,
    pub winner: Option<Side>,
    /// Post-match analysis, filled in asynchronously after `Finished`.
    pub summary: Option<String>,
    pub transitions: Vec<PhaseTransition>,
    pub created_at: DateTime<Utc>,
}

impl MatchState {
    /// A fresh match for `topic`, still in `Idle` until started.
    pub fn new(topic: &str, language: Language, opening_side: Side) -> Self {
        Self {
            id: Uuid::new_v4(),
            topic: topic.to_string(),
            language,
            phase: MatchPhase::Idle,
            agents: starting_roster(),
            opening_side,
            turn_index: 0,
            transcript: Vec::new(),
            winner: None,
            summary: None,
            transitions: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// The empty state published while no match exists.
    pub fn idle(language: Language) -> Self {
        Self::new("", language, Side::Pro)
    }

    /// Transition to a new phase, recording the edge with its reason.
    pub fn transition(&mut self, to: MatchPhase, reason: &str) -> Result<(), TransitionError> {
        if !self.phase.valid_transitions().contains(&to) {
            return Err(TransitionError {
                from: self.phase,
                to,
            });
        }
        self.transitions.push(PhaseTransition {
            from: self.phase,
            to,
            timestamp: Utc::now(),
            reason: reason.to_string(),
        });
        self.phase = to;
        Ok(())
    }

    /// Index into `agents` of the side due to act this turn.
    pub fn active_index(&self) -> usize {
        let offset = match self.opening_side {
            Side::Pro => 0,
            Side::Con => 1,
        };
        (offset + self.turn_index as usize) % 2
    }

    /// The agent due to act this turn.
    pub fn active(&self) -> &AgentState {
        &self.agents[self.active_index()]
    }

    /// The agent being argued against this turn.
    pub fn opponent(&self) -> &AgentState {
        &self.agents[1 - self.active_index()]
    }

    /// Mutable access to (active, opponent) simultaneously.
    pub fn active_pair_mut(&mut self) -> (&mut AgentState, &mut AgentState) {
        let (first, second) = self.agents.split_at_mut(1);
        if self.active_index() == 0 {
            (&mut first[0], &mut second[0])
        } else {
            (&mut second[0], &mut first[0])
        }
    }

    /// Append a resolved turn and advance the turn counter. The two
    /// always move together so `turn_index == transcript.len()`.
    pub fn record_turn(&mut self, record: TurnRecord) {
        self.transcript.push(record);
        self.turn_index += 1;
    }
}
