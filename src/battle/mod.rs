//! Battle orchestration — the turn-resolution state machine.
//!
//! # Match flow
//!
//! ```text
//! Idle ──start──▶ Running ──────▶ AwaitingReasoning
//!   ▲               │  ▲                │
//!   │               │  └────────────────┘
//!   │               │   (turn resolved, index++)
//!   │               │
//!   │    pre-turn KO check / stop
//!   │               │
//!   │               ▼
//!   └──reset── Finished ◀── stop while a call is in flight
//! ```
//!
//! The engine is a single driver task that owns the match state and
//! advances it one turn at a time. At most one reasoning call is ever
//! in flight; stop and reset discard an in-flight response unapplied.

pub mod engine;
pub mod rules;
pub mod state;

pub use engine::{BattleEngine, EngineConfig, EngineError};
pub use rules::{resolve_turn, score_damage, Resolution};
pub use state::{MatchPhase, MatchState, PhaseTransition, TransitionError};
