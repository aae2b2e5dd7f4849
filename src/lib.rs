//! Turn-based AI debate battles.
//!
//! Two LLM-controlled personas argue a user-supplied topic in a 2D
//! arena. Each turn, an external reasoning call produces the argument
//! text, a physical action, an emotion, an optional item request, and a
//! 0–100 logic score; the engine layers deterministic combat rules on
//! top — item validation and effects, the score→damage formula, HP
//! clamping, and win detection — and appends the outcome to an
//! append-only transcript.
//!
//! # Layout
//!
//! - [`agent`]: the combatant data model (sides, actions, items, HP).
//! - [`battle`]: the turn-resolution state machine — match phases,
//!   deterministic rules, and the async driver engine.
//! - [`reasoner`]: collaborator contracts plus the Gemini-backed
//!   implementation.
//! - [`topics`]: languages and built-in topic pools.
//! - [`transcript`]: immutable per-turn records.
//!
//! # Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use debate_arena::{BattleEngine, EngineConfig, GeminiReasoner};
//!
//! # async fn demo() -> anyhow::Result<()> {
//! let gemini = Arc::new(GeminiReasoner::from_env()?);
//! let engine = BattleEngine::spawn(gemini.clone(), gemini, EngineConfig::default());
//! engine.start("Cats are better pets than dogs.").await?;
//!
//! let mut snapshots = engine.subscribe();
//! while snapshots.changed().await.is_ok() {
//!     let state = snapshots.borrow().clone();
//!     println!("{} turns, phase {}", state.transcript.len(), state.phase);
//! }
//! # Ok(())
//! # }
//! ```

pub mod agent;
pub mod battle;
pub mod reasoner;
pub mod topics;
pub mod transcript;

// Re-export the combatant model
pub use agent::{starting_roster, ActionKind, AgentState, Emotion, ItemKind, Side, MAX_HP};

// Re-export the engine and state machine
pub use battle::engine::{BattleEngine, EngineConfig, EngineError};
pub use battle::rules::{resolve_turn, score_damage, Resolution};
pub use battle::state::{MatchPhase, MatchState, PhaseTransition, TransitionError};

// Re-export collaborator contracts
pub use reasoner::gemini::GeminiReasoner;
pub use reasoner::{
    fallback_turn, MatchSummarizer, ReasonerError, SummaryRequest, TurnReasoner, TurnRequest,
    TurnResponse, SUMMARY_FALLBACK,
};

// Re-export language and topic helpers
pub use topics::{random_topic, topic_pool, Language};
pub use transcript::TurnRecord;
