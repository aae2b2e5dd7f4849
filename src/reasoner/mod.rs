//! Collaborator contracts — the external reasoning service that writes
//! each argument and the summarizer that analyzes a finished match.
//!
//! The engine treats both as opaque async calls. A reasoning failure is
//! recovered locally with [`fallback_turn`]; a summary failure with
//! [`SUMMARY_FALLBACK`]. Neither is fatal to a match.

pub mod gemini;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::agent::{ActionKind, AgentState, Emotion, ItemKind};
use crate::topics::Language;
use crate::transcript::TurnRecord;

/// Errors from collaborator calls.
#[derive(Debug, Error)]
pub enum ReasonerError {
    #[error("API request failed: {0}")]
    RequestFailed(String),

    #[error("API key not configured: set {0}")]
    MissingApiKey(&'static str),

    #[error("response parse error: {0}")]
    ParseError(String),

    #[error("empty response from model")]
    EmptyResponse,
}

/// Everything the reasoning service sees for one turn.
#[derive(Debug, Clone, Serialize)]
pub struct TurnRequest {
    /// The agent whose turn it is.
    pub agent: AgentState,
    /// Snapshot of the agent being argued against.
    pub opponent: AgentState,
    pub topic: String,
    /// All turns resolved so far.
    pub transcript: Vec<TurnRecord>,
    pub language: Language,
}

/// One turn's decision, exactly as produced by the reasoning service.
///
/// Field casing matches the JSON contract of the model response schema.
/// The engine performs no semantic validation of the text fields; the
/// item request is validated against the inventory during resolution,
/// and target coordinates are clamped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnResponse {
    /// Argument or counter-argument text.
    pub message: String,
    pub action: ActionKind,
    #[serde(default)]
    pub target_x: Option<f64>,
    #[serde(default)]
    pub target_y: Option<f64>,
    pub emotion: Emotion,
    pub item_used: ItemKind,
    /// 0–100 rating of argument quality; the sole driver of damage.
    pub logic_score: f64,
    /// The hidden judge's reason for the score.
    pub judge_comment: String,
}

/// Input to the post-match summary call.
#[derive(Debug, Clone, Serialize)]
pub struct SummaryRequest {
    pub topic: String,
    pub transcript: Vec<TurnRecord>,
    pub language: Language,
}

/// Produces one turn's argument, action, and score.
#[async_trait]
pub trait TurnReasoner: Send + Sync {
    async fn take_turn(&self, request: &TurnRequest) -> Result<TurnResponse, ReasonerError>;
}

/// Produces a freeform post-match analysis of the transcript.
#[async_trait]
pub trait MatchSummarizer: Send + Sync {
    async fn summarize(&self, request: &SummaryRequest) -> Result<String, ReasonerError>;
}

/// Shown in place of an analysis when the summarizer fails.
pub const SUMMARY_FALLBACK: &str = "Summary generation failed.";

/// Neutral filler turn substituted when the reasoner fails: no item,
/// a low fixed score, zero damage. The match continues.
pub fn fallback_turn() -> TurnResponse {
    TurnResponse {
        message: "Processing error...".to_string(),
        action: ActionKind::Idle,
        target_x: None,
        target_y: None,
        emotion: Emotion::Confused,
        item_used: ItemKind::None,
        logic_score: 10.0,
        judge_comment: "System Error".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_turn_response_wire_parse() {
        let json = r#"{
            "message": "Pineapple violates the structural integrity of the pie.",
            "action": "attack",
            "targetX": 55,
            "targetY": 45,
            "emotion": "triumphant",
            "itemUsed": "LOGIC_AMPLIFIER",
            "logicScore": 88,
            "judgeComment": "Vivid but grounded in culinary fact."
        }"#;
        let parsed: TurnResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.action, ActionKind::Attack);
        assert_eq!(parsed.item_used, ItemKind::LogicAmplifier);
        assert_eq!(parsed.emotion, Emotion::Triumphant);
        assert_eq!(parsed.logic_score, 88.0);
        assert_eq!(parsed.target_x, Some(55.0));
    }

    #[test]
    fn test_turn_response_targets_are_optional() {
        let json = r#"{
            "message": "I rest my case.",
            "action": "idle",
            "emotion": "confident",
            "itemUsed": "NONE",
            "logicScore": 42.5,
            "judgeComment": "Sound."
        }"#;
        let parsed: TurnResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.target_x, None);
        assert_eq!(parsed.target_y, None);
    }

    #[test]
    fn test_turn_response_serializes_camel_case() {
        let json = serde_json::to_string(&fallback_turn()).unwrap();
        assert!(json.contains("\"itemUsed\""));
        assert!(json.contains("\"logicScore\""));
        assert!(json.contains("\"judgeComment\""));
    }

    #[test]
    fn test_fallback_turn_is_harmless() {
        let turn = fallback_turn();
        assert_eq!(turn.action, ActionKind::Idle);
        assert_eq!(turn.item_used, ItemKind::None);
        assert!(turn.logic_score <= 45.0);
        assert_eq!(turn.message, "Processing error...");
        assert_eq!(turn.judge_comment, "System Error");
    }
}
