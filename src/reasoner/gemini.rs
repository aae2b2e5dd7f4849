//! Gemini-backed reasoning and summary collaborators.
//!
//! One client implements both traits: per-turn generation is forced
//! into JSON via a response schema so the reply parses straight into
//! [`TurnResponse`]; the post-match summary is freeform markdown.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;
use tracing::debug;

use super::{
    MatchSummarizer, ReasonerError, SummaryRequest, TurnReasoner, TurnRequest, TurnResponse,
};
use crate::agent::Side;
use crate::topics::Language;
use crate::transcript::TurnRecord;

/// Environment variable holding the API key.
pub const API_KEY_VAR: &str = "GEMINI_API_KEY";

/// Default generation model.
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

pub struct GeminiReasoner {
    api_key: String,
    model: String,
    client: reqwest::Client,
}

impl GeminiReasoner {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(120))
                .build()
                .expect("Failed to create HTTP client"),
        }
    }

    /// Build a client from [`API_KEY_VAR`].
    pub fn from_env() -> Result<Self, ReasonerError> {
        let api_key =
            std::env::var(API_KEY_VAR).map_err(|_| ReasonerError::MissingApiKey(API_KEY_VAR))?;
        Ok(Self::new(api_key))
    }

    /// Override the generation model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    async fn generate(&self, body: serde_json::Value) -> Result<String, ReasonerError> {
        let url = format!(
            "https://generativelanguage.googleapis.com/v1beta/models/{}:generateContent?key={}",
            self.model, self.api_key
        );

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| ReasonerError::RequestFailed(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ReasonerError::RequestFailed(format!(
                "Gemini API error ({}): {}",
                status, body
            )));
        }

        let resp_json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| ReasonerError::ParseError(e.to_string()))?;

        let text = resp_json["candidates"][0]["content"]["parts"][0]["text"]
            .as_str()
            .unwrap_or("");
        if text.is_empty() {
            return Err(ReasonerError::EmptyResponse);
        }
        Ok(text.to_string())
    }
}

#[async_trait]
impl TurnReasoner for GeminiReasoner {
    async fn take_turn(&self, request: &TurnRequest) -> Result<TurnResponse, ReasonerError> {
        let body = json!({
            "systemInstruction": {
                "parts": [{ "text": turn_instruction(request) }]
            },
            "contents": [{
                "role": "user",
                "parts": [{
                    "text": "Your turn. Make your argument, choose action, and Judge yourself honestly."
                }]
            }],
            "generationConfig": {
                "temperature": 0.9,
                "responseMimeType": "application/json",
                "responseSchema": turn_response_schema()
            }
        });

        let text = self.generate(body).await?;
        debug!(agent = %request.agent.id, "turn response received");
        serde_json::from_str(&text).map_err(|e| ReasonerError::ParseError(e.to_string()))
    }
}

#[async_trait]
impl MatchSummarizer for GeminiReasoner {
    async fn summarize(&self, request: &SummaryRequest) -> Result<String, ReasonerError> {
        let body = json!({
            "contents": [{
                "role": "user",
                "parts": [{ "text": summary_prompt(request) }]
            }]
        });
        self.generate(body).await
    }
}

/// JSON schema the model response must conform to, mirroring
/// [`TurnResponse`].
fn turn_response_schema() -> serde_json::Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "message": {
                "type": "STRING",
                "description": "The argument or counter-argument text. Keep it concise (under 30 words)."
            },
            "action": {
                "type": "STRING",
                "enum": ["idle", "move", "attack", "defend"],
                "description": "Physical action. ATTACK if argument is strong (damage dealt). MOVE to pace around."
            },
            "targetX": {
                "type": "NUMBER",
                "description": "Target X coordinate (0-100). Keep distance dynamic."
            },
            "targetY": {
                "type": "NUMBER",
                "description": "Target Y coordinate (0-100)."
            },
            "emotion": {
                "type": "STRING",
                "enum": ["neutral", "angry", "confident", "confused", "happy", "triumphant"],
                "description": "Emotional state."
            },
            "itemUsed": {
                "type": "STRING",
                "enum": ["HEAL_MODULE", "LOGIC_AMPLIFIER", "FACT_CHECKER", "NONE"],
                "description": "Item to use from inventory. HEAL_MODULE restores HP. LOGIC_AMPLIFIER boosts this turn's damage. FACT_CHECKER ensures a high logic score."
            },
            "logicScore": {
                "type": "NUMBER",
                "description": "0-100 Score representing the logical strength of this argument. 0-40: Fallacy/Weak. 41-70: Sound. 71-100: Irrefutable/Fact-based."
            },
            "judgeComment": {
                "type": "STRING",
                "description": "A short verdict from the Hidden Judge about why this score was given."
            }
        },
        "required": ["message", "action", "emotion", "itemUsed", "logicScore", "judgeComment"]
    })
}

fn language_rule(language: Language) -> &'static str {
    match language {
        Language::Ko => "YOU MUST SPEAK IN KOREAN ONLY.",
        Language::En => "YOU MUST SPEAK IN ENGLISH ONLY.",
    }
}

/// Render the transcript from the acting agent's point of view.
fn history_lines(transcript: &[TurnRecord], agent_id: &str) -> String {
    transcript
        .iter()
        .map(|turn| {
            let speaker = if turn.agent_id == agent_id {
                "ME"
            } else {
                "OPPONENT"
            };
            format!("{} [Logic:{:.0}]: {}", speaker, turn.logic_score, turn.message)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn turn_instruction(request: &TurnRequest) -> String {
    let role = match request.agent.side {
        Side::Pro => "PROPONENT (Argue FOR)",
        Side::Con => "OPPONENT (Argue AGAINST)",
    };
    let inventory = request
        .agent
        .inventory
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        r#"You are controlling an AI agent in a 2D physical debate arena (fighting game style).

**LANGUAGE RULE**:
{language_rule}
The topic is: "{topic}".

Role: {role}.
Name: {name}.
HP: {hp} (Max 100).
Inventory: {inventory}.

**THE HIDDEN JUDGE MECHANIC**:
You must also act as an impartial Hidden Judge.
- If the argument is a logical fallacy, ad hominem, or weak: assign a LOW logicScore (0-40).
- If the argument is sound and relevant: assign a MEDIUM logicScore (41-75).
- If the argument is a brilliant counter, uses facts, or exposes a contradiction: assign a HIGH logicScore (76-100).
- DAMAGE IS CALCULATED BASED ON LOGIC SCORE. Weak arguments do 0 damage.

**MOVEMENT & ACTION**:
- Act like a fighting game character.
- If your logic is strong, choose 'attack' to lunge at the opponent.
- If you are losing, 'defend' or 'move' away.
- Don't just stand still. Move x/y coordinates to simulate pacing or dodging.

**ITEMS**:
- Use 'HEAL_MODULE' if HP < 40 to recover health.
- Use 'LOGIC_AMPLIFIER' if you are about to deliver a crushing argument (boosts damage).
- Use 'FACT_CHECKER' to guarantee a logicScore > 80 (simulated).
- ONLY use an item if you have it in your Inventory. Otherwise use 'NONE'.

Context:
{history}"#,
        language_rule = language_rule(request.language),
        topic = request.topic,
        role = role,
        name = request.agent.name,
        hp = request.agent.hp,
        inventory = inventory,
        history = history_lines(&request.transcript, &request.agent.id),
    )
}

fn summary_prompt(request: &SummaryRequest) -> String {
    let transcript = request
        .transcript
        .iter()
        .map(|turn| format!("{}: {}", turn.agent_id, turn.message))
        .collect::<Vec<_>>()
        .join("\n");
    let language_rule = match request.language {
        Language::Ko => "Write the summary in KOREAN.",
        Language::En => "Write the summary in ENGLISH.",
    };

    format!(
        r#"Analyze this debate transcript on the topic: "{topic}".
{language_rule}

Transcript:
{transcript}

Please provide a structured summary in Markdown format:
1. **Winner**: Declare who won based on logical consistency.
2. **Key Arguments**: Bullet points of the best points made.
3. **Critical Failures**: Point out any major logical fallacies used.
4. **Conclusion**: A brief wrap-up of the discussion."#,
        topic = request.topic,
        language_rule = language_rule,
        transcript = transcript,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::{starting_roster, ItemKind};
    use chrono::Utc;

    fn sample_request() -> TurnRequest {
        let [agent, opponent] = starting_roster();
        TurnRequest {
            agent,
            opponent,
            topic: "Cats are better pets than dogs.".to_string(),
            transcript: vec![TurnRecord {
                agent_id: "agent-con".to_string(),
                side: Side::Con,
                message: "Dogs are loyal.".to_string(),
                timestamp: Utc::now(),
                logic_score: 55.0,
                judge_comment: "Sound".to_string(),
                damage_dealt: 11,
                item_used: ItemKind::None,
            }],
            language: Language::En,
        }
    }

    #[test]
    fn test_schema_lists_required_fields() {
        let schema = turn_response_schema();
        let required = schema["required"].as_array().unwrap();
        for field in ["message", "action", "emotion", "itemUsed", "logicScore", "judgeComment"] {
            assert!(required.iter().any(|v| v == field), "missing {field}");
        }
        // Position targets are optional.
        assert!(!required.iter().any(|v| v == "targetX"));
    }

    #[test]
    fn test_turn_instruction_includes_match_context() {
        let instruction = turn_instruction(&sample_request());
        assert!(instruction.contains("Cats are better pets than dogs."));
        assert!(instruction.contains("PROPONENT (Argue FOR)"));
        assert!(instruction.contains("YOU MUST SPEAK IN ENGLISH ONLY."));
        assert!(instruction.contains("HEAL_MODULE, LOGIC_AMPLIFIER, FACT_CHECKER"));
        assert!(instruction.contains("HP: 100"));
    }

    #[test]
    fn test_history_is_rendered_from_the_actors_viewpoint() {
        let request = sample_request();
        let instruction = turn_instruction(&request);
        assert!(instruction.contains("OPPONENT [Logic:55]: Dogs are loyal."));

        let flipped = history_lines(&request.transcript, "agent-con");
        assert!(flipped.contains("ME [Logic:55]: Dogs are loyal."));
    }

    #[test]
    fn test_summary_prompt_structure() {
        let request = SummaryRequest {
            topic: "Remote work is better than office work.".to_string(),
            transcript: sample_request().transcript,
            language: Language::Ko,
        };
        let prompt = summary_prompt(&request);
        assert!(prompt.contains("Remote work is better than office work."));
        assert!(prompt.contains("Write the summary in KOREAN."));
        assert!(prompt.contains("**Winner**"));
        assert!(prompt.contains("agent-con: Dogs are loyal."));
    }

    #[test]
    fn test_missing_api_key_error_names_the_variable() {
        let err = ReasonerError::MissingApiKey(API_KEY_VAR);
        assert!(err.to_string().contains("GEMINI_API_KEY"));
    }
}
