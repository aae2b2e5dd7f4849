//! The turn engine — a driver task that owns the match state and
//! advances it one turn at a time.
//!
//! Control commands (start/stop/reset/language) arrive on a channel and
//! are answered with a result; observers read the state through cloned
//! `watch` snapshots. The driver services commands even while a pacing
//! delay or reasoning call is pending, but never has more than one
//! reasoning call in flight: the single future is pinned and polled
//! until it resolves or the match is torn down around it, in which case
//! the response is dropped unapplied.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::agent::Side;
use crate::battle::rules;
use crate::battle::state::{MatchPhase, MatchState};
use crate::reasoner::{
    self, MatchSummarizer, SummaryRequest, TurnReasoner, TurnRequest,
};
use crate::topics::{self, Language};
use crate::transcript::TurnRecord;

/// Errors surfaced to callers of the engine controls.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("a match is already in progress")]
    MatchInProgress,

    #[error("no match is running")]
    NoActiveMatch,

    #[error("topic must not be empty")]
    EmptyTopic,

    #[error("engine driver has shut down")]
    Closed,
}

/// Engine tunables.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Cosmetic pacing delay before each reasoning call. Zero skips
    /// the delay entirely.
    pub turn_delay: Duration,
    /// Language both agents argue in.
    pub language: Language,
    /// Seed for the opening coin flip; `None` draws from entropy.
    pub seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            turn_delay: Duration::from_millis(2500),
            language: Language::Ko,
            seed: None,
        }
    }
}

enum Command {
    Start {
        topic: String,
        reply: oneshot::Sender<Result<(), EngineError>>,
    },
    Stop {
        reply: oneshot::Sender<Result<(), EngineError>>,
    },
    Reset {
        reply: oneshot::Sender<Result<(), EngineError>>,
    },
    SetLanguage {
        language: Language,
        reply: oneshot::Sender<Result<(), EngineError>>,
    },
    /// Completion of a detached summary task, tagged with its match.
    SummaryReady { match_id: Uuid, text: String },
    Shutdown,
}

/// Handle to a running battle engine.
///
/// The engine itself is a spawned task owning the match state; this
/// handle sends control commands and hands out read-only snapshots.
/// Dropping the handle aborts the driver.
pub struct BattleEngine {
    commands: mpsc::Sender<Command>,
    snapshots: watch::Receiver<MatchState>,
    driver: JoinHandle<()>,
}

impl BattleEngine {
    /// Spawn the driver task. The engine starts in `Idle`.
    pub fn spawn(
        reasoner: Arc<dyn TurnReasoner>,
        summarizer: Arc<dyn MatchSummarizer>,
        config: EngineConfig,
    ) -> Self {
        let (commands, inbox) = mpsc::channel(16);
        let (publisher, snapshots) = watch::channel(MatchState::idle(config.language));
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let driver = Driver {
            state: MatchState::idle(config.language),
            publisher,
            commands: commands.clone(),
            inbox,
            reasoner,
            summarizer,
            config,
            rng,
        };
        let driver = tokio::spawn(driver.run());
        Self {
            commands,
            snapshots,
            driver,
        }
    }

    /// Start a match on `topic`. Rejected while a match is live or if
    /// the topic is empty after trimming.
    pub async fn start(&self, topic: impl Into<String>) -> Result<(), EngineError> {
        let topic = topic.into();
        self.send(|reply| Command::Start { topic, reply }).await
    }

    /// Stop the live match. The in-flight reasoning call, if any, is
    /// discarded; a summary is requested if enough turns were played.
    pub async fn stop(&self) -> Result<(), EngineError> {
        self.send(|reply| Command::Stop { reply }).await
    }

    /// Discard all match state and return to `Idle`.
    pub async fn reset(&self) -> Result<(), EngineError> {
        self.send(|reply| Command::Reset { reply }).await
    }

    /// Switch languages. Rejected while a match is live.
    pub async fn set_language(&self, language: Language) -> Result<(), EngineError> {
        self.send(|reply| Command::SetLanguage { language, reply })
            .await
    }

    /// A random topic suggestion in the engine's current language.
    pub fn suggest_topic(&self) -> &'static str {
        topics::random_topic(self.snapshots.borrow().language)
    }

    /// Current state snapshot.
    pub fn snapshot(&self) -> MatchState {
        self.snapshots.borrow().clone()
    }

    /// Subscribe to state snapshots; a new value is published after
    /// every mutation.
    pub fn subscribe(&self) -> watch::Receiver<MatchState> {
        self.snapshots.clone()
    }

    /// Ask the driver to exit and wait for it.
    pub async fn shutdown(mut self) {
        let _ = self.commands.send(Command::Shutdown).await;
        let _ = (&mut self.driver).await;
    }

    async fn send(
        &self,
        build: impl FnOnce(oneshot::Sender<Result<(), EngineError>>) -> Command,
    ) -> Result<(), EngineError> {
        let (reply, response) = oneshot::channel();
        self.commands
            .send(build(reply))
            .await
            .map_err(|_| EngineError::Closed)?;
        response.await.map_err(|_| EngineError::Closed)?
    }
}

impl Drop for BattleEngine {
    fn drop(&mut self) {
        self.driver.abort();
    }
}

enum Flow {
    Continue,
    Shutdown,
}

struct Driver {
    state: MatchState,
    publisher: watch::Sender<MatchState>,
    /// Sender half handed to detached summary tasks.
    commands: mpsc::Sender<Command>,
    inbox: mpsc::Receiver<Command>,
    reasoner: Arc<dyn TurnReasoner>,
    summarizer: Arc<dyn MatchSummarizer>,
    config: EngineConfig,
    rng: StdRng,
}

impl Driver {
    async fn run(mut self) {
        loop {
            // Idle or finished: nothing to drive, wait for commands.
            let Some(command) = self.inbox.recv().await else {
                break;
            };
            if let Flow::Shutdown = self.handle_command(command) {
                break;
            }

            // A start command flips the phase to Running; keep taking
            // turns until the match leaves that state.
            while self.state.phase == MatchPhase::Running {
                if let Flow::Shutdown = self.drive_turn().await {
                    return;
                }
            }
        }
    }

    /// One turn of the match, from pre-turn checks through resolution.
    async fn drive_turn(&mut self) -> Flow {
        // Lazy win check: an agent reduced to 0 HP loses when it would
        // next act, so the final exchange stays on screen first.
        if self.state.active().is_eliminated() {
            let winner = self.state.opponent().side;
            info!(%winner, "knockout");
            self.finish(Some(winner), "knockout");
            return Flow::Continue;
        }

        if !self.config.turn_delay.is_zero() {
            let pacing = tokio::time::sleep(self.config.turn_delay);
            tokio::pin!(pacing);
            loop {
                tokio::select! {
                    () = &mut pacing => break,
                    command = self.inbox.recv() => {
                        let Some(command) = command else { return Flow::Shutdown };
                        if let Flow::Shutdown = self.handle_command(command) {
                            return Flow::Shutdown;
                        }
                        if self.state.phase != MatchPhase::Running {
                            return Flow::Continue;
                        }
                    }
                }
            }
        }

        self.set_phase(MatchPhase::AwaitingReasoning, "reasoning call dispatched");
        self.publish();

        let request = TurnRequest {
            agent: self.state.active().clone(),
            opponent: self.state.opponent().clone(),
            topic: self.state.topic.clone(),
            transcript: self.state.transcript.clone(),
            language: self.state.language,
        };

        // Single-flight: exactly one reasoning future exists. Control
        // commands are serviced while it is pending, but a second call
        // is never dispatched for the same turn.
        let reasoner = Arc::clone(&self.reasoner);
        let call = async move { reasoner.take_turn(&request).await };
        tokio::pin!(call);
        let result = loop {
            tokio::select! {
                result = &mut call => break result,
                command = self.inbox.recv() => {
                    let Some(command) = command else { return Flow::Shutdown };
                    if let Flow::Shutdown = self.handle_command(command) {
                        return Flow::Shutdown;
                    }
                    if self.state.phase != MatchPhase::AwaitingReasoning {
                        // Stopped or reset mid-flight: the response is
                        // stale and must never be applied.
                        debug!("discarding in-flight reasoning call");
                        return Flow::Continue;
                    }
                }
            }
        };

        let response = match result {
            Ok(response) => response,
            Err(err) => {
                warn!(%err, "reasoner failed, substituting filler turn");
                reasoner::fallback_turn()
            }
        };

        let (agent_id, side, resolution) = {
            let (active, opponent) = self.state.active_pair_mut();
            let agent_id = active.id.clone();
            let side = active.side;
            let resolution = rules::resolve_turn(active, opponent, &response);
            (agent_id, side, resolution)
        };
        info!(
            %side,
            score = resolution.effective_score,
            damage = resolution.damage,
            item = %resolution.item_used,
            "turn resolved"
        );
        self.state.record_turn(TurnRecord {
            agent_id,
            side,
            message: response.message,
            timestamp: Utc::now(),
            logic_score: resolution.effective_score,
            judge_comment: response.judge_comment,
            damage_dealt: resolution.damage,
            item_used: resolution.item_used,
        });
        self.set_phase(MatchPhase::Running, "turn resolved");
        self.publish();
        Flow::Continue
    }

    fn handle_command(&mut self, command: Command) -> Flow {
        match command {
            Command::Start { topic, reply } => {
                let _ = reply.send(self.start_match(topic));
            }
            Command::Stop { reply } => {
                let result = if self.state.phase.is_live() {
                    self.finish(None, "stopped by user");
                    Ok(())
                } else {
                    Err(EngineError::NoActiveMatch)
                };
                let _ = reply.send(result);
            }
            Command::Reset { reply } => {
                self.state = MatchState::idle(self.state.language);
                self.publish();
                let _ = reply.send(Ok(()));
            }
            Command::SetLanguage { language, reply } => {
                let _ = reply.send(self.set_language(language));
            }
            Command::SummaryReady { match_id, text } => {
                self.apply_summary(match_id, text);
            }
            Command::Shutdown => return Flow::Shutdown,
        }
        Flow::Continue
    }

    fn start_match(&mut self, topic: String) -> Result<(), EngineError> {
        if self.state.phase.is_live() {
            return Err(EngineError::MatchInProgress);
        }
        let topic = topic.trim();
        if topic.is_empty() {
            return Err(EngineError::EmptyTopic);
        }
        let opening_side = if self.rng.gen_bool(0.5) {
            Side::Pro
        } else {
            Side::Con
        };
        let mut state = MatchState::new(topic, self.state.language, opening_side);
        state
            .transition(MatchPhase::Running, "match started")
            .map_err(|_| EngineError::MatchInProgress)?;
        info!(%topic, %opening_side, match_id = %state.id, "match started");
        self.state = state;
        self.publish();
        Ok(())
    }

    fn set_language(&mut self, language: Language) -> Result<(), EngineError> {
        if self.state.phase.is_live() {
            return Err(EngineError::MatchInProgress);
        }
        if self.state.language != language {
            self.state.language = language;
            self.publish();
        }
        Ok(())
    }

    fn finish(&mut self, winner: Option<Side>, reason: &str) {
        self.state.winner = winner;
        self.set_phase(MatchPhase::Finished, reason);
        self.publish();
        self.request_summary();
    }

    /// Kick off summary generation as a detached task. The completion
    /// is routed back through the command channel tagged with the
    /// match id so stale results can be dropped.
    fn request_summary(&self) {
        // Too short to analyze.
        if self.state.transcript.len() < 2 {
            return;
        }
        let request = SummaryRequest {
            topic: self.state.topic.clone(),
            transcript: self.state.transcript.clone(),
            language: self.state.language,
        };
        let summarizer = Arc::clone(&self.summarizer);
        let commands = self.commands.clone();
        let match_id = self.state.id;
        tokio::spawn(async move {
            let text = match summarizer.summarize(&request).await {
                Ok(text) => text,
                Err(err) => {
                    warn!(%err, "summary generation failed");
                    reasoner::SUMMARY_FALLBACK.to_string()
                }
            };
            let _ = commands.send(Command::SummaryReady { match_id, text }).await;
        });
    }

    fn apply_summary(&mut self, match_id: Uuid, text: String) {
        // The match may have been reset or restarted since the task
        // was spawned.
        if self.state.id != match_id || self.state.phase != MatchPhase::Finished {
            debug!("discarding stale summary");
            return;
        }
        self.state.summary = Some(text);
        self.publish();
    }

    fn set_phase(&mut self, to: MatchPhase, reason: &str) {
        // Driver call sites are statically sequenced; a rejection here
        // is a bug in the driver itself.
        if let Err(err) = self.state.transition(to, reason) {
            warn!(%err, "phase transition rejected");
        }
    }

    fn publish(&self) {
        self.publisher.send_replace(self.state.clone());
    }
}
