//! Terminal front end: runs one debate battle and prints the match as
//! it unfolds. Ctrl-C stops the match and still produces the analysis.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use debate_arena::{
    BattleEngine, EngineConfig, GeminiReasoner, Language, MatchPhase, MatchState,
};

/// Two AI personas argue a topic; logic quality is the damage dealt.
#[derive(Debug, Parser)]
#[command(name = "debate-arena", version, about)]
struct Cli {
    /// Debate topic. A random one is suggested when omitted.
    topic: Option<String>,

    /// Language both agents argue in.
    #[arg(long, value_enum, default_value = "ko")]
    language: Language,

    /// Pacing delay between turns, in milliseconds.
    #[arg(long, default_value_t = 2500)]
    turn_delay_ms: u64,

    /// Seed for the opening coin flip (reproducible matches).
    #[arg(long)]
    seed: Option<u64>,

    /// Override the generation model.
    #[arg(long)]
    model: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "debate_arena=info".into()),
        )
        .init();

    let cli = Cli::parse();

    let mut gemini =
        GeminiReasoner::from_env().context("a Gemini API key is required to run a live match")?;
    if let Some(model) = &cli.model {
        gemini = gemini.with_model(model);
    }
    let gemini = Arc::new(gemini);

    let engine = BattleEngine::spawn(
        gemini.clone(),
        gemini,
        EngineConfig {
            turn_delay: Duration::from_millis(cli.turn_delay_ms),
            language: cli.language,
            seed: cli.seed,
        },
    );

    let topic = cli
        .topic
        .unwrap_or_else(|| engine.suggest_topic().to_string());
    info!(%topic, language = %cli.language, "starting debate battle");
    engine.start(&topic).await?;

    println!("⚔  {topic}\n");

    let mut snapshots = engine.subscribe();
    let mut printed_turns = 0;
    let mut announced = false;
    loop {
        tokio::select! {
            changed = snapshots.changed() => {
                if changed.is_err() {
                    break;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("stop requested");
                let _ = engine.stop().await;
                continue;
            }
        }

        let state = snapshots.borrow_and_update().clone();
        for turn in &state.transcript[printed_turns..] {
            print_turn(&state, turn);
        }
        printed_turns = state.transcript.len();

        if state.phase != MatchPhase::Finished {
            continue;
        }
        if !announced {
            announced = true;
            match state.winner {
                Some(winner) => {
                    println!("🏆 {winner} wins — the opponent could not sustain the argument.\n")
                }
                None => println!("Match stopped.\n"),
            }
        }
        // A short match gets no analysis; otherwise wait for it.
        if state.transcript.len() < 2 {
            break;
        }
        if let Some(summary) = &state.summary {
            println!("── Post-match analysis ──\n{summary}");
            break;
        }
    }

    engine.shutdown().await;
    Ok(())
}

fn print_turn(state: &MatchState, turn: &debate_arena::TurnRecord) {
    let name = state
        .agents
        .iter()
        .find(|agent| agent.id == turn.agent_id)
        .map_or("?", |agent| agent.name.as_str());
    println!("[{}] {name}: {}", turn.side, turn.message);
    println!(
        "      judge: {} (logic {:.0}, damage {}, item {})",
        turn.judge_comment, turn.logic_score, turn.damage_dealt, turn.item_used
    );
    println!(
        "      HP  {} {} | {} {}\n",
        state.agents[0].side, state.agents[0].hp, state.agents[1].side, state.agents[1].hp
    );
}
