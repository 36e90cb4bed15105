//! Ally application entry point.
//!
//! Wires together configuration, storage, the generation client, and the
//! speech synthesizer, then either serves the HTTP API or runs an
//! interactive terminal conversation.

mod chat;
mod cli;

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

use ally_api::AppState;
use ally_chat::{
    ConversationOrchestrator, GeminiClient, OrchestratorSettings, SpeechOutcome,
    TranslateTtsSynthesizer, VoiceInterface,
};
use ally_core::config::AllyConfig;
use ally_core::language;
use ally_storage::Database;

use chat::{Step, TerminalChat};
use cli::{CliArgs, Command};

/// Expand a leading `~/` to the home directory.
fn resolve_data_dir(data_dir: &str) -> PathBuf {
    if let Some(rest) = data_dir.strip_prefix("~/") {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        PathBuf::from(home).join(rest)
    } else {
        PathBuf::from(data_dir)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    // Config is read before tracing starts so its log level can apply.
    let config_file = args.resolve_config_path();
    let (mut config, load_error) = if config_file.exists() {
        match AllyConfig::load(&config_file) {
            Ok(config) => (config, None),
            Err(e) => (AllyConfig::default(), Some(e)),
        }
    } else {
        (AllyConfig::default(), None)
    };

    if let Some(dir) = args.resolve_data_dir() {
        config.general.data_dir = dir;
    }
    if let Some(level) = args.resolve_log_level() {
        config.general.log_level = level;
    }
    config.general.port = args.resolve_port(config.general.port);

    // Tracing.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.general.log_level)),
        )
        .init();

    tracing::info!("Starting SeniorCare Ally v{}", env!("CARGO_PKG_VERSION"));
    match load_error {
        Some(e) => tracing::warn!(
            path = %config_file.display(),
            error = %e,
            "Failed to load config, using defaults"
        ),
        None => tracing::info!(path = %config_file.display(), "Configuration loaded"),
    }

    let model = Arc::new(GeminiClient::from_config(&config.llm)?);
    let synthesizer = Arc::new(TranslateTtsSynthesizer::from_config(&config.speech)?);

    match args.command() {
        Command::Serve => {
            let db_path = resolve_data_dir(&config.general.data_dir).join("ally.db");
            let database = Database::new(&db_path)?;
            let state = AppState::new(config.clone(), database, model, synthesizer);
            ally_api::start_server(&config, state).await?;
        }
        Command::Chat { language } => {
            let settings = OrchestratorSettings::from_config(&config.chat, &config.llm);
            let orchestrator = Arc::new(ConversationOrchestrator::new(model, settings));
            let voice = VoiceInterface::new(synthesizer, config.speech.enabled)
                .with_player(config.speech.player.clone());
            run_terminal_chat(orchestrator, voice, language).await?;
        }
    }

    Ok(())
}

/// Read lines from stdin until the user says goodbye or input ends.
async fn run_terminal_chat(
    orchestrator: Arc<ConversationOrchestrator>,
    voice: VoiceInterface,
    language: Option<String>,
) -> std::io::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("\n=== SeniorCare Ally ===");
    println!("A supportive AI companion for seniors and caregivers.\n");

    let choice = match language {
        Some(name) => name,
        None => {
            println!("Available languages:");
            for profile in language::supported_languages() {
                println!("- {}", chat::display_name(profile.name));
            }
            prompt("\nChoose your language: ")?;
            lines.next_line().await?.unwrap_or_default()
        }
    };
    let lang_code = language::resolve_code(&choice);

    println!("\nType 'exit' to quit.\n");

    let started_at = chrono::Local::now().format("%Y-%m-%d %H:%M").to_string();
    let mut session = TerminalChat::new(orchestrator, lang_code, &started_at);

    loop {
        prompt("You: ")?;
        let Some(line) = lines.next_line().await? else {
            break;
        };

        match session.step(&line).await {
            Step::Skip => continue,
            Step::Farewell(goodbye) => {
                println!("\nSeniorCare Ally: {}", goodbye);
                say(&voice, goodbye, session.lang_code()).await;
                break;
            }
            Step::Reply(reply) => {
                println!("\nSeniorCare Ally: {} \n", reply);
                say(&voice, &reply, session.lang_code()).await;
            }
        }
    }

    tracing::debug!(turns = session.history().len(), "Conversation ended");
    Ok(())
}

async fn say(voice: &VoiceInterface, text: &str, lang_code: &str) {
    if let SpeechOutcome::Skipped(reason) = voice.speak(text, lang_code).await {
        tracing::debug!(%reason, "Reply not spoken");
    }
}

fn prompt(text: &str) -> std::io::Result<()> {
    print!("{}", text);
    std::io::stdout().flush()
}
