use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use intel_dashboard_lib::chat::{
    ChatOrchestrator, HttpIntelligenceBackend, IntelligenceBackend, TurnOutcome,
    UnconfiguredBackend,
};
use intel_dashboard_lib::config::{
    self, ConfigLoader, DashboardConfig, PartialBackendConfig, PartialConfig,
    PartialEngineConfig, PartialStorageConfig,
};
use intel_dashboard_lib::dashboard::ReconstructionMode;
use intel_dashboard_lib::{open_orchestrator, DashboardState};
use std::path::PathBuf;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};

/// Intel Dashboard - chat-driven sales intelligence in the terminal
#[derive(Parser, Debug)]
#[command(name = "intel-dashboard")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Directory holding the dashboard snapshot, transcript and config.toml
    #[arg(long, global = true, env = "INTEL_DASHBOARD_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Intelligence backend endpoint (http or https)
    #[arg(long, global = true, env = "INTEL_DASHBOARD_ENDPOINT")]
    endpoint: Option<String>,

    /// Backend request timeout in seconds
    #[arg(long, global = true)]
    timeout_secs: Option<u64>,

    /// How to rebuild the dashboard when no snapshot is stored (full_replay or latest_only)
    #[arg(long, global = true)]
    reconstruction: Option<ReconstructionMode>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Interactive chat (the default)
    Chat,
    /// Send a single message and print the reply
    Ask {
        /// The message to send
        message: Vec<String>,
    },
    /// Print the current dashboard
    Show {
        /// Print the raw JSON state
        #[arg(long)]
        json: bool,
    },
    /// Clear the dashboard and the chat transcript
    Reset,
    /// Print the effective configuration
    Config {
        /// Also write it to the data directory's config.toml
        #[arg(long)]
        write: bool,
    },
}

impl Cli {
    fn overrides(&self) -> PartialConfig {
        PartialConfig {
            storage: self.data_dir.as_ref().map(|dir| PartialStorageConfig {
                data_dir: Some(dir.to_string_lossy().to_string()),
                ..Default::default()
            }),
            engine: self.reconstruction.map(|mode| PartialEngineConfig {
                reconstruction: Some(mode),
                ..Default::default()
            }),
            backend: Some(PartialBackendConfig {
                endpoint: self.endpoint.clone(),
                timeout_secs: self.timeout_secs,
            }),
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let data_dir = cli
        .data_dir
        .clone()
        .unwrap_or_else(intel_dashboard_lib::utils::default_data_dir);
    let config = config::load_merged_config(Some(&data_dir), Some(cli.overrides()))?;

    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| anyhow!("Failed to create tokio runtime: {}", e))?;

    match config.backend.endpoint.clone() {
        Some(endpoint) => {
            let timeout = Duration::from_secs(config.backend.timeout_secs);
            let backend = HttpIntelligenceBackend::new(endpoint, timeout)?;
            rt.block_on(run(cli.command, &config, &data_dir, backend))
        }
        None => {
            log::info!("No backend endpoint configured; analysis requests will fail");
            rt.block_on(run(cli.command, &config, &data_dir, UnconfiguredBackend))
        }
    }
}

async fn run<B: IntelligenceBackend>(
    command: Option<Command>,
    config: &DashboardConfig,
    data_dir: &std::path::Path,
    backend: B,
) -> Result<()> {
    if let Some(Command::Config { write }) = command {
        return print_config(config, data_dir, write);
    }

    let chat = open_orchestrator(backend, config).map_err(|e| anyhow!(e))?;
    let source = chat.bootstrap();
    log::debug!("Dashboard ready ({:?})", source);

    match command.unwrap_or(Command::Chat) {
        Command::Chat => chat_loop(&chat).await,
        Command::Ask { message } => {
            let message = message.join(" ");
            if message.trim().is_empty() {
                return Err(anyhow!("Nothing to send"));
            }
            print_outcome(&chat.handle_user_turn(&message).await);
            Ok(())
        }
        Command::Show { json } => {
            let state = chat.state();
            if json {
                println!("{}", serde_json::to_string_pretty(&state)?);
            } else {
                print!("{}", render_dashboard(&state));
            }
            Ok(())
        }
        Command::Reset => {
            chat.reset().await;
            println!("Dashboard and chat history cleared.");
            Ok(())
        }
        Command::Config { .. } => Ok(()),
    }
}

async fn chat_loop<B: IntelligenceBackend>(chat: &ChatOrchestrator<B>) -> Result<()> {
    println!("Ask about a company (\"/show\" for the dashboard, \"/reset\" to start over, \"/quit\" to exit).");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        match line {
            "" => continue,
            "/quit" | "/exit" => break,
            "/show" => print!("{}", render_dashboard(&chat.state())),
            "/reset" => {
                chat.reset().await;
                println!("Dashboard and chat history cleared.");
            }
            text => print_outcome(&chat.handle_user_turn(text).await),
        }
    }

    Ok(())
}

fn print_outcome(outcome: &TurnOutcome) {
    println!("{}", outcome.reply().content);
    if let TurnOutcome::Analyzed { state, .. } = outcome {
        print!("{}", render_dashboard(state));
    }
}

fn print_config(config: &DashboardConfig, data_dir: &std::path::Path, write: bool) -> Result<()> {
    let (global, project) = config::get_config_paths(Some(data_dir));
    if let Some(path) = global {
        println!("# global:  {}", path.display());
    }
    if let Some(path) = project {
        println!("# project: {}", path.display());
    }
    println!("{}", toml::to_string_pretty(config)?);

    if write {
        let path = ConfigLoader::new().with_data_dir(data_dir).save_project(config)?;
        println!("Wrote {}", path.display());
    }
    Ok(())
}

fn render_dashboard(state: &DashboardState) -> String {
    if state.is_empty() {
        return "Dashboard is empty.\n".to_string();
    }

    let mut out = String::new();
    if let Some(ref company) = state.user_company {
        out.push_str(&format!("You:          {}\n", company));
    }
    if !state.target_companies.is_empty() {
        out.push_str(&format!("Targets:      {}\n", state.target_companies.join(", ")));
    }
    if let Some(ref metrics) = state.sales_metrics {
        out.push_str(&format!(
            "Deal:         {:.0}% (confidence {:.0}%, close {})\n",
            metrics.deal_probability, metrics.confidence, metrics.time_to_close
        ));
    }
    if !state.competitor_analysis.is_empty() {
        out.push_str("Competitors:\n");
        for entry in &state.competitor_analysis {
            out.push_str(&format!(
                "  - {} ({}, {})\n",
                entry.company, entry.strength, entry.market_share
            ));
        }
    }
    if !state.recent_insights.is_empty() {
        out.push_str("Insights:\n");
        for insight in &state.recent_insights {
            out.push_str(&format!(
                "  [{}] {} ({})\n",
                insight.insight_type.as_str(),
                insight.insight,
                insight.timestamp.format("%Y-%m-%d %H:%M")
            ));
        }
    }
    out
}
