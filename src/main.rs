//! PRedCulture core — console entry point.
//!
//! Startup sequence:
//!   1. Load .env (if present)
//!   2. Parse CLI flags
//!   3. Load config
//!   4. Resolve effective log level (CLI `-v` flags > env > config)
//!   5. Init logger once
//!   6. Load inference artifacts (fatal on failure)
//!   7. Build chat provider + service
//!   8. Run the console loop until Ctrl-C or EOF

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

use predculture::chat::{ChatService, ConversationSession, TurnError};
use predculture::config;
use predculture::error::AppError;
use predculture::inference::{FEATURE_COUNT, Pipeline};
use predculture::llm::providers;
use predculture::logger;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), AppError> {
    // Load .env if present — ignore errors (file is optional).
    let _ = dotenvy::dotenv();

    let args = parse_cli_args();

    let config = config::load(args.config_path.as_deref())?;

    let effective_log_level = args.log_level.unwrap_or(config.log_level.as_str());
    logger::init(effective_log_level, args.log_level.is_some())?;

    info!(
        service = %config.service_name,
        artifact_dir = %config.artifact_dir.display(),
        provider = %config.llm.provider,
        model = %config.llm.mistral.model,
        effective_log_level = %effective_log_level,
        "config loaded"
    );

    // Fatal: the service refuses to run without all three fitted artifacts.
    let pipeline = Pipeline::load(&config.artifact_dir)?;

    let provider = providers::build(&config.llm, config.llm_api_key.clone())
        .map_err(|e| AppError::Config(e.to_string()))?;
    if config.llm.provider != "dummy" && config.llm_api_key.is_none() {
        warn!("LLM_API_KEY is not set — provider calls will likely be rejected");
    }
    let chat = ChatService::new(provider, config.chat.greeting.clone());

    run_console(&pipeline, &chat).await
}

// ── Console loop ──────────────────────────────────────────────────────────────

async fn run_console(pipeline: &Pipeline, chat: &ChatService) -> Result<(), AppError> {
    println!("──────────────────────────────────────────");
    println!(" PRedCulture console  (Ctrl-C to quit)");
    println!("  /analyze v1,…,v{FEATURE_COUNT}   run one analysis");
    println!("  /new                 start a fresh session");
    println!("  anything else        talk to the assistant");
    println!("──────────────────────────────────────────");

    let mut session = chat.start_session();
    print_greeting(&session);

    let stdin = tokio::io::stdin();
    let mut lines = BufReader::new(stdin).lines();

    loop {
        print!("> ");
        use std::io::Write as _;
        let _ = std::io::stdout().flush();

        tokio::select! {
            biased;

            _ = tokio::signal::ctrl_c() => {
                println!();
                info!("ctrl-c received — closing console");
                break;
            }

            line = lines.next_line() => {
                match line {
                    Err(e) => {
                        warn!("console read error: {e}");
                        break;
                    }
                    Ok(None) => {
                        info!("stdin closed");
                        break;
                    }
                    Ok(Some(input)) => {
                        let input = input.trim();
                        if input.is_empty() {
                            continue;
                        }
                        if input == "/quit" {
                            break;
                        }
                        if input == "/new" {
                            session = chat.start_session();
                            print_greeting(&session);
                            continue;
                        }
                        if let Some(rest) = input.strip_prefix("/analyze") {
                            print_analysis(pipeline, rest);
                            continue;
                        }
                        match chat.submit_turn(&mut session, input).await {
                            Ok(reply) => println!("assistant: {}", reply.content),
                            Err(TurnError::EmptyInput) => {
                                println!("(rien à envoyer — écrivez un message)");
                            }
                        }
                    }
                }
            }
        }
    }

    Ok(())
}

fn print_greeting(session: &ConversationSession) {
    for m in session.messages() {
        println!("assistant: {}", m.content);
    }
}

/// Parse `/analyze` operands and print the verdict, or a "could not analyze"
/// line with the specific reason. Never shows a label on failure.
fn print_analysis(pipeline: &Pipeline, raw: &str) {
    let parsed: Result<Vec<f64>, _> = raw
        .split(',')
        .map(|s| s.trim().parse::<f64>())
        .collect();

    let values = match parsed {
        Ok(v) => v,
        Err(e) => {
            println!("could not analyze: {e} — expected {FEATURE_COUNT} comma-separated numbers");
            return;
        }
    };

    match pipeline.analyze(&values) {
        Ok(p) => {
            println!(
                "verdict: {} (confiance {:.1} %)",
                p.label.as_str(),
                p.confidence * 100.0
            );
            println!("{}", p.label.describe());
        }
        Err(e) => println!("could not analyze: {e}"),
    }
}

// ── CLI flags ─────────────────────────────────────────────────────────────────

struct CliArgs {
    log_level: Option<&'static str>,
    config_path: Option<String>,
}

fn parse_cli_args() -> CliArgs {
    let mut verbosity = 0u8;
    let mut config_path = None;

    let mut iter = std::env::args().skip(1);
    while let Some(arg) = iter.next() {
        if arg == "--" {
            break;
        }

        match arg.as_str() {
            "-h" | "--help" => {
                println!("Usage: predculture [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -h, --help                 Print help");
                println!("  -f, --config <PATH>        Path to configuration file (default: config/default.toml)");
                println!("  -v, -vv, -vvv, -vvvv       Increase logging verbosity");
                std::process::exit(0);
            }
            "-f" | "--config" => {
                if let Some(path) = iter.next() {
                    config_path = Some(path);
                } else {
                    eprintln!("error: -f/--config requires a path argument");
                    std::process::exit(1);
                }
            }
            "--verbose" => verbosity = verbosity.saturating_add(1),
            a if a.starts_with('-') && a.len() > 1 && a.chars().skip(1).all(|c| c == 'v') => {
                verbosity = verbosity.saturating_add((a.len() - 1) as u8);
            }
            _ => {}
        }
    }

    // Each -v raises verbosity one tier from the config default:
    //   -v      → warn   (suppress info noise, show warnings+errors only)
    //   -vv     → info   (normal operational output — the typical default)
    //   -vvv    → debug  (flow-level diagnostics)
    //   -vvvv+  → trace  (full payload dumps, very verbose)
    let log_level = match verbosity {
        0 => None,
        1 => Some("warn"),
        2 => Some("info"),
        3 => Some("debug"),
        _ => Some("trace"),
    };

    CliArgs { log_level, config_path }
}
