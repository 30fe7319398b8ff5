//! Kali Agents Supervisor - Entry Point
//!
//! Submits one request against the simulated agent services and prints the
//! task result as JSON.

use anyhow::{bail, Context};
use kali_agents::{AlgorithmKind, Config, Parameters, SimulatedToolExecutor, Supervisor};
use std::sync::Arc;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

struct Args {
    json_logs: bool,
    show_status: bool,
    target: Option<String>,
    algorithm: Option<AlgorithmKind>,
    request: String,
}

fn parse_args(args: &[String]) -> anyhow::Result<Args> {
    let mut parsed = Args {
        json_logs: false,
        show_status: false,
        target: None,
        algorithm: None,
        request: String::new(),
    };
    let mut words = Vec::new();

    let mut iter = args.iter().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--json" => parsed.json_logs = true,
            "--status" => parsed.show_status = true,
            "--target" => {
                let value = iter.next().context("--target requires a value")?;
                parsed.target = Some(value.clone());
            }
            "--algorithm" => {
                let value = iter.next().context("--algorithm requires a value")?;
                parsed.algorithm = Some(value.parse()?);
            }
            flag if flag.starts_with("--") => bail!("Unknown option: {}", flag),
            word => words.push(word.to_string()),
        }
    }

    parsed.request = words.join(" ");
    Ok(parsed)
}

fn print_help() {
    println!("Kali Agents Supervisor v{}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("Usage: kali-agents [OPTIONS] <REQUEST>...");
    println!();
    println!("Options:");
    println!("  --target <T>       Target host or network (default: localhost)");
    println!("  --algorithm <A>    fuzzy_logic | genetic_algorithm | q_learning");
    println!("  --status           Print system status after the run");
    println!("  --json             Log as JSON to stderr");
    println!("  --help, -h         Show this help");
    println!();
    println!("Environment variables:");
    println!("  KALI_SUPERVISOR_ID        Supervisor identity");
    println!("  KALI_TOOL_TIMEOUT_SECS    Per tool-call timeout (default: 30)");
    println!("  KALI_HISTORY_LIMIT        Agent history bound (default: 50)");
    println!("  KALI_DECISION_LOG_LIMIT   Recent decisions kept (default: 100)");
    println!("  KALI_DEFAULT_ALGORITHM    Algorithm trained by new tasks");
    println!("  RUST_LOG                  trace | debug | info | warn | error");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment
    dotenvy::dotenv().ok();

    let argv: Vec<String> = std::env::args().collect();
    if argv.iter().any(|a| a == "--help" || a == "-h") {
        print_help();
        return Ok(());
    }
    let args = parse_args(&argv)?;

    // Setup logging
    let log_level = std::env::var("RUST_LOG")
        .map(|s| match s.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::INFO,
        })
        .unwrap_or(Level::INFO);

    if args.json_logs {
        let subscriber = FmtSubscriber::builder()
            .with_max_level(log_level)
            .with_writer(std::io::stderr)
            .with_ansi(false)
            .json()
            .finish();
        tracing::subscriber::set_global_default(subscriber)?;
    } else {
        let subscriber = FmtSubscriber::builder()
            .with_max_level(log_level)
            .with_writer(std::io::stderr)
            .with_ansi(true)
            .finish();
        tracing::subscriber::set_global_default(subscriber)?;
    }

    if args.request.trim().is_empty() {
        print_help();
        bail!("No request given");
    }

    info!("Kali Agents Supervisor v{}", env!("CARGO_PKG_VERSION"));

    let config = Config::from_env()?;
    let supervisor = Supervisor::with_config(config, Arc::new(SimulatedToolExecutor::new()));

    let mut parameters = Parameters::new();
    if let Some(target) = &args.target {
        parameters.insert("target".to_string(), target.clone().into());
    }

    let algorithm = args.algorithm.unwrap_or(supervisor.config().default_algorithm);
    let task = supervisor.classify_with_algorithm(&args.request, parameters, algorithm);
    let result = supervisor.submit_task(task).await?;

    println!("{}", serde_json::to_string_pretty(&result)?);

    if args.show_status {
        let status = supervisor.system_status().await;
        println!("{}", serde_json::to_string_pretty(&status)?);
    }

    Ok(())
}
