use clap::{ArgAction, ArgMatches, Args, CommandFactory, FromArgMatches, Parser, Subcommand};
use gestpipe_core::config::PipelineConfig;
use gestpipe_core::registry::TemplateRegistry;
use gestpipe_core::session::{CaptureSession, PracticeSession};
use gestpipe_node::client::HttpGateway;
use gestpipe_node::{frames, reports, runner};
use std::path::PathBuf;
use std::process;
use std::time::Duration;
use tracing::{error, info, warn, Level};
use uuid::Uuid;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Base URL of the gesture services
    #[arg(global = true, long, default_value = "http://localhost:5000/api")]
    api: String,

    /// Bearer token sent with every request
    #[arg(global = true, long)]
    token: Option<String>,

    #[arg(global = true, long, default_value_t = 5000)]
    timeout_ms: u64,

    /// NDJSON landmark frames; stdin when omitted
    #[arg(global = true, short, long)]
    input: Option<PathBuf>,

    /// JSON pipeline config; explicit flags still win
    #[arg(global = true, long)]
    config: Option<PathBuf>,

    /// Swap Left/Right labels of a selfie-mirrored feed
    #[arg(global = true, long, default_value_t = true, action = ArgAction::Set)]
    mirror_labels: bool,

    #[arg(global = true, long, default_value_t = false)]
    debug: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Record labeled training samples and upload them in batches
    Capture(CaptureArgs),
    /// Score attempts at a known gesture
    Practice(PracticeArgs),
}

#[derive(Args, Debug, Clone)]
struct CaptureArgs {
    #[arg(long)]
    label: String,

    #[arg(long)]
    operator: Option<String>,

    /// Also keep a local CSV copy of every uploaded batch
    #[arg(long)]
    export_dir: Option<PathBuf>,

    #[command(flatten)]
    pipeline: PipelineConfig,
}

#[derive(Args, Debug, Clone)]
struct PracticeArgs {
    #[arg(long)]
    gesture: String,

    /// JSON map of extra or replacement gesture templates
    #[arg(long)]
    templates: Option<PathBuf>,

    #[command(flatten)]
    pipeline: PipelineConfig,
}

fn resolve_config(cli: &Cli, from_cli: &PipelineConfig, sub_matches: &ArgMatches) -> PipelineConfig {
    match &cli.config {
        Some(path) => {
            info!("⚙️  Loading pipeline config: {:?}", path);
            let mut cfg = PipelineConfig::load_from_file(path).unwrap_or_else(|e| {
                error!("{}", e);
                process::exit(1);
            });
            cfg.merge_from_cli(from_cli, sub_matches);
            cfg
        }
        None => from_cli.clone(),
    }
}

#[tokio::main]
async fn main() {
    let matches = Cli::command().get_matches();
    let cli = Cli::from_arg_matches(&matches).unwrap_or_else(|e| e.exit());

    tracing_subscriber::fmt()
        .with_max_level(if cli.debug { Level::DEBUG } else { Level::INFO })
        .init();

    let gateway = HttpGateway::new(&cli.api, Duration::from_millis(cli.timeout_ms), cli.token.clone())
        .unwrap_or_else(|e| {
            error!("Failed to build HTTP client: {}", e);
            process::exit(1);
        });

    let input = frames::open_input(cli.input.as_deref()).await.unwrap_or_else(|e| {
        error!("Cannot open input: {}", e);
        process::exit(1);
    });
    let (mut rx, reader) = frames::spawn_reader(input, cli.mirror_labels, 256);

    match &cli.command {
        Commands::Capture(args) => {
            let sub = matches.subcommand_matches("capture").unwrap_or(&matches);
            let config = resolve_config(&cli, &args.pipeline, sub);
            let operator = args.operator.clone().unwrap_or_else(|| {
                let id = Uuid::new_v4().simple().to_string();
                format!("operator-{}", &id[..8])
            });

            info!("🎬 Capturing '{}' as {} via {}", args.label, operator, gateway.base_url());
            let mut session = CaptureSession::new(config, &operator, &args.label, gateway.clone(), gateway)
                .unwrap_or_else(|e| {
                    error!("{}", e);
                    process::exit(1);
                });

            match runner::run_capture(&mut session, &mut rx, args.export_dir.as_deref()).await {
                Ok(summary) => {
                    info!(
                        "Done: {} accepted, {} rejected, {} batches uploaded",
                        summary.accepted, summary.rejected, summary.batches
                    );
                    if !session.collector().pending().is_empty() {
                        println!("{}", reports::pending_submissions(session.collector().pending()));
                    }
                }
                Err(e) => {
                    error!("Capture aborted: {}", e);
                    process::exit(1);
                }
            }
        }
        Commands::Practice(args) => {
            let sub = matches.subcommand_matches("practice").unwrap_or(&matches);
            let config = resolve_config(&cli, &args.pipeline, sub);
            let registry = match &args.templates {
                Some(path) => TemplateRegistry::load_from_file(path).unwrap_or_else(|e| {
                    warn!("Failed to load templates: {}. Using defaults.", e);
                    TemplateRegistry::new_with_defaults()
                }),
                None => TemplateRegistry::new_with_defaults(),
            };

            let mut session = PracticeSession::new(&config, &registry, &args.gesture, gateway)
                .unwrap_or_else(|e| {
                    error!("{}", e);
                    let known: Vec<&str> = registry.labels().collect();
                    error!("Known gestures: {}", known.join(", "));
                    process::exit(1);
                });

            info!("🎯 Practicing '{}'", args.gesture);
            match runner::run_practice(&mut session, &mut rx).await {
                Ok(stats) => println!("{}", reports::practice_summary(&args.gesture, &stats)),
                Err(e) => {
                    error!("Practice aborted: {}", e);
                    process::exit(1);
                }
            }
        }
    }

    // Practice may finish before the input does.
    drop(rx);
    reader.abort();
    match reader.await {
        Ok(Ok(n)) => info!("{} frames read", n),
        Ok(Err(e)) => warn!("Input error: {}", e),
        Err(e) if e.is_cancelled() => {}
        Err(e) => warn!("Reader task failed: {}", e),
    }
}
