use clap::Parser;
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

use qrspool::api::{display_router, printer_router, serve, ApiState};
use qrspool::config::{SpoolConfig, WatcherConfig};
use qrspool::display::{run_display_session, LogSurface};
use qrspool::encode::QrPngEncoder;
use qrspool::shutdown::install_shutdown_handler;
use qrspool::spool::PrintSpooler;
use qrspool::watcher::run_watcher;

#[derive(Parser, Debug)]
#[command(name = "qrspool")]
#[command(version)]
#[command(about = "Turns dropped text into QR print jobs and shows the latest one on a shared display")]
#[command(propagate_version = true)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Run the spooler: submission API, display API, and folder watcher
    Serve(ServeArgs),

    /// Submit a print job to a running spooler
    Print {
        #[command(flatten)]
        client: ClientArgs,

        /// The text to print
        #[arg(required = true)]
        text: Vec<String>,
    },

    /// Show the latest job known to a running spooler
    Latest {
        #[command(flatten)]
        client: ClientArgs,
    },
}

#[derive(Parser, Debug)]
struct ServeArgs {
    /// Root directory for durable state (counter and blobs)
    #[arg(long, default_value = ".")]
    data_dir: PathBuf,

    /// Listen address for the submission API
    #[arg(long, default_value = "0.0.0.0:5000")]
    printer_addr: SocketAddr,

    /// Listen address for the display API
    #[arg(long, default_value = "0.0.0.0:8080")]
    display_addr: SocketAddr,

    /// Directory watched for dropped print files
    #[arg(long, default_value = "print_input")]
    input_dir: PathBuf,

    /// Directory processed print files are archived into
    #[arg(long, default_value = "print_archive")]
    archive_dir: PathBuf,

    /// Seconds each job stays on screen
    #[arg(long, default_value = "10")]
    display_secs: u64,

    /// Disable the input-folder watcher
    #[arg(long)]
    no_watcher: bool,

    /// Also run a headless display session that logs show/hide transitions
    #[arg(long)]
    log_display: bool,
}

#[derive(Parser, Debug)]
struct ClientArgs {
    /// Base URL of the submission API
    #[arg(short = 'a', long, default_value = "http://127.0.0.1:5000")]
    addr: String,
}

#[derive(Deserialize, Debug)]
struct PrintReply {
    file_number: u64,
    filename: String,
}

#[derive(Deserialize, Debug)]
struct LastQrReply {
    exists: bool,
    file_number: Option<u64>,
    filename: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    match args.command {
        Commands::Serve(serve_args) => {
            run_serve(serve_args).await?;
        }
        Commands::Print { client, text } => {
            handle_print(&client, text.join(" ")).await;
        }
        Commands::Latest { client } => {
            handle_latest(&client).await;
        }
    }

    Ok(())
}

async fn run_serve(args: ServeArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = SpoolConfig {
        watcher: WatcherConfig {
            input_dir: args.input_dir,
            archive_dir: args.archive_dir,
            ..Default::default()
        },
        ..SpoolConfig::new(args.data_dir)
    }
    .with_printer_addr(args.printer_addr)
    .with_display_addr(args.display_addr)
    .with_display_secs(args.display_secs);

    let spooler = Arc::new(PrintSpooler::open(
        &config,
        Arc::new(QrPngEncoder::default()),
    )?);
    let state = ApiState {
        spooler: spooler.clone(),
    };

    let shutdown = install_shutdown_handler();

    let printer = tokio::spawn(serve(
        "printer",
        config.printer_addr,
        printer_router(state.clone()),
        shutdown.clone(),
    ));
    let display = tokio::spawn(serve(
        "display",
        config.display_addr,
        display_router(state),
        shutdown.clone(),
    ));

    if !args.no_watcher {
        tokio::spawn(run_watcher(
            config.watcher.clone(),
            spooler.clone(),
            shutdown.clone(),
        ));
    }

    if args.log_display {
        tokio::spawn(run_display_session(
            spooler,
            Arc::new(LogSurface),
            Duration::from_millis(config.poll_interval_ms),
            Duration::from_secs(config.display_secs),
            shutdown.clone(),
        ));
    }

    tracing::info!(
        printer_addr = %config.printer_addr,
        display_addr = %config.display_addr,
        "qrspool running; QR codes shown for {} seconds",
        config.display_secs
    );

    printer.await?;
    display.await?;
    Ok(())
}

async fn handle_print(client: &ClientArgs, text: String) {
    let http = reqwest::Client::new();
    let result = http
        .post(format!("{}/print", client.addr))
        .json(&serde_json::json!({ "content": text }))
        .send()
        .await;

    match result {
        Ok(resp) if resp.status().is_success() => match resp.json::<PrintReply>().await {
            Ok(reply) => {
                println!("Print job accepted!");
                println!("Job number: {}", reply.file_number);
                println!("QR code:    {}", reply.filename);
            }
            Err(e) => {
                eprintln!("Error: Unexpected response from printer service: {}", e);
                std::process::exit(1);
            }
        },
        Ok(resp) => {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            eprintln!("Error: Print request rejected ({}): {}", status, body);
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("Error: {}", qrspool::SpoolError::from(e));
            eprintln!("Hint: Is `qrspool serve` running at {}?", client.addr);
            std::process::exit(1);
        }
    }
}

async fn handle_latest(client: &ClientArgs) {
    let http = reqwest::Client::new();
    let result = http.get(format!("{}/last_qr", client.addr)).send().await;

    match result {
        Ok(resp) => match resp.json::<LastQrReply>().await {
            Ok(reply) if reply.exists => {
                println!("Latest job: #{}", reply.file_number.unwrap_or_default());
                println!("QR code:    {}", reply.filename.unwrap_or_default());
            }
            Ok(_) => {
                println!("No print jobs yet.");
            }
            Err(e) => {
                eprintln!("Error: Unexpected response from printer service: {}", e);
                std::process::exit(1);
            }
        },
        Err(e) => {
            eprintln!("Error: {}", qrspool::SpoolError::from(e));
            std::process::exit(1);
        }
    }
}
