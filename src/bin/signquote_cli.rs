//! SignQuote CLI - Bridge interface for the shop front end
//!
//! Commands: products, validate, quote
//! Outputs JSON to stdout, logs to stderr
//! Returns 2 on validation failure

use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use signquote_core::{QuoteEngine, QuoteError, QuoteRequest, SheetRegistry};

#[derive(Parser)]
#[command(name = "signquote-cli")]
#[command(about = "SignQuote CLI - retail pricing and hard-cost quotes")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Directory of <product>.json pricing tabs
    #[arg(short, long, default_value = "sheets")]
    sheets_dir: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// List product lines and whether a pricing tab is loaded
    Products,

    /// Validate a quote request
    Validate {
        /// JSON payload (QuoteRequest)
        #[arg(short, long)]
        payload: String,
    },

    /// Price a quote request
    Quote {
        /// JSON payload (QuoteRequest)
        #[arg(short, long)]
        payload: String,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,signquote_core=info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(s) => println!("{}", s),
        Err(e) => println!("{}", serde_json::json!({ "error": format!("Serialization error: {}", e) })),
    }
}

fn parse_request(payload: &str) -> Result<QuoteRequest, serde_json::Error> {
    serde_json::from_str(payload)
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    let sheets = match SheetRegistry::load_from_dir(&cli.sheets_dir) {
        Ok(s) => s,
        Err(e) => {
            print_json(&serde_json::json!({ "error": format!("Failed to load pricing sheets: {}", e) }));
            return ExitCode::FAILURE;
        }
    };

    let engine = QuoteEngine::new(sheets);

    match cli.command {
        Commands::Products => {
            print_json(&engine.list_products());
            ExitCode::SUCCESS
        }

        Commands::Validate { payload } => {
            let request = match parse_request(&payload) {
                Ok(r) => r,
                Err(e) => {
                    print_json(&serde_json::json!({ "valid": false, "error": format!("Invalid payload: {}", e) }));
                    return ExitCode::FAILURE;
                }
            };

            let result = engine.validate(&request);
            print_json(&result);
            if result.valid {
                ExitCode::SUCCESS
            } else {
                ExitCode::from(2)
            }
        }

        Commands::Quote { payload } => {
            let request = match parse_request(&payload) {
                Ok(r) => r,
                Err(e) => {
                    print_json(&serde_json::json!({ "success": false, "error": format!("Invalid payload: {}", e) }));
                    return ExitCode::FAILURE;
                }
            };

            match engine.quote(&request) {
                Ok(job) => {
                    print_json(&serde_json::json!({ "success": true, "job": job }));
                    ExitCode::SUCCESS
                }
                Err(e) => {
                    print_json(&serde_json::json!({ "success": false, "error": e.to_string() }));
                    match e {
                        QuoteError::InvalidRequest(_) => ExitCode::from(2),
                        _ => ExitCode::FAILURE,
                    }
                }
            }
        }
    }
}
