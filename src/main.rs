mod calc;
mod cli;
mod config;
mod ipc;
mod logging;
mod reports;
mod roster;
mod seed;
mod store;

use clap::Parser;
use serde_json::json;
use std::io::{self, BufRead, Write};

fn main() {
    let args = cli::Args::parse();
    let state = match startup(&args) {
        Ok(v) => v,
        Err(e) => {
            eprintln!("attendanced: {e:#}");
            std::process::exit(1);
        }
    };
    serve(state);
}

fn startup(args: &cli::Args) -> anyhow::Result<ipc::AppState> {
    let config = config::Config::load_or_default(args.config.as_deref())?;
    let level = args.log_level.as_deref().unwrap_or(&config.log.level);
    logging::init_logging(level)?;

    let seed_sample = args.sample_data || config.seed.sample_data;
    let mut state = ipc::AppState::new(config);
    if seed_sample {
        seed::load_sample_data(&mut state.roster, &mut state.store)?;
    }
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        records = state.store.len(),
        students = state.roster.len(),
        "attendanced ready"
    );
    Ok(state)
}

fn serve(mut state: ipc::AppState) {
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(v) => v,
            Err(e) => {
                tracing::error!(error = %e, "stdin read failed");
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }

        let resp = match serde_json::from_str::<ipc::Request>(&line) {
            Ok(req) => ipc::handle_request(&mut state, req),
            Err(e) => {
                // No id to echo back.
                tracing::warn!(error = %e, "bad request line");
                json!({
                    "ok": false,
                    "error": { "code": "bad_json", "message": e.to_string() }
                })
            }
        };

        let _ = writeln!(
            stdout,
            "{}",
            serde_json::to_string(&resp).unwrap_or_else(|_| "{\"ok\":false}".to_string())
        );
        let _ = stdout.flush();
    }
    tracing::info!("stdin closed, shutting down");
}
