use anyhow::Context;
use clap::Parser;
use rosterd::config::Config;
use rosterd::ipc;
use rosterd::logging;
use rosterd::store::RosterStore;
use std::io::{self, BufRead, Write};

fn main() -> anyhow::Result<()> {
    let config = Config::parse();
    logging::init_logger(config.verbose, config.log_format);
    tracing::debug!(?config, "starting rosterd");

    // Load problems are reported, not fatal: the sidecar starts with an
    // empty roster and the caller can see `loadError` via `roster.open`.
    let (store, report) = RosterStore::open(&config.store);
    if let Some(e) = &report.load_error {
        tracing::warn!(error = %e, "continuing with an empty roster");
    }
    let mut state = ipc::AppState { store: Some(store) };

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(v) => v,
            Err(e) => {
                tracing::error!(error = %e, "failed to read request line");
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }

        let req: ipc::Request = match serde_json::from_str(&line) {
            Ok(v) => v,
            Err(e) => {
                // Can't reply without id.
                let resp = serde_json::json!({
                    "ok": false,
                    "error": { "code": "bad_json", "message": e.to_string() }
                });
                writeln!(stdout, "{resp}").context("failed to write response")?;
                stdout.flush().context("failed to flush stdout")?;
                continue;
            }
        };

        let resp = ipc::handle_request(&mut state, req);
        writeln!(stdout, "{resp}").context("failed to write response")?;
        stdout.flush().context("failed to flush stdout")?;
    }

    tracing::debug!("stdin closed; exiting");
    Ok(())
}
