//! JSON-RPC IPC worker for shell operations.
//!
//! Reads line-delimited JSON requests from stdin, dispatches to
//! shellkit_core, writes JSON responses to stdout.

use std::io::{self, BufRead, Write};

use clap::Parser;

use shellkit_cli::logging;
use shellkit_cli::worker::{dispatch, Request, Response};

#[derive(Parser)]
#[command(name = "shellkit-worker", about = "shellkit IPC worker process")]
struct Args {
    /// Enable verbose logging to stderr
    #[arg(short, long)]
    verbose: bool,
}

fn write_response(stdout: &mut impl Write, resp: &Response) {
    if let Ok(json) = serde_json::to_string(resp) {
        let _ = writeln!(stdout, "{json}");
    } else {
        // Serialization failed -- send minimal error response.
        let _ = writeln!(
            stdout,
            r#"{{"id":{},"error":"response serialization failed"}}"#,
            resp.id
        );
    }
    let _ = stdout.flush();
}

fn main() {
    let args = Args::parse();
    logging::init(args.verbose);

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    log::debug!("shellkit-worker: ready");

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(e) => {
                log::warn!("shellkit-worker: stdin read error: {e}");
                break;
            }
        };

        if line.trim().is_empty() {
            continue;
        }

        let req: Request = match serde_json::from_str(&line) {
            Ok(r) => r,
            Err(e) => {
                // Parse error -- use id=0 since we can't extract it.
                let resp = Response::from_outcome(0, Err(format!("invalid JSON: {e}")));
                write_response(&mut stdout, &resp);
                continue;
            }
        };

        log::debug!("shellkit-worker: {} #{}", req.method, req.id);
        let resp = Response::from_outcome(req.id, dispatch(&req.method, &req.params));
        write_response(&mut stdout, &resp);
    }
}
