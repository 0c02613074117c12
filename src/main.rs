//! Host-side helper: `cargo run` builds the wasm bundle into `static/pkg` and
//! serves `static/` on a local port (`PORTFOLIO_PORT`, default 8000).

use std::process::{Command, ExitCode, Stdio};
use std::{env, thread, time::Duration};

use tracing::Level;

fn main() -> ExitCode {
    portfolio_wasm::logging::init(Level::INFO);

    // Only meaningful on non-wasm targets.
    if env::var("TARGET").unwrap_or_default() == "wasm32-unknown-unknown" {
        return ExitCode::SUCCESS;
    }

    tracing::info!("building wasm pkg");
    match Command::new("wasm-pack")
        .args(["build", "--release", "--target", "web", "--out-dir", "static/pkg"])
        .status()
    {
        Ok(status) if status.success() => {}
        Ok(status) => {
            tracing::error!(%status, "wasm-pack finished with errors");
            return ExitCode::FAILURE;
        }
        Err(err) => {
            tracing::warn!(%err, "wasm-pack not found in PATH; serving existing static/pkg");
        }
    }

    let port = env::var("PORTFOLIO_PORT").unwrap_or_else(|_| "8000".to_owned());
    tracing::info!("serving static/ at http://127.0.0.1:{port}");
    let mut server = match Command::new("python3")
        .args(["-m", "http.server", &port, "--directory", "static"])
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
    {
        Ok(child) => child,
        Err(err) => {
            tracing::error!(%err, "failed to start http server");
            return ExitCode::FAILURE;
        }
    };

    // Keep process alive while the server runs.
    loop {
        match server.try_wait() {
            Ok(Some(status)) => {
                tracing::warn!(%status, "http server exited");
                return ExitCode::FAILURE;
            }
            Ok(None) => thread::sleep(Duration::from_secs(1)),
            Err(err) => {
                tracing::error!(%err, "lost track of http server");
                return ExitCode::FAILURE;
            }
        }
    }
}
