// src/main.rs
use std::process::ExitCode;

use custo3d_backend::config::AppConfig;
use custo3d_backend::{init_tracing, run, StartupError};
use dotenvy::dotenv;

#[tokio::main]
async fn main() -> ExitCode {
    // Load environment variables before the filter reads RUST_LOG
    dotenv().ok();
    init_tracing();

    let result = match AppConfig::from_env() {
        Ok(config) => run(config).await,
        Err(e) => Err(StartupError::from(e)),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Server stopped");
            ExitCode::FAILURE
        }
    }
}
