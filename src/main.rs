use std::process::ExitCode;

use manager_doctors::config::AppConfig;

#[tokio::main]
async fn main() -> ExitCode {
    manager_doctors::init_tracing();

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Configuration error: {e}");
            return ExitCode::FAILURE;
        }
    };

    match manager_doctors::run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("Doctors service failed: {e}");
            ExitCode::FAILURE
        }
    }
}
