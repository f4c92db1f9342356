use std::env;
use std::process::ExitCode;
use tracing::info;
use uniweb_cli::cli::BuiltinHandler;
use uniweb_cli::config::AppConfig;
use uniweb_cli::session::PackageJsonProvider;
use uniweb_cli::{report_fatal, run_cli, setup_logging, Outcome};

#[tokio::main]
async fn main() -> ExitCode {
    // Load environment variables
    dotenv::dotenv().ok();

    // Initialize logging
    setup_logging();

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => return ExitCode::from(report_fatal(&e)),
    };

    let provider = PackageJsonProvider::from_path_override(config.package_json.as_deref());
    let outcome = run_cli(&config, env::args().collect(), &provider, &BuiltinHandler).await;

    match outcome {
        Outcome::Success(code) => {
            info!("Exiting with status {}", code);
            ExitCode::from(code)
        },
        Outcome::FatalError(e) => ExitCode::from(report_fatal(&e)),
    }
}
