use clap::Parser;
use dockwatch::collectors::DockerEventSource;
use dockwatch::config::Config;
use dockwatch::notifiers::MailgunNotifier;
use dockwatch::poller::{EventPoller, SystemClock};
use log::{error, info, warn};
use std::path::PathBuf;
use std::sync::mpsc;
use std::sync::Arc;

/// Command-line arguments for the Docker event monitor
#[derive(Parser)]
#[command(
    name = "dockwatch",
    about = "Docker event monitor - polls the engine's event stream and e-mails summaries",
    long_about = "A daemon that polls the Docker engine's event stream, tallies the \
                  events of each polling window by action, and delivers a summary \
                  e-mail through a transactional mail API whenever events occurred."
)]
struct Cli {
    /// Path to configuration file
    #[arg(
        short,
        long,
        value_name = "FILE",
        help = "Configuration file path (TOML format)"
    )]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(
        short,
        long,
        help = "Enable verbose logging output (sets RUST_LOG=debug)"
    )]
    verbose: bool,
}

impl Cli {
    /// Validate the CLI arguments
    ///
    /// # Returns
    ///
    /// `Ok(())` if all arguments are valid, `Err(String)` with error message otherwise
    fn validate(&self) -> Result<(), String> {
        if let Some(ref config_path) = self.config {
            // Missing files are handled gracefully by Config::load, which
            // warns and falls back to defaults; only reject non-files.
            if config_path.exists() {
                if !config_path.is_file() {
                    return Err(format!(
                        "Configuration path is not a file: {}",
                        config_path.display()
                    ));
                }

                if let Some(extension) = config_path.extension() {
                    if extension != "toml" {
                        warn!(
                            "Configuration file does not have .toml extension: {}",
                            config_path.display()
                        );
                    }
                }
            }
        }

        Ok(())
    }

    /// Convert config path to string safely, handling non-UTF-8 paths
    fn config_path_str(&self) -> Result<Option<&str>, String> {
        match &self.config {
            Some(path) => match path.to_str() {
                Some(path_str) => Ok(Some(path_str)),
                None => Err(format!(
                    "Configuration file path contains invalid UTF-8 characters: {}",
                    path.display()
                )),
            },
            None => Ok(None),
        }
    }
}

fn main() {
    // Parse command-line arguments
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    if cli.verbose {
        std::env::set_var("RUST_LOG", "debug");
    }
    env_logger::init();

    info!("Starting Docker event monitor");

    // Validate CLI arguments
    if let Err(e) = cli.validate() {
        error!("Invalid arguments: {}", e);
        std::process::exit(1);
    }

    // Load configuration with safe path handling
    let config_path = match cli.config_path_str() {
        Ok(path) => path,
        Err(e) => {
            error!("Invalid configuration path: {}", e);
            std::process::exit(1);
        }
    };

    let config = match Config::load(config_path) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    let api_key = match config.email.resolve_api_key() {
        Ok(key) => key,
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    };

    let source = match DockerEventSource::connect() {
        Ok(source) => source,
        Err(e) => {
            error!("Failed to connect to the Docker daemon: {}", e);
            std::process::exit(1);
        }
    };

    let notifier = match MailgunNotifier::new(&config.email, api_key) {
        Ok(notifier) => notifier,
        Err(e) => {
            error!("Failed to initialize the e-mail notifier: {}", e);
            std::process::exit(1);
        }
    };

    let poller = match EventPoller::new(
        &config.poll,
        Arc::new(source),
        Arc::new(notifier),
        Arc::new(SystemClock),
    ) {
        Ok(poller) => poller,
        Err(e) => {
            error!("Failed to initialize the poll loop: {}", e);
            std::process::exit(1);
        }
    };

    // Set up signal handling for graceful shutdown (SIGINT)
    let (shutdown_sender, shutdown_receiver) = mpsc::channel();
    ctrlc::set_handler(move || {
        info!("Received interrupt signal (SIGINT), shutting down gracefully...");
        if let Err(e) = shutdown_sender.send(()) {
            error!("Failed to send shutdown signal: {}", e);
        }
    })
    .expect("Error setting SIGINT handler for graceful shutdown");

    info!("Docker event monitor is running. Press Ctrl+C to stop.");

    if let Err(e) = poller.run(shutdown_receiver) {
        error!("Event collection failed: {}", e);
        std::process::exit(1);
    }

    info!("Docker event monitor shutdown complete");
}
