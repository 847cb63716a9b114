//! OWNERS Verifier CLI
//!
//! A command-line tool that validates OWNERS and OWNERS_ALIASES changes of a
//! GitHub pull request, then labels and reviews it.

use clap::Parser;
use std::io::{self, IsTerminal, Write};
use std::process::ExitCode as StdExitCode;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::signal;
use tracing::{Level, debug, error, info};
use tracing_subscriber::EnvFilter;

mod cli;

use cli::Args;
use cli::config::{ExitCode, ValidatedConfig, create_octocrab};
use cli::dry_run::DryRunClient;
use cli::github::OctocrabClient;
use cli::output::{HumanOutput, JsonOutput};
use verify_owners_core::validate::{
    HttpRoster, OwnersVerifier, PullRequestClient, ValidationOutcome,
};

#[tokio::main]
async fn main() -> StdExitCode {
    // Parse command-line arguments
    let args = Args::parse();

    // Initialize tracing
    init_tracing(args.verbose, args.json);

    // Set up signal handling for graceful shutdown
    let terminated = Arc::new(AtomicBool::new(false));
    let terminated_clone = terminated.clone();

    tokio::spawn(async move {
        let ctrl_c = signal::ctrl_c();
        #[cfg(unix)]
        let terminate = async {
            match signal::unix::signal(signal::unix::SignalKind::terminate()) {
                Ok(mut stream) => {
                    stream.recv().await;
                }
                Err(e) => {
                    error!("Failed to install SIGTERM handler: {}", e);
                    std::future::pending::<()>().await;
                }
            }
        };
        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = ctrl_c => {
                info!("Received SIGINT, shutting down...");
            }
            _ = terminate => {
                info!("Received SIGTERM, shutting down...");
            }
        }

        terminated_clone.store(true, Ordering::SeqCst);
    });

    // Run the verifier
    let exit_code = run(args, &terminated).await;

    // Check if we were terminated by signal
    if terminated.load(Ordering::SeqCst) {
        return StdExitCode::from(ExitCode::Terminated as u8);
    }

    StdExitCode::from(i32::from(exit_code) as u8)
}

/// Initialize tracing based on verbosity level.
fn init_tracing(verbosity: u8, json_output: bool) {
    // Don't output logs when using JSON output mode
    if json_output {
        return;
    }

    let level = match verbosity {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let mut filter = EnvFilter::from_default_env().add_directive(level.into());
    for directive in ["octocrab=warn", "hyper=warn", "reqwest=warn"] {
        if let Ok(directive) = directive.parse() {
            filter = filter.add_directive(directive);
        }
    }

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(io::stderr().is_terminal())
        .init();
}

/// Run the verifier with the given arguments.
async fn run(args: Args, terminated: &AtomicBool) -> ExitCode {
    let mut stderr = io::stderr().lock();

    // Validate configuration
    let config = match ValidatedConfig::from_args(&args) {
        Ok(config) => config,
        Err(e) => {
            let use_colors = !args.json && io::stderr().is_terminal();
            write_error(&mut stderr, &e.to_string(), use_colors);
            return ExitCode::StartupFailure;
        }
    };

    let use_colors = !config.json_output && io::stdout().is_terminal();
    let event = &config.event;

    debug!("Validated configuration: {:?}", config.verify_config);
    info!(
        "Pull request: {}/{}#{} ({})",
        event.org(),
        event.repo_name(),
        event.number,
        event.action
    );

    // Create the GitHub client
    let octocrab = match create_octocrab(&args).await {
        Ok(client) => OctocrabClient::new(client),
        Err(e) => {
            write_error(&mut stderr, &e.to_string(), use_colors);
            return ExitCode::StartupFailure;
        }
    };
    let client: Box<dyn PullRequestClient> = if config.dry_run {
        info!("Dry run: labels, reviews and comment deletions are only logged");
        Box::new(DryRunClient::new(octocrab))
    } else {
        Box::new(octocrab)
    };
    let roster = HttpRoster::new(config.verify_config.roster_url.clone());

    if terminated.load(Ordering::SeqCst) {
        return ExitCode::Terminated;
    }

    let verifier = OwnersVerifier::new(client.as_ref(), &roster, config.verify_config.clone());
    let outcome = match verifier.handle_pull_request(event).await {
        Ok(outcome) => outcome,
        Err(e) => {
            error!("Validation run failed: {}", e);
            write_error(&mut stderr, &e.to_string(), use_colors);
            return ExitCode::StartupFailure;
        }
    };

    if terminated.load(Ordering::SeqCst) {
        return ExitCode::Terminated;
    }

    if let Err(e) = write_report(&config, outcome.as_ref()) {
        error!("Failed to write output: {}", e);
        return ExitCode::StartupFailure;
    }

    config.exit_code_for_outcome(outcome.is_some_and(|o| o.has_any_violation()))
}

/// Write the report of a run to stdout.
fn write_report(config: &ValidatedConfig, outcome: Option<&ValidationOutcome>) -> io::Result<()> {
    let mut stdout = io::stdout().lock();
    if config.json_output {
        let repository = format!("{}/{}", config.event.org(), config.event.repo_name());
        JsonOutput::new(repository, config.event.number, outcome, config.dry_run)
            .write(&mut stdout)
    } else {
        let use_colors = io::stdout().is_terminal();
        HumanOutput::new(&mut stdout, use_colors).write_outcome(outcome, config.dry_run)
    }
}

/// Write an error message to the writer.
fn write_error<W: Write>(writer: &mut W, message: &str, use_colors: bool) {
    let _ = HumanOutput::new(writer, use_colors).write_error(message);
}
