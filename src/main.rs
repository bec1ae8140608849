use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use env_logger::Builder;
use log::{error, info, LevelFilter};

use asbgpd::config::DaemonConfig;
use asbgpd::reactor;

/// Simulated inter-AS BGP-style routing daemon.
#[derive(Parser, Debug)]
#[command(name = "asbgpd", version, author)]
struct Cli {
    /// Path to the daemon's TOML config file.
    config_path: PathBuf,

    /// Logging verbosity: -v, -vv, or -vvv.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let (asbgpd_level, other_level) = match cli.verbose {
        0 => (LevelFilter::Info, LevelFilter::Warn),
        1 => (LevelFilter::Debug, LevelFilter::Warn),
        2 => (LevelFilter::Trace, LevelFilter::Warn),
        _ => (LevelFilter::Trace, LevelFilter::Trace),
    };
    Builder::new()
        .filter(Some("asbgpd"), asbgpd_level)
        .filter(None, other_level)
        .init();
    info!("logging at levels {}/{}", asbgpd_level, other_level);

    let config = match DaemonConfig::from_file(&cli.config_path) {
        Ok(config) => config,
        Err(err) => {
            error!("failed to load {}: {}", cli.config_path.display(), err);
            return ExitCode::FAILURE;
        }
    };

    if let Err(err) = reactor::run(config).await {
        error!("reactor exited: {}", err);
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
