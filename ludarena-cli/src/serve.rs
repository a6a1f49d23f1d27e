//! Serve command - start the coordinator

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use ludarena_server::{run_server, CoordinatorConfig, ServerConfig};

#[derive(Args)]
pub struct ServeArgs {
    /// Port number to listen on
    #[arg(long, default_value = "8010")]
    pub port: u16,

    /// Directory containing static files for the admin UI
    #[arg(long, default_value = "admin-ui")]
    pub static_dir: PathBuf,

    /// Milliseconds a bot waits before answering
    #[arg(long, default_value = "150")]
    pub bot_delay_ms: u64,

    /// Milliseconds between the games of a match
    #[arg(long, default_value = "1000")]
    pub inter_game_pause_ms: u64,
}

/// Run server command: configure, then block on the coordinator
pub fn run(args: ServeArgs, seed: Option<u64>) -> Result<()> {
    let config = configure_server(&args, seed)?;

    tracing::info!("starting ludarena server on port {}", config.port);

    start_server(config)
}

/// Configure server from command arguments
fn configure_server(args: &ServeArgs, seed: Option<u64>) -> Result<ServerConfig> {
    validate_static_dir(&args.static_dir)?;

    let defaults = CoordinatorConfig::default();
    Ok(ServerConfig {
        port: args.port,
        static_dir: args.static_dir.to_string_lossy().to_string(),
        coordinator: CoordinatorConfig {
            bot_delay_ms: args.bot_delay_ms,
            inter_game_pause_ms: args.inter_game_pause_ms,
            seed: seed.unwrap_or(defaults.seed),
            ..defaults
        },
    })
}

/// Start the server (blocking)
fn start_server(config: ServerConfig) -> Result<()> {
    let runtime = tokio::runtime::Runtime::new()?;

    runtime.block_on(async { run_server(config).await })
}

/// Validate that static directory exists
fn validate_static_dir(path: &PathBuf) -> Result<()> {
    if !path.exists() {
        tracing::warn!(
            "static directory does not exist: {}; the admin UI will 404",
            path.display()
        );
    } else if !path.is_dir() {
        anyhow::bail!(
            "static path exists but is not a directory: {}",
            path.display()
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configure_server_defaults() {
        let args = ServeArgs {
            port: 8010,
            static_dir: PathBuf::from("test_static"),
            bot_delay_ms: 150,
            inter_game_pause_ms: 1000,
        };

        let config = configure_server(&args, Some(7)).unwrap();
        assert_eq!(config.port, 8010);
        assert_eq!(config.static_dir, "test_static");
        assert_eq!(config.coordinator.seed, 7);
    }

    #[test]
    fn test_validate_static_dir_nonexistent() {
        // Should not error, just warn
        let result = validate_static_dir(&PathBuf::from("/nonexistent/path"));
        assert!(result.is_ok());
    }
}
