//! Command line interface

use std::path::PathBuf;

use clap::Parser;

use crate::config::DEFAULT_CONFIG_PATH;

#[derive(Parser, Debug)]
#[command(name = "color-follower")]
#[command(about = "Closed-loop color target follower for a two-wheel robot", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Configuration file (TOML); missing files fall back to defaults
    pub config: Option<PathBuf>,

    /// Record motor commands instead of driving GPIO
    #[arg(long)]
    pub dry_run: bool,
}

impl Cli {
    pub fn config_path(&self) -> PathBuf {
        self.config
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["color-follower"]).unwrap();
        assert_eq!(cli.config_path(), PathBuf::from(DEFAULT_CONFIG_PATH));
        assert!(!cli.dry_run);
    }

    #[test]
    fn test_config_path_and_dry_run() {
        let cli = Cli::try_parse_from(["color-follower", "robot.toml", "--dry-run"]).unwrap();
        assert_eq!(cli.config_path(), PathBuf::from("robot.toml"));
        assert!(cli.dry_run);
    }

    #[test]
    fn test_unknown_flag_rejected() {
        assert!(Cli::try_parse_from(["color-follower", "--dryrun"]).is_err());
        assert!(Cli::try_parse_from(["color-follower", "a.toml", "b.toml"]).is_err());
    }

    #[test]
    fn test_help_does_not_parse_to_run() {
        let err = Cli::try_parse_from(["color-follower", "--help"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
    }
}
