use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "rankgate",
    version,
    about = "Tier ladder and scan entitlement checks for perception scores"
)]
pub struct Cli {
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
    #[arg(long, global = true, help = "Output machine-readable JSON")]
    pub json: bool,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Rank a score and show the distance to the next rank
    Classify {
        #[arg(allow_negative_numbers = true)]
        score: f64,
    },
    /// Show display metadata for a rank name
    Tier { name: String },
    /// List the configured ladder
    Ladder,
    /// List the configured plans, lowest first
    Plans,
    /// Compute remaining scans for a plan
    Quota(UsageArgs),
    /// Count the markers a plan reveals
    Markers {
        #[arg(long)]
        plan: String,
        #[arg(long)]
        total: Option<u32>,
    },
    /// Build a result card from an analyzer JSON file
    Card {
        #[arg(long)]
        analysis: PathBuf,
        #[command(flatten)]
        usage: UsageArgs,
    },
    /// Write a default rankgate.toml to the current directory
    Init,
}

#[derive(Debug, Args, Clone)]
pub struct UsageArgs {
    #[arg(long)]
    pub plan: String,
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    pub lifetime_used: i64,
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    pub monthly_used: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_quota_with_negative_usage() {
        let cli = Cli::try_parse_from([
            "rankgate",
            "quota",
            "--plan",
            "free",
            "--lifetime-used",
            "-2",
        ])
        .expect("valid args");

        match cli.command {
            Commands::Quota(usage) => {
                assert_eq!(usage.plan, "free");
                assert_eq!(usage.lifetime_used, -2);
                assert_eq!(usage.monthly_used, 0);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn global_flags_follow_subcommand() {
        let cli = Cli::try_parse_from(["rankgate", "classify", "7.5", "--json"]).expect("valid args");
        assert!(cli.json);
        assert!(matches!(cli.command, Commands::Classify { score } if score == 7.5));
    }
}
