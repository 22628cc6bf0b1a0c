use clap::Parser;

pub mod global;
pub mod root_commands;
pub mod subcommands;

pub use global::{GlobalFlags, OutputFormat};
pub use root_commands::Commands;

/// Top-level CLI parser for the `keel` binary.
#[derive(Debug, Parser)]
#[command(
    name = "keel",
    version,
    about = "Keel - architecture decision records and component risk"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format: json, raw
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Quiet mode (errors only)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose mode (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Database path (overrides storage.db_path)
    #[arg(long, global = true)]
    pub db: Option<String>,
}

impl Cli {
    /// Extract ergonomic global flags struct for command handlers.
    #[must_use]
    pub fn global_flags(&self) -> GlobalFlags {
        GlobalFlags {
            format: self.format,
            quiet: self.quiet,
            verbose: self.verbose,
            db: self.db.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::{CommandFactory, Parser};
    use pretty_assertions::assert_eq;

    use super::subcommands::{DecisionCommands, LinkCommands, RiskCommands};
    use super::{Cli, Commands, OutputFormat};

    #[test]
    fn clap_command_tree_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_flags_parse_before_subcommand() {
        let cli = Cli::try_parse_from([
            "keel",
            "--format",
            "raw",
            "--verbose",
            "--db",
            "/tmp/keel.db",
            "decision",
            "get",
            "dec-1",
        ])
        .expect("cli should parse");

        assert_eq!(cli.format, OutputFormat::Raw);
        assert!(cli.verbose);
        assert_eq!(cli.global_flags().db.as_deref(), Some("/tmp/keel.db"));
        assert!(matches!(
            cli.command,
            Commands::Decision {
                action: DecisionCommands::Get { .. }
            }
        ));
    }

    #[test]
    fn global_flags_parse_after_subcommand() {
        let cli = Cli::try_parse_from(["keel", "risk", "project", "prj", "--quiet"])
            .expect("cli should parse");

        assert_eq!(cli.format, OutputFormat::Json);
        assert!(cli.quiet);
        assert!(matches!(
            cli.command,
            Commands::Risk {
                action: RiskCommands::Project { .. }
            }
        ));
    }

    #[test]
    fn output_format_rejects_invalid_value() {
        let parsed = Cli::try_parse_from(["keel", "--format", "table", "audit"]);
        assert!(parsed.is_err());
    }

    #[test]
    fn create_collects_repeated_flags() {
        let cli = Cli::try_parse_from([
            "keel",
            "decision",
            "create",
            "--project",
            "prj",
            "--title",
            "Use libSQL",
            "--context",
            "c",
            "--decision",
            "d",
            "--rationale",
            "r",
            "--consequences",
            "q",
            "--created-by",
            "ada",
            "--tag",
            "storage",
            "--tag",
            "db",
            "--component",
            "cmp-1",
        ])
        .expect("cli should parse");

        let Commands::Decision {
            action: DecisionCommands::Create(args),
        } = cli.command
        else {
            panic!("expected decision create");
        };
        assert_eq!(args.tag, vec!["storage", "db"]);
        assert_eq!(args.component, vec!["cmp-1"]);
        assert_eq!(args.status, None);
    }

    #[test]
    fn link_add_accepts_inferred_flag() {
        let cli = Cli::try_parse_from(["keel", "link", "add", "dec-1", "cmp-1", "--inferred"])
            .expect("cli should parse");
        assert!(matches!(
            cli.command,
            Commands::Link {
                action: LinkCommands::Add { inferred: true, .. }
            }
        ));
    }

    #[test]
    fn high_risk_defaults_to_high() {
        let cli = Cli::try_parse_from(["keel", "risk", "high", "prj"]).expect("cli should parse");
        let Commands::Risk {
            action: RiskCommands::High { min_severity, .. },
        } = cli.command
        else {
            panic!("expected risk high");
        };
        assert_eq!(min_severity, "high");
    }
}
