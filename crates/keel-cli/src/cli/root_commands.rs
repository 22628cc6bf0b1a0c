use clap::{Args, Subcommand};

use crate::cli::subcommands::{
    CommitCommands, ComponentCommands, DecisionCommands, DiscussionCommands, LinkCommands,
    RiskCommands,
};

/// Top-level command tree.
#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    /// Decision records and supersession chains.
    Decision {
        #[command(subcommand)]
        action: DecisionCommands,
    },
    /// Component-decision links.
    Link {
        #[command(subcommand)]
        action: LinkCommands,
    },
    /// Architecture components.
    Component {
        #[command(subcommand)]
        action: ComponentCommands,
    },
    /// Commit tags.
    Commit {
        #[command(subcommand)]
        action: CommitCommands,
    },
    /// Discussion threads.
    Discussion {
        #[command(subcommand)]
        action: DiscussionCommands,
    },
    /// Component risk scores.
    Risk {
        #[command(subcommand)]
        action: RiskCommands,
    },
    /// Query the audit trail.
    Audit(AuditArgs),
}

#[derive(Clone, Debug, Args)]
pub struct AuditArgs {
    #[arg(long)]
    pub entity_type: Option<String>,
    #[arg(long)]
    pub entity_id: Option<String>,
    #[arg(long)]
    pub action: Option<String>,
    #[arg(short, long)]
    pub limit: Option<u32>,
}
