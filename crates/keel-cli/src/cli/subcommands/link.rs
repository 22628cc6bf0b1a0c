use clap::Subcommand;

/// Component-decision link commands.
#[derive(Clone, Debug, Subcommand)]
pub enum LinkCommands {
    /// Link a decision to a component.
    Add {
        decision_id: String,
        component_id: String,
        /// Mark the link as inferred rather than user-requested.
        #[arg(long)]
        inferred: bool,
    },
    /// Remove a link.
    Remove {
        decision_id: String,
        component_id: String,
    },
    /// Decisions linked to a component, newest first.
    List { component_id: String },
}
