use clap::Subcommand;

/// Discussion thread commands.
#[derive(Clone, Debug, Subcommand)]
pub enum DiscussionCommands {
    /// Open a thread on a component or decision.
    Open {
        #[arg(long)]
        project: String,
        /// component or decision
        #[arg(long)]
        anchor_type: String,
        #[arg(long)]
        anchor: String,
        #[arg(long)]
        title: String,
    },
    /// Resolve a thread.
    Resolve { id: String },
}
