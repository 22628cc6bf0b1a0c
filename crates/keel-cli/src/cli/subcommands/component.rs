use clap::Subcommand;

/// Component commands.
#[derive(Clone, Debug, Subcommand)]
pub enum ComponentCommands {
    /// Register a component.
    Add {
        #[arg(long)]
        project: String,
        #[arg(long)]
        name: String,
        /// service, database, ui, external or library
        #[arg(long)]
        kind: String,
    },
    /// Get a component by ID.
    Get { id: String },
    /// List components of a project.
    List {
        #[arg(long)]
        project: String,
    },
    /// Delete a component and everything anchored to it.
    Delete { id: String },
}

/// Commit tag commands.
#[derive(Clone, Debug, Subcommand)]
pub enum CommitCommands {
    /// Tag a commit to a component.
    Tag {
        component_id: String,
        sha: String,
        /// Commit time as RFC 3339 (defaults to now).
        #[arg(long)]
        at: Option<String>,
    },
}
