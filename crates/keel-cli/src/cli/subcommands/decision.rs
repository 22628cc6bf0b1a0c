use clap::{Args, Subcommand};

/// Decision record commands.
#[derive(Clone, Debug, Subcommand)]
pub enum DecisionCommands {
    /// Create a decision record.
    Create(CreateDecisionArgs),
    /// Update fields or status of a decision.
    Update(UpdateDecisionArgs),
    /// Mark OLD_ID superseded by NEW_ID.
    Supersede { old_id: String, new_id: String },
    /// Break the supersession edge out of a superseded decision.
    Detach { id: String },
    /// Delete an unchained decision.
    Delete { id: String },
    /// Get a decision by ID.
    Get { id: String },
    /// List decisions of a project.
    List {
        #[arg(long)]
        project: String,
        #[arg(long)]
        status: Option<String>,
    },
    /// Show the supersession chain containing a decision.
    Chain { id: String },
}

#[derive(Clone, Debug, Args)]
pub struct CreateDecisionArgs {
    #[arg(long)]
    pub project: String,
    #[arg(long)]
    pub title: String,
    #[arg(long)]
    pub context: String,
    #[arg(long)]
    pub decision: String,
    #[arg(long)]
    pub rationale: String,
    #[arg(long)]
    pub consequences: String,
    #[arg(long)]
    pub created_by: String,
    /// Initial status: proposed (default) or accepted.
    #[arg(long)]
    pub status: Option<String>,
    #[arg(long)]
    pub tag: Vec<String>,
    /// Component to link on creation (repeatable).
    #[arg(long)]
    pub component: Vec<String>,
}

#[derive(Clone, Debug, Args)]
pub struct UpdateDecisionArgs {
    pub id: String,
    #[arg(long)]
    pub title: Option<String>,
    #[arg(long)]
    pub context: Option<String>,
    #[arg(long)]
    pub decision: Option<String>,
    #[arg(long)]
    pub rationale: Option<String>,
    #[arg(long)]
    pub consequences: Option<String>,
    #[arg(long)]
    pub status: Option<String>,
    /// Replace the tag set (repeatable).
    #[arg(long, conflicts_with = "clear_tags")]
    pub tag: Vec<String>,
    /// Remove every tag.
    #[arg(long)]
    pub clear_tags: bool,
}
