use clap::Subcommand;

/// Risk scoring commands.
#[derive(Clone, Debug, Subcommand)]
pub enum RiskCommands {
    /// Score one component.
    Component { id: String },
    /// Score every component of a project.
    Project { project_id: String },
    /// Components at or above a severity tier.
    High {
        project_id: String,
        #[arg(long, default_value = "high")]
        min_severity: String,
    },
}
