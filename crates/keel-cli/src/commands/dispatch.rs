use keel_governance::Governance;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::Commands;
use crate::commands;

/// Dispatch a parsed command to the corresponding handler module.
pub async fn dispatch(
    command: Commands,
    gov: &Governance,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match command {
        Commands::Decision { action } => commands::decision::handle(action, gov, flags).await,
        Commands::Link { action } => commands::link::handle(&action, gov, flags).await,
        Commands::Component { action } => commands::component::handle(&action, gov, flags).await,
        Commands::Commit { action } => commands::component::handle_commit(&action, gov, flags).await,
        Commands::Discussion { action } => commands::discussion::handle(&action, gov, flags).await,
        Commands::Risk { action } => commands::risk::handle(&action, gov, flags).await,
        Commands::Audit(args) => commands::audit::handle(&args, gov, flags).await,
    }
}
