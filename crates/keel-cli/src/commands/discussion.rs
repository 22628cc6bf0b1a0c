use keel_core::enums::AnchorType;
use keel_governance::Governance;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::DiscussionCommands;
use crate::commands::shared::parse_enum;
use crate::output::output;

/// Handle `keel discussion`.
pub async fn handle(
    action: &DiscussionCommands,
    gov: &Governance,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match action {
        DiscussionCommands::Open {
            project,
            anchor_type,
            anchor,
            title,
        } => {
            let anchor_type: AnchorType = parse_enum(anchor_type, "anchor type")?;
            let thread = gov
                .open_discussion(project, anchor_type, anchor, title)
                .await?;
            output(&thread, flags.format)
        }
        DiscussionCommands::Resolve { id } => {
            output(&gov.resolve_discussion(id).await?, flags.format)
        }
    }
}
