use keel_governance::Governance;
use serde::Serialize;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::LinkCommands;
use crate::output::output;

#[derive(Debug, Serialize)]
struct UnlinkResponse<'a> {
    decision_id: &'a str,
    component_id: &'a str,
    removed: bool,
}

/// Handle `keel link`.
pub async fn handle(action: &LinkCommands, gov: &Governance, flags: &GlobalFlags) -> anyhow::Result<()> {
    match action {
        LinkCommands::Add {
            decision_id,
            component_id,
            inferred,
        } => {
            let link = if *inferred {
                gov.link_inferred(decision_id, component_id).await?
            } else {
                gov.link_to_component(decision_id, component_id).await?
            };
            output(&link, flags.format)
        }
        LinkCommands::Remove {
            decision_id,
            component_id,
        } => {
            let removed = gov.unlink_from_component(decision_id, component_id).await?;
            output(
                &UnlinkResponse {
                    decision_id,
                    component_id,
                    removed,
                },
                flags.format,
            )
        }
        LinkCommands::List { component_id } => output(
            &gov.get_decisions_by_component(component_id).await?,
            flags.format,
        ),
    }
}
