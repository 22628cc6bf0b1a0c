use keel_core::enums::ComponentKind;
use keel_governance::Governance;
use serde::Serialize;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::{CommitCommands, ComponentCommands};
use crate::commands::shared::{parse_enum, parse_timestamp};
use crate::output::output;

#[derive(Debug, Serialize)]
struct DeletedResponse<'a> {
    deleted: &'a str,
}

#[derive(Debug, Serialize)]
struct CommitTagResponse<'a> {
    component_id: &'a str,
    commit_sha: &'a str,
    tagged: bool,
}

/// Handle `keel component`.
pub async fn handle(
    action: &ComponentCommands,
    gov: &Governance,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match action {
        ComponentCommands::Add {
            project,
            name,
            kind,
        } => {
            let kind: ComponentKind = parse_enum(kind, "kind")?;
            output(&gov.register_component(project, name, kind).await?, flags.format)
        }
        ComponentCommands::Get { id } => output(&gov.get_component(id).await?, flags.format),
        ComponentCommands::List { project } => {
            output(&gov.list_components(project).await?, flags.format)
        }
        ComponentCommands::Delete { id } => {
            gov.delete_component(id).await?;
            output(&DeletedResponse { deleted: id }, flags.format)
        }
    }
}

/// Handle `keel commit`.
pub async fn handle_commit(
    action: &CommitCommands,
    gov: &Governance,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match action {
        CommitCommands::Tag {
            component_id,
            sha,
            at,
        } => {
            let committed_at = parse_timestamp(at.as_deref())?;
            let tagged = gov.tag_commit(component_id, sha, committed_at).await?;
            output(
                &CommitTagResponse {
                    component_id,
                    commit_sha: sha,
                    tagged,
                },
                flags.format,
            )
        }
    }
}
