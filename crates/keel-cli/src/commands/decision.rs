use std::collections::BTreeSet;

use keel_core::enums::DecisionStatus;
use keel_governance::{DecisionUpdateBuilder, Governance, NewDecision};
use serde::Serialize;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::{CreateDecisionArgs, DecisionCommands, UpdateDecisionArgs};
use crate::commands::shared::{parse_enum, parse_opt_enum};
use crate::output::output;

#[derive(Debug, Serialize)]
struct DeletedResponse<'a> {
    deleted: &'a str,
}

/// Handle `keel decision`.
pub async fn handle(
    action: DecisionCommands,
    gov: &Governance,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match action {
        DecisionCommands::Create(args) => create(args, gov, flags).await,
        DecisionCommands::Update(args) => update(args, gov, flags).await,
        DecisionCommands::Supersede { old_id, new_id } => {
            output(&gov.supersede(&old_id, &new_id).await?, flags.format)
        }
        DecisionCommands::Detach { id } => {
            output(&gov.detach_supersession(&id).await?, flags.format)
        }
        DecisionCommands::Delete { id } => {
            gov.delete_decision(&id).await?;
            output(&DeletedResponse { deleted: &id }, flags.format)
        }
        DecisionCommands::Get { id } => output(&gov.get_decision_by_id(&id).await?, flags.format),
        DecisionCommands::List { project, status } => {
            let status: Option<DecisionStatus> = parse_opt_enum(status.as_deref(), "status")?;
            output(
                &gov.get_decisions_by_project(&project, status).await?,
                flags.format,
            )
        }
        DecisionCommands::Chain { id } => {
            output(&gov.get_supersession_chain(&id).await?, flags.format)
        }
    }
}

async fn create(
    args: CreateDecisionArgs,
    gov: &Governance,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let input = NewDecision {
        project_id: args.project,
        title: args.title,
        context: args.context,
        decision: args.decision,
        rationale: args.rationale,
        consequences: args.consequences,
        created_by: args.created_by,
        status: parse_opt_enum(args.status.as_deref(), "status")?,
        tags: args.tag.into_iter().collect(),
        linked_component_ids: args.component,
    };
    output(&gov.create_decision(input).await?, flags.format)
}

async fn update(
    args: UpdateDecisionArgs,
    gov: &Governance,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let mut builder = DecisionUpdateBuilder::new();
    if let Some(title) = args.title {
        builder = builder.title(title);
    }
    if let Some(context) = args.context {
        builder = builder.context(context);
    }
    if let Some(decision) = args.decision {
        builder = builder.decision(decision);
    }
    if let Some(rationale) = args.rationale {
        builder = builder.rationale(rationale);
    }
    if let Some(consequences) = args.consequences {
        builder = builder.consequences(consequences);
    }
    if let Some(status) = args.status.as_deref() {
        builder = builder.status(parse_enum(status, "status")?);
    }
    if args.clear_tags {
        builder = builder.tags(BTreeSet::new());
    } else if !args.tag.is_empty() {
        builder = builder.tags(args.tag.into_iter().collect());
    }

    output(&gov.update_decision(&args.id, builder.build()).await?, flags.format)
}
