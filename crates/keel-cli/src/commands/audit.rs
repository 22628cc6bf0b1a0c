use keel_db::repos::audit::AuditFilter;
use keel_governance::Governance;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::AuditArgs;
use crate::commands::shared::parse_opt_enum;
use crate::output::output;

/// Handle `keel audit`.
pub async fn handle(args: &AuditArgs, gov: &Governance, flags: &GlobalFlags) -> anyhow::Result<()> {
    let filter = AuditFilter {
        entity_type: parse_opt_enum(args.entity_type.as_deref(), "entity type")?,
        entity_id: args.entity_id.clone(),
        action: parse_opt_enum(args.action.as_deref(), "action")?,
        limit: args.limit,
    };
    output(&gov.audit_log(&filter).await?, flags.format)
}
