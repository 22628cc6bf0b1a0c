use keel_core::enums::Severity;
use keel_governance::Governance;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::RiskCommands;
use crate::commands::shared::parse_enum;
use crate::output::output;

/// Handle `keel risk`.
pub async fn handle(action: &RiskCommands, gov: &Governance, flags: &GlobalFlags) -> anyhow::Result<()> {
    match action {
        RiskCommands::Component { id } => {
            output(&gov.calculate_component_risk(id).await?, flags.format)
        }
        RiskCommands::Project { project_id } => {
            output(&gov.calculate_project_risks(project_id).await?, flags.format)
        }
        RiskCommands::High {
            project_id,
            min_severity,
        } => {
            let min_severity: Severity = parse_enum(min_severity, "severity")?;
            output(
                &gov.get_high_risk_components(project_id, min_severity).await?,
                flags.format,
            )
        }
    }
}
