//! Backup command handler.

use serde_json::Value;
use wpe_api::WpEngineClient;

use crate::cli::{BackupArgs, GlobalOpts};
use crate::config::Resolved;
use crate::error::CliError;
use crate::output;

/// One-line summary of a backup response (`{id, status}` when present).
fn summary(resp: &Value) -> String {
    match (resp.get("id").and_then(Value::as_str), resp.get("status").and_then(Value::as_str)) {
        (Some(id), Some(status)) => format!("Backup {id}: {status}"),
        (Some(id), None) => format!("Backup {id} requested"),
        _ => "Backup requested".into(),
    }
}

pub async fn handle(
    client: &WpEngineClient,
    args: BackupArgs,
    resolved: &Resolved,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let notify = args
        .notify
        .or_else(|| resolved.notification_email.clone())
        .ok_or_else(|| CliError::Validation {
            field: "notify".into(),
            reason: "no notification address; pass --notify or set \
                     defaults.notification_email in the config"
                .into(),
        })?;

    let resp = client
        .create_backup(&args.install_id, &args.description, &notify)
        .await?;

    let out = output::render_single(resolved.output, &resp, summary)?;
    output::print_output(&out, global.quiet);
    Ok(())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn summary_uses_id_and_status() {
        assert_eq!(
            summary(&json!({ "id": "b-1", "status": "requested" })),
            "Backup b-1: requested"
        );
        assert_eq!(summary(&json!({ "id": "b-2" })), "Backup b-2 requested");
        assert_eq!(summary(&Value::Null), "Backup requested");
    }
}
