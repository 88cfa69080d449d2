//! Sync CLI commands implementation
use hearth_core::api::{CliError, SecretKey, SyncStatus};
use hearth_plugins::factory;
use serde_json::{json, Value};

use crate::commands::cli::LoginArgs;
use crate::commands::{print_json, OutputFormat};
use crate::context::AppContext;

/// Handle status command. The sync status is the one reached by this
/// process; nothing is persisted between runs.
pub async fn handle_status(format: OutputFormat, ctx: &AppContext) -> Result<(), CliError> {
    let cfg = ctx.cfg();
    let local = ctx.local();

    let token_source = if cfg.access_token_override.is_some() {
        Some("env")
    } else if local.load_secret(SecretKey::AccessToken).await.is_some() {
        Some("secret_store")
    } else {
        None
    };
    let document_id = local.load_secret(SecretKey::RemoteDocumentId).await;
    let cached = local.load_snapshot().await;
    let configured = ctx.coordinator().has_remote().await;
    let sync_status = if configured {
        ctx.coordinator().status()
    } else {
        SyncStatus::NotConfigured
    };

    let status: Value = json!({
        "data_dir": cfg.data_dir_expanded(),
        "remote_enabled": cfg.remote.enabled,
        "remote_url": cfg.remote.base_url,
        "label": cfg.remote.label,
        "configured": configured,
        "token_source": token_source,
        "document_id": document_id,
        "household": cached.as_ref().map(|s| s.household_name.clone()),
        "updated_at": cached.as_ref().map(|s| s.updated_at),
        "status": sync_status,
    });

    match format {
        OutputFormat::Json => print_json(&status),
        OutputFormat::Text => {
            print!("{}", render_status(&status, &sync_status));
            Ok(())
        }
    }
}

fn render_status(report: &Value, sync_status: &SyncStatus) -> String {
    let text = |key: &str| report[key].as_str().unwrap_or_default().to_string();
    let mut out = format!("Data directory: {}\n", text("data_dir"));

    match (report["household"].as_str(), report["updated_at"].as_i64()) {
        (Some(name), Some(stamp)) => {
            out.push_str(&format!("Household: {} (updated {})\n", name, format_stamp(stamp)))
        }
        _ => out.push_str("Household: none\n"),
    }

    if !report["remote_enabled"].as_bool().unwrap_or(false) {
        out.push_str("Cloud sync: disabled in configuration\n");
    } else if report["configured"].as_bool().unwrap_or(false) {
        out.push_str(&format!("Cloud sync: configured ({})\n", text("remote_url")));
        out.push_str(&format!(
            "Token source: {}\n",
            report["token_source"].as_str().unwrap_or("unknown")
        ));
        out.push_str(&format!(
            "Cloud document: {}\n",
            report["document_id"].as_str().unwrap_or("not yet created")
        ));
    } else {
        out.push_str("Cloud sync: not configured (run `hearth login --token <TOKEN>`)\n");
    }

    out.push_str(&format!("Sync status: {}\n", sync_status));
    out
}

/// Handle sync command
pub async fn handle_sync(ctx: &AppContext) -> Result<(), CliError> {
    let coordinator = ctx.coordinator();
    if !coordinator.has_remote().await {
        println!("Cloud sync not configured; run `hearth login --token <TOKEN>`");
        return Ok(());
    }

    coordinator.initialize().await;
    finish(coordinator.status())
}

/// Handle pull command
pub async fn handle_pull(ctx: &AppContext) -> Result<(), CliError> {
    let status = ctx.coordinator().force_refresh_from_cloud().await;
    if status == SyncStatus::NotConfigured {
        println!("Cloud sync not configured; run `hearth login --token <TOKEN>`");
        return Ok(());
    }
    finish(status)
}

/// Handle login command
pub async fn handle_login(args: LoginArgs, ctx: &AppContext) -> Result<(), CliError> {
    let cfg = ctx.cfg();
    if !cfg.remote.enabled {
        return Err(CliError::Command(
            "cloud sync is disabled in configuration".to_string(),
        ));
    }

    let token = args.token.trim().to_string();
    if token.is_empty() {
        return Err(CliError::Command("access token is empty".to_string()));
    }

    let local = ctx.local();
    local
        .save_secret(SecretKey::AccessToken, &token)
        .await
        .map_err(|e| CliError::Command(format!("failed to store access token: {e}")))?;

    let remote = factory::build_remote_with_token(cfg, local.clone(), token)?;
    let coordinator = ctx.coordinator();
    coordinator.connect_remote(remote).await;
    coordinator.initialize().await;
    finish(coordinator.status())
}

/// Handle logout command
pub async fn handle_logout(ctx: &AppContext) -> Result<(), CliError> {
    ctx.coordinator().disconnect_remote().await;
    println!("Signed out of cloud sync; local data kept");
    Ok(())
}

fn finish(status: SyncStatus) -> Result<(), CliError> {
    match status {
        SyncStatus::Error(message) => Err(CliError::Command(message)),
        other => {
            println!("Sync {}", other);
            Ok(())
        }
    }
}

fn format_stamp(millis: i64) -> String {
    chrono::DateTime::from_timestamp_millis(millis)
        .map(|dt| dt.to_rfc3339())
        .unwrap_or_else(|| millis.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_status_fails_the_command() {
        let err = finish(SyncStatus::error("cloud load failed: timeout")).unwrap_err();
        assert!(err.to_string().contains("cloud load failed"));
        assert!(finish(SyncStatus::success("uploaded")).is_ok());
    }

    #[test]
    fn status_text_includes_sync_status() {
        let report = json!({
            "data_dir": "/tmp/hearth",
            "remote_enabled": true,
            "remote_url": "https://api.github.com",
            "configured": true,
            "token_source": "env",
            "document_id": null,
            "household": "Smiths",
            "updated_at": 0,
        });
        let text = render_status(&report, &SyncStatus::error("cloud load failed: gist not found"));
        assert!(text.contains("Household: Smiths (updated 1970-01-01T00:00:00+00:00)"));
        assert!(text.contains("Cloud document: not yet created"));
        assert!(text.ends_with("Sync status: error: cloud load failed: gist not found\n"));

        let offline = json!({"data_dir": "/tmp/hearth", "remote_enabled": false});
        let text = render_status(&offline, &SyncStatus::NotConfigured);
        assert!(text.contains("Household: none"));
        assert!(text.contains("Cloud sync: disabled in configuration"));
    }

    #[test]
    fn stamps_render_as_rfc3339() {
        assert_eq!(format_stamp(0), "1970-01-01T00:00:00+00:00");
    }
}
