use anyhow::{bail, Context};
use config::DeployConfig;
use tokio::process::Command;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeployOutcome {
    NotConfigured,
    SkippedPendingChanges,
    Deployed,
}

/// Runs the configured deploy command, unless the working tree of the
/// repository has uncommitted changes.
#[tracing::instrument(skip_all)]
pub async fn deploy_if_clean(config: &DeployConfig) -> anyhow::Result<DeployOutcome> {
    let (Some(repository_root), Some(command)) = (&config.repository_root, &config.command)
    else {
        return Ok(DeployOutcome::NotConfigured);
    };

    let status = Command::new("git")
        .arg("-C")
        .arg(repository_root)
        .args(["status", "--porcelain"])
        .output()
        .await
        .context("could not run git status")?;
    if !status.status.success() {
        bail!(
            "git status failed in {}: {}",
            repository_root.display(),
            String::from_utf8_lossy(&status.stderr).trim()
        );
    }
    if !status.stdout.is_empty() || !status.stderr.is_empty() {
        tracing::info!("pending changes in working tree, skipping deploy");
        return Ok(DeployOutcome::SkippedPendingChanges);
    }

    tracing::info!(%command, "deploying");
    let output = Command::new("sh")
        .arg("-c")
        .arg(command)
        .current_dir(repository_root)
        .output()
        .await
        .with_context(|| format!("could not run deploy command {command:?}"))?;

    let stdout = String::from_utf8_lossy(&output.stdout);
    if !stdout.trim().is_empty() {
        tracing::info!(stdout = %stdout.trim(), "deploy output");
    }
    let stderr = String::from_utf8_lossy(&output.stderr);
    if !stderr.trim().is_empty() {
        tracing::warn!(stderr = %stderr.trim(), "deploy wrote to stderr");
    }
    if !output.status.success() {
        bail!("deploy command exited with {}", output.status);
    }

    Ok(DeployOutcome::Deployed)
}
