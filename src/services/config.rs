use crate::domain::constants::CONFIG_FILE;
use crate::domain::models::ZooConfig;
use std::path::Path;

pub const ENV_GIT_PUSH: &str = "MODELZOO_GIT_PUSH";
pub const ENV_PRIMARY_REMOTE: &str = "MODELZOO_PRIMARY_REMOTE";
pub const ENV_SECONDARY_REMOTE: &str = "MODELZOO_SECONDARY_REMOTE";

/// Reads `<root>/modelzoo.toml` (defaults when absent) and applies
/// environment overrides.
pub fn load_config(root: &Path) -> anyhow::Result<ZooConfig> {
    let path = root.join(CONFIG_FILE);
    let cfg = if path.exists() {
        let raw = std::fs::read_to_string(&path)?;
        toml::from_str(&raw)
            .map_err(|e| anyhow::anyhow!("invalid {}: {}", path.display(), e))?
    } else {
        ZooConfig::default()
    };
    apply_env(cfg, |k| std::env::var(k).ok())
}

fn parse_flag(key: &str, raw: &str) -> anyhow::Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => anyhow::bail!("{} must be a boolean, got '{}'", key, other),
    }
}

pub fn apply_env(
    mut cfg: ZooConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> anyhow::Result<ZooConfig> {
    if let Some(raw) = lookup(ENV_GIT_PUSH) {
        cfg.mirror.push = parse_flag(ENV_GIT_PUSH, &raw)?;
    }
    if let Some(url) = lookup(ENV_PRIMARY_REMOTE).filter(|u| !u.trim().is_empty()) {
        cfg.mirror.primary_remote = Some(url.trim().to_string());
    }
    if let Some(url) = lookup(ENV_SECONDARY_REMOTE).filter(|u| !u.trim().is_empty()) {
        cfg.mirror.secondary_remote = Some(url.trim().to_string());
    }
    Ok(cfg)
}
