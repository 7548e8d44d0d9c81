use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use crate::http::Timeouts;
use crate::quota::{JsonFileBackend, QuotaPolicy};

/// Upstream lookup API (optional `[upstream]` section).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Lookup endpoint; `regno` is appended as a query parameter.
    pub api_url: String,
    /// Connect timeout in seconds.
    pub connect_timeout_secs: u64,
    /// Whole-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            api_url: "https://codex-ml.tech/api/rc.php".to_string(),
            connect_timeout_secs: 15,
            timeout_secs: 30,
        }
    }
}

impl UpstreamConfig {
    pub fn timeouts(&self) -> Timeouts {
        Timeouts {
            connect: Duration::from_secs(self.connect_timeout_secs),
            total: Duration::from_secs(self.timeout_secs),
        }
    }
}

/// Web form listener (optional `[web]` section).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WebConfig {
    pub bind: String,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8080".to_string(),
        }
    }
}

/// Chat bot settings (optional `[bot]` section).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BotConfig {
    /// Bot API token. `TELEGRAM_BOT_TOKEN` overrides it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    /// User id allowed to run admin commands. `ADMIN_TELEGRAM_ID` overrides it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin_id: Option<String>,
    /// Handle users are told to contact for premium access.
    pub contact_handle: String,
    /// Price line shown in upsell messages, e.g. "₹50".
    pub premium_price: String,
    /// Long-poll timeout for getUpdates, in seconds.
    pub poll_timeout_secs: u64,
    /// Bot API base URL (overridable for tests and proxies).
    pub api_base: String,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            token: None,
            admin_id: None,
            contact_handle: "@MRXISBACK".to_string(),
            premium_price: "₹50".to_string(),
            poll_timeout_secs: 30,
            api_base: "https://api.telegram.org".to_string(),
        }
    }
}

/// Global configuration loaded from `~/.config/rcinfo/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RcConfig {
    /// Quota file; defaults to `~/.local/state/rcinfo/users.json`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quota_path: Option<PathBuf>,
    #[serde(default)]
    pub quota: QuotaPolicy,
    #[serde(default)]
    pub upstream: UpstreamConfig,
    #[serde(default)]
    pub web: WebConfig,
    #[serde(default)]
    pub bot: BotConfig,
}

impl RcConfig {
    /// Configured quota file, or the XDG default.
    pub fn quota_path(&self) -> Result<PathBuf> {
        match &self.quota_path {
            Some(p) => Ok(p.clone()),
            None => JsonFileBackend::default_path(),
        }
    }

    /// Apply secrets and overrides from the environment.
    pub fn apply_env(&mut self) {
        self.apply_vars(|key| std::env::var(key).ok());
    }

    fn apply_vars<F>(&mut self, var: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| var(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        if let Some(token) = non_empty("TELEGRAM_BOT_TOKEN") {
            self.bot.token = Some(token);
        }
        if let Some(admin) = non_empty("ADMIN_TELEGRAM_ID") {
            tracing::info!("admin id taken from ADMIN_TELEGRAM_ID");
            self.bot.admin_id = Some(admin);
        }
        if let Some(url) = non_empty("RCINFO_API_URL") {
            tracing::info!("upstream URL taken from RCINFO_API_URL");
            self.upstream.api_url = url;
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("rcinfo")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
/// Environment overrides are applied on top.
pub fn load_or_init() -> Result<RcConfig> {
    let path = config_path()?;
    let mut cfg = if !path.exists() {
        let default_cfg = RcConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        default_cfg
    } else {
        let data = fs::read_to_string(&path)?;
        toml::from_str(&data).with_context(|| format!("parse config {}", path.display()))?
    };
    cfg.apply_env();
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn default_config_values() {
        let cfg = RcConfig::default();
        assert_eq!(cfg.quota.free_searches, 5);
        assert_eq!(cfg.quota.premium_searches, 50);
        assert_eq!(cfg.upstream.api_url, "https://codex-ml.tech/api/rc.php");
        assert_eq!(cfg.web.bind, "127.0.0.1:8080");
        assert!(cfg.bot.token.is_none());
        assert_eq!(cfg.bot.contact_handle, "@MRXISBACK");
    }

    #[test]
    fn config_toml_roundtrip() {
        let cfg = RcConfig::default();
        let toml = toml::to_string_pretty(&cfg).unwrap();
        assert!(!toml.contains("token"), "secrets are not written by default");
        let parsed: RcConfig = toml::from_str(&toml).unwrap();
        assert_eq!(parsed.quota, cfg.quota);
        assert_eq!(parsed.upstream.timeout_secs, cfg.upstream.timeout_secs);
        assert_eq!(parsed.bot.premium_price, cfg.bot.premium_price);
    }

    #[test]
    fn config_toml_partial_sections() {
        let toml = r#"
            quota_path = "/var/lib/rcinfo/users.json"

            [quota]
            free_searches = 3
            premium_searches = 100

            [web]
            bind = "0.0.0.0:9000"

            [bot]
            contact_handle = "@someone"
        "#;
        let cfg: RcConfig = toml::from_str(toml).unwrap();
        assert_eq!(cfg.quota.free_searches, 3);
        assert_eq!(cfg.quota.premium_searches, 100);
        assert_eq!(cfg.web.bind, "0.0.0.0:9000");
        assert_eq!(cfg.upstream.connect_timeout_secs, 15);
        assert_eq!(cfg.bot.contact_handle, "@someone");
        assert_eq!(cfg.bot.poll_timeout_secs, 30);
        assert_eq!(
            cfg.quota_path().unwrap(),
            PathBuf::from("/var/lib/rcinfo/users.json")
        );
    }

    #[test]
    fn env_overrides_secrets() {
        let vars: HashMap<&str, &str> = [
            ("TELEGRAM_BOT_TOKEN", "123:abc"),
            ("ADMIN_TELEGRAM_ID", " 999 "),
            ("RCINFO_API_URL", ""),
        ]
        .into_iter()
        .collect();
        let mut cfg = RcConfig::default();
        cfg.apply_vars(|k| vars.get(k).map(|v| v.to_string()));
        assert_eq!(cfg.bot.token.as_deref(), Some("123:abc"));
        assert_eq!(cfg.bot.admin_id.as_deref(), Some("999"));
        // Empty values do not clobber the file setting.
        assert_eq!(cfg.upstream.api_url, UpstreamConfig::default().api_url);
    }

    #[test]
    fn upstream_timeouts_from_seconds() {
        let t = UpstreamConfig {
            connect_timeout_secs: 2,
            timeout_secs: 9,
            ..Default::default()
        }
        .timeouts();
        assert_eq!(t.connect, Duration::from_secs(2));
        assert_eq!(t.total, Duration::from_secs(9));
    }
}
