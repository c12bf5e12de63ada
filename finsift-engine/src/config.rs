use config::{Config, ConfigError, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use finsift_extractors::{ArbiterConfig, LedgerAccount};

/// Engine tunables. Every field has a usable default; a TOML file only
/// needs the keys it overrides.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Sender domains whose documents are ignored outright.
    pub denylisted_domains: Vec<String>,
    pub arbiter: ArbiterConfig,
    pub attachments: AttachmentBudget,
    /// Applied to every remote capability call.
    pub remote_timeout_secs: u64,
    /// Off means unmatched documents wait for manual review instead of
    /// being routed automatically.
    pub auto_route_exceptions: bool,
    /// Ledger accounts for categorization, in tie-break order.
    pub accounts: Vec<LedgerAccount>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AttachmentBudget {
    /// Hard cap on fetched bytes per attachment; text types are truncated
    /// to it, layout documents over it are skipped.
    pub max_bytes: u64,
    /// Pages a renderer may rasterize for a visual surrogate.
    pub max_pages: u32,
    /// Hard cap on extracted characters per attachment.
    pub max_chars: usize,
    /// How many triaged attachments to attempt extraction on.
    pub top_candidates: usize,
    /// A text-quality score at or above this stops further attempts.
    pub early_stop_quality: i32,
}

impl Default for AttachmentBudget {
    fn default() -> Self {
        Self {
            max_bytes: 4 * 1024 * 1024,
            max_pages: 10,
            max_chars: 20_000,
            top_candidates: 3,
            early_stop_quality: 70,
        }
    }
}

fn default_accounts() -> Vec<LedgerAccount> {
    vec![
        LedgerAccount::new(
            "Software & SaaS",
            &["software", "cloud", "hosting", "saas", "subscription", "license"],
        ),
        LedgerAccount::new(
            "Utilities",
            &["electric", "water", "gas", "internet", "phone", "telecom"],
        ),
        LedgerAccount::new(
            "Office Supplies",
            &["office", "supplies", "stationery", "furniture"],
        ),
        LedgerAccount::new(
            "Travel",
            &["flight", "hotel", "airline", "uber", "taxi", "rail", "mileage"],
        ),
        LedgerAccount::new(
            "Professional Services",
            &["consulting", "legal", "accounting", "audit", "advisory"],
        ),
        LedgerAccount::new(
            "Marketing",
            &["marketing", "advertising", "ads", "campaign", "sponsorship"],
        ),
    ]
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            denylisted_domains: Vec::new(),
            arbiter: ArbiterConfig::default(),
            attachments: AttachmentBudget::default(),
            remote_timeout_secs: 10,
            auto_route_exceptions: false,
            accounts: default_accounts(),
        }
    }
}

impl EngineConfig {
    /// Load from the user config directory, writing a commented default
    /// file on first run.
    pub fn load() -> Result<(Self, PathBuf), ConfigError> {
        let config_path = get_config_path();
        let config = Self::load_from(&config_path)?;
        Ok((config, config_path))
    }

    pub fn load_from(config_path: &Path) -> Result<Self, ConfigError> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                ConfigError::Message(format!("Failed to create config directory: {e}"))
            })?;
        }

        if !config_path.exists() {
            let default_config = r#"
# Sender domains whose documents are ignored outright
denylisted_domains = []

# Applied to every remote capability call
remote_timeout_secs = 10

# Route unmatched documents automatically instead of waiting for review
auto_route_exceptions = false

[arbiter]
low_confidence_floor = 18
vendor_margin = 5
amount_margin = 8
invoice_margin = 5
date_margin = 5

[attachments]
max_bytes = 4194304
max_pages = 10
max_chars = 20000
top_candidates = 3
early_stop_quality = 70

# [[accounts]]
# name = "Software & SaaS"
# keywords = ["software", "cloud", "hosting"]
"#;
            std::fs::write(config_path, default_config).map_err(|e| {
                ConfigError::Message(format!("Failed to write default config: {e}"))
            })?;
        }

        let builder = Config::builder()
            .add_source(File::from(config_path.to_path_buf()))
            .build()?;

        let mut config: EngineConfig = builder.try_deserialize()?;
        if config.accounts.is_empty() {
            config.accounts = default_accounts();
        }
        Ok(config)
    }
}

pub fn get_config_path() -> PathBuf {
    if let Some(config_dir) = dirs::config_dir() {
        config_dir.join("finsift").join("engine.toml")
    } else {
        PathBuf::from("engine.toml")
    }
}
