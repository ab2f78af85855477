use serde::{Deserialize, Serialize};
use std::path::Path;

pub const ENV_BASE_URL: &str = "FOCUSFLOW_BASE_URL";
pub const ENV_PAGE_SIZE: &str = "FOCUSFLOW_PAGE_SIZE";

const MAX_PAGE_SIZE: u32 = 100;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}

/// Fallback texts. Unrecognized keys in a config file are rejected.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Placeholders {
    pub unknown_source: String,
    pub no_subject: String,
    pub loading_feed: String,
    pub summary_pending: String,
    pub summary_missing: String,
    pub unknown_sender: String,
    pub no_content: String,
}

impl Default for Placeholders {
    fn default() -> Self {
        Self {
            unknown_source: "Unknown".to_string(),
            no_subject: "(no subject)".to_string(),
            loading_feed: "Loading conversations…".to_string(),
            summary_pending: "Fetching summary…".to_string(),
            summary_missing: "No summary yet".to_string(),
            unknown_sender: "Unknown sender".to_string(),
            no_content: "(no content)".to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct DashboardConfig {
    pub base_url: String,
    pub conversations_path: String,
    /// `{id}` is replaced with the conversation id.
    pub conversation_path: String,
    pub actions_path: String,
    pub messages_path: String,
    pub page_size: u32,
    pub placeholders: Placeholders,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            conversations_path: "/focusflow/api/conversations/".to_string(),
            conversation_path: "/focusflow/api/conversations/{id}/".to_string(),
            actions_path: "/focusflow/api/actions/".to_string(),
            messages_path: "/focusflow/api/messages/".to_string(),
            page_size: MAX_PAGE_SIZE,
            placeholders: Placeholders::default(),
        }
    }
}

impl DashboardConfig {
    /// Defaults, then the optional JSON file, then environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => {
                let raw = std::fs::read_to_string(path)?;
                serde_json::from_str(&raw)?
            }
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn apply_env(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(base_url) = lookup(ENV_BASE_URL) {
            self.base_url = base_url;
        }
        if let Some(raw) = lookup(ENV_PAGE_SIZE) {
            self.page_size = raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
                key: ENV_PAGE_SIZE.to_string(),
                value: raw.clone(),
            })?;
        }
        Ok(())
    }

    pub fn effective_page_size(&self) -> u32 {
        self.page_size.clamp(1, MAX_PAGE_SIZE)
    }

    pub fn conversations_locator(&self) -> String {
        format!(
            "{}?page_size={}",
            self.conversations_path,
            self.effective_page_size()
        )
    }

    pub fn conversation_locator(&self, id: i64) -> String {
        self.conversation_path.replace("{id}", &id.to_string())
    }

    pub fn actions_locator(&self) -> String {
        format!("{}?page_size={}", self.actions_path, self.effective_page_size())
    }

    pub fn messages_locator(&self, conversation_id: i64) -> String {
        format!(
            "{}?conversation_id={}&page_size={}",
            self.messages_path,
            conversation_id,
            self.effective_page_size()
        )
    }
}
