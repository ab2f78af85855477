use super::FetchError;
use reqwest::Client;

#[derive(Debug, Clone)]
pub struct HttpConfig {
    pub base_url: String,
    client: Client,
}

impl HttpConfig {
    pub fn new(base_url: String) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: Client::new(),
        }
    }

    pub fn url(&self, locator: &str) -> String {
        if locator.starts_with("http://") || locator.starts_with("https://") {
            locator.to_string()
        } else {
            format!("{}{}", self.base_url, locator)
        }
    }
}

pub async fn get_json(config: &HttpConfig, locator: &str) -> Result<serde_json::Value, FetchError> {
    let resp = config
        .client
        .get(config.url(locator))
        .header("Accept", "application/json")
        .send()
        .await?;

    if !resp.status().is_success() {
        return Err(FetchError::Status {
            status: resp.status().as_u16(),
        });
    }

    let text = resp.text().await?;
    serde_json::from_str(&text).map_err(|e| FetchError::Malformed(e.to_string()))
}
