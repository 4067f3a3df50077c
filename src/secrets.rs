//! Secret resolution with a fixed precedence order:
//! environment override, then cache, then Secret Manager, then the literal
//! value from the config file. The environment shortcut applies
//! unconditionally, also in production.
//!
//! The final fallback is the config-file literal rather than a second
//! environment lookup: the override in step one already covers
//! environment-based deployments, so a trailing env probe would only
//! re-check a variable that was absent moments earlier.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use base64::Engine;
use serde::Deserialize;

use crate::config::SecretManager;

const CACHE_TTL: Duration = Duration::from_secs(5 * 60);

struct CachedSecret {
    value: String,
    fetched_at: Instant,
}

pub struct SecretStore {
    http: reqwest::Client,
    config: Option<SecretManager>,
    cache: Mutex<HashMap<String, CachedSecret>>,
}

#[derive(Deserialize)]
struct AccessResponse {
    payload: AccessPayload,
}

#[derive(Deserialize)]
struct AccessPayload {
    data: String,
}

impl SecretStore {
    pub fn new(config: Option<SecretManager>, http: reqwest::Client) -> Self {
        Self { http, config, cache: Mutex::new(HashMap::new()) }
    }

    /// Resolve `name` (e.g. `telegram-bot-token`), falling back to
    /// `config_value` when the remote fetch is unavailable or fails.
    pub async fn resolve(
        &self,
        name: &str,
        config_value: Option<&str>,
    ) -> Result<String> {
        if let Some(value) = env_override(name) {
            log::debug!("Using environment override for {name}");
            return Ok(value);
        }
        if let Some(value) = self.cached(name) {
            return Ok(value);
        }
        match self.fetch(name).await {
            Ok(value) => {
                self.cache.lock().unwrap().insert(
                    name.to_string(),
                    CachedSecret {
                        value: value.clone(),
                        fetched_at: Instant::now(),
                    },
                );
                Ok(value)
            }
            Err(e) => match config_value.filter(|v| !v.is_empty()) {
                Some(value) => {
                    log::warn!(
                        "Falling back to config value for {name}: {e:#}"
                    );
                    Ok(value.to_string())
                }
                None => Err(e
                    .context(format!("failed to resolve secret `{name}`"))),
            },
        }
    }

    fn cached(&self, name: &str) -> Option<String> {
        self.cache
            .lock()
            .unwrap()
            .get(name)
            .filter(|c| c.fetched_at.elapsed() < CACHE_TTL)
            .map(|c| c.value.clone())
    }

    async fn fetch(&self, name: &str) -> Result<String> {
        let Some(config) = &self.config else {
            anyhow::bail!("secret manager is not configured");
        };
        let url = format!(
            "{}/v1/projects/{}/secrets/{name}/versions/latest:access",
            config.api_base.trim_end_matches('/'),
            config.project,
        );
        let response: AccessResponse = self
            .http
            .get(url)
            .bearer_auth(&config.access_token)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
            .context("malformed secret manager response")?;
        let data = base64::engine::general_purpose::STANDARD
            .decode(response.payload.data)
            .context("secret payload is not valid base64")?;
        Ok(String::from_utf8(data)
            .context("secret payload is not valid UTF-8")?
            .trim()
            .to_string())
    }
}

/// `telegram-bot-token` is overridden by `TELEGRAM_BOT_TOKEN`.
fn env_override(name: &str) -> Option<String> {
    let var = name.to_uppercase().replace('-', "_");
    std::env::var(var).ok().filter(|v| !v.is_empty())
}
