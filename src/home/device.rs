use crate::core::error::HomechatError;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info};

/// Command the model may ask the lamp endpoint to perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LampCommand {
    On,
    Off,
    Blink,
}

impl LampCommand {
    pub const ALL: [LampCommand; 3] = [LampCommand::On, LampCommand::Off, LampCommand::Blink];

    pub fn as_str(&self) -> &'static str {
        match self {
            LampCommand::On => "on",
            LampCommand::Off => "off",
            LampCommand::Blink => "blink",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|cmd| cmd.as_str() == s)
    }

    /// The lamp state after a successful command, if the command defines one.
    pub fn resulting_state(&self) -> Option<bool> {
        match self {
            LampCommand::On => Some(true),
            LampCommand::Off => Some(false),
            LampCommand::Blink => None,
        }
    }
}

impl fmt::Display for LampCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// HTTP client for the physical lamp actuator.
#[derive(Debug, Clone)]
pub struct DeviceClient {
    client: Client,
    base_url: String,
    blink_path: Option<String>,
}

impl DeviceClient {
    /// `host` may be a bare host (`192.168.0.29`) or a full base URL.
    pub fn new(host: &str, blink_path: Option<String>) -> Self {
        let host = host.trim_end_matches('/');
        let base_url = if host.starts_with("http://") || host.starts_with("https://") {
            host.to_string()
        } else {
            format!("http://{}", host)
        };
        Self {
            client: Client::new(),
            base_url,
            blink_path: blink_path.map(|p| p.trim_start_matches('/').to_string()),
        }
    }

    #[cfg(test)]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Endpoint path for a command, or `None` when the device has no such endpoint.
    pub fn path_for(&self, command: LampCommand) -> Option<&str> {
        match command {
            LampCommand::On => Some("on"),
            LampCommand::Off => Some("off"),
            LampCommand::Blink => self.blink_path.as_deref(),
        }
    }

    /// Issues the command and returns the endpoint's response body.
    pub async fn send(&self, command: LampCommand) -> Result<String, HomechatError> {
        let path = self.path_for(command).ok_or_else(|| {
            HomechatError::Config(format!("no device endpoint configured for '{}'", command))
        })?;
        let url = format!("{}/{}", self.base_url, path);
        debug!(%url, "sending device command");

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(HomechatError::Network(format!(
                "device endpoint {} returned {}",
                url, status
            )));
        }

        let body = response.text().await?;
        info!(command = %command, "device command accepted");
        Ok(body)
    }
}
