use std::net::{Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

use parley_crypto::SigningKey;

use crate::error::{ServerError, ServerResult};

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    /// Messages retained for resuming listeners.
    pub backlog_capacity: usize,
    /// Outbound queue per connection; a full queue evicts the listener.
    pub sink_queue_depth: usize,
    pub token_ttl_ms: u64,
    /// Hex-encoded Ed25519 secret. Generated per process when absent.
    pub signing_key: Option<String>,
    pub static_dir: Option<PathBuf>,
    pub allow_remote_exit: bool,
    pub ingress: IngressMode,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from((Ipv4Addr::LOCALHOST, 8080)),
            backlog_capacity: 10,
            sink_queue_depth: 64,
            token_ttl_ms: 10 * 60 * 1000,
            signing_key: None,
            static_dir: None,
            allow_remote_exit: false,
            ingress: IngressMode::Local,
        }
    }
}

/// Where chat posts are ordered.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum IngressMode {
    /// In-process loopback log.
    #[default]
    Local,
    /// External ordered log reached over TCP.
    Remote { addr: SocketAddr, topic: String },
}

impl ServerConfig {
    pub fn load(path: &Path) -> ServerResult<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| ServerError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml(&text)
    }

    pub fn from_toml(text: &str) -> ServerResult<Self> {
        let config: Self = toml::from_str(text).map_err(|e| ServerError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> ServerResult<()> {
        if self.backlog_capacity == 0 {
            return Err(ServerError::Config("backlog_capacity must be at least 1".into()));
        }
        if self.sink_queue_depth == 0 {
            return Err(ServerError::Config("sink_queue_depth must be at least 1".into()));
        }
        if self.token_ttl_ms == 0 {
            return Err(ServerError::Config("token_ttl_ms must be positive".into()));
        }
        Ok(())
    }

    /// The configured signing key, or a fresh one for this process only.
    pub fn signing_key(&self) -> ServerResult<SigningKey> {
        match &self.signing_key {
            Some(hex) => Ok(SigningKey::from_hex(hex.trim())?),
            None => {
                warn!("no signing_key configured; tokens will not survive a restart");
                Ok(SigningKey::generate())
            }
        }
    }
}
