use crate::core::constants::*;
use crate::core::error::{FetchError, FetchResult};
use crate::pipeline::PipelinePolicy;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// RPC endpoint per supported EVM chain id.
    pub rpc_endpoints: BTreeMap<u64, String>,
    pub esplora_url: String,
    pub binance_api_url: String,
    pub http_timeout_secs: u64,
    pub pipeline_policy: PipelinePolicy,
}

impl Config {
    pub fn from_env() -> FetchResult<Self> {
        dotenv::dotenv().ok();

        let mut rpc_endpoints: BTreeMap<u64, String> = DEFAULT_RPC_ENDPOINTS
            .iter()
            .map(|(id, url)| (*id, url.to_string()))
            .collect();
        for id in DEFAULT_RPC_ENDPOINTS.keys() {
            if let Ok(url) = env::var(format!("CHAINFETCH_RPC_{id}")) {
                rpc_endpoints.insert(*id, url);
            }
        }

        let pipeline_policy = match env::var("CHAINFETCH_PIPELINE_POLICY").as_deref() {
            Ok("strict") => PipelinePolicy::Strict,
            Ok("fallback") | Err(_) => PipelinePolicy::Fallback,
            Ok(other) => {
                return Err(FetchError::Config(format!(
                    "unknown pipeline policy \"{other}\" (expected \"fallback\" or \"strict\")"
                )))
            }
        };

        Ok(Self {
            rpc_endpoints,
            esplora_url: env::var("CHAINFETCH_ESPLORA_URL")
                .unwrap_or_else(|_| DEFAULT_ESPLORA_URL.to_string()),
            binance_api_url: env::var("CHAINFETCH_BINANCE_API_URL")
                .unwrap_or_else(|_| DEFAULT_BINANCE_API_URL.to_string()),
            http_timeout_secs: env::var("CHAINFETCH_HTTP_TIMEOUT_SECS")
                .unwrap_or_default()
                .parse()
                .unwrap_or(DEFAULT_HTTP_TIMEOUT),
            pipeline_policy,
        })
    }

    pub fn validate(&self) -> FetchResult<()> {
        if self.rpc_endpoints.is_empty() {
            return Err(FetchError::Config(
                "at least one RPC endpoint must be configured".to_string(),
            ));
        }

        for (chain_id, url) in &self.rpc_endpoints {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(FetchError::Config(format!(
                    "RPC endpoint for chain {chain_id} is not an HTTP URL: {url}"
                )));
            }
        }

        if self.http_timeout_secs == 0 {
            return Err(FetchError::Config(
                "HTTP timeout must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            rpc_endpoints: DEFAULT_RPC_ENDPOINTS
                .iter()
                .map(|(id, url)| (*id, (*url).to_string()))
                .collect(),
            esplora_url: DEFAULT_ESPLORA_URL.to_string(),
            binance_api_url: DEFAULT_BINANCE_API_URL.to_string(),
            http_timeout_secs: DEFAULT_HTTP_TIMEOUT,
            pipeline_policy: PipelinePolicy::Fallback,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        config.validate().unwrap();
        assert_eq!(config.rpc_endpoints.len(), 3);
        assert!(config.rpc_endpoints.contains_key(&1));
        assert!(config.rpc_endpoints.contains_key(&56));
        assert!(config.rpc_endpoints.contains_key(&137));
    }

    #[test]
    fn test_validate_rejects_empty_endpoints() {
        let config = Config {
            rpc_endpoints: BTreeMap::new(),
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(FetchError::Config(_))));
    }

    #[test]
    fn test_validate_rejects_non_http_endpoint() {
        let mut config = Config::default();
        config
            .rpc_endpoints
            .insert(1, "wss://ethereum.publicnode.com".to_string());
        assert!(matches!(config.validate(), Err(FetchError::Config(_))));
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let config = Config {
            http_timeout_secs: 0,
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(FetchError::Config(_))));
    }
}
