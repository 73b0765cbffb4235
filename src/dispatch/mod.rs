//! Operation dispatcher: validates a batch, routes every operation to its
//! resolver, runs them all concurrently, and assembles results in the
//! caller's original order.
//!
//! The batch contract is all-or-nothing: the first operation error rejects
//! the whole batch and sibling results are discarded. Only the pipeline's
//! own failures are exempt, and then only under the fallback policy.


use crate::chain::{ProviderRegistry, UtxoIndexClient};
use crate::core::config::Config;
use crate::core::error::{FetchError, FetchResult};
use crate::core::types::{Operation, OperationKind, ResolvedValue};
use crate::pipeline::{self, PipelinePolicy};
use crate::resolvers;
use futures::future;
use log::debug;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DispatchMode {
    Positional,
    Keyed,
}

pub struct Fetcher {
    registry: ProviderRegistry,
    http: reqwest::Client,
    utxo: UtxoIndexClient,
    binance_api_url: String,
    pipeline_policy: PipelinePolicy,
}

impl Fetcher {
    pub fn new(config: Config) -> FetchResult<Self> {
        let registry = ProviderRegistry::from_config(&config)?;
        Self::with_registry(registry, config)
    }

    /// Build a fetcher around an existing registry. This is the seam for
    /// custom chain readers (and for tests).
    pub fn with_registry(registry: ProviderRegistry, config: Config) -> FetchResult<Self> {
        config.validate()?;
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.http_timeout_secs))
            .build()
            .map_err(|err| FetchError::Config(format!("failed to build HTTP client: {err}")))?;
        let utxo = UtxoIndexClient::new(http.clone(), config.esplora_url.clone());

        Ok(Self {
            registry,
            http,
            utxo,
            binance_api_url: config.binance_api_url,
            pipeline_policy: config.pipeline_policy,
        })
    }

    /// Positional mode: `output[i]` corresponds to `batch[i]`.
    pub async fn execute(&self, batch: &[Operation]) -> FetchResult<Vec<ResolvedValue>> {
        self.validate_batch(batch, DispatchMode::Positional)?;
        future::try_join_all(batch.iter().map(|op| self.resolve(op))).await
    }

    /// Keyed mode: every operation must carry a non-empty `name`, and each
    /// result is paired with it. Order still mirrors the input batch.
    pub async fn execute_keyed(
        &self,
        batch: &[Operation],
    ) -> FetchResult<Vec<(String, ResolvedValue)>> {
        self.validate_batch(batch, DispatchMode::Keyed)?;
        future::try_join_all(batch.iter().map(|op| async move {
            let value = self.resolve(op).await?;
            let name = op.name.clone().unwrap_or_default();
            Ok::<_, FetchError>((name, value))
        }))
        .await
    }

    /// Fail-fast preconditions, checked before any task starts.
    fn validate_batch(&self, batch: &[Operation], mode: DispatchMode) -> FetchResult<()> {
        for (index, op) in batch.iter().enumerate() {
            if op.kind == OperationKind::Xpath {
                return Err(FetchError::XpathUnsupported);
            }
            if mode == DispatchMode::Keyed
                && op.name.as_deref().map_or(true, |name| name.trim().is_empty())
            {
                return Err(FetchError::InvalidOperation {
                    index,
                    reason: "keyed dispatch requires a non-empty \"name\"".to_string(),
                });
            }
        }
        Ok(())
    }

    async fn resolve(&self, op: &Operation) -> FetchResult<ResolvedValue> {
        debug!("dispatching {} operation", op.kind);
        let raw = match op.kind {
            OperationKind::HttpGet => {
                let url = op.params.url.as_deref().ok_or(FetchError::MissingParam {
                    kind: op.kind,
                    param: "url",
                })?;
                resolvers::http::get(&self.http, url).await?
            }
            OperationKind::HttpPost => {
                let url = op.params.url.as_deref().ok_or(FetchError::MissingParam {
                    kind: op.kind,
                    param: "url",
                })?;
                let body = op.params.body.as_ref().ok_or(FetchError::MissingParam {
                    kind: op.kind,
                    param: "body",
                })?;
                resolvers::http::post(&self.http, url, body).await?
            }
            OperationKind::Binance => {
                let symbol = op.params.symbol.as_deref().ok_or(FetchError::MissingParam {
                    kind: op.kind,
                    param: "symbol",
                })?;
                resolvers::http::binance_ticker(&self.http, &self.binance_api_url, symbol).await?
            }
            OperationKind::BalanceOf => {
                resolvers::balance::resolve(&self.registry, &self.utxo, &op.params).await?
            }
            OperationKind::LpPrice => {
                resolvers::lp_price::resolve(&self.registry, &op.params).await?
            }
            OperationKind::Call => resolvers::call(&self.registry, &op.params).await?,
            // Validated away above; kept for exhaustiveness.
            OperationKind::Xpath => return Err(FetchError::XpathUnsupported),
        };

        pipeline::apply(raw, op.params.postprocess.as_ref(), self.pipeline_policy)
    }
}
