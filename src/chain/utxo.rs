//! Esplora-style UTXO ledger index client. Balances on the UTXO ledger are
//! derived from funded-minus-spent sums rather than an account state.

use crate::core::error::{FetchError, FetchResult};
use log::debug;
use serde::Deserialize;

/// Funded/spent totals for one state (confirmed chain or mempool), in the
/// ledger's integer base unit.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct TxoStats {
    pub funded_txo_sum: u64,
    pub spent_txo_sum: u64,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct AddressStats {
    pub chain_stats: TxoStats,
    #[serde(default)]
    pub mempool_stats: TxoStats,
}

impl AddressStats {
    /// Net balance in base units across confirmed and mempool states.
    pub fn net_base_units(&self) -> i128 {
        let confirmed =
            self.chain_stats.funded_txo_sum as i128 - self.chain_stats.spent_txo_sum as i128;
        let pending =
            self.mempool_stats.funded_txo_sum as i128 - self.mempool_stats.spent_txo_sum as i128;
        confirmed + pending
    }
}

pub struct UtxoIndexClient {
    http: reqwest::Client,
    base_url: String,
}

impl UtxoIndexClient {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }

    pub async fn address_stats(&self, address: &str) -> FetchResult<AddressStats> {
        let url = format!("{}/address/{address}", self.base_url.trim_end_matches('/'));
        debug!("fetching UTXO address stats from {url}");

        let subject = format!("BTC address {address}");
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|err| FetchError::resolution("fetch address stats", &subject, err))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::resolution(
                "fetch address stats",
                &subject,
                format!("HTTP status {status}"),
            ));
        }

        response
            .json::<AddressStats>()
            .await
            .map_err(|err| FetchError::resolution("decode address stats", &subject, err))
    }
}
