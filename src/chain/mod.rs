pub mod evm;
pub mod utxo;

use crate::core::error::{FetchError, FetchResult};
use crate::core::Config;
use async_trait::async_trait;
use ethers::types::{Address, Bytes, U256};
use std::collections::BTreeMap;
use std::sync::Arc;

pub use evm::EvmChainReader;
pub use utxo::UtxoIndexClient;

/// Read-only view of one chain: a raw call plus the fixed ABI surface the
/// resolvers need (token introspection, v2 reserves, v3 sqrt price).
#[async_trait]
pub trait ChainReader: Send + Sync {
    /// Raw read-only contract call: ABI-encoded data in, returned bytes out.
    async fn call(&self, contract: Address, data: Bytes) -> FetchResult<Bytes>;

    async fn token_decimals(&self, token: Address) -> FetchResult<u8>;

    async fn token_balance(&self, token: Address, owner: Address) -> FetchResult<U256>;

    /// `getReserves()` on a proportional-reserve pair.
    async fn pair_reserves(&self, pool: Address) -> FetchResult<(U256, U256)>;

    /// `token0()`/`token1()` on either pool model.
    async fn pool_tokens(&self, pool: Address) -> FetchResult<(Address, Address)>;

    /// The sqrt price from `slot0()` on a tick-based pool.
    async fn pool_sqrt_price_x96(&self, pool: Address) -> FetchResult<U256>;
}

/// Static chain-id to reader mapping. Built once from configuration and
/// read-only afterwards; operations within a batch share it without locks.
pub struct ProviderRegistry {
    readers: BTreeMap<u64, Arc<dyn ChainReader>>,
}

impl ProviderRegistry {
    pub fn from_config(config: &Config) -> FetchResult<Self> {
        let mut registry = Self::empty();
        for (chain_id, url) in &config.rpc_endpoints {
            registry.insert(*chain_id, Arc::new(EvmChainReader::connect(url)?));
        }
        Ok(registry)
    }

    pub fn empty() -> Self {
        Self {
            readers: BTreeMap::new(),
        }
    }

    pub fn insert(&mut self, chain_id: u64, reader: Arc<dyn ChainReader>) {
        self.readers.insert(chain_id, reader);
    }

    pub fn reader(&self, chain_id: u64) -> FetchResult<Arc<dyn ChainReader>> {
        self.readers
            .get(&chain_id)
            .cloned()
            .ok_or_else(|| FetchError::UnsupportedChain {
                chain: chain_id.to_string(),
                supported: self.supported_list(),
            })
    }

    pub fn chain_ids(&self) -> Vec<u64> {
        self.readers.keys().copied().collect()
    }

    /// Configured chain ids rendered for error messages, ascending.
    pub fn supported_list(&self) -> String {
        self.readers
            .keys()
            .map(u64::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    struct NullReader;

    #[async_trait]
    impl ChainReader for NullReader {
        async fn call(&self, _contract: Address, _data: Bytes) -> FetchResult<Bytes> {
            Ok(Bytes::default())
        }
        async fn token_decimals(&self, _token: Address) -> FetchResult<u8> {
            Ok(18)
        }
        async fn token_balance(&self, _token: Address, _owner: Address) -> FetchResult<U256> {
            Ok(U256::zero())
        }
        async fn pair_reserves(&self, _pool: Address) -> FetchResult<(U256, U256)> {
            Ok((U256::zero(), U256::zero()))
        }
        async fn pool_tokens(&self, _pool: Address) -> FetchResult<(Address, Address)> {
            Ok((Address::zero(), Address::zero()))
        }
        async fn pool_sqrt_price_x96(&self, _pool: Address) -> FetchResult<U256> {
            Ok(U256::zero())
        }
    }

    #[test]
    fn test_unknown_chain_enumerates_supported_ids() {
        let mut registry = ProviderRegistry::empty();
        for id in [137, 1, 56] {
            registry.insert(id, Arc::new(NullReader));
        }

        let err = registry.reader(999).err().unwrap();
        match err {
            FetchError::UnsupportedChain { chain, supported } => {
                assert_eq!(chain, "999");
                assert_eq!(supported, "1, 56, 137");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_registry_from_default_config() {
        let registry = ProviderRegistry::from_config(&Config::default()).unwrap();
        assert_eq!(registry.chain_ids(), vec![1, 56, 137]);
    }

    #[test]
    fn test_reader_lookup_returns_shared_handle() {
        let mut registry = ProviderRegistry::empty();
        registry.insert(1, Arc::new(NullReader));

        let reader = registry.reader(1).unwrap();
        let decimals = tokio_test::block_on(reader.token_decimals(Address::zero())).unwrap();
        assert_eq!(decimals, 18);
    }
}
