//! Per-kind resolvers. Each takes the collaborators it needs and returns
//! the operation's raw resolved value; the dispatcher owns routing and
//! post-processing.

pub mod balance;
pub mod http;
pub mod lp_price;

use crate::chain::ProviderRegistry;
use crate::core::error::{FetchError, FetchResult};
use crate::core::types::{CallOutcome, ChainRef, OperationKind, OperationParams};
use ethers::types::{Address, Bytes};
use log::debug;
use serde_json::Value;

pub(crate) fn parse_address(
    raw: &str,
    kind: OperationKind,
    param: &'static str,
) -> FetchResult<Address> {
    raw.parse::<Address>().map_err(|err| FetchError::InvalidParam {
        kind,
        param,
        reason: err.to_string(),
    })
}

/// Raw contract-call resolver: arbitrary ABI-encoded call data in, the
/// structured call record out. The hex payload may carry a `0x` prefix.
pub async fn call(registry: &ProviderRegistry, params: &OperationParams) -> FetchResult<Value> {
    const KIND: OperationKind = OperationKind::Call;

    let chain = params.chain_id.ok_or(FetchError::MissingParam {
        kind: KIND,
        param: "chainId",
    })?;
    let ChainRef::Evm(chain_id) = chain else {
        return Err(FetchError::InvalidParam {
            kind: KIND,
            param: "chainId",
            reason: "call requires an EVM chain id".to_string(),
        });
    };
    let contract = params.contract.as_deref().ok_or(FetchError::MissingParam {
        kind: KIND,
        param: "contract",
    })?;
    let data = params.data.as_deref().ok_or(FetchError::MissingParam {
        kind: KIND,
        param: "data",
    })?;

    let stripped = data.strip_prefix("0x").unwrap_or(data);
    let payload = hex::decode(stripped).map_err(|err| FetchError::InvalidParam {
        kind: KIND,
        param: "data",
        reason: format!("not a hex string: {err}"),
    })?;

    let reader = registry.reader(chain_id)?;
    let target = parse_address(contract, KIND, "contract")?;
    debug!("raw call to {contract} on chain {chain_id} ({} bytes)", payload.len());

    let raw = reader
        .call(target, Bytes::from(payload))
        .await
        .map_err(|err| {
            FetchError::resolution(
                "execute contract call",
                format!("contract {contract} on chain {chain_id}"),
                err,
            )
        })?;

    let outcome = CallOutcome {
        contract: contract.to_string(),
        chain_id,
        call_data: format!("0x{}", stripped.to_lowercase()),
        raw_result: format!("0x{}", hex::encode(raw.as_ref())),
    };
    serde_json::to_value(&outcome).map_err(|err| {
        FetchError::resolution(
            "encode call result",
            format!("contract {contract} on chain {chain_id}"),
            err,
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::ChainReader;
    use async_trait::async_trait;
    use ethers::types::U256;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::sync::Arc;

    /// Echoes the call data back as the result, so tests can see exactly
    /// what reached the chain.
    struct EchoReader;

    #[async_trait]
    impl ChainReader for EchoReader {
        async fn call(&self, _contract: Address, data: Bytes) -> FetchResult<Bytes> {
            Ok(data)
        }
        async fn token_decimals(&self, _token: Address) -> FetchResult<u8> {
            unimplemented!()
        }
        async fn token_balance(&self, _token: Address, _owner: Address) -> FetchResult<U256> {
            unimplemented!()
        }
        async fn pair_reserves(&self, _pool: Address) -> FetchResult<(U256, U256)> {
            unimplemented!()
        }
        async fn pool_tokens(&self, _pool: Address) -> FetchResult<(Address, Address)> {
            unimplemented!()
        }
        async fn pool_sqrt_price_x96(&self, _pool: Address) -> FetchResult<U256> {
            unimplemented!()
        }
    }

    fn registry() -> ProviderRegistry {
        let mut registry = ProviderRegistry::empty();
        registry.insert(1, Arc::new(EchoReader));
        registry
    }

    fn call_params(data: &str) -> OperationParams {
        OperationParams {
            chain_id: Some(ChainRef::Evm(1)),
            contract: Some("0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48".to_string()),
            data: Some(data.to_string()),
            ..OperationParams::default()
        }
    }

    #[tokio::test]
    async fn test_call_builds_structured_record() {
        let value = call(&registry(), &call_params("0x06FDDE03")).await.unwrap();
        assert_eq!(
            value,
            json!({
                "contract": "0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48",
                "chainId": 1,
                "callData": "0x06fdde03",
                "rawResult": "0x06fdde03"
            })
        );
    }

    #[tokio::test]
    async fn test_call_accepts_unprefixed_hex() {
        let value = call(&registry(), &call_params("313ce567")).await.unwrap();
        assert_eq!(value["callData"], json!("0x313ce567"));
    }

    #[tokio::test]
    async fn test_call_rejects_invalid_hex() {
        let err = call(&registry(), &call_params("invalid-hex-data"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            FetchError::InvalidParam { param: "data", .. }
        ));
    }

    #[tokio::test]
    async fn test_call_requires_data() {
        let mut params = call_params("0x06fdde03");
        params.data = None;
        let err = call(&registry(), &params).await.unwrap_err();
        assert!(matches!(
            err,
            FetchError::MissingParam { param: "data", .. }
        ));
    }
}
