//! Ethers-backed chain reader. Encodes the fixed ABI surface by hand
//! (four-byte selector plus ABI-encoded arguments) and decodes returns
//! with `ethers::abi`, so no generated contract bindings are needed.

use crate::chain::ChainReader;
use crate::core::constants::*;
use crate::core::error::{FetchError, FetchResult};
use async_trait::async_trait;
use dashmap::DashMap;
use ethers::abi::{self, ParamType, Token};
use ethers::providers::{Http, Middleware, Provider};
use ethers::types::{transaction::eip2718::TypedTransaction, Address, Bytes, TransactionRequest, U256};
use log::debug;

pub struct EvmChainReader {
    provider: Provider<Http>,
    endpoint: String,
    // Token decimals never change after deployment; cache them per reader.
    decimals_cache: DashMap<Address, u8>,
}

impl EvmChainReader {
    pub fn connect(url: &str) -> FetchResult<Self> {
        let provider = Provider::<Http>::try_from(url)
            .map_err(|err| FetchError::Config(format!("invalid RPC endpoint {url}: {err}")))?;
        Ok(Self {
            provider,
            endpoint: url.to_string(),
            decimals_cache: DashMap::new(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn encode_call(selector: [u8; 4], args: &[Token]) -> Bytes {
        let mut data = selector.to_vec();
        data.extend(abi::encode(args));
        Bytes::from(data)
    }

    async fn eth_call(&self, contract: Address, data: Bytes, action: &str) -> FetchResult<Bytes> {
        debug!("eth_call {action} on {contract:?} via {}", self.endpoint);
        let tx: TypedTransaction = TransactionRequest::new().to(contract).data(data).into();
        self.provider.call(&tx, None).await.map_err(|err| {
            FetchError::resolution(action, format!("contract {contract:?}"), err)
        })
    }

    async fn read_tokens(
        &self,
        contract: Address,
        selector: [u8; 4],
        args: &[Token],
        returns: &[ParamType],
        action: &str,
    ) -> FetchResult<Vec<Token>> {
        let raw = self
            .eth_call(contract, Self::encode_call(selector, args), action)
            .await?;
        abi::decode(returns, &raw).map_err(|err| {
            FetchError::resolution(action, format!("contract {contract:?}"), err)
        })
    }

    async fn read_uint(
        &self,
        contract: Address,
        selector: [u8; 4],
        args: &[Token],
        width: usize,
        action: &str,
    ) -> FetchResult<U256> {
        let tokens = self
            .read_tokens(contract, selector, args, &[ParamType::Uint(width)], action)
            .await?;
        match tokens.into_iter().next() {
            Some(Token::Uint(value)) => Ok(value),
            _ => Err(FetchError::resolution(
                action,
                format!("contract {contract:?}"),
                "unexpected ABI return shape",
            )),
        }
    }

    async fn read_address(
        &self,
        contract: Address,
        selector: [u8; 4],
        action: &str,
    ) -> FetchResult<Address> {
        let tokens = self
            .read_tokens(contract, selector, &[], &[ParamType::Address], action)
            .await?;
        match tokens.into_iter().next() {
            Some(Token::Address(value)) => Ok(value),
            _ => Err(FetchError::resolution(
                action,
                format!("contract {contract:?}"),
                "unexpected ABI return shape",
            )),
        }
    }
}

#[async_trait]
impl ChainReader for EvmChainReader {
    async fn call(&self, contract: Address, data: Bytes) -> FetchResult<Bytes> {
        self.eth_call(contract, data, "execute contract call").await
    }

    async fn token_decimals(&self, token: Address) -> FetchResult<u8> {
        if let Some(hit) = self.decimals_cache.get(&token) {
            return Ok(*hit);
        }

        let value = self
            .read_uint(token, SELECTOR_DECIMALS, &[], 8, "read token decimals")
            .await?;
        if value > U256::from(u8::MAX) {
            return Err(FetchError::resolution(
                "read token decimals",
                format!("contract {token:?}"),
                format!("token reported out-of-range decimals {value}"),
            ));
        }

        let decimals = value.as_u32() as u8;
        self.decimals_cache.insert(token, decimals);
        Ok(decimals)
    }

    async fn token_balance(&self, token: Address, owner: Address) -> FetchResult<U256> {
        self.read_uint(
            token,
            SELECTOR_BALANCE_OF,
            &[Token::Address(owner)],
            256,
            "read token balance",
        )
        .await
    }

    async fn pair_reserves(&self, pool: Address) -> FetchResult<(U256, U256)> {
        let action = "read pool reserves";
        let returns = [
            ParamType::Uint(112),
            ParamType::Uint(112),
            ParamType::Uint(32),
        ];
        let tokens = self
            .read_tokens(pool, SELECTOR_GET_RESERVES, &[], &returns, action)
            .await?;
        match (tokens.first(), tokens.get(1)) {
            (Some(Token::Uint(reserve0)), Some(Token::Uint(reserve1))) => {
                Ok((*reserve0, *reserve1))
            }
            _ => Err(FetchError::resolution(
                action,
                format!("contract {pool:?}"),
                "unexpected ABI return shape",
            )),
        }
    }

    async fn pool_tokens(&self, pool: Address) -> FetchResult<(Address, Address)> {
        tokio::try_join!(
            self.read_address(pool, SELECTOR_TOKEN0, "read pool token0"),
            self.read_address(pool, SELECTOR_TOKEN1, "read pool token1"),
        )
    }

    async fn pool_sqrt_price_x96(&self, pool: Address) -> FetchResult<U256> {
        let action = "read pool slot0";
        let returns = [
            ParamType::Uint(160),
            ParamType::Int(24),
            ParamType::Uint(16),
            ParamType::Uint(16),
            ParamType::Uint(16),
            ParamType::Uint(8),
            ParamType::Bool,
        ];
        let tokens = self
            .read_tokens(pool, SELECTOR_SLOT0, &[], &returns, action)
            .await?;
        match tokens.into_iter().next() {
            Some(Token::Uint(sqrt_price)) => Ok(sqrt_price),
            _ => Err(FetchError::resolution(
                action,
                format!("contract {pool:?}"),
                "unexpected ABI return shape",
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_encode_call_prefixes_selector() {
        let owner: Address = "0xd8dA6BF26964aF9D7eEd9e03E53415D37aA96045"
            .parse()
            .unwrap();
        let data = EvmChainReader::encode_call(SELECTOR_BALANCE_OF, &[Token::Address(owner)]);

        assert_eq!(&data[..4], &SELECTOR_BALANCE_OF);
        // One ABI word for the address argument.
        assert_eq!(data.len(), 4 + 32);
        assert_eq!(&data[16..36], owner.as_bytes());
    }

    #[test]
    fn test_encode_call_without_args_is_bare_selector() {
        let data = EvmChainReader::encode_call(SELECTOR_DECIMALS, &[]);
        assert_eq!(data.as_ref(), &SELECTOR_DECIMALS);
    }

    #[test]
    fn test_connect_rejects_malformed_endpoint() {
        assert!(EvmChainReader::connect("not a url").is_err());
    }
}
