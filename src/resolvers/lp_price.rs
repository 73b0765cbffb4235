//! AMM pool price resolution.
//!
//! Two pool models share the `lpPrice` tag: proportional-reserve pairs
//! (version 2, the default) priced from decimals-adjusted reserves, and
//! tick-based pools (version 3) priced from the pool's fixed-point sqrt
//! price. The tick-based path squares the sqrt price before any division
//! and stays in arbitrary-precision integers until the final string.

use crate::chain::{ChainReader, ProviderRegistry};
use crate::core::coerce::{biguint_from_u256, u256_to_f64};
use crate::core::constants::PRICE_PRECISION;
use crate::core::decimal::{pow10, ratio_to_decimal_string};
use crate::core::error::{FetchError, FetchResult};
use crate::core::types::{ChainRef, OperationKind, OperationParams};
use crate::resolvers::parse_address;
use ethers::types::Address;
use log::debug;
use num_bigint::BigUint;
use num_traits::One;
use serde_json::Value;

const KIND: OperationKind = OperationKind::LpPrice;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PoolVersion {
    V2,
    V3,
}

pub async fn resolve(registry: &ProviderRegistry, params: &OperationParams) -> FetchResult<Value> {
    let chain = params.chain_id.ok_or(FetchError::MissingParam {
        kind: KIND,
        param: "chainId",
    })?;
    let ChainRef::Evm(chain_id) = chain else {
        return Err(FetchError::InvalidParam {
            kind: KIND,
            param: "chainId",
            reason: "lpPrice requires an EVM chain id".to_string(),
        });
    };
    let contract = params.contract.as_deref().ok_or(FetchError::MissingParam {
        kind: KIND,
        param: "contract",
    })?;

    let reverse = params.reverse.unwrap_or(false);
    let version = match params.version {
        None | Some(2) => PoolVersion::V2,
        Some(3) => PoolVersion::V3,
        Some(other) => {
            return Err(FetchError::InvalidParam {
                kind: KIND,
                param: "version",
                reason: format!("unknown pool version {other} (expected 2 or 3)"),
            })
        }
    };

    let reader = registry.reader(chain_id)?;
    let pool = parse_address(contract, KIND, "contract")?;

    let price = match version {
        PoolVersion::V2 => reserve_price(reader.as_ref(), pool, reverse).await,
        PoolVersion::V3 => tick_price(reader.as_ref(), pool, reverse).await,
    }
    .map_err(|err| {
        FetchError::resolution(
            "compute LP price",
            format!("pool {contract} on chain {chain_id}"),
            err,
        )
    })?;

    Ok(Value::String(price))
}

/// Proportional-reserve model: price is the ratio of the decimals-adjusted
/// reserves. Reserves are scaled to human units before the division, so
/// ordinary float arithmetic is precise enough here.
async fn reserve_price(reader: &dyn ChainReader, pool: Address, reverse: bool) -> FetchResult<String> {
    let ((reserve0, reserve1), (token0, token1)) =
        tokio::try_join!(reader.pair_reserves(pool), reader.pool_tokens(pool))?;
    let (decimals0, decimals1) = tokio::try_join!(
        reader.token_decimals(token0),
        reader.token_decimals(token1),
    )?;

    let adjusted0 = u256_to_f64(reserve0) / 10f64.powi(decimals0 as i32);
    let adjusted1 = u256_to_f64(reserve1) / 10f64.powi(decimals1 as i32);
    debug!("reserve price: adjusted0={adjusted0}, adjusted1={adjusted1}, reverse={reverse}");

    let price = if reverse {
        adjusted1 / adjusted0
    } else {
        adjusted0 / adjusted1
    };
    if !price.is_finite() {
        return Err(FetchError::Math(
            "pool reserves produce a non-finite price".to_string(),
        ));
    }

    Ok(price.to_string())
}

/// Tick-based model. `sqrtPriceX96^2 / 2^192`, decimals-corrected, is the
/// exact human-unit `reserve1/reserve0` ratio; `reverse` selects it or its
/// reciprocal so both models agree for equivalent pool states.
async fn tick_price(reader: &dyn ChainReader, pool: Address, reverse: bool) -> FetchResult<String> {
    let (sqrt_price_x96, (token0, token1)) =
        tokio::try_join!(reader.pool_sqrt_price_x96(pool), reader.pool_tokens(pool))?;
    let (decimals0, decimals1) = tokio::try_join!(
        reader.token_decimals(token0),
        reader.token_decimals(token1),
    )?;

    let sqrt = biguint_from_u256(sqrt_price_x96);
    let mut numerator = &sqrt * &sqrt;
    let mut denominator: BigUint = BigUint::one() << 192u32;

    if decimals0 > decimals1 {
        numerator *= pow10((decimals0 - decimals1) as u32);
    } else if decimals1 > decimals0 {
        denominator *= pow10((decimals1 - decimals0) as u32);
    }
    debug!("tick price: sqrtPriceX96={sqrt_price_x96}, decimals0={decimals0}, decimals1={decimals1}, reverse={reverse}");

    if reverse {
        ratio_to_decimal_string(&numerator, &denominator, PRICE_PRECISION)
    } else {
        ratio_to_decimal_string(&denominator, &numerator, PRICE_PRECISION)
    }
}
