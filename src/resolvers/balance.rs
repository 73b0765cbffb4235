//! Balance resolution for account-based chain tokens and the UTXO ledger.

use crate::chain::{ProviderRegistry, UtxoIndexClient};
use crate::core::coerce::biguint_from_u256;
use crate::core::constants::UTXO_DISPLAY_DECIMALS;
use crate::core::decimal::{format_units_fixed, pow10, ratio_to_decimal_string};
use crate::core::error::{FetchError, FetchResult};
use crate::core::types::{ChainRef, OperationKind, OperationParams, UtxoLedger};
use crate::resolvers::parse_address;
use log::debug;
use serde_json::Value;

const KIND: OperationKind = OperationKind::BalanceOf;

pub async fn resolve(
    registry: &ProviderRegistry,
    utxo: &UtxoIndexClient,
    params: &OperationParams,
) -> FetchResult<Value> {
    let chain = params.chain_id.ok_or(FetchError::MissingParam {
        kind: KIND,
        param: "chainId",
    })?;
    let address = params.address.as_deref().ok_or(FetchError::MissingParam {
        kind: KIND,
        param: "address",
    })?;

    match chain {
        ChainRef::Utxo(ledger) => utxo_balance(utxo, ledger, address).await,
        ChainRef::Evm(chain_id) => {
            let contract = params.contract.as_deref().ok_or(FetchError::MissingParam {
                kind: KIND,
                param: "contract",
            })?;
            token_balance(registry, chain_id, contract, address).await
        }
    }
}

/// Account-token path: raw balance and token decimals are fetched
/// concurrently, then normalized with full precision.
async fn token_balance(
    registry: &ProviderRegistry,
    chain_id: u64,
    contract: &str,
    address: &str,
) -> FetchResult<Value> {
    let reader = registry.reader(chain_id)?;
    let token = parse_address(contract, KIND, "contract")?;
    let owner = parse_address(address, KIND, "address")?;

    let (raw, decimals) = tokio::try_join!(
        reader.token_balance(token, owner),
        reader.token_decimals(token),
    )
    .map_err(|err| {
        FetchError::resolution(
            "fetch balance",
            format!("contract {contract} on chain {chain_id}"),
            err,
        )
    })?;

    debug!("balanceOf {contract} on chain {chain_id}: raw={raw}, decimals={decimals}");

    let units = biguint_from_u256(raw);
    let formatted = ratio_to_decimal_string(&units, &pow10(decimals as u32), decimals as u32)?;
    Ok(Value::String(formatted))
}

/// UTXO path: funded minus spent across confirmed and mempool states,
/// rendered with the ledger's fixed 8-digit display convention.
async fn utxo_balance(
    utxo: &UtxoIndexClient,
    ledger: UtxoLedger,
    address: &str,
) -> FetchResult<Value> {
    let stats = utxo.address_stats(address).await?;
    let net = stats.net_base_units();
    if net < 0 {
        return Err(FetchError::resolution(
            "compute balance",
            format!("{ledger} address {address}"),
            "index reported a negative net balance",
        ));
    }

    Ok(Value::String(format_units_fixed(
        net as u64,
        UTXO_DISPLAY_DECIMALS,
    )))
}
