use crate::core::error::{FetchError, FetchResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Terminal output of one operation: a plain string/number in the simple
/// modes, or the structured contract-call record in call mode.
pub type ResolvedValue = Value;

/// Closed set of operation tags. Adding a tag is a compile-time exercise:
/// the dispatcher matches exhaustively over this enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum OperationKind {
    HttpGet,
    HttpPost,
    BalanceOf,
    Binance,
    LpPrice,
    Call,
    Xpath,
}

impl OperationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationKind::HttpGet => "http-get",
            OperationKind::HttpPost => "http-post",
            OperationKind::BalanceOf => "balanceOf",
            OperationKind::Binance => "binance",
            OperationKind::LpPrice => "lpPrice",
            OperationKind::Call => "call",
            OperationKind::Xpath => "xpath",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OperationKind {
    type Err = FetchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "http-get" => Ok(OperationKind::HttpGet),
            "http-post" => Ok(OperationKind::HttpPost),
            "balanceOf" => Ok(OperationKind::BalanceOf),
            "binance" => Ok(OperationKind::Binance),
            "lpPrice" => Ok(OperationKind::LpPrice),
            "call" => Ok(OperationKind::Call),
            "xpath" => Ok(OperationKind::Xpath),
            other => Err(FetchError::UnsupportedOperationKind(other.to_string())),
        }
    }
}

impl TryFrom<String> for OperationKind {
    type Error = FetchError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<OperationKind> for String {
    fn from(kind: OperationKind) -> Self {
        kind.as_str().to_string()
    }
}

/// Chain identifier: a numeric EVM chain id, or a UTXO ledger tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChainRef {
    Evm(u64),
    Utxo(UtxoLedger),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UtxoLedger {
    #[serde(rename = "BTC")]
    Bitcoin,
}

impl fmt::Display for ChainRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChainRef::Evm(id) => write!(f, "{id}"),
            ChainRef::Utxo(ledger) => write!(f, "{ledger}"),
        }
    }
}

impl fmt::Display for UtxoLedger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UtxoLedger::Bitcoin => f.write_str("BTC"),
        }
    }
}

/// Postprocess directive: one step string, or an ordered sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PostprocessSpec {
    Single(String),
    Sequence(Vec<String>),
}

impl PostprocessSpec {
    pub fn steps(&self) -> &[String] {
        match self {
            PostprocessSpec::Single(step) => std::slice::from_ref(step),
            PostprocessSpec::Sequence(steps) => steps,
        }
    }
}

/// Tag-specific attribute mapping. Required-field enforcement happens in
/// the resolvers, which is where "required" depends on the tag.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OperationParams {
    pub url: Option<String>,
    pub body: Option<Value>,
    #[serde(alias = "chainid")]
    pub chain_id: Option<ChainRef>,
    pub contract: Option<String>,
    pub address: Option<String>,
    pub symbol: Option<String>,
    pub data: Option<String>,
    pub reverse: Option<bool>,
    pub version: Option<u8>,
    pub postprocess: Option<PostprocessSpec>,
}

/// One fetch operation: a tag, tag-specific params, and an optional
/// caller-supplied label used by keyed dispatch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    #[serde(rename = "type")]
    pub kind: OperationKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub params: OperationParams,
}

impl Operation {
    pub fn new(kind: OperationKind) -> Self {
        Self {
            kind,
            name: None,
            params: OperationParams::default(),
        }
    }
}

/// Structured result of a raw contract call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallOutcome {
    pub contract: String,
    pub chain_id: u64,
    pub call_data: String,
    pub raw_result: String,
}

/// Parse a JSON document into an operation batch. The document must be an
/// array; each element must carry a recognized `type` tag.
pub fn batch_from_json(value: &Value) -> FetchResult<Vec<Operation>> {
    let items = value.as_array().ok_or(FetchError::InvalidBatch)?;
    items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            serde_json::from_value(item.clone()).map_err(|err| FetchError::InvalidOperation {
                index,
                reason: err.to_string(),
            })
        })
        .collect()
}
