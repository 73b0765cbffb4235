use lazy_static::lazy_static;
use std::collections::BTreeMap;

lazy_static! {
    /// Default RPC endpoints keyed by EVM chain id.
    pub static ref DEFAULT_RPC_ENDPOINTS: BTreeMap<u64, &'static str> = BTreeMap::from([
        (1, "https://ethereum.publicnode.com"),
        (56, "https://bsc-dataseed.binance.org"),
        (137, "https://polygon-rpc.com"),
    ]);
}

/// Esplora-style index used for UTXO address lookups.
pub const DEFAULT_ESPLORA_URL: &str = "https://blockstream.info/api";

/// Base URL of the exchange ticker API.
pub const DEFAULT_BINANCE_API_URL: &str = "https://api.binance.com";

// ERC20 function selectors
pub const SELECTOR_BALANCE_OF: [u8; 4] = [0x70, 0xa0, 0x82, 0x31]; // balanceOf(address)
pub const SELECTOR_DECIMALS: [u8; 4] = [0x31, 0x3c, 0xe5, 0x67]; // decimals()

// Proportional-reserve (v2) pair selectors
pub const SELECTOR_GET_RESERVES: [u8; 4] = [0x09, 0x02, 0xf1, 0xac]; // getReserves()
pub const SELECTOR_TOKEN0: [u8; 4] = [0x0d, 0xfe, 0x16, 0x81]; // token0()
pub const SELECTOR_TOKEN1: [u8; 4] = [0xd2, 0x12, 0x20, 0xa7]; // token1()

// Tick-based (v3) pool selectors
pub const SELECTOR_SLOT0: [u8; 4] = [0x38, 0x50, 0xc7, 0xbd]; // slot0()

/// Fractional digits carried by tick-based price strings.
pub const PRICE_PRECISION: u32 = 18;

/// Display digits for UTXO ledger balances.
pub const UTXO_DISPLAY_DECIMALS: u32 = 8;

// HTTP Configuration
pub const DEFAULT_HTTP_TIMEOUT: u64 = 30;
