//! Runtime parameters for the bridge module.

use serde::{Deserialize, Serialize};

/// Default pegged asset name used for mint/burn accounting.
const DEFAULT_ASSET: &str = "pBTC";

/// Default decimal offset of the minimum fee below one whole fee-currency
/// unit.
const DEFAULT_MIN_FEE_DECIMAL: u8 = 9;

/// Default bound on broadcast attempts before a job is marked failed.
const DEFAULT_MAX_BROADCAST_RETRIES: u32 = 5;

/// Default delay between broadcast attempts in ms.
const DEFAULT_BROADCAST_RETRY_DELAY: u64 = 2_000;

/// Fee policy for bridge transactions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeeParams {
    /// Currency fees are denominated in.
    pub fee_currency: String,

    /// The minimum fee is `10^(decimals - min_fee_decimal)` of the fee
    /// currency's smallest unit.
    #[serde(default = "default_min_fee_decimal")]
    pub min_fee_decimal: u8,
}

impl FeeParams {
    /// Minimum fee in the fee currency's smallest unit.
    pub fn min_fee_units(&self, currency_decimals: u8) -> u128 {
        let shift = currency_decimals.saturating_sub(self.min_fee_decimal);
        10u128.pow(shift as u32)
    }
}

/// Retry policy for the asynchronous broadcast job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BroadcastParams {
    /// Attempts before the job is marked terminally failed.
    #[serde(default = "default_max_broadcast_retries")]
    pub max_retries: u32,

    /// Delay between attempts in milliseconds.
    #[serde(default = "default_broadcast_retry_delay")]
    pub retry_delay_ms: u64,
}

impl Default for BroadcastParams {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_BROADCAST_RETRIES,
            retry_delay_ms: DEFAULT_BROADCAST_RETRY_DELAY,
        }
    }
}

/// Chain-facing parameters of the bridge module.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainParams {
    /// Name of the pegged asset minted for locked external funds.
    #[serde(default = "default_asset")]
    pub asset: String,
}

impl Default for ChainParams {
    fn default() -> Self {
        Self {
            asset: DEFAULT_ASSET.to_owned(),
        }
    }
}

/// Top-level parameter set for the bridge module.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BridgeParams {
    pub fees: FeeParams,

    #[serde(default)]
    pub broadcast: BroadcastParams,

    #[serde(default)]
    pub chain: ChainParams,
}

fn default_min_fee_decimal() -> u8 {
    DEFAULT_MIN_FEE_DECIMAL
}

fn default_max_broadcast_retries() -> u32 {
    DEFAULT_MAX_BROADCAST_RETRIES
}

fn default_broadcast_retry_delay() -> u64 {
    DEFAULT_BROADCAST_RETRY_DELAY
}

fn default_asset() -> String {
    DEFAULT_ASSET.to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_min_fee_units() {
        let fees = FeeParams {
            fee_currency: "NVT".to_owned(),
            min_fee_decimal: 9,
        };
        // 18-decimal fee currency, min fee at 10^-9 of a unit.
        assert_eq!(fees.min_fee_units(18), 1_000_000_000);
        // Narrower than the offset collapses to one smallest unit.
        assert_eq!(fees.min_fee_units(8), 1);
    }

    #[test]
    fn test_parse_with_defaults() {
        let raw = r#"
            [fees]
            fee_currency = "NVT"

            [broadcast]
            max_retries = 3
        "#;
        let params: BridgeParams = toml::from_str(raw).unwrap();
        assert_eq!(params.fees.min_fee_decimal, 9);
        assert_eq!(params.broadcast.max_retries, 3);
        assert_eq!(params.broadcast.retry_delay_ms, 2_000);
        assert_eq!(params.chain.asset, "pBTC");
    }
}
