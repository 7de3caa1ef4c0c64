// 4.0: asset registry. per-asset trading parameters, created by the authority and
// immutable except for authority-driven bound changes and the enabled flag.

use crate::types::{AssetId, FeedId, Price, Timestamp};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetConfig {
    pub asset: AssetId,
    pub quote_asset: AssetId,
    pub price_feed: FeedId,
    pub enabled: bool,
    // strike bounds as a percentage of spot, e.g. 80 = 80%
    pub min_strike_pct: u16,
    pub max_strike_pct: u16,
    pub min_expiry_secs: i64,
    pub max_expiry_secs: i64,
    pub decimals: u8,
}

#[derive(Debug, Clone, Copy)]
pub struct AssetParams {
    pub quote_asset: AssetId,
    pub price_feed: FeedId,
    pub min_strike_pct: u16,
    pub max_strike_pct: u16,
    pub min_expiry_secs: i64,
    pub max_expiry_secs: i64,
    pub decimals: u8,
}

impl AssetConfig {
    pub fn new(asset: AssetId, params: AssetParams) -> Self {
        Self {
            asset,
            quote_asset: params.quote_asset,
            price_feed: params.price_feed,
            enabled: true,
            min_strike_pct: params.min_strike_pct,
            max_strike_pct: params.max_strike_pct,
            min_expiry_secs: params.min_expiry_secs,
            max_expiry_secs: params.max_expiry_secs,
            decimals: params.decimals,
        }
    }

    // is `expiry` inside the allowed window as seen from `now`
    pub fn expiry_in_bounds(&self, expiry: Timestamp, now: Timestamp) -> bool {
        let duration = expiry.secs_since(now);
        duration >= self.min_expiry_secs && duration <= self.max_expiry_secs
    }

    // is `strike` inside the percentage band around `spot`
    pub fn strike_in_bounds(&self, strike: Price, spot: Price) -> bool {
        let pct = strike.value() / spot.value() * Decimal::from(100u32);
        pct >= Decimal::from(self.min_strike_pct) && pct <= Decimal::from(self.max_strike_pct)
    }
}

// Partial update applied by the authority. None fields are left untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct AssetUpdate {
    pub enabled: Option<bool>,
    pub min_strike_pct: Option<u16>,
    pub max_strike_pct: Option<u16>,
    pub min_expiry_secs: Option<i64>,
    pub max_expiry_secs: Option<i64>,
}

impl AssetConfig {
    pub fn apply(&mut self, update: AssetUpdate) {
        if let Some(enabled) = update.enabled {
            self.enabled = enabled;
        }
        if let Some(min) = update.min_strike_pct {
            self.min_strike_pct = min;
        }
        if let Some(max) = update.max_strike_pct {
            self.max_strike_pct = max;
        }
        if let Some(min) = update.min_expiry_secs {
            self.min_expiry_secs = min;
        }
        if let Some(max) = update.max_expiry_secs {
            self.max_expiry_secs = max;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn test_asset() -> AssetConfig {
        AssetConfig::new(
            AssetId(1),
            AssetParams {
                quote_asset: AssetId(0),
                price_feed: FeedId(1),
                min_strike_pct: 80,
                max_strike_pct: 120,
                min_expiry_secs: 86_400,        // 1 day
                max_expiry_secs: 90 * 86_400,   // 90 days
                decimals: 9,
            },
        )
    }

    #[test]
    fn expiry_bounds() {
        let asset = test_asset();
        let now = Timestamp(1_000_000);

        assert!(asset.expiry_in_bounds(now.plus_secs(86_400), now));
        assert!(asset.expiry_in_bounds(now.plus_secs(30 * 86_400), now));
        assert!(!asset.expiry_in_bounds(now.plus_secs(3600), now)); // too soon
        assert!(!asset.expiry_in_bounds(now.plus_secs(91 * 86_400), now)); // too far
    }

    #[test]
    fn strike_bounds() {
        let asset = test_asset();
        let spot = Price::new_unchecked(dec!(100));

        assert!(asset.strike_in_bounds(Price::new_unchecked(dec!(80)), spot));
        assert!(asset.strike_in_bounds(Price::new_unchecked(dec!(120)), spot));
        assert!(asset.strike_in_bounds(Price::new_unchecked(dec!(100)), spot));
        assert!(!asset.strike_in_bounds(Price::new_unchecked(dec!(79)), spot));
        assert!(!asset.strike_in_bounds(Price::new_unchecked(dec!(121)), spot));
    }

    #[test]
    fn update_toggles_enabled() {
        let mut asset = test_asset();
        asset.apply(AssetUpdate {
            enabled: Some(false),
            ..Default::default()
        });
        assert!(!asset.enabled);
        assert_eq!(asset.min_strike_pct, 80);
    }
}
