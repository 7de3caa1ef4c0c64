// 8.0: quote book. maker-published strike ladders per asset/strategy/expiry.
// matching is deliberately simple: first active, non-expired quote whose ladder
// carries the exact strike with enough contracts wins. a single maker pool means
// there is nothing to price-improve across.

use crate::address::RecordAddress;
use crate::types::{AccountId, Amount, AssetId, Price, StrategyType, Timestamp};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const MAX_STRIKES_PER_QUOTE: usize = 10;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrikeQuote {
    pub strike_price: Price,
    pub premium_per_contract: Amount,
    pub available_contracts: Amount,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quote {
    pub market_maker: AccountId,
    pub asset: AssetId,
    pub quote_asset: AssetId,
    pub strategy: StrategyType,
    pub strikes: Vec<StrikeQuote>,
    pub expiry_timestamp: Timestamp,
    pub min_size: Amount,
    pub max_size: Amount,
    pub last_updated: Timestamp,
    pub active: bool,
}

impl Quote {
    pub fn address(&self) -> RecordAddress {
        RecordAddress::Quote {
            owner: self.market_maker,
            asset: self.asset,
            strategy: self.strategy,
            expiry: self.expiry_timestamp,
        }
    }

    pub fn is_expired(&self, now: Timestamp) -> bool {
        now >= self.expiry_timestamp
    }

    pub fn size_in_range(&self, contract_size: Amount) -> bool {
        contract_size >= self.min_size && contract_size <= self.max_size
    }

    // Exact-strike lookup with enough open contracts.
    pub fn find_strike(&self, strike_price: Price, contracts: Amount) -> Option<&StrikeQuote> {
        self.strikes
            .iter()
            .find(|s| s.strike_price == strike_price && s.available_contracts >= contracts)
    }

    // Consume contracts from the matched strike. Caller has already validated
    // via find_strike inside the same engine call, so a miss here is a bug.
    pub fn consume_strike(&mut self, strike_price: Price, contracts: Amount) -> bool {
        if let Some(strike) = self
            .strikes
            .iter_mut()
            .find(|s| s.strike_price == strike_price && s.available_contracts >= contracts)
        {
            strike.available_contracts = strike
                .available_contracts
                .checked_sub(contracts)
                .unwrap_or_else(Amount::zero);
            true
        } else {
            false
        }
    }

    // Hand contracts back to the ladder (rejected or expired request).
    pub fn restore_strike(&mut self, strike_price: Price, contracts: Amount) {
        if let Some(strike) = self
            .strikes
            .iter_mut()
            .find(|s| s.strike_price == strike_price)
        {
            strike.available_contracts = strike.available_contracts.add(contracts);
        }
    }
}

// Partial update applied by the quote owner. None fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct QuoteUpdate {
    pub strikes: Option<Vec<StrikeQuote>>,
    pub min_size: Option<Amount>,
    pub max_size: Option<Amount>,
    pub active: Option<bool>,
}

// All live quotes, keyed by derived address. BTreeMap iteration order makes
// "first match wins" deterministic.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QuoteBook {
    quotes: BTreeMap<RecordAddress, Quote>,
}

impl QuoteBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, quote: Quote) -> RecordAddress {
        let addr = quote.address();
        self.quotes.insert(addr, quote);
        addr
    }

    pub fn get(&self, addr: &RecordAddress) -> Option<&Quote> {
        self.quotes.get(addr)
    }

    pub fn get_mut(&mut self, addr: &RecordAddress) -> Option<&mut Quote> {
        self.quotes.get_mut(addr)
    }

    pub fn contains(&self, addr: &RecordAddress) -> bool {
        self.quotes.contains_key(addr)
    }

    // The matching algorithm: scan active, non-expired quotes for the asset and
    // strategy; first quote holding the exact strike with enough contracts wins.
    pub fn find_matching(
        &self,
        asset: AssetId,
        strategy: StrategyType,
        strike_price: Price,
        contracts: Amount,
        now: Timestamp,
    ) -> Option<RecordAddress> {
        self.quotes
            .iter()
            .find(|(_, quote)| {
                quote.active
                    && quote.asset == asset
                    && quote.strategy == strategy
                    && !quote.is_expired(now)
                    && quote.find_strike(strike_price, contracts).is_some()
            })
            .map(|(addr, _)| *addr)
    }

    pub fn quotes_for(
        &self,
        asset: AssetId,
        strategy: StrategyType,
    ) -> impl Iterator<Item = (&RecordAddress, &Quote)> {
        self.quotes
            .iter()
            .filter(move |(_, q)| q.asset == asset && q.strategy == strategy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn amt(v: i64) -> Amount {
        Amount::new_unchecked(Decimal::from(v))
    }

    fn price(v: i64) -> Price {
        Price::new_unchecked(Decimal::from(v))
    }

    fn ladder_quote() -> Quote {
        Quote {
            market_maker: AccountId(1),
            asset: AssetId(1),
            quote_asset: AssetId(0),
            strategy: StrategyType::CoveredCall,
            strikes: vec![
                StrikeQuote {
                    strike_price: price(150),
                    premium_per_contract: amt(4),
                    available_contracts: amt(0),
                },
                StrikeQuote {
                    strike_price: price(160),
                    premium_per_contract: amt(3),
                    available_contracts: amt(5),
                },
                StrikeQuote {
                    strike_price: price(170),
                    premium_per_contract: amt(2),
                    available_contracts: amt(5),
                },
            ],
            expiry_timestamp: Timestamp(10_000),
            min_size: amt(1),
            max_size: amt(10),
            last_updated: Timestamp(0),
            active: true,
        }
    }

    #[test]
    fn exhausted_strike_does_not_match() {
        let mut book = QuoteBook::new();
        book.insert(ladder_quote());
        let now = Timestamp(100);

        // 150 has zero contracts left
        assert!(book
            .find_matching(AssetId(1), StrategyType::CoveredCall, price(150), amt(1), now)
            .is_none());

        // 160 matches
        assert!(book
            .find_matching(AssetId(1), StrategyType::CoveredCall, price(160), amt(1), now)
            .is_some());
    }

    #[test]
    fn consume_decrements_available() {
        let mut quote = ladder_quote();
        assert!(quote.consume_strike(price(160), amt(1)));
        assert_eq!(
            quote.find_strike(price(160), amt(1)).unwrap().available_contracts.value(),
            dec!(4)
        );
    }

    #[test]
    fn restore_returns_contracts() {
        let mut quote = ladder_quote();
        quote.consume_strike(price(160), amt(3));
        quote.restore_strike(price(160), amt(3));
        assert_eq!(
            quote.find_strike(price(160), amt(5)).unwrap().available_contracts.value(),
            dec!(5)
        );
    }

    #[test]
    fn expired_or_inactive_quotes_skipped() {
        let mut book = QuoteBook::new();
        book.insert(ladder_quote());

        // expired
        assert!(book
            .find_matching(
                AssetId(1),
                StrategyType::CoveredCall,
                price(160),
                amt(1),
                Timestamp(10_000)
            )
            .is_none());

        // deactivated
        let addr = book
            .find_matching(AssetId(1), StrategyType::CoveredCall, price(160), amt(1), Timestamp(0))
            .unwrap();
        book.get_mut(&addr).unwrap().active = false;
        assert!(book
            .find_matching(AssetId(1), StrategyType::CoveredCall, price(160), amt(1), Timestamp(0))
            .is_none());
    }

    #[test]
    fn strategy_is_part_of_the_key() {
        let mut book = QuoteBook::new();
        book.insert(ladder_quote());

        assert!(book
            .find_matching(
                AssetId(1),
                StrategyType::CashSecuredPut,
                price(160),
                amt(1),
                Timestamp(0)
            )
            .is_none());
    }

    #[test]
    fn size_range() {
        let quote = ladder_quote();
        assert!(quote.size_in_range(amt(1)));
        assert!(quote.size_in_range(amt(10)));
        assert!(!quote.size_in_range(amt(11)));
        assert!(!quote.size_in_range(Amount::new_unchecked(dec!(0.5))));
    }
}
