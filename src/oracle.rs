// 10.0: oracle boundary. the engine is agnostic to whether prices come from Pyth,
// Chainlink, or a test fixture; it depends only on (price, confidence, timestamp)
// per feed and a staleness window. prices are pushed into the book, settlement
// reads the latest and rejects stale data.

use crate::types::{FeedId, Price, Timestamp};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceUpdate {
    pub price: Price,
    pub confidence: Option<Decimal>,
    pub timestamp: Timestamp,
}

impl PriceUpdate {
    pub fn new(price: Price, timestamp: Timestamp) -> Self {
        Self {
            price,
            confidence: None,
            timestamp,
        }
    }

    pub fn with_confidence(mut self, confidence: Decimal) -> Self {
        self.confidence = Some(confidence);
        self
    }

    pub fn is_stale(&self, now: Timestamp, staleness_secs: i64) -> bool {
        now.secs_since(self.timestamp) >= staleness_secs
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OracleError {
    #[error("No price available for feed {0:?}")]
    Unavailable(FeedId),

    #[error("Price for feed {feed:?} is stale: published {published}, now {now}")]
    StalePrice {
        feed: FeedId,
        published: Timestamp,
        now: Timestamp,
    },
}

// Trait for price sources feeding the book. Implement for a real oracle client.
pub trait OracleFeed {
    fn feed_id(&self) -> FeedId;
    fn latest(&self) -> Option<PriceUpdate>;
}

// Latest price per feed, as seen by the settlement engine.
#[derive(Debug, Clone, Default)]
pub struct OracleBook {
    latest: HashMap<FeedId, PriceUpdate>,
}

impl OracleBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn submit(&mut self, feed: FeedId, update: PriceUpdate) {
        self.latest.insert(feed, update);
    }

    pub fn pull_from(&mut self, source: &dyn OracleFeed) {
        if let Some(update) = source.latest() {
            self.submit(source.feed_id(), update);
        }
    }

    // Fresh price or a specific failure the caller can surface.
    pub fn fresh_price(
        &self,
        feed: FeedId,
        now: Timestamp,
        staleness_secs: i64,
    ) -> Result<PriceUpdate, OracleError> {
        let update = self.latest.get(&feed).ok_or(OracleError::Unavailable(feed))?;
        if update.is_stale(now, staleness_secs) {
            return Err(OracleError::StalePrice {
                feed,
                published: update.timestamp,
                now,
            });
        }
        Ok(*update)
    }
}

// Fixed-price source for tests and simulation.
#[derive(Debug, Clone)]
pub struct MockOracle {
    feed: FeedId,
    update: Option<PriceUpdate>,
}

impl MockOracle {
    pub fn new(feed: FeedId) -> Self {
        Self { feed, update: None }
    }

    pub fn set_price(&mut self, price: Price, timestamp: Timestamp) {
        self.update = Some(PriceUpdate::new(price, timestamp));
    }
}

impl OracleFeed for MockOracle {
    fn feed_id(&self) -> FeedId {
        self.feed
    }

    fn latest(&self) -> Option<PriceUpdate> {
        self.update
    }
}
