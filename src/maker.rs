// 5.0: market maker registry. one record per liquidity-provider identity, with
// lifetime counters and a reputation score the settlement engine feeds.

use crate::types::{AccountId, Timestamp};
use serde::{Deserialize, Serialize};

pub const INITIAL_REPUTATION: u16 = 100;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketMaker {
    pub owner: AccountId,
    pub active: bool,
    pub total_positions: u64,
    pub completed_positions: u64,
    pub reputation_score: u16,
    pub registered_at: Timestamp,
}

// Terminal settlement outcome, as seen by the reputation hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettlementOutcome {
    Itm,
    Otm,
    Atm,
}

impl MarketMaker {
    pub fn new(owner: AccountId, now: Timestamp) -> Self {
        Self {
            owner,
            active: true,
            total_positions: 0,
            completed_positions: 0,
            reputation_score: INITIAL_REPUTATION,
            registered_at: now,
        }
    }

    pub fn record_open(&mut self) {
        self.total_positions += 1;
    }

    // Settlement integration point. The score formula is maker policy, not an
    // engine correctness concern: ITM means the maker delivered on exercise.
    pub fn record_settlement(&mut self, outcome: SettlementOutcome) {
        self.completed_positions += 1;
        if outcome == SettlementOutcome::Itm {
            self.reputation_score = self.reputation_score.saturating_add(1);
        }
    }
}
