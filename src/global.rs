// 3.0: protocol-wide state. a singleton created once at bootstrap, mutated only by
// the authority (fee/pause) and by the position/settlement paths (counters).

use crate::types::{AccountId, Amount, Bps, Timestamp};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlobalState {
    pub authority: AccountId,
    pub treasury: AccountId,
    pub protocol_fee_bps: Bps,
    // circuit breaker: blocks new positions, never blocks settlement
    pub paused: bool,
    pub total_volume: Amount,
    pub total_positions: u64,
    pub created_at: Timestamp,
}

impl GlobalState {
    pub fn new(authority: AccountId, treasury: AccountId, fee_bps: Bps, now: Timestamp) -> Self {
        Self {
            authority,
            treasury,
            protocol_fee_bps: fee_bps,
            paused: false,
            total_volume: Amount::zero(),
            total_positions: 0,
            created_at: now,
        }
    }

    pub fn record_position(&mut self, volume: Amount) {
        self.total_positions += 1;
        self.total_volume = self.total_volume.add(volume);
    }

    // protocol's cut of a premium, rounded toward the user
    pub fn fee_on(&self, premium: Amount) -> Amount {
        premium.mul(self.protocol_fee_bps.as_fraction())
    }
}

// Partial update applied by the authority. None fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct GlobalStateUpdate {
    pub new_authority: Option<AccountId>,
    pub new_treasury: Option<AccountId>,
    pub new_fee_bps: Option<Bps>,
    pub paused: Option<bool>,
}

impl GlobalState {
    pub fn apply(&mut self, update: GlobalStateUpdate) {
        if let Some(authority) = update.new_authority {
            self.authority = authority;
        }
        if let Some(treasury) = update.new_treasury {
            self.treasury = treasury;
        }
        if let Some(fee) = update.new_fee_bps {
            self.protocol_fee_bps = fee;
        }
        if let Some(paused) = update.paused {
            self.paused = paused;
        }
    }
}
