// 9.0: position records. immutable once created except for the single status
// transition performed by settlement. the escrow addresses are derived, not
// stored references into mutable state.

use crate::address::RecordAddress;
use crate::maker::SettlementOutcome;
use crate::types::{
    AccountId, Amount, AssetId, PositionId, Price, RequestId, StrategyType, Timestamp,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PositionStatus {
    Active,
    // in the money, exercised
    SettledItm,
    // out of the money, expired worthless
    SettledOtm,
    // spot landed exactly on the strike. funds move as OTM, tracked apart
    // for reporting
    SettledAtm,
}

impl PositionStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, PositionStatus::Active)
    }

    pub fn outcome(&self) -> Option<SettlementOutcome> {
        match self {
            PositionStatus::Active => None,
            PositionStatus::SettledItm => Some(SettlementOutcome::Itm),
            PositionStatus::SettledOtm => Some(SettlementOutcome::Otm),
            PositionStatus::SettledAtm => Some(SettlementOutcome::Atm),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Position {
    pub position_id: PositionId,
    pub user: AccountId,
    pub market_maker: AccountId,
    pub strategy: StrategyType,
    pub asset: AssetId,
    pub quote_asset: AssetId,
    pub strike_price: Price,
    pub premium_paid: Amount,
    pub contract_size: Amount,
    pub created_at: Timestamp,
    pub expiry_timestamp: Timestamp,
    pub quote_ref: RecordAddress,
    pub settlement_price: Option<Price>,
    pub status: PositionStatus,
    pub user_escrow: RecordAddress,
    pub maker_escrow: RecordAddress,
}

impl Position {
    pub fn address(&self) -> RecordAddress {
        RecordAddress::Position {
            user: self.user,
            position_id: self.position_id,
        }
    }

    pub fn is_expired(&self, now: Timestamp) -> bool {
        now >= self.expiry_timestamp
    }

    // Classify spot against strike. Call: above strike exercises; put: below.
    pub fn classify(&self, spot: Price) -> PositionStatus {
        let strike = self.strike_price;
        if spot == strike {
            return PositionStatus::SettledAtm;
        }
        let itm = match self.strategy {
            StrategyType::CoveredCall => spot > strike,
            StrategyType::CashSecuredPut => spot < strike,
        };
        if itm {
            PositionStatus::SettledItm
        } else {
            PositionStatus::SettledOtm
        }
    }
}

// 9.1: a pending two-phase open. the user has asked, the maker has a short
// window to confirm before anyone can cancel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequestStatus {
    Pending,
    Accepted,
    Rejected,
    Expired,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PositionRequest {
    pub request_id: RequestId,
    pub user: AccountId,
    pub market_maker: AccountId,
    pub quote_ref: RecordAddress,
    pub strategy: StrategyType,
    pub asset: AssetId,
    pub quote_asset: AssetId,
    pub strike_price: Price,
    pub contract_size: Amount,
    pub premium: Amount,
    pub created_at: Timestamp,
    pub expires_at: Timestamp,
    pub status: RequestStatus,
}

impl PositionRequest {
    pub fn address(&self) -> RecordAddress {
        RecordAddress::PositionRequest {
            user: self.user,
            request_id: self.request_id,
        }
    }

    pub fn is_expired(&self, now: Timestamp) -> bool {
        now >= self.expires_at
    }

    pub fn is_pending(&self) -> bool {
        self.status == RequestStatus::Pending
    }
}
