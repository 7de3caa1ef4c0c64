// 11.0: every state change produces an event. used for audit trails, state
// reconstruction, and notifying external systems. the EventPayload enum lists
// all event types.

use crate::address::RecordAddress;
use crate::position::PositionStatus;
use crate::types::{
    AccountId, Amount, AssetId, Bps, PositionId, Price, RequestId, StrategyType, Timestamp,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EventId(pub u64);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub timestamp: Timestamp,
    pub payload: EventPayload,
}

impl Event {
    pub fn new(id: EventId, timestamp: Timestamp, payload: EventPayload) -> Self {
        Self {
            id,
            timestamp,
            payload,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum EventPayload {
    // Governance events
    GlobalStateInitialized(GlobalStateInitializedEvent),
    GlobalStateUpdated(GlobalStateUpdatedEvent),
    AssetAdded(AssetAddedEvent),
    AssetUpdated(AssetUpdatedEvent),

    // Maker events
    MarketMakerRegistered(MarketMakerRegisteredEvent),
    VaultInitialized(VaultInitializedEvent),
    LiquidityDeposited(LiquidityEvent),
    LiquidityWithdrawn(LiquidityEvent),
    QuoteSubmitted(QuoteSubmittedEvent),
    QuoteUpdated(QuoteUpdatedEvent),

    // Position events
    PositionRequested(PositionRequestedEvent),
    RequestRejected(RequestClosedEvent),
    RequestCancelled(RequestClosedEvent),
    PositionOpened(PositionOpenedEvent),
    PositionSettled(PositionSettledEvent),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlobalStateInitializedEvent {
    pub authority: AccountId,
    pub treasury: AccountId,
    pub fee_bps: Bps,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlobalStateUpdatedEvent {
    pub authority: AccountId,
    pub paused: bool,
    pub fee_bps: Bps,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetAddedEvent {
    pub asset: AssetId,
    pub quote_asset: AssetId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetUpdatedEvent {
    pub asset: AssetId,
    pub enabled: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketMakerRegisteredEvent {
    pub owner: AccountId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VaultInitializedEvent {
    pub owner: AccountId,
    pub asset: AssetId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LiquidityEvent {
    pub owner: AccountId,
    pub asset: AssetId,
    pub amount: Amount,
    pub available_after: Amount,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteSubmittedEvent {
    pub quote: RecordAddress,
    pub owner: AccountId,
    pub asset: AssetId,
    pub strategy: StrategyType,
    pub strike_count: usize,
    pub expiry: Timestamp,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteUpdatedEvent {
    pub quote: RecordAddress,
    pub active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PositionRequestedEvent {
    pub request: RecordAddress,
    pub user: AccountId,
    pub request_id: RequestId,
    pub strike_price: Price,
    pub contract_size: Amount,
    pub expires_at: Timestamp,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestClosedEvent {
    pub request: RecordAddress,
    pub user: AccountId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PositionOpenedEvent {
    pub position: RecordAddress,
    pub user: AccountId,
    pub market_maker: AccountId,
    pub position_id: PositionId,
    pub strategy: StrategyType,
    pub strike_price: Price,
    pub contract_size: Amount,
    pub premium_net: Amount,
    pub protocol_fee: Amount,
    pub expiry: Timestamp,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PositionSettledEvent {
    pub position: RecordAddress,
    pub user: AccountId,
    pub market_maker: AccountId,
    pub status: PositionStatus,
    pub settlement_price: Price,
    pub user_payout: Amount,
    pub maker_payout: Amount,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    // events feed external audit pipelines as JSON; the shape must round-trip
    #[test]
    fn events_round_trip_through_json() {
        let event = Event::new(
            EventId(7),
            Timestamp(1_000_000),
            EventPayload::LiquidityDeposited(LiquidityEvent {
                owner: AccountId(10),
                asset: AssetId(1),
                amount: Amount::new_unchecked(dec!(500)),
                available_after: Amount::new_unchecked(dec!(1500)),
            }),
        );

        let json = serde_json::to_string(&event).unwrap();
        let back: Event = serde_json::from_str(&json).unwrap();
        assert_eq!(back.id, event.id);
        match back.payload {
            EventPayload::LiquidityDeposited(e) => {
                assert_eq!(e.amount.value(), dec!(500));
                assert_eq!(e.owner, AccountId(10));
            }
            other => panic!("unexpected payload: {:?}", other),
        }
    }
}
