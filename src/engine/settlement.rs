// 12.5 engine/settlement.rs: expiry settlement. permissionless: anyone may
// crank an expired position once a fresh oracle print exists. exactly one
// status transition per position, ever.

use super::core::Engine;
use super::results::EngineError;
use crate::address::RecordAddress;
use crate::events::{EventPayload, PositionSettledEvent};
use crate::position::PositionStatus;
use crate::types::{strike_notional, Amount, AssetId, StrategyType};

impl Engine {
    // 12.5.1: settle one expired position at the oracle price.
    //
    // in the money, the escrows swap at the strike: the user's collateral
    // goes to the maker's wallet and the maker's goes to the user's. out of
    // the money (or exactly at it) both sides get their collateral back,
    // the maker's into vault custody as available liquidity again.
    pub fn settle_position(
        &mut self,
        position_addr: RecordAddress,
    ) -> Result<PositionStatus, EngineError> {
        let position = self
            .positions
            .get(&position_addr)
            .ok_or(EngineError::PositionNotFound(position_addr))?
            .clone();

        if position.status.is_terminal() {
            return Err(EngineError::AlreadySettled);
        }
        if !position.is_expired(self.current_time) {
            return Err(EngineError::NotExpired);
        }

        // disabled assets still settle; only require_asset, not enabled
        let feed = self.require_asset(position.asset)?.price_feed;
        let spot = self
            .oracle
            .fresh_price(feed, self.current_time, self.config.oracle_staleness_secs)?
            .price;

        let status = position.classify(spot);
        let outcome = status.outcome().ok_or(EngineError::AlreadySettled)?;

        let user_wallet = RecordAddress::External {
            account: position.user,
        };
        let maker_wallet = RecordAddress::External {
            account: position.market_maker,
        };
        let (user_coll_asset, maker_coll_asset, maker_locked): (AssetId, AssetId, Amount) =
            match position.strategy {
                StrategyType::CoveredCall => (
                    position.asset,
                    position.quote_asset,
                    strike_notional(position.strike_price, position.contract_size),
                ),
                StrategyType::CashSecuredPut => (
                    position.quote_asset,
                    position.asset,
                    position.contract_size,
                ),
            };

        let (user_payout, maker_payout) = match status {
            PositionStatus::SettledItm => {
                // exercise: swap at strike
                let to_maker =
                    self.ledger
                        .drain(user_coll_asset, position.user_escrow, maker_wallet)?;
                let to_user =
                    self.ledger
                        .drain(maker_coll_asset, position.maker_escrow, user_wallet)?;
                self.require_vault_mut(position.market_maker, maker_coll_asset)?
                    .settle_locked(maker_locked)?;
                (to_user, to_maker)
            }
            PositionStatus::SettledOtm | PositionStatus::SettledAtm => {
                // expired unexercised: both sides made whole
                let to_user =
                    self.ledger
                        .drain(user_coll_asset, position.user_escrow, user_wallet)?;
                let custody = self
                    .require_vault_mut(position.market_maker, maker_coll_asset)?
                    .custody;
                let to_vault =
                    self.ledger
                        .drain(maker_coll_asset, position.maker_escrow, custody)?;
                self.require_vault_mut(position.market_maker, maker_coll_asset)?
                    .release(maker_locked)?;
                (to_user, to_vault)
            }
            PositionStatus::Active => return Err(EngineError::AlreadySettled),
        };

        if let Some(stored) = self.positions.get_mut(&position_addr) {
            stored.status = status;
            stored.settlement_price = Some(spot);
        }
        if let Some(maker) = self.makers.get_mut(&position.market_maker) {
            maker.record_settlement(outcome);
        }

        self.emit_event(EventPayload::PositionSettled(PositionSettledEvent {
            position: position_addr,
            user: position.user,
            market_maker: position.market_maker,
            status,
            settlement_price: spot,
            user_payout,
            maker_payout,
        }));
        Ok(status)
    }

    // 12.5.2: crank every settleable position. skips positions that are not
    // expired yet or whose feed is stale instead of failing the sweep.
    pub fn settle_expired_positions(&mut self) -> Vec<(RecordAddress, PositionStatus)> {
        let candidates: Vec<RecordAddress> = self
            .positions
            .iter()
            .filter(|(_, p)| !p.status.is_terminal() && p.is_expired(self.current_time))
            .map(|(addr, _)| *addr)
            .collect();

        let mut settled = Vec::new();
        for addr in candidates {
            if let Ok(status) = self.settle_position(addr) {
                settled.push((addr, status));
            }
        }
        settled
    }
}
