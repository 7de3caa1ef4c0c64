// 12.4 engine/positions.rs: opening positions against the maker pool. the
// direct path matches and opens in one atomic call; the two-phase path
// reserves contracts behind a request the maker confirms within a window.
//
// every operation validates completely before its first mutation, so a
// failed call leaves no partial state behind.

use super::core::Engine;
use super::results::EngineError;
use crate::address::RecordAddress;
use crate::custody::CustodyError;
use crate::events::{
    EventPayload, PositionOpenedEvent, PositionRequestedEvent, RequestClosedEvent,
};
use crate::position::{Position, PositionRequest, PositionStatus, RequestStatus};
use crate::types::{
    premium_for, strike_notional, AccountId, Amount, AssetId, PositionId, Price, RequestId,
    StrategyType, Timestamp,
};
use crate::vault::VaultError;

// Snapshot of everything an open needs, taken under validation so the
// mutation phase works from plain values instead of live borrows.
#[derive(Debug, Clone)]
pub(super) struct OpenTerms {
    pub user: AccountId,
    pub market_maker: AccountId,
    pub quote_ref: RecordAddress,
    pub strategy: StrategyType,
    pub asset: AssetId,
    pub quote_asset: AssetId,
    pub strike_price: Price,
    pub contract_size: Amount,
    pub premium_gross: Amount,
    pub protocol_fee: Amount,
    pub premium_net: Amount,
    pub expiry: Timestamp,
}

impl OpenTerms {
    // Collateral each side escrows. A call is covered by the underlying from
    // the user and cash at strike from the maker; a put mirrors that.
    pub fn user_collateral(&self) -> (AssetId, Amount) {
        match self.strategy {
            StrategyType::CoveredCall => (self.asset, self.contract_size),
            StrategyType::CashSecuredPut => (
                self.quote_asset,
                strike_notional(self.strike_price, self.contract_size),
            ),
        }
    }

    pub fn maker_collateral(&self) -> (AssetId, Amount) {
        match self.strategy {
            StrategyType::CoveredCall => (
                self.quote_asset,
                strike_notional(self.strike_price, self.contract_size),
            ),
            StrategyType::CashSecuredPut => (self.asset, self.contract_size),
        }
    }
}

impl Engine {
    // 12.4.1: direct open. match against a published quote, escrow both
    // sides, pay the premium, all in one call.
    //
    // `position_id` must equal the user's next sequence value; callers that
    // race themselves get a clean rejection instead of a gap.
    pub fn create_position(
        &mut self,
        user: AccountId,
        position_id: PositionId,
        quote_addr: RecordAddress,
        strike_price: Price,
        contract_size: Amount,
    ) -> Result<RecordAddress, EngineError> {
        self.require_not_paused()?;

        let expected = PositionId(self.next_position_id(user));
        if position_id != expected {
            return Err(EngineError::InvalidPositionId {
                expected,
                got: position_id,
            });
        }

        let terms = self.open_terms(user, quote_addr, strike_price, contract_size)?;
        let addr = self.execute_open(position_id, &terms)?;

        // cannot fail: the strike was validated in open_terms and nothing has
        // touched the book since
        let quote = self
            .quote_book
            .get_mut(&quote_addr)
            .ok_or(EngineError::QuoteNotFound(quote_addr))?;
        quote.consume_strike(strike_price, contract_size);

        Ok(addr)
    }

    // 12.4.2: two-phase open, request leg. reserves the contracts on the
    // ladder and parks the terms behind a request the maker must confirm
    // before the window closes.
    pub fn request_position(
        &mut self,
        user: AccountId,
        request_id: RequestId,
        quote_addr: RecordAddress,
        strike_price: Price,
        contract_size: Amount,
    ) -> Result<RecordAddress, EngineError> {
        self.require_not_paused()?;

        let expected = RequestId(self.next_request_id(user));
        if request_id != expected {
            return Err(EngineError::InvalidRequestId {
                expected,
                got: request_id,
            });
        }

        let terms = self.open_terms(user, quote_addr, strike_price, contract_size)?;

        let quote = self
            .quote_book
            .get_mut(&quote_addr)
            .ok_or(EngineError::QuoteNotFound(quote_addr))?;
        quote.consume_strike(strike_price, contract_size);

        let request = PositionRequest {
            request_id,
            user,
            market_maker: terms.market_maker,
            quote_ref: quote_addr,
            strategy: terms.strategy,
            asset: terms.asset,
            quote_asset: terms.quote_asset,
            strike_price,
            contract_size,
            premium: terms.premium_gross,
            created_at: self.current_time,
            expires_at: self
                .current_time
                .plus_secs(self.config.confirmation_window_secs),
            status: RequestStatus::Pending,
        };
        let addr = request.address();
        let expires_at = request.expires_at;
        self.requests.insert(addr, request);
        self.next_request_ids.insert(user, request_id.0 + 1);

        self.emit_event(EventPayload::PositionRequested(PositionRequestedEvent {
            request: addr,
            user,
            request_id,
            strike_price,
            contract_size,
            expires_at,
        }));
        Ok(addr)
    }

    // 12.4.3: two-phase open, confirm leg. only the quoted maker may
    // confirm, and only while the request is pending and unexpired.
    pub fn confirm_position(
        &mut self,
        caller: AccountId,
        request_addr: RecordAddress,
        position_id: PositionId,
    ) -> Result<RecordAddress, EngineError> {
        self.require_not_paused()?;

        let request = self
            .requests
            .get(&request_addr)
            .ok_or(EngineError::RequestNotFound(request_addr))?;
        if request.market_maker != caller {
            return Err(EngineError::Unauthorized);
        }
        if !request.is_pending() {
            return Err(EngineError::RequestNotPending);
        }
        if request.is_expired(self.current_time) {
            return Err(EngineError::RequestExpired);
        }

        let expected = PositionId(self.next_position_id(request.user));
        if position_id != expected {
            return Err(EngineError::InvalidPositionId {
                expected,
                got: position_id,
            });
        }

        let premium_gross = request.premium;
        let protocol_fee = self.require_global()?.fee_on(premium_gross);
        let terms = OpenTerms {
            user: request.user,
            market_maker: request.market_maker,
            quote_ref: request.quote_ref,
            strategy: request.strategy,
            asset: request.asset,
            quote_asset: request.quote_asset,
            strike_price: request.strike_price,
            contract_size: request.contract_size,
            premium_gross,
            protocol_fee,
            premium_net: premium_gross
                .checked_sub(protocol_fee)
                .unwrap_or_else(Amount::zero),
            // the reservation carried the quote's expiry forward
            expiry: match self.quote_book.get(&request.quote_ref) {
                Some(quote) => quote.expiry_timestamp,
                None => return Err(EngineError::QuoteNotFound(request.quote_ref)),
            },
        };

        // contracts were reserved at request time, so no consume here
        let addr = self.execute_open(position_id, &terms)?;

        if let Some(request) = self.requests.get_mut(&request_addr) {
            request.status = RequestStatus::Accepted;
        }
        Ok(addr)
    }

    // 12.4.4: maker declines a pending request. reserved contracts go back
    // on the ladder.
    pub fn reject_request(
        &mut self,
        caller: AccountId,
        request_addr: RecordAddress,
    ) -> Result<(), EngineError> {
        let request = self
            .requests
            .get(&request_addr)
            .ok_or(EngineError::RequestNotFound(request_addr))?;
        if request.market_maker != caller {
            return Err(EngineError::Unauthorized);
        }
        if !request.is_pending() {
            return Err(EngineError::RequestNotPending);
        }

        let (quote_ref, strike_price, contract_size, user) = (
            request.quote_ref,
            request.strike_price,
            request.contract_size,
            request.user,
        );
        if let Some(quote) = self.quote_book.get_mut(&quote_ref) {
            quote.restore_strike(strike_price, contract_size);
        }
        if let Some(request) = self.requests.get_mut(&request_addr) {
            request.status = RequestStatus::Rejected;
        }

        self.emit_event(EventPayload::RequestRejected(RequestClosedEvent {
            request: request_addr,
            user,
        }));
        Ok(())
    }

    // 12.4.5: user reclaims a request the maker let expire.
    pub fn cancel_expired_request(
        &mut self,
        caller: AccountId,
        request_addr: RecordAddress,
    ) -> Result<(), EngineError> {
        let request = self
            .requests
            .get(&request_addr)
            .ok_or(EngineError::RequestNotFound(request_addr))?;
        if request.user != caller {
            return Err(EngineError::Unauthorized);
        }
        if !request.is_pending() {
            return Err(EngineError::RequestNotPending);
        }
        if !request.is_expired(self.current_time) {
            return Err(EngineError::RequestNotExpired);
        }

        let (quote_ref, strike_price, contract_size, user) = (
            request.quote_ref,
            request.strike_price,
            request.contract_size,
            request.user,
        );
        if let Some(quote) = self.quote_book.get_mut(&quote_ref) {
            quote.restore_strike(strike_price, contract_size);
        }
        if let Some(request) = self.requests.get_mut(&request_addr) {
            request.status = RequestStatus::Expired;
        }

        self.emit_event(EventPayload::RequestCancelled(RequestClosedEvent {
            request: request_addr,
            user,
        }));
        Ok(())
    }

    // 12.4.6: validate the quote side of an open and price the trade.
    fn open_terms(
        &self,
        user: AccountId,
        quote_addr: RecordAddress,
        strike_price: Price,
        contract_size: Amount,
    ) -> Result<OpenTerms, EngineError> {
        let quote = self
            .quote_book
            .get(&quote_addr)
            .ok_or(EngineError::QuoteNotFound(quote_addr))?;
        if !quote.active {
            return Err(EngineError::QuoteNotActive);
        }
        if quote.is_expired(self.current_time) {
            return Err(EngineError::QuoteExpired);
        }
        self.require_active_maker(quote.market_maker)?;
        self.require_enabled_asset(quote.asset)?;

        if !quote.size_in_range(contract_size) {
            return Err(EngineError::SizeOutOfRange {
                size: contract_size,
                min: quote.min_size,
                max: quote.max_size,
            });
        }
        let strike = quote
            .find_strike(strike_price, contract_size)
            .ok_or(EngineError::NoMatchingQuote)?;

        let premium_gross = premium_for(strike.premium_per_contract, contract_size);
        let protocol_fee = self.require_global()?.fee_on(premium_gross);
        let premium_net = premium_gross
            .checked_sub(protocol_fee)
            .unwrap_or_else(Amount::zero);

        Ok(OpenTerms {
            user,
            market_maker: quote.market_maker,
            quote_ref: quote_addr,
            strategy: quote.strategy,
            asset: quote.asset,
            quote_asset: quote.quote_asset,
            strike_price,
            contract_size,
            premium_gross,
            protocol_fee,
            premium_net,
            expiry: quote.expiry_timestamp,
        })
    }

    // 12.4.7: the funds phase shared by both open paths. checks every
    // balance first, then performs the escrow and premium moves that the
    // checks have made infallible.
    fn execute_open(
        &mut self,
        position_id: PositionId,
        terms: &OpenTerms,
    ) -> Result<RecordAddress, EngineError> {
        let (user_coll_asset, user_coll_amount) = terms.user_collateral();
        let (maker_coll_asset, maker_coll_amount) = terms.maker_collateral();
        let user_wallet = RecordAddress::External { account: terms.user };
        let maker = terms.market_maker;

        // --- validation, no mutation past this comment until all checks pass

        let wallet_balance = self.ledger.balance(user_wallet, user_coll_asset);
        if wallet_balance < user_coll_amount {
            return Err(EngineError::Custody(CustodyError::InsufficientBalance {
                holder: user_wallet,
                requested: user_coll_amount,
                available: wallet_balance,
            }));
        }

        let coll_vault = self.vault(maker, maker_coll_asset).ok_or(
            EngineError::VaultNotFound {
                owner: maker,
                asset: maker_coll_asset,
            },
        )?;
        let coll_custody = coll_vault.custody;
        // premium always comes out of the quote-asset vault; for a call that
        // is the same vault as the collateral, so the check is combined
        let coll_need = if maker_coll_asset == terms.quote_asset {
            maker_coll_amount.add(terms.premium_gross)
        } else {
            maker_coll_amount
        };
        if coll_vault.available_liquidity < coll_need {
            return Err(EngineError::Vault(VaultError::InsufficientLiquidity {
                requested: coll_need,
                available: coll_vault.available_liquidity,
            }));
        }

        let premium_custody = if maker_coll_asset == terms.quote_asset {
            coll_custody
        } else {
            let premium_vault = self.vault(maker, terms.quote_asset).ok_or(
                EngineError::VaultNotFound {
                    owner: maker,
                    asset: terms.quote_asset,
                },
            )?;
            if premium_vault.available_liquidity < terms.premium_gross {
                return Err(EngineError::Vault(VaultError::InsufficientLiquidity {
                    requested: terms.premium_gross,
                    available: premium_vault.available_liquidity,
                }));
            }
            premium_vault.custody
        };

        // --- mutation

        let (user_escrow, maker_escrow) = RecordAddress::escrows_for(terms.user, position_id);

        self.ledger
            .transfer(user_coll_asset, user_wallet, user_escrow, user_coll_amount)?;

        self.require_vault_mut(maker, maker_coll_asset)?
            .lock(maker_coll_amount)?;
        self.ledger
            .transfer(maker_coll_asset, coll_custody, maker_escrow, maker_coll_amount)?;

        self.require_vault_mut(maker, terms.quote_asset)?
            .debit_available(terms.premium_gross)?;
        self.ledger.transfer(
            terms.quote_asset,
            premium_custody,
            user_wallet,
            terms.premium_net,
        )?;
        self.ledger.transfer(
            terms.quote_asset,
            premium_custody,
            RecordAddress::Treasury,
            terms.protocol_fee,
        )?;

        let position = Position {
            position_id,
            user: terms.user,
            market_maker: maker,
            strategy: terms.strategy,
            asset: terms.asset,
            quote_asset: terms.quote_asset,
            strike_price: terms.strike_price,
            premium_paid: terms.premium_net,
            contract_size: terms.contract_size,
            created_at: self.current_time,
            expiry_timestamp: terms.expiry,
            quote_ref: terms.quote_ref,
            settlement_price: None,
            status: PositionStatus::Active,
            user_escrow,
            maker_escrow,
        };
        let addr = position.address();
        self.positions.insert(addr, position);
        self.next_position_ids.insert(terms.user, position_id.0 + 1);

        if let Some(maker_record) = self.makers.get_mut(&maker) {
            maker_record.record_open();
        }
        self.require_global_mut()?.record_position(terms.contract_size);

        self.emit_event(EventPayload::PositionOpened(PositionOpenedEvent {
            position: addr,
            user: terms.user,
            market_maker: maker,
            position_id,
            strategy: terms.strategy,
            strike_price: terms.strike_price,
            contract_size: terms.contract_size,
            premium_net: terms.premium_net,
            protocol_fee: terms.protocol_fee,
            expiry: terms.expiry,
        }));
        Ok(addr)
    }
}
