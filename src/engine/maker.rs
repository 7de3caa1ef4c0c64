// 12.3 engine/maker.rs: the liquidity side. maker registration, vault
// deposits and withdrawals, and the quote ladder lifecycle.

use super::config::StrikeValidation;
use super::core::Engine;
use super::results::EngineError;
use crate::address::RecordAddress;
use crate::events::{
    EventPayload, LiquidityEvent, MarketMakerRegisteredEvent, QuoteSubmittedEvent,
    QuoteUpdatedEvent, VaultInitializedEvent,
};
use crate::maker::MarketMaker;
use crate::quote_book::{Quote, QuoteUpdate, StrikeQuote, MAX_STRIKES_PER_QUOTE};
use crate::types::{AccountId, Amount, AssetId, StrategyType, Timestamp};
use crate::vault::MakerVault;

// Everything a maker supplies when publishing a ladder. The quote's address is
// derived from (owner, asset, strategy, expiry), so those four are identity.
#[derive(Debug, Clone)]
pub struct QuoteParams {
    pub asset: AssetId,
    pub strategy: StrategyType,
    pub strikes: Vec<StrikeQuote>,
    pub expiry_timestamp: Timestamp,
    pub min_size: Amount,
    pub max_size: Amount,
}

impl Engine {
    // 12.3.1: register the caller as a market maker.
    pub fn register_market_maker(&mut self, owner: AccountId) -> Result<(), EngineError> {
        self.require_global()?;

        if self.makers.contains_key(&owner) {
            return Err(EngineError::MakerAlreadyRegistered(owner));
        }
        self.makers
            .insert(owner, MarketMaker::new(owner, self.current_time));

        self.emit_event(EventPayload::MarketMakerRegistered(
            MarketMakerRegisteredEvent { owner },
        ));
        Ok(())
    }

    // 12.3.2: create the per-asset vault a maker deposits into. one per
    // (owner, asset). creation only needs the asset registered; deposits
    // require it enabled.
    pub fn initialize_vault(&mut self, owner: AccountId, asset: AssetId) -> Result<(), EngineError> {
        self.require_active_maker(owner)?;
        self.require_asset(asset)?;

        if self.vaults.contains_key(&(owner, asset)) {
            return Err(EngineError::VaultAlreadyExists { owner, asset });
        }
        self.vaults
            .insert((owner, asset), MakerVault::new(owner, asset, self.current_time));

        self.emit_event(EventPayload::VaultInitialized(VaultInitializedEvent {
            owner,
            asset,
        }));
        Ok(())
    }

    // 12.3.3: move tokens from the maker's wallet into vault custody.
    pub fn deposit_liquidity(
        &mut self,
        owner: AccountId,
        asset: AssetId,
        amount: Amount,
    ) -> Result<(), EngineError> {
        self.require_active_maker(owner)?;
        self.require_enabled_asset(asset)?;

        let custody = self
            .vaults
            .get(&(owner, asset))
            .ok_or(EngineError::VaultNotFound { owner, asset })?
            .custody;

        // wallet balance check happens inside the transfer, before any
        // vault bookkeeping moves
        self.ledger.transfer(
            asset,
            RecordAddress::External { account: owner },
            custody,
            amount,
        )?;
        let vault = self.require_vault_mut(owner, asset)?;
        vault.deposit(amount)?;
        let available_after = vault.available_liquidity;

        self.emit_event(EventPayload::LiquidityDeposited(LiquidityEvent {
            owner,
            asset,
            amount,
            available_after,
        }));
        Ok(())
    }

    // 12.3.4: withdraw available (never locked) liquidity back to the wallet.
    pub fn withdraw_liquidity(
        &mut self,
        owner: AccountId,
        asset: AssetId,
        amount: Amount,
    ) -> Result<(), EngineError> {
        self.require_active_maker(owner)?;

        let vault = self.require_vault_mut(owner, asset)?;
        vault.withdraw(amount)?;
        let custody = vault.custody;
        let available_after = vault.available_liquidity;

        self.ledger.transfer(
            asset,
            custody,
            RecordAddress::External { account: owner },
            amount,
        )?;

        self.emit_event(EventPayload::LiquidityWithdrawn(LiquidityEvent {
            owner,
            asset,
            amount,
            available_after,
        }));
        Ok(())
    }

    // 12.3.5: publish a strike ladder. one quote per
    // (owner, asset, strategy, expiry); re-publishing the same key is an
    // update, not a second submit.
    pub fn submit_quote(&mut self, owner: AccountId, params: QuoteParams) -> Result<(), EngineError> {
        self.require_active_maker(owner)?;
        let asset_config = self.require_enabled_asset(params.asset)?.clone();

        if !asset_config.expiry_in_bounds(params.expiry_timestamp, self.current_time) {
            return Err(EngineError::InvalidExpiryRange);
        }
        Self::validate_ladder(&params.strikes, params.min_size, params.max_size)?;

        if self.config.strike_validation == StrikeValidation::OracleChecked {
            let spot = self
                .oracle
                .fresh_price(
                    asset_config.price_feed,
                    self.current_time,
                    self.config.oracle_staleness_secs,
                )?
                .price;
            for strike in &params.strikes {
                if !asset_config.strike_in_bounds(strike.strike_price, spot) {
                    return Err(EngineError::StrikeOutOfBounds);
                }
            }
        }

        let quote = Quote {
            market_maker: owner,
            asset: params.asset,
            quote_asset: asset_config.quote_asset,
            strategy: params.strategy,
            strikes: params.strikes,
            expiry_timestamp: params.expiry_timestamp,
            min_size: params.min_size,
            max_size: params.max_size,
            last_updated: self.current_time,
            active: true,
        };
        if self.quote_book.contains(&quote.address()) {
            return Err(EngineError::QuoteAlreadyExists(quote.address()));
        }
        let strike_count = quote.strikes.len();
        let (asset, strategy, expiry) = (quote.asset, quote.strategy, quote.expiry_timestamp);
        let addr = self.quote_book.insert(quote);

        self.emit_event(EventPayload::QuoteSubmitted(QuoteSubmittedEvent {
            quote: addr,
            owner,
            asset,
            strategy,
            strike_count,
            expiry,
        }));
        Ok(())
    }

    // 12.3.6: partial update by the quote owner. the expiry is part of the
    // quote's address and cannot change; a new expiry is a new quote.
    pub fn update_quote(
        &mut self,
        owner: AccountId,
        quote_addr: RecordAddress,
        update: QuoteUpdate,
    ) -> Result<(), EngineError> {
        self.require_active_maker(owner)?;

        let now = self.current_time;
        let quote = self
            .quote_book
            .get(&quote_addr)
            .ok_or(EngineError::QuoteNotFound(quote_addr))?;
        if quote.market_maker != owner {
            return Err(EngineError::Unauthorized);
        }

        let min_size = update.min_size.unwrap_or(quote.min_size);
        let max_size = update.max_size.unwrap_or(quote.max_size);
        let strikes_ref = update.strikes.as_deref().unwrap_or(&quote.strikes);
        Self::validate_ladder(strikes_ref, min_size, max_size)?;

        let quote = self
            .quote_book
            .get_mut(&quote_addr)
            .ok_or(EngineError::QuoteNotFound(quote_addr))?;
        if let Some(strikes) = update.strikes {
            quote.strikes = strikes;
        }
        quote.min_size = min_size;
        quote.max_size = max_size;
        if let Some(active) = update.active {
            quote.active = active;
        }
        quote.last_updated = now;
        let active = quote.active;

        self.emit_event(EventPayload::QuoteUpdated(QuoteUpdatedEvent {
            quote: quote_addr,
            active,
        }));
        Ok(())
    }

    // 12.3.7: pull a quote from matching without touching its ladder.
    pub fn deactivate_quote(
        &mut self,
        owner: AccountId,
        quote_addr: RecordAddress,
    ) -> Result<(), EngineError> {
        self.update_quote(
            owner,
            quote_addr,
            QuoteUpdate {
                active: Some(false),
                ..Default::default()
            },
        )
    }

    fn validate_ladder(
        strikes: &[StrikeQuote],
        min_size: Amount,
        max_size: Amount,
    ) -> Result<(), EngineError> {
        if strikes.is_empty() {
            return Err(EngineError::InvalidQuoteParameters);
        }
        if strikes.len() > MAX_STRIKES_PER_QUOTE {
            return Err(EngineError::TooManyStrikes);
        }
        if min_size.is_zero() || min_size > max_size {
            return Err(EngineError::InvalidQuoteParameters);
        }
        Ok(())
    }
}
