// 12.2 engine/admin.rs: authority-gated operations. bootstrap, pause, fees,
// and the asset registry.

use super::core::Engine;
use super::results::EngineError;
use crate::asset::{AssetConfig, AssetParams, AssetUpdate};
use crate::events::{
    AssetAddedEvent, AssetUpdatedEvent, EventPayload, GlobalStateInitializedEvent,
    GlobalStateUpdatedEvent,
};
use crate::global::{GlobalState, GlobalStateUpdate};
use crate::types::{AccountId, AssetId, Bps};

impl Engine {
    // 12.2.1: one-time bootstrap. the caller becomes the authority.
    pub fn initialize_global_state(
        &mut self,
        authority: AccountId,
        treasury: AccountId,
        fee_bps: Bps,
    ) -> Result<(), EngineError> {
        if self.global.is_some() {
            return Err(EngineError::AlreadyInitialized);
        }

        self.global = Some(GlobalState::new(
            authority,
            treasury,
            fee_bps,
            self.current_time,
        ));

        self.emit_event(EventPayload::GlobalStateInitialized(
            GlobalStateInitializedEvent {
                authority,
                treasury,
                fee_bps,
            },
        ));
        Ok(())
    }

    // 12.2.2: authority-only partial update. pause is the circuit breaker:
    // it blocks opens but never settlement.
    pub fn update_global_state(
        &mut self,
        caller: AccountId,
        update: GlobalStateUpdate,
    ) -> Result<(), EngineError> {
        self.require_authority(caller)?;

        let global = self.require_global_mut()?;
        global.apply(update);
        let (authority, paused, fee_bps) =
            (global.authority, global.paused, global.protocol_fee_bps);

        self.emit_event(EventPayload::GlobalStateUpdated(GlobalStateUpdatedEvent {
            authority,
            paused,
            fee_bps,
        }));
        Ok(())
    }

    // 12.2.3: register a tradable asset. enabled from the start.
    pub fn add_asset(
        &mut self,
        caller: AccountId,
        asset: AssetId,
        params: AssetParams,
    ) -> Result<(), EngineError> {
        self.require_authority(caller)?;

        if self.assets.contains_key(&asset) {
            return Err(EngineError::AssetAlreadyExists(asset));
        }
        if params.min_strike_pct == 0 || params.min_strike_pct > params.max_strike_pct {
            return Err(EngineError::InvalidStrikeRange);
        }
        if params.min_expiry_secs <= 0 || params.min_expiry_secs > params.max_expiry_secs {
            return Err(EngineError::InvalidExpiryRange);
        }

        let quote_asset = params.quote_asset;
        self.assets.insert(asset, AssetConfig::new(asset, params));

        self.emit_event(EventPayload::AssetAdded(AssetAddedEvent {
            asset,
            quote_asset,
        }));
        Ok(())
    }

    // 12.2.4: authority-only parameter change, including the enabled flag.
    // disabling stops new positions on the asset; live positions still settle.
    pub fn update_asset(
        &mut self,
        caller: AccountId,
        asset: AssetId,
        update: AssetUpdate,
    ) -> Result<(), EngineError> {
        self.require_authority(caller)?;

        // validate on a copy so a rejected update leaves the registry untouched
        let mut updated = self
            .assets
            .get(&asset)
            .ok_or(EngineError::AssetNotFound(asset))?
            .clone();
        updated.apply(update);
        if updated.min_strike_pct == 0 || updated.min_strike_pct > updated.max_strike_pct {
            return Err(EngineError::InvalidStrikeRange);
        }
        if updated.min_expiry_secs <= 0 || updated.min_expiry_secs > updated.max_expiry_secs {
            return Err(EngineError::InvalidExpiryRange);
        }
        let enabled = updated.enabled;
        self.assets.insert(asset, updated);

        self.emit_event(EventPayload::AssetUpdated(AssetUpdatedEvent {
            asset,
            enabled,
        }));
        Ok(())
    }
}
