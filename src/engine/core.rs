// 12.1 engine/core.rs: main engine. holds global state, registries, vaults,
// quotes, positions, the token ledger, and the oracle book.

use super::config::EngineConfig;
use super::results::EngineError;
use crate::address::RecordAddress;
use crate::asset::AssetConfig;
use crate::custody::TokenLedger;
use crate::events::{Event, EventId, EventPayload};
use crate::global::GlobalState;
use crate::maker::MarketMaker;
use crate::oracle::{OracleBook, OracleFeed, PriceUpdate};
use crate::position::{Position, PositionRequest};
use crate::quote_book::QuoteBook;
use crate::types::{AccountId, Amount, AssetId, FeedId, Price, Timestamp};
use crate::vault::MakerVault;
use std::collections::{BTreeMap, HashMap};

/** 12.1.1: main engine struct. all state lives here */
#[derive(Debug)]
pub struct Engine {
    pub(super) config: EngineConfig,
    pub(super) global: Option<GlobalState>,
    pub(super) assets: HashMap<AssetId, AssetConfig>,
    pub(super) makers: HashMap<AccountId, MarketMaker>,
    // BTreeMap keyed by (owner, asset) so vault iteration is deterministic
    pub(super) vaults: BTreeMap<(AccountId, AssetId), MakerVault>,
    pub(super) quote_book: QuoteBook,
    pub(super) positions: BTreeMap<RecordAddress, Position>,
    pub(super) requests: BTreeMap<RecordAddress, PositionRequest>,
    // per-user monotonic sequences, next expected id for each
    pub(super) next_position_ids: HashMap<AccountId, u64>,
    pub(super) next_request_ids: HashMap<AccountId, u64>,
    pub(super) ledger: TokenLedger,
    pub(super) oracle: OracleBook,
    pub(super) events: Vec<Event>,
    pub(super) next_event_id: u64,
    pub(super) current_time: Timestamp,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            global: None,
            assets: HashMap::new(),
            makers: HashMap::new(),
            vaults: BTreeMap::new(),
            quote_book: QuoteBook::new(),
            positions: BTreeMap::new(),
            requests: BTreeMap::new(),
            next_position_ids: HashMap::new(),
            next_request_ids: HashMap::new(),
            ledger: TokenLedger::new(),
            oracle: OracleBook::new(),
            events: Vec::new(),
            next_event_id: 1,
            current_time: Timestamp(0),
        }
    }

    pub fn set_time(&mut self, timestamp: Timestamp) {
        self.current_time = timestamp;
    }

    pub fn time(&self) -> Timestamp {
        self.current_time
    }

    pub fn advance_time(&mut self, secs: i64) {
        self.current_time = self.current_time.plus_secs(secs);
    }

    // 12.1.2: read accessors

    pub fn global_state(&self) -> Option<&GlobalState> {
        self.global.as_ref()
    }

    pub fn asset_config(&self, asset: AssetId) -> Option<&AssetConfig> {
        self.assets.get(&asset)
    }

    pub fn market_maker(&self, owner: AccountId) -> Option<&MarketMaker> {
        self.makers.get(&owner)
    }

    pub fn vault(&self, owner: AccountId, asset: AssetId) -> Option<&MakerVault> {
        self.vaults.get(&(owner, asset))
    }

    pub fn vaults_iter(&self) -> impl Iterator<Item = (&(AccountId, AssetId), &MakerVault)> {
        self.vaults.iter()
    }

    pub fn quote_book(&self) -> &QuoteBook {
        &self.quote_book
    }

    pub fn position(&self, addr: &RecordAddress) -> Option<&Position> {
        self.positions.get(addr)
    }

    pub fn positions_iter(&self) -> impl Iterator<Item = (&RecordAddress, &Position)> {
        self.positions.iter()
    }

    pub fn request(&self, addr: &RecordAddress) -> Option<&PositionRequest> {
        self.requests.get(addr)
    }

    pub fn ledger(&self) -> &TokenLedger {
        &self.ledger
    }

    pub fn balance_of(&self, account: AccountId, asset: AssetId) -> Amount {
        self.ledger
            .balance(RecordAddress::External { account }, asset)
    }

    pub fn treasury_balance(&self, asset: AssetId) -> Amount {
        self.ledger.balance(RecordAddress::Treasury, asset)
    }

    // next id a user must pass to create_position / request_position
    pub fn next_position_id(&self, user: AccountId) -> u64 {
        self.next_position_ids.get(&user).copied().unwrap_or(0)
    }

    pub fn next_request_id(&self, user: AccountId) -> u64 {
        self.next_request_ids.get(&user).copied().unwrap_or(0)
    }

    // 12.1.3: oracle and funding hooks

    // Push a price into the book. Settlement reads the latest per feed.
    pub fn update_oracle_price(&mut self, feed: FeedId, price: Price) {
        self.oracle
            .submit(feed, PriceUpdate::new(price, self.current_time));
    }

    pub fn pull_oracle(&mut self, source: &dyn OracleFeed) {
        self.oracle.pull_from(source);
    }

    // Bootstrap/test funding of an external wallet. Not part of the protocol
    // surface; real deployments credit wallets out of band.
    pub fn fund_account(&mut self, account: AccountId, asset: AssetId, amount: Amount) {
        self.ledger
            .mint(RecordAddress::External { account }, asset, amount);
    }

    // 12.1.4: events

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn recent_events(&self, count: usize) -> &[Event] {
        let start = self.events.len().saturating_sub(count);
        &self.events[start..]
    }

    pub(super) fn emit_event(&mut self, payload: EventPayload) {
        let event = Event::new(EventId(self.next_event_id), self.current_time, payload);
        self.next_event_id += 1;

        if self.config.verbose {
            println!("[Event {}] {:?}", event.id.0, event.payload);
        }

        self.events.push(event);

        if self.events.len() > self.config.max_events {
            let drain_count = self.events.len() - self.config.max_events;
            self.events.drain(0..drain_count);
        }
    }

    // 12.1.5: shared lookups used by the operation modules

    pub(super) fn require_global(&self) -> Result<&GlobalState, EngineError> {
        self.global.as_ref().ok_or(EngineError::NotInitialized)
    }

    pub(super) fn require_global_mut(&mut self) -> Result<&mut GlobalState, EngineError> {
        self.global.as_mut().ok_or(EngineError::NotInitialized)
    }

    pub(super) fn require_authority(&self, caller: AccountId) -> Result<&GlobalState, EngineError> {
        let global = self.require_global()?;
        if global.authority != caller {
            return Err(EngineError::Unauthorized);
        }
        Ok(global)
    }

    pub(super) fn require_not_paused(&self) -> Result<(), EngineError> {
        if self.require_global()?.paused {
            return Err(EngineError::ProtocolPaused);
        }
        Ok(())
    }

    pub(super) fn require_asset(&self, asset: AssetId) -> Result<&AssetConfig, EngineError> {
        self.assets
            .get(&asset)
            .ok_or(EngineError::AssetNotFound(asset))
    }

    pub(super) fn require_enabled_asset(&self, asset: AssetId) -> Result<&AssetConfig, EngineError> {
        let config = self.require_asset(asset)?;
        if !config.enabled {
            return Err(EngineError::AssetDisabled);
        }
        Ok(config)
    }

    pub(super) fn require_active_maker(&self, owner: AccountId) -> Result<&MarketMaker, EngineError> {
        let maker = self
            .makers
            .get(&owner)
            .ok_or(EngineError::MakerNotFound(owner))?;
        if !maker.active {
            return Err(EngineError::MarketMakerNotActive);
        }
        Ok(maker)
    }

    pub(super) fn require_vault_mut(
        &mut self,
        owner: AccountId,
        asset: AssetId,
    ) -> Result<&mut MakerVault, EngineError> {
        self.vaults
            .get_mut(&(owner, asset))
            .ok_or(EngineError::VaultNotFound { owner, asset })
    }
}
