//! Settlement outcome tests.
//!
//! Concrete scenarios pinning the money flows at expiry: who ends up holding
//! what for calls and puts, in and out of the money, plus the guard rails
//! around double settlement and stale oracle data.

use options_core::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

const AUTHORITY: AccountId = AccountId(1);
const TREASURY: AccountId = AccountId(2);
const MAKER: AccountId = AccountId(10);
const USER: AccountId = AccountId(100);

const USDC: AssetId = AssetId(0);
const SOL: AssetId = AssetId(1);
const FEED: FeedId = FeedId(1);

const DAY: i64 = 86_400;

fn amt(v: i64) -> Amount {
    Amount::new_unchecked(Decimal::from(v))
}

fn price(v: i64) -> Price {
    Price::new_unchecked(Decimal::from(v))
}

fn bootstrap() -> Engine {
    let mut engine = Engine::new(EngineConfig::default());
    engine.set_time(Timestamp(1_000_000));
    engine
        .initialize_global_state(AUTHORITY, TREASURY, Bps::new(100))
        .unwrap();
    engine
        .add_asset(
            AUTHORITY,
            SOL,
            AssetParams {
                quote_asset: USDC,
                price_feed: FEED,
                min_strike_pct: 50,
                max_strike_pct: 200,
                min_expiry_secs: 3600,
                max_expiry_secs: 90 * DAY,
                decimals: 9,
            },
        )
        .unwrap();
    engine.register_market_maker(MAKER).unwrap();
    engine.initialize_vault(MAKER, USDC).unwrap();
    engine.initialize_vault(MAKER, SOL).unwrap();
    engine.fund_account(MAKER, USDC, amt(100_000));
    engine.fund_account(MAKER, SOL, amt(1_000));
    engine.deposit_liquidity(MAKER, USDC, amt(100_000)).unwrap();
    engine.deposit_liquidity(MAKER, SOL, amt(1_000)).unwrap();
    engine
}

// Open a 10-contract covered call at strike 200, premium 5 per contract.
// Gross premium 50, fee 0.5, user nets 49.5; maker locks 2000 USDC.
fn open_call(engine: &mut Engine) -> (RecordAddress, Timestamp) {
    let expiry = engine.time().plus_secs(7 * DAY);
    engine
        .submit_quote(
            MAKER,
            QuoteParams {
                asset: SOL,
                strategy: StrategyType::CoveredCall,
                strikes: vec![StrikeQuote {
                    strike_price: price(200),
                    premium_per_contract: amt(5),
                    available_contracts: amt(100),
                }],
                expiry_timestamp: expiry,
                min_size: amt(1),
                max_size: amt(50),
            },
        )
        .unwrap();

    engine.fund_account(USER, SOL, amt(10));
    let quote = engine
        .quote_book()
        .find_matching(SOL, StrategyType::CoveredCall, price(200), amt(10), engine.time())
        .unwrap();
    let addr = engine
        .create_position(USER, PositionId(0), quote, price(200), amt(10))
        .unwrap();
    (addr, expiry)
}

// Open a 5-contract cash-secured put at strike 180, premium 4 per contract.
// Gross premium 20, fee 0.2, user nets 19.8; maker locks 5 SOL.
fn open_put(engine: &mut Engine) -> (RecordAddress, Timestamp) {
    let expiry = engine.time().plus_secs(7 * DAY);
    engine
        .submit_quote(
            MAKER,
            QuoteParams {
                asset: SOL,
                strategy: StrategyType::CashSecuredPut,
                strikes: vec![StrikeQuote {
                    strike_price: price(180),
                    premium_per_contract: amt(4),
                    available_contracts: amt(100),
                }],
                expiry_timestamp: expiry,
                min_size: amt(1),
                max_size: amt(50),
            },
        )
        .unwrap();

    engine.fund_account(USER, USDC, amt(900));
    let quote = engine
        .quote_book()
        .find_matching(SOL, StrategyType::CashSecuredPut, price(180), amt(5), engine.time())
        .unwrap();
    let addr = engine
        .create_position(USER, PositionId(0), quote, price(180), amt(5))
        .unwrap();
    (addr, expiry)
}

#[test]
fn covered_call_itm_swaps_at_strike() {
    let mut engine = bootstrap();
    let (addr, expiry) = open_call(&mut engine);

    engine.set_time(expiry);
    engine.update_oracle_price(FEED, price(215));
    let status = engine.settle_position(addr).unwrap();
    assert_eq!(status, PositionStatus::SettledItm);

    // user sold 10 SOL at the 200 strike: 2000 USDC plus the 49.5 premium
    assert!(engine.balance_of(USER, SOL).is_zero());
    assert_eq!(engine.balance_of(USER, USDC).value(), dec!(2049.5));

    // maker took delivery of the underlying in its wallet
    assert_eq!(engine.balance_of(MAKER, SOL).value(), dec!(10));

    // the 2000 lock is gone from the vault's books entirely
    let vault = engine.vault(MAKER, USDC).unwrap();
    assert!(vault.locked_liquidity.is_zero());
    assert_eq!(vault.available_liquidity.value(), dec!(97950));

    assert_eq!(engine.treasury_balance(USDC).value(), dec!(0.5));
    assert_eq!(
        engine.position(&addr).unwrap().settlement_price,
        Some(price(215))
    );
}

#[test]
fn covered_call_otm_returns_both_sides() {
    let mut engine = bootstrap();
    let (addr, expiry) = open_call(&mut engine);

    engine.set_time(expiry);
    engine.update_oracle_price(FEED, price(190));
    let status = engine.settle_position(addr).unwrap();
    assert_eq!(status, PositionStatus::SettledOtm);

    // user keeps the underlying and the premium
    assert_eq!(engine.balance_of(USER, SOL).value(), dec!(10));
    assert_eq!(engine.balance_of(USER, USDC).value(), dec!(49.5));

    // maker collateral returned into the vault as available liquidity
    let vault = engine.vault(MAKER, USDC).unwrap();
    assert!(vault.locked_liquidity.is_zero());
    assert_eq!(vault.available_liquidity.value(), dec!(99950));
}

#[test]
fn at_the_money_settles_like_otm() {
    let mut engine = bootstrap();
    let (addr, expiry) = open_call(&mut engine);

    engine.set_time(expiry);
    engine.update_oracle_price(FEED, price(200));
    let status = engine.settle_position(addr).unwrap();
    assert_eq!(status, PositionStatus::SettledAtm);

    assert_eq!(engine.balance_of(USER, SOL).value(), dec!(10));
    let vault = engine.vault(MAKER, USDC).unwrap();
    assert!(vault.locked_liquidity.is_zero());
    assert_eq!(vault.available_liquidity.value(), dec!(99950));
}

#[test]
fn put_assigned_below_strike() {
    let mut engine = bootstrap();
    let (addr, expiry) = open_put(&mut engine);

    engine.set_time(expiry);
    engine.update_oracle_price(FEED, price(160));
    let status = engine.settle_position(addr).unwrap();
    assert_eq!(status, PositionStatus::SettledItm);

    // user bought 5 SOL at the 180 strike
    assert_eq!(engine.balance_of(USER, SOL).value(), dec!(5));
    assert_eq!(engine.balance_of(USER, USDC).value(), dec!(19.8));

    // maker received the strike cash in its wallet, SOL lock cleared
    assert_eq!(engine.balance_of(MAKER, USDC).value(), dec!(900));
    let vault = engine.vault(MAKER, SOL).unwrap();
    assert!(vault.locked_liquidity.is_zero());
    assert_eq!(vault.available_liquidity.value(), dec!(995));
}

#[test]
fn put_expires_worthless_above_strike() {
    let mut engine = bootstrap();
    let (addr, expiry) = open_put(&mut engine);

    engine.set_time(expiry);
    engine.update_oracle_price(FEED, price(195));
    let status = engine.settle_position(addr).unwrap();
    assert_eq!(status, PositionStatus::SettledOtm);

    // user's cash comes back on top of the premium
    assert_eq!(engine.balance_of(USER, USDC).value(), dec!(919.8));
    assert!(engine.balance_of(USER, SOL).is_zero());

    let vault = engine.vault(MAKER, SOL).unwrap();
    assert!(vault.locked_liquidity.is_zero());
    assert_eq!(vault.available_liquidity.value(), dec!(1000));
}

#[test]
fn cannot_settle_before_expiry() {
    let mut engine = bootstrap();
    let (addr, expiry) = open_call(&mut engine);

    engine.set_time(Timestamp(expiry.as_secs() - 1));
    engine.update_oracle_price(FEED, price(215));
    assert!(matches!(
        engine.settle_position(addr),
        Err(EngineError::NotExpired)
    ));
}

#[test]
fn cannot_settle_twice() {
    let mut engine = bootstrap();
    let (addr, expiry) = open_call(&mut engine);

    engine.set_time(expiry);
    engine.update_oracle_price(FEED, price(215));
    engine.settle_position(addr).unwrap();

    let user_usdc = engine.balance_of(USER, USDC);
    assert!(matches!(
        engine.settle_position(addr),
        Err(EngineError::AlreadySettled)
    ));
    assert_eq!(engine.balance_of(USER, USDC), user_usdc);
}

#[test]
fn stale_oracle_blocks_settlement() {
    let mut engine = bootstrap();
    let (addr, expiry) = open_call(&mut engine);

    // price printed a minute before expiry: exactly at the staleness bound
    engine.set_time(Timestamp(expiry.as_secs() - 60));
    engine.update_oracle_price(FEED, price(215));
    engine.set_time(expiry);

    assert!(matches!(
        engine.settle_position(addr),
        Err(EngineError::Oracle(OracleError::StalePrice { .. }))
    ));

    // a fresh print unblocks it
    engine.update_oracle_price(FEED, price(215));
    assert_eq!(
        engine.settle_position(addr).unwrap(),
        PositionStatus::SettledItm
    );
}

#[test]
fn missing_feed_blocks_settlement() {
    let mut engine = bootstrap();
    let (addr, expiry) = open_call(&mut engine);

    // note: expiry price never submitted, book still holds nothing for FEED
    engine.set_time(expiry);
    assert!(matches!(
        engine.settle_position(addr),
        Err(EngineError::Oracle(OracleError::Unavailable(_)))
    ));
}

#[test]
fn pause_never_blocks_settlement() {
    let mut engine = bootstrap();
    let (addr, expiry) = open_call(&mut engine);

    engine
        .update_global_state(
            AUTHORITY,
            GlobalStateUpdate {
                paused: Some(true),
                ..Default::default()
            },
        )
        .unwrap();

    engine.set_time(expiry);
    engine.update_oracle_price(FEED, price(215));
    assert!(engine.settle_position(addr).is_ok());
}

#[test]
fn disabled_asset_still_settles() {
    let mut engine = bootstrap();
    let (addr, expiry) = open_call(&mut engine);

    engine
        .update_asset(
            AUTHORITY,
            SOL,
            AssetUpdate {
                enabled: Some(false),
                ..Default::default()
            },
        )
        .unwrap();

    engine.set_time(expiry);
    engine.update_oracle_price(FEED, price(190));
    assert_eq!(
        engine.settle_position(addr).unwrap(),
        PositionStatus::SettledOtm
    );
}

#[test]
fn sweep_settles_everything_ready() {
    let mut engine = bootstrap();
    let (call_addr, expiry) = open_call(&mut engine);

    // second user, same expiry, settles in the same sweep
    let other = AccountId(101);
    engine.fund_account(other, SOL, amt(10));
    let quote = engine
        .quote_book()
        .find_matching(SOL, StrategyType::CoveredCall, price(200), amt(10), engine.time())
        .unwrap();
    let other_addr = engine
        .create_position(other, PositionId(0), quote, price(200), amt(10))
        .unwrap();

    engine.set_time(expiry);
    engine.update_oracle_price(FEED, price(210));
    let settled = engine.settle_expired_positions();

    assert_eq!(settled.len(), 2);
    assert!(settled.iter().any(|(a, _)| *a == call_addr));
    assert!(settled.iter().any(|(a, _)| *a == other_addr));
    assert!(engine.settle_expired_positions().is_empty());
}

#[test]
fn settlement_updates_maker_reputation() {
    let mut engine = bootstrap();
    let (addr, expiry) = open_call(&mut engine);

    engine.set_time(expiry);
    engine.update_oracle_price(FEED, price(215));
    engine.settle_position(addr).unwrap();

    let maker = engine.market_maker(MAKER).unwrap();
    assert_eq!(maker.total_positions, 1);
    assert_eq!(maker.completed_positions, 1);
    assert_eq!(maker.reputation_score, INITIAL_REPUTATION + 1);
}
