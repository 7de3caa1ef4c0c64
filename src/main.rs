//! Peer-to-Pool Options Engine Simulation.
//!
//! Demonstrates the full custody lifecycle including maker vault funding,
//! quote ladders, position escrow, and oracle-driven expiry settlement.

use options_core::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

const AUTHORITY: AccountId = AccountId(1);
const TREASURY: AccountId = AccountId(2);
const MAKER: AccountId = AccountId(10);
const ALICE: AccountId = AccountId(100);
const BOB: AccountId = AccountId(101);

const USDC: AssetId = AssetId(0);
const SOL: AssetId = AssetId(1);
const SOL_FEED: FeedId = FeedId(1);

const DAY: i64 = 86_400;

fn main() {
    println!("Peer-to-Pool Options Engine Simulation");
    println!("Covered Calls and Cash-Secured Puts, Single Maker Pool\n");

    scenario_1_covered_call_itm();
    scenario_2_covered_call_otm();
    scenario_3_cash_secured_put();
    scenario_4_two_phase_open();
    scenario_5_settlement_sweep();

    println!("\nAll simulations completed successfully.");
}

/// Bootstrap a protocol with one asset, one funded maker, and a call ladder.
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
                price_feed: SOL_FEED,
                min_strike_pct: 50,
                max_strike_pct: 200,
                min_expiry_secs: DAY,
                max_expiry_secs: 90 * DAY,
                decimals: 9,
            },
        )
        .unwrap();

    engine.register_market_maker(MAKER).unwrap();
    engine.initialize_vault(MAKER, USDC).unwrap();
    engine.initialize_vault(MAKER, SOL).unwrap();

    engine.fund_account(MAKER, USDC, Amount::new_unchecked(dec!(100000)));
    engine.fund_account(MAKER, SOL, Amount::new_unchecked(dec!(500)));
    engine
        .deposit_liquidity(MAKER, USDC, Amount::new_unchecked(dec!(100000)))
        .unwrap();
    engine
        .deposit_liquidity(MAKER, SOL, Amount::new_unchecked(dec!(500)))
        .unwrap();

    engine.update_oracle_price(SOL_FEED, Price::new_unchecked(dec!(190)));
    engine
}

fn call_ladder(engine: &mut Engine, expiry: Timestamp) {
    engine
        .submit_quote(
            MAKER,
            QuoteParams {
                asset: SOL,
                strategy: StrategyType::CoveredCall,
                strikes: vec![
                    StrikeQuote {
                        strike_price: Price::new_unchecked(dec!(200)),
                        premium_per_contract: Amount::new_unchecked(dec!(5)),
                        available_contracts: Amount::new_unchecked(dec!(100)),
                    },
                    StrikeQuote {
                        strike_price: Price::new_unchecked(dec!(220)),
                        premium_per_contract: Amount::new_unchecked(dec!(2.5)),
                        available_contracts: Amount::new_unchecked(dec!(100)),
                    },
                ],
                expiry_timestamp: expiry,
                min_size: Amount::new_unchecked(dec!(1)),
                max_size: Amount::new_unchecked(dec!(50)),
            },
        )
        .unwrap();
}

/// Covered call exercised above the strike: escrows swap at the strike.
fn scenario_1_covered_call_itm() {
    println!("Scenario 1: Covered Call, In The Money\n");

    let mut engine = bootstrap();
    let expiry = engine.time().plus_secs(7 * DAY);
    call_ladder(&mut engine, expiry);

    engine.fund_account(ALICE, SOL, Amount::new_unchecked(dec!(10)));
    let quote_addr = engine
        .quote_book()
        .find_matching(
            SOL,
            StrategyType::CoveredCall,
            Price::new_unchecked(dec!(200)),
            Amount::new_unchecked(dec!(10)),
            engine.time(),
        )
        .unwrap();

    let pos = engine
        .create_position(
            ALICE,
            PositionId(0),
            quote_addr,
            Price::new_unchecked(dec!(200)),
            Amount::new_unchecked(dec!(10)),
        )
        .unwrap();

    println!("  Alice escrows 10 SOL against the $200 call");
    println!("  Premium received: {} USDC", engine.balance_of(ALICE, USDC));
    println!("  Protocol fee collected: {} USDC", engine.treasury_balance(USDC));

    engine.set_time(expiry);
    engine.update_oracle_price(SOL_FEED, Price::new_unchecked(dec!(215)));
    let status = engine.settle_position(pos).unwrap();

    println!("\n  Expiry at $215, settled {:?}", status);
    println!("  Alice: {} USDC, {} SOL", engine.balance_of(ALICE, USDC), engine.balance_of(ALICE, SOL));
    println!("  Maker wallet: {} SOL", engine.balance_of(MAKER, SOL));
    let vault = engine.vault(MAKER, USDC).unwrap();
    println!("  Maker USDC vault: {} available, {} locked\n", vault.available_liquidity, vault.locked_liquidity);
}

/// Covered call expiring worthless: everyone gets their collateral back.
fn scenario_2_covered_call_otm() {
    println!("Scenario 2: Covered Call, Out Of The Money\n");

    let mut engine = bootstrap();
    let expiry = engine.time().plus_secs(7 * DAY);
    call_ladder(&mut engine, expiry);

    engine.fund_account(ALICE, SOL, Amount::new_unchecked(dec!(10)));
    let quote_addr = engine
        .quote_book()
        .find_matching(
            SOL,
            StrategyType::CoveredCall,
            Price::new_unchecked(dec!(200)),
            Amount::new_unchecked(dec!(10)),
            engine.time(),
        )
        .unwrap();
    let pos = engine
        .create_position(
            ALICE,
            PositionId(0),
            quote_addr,
            Price::new_unchecked(dec!(200)),
            Amount::new_unchecked(dec!(10)),
        )
        .unwrap();

    engine.set_time(expiry);
    engine.update_oracle_price(SOL_FEED, Price::new_unchecked(dec!(185)));
    let status = engine.settle_position(pos).unwrap();

    println!("  Expiry at $185, settled {:?}", status);
    println!("  Alice keeps her {} SOL plus {} USDC premium", engine.balance_of(ALICE, SOL), engine.balance_of(ALICE, USDC));
    let vault = engine.vault(MAKER, USDC).unwrap();
    println!("  Maker USDC vault restored: {} available, {} locked\n", vault.available_liquidity, vault.locked_liquidity);
}

/// Cash-secured put assigned below the strike.
fn scenario_3_cash_secured_put() {
    println!("Scenario 3: Cash-Secured Put, Assigned\n");

    let mut engine = bootstrap();
    let expiry = engine.time().plus_secs(14 * DAY);
    engine
        .submit_quote(
            MAKER,
            QuoteParams {
                asset: SOL,
                strategy: StrategyType::CashSecuredPut,
                strikes: vec![StrikeQuote {
                    strike_price: Price::new_unchecked(dec!(180)),
                    premium_per_contract: Amount::new_unchecked(dec!(4)),
                    available_contracts: Amount::new_unchecked(dec!(50)),
                }],
                expiry_timestamp: expiry,
                min_size: Amount::new_unchecked(dec!(1)),
                max_size: Amount::new_unchecked(dec!(20)),
            },
        )
        .unwrap();

    // Bob escrows cash at the strike: 5 contracts * $180
    engine.fund_account(BOB, USDC, Amount::new_unchecked(dec!(900)));
    let quote_addr = engine
        .quote_book()
        .find_matching(
            SOL,
            StrategyType::CashSecuredPut,
            Price::new_unchecked(dec!(180)),
            Amount::new_unchecked(dec!(5)),
            engine.time(),
        )
        .unwrap();
    let pos = engine
        .create_position(
            BOB,
            PositionId(0),
            quote_addr,
            Price::new_unchecked(dec!(180)),
            Amount::new_unchecked(dec!(5)),
        )
        .unwrap();

    println!("  Bob escrows $900 against the $180 put, premium {} USDC", engine.balance_of(BOB, USDC));

    engine.set_time(expiry);
    engine.update_oracle_price(SOL_FEED, Price::new_unchecked(dec!(160)));
    let status = engine.settle_position(pos).unwrap();

    println!("  Expiry at $160, settled {:?}", status);
    println!("  Bob now holds {} SOL, {} USDC", engine.balance_of(BOB, SOL), engine.balance_of(BOB, USDC));
    println!("  Maker wallet: {} USDC\n", engine.balance_of(MAKER, USDC));
}

/// Request, confirm, reject, and the expiry cancel path.
fn scenario_4_two_phase_open() {
    println!("Scenario 4: Two-Phase Open\n");

    let mut engine = bootstrap();
    let expiry = engine.time().plus_secs(7 * DAY);
    call_ladder(&mut engine, expiry);

    engine.fund_account(ALICE, SOL, Amount::new_unchecked(dec!(20)));
    let quote_addr = engine
        .quote_book()
        .find_matching(
            SOL,
            StrategyType::CoveredCall,
            Price::new_unchecked(dec!(200)),
            Amount::new_unchecked(dec!(5)),
            engine.time(),
        )
        .unwrap();

    let req = engine
        .request_position(
            ALICE,
            RequestId(0),
            quote_addr,
            Price::new_unchecked(dec!(200)),
            Amount::new_unchecked(dec!(5)),
        )
        .unwrap();
    println!("  Alice requests 5 contracts, maker confirms within the window");

    engine.advance_time(10);
    engine.confirm_position(MAKER, req, PositionId(0)).unwrap();
    println!("  Position opened, premium {} USDC", engine.balance_of(ALICE, USDC));

    // second request left to expire
    let req2 = engine
        .request_position(
            ALICE,
            RequestId(1),
            quote_addr,
            Price::new_unchecked(dec!(200)),
            Amount::new_unchecked(dec!(5)),
        )
        .unwrap();
    engine.advance_time(60);
    engine.cancel_expired_request(ALICE, req2).unwrap();
    println!("  Second request expired unconfirmed, contracts restored\n");
}

/// Mixed book swept by the settlement crank at one expiry.
fn scenario_5_settlement_sweep() {
    println!("Scenario 5: Settlement Sweep\n");

    let mut engine = bootstrap();
    let expiry = engine.time().plus_secs(7 * DAY);
    call_ladder(&mut engine, expiry);

    engine.fund_account(ALICE, SOL, Amount::new_unchecked(dec!(10)));
    engine.fund_account(BOB, SOL, Amount::new_unchecked(dec!(10)));

    for (user, strike) in [(ALICE, dec!(200)), (BOB, dec!(220))] {
        let strike = Price::new_unchecked(strike);
        let size = Amount::new_unchecked(dec!(10));
        let quote_addr = engine
            .quote_book()
            .find_matching(SOL, StrategyType::CoveredCall, strike, size, engine.time())
            .unwrap();
        engine
            .create_position(user, PositionId(0), quote_addr, strike, size)
            .unwrap();
    }

    engine.set_time(expiry);
    engine.update_oracle_price(SOL_FEED, Price::new_unchecked(dec!(210)));
    let settled = engine.settle_expired_positions();

    for (addr, status) in &settled {
        println!("  {} settled {:?}", addr, status);
    }
    let supply: Decimal = engine.ledger().total_supply(SOL).value();
    println!("  SOL supply after sweep: {} (conserved)", supply);
    println!("  Positions settled: {}", settled.len());
}
