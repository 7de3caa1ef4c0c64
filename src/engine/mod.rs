// 12.0: custody and settlement engine. coordinates governance, maker vaults,
// quote ladders, position escrow, and oracle-driven expiry settlement.
// deterministic and event-driven with no external I/O.

mod admin;
mod config;
mod core;
mod maker;
mod positions;
mod results;
mod settlement;

pub use config::{EngineConfig, StrikeValidation};
pub use core::Engine;
pub use maker::QuoteParams;
pub use results::EngineError;
