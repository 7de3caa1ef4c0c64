// options-core: vault custody and settlement engine for peer-to-pool options.
// custody-first architecture: escrow accounting and supply conservation take
// priority. all computation is deterministic with no external I/O.
//
// file map (search X.0 for structs, X.1+ for logic):
//   1.x  types.rs: primitives: AccountId, AssetId, Price, Amount, Bps
//   2.x  address.rs: deterministic record addressing (seed derivation)
//   3.x  global.rs: protocol singleton: authority, fees, pause, counters
//   4.x  asset.rs: asset registry, strike/expiry bounds
//   5.x  maker.rs: market maker registry, reputation
//   6.x  custody.rs: token ledger, escrow transfers, supply audits
//   7.x  vault.rs: maker liquidity vaults, lock/release accounting
//   8.x  quote_book.rs: strike ladders, matching
//   9.x  position.rs: position + request records, ITM/OTM classification
//   10.x oracle.rs: price feeds, staleness, mock source
//   11.x events.rs: state transition events for audit
//   12.x engine/: operations: admin, maker, positions, settlement

pub mod address;
pub mod asset;
pub mod custody;
pub mod engine;
pub mod events;
pub mod global;
pub mod maker;
pub mod oracle;
pub mod position;
pub mod quote_book;
pub mod types;
pub mod vault;

// re exports for convenience
pub use address::*;
pub use asset::*;
pub use custody::*;
pub use engine::*;
pub use events::*;
pub use global::*;
pub use maker::*;
pub use oracle::*;
pub use position::*;
pub use quote_book::*;
pub use types::*;
pub use vault::*;
