// 12.0.2: result types and errors for engine operations.

use crate::address::RecordAddress;
use crate::custody::CustodyError;
use crate::oracle::OracleError;
use crate::types::{AccountId, Amount, AssetId, PositionId, RequestId};
use crate::vault::VaultError;

#[derive(Debug, Clone, thiserror::Error)]
pub enum EngineError {
    // authorization
    #[error("Unauthorized")]
    Unauthorized,

    // existence
    #[error("Global state not initialized")]
    NotInitialized,

    #[error("Global state already initialized")]
    AlreadyInitialized,

    #[error("Asset {0:?} not found")]
    AssetNotFound(AssetId),

    #[error("Asset {0:?} already exists")]
    AssetAlreadyExists(AssetId),

    #[error("Market maker {0:?} not found")]
    MakerNotFound(AccountId),

    #[error("Market maker {0:?} already registered")]
    MakerAlreadyRegistered(AccountId),

    #[error("Vault for maker {owner:?} and asset {asset:?} not found")]
    VaultNotFound { owner: AccountId, asset: AssetId },

    #[error("Vault for maker {owner:?} and asset {asset:?} already exists")]
    VaultAlreadyExists { owner: AccountId, asset: AssetId },

    #[error("Quote {0} not found")]
    QuoteNotFound(RecordAddress),

    #[error("Quote {0} already exists")]
    QuoteAlreadyExists(RecordAddress),

    #[error("Position {0} not found")]
    PositionNotFound(RecordAddress),

    #[error("Position request {0} not found")]
    RequestNotFound(RecordAddress),

    // gating
    #[error("The protocol is currently paused")]
    ProtocolPaused,

    #[error("This asset is not enabled for trading")]
    AssetDisabled,

    #[error("Market maker is not active")]
    MarketMakerNotActive,

    // validation
    #[error("Invalid position id: expected {expected:?}, got {got:?}")]
    InvalidPositionId {
        expected: PositionId,
        got: PositionId,
    },

    #[error("Invalid request id: expected {expected:?}, got {got:?}")]
    InvalidRequestId { expected: RequestId, got: RequestId },

    #[error("No matching quote for the requested strike")]
    NoMatchingQuote,

    #[error("Contract size {size} outside quote range [{min}, {max}]")]
    SizeOutOfRange {
        size: Amount,
        min: Amount,
        max: Amount,
    },

    #[error("Invalid strike price range")]
    InvalidStrikeRange,

    #[error("Strike price outside the configured band of spot")]
    StrikeOutOfBounds,

    #[error("Invalid expiry range")]
    InvalidExpiryRange,

    #[error("Invalid quote parameters")]
    InvalidQuoteParameters,

    #[error("Too many strikes in quote")]
    TooManyStrikes,

    // quote / position timing
    #[error("Quote has expired")]
    QuoteExpired,

    #[error("Quote is not active")]
    QuoteNotActive,

    #[error("Position has not expired yet")]
    NotExpired,

    #[error("Position has already been settled")]
    AlreadySettled,

    #[error("Position request has expired")]
    RequestExpired,

    #[error("Position request is not pending")]
    RequestNotPending,

    #[error("Position request has not expired yet")]
    RequestNotExpired,

    // wrapped component errors
    #[error("Vault error: {0}")]
    Vault(#[from] VaultError),

    #[error("Custody error: {0}")]
    Custody(#[from] CustodyError),

    #[error("Oracle error: {0}")]
    Oracle(#[from] OracleError),
}

impl EngineError {
    // convenience for tests and callers deciding on retry vs abort
    pub fn is_insufficient_liquidity(&self) -> bool {
        matches!(
            self,
            EngineError::Vault(VaultError::InsufficientLiquidity { .. })
        )
    }
}
