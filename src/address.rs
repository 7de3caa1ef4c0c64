// 2.0: deterministic record addressing. every persisted record is located by a pure
// derivation from a domain tag plus its key fields, so callers and the engine agree
// on where a record lives without any registry lookup. the seed encoding mirrors the
// on-chain layout (tag byte, then key fields little-endian) and must stay stable.

use crate::types::{AccountId, AssetId, PositionId, RequestId, StrategyType, Timestamp};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RecordAddress {
    GlobalState,
    AssetConfig {
        asset: AssetId,
    },
    MarketMaker {
        owner: AccountId,
    },
    MakerVault {
        owner: AccountId,
        asset: AssetId,
    },
    Quote {
        owner: AccountId,
        asset: AssetId,
        strategy: StrategyType,
        expiry: Timestamp,
    },
    Position {
        user: AccountId,
        position_id: PositionId,
    },
    PositionRequest {
        user: AccountId,
        request_id: RequestId,
    },
    // Escrow sub-accounts owned by a single position, drained exactly once.
    PositionUserEscrow {
        user: AccountId,
        position_id: PositionId,
    },
    PositionMakerEscrow {
        user: AccountId,
        position_id: PositionId,
    },
    // A caller's own wallet balance outside protocol custody.
    External {
        account: AccountId,
    },
    Treasury,
}

impl RecordAddress {
    fn domain_tag(&self) -> u8 {
        match self {
            RecordAddress::GlobalState => 0,
            RecordAddress::AssetConfig { .. } => 1,
            RecordAddress::MarketMaker { .. } => 2,
            RecordAddress::MakerVault { .. } => 3,
            RecordAddress::Quote { .. } => 4,
            RecordAddress::Position { .. } => 5,
            RecordAddress::PositionRequest { .. } => 6,
            RecordAddress::PositionUserEscrow { .. } => 7,
            RecordAddress::PositionMakerEscrow { .. } => 8,
            RecordAddress::External { .. } => 9,
            RecordAddress::Treasury => 10,
        }
    }

    // Stable byte encoding of the derivation: tag, then key fields in declaration
    // order, little-endian. Interoperating stores key records by these bytes.
    pub fn seed_bytes(&self) -> Vec<u8> {
        let mut seed = vec![self.domain_tag()];
        match self {
            RecordAddress::GlobalState | RecordAddress::Treasury => {}
            RecordAddress::AssetConfig { asset } => {
                seed.extend_from_slice(&asset.0.to_le_bytes());
            }
            RecordAddress::MarketMaker { owner } => {
                seed.extend_from_slice(&owner.0.to_le_bytes());
            }
            RecordAddress::MakerVault { owner, asset } => {
                seed.extend_from_slice(&owner.0.to_le_bytes());
                seed.extend_from_slice(&asset.0.to_le_bytes());
            }
            RecordAddress::Quote {
                owner,
                asset,
                strategy,
                expiry,
            } => {
                seed.extend_from_slice(&owner.0.to_le_bytes());
                seed.extend_from_slice(&asset.0.to_le_bytes());
                seed.push(strategy.tag());
                seed.extend_from_slice(&expiry.0.to_le_bytes());
            }
            RecordAddress::Position { user, position_id }
            | RecordAddress::PositionUserEscrow { user, position_id }
            | RecordAddress::PositionMakerEscrow { user, position_id } => {
                seed.extend_from_slice(&user.0.to_le_bytes());
                seed.extend_from_slice(&position_id.0.to_le_bytes());
            }
            RecordAddress::PositionRequest { user, request_id } => {
                seed.extend_from_slice(&user.0.to_le_bytes());
                seed.extend_from_slice(&request_id.0.to_le_bytes());
            }
            RecordAddress::External { account } => {
                seed.extend_from_slice(&account.0.to_le_bytes());
            }
        }
        seed
    }

    // The two escrow addresses a position controls.
    pub fn escrows_for(user: AccountId, position_id: PositionId) -> (RecordAddress, RecordAddress) {
        (
            RecordAddress::PositionUserEscrow { user, position_id },
            RecordAddress::PositionMakerEscrow { user, position_id },
        )
    }
}

impl fmt::Display for RecordAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bytes = self.seed_bytes();
        for b in bytes {
            write!(f, "{:02x}", b)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derivation_is_deterministic() {
        let a = RecordAddress::MakerVault {
            owner: AccountId(7),
            asset: AssetId(1),
        };
        let b = RecordAddress::MakerVault {
            owner: AccountId(7),
            asset: AssetId(1),
        };
        assert_eq!(a, b);
        assert_eq!(a.seed_bytes(), b.seed_bytes());
    }

    #[test]
    fn different_keys_different_addresses() {
        let a = RecordAddress::Position {
            user: AccountId(1),
            position_id: PositionId(0),
        };
        let b = RecordAddress::Position {
            user: AccountId(1),
            position_id: PositionId(1),
        };
        let c = RecordAddress::Position {
            user: AccountId(2),
            position_id: PositionId(0),
        };
        assert_ne!(a, b);
        assert_ne!(a, c);
        assert_ne!(a.seed_bytes(), b.seed_bytes());
    }

    #[test]
    fn domain_tags_separate_record_kinds() {
        // same key fields, different domains, must never collide
        let user = AccountId(3);
        let id = PositionId(4);
        let pos = RecordAddress::Position {
            user,
            position_id: id,
        };
        let (user_escrow, maker_escrow) = RecordAddress::escrows_for(user, id);
        assert_ne!(pos.seed_bytes(), user_escrow.seed_bytes());
        assert_ne!(user_escrow.seed_bytes(), maker_escrow.seed_bytes());
    }

    #[test]
    fn seed_bytes_are_stable() {
        // pinned encoding: quote tag 4, owner 2 le, asset 9 le, strategy byte, expiry le
        let addr = RecordAddress::Quote {
            owner: AccountId(2),
            asset: AssetId(9),
            strategy: StrategyType::CashSecuredPut,
            expiry: Timestamp(1_700_000_000),
        };
        let seed = addr.seed_bytes();
        assert_eq!(seed[0], 4);
        assert_eq!(&seed[1..9], &2u64.to_le_bytes());
        assert_eq!(&seed[9..13], &9u32.to_le_bytes());
        assert_eq!(seed[13], 1);
        assert_eq!(&seed[14..22], &1_700_000_000i64.to_le_bytes());
    }
}
