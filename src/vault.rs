// 7.0: vault ledger. tracks a market maker's liquidity per asset. two
// accounting invariants everything else leans on: total_deposited ==
// available_liquidity + locked_liquidity at all times, and the custody
// account holds exactly available_liquidity (locked funds sit in live
// position escrows). `lock` is the only path that moves available into
// locked; settlement either releases the lock back or pays the locked funds
// out of the vault's books entirely.

use crate::address::RecordAddress;
use crate::types::{AccountId, Amount, AssetId, Timestamp};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VaultError {
    #[error("Insufficient liquidity: requested {requested}, available {available}")]
    InsufficientLiquidity {
        requested: Amount,
        available: Amount,
    },

    #[error("Amount must be non-zero")]
    InvalidAmount,

    // A release/payout exceeding what is locked is a programming error in the
    // settlement path, never a user error.
    #[error("Ledger invariant violated: {0}")]
    LedgerInvariant(&'static str),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MakerVault {
    pub owner: AccountId,
    pub asset: AssetId,
    // custody holder for this vault's tokens in the token ledger
    pub custody: RecordAddress,
    // deposits net of withdrawals and exercised payouts
    pub total_deposited: Amount,
    pub available_liquidity: Amount,
    pub locked_liquidity: Amount,
    pub created_at: Timestamp,
}

impl MakerVault {
    pub fn new(owner: AccountId, asset: AssetId, now: Timestamp) -> Self {
        Self {
            owner,
            asset,
            custody: RecordAddress::MakerVault { owner, asset },
            total_deposited: Amount::zero(),
            available_liquidity: Amount::zero(),
            locked_liquidity: Amount::zero(),
            created_at: now,
        }
    }

    pub fn deposit(&mut self, amount: Amount) -> Result<(), VaultError> {
        if amount.is_zero() {
            return Err(VaultError::InvalidAmount);
        }
        self.total_deposited = self.total_deposited.add(amount);
        self.available_liquidity = self.available_liquidity.add(amount);
        Ok(())
    }

    // Move liquidity from available to locked for the life of a position.
    pub fn lock(&mut self, amount: Amount) -> Result<(), VaultError> {
        let remaining = self.available_liquidity.checked_sub(amount).ok_or(
            VaultError::InsufficientLiquidity {
                requested: amount,
                available: self.available_liquidity,
            },
        )?;
        self.available_liquidity = remaining;
        self.locked_liquidity = self.locked_liquidity.add(amount);
        Ok(())
    }

    // Return locked liquidity to available (maker got its collateral back).
    pub fn release(&mut self, amount: Amount) -> Result<(), VaultError> {
        let remaining = self
            .locked_liquidity
            .checked_sub(amount)
            .ok_or(VaultError::LedgerInvariant("release exceeds locked liquidity"))?;
        self.locked_liquidity = remaining;
        self.available_liquidity = self.available_liquidity.add(amount);
        Ok(())
    }

    // Locked funds left the vault at settlement (exercise paid them to the
    // counterparty). Drops the lock without restoring availability.
    pub fn settle_locked(&mut self, amount: Amount) -> Result<(), VaultError> {
        let remaining = self
            .locked_liquidity
            .checked_sub(amount)
            .ok_or(VaultError::LedgerInvariant("settle exceeds locked liquidity"))?;
        self.locked_liquidity = remaining;
        self.total_deposited = self
            .total_deposited
            .checked_sub(amount)
            .ok_or(VaultError::LedgerInvariant("settle exceeds total deposited"))?;
        Ok(())
    }

    // Spend available liquidity out of the vault for good (premium payments,
    // withdrawals). Both fields shrink so the deposit invariant holds.
    pub fn debit_available(&mut self, amount: Amount) -> Result<(), VaultError> {
        let remaining = self.available_liquidity.checked_sub(amount).ok_or(
            VaultError::InsufficientLiquidity {
                requested: amount,
                available: self.available_liquidity,
            },
        )?;
        self.available_liquidity = remaining;
        self.total_deposited = self
            .total_deposited
            .checked_sub(amount)
            .ok_or(VaultError::LedgerInvariant("debit exceeds total deposited"))?;
        Ok(())
    }

    pub fn withdraw(&mut self, amount: Amount) -> Result<(), VaultError> {
        if amount.is_zero() {
            return Err(VaultError::InvalidAmount);
        }
        self.debit_available(amount)
    }

    // Total maker funds under management: available in custody plus locked
    // out in position escrows. Always equals total_deposited.
    pub fn accounted_balance(&self) -> Amount {
        self.available_liquidity.add(self.locked_liquidity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn amt(v: i64) -> Amount {
        Amount::new_unchecked(Decimal::from(v))
    }

    fn vault_with(deposit: i64) -> MakerVault {
        let mut vault = MakerVault::new(AccountId(1), AssetId(1), Timestamp(0));
        vault.deposit(amt(deposit)).unwrap();
        vault
    }

    #[test]
    fn deposit_increases_both_fields() {
        let vault = vault_with(1000);
        assert_eq!(vault.total_deposited.value(), dec!(1000));
        assert_eq!(vault.available_liquidity.value(), dec!(1000));
        assert!(vault.locked_liquidity.is_zero());
    }

    #[test]
    fn zero_deposit_rejected() {
        let mut vault = MakerVault::new(AccountId(1), AssetId(1), Timestamp(0));
        assert_eq!(vault.deposit(Amount::zero()), Err(VaultError::InvalidAmount));
    }

    #[test]
    fn lock_and_release_round_trip() {
        let mut vault = vault_with(1000);

        vault.lock(amt(400)).unwrap();
        assert_eq!(vault.available_liquidity.value(), dec!(600));
        assert_eq!(vault.locked_liquidity.value(), dec!(400));
        assert_eq!(vault.accounted_balance().value(), dec!(1000));

        vault.release(amt(400)).unwrap();
        assert_eq!(vault.available_liquidity.value(), dec!(1000));
        assert!(vault.locked_liquidity.is_zero());
    }

    #[test]
    fn lock_beyond_available_fails() {
        let mut vault = vault_with(100);
        let result = vault.lock(amt(101));
        assert!(matches!(result, Err(VaultError::InsufficientLiquidity { .. })));
        assert_eq!(vault.available_liquidity.value(), dec!(100));
    }

    #[test]
    fn release_beyond_locked_is_invariant_violation() {
        let mut vault = vault_with(100);
        vault.lock(amt(50)).unwrap();
        assert!(matches!(
            vault.release(amt(51)),
            Err(VaultError::LedgerInvariant(_))
        ));
    }

    #[test]
    fn settle_locked_drops_without_restoring() {
        let mut vault = vault_with(1000);
        vault.lock(amt(300)).unwrap();
        vault.settle_locked(amt(300)).unwrap();

        assert_eq!(vault.available_liquidity.value(), dec!(700));
        assert!(vault.locked_liquidity.is_zero());
        assert_eq!(vault.total_deposited.value(), dec!(700));
        assert_eq!(vault.accounted_balance(), vault.total_deposited);
    }

    #[test]
    fn cannot_withdraw_locked_funds() {
        let mut vault = vault_with(1000);
        vault.lock(amt(900)).unwrap();

        assert!(matches!(
            vault.withdraw(amt(200)),
            Err(VaultError::InsufficientLiquidity { .. })
        ));
        vault.withdraw(amt(100)).unwrap();
        assert!(vault.available_liquidity.is_zero());
        assert_eq!(vault.total_deposited.value(), dec!(900));
    }
}
