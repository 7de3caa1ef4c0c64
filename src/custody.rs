// 6.0: token custody. the underlying ledger primitive the protocol builds on:
// per-(holder, asset) balances with an atomic transfer. escrow accounts are just
// holders addressed by a position-scoped derivation, so only engine code that
// knows the address can move funds out. supply per asset is conserved exactly
// by construction; `mint` exists for bootstrap and tests.

use crate::address::RecordAddress;
use crate::types::{Amount, AssetId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CustodyError {
    #[error("Insufficient balance at {holder}: requested {requested}, available {available}")]
    InsufficientBalance {
        holder: RecordAddress,
        requested: Amount,
        available: Amount,
    },
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TokenLedger {
    // BTreeMap so iteration (supply audits, discovery) is deterministic
    balances: BTreeMap<(RecordAddress, AssetId), Amount>,
}

impl TokenLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn balance(&self, holder: RecordAddress, asset: AssetId) -> Amount {
        self.balances
            .get(&(holder, asset))
            .copied()
            .unwrap_or_else(Amount::zero)
    }

    // Bootstrap/test funding of external accounts. Not reachable from any
    // caller-facing engine operation.
    pub fn mint(&mut self, holder: RecordAddress, asset: AssetId, amount: Amount) {
        let entry = self
            .balances
            .entry((holder, asset))
            .or_insert_with(Amount::zero);
        *entry = entry.add(amount);
    }

    // Atomic move of `amount` of `asset` between holders. Fails without any
    // mutation when the source balance is short.
    pub fn transfer(
        &mut self,
        asset: AssetId,
        from: RecordAddress,
        to: RecordAddress,
        amount: Amount,
    ) -> Result<(), CustodyError> {
        if amount.is_zero() {
            return Ok(());
        }
        let from_balance = self.balance(from, asset);
        let remaining =
            from_balance
                .checked_sub(amount)
                .ok_or(CustodyError::InsufficientBalance {
                    holder: from,
                    requested: amount,
                    available: from_balance,
                })?;

        self.balances.insert((from, asset), remaining);
        let to_entry = self
            .balances
            .entry((to, asset))
            .or_insert_with(Amount::zero);
        *to_entry = to_entry.add(amount);
        Ok(())
    }

    // Drain a holder to zero, returning what was moved. Used when closing
    // position escrows at settlement.
    pub fn drain(
        &mut self,
        asset: AssetId,
        from: RecordAddress,
        to: RecordAddress,
    ) -> Result<Amount, CustodyError> {
        let amount = self.balance(from, asset);
        self.transfer(asset, from, to, amount)?;
        Ok(amount)
    }

    // Total units of `asset` across every holder. The conservation audits in
    // the test suites lean on this.
    pub fn total_supply(&self, asset: AssetId) -> Amount {
        self.balances
            .iter()
            .filter(|((_, a), _)| *a == asset)
            .map(|(_, amount)| *amount)
            .sum()
    }

    pub fn holders_of(&self, asset: AssetId) -> impl Iterator<Item = (&RecordAddress, &Amount)> {
        self.balances
            .iter()
            .filter(move |((_, a), _)| *a == asset)
            .map(|((holder, _), amount)| (holder, amount))
    }
}
