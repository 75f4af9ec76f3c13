//! Fungible token bookkeeping of the surrounding ledger.

use crate::ChainError;
use perp_types::Address;

/// Balances, transfers, minting and burning for every fungible token,
/// including the perp token itself.
///
/// The engine only ever moves tokens it holds or tokens a caller hands it;
/// approvals are the host's concern.
pub trait TokenLedger {
    fn balance_of(&self, token: &Address, holder: &Address) -> u128;

    fn total_supply(&self, token: &Address) -> u128;

    fn transfer(
        &mut self,
        token: &Address,
        from: &Address,
        to: &Address,
        amount: u128,
    ) -> Result<(), ChainError>;

    fn mint(&mut self, token: &Address, to: &Address, amount: u128) -> Result<(), ChainError>;

    fn burn(&mut self, token: &Address, from: &Address, amount: u128) -> Result<(), ChainError>;
}
