//! Redemption engine: burn perps, receive a pro-rata slice of every reserve
//! asset.

use crate::engine::PerpEngine;
use crate::error::PerpError;
use perp_interfaces::Chain;
use perp_types::{mul_div, Address, ParamsError, Rounding, HUNDRED_PERC};

impl PerpEngine {
    /// Burn `perp_amt_burnt` of `caller`'s perps and pay out
    /// `balance × burnt / supply` of each reserve asset, less the burn fee.
    ///
    /// Returns one entry per reserve asset at the time of the call, including
    /// assets whose share rounded to zero. Cost is linear in the reserve size.
    pub fn redeem<C: Chain>(
        &mut self,
        chain: &mut C,
        caller: &Address,
        perp_amt_burnt: u128,
    ) -> Result<Vec<(Address, u128)>, PerpError> {
        let _entered = self.guard.enter()?;
        self.ensure_not_paused()?;
        self.atomically(chain, |engine, chain| {
            engine.refresh_state(chain)?;
            let redemptions = engine.redemption_amts_for(chain, perp_amt_burnt)?;
            if redemptions.iter().all(|(_, amount)| *amount == 0) {
                return Err(PerpError::UnacceptableRedemption { perp_amt_burnt });
            }

            chain.burn(engine.address(), caller, perp_amt_burnt)?;
            for (token, amount) in &redemptions {
                if *amount > 0 {
                    engine.transfer_out_of_reserve(chain, token, caller, *amount)?;
                }
            }

            tracing::info!(
                %caller,
                perp_amt_burnt,
                assets = redemptions.len(),
                "redeem"
            );
            Ok(redemptions)
        })
    }

    /// Preview what burning `perp_amt_burnt` would pay out.
    pub fn compute_redemption_amts<C: Chain>(
        &mut self,
        chain: &mut C,
        perp_amt_burnt: u128,
    ) -> Result<Vec<(Address, u128)>, PerpError> {
        self.with_fresh_state(chain, |engine, chain| {
            engine.redemption_amts_for(chain, perp_amt_burnt)
        })
    }

    fn redemption_amts_for<C: Chain>(
        &self,
        chain: &C,
        perp_amt_burnt: u128,
    ) -> Result<Vec<(Address, u128)>, PerpError> {
        let total_supply = self.perp_supply(chain);
        if perp_amt_burnt == 0 || perp_amt_burnt > total_supply {
            return Err(PerpError::UnacceptableBurnAmt {
                perp_amt_burnt,
                total_supply,
            });
        }

        let fee_perc = self.fee_strategy.compute_burn_fee_perc();
        if fee_perc > HUNDRED_PERC {
            return Err(ParamsError::FeeOutOfRange {
                perc: fee_perc as i128,
            }
            .into());
        }

        self.state
            .reserves
            .iter()
            .map(|token| {
                let balance = chain.balance_of(token, self.address());
                let share = mul_div(balance, perp_amt_burnt, total_supply, Rounding::Down)
                    .and_then(|share| {
                        mul_div(share, HUNDRED_PERC - fee_perc, HUNDRED_PERC, Rounding::Down)
                    })
                    .ok_or(PerpError::Overflow)?;
                Ok((token.clone(), share))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use crate::testing::Fixture;
    use crate::PerpError;
    use perp_interfaces::TokenLedger;
    use perp_types::{Address, UNIT_PERC};

    #[test]
    fn test_redeem_single_asset() {
        let mut fx = Fixture::new();
        fx.deposit("alice", 100).unwrap();
        let out = fx.redeem("alice", 40).unwrap();
        assert_eq!(out, vec![(fx.collateral.clone(), 0), (fx.senior.clone(), 40)]);
        assert_eq!(fx.perp_balance("alice"), 60);
        assert_eq!(fx.reserve_balance(&fx.senior.clone()), 60);
    }

    #[test]
    fn test_full_redemption_drains_tranche() {
        let mut fx = Fixture::new();
        fx.deposit("alice", 100).unwrap();
        fx.redeem("alice", 100).unwrap();
        assert_eq!(fx.engine.state().reserves.len(), 1);
        assert_eq!(fx.engine.state().minted_supply(&fx.senior), 0);
        assert_eq!(fx.chain.total_supply(fx.engine.address()), 0);
    }

    #[test]
    fn test_burn_fee_withheld() {
        let mut fx = Fixture::new();
        fx.deposit("alice", 100).unwrap();
        fx.fees.set_burn_fee(10 * UNIT_PERC);
        let out = fx.redeem("alice", 50).unwrap();
        assert_eq!(out[1], (fx.senior.clone(), 45));
        // Withheld tranches stay in the reserve, backing the remaining supply.
        assert_eq!(fx.reserve_balance(&fx.senior.clone()), 55);
    }

    #[test]
    fn test_burn_above_supply_rejected() {
        let mut fx = Fixture::new();
        fx.deposit("alice", 100).unwrap();
        match fx.redeem("alice", 101) {
            Err(PerpError::UnacceptableBurnAmt {
                perp_amt_burnt,
                total_supply,
            }) => {
                assert_eq!(perp_amt_burnt, 101);
                assert_eq!(total_supply, 100);
            }
            other => panic!("Expected UnacceptableBurnAmt, got {:?}", other),
        }
    }

    #[test]
    fn test_zero_burn_rejected() {
        let mut fx = Fixture::new();
        fx.deposit("alice", 100).unwrap();
        assert!(matches!(
            fx.redeem("alice", 0),
            Err(PerpError::UnacceptableBurnAmt { .. })
        ));
    }

    #[test]
    fn test_burning_someone_elses_perps_rolls_back() {
        let mut fx = Fixture::new();
        fx.deposit("alice", 100).unwrap();
        let result = fx.redeem("bob", 10);
        assert!(matches!(result, Err(PerpError::Chain(_))));
        assert_eq!(fx.reserve_balance(&fx.senior.clone()), 100);
        assert_eq!(fx.chain.balance_of(&fx.senior, &Address::new("bob")), 1_000);
    }

    #[test]
    fn test_dust_redemption_rejected() {
        let mut fx = Fixture::new();
        fx.deposit("alice", 100).unwrap();
        fx.fees.set_burn_fee(100 * UNIT_PERC);
        assert!(matches!(
            fx.redeem("alice", 1),
            Err(PerpError::UnacceptableRedemption { perp_amt_burnt: 1 })
        ));
        assert_eq!(fx.perp_balance("alice"), 100);
    }
}
