//! Replays scenario steps against an engine running on nullable
//! collaborators and records each step's outcome.

use crate::error::SimError;
use crate::scenario::{Scenario, Step};
use perp_engine::{Collaborators, PerpEngine, RolloverData};
use perp_interfaces::{Clock, TokenLedger};
use perp_nullables::{NullBondIssuer, NullChain, NullFees, NullPricing};
use perp_types::{Address, Timestamp};
use serde::Serialize;

/// The engine under simulation plus handles to every collaborator the steps
/// drive.
pub struct Simulation {
    chain: NullChain,
    engine: PerpEngine,
    issuer: NullBondIssuer,
    pricing: NullPricing,
    fees: NullFees,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepReport {
    pub step: usize,
    pub action: &'static str,
    pub time: u64,
    pub outcome: Outcome,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    Ok {
        #[serde(skip_serializing_if = "Option::is_none")]
        detail: Option<Detail>,
    },
    Rejected {
        error: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Detail {
    Minted(u128),
    Redeemed(Vec<Holding>),
    Rolled(RolloverData),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Holding {
    pub token: String,
    pub amount: u128,
}

/// Reserve state after the last step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub time: u64,
    pub total_supply: u128,
    pub deposit_bond: Option<String>,
    pub reserve: Vec<Holding>,
    pub reserve_value: u128,
    pub avg_price: u128,
}

impl Simulation {
    pub fn new(scenario: &Scenario) -> Result<Self, SimError> {
        let issuer = NullBondIssuer::new(scenario.collateral.as_str());
        let pricing = NullPricing::new();
        let fees = NullFees::new();
        let engine = PerpEngine::new(
            Address::new("perp"),
            Address::new(scenario.owner.as_str()),
            Address::new(scenario.collateral.as_str()),
            scenario.params.to_params()?,
            Collaborators {
                bond_issuer: Box::new(issuer.clone()),
                pricing_strategy: Box::new(pricing.clone()),
                fee_strategy: Box::new(fees.clone()),
            },
        )?;
        Ok(Self {
            chain: NullChain::new(scenario.start_time),
            engine,
            issuer,
            pricing,
            fees,
        })
    }

    /// Run every step. Rejected steps are recorded and the run continues.
    pub fn run(&mut self, steps: &[Step]) -> Vec<StepReport> {
        steps
            .iter()
            .enumerate()
            .map(|(index, step)| {
                let outcome = match self.apply(step) {
                    Ok(detail) => Outcome::Ok { detail },
                    Err(e) => {
                        tracing::debug!(step = index, action = step.action(), error = %e, "step rejected");
                        Outcome::Rejected {
                            error: e.to_string(),
                        }
                    }
                };
                StepReport {
                    step: index,
                    action: step.action(),
                    time: self.chain.now().as_secs(),
                    outcome,
                }
            })
            .collect()
    }

    pub fn apply(&mut self, step: &Step) -> Result<Option<Detail>, SimError> {
        match step {
            Step::Issue {
                bond,
                maturity_in,
                ratios,
                fund,
            } => {
                let collateral = self.engine.collateral().clone();
                let maturity = Timestamp::new(self.chain.now().as_secs().saturating_add(*maturity_in));
                let ratios: Vec<u128> = ratios.iter().map(|r| u128::from(*r)).collect();
                self.chain
                    .create_bond(bond.as_str(), collateral.clone(), maturity, &ratios);
                let bond = Address::new(bond.as_str());
                for funding in fund {
                    let holder = Address::new(funding.holder.as_str());
                    let amount = u128::from(funding.amount);
                    self.chain.mint(&collateral, &holder, amount)?;
                    self.chain.deposit_into_bond(&bond, &holder, amount)?;
                }
                self.issuer.issue(bond);
                Ok(None)
            }
            Step::Deposit {
                caller,
                tranche,
                amount,
            } => {
                let minted = self.engine.deposit(
                    &mut self.chain,
                    &Address::new(caller.as_str()),
                    &Address::new(tranche.as_str()),
                    u128::from(*amount),
                )?;
                Ok(Some(Detail::Minted(minted)))
            }
            Step::Redeem { caller, amount } => {
                let redeemed = self.engine.redeem(
                    &mut self.chain,
                    &Address::new(caller.as_str()),
                    u128::from(*amount),
                )?;
                Ok(Some(Detail::Redeemed(
                    redeemed
                        .into_iter()
                        .map(|(token, amount)| Holding {
                            token: token.as_str().to_string(),
                            amount,
                        })
                        .collect(),
                )))
            }
            Step::Rollover {
                caller,
                tranche_in,
                token_out,
                amount,
                requested,
            } => {
                let rolled = self.engine.rollover(
                    &mut self.chain,
                    &Address::new(caller.as_str()),
                    &Address::new(tranche_in.as_str()),
                    &Address::new(token_out.as_str()),
                    u128::from(*amount),
                    requested.map_or(u128::MAX, u128::from),
                )?;
                Ok(Some(Detail::Rolled(rolled)))
            }
            Step::Advance { secs } => {
                self.chain.clock().advance(*secs);
                Ok(None)
            }
            Step::SetPrice { tranche, price } => {
                self.pricing
                    .set_price(tranche.as_str(), u128::from(*price));
                Ok(None)
            }
            Step::SetFees {
                mint,
                burn,
                rollover,
            } => {
                if let Some(perc) = mint {
                    self.fees.set_mint_fee(u128::from(*perc));
                }
                if let Some(perc) = burn {
                    self.fees.set_burn_fee(u128::from(*perc));
                }
                if let Some(perc) = rollover {
                    self.fees.set_rollover_fee(i128::from(*perc));
                }
                Ok(None)
            }
        }
    }

    /// Refresh the engine and report the reserve.
    pub fn summary(&mut self) -> Result<Summary, SimError> {
        let chain = &mut self.chain;
        let engine = &mut self.engine;
        let total_supply = engine.total_supply(chain)?;
        let deposit_bond = engine.deposit_bond(chain)?;
        let count = engine.reserve_count(chain)?;
        let mut reserve = Vec::with_capacity(count);
        for index in 0..count {
            if let Some(token) = engine.reserve_at(chain, index)? {
                let amount = engine.reserve_token_balance(chain, &token)?;
                reserve.push(Holding {
                    token: token.as_str().to_string(),
                    amount,
                });
            }
        }
        Ok(Summary {
            time: chain.now().as_secs(),
            total_supply,
            deposit_bond: deposit_bond.map(|bond| bond.as_str().to_string()),
            reserve,
            reserve_value: engine.reserve_value(chain)?,
            avg_price: engine.avg_price(chain)?,
        })
    }

    pub fn balance_of(&self, token: &str, holder: &str) -> u128 {
        self.chain
            .balance_of(&Address::new(token), &Address::new(holder))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use perp_types::UNIT_PERC;

    fn scenario(steps: &str) -> Scenario {
        Scenario::from_toml_str(&format!(
            "collateral = \"ampl\"\nstart_time = 1000\n{}",
            steps
        ))
        .unwrap()
    }

    const ISSUE: &str = r#"
        [[steps]]
        action = "issue"
        bond = "b1"
        maturity_in = 1000
        ratios = [200, 800]
        fund = [{ holder = "alice", amount = 1000 }, { holder = "bob", amount = 1000 }]
    "#;

    #[test]
    fn test_deposit_and_redeem() {
        let s = scenario(&format!(
            r#"{ISSUE}
            [[steps]]
            action = "deposit"
            caller = "alice"
            tranche = "b1-0"
            amount = 200

            [[steps]]
            action = "redeem"
            caller = "alice"
            amount = 50
            "#
        ));
        let mut sim = Simulation::new(&s).unwrap();
        let reports = sim.run(&s.steps);
        assert_eq!(
            reports[1].outcome,
            Outcome::Ok {
                detail: Some(Detail::Minted(200))
            }
        );
        match &reports[2].outcome {
            Outcome::Ok {
                detail: Some(Detail::Redeemed(holdings)),
            } => {
                assert_eq!(holdings[1].token, "b1-0");
                assert_eq!(holdings[1].amount, 50);
            }
            other => panic!("Expected redemption, got {:?}", other),
        }
        assert_eq!(sim.balance_of("perp", "alice"), 150);
    }

    #[test]
    fn test_rejections_do_not_stop_the_run() {
        let s = scenario(&format!(
            r#"{ISSUE}
            [[steps]]
            action = "deposit"
            caller = "alice"
            tranche = "b1-1"
            amount = 10

            [[steps]]
            action = "deposit"
            caller = "alice"
            tranche = "b1-0"
            amount = 10
            "#
        ));
        let mut sim = Simulation::new(&s).unwrap();
        let reports = sim.run(&s.steps);
        assert!(matches!(reports[1].outcome, Outcome::Rejected { .. }));
        assert!(matches!(reports[2].outcome, Outcome::Ok { .. }));
    }

    #[test]
    fn test_maturity_and_fee_steps() {
        let s = scenario(&format!(
            r#"{ISSUE}
            [[steps]]
            action = "deposit"
            caller = "alice"
            tranche = "b1-0"
            amount = 100

            [[steps]]
            action = "advance"
            secs = 1000

            [[steps]]
            action = "issue"
            bond = "b2"
            maturity_in = 5000
            fund = [{{ holder = "bob", amount = 500 }}]

            [[steps]]
            action = "set_fees"
            rollover = {fee}

            [[steps]]
            action = "rollover"
            caller = "bob"
            tranche_in = "b2-0"
            token_out = "ampl"
            amount = 100
            "#,
            fee = UNIT_PERC
        ));
        let mut sim = Simulation::new(&s).unwrap();
        let reports = sim.run(&s.steps);
        assert_eq!(
            reports[5].outcome,
            Outcome::Ok {
                detail: Some(Detail::Rolled(RolloverData {
                    tranche_in_amt: 100,
                    token_out_amt: 99
                }))
            }
        );
        let summary = sim.summary().unwrap();
        assert_eq!(summary.deposit_bond.as_deref(), Some("b2"));
        assert_eq!(summary.total_supply, 100);
        assert_eq!(summary.reserve[0].amount, 1);
        assert_eq!(summary.reserve_value, 101);
    }

    #[test]
    fn test_reports_serialize_as_json() {
        let report = StepReport {
            step: 0,
            action: "deposit",
            time: 5,
            outcome: Outcome::Ok {
                detail: Some(Detail::Minted(7)),
            },
        };
        let json = serde_json::to_string(&report).unwrap();
        assert_eq!(
            json,
            r#"{"step":0,"action":"deposit","time":5,"outcome":{"status":"ok","detail":{"minted":7}}}"#
        );
    }
}
