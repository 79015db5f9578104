//! Share calculation. Each split member's share — and the payer's credit —
//! is converted into the member's home currency from one resolved rate table
//! and frozen; nothing here is ever recomputed from later rates.

use std::collections::BTreeMap;

use crate::error::LedgerError;
use crate::models::{Currency, Money, Participant};
use crate::rates::RateTable;

/// Everything the rate lookup fixes at creation time.
#[derive(Debug)]
pub struct FrozenShares {
    /// One share per split member, keyed by canonical name, in that member's
    /// home currency.
    pub shares: BTreeMap<String, Money>,
    /// Full expense amount in the payer's home currency.
    pub payer_credit: Money,
}

/// Uniform split of a trip-currency amount across `split_with`, all-or-nothing:
/// if any needed rate is missing from the table the whole computation fails
/// and nothing is frozen.
pub fn compute_shares(
    amount: Money,
    payer: &Participant,
    split_with: &[Participant],
    rates: &RateTable,
) -> Result<FrozenShares, LedgerError> {
    if split_with.is_empty() {
        return Err(LedgerError::EmptySplit);
    }
    let trip = amount.currency;
    let per_person = Money::new(amount.amount / split_with.len() as f64, trip);

    let mut shares = BTreeMap::new();
    let mut missing: Vec<Currency> = Vec::new();
    for member in split_with {
        match rate_for(trip, member.home_currency, rates) {
            Some(rate) => {
                shares.insert(
                    member.name.clone(),
                    per_person.convert(rate, member.home_currency),
                );
            }
            None => missing.push(member.home_currency),
        }
    }

    let payer_credit = rate_for(trip, payer.home_currency, rates)
        .map(|rate| amount.convert(rate, payer.home_currency));
    if payer_credit.is_none() {
        missing.push(payer.home_currency);
    }

    if let Some(payer_credit) = payer_credit {
        if missing.is_empty() {
            return Ok(FrozenShares {
                shares,
                payer_credit,
            });
        }
    }
    missing.sort_by_key(|c| c.as_str());
    missing.dedup();
    Err(LedgerError::UnresolvedRate { currencies: missing })
}

/// The trip currency converts to itself at 1 even when the table omits it;
/// any other currency must be present explicitly.
fn rate_for(trip: Currency, home: Currency, rates: &RateTable) -> Option<f64> {
    if home == trip {
        Some(1.0)
    } else {
        rates.get(&home).copied()
    }
}
