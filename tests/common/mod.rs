//! Shared helpers for integration tests: stub rate sources and service setup.

// Not every test binary uses every helper.
#![allow(dead_code)]

use std::collections::HashMap;

use async_trait::async_trait;
use tripsplit_core::{
    Currency, LedgerService, MemoryStore, NewExpense, RateError, RateSource, RateTable,
};

/// Deterministic rate source resolving from a fixed table.
pub struct FixedRates(pub HashMap<Currency, f64>);

#[async_trait]
impl RateSource for FixedRates {
    async fn resolve(
        &self,
        base: Currency,
        targets: &[Currency],
    ) -> Result<RateTable, RateError> {
        let mut table = RateTable::new();
        table.insert(base, 1.0);
        for target in targets {
            if let Some(&rate) = self.0.get(target) {
                table.insert(*target, rate);
            }
        }
        Ok(table)
    }
}

/// Rate source that is always down.
pub struct UnavailableRates;

#[async_trait]
impl RateSource for UnavailableRates {
    async fn resolve(
        &self,
        _base: Currency,
        _targets: &[Currency],
    ) -> Result<RateTable, RateError> {
        Err(RateError::SourceUnavailable("connection refused".to_string()))
    }
}

/// Rate source that must never be consulted.
pub struct NoCallRates;

#[async_trait]
impl RateSource for NoCallRates {
    async fn resolve(
        &self,
        _base: Currency,
        _targets: &[Currency],
    ) -> Result<RateTable, RateError> {
        panic!("rate source must not be consulted by this operation");
    }
}

pub fn fixed_rates(pairs: &[(Currency, f64)]) -> FixedRates {
    FixedRates(pairs.iter().copied().collect())
}

pub fn memory_service(rates: impl RateSource + 'static) -> LedgerService {
    LedgerService::open(Box::new(MemoryStore::new()), Box::new(rates)).expect("open service")
}

/// Service over a memory store with Alice (USD) and Bob (EUR) already added
/// and rates `{USD: 1, EUR: 0.9}`.
pub fn usd_eur_service() -> LedgerService {
    let mut svc = memory_service(fixed_rates(&[
        (Currency::USD, 1.0),
        (Currency::EUR, 0.9),
    ]));
    svc.add_participant("Alice", Currency::USD).expect("add Alice");
    svc.add_participant("Bob", Currency::EUR).expect("add Bob");
    svc
}

pub fn expense(amount: f64, payer: &str, split_with: &[&str]) -> NewExpense {
    NewExpense {
        amount,
        description: "test expense".to_string(),
        payer: payer.to_string(),
        split_with: split_with.iter().map(|s| s.to_string()).collect(),
    }
}
