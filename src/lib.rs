//! Core ledger and multi-currency balance engine for a shared trip expense
//! splitter.
//!
//! Expenses are entered in one trip currency and split across participants
//! who each keep a home currency. Conversion rates are resolved exactly once,
//! when an expense is created; the resulting per-participant shares and the
//! payer's credit are frozen on the expense, and balances are always derived
//! by folding the stored history. Nothing is ever silently re-fetched or
//! recomputed from fresh rates.
//!
//! [`LedgerService`] is the command surface a presentation layer talks to; it
//! owns the ledger, a [`BlobStore`] for persistence and a [`RateSource`] for
//! resolution, and persists every successful mutation.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::Utc;
use serde::de::DeserializeOwned;

pub mod balances;
pub mod error;
pub mod ids;
pub mod ledger;
pub mod models;
pub mod rates;
pub mod shares;
pub mod storage;

pub use error::{LedgerError, RateError};
pub use ids::ExpenseId;
pub use ledger::Ledger;
pub use models::{Balance, Currency, Expense, ExpenseOrder, Money, Participant};
pub use rates::{HttpRateSource, RateSource, RateTable};
pub use storage::{BlobStore, MemoryStore, SqliteStore};

/// Storage keys for the three independently persisted ledger pieces.
const KEY_TRIP_CURRENCY: &str = "trip_currency";
const KEY_PARTICIPANTS: &str = "participants";
const KEY_EXPENSES: &str = "expenses";

/// What the user submitted from the expense form. Names are matched against
/// known participants case-insensitively.
#[derive(Clone, Debug)]
pub struct NewExpense {
    pub amount: f64,
    pub description: String,
    pub payer: String,
    pub split_with: Vec<String>,
}

/// The one owner of ledger state. All mutations go through here, strictly
/// sequentially; the only operation that suspends is [`add_expense`]
/// (rate resolution), and a second `add_expense` is refused while one is
/// pending.
///
/// [`add_expense`]: LedgerService::add_expense
pub struct LedgerService {
    ledger: Ledger,
    store: Box<dyn BlobStore>,
    rates: Box<dyn RateSource>,
    expense_in_flight: Arc<AtomicBool>,
}

impl LedgerService {
    /// Hydrate from whatever blobs the store holds; missing or unreadable
    /// pieces fall back to their defaults.
    pub fn open(
        store: Box<dyn BlobStore>,
        rates: Box<dyn RateSource>,
    ) -> Result<Self, LedgerError> {
        let ledger = load_ledger(store.as_ref())?;
        Ok(Self {
            ledger,
            store,
            rates,
            expense_in_flight: Arc::new(AtomicBool::new(false)),
        })
    }

    pub fn trip_currency(&self) -> Currency {
        self.ledger.trip_currency()
    }

    pub fn participants(&self) -> &[Participant] {
        self.ledger.participants()
    }

    pub fn expenses(&self, order: ExpenseOrder) -> Vec<&Expense> {
        let mut list: Vec<&Expense> = self.ledger.expenses().iter().collect();
        if order == ExpenseOrder::NewestFirst {
            list.reverse();
        }
        list
    }

    /// Derived fresh from the full history on every call.
    pub fn balances(&self) -> Vec<Balance> {
        balances::compute_balances(&self.ledger)
    }

    /// True while an `add_expense` is awaiting rate resolution. UIs should
    /// disable the submit action while this holds.
    pub fn expense_in_flight(&self) -> bool {
        self.expense_in_flight.load(Ordering::Acquire)
    }

    pub fn add_participant(
        &mut self,
        name: &str,
        home_currency: Currency,
    ) -> Result<Participant, LedgerError> {
        let participant = self.ledger.add_participant(name, home_currency)?;
        self.persist()?;
        tracing::info!(name = %participant.name, currency = %participant.home_currency, "participant added");
        Ok(participant)
    }

    /// Record an expense: validate the intent, resolve rates once, freeze the
    /// shares and payer credit, append, persist. Any failure along the way
    /// leaves the ledger and the store exactly as they were.
    pub async fn add_expense(&mut self, intent: NewExpense) -> Result<Expense, LedgerError> {
        let _guard = InFlightGuard::try_acquire(self.expense_in_flight.clone())
            .ok_or(LedgerError::ExpenseInFlight)?;

        // Everything checkable without the network is checked first.
        if !intent.amount.is_finite() || intent.amount <= 0.0 {
            return Err(LedgerError::InvalidAmount);
        }
        let description = intent.description.trim();
        if description.is_empty() {
            return Err(LedgerError::EmptyDescription);
        }
        if intent.split_with.is_empty() {
            return Err(LedgerError::EmptySplit);
        }
        let payer = self
            .ledger
            .find_participant(&intent.payer)
            .ok_or_else(|| LedgerError::UnknownParticipant(intent.payer.clone()))?
            .clone();
        let mut split: Vec<Participant> = Vec::with_capacity(intent.split_with.len());
        for name in &intent.split_with {
            let member = self
                .ledger
                .find_participant(name)
                .ok_or_else(|| LedgerError::UnknownParticipant(name.clone()))?;
            // The split is a set; a name listed twice counts once.
            if !split.iter().any(|p| p.matches_name(&member.name)) {
                split.push(member.clone());
            }
        }

        let trip = self.ledger.trip_currency();
        let amount = Money::new(intent.amount, trip);

        // One lookup covers every home currency involved, the payer's
        // included, so the credit is frozen from the same table as the shares.
        let mut targets: Vec<Currency> = split.iter().map(|p| p.home_currency).collect();
        targets.push(payer.home_currency);
        let table = self.rates.resolve(trip, &targets).await?;

        let frozen = shares::compute_shares(amount, &payer, &split, &table)?;
        let expense = Expense {
            id: ExpenseId::new(),
            amount,
            description: description.to_string(),
            payer: payer.name.clone(),
            split_with: split.iter().map(|p| p.name.clone()).collect(),
            shares: frozen.shares,
            payer_credit: frozen.payer_credit,
            created_at: Utc::now(),
        };
        let id = expense.id.clone();
        self.ledger.append_expense(expense.clone())?;
        self.persist()?;
        tracing::info!(%id, amount = amount.amount, currency = %trip, "expense recorded");
        Ok(expense)
    }

    /// Metadata change only; recorded expenses keep what they were frozen
    /// with.
    pub fn set_trip_currency(&mut self, code: Currency) -> Result<(), LedgerError> {
        self.ledger.set_trip_currency(code);
        self.persist()?;
        tracing::info!(currency = %code, "trip currency changed");
        Ok(())
    }

    /// Remove the persisted blobs and return to an empty ledger with the
    /// default trip currency.
    pub fn reset(&mut self) -> Result<(), LedgerError> {
        self.store.remove(KEY_TRIP_CURRENCY)?;
        self.store.remove(KEY_PARTICIPANTS)?;
        self.store.remove(KEY_EXPENSES)?;
        self.ledger.clear();
        tracing::info!("ledger reset");
        Ok(())
    }

    fn persist(&mut self) -> Result<(), LedgerError> {
        let trip = serde_json::to_string(&self.ledger.trip_currency())?;
        let participants = serde_json::to_string(self.ledger.participants())?;
        let expenses = serde_json::to_string(self.ledger.expenses())?;
        self.store.save(KEY_TRIP_CURRENCY, &trip)?;
        self.store.save(KEY_PARTICIPANTS, &participants)?;
        self.store.save(KEY_EXPENSES, &expenses)?;
        Ok(())
    }
}

fn load_ledger(store: &dyn BlobStore) -> Result<Ledger, LedgerError> {
    let trip = load_piece::<Currency>(store, KEY_TRIP_CURRENCY)?
        .unwrap_or(ledger::DEFAULT_TRIP_CURRENCY);
    let participants =
        load_piece::<Vec<Participant>>(store, KEY_PARTICIPANTS)?.unwrap_or_default();
    let expenses = load_piece::<Vec<Expense>>(store, KEY_EXPENSES)?.unwrap_or_default();
    Ok(Ledger::from_parts(trip, participants, expenses))
}

/// A missing blob is absent; an unreadable one degrades to absent with a
/// warning instead of taking the whole ledger down.
fn load_piece<T: DeserializeOwned>(
    store: &dyn BlobStore,
    key: &str,
) -> Result<Option<T>, LedgerError> {
    let Some(blob) = store.load(key)? else {
        return Ok(None);
    };
    match serde_json::from_str(&blob) {
        Ok(value) => Ok(Some(value)),
        Err(err) => {
            tracing::warn!(key, %err, "discarding unreadable blob");
            Ok(None)
        }
    }
}

/// Single-flight discipline for `add_expense`: acquired before rate
/// resolution starts, released when the call settles either way (the `Drop`
/// runs even if the caller discards the pending future).
struct InFlightGuard(Arc<AtomicBool>);

impl InFlightGuard {
    fn try_acquire(flag: Arc<AtomicBool>) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
            .then(|| Self(flag))
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}
