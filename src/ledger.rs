//! The ledger: one trip currency, insertion-ordered participants and an
//! append-only expense history. Structural invariants are enforced on insert;
//! a rejected insert leaves the ledger exactly as it was.

use crate::error::LedgerError;
use crate::models::{Currency, Expense, Participant};

pub const DEFAULT_TRIP_CURRENCY: Currency = Currency::USD;

#[derive(Clone, Debug, PartialEq)]
pub struct Ledger {
    trip_currency: Currency,
    participants: Vec<Participant>,
    expenses: Vec<Expense>,
}

impl Ledger {
    pub fn new(trip_currency: Currency) -> Self {
        Self {
            trip_currency,
            participants: Vec::new(),
            expenses: Vec::new(),
        }
    }

    /// Reassemble a ledger from its persisted pieces. Stored history is the
    /// source of truth and is taken as-is.
    pub fn from_parts(
        trip_currency: Currency,
        participants: Vec<Participant>,
        expenses: Vec<Expense>,
    ) -> Self {
        Self {
            trip_currency,
            participants,
            expenses,
        }
    }

    pub fn trip_currency(&self) -> Currency {
        self.trip_currency
    }

    pub fn participants(&self) -> &[Participant] {
        &self.participants
    }

    pub fn expenses(&self) -> &[Expense] {
        &self.expenses
    }

    /// Case-insensitive lookup by name.
    pub fn find_participant(&self, name: &str) -> Option<&Participant> {
        self.participants.iter().find(|p| p.matches_name(name))
    }

    /// Append a participant. The trimmed name must be non-empty and unique
    /// case-insensitively.
    pub fn add_participant(
        &mut self,
        name: &str,
        home_currency: Currency,
    ) -> Result<Participant, LedgerError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(LedgerError::EmptyName);
        }
        if self.find_participant(name).is_some() {
            return Err(LedgerError::DuplicateParticipant(name.to_string()));
        }
        let participant = Participant::new(name, home_currency);
        self.participants.push(participant.clone());
        Ok(participant)
    }

    /// Append a finalized expense. The payer and every split member must be
    /// known participants, the split must be non-empty, and the frozen shares
    /// must cover the split set exactly, each in that member's home currency.
    pub fn append_expense(&mut self, expense: Expense) -> Result<(), LedgerError> {
        if expense.split_with.is_empty() {
            return Err(LedgerError::EmptySplit);
        }
        let payer = self
            .find_participant(&expense.payer)
            .ok_or_else(|| LedgerError::UnknownParticipant(expense.payer.clone()))?;
        if expense.payer_credit.currency != payer.home_currency {
            return Err(LedgerError::CurrencyMismatch {
                left: expense.payer_credit.currency,
                right: payer.home_currency,
            });
        }
        if expense.shares.len() != expense.split_with.len() {
            return Err(LedgerError::ShareSetMismatch);
        }
        for name in &expense.split_with {
            let member = self
                .find_participant(name)
                .ok_or_else(|| LedgerError::UnknownParticipant(name.clone()))?;
            let share = expense
                .shares
                .get(name)
                .ok_or(LedgerError::ShareSetMismatch)?;
            if share.currency != member.home_currency {
                return Err(LedgerError::CurrencyMismatch {
                    left: share.currency,
                    right: member.home_currency,
                });
            }
        }
        self.expenses.push(expense);
        Ok(())
    }

    /// Metadata only: existing expenses keep the trip currency (and frozen
    /// shares) they were recorded with.
    pub fn set_trip_currency(&mut self, code: Currency) {
        self.trip_currency = code;
    }

    /// Back to an empty ledger with the default trip currency.
    pub fn clear(&mut self) {
        self.trip_currency = DEFAULT_TRIP_CURRENCY;
        self.participants.clear();
        self.expenses.clear();
    }
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new(DEFAULT_TRIP_CURRENCY)
    }
}
