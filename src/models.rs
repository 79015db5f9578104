//! Data models for participants, expenses and balances.
//! Monetary amounts are tagged with their currency; arithmetic never mixes
//! currencies silently, and conversion always takes an explicit rate.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::LedgerError;
use crate::ids::ExpenseId;

/// Supported currencies. Closed set; codes compare by equality only.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    USD,
    EUR,
    GBP,
    BRL,
    COP,
    CAD,
    AUD,
    JPY,
    INR,
}

impl Currency {
    /// Every supported currency, in picker order.
    pub const ALL: [Currency; 9] = [
        Currency::USD,
        Currency::EUR,
        Currency::GBP,
        Currency::BRL,
        Currency::COP,
        Currency::CAD,
        Currency::AUD,
        Currency::JPY,
        Currency::INR,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Currency::USD => "USD",
            Currency::EUR => "EUR",
            Currency::GBP => "GBP",
            Currency::BRL => "BRL",
            Currency::COP => "COP",
            Currency::CAD => "CAD",
            Currency::AUD => "AUD",
            Currency::JPY => "JPY",
            Currency::INR => "INR",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "USD" => Some(Currency::USD),
            "EUR" => Some(Currency::EUR),
            "GBP" => Some(Currency::GBP),
            "BRL" => Some(Currency::BRL),
            "COP" => Some(Currency::COP),
            "CAD" => Some(Currency::CAD),
            "AUD" => Some(Currency::AUD),
            "JPY" => Some(Currency::JPY),
            "INR" => Some(Currency::INR),
            _ => None,
        }
    }
}

impl std::fmt::Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Tolerance matching the two-decimal display rounding of the UI layer.
pub const DISPLAY_EPSILON: f64 = 0.01;

/// A monetary amount tagged with its currency. Stored at full precision;
/// rounding to minor units is a display concern.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Money {
    pub amount: f64,
    pub currency: Currency,
}

impl Money {
    pub fn new(amount: f64, currency: Currency) -> Self {
        Self { amount, currency }
    }

    pub fn add(self, other: Money) -> Result<Money, LedgerError> {
        self.check_same_currency(other)?;
        Ok(Money::new(self.amount + other.amount, self.currency))
    }

    pub fn sub(self, other: Money) -> Result<Money, LedgerError> {
        self.check_same_currency(other)?;
        Ok(Money::new(self.amount - other.amount, self.currency))
    }

    /// The only operation allowed to change currency. The rate is taken as
    /// valid; vetting it is the caller's job.
    pub fn convert(self, rate: f64, to: Currency) -> Money {
        Money::new(self.amount * rate, to)
    }

    pub fn is_zero(&self, epsilon: f64) -> bool {
        self.amount.abs() < epsilon
    }

    fn check_same_currency(self, other: Money) -> Result<(), LedgerError> {
        if self.currency != other.currency {
            return Err(LedgerError::CurrencyMismatch {
                left: self.currency,
                right: other.currency,
            });
        }
        Ok(())
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2} {}", self.amount, self.currency)
    }
}

/// A person on the trip. The name is the identity key, unique
/// case-insensitively within a ledger; the entered casing is preserved.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Participant {
    pub name: String,
    pub home_currency: Currency,
}

impl Participant {
    pub fn new(name: impl Into<String>, home_currency: Currency) -> Self {
        Self {
            name: name.into(),
            home_currency,
        }
    }

    pub fn matches_name(&self, name: &str) -> bool {
        self.name.to_lowercase() == name.to_lowercase()
    }
}

/// A recorded expense. `shares` and `payer_credit` are frozen at creation
/// time from one rate lookup and never recomputed afterwards.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    pub id: ExpenseId,
    /// Amount in the trip currency that was current when the expense was
    /// recorded. A later trip-currency change does not touch it.
    pub amount: Money,
    pub description: String,
    /// Canonical name of the participant who paid.
    pub payer: String,
    /// Canonical names of everyone sharing the cost; non-empty. The payer may
    /// or may not be among them.
    pub split_with: Vec<String>,
    /// One share per split member, in that member's home currency.
    pub shares: BTreeMap<String, Money>,
    /// Full expense amount in the payer's home currency, credited back to the
    /// payer when balances are derived.
    pub payer_credit: Money,
    pub created_at: DateTime<Utc>,
}

/// Net position of one participant, derived on demand. Positive means the
/// participant is owed money; negative means they owe.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Balance {
    pub participant: String,
    pub net: Money,
}

/// Listing order for the expense history.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExpenseOrder {
    Chronological,
    NewestFirst,
}
