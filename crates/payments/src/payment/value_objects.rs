//! Value objects for the payment domain.

use common::AggregateId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PaymentRef(Uuid);

impl PaymentRef {
    /// Creates a new random payment reference.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for PaymentRef {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for PaymentRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Payments are keyed in the event log by their reference.
impl From<PaymentRef> for AggregateId {
    fn from(id: PaymentRef) -> Self {
        AggregateId::from_uuid(id.0)
    }
}

/// Reference to the order a payment settles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderRef(Uuid);

impl OrderRef {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for OrderRef {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for OrderRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Monetary amount stored in cents to avoid floating point issues.
///
/// Serializes as a bare integer count of cents. `+` and `-` saturate at the
/// bounds of `i64`; use [`Amount::checked_add`] and [`Amount::checked_sub`]
/// to detect overflow instead.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Amount {
    cents: i64,
}

impl Amount {
    pub fn from_cents(cents: i64) -> Self {
        Self { cents }
    }

    /// Creates an amount from whole dollars, saturating at the `i64` bounds.
    pub fn from_dollars(dollars: i64) -> Self {
        Self {
            cents: dollars.saturating_mul(100),
        }
    }

    pub fn zero() -> Self {
        Self { cents: 0 }
    }

    pub fn cents(&self) -> i64 {
        self.cents
    }

    /// Returns the whole-dollar portion.
    pub fn dollars(&self) -> i64 {
        self.cents / 100
    }

    /// Returns the cents remaining after whole dollars.
    pub fn cents_part(&self) -> i64 {
        (self.cents.unsigned_abs() % 100) as i64
    }

    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        self.cents.checked_add(rhs.cents).map(Self::from_cents)
    }

    pub fn checked_sub(self, rhs: Self) -> Option<Self> {
        self.cents.checked_sub(rhs.cents).map(Self::from_cents)
    }

    pub fn is_positive(&self) -> bool {
        self.cents > 0
    }

    pub fn is_zero(&self) -> bool {
        self.cents == 0
    }

    pub fn is_negative(&self) -> bool {
        self.cents < 0
    }
}

impl std::fmt::Display for Amount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.cents < 0 {
            write!(f, "-${}.{:02}", self.dollars().abs(), self.cents_part())
        } else {
            write!(f, "${}.{:02}", self.dollars(), self.cents_part())
        }
    }
}

impl std::ops::Add for Amount {
    type Output = Amount;

    fn add(self, rhs: Self) -> Self::Output {
        Amount {
            cents: self.cents.saturating_add(rhs.cents),
        }
    }
}

impl std::ops::Sub for Amount {
    type Output = Amount;

    fn sub(self, rhs: Self) -> Self::Output {
        Amount {
            cents: self.cents.saturating_sub(rhs.cents),
        }
    }
}
