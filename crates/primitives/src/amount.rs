//! Amounts denominated in the external chain's base unit.

use arbitrary::Arbitrary;
use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};

/// An amount in the external chain's smallest denomination (satoshis for the
/// Bitcoin chain model).
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Eq,
    PartialEq,
    Ord,
    PartialOrd,
    Hash,
    Arbitrary,
    BorshSerialize,
    BorshDeserialize,
    Serialize,
    Deserialize,
)]
pub struct SatAmount(u64);

impl SatAmount {
    pub const ZERO: SatAmount = SatAmount(0);

    pub const fn from_sat(value: u64) -> Self {
        Self(value)
    }

    pub const fn to_sat(self) -> u64 {
        self.0
    }

    pub fn checked_add(self, rhs: SatAmount) -> Option<SatAmount> {
        self.0.checked_add(rhs.0).map(SatAmount)
    }

    pub fn checked_sub(self, rhs: SatAmount) -> Option<SatAmount> {
        self.0.checked_sub(rhs.0).map(SatAmount)
    }

    pub fn saturating_add(self, rhs: SatAmount) -> SatAmount {
        SatAmount(self.0.saturating_add(rhs.0))
    }
}

impl ::core::fmt::Display for SatAmount {
    fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<bitcoin::Amount> for SatAmount {
    fn from(value: bitcoin::Amount) -> Self {
        Self(value.to_sat())
    }
}

impl From<SatAmount> for bitcoin::Amount {
    fn from(value: SatAmount) -> Self {
        bitcoin::Amount::from_sat(value.0)
    }
}
