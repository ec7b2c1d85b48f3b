//! A fixed-precision currency amount, newtyped over `u128` so miner fees,
//! fee floors, and fee-estimation output can never be mixed up with a
//! plain byte count or block height at the type level.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub};

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct Currency(pub u128);

impl Currency {
    pub const ZERO: Currency = Currency(0);

    pub const fn new(amount: u128) -> Self {
        Currency(amount)
    }

    pub fn saturating_mul(self, rhs: u128) -> Self {
        Currency(self.0.saturating_mul(rhs))
    }

    pub fn checked_div(self, rhs: u128) -> Option<Currency> {
        if rhs == 0 {
            None
        } else {
            Some(Currency(self.0 / rhs))
        }
    }
}

impl Add for Currency {
    type Output = Currency;
    fn add(self, rhs: Self) -> Self {
        Currency(self.0.saturating_add(rhs.0))
    }
}

impl AddAssign for Currency {
    fn add_assign(&mut self, rhs: Self) {
        self.0 = self.0.saturating_add(rhs.0);
    }
}

impl Sub for Currency {
    type Output = Currency;
    fn sub(self, rhs: Self) -> Self {
        Currency(self.0.saturating_sub(rhs.0))
    }
}

impl Mul<u128> for Currency {
    type Output = Currency;
    fn mul(self, rhs: u128) -> Self {
        Currency(self.0.saturating_mul(rhs))
    }
}

impl Sum for Currency {
    fn sum<I: Iterator<Item = Currency>>(iter: I) -> Self {
        iter.fold(Currency::ZERO, Add::add)
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Currency({})", self.0)
    }
}
