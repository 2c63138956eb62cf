/// Signed money amount in **integer minor units** (cents).
///
/// Every monetary value in the ledger (transaction totals, split amounts,
/// account balances, budgeted amounts) is carried as this type so that
/// arithmetic stays exact to the cent. The wire and the database both speak
/// raw `i64` minor units; this type is the in-process form.
///
/// The value is signed:
/// - positive = inflow / increase
/// - negative = outflow / decrease
///
/// # Examples
///
/// ```rust
/// use ledger::MoneyCents;
///
/// let parts = [MoneyCents::new(60_00), MoneyCents::new(40_00)];
/// assert_eq!(MoneyCents::checked_sum(parts), Some(MoneyCents::new(100_00)));
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(transparent)]
pub struct MoneyCents(i64);

impl MoneyCents {
    pub const ZERO: MoneyCents = MoneyCents(0);

    /// Creates a new amount from integer cents.
    #[must_use]
    pub const fn new(cents: i64) -> Self {
        Self(cents)
    }

    /// Returns the raw value in cents.
    #[must_use]
    pub const fn cents(self) -> i64 {
        self.0
    }

    /// Returns `true` if the amount is strictly positive.
    #[must_use]
    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    /// Checked addition (returns `None` on overflow).
    #[must_use]
    pub fn checked_add(self, rhs: MoneyCents) -> Option<MoneyCents> {
        self.0.checked_add(rhs.0).map(MoneyCents)
    }

    /// Sums an iterator of amounts, `None` on overflow.
    ///
    /// Split validation runs every submitted set through this before any
    /// comparison against the transaction total, so a hostile set of
    /// near-`i64::MAX` splits is rejected instead of wrapping.
    #[must_use]
    pub fn checked_sum<I>(amounts: I) -> Option<MoneyCents>
    where
        I: IntoIterator<Item = MoneyCents>,
    {
        amounts
            .into_iter()
            .try_fold(MoneyCents::ZERO, MoneyCents::checked_add)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checked_sum_folds_and_overflows() {
        let some = [MoneyCents::new(100), MoneyCents::new(-40)];
        assert_eq!(MoneyCents::checked_sum(some), Some(MoneyCents::new(60)));

        let overflow = [MoneyCents::new(i64::MAX), MoneyCents::new(1)];
        assert_eq!(MoneyCents::checked_sum(overflow), None);
    }

    #[test]
    fn zero_is_not_positive() {
        assert!(!MoneyCents::ZERO.is_positive());
        assert!(MoneyCents::new(1).is_positive());
        assert!(!MoneyCents::new(-1).is_positive());
    }
}
