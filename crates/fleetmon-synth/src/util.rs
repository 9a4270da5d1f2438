//! Money helpers used by the cost generators.

/// Round to whole cents.
pub(crate) fn round_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

/// Dollars to integer cents.
pub(crate) fn to_cents(amount: f64) -> i64 {
    (amount * 100.0).round() as i64
}

/// Integer cents back to dollars.
pub(crate) fn from_cents(cents: i64) -> f64 {
    cents as f64 / 100.0
}
