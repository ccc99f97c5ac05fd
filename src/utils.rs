/// Rounds to 4 decimal digits, the precision of every serialized value.
pub(crate) fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}
