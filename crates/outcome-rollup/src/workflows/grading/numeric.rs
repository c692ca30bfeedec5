use rust_decimal::{Decimal, RoundingStrategy};
use tracing::warn;

/// Allowed deviation from 100 when checking that contribution percentages partition an LO.
pub const GATE_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// Bound violations raised at the write boundary.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("{field} must be between 0 and 100 (found {value})")]
    OutOfRange { field: &'static str, value: Decimal },
}

/// Rounds to two fractional digits, half away from zero, and pins the scale to two.
pub fn round_half_up(value: Decimal) -> Decimal {
    let mut rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);
    rounded
}

pub fn is_percentage(value: Decimal) -> bool {
    value >= Decimal::ZERO && value <= HUNDRED
}

pub fn require_percentage(field: &'static str, value: Decimal) -> Result<Decimal, ValidationError> {
    if is_percentage(value) {
        Ok(value)
    } else {
        Err(ValidationError::OutOfRange { field, value })
    }
}

/// True when `total` equals 100 within [`GATE_TOLERANCE`].
pub fn partitions_hundred(total: Decimal) -> bool {
    (total - HUNDRED).abs() <= GATE_TOLERANCE
}

pub(crate) fn clamp_percentage(value: Decimal) -> Decimal {
    value.clamp(Decimal::ZERO, HUNDRED)
}

/// Clamps stored data that escaped the write boundary, logging what was adjusted.
pub(crate) fn bounded(field: &'static str, value: Decimal) -> Decimal {
    if is_percentage(value) {
        return value;
    }

    let clamped = clamp_percentage(value);
    warn!(field, %value, %clamped, "clamping out-of-range value during rollup");
    clamped
}

/// `value × percentage / 100`.
pub(crate) fn share(value: Decimal, percentage: Decimal) -> Decimal {
    value * percentage / HUNDRED
}

/// Final step of every rollup: clamp into [0, 100] then round half-up to 2dp.
pub(crate) fn settle(value: Decimal) -> Decimal {
    round_half_up(clamp_percentage(value))
}
