//! Duty-cycle arithmetic.
//!
//! One pure function, kept free of I/O so its bound and endpoint
//! properties can be checked exhaustively in tests.

/// Map a channel value onto a duty in nanoseconds.
///
/// Computes `floor(period * value / max_value)` in 128-bit so the
/// intermediate product cannot wrap for any representable inputs, then
/// inverts the result against `period` for active-low outputs.
///
/// The result always lies in `0..=period_ns`: the quotient is bounded by
/// the period because `value <= max_value`, and the active-low inversion
/// maps that range onto itself.  `max_value` must be non-zero; bank
/// validation rejects zero scales before any element exists.
pub fn duty_cycle(period_ns: u64, value: u32, max_value: u32, active_low: bool) -> u64 {
    debug_assert!(max_value > 0, "channel scale must be non-zero");

    // Channel writes already clamp to the scale; holding the bound here
    // keeps the active-low inversion safe for any caller.
    let value = value.min(max_value);

    let scaled = u128::from(period_ns) * u128::from(value) / u128::from(max_value);
    // value <= max_value bounds the quotient by period_ns.
    let duty = scaled as u64;

    if active_low { period_ns - duty } else { duty }
}
