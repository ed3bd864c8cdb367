//! Unified error types for the brightness core.
//!
//! Two families, matching the two lifecycles a device has: [`ProbeError`]
//! for construction (acquire channels, register with the host) and
//! [`SetError`] for steady-state brightness dispatch.  Port-level faults
//! ([`PwmError`], [`AcquireError`], [`RegisterError`]) are defined next
//! to their traits in [`crate::ports`], funnel in via `From`, and are
//! re-exported here so one import path covers the whole error surface.
//!
//! Deferred channel availability is deliberately a first-class variant
//! rather than a stringly reason: hosts retry on it, and callers must
//! never collapse it into a hard failure or log it as one.

use core::fmt;

pub use crate::ports::{AcquireError, PwmError, RegisterError};

// ---------------------------------------------------------------------------
// Configuration faults
// ---------------------------------------------------------------------------

/// Structural defect in the bank description.
///
/// All of these are permanent: retrying the same description can never
/// succeed, so none of them participate in the deferred-retry protocol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigFault {
    /// The description names no LED devices at all.
    NoLeds,
    /// LED entry at this position carries an empty name.
    UnnamedLed { index: usize },
    /// Two LED entries share one name.
    DuplicateLedName { led: String },
    /// `max_brightness` of zero would make every duty computation divide
    /// by zero.
    ZeroMaxBrightness { led: String },
    /// Flat LED whose channel reports no period and whose config supplies
    /// no fallback.
    ZeroPeriod { led: String },
    /// Multi-color element whose channel reports no period; elements have
    /// no config fallback.
    MissingElementPeriod { led: String, element: usize },
}

impl fmt::Display for ConfigFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoLeds => write!(f, "no LED devices described"),
            Self::UnnamedLed { index } => write!(f, "LED entry {index} has no name"),
            Self::DuplicateLedName { led } => write!(f, "duplicate LED name {led}"),
            Self::ZeroMaxBrightness { led } => {
                write!(f, "{led}: max brightness must be non-zero")
            }
            Self::ZeroPeriod { led } => {
                write!(f, "{led}: no PWM period available from hardware or config")
            }
            Self::MissingElementPeriod { led, element } => {
                write!(f, "{led}: element-{element} channel reports no PWM period")
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Probe errors
// ---------------------------------------------------------------------------

/// Why bank construction stopped.
///
/// Construction is all-or-nothing: by the time one of these reaches the
/// caller, every channel acquired so far has been released and every
/// device registered so far has been withdrawn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeError {
    /// A channel is not available yet; retry the whole probe later.
    ChannelDeferred { led: String },
    /// Permanent channel acquisition failure.
    ChannelAcquisition {
        led: String,
        /// Element index for multi-color lookups, `None` for flat LEDs.
        element: Option<usize>,
        reason: &'static str,
    },
    /// The host refused to surface the device.
    Registration { led: String, reason: RegisterError },
    /// The description itself is defective.
    Config(ConfigFault),
}

impl ProbeError {
    /// Whether this outcome asks for a later retry rather than reporting
    /// a fault.  Hosts use this to requeue the probe silently.
    pub fn is_deferred(&self) -> bool {
        matches!(self, Self::ChannelDeferred { .. })
    }
}

impl fmt::Display for ProbeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ChannelDeferred { led } => {
                write!(f, "{led}: PWM channel not available yet")
            }
            Self::ChannelAcquisition {
                led,
                element: Some(idx),
                reason,
            } => write!(f, "{led}: element-{idx}: {reason}"),
            Self::ChannelAcquisition {
                led,
                element: None,
                reason,
            } => write!(f, "{led}: {reason}"),
            Self::Registration { led, reason } => write!(f, "{led}: {reason}"),
            Self::Config(fault) => write!(f, "config: {fault}"),
        }
    }
}

impl From<ConfigFault> for ProbeError {
    fn from(fault: ConfigFault) -> Self {
        Self::Config(fault)
    }
}

// ---------------------------------------------------------------------------
// Brightness-set errors
// ---------------------------------------------------------------------------

/// Why a brightness set was not applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetError {
    /// The token matches no device in this bank.
    UnknownToken,
    /// The color channel index is out of range for this device.
    UnknownChannel,
    /// A channel operation failed mid-apply; the device's recorded duties
    /// only reflect the elements that were programmed successfully.
    Pwm(PwmError),
}

impl fmt::Display for SetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownToken => write!(f, "no device registered under this token"),
            Self::UnknownChannel => write!(f, "color channel index out of range"),
            Self::Pwm(e) => write!(f, "pwm: {e}"),
        }
    }
}

impl From<PwmError> for SetError {
    fn from(e: PwmError) -> Self {
        Self::Pwm(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Construction-path `Result` alias.
pub type ProbeResult<T> = core::result::Result<T, ProbeError>;
