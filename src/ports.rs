//! Port traits: the boundary between the brightness core and the host
//! platform.
//!
//! ```text
//!   PwmProvider ──▶ PwmChannel ──▶ PwmElement (core)
//!   LedHost     ◀──────────────── LedBank (register / unregister)
//!   ColorScaler ◀──────────────── PwmLed (once per brightness set)
//! ```
//!
//! The host's device/driver model implements these traits.  The core
//! consumes them via generics at call sites, so it never touches platform
//! machinery directly and every code path is testable against recording
//! mocks.
//!
//! ## Ownership notes
//!
//! - A [`PwmChannel`] handle is exclusively owned by one element for the
//!   device's whole lifetime; releasing the underlying hardware claim is
//!   the handle's `Drop`, which runs deterministically before the owning
//!   device is considered removed.
//! - [`AcquireError::Deferred`] is a scheduling signal, not a fault;
//!   implementations and callers must keep it distinguishable from hard
//!   failures all the way up.

use core::fmt;

use crate::device::ColorChannel;

// ───────────────────────────────────────────────────────────────
// PWM channel (driven: core → hardware)
// ───────────────────────────────────────────────────────────────

/// One PWM output channel, exclusively owned by a single element.
///
/// The core only ever programs a `(duty, period)` pair and toggles the
/// output; waveform generation itself is entirely the implementation's
/// concern.
pub trait PwmChannel {
    /// Program the `(duty, period)` pair, both in nanoseconds.
    ///
    /// Must be accepted before a following [`enable`](Self::enable) takes
    /// effect, so a re-enabled output immediately reflects the new duty
    /// rather than a stale one.
    fn configure(&mut self, duty_ns: u64, period_ns: u64) -> Result<(), PwmError>;

    /// Start signal generation with the last configured pair.
    fn enable(&mut self) -> Result<(), PwmError>;

    /// Stop signal generation entirely (output parked inactive).
    fn disable(&mut self) -> Result<(), PwmError>;

    /// Hardware-reported period in nanoseconds, if the platform carries
    /// one for this channel.  `None` or `Some(0)` both mean "no usable
    /// period of its own".
    fn hardware_period(&self) -> Option<u64>;
}

// ───────────────────────────────────────────────────────────────
// PWM provider (driven: core → platform resource lookup)
// ───────────────────────────────────────────────────────────────

/// Lookup key for channel acquisition.
///
/// Flat LEDs are looked up by the LED name alone; color elements of a
/// multi-color LED are looked up by their generated `element-<index>`
/// label scoped under the LED.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelRequest<'a> {
    /// Name of the LED the channel will belong to.
    pub led: &'a str,
    /// Sub-entry label (`element-<index>`), `None` for flat LEDs.
    pub element: Option<&'a str>,
}

impl fmt::Display for ChannelRequest<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.element {
            Some(elem) => write!(f, "{}/{}", self.led, elem),
            None => write!(f, "{}", self.led),
        }
    }
}

/// Hands out PWM channel handles for the descriptions the config names.
pub trait PwmProvider {
    /// Concrete channel handle type this provider produces.
    type Channel: PwmChannel;

    /// Resolve a request to an exclusively owned channel handle.
    ///
    /// Returns [`AcquireError::Deferred`] when the channel is expected to
    /// appear later: the whole probe aborts and may be retried by the
    /// host, and the core never converts this into a hard failure.
    fn acquire(&mut self, request: &ChannelRequest<'_>) -> Result<Self::Channel, AcquireError>;
}

// ───────────────────────────────────────────────────────────────
// Brightness host (consumed + exposed: registration and dispatch)
// ───────────────────────────────────────────────────────────────

/// Identifier the host assigns to a registered LED device.
///
/// The host quotes it back when invoking
/// [`LedBank::set_brightness`](crate::bank::LedBank::set_brightness) and
/// the core quotes it when unregistering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LedToken(pub u32);

/// Per-device registration flags, combined into a bitmask.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum LedFlag {
    /// Device state should survive host suspend/resume cycles.
    SuspendResume = 0b0000_0001,
    /// Device exposes multiple named color channels.
    MultiColor = 0b0000_0010,
}

impl LedFlag {
    /// Return the bitmask for this flag.
    pub const fn mask(self) -> u8 {
        self as u8
    }
}

/// Everything the host needs to surface one LED device to its users.
#[derive(Debug)]
pub struct LedRegistration<'a> {
    pub name: &'a str,
    pub default_trigger: Option<&'a str>,
    pub max_brightness: u32,
    /// Color channel descriptors in device order; index positions are the
    /// same `color_index` values the elements carry.
    pub color_channels: &'a [ColorChannel],
    /// Bitwise OR of [`LedFlag`] masks.
    pub flags: u8,
}

/// Registration/dispatch collaborator, the host's LED class layer.
pub trait LedHost {
    /// Surface a device.  After `Ok`, the host may start invoking the
    /// bank's brightness entry point with the returned token at any time.
    fn register(&mut self, registration: &LedRegistration<'_>) -> Result<LedToken, RegisterError>;

    /// Withdraw a device.  Called exactly once per successful
    /// registration, in reverse construction order on teardown.
    fn unregister(&mut self, token: LedToken);
}

// ───────────────────────────────────────────────────────────────
// Color scaling (driven: core → brightness policy)
// ───────────────────────────────────────────────────────────────

/// Expands one overall brightness scalar into per-channel driven values.
///
/// Called exactly once per brightness set, before any duty computation,
/// with every channel of the device.  Implementations write each
/// channel's `value`; [`ColorChannel::set_value`] clamps to the channel's
/// scale, so a scaler cannot break the duty bound invariant.
pub trait ColorScaler {
    fn rescale(&self, channels: &mut [ColorChannel], brightness: u32, max_brightness: u32);
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Fault reported by a [`PwmChannel`] implementation.
///
/// Not expected during steady-state operation of a correctly configured
/// channel; when one does appear it propagates to the brightness-set
/// caller unmasked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PwmError {
    /// The channel rejected the `(duty, period)` pair.
    Configure,
    /// Output enable failed.
    Enable,
    /// Output disable failed.
    Disable,
}

/// Outcome of a failed [`PwmProvider::acquire`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcquireError {
    /// Channel not ready yet; retry the whole probe later.
    Deferred,
    /// Permanent acquisition failure with a host-supplied reason.
    Failed(&'static str),
}

/// Outcome of a failed [`LedHost::register`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterError {
    /// A device with this name is already registered.
    DuplicateName,
    /// The host rejected the registration for its own reasons.
    Rejected(&'static str),
}

impl fmt::Display for PwmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Configure => write!(f, "channel rejected duty/period configuration"),
            Self::Enable => write!(f, "channel enable failed"),
            Self::Disable => write!(f, "channel disable failed"),
        }
    }
}

impl fmt::Display for AcquireError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Deferred => write!(f, "channel not available yet"),
            Self::Failed(reason) => write!(f, "channel acquisition failed: {reason}"),
        }
    }
}

impl fmt::Display for RegisterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateName => write!(f, "device name already registered"),
            Self::Rejected(reason) => write!(f, "registration rejected: {reason}"),
        }
    }
}
