//! Leaf drive unit: one PWM channel bound to its polarity, period, and
//! color slot.
//!
//! Elements are assembled during probe and never reconfigured afterwards;
//! the only mutable state is the last duty actually accepted by the
//! channel.

use crate::ports::{PwmChannel, PwmError};

/// One PWM output belonging to a device.
#[derive(Debug)]
pub struct PwmElement<C: PwmChannel> {
    channel: C,
    /// Position of the color channel this element draws its value from;
    /// `None` leaves the element parked at its last duty.
    color_index: Option<usize>,
    active_low: bool,
    period_ns: u64,
    duty_ns: u64,
}

impl<C: PwmChannel> PwmElement<C> {
    pub(crate) fn new(
        channel: C,
        color_index: Option<usize>,
        active_low: bool,
        period_ns: u64,
    ) -> Self {
        Self {
            channel,
            color_index,
            active_low,
            period_ns,
            duty_ns: 0,
        }
    }

    pub fn color_index(&self) -> Option<usize> {
        self.color_index
    }

    pub fn active_low(&self) -> bool {
        self.active_low
    }

    pub fn period_ns(&self) -> u64 {
        self.period_ns
    }

    /// Last duty the channel accepted, in nanoseconds.
    pub fn duty_ns(&self) -> u64 {
        self.duty_ns
    }

    /// Program the channel to `duty_ns` and switch the output to match.
    ///
    /// Ordering is fixed: the duty/period pair is configured first, so a
    /// following enable starts on the new waveform rather than a stale
    /// one; a zero duty then disables the output entirely instead of
    /// leaving it running at 0%.  The recorded duty is updated only once
    /// both channel calls have succeeded.
    pub fn apply(&mut self, duty_ns: u64) -> Result<(), PwmError> {
        self.channel.configure(duty_ns, self.period_ns)?;
        if duty_ns == 0 {
            self.channel.disable()?;
        } else {
            self.channel.enable()?;
        }
        self.duty_ns = duty_ns;
        Ok(())
    }
}
