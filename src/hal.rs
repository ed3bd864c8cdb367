//! `embedded-hal` bridge adapter.
//!
//! Adapts any [`SetDutyCycle`] output into a [`PwmChannel`], for hosts
//! whose PWM hardware speaks the `embedded-hal` 1.0 vocabulary.
//!
//! ## Mapping
//!
//! `embedded-hal` fixes the period in the timer/slice setup and takes
//! duty as a fraction of `max_duty_cycle()`, so the adapter is told the
//! period once at construction, reports it back through
//! [`hardware_period`](PwmChannel::hardware_period), and rescales
//! nanosecond duties onto the device's own tick range.  There is no
//! output on/off in the trait either: disable parks the output at zero
//! ticks, enable re-applies the last configured duty.

use embedded_hal::pwm::SetDutyCycle;

use crate::ports::{PwmChannel, PwmError};

/// [`PwmChannel`] over an `embedded-hal` duty-cycle output.
#[derive(Debug)]
pub struct FixedPeriodChannel<P: SetDutyCycle> {
    pwm: P,
    period_ns: u64,
    duty_ns: u64,
    enabled: bool,
}

impl<P: SetDutyCycle> FixedPeriodChannel<P> {
    /// Wrap `pwm`, whose waveform period was configured to `period_ns`.
    ///
    /// The adapter starts parked: nothing is written until the first
    /// configure/enable sequence.
    pub fn new(pwm: P, period_ns: u64) -> Self {
        Self {
            pwm,
            period_ns,
            duty_ns: 0,
            enabled: false,
        }
    }

    /// Give the wrapped output back.
    pub fn release(self) -> P {
        self.pwm
    }

    /// Rescale a nanosecond duty onto the device tick range and write it.
    fn write_ticks(&mut self, duty_ns: u64) -> Result<(), P::Error> {
        let max = u64::from(self.pwm.max_duty_cycle());
        let ticks = if self.period_ns == 0 {
            0
        } else {
            let scaled = u128::from(duty_ns) * u128::from(max) / u128::from(self.period_ns);
            (scaled as u64).min(max)
        };
        self.pwm.set_duty_cycle(ticks as u16)
    }
}

impl<P: SetDutyCycle> PwmChannel for FixedPeriodChannel<P> {
    fn configure(&mut self, duty_ns: u64, period_ns: u64) -> Result<(), PwmError> {
        self.period_ns = period_ns;
        self.duty_ns = duty_ns;
        // While disabled the output stays parked; the new duty reaches
        // the hardware on the next enable.
        if self.enabled {
            self.write_ticks(duty_ns).map_err(|_| PwmError::Configure)?;
        }
        Ok(())
    }

    fn enable(&mut self) -> Result<(), PwmError> {
        self.write_ticks(self.duty_ns).map_err(|_| PwmError::Enable)?;
        self.enabled = true;
        Ok(())
    }

    fn disable(&mut self) -> Result<(), PwmError> {
        self.write_ticks(0).map_err(|_| PwmError::Disable)?;
        self.enabled = false;
        Ok(())
    }

    fn hardware_period(&self) -> Option<u64> {
        Some(self.period_ns)
    }
}
