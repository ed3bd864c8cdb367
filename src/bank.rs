//! Bank lifecycle: probe, brightness dispatch, teardown.
//!
//! ```text
//!   BankConfig ──▶ probe ──▶ LedBank ──▶ teardown
//!                    │            │
//!                    │            ├─ set_brightness(token, ..)
//!              acquire+register   └─ set_intensity(token, ..)
//! ```
//!
//! Probe is all-or-nothing: devices are constructed in description
//! order, and the first failure unwinds everything already built
//! (unregister newest-first, channel handles released by drop) before
//! the error reaches the caller.  A deferred channel aborts the same
//! way but is reported as [`ProbeError::ChannelDeferred`] so the host
//! can requeue the probe instead of reporting a fault.

use core::fmt::Write as _;

use log::{debug, error, info, warn};

use crate::config::{BankConfig, LedConfig};
use crate::device::{ColorChannel, LedSnapshot, PwmLed};
use crate::element::PwmElement;
use crate::error::{ConfigFault, ProbeError, ProbeResult, SetError};
use crate::ports::{
    AcquireError, ChannelRequest, ColorScaler, LedHost, LedToken, PwmChannel, PwmProvider,
};

/// Provider lookup label for one color element, formatted without heap.
fn element_label(index: usize) -> heapless::String<32> {
    let mut label = heapless::String::new();
    // "element-" plus a usize always fits the capacity.
    let _ = write!(label, "element-{index}");
    label
}

#[derive(Debug)]
struct BankEntry<C: PwmChannel> {
    token: LedToken,
    led: PwmLed<C>,
}

/// Every LED device probed from one description, keyed by host token.
///
/// Dropping the bank releases all channel handles; going through
/// [`teardown`](Self::teardown) additionally withdraws the devices from
/// the host, newest first.
#[derive(Debug)]
pub struct LedBank<C: PwmChannel> {
    entries: Vec<BankEntry<C>>,
}

impl<C: PwmChannel> LedBank<C> {
    /// Construct and register every device the description names.
    ///
    /// Each device's output is driven to a known-dark state before the
    /// host can dispatch its first brightness set; a failure of that
    /// initial drive is logged and tolerated, since the device is
    /// already surfaced and the next set retries the same path.
    pub fn probe(
        config: &BankConfig,
        provider: &mut impl PwmProvider<Channel = C>,
        host: &mut impl LedHost,
        scaler: &impl ColorScaler,
    ) -> ProbeResult<Self> {
        config.validate()?;

        let mut bank = Self {
            entries: Vec::with_capacity(config.leds.len()),
        };
        for led_config in &config.leds {
            let outcome = if led_config.is_multi_color() {
                bank.add_multi(led_config, provider, host, scaler)
            } else {
                bank.add_single(led_config, provider, host, scaler)
            };
            if let Err(err) = outcome {
                bank.release(host);
                return Err(err);
            }
        }

        info!("registered {} PWM LED device(s)", bank.entries.len());
        Ok(bank)
    }

    /// Flat single-color device: one channel looked up under the LED
    /// name, period from the channel falling back to the config.
    fn add_single(
        &mut self,
        config: &LedConfig,
        provider: &mut impl PwmProvider<Channel = C>,
        host: &mut impl LedHost,
        scaler: &impl ColorScaler,
    ) -> ProbeResult<()> {
        let request = ChannelRequest {
            led: &config.name,
            element: None,
        };
        let channel = Self::acquire(provider, &request, None)?;

        let period_ns = match channel.hardware_period() {
            Some(p) if p > 0 => p,
            _ => config.period_ns,
        };
        if period_ns == 0 {
            return Err(ConfigFault::ZeroPeriod {
                led: config.name.clone(),
            }
            .into());
        }

        let channels = vec![ColorChannel::new("single", config.max_brightness)];
        let elements = vec![PwmElement::new(
            channel,
            Some(0),
            config.active_low,
            period_ns,
        )];
        self.finish(config, false, channels, elements, host, scaler)
    }

    /// Multi-color device: one channel per element, looked up under the
    /// generated `element-<index>` label, period taken from the channel
    /// only.
    fn add_multi(
        &mut self,
        config: &LedConfig,
        provider: &mut impl PwmProvider<Channel = C>,
        host: &mut impl LedHost,
        scaler: &impl ColorScaler,
    ) -> ProbeResult<()> {
        let mut channels = Vec::with_capacity(config.elements.len());
        let mut elements = Vec::with_capacity(config.elements.len());

        for (index, element_config) in config.elements.iter().enumerate() {
            let label = element_label(index);
            let request = ChannelRequest {
                led: &config.name,
                element: Some(label.as_str()),
            };
            // Channels already collected in `elements` are released by
            // drop if this element fails.
            let channel = Self::acquire(provider, &request, Some(index))?;

            let period_ns = channel.hardware_period().unwrap_or(0);
            if period_ns == 0 {
                return Err(ConfigFault::MissingElementPeriod {
                    led: config.name.clone(),
                    element: index,
                }
                .into());
            }

            channels.push(ColorChannel::new(
                element_config.color.as_str(),
                config.max_brightness,
            ));
            elements.push(PwmElement::new(
                channel,
                Some(index),
                element_config.active_low,
                period_ns,
            ));
        }

        self.finish(config, true, channels, elements, host, scaler)
    }

    fn acquire(
        provider: &mut impl PwmProvider<Channel = C>,
        request: &ChannelRequest<'_>,
        element: Option<usize>,
    ) -> ProbeResult<C> {
        match provider.acquire(request) {
            Ok(channel) => Ok(channel),
            Err(AcquireError::Deferred) => {
                // A scheduling signal, not a fault: no error-level log.
                debug!("{request}: PWM channel not ready, deferring probe");
                Err(ProbeError::ChannelDeferred {
                    led: request.led.to_string(),
                })
            }
            Err(AcquireError::Failed(reason)) => {
                error!("{request}: unable to acquire PWM channel: {reason}");
                Err(ProbeError::ChannelAcquisition {
                    led: request.led.to_string(),
                    element,
                    reason,
                })
            }
        }
    }

    /// Register the assembled device and park its output dark.
    fn finish(
        &mut self,
        config: &LedConfig,
        multi_color: bool,
        channels: Vec<ColorChannel>,
        elements: Vec<PwmElement<C>>,
        host: &mut impl LedHost,
        scaler: &impl ColorScaler,
    ) -> ProbeResult<()> {
        let mut led = PwmLed::new(
            config.name.clone(),
            config.default_trigger.clone(),
            config.max_brightness,
            multi_color,
            channels,
            elements,
        );

        let token = match host.register(&led.registration()) {
            Ok(token) => token,
            Err(reason) => {
                error!("{}: failed to register LED device: {reason}", config.name);
                return Err(ProbeError::Registration {
                    led: config.name.clone(),
                    reason,
                });
            }
        };

        if let Err(e) = led.set_brightness(0, scaler) {
            warn!("{}: initial brightness apply failed: {e}", led.name());
        }

        self.entries.push(BankEntry { token, led });
        Ok(())
    }

    /// Withdraw everything constructed so far, newest first.
    fn release(&mut self, host: &mut impl LedHost) {
        while let Some(entry) = self.entries.pop() {
            host.unregister(entry.token);
            // Dropping the entry releases the device's channel handles.
        }
    }

    /// Apply one overall brightness to the device behind `token`.
    pub fn set_brightness(
        &mut self,
        token: LedToken,
        brightness: u32,
        scaler: &impl ColorScaler,
    ) -> Result<(), SetError> {
        let entry = self
            .entries
            .iter_mut()
            .find(|e| e.token == token)
            .ok_or(SetError::UnknownToken)?;
        entry.led.set_brightness(brightness, scaler)?;
        Ok(())
    }

    /// Re-weight one color axis of the device behind `token` and
    /// re-drive it at its current brightness.
    pub fn set_intensity(
        &mut self,
        token: LedToken,
        channel: usize,
        intensity: u32,
        scaler: &impl ColorScaler,
    ) -> Result<(), SetError> {
        let entry = self
            .entries
            .iter_mut()
            .find(|e| e.token == token)
            .ok_or(SetError::UnknownToken)?;
        entry.led.set_intensity(channel, intensity, scaler)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Device behind `token`, if it belongs to this bank.
    pub fn led(&self, token: LedToken) -> Option<&PwmLed<C>> {
        self.entries
            .iter()
            .find(|e| e.token == token)
            .map(|e| &e.led)
    }

    /// Mutable handles to every device, in construction order.
    ///
    /// The handles borrow disjoint slots, so a host can hand each
    /// device to its own worker and drive them concurrently; the bank
    /// itself stays mutably borrowed for as long as any handle lives.
    pub fn leds_mut(&mut self) -> impl Iterator<Item = (LedToken, &mut PwmLed<C>)> + '_ {
        self.entries.iter_mut().map(|e| (e.token, &mut e.led))
    }

    /// Diagnostic view of every device, in construction order.
    pub fn snapshots(&self) -> Vec<LedSnapshot> {
        self.entries.iter().map(|e| e.led.snapshot()).collect()
    }

    /// Withdraw every device from the host and release its channels,
    /// newest first.
    pub fn teardown(mut self, host: &mut impl LedHost) {
        let count = self.entries.len();
        self.release(host);
        info!("released {count} PWM LED device(s)");
    }
}
