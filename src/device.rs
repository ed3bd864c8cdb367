//! LED device model: color channels plus the PWM elements driving them.
//!
//! A device owns two parallel collections fixed at probe time.  Color
//! channels carry what the host sees (names, intensities, driven
//! values); elements carry what the hardware sees (channel handles,
//! polarity, period, last duty).  Elements point into the channel list
//! by index, so a brightness set is one rescale pass followed by one
//! walk over the elements in construction order.

use serde::Serialize;

use crate::duty::duty_cycle;
use crate::element::PwmElement;
use crate::error::SetError;
use crate::ports::{ColorScaler, LedFlag, LedRegistration, PwmChannel, PwmError};

// ---------------------------------------------------------------------------
// Color channels
// ---------------------------------------------------------------------------

/// One color axis of a device.
///
/// `intensity` is the host-set per-color weight, `value` the scaler's
/// output actually converted to a duty.  Both are clamped to
/// `max_value`, which is non-zero by construction, so downstream duty
/// arithmetic never sees an out-of-scale value or a zero divisor.
#[derive(Debug, Clone, Serialize)]
pub struct ColorChannel {
    name: String,
    intensity: u32,
    value: u32,
    max_value: u32,
}

impl ColorChannel {
    /// Intensity starts at full scale, so a fresh device lights white
    /// (all colors equal) as soon as brightness rises.  Channels that
    /// enter a device always come from a validated description and
    /// carry a non-zero `max_value`.
    pub fn new(name: impl Into<String>, max_value: u32) -> Self {
        Self {
            name: name.into(),
            intensity: max_value,
            value: 0,
            max_value,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn max_value(&self) -> u32 {
        self.max_value
    }

    pub fn intensity(&self) -> u32 {
        self.intensity
    }

    pub fn set_intensity(&mut self, intensity: u32) {
        self.intensity = intensity.min(self.max_value);
    }

    pub fn value(&self) -> u32 {
        self.value
    }

    pub fn set_value(&mut self, value: u32) {
        self.value = value.min(self.max_value);
    }
}

// ---------------------------------------------------------------------------
// Device
// ---------------------------------------------------------------------------

/// One registered LED device and everything needed to drive it.
#[derive(Debug)]
pub struct PwmLed<C: PwmChannel> {
    name: String,
    default_trigger: Option<String>,
    max_brightness: u32,
    brightness: u32,
    multi_color: bool,
    channels: Vec<ColorChannel>,
    elements: Vec<PwmElement<C>>,
}

impl<C: PwmChannel> PwmLed<C> {
    /// Invariant carried for the device's lifetime: every element's
    /// `color_index` that is `Some` indexes into `channels`.
    pub(crate) fn new(
        name: String,
        default_trigger: Option<String>,
        max_brightness: u32,
        multi_color: bool,
        channels: Vec<ColorChannel>,
        elements: Vec<PwmElement<C>>,
    ) -> Self {
        Self {
            name,
            default_trigger,
            max_brightness,
            brightness: 0,
            multi_color,
            channels,
            elements,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn max_brightness(&self) -> u32 {
        self.max_brightness
    }

    /// Last brightness that was applied end to end.
    pub fn brightness(&self) -> u32 {
        self.brightness
    }

    pub fn multi_color(&self) -> bool {
        self.multi_color
    }

    pub fn channels(&self) -> &[ColorChannel] {
        &self.channels
    }

    pub fn elements(&self) -> &[PwmElement<C>] {
        &self.elements
    }

    /// Registration record handed to the host when the device surfaces.
    pub(crate) fn registration(&self) -> LedRegistration<'_> {
        let mut flags = LedFlag::SuspendResume.mask();
        if self.multi_color {
            flags |= LedFlag::MultiColor.mask();
        }
        LedRegistration {
            name: &self.name,
            default_trigger: self.default_trigger.as_deref(),
            max_brightness: self.max_brightness,
            color_channels: &self.channels,
            flags,
        }
    }

    /// Apply one overall brightness across every element.
    ///
    /// The scaler runs exactly once over all color channels, then the
    /// elements are walked in construction order; elements without a
    /// color slot are skipped.  On the first channel fault the walk
    /// stops and the error surfaces unmasked; the stored brightness is
    /// updated only after every element applied cleanly.
    pub fn set_brightness(
        &mut self,
        brightness: u32,
        scaler: &impl ColorScaler,
    ) -> Result<(), PwmError> {
        let brightness = brightness.min(self.max_brightness);
        scaler.rescale(&mut self.channels, brightness, self.max_brightness);

        for element in self.elements.iter_mut() {
            let Some(index) = element.color_index() else {
                continue;
            };
            let channel = &self.channels[index];
            let duty = duty_cycle(
                element.period_ns(),
                channel.value(),
                channel.max_value(),
                element.active_low(),
            );
            element.apply(duty)?;
        }

        self.brightness = brightness;
        Ok(())
    }

    /// Re-weight one color axis and re-drive at the current brightness.
    pub fn set_intensity(
        &mut self,
        channel: usize,
        intensity: u32,
        scaler: &impl ColorScaler,
    ) -> Result<(), SetError> {
        let Some(slot) = self.channels.get_mut(channel) else {
            return Err(SetError::UnknownChannel);
        };
        slot.set_intensity(intensity);
        self.set_brightness(self.brightness, scaler)?;
        Ok(())
    }

    /// Point-in-time diagnostic view of the device.
    pub fn snapshot(&self) -> LedSnapshot {
        LedSnapshot {
            name: self.name.clone(),
            brightness: self.brightness,
            max_brightness: self.max_brightness,
            multi_color: self.multi_color,
            channels: self
                .channels
                .iter()
                .map(|c| ChannelSnapshot {
                    color: c.name.clone(),
                    intensity: c.intensity,
                    value: c.value,
                })
                .collect(),
            elements: self
                .elements
                .iter()
                .map(|e| ElementSnapshot {
                    color_index: e.color_index(),
                    active_low: e.active_low(),
                    period_ns: e.period_ns(),
                    duty_ns: e.duty_ns(),
                })
                .collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Diagnostic snapshots
// ---------------------------------------------------------------------------

/// Serializable view of one device for telemetry and debugging.
#[derive(Debug, Clone, Serialize)]
pub struct LedSnapshot {
    pub name: String,
    pub brightness: u32,
    pub max_brightness: u32,
    pub multi_color: bool,
    pub channels: Vec<ChannelSnapshot>,
    pub elements: Vec<ElementSnapshot>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChannelSnapshot {
    pub color: String,
    pub intensity: u32,
    pub value: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct ElementSnapshot {
    pub color_index: Option<usize>,
    pub active_low: bool,
    pub period_ns: u64,
    pub duty_ns: u64,
}
