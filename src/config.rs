//! Bank description
//!
//! The static description of every LED device a bank constructs at probe
//! time.  Hosts hand one in from whatever carrier they use (JSON
//! documents, postcard blobs in non-volatile storage, generated tables);
//! after probing, nothing in a description changes a live device.

use serde::{Deserialize, Serialize};

use crate::error::ConfigFault;

/// One color element of a multi-color LED.
///
/// Element channels are looked up from the provider under the generated
/// `element-<index>` label, where `<index>` is the element's position in
/// [`LedConfig::elements`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColorElementConfig {
    /// Color name surfaced to the host ("red", "green", ...).
    pub color: String,
    /// Invert the duty against the period on this element's output.
    #[serde(default)]
    pub active_low: bool,
}

/// One LED device.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedConfig {
    /// Device name; also the provider lookup key for flat LEDs.
    pub name: String,
    /// Trigger the host should attach after registration.
    #[serde(default)]
    pub default_trigger: Option<String>,
    /// Brightness scale; accepted brightness values are `0..=max_brightness`.
    pub max_brightness: u32,
    /// Flat LEDs only: invert duty against period.
    #[serde(default)]
    pub active_low: bool,
    /// Flat LEDs only: fallback period in nanoseconds, consulted when the
    /// acquired channel reports no period of its own.  Zero means no
    /// fallback.
    #[serde(default)]
    pub period_ns: u64,
    /// Color elements in device order; empty describes a flat
    /// single-color LED.
    #[serde(default)]
    pub elements: Vec<ColorElementConfig>,
}

impl LedConfig {
    /// Whether this entry describes a multi-color device.
    pub fn is_multi_color(&self) -> bool {
        !self.elements.is_empty()
    }
}

/// Whole-bank description.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BankConfig {
    pub leds: Vec<LedConfig>,
}

impl BankConfig {
    /// Parse a JSON document.
    pub fn from_json(doc: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(doc)
    }

    /// Parse a compact postcard blob, the form a description takes when
    /// its carrier is non-volatile storage rather than a document.
    pub fn from_postcard(bytes: &[u8]) -> Result<Self, postcard::Error> {
        postcard::from_bytes(bytes)
    }

    /// Structural checks that need no hardware: at least one device,
    /// names present and unique, scales non-zero.  Period faults depend
    /// on the acquired channels and are reported during probe instead.
    pub fn validate(&self) -> Result<(), ConfigFault> {
        if self.leds.is_empty() {
            return Err(ConfigFault::NoLeds);
        }
        for (index, led) in self.leds.iter().enumerate() {
            if led.name.is_empty() {
                return Err(ConfigFault::UnnamedLed { index });
            }
            if led.max_brightness == 0 {
                return Err(ConfigFault::ZeroMaxBrightness {
                    led: led.name.clone(),
                });
            }
            if self.leds[..index].iter().any(|other| other.name == led.name) {
                return Err(ConfigFault::DuplicateLedName {
                    led: led.name.clone(),
                });
            }
        }
        Ok(())
    }
}
