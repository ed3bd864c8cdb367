//! Brightness-to-value expansion policies.
//!
//! A device carries one overall brightness; a scaler turns it into the
//! per-color values the duty arithmetic consumes.  Hosts can supply
//! their own policy (gamma tables, white-point correction) through the
//! [`ColorScaler`] port; [`LinearScaler`] is the stock one and what flat
//! single-color devices effectively get.

use crate::device::ColorChannel;
use crate::ports::ColorScaler;

/// Stock policy: every channel follows the overall brightness linearly
/// against its stored intensity.
///
/// `value = floor(intensity * brightness / max_brightness)`, so full
/// brightness drives each channel at exactly its intensity and zero
/// brightness drives every channel dark.
#[derive(Debug, Clone, Copy, Default)]
pub struct LinearScaler;

impl ColorScaler for LinearScaler {
    fn rescale(&self, channels: &mut [ColorChannel], brightness: u32, max_brightness: u32) {
        let brightness = u64::from(brightness.min(max_brightness));
        for channel in channels.iter_mut() {
            let value = if max_brightness == 0 {
                0
            } else {
                // intensity <= u32::MAX and brightness <= max_brightness,
                // so the product fits u64 and the quotient fits u32.
                (u64::from(channel.intensity()) * brightness / u64::from(max_brightness)) as u32
            };
            channel.set_value(value);
        }
    }
}
