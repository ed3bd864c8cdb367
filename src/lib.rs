//! Brightness core for PWM-driven LEDs.
//!
//! Maps a host-facing brightness scale onto PWM duty cycles, covering
//! flat single-color LEDs and multi-color devices whose elements each
//! own one PWM channel.  The host platform plugs in behind small port
//! traits, so the core carries no platform machinery and runs the same
//! under a real driver model or the test mocks.
//!
//! ```text
//!   host platform                    core
//!   ─────────────                    ────
//!   PwmProvider  ──acquire──▶  LedBank::probe
//!   LedHost      ◀─register──      │
//!                                  ▼
//!   LedHost      ──token set─▶  PwmLed ─▶ PwmElement ─▶ PwmChannel
//! ```
//!
//! Probe is all-or-nothing; a deferred channel unwinds and reports
//! [`error::ProbeError::ChannelDeferred`] so the host can retry once
//! the channel exists.

#![deny(unused_must_use)]

pub mod bank;
pub mod config;
pub mod device;
pub mod duty;
pub mod element;
pub mod error;
pub mod hal;
pub mod ports;
pub mod scale;
