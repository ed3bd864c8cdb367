//! Probe lifecycle tests: construction, deferred unwind, failure
//! cleanup, teardown ordering.  All run against the scripted mocks in
//! `mock_pwm` with no real hardware.

use pwm_leds::bank::LedBank;
use pwm_leds::config::{BankConfig, ColorElementConfig, LedConfig};
use pwm_leds::error::{ConfigFault, ProbeError};
use pwm_leds::ports::{LedFlag, RegisterError};
use pwm_leds::scale::LinearScaler;

use crate::mock_pwm::{ChannelCall, FailOn, MockHost, MockProvider};

// ── Config builders ───────────────────────────────────────────

fn mono(name: &str) -> LedConfig {
    LedConfig {
        name: name.into(),
        default_trigger: None,
        max_brightness: 255,
        active_low: false,
        period_ns: 0,
        elements: Vec::new(),
    }
}

fn rgb(name: &str) -> LedConfig {
    LedConfig {
        name: name.into(),
        default_trigger: None,
        max_brightness: 255,
        active_low: false,
        period_ns: 0,
        elements: ["red", "green", "blue"]
            .iter()
            .map(|color| ColorElementConfig {
                color: (*color).into(),
                active_low: false,
            })
            .collect(),
    }
}

fn bank_of(leds: Vec<LedConfig>) -> BankConfig {
    BankConfig { leds }
}

// ── Construction ──────────────────────────────────────────────

#[test]
fn probe_registers_every_described_device() {
    let mut provider = MockProvider::new()
        .ready("status", 1_000_000)
        .ready("rgb/element-0", 1_000_000)
        .ready("rgb/element-1", 1_000_000)
        .ready("rgb/element-2", 1_000_000);
    let mut host = MockHost::new();

    let config = bank_of(vec![mono("status"), rgb("rgb")]);
    let bank = LedBank::probe(&config, &mut provider, &mut host, &LinearScaler).unwrap();

    assert_eq!(bank.len(), 2);
    assert_eq!(host.registered.len(), 2);
    assert_eq!(host.registered[0].name, "status");
    assert_eq!(host.registered[0].colors, vec!["single"]);
    assert_eq!(host.registered[1].name, "rgb");
    assert_eq!(host.registered[1].colors, vec!["red", "green", "blue"]);
    assert_eq!(host.active(), 2);
}

#[test]
fn probe_parks_every_output_dark() {
    let mut provider = MockProvider::new().ready("status", 1000);
    let mut host = MockHost::new();

    let config = bank_of(vec![mono("status")]);
    let _bank = LedBank::probe(&config, &mut provider, &mut host, &LinearScaler).unwrap();

    let state = provider.channel("status");
    let state = state.lock().unwrap();
    assert_eq!(
        state.calls,
        vec![
            ChannelCall::Configure {
                duty_ns: 0,
                period_ns: 1000
            },
            ChannelCall::Disable
        ]
    );
    assert!(!state.enabled);
}

#[test]
fn multi_element_lookups_use_generated_labels() {
    let mut provider = MockProvider::new()
        .ready("rgb/element-0", 1000)
        .ready("rgb/element-1", 1000)
        .ready("rgb/element-2", 1000);
    let mut host = MockHost::new();

    let config = bank_of(vec![rgb("rgb")]);
    LedBank::probe(&config, &mut provider, &mut host, &LinearScaler).unwrap();

    assert_eq!(
        provider.requests,
        vec!["rgb/element-0", "rgb/element-1", "rgb/element-2"]
    );
}

#[test]
fn registration_flags_mark_suspend_resume_and_multi_color() {
    let mut provider = MockProvider::new()
        .ready("status", 1000)
        .ready("rgb/element-0", 1000)
        .ready("rgb/element-1", 1000)
        .ready("rgb/element-2", 1000);
    let mut host = MockHost::new();

    let config = bank_of(vec![mono("status"), rgb("rgb")]);
    LedBank::probe(&config, &mut provider, &mut host, &LinearScaler).unwrap();

    assert_eq!(host.registered[0].flags, LedFlag::SuspendResume.mask());
    assert_eq!(
        host.registered[1].flags,
        LedFlag::SuspendResume.mask() | LedFlag::MultiColor.mask()
    );
}

#[test]
fn default_trigger_reaches_the_host() {
    let mut provider = MockProvider::new().ready("status", 1000);
    let mut host = MockHost::new();

    let mut led = mono("status");
    led.default_trigger = Some("heartbeat".into());
    let config = bank_of(vec![led]);
    LedBank::probe(&config, &mut provider, &mut host, &LinearScaler).unwrap();

    assert_eq!(host.registered[0].default_trigger.as_deref(), Some("heartbeat"));
    assert_eq!(host.registered[0].max_brightness, 255);
}

#[test]
fn bank_formats_for_debug_output() {
    let mut provider = MockProvider::new().ready("status", 1000);
    let mut host = MockHost::new();

    let config = bank_of(vec![mono("status")]);
    let bank = LedBank::probe(&config, &mut provider, &mut host, &LinearScaler).unwrap();

    // Test diagnostics render the whole tree, device down to channel.
    let rendered = format!("{bank:?}");
    assert!(rendered.contains("LedBank"));
    assert!(rendered.contains("status"));
}

// ── Period resolution ─────────────────────────────────────────

#[test]
fn single_prefers_hardware_period_over_fallback() {
    let mut provider = MockProvider::new().ready("status", 1000);
    let mut host = MockHost::new();

    let mut led = mono("status");
    led.period_ns = 5000;
    let config = bank_of(vec![led]);
    LedBank::probe(&config, &mut provider, &mut host, &LinearScaler).unwrap();

    let state = provider.channel("status");
    assert_eq!(state.lock().unwrap().period_ns, 1000);
}

#[test]
fn single_falls_back_to_config_period() {
    let mut provider = MockProvider::new().ready_without_period("status");
    let mut host = MockHost::new();

    let mut led = mono("status");
    led.period_ns = 5000;
    let config = bank_of(vec![led]);
    LedBank::probe(&config, &mut provider, &mut host, &LinearScaler).unwrap();

    let state = provider.channel("status");
    assert_eq!(state.lock().unwrap().period_ns, 5000);
}

#[test]
fn single_without_any_period_is_a_config_fault() {
    let mut provider = MockProvider::new().ready_without_period("status");
    let mut host = MockHost::new();

    let config = bank_of(vec![mono("status")]);
    let err = LedBank::probe(&config, &mut provider, &mut host, &LinearScaler).unwrap_err();

    assert_eq!(
        err,
        ProbeError::Config(ConfigFault::ZeroPeriod {
            led: "status".into()
        })
    );
    assert!(host.registered.is_empty());
    assert!(provider.was_released("status"));
}

#[test]
fn element_without_hardware_period_is_a_config_fault() {
    // Elements have no config fallback; the channel must carry a period.
    let mut provider = MockProvider::new()
        .ready("rgb/element-0", 1000)
        .ready_without_period("rgb/element-1");
    let mut host = MockHost::new();

    let config = bank_of(vec![rgb("rgb")]);
    let err = LedBank::probe(&config, &mut provider, &mut host, &LinearScaler).unwrap_err();

    assert_eq!(
        err,
        ProbeError::Config(ConfigFault::MissingElementPeriod {
            led: "rgb".into(),
            element: 1
        })
    );
    assert!(provider.was_released("rgb/element-0"));
    assert!(provider.was_released("rgb/element-1"));
    assert!(host.registered.is_empty());
}

// ── Deferred availability ─────────────────────────────────────

#[test]
fn deferred_channel_unwinds_and_reports_retry() {
    let mut provider = MockProvider::new()
        .ready("left", 1000)
        .deferred("center")
        .ready("right", 1000);
    let mut host = MockHost::new();

    let config = bank_of(vec![mono("left"), mono("center"), mono("right")]);
    let err = LedBank::probe(&config, &mut provider, &mut host, &LinearScaler).unwrap_err();

    assert!(err.is_deferred());
    assert_eq!(
        err,
        ProbeError::ChannelDeferred {
            led: "center".into()
        }
    );
    // The first device was fully constructed and must be fully undone.
    let left_token = host.token_for("left");
    assert_eq!(host.unregistered, vec![left_token]);
    assert_eq!(host.active(), 0);
    assert!(provider.was_released("left"));
    // Probe stopped at the deferred device; the third was never tried.
    assert_eq!(provider.requests, vec!["left", "center"]);
}

#[test]
fn deferred_element_inside_multi_unwinds_the_same_way() {
    let mut provider = MockProvider::new()
        .ready("rgb/element-0", 1000)
        .deferred("rgb/element-1");
    let mut host = MockHost::new();

    let config = bank_of(vec![rgb("rgb")]);
    let err = LedBank::probe(&config, &mut provider, &mut host, &LinearScaler).unwrap_err();

    assert!(err.is_deferred());
    assert!(provider.was_released("rgb/element-0"));
    assert!(host.registered.is_empty());
}

// ── Hard failures ─────────────────────────────────────────────

#[test]
fn acquisition_failure_carries_device_and_element() {
    let mut provider = MockProvider::new()
        .ready("rgb/element-0", 1000)
        .failing("rgb/element-1", "pin already claimed");
    let mut host = MockHost::new();

    let config = bank_of(vec![rgb("rgb")]);
    let err = LedBank::probe(&config, &mut provider, &mut host, &LinearScaler).unwrap_err();

    assert!(!err.is_deferred());
    assert_eq!(
        err,
        ProbeError::ChannelAcquisition {
            led: "rgb".into(),
            element: Some(1),
            reason: "pin already claimed"
        }
    );
    assert!(provider.was_released("rgb/element-0"));
}

#[test]
fn registration_rejection_releases_everything() {
    let mut provider = MockProvider::new()
        .ready("status", 1000)
        .ready("rgb/element-0", 1000)
        .ready("rgb/element-1", 1000)
        .ready("rgb/element-2", 1000);
    let mut host = MockHost::rejecting("rgb", RegisterError::Rejected("name table full"));

    let config = bank_of(vec![mono("status"), rgb("rgb")]);
    let err = LedBank::probe(&config, &mut provider, &mut host, &LinearScaler).unwrap_err();

    assert_eq!(
        err,
        ProbeError::Registration {
            led: "rgb".into(),
            reason: RegisterError::Rejected("name table full")
        }
    );
    // The already-registered device is withdrawn and every channel of
    // both devices is back with the provider.
    assert_eq!(host.active(), 0);
    for key in [
        "status",
        "rgb/element-0",
        "rgb/element-1",
        "rgb/element-2",
    ] {
        assert!(provider.was_released(key), "{key} still held");
    }
}

#[test]
fn initial_drive_fault_keeps_the_device_registered() {
    // Parking the output dark is best-effort: the disable fails here,
    // but the device is already surfaced and stays usable.
    let mut provider =
        MockProvider::new().ready_with_fault("status", 1000, FailOn::Disable);
    let mut host = MockHost::new();

    let config = bank_of(vec![mono("status")]);
    let bank = LedBank::probe(&config, &mut provider, &mut host, &LinearScaler).unwrap();

    assert_eq!(bank.len(), 1);
    assert_eq!(host.active(), 1);
}

// ── Static validation ─────────────────────────────────────────

#[test]
fn empty_description_is_rejected() {
    let mut provider = MockProvider::new();
    let mut host = MockHost::new();

    let err = LedBank::probe(
        &bank_of(Vec::new()),
        &mut provider,
        &mut host,
        &LinearScaler,
    )
    .unwrap_err();

    assert_eq!(err, ProbeError::Config(ConfigFault::NoLeds));
    assert!(provider.requests.is_empty());
}

#[test]
fn zero_scale_is_rejected_before_any_acquisition() {
    let mut provider = MockProvider::new().ready("status", 1000);
    let mut host = MockHost::new();

    let mut led = mono("status");
    led.max_brightness = 0;
    let err = LedBank::probe(
        &bank_of(vec![led]),
        &mut provider,
        &mut host,
        &LinearScaler,
    )
    .unwrap_err();

    assert_eq!(
        err,
        ProbeError::Config(ConfigFault::ZeroMaxBrightness {
            led: "status".into()
        })
    );
    assert!(provider.requests.is_empty());
}

// ── Teardown ──────────────────────────────────────────────────

#[test]
fn teardown_withdraws_devices_newest_first() {
    let mut provider = MockProvider::new()
        .ready("first", 1000)
        .ready("second", 1000);
    let mut host = MockHost::new();

    let config = bank_of(vec![mono("first"), mono("second")]);
    let bank = LedBank::probe(&config, &mut provider, &mut host, &LinearScaler).unwrap();

    let first = host.token_for("first");
    let second = host.token_for("second");
    bank.teardown(&mut host);

    assert_eq!(host.unregistered, vec![second, first]);
    assert!(provider.was_released("first"));
    assert!(provider.was_released("second"));
}
