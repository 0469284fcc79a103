use std::time::{Duration, Instant};

use hal::adc::{AdcDriver, AdcResolution};
use hal::HalError;

use crate::board::ChannelConfig;
use crate::sim::{SimAdc, Waveform};

fn powered(channel: ChannelConfig) -> SimAdc {
    let mut adc = SimAdc::new(&channel);
    adc.enable().unwrap();
    adc
}

#[test]
fn unpowered_read_fails() {
    let mut adc = SimAdc::new(&ChannelConfig::new("A0"));
    assert!(!adc.is_powered());
    assert_eq!(adc.read_blocking(), Err(HalError::HardwareError));
}

#[test]
fn enable_and_disable_track_power() {
    let mut adc = powered(ChannelConfig::new("A0"));
    assert!(adc.is_powered());
    assert_eq!(adc.name(), "A0");

    adc.disable().unwrap();
    assert!(!adc.is_powered());
    assert_eq!(adc.read_blocking(), Err(HalError::HardwareError));
}

#[test]
fn constant_input_scales_to_code() {
    let mut adc = powered(
        ChannelConfig::new("A0")
            .ref_voltage(2.0)
            .waveform(Waveform::Constant { volts: 1.0 }),
    );
    assert_eq!(adc.read_blocking(), Ok(2048));
    assert_eq!(adc.read_blocking(), Ok(2048));
}

#[test]
fn input_is_clamped_to_reference() {
    let mut high = powered(
        ChannelConfig::new("A0")
            .ref_voltage(3.3)
            .waveform(Waveform::Constant { volts: 5.0 }),
    );
    assert_eq!(high.read_blocking(), Ok(4095));

    let mut low = powered(
        ChannelConfig::new("A1")
            .ref_voltage(3.3)
            .waveform(Waveform::Constant { volts: -1.0 }),
    );
    assert_eq!(low.read_blocking(), Ok(0));
}

#[test]
fn sawtooth_steps_per_conversion() {
    let mut adc = powered(
        ChannelConfig::new("A0")
            .resolution(AdcResolution::Bits8)
            .ref_voltage(4.0)
            .waveform(Waveform::Sawtooth {
                min: 0.0,
                max: 4.0,
                period: 4,
            }),
    );

    let samples: Vec<u16> = (0..5).map(|_| adc.read_blocking().unwrap()).collect();
    assert_eq!(samples, vec![0, 64, 128, 191, 0]);
}

#[test]
fn sine_stays_within_range() {
    let mut adc = powered(ChannelConfig::new("A0").waveform(Waveform::Sine {
        offset: 1.65,
        amplitude: 3.0,
        period: 16,
    }));
    let max = adc.info().max_raw_value;

    let samples: Vec<u16> = (0..32).map(|_| adc.read_blocking().unwrap()).collect();
    assert!(samples.iter().all(|&raw| raw <= max));
    assert!(samples.contains(&0));
    assert!(samples.contains(&max));
}

#[test]
fn waveform_is_deterministic() {
    let wave = Waveform::Sine {
        offset: 1.0,
        amplitude: 0.5,
        period: 10,
    };
    assert_eq!(wave.voltage_at(3), wave.voltage_at(13));
    assert_eq!(wave.voltage_at(0), 1.0);
}

#[test]
fn injected_faults_time_out() {
    let mut adc = powered(ChannelConfig::new("A0").fail_every(3));

    let results: Vec<_> = (0..6).map(|_| adc.read_blocking()).collect();
    assert!(results[0].is_ok());
    assert!(results[1].is_ok());
    assert_eq!(results[2], Err(HalError::Timeout));
    assert!(results[3].is_ok());
    assert!(results[4].is_ok());
    assert_eq!(results[5], Err(HalError::Timeout));
    assert_eq!(adc.conversions(), 6);
}

#[test]
fn polling_never_sleeps() {
    let mut adc = powered(ChannelConfig::new("A0").conversion_time(Duration::from_millis(200)));

    let started = Instant::now();
    for _ in 0..3 {
        assert!(matches!(adc.read_raw(), Err(hal::nb::Error::WouldBlock)));
    }
    assert!(started.elapsed() < Duration::from_millis(200));
    assert_eq!(adc.conversions(), 0);
}

#[test]
fn conversion_time_blocks_the_caller() {
    let mut adc = powered(ChannelConfig::new("A0").conversion_time(Duration::from_millis(5)));

    assert!(matches!(adc.read_raw(), Err(hal::nb::Error::WouldBlock)));

    let started = Instant::now();
    assert!(adc.read_blocking().is_ok());
    assert!(started.elapsed() >= Duration::from_millis(1));
    assert_eq!(adc.conversions(), 1);

    let started = Instant::now();
    assert!(adc.read_blocking().is_ok());
    assert!(started.elapsed() >= Duration::from_millis(5));
}
