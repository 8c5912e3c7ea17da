//! Hardware capabilities of the acquisition front-end
//!
//! The measurement pipeline only talks to the converter through [AdcDma] and
//! to time through [Monotonic]. Each target implements these once:
//! [rp2040] drives the RP2040 ADC and DMA registers directly, [sim] feeds a
//! waveform from memory for host-side development and tests.
use fugit::HertzU32;
use serde::{Deserialize, Serialize};

use crate::ConfigError;

mod adc;
pub mod design_parameters;
#[cfg(feature = "rp2040")]
pub mod rp2040;
pub mod sim;

pub use adc::*;

use design_parameters::{ADC_CLOCK, ADC_CONVERSION_CYCLES};

/// Instants of the 1 MHz monotonic clock.
pub type Instant = fugit::TimerInstantU64<1_000_000>;

/// Durations of the 1 MHz monotonic clock.
pub type Duration = fugit::MicrosDurationU64;

/// Analog input channel of the converter.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdcChannel(pub u8);

/// Sample-rate divider of the ADC clock.
///
/// Continuous conversions start every `1 + int + frac / 256` ADC clock cycles.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ClockDivider {
    int: u16,
    frac: u8,
}

impl ClockDivider {
    /// Find the longest period not longer than that of `rate`. The generated
    /// rate is the closest one that is not slower than `rate`.
    ///
    /// Rates above `ADC_CLOCK / ADC_CONVERSION_CYCLES` or below
    /// `ADC_CLOCK / 65536` can not be generated and are rejected.
    pub fn from_rate(rate: HertzU32) -> Result<Self, ConfigError> {
        let hz = rate.to_Hz();
        let unsupported = ConfigError::UnsupportedRate(hz);
        if hz == 0 {
            return Err(unsupported);
        }
        // Period in units of 1/256 ADC clock cycles
        let period = (ADC_CLOCK.to_Hz() as u64) * 256 / hz as u64;
        if period < (ADC_CONVERSION_CYCLES as u64) << 8 {
            return Err(unsupported);
        }
        let div = period - 256;
        if div > 0xff_ffff {
            return Err(unsupported);
        }
        Ok(Self {
            int: (div >> 8) as u16,
            frac: div as u8,
        })
    }

    pub fn int(&self) -> u16 {
        self.int
    }

    pub fn frac(&self) -> u8 {
        self.frac
    }

    /// The sample rate actually generated by this divider in Hz.
    pub fn rate(&self) -> f32 {
        let period = 256 + ((self.int as u32) << 8) + self.frac as u32;
        ADC_CLOCK.to_Hz() as f32 * 256. / period as f32
    }
}

/// Converter and bulk-transfer engine of one analog front-end.
///
/// All methods are non-blocking. Sequencing, timeouts and exclusivity are
/// handled by [BatchAdc].
pub trait AdcDma {
    /// Select the input and program the sample-rate divider.
    /// The converter stays idle.
    fn configure_channel(&mut self, channel: AdcChannel, divider: ClockDivider);

    /// Discard queued conversion results. Returns the number discarded.
    fn drain(&mut self) -> usize;

    /// Arm the engine to move the next `count` conversion results to `dest`.
    ///
    /// # Safety
    /// `dest` must be valid for `count` writes of `u16` and must not be
    /// accessed otherwise until [AdcDma::stop()] returns.
    unsafe fn arm_transfer(&mut self, dest: *mut u16, count: u32);

    /// Start continuous conversion.
    fn start(&mut self);

    /// Whether the armed transfer is still in progress.
    fn is_busy(&mut self) -> bool;

    /// Stop conversion and disable the engine. Idempotent.
    fn stop(&mut self);

    /// Trigger a single conversion of `channel`, bypassing the engine.
    fn convert_one(&mut self, channel: AdcChannel);

    /// The result of the last single conversion, once ready.
    fn result(&mut self) -> Option<u16>;
}

/// A monotonic microsecond clock.
pub trait Monotonic {
    fn now(&mut self) -> Instant;
}

#[cfg(test)]
mod test {
    use super::*;
    use fugit::RateExtU32;

    #[test]
    fn divider() {
        let d = ClockDivider::from_rate(100.kHz()).unwrap();
        assert_eq!((d.int(), d.frac()), (479, 0));
        assert_eq!(d.rate(), 100_000.);

        let d = ClockDivider::from_rate(500.kHz()).unwrap();
        assert_eq!((d.int(), d.frac()), (95, 0));

        // 48 MHz / 7 kHz = 6857.14 cycles
        let d = ClockDivider::from_rate(7.kHz()).unwrap();
        assert_eq!((d.int(), d.frac()), (6856, 36));
        assert!((d.rate() - 7000.).abs() < 0.1);
    }

    #[test]
    fn divider_not_slower() {
        let clock = ADC_CLOCK.to_Hz() as u64 * 256;
        for hz in [733, 1000, 7000, 44_100, 99_999, 100_000, 333_333, 500_000] {
            let d = ClockDivider::from_rate(HertzU32::from_raw(hz)).unwrap();
            let period = 256 + ((d.int() as u64) << 8) + d.frac() as u64;
            assert!(period * hz as u64 <= clock);
            assert!((period + 1) * hz as u64 > clock);
        }
    }

    #[test]
    fn divider_range() {
        for hz in [0, 500_001, 1_000_000, 732] {
            assert_eq!(
                ClockDivider::from_rate(HertzU32::from_raw(hz)),
                Err(ConfigError::UnsupportedRate(hz))
            );
        }
        assert!(ClockDivider::from_rate(733.Hz()).is_ok());
    }
}
