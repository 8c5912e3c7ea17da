//! Measurement settings
//!
//! # Design
//! All settings are static: they are provided once at startup (defaults, or a
//! JSON document from the host) and validated by [Settings::validate()] when
//! the [crate::measurement::Meter] is constructed. They are read-only
//! afterwards.
//!
//! The tree is exposed through `miniconf` so that a host interface can
//! address individual settings by path, e.g. `/excitation/reference`.
use dsp::{Bandpass, Biquad, FilterReset};
use fugit::HertzU32;
use miniconf::Tree;
use serde::{Deserialize, Serialize};

use crate::{
    convert::Converter,
    hardware::{design_parameters::*, ClockDivider},
    impedance::Excitation,
    ConfigError,
};

#[derive(Clone, Debug, PartialEq, Tree, Serialize, Deserialize)]
#[tree(meta(doc, typename))]
#[serde(default)]
pub struct Acquisition {
    /// Analog input channel.
    pub channel: u8,
    /// Samples per batch.
    pub batch_length: u32,
    /// Sample rate in Hertz.
    pub rate: u32,
    /// Batches averaged per measurement cycle.
    pub batches: u32,
    /// Bound on the wait for one batch in microseconds.
    pub timeout: u32,
}

impl Default for Acquisition {
    fn default() -> Self {
        Self {
            channel: 2,
            batch_length: BATCH_LEN as _,
            rate: SAMPLE_RATE.to_Hz(),
            batches: BATCHES,
            timeout: ACQUISITION_TIMEOUT.to_micros() as _,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Tree, Serialize, Deserialize)]
#[tree(meta(doc, typename))]
#[serde(default)]
pub struct Filter {
    /// Normalized `[b0, b1, b2, a1, a2]` of the two cascaded sections.
    /// Designed offline for the configured sample rate.
    pub sections: [[f64; 5]; 2],
    /// Delay line handling between the batches of a cycle.
    #[tree(with=miniconf::leaf)]
    pub reset: FilterReset,
    /// Leading outputs of every batch excluded from the extremum search.
    pub settle: u32,
}

impl Default for Filter {
    fn default() -> Self {
        Self {
            sections: BANDPASS,
            reset: FilterReset::PerBatch,
            settle: dsp::bandpass::SETTLING_SAMPLES as _,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Tree, Serialize, Deserialize)]
#[tree(meta(doc, typename))]
#[serde(default)]
pub struct Settings {
    pub acquisition: Acquisition,
    pub converter: Converter,
    pub excitation: Excitation,
    pub filter: Filter,
}

impl Settings {
    /// Load settings from a JSON document. Missing entries take their
    /// default values.
    pub fn from_json(json: &str) -> Result<Self, serde_json_core::de::Error> {
        serde_json_core::from_str(json).map(|(settings, _)| settings)
    }

    pub fn rate(&self) -> HertzU32 {
        HertzU32::from_raw(self.acquisition.rate)
    }

    /// Check the settings for consistency.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let acq = &self.acquisition;
        if acq.channel > ADC_MAX_CHANNEL {
            return Err(ConfigError::UnsupportedChannel(acq.channel));
        }
        let length = acq.batch_length as usize;
        if length == 0 {
            return Err(ConfigError::EmptyBatch);
        }
        if length > MAX_BATCH_LEN {
            return Err(ConfigError::BatchTooLong {
                length,
                capacity: MAX_BATCH_LEN,
            });
        }
        let settle = self.filter.settle as usize;
        if settle >= length {
            return Err(ConfigError::Settling { length, settle });
        }
        if acq.batches == 0 {
            return Err(ConfigError::NoBatches);
        }
        if acq.timeout == 0 {
            return Err(ConfigError::Invalid("timeout"));
        }
        ClockDivider::from_rate(self.rate())?;

        let conv = &self.converter;
        if !(conv.v_ref > 0. && conv.gain > 0.)
            || !(1..=16).contains(&conv.resolution_bits)
        {
            return Err(ConfigError::Invalid("converter"));
        }

        let exc = &self.excitation;
        if !(exc.amplitude > 0. && exc.reference > 0. && exc.frequency > 0.) {
            return Err(ConfigError::Invalid("excitation"));
        }
        if 2. * exc.frequency >= acq.rate as f32 {
            return Err(ConfigError::AboveNyquist {
                frequency: exc.frequency,
                rate: acq.rate,
            });
        }
        let periods =
            (length - settle) as f32 * exc.frequency / acq.rate as f32;
        if periods < 1. {
            log::warn!(
                "Batches cover only {periods} excitation periods after settling"
            );
        }

        self.bandpass().map(|_| ())
    }

    /// Construct the bandpass from the configured coefficients.
    pub fn bandpass(&self) -> Result<Bandpass, ConfigError> {
        let [hp, lp] = self.filter.sections;
        Ok(Bandpass::new(
            [Biquad::from_normalized(hp)?, Biquad::from_normalized(lp)?],
            self.filter.reset,
        ))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::impedance::Sense;

    #[test]
    fn defaults_valid() {
        let s = Settings::default();
        assert_eq!(s.validate(), Ok(()));
        assert_eq!(s.acquisition.rate, 100_000);
        assert_eq!(s.acquisition.batch_length, 500);
        assert_eq!(s.acquisition.timeout, 50_000);
    }

    #[test]
    fn json() {
        let s = Settings::from_json(
            r#"{"acquisition": {"batches": 4, "rate": 50000},
                "excitation": {"reference": 2200.0, "sense": "Reference"},
                "filter": {"reset": "Continuous"}}"#,
        )
        .unwrap();
        assert_eq!(s.acquisition.batches, 4);
        assert_eq!(s.acquisition.rate, 50_000);
        assert_eq!(s.acquisition.batch_length, 500);
        assert_eq!(s.excitation.reference, 2200.);
        assert_eq!(s.excitation.sense, Sense::Reference);
        assert_eq!(s.filter.reset, FilterReset::Continuous);
        assert_eq!(s.converter, Converter::default());
    }

    #[test]
    fn tree_paths() {
        use miniconf::json_core;

        let mut s = Settings::default();
        json_core::set(&mut s, "/excitation/reference", b"2200.0").unwrap();
        json_core::set(&mut s, "/filter/reset", b"\"Continuous\"").unwrap();
        json_core::set(&mut s, "/acquisition/batches", b"4").unwrap();
        assert!(json_core::set(&mut s, "/excitation/phase", b"1.0").is_err());
        assert_eq!(s.excitation.reference, 2200.);
        assert_eq!(s.filter.reset, FilterReset::Continuous);
        assert_eq!(s.acquisition.batches, 4);
        assert_eq!(s.validate(), Ok(()));
    }

    #[test]
    fn invalid() {
        let check = |f: fn(&mut Settings), e: ConfigError| {
            let mut s = Settings::default();
            f(&mut s);
            assert_eq!(s.validate(), Err(e));
        };
        check(|s| s.acquisition.channel = 4, ConfigError::UnsupportedChannel(4));
        check(|s| s.acquisition.batch_length = 0, ConfigError::EmptyBatch);
        check(
            |s| s.acquisition.batch_length = 2000,
            ConfigError::BatchTooLong {
                length: 2000,
                capacity: MAX_BATCH_LEN,
            },
        );
        check(
            |s| s.acquisition.batch_length = 16,
            ConfigError::Settling {
                length: 16,
                settle: 16,
            },
        );
        check(|s| s.acquisition.batches = 0, ConfigError::NoBatches);
        check(|s| s.acquisition.rate = 600_000, ConfigError::UnsupportedRate(600_000));
        check(|s| s.converter.gain = 0., ConfigError::Invalid("converter"));
        check(|s| s.converter.resolution_bits = 20, ConfigError::Invalid("converter"));
        check(|s| s.excitation.reference = -1., ConfigError::Invalid("excitation"));
        check(
            |s| s.excitation.frequency = 60e3,
            ConfigError::AboveNyquist {
                frequency: 60e3,
                rate: 100_000,
            },
        );
        check(
            |s| s.filter.sections[0][3] = -2.5,
            ConfigError::Coefficient(dsp::iir_int::CoefficientRange {
                index: 3,
                value: -2.5,
            }),
        );
    }
}
