//! Impedance from the averaged peak-to-peak voltage
//!
//! The load under test forms a voltage divider with a known reference
//! resistor, driven by the excitation source:
//!
//! ```text
//!   source ──[ reference ]──┬──[ load ]── GND      Sense::Load
//!   source ──[ load ]──┬──[ reference ]── GND      Sense::Reference
//!                      └── ADC
//! ```
//!
//! With `V` the measured and `Vs` the drive peak-to-peak voltage:
//! * [Sense::Load]: `Z = R * V / (Vs - V)`
//! * [Sense::Reference]: `Z = R * (Vs - V) / V`
//!
//! Only the magnitude is computed. The phase would require the timing of the
//! excitation relative to the acquisition.
use dsp::AveragedExtrema;
use miniconf::Tree;
use serde::{Deserialize, Serialize};

use crate::{
    convert::Converter, hardware::design_parameters::EXCITATION_FREQUENCY,
    Error,
};

/// The element the converter measures across.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sense {
    #[default]
    Load,
    Reference,
}

/// Excitation parameters.
#[derive(Clone, Debug, PartialEq, Tree, Serialize, Deserialize)]
#[tree(meta(doc, typename))]
#[serde(default)]
pub struct Excitation {
    /// Drive peak-to-peak voltage across the divider.
    pub amplitude: f32,

    /// Drive frequency in Hertz.
    pub frequency: f32,

    /// Reference resistance in Ohms.
    pub reference: f32,

    /// Which divider element the converter measures across.
    #[tree(with=miniconf::leaf)]
    pub sense: Sense,
}

impl Default for Excitation {
    fn default() -> Self {
        Self {
            amplitude: 3.0,
            frequency: EXCITATION_FREQUENCY.to_Hz() as f32,
            reference: 1.0e3,
            sense: Sense::Load,
        }
    }
}

/// Result of one measurement cycle.
#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
pub struct Impedance {
    /// Impedance magnitude in Ohms.
    pub magnitude: f32,
    /// Averaged peak-to-peak voltage it was computed from.
    pub peak_to_peak: f32,
}

pub fn compute_impedance(
    extrema: &AveragedExtrema,
    excitation: &Excitation,
    converter: &Converter,
) -> Result<Impedance, Error> {
    let v = extrema.peak_to_peak();
    let vs = excitation.amplitude;
    if !(v > 0. && v <= converter.full_scale() && v < vs) {
        log::warn!("Peak-to-peak {v} V out of range (drive {vs} V)");
        return Err(Error::MeasurementOutOfRange { peak_to_peak: v });
    }

    let r = excitation.reference;
    let magnitude = match excitation.sense {
        Sense::Load => r * v / (vs - v),
        Sense::Reference => r * (vs - v) / v,
    };
    Ok(Impedance {
        magnitude,
        peak_to_peak: v,
    })
}

#[cfg(test)]
mod test {
    use super::*;

    fn extrema(ptp: f32) -> AveragedExtrema {
        AveragedExtrema {
            mean_max: ptp / 2.,
            mean_min: -ptp / 2.,
        }
    }

    #[test]
    fn divider() {
        let mut excitation = Excitation::default();
        let converter = Converter::default();
        // 470 Ohm against 1 kOhm: 3 V * 470 / 1470
        let v = 3.0 * 470. / 1470.;
        let z = compute_impedance(&extrema(v), &excitation, &converter).unwrap();
        assert!((z.magnitude - 470.).abs() < 0.01);
        assert_eq!(z.peak_to_peak, v);

        excitation.sense = Sense::Reference;
        let v = 3.0 * 1000. / 1470.;
        let z = compute_impedance(&extrema(v), &excitation, &converter).unwrap();
        assert!((z.magnitude - 470.).abs() < 0.01);
    }

    #[test]
    fn out_of_range() {
        let excitation = Excitation::default();
        let converter = Converter::default();
        for v in [0., -0.1, 3.0, 3.2, 3.4, f32::NAN] {
            assert!(matches!(
                compute_impedance(&extrema(v), &excitation, &converter),
                Err(Error::MeasurementOutOfRange { .. })
            ));
        }
    }
}
