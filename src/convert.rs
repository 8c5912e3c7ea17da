use dsp::{bandpass::INPUT_SHIFT, Extrema};
use miniconf::Tree;
use serde::{Deserialize, Serialize};

use crate::hardware::design_parameters::{ADC_RESOLUTION_BITS, ADC_V_REF};

/// Physical constants of the converter and its analog front-end.
#[derive(Copy, Clone, Debug, PartialEq, Tree, Serialize, Deserialize)]
#[tree(meta(doc, typename))]
#[serde(default)]
pub struct Converter {
    /// Reference voltage (full scale) in volts.
    pub v_ref: f32,
    /// Resolution in bits.
    pub resolution_bits: u8,
    /// Gain between the measured node and the converter input.
    pub gain: f32,
}

impl Default for Converter {
    fn default() -> Self {
        Self {
            v_ref: ADC_V_REF,
            resolution_bits: ADC_RESOLUTION_BITS,
            gain: 1.0,
        }
    }
}

impl Converter {
    /// Input-referred volts per code.
    pub fn volts_per_lsb(&self) -> f32 {
        self.v_ref / (1u32 << self.resolution_bits) as f32 / self.gain
    }

    /// Input-referred full scale range.
    pub fn full_scale(&self) -> f32 {
        self.v_ref / self.gain
    }

    /// Convert a raw code to input-referred volts.
    pub fn volts(&self, code: u16) -> f32 {
        code as f32 * self.volts_per_lsb()
    }

    /// Convert a bandpass output to input-referred volts.
    pub fn filtered_volts(&self, y: i32) -> f32 {
        y as f32 * (self.volts_per_lsb() / (1u32 << INPUT_SHIFT) as f32)
    }

    pub fn extrema_volts(&self, extrema: Extrema<i32>) -> Extrema<f32> {
        extrema.map(|y| self.filtered_volts(y))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn codes() {
        let c = Converter::default();
        assert_eq!(c.volts(0), 0.);
        assert_eq!(c.volts(2048), 3.3 / 2.);
        assert!((c.volts(4095) - 3.3 * 4095. / 4096.).abs() < 1e-6);
        assert_eq!(c.full_scale(), 3.3);
    }

    #[test]
    fn filtered() {
        let c = Converter {
            gain: 2.,
            ..Default::default()
        };
        assert_eq!(c.filtered_volts(1 << INPUT_SHIFT), c.volts(1));
        assert_eq!(
            c.extrema_volts(Extrema {
                max: 100 << INPUT_SHIFT,
                min: -(100 << INPUT_SHIFT)
            }),
            Extrema {
                max: c.volts(100),
                min: -c.volts(100)
            }
        );
        assert_eq!(c.full_scale(), 1.65);
    }
}
