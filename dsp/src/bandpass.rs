//! Fixed-coefficient 4th order bandpass for batch processing.
//!
//! Two [Biquad] sections are cascaded (typically a high-pass removing the DC
//! offset and drift followed by a low-pass removing wideband noise). Raw
//! converter codes are first referenced to the mean code of the batch and
//! scaled up by [INPUT_SHIFT] to keep sub-LSB resolution through the
//! recursion.
//!
//! # Settling
//! With the delay lines zeroed at the start of a batch, or with a
//! discontinuity at the batch boundary, the first [SETTLING_SAMPLES] outputs
//! contain the transient of the cascade and may deviate from the
//! steady-state response. Consumers looking for signal extrema should skip
//! them in every batch.
use serde::{Deserialize, Serialize};

use super::iir_int::{Biquad, Vec5};

/// Filter order of the cascade.
pub const ORDER: usize = 4;

/// Number of leading outputs of a batch that may carry start-up transient.
pub const SETTLING_SAMPLES: usize = 4 * ORDER;

/// Left shift applied to baseline referenced input codes.
///
/// Inputs are at most 16 bit codes, so the filter works on at most 29 bit
/// signed values and leaves headroom for the section gains.
pub const INPUT_SHIFT: u32 = 12;

/// Delay line handling between consecutive batches.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FilterReset {
    /// Zero the delay lines and recompute the baseline for every batch.
    /// Identical batches always yield identical outputs.
    #[default]
    PerBatch,
    /// Keep the delay lines and the baseline of the first batch until
    /// [Bandpass::reset()]. A gap or phase jump between batches still
    /// excites a transient of up to [SETTLING_SAMPLES].
    Continuous,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("empty input batch")]
    Empty,
    #[error("output length {output} does not match input length {input}")]
    LengthMismatch { input: usize, output: usize },
}

#[derive(Clone, Debug)]
pub struct Bandpass {
    sections: [Biquad; 2],
    state: [Vec5; 2],
    baseline: Option<u16>,
    policy: FilterReset,
}

impl Bandpass {
    pub const fn new(sections: [Biquad; 2], policy: FilterReset) -> Self {
        Self {
            sections,
            state: [[0; 5]; 2],
            baseline: None,
            policy,
        }
    }

    pub fn policy(&self) -> FilterReset {
        self.policy
    }

    /// Zero the delay lines and forget the baseline.
    pub fn reset(&mut self) {
        self.state = [[0; 5]; 2];
        self.baseline = None;
    }

    /// Filter a batch of raw codes.
    ///
    /// # Args
    /// * `input` - Raw converter codes in acquisition order.
    /// * `output` - Filtered values in units of `1 << INPUT_SHIFT` per code.
    ///   Must have the same length as `input`.
    pub fn filter(
        &mut self,
        input: &[u16],
        output: &mut [i32],
    ) -> Result<(), Error> {
        if input.is_empty() {
            return Err(Error::Empty);
        }
        if input.len() != output.len() {
            return Err(Error::LengthMismatch {
                input: input.len(),
                output: output.len(),
            });
        }

        let baseline = match (self.policy, self.baseline) {
            (FilterReset::Continuous, Some(baseline)) => baseline,
            _ => {
                self.reset();
                let baseline = mean(input);
                self.baseline = Some(baseline);
                baseline
            }
        };

        for (x, y) in input.iter().zip(output.iter_mut()) {
            let x0 = (*x as i32 - baseline as i32) << INPUT_SHIFT;
            *y = self
                .sections
                .iter()
                .zip(self.state.iter_mut())
                .fold(x0, |x, (section, xy)| section.update(xy, x));
        }
        Ok(())
    }
}

/// Mean code, rounded down.
fn mean(input: &[u16]) -> u16 {
    let sum: u64 = input.iter().map(|x| *x as u64).sum();
    (sum / input.len() as u64) as u16
}

#[cfg(test)]
mod test {
    use super::*;

    const SECTIONS: [Biquad; 2] = [
        // 20 Hz Butterworth high-pass at 100 kHz
        Biquad::new([
            1072788146,
            -2145576292,
            1072788146,
            2145575445,
            -1071835315,
        ]),
        // 10 kHz Butterworth low-pass at 100 kHz
        Biquad::new([72429549, 144859098, 72429549, 1227265970, -443242341]),
    ];

    #[test]
    fn zero_in_zero_out() {
        let mut bp = Bandpass::new(SECTIONS, FilterReset::PerBatch);
        let mut y = [1; 64];
        bp.filter(&[0; 64], &mut y).unwrap();
        assert_eq!(y, [0; 64]);
    }

    #[test]
    fn constant_removed() {
        let mut bp = Bandpass::new(SECTIONS, FilterReset::PerBatch);
        let mut y = [1; 64];
        bp.filter(&[4095; 64], &mut y).unwrap();
        assert_eq!(y, [0; 64]);
    }

    #[test]
    fn invalid_length() {
        let mut bp = Bandpass::new(SECTIONS, FilterReset::PerBatch);
        assert_eq!(bp.filter(&[], &mut []), Err(Error::Empty));
        assert_eq!(
            bp.filter(&[1, 2, 3], &mut [0; 2]),
            Err(Error::LengthMismatch {
                input: 3,
                output: 2
            })
        );
    }

    #[test]
    fn mean_floor() {
        assert_eq!(mean(&[1, 2]), 1);
        assert_eq!(mean(&[u16::MAX; 3]), u16::MAX);
    }

    #[test]
    fn per_batch_is_repeatable() {
        let x: [u16; 100] =
            core::array::from_fn(|i| if i % 20 < 10 { 1000 } else { 3000 });
        let mut bp = Bandpass::new(SECTIONS, FilterReset::PerBatch);
        let mut a = [0; 100];
        let mut b = [0; 100];
        bp.filter(&x, &mut a).unwrap();
        bp.filter(&x, &mut b).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn continuous_keeps_state() {
        let x: [u16; 100] =
            core::array::from_fn(|i| if i % 20 < 10 { 1000 } else { 3000 });
        let mut bp = Bandpass::new(SECTIONS, FilterReset::Continuous);
        let mut a = [0; 100];
        let mut b = [0; 100];
        bp.filter(&x, &mut a).unwrap();
        bp.filter(&x, &mut b).unwrap();
        // The second batch continues from the delay lines of the first.
        assert_ne!(a[..SETTLING_SAMPLES], b[..SETTLING_SAMPLES]);

        bp.reset();
        bp.filter(&x, &mut b).unwrap();
        assert_eq!(a, b);
    }
}
