use num_traits::float::FloatCore;
use serde::{Deserialize, Serialize};

/// Generic vector for integer IIR filter.
/// This struct is used to hold the x/y input/output data vector or the b/a coefficient
/// vector.
pub type Vec5 = [i32; 5];

/// A normalized coefficient could not be represented in the Q2.30 format.
#[derive(Copy, Clone, Debug, PartialEq, thiserror::Error)]
#[error("coefficient {index} ({value}) outside of [-2, 2)")]
pub struct CoefficientRange {
    pub index: usize,
    pub value: f64,
}

fn macc(x: &[i32], a: &[i32], shift: u32) -> i32 {
    // Rounding bias, half up
    let y0 = 1i64 << (shift - 1);
    let y = x
        .iter()
        .zip(a)
        .map(|(x, a)| *x as i64 * *a as i64)
        .fold(y0, |y, xa| y + xa);
    (y >> shift) as i32
}

/// Integer biquad IIR in direct form I.
///
/// `ba` holds the feed-forward coefficients (b0, b1, b2) followed by the
/// negated feed-back coefficients (-a1, -a2), all normalized such that a0 = 1
/// and scaled to Q2.30. The output is
/// `y0 = b0*x0 + b1*x1 + b2*x2 - a1*y1 - a2*y2`, accumulated in `i64` and
/// rounded half up before the shift back to `i32`.
///
/// No offset and no output limits. Inputs must leave enough headroom for the
/// peak gain of the section.
#[derive(Copy, Clone, Default, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Biquad {
    pub ba: Vec5,
}

impl Biquad {
    /// Coefficient fixed point format: signed Q2.30.
    pub const SHIFT: u32 = 30;

    /// Identity section. Passes the input unmodified.
    pub const IDENTITY: Self = Self {
        ba: [1 << Self::SHIFT, 0, 0, 0, 0],
    };

    pub const fn new(ba: Vec5) -> Self {
        Self { ba }
    }

    /// Quantize normalized transfer function coefficients.
    ///
    /// # Args
    /// * `ba` - `[b0, b1, b2, a1, a2]` of
    ///   `H(z) = (b0 + b1 z^-1 + b2 z^-2) / (1 + a1 z^-1 + a2 z^-2)`.
    pub fn from_normalized(ba: [f64; 5]) -> Result<Self, CoefficientRange> {
        const SCALE: f64 = (1u64 << Biquad::SHIFT) as f64;
        let mut q = [0; 5];
        for (index, (q, c)) in q.iter_mut().zip(ba).enumerate() {
            // Feed-back taps are stored negated.
            let c = if index < 3 { c } else { -c };
            let v = (c * SCALE).round();
            if !(v >= i32::MIN as f64 && v <= i32::MAX as f64) {
                return Err(CoefficientRange { index, value: ba[index] });
            }
            *q = v as i32;
        }
        Ok(Self { ba: q })
    }

    /// Feed a new input value into the filter, update the filter state, and
    /// return the new output. Only the state `xy` is modified.
    ///
    /// # Arguments
    /// * `xy` - Current filter state.
    /// * `x0` - New input.
    pub fn update(&self, xy: &mut Vec5, x0: i32) -> i32 {
        let n = self.ba.len();
        debug_assert!(xy.len() == n);
        // `xy` contains       x0 x1 y0 y1 y2
        // Increment time      x1 x2 y1 y2 y3
        // Shift               x1 x1 x2 y1 y2
        // This unrolls better than xy.rotate_right(1)
        xy.copy_within(0..n - 1, 1);
        // Store x0            x0 x1 x2 y1 y2
        xy[0] = x0;
        // Compute y0 by multiply-accumulate
        let y0 = macc(xy, &self.ba, Self::SHIFT);
        // Store y0            x0 x1 y0 y1 y2
        xy[n / 2] = y0;
        y0
    }
}
