use serde::{Deserialize, Serialize};

use super::Extrema;

/// Mean of the batch maxima and mean of the batch minima.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AveragedExtrema {
    pub mean_max: f32,
    pub mean_min: f32,
}

impl AveragedExtrema {
    pub fn peak_to_peak(&self) -> f32 {
        self.mean_max - self.mean_min
    }
}

/// Streaming accumulator of per-batch extrema.
///
/// Sums are kept in `f64` so that the mean of identical `f32` pairs is exact.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Averager {
    max: f64,
    min: f64,
    count: u32,
}

impl Averager {
    pub const fn new() -> Self {
        Self {
            max: 0.,
            min: 0.,
            count: 0,
        }
    }

    pub fn push(&mut self, extrema: Extrema<f32>) {
        self.max += extrema.max as f64;
        self.min += extrema.min as f64;
        self.count += 1;
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    /// The averaged extrema or `None` if nothing was pushed.
    pub fn mean(&self) -> Option<AveragedExtrema> {
        (self.count > 0).then(|| {
            let n = self.count as f64;
            AveragedExtrema {
                mean_max: (self.max / n) as f32,
                mean_min: (self.min / n) as f32,
            }
        })
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

/// Average a buffered sequence of extrema.
pub fn average(pairs: &[Extrema<f32>]) -> Option<AveragedExtrema> {
    let mut accu = Averager::new();
    pairs.iter().for_each(|p| accu.push(*p));
    accu.mean()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn empty() {
        assert_eq!(Averager::new().mean(), None);
        assert_eq!(average(&[]), None);
    }

    #[test]
    fn single_pair() {
        let p = Extrema {
            max: 0.123_456_7,
            min: -0.765_432_1,
        };
        assert_eq!(
            average(&[p]),
            Some(AveragedExtrema {
                mean_max: p.max,
                mean_min: p.min
            })
        );
    }

    #[test]
    fn identical_pairs() {
        let p = Extrema { max: 0.1, min: -0.3 };
        let mut accu = Averager::new();
        for _ in 0..37 {
            accu.push(p);
        }
        assert_eq!(accu.count(), 37);
        let m = accu.mean().unwrap();
        assert_eq!((m.mean_max, m.mean_min), (p.max, p.min));
    }

    #[test]
    fn mean_and_reset() {
        let mut accu = Averager::new();
        accu.push(Extrema { max: 1.0, min: -1.0 });
        accu.push(Extrema { max: 2.0, min: 0.0 });
        let m = accu.mean().unwrap();
        assert_eq!((m.mean_max, m.mean_min), (1.5, -0.5));
        assert_eq!(m.peak_to_peak(), 2.0);
        accu.reset();
        assert_eq!(accu.mean(), None);
    }
}
