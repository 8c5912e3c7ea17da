use serde::{Deserialize, Serialize};

/// Largest and smallest value of a batch.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Extrema<T> {
    pub max: T,
    pub min: T,
}

impl<T> Extrema<T> {
    /// Apply `f` to both values.
    pub fn map<U>(self, mut f: impl FnMut(T) -> U) -> Extrema<U> {
        Extrema {
            max: f(self.max),
            min: f(self.min),
        }
    }
}

impl<T: core::ops::Sub<Output = T> + Copy> Extrema<T> {
    pub fn peak_to_peak(&self) -> T {
        self.max - self.min
    }
}

/// Scan every element of `batch` once.
///
/// Returns `None` for an empty batch.
pub fn find_extrema<T: PartialOrd + Copy>(batch: &[T]) -> Option<Extrema<T>> {
    let (first, rest) = batch.split_first()?;
    Some(rest.iter().fold(
        Extrema {
            max: *first,
            min: *first,
        },
        |e, x| Extrema {
            max: if *x > e.max { *x } else { e.max },
            min: if *x < e.min { *x } else { e.min },
        },
    ))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn empty() {
        assert_eq!(find_extrema::<i32>(&[]), None);
    }

    #[test]
    fn single() {
        assert_eq!(find_extrema(&[-7]), Some(Extrema { max: -7, min: -7 }));
    }

    #[test]
    fn bounds() {
        let x = [3, -1, 4, 1, -5, 9, 2, -6, 5, 3];
        let e = find_extrema(&x).unwrap();
        assert_eq!(e, Extrema { max: 9, min: -6 });
        assert!(x.iter().all(|x| e.max >= *x && *x >= e.min));
        assert_eq!(e.peak_to_peak(), 15);
    }

    #[test]
    fn bounds_random() {
        use rand_core::{RngCore, SeedableRng};
        use rand_xorshift::XorShiftRng;

        let mut rng = XorShiftRng::seed_from_u64(0x5eed);
        for len in (1..64).chain([255, 256, 1000]) {
            for _ in 0..16 {
                let x: Vec<i32> =
                    (0..len).map(|_| rng.next_u32() as i32 >> 8).collect();
                let e = find_extrema(&x).unwrap();
                assert!(x.iter().all(|x| e.max >= *x && *x >= e.min));
                assert!(x.contains(&e.max) && x.contains(&e.min));
                if len == 1 {
                    assert_eq!(e, Extrema { max: x[0], min: x[0] });
                }
            }
        }
    }

    #[test]
    fn extremes_at_ends() {
        let e = find_extrema(&[i32::MIN, 0, 0, i32::MAX]).unwrap();
        assert_eq!(e, Extrema { max: i32::MAX, min: i32::MIN });
        assert_eq!(e.map(|x| x as i64).peak_to_peak(), u32::MAX as i64);
    }
}
