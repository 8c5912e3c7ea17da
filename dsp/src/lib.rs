#![cfg_attr(not(test), no_std)]

//! Batch signal processing for AC impedance measurement: an integer
//! bandpass, an extremum finder and a streaming averager of extrema.

mod accu;
pub use accu::*;
pub mod bandpass;
pub use bandpass::{Bandpass, FilterReset};
mod extrema;
pub use extrema::*;
pub mod iir_int;
pub use iir_int::Biquad;
