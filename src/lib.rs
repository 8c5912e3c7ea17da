#![cfg_attr(not(test), no_std)]

//! AC impedance measurement core
//!
//! A load is excited at a known frequency and the voltage across it is
//! captured in batches by a DMA-driven ADC. Each batch is bandpass filtered
//! around the excitation, its extrema are averaged across batches, and the
//! resulting peak-to-peak voltage is converted to an impedance magnitude.
//!
//! The host loop constructs a [measurement::Meter] once and calls
//! [measurement::Meter::run_measurement_cycle()] repeatedly.

pub mod convert;
mod error;
pub mod hardware;
pub mod impedance;
pub mod measurement;
pub mod settings;

pub use error::*;
