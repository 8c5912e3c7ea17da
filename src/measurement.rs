//! Measurement cycle
//!
//! One cycle captures `batches` batches back to back. Each batch is
//! bandpass filtered and reduced to its extrema right away, so that only one
//! raw and one filtered buffer are needed regardless of the batch count.
//! The averaged extrema yield the peak-to-peak voltage and the impedance.
use dsp::{find_extrema, Averager, Bandpass, Extrema};

use crate::{
    hardware::{
        design_parameters::MAX_BATCH_LEN, AdcChannel, AdcDma, BatchAdc,
        Duration, Monotonic,
    },
    impedance::{compute_impedance, Impedance},
    settings::Settings,
    ConfigError, Error,
};

pub struct Meter<H, C> {
    adc: BatchAdc<H, C>,
    bandpass: Bandpass,
    settings: Settings,
    raw: [u16; MAX_BATCH_LEN],
    filtered: [i32; MAX_BATCH_LEN],
}

impl<H: AdcDma, C: Monotonic> Meter<H, C> {
    /// Validate `settings` and take ownership of the front-end.
    pub fn new(hw: H, clock: C, settings: Settings) -> Result<Self, Error> {
        settings.validate()?;
        let bandpass = settings.bandpass()?;
        let acq = &settings.acquisition;
        let adc = BatchAdc::new(
            hw,
            clock,
            AdcChannel(acq.channel),
            Duration::micros(acq.timeout as _),
        );
        log::info!(
            "Measuring {} x {} samples at {} Hz on channel {}",
            acq.batches,
            acq.batch_length,
            acq.rate,
            acq.channel
        );
        Ok(Self {
            adc,
            bandpass,
            settings,
            raw: [0; MAX_BATCH_LEN],
            filtered: [0; MAX_BATCH_LEN],
        })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// The acquirer, e.g. for single conversion diagnostics.
    pub fn adc(&mut self) -> &mut BatchAdc<H, C> {
        &mut self.adc
    }

    /// Give up ownership of the front-end.
    pub fn release(self) -> (H, C) {
        self.adc.release()
    }

    /// Run one full measurement cycle.
    ///
    /// Returns the impedance or the first error encountered. No partial
    /// results are returned.
    pub fn run_measurement_cycle(&mut self) -> Result<Impedance, Error> {
        let mut accu = Averager::new();
        self.bandpass.reset();
        for _ in 0..self.settings.acquisition.batches {
            let extrema = self.measure_batch()?;
            log::trace!("Batch extrema {extrema:?}");
            accu.push(extrema);
        }
        let extrema = accu.mean().ok_or(ConfigError::NoBatches)?;
        let impedance = compute_impedance(
            &extrema,
            &self.settings.excitation,
            &self.settings.converter,
        )?;
        log::info!(
            "|Z| = {} Ohm ({} V peak-to-peak)",
            impedance.magnitude,
            impedance.peak_to_peak
        );
        Ok(impedance)
    }

    /// Capture and filter one batch and return its extrema in volts.
    fn measure_batch(&mut self) -> Result<Extrema<f32>, Error> {
        let length = self.settings.acquisition.batch_length as usize;
        let rate = self.settings.rate();
        // Every capture restarts conversion: the excitation phase jumps at
        // the batch boundary even if the delay lines are kept.
        let settle = self.settings.filter.settle as usize;

        let raw = &mut self.raw[..length];
        let filtered = &mut self.filtered[..length];
        self.adc.capture_into(raw, rate)?;
        self.bandpass.filter(raw, filtered)?;

        let extrema = find_extrema(&filtered[settle..])
            .ok_or(ConfigError::Settling { length, settle })?;
        Ok(self.settings.converter.extrema_volts(extrema))
    }
}
