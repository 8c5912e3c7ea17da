//! Batch ADC acquisition
//!
//! # Design
//!
//! A batch is captured by letting the converter run continuously at the
//! programmed sample rate while the bulk-transfer engine (DMA) moves every
//! result from the converter FIFO into the batch buffer. No CPU intervention
//! is required per sample; the CPU only polls the engine for completion.
//!
//! Every capture follows the same sequence:
//! 1. Stop the converter and the engine (known idle state).
//! 2. Select the channel and program the sample-rate divider.
//! 3. Drain stale results from the converter FIFO so that the batch starts
//!    with a fresh conversion.
//! 4. Arm the engine for exactly `length` results into the buffer.
//! 5. Start continuous conversion.
//! 6. Poll the engine until it completes or the deadline passes.
//! 7. Stop the converter and the engine.
//!
//! Step 7 runs on both success and timeout, so a failed capture can be
//! retried immediately.
//!
//! # Ownership
//!
//! The converter and the engine are a single shared resource. [BatchAdc]
//! takes its [AdcDma] handle by value, so at most one capture can be in
//! flight against it.
use core::sync::atomic::{compiler_fence, Ordering};

use fugit::HertzU32;
use heapless::Vec;

use super::{
    design_parameters::MAX_BATCH_LEN, AdcChannel, AdcDma, ClockDivider,
    Duration, Monotonic,
};
use crate::{ConfigError, Error};

/// A batch of raw ADC codes in acquisition order.
pub type Batch = Vec<u16, MAX_BATCH_LEN>;

pub struct BatchAdc<H, C> {
    hw: H,
    clock: C,
    channel: AdcChannel,
    timeout: Duration,
}

impl<H: AdcDma, C: Monotonic> BatchAdc<H, C> {
    /// Construct the acquirer.
    ///
    /// # Args
    /// * `hw` - The converter/engine handle. Owned until [Self::release()].
    /// * `clock` - Monotonic clock for the completion deadline.
    /// * `channel` - The analog input to sample.
    /// * `timeout` - Bound on the wait for completion of one capture.
    pub fn new(
        mut hw: H,
        clock: C,
        channel: AdcChannel,
        timeout: Duration,
    ) -> Self {
        hw.stop();
        Self {
            hw,
            clock,
            channel,
            timeout,
        }
    }

    pub fn channel(&self) -> AdcChannel {
        self.channel
    }

    /// Give up ownership of the hardware.
    pub fn release(mut self) -> (H, C) {
        self.hw.stop();
        (self.hw, self.clock)
    }

    /// Capture a batch of `length` samples at `rate`.
    pub fn capture_batch(
        &mut self,
        length: usize,
        rate: HertzU32,
    ) -> Result<Batch, Error> {
        let mut batch = Batch::new();
        batch
            .resize(length, 0)
            .map_err(|_| ConfigError::BatchTooLong {
                length,
                capacity: MAX_BATCH_LEN,
            })?;
        self.capture_into(&mut batch, rate)?;
        Ok(batch)
    }

    /// Capture `buffer.len()` samples at `rate` into `buffer`.
    ///
    /// On error, the contents of `buffer` are unspecified.
    pub fn capture_into(
        &mut self,
        buffer: &mut [u16],
        rate: HertzU32,
    ) -> Result<(), Error> {
        if buffer.is_empty() {
            return Err(ConfigError::EmptyBatch.into());
        }
        let count = u32::try_from(buffer.len()).map_err(|_| {
            ConfigError::BatchTooLong {
                length: buffer.len(),
                capacity: MAX_BATCH_LEN,
            }
        })?;
        let divider = ClockDivider::from_rate(rate)?;

        self.hw.stop();
        self.hw.configure_channel(self.channel, divider);
        let stale = self.hw.drain();
        if stale > 0 {
            log::debug!("Drained {stale} stale ADC results");
        }

        // Note(unsafe): `buffer` is exclusively borrowed for the duration of this call and the
        // engine is stopped below before the borrow ends, on every path.
        unsafe {
            self.hw.arm_transfer(buffer.as_mut_ptr(), count);
        }
        // The engine writes `buffer` behind the compiler's back: no accesses
        // may move across the hand-over in either direction.
        compiler_fence(Ordering::SeqCst);
        self.hw.start();

        let result = self.poll(|hw| (!hw.is_busy()).then_some(()));
        self.hw.stop();
        compiler_fence(Ordering::SeqCst);

        if result.is_err() {
            log::warn!(
                "ADC batch of {count} samples at {} Hz timed out",
                divider.rate()
            );
        }
        result
    }

    /// Capture a single sample. Intended for diagnostics.
    pub fn capture_one(&mut self) -> Result<u16, Error> {
        self.hw.stop();
        self.hw.convert_one(self.channel);
        let result = self.poll(|hw| hw.result());
        if result.is_err() {
            log::warn!("ADC single conversion timed out");
        }
        result
    }

    /// Poll `ready` until it yields or the deadline passes.
    fn poll<T>(
        &mut self,
        mut ready: impl FnMut(&mut H) -> Option<T>,
    ) -> Result<T, Error> {
        let deadline = self.clock.now() + self.timeout;
        loop {
            if let Some(t) = ready(&mut self.hw) {
                return Ok(t);
            }
            if self.clock.now() >= deadline {
                return Err(Error::AcquisitionTimeout {
                    timeout_us: self.timeout.to_micros(),
                });
            }
            core::hint::spin_loop();
        }
    }
}
