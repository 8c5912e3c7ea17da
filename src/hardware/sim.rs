//! Simulated front-end
//!
//! [SimulatedAdc] converts samples taken from an iterator, e.g. a
//! synthesized excitation waveform, and moves them like the DMA would:
//! a few results per poll of [AdcDma::is_busy()]. Conversions missed while
//! the converter is stopped between batches can be modeled with
//! [SimulatedAdc::set_gap()]. [SimulatedClock] advances by a fixed step on
//! every read so that timeouts are deterministic.
use super::{AdcChannel, AdcDma, ClockDivider, Duration, Instant, Monotonic};

/// Code delivered for stale FIFO entries that were not drained.
pub const STALE_CODE: u16 = u16::MAX;

pub struct SimulatedAdc<I> {
    source: I,
    channel: Option<AdcChannel>,
    divider: Option<ClockDivider>,
    dest: *mut u16,
    remaining: u32,
    running: bool,
    stalled: bool,
    stale: usize,
    single: Option<u16>,
    per_poll: u32,
    gap: usize,
    started: bool,
}

impl<I: Iterator<Item = u16>> SimulatedAdc<I> {
    pub fn new(source: I) -> Self {
        Self {
            source,
            channel: None,
            divider: None,
            dest: core::ptr::null_mut(),
            remaining: 0,
            running: false,
            stalled: false,
            stale: 0,
            single: None,
            per_poll: 4,
            gap: 0,
            started: false,
        }
    }

    /// While stalled, conversions never complete.
    pub fn set_stalled(&mut self, stalled: bool) {
        self.stalled = stalled;
    }

    /// Skip `gap` source samples before every start of continuous
    /// conversion but the first.
    pub fn set_gap(&mut self, gap: usize) {
        self.gap = gap;
    }

    /// Put `count` results from an earlier acquisition into the FIFO.
    pub fn queue_stale(&mut self, count: usize) {
        self.stale += count;
    }

    /// The last configured channel.
    pub fn channel(&self) -> Option<AdcChannel> {
        self.channel
    }

    /// The last configured sample-rate divider.
    pub fn divider(&self) -> Option<ClockDivider> {
        self.divider
    }

    /// Neither converting nor armed.
    pub fn is_idle(&self) -> bool {
        !self.running && self.dest.is_null()
    }

    fn convert(&mut self) -> Option<u16> {
        if self.stalled {
            return None;
        }
        if self.stale > 0 {
            self.stale -= 1;
            return Some(STALE_CODE);
        }
        self.source.next()
    }
}

impl<I: Iterator<Item = u16>> AdcDma for SimulatedAdc<I> {
    fn configure_channel(&mut self, channel: AdcChannel, divider: ClockDivider) {
        self.channel = Some(channel);
        self.divider = Some(divider);
    }

    fn drain(&mut self) -> usize {
        core::mem::take(&mut self.stale)
    }

    unsafe fn arm_transfer(&mut self, dest: *mut u16, count: u32) {
        self.dest = dest;
        self.remaining = count;
    }

    fn start(&mut self) {
        if self.started {
            self.source.by_ref().take(self.gap).for_each(drop);
        }
        self.started = true;
        self.running = true;
    }

    fn is_busy(&mut self) -> bool {
        if self.dest.is_null() || self.remaining == 0 {
            return false;
        }
        if self.running {
            for _ in 0..self.per_poll.min(self.remaining) {
                let Some(code) = self.convert() else {
                    break;
                };
                // Note(unsafe): The caller of `arm_transfer()` guarantees `dest` is valid for
                // `remaining` more writes until `stop()`.
                unsafe {
                    self.dest.write(code);
                    self.dest = self.dest.add(1);
                }
                self.remaining -= 1;
            }
        }
        self.remaining > 0
    }

    fn stop(&mut self) {
        self.running = false;
        self.dest = core::ptr::null_mut();
        self.remaining = 0;
    }

    fn convert_one(&mut self, channel: AdcChannel) {
        self.channel = Some(channel);
        self.single = self.convert();
    }

    fn result(&mut self) -> Option<u16> {
        self.single.take()
    }
}

/// A clock advancing by `step` on every read.
pub struct SimulatedClock {
    now: Instant,
    step: Duration,
}

impl SimulatedClock {
    pub fn new(step: Duration) -> Self {
        Self {
            now: Instant::from_ticks(0),
            step,
        }
    }
}

impl Monotonic for SimulatedClock {
    fn now(&mut self) -> Instant {
        let now = self.now;
        self.now += self.step;
        now
    }
}
