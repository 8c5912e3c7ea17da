//! RP2040 ADC and DMA
//!
//! [AdcDma] on the RP2040 peripheral access crate: the SAR ADC (12 bit,
//! 48 MHz `clk_adc`) with its 4-entry result FIFO paced by `DREQ_ADC` into
//! DMA channel 0, and the 1 MHz system timer as [Monotonic].
//!
//! Exclusivity follows from `pac::Peripherals::take()`: [Rp2040Adc] owns the
//! `ADC` and `DMA` blocks and [Rp2040Timer] owns `TIMER`. Board bring-up
//! must have started `clk_adc` at 48 MHz and the watchdog tick at 1 MHz.
use rp2040_pac as pac;

use super::{
    design_parameters::ADC_GPIO_BASE, AdcChannel, AdcDma, ClockDivider,
    Instant, Monotonic,
};

const DMA_CHANNEL: usize = 0;

/// DMA request line of the ADC FIFO.
const DREQ_ADC: u8 = 36;

// Bound on register polls that complete within a few ADC clock cycles.
const SPIN_LIMIT: u32 = 1 << 12;

pub struct Rp2040Adc {
    adc: pac::ADC,
    dma: pac::DMA,
}

impl Rp2040Adc {
    /// Take the ADC and the DMA out of reset and power up the ADC.
    pub fn new(adc: pac::ADC, dma: pac::DMA, resets: &mut pac::RESETS) -> Self {
        resets
            .reset()
            .modify(|_, w| w.adc().clear_bit().dma().clear_bit());
        loop {
            let done = resets.reset_done().read();
            if done.adc().bit_is_set() && done.dma().bit_is_set() {
                break;
            }
        }

        adc.fcs().reset();
        adc.cs().write(|w| w.en().set_bit());
        for _ in 0..SPIN_LIMIT {
            if adc.cs().read().ready().bit_is_set() {
                break;
            }
        }
        Self { adc, dma }
    }

    /// Disconnect the digital function and input buffer of the pin of
    /// `channel`. `IO_BANK0` and `PADS_BANK0` must be out of reset.
    pub fn analog_input(
        &mut self,
        channel: AdcChannel,
        io: &pac::IO_BANK0,
        pads: &pac::PADS_BANK0,
    ) {
        let gpio = (ADC_GPIO_BASE + channel.0) as usize;
        io.gpio(gpio).gpio_ctrl().write(|w| w.funcsel().null());
        pads.gpio(gpio).write(|w| {
            w.od()
                .set_bit()
                .ie()
                .clear_bit()
                .pue()
                .clear_bit()
                .pde()
                .clear_bit()
        });
    }

    /// Power down the ADC and give back the register blocks.
    pub fn release(mut self) -> (pac::ADC, pac::DMA) {
        self.stop();
        self.adc.cs().reset();
        (self.adc, self.dma)
    }

    fn ch(&self) -> &pac::dma::CH {
        self.dma.ch(DMA_CHANNEL)
    }
}

impl AdcDma for Rp2040Adc {
    fn configure_channel(&mut self, channel: AdcChannel, divider: ClockDivider) {
        // Note(unsafe): Channels are validated against the four external inputs. The divider
        // fields are full width.
        self.adc
            .cs()
            .write(|w| unsafe { w.en().set_bit().ainsel().bits(channel.0) });
        self.adc.div().write(|w| unsafe {
            w.int().bits(divider.int()).frac().bits(divider.frac())
        });
        // One DREQ per 12 bit result. Sticky over/underflow flags are
        // cleared by writing one.
        self.adc.fcs().write(|w| unsafe {
            w.en()
                .set_bit()
                .shift()
                .clear_bit()
                .dreq_en()
                .set_bit()
                .thresh()
                .bits(1)
                .over()
                .bit(true)
                .under()
                .bit(true)
        });
    }

    fn drain(&mut self) -> usize {
        let mut count = 0;
        while self.adc.fcs().read().level().bits() > 0
            && count < SPIN_LIMIT as usize
        {
            self.adc.fifo().read();
            count += 1;
        }
        count
    }

    unsafe fn arm_transfer(&mut self, dest: *mut u16, count: u32) {
        let fifo = self.adc.fifo().as_ptr() as u32;
        let ch = self.ch();
        ch.ch_read_addr().write(|w| w.bits(fifo));
        ch.ch_write_addr().write(|w| w.bits(dest as u32));
        ch.ch_trans_count().write(|w| w.bits(count));
        // Chaining to itself disables chaining.
        ch.ch_ctrl_trig().write(|w| {
            w.data_size()
                .size_halfword()
                .incr_read()
                .clear_bit()
                .incr_write()
                .set_bit()
                .chain_to()
                .bits(DMA_CHANNEL as u8)
                .treq_sel()
                .bits(DREQ_ADC)
                .irq_quiet()
                .set_bit()
                .en()
                .set_bit()
        });
    }

    fn start(&mut self) {
        self.adc.cs().modify(|_, w| w.start_many().set_bit());
    }

    fn is_busy(&mut self) -> bool {
        self.ch().ch_ctrl_trig().read().busy().bit_is_set()
    }

    fn stop(&mut self) {
        self.adc.cs().modify(|_, w| w.start_many().clear_bit());
        self.ch().ch_ctrl_trig().modify(|_, w| w.en().clear_bit());
        // Note(unsafe): Only the bit of the owned channel is set.
        self.dma
            .chan_abort()
            .write(|w| unsafe { w.bits(1 << DMA_CHANNEL) });
        for _ in 0..SPIN_LIMIT {
            if self.dma.chan_abort().read().bits() & (1 << DMA_CHANNEL) == 0 {
                break;
            }
        }
        self.adc
            .fcs()
            .modify(|_, w| w.en().clear_bit().dreq_en().clear_bit());
        self.drain();
    }

    fn convert_one(&mut self, channel: AdcChannel) {
        // Note(unsafe): See `configure_channel()`.
        self.adc.cs().write(|w| unsafe {
            w.en()
                .set_bit()
                .ainsel()
                .bits(channel.0)
                .start_once()
                .set_bit()
        });
        // READY drops within an ADC clock cycle of the start.
        for _ in 0..SPIN_LIMIT {
            if self.adc.cs().read().ready().bit_is_clear() {
                break;
            }
        }
    }

    fn result(&mut self) -> Option<u16> {
        self.adc
            .cs()
            .read()
            .ready()
            .bit_is_set()
            .then(|| self.adc.result().read().result().bits())
    }
}

/// The free-running 1 MHz system timer.
pub struct Rp2040Timer {
    timer: pac::TIMER,
}

impl Rp2040Timer {
    pub fn new(timer: pac::TIMER, resets: &mut pac::RESETS) -> Self {
        resets.reset().modify(|_, w| w.timer().clear_bit());
        while resets.reset_done().read().timer().bit_is_clear() {}
        Self { timer }
    }

    pub fn release(self) -> pac::TIMER {
        self.timer
    }
}

impl Monotonic for Rp2040Timer {
    fn now(&mut self) -> Instant {
        // The raw registers are not latched: re-read on a carry into the high word.
        loop {
            let hi = self.timer.timerawh().read().bits();
            let lo = self.timer.timerawl().read().bits();
            if self.timer.timerawh().read().bits() == hi {
                return Instant::from_ticks(((hi as u64) << 32) | lo as u64);
            }
        }
    }
}
