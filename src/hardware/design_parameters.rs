use fugit::{HertzU32, MicrosDurationU64};

/// The ADC clock (`clk_adc`). It must be running from the 48 MHz USB PLL.
pub const ADC_CLOCK: HertzU32 = HertzU32::MHz(48);

/// Number of ADC clock cycles per conversion. This bounds the sample rate to
/// 500 kS/s.
pub const ADC_CONVERSION_CYCLES: u32 = 96;

/// ADC resolution. Codes are right-aligned in the 16 bit FIFO entries.
pub const ADC_RESOLUTION_BITS: u8 = 12;

/// ADC reference voltage (ADC_AVDD).
pub const ADC_V_REF: f32 = 3.3;

/// Highest external analog input. Channel `n` is on GPIO `26 + n`.
pub const ADC_MAX_CHANNEL: u8 = 3;

/// GPIO of analog input channel 0.
pub const ADC_GPIO_BASE: u8 = 26;

/// Capacity of the sample buffers. Batches may be shorter.
pub const MAX_BATCH_LEN: usize = 1024;

/// Default sample rate.
pub const SAMPLE_RATE: HertzU32 = HertzU32::kHz(100);

/// Default number of samples per batch: five excitation periods.
pub const BATCH_LEN: usize = 500;

/// Default number of batches averaged per measurement.
pub const BATCHES: u32 = 10;

/// Default bound on the wait for a batch transfer to complete.
pub const ACQUISITION_TIMEOUT: MicrosDurationU64 = MicrosDurationU64::millis(50);

/// Default excitation frequency.
pub const EXCITATION_FREQUENCY: HertzU32 = HertzU32::kHz(1);

/// Bandpass design for the default excitation and sample rate.
///
/// Normalized `[b0, b1, b2, a1, a2]` of a 20 Hz Butterworth high-pass
/// followed by a 10 kHz Butterworth low-pass, both at 100 kS/s.
pub const BANDPASS: [[f64; 5]; 2] = [
    [
        0.9991118180795607,
        -1.9982236361591215,
        0.9991118180795607,
        -1.9982228472918417,
        0.9982244250264005,
    ],
    [
        0.0674552738890719,
        0.1349105477781438,
        0.0674552738890719,
        -1.142980502539901,
        0.41280159809618855,
    ],
];
