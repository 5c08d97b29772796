use crate::{
    Configuration, ConversionMode, Ds1624, Ds1624Error, Ds1624Result, Interact,
};
use embedded_hal::{
    delay::DelayNs,
    i2c::{I2c, SevenBitAddress},
};
use fixed::types::I12F4;

pub(crate) const START_CONVERT_CMD: u8 = 0xee;
pub(crate) const STOP_CONVERT_CMD: u8 = 0x22;
pub(crate) const READ_TEMPERATURE_CMD: u8 = 0xaa;
pub(crate) const POLL_INTERVAL_MS: u32 = 10;

/// Temperature in degrees Celsius, in the device's native 12.4 fixed-point
/// format.
pub type Temperature = I12F4;

/// Decoding applied to the two bytes of the temperature register.
///
/// The register holds a 12-bit two's complement value in bits 15..4 of the
/// big-endian word, with 4 fractional bits. Two decodings of it have been
/// used with this device family. They disagree for negative readings.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum TemperatureEncoding {
    /// Sign-extend the 12-bit value and scale by 1/16. Exact for the whole
    /// register range.
    #[default]
    TwosComplement,
    /// Legacy decoding: when the sign bit is set, each byte is negated on
    /// its own (`!b + 1`) and the result is read as an unsigned
    /// `msb + (lsb >> 4) / 16`. Negative readings therefore come back as
    /// approximate magnitudes without a sign. Only use this to stay
    /// compatible with existing data.
    BytewiseNegation,
}

impl TemperatureEncoding {
    /// Decode the raw register bytes `[msb, lsb]`.
    pub fn decode(self, raw: [u8; 2]) -> Temperature {
        match self {
            Self::TwosComplement => Temperature::from_bits(i16::from_be_bytes(raw) >> 4),
            Self::BytewiseNegation => {
                let [mut msb, mut lsb] = raw;
                if msb & 0x80 != 0 {
                    msb = (!msb).wrapping_add(1);
                    lsb = (!lsb).wrapping_add(1);
                }
                Temperature::from_bits(((msb as i16) << 4) | (lsb >> 4) as i16)
            }
        }
    }
}

impl<I: I2c<SevenBitAddress>, D: DelayNs> Ds1624<I, D> {
    /// Read the temperature in degrees Celsius.
    ///
    /// Initializes the device on first use. In one-shot mode a conversion
    /// is started and polled for completion (up to one second per
    /// conversion); in continuous mode the latest result is fetched.
    ///
    /// On error [`last_read_valid`](Ds1624::last_read_valid) is `false` and
    /// no temperature is available.
    pub fn read_temperature(&mut self) -> Ds1624Result<f32, I::Error> {
        self.read_temperature_fixed().map(|t| t.to_num())
    }

    /// Read the temperature in the device's native fixed-point format.
    ///
    /// See [`read_temperature`](Ds1624::read_temperature).
    pub fn read_temperature_fixed(&mut self) -> Ds1624Result<Temperature, I::Error> {
        self.last_read_valid = false;
        self.init()?;
        if self.mode == ConversionMode::OneShot {
            self.start_conversion()?;
            self.wait_conversion()?;
        }
        let raw = self.read_raw_temperature()?;
        self.last_read_valid = true;
        Ok(self.encoding.decode(raw))
    }

    /// Read the two raw bytes `[msb, lsb]` of the temperature register
    /// without triggering a conversion.
    pub fn read_raw_temperature(&mut self) -> Ds1624Result<[u8; 2], I::Error> {
        let mut raw = [0; 2];
        self.i2c
            .write_read(self.addr, &[READ_TEMPERATURE_CMD], &mut raw)?;
        log::trace!("DS1624 {:#04x}: raw temperature {:02x?}", self.addr, raw);
        Ok(raw)
    }

    /// Start a temperature conversion.
    ///
    /// In one-shot mode this triggers a single conversion; in continuous
    /// mode it resumes conversions after [`stop_conversion`](Ds1624::stop_conversion).
    pub fn start_conversion(&mut self) -> Ds1624Result<(), I::Error> {
        log::trace!("DS1624 {:#04x}: start conversion", self.addr);
        self.i2c.write(self.addr, &[START_CONVERT_CMD])?;
        Ok(())
    }

    /// Halt continuous conversions. The last result stays readable.
    pub fn stop_conversion(&mut self) -> Ds1624Result<(), I::Error> {
        log::debug!("DS1624 {:#04x}: stop conversion", self.addr);
        self.i2c.write(self.addr, &[STOP_CONVERT_CMD])?;
        Ok(())
    }

    /// Poll the DONE flag of the configuration register until it is set.
    pub(crate) fn wait_conversion(&mut self) -> Ds1624Result<(), I::Error> {
        let mut tries: u16 = 0;
        loop {
            let mut config = Configuration::default();
            config.read(self)?;
            if config.done() {
                log::trace!("DS1624 {:#04x}: conversion done after {} polls", self.addr, tries);
                return Ok(());
            }
            if self.retries.is_some_and(|limit| tries >= limit) {
                log::warn!(
                    "DS1624 {:#04x}: conversion not done after {} polls",
                    self.addr,
                    tries
                );
                return Err(Ds1624Error::RetriesExceeded);
            }
            tries = tries.saturating_add(1);
            self.delay.delay_ms(POLL_INTERVAL_MS);
        }
    }
}
