use crate::{
    BASE_ADDRESS, Ds1624Error, Ds1624Result, TemperatureEncoding,
    temperature::START_CONVERT_CMD, traits::Addressing, traits::Interact,
};
use bitfield_struct::bitfield;
use embedded_hal::{
    delay::DelayNs,
    i2c::{I2c, SevenBitAddress},
};

pub(crate) const ACCESS_CONFIG_CMD: u8 = 0xac; // Read or write the configuration register
pub(crate) const CONFIG_SETTLE_MS: u32 = 20; // Datasheet minimum is 10ms
pub(crate) const DEFAULT_RETRIES: u16 = 200;

/// Physical strapping of the A2, A1 and A0 pins.
///
/// `true` means the pin is tied high.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct AddressPins {
    /// Level of the A2 pin.
    pub a2: bool,
    /// Level of the A1 pin.
    pub a1: bool,
    /// Level of the A0 pin.
    pub a0: bool,
}

impl AddressPins {
    /// Create a pin strapping from the three pin levels.
    pub const fn new(a2: bool, a1: bool, a0: bool) -> Self {
        Self { a2, a1, a0 }
    }

    /// Create a pin strapping from the low three bits of `bits` (`a2|a1|a0`).
    pub const fn from_bits(bits: u8) -> Self {
        Self {
            a2: bits & 0b100 != 0,
            a1: bits & 0b010 != 0,
            a0: bits & 0b001 != 0,
        }
    }

    /// 7-bit bus address selected by this strapping.
    pub const fn address(&self) -> u8 {
        BASE_ADDRESS | (self.a2 as u8) << 2 | (self.a1 as u8) << 1 | self.a0 as u8
    }
}

/// Temperature conversion mode stored in the configuration register.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum ConversionMode {
    /// The device converts continuously in the background; reads fetch the
    /// latest result.
    #[default]
    Continuous,
    /// Each read triggers a conversion and polls for its completion.
    OneShot,
}

/// Who brings up the bus and configures the device.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum BusOwnership {
    /// The driver configures the device lazily on first use.
    #[default]
    Driver,
    /// The application has already configured the device (for example
    /// because it shares the bus with other devices); the driver never
    /// writes the configuration register.
    External,
}

/// Initialization state of a device handle.
///
/// Transitions only move forward:
/// `Unconfigured -> Configured -> Ready`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    /// Configuration register has not been written yet.
    Unconfigured,
    /// Configuration register written and settled, conversions not started.
    Configured,
    /// Temperature reads can be issued.
    Ready,
}

/// A DS1624 thermometer and EEPROM.
///
/// Takes ownership of an I2C bus (implementing [`I2c`](embedded_hal::i2c::I2c) trait)
/// and a timer object implementing the [`DelayNs`](embedded_hal::delay::DelayNs) trait.
/// Pass `&mut bus` to share one bus between several handles; the caller is
/// then responsible for serializing access.
pub struct Ds1624<I, D> {
    pub(crate) i2c: I,
    pub(crate) addr: u8,
    pub(crate) delay: D,
    pub(crate) mode: ConversionMode,
    pub(crate) encoding: TemperatureEncoding,
    pub(crate) state: Lifecycle,
    pub(crate) retries: Option<u16>,
    pub(crate) stale_read_workaround: bool,
    pub(crate) last_read_valid: bool,
}

/// Builder for creating a [`Ds1624`] or [`Ds1624Async`](crate::Ds1624Async)
/// instance with custom configuration.
#[derive(Debug, Clone)]
pub struct Ds1624Builder {
    pub(crate) pins: AddressPins,
    pub(crate) mode: ConversionMode,
    pub(crate) ownership: BusOwnership,
    pub(crate) encoding: TemperatureEncoding,
    pub(crate) retries: Option<u16>,
    pub(crate) stale_read_workaround: bool,
}

impl Default for Ds1624Builder {
    fn default() -> Self {
        Ds1624Builder {
            pins: AddressPins::default(),
            mode: ConversionMode::default(),
            ownership: BusOwnership::default(),
            encoding: TemperatureEncoding::default(),
            retries: Some(DEFAULT_RETRIES),
            stale_read_workaround: true,
        }
    }
}

impl Ds1624Builder {
    /// Sets the address pin strapping.
    pub fn with_address_pins(mut self, pins: AddressPins) -> Self {
        self.pins = pins;
        self
    }

    /// Sets the conversion mode written to the configuration register.
    pub fn with_mode(mut self, mode: ConversionMode) -> Self {
        self.mode = mode;
        self
    }

    /// Sets whether the driver or the application configures the device.
    pub fn with_bus_ownership(mut self, ownership: BusOwnership) -> Self {
        self.ownership = ownership;
        self
    }

    /// Selects how the raw temperature register is decoded.
    pub fn with_encoding(mut self, encoding: TemperatureEncoding) -> Self {
        self.encoding = encoding;
        self
    }

    /// Sets the retry count for conversion polling.
    ///
    /// Polls happen every 10ms. `None` polls forever, which blocks the
    /// caller indefinitely if the device never reports completion.
    pub fn with_retries(mut self, retries: Option<u16>) -> Self {
        self.retries = retries;
        self
    }

    /// Enables or disables the throwaway read issued before every EEPROM
    /// read.
    ///
    /// Some device revisions return stale data on the first read after
    /// the memory address is set. Only disable this for revisions known to
    /// be unaffected.
    pub fn with_stale_read_workaround(mut self, enable: bool) -> Self {
        self.stale_read_workaround = enable;
        self
    }

    pub(crate) fn initial_state(&self) -> Lifecycle {
        match self.ownership {
            BusOwnership::Driver => Lifecycle::Unconfigured,
            BusOwnership::External => Lifecycle::Ready,
        }
    }

    /// Builds a new `Ds1624` instance with the specified configuration.
    ///
    /// No bus traffic happens until the first operation.
    pub fn build<I: I2c<SevenBitAddress>, D: DelayNs>(self, i2c: I, delay: D) -> Ds1624<I, D> {
        Ds1624 {
            i2c,
            addr: self.pins.address(),
            delay,
            mode: self.mode,
            encoding: self.encoding,
            state: self.initial_state(),
            retries: self.retries,
            stale_read_workaround: self.stale_read_workaround,
            last_read_valid: false,
        }
    }
}

impl<I: I2c<SevenBitAddress>, D: DelayNs> Ds1624<I, D> {
    /// Creates a handle for the device with all address pins grounded,
    /// in continuous conversion mode.
    pub fn new(i2c: I, delay: D) -> Self {
        Ds1624Builder::default().build(i2c, delay)
    }
}

impl<I, D> Ds1624<I, D> {
    /// 7-bit bus address of the device.
    pub fn address(&self) -> u8 {
        self.addr
    }

    /// Configured conversion mode.
    pub fn mode(&self) -> ConversionMode {
        self.mode
    }

    /// Current initialization state.
    pub fn lifecycle(&self) -> Lifecycle {
        self.state
    }

    /// Whether the most recent temperature or memory read received every
    /// expected byte.
    pub fn last_read_valid(&self) -> bool {
        self.last_read_valid
    }

    /// Destroys the driver and hands back the bus and the delay.
    pub fn release(self) -> (I, D) {
        (self.i2c, self.delay)
    }
}

impl<I: I2c<SevenBitAddress>, D: DelayNs> Ds1624<I, D> {
    /// Brings the device to [`Lifecycle::Ready`].
    ///
    /// Writes the conversion mode to the configuration register, waits for
    /// the non-volatile write to complete and, in continuous mode, starts
    /// conversions. Steps already completed are never repeated, so calling
    /// this again is free.
    pub fn init(&mut self) -> Ds1624Result<(), I::Error> {
        if self.state == Lifecycle::Unconfigured {
            log::debug!(
                "DS1624 {:#04x}: configuring for {:?} conversion",
                self.addr,
                self.mode
            );
            Configuration::new()
                .with_one_shot(self.mode == ConversionMode::OneShot)
                .write(self)?;
            self.delay.delay_ms(CONFIG_SETTLE_MS);
            self.state = Lifecycle::Configured;
        }
        if self.state == Lifecycle::Configured {
            if self.mode == ConversionMode::Continuous {
                log::debug!("DS1624 {:#04x}: starting continuous conversion", self.addr);
                self.i2c.write(self.addr, &[START_CONVERT_CMD])?;
            }
            self.state = Lifecycle::Ready;
        }
        Ok(())
    }

    /// Get the configuration register of the device.
    pub fn get_configuration(&mut self) -> Ds1624Result<Configuration, I::Error> {
        let mut config = Configuration::default();
        config.read(self)?;
        Ok(config)
    }
}

/// # Configuration register
///
/// Selects the conversion mode and reports conversion progress. The
/// register is non-volatile: a write takes up to 10ms to complete, during
/// which the device must not be accessed.
#[bitfield(u8)]
#[derive(PartialEq, Eq)]
pub struct Configuration {
    /// When set, the device performs a single conversion per Start Convert
    /// command. When clear, it converts continuously.
    pub one_shot: bool,
    #[bits(6)]
    reserved: u8,
    /// Set by the device when a temperature conversion has completed,
    /// cleared while a conversion is in progress.
    pub done: bool,
}

impl Addressing for Configuration {
    const ACCESS_CMD: u8 = ACCESS_CONFIG_CMD;
}

impl Interact for Configuration {
    fn read<I: I2c<SevenBitAddress>, D: DelayNs>(
        &mut self,
        dev: &mut Ds1624<I, D>,
    ) -> Result<(), Ds1624Error<I::Error>> {
        let mut buf = [0; 1];
        dev.i2c.write_read(dev.addr, &[Self::ACCESS_CMD], &mut buf)?;
        *self = Self::from_bits(buf[0]);
        Ok(())
    }

    fn write<I: I2c<SevenBitAddress>, D: DelayNs>(
        &mut self,
        dev: &mut Ds1624<I, D>,
    ) -> Result<(), Ds1624Error<I::Error>> {
        dev.i2c
            .write(dev.addr, &[Self::ACCESS_CMD, self.into_bits()])?;
        Ok(())
    }
}
