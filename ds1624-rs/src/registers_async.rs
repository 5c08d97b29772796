use crate::{
    Configuration, ConversionMode, Ds1624Builder, Ds1624Error, Ds1624Result, Lifecycle,
    TemperatureEncoding,
    registers::CONFIG_SETTLE_MS,
    temperature::START_CONVERT_CMD,
    traits::Addressing,
    traits_async::InteractAsync,
};
use embedded_hal_async::{
    delay::DelayNs,
    i2c::{I2c, SevenBitAddress},
};

/// A DS1624 thermometer and EEPROM.
///
/// Takes ownership of an I2C bus (implementing [`I2c`](embedded_hal_async::i2c::I2c) trait)
/// and a timer object implementing the [`DelayNs`](embedded_hal_async::delay::DelayNs) trait.
pub struct Ds1624Async<I, D> {
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

impl Ds1624Builder {
    /// Builds a new [`Ds1624Async`] instance with the specified configuration.
    pub fn build_async<I: I2c<SevenBitAddress>, D: DelayNs>(
        self,
        i2c: I,
        delay: D,
    ) -> Ds1624Async<I, D> {
        Ds1624Async {
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

impl<I: I2c<SevenBitAddress>, D: DelayNs> Ds1624Async<I, D> {
    /// Creates a new instance of [`Ds1624Async`] with all address pins
    /// grounded, in continuous conversion mode.
    pub fn new(i2c: I, delay: D) -> Self {
        Ds1624Builder::default().build_async(i2c, delay)
    }
}

impl<I, D> Ds1624Async<I, D> {
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

    /// Whether the most recent read received every expected byte.
    pub fn last_read_valid(&self) -> bool {
        self.last_read_valid
    }

    /// Destroys the driver and hands back the bus and the delay.
    pub fn release(self) -> (I, D) {
        (self.i2c, self.delay)
    }
}

impl<I: I2c<SevenBitAddress>, D: DelayNs> Ds1624Async<I, D> {
    /// Brings the device to [`Lifecycle::Ready`].
    ///
    /// See [`Ds1624::init`](crate::Ds1624::init).
    pub async fn init(&mut self) -> Ds1624Result<(), I::Error> {
        if self.state == Lifecycle::Unconfigured {
            log::debug!(
                "DS1624 {:#04x}: configuring for {:?} conversion",
                self.addr,
                self.mode
            );
            Configuration::new()
                .with_one_shot(self.mode == ConversionMode::OneShot)
                .async_write(self)
                .await?;
            self.delay.delay_ms(CONFIG_SETTLE_MS).await;
            self.state = Lifecycle::Configured;
        }
        if self.state == Lifecycle::Configured {
            if self.mode == ConversionMode::Continuous {
                log::debug!("DS1624 {:#04x}: starting continuous conversion", self.addr);
                self.i2c.write(self.addr, &[START_CONVERT_CMD]).await?;
            }
            self.state = Lifecycle::Ready;
        }
        Ok(())
    }

    /// Get the configuration register of the device.
    pub async fn get_configuration(&mut self) -> Ds1624Result<Configuration, I::Error> {
        let mut config = Configuration::default();
        config.async_read(self).await?;
        Ok(config)
    }
}

impl InteractAsync for Configuration {
    async fn async_read<I: I2c<SevenBitAddress>, D: DelayNs>(
        &mut self,
        dev: &mut Ds1624Async<I, D>,
    ) -> Result<(), Ds1624Error<I::Error>> {
        let mut buf = [0; 1];
        dev.i2c
            .write_read(dev.addr, &[Self::ACCESS_CMD], &mut buf)
            .await?;
        *self = Self::from_bits(buf[0]);
        Ok(())
    }

    async fn async_write<I: I2c<SevenBitAddress>, D: DelayNs>(
        &mut self,
        dev: &mut Ds1624Async<I, D>,
    ) -> Result<(), Ds1624Error<I::Error>> {
        dev.i2c
            .write(dev.addr, &[Self::ACCESS_CMD, self.into_bits()])
            .await?;
        Ok(())
    }
}
