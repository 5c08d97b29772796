use crate::{
    Configuration, ConversionMode, Ds1624Async, Ds1624Error, Ds1624Result, InteractAsync,
    Temperature,
    temperature::{POLL_INTERVAL_MS, READ_TEMPERATURE_CMD, START_CONVERT_CMD, STOP_CONVERT_CMD},
};
use embedded_hal_async::{
    delay::DelayNs,
    i2c::{I2c, SevenBitAddress},
};

impl<I: I2c<SevenBitAddress>, D: DelayNs> Ds1624Async<I, D> {
    /// Read the temperature in degrees Celsius.
    ///
    /// See [`Ds1624::read_temperature`](crate::Ds1624::read_temperature).
    pub async fn read_temperature(&mut self) -> Ds1624Result<f32, I::Error> {
        self.read_temperature_fixed().await.map(|t| t.to_num())
    }

    /// Read the temperature in the device's native fixed-point format.
    pub async fn read_temperature_fixed(&mut self) -> Ds1624Result<Temperature, I::Error> {
        self.last_read_valid = false;
        self.init().await?;
        if self.mode == ConversionMode::OneShot {
            self.start_conversion().await?;
            self.wait_conversion().await?;
        }
        let raw = self.read_raw_temperature().await?;
        self.last_read_valid = true;
        Ok(self.encoding.decode(raw))
    }

    /// Read the two raw bytes `[msb, lsb]` of the temperature register.
    pub async fn read_raw_temperature(&mut self) -> Ds1624Result<[u8; 2], I::Error> {
        let mut raw = [0; 2];
        self.i2c
            .write_read(self.addr, &[READ_TEMPERATURE_CMD], &mut raw)
            .await?;
        log::trace!("DS1624 {:#04x}: raw temperature {:02x?}", self.addr, raw);
        Ok(raw)
    }

    /// Start a temperature conversion.
    pub async fn start_conversion(&mut self) -> Ds1624Result<(), I::Error> {
        log::trace!("DS1624 {:#04x}: start conversion", self.addr);
        self.i2c.write(self.addr, &[START_CONVERT_CMD]).await?;
        Ok(())
    }

    /// Halt continuous conversions.
    pub async fn stop_conversion(&mut self) -> Ds1624Result<(), I::Error> {
        log::debug!("DS1624 {:#04x}: stop conversion", self.addr);
        self.i2c.write(self.addr, &[STOP_CONVERT_CMD]).await?;
        Ok(())
    }

    pub(crate) async fn wait_conversion(&mut self) -> Ds1624Result<(), I::Error> {
        let mut tries: u16 = 0;
        loop {
            let mut config = Configuration::default();
            config.async_read(self).await?;
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
            self.delay.delay_ms(POLL_INTERVAL_MS).await;
        }
    }
}
