#![allow(async_fn_in_trait)]
use crate::{Ds1624Async, Ds1624Error, traits::Addressing};
use embedded_hal_async::{
    delay::DelayNs,
    i2c::{I2c, SevenBitAddress},
};

/// Trait for interacting with the registers of the DS1624 asynchronously.
pub trait InteractAsync: Addressing {
    /// Read the register value from the DS1624 asynchronously.
    async fn async_read<I: I2c<SevenBitAddress>, D: DelayNs>(
        &mut self,
        dev: &mut Ds1624Async<I, D>,
    ) -> Result<(), Ds1624Error<I::Error>>;
    /// Write the register value to the DS1624 asynchronously.
    async fn async_write<I: I2c<SevenBitAddress>, D: DelayNs>(
        &mut self,
        dev: &mut Ds1624Async<I, D>,
    ) -> Result<(), Ds1624Error<I::Error>>;
}
