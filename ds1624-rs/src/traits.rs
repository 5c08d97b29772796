use crate::{Ds1624, Ds1624Error};
use embedded_hal::{
    delay::DelayNs,
    i2c::{I2c, SevenBitAddress},
};

/// Command bytes used to reach a register of the DS1624.
pub trait Addressing {
    /// Command byte that selects the register for both reads and writes.
    const ACCESS_CMD: u8;
}

/// Trait for interacting with the registers of the DS1624.
pub trait Interact: Addressing {
    /// Read the register value from the DS1624.
    fn read<I: I2c<SevenBitAddress>, D: DelayNs>(
        &mut self,
        dev: &mut Ds1624<I, D>,
    ) -> Result<(), Ds1624Error<I::Error>>;
    /// Write the register value to the DS1624.
    fn write<I: I2c<SevenBitAddress>, D: DelayNs>(
        &mut self,
        dev: &mut Ds1624<I, D>,
    ) -> Result<(), Ds1624Error<I::Error>>;
}
