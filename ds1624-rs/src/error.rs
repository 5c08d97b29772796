#[derive(Debug, PartialEq)]
/// DS1624 driver errors
pub enum Ds1624Error<E> {
    /// I2C bus errors, including a transfer the device did not acknowledge.
    I2c(E),
    /// Busy wait retries exceeded while waiting for a conversion.
    RetriesExceeded,
    /// Requested EEPROM range does not fit in the 256-byte memory.
    OutOfRange,
    /// The output sink of a memory dump refused the data.
    Format,
}

impl<E> From<E> for Ds1624Error<E> {
    fn from(value: E) -> Self {
        Self::I2c(value)
    }
}
