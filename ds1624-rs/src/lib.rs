#![cfg_attr(not(test), no_std)]
#![deny(missing_docs)]

/*! # DS1624
 *
 * Driver for the Maxim DS1624 digital thermometer with 256 bytes of
 * on-board EEPROM, built on the [`embedded-hal`](embedded_hal) I2C and
 * delay traits.
 *
 * The device handle is lazy: building it performs no bus traffic. The
 * first temperature read (or an explicit [`Ds1624::init`]) writes the
 * configuration register, waits for the non-volatile write to settle and,
 * in continuous mode, starts the conversion engine. EEPROM accesses do not
 * need the configuration step.
 *
 * All protocol loops that wait on the device are bounded by a retry count
 * unless explicitly disabled with [`Ds1624Builder::with_retries`]`(None)`,
 * in which case a device that never finishes a conversion blocks forever.
 */

mod dump;
mod error;
mod memory;
mod memory_async;
mod registers;
mod registers_async;
mod temperature;
mod temperature_async;
mod traits;
mod traits_async;

pub use dump::{DumpFormat, DumpRange};
pub use error::Ds1624Error;
pub use memory::{MEMORY_SIZE, PAGE_SIZE, WRITE_CYCLE_MS};
pub use registers::{
    AddressPins, BusOwnership, Configuration, ConversionMode, Ds1624, Ds1624Builder, Lifecycle,
};
pub use registers_async::Ds1624Async;
pub use temperature::{Temperature, TemperatureEncoding};
pub use traits::Interact;
pub use traits_async::InteractAsync;

/// Results of DS1624-specific function calls.
pub type Ds1624Result<T, E> = Result<T, Ds1624Error<E>>;

/// Base 7-bit bus address, with all three address pins tied to ground.
pub const BASE_ADDRESS: u8 = 0x48;
