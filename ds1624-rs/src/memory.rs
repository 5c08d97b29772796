use crate::{Ds1624, Ds1624Error, Ds1624Result};
use embedded_hal::{
    delay::DelayNs,
    i2c::{I2c, SevenBitAddress},
};

pub(crate) const ACCESS_MEMORY_CMD: u8 = 0x17;

/// Size of the EEPROM in bytes.
pub const MEMORY_SIZE: usize = 256;
/// Size of one EEPROM write page in bytes. A single block write wraps
/// around inside its page.
pub const PAGE_SIZE: usize = 8;
/// Maximum duration of the EEPROM programming cycle in milliseconds.
pub const WRITE_CYCLE_MS: u32 = 50;

pub(crate) fn check_range<E>(addr: u8, len: usize) -> Ds1624Result<(), E> {
    if addr as usize + len > MEMORY_SIZE {
        Err(Ds1624Error::OutOfRange)
    } else {
        Ok(())
    }
}

/// Splits `[addr, addr + len)` at page boundaries into `(addr, offset, len)`
/// chunks, where `offset` indexes the caller's buffer.
pub(crate) fn pages(addr: u8, len: usize) -> impl Iterator<Item = (u8, usize, usize)> {
    let mut offset = 0;
    core::iter::from_fn(move || {
        if offset >= len {
            return None;
        }
        let start = addr as usize + offset;
        let chunk = (PAGE_SIZE - start % PAGE_SIZE).min(len - offset);
        let item = (start as u8, offset, chunk);
        offset += chunk;
        Some(item)
    })
}

impl<I: I2c<SevenBitAddress>, D: DelayNs> Ds1624<I, D> {
    /// Write one byte to the EEPROM.
    ///
    /// Blocks for the programming cycle ([`WRITE_CYCLE_MS`]) after the
    /// device acknowledged the write.
    pub fn write_byte(&mut self, addr: u8, value: u8) -> Ds1624Result<(), I::Error> {
        log::trace!("DS1624 {:#04x}: write {:#04x} at {:#04x}", self.addr, value, addr);
        self.i2c
            .write(self.addr, &[ACCESS_MEMORY_CMD, addr, value])?;
        self.delay.delay_ms(WRITE_CYCLE_MS);
        Ok(())
    }

    /// Write `data` to the EEPROM in a single bus transfer starting at `addr`.
    ///
    /// The device only latches up to [`PAGE_SIZE`] bytes per transfer and
    /// wraps around inside the page; use [`write_memory`](Ds1624::write_memory)
    /// for data crossing page boundaries. Blocks once for the programming
    /// cycle. Returns the number of bytes written.
    pub fn write_block(&mut self, addr: u8, data: &[u8]) -> Ds1624Result<usize, I::Error> {
        check_range::<I::Error>(addr, data.len())?;
        if data.is_empty() {
            return Ok(0);
        }
        log::trace!(
            "DS1624 {:#04x}: write {} bytes at {:#04x}",
            self.addr,
            data.len(),
            addr
        );
        let mut buf = [0; MEMORY_SIZE + 2];
        buf[0] = ACCESS_MEMORY_CMD;
        buf[1] = addr;
        buf[2..2 + data.len()].copy_from_slice(data);
        self.i2c.write(self.addr, &buf[..2 + data.len()])?;
        self.delay.delay_ms(WRITE_CYCLE_MS);
        Ok(data.len())
    }

    /// Write `data` to the EEPROM starting at `addr`, split into one block
    /// write per page.
    pub fn write_memory(&mut self, addr: u8, data: &[u8]) -> Ds1624Result<usize, I::Error> {
        check_range::<I::Error>(addr, data.len())?;
        let mut written = 0;
        for (start, offset, len) in pages(addr, data.len()) {
            written += self.write_block(start, &data[offset..offset + len])?;
        }
        Ok(written)
    }

    /// Read one byte from the EEPROM.
    pub fn read_byte(&mut self, addr: u8) -> Ds1624Result<u8, I::Error> {
        let mut buf = [0; 1];
        self.read_block(addr, &mut buf)?;
        Ok(buf[0])
    }

    /// Fill `buf` with EEPROM contents starting at `addr`.
    ///
    /// Returns the number of bytes read. On error
    /// [`last_read_valid`](Ds1624::last_read_valid) is `false` and the
    /// contents of `buf` are unspecified.
    pub fn read_block(&mut self, addr: u8, buf: &mut [u8]) -> Ds1624Result<usize, I::Error> {
        self.last_read_valid = false;
        check_range::<I::Error>(addr, buf.len())?;
        if buf.is_empty() {
            self.last_read_valid = true;
            return Ok(0);
        }
        if self.stale_read_workaround {
            // first read after addressing may return stale data
            self.i2c
                .write_read(self.addr, &[ACCESS_MEMORY_CMD, addr], buf)?;
        }
        self.i2c
            .write_read(self.addr, &[ACCESS_MEMORY_CMD, addr], buf)?;
        log::trace!(
            "DS1624 {:#04x}: read {} bytes at {:#04x}",
            self.addr,
            buf.len(),
            addr
        );
        self.last_read_valid = true;
        Ok(buf.len())
    }
}
