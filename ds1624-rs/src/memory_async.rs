use crate::{
    DumpFormat, DumpRange, Ds1624Async, Ds1624Result, MEMORY_SIZE, WRITE_CYCLE_MS,
    dump::DumpWriter,
    memory::{ACCESS_MEMORY_CMD, check_range, pages},
};
use core::fmt::Write;
use embedded_hal_async::{
    delay::DelayNs,
    i2c::{I2c, SevenBitAddress},
};

impl<I: I2c<SevenBitAddress>, D: DelayNs> Ds1624Async<I, D> {
    /// Write one byte to the EEPROM, then wait out the programming cycle.
    pub async fn write_byte(&mut self, addr: u8, value: u8) -> Ds1624Result<(), I::Error> {
        log::trace!("DS1624 {:#04x}: write {:#04x} at {:#04x}", self.addr, value, addr);
        self.i2c
            .write(self.addr, &[ACCESS_MEMORY_CMD, addr, value])
            .await?;
        self.delay.delay_ms(WRITE_CYCLE_MS).await;
        Ok(())
    }

    /// Write `data` to the EEPROM in a single bus transfer.
    ///
    /// See [`Ds1624::write_block`](crate::Ds1624::write_block).
    pub async fn write_block(&mut self, addr: u8, data: &[u8]) -> Ds1624Result<usize, I::Error> {
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
        self.i2c.write(self.addr, &buf[..2 + data.len()]).await?;
        self.delay.delay_ms(WRITE_CYCLE_MS).await;
        Ok(data.len())
    }

    /// Write `data` to the EEPROM, one block write per page.
    pub async fn write_memory(&mut self, addr: u8, data: &[u8]) -> Ds1624Result<usize, I::Error> {
        check_range::<I::Error>(addr, data.len())?;
        let mut written = 0;
        for (start, offset, len) in pages(addr, data.len()) {
            written += self.write_block(start, &data[offset..offset + len]).await?;
        }
        Ok(written)
    }

    /// Read one byte from the EEPROM.
    pub async fn read_byte(&mut self, addr: u8) -> Ds1624Result<u8, I::Error> {
        let mut buf = [0; 1];
        self.read_block(addr, &mut buf).await?;
        Ok(buf[0])
    }

    /// Fill `buf` with EEPROM contents starting at `addr`.
    pub async fn read_block(&mut self, addr: u8, buf: &mut [u8]) -> Ds1624Result<usize, I::Error> {
        self.last_read_valid = false;
        check_range::<I::Error>(addr, buf.len())?;
        if buf.is_empty() {
            self.last_read_valid = true;
            return Ok(0);
        }
        if self.stale_read_workaround {
            self.i2c
                .write_read(self.addr, &[ACCESS_MEMORY_CMD, addr], buf)
                .await?;
        }
        self.i2c
            .write_read(self.addr, &[ACCESS_MEMORY_CMD, addr], buf)
            .await?;
        log::trace!(
            "DS1624 {:#04x}: read {} bytes at {:#04x}",
            self.addr,
            buf.len(),
            addr
        );
        self.last_read_valid = true;
        Ok(buf.len())
    }

    /// Print EEPROM contents to `out`, reading one byte at a time.
    pub async fn dump<W: Write>(
        &mut self,
        range: DumpRange,
        format: DumpFormat,
        out: &mut W,
    ) -> Ds1624Result<usize, I::Error> {
        let mut writer = DumpWriter::new(out, format);
        for addr in range.addresses() {
            let byte = self.read_byte(addr).await?;
            writer.push::<I::Error>(byte)?;
        }
        writer.finish()
    }
}
