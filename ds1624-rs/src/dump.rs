use crate::{Ds1624, Ds1624Error, Ds1624Result, MEMORY_SIZE};
use core::fmt::Write;
use embedded_hal::{
    delay::DelayNs,
    i2c::{I2c, SevenBitAddress},
};

const HEX_LINE: usize = 16;
const PLACEHOLDER: char = '.';

/// Span of EEPROM addresses visited by a dump.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DumpRange {
    /// The whole 256-byte memory.
    All,
    /// `len` bytes from `start`, clamped at the end of the memory.
    Span {
        /// First address.
        start: u8,
        /// Number of bytes.
        len: u8,
    },
}

impl DumpRange {
    /// Build a range from a possibly negative start address. A negative
    /// start selects the whole memory and `len` is ignored.
    pub fn from_start(start: i16, len: u8) -> Self {
        match u8::try_from(start) {
            Ok(start) => Self::Span { start, len },
            Err(_) if start < 0 => Self::All,
            Err(_) => Self::Span { start: u8::MAX, len: 0 },
        }
    }

    /// Addresses visited, in order.
    pub fn addresses(self) -> impl Iterator<Item = u8> {
        let (start, end) = match self {
            Self::All => (0, MEMORY_SIZE),
            Self::Span { start, len } => (
                start as usize,
                (start as usize + len as usize).min(MEMORY_SIZE),
            ),
        };
        (start..end).map(|a| a as u8)
    }
}

/// Presentation of dumped bytes.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum DumpFormat {
    /// Printable ASCII characters as-is, anything else as `.`.
    #[default]
    Printable,
    /// Two hexadecimal digits per byte, separated by spaces, 16 bytes per
    /// line. Every line ends in a newline and carries no trailing space.
    Hex,
}

/// Incremental writer shared by the blocking and async dumps.
pub(crate) struct DumpWriter<'a, W> {
    out: &'a mut W,
    format: DumpFormat,
    count: usize,
}

impl<'a, W: Write> DumpWriter<'a, W> {
    pub(crate) fn new(out: &'a mut W, format: DumpFormat) -> Self {
        Self { out, format, count: 0 }
    }

    pub(crate) fn push<E>(&mut self, byte: u8) -> Ds1624Result<(), E> {
        let res = match self.format {
            DumpFormat::Printable => {
                let c = if byte == b' ' || byte.is_ascii_graphic() {
                    byte as char
                } else {
                    PLACEHOLDER
                };
                self.out.write_char(c)
            }
            DumpFormat::Hex => match self.count {
                0 => write!(self.out, "{:02x}", byte),
                n if n % HEX_LINE == 0 => write!(self.out, "\n{:02x}", byte),
                _ => write!(self.out, " {:02x}", byte),
            },
        };
        res.map_err(|_| Ds1624Error::Format)?;
        self.count += 1;
        Ok(())
    }

    /// Terminates the last hex line.
    pub(crate) fn finish<E>(self) -> Ds1624Result<usize, E> {
        if self.format == DumpFormat::Hex && self.count > 0 {
            self.out.write_char('\n').map_err(|_| Ds1624Error::Format)?;
        }
        Ok(self.count)
    }
}

impl<I: I2c<SevenBitAddress>, D: DelayNs> Ds1624<I, D> {
    /// Print EEPROM contents to `out`, reading one byte at a time.
    ///
    /// Returns the number of addresses visited. Stops at the first byte
    /// that cannot be read.
    pub fn dump<W: Write>(
        &mut self,
        range: DumpRange,
        format: DumpFormat,
        out: &mut W,
    ) -> Ds1624Result<usize, I::Error> {
        let mut writer = DumpWriter::new(out, format);
        for addr in range.addresses() {
            let byte = self.read_byte(addr)?;
            writer.push::<I::Error>(byte)?;
        }
        writer.finish()
    }
}
