use ds1624::{
    AddressPins, BusOwnership, ConversionMode, DumpFormat, DumpRange, Ds1624, Ds1624Builder,
    Ds1624Error, Lifecycle, MEMORY_SIZE, PAGE_SIZE, TemperatureEncoding,
};
use embedded_hal::{
    delay::DelayNs,
    i2c::{ErrorKind, ErrorType, I2c, NoAcknowledgeSource, Operation},
};
use rand::Rng;

struct NoDelay;

impl DelayNs for NoDelay {
    fn delay_ns(&mut self, _ns: u32) {}
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Target {
    None,
    Memory,
    Config,
    Temperature,
}

/// Register-level model of a DS1624 on the bus.
struct SimulatedDs1624 {
    address: u8,
    memory: [u8; MEMORY_SIZE],
    pointer: u8,
    target: Target,
    config: u8,
    temperature: [u8; 2],
    conversion_polls: u32,
    polls_left: u32,
    page_wrap: bool,
    stale_first_read: bool,
    fresh_address: bool,
    last_read: u8,
    config_writes: usize,
    conversions_started: usize,
}

impl SimulatedDs1624 {
    fn new(address: u8) -> Self {
        Self {
            address,
            memory: [0xff; MEMORY_SIZE],
            pointer: 0,
            target: Target::None,
            config: 0,
            temperature: [0x19, 0x00],
            conversion_polls: 0,
            polls_left: 0,
            page_wrap: false,
            stale_first_read: false,
            fresh_address: false,
            last_read: 0,
            config_writes: 0,
            conversions_started: 0,
        }
    }

    fn command(&mut self, bytes: &[u8]) -> Result<(), ErrorKind> {
        match bytes {
            [0x17, addr, data @ ..] => {
                self.target = Target::Memory;
                self.pointer = *addr;
                self.fresh_address = true;
                for (i, &b) in data.iter().enumerate() {
                    let offset = addr.wrapping_add(i as u8);
                    let cell = if self.page_wrap {
                        (addr & !(PAGE_SIZE as u8 - 1)) | (offset & (PAGE_SIZE as u8 - 1))
                    } else {
                        offset
                    };
                    self.memory[cell as usize] = b;
                }
            }
            [0xac] => self.target = Target::Config,
            [0xac, value] => {
                self.config = (self.config & 0x80) | (value & 0x01);
                self.config_writes += 1;
            }
            [0xee] => {
                self.conversions_started += 1;
                self.polls_left = self.conversion_polls;
                self.config &= 0x7f;
            }
            [0x22] => {}
            [0xaa] => self.target = Target::Temperature,
            _ => return Err(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Data)),
        }
        Ok(())
    }

    fn respond(&mut self, buf: &mut [u8]) -> Result<(), ErrorKind> {
        match self.target {
            Target::Memory => {
                // the quirky revision serves the first read after addressing
                // from the previously read location
                let mut cell = if self.stale_first_read && self.fresh_address {
                    self.last_read
                } else {
                    self.pointer
                };
                self.fresh_address = false;
                self.last_read = self.pointer;
                for b in buf.iter_mut() {
                    *b = self.memory[cell as usize];
                    cell = cell.wrapping_add(1);
                }
            }
            Target::Config => {
                if self.polls_left == 0 {
                    self.config |= 0x80;
                } else {
                    self.polls_left -= 1;
                }
                buf.fill(self.config);
            }
            Target::Temperature if buf.len() <= 2 => {
                buf.copy_from_slice(&self.temperature[..buf.len()]);
            }
            _ => return Err(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Data)),
        }
        Ok(())
    }
}

impl ErrorType for SimulatedDs1624 {
    type Error = ErrorKind;
}

impl I2c for SimulatedDs1624 {
    fn transaction(
        &mut self,
        address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        if address != self.address {
            return Err(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address));
        }
        for op in operations.iter_mut() {
            match op {
                Operation::Write(bytes) => self.command(bytes)?,
                Operation::Read(buf) => self.respond(buf)?,
            }
        }
        Ok(())
    }
}

#[test]
fn only_strapped_address_responds() {
    let mut sim = SimulatedDs1624::new(0x4b);
    for bits in 0..8u8 {
        let pins = AddressPins::from_bits(bits);
        let mut dev = Ds1624Builder::default()
            .with_address_pins(pins)
            .build(&mut sim, NoDelay);
        let res = dev.read_byte(0x00);
        if pins.address() == 0x4b {
            assert_eq!(res, Ok(0xff));
            assert!(dev.last_read_valid());
        } else {
            assert_eq!(
                res,
                Err(Ds1624Error::I2c(ErrorKind::NoAcknowledge(
                    NoAcknowledgeSource::Address
                )))
            );
            assert!(!dev.last_read_valid());
        }
    }
}

#[test]
fn byte_write_reads_back_everywhere() {
    let mut dev = Ds1624::new(SimulatedDs1624::new(0x48), NoDelay);
    for addr in 0..=255u8 {
        for value in 0..=255u8 {
            dev.write_byte(addr, value).unwrap();
            assert_eq!(dev.read_byte(addr), Ok(value), "address {addr:#04x}");
            assert!(dev.last_read_valid());
        }
    }
}

#[test]
fn block_write_reads_back() {
    let mut rng = rand::rng();
    let mut dev = Ds1624::new(SimulatedDs1624::new(0x48), NoDelay);
    for _ in 0..64 {
        let addr: u8 = rng.random();
        let len = rng.random_range(1..=MEMORY_SIZE - addr as usize);
        let mut data = vec![0; len];
        rng.fill(&mut data[..]);
        assert_eq!(dev.write_block(addr, &data), Ok(len));
        let mut back = vec![0; len];
        assert_eq!(dev.read_block(addr, &mut back), Ok(len));
        assert_eq!(back, data);
    }
}

#[test]
fn paged_writes_survive_page_wrap() {
    let mut sim = SimulatedDs1624::new(0x48);
    sim.page_wrap = true;
    let mut dev = Ds1624::new(sim, NoDelay);
    let data: Vec<u8> = (0..20).collect();

    assert_eq!(dev.write_memory(0x05, &data), Ok(20));
    let mut back = [0; 20];
    dev.read_block(0x05, &mut back).unwrap();
    assert_eq!(&back[..], &data[..]);

    // a single block crossing a page boundary wraps inside the first page
    dev.write_block(0x46, &[1, 2, 3, 4]).unwrap();
    let mut page = [0; PAGE_SIZE];
    dev.read_block(0x40, &mut page).unwrap();
    assert_eq!(page, [3, 4, 0xff, 0xff, 0xff, 0xff, 1, 2]);
}

#[test]
fn stale_read_workaround() {
    let mut sim = SimulatedDs1624::new(0x48);
    sim.stale_first_read = true;
    sim.memory[0x10] = 0x42;
    sim.memory[0x20] = 0x24;

    let mut dev = Ds1624::new(&mut sim, NoDelay);
    assert_eq!(dev.read_byte(0x10), Ok(0x42));
    assert_eq!(dev.read_byte(0x20), Ok(0x24));

    let mut dev = Ds1624Builder::default()
        .with_stale_read_workaround(false)
        .build(&mut sim, NoDelay);
    assert_eq!(dev.read_byte(0x10), Ok(0x24));
}

#[test]
fn dump_all_ignores_length() {
    let mut sim = SimulatedDs1624::new(0x48);
    sim.memory[..5].copy_from_slice(b"hello");
    let mut dev = Ds1624::new(sim, NoDelay);

    let mut out = String::new();
    let range = DumpRange::from_start(-1, 4);
    assert_eq!(dev.dump(range, DumpFormat::Printable, &mut out), Ok(256));
    assert_eq!(out.len(), 256);
    assert!(out.starts_with("hello..."));

    let mut out = String::new();
    assert_eq!(dev.dump(DumpRange::All, DumpFormat::Hex, &mut out), Ok(256));
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines.len(), 16);
    assert_eq!(lines[0], "68 65 6c 6c 6f ff ff ff ff ff ff ff ff ff ff ff");
}

#[test]
fn continuous_mode_configures_once() {
    let mut sim = SimulatedDs1624::new(0x48);
    sim.temperature = [0xe6, 0x80];
    let mut dev = Ds1624::new(&mut sim, NoDelay);
    for _ in 0..5 {
        assert_eq!(dev.read_temperature(), Ok(-25.5));
        assert!(dev.last_read_valid());
    }
    assert_eq!(dev.lifecycle(), Lifecycle::Ready);
    drop(dev);
    assert_eq!(sim.config_writes, 1);
    assert_eq!(sim.conversions_started, 1);
    assert_eq!(sim.config & 0x01, 0);
}

#[test]
fn one_shot_mode_triggers_each_read() {
    let mut sim = SimulatedDs1624::new(0x48);
    sim.conversion_polls = 3;
    sim.temperature = [0x7d, 0x00];
    let mut dev = Ds1624Builder::default()
        .with_mode(ConversionMode::OneShot)
        .build(&mut sim, NoDelay);
    assert_eq!(dev.read_temperature(), Ok(125.0));
    assert_eq!(dev.read_temperature(), Ok(125.0));
    drop(dev);
    assert_eq!(sim.config_writes, 1);
    assert_eq!(sim.conversions_started, 2);
    assert_eq!(sim.config & 0x01, 1);
}

#[test]
fn unresponsive_conversion_times_out() {
    let mut sim = SimulatedDs1624::new(0x48);
    sim.conversion_polls = u32::MAX;
    let mut dev = Ds1624Builder::default()
        .with_mode(ConversionMode::OneShot)
        .with_bus_ownership(BusOwnership::External)
        .with_retries(Some(50))
        .build(&mut sim, NoDelay);
    assert_eq!(dev.read_temperature(), Err(Ds1624Error::RetriesExceeded));
    assert!(!dev.last_read_valid());
}

#[test]
fn legacy_decoding_is_selectable() {
    let mut sim = SimulatedDs1624::new(0x48);
    sim.temperature = [0xff, 0x00];
    let mut dev = Ds1624Builder::default()
        .with_encoding(TemperatureEncoding::BytewiseNegation)
        .build(&mut sim, NoDelay);
    assert_eq!(dev.read_temperature(), Ok(1.0));

    let mut dev = Ds1624Builder::default()
        .with_bus_ownership(BusOwnership::External)
        .build(&mut sim, NoDelay);
    assert_eq!(dev.read_temperature(), Ok(-1.0));
}
