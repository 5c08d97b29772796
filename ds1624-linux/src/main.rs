use clap::{Parser, Subcommand};
use ds1624::{
    AddressPins, BusOwnership, ConversionMode, DumpFormat, DumpRange, Ds1624Builder,
    TemperatureEncoding,
};
use embedded_hal::delay::DelayNs;
use fixed::types::I12F4;

/// Read the temperature and EEPROM of a DS1624 on a Linux I2C bus
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to I2C bus (e.g., /dev/i2c-1)
    #[arg(short, long)]
    path: String,
    /// Address pin strapping as three bits a2a1a0 (e.g., 101)
    #[arg(long, default_value = "000", value_parser = parse_pins)]
    pins: AddressPins,
    /// Trigger a conversion on every read instead of converting continuously
    #[arg(long)]
    one_shot: bool,
    /// The device is already configured; never write its configuration
    #[arg(long)]
    external: bool,
    /// Decode negative temperatures with the legacy byte-wise negation
    #[arg(long)]
    bytewise: bool,
    /// Skip the throwaway read before EEPROM reads
    #[arg(long)]
    no_workaround: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Read the temperature
    Temp {
        /// Number of readings
        #[arg(short, long, default_value_t = 1)]
        count: u32,
        /// Pause between readings in milliseconds
        #[arg(short, long, default_value_t = 1000)]
        interval_ms: u32,
    },
    /// Read bytes from the EEPROM
    Read {
        /// Start address
        #[arg(value_parser = parse_byte)]
        addr: u8,
        /// Number of bytes
        #[arg(default_value_t = 1)]
        len: usize,
    },
    /// Write bytes to the EEPROM
    Write {
        /// Start address
        #[arg(value_parser = parse_byte)]
        addr: u8,
        /// Bytes to write
        #[arg(required = true, value_parser = parse_byte)]
        data: Vec<u8>,
    },
    /// Print the EEPROM contents
    Dump {
        /// Start address; negative dumps the whole memory
        #[arg(short, long, default_value_t = -1, allow_negative_numbers = true)]
        start: i16,
        /// Number of bytes from the start address
        #[arg(short, long, default_value_t = 16)]
        len: u8,
        /// Print hexadecimal instead of printable characters
        #[arg(long)]
        hex: bool,
    },
}

fn parse_pins(s: &str) -> Result<AddressPins, String> {
    let bits = u8::from_str_radix(s, 2).map_err(|e| e.to_string())?;
    if s.len() != 3 {
        return Err("expected three bits a2a1a0".into());
    }
    Ok(AddressPins::from_bits(bits))
}

fn parse_byte(s: &str) -> Result<u8, String> {
    let parsed = match s.strip_prefix("0x") {
        Some(hex) => u8::from_str_radix(hex, 16),
        None => s.parse(),
    };
    parsed.map_err(|e| e.to_string())
}

fn main() {
    // Initialize the logger
    env_logger::init();
    // Parse command line arguments
    let args = Args::parse();
    // Open the I2C bus
    let i2c = linux_embedded_hal::I2cdev::new(&args.path).expect("Failed to open I2C device");
    let delay = linux_embedded_hal::Delay;
    let mut ds1624 = Ds1624Builder::default()
        .with_address_pins(args.pins)
        .with_mode(if args.one_shot {
            ConversionMode::OneShot
        } else {
            ConversionMode::Continuous
        })
        .with_bus_ownership(if args.external {
            BusOwnership::External
        } else {
            BusOwnership::Driver
        })
        .with_encoding(if args.bytewise {
            TemperatureEncoding::BytewiseNegation
        } else {
            TemperatureEncoding::TwosComplement
        })
        .with_stale_read_workaround(!args.no_workaround)
        .build(i2c, delay);
    log::info!("Using DS1624 at {:#04x}", ds1624.address());

    match args.command {
        Command::Temp { count, interval_ms } => {
            let mut delay = linux_embedded_hal::Delay;
            for i in 0..count {
                if i > 0 {
                    delay.delay_ms(interval_ms);
                }
                let reading: Result<I12F4, _> = ds1624.read_temperature_fixed();
                match reading {
                    Ok(temp) => println!("{} °C", temp),
                    Err(e) => log::error!("Temperature read failed: {:?}", e),
                }
            }
        }
        Command::Read { addr, len } => {
            let mut buf = vec![0; len];
            let read = ds1624
                .read_block(addr, &mut buf)
                .expect("Failed to read EEPROM");
            for (i, b) in buf[..read].iter().enumerate() {
                println!("{:#04x}: {:#04x}", addr as usize + i, b);
            }
        }
        Command::Write { addr, data } => {
            let written = ds1624
                .write_memory(addr, &data)
                .expect("Failed to write EEPROM");
            log::info!("Wrote {} bytes at {:#04x}", written, addr);
        }
        Command::Dump { start, len, hex } => {
            let format = if hex { DumpFormat::Hex } else { DumpFormat::Printable };
            let mut out = String::new();
            let visited = ds1624
                .dump(DumpRange::from_start(start, len), format, &mut out)
                .expect("Failed to dump EEPROM");
            print!("{}", out);
            if format == DumpFormat::Printable {
                println!();
            }
            log::info!("Dumped {} bytes", visited);
        }
    }
}
