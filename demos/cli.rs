//! Basic command-line control of a KORAD PSU over a real serial port.
//!
//! Run with `cargo run --example cli -- /dev/ttyACM0 --voltage 12.5 -V`.

use std::time::Duration;

use clap::Parser;
use inquire::Select;
use korad_ka3005p::psu::KoradPsu;
use korad_ka3005p::types::MemorySlot;

const BAUD_RATE: u32 = 9600;
// The reply drain relies on the port going quiet; keep the timeout short.
const READ_TIMEOUT_MS: u64 = 50;

/// Wraps a serialport handle so it satisfies the embedded-io traits the
/// driver is generic over.
pub struct PortWrapper(Box<dyn serialport::SerialPort>);

#[derive(Debug)]
pub struct IoError(std::io::Error);

impl core::fmt::Display for IoError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for IoError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.0)
    }
}

impl embedded_io::Error for IoError {
    fn kind(&self) -> embedded_io::ErrorKind {
        match self.0.kind() {
            // TimedOut is what ends a reply drain; map it faithfully.
            std::io::ErrorKind::TimedOut => embedded_io::ErrorKind::TimedOut,
            std::io::ErrorKind::NotFound => embedded_io::ErrorKind::NotFound,
            std::io::ErrorKind::PermissionDenied => embedded_io::ErrorKind::PermissionDenied,
            std::io::ErrorKind::BrokenPipe => embedded_io::ErrorKind::BrokenPipe,
            std::io::ErrorKind::InvalidData => embedded_io::ErrorKind::InvalidData,
            std::io::ErrorKind::Interrupted => embedded_io::ErrorKind::Interrupted,
            _ => embedded_io::ErrorKind::Other,
        }
    }
}

impl embedded_io::ErrorType for PortWrapper {
    type Error = IoError;
}

impl embedded_io::Read for PortWrapper {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        std::io::Read::read(&mut self.0, buf).map_err(IoError)
    }
}

impl embedded_io::Write for PortWrapper {
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        std::io::Write::write(&mut self.0, buf).map_err(IoError)
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        std::io::Write::flush(&mut self.0).map_err(IoError)
    }
}

/// Configure a KORAD bench power supply over a serial port.
#[derive(Parser)]
struct Args {
    /// Serial port to use, ex. /dev/ttyACMx. Picked interactively if omitted.
    port: Option<String>,

    /// Print the device identification string.
    #[arg(short, long)]
    identification: bool,

    /// Set the maximum output current. (0.0 - 5.0) A
    #[arg(short, long)]
    current: Option<f64>,

    /// Set the maximum output voltage. (0.0 - 30.0) V
    #[arg(short, long)]
    voltage: Option<f64>,

    /// Recall voltage and current limits from memory. (1 - 5)
    #[arg(short, long)]
    memory: Option<u8>,

    /// Print the measured output current.
    #[arg(short = 'C', long)]
    currentout: bool,

    /// Print the measured output voltage.
    #[arg(short = 'V', long)]
    voltageout: bool,

    /// Enable the power supply output.
    #[arg(short, long, conflicts_with = "disable")]
    enable: bool,

    /// Disable the power supply output.
    #[arg(short, long)]
    disable: bool,
}

fn main() {
    let args = Args::parse();

    // Get serial port from the command line or interactive selection.
    let port_name = args.port.clone().unwrap_or_else(|| {
        let ports = serialport::available_ports().expect("Failed to enumerate serial ports");

        if ports.is_empty() {
            eprintln!("No serial ports found!");
            std::process::exit(1);
        }

        let port_names: Vec<String> = ports.iter().map(|p| p.port_name.clone()).collect();

        Select::new("Select a serial port:", port_names)
            .prompt()
            .expect("Failed to select port")
    });

    let port = serialport::new(&port_name, BAUD_RATE)
        .timeout(Duration::from_millis(READ_TIMEOUT_MS))
        .open()
        .expect("Failed to open serial port");

    let mut psu: KoradPsu<PortWrapper, 64> =
        KoradPsu::new(PortWrapper(port)).expect("Failed to talk to the power supply");

    if args.identification {
        println!("{}", psu.identification());
    }

    if let Some(amps) = args.current {
        psu.set_current(amps).expect("Failed to set current");
    }

    if let Some(volts) = args.voltage {
        psu.set_voltage(volts).expect("Failed to set voltage");
    }

    if let Some(slot) = args.memory {
        let slot = MemorySlot::try_from(slot).expect("Memory slot must be 1 - 5");
        psu.recall_preset(slot).expect("Failed to recall preset");
    }

    if args.voltageout {
        println!(
            "Voltage: {} V",
            psu.read_voltage().expect("Failed to read voltage")
        );
    }

    if args.currentout {
        println!(
            "Current: {} A",
            psu.read_current().expect("Failed to read current")
        );
    }

    if args.enable {
        psu.set_output(true).expect("Failed to enable output");
    }

    if args.disable {
        psu.set_output(false).expect("Failed to disable output");
    }
}
