use core::ops::RangeInclusive;

use crate::{
    command::Command,
    error::{Error, Result},
    status::StatusFlags,
    types::{MemorySlot, State, Value},
};

/// Voltage range the device is rated for, in volts.
///
/// The PSU accepts setpoints up to 31.0 V but is only rated for 30.0 V.
const VOLTAGE_RANGE: RangeInclusive<f64> = 0.0..=30.0;

/// Current range the device is rated for, in amps.
///
/// The PSU accepts setpoints up to 5.1 A but is only rated for 5.0 A.
const CURRENT_RANGE: RangeInclusive<f64> = 0.0..=5.0;

/// Some firmware revisions append a spurious sixth byte to the `ISET1?`
/// reply. The workaround is keyed on these exact command bytes.
const CURRENT_SETPOINT_QUERY: &[u8] = b"ISET1?";

/// Total attempts for a protection-flag status query before giving up.
const STATUS_ATTEMPTS: usize = 3;

/// You can create a KoradPsu using any interface which implements
/// [embedded_io::Read] & [embedded_io::Write].
///
/// The interface's read timeout doubles as the end-of-reply marker: the
/// protocol has no terminators, so a reply is complete once a read attempt
/// comes back empty. A timeout around 50 ms works well at 9600 baud.
///
/// For its methods we use the nomenclature that "set" means to write a
/// configuration and "get" means to read back a configuration value, whereas
/// "read" means to get a measured value.
///
/// Construction performs one `*IDN?` transaction and caches the result for
/// the lifetime of the connection. If that transaction fails, the interface
/// is dropped (and with it the port closed) before the error is returned.
pub struct KoradPsu<S: embedded_io::Read + embedded_io::Write, const L: usize = 64> {
    interface: S,
    /// Identification string captured at construction, never re-queried.
    identity: heapless::String<L>,
}

impl<S: embedded_io::Read + embedded_io::Write, const L: usize> KoradPsu<S, L> {
    /// Connect to the PSU over the given interface.
    pub fn new(interface: S) -> Result<Self, S::Error> {
        let mut psu = Self {
            interface,
            identity: heapless::String::new(),
        };
        let raw = psu.transact_command(Command::Identification)?;
        let text = core::str::from_utf8(&raw).map_err(Error::Utf8Error)?;
        psu.identity.push_str(text).map_err(|_| Error::BufferError)?;
        Ok(psu)
    }

    /// Return the device identification string cached at construction.
    pub fn identification(&self) -> &str {
        &self.identity
    }

    /// Set the maximum output voltage. (0.0 - 30.0) V
    pub fn set_voltage(&mut self, volts: f64) -> Result<(), S::Error> {
        if !VOLTAGE_RANGE.contains(&volts) {
            return Err(Error::InvalidRange);
        }
        self.execute(Command::SetVoltage(volts))?;
        Ok(())
    }

    /// Get the requested output voltage. (0.0 - 31.0) V
    pub fn get_voltage_setpoint(&mut self) -> Result<f64, S::Error> {
        self.query_number(Command::GetVoltageSetpoint)
    }

    /// Read the actual output voltage. (0.0 - 31.0) V
    pub fn read_voltage(&mut self) -> Result<f64, S::Error> {
        self.query_number(Command::ReadVoltage)
    }

    /// Set the maximum output current. (0.0 - 5.0) A
    pub fn set_current(&mut self, amps: f64) -> Result<(), S::Error> {
        if !CURRENT_RANGE.contains(&amps) {
            return Err(Error::InvalidRange);
        }
        self.execute(Command::SetCurrent(amps))?;
        Ok(())
    }

    /// Get the requested output current. (0.0 - 5.1) A
    pub fn get_current_setpoint(&mut self) -> Result<f64, S::Error> {
        self.query_number(Command::GetCurrentSetpoint)
    }

    /// Read the actual output current. (0.0 - 5.1) A
    pub fn read_current(&mut self) -> Result<f64, S::Error> {
        self.query_number(Command::ReadCurrent)
    }

    /// Recall voltage and current limits from a memory slot.
    pub fn recall_preset(&mut self, slot: MemorySlot) -> Result<(), S::Error> {
        self.execute(Command::Recall(slot))?;
        Ok(())
    }

    /// Save the current voltage and current limits to a memory slot.
    pub fn save_preset(&mut self, slot: MemorySlot) -> Result<(), S::Error> {
        self.execute(Command::Save(slot))?;
        Ok(())
    }

    /// Enable/disable the power output.
    pub fn set_output(&mut self, state: impl Into<State>) -> Result<(), S::Error> {
        self.execute(Command::SetOutput(state.into()))?;
        Ok(())
    }

    /// Enable/disable the over voltage protection. The PSU will switch off
    /// the output when the voltage rises above the requested voltage.
    pub fn set_over_voltage_protection(&mut self, state: impl Into<State>) -> Result<(), S::Error> {
        self.execute(Command::SetOverVoltageProtection(state.into()))?;
        Ok(())
    }

    /// Enable/disable the over current protection. The PSU will switch off
    /// the output when the current rises above the requested current.
    pub fn set_over_current_protection(&mut self, state: impl Into<State>) -> Result<(), S::Error> {
        self.execute(Command::SetOverCurrentProtection(state.into()))?;
        Ok(())
    }

    /// Check if the power output is enabled.
    ///
    /// Unlike the protection queries this reads the status byte exactly once
    /// and a malformed (empty) reply is an error, not `false`.
    pub fn is_output_enabled(&mut self) -> Result<bool, S::Error> {
        let raw = self.transact_command(Command::Status)?;
        let byte = raw.first().copied().ok_or(Error::InvalidResponse)?;
        Ok(StatusFlags::from_bytes([byte]).output_enabled())
    }

    /// Check if over voltage protection is enabled.
    pub fn is_over_voltage_protection_enabled(&mut self) -> Result<bool, S::Error> {
        self.protection_flag(|flags| flags.over_voltage_protection())
    }

    /// Check if over current protection is enabled.
    pub fn is_over_current_protection_enabled(&mut self) -> Result<bool, S::Error> {
        self.protection_flag(|flags| flags.over_current_protection())
    }

    /// Execute a command and decode the reply.
    pub fn execute(&mut self, command: Command) -> Result<Value<L>, S::Error> {
        let raw = self.transact_command(command)?;
        Ok(Value::decode(&raw)?)
    }

    /// Execute a numeric query; a textual reply is a protocol violation.
    fn query_number(&mut self, command: Command) -> Result<f64, S::Error> {
        match self.execute(command)? {
            Value::Number(value) => Ok(value),
            Value::Text(_) => Err(Error::InvalidResponse),
        }
    }

    /// Query the status byte with bounded retry, defaulting to disabled.
    ///
    /// A status reply must be exactly one byte; anything else is treated as
    /// serial noise and the query is reissued, three attempts total. All
    /// attempts malformed means the flag reads as `false`, not an error.
    fn protection_flag(&mut self, flag: fn(StatusFlags) -> bool) -> Result<bool, S::Error> {
        for _ in 0..STATUS_ATTEMPTS {
            let raw = self.transact_command(Command::Status)?;
            if raw.len() == 1 {
                return Ok(flag(StatusFlags::from_bytes([raw[0]])));
            }
        }
        Ok(false)
    }

    fn transact_command(&mut self, command: Command) -> Result<heapless::Vec<u8, L>, S::Error> {
        let encoded = command.encode().map_err(|_| Error::BufferError)?;
        self.transact(encoded.as_bytes())
    }

    /// One full write-then-drain transaction.
    ///
    /// The command is written in a single operation, then the reply is
    /// accumulated chunk by chunk until a read attempt comes back empty
    /// (the interface's timeout elapsed with no data). Transport faults
    /// propagate untouched; there are no write retries.
    fn transact(&mut self, command: &[u8]) -> Result<heapless::Vec<u8, L>, S::Error> {
        self.interface
            .write_all(command)
            .map_err(Error::SerialError)?;

        let mut response: heapless::Vec<u8, L> = heapless::Vec::new();
        let mut chunk = [0u8; 16];
        loop {
            match self.interface.read(&mut chunk) {
                Ok(0) => break,
                Ok(bytes_read) => {
                    if response.extend_from_slice(&chunk[..bytes_read]).is_err() {
                        return Err(Error::BufferError);
                    }
                }
                Err(e) => {
                    // A timed-out read means the device has finished talking.
                    if matches!(
                        embedded_io::Error::kind(&e),
                        embedded_io::ErrorKind::TimedOut | embedded_io::ErrorKind::Other
                    ) {
                        break;
                    }
                    return Err(Error::SerialError(e));
                }
            }
        }

        // Firmware bug workaround: ISET1? sometimes answers with an extra
        // sixth byte. Scope is exactly this command and this length; do not
        // widen it.
        if command == CURRENT_SETPOINT_QUERY && response.len() == 6 {
            response.truncate(5);
        }

        Ok(response)
    }
}

impl<S: embedded_io::Read + embedded_io::Write, const L: usize> core::fmt::Display
    for KoradPsu<S, L>
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "<PowerSupply> {}", self.identity)
    }
}
