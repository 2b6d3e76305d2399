//! We use this mocking module in unit tests to emulate a serial port.

use std::collections::VecDeque;

/// One scripted step of the mock's read side.
enum ReadStep {
    /// Bytes waiting on the line.
    Chunk(Vec<u8>),
    /// The read timeout elapsing with nothing available.
    Idle,
}

/// Our mock type used to emulate a half-duplex serial port with a read
/// timeout.
///
/// Reads follow a script: each queued reply is delivered in the configured
/// chunks and is terminated by an idle read, which is how a real port with a
/// timeout signals that the device has stopped talking. Writes are captured
/// per call so tests can assert on the exact frames and their count.
pub struct MockSerial {
    script: VecDeque<ReadStep>,
    writes: Vec<Vec<u8>>,
    fail_writes: bool,
    fail_reads: bool,
}

#[derive(Debug)]
pub enum MockSerialError {
    /// No data arrived within the simulated timeout window.
    TimedOut,
    /// Simulated hard transport fault.
    Broken,
}

impl core::fmt::Display for MockSerialError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            MockSerialError::TimedOut => write!(f, "timed out"),
            MockSerialError::Broken => write!(f, "broken"),
        }
    }
}

impl core::error::Error for MockSerialError {}

impl embedded_io::Error for MockSerialError {
    fn kind(&self) -> embedded_io::ErrorKind {
        match self {
            MockSerialError::TimedOut => embedded_io::ErrorKind::TimedOut,
            MockSerialError::Broken => embedded_io::ErrorKind::BrokenPipe,
        }
    }
}

impl embedded_io::ErrorType for MockSerial {
    type Error = MockSerialError;
}

impl embedded_io::Write for MockSerial {
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        if self.fail_writes {
            return Err(MockSerialError::Broken);
        }
        self.writes.push(buf.to_vec());
        Ok(buf.len())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        if self.fail_writes {
            return Err(MockSerialError::Broken);
        }
        Ok(())
    }
}

impl embedded_io::Read for MockSerial {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        if self.fail_reads {
            return Err(MockSerialError::Broken);
        }
        match self.script.pop_front() {
            Some(ReadStep::Chunk(chunk)) => {
                let count = chunk.len().min(buf.len());
                buf[..count].copy_from_slice(&chunk[..count]);
                if count < chunk.len() {
                    // Whatever did not fit stays on the line.
                    self.script.push_front(ReadStep::Chunk(chunk[count..].to_vec()));
                }
                Ok(count)
            }
            // Past the end of the script the line is simply quiet.
            Some(ReadStep::Idle) | None => Err(MockSerialError::TimedOut),
        }
    }
}

impl MockSerial {
    /// Create a new MockSerial with an empty script and no captured writes.
    pub fn new() -> Self {
        Self {
            script: VecDeque::new(),
            writes: Vec::new(),
            fail_writes: false,
            fail_reads: false,
        }
    }

    /// Queue one device reply, delivered in the given chunks.
    ///
    /// An empty chunk list scripts a command that gets no reply at all, such
    /// as a set command.
    pub fn push_response(&mut self, chunks: &[&[u8]]) {
        for chunk in chunks {
            self.script.push_back(ReadStep::Chunk(chunk.to_vec()));
        }
        self.script.push_back(ReadStep::Idle);
    }

    /// Number of write calls captured so far.
    pub fn write_count(&self) -> usize {
        self.writes.len()
    }

    /// The bytes of the `index`th captured write.
    pub fn written(&self, index: usize) -> &[u8] {
        &self.writes[index]
    }

    /// Make every subsequent write fail with a hard transport fault.
    pub fn fail_writes(&mut self) {
        self.fail_writes = true;
    }

    /// Make every subsequent read fail with a hard transport fault.
    pub fn fail_reads(&mut self) {
        self.fail_reads = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_io::{Read, Write};

    #[test]
    fn captures_writes_per_call() {
        let mut mock = MockSerial::new();
        Write::write(&mut mock, b"VSET1?").unwrap();
        Write::write(&mut mock, b"STATUS?").unwrap();

        assert_eq!(mock.write_count(), 2);
        assert_eq!(mock.written(0), b"VSET1?");
        assert_eq!(mock.written(1), b"STATUS?");
    }

    #[test]
    fn delivers_chunks_then_goes_idle() {
        let mut mock = MockSerial::new();
        mock.push_response(&[b"12", b".50"]);

        let mut buf = [0u8; 16];
        assert_eq!(mock.read(&mut buf).unwrap(), 2);
        assert_eq!(&buf[..2], b"12");
        assert_eq!(mock.read(&mut buf).unwrap(), 3);
        assert_eq!(&buf[..3], b".50");
        assert!(matches!(
            mock.read(&mut buf),
            Err(MockSerialError::TimedOut)
        ));
    }

    #[test]
    fn splits_chunks_larger_than_the_buffer() {
        let mut mock = MockSerial::new();
        mock.push_response(&[b"KORAD KA3005P"]);

        let mut buf = [0u8; 5];
        assert_eq!(mock.read(&mut buf).unwrap(), 5);
        assert_eq!(&buf, b"KORAD");
        assert_eq!(mock.read(&mut buf).unwrap(), 5);
        assert_eq!(&buf, b" KA30");
        assert_eq!(mock.read(&mut buf).unwrap(), 3);
        assert_eq!(&buf[..3], b"05P");
    }

    #[test]
    fn empty_script_reads_as_quiet_line() {
        let mut mock = MockSerial::new();
        let mut buf = [0u8; 4];
        assert!(matches!(
            mock.read(&mut buf),
            Err(MockSerialError::TimedOut)
        ));
    }

    #[test]
    fn fault_injection() {
        let mut mock = MockSerial::new();
        mock.push_response(&[b"data"]);
        mock.fail_reads();
        mock.fail_writes();

        let mut buf = [0u8; 4];
        assert!(matches!(mock.read(&mut buf), Err(MockSerialError::Broken)));
        assert!(matches!(
            Write::write(&mut mock, b"x"),
            Err(MockSerialError::Broken)
        ));
    }
}
