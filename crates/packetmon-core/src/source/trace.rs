use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use super::{EventSource, MonitorEvent, SourceError};

/// JSON-lines trace of monitor events.
///
/// Blank lines and lines starting with `#` are skipped; parse errors carry
/// the 1-based line number.
pub struct TraceFileSource<R = BufReader<File>> {
    reader: R,
    line: usize,
    buf: String,
}

impl TraceFileSource {
    pub fn open(path: &Path) -> Result<Self, SourceError> {
        let file = File::open(path)?;
        Ok(Self::from_reader(BufReader::new(file)))
    }
}

impl<R: BufRead> TraceFileSource<R> {
    /// # Examples
    /// ```
    /// use packetmon_core::{EventSource, MonitorEvent, TraceFileSource};
    ///
    /// let trace = "# warmup\n{\"event\":\"leave\",\"client\":2}\n";
    /// let mut source = TraceFileSource::from_reader(trace.as_bytes());
    /// assert_eq!(
    ///     source.next_event().unwrap(),
    ///     Some(MonitorEvent::Leave { client: 2 })
    /// );
    /// assert_eq!(source.next_event().unwrap(), None);
    /// ```
    pub fn from_reader(reader: R) -> Self {
        Self {
            reader,
            line: 0,
            buf: String::new(),
        }
    }
}

impl<R: BufRead> EventSource for TraceFileSource<R> {
    fn next_event(&mut self) -> Result<Option<MonitorEvent>, SourceError> {
        loop {
            self.buf.clear();
            if self.reader.read_line(&mut self.buf)? == 0 {
                return Ok(None);
            }
            self.line += 1;
            let text = self.buf.trim();
            if text.is_empty() || text.starts_with('#') {
                continue;
            }
            return serde_json::from_str(text)
                .map(Some)
                .map_err(|err| SourceError::Trace {
                    line: self.line,
                    message: err.to_string(),
                });
        }
    }
}
