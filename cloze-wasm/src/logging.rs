use std::io::{self, Write};
use std::sync::Once;

use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::MakeWriter;

use crate::utils::log;

/// Buffers one formatted event and hands it to `sink` as a single line.
pub struct ConsoleWriter {
    buf: Vec<u8>,
    sink: fn(&str),
}

impl Write for ConsoleWriter {
    fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(bytes);
        Ok(bytes.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for ConsoleWriter {
    fn drop(&mut self) {
        let text = String::from_utf8_lossy(&self.buf);
        let line = text.trim_end();
        if !line.is_empty() {
            (self.sink)(line);
        }
    }
}

#[derive(Clone, Copy)]
pub struct MakeConsoleWriter {
    sink: fn(&str),
}

impl MakeConsoleWriter {
    pub fn new(sink: fn(&str)) -> Self {
        MakeConsoleWriter { sink }
    }
}

impl Default for MakeConsoleWriter {
    fn default() -> Self {
        MakeConsoleWriter::new(log)
    }
}

impl<'a> MakeWriter<'a> for MakeConsoleWriter {
    type Writer = ConsoleWriter;

    fn make_writer(&'a self) -> ConsoleWriter {
        ConsoleWriter {
            buf: Vec::new(),
            sink: self.sink,
        }
    }
}

/// Route `tracing` output from the engine to the browser console. Safe to
/// call more than once.
pub fn init() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_writer(MakeConsoleWriter::default())
            .without_time()
            .with_target(false)
            .with_max_level(LevelFilter::DEBUG)
            .try_init();
    });
}
