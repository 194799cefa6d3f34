//! Destinations for solver standard output.

use std::io::Write;
use std::sync::mpsc::Sender;

use tracing::{info, warn};

/// Receives process output one line at a time, without the line break.
pub trait OutputSink {
    fn line(&mut self, line: &str);
}

impl<F: FnMut(&str)> OutputSink for F {
    fn line(&mut self, line: &str) {
        self(line)
    }
}

/// Writes lines to a file or terminal. The first write failure is logged
/// and later output is dropped.
pub struct WriterSink<W: Write> {
    writer: W,
    failed: bool,
}

impl<W: Write> WriterSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            failed: false,
        }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> OutputSink for WriterSink<W> {
    fn line(&mut self, line: &str) {
        if self.failed {
            return;
        }
        if let Err(e) = writeln!(self.writer, "{line}").and_then(|_| self.writer.flush()) {
            warn!(error = %e, "solver output sink failed; further output dropped");
            self.failed = true;
        }
    }
}

/// Forwards lines to another thread, e.g. a UI or progress reporter.
pub struct ChannelSink(pub Sender<String>);

impl OutputSink for ChannelSink {
    fn line(&mut self, line: &str) {
        // Receiver gone means nobody is listening any more.
        let _ = self.0.send(line.to_string());
    }
}

/// Emits each line as an `info` event on the `solver` target.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl OutputSink for TracingSink {
    fn line(&mut self, line: &str) {
        info!(target: "solver", "{line}");
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl OutputSink for NullSink {
    fn line(&mut self, _line: &str) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc::channel;

    #[test]
    fn writer_sink_appends_newlines() {
        let mut sink = WriterSink::new(Vec::new());
        sink.line("first");
        sink.line("");
        sink.line("third");
        assert_eq!(sink.into_inner(), b"first\n\nthird\n");
    }

    #[test]
    fn closure_sink_collects() {
        let mut seen = Vec::new();
        {
            let mut sink = |l: &str| seen.push(l.to_string());
            sink.line("a");
            OutputSink::line(&mut sink, "b");
        }
        assert_eq!(seen, ["a", "b"]);
    }

    #[test]
    fn channel_sink_ignores_closed_receiver() {
        let (tx, rx) = channel();
        let mut sink = ChannelSink(tx);
        sink.line("kept");
        assert_eq!(rx.recv().unwrap(), "kept");
        drop(rx);
        sink.line("dropped");
    }

    struct FailingWriter {
        attempts: usize,
    }

    impl Write for FailingWriter {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            self.attempts += 1;
            Err(std::io::Error::other("disk full"))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn writer_sink_stops_after_first_failure() {
        let mut sink = WriterSink::new(FailingWriter { attempts: 0 });
        sink.line("one");
        sink.line("two");
        sink.line("three");
        assert!(sink.failed);
        assert_eq!(sink.into_inner().attempts, 1);
    }

    #[test]
    fn channel_sink_forwards_in_order() {
        let (tx, rx) = channel();
        let mut sink = ChannelSink(tx);
        for l in ["Solving...", "", "done"] {
            sink.line(l);
        }
        drop(sink);
        let got: Vec<String> = rx.iter().collect();
        assert_eq!(got, ["Solving...", "", "done"]);
    }

    #[test]
    fn tracing_and_null_sinks_accept_lines() {
        TracingSink.line("no subscriber installed");
        NullSink.line("discarded");
    }
}
