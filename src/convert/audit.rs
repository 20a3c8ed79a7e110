//! Append-only conversion audit log
//!
//! One textual artifact per run, written as a stanza per converted node.
//! Writing is best-effort by contract: an unsaved scene has no log path and
//! a full disk must never abort a conversion, so sink failures are swallowed
//! here and mirrored at warn severity on the developer log only.

use std::fmt::Display;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

#[derive(Debug)]
enum Sink {
    Disabled,
    File(PathBuf),
    Memory(Vec<String>),
}

/// Best-effort audit sink.
#[derive(Debug)]
pub struct AuditLog {
    sink: Sink,
}

impl AuditLog {
    /// Log to `<path>`, appending across entries.
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self {
            sink: Sink::File(path.into()),
        }
    }

    /// Collect lines in memory; used by tests and embedding hosts.
    pub fn memory() -> Self {
        Self {
            sink: Sink::Memory(Vec::new()),
        }
    }

    /// Discard everything.
    pub fn disabled() -> Self {
        Self {
            sink: Sink::Disabled,
        }
    }

    /// Lines collected so far, empty unless this is a memory sink.
    pub fn lines(&self) -> &[String] {
        match &self.sink {
            Sink::Memory(lines) => lines,
            _ => &[],
        }
    }

    fn write_line(&mut self, line: String) {
        match &mut self.sink {
            Sink::Disabled => {}
            Sink::Memory(lines) => lines.push(line),
            Sink::File(path) => {
                let appended = OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(&path)
                    .and_then(|mut f| writeln!(f, "{}", line));
                if appended.is_err() {
                    log::warn!("audit log write to {} failed", path.display());
                }
            }
        }
    }

    /// Run header with a wall-clock timestamp.
    pub fn begin_run(&mut self) {
        let now = chrono::Local::now();
        self.write_line(format!("Conversion started at {}", now.format("%Y-%m-%d %H:%M:%S")));
    }

    /// Opens the stanza for one source node conversion.
    pub fn found(&mut self, source: &str, source_kind: &str, target: &str, target_kind: &str) {
        self.write_line(format!("Found node: name={}, type={}", source, source_kind));
        self.write_line(format!("Converting to: name={}, type={}", target, target_kind));
    }

    pub fn property(&mut self, source: &str, source_attr: &str, target: &str, target_attr: &str) {
        self.write_line(format!(
            "    property {}.{} is converted to {}.{}",
            source, source_attr, target, target_attr
        ));
    }

    pub fn set_value(&mut self, value: impl Display, target: &str, target_attr: &str) {
        self.write_line(format!("    Set value {} to {}.{}.", value, target, target_attr));
    }

    pub fn connected(&mut self, source: impl Display, target: impl Display) {
        self.write_line(format!("    Created connection from {} to {}.", source, target));
    }

    /// Failure line inside the current stanza; also mirrored to the
    /// developer log at warn severity.
    pub fn failure(&mut self, text: impl Display) {
        log::warn!("{}", text);
        self.write_line(format!("    {}", text));
    }

    /// Closes the stanza for a source node.
    pub fn finished(&mut self, source: &str) {
        self.write_line(format!("Conversion of {} is finished.", source));
        self.write_line(String::new());
    }
}
