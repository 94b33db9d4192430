//! User-facing status reporting.
//!
//! The pipeline never prints directly; it hands `(kind, message)` pairs to a
//! caller-supplied [`StatusReporter`].

use crate::{log, logger};

/// Kind of a status message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Success,
    Error,
    Info,
}

/// Receives status messages from a session.
pub trait StatusReporter {
    fn report(&mut self, kind: StatusKind, message: &str);
}

impl<R: StatusReporter + ?Sized> StatusReporter for &mut R {
    fn report(&mut self, kind: StatusKind, message: &str) {
        (**self).report(kind, message);
    }
}

/// Timestamped banner lines for the interactive session.
#[derive(Debug, Default, Clone, Copy)]
pub struct BannerReporter;

impl StatusReporter for BannerReporter {
    fn report(&mut self, kind: StatusKind, message: &str) {
        logger::banner(kind, message);
    }
}

/// Plain `[svg]` / `[error]` log lines for one-shot commands.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogReporter;

impl StatusReporter for LogReporter {
    fn report(&mut self, kind: StatusKind, message: &str) {
        match kind {
            StatusKind::Error => log!("error"; "{}", message),
            StatusKind::Success | StatusKind::Info => log!("svg"; "{}", message),
        }
    }
}

/// Collects messages in memory.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct RecordingReporter {
    pub messages: Vec<(StatusKind, String)>,
}

#[cfg(test)]
impl RecordingReporter {
    pub fn last(&self) -> Option<(StatusKind, &str)> {
        self.messages.last().map(|(k, m)| (*k, m.as_str()))
    }

    pub fn count(&self, kind: StatusKind) -> usize {
        self.messages.iter().filter(|(k, _)| *k == kind).count()
    }
}

#[cfg(test)]
impl StatusReporter for RecordingReporter {
    fn report(&mut self, kind: StatusKind, message: &str) {
        self.messages.push((kind, message.to_string()));
    }
}
