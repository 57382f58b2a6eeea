/*
 * linesock - Line-oriented TCP sockets, blocking and non-blocking
 * This is free and unencumbered software released into the public domain.
 */
use std::time::{Instant, Duration};

/// A deadline that may or may not be set
pub(crate) struct Timeout {
    deadline: Option<(Instant, Duration)>,
}

impl Timeout {
    pub fn start(timeout: Option<Duration>) -> Self {
        Self {
            deadline: timeout.map(|duration| (Instant::now(), duration)),
        }
    }

    /// `None` if no deadline was set, otherwise the time left, which may be zero.
    pub fn remaining_time(&self) -> Option<Duration> {
        self.deadline.map(|(start, duration)| duration.saturating_sub(start.elapsed()))
    }

    pub fn expired(&self) -> bool {
        self.remaining_time().map(|time| time.is_zero()).unwrap_or(false)
    }
}
