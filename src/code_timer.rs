//! Scoped wall-clock timing of a block of code.
//!
//! A [`CodeTimer`] measures the time between [`CodeTimer::start`] and the
//! drop of the returned [`TimerGuard`]. The guard finalizes the measurement
//! on every exit path, including unwinding out of a panic, so partial
//! elapsed time is still recorded when the timed work fails.

use std::fmt;
use std::io::{self, Write};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::duration_format::{
    format_time, NS_PER_DAY, NS_PER_HOUR, NS_PER_MICROSECOND, NS_PER_MILLISECOND,
    NS_PER_MINUTE, NS_PER_SECOND,
};
use crate::efficient_clock::{Clock, MonotonicClock};

/// Message reported by [`CodeTimer::message`] before any measurement.
pub const NO_MEASUREMENT_MESSAGE: &str = "No code execution has taken place yet.";

/// Shared list that a timer appends a [`TimingSample`] to after every
/// measurement.
pub type TimingResults = Arc<Mutex<Vec<TimingSample>>>;

/// A single finished measurement.
///
/// The nanosecond count is the only stored value; every other unit is
/// derived from it, so the views are always consistent with each other.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimingSample {
    ns: u64,
}

impl TimingSample {
    pub const fn from_nanos(ns: u64) -> Self {
        Self { ns }
    }

    /// Elapsed nanoseconds.
    pub const fn ns(&self) -> u64 {
        self.ns
    }

    pub fn us(&self) -> f64 {
        self.ns as f64 / NS_PER_MICROSECOND as f64
    }

    pub fn ms(&self) -> f64 {
        self.ns as f64 / NS_PER_MILLISECOND as f64
    }

    pub fn s(&self) -> f64 {
        self.ns as f64 / NS_PER_SECOND as f64
    }

    pub fn m(&self) -> f64 {
        self.ns as f64 / NS_PER_MINUTE as f64
    }

    pub fn h(&self) -> f64 {
        self.ns as f64 / NS_PER_HOUR as f64
    }

    pub fn d(&self) -> f64 {
        self.ns as f64 / NS_PER_DAY as f64
    }

    pub fn as_duration(&self) -> Duration {
        Duration::from_nanos(self.ns)
    }

    /// Formats the elapsed time showing at least `min_digits` digits.
    pub fn format(&self, min_digits: usize) -> String {
        format_time(self.ns, min_digits)
    }
}

impl From<Duration> for TimingSample {
    fn from(duration: Duration) -> Self {
        Self::from_nanos(u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX))
    }
}

impl fmt::Display for TimingSample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format(TimerOptions::default().min_digits))
    }
}

/// Construction-time options for a [`CodeTimer`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct TimerOptions {
    /// Report the formatted message when a measurement finishes.
    pub print: bool,
    /// Minimum number of digits shown in the formatted duration.
    pub min_digits: usize,
}

impl Default for TimerOptions {
    fn default() -> Self {
        Self { print: true, min_digits: 3 }
    }
}

/// Times sections of code.
///
/// # Examples
///
/// ```
/// # use jacktrade::CodeTimer;
/// let mut timer = CodeTimer::new().no_print();
/// {
///     let _guard = timer.start();
///     // Code to time
/// }
/// let sample = timer.sample().unwrap();
/// println!("Took {} s / {} ms / {} ns", sample.s(), sample.ms(), sample.ns());
/// ```
///
/// Wrapping repeated calls and collecting every measurement:
///
/// ```
/// # use jacktrade::{CodeTimer, TimingResults};
/// let results = TimingResults::default();
/// let mut timer = CodeTimer::new().no_print().collect_into(results.clone());
/// for n in 0..3u64 {
///     let total = timer.time(|| (0..n).sum::<u64>());
///     assert_eq!(total, (0..n).sum::<u64>());
/// }
/// assert_eq!(results.lock().len(), 3);
/// ```
pub struct CodeTimer<C: Clock = MonotonicClock> {
    options: TimerOptions,
    clock: C,
    results: Option<TimingResults>,
    report: Option<Box<dyn Write + Send>>,
    last: Option<TimingSample>,
}

impl CodeTimer<MonotonicClock> {
    /// Creates a timer with default options: printing enabled, 3 digits.
    pub fn new() -> Self {
        Self::with_options(TimerOptions::default())
    }

    pub fn with_options(options: TimerOptions) -> Self {
        Self {
            options,
            clock: MonotonicClock,
            results: None,
            report: None,
            last: None,
        }
    }
}

impl Default for CodeTimer<MonotonicClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> CodeTimer<C> {
    /// Suppresses the message normally reported when a measurement finishes.
    pub fn no_print(mut self) -> Self {
        self.options.print = false;
        self
    }

    pub fn min_digits(mut self, min_digits: usize) -> Self {
        self.options.min_digits = min_digits;
        self
    }

    /// Appends a copy of every finished measurement to `results`.
    pub fn collect_into(mut self, results: TimingResults) -> Self {
        self.results = Some(results);
        self
    }

    /// Sends the report message to `writer` instead of standard output.
    pub fn report_to(mut self, writer: impl Write + Send + 'static) -> Self {
        self.report = Some(Box::new(writer));
        self
    }

    /// Replaces the clock readings are taken from.
    pub fn with_clock<D: Clock>(self, clock: D) -> CodeTimer<D> {
        CodeTimer {
            options: self.options,
            clock,
            results: self.results,
            report: self.report,
            last: self.last,
        }
    }

    pub fn options(&self) -> TimerOptions {
        self.options
    }

    /// Starts a measurement that finishes when the returned guard is dropped
    /// or stopped.
    ///
    /// The guard borrows the timer mutably, so overlapping scopes on one
    /// timer are rejected at compile time; nested timing needs separate
    /// timers.
    pub fn start(&mut self) -> TimerGuard<'_, C> {
        let start_ns = self.clock.now_ns();
        TimerGuard {
            timer: self,
            start_ns,
            finished: None,
        }
    }

    /// Runs `work` inside a measurement scope and returns its result.
    pub fn time<R>(&mut self, work: impl FnOnce() -> R) -> R {
        let _guard = self.start();
        work()
    }

    /// The most recent measurement, or `None` before the first one finishes.
    pub fn sample(&self) -> Option<TimingSample> {
        self.last
    }

    /// The formatted duration of the last measurement, or `""` before one.
    pub fn time_str(&self) -> String {
        self.last
            .map(|sample| sample.format(self.options.min_digits))
            .unwrap_or_default()
    }

    /// The message reported after a measurement.
    pub fn message(&self) -> String {
        match self.last {
            Some(_) => format!("Code execution took {}.", self.time_str()),
            None => NO_MEASUREMENT_MESSAGE.to_string(),
        }
    }

    fn finish(&mut self, start_ns: u64) -> TimingSample {
        let sample = TimingSample::from_nanos(self.clock.now_ns().saturating_sub(start_ns));
        self.last = Some(sample);
        debug!(elapsed_ns = sample.ns(), "Measurement finished");

        if self.options.print {
            let message = self.message();
            let written = match self.report.as_mut() {
                Some(writer) => writeln!(writer, "{message}"),
                None => writeln!(io::stdout().lock(), "{message}"),
            };
            if let Err(err) = written {
                warn!(error = %err, "Failed to report timing message");
            }
        }
        if let Some(results) = &self.results {
            results.lock().push(sample);
        }
        sample
    }
}

/// An in-progress measurement.
///
/// Dropping the guard finishes the measurement; [`TimerGuard::stop`] does
/// the same and hands back the sample.
#[must_use = "the measurement finishes as soon as the guard is dropped"]
pub struct TimerGuard<'a, C: Clock> {
    timer: &'a mut CodeTimer<C>,
    start_ns: u64,
    finished: Option<TimingSample>,
}

impl<C: Clock> TimerGuard<'_, C> {
    /// Finishes the measurement now and returns it.
    pub fn stop(mut self) -> TimingSample {
        self.finish()
    }

    fn finish(&mut self) -> TimingSample {
        if let Some(sample) = self.finished {
            return sample;
        }
        let sample = self.timer.finish(self.start_ns);
        self.finished = Some(sample);
        sample
    }
}

impl<C: Clock> Drop for TimerGuard<'_, C> {
    fn drop(&mut self) {
        self.finish();
    }
}
