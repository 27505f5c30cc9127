use jacktrade::code_timer::NO_MEASUREMENT_MESSAGE;
use jacktrade::efficient_clock::Clock;
use jacktrade::{CodeTimer, TimerOptions, TimingResults, TimingSample};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::io::{self, Write};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// Clock returning pre-scripted readings.
struct ScriptedClock(Mutex<VecDeque<u64>>);

impl ScriptedClock {
    fn new(readings: &[u64]) -> Self {
        Self(Mutex::new(readings.iter().copied().collect()))
    }
}

impl Clock for ScriptedClock {
    fn now_ns(&self) -> u64 {
        self.0.lock().pop_front().expect("clock readings exhausted")
    }
}

/// Writer collecting everything reported by a timer.
#[derive(Clone, Default)]
struct SharedBuf(Arc<Mutex<Vec<u8>>>);

impl SharedBuf {
    fn contents(&self) -> String {
        String::from_utf8(self.0.lock().clone()).unwrap()
    }
}

impl Write for SharedBuf {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn test_core_functionality() {
    let task_time = Duration::from_millis(100);
    let mut timer = CodeTimer::new().no_print();
    timer.time(|| thread::sleep(task_time));

    let sample = timer.sample().expect("measurement should be recorded");
    assert!(sample.s() >= 0.100, "Slept 100 ms but measured {} s", sample.s());
    assert!(sample.s() < 0.500, "Measured {} s for a 100 ms sleep", sample.s());
    assert_eq!(sample.ms(), sample.ns() as f64 / 1e6);
    assert_eq!(sample.us(), sample.ns() as f64 / 1e3);
    assert_eq!(sample.s(), sample.ns() as f64 / 1e9);
    assert!((sample.ms() / 1e3 - sample.s()).abs() < 1e-12);
}

#[test]
fn test_uses_clock_readings() {
    let mut timer = CodeTimer::new()
        .no_print()
        .with_clock(ScriptedClock::new(&[1_000, 1_009]));
    timer.time(|| ());
    assert_eq!(timer.sample(), Some(TimingSample::from_nanos(9)));
}

#[test]
fn test_zero_duration() {
    let buf = SharedBuf::default();
    let mut timer = CodeTimer::new()
        .report_to(buf.clone())
        .with_clock(ScriptedClock::new(&[0, 0]));
    timer.time(|| ());
    assert_eq!(timer.sample().map(|s| s.ns()), Some(0));
    assert_eq!(buf.contents(), "Code execution took 0 s.\n");
}

#[test]
fn test_print_options() {
    let buf = SharedBuf::default();
    let mut timer = CodeTimer::new()
        .no_print()
        .report_to(buf.clone())
        .with_clock(ScriptedClock::new(&[0, 5]));
    timer.time(|| ());
    assert!(buf.contents().is_empty(), "no_print should suppress the report");

    let buf = SharedBuf::default();
    let mut timer = CodeTimer::new()
        .report_to(buf.clone())
        .with_clock(ScriptedClock::new(&[0, 5]));
    timer.time(|| ());
    assert_eq!(buf.contents(), "Code execution took 5.00 ns.\n");
}

#[test]
fn test_properties() {
    let buf = SharedBuf::default();
    let mut timer = CodeTimer::new()
        .report_to(buf.clone())
        .with_clock(ScriptedClock::new(&[0, 1_500_000]));

    // Defaults before the measurement
    assert_eq!(timer.message(), NO_MEASUREMENT_MESSAGE);
    assert_eq!(timer.time_str(), "");
    assert_eq!(timer.sample(), None);

    // Values after measurement correspond to the printout
    timer.time(|| ());
    assert_eq!(format!("{}\n", timer.message()), buf.contents());
    assert_eq!(timer.time_str(), "1.50 ms");
    assert_eq!(timer.message(), "Code execution took 1.50 ms.");
}

#[test]
fn test_min_digits_option() {
    let options = TimerOptions { print: false, min_digits: 6 };
    let mut timer =
        CodeTimer::with_options(options).with_clock(ScriptedClock::new(&[0, 1_000]));
    timer.time(|| ());
    assert_eq!(timer.time_str(), "1.00000 us");
    assert_eq!(timer.options(), options);
}

#[test]
fn test_wrapper_returns_value() {
    let mut timer = CodeTimer::new().no_print();
    assert_eq!(timer.time(|| 123), 123);
    assert!(timer.sample().is_some());
}

#[test]
fn test_guard_stop() {
    let mut timer = CodeTimer::new()
        .no_print()
        .with_clock(ScriptedClock::new(&[10, 25]));
    let guard = timer.start();
    let sample = guard.stop();
    assert_eq!(sample.ns(), 15);
    // Stopping consumed the guard, so no second reading was taken
    assert_eq!(timer.sample(), Some(sample));
}

#[test]
fn test_remeasure_overwrites() {
    let mut timer = CodeTimer::new()
        .no_print()
        .with_clock(ScriptedClock::new(&[0, 10, 100, 300]));
    timer.time(|| ());
    assert_eq!(timer.sample().map(|s| s.ns()), Some(10));
    timer.time(|| ());
    assert_eq!(timer.sample().map(|s| s.ns()), Some(200));
}

#[test]
fn test_records_time_on_panic() {
    let results = TimingResults::default();
    let mut timer = CodeTimer::new()
        .no_print()
        .collect_into(results.clone())
        .with_clock(ScriptedClock::new(&[0, 42]));

    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        timer.time(|| panic!("work failed"));
    }));
    assert!(outcome.is_err());
    assert_eq!(timer.sample().map(|s| s.ns()), Some(42));
    assert_eq!(results.lock().len(), 1);
}

#[test]
fn test_results_collection() {
    let results = TimingResults::default();
    let mut timer = CodeTimer::new()
        .no_print()
        .collect_into(results.clone())
        .with_clock(ScriptedClock::new(&[0, 10_000_000, 0, 20_000_000, 0, 30_000_000]));

    for _ in 0..3 {
        timer.time(|| ());
    }
    let ms: Vec<f64> = results.lock().iter().map(|sample| sample.ms()).collect();
    assert_eq!(ms, vec![10.0, 20.0, 30.0]);
}

#[test]
fn test_results_collection_real_sleep() {
    let results = TimingResults::default();
    let mut timer = CodeTimer::new().no_print().collect_into(results.clone());

    let sleep_times = [10u64, 20, 30];
    for ms in sleep_times {
        timer.time(|| thread::sleep(Duration::from_millis(ms)));
    }
    let results = results.lock();
    assert_eq!(results.len(), sleep_times.len());
    for (sample, ms) in results.iter().zip(sleep_times) {
        assert!(sample.ms() >= ms as f64, "Measured {} ms for a {} ms sleep", sample.ms(), ms);
    }
}

#[test]
fn test_sample_derived_units() {
    let sample = TimingSample::from(Duration::from_secs(2 * 86_400));
    assert_eq!(sample.d(), 2.0);
    assert_eq!(sample.h(), 48.0);
    assert_eq!(sample.m(), 2880.0);
    assert_eq!(sample.s(), 172_800.0);
    assert_eq!(sample.as_duration(), Duration::from_secs(172_800));
    assert_eq!(sample.to_string(), "2 days, 00:00:00");
}
