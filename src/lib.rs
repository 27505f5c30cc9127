//! # Jacktrade
//!
//! Small, self-contained utilities for scripts and tools:
//!
//! * **String buffers**: batch string fragments per output file and append
//!   them to disk together, with an optional auto-flush threshold
//! * **Code timer**: scoped monotonic timing with human-readable output
//!   such as `"1.00 ms"` or `"2 days, 00:00:00"`
//! * **CSV merging**: concatenate CSV files, aligning columns by header
//!
//! ## Main Components
//!
//! * `StringBuffers`: Registry of named, bounded in-memory queues flushed to files
//! * `CodeTimer`: Measures a scope and reports its duration
//! * `duration_format`: Nanosecond duration formatting
//! * `efficient_clock`: Monotonic nanosecond clock behind the timer
//!
//! ## Quick Start
//!
//! ```
//! use jacktrade::{CodeTimer, StringBuffers};
//!
//! # fn main() -> std::io::Result<()> {
//! # let dir = tempfile::tempdir()?;
//! let mut timer = CodeTimer::new();
//! let mut buffers = StringBuffers::new(dir.path(), Some(64))?;
//!
//! timer.time(|| -> std::io::Result<()> {
//!     for i in 0..1_000 {
//!         buffers.add(if i % 2 == 0 { "even.txt" } else { "odd.txt" }, format!("{i}\n"))?;
//!     }
//!     buffers.flush_all()
//! })?;
//! // Prints e.g. "Code execution took 1.23 ms."
//! # Ok(())
//! # }
//! ```

pub mod code_timer;
pub mod csv_merge;
pub mod duration_format;
pub mod efficient_clock;
pub mod string_buffers;

pub use code_timer::{CodeTimer, TimerGuard, TimerOptions, TimingResults, TimingSample};
pub use csv_merge::merge_csv_files;
pub use duration_format::format_time;
pub use string_buffers::{BuffersConfig, StringBuffers};
