use std::env;
use std::io;

use jacktrade::{CodeTimer, StringBuffers, TimingResults};
use tracing::info;
use tracing_subscriber::EnvFilter;

const STREAMS: [&str; 3] = ["alpha.log", "beta.log", "gamma.log"];

/// Writes interleaved fragments to a few files through `StringBuffers`
/// and reports how long it took.
///
/// Usage: `jacktrade [output_dir] [fragments] [capacity]`
fn main() -> io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut args = env::args().skip(1);
    let output_dir = args.next().unwrap_or_else(|| "jacktrade_out".to_string());
    let fragments = args
        .next()
        .and_then(|s| s.parse::<usize>().ok())
        .unwrap_or(100_000);
    let capacity = args.next().and_then(|s| s.parse::<usize>().ok());

    let results = TimingResults::default();
    let mut timer = CodeTimer::new().min_digits(4).collect_into(results.clone());
    let mut buffers = StringBuffers::new(&output_dir, capacity)?;
    info!(output_dir = %output_dir, fragments, ?capacity, "Writing fragments");

    timer.time(|| -> io::Result<()> {
        for i in 0..fragments {
            buffers.add(STREAMS[i % STREAMS.len()], format!("record {i}\n"))?;
        }
        Ok(())
    })?;
    timer.time(|| buffers.flush_all())?;

    for (name, queue) in &buffers {
        info!(name, queued = queue.len(), "Stream state");
    }
    let total_ns: u64 = results.lock().iter().map(|sample| sample.ns()).sum();
    println!(
        "Wrote {} fragments to {} files in {}",
        fragments,
        buffers.len(),
        jacktrade::format_time(total_ns, 4)
    );
    Ok(())
}
