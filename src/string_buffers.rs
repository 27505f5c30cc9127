use std::collections::{HashMap, VecDeque};
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, trace, warn};

/// Batched appends of string data to many files.
///
/// Fragments are queued in memory per output file and written out together,
/// reducing the number of file open/close cycles when logging string data to
/// many files interleaved over time.
///
/// # File Handling
///
/// Each stream name is a file name relative to the output directory. Flushes
/// always append; existing file content is never truncated. No newlines are
/// inserted, fragments are written exactly as given.
///
/// # Thread Safety
///
/// `StringBuffers` performs no internal locking. Share it across threads only
/// behind a mutex.
///
/// # Drop
///
/// Dropping the registry does NOT flush pending fragments. Call
/// [`StringBuffers::flush_all`] first if they should reach the disk.
///
/// # Examples
///
/// ```
/// # use jacktrade::StringBuffers;
/// # fn main() -> std::io::Result<()> {
/// # let dir = tempfile::tempdir()?;
/// let mut buffers = StringBuffers::new(dir.path(), Some(100))?;
/// buffers.add("a.log", "first line\n")?;
/// buffers.add("b.log", "other file\n")?;
/// buffers.add("a.log", "second line\n")?;
///
/// let path = buffers.flush("a.log")?;
/// assert_eq!(std::fs::read_to_string(path)?, "first line\nsecond line\n");
/// buffers.flush_all()?;
/// # Ok(())
/// # }
/// ```
pub struct StringBuffers {
    output_dir: PathBuf,
    capacity: Option<usize>,
    buffers: HashMap<String, VecDeque<String>>,
    // Stream names in first-seen order
    order: Vec<String>,
}

/// Construction-time settings for [`StringBuffers`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuffersConfig {
    /// Directory the output files are created in.
    pub output_dir: PathBuf,
    /// Queue length that triggers an automatic flush. `None` or `Some(0)`
    /// disables auto-flush.
    pub capacity: Option<usize>,
}

impl Default for BuffersConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            capacity: None,
        }
    }
}

impl StringBuffers {
    /// Creates a registry writing into `output_dir`.
    ///
    /// The directory, including missing parents, is created immediately.
    pub fn new(output_dir: impl AsRef<Path>, capacity: Option<usize>) -> io::Result<Self> {
        Self::with_config(BuffersConfig {
            output_dir: output_dir.as_ref().to_path_buf(),
            capacity,
        })
    }

    pub fn with_config(config: BuffersConfig) -> io::Result<Self> {
        fs::create_dir_all(&config.output_dir)?;
        Ok(Self {
            output_dir: config.output_dir,
            capacity: config.capacity.filter(|&cap| cap > 0),
            buffers: HashMap::new(),
            order: Vec::new(),
        })
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// The auto-flush threshold, `None` when flushing is manual only.
    pub fn capacity(&self) -> Option<usize> {
        self.capacity
    }

    /// Queues `data` for `output_file`, registering the stream on first use.
    ///
    /// When the queue reaches the configured capacity it is flushed before
    /// returning. Returns the number of fragments still queued for the file,
    /// which is 0 after an automatic flush.
    ///
    /// # Errors
    ///
    /// Propagates any I/O error from the automatic flush. The fragment stays
    /// queued together with everything not yet written.
    pub fn add(&mut self, output_file: &str, data: impl Into<String>) -> io::Result<usize> {
        if !self.buffers.contains_key(output_file) {
            self.order.push(output_file.to_string());
        }
        let buffer = self.buffers.entry(output_file.to_string()).or_default();
        buffer.push_back(data.into());
        trace!(output_file, queued = buffer.len(), "Fragment added");

        if let Some(capacity) = self.capacity {
            if buffer.len() >= capacity {
                flush_buffer(&self.output_dir, output_file, buffer)?;
            }
        }
        Ok(buffer.len())
    }

    /// Appends every fragment queued for `output_file` to the file and
    /// empties the queue.
    ///
    /// An empty queue performs no file I/O. An unknown name is registered,
    /// as if it had been added with no data. Returns the full path of the
    /// output file either way.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be opened or written. Fragments that were
    /// not written remain queued.
    pub fn flush(&mut self, output_file: &str) -> io::Result<PathBuf> {
        if !self.buffers.contains_key(output_file) {
            self.order.push(output_file.to_string());
        }
        let buffer = self.buffers.entry(output_file.to_string()).or_default();
        flush_buffer(&self.output_dir, output_file, buffer)
    }

    /// Flushes every stream in first-seen order, stopping at the first error.
    pub fn flush_all(&mut self) -> io::Result<()> {
        for output_file in &self.order {
            if let Some(buffer) = self.buffers.get_mut(output_file) {
                flush_buffer(&self.output_dir, output_file, buffer)?;
            }
        }
        Ok(())
    }

    /// Flushes `output_file` and unregisters it.
    ///
    /// A later [`add`](Self::add) with the same name starts a fresh, empty
    /// stream. If the flush fails the stream stays registered.
    pub fn remove(&mut self, output_file: &str) -> io::Result<PathBuf> {
        let path = self.flush(output_file)?;
        self.buffers.remove(output_file);
        self.order.retain(|name| name != output_file);
        debug!(output_file, "Stream removed");
        Ok(path)
    }

    /// Names of all registered streams in first-seen order.
    pub fn files(&self) -> Vec<String> {
        self.order.clone()
    }

    /// Number of fragments queued for `output_file`, `None` if unregistered.
    pub fn pending(&self, output_file: &str) -> Option<usize> {
        self.buffers.get(output_file).map(VecDeque::len)
    }

    /// Number of registered streams.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Iterates over `(name, queued fragments)` in first-seen order.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            names: self.order.iter(),
            buffers: &self.buffers,
        }
    }
}

impl Drop for StringBuffers {
    fn drop(&mut self) {
        let discarded: usize = self.buffers.values().map(VecDeque::len).sum();
        if discarded > 0 {
            warn!(discarded, "String buffers dropped with unflushed fragments");
        }
    }
}

/// Iterator over the streams of a [`StringBuffers`] registry.
pub struct Iter<'a> {
    names: std::slice::Iter<'a, String>,
    buffers: &'a HashMap<String, VecDeque<String>>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = (&'a str, &'a VecDeque<String>);

    fn next(&mut self) -> Option<Self::Item> {
        let name = self.names.next()?;
        self.buffers
            .get(name)
            .map(|buffer| (name.as_str(), buffer))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.names.size_hint()
    }
}

impl<'a> IntoIterator for &'a StringBuffers {
    type Item = (&'a str, &'a VecDeque<String>);
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Writes `buffer` to `output_dir/output_file` in order, popping each
/// fragment only after it has been written.
fn flush_buffer(
    output_dir: &Path,
    output_file: &str,
    buffer: &mut VecDeque<String>,
) -> io::Result<PathBuf> {
    let output_file_path = output_dir.join(output_file);
    if buffer.is_empty() {
        return Ok(output_file_path);
    }

    let count = buffer.len();
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&output_file_path)?;
    while let Some(fragment) = buffer.front() {
        file.write_all(fragment.as_bytes())?;
        buffer.pop_front();
    }
    file.flush()?;
    debug!(path = %output_file_path.display(), fragments = count, "Buffer flushed");
    Ok(output_file_path)
}
