use std::io;
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, StringRecord, WriterBuilder};
use tracing::debug;

/// Merges several CSV files into `dest_file`.
///
/// With `has_headers`, the first row of the first source is taken as the
/// header and written once. Rows of every source are rearranged into that
/// column order by column name; columns a source lacks are written empty. A
/// source column that the first header does not name is an error.
///
/// Without `has_headers`, all records are concatenated as they are.
///
/// Returns `Ok(None)` without creating `dest_file` when `src_files` is
/// empty, otherwise the path of the written file. The destination is
/// truncated if it exists.
pub fn merge_csv_files<P: AsRef<Path>>(
    src_files: &[P],
    dest_file: impl AsRef<Path>,
    has_headers: bool,
) -> io::Result<Option<PathBuf>> {
    let Some(first) = src_files.first() else {
        return Ok(None);
    };
    let dest_file = dest_file.as_ref();

    let header = if has_headers {
        Some(read_header(first.as_ref())?)
    } else {
        None
    };

    let mut writer = WriterBuilder::new()
        .flexible(true)
        .from_path(dest_file)
        .map_err(csv_error)?;
    if let Some(header) = &header {
        writer.write_record(header).map_err(csv_error)?;
    }

    for src_file in src_files {
        let src_file = src_file.as_ref();
        let mut reader = ReaderBuilder::new()
            .has_headers(has_headers)
            .flexible(true)
            .from_path(src_file)
            .map_err(csv_error)?;

        let Some(header) = &header else {
            for record in reader.records() {
                writer
                    .write_record(&record.map_err(csv_error)?)
                    .map_err(csv_error)?;
            }
            continue;
        };

        let source_header = reader.headers().map_err(csv_error)?.clone();
        let columns = column_mapping(header, &source_header, src_file)?;
        for record in reader.records() {
            let record = record.map_err(csv_error)?;
            if record.len() > source_header.len() {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!(
                        "row {} of {} has {} fields but the header names {}",
                        record.position().map_or(0, |pos| pos.line()),
                        src_file.display(),
                        record.len(),
                        source_header.len()
                    ),
                ));
            }
            writer
                .write_record(
                    columns
                        .iter()
                        .map(|&idx| idx.and_then(|idx| record.get(idx)).unwrap_or("")),
                )
                .map_err(csv_error)?;
        }
    }
    writer.flush()?;
    debug!(sources = src_files.len(), dest = %dest_file.display(), "CSV files merged");
    Ok(Some(dest_file.to_path_buf()))
}

fn read_header(path: &Path) -> io::Result<StringRecord> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .map_err(csv_error)?;
    Ok(reader.headers().map_err(csv_error)?.clone())
}

/// For every column of `header`, the index of the same-named column in
/// `source`.
fn column_mapping(
    header: &StringRecord,
    source: &StringRecord,
    path: &Path,
) -> io::Result<Vec<Option<usize>>> {
    if let Some(unknown) = source.iter().find(|name| !header.iter().any(|h| h == *name)) {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("column '{}' in {} is not in the merged header", unknown, path.display()),
        ));
    }
    Ok(header
        .iter()
        .map(|name| source.iter().position(|column| column == name))
        .collect())
}

/// Keeps the kind of I/O failures; anything else is malformed input.
fn csv_error(err: csv::Error) -> io::Error {
    let kind = match err.kind() {
        csv::ErrorKind::Io(io_err) => io_err.kind(),
        _ => io::ErrorKind::InvalidData,
    };
    io::Error::new(kind, err)
}
