//! Value sources: where each series gets its numbers from.
//!
//! Every source implements the [`ValueSource`] trait. The only built-in source
//! is [`FileSource`], which reads one line from a file or pipe per call.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use log::debug;

use crate::error::SourceError;

/// Trait that every value source must implement.
pub trait ValueSource: Send + Sync {
    /// Identifier shown as the series name.
    fn id(&self) -> &str;

    /// Produce one numeric sample.
    ///
    /// Must return [`SourceError::Format`] when the raw input is not a number;
    /// the sampler skips the source for the current tick in that case.
    fn get_value(&self) -> Result<f64, SourceError>;
}

// ---------------------------------------------------------------------------
// FileSource
// ---------------------------------------------------------------------------

/// Reads the first line of a file (or named pipe) on every call and parses it
/// as a floating point number.
///
/// The file is reopened each time, so `/proc` files and FIFOs fed by another
/// process yield a fresh value per tick.
pub struct FileSource {
    path: PathBuf,
    id: String,
}

impl FileSource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let id = path.display().to_string();
        Self { path, id }
    }

    /// Convenience for building a `Vec<Box<dyn ValueSource>>`.
    pub fn boxed(path: impl AsRef<Path>) -> Box<dyn ValueSource> {
        Box::new(Self::new(path))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_line(&self) -> Result<String, SourceError> {
        let io_err = |source| SourceError::Io {
            source_id: self.id.clone(),
            source,
        };
        let file = File::open(&self.path).map_err(io_err)?;
        let mut line = String::new();
        BufReader::new(file).read_line(&mut line).map_err(io_err)?;
        Ok(line)
    }
}

impl ValueSource for FileSource {
    fn id(&self) -> &str {
        &self.id
    }

    fn get_value(&self) -> Result<f64, SourceError> {
        debug!("{}: getting value", self.id);
        let line = self.read_line()?;
        let value = parse_value(&self.id, &line)?;
        debug!("{}: got value {value}", self.id);
        Ok(value)
    }
}

/// Parse one line of raw text into a sample value. NaN and infinities are
/// rejected: they cannot be placed on a linear scale.
pub(crate) fn parse_value(source_id: &str, raw: &str) -> Result<f64, SourceError> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| SourceError::Format {
            source_id: source_id.to_string(),
            raw: raw.trim_end_matches(['\r', '\n']).to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn parse_accepts_surrounding_whitespace() {
        assert_eq!(parse_value("x", "  42.5\n").unwrap(), 42.5);
        assert_eq!(parse_value("x", "-3").unwrap(), -3.0);
        assert_eq!(parse_value("x", "1e3\r\n").unwrap(), 1000.0);
    }

    #[test]
    fn parse_rejects_non_numbers_as_format_errors() {
        for raw in ["", "\n", "abc", "1,5", "12 apples", "NaN", "inf"] {
            let err = parse_value("x", raw).unwrap_err();
            assert!(err.is_format(), "{raw:?} should be a format error");
        }
    }

    #[test]
    fn file_source_reads_only_first_line() {
        let file = write_temp("0.75 0.80 0.91 1/234 5678\n");
        let source = FileSource::new(file.path());
        assert!(source.get_value().unwrap_err().is_format());

        let file = write_temp("7\n8\n9\n");
        let source = FileSource::new(file.path());
        assert_eq!(source.get_value().unwrap(), 7.0);
    }

    #[test]
    fn file_source_rereads_on_every_call() {
        let file = write_temp("1\n");
        let source = FileSource::new(file.path());
        assert_eq!(source.get_value().unwrap(), 1.0);
        std::fs::write(file.path(), "2\n").unwrap();
        assert_eq!(source.get_value().unwrap(), 2.0);
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let source = FileSource::new(dir.path().join("nope"));
        let err = source.get_value().unwrap_err();
        assert!(!err.is_format());
        assert!(matches!(err, SourceError::Io { .. }));
    }

    #[test]
    fn id_is_the_path_as_given() {
        let source = FileSource::new("/dev/stdin");
        assert_eq!(source.id(), "/dev/stdin");
        assert_eq!(source.path(), Path::new("/dev/stdin"));
    }
}
