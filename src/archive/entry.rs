//! Deterministic tar entry emission
//!
//! Entries carry synthetic metadata only: fixed modes, epoch mtime, no owner
//! names. Two runs over the same logical content produce identical bytes.

use crate::config::{ENTRY_MTIME, REGULAR_FILE_MODE, SYMLINK_MODE};
use crate::error::{ArchiveError, Result};
use std::io::{self, Read, Write};
use tar::{Builder, EntryType, Header};

/// Synthetic file metadata describing one archive entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryDescriptor<'a> {
    pub path: &'a str,
    pub size: u64,
    pub symlink_target: Option<&'a str>,
}

impl<'a> EntryDescriptor<'a> {
    pub fn file(path: &'a str, size: u64) -> Self {
        Self {
            path,
            size,
            symlink_target: None,
        }
    }

    pub fn symlink(path: &'a str, target: &'a str) -> Self {
        Self {
            path,
            size: 0,
            symlink_target: Some(target),
        }
    }

    pub fn mode(&self) -> u32 {
        if self.symlink_target.is_some() {
            SYMLINK_MODE
        } else {
            REGULAR_FILE_MODE
        }
    }

    /// Build the GNU header for this entry, without its path.
    ///
    /// The path and link target are filled in by the builder, which adds
    /// long-name extension entries for names that do not fit the header.
    pub fn header(&self) -> Header {
        let mut header = Header::new_gnu();
        header.set_mode(self.mode());
        header.set_mtime(ENTRY_MTIME);
        header.set_uid(0);
        header.set_gid(0);
        if self.symlink_target.is_some() {
            header.set_entry_type(EntryType::Symlink);
            header.set_size(0);
        } else {
            header.set_entry_type(EntryType::Regular);
            header.set_size(self.size);
        }
        header
    }
}

/// Counts bytes handed to the tar builder
struct CountingReader<R> {
    inner: R,
    count: u64,
}

impl<R: Read> Read for CountingReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.count += n as u64;
        Ok(n)
    }
}

/// Writes entries into a tar stream with fixed, content-independent metadata
pub struct EntryEmitter<W: Write> {
    tar: Builder<W>,
}

impl<W: Write> EntryEmitter<W> {
    pub fn new(dest: W) -> Self {
        Self {
            tar: Builder::new(dest),
        }
    }

    /// Sends a symlink `path -> target` into the tar stream.
    pub fn send_symlink(&mut self, path: &str, target: &str) -> Result<()> {
        let mut header = EntryDescriptor::symlink(path, target).header();
        tracing::debug!("Sending as tar link {} -> {}", path, target);
        self.tar
            .append_link(&mut header, path, target)
            .map_err(|e| ArchiveError::io(path, e))
    }

    /// Sends an in-memory file into the tar stream.
    pub fn send_bytes(&mut self, path: &str, data: &[u8]) -> Result<()> {
        self.send_file(path, data.len() as u64, data)
    }

    /// Sends exactly `expected_size` bytes read from `stream` as a regular file.
    ///
    /// A stream shorter or longer than `expected_size` fails with
    /// [`ArchiveError::SizeMismatch`]; the archive is unusable afterwards.
    pub fn send_file<R: Read>(
        &mut self,
        path: &str,
        expected_size: u64,
        mut stream: R,
    ) -> Result<()> {
        let mut header = EntryDescriptor::file(path, expected_size).header();
        tracing::debug!("Sending as tar file {}", path);

        let mut payload = CountingReader {
            inner: (&mut stream).take(expected_size),
            count: 0,
        };
        self.tar
            .append_data(&mut header, path, &mut payload)
            .map_err(|e| ArchiveError::io(path, e))?;

        let mut actual = payload.count;
        if actual == expected_size {
            // The header is already committed; anything left over is a size lie.
            let trailing = io::copy(&mut stream, &mut io::sink())
                .map_err(|e| ArchiveError::io(path, e))?;
            actual += trailing;
        }
        if actual != expected_size {
            return Err(ArchiveError::SizeMismatch {
                path: path.to_string(),
                expected: expected_size,
                actual,
            });
        }
        Ok(())
    }

    /// Writes the end-of-archive marker and returns the destination.
    pub fn finish(self) -> Result<W> {
        self.tar
            .into_inner()
            .map_err(|e| ArchiveError::io("<end of archive>", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorClass;
    use std::io::Cursor;

    struct BrokenPipe;

    impl Write for BrokenPipe {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "destination closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    /// Yields `good` bytes, then fails.
    struct FailingSource {
        good: usize,
    }

    impl Read for FailingSource {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.good == 0 {
                return Err(io::Error::new(io::ErrorKind::ConnectionReset, "source reset"));
            }
            let n = self.good.min(buf.len());
            buf[..n].fill(b'x');
            self.good -= n;
            Ok(n)
        }
    }

    fn read_entries(data: Vec<u8>) -> Vec<(String, EntryType, u32, u64, Vec<u8>)> {
        let mut archive = tar::Archive::new(Cursor::new(data));
        archive
            .entries()
            .unwrap()
            .map(|entry| {
                let mut entry = entry.unwrap();
                let path = entry.path().unwrap().to_string_lossy().to_string();
                let header = entry.header().clone();
                let mut body = Vec::new();
                entry.read_to_end(&mut body).unwrap();
                (
                    path,
                    header.entry_type(),
                    header.mode().unwrap(),
                    header.mtime().unwrap(),
                    body,
                )
            })
            .collect()
    }

    #[test]
    fn test_regular_file_has_fixed_metadata() {
        let mut emitter = EntryEmitter::new(Vec::new());
        emitter.send_bytes("dir/VERSION", b"1.0").unwrap();
        let entries = read_entries(emitter.finish().unwrap());

        assert_eq!(entries.len(), 1);
        let (path, kind, mode, mtime, body) = &entries[0];
        assert_eq!(path, "dir/VERSION");
        assert_eq!(*kind, EntryType::Regular);
        assert_eq!(*mode, 0o444);
        assert_eq!(*mtime, 0);
        assert_eq!(body, b"1.0");
    }

    #[test]
    fn test_symlink_has_zero_size_and_target() {
        let mut emitter = EntryEmitter::new(Vec::new());
        emitter.send_symlink("abc/layer.tar", "../abc.tar").unwrap();
        let data = emitter.finish().unwrap();

        let mut archive = tar::Archive::new(Cursor::new(data));
        let entry = archive.entries().unwrap().next().unwrap().unwrap();
        assert_eq!(entry.header().entry_type(), EntryType::Symlink);
        assert_eq!(entry.header().size().unwrap(), 0);
        assert_eq!(entry.header().mtime().unwrap(), 0);
        assert_eq!(
            entry.link_name().unwrap().unwrap().to_string_lossy(),
            "../abc.tar"
        );
    }

    #[test]
    fn test_short_stream_is_size_mismatch() {
        let mut emitter = EntryEmitter::new(Vec::new());
        let err = emitter
            .send_file("short.tar", 10, &b"12345"[..])
            .unwrap_err();
        match err {
            ArchiveError::SizeMismatch { expected, actual, .. } => {
                assert_eq!(expected, 10);
                assert_eq!(actual, 5);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_long_stream_is_size_mismatch() {
        let mut emitter = EntryEmitter::new(Vec::new());
        let err = emitter
            .send_file("long.tar", 3, &b"123456"[..])
            .unwrap_err();
        match err {
            ArchiveError::SizeMismatch { path, expected, actual } => {
                assert_eq!(path, "long.tar");
                assert_eq!(expected, 3);
                assert_eq!(actual, 6);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_identical_input_gives_identical_bytes() {
        let build = || {
            let mut emitter = EntryEmitter::new(Vec::new());
            emitter.send_bytes("a.json", b"{}").unwrap();
            emitter.send_symlink("x/layer.tar", "../a.tar").unwrap();
            emitter.finish().unwrap()
        };
        assert_eq!(build(), build());
    }

    #[test]
    fn test_failing_destination_is_io_failure_naming_path() {
        let mut emitter = EntryEmitter::new(BrokenPipe);
        let err = emitter.send_bytes("abc/VERSION", b"1.0").unwrap_err();
        assert_eq!(err.class(), ErrorClass::IoFailure);
        assert!(err.to_string().contains("abc/VERSION"));

        let err = emitter
            .send_symlink("abc/layer.tar", "../abc.tar")
            .unwrap_err();
        assert_eq!(err.class(), ErrorClass::IoFailure);
        assert!(err.to_string().contains("abc/layer.tar"));
    }

    #[test]
    fn test_source_error_mid_stream_is_io_failure_naming_path() {
        let mut emitter = EntryEmitter::new(Vec::new());
        let err = emitter
            .send_file("layer.tar", 100_000, FailingSource { good: 10_000 })
            .unwrap_err();
        match &err {
            ArchiveError::Io { path, source } => {
                assert_eq!(path, "layer.tar");
                assert_eq!(source.kind(), io::ErrorKind::ConnectionReset);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(err.class(), ErrorClass::IoFailure);
    }

    #[test]
    fn test_long_names_and_targets_are_preserved() {
        let hex = "ab".repeat(64);
        let file = format!("{}.tar", hex);
        let dir_file = format!("{}/VERSION", hex);
        let link = format!("{}/layer.tar", hex);
        let target = format!("../{}", file);

        let mut emitter = EntryEmitter::new(Vec::new());
        emitter.send_bytes(&file, b"abc").unwrap();
        emitter.send_bytes(&dir_file, b"1.0").unwrap();
        emitter.send_symlink(&link, &target).unwrap();
        let data = emitter.finish().unwrap();

        let mut archive = tar::Archive::new(Cursor::new(data));
        let entries: Vec<(String, EntryType, u32, Option<String>)> = archive
            .entries()
            .unwrap()
            .map(|entry| {
                let entry = entry.unwrap();
                (
                    entry.path().unwrap().to_string_lossy().to_string(),
                    entry.header().entry_type(),
                    entry.header().mode().unwrap(),
                    entry
                        .link_name()
                        .unwrap()
                        .map(|l| l.to_string_lossy().to_string()),
                )
            })
            .collect();

        assert_eq!(
            entries,
            vec![
                (file, EntryType::Regular, 0o444, None),
                (dir_file, EntryType::Regular, 0o444, None),
                (link, EntryType::Symlink, 0, Some(target)),
            ]
        );
    }
}
