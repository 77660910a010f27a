use crate::common::error::{ReadingFile, Result, TempFileCreation, WriteToTempFile};
use snafu::ResultExt;
use std::{fs, io::Write, path::Path};
use tempfile::NamedTempFile as TempFile;

/// Reads the contents of a UTF-8 text file.
pub(crate) fn read_to_string<P>(filepath: P) -> Result<String>
where
    P: AsRef<Path>,
{
    fs::read_to_string(filepath.as_ref()).context(ReadingFile {
        filepath: filepath.as_ref().to_path_buf(),
    })
}

/// Write buffer to a new temporary file and return the file handle. The file is removed when
/// the handle is dropped.
pub(crate) fn write_to_tempfile(buf: &[u8]) -> Result<TempFile> {
    let mut handle: TempFile = TempFile::new().context(TempFileCreation)?;

    handle.write_all(buf).context(WriteToTempFile {
        filepath: handle.path().to_path_buf(),
    })?;
    handle.flush().context(WriteToTempFile {
        filepath: handle.path().to_path_buf(),
    })?;

    Ok(handle)
}

#[cfg(test)]
mod tests {
    use super::{read_to_string, write_to_tempfile};

    #[test]
    fn test_tempfile_round_trip() {
        let file = write_to_tempfile(b"kind: Deployment\n").unwrap();
        assert_eq!(read_to_string(file.path()).unwrap(), "kind: Deployment\n");
    }

    #[test]
    fn test_read_missing_file() {
        let err = read_to_string("/nonexistent/app.yaml").unwrap_err();
        assert!(err.to_string().starts_with("Failed to read file /nonexistent/app.yaml"));
    }
}
