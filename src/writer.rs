//! Output writing.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::Error;

/// Name of the generated module inside the output directory.
pub const OUTPUT_FILE: &str = "client.ts";

/// Write the generated text under `dir`, creating it if needed.
pub fn write_output(dir: &Path, text: &str) -> Result<PathBuf, Error> {
    fs::create_dir_all(dir).map_err(|source| Error::Write {
        path: dir.to_path_buf(),
        source,
    })?;
    let path = dir.join(OUTPUT_FILE);
    fs::write(&path, text).map_err(|source| Error::Write {
        path: path.clone(),
        source,
    })?;
    info!(path = %path.display(), bytes = text.len(), "wrote generated client");
    Ok(path)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_creates_directory_and_writes() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("out/generated");
        let path = write_output(&nested, "export {};\n").unwrap();
        assert_eq!(path, nested.join(OUTPUT_FILE));
        assert_eq!(fs::read_to_string(path).unwrap(), "export {};\n");
    }

    #[test]
    fn test_overwrites_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        write_output(dir.path(), "one").unwrap();
        let path = write_output(dir.path(), "two").unwrap();
        assert_eq!(fs::read_to_string(path).unwrap(), "two");
    }
}
