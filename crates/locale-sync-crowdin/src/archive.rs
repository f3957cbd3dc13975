use std::fs;
use std::io::{self, Cursor};
use std::path::Path;

use locale_sync::SyncError;

/// Unpack a zip archive into `destination`, returning the number of files
/// written. Entries whose names would escape `destination` are skipped.
pub fn extract_zip(bytes: &[u8], destination: &Path) -> Result<usize, SyncError> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| SyncError::Archive(format!("failed to open zip: {e}")))?;

    let mut written = 0;
    for index in 0..archive.len() {
        let mut entry = archive
            .by_index(index)
            .map_err(|e| SyncError::Archive(format!("failed to read zip entry {index}: {e}")))?;

        let Some(relative) = entry.enclosed_name() else {
            tracing::warn!("skipping zip entry with unsafe path: {}", entry.name());
            continue;
        };
        let target = destination.join(relative);

        if entry.is_dir() {
            fs::create_dir_all(&target)?;
            continue;
        }
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut file = fs::File::create(&target)?;
        io::copy(&mut entry, &mut file)?;
        written += 1;
    }

    Ok(written)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use zip::write::SimpleFileOptions;

    use super::*;

    fn build_zip(entries: &[(&str, &str)]) -> Vec<u8> {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        for (name, content) in entries {
            writer.start_file(*name, SimpleFileOptions::default()).unwrap();
            writer.write_all(content.as_bytes()).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn extracts_nested_files() {
        let bytes = build_zip(&[
            ("fr/Mod (owner)/a.ini", "[s]\nkey=Clé\n"),
            ("de/Mod (owner)/a.ini", "[s]\n"),
        ]);
        let dir = tempfile::tempdir().unwrap();

        let written = extract_zip(&bytes, dir.path()).unwrap();

        assert_eq!(written, 2);
        assert_eq!(
            fs::read_to_string(dir.path().join("fr/Mod (owner)/a.ini")).unwrap(),
            "[s]\nkey=Clé\n"
        );
    }

    #[test]
    fn rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let result = extract_zip(b"not a zip", dir.path());
        assert!(matches!(result, Err(SyncError::Archive(_))));
    }
}
