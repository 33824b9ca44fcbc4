//! Archive extraction: pull one executable out of a release tarball.
//!
//! Release archives carry READMEs, licenses, and geodata next to the
//! executable; only the single expected entry is unpacked into the core
//! directory.

use std::fs;
use std::path::{Path, PathBuf};

use flate2::read::GzDecoder;
use tar::Archive;

use crate::error::InstallError;

fn extraction_failed(binary_name: &str, reason: impl ToString) -> InstallError {
    InstallError::ExtractionFailed {
        engine: binary_name.to_string(),
        reason: reason.to_string(),
    }
}

/// Extract the entry named `binary_name` from a `.tar.gz` into `output_dir`
/// and mark it executable.
pub fn extract_binary(
    archive_path: &Path,
    binary_name: &str,
    output_dir: &Path,
) -> Result<PathBuf, InstallError> {
    let file = fs::File::open(archive_path).map_err(|e| extraction_failed(binary_name, e))?;
    let mut archive = Archive::new(GzDecoder::new(file));
    let target = output_dir.join(binary_name);

    for entry in archive
        .entries()
        .map_err(|e| extraction_failed(binary_name, e))?
    {
        let mut entry = entry.map_err(|e| extraction_failed(binary_name, e))?;
        if !entry.header().entry_type().is_file() {
            continue;
        }
        let is_match = entry
            .path()
            .ok()
            .and_then(|p| p.file_name().map(|n| n == binary_name))
            .unwrap_or(false);
        if !is_match {
            continue;
        }

        entry
            .unpack(&target)
            .map_err(|e| extraction_failed(binary_name, e))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = fs::metadata(&target)
                .map_err(|e| extraction_failed(binary_name, e))?
                .permissions();
            perms.set_mode(0o755);
            fs::set_permissions(&target, perms)
                .map_err(|e| extraction_failed(binary_name, e))?;
        }

        return Ok(target);
    }

    Err(extraction_failed(
        binary_name,
        format!("{binary_name} not present in archive"),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::Compression;
    use flate2::write::GzEncoder;

    fn build_archive(path: &Path, entries: &[(&str, &[u8])]) {
        let file = fs::File::create(path).unwrap();
        let encoder = GzEncoder::new(file, Compression::default());
        let mut builder = tar::Builder::new(encoder);
        for (name, data) in entries {
            let mut header = tar::Header::new_gnu();
            header.set_size(data.len() as u64);
            header.set_mode(0o644);
            header.set_cksum();
            builder.append_data(&mut header, name, *data).unwrap();
        }
        builder.into_inner().unwrap().finish().unwrap();
    }

    #[test]
    fn extracts_only_the_expected_entry() {
        let tmp = tempfile::tempdir().unwrap();
        let archive = tmp.path().join("release.tar.gz");
        build_archive(
            &archive,
            &[
                ("README.md", b"docs".as_slice()),
                ("xray", b"\x7fELF-fake".as_slice()),
                ("geoip.dat", b"data".as_slice()),
            ],
        );

        let out = tmp.path().join("core");
        fs::create_dir_all(&out).unwrap();
        let binary = extract_binary(&archive, "xray", &out).unwrap();

        assert_eq!(binary, out.join("xray"));
        assert!(binary.is_file());
        assert!(!out.join("README.md").exists());
        assert!(!out.join("geoip.dat").exists());

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = fs::metadata(&binary).unwrap().permissions().mode();
            assert_eq!(mode & 0o755, 0o755);
        }
    }

    #[test]
    fn nested_entry_matches_by_file_name() {
        let tmp = tempfile::tempdir().unwrap();
        let archive = tmp.path().join("release.tar.gz");
        build_archive(&archive, &[("sing-box-1.8.10/sing-box", b"bin".as_slice())]);

        let out = tmp.path().join("core");
        fs::create_dir_all(&out).unwrap();
        let binary = extract_binary(&archive, "sing-box", &out).unwrap();
        assert_eq!(binary, out.join("sing-box"));
    }

    #[test]
    fn missing_entry_is_extraction_failure() {
        let tmp = tempfile::tempdir().unwrap();
        let archive = tmp.path().join("release.tar.gz");
        build_archive(&archive, &[("README.md", b"docs".as_slice())]);

        let out = tmp.path().join("core");
        fs::create_dir_all(&out).unwrap();
        let err = extract_binary(&archive, "xray", &out).unwrap_err();
        assert!(matches!(err, InstallError::ExtractionFailed { .. }));
    }
}
