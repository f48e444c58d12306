use crate::common::constants::{ARCHIVE_EXTENSION, MANIFEST_EXTENSION};
use crate::domain::{DataKind, LweError, LweResult, SourceKind};
use std::ffi::OsString;
use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::{Path, PathBuf};
use zip::ZipArchive;
use zip::result::ZipError;

/// Where the manifest and the two blobs of one run are read from.
///
/// Decoding only ever sees the bytes returned here, so flat files and archive
/// entries go through identical code.
pub trait ResultSource {
    fn kind(&self) -> SourceKind;

    fn describe(&self, kind: Option<DataKind>) -> String;

    fn read_manifest(&mut self) -> LweResult<String>;

    /// Read at most `limit` bytes of a blob.
    fn read_data(&mut self, kind: DataKind, limit: usize) -> LweResult<Vec<u8>>;
}

/// `<dir>/<base>.txt` with `<dir>/<base>_Ext.dat` and `<dir>/<base>_spectrum.dat`.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    manifest_path: PathBuf,
    stem_path: PathBuf,
}

impl DirectorySource {
    pub fn new(manifest_path: impl Into<PathBuf>) -> Self {
        let manifest_path = manifest_path.into();
        let stem_path = manifest_path.with_extension("");
        Self {
            manifest_path,
            stem_path,
        }
    }

    pub fn data_path(&self, kind: DataKind) -> PathBuf {
        sibling_with_suffix(&self.stem_path, kind.suffix())
    }
}

impl ResultSource for DirectorySource {
    fn kind(&self) -> SourceKind {
        SourceKind::Directory
    }

    fn describe(&self, kind: Option<DataKind>) -> String {
        match kind {
            Some(kind) => self.data_path(kind).display().to_string(),
            None => self.manifest_path.display().to_string(),
        }
    }

    fn read_manifest(&mut self) -> LweResult<String> {
        let file = open_existing(&self.manifest_path, "manifest")?;
        let label = self.describe(None);
        manifest_text(read_limited(file, usize::MAX, &label)?, &label)
    }

    fn read_data(&mut self, kind: DataKind, limit: usize) -> LweResult<Vec<u8>> {
        let path = self.data_path(kind);
        let file = open_existing(&path, kind.as_str())?;
        read_limited(file, limit, &path.display().to_string())
    }
}

/// A `<base>.zip` holding `<base>.txt`, `<base>_Ext.dat`, `<base>_spectrum.dat`.
pub struct ArchiveSource {
    path: PathBuf,
    base: String,
    archive: ZipArchive<File>,
}

impl ArchiveSource {
    pub fn open(path: impl Into<PathBuf>) -> LweResult<Self> {
        let path = path.into();
        let base = file_stem(&path)?;
        let file = open_existing(&path, "archive")?;
        let archive = ZipArchive::new(file).map_err(|source| {
            LweError::io(
                "IO.ARCHIVE_OPEN",
                format!("failed to open archive '{}': {}", path.display(), source),
            )
        })?;
        Ok(Self {
            path,
            base,
            archive,
        })
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    fn entry_name(&self, kind: Option<DataKind>) -> String {
        match kind {
            Some(kind) => kind.entry_name(&self.base),
            None => format!("{}.{}", self.base, MANIFEST_EXTENSION),
        }
    }

    fn read_entry(&mut self, kind: Option<DataKind>, limit: usize) -> LweResult<Vec<u8>> {
        let name = self.entry_name(kind);
        let label = self.describe(kind);
        let entry = self
            .archive
            .by_name(&name)
            .map_err(|source| archive_entry_error(&label, source))?;
        read_limited(entry, limit, &label)
    }
}

impl ResultSource for ArchiveSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Archive
    }

    fn describe(&self, kind: Option<DataKind>) -> String {
        format!("{}:{}", self.path.display(), self.entry_name(kind))
    }

    fn read_manifest(&mut self) -> LweResult<String> {
        let bytes = self.read_entry(None, usize::MAX)?;
        manifest_text(bytes, &self.describe(None))
    }

    fn read_data(&mut self, kind: DataKind, limit: usize) -> LweResult<Vec<u8>> {
        self.read_entry(Some(kind), limit)
    }
}

pub fn is_archive_path(path: &Path) -> bool {
    path.extension()
        .and_then(|extension| extension.to_str())
        .is_some_and(|extension| extension.eq_ignore_ascii_case(ARCHIVE_EXTENSION))
}

pub(crate) fn file_stem(path: &Path) -> LweResult<String> {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .map(str::to_string)
        .ok_or_else(|| {
            LweError::input_validation(
                "INPUT.RESULT_PATH",
                format!("'{}' has no usable file name", path.display()),
            )
        })
}

pub(crate) fn sibling_with_suffix(stem_path: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(stem_path.as_os_str());
    name.push(suffix);
    PathBuf::from(name)
}

pub(crate) fn archive_entry_error(label: &str, source: ZipError) -> LweError {
    match source {
        ZipError::FileNotFound => {
            LweError::missing_resource(format!("archive entry '{label}' does not exist"))
        }
        other => LweError::io(
            "IO.ARCHIVE_READ",
            format!("failed to read archive entry '{label}': {other}"),
        ),
    }
}

fn open_existing(path: &Path, what: &str) -> LweResult<File> {
    File::open(path).map_err(|source| {
        if source.kind() == ErrorKind::NotFound {
            LweError::missing_resource(format!("{what} '{}' does not exist", path.display()))
        } else {
            read_error(&path.display().to_string(), source)
        }
    })
}

fn manifest_text(bytes: Vec<u8>, label: &str) -> LweResult<String> {
    String::from_utf8(bytes)
        .map_err(|_| LweError::manifest_parse(format!("'{label}' is not valid UTF-8")))
}

fn read_limited(reader: impl Read, limit: usize, label: &str) -> LweResult<Vec<u8>> {
    let mut bytes = Vec::new();
    reader
        .take(u64::try_from(limit).unwrap_or(u64::MAX))
        .read_to_end(&mut bytes)
        .map_err(|source| read_error(label, source))?;
    Ok(bytes)
}

fn read_error(label: &str, source: std::io::Error) -> LweError {
    LweError::io("IO.RESULT_READ", format!("failed to read '{label}': {source}"))
}

#[cfg(test)]
mod tests {
    use super::{ArchiveSource, DirectorySource, ResultSource, is_archive_path};
    use crate::domain::{DataKind, LweErrorKind, SourceKind};
    use std::fs::{self, File};
    use std::io::Write;
    use std::path::Path;
    use tempfile::TempDir;
    use zip::ZipWriter;
    use zip::write::SimpleFileOptions;

    #[test]
    fn directory_source_resolves_sibling_blobs() {
        let temp = TempDir::new().expect("tempdir should be created");
        let manifest = temp.path().join("run.txt");
        fs::write(&manifest, "manifest").expect("manifest should be written");
        fs::write(temp.path().join("run_Ext.dat"), [1_u8, 2, 3, 4]).expect("blob");

        let mut source = DirectorySource::new(&manifest);
        assert_eq!(source.kind(), SourceKind::Directory);
        assert_eq!(source.read_manifest().expect("manifest"), "manifest");
        assert_eq!(
            source.read_data(DataKind::Field, 2).expect("limited read"),
            vec![1, 2]
        );

        let error = source
            .read_data(DataKind::Spectrum, 8)
            .expect_err("spectrum is absent");
        assert_eq!(error.kind(), LweErrorKind::MissingResource);
    }

    #[test]
    fn archive_source_reads_named_entries() {
        let temp = TempDir::new().expect("tempdir should be created");
        let path = temp.path().join("scan.zip");
        write_archive(&path, &[("scan.txt", b"text"), ("scan_spectrum.dat", b"abcdef")]);

        let mut source = ArchiveSource::open(&path).expect("archive should open");
        assert_eq!(source.base(), "scan");
        assert_eq!(source.kind(), SourceKind::Archive);
        assert_eq!(source.read_manifest().expect("manifest"), "text");
        assert_eq!(
            source.read_data(DataKind::Spectrum, 4).expect("entry"),
            b"abcd".to_vec()
        );

        let error = source
            .read_data(DataKind::Field, 8)
            .expect_err("field entry is absent");
        assert_eq!(error.kind(), LweErrorKind::MissingResource);
        assert!(error.message().contains("scan_Ext.dat"));
    }

    #[test]
    fn archive_detection_uses_extension() {
        assert!(is_archive_path(Path::new("out/Result.zip")));
        assert!(is_archive_path(Path::new("Result.ZIP")));
        assert!(!is_archive_path(Path::new("Result.txt")));
    }

    fn write_archive(path: &Path, entries: &[(&str, &[u8])]) {
        let mut writer = ZipWriter::new(File::create(path).expect("archive file"));
        for (name, bytes) in entries {
            writer
                .start_file(*name, SimpleFileOptions::default())
                .expect("entry should start");
            writer.write_all(bytes).expect("entry should be written");
        }
        writer.finish().expect("archive should finish");
    }

    #[test]
    fn non_utf8_manifest_is_a_parse_error_for_both_sources() {
        let temp = TempDir::new().expect("tempdir should be created");
        let bytes: &[u8] = &[b'N', b's', 0xff, 0xfe, b'\n'];
        let manifest = temp.path().join("bad.txt");
        fs::write(&manifest, bytes).expect("manifest should be written");
        let archive = temp.path().join("bad.zip");
        write_archive(&archive, &[("bad.txt", bytes)]);

        let flat = DirectorySource::new(&manifest)
            .read_manifest()
            .expect_err("flat manifest is not text");
        let packed = ArchiveSource::open(&archive)
            .expect("archive should open")
            .read_manifest()
            .expect_err("archived manifest is not text");
        assert_eq!(flat.kind(), LweErrorKind::ManifestParse);
        assert_eq!(packed.kind(), LweErrorKind::ManifestParse);
    }
}
