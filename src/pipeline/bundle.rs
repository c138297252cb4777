//! Zip bundling of several outputs into one downloadable archive.
//!
//! PNG data is already deflate-compressed, so entries are stored as-is.

use crate::error::ConvertError;
use crate::output::OutputFile;
use std::io::{Cursor, Write};
use tracing::debug;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Pack `files` into a zip archive named `name`, preserving their order and
/// filenames.
pub fn bundle(files: &[OutputFile], name: &str) -> Result<Vec<u8>, ConvertError> {
    let archive_err = |detail: String| ConvertError::ArchiveFailed {
        name: name.to_string(),
        detail,
    };

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    for file in files {
        let options: FileOptions<()> =
            FileOptions::default().compression_method(CompressionMethod::Stored);
        zip.start_file(file.filename.as_str(), options)
            .map_err(|e| archive_err(e.to_string()))?;
        zip.write_all(&file.bytes)
            .map_err(|e| archive_err(e.to_string()))?;
    }
    let bytes = zip
        .finish()
        .map_err(|e| archive_err(e.to_string()))?
        .into_inner();

    debug!("Bundled {} files into '{}' ({} bytes)", files.len(), name, bytes.len());
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::MIME_PNG;
    use std::io::Read;
    use zip::ZipArchive;

    #[test]
    fn entries_keep_order_names_and_bytes() {
        let files = vec![
            OutputFile::new("page_1.png", b"one".to_vec(), MIME_PNG),
            OutputFile::new("page_2.png", b"two".to_vec(), MIME_PNG),
        ];
        let bytes = bundle(&files, "pdf_images.zip").unwrap();

        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        assert_eq!(archive.len(), 2);
        for (i, expected) in files.iter().enumerate() {
            let mut entry = archive.by_index(i).unwrap();
            assert_eq!(entry.name(), expected.filename);
            let mut data = Vec::new();
            entry.read_to_end(&mut data).unwrap();
            assert_eq!(data, expected.bytes);
        }
    }

    #[test]
    fn empty_bundle_is_a_valid_archive() {
        let bytes = bundle(&[], "empty.zip").unwrap();
        let archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        assert_eq!(archive.len(), 0);
    }
}
