//! Document-level types.

use std::fmt;
use std::io::{Read, Write};
use std::path::Path;
use std::sync::Arc;

use tempfile::NamedTempFile;

use crate::error::Result;

/// An input PDF, held as an immutable byte stream.
///
/// The page count is not known up front: it is discovered by the digital
/// extractor or by probing the rasterization backend, and reported on the
/// extraction result.
#[derive(Clone)]
pub struct Document {
    data: Arc<[u8]>,
}

impl Document {
    /// Wrap raw PDF bytes.
    pub fn from_bytes(data: impl Into<Vec<u8>>) -> Self {
        Self {
            data: Arc::from(data.into()),
        }
    }

    /// Read a PDF from a file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data = std::fs::read(path)?;
        Ok(Self::from_bytes(data))
    }

    /// Read a PDF from a reader.
    pub fn from_reader<R: Read>(mut reader: R) -> Result<Self> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        Ok(Self::from_bytes(data))
    }

    /// Raw document bytes.
    pub fn bytes(&self) -> &[u8] {
        &self.data
    }

    /// Size of the document in bytes.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check whether the document has no bytes at all.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Write the document to a temporary `.pdf` file for external tools.
    ///
    /// The file is deleted when the returned handle is dropped.
    pub(crate) fn materialize(&self) -> Result<NamedTempFile> {
        let mut file = tempfile::Builder::new()
            .prefix("lawlens-")
            .suffix(".pdf")
            .tempfile()?;
        file.write_all(&self.data)?;
        file.flush()?;
        Ok(file)
    }
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("len", &self.data.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_bytes() {
        let doc = Document::from_bytes(b"%PDF-1.4".to_vec());
        assert_eq!(doc.len(), 8);
        assert_eq!(doc.bytes(), b"%PDF-1.4");
        assert!(!doc.is_empty());
    }

    #[test]
    fn test_from_reader() {
        let doc = Document::from_reader(&b"%PDF-1.7\n"[..]).unwrap();
        assert_eq!(doc.len(), 9);
    }

    #[test]
    fn test_materialize_removes_file_on_drop() {
        let doc = Document::from_bytes(b"%PDF-1.4 test".to_vec());
        let file = doc.materialize().unwrap();
        let path = file.path().to_path_buf();
        assert_eq!(std::fs::read(&path).unwrap(), b"%PDF-1.4 test");
        assert!(path.extension().is_some_and(|ext| ext == "pdf"));

        drop(file);
        assert!(!path.exists());
    }

    #[test]
    fn test_debug_hides_bytes() {
        let doc = Document::from_bytes(vec![0u8; 3]);
        assert_eq!(format!("{:?}", doc), "Document { len: 3 }");
    }
}
