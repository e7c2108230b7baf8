use std::collections::HashMap;

/// A file part received from a multipart form, held in memory.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub field_name: String,
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
    /// Set when the part was larger than the reader was willing to buffer.
    pub truncated: bool,
}

impl UploadedFile {
    pub fn size(&self) -> usize {
        self.bytes.len()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Jpeg,
    Png,
}

impl ImageKind {
    pub fn sniff(bytes: &[u8]) -> Option<ImageKind> {
        if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
            Some(ImageKind::Jpeg)
        } else if bytes.starts_with(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]) {
            Some(ImageKind::Png)
        } else {
            None
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ImageKind::Jpeg => "jpg",
            ImageKind::Png => "png",
        }
    }
}

/// Which document slot a file belongs to and where it is kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentSlot {
    KtpPhoto,
    SelfiePhoto,
    Signature,
}

impl DocumentSlot {
    pub const ALL: [DocumentSlot; 3] = [
        DocumentSlot::KtpPhoto,
        DocumentSlot::SelfiePhoto,
        DocumentSlot::Signature,
    ];

    pub fn field(&self) -> &'static str {
        match self {
            DocumentSlot::KtpPhoto => "ktp_photo",
            DocumentSlot::SelfiePhoto => "selfie_photo",
            DocumentSlot::Signature => "signature",
        }
    }

    pub fn directory(&self) -> &'static str {
        match self {
            DocumentSlot::KtpPhoto | DocumentSlot::SelfiePhoto => "documents",
            DocumentSlot::Signature => "signatures",
        }
    }

    pub fn max_kilobytes(&self) -> usize {
        match self {
            DocumentSlot::KtpPhoto | DocumentSlot::SelfiePhoto => 2048,
            DocumentSlot::Signature => 1024,
        }
    }
}

/// Why a text part was dropped instead of being kept as a field value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextRejection {
    TooLong,
    NotUtf8,
}

/// Raw profile form: text fields plus uploaded documents, keyed by field name.
#[derive(Debug, Clone, Default)]
pub struct ProfileSubmission {
    pub fields: HashMap<String, String>,
    pub files: HashMap<String, UploadedFile>,
    pub rejected: HashMap<String, TextRejection>,
}

impl ProfileSubmission {
    /// Trimmed text value; blank input counts as not supplied.
    pub fn text(&self, field: &str) -> Option<&str> {
        self.fields
            .get(field)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    pub fn file(&self, field: &str) -> Option<&UploadedFile> {
        self.files.get(field).filter(|f| f.size() > 0 || f.truncated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sniffs_jpeg_and_png() {
        assert_eq!(
            ImageKind::sniff(&[0xFF, 0xD8, 0xFF, 0xE0, 0x00]),
            Some(ImageKind::Jpeg)
        );
        assert_eq!(
            ImageKind::sniff(b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR"),
            Some(ImageKind::Png)
        );
        assert_eq!(ImageKind::sniff(b"GIF89a"), None);
        assert_eq!(ImageKind::sniff(b""), None);
    }

    #[test]
    fn blank_text_is_not_supplied() {
        let mut submission = ProfileSubmission::default();
        submission
            .fields
            .insert("job".to_string(), "   ".to_string());
        submission
            .fields
            .insert("bank_name".to_string(), " BCA ".to_string());

        assert_eq!(submission.text("job"), None);
        assert_eq!(submission.text("bank_name"), Some("BCA"));
        assert_eq!(submission.text("address"), None);
    }
}
