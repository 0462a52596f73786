use base64::Engine;
use std::path::Path;

/// Image encodings accepted for vision questions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Jpeg,
    Png,
}

impl ImageFormat {
    /// Recognizes `.jpg`, `.jpeg` and `.png`, ignoring case.
    pub fn from_extension(path: impl AsRef<Path>) -> Option<Self> {
        let ext = path.as_ref().extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "png" => Some(Self::Png),
            _ => None,
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
        }
    }
}

/// Raw image bytes plus their encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageInput {
    pub data: Vec<u8>,
    pub format: ImageFormat,
}

impl ImageInput {
    pub fn new(data: Vec<u8>, format: ImageFormat) -> Self {
        Self { data, format }
    }

    pub fn to_base64(&self) -> String {
        base64::engine::general_purpose::STANDARD.encode(&self.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_extension() {
        assert_eq!(ImageFormat::from_extension("scan.JPG"), Some(ImageFormat::Jpeg));
        assert_eq!(ImageFormat::from_extension("a/b/photo.jpeg"), Some(ImageFormat::Jpeg));
        assert_eq!(ImageFormat::from_extension("chart.png"), Some(ImageFormat::Png));
        assert_eq!(ImageFormat::from_extension("notes.txt"), None);
        assert_eq!(ImageFormat::from_extension("no_extension"), None);
    }

    #[test]
    fn test_mime_types() {
        assert_eq!(ImageFormat::Jpeg.mime_type(), "image/jpeg");
        assert_eq!(ImageFormat::Png.mime_type(), "image/png");
    }

    #[test]
    fn test_base64_encoding() {
        let image = ImageInput::new(b"hello".to_vec(), ImageFormat::Png);
        assert_eq!(image.to_base64(), "aGVsbG8=");
    }
}
