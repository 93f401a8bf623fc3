//! Local media picker collaborator.

/// A single square image obtained from the local media picker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickedImage {
    /// Local URI of the asset (file path or platform URI).
    pub local_uri: String,
    /// Raw image bytes ready for upload.
    pub bytes: Vec<u8>,
}

impl PickedImage {
    /// Filename portion of the local URI.
    ///
    /// The object store key is derived from this, so two picks of files
    /// with the same name target the same key.
    #[must_use]
    pub fn file_name(&self) -> &str {
        self.local_uri
            .rsplit('/')
            .next()
            .unwrap_or(&self.local_uri)
    }

    /// MIME type guessed from the filename extension.
    #[must_use]
    pub fn content_type(&self) -> String {
        let extension = self.file_name().rsplit('.').next().unwrap_or("bin");
        format!("image/{extension}")
    }
}

/// Source of locally selected images.
///
/// An external collaborator (a platform media picker in the app, a file
/// reader in the CLI, a script in tests). Cancellation is `None`, never an
/// error.
pub trait ImagePicker {
    /// Ask the user for a single square image.
    fn pick_square_image(&self) -> impl Future<Output = Option<PickedImage>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_name_from_uri() {
        let image = PickedImage {
            local_uri: "file:///data/media/avatar.png".to_string(),
            bytes: vec![1, 2, 3],
        };
        assert_eq!(image.file_name(), "avatar.png");
    }

    #[test]
    fn test_file_name_without_slashes() {
        let image = PickedImage {
            local_uri: "avatar.png".to_string(),
            bytes: vec![],
        };
        assert_eq!(image.file_name(), "avatar.png");
    }

    #[test]
    fn test_content_type_from_extension() {
        let image = PickedImage {
            local_uri: "file:///tmp/photo.jpeg".to_string(),
            bytes: vec![],
        };
        assert_eq!(image.content_type(), "image/jpeg");
    }

    #[test]
    fn test_content_type_without_extension() {
        let image = PickedImage {
            local_uri: "file:///tmp/photo".to_string(),
            bytes: vec![],
        };
        assert_eq!(image.content_type(), "image/photo");
    }
}
