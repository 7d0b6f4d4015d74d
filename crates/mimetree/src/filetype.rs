//! Filename-extension to media-type inference for attachments.

static EXTENSION_TYPES: &[(&str, &str)] = &[
    ("xml", "application/xml"),
    ("doc", "application/msword"),
    ("rtf", "application/rtf"),
    ("xls", "application/vnd.ms-excel"),
    ("ppt", "application/vnd.ms-powerpoint"),
    ("pdf", "application/pdf"),
    ("zip", "application/zip"),
    ("jpeg", "image/jpeg"),
    ("jpg", "image/jpeg"),
    ("gif", "image/gif"),
    ("tiff", "image/tiff"),
    ("tif", "image/tiff"),
    ("wav", "audio/basic"),
    ("mp3", "audio/basic"),
    ("mpg", "video/mpeg"),
    ("mpeg", "video/mpeg"),
];

/// Guesses a media type from a filename's extension.
///
/// Unknown or missing extensions map to `application/octet-stream`.
#[must_use]
pub fn content_type_for(filename: &str) -> &'static str {
    let extension = filename.rsplit('.').next().unwrap_or_default();
    if extension.len() < filename.len() {
        for (ext, media_type) in EXTENSION_TYPES {
            if ext.eq_ignore_ascii_case(extension) {
                return media_type;
            }
        }
    }
    "application/octet-stream"
}

#[cfg(test)]
mod tests {
    use super::content_type_for;

    #[test]
    fn known_extensions_map() {
        assert_eq!(content_type_for("report.pdf"), "application/pdf");
        assert_eq!(content_type_for("photo.JPG"), "image/jpeg");
        assert_eq!(content_type_for("song.mp3"), "audio/basic");
    }

    #[test]
    fn unknown_or_missing_extension_is_octet_stream() {
        assert_eq!(content_type_for("archive.tar.xz"), "application/octet-stream");
        assert_eq!(content_type_for("README"), "application/octet-stream");
        assert_eq!(content_type_for(""), "application/octet-stream");
    }
}
