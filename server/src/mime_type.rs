use std::borrow::Cow;

pub const OCTET_STREAM: &str = "application/octet-stream";

pub fn guess_mime_type(file_ext: &str) -> Option<Cow<'static, str>> {
    match file_ext {
        "pdf" => Some(Cow::Borrowed("application/pdf")),
        "doc" => Some(Cow::Borrowed("application/msword")),
        "docx" => Some(Cow::Borrowed(
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        )),
        "ppt" => Some(Cow::Borrowed("application/vnd.ms-powerpoint")),
        "pptx" => Some(Cow::Borrowed(
            "application/vnd.openxmlformats-officedocument.presentationml.presentation",
        )),
        "xls" => Some(Cow::Borrowed("application/vnd.ms-excel")),
        "xlsx" => Some(Cow::Borrowed(
            "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        )),
        "jpg" | "jpeg" => Some(Cow::Borrowed("image/jpeg")),
        "png" => Some(Cow::Borrowed("image/png")),
        "gif" => Some(Cow::Borrowed("image/gif")),
        "bmp" => Some(Cow::Borrowed("image/bmp")),
        "webp" => Some(Cow::Borrowed("image/webp")),
        "svg" => Some(Cow::Borrowed("image/svg+xml")),
        _ => None,
    }
}

/// Content type for a storage key, falling back to `application/octet-stream`
pub fn guess_mime_type_key(key: &str) -> Cow<'static, str> {
    let ext = learnnow_core::storage::file_extension(key);
    match ext.as_deref().and_then(guess_mime_type) {
        Some(m) => m,
        None => {
            tracing::warn!("can't guess MIME type for key '{}'", key);
            Cow::Borrowed(OCTET_STREAM)
        }
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn office_and_image_types() {
        assert_eq!(guess_mime_type("pdf").as_deref(), Some("application/pdf"));
        assert_eq!(
            guess_mime_type("pptx").as_deref(),
            Some("application/vnd.openxmlformats-officedocument.presentationml.presentation")
        );
        assert_eq!(guess_mime_type("png").as_deref(), Some("image/png"));
        assert_eq!(guess_mime_type("exe"), None);
        assert_eq!(
            guess_mime_type_key("6f2d8a4e-1b3c-4d5e-8f90-a1b2c3d4e5f6.docx"),
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
        );
        assert_eq!(guess_mime_type_key("6f2d8a4e-1b3c-4d5e-8f90-a1b2c3d4e5f6"), OCTET_STREAM);
    }
}
