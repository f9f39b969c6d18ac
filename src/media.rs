//! Image URL normalization for API responses.

/// Turn a stored image reference into an absolute URL.
///
/// Absolute `http(s)` URLs pass through untouched, host-relative paths are
/// prefixed with `origin`, and bare file names are resolved under `/uploads/`.
pub fn absolute_image_url(origin: &str, image: &str) -> String {
    let image = image.trim();
    if image.is_empty() {
        return String::new();
    }
    if image.starts_with("http://") || image.starts_with("https://") {
        return image.to_string();
    }
    let origin = origin.trim_end_matches('/');
    if image.starts_with('/') {
        format!("{origin}{image}")
    } else {
        format!("{origin}/uploads/{image}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ORIGIN: &str = "http://shop.test:5000";

    #[test]
    fn absolute_urls_are_untouched() {
        assert_eq!(
            absolute_image_url(ORIGIN, "https://cdn.test/a.jpg"),
            "https://cdn.test/a.jpg"
        );
    }

    #[test]
    fn host_relative_paths_get_the_origin() {
        assert_eq!(
            absolute_image_url(ORIGIN, "/uploads/a.jpg"),
            "http://shop.test:5000/uploads/a.jpg"
        );
        assert_eq!(
            absolute_image_url("http://shop.test:5000/", "/img/b.png"),
            "http://shop.test:5000/img/b.png"
        );
    }

    #[test]
    fn blank_images_stay_blank() {
        assert_eq!(absolute_image_url(ORIGIN, "  "), "");
    }

    #[test]
    fn bare_names_resolve_under_uploads() {
        assert_eq!(
            absolute_image_url(ORIGIN, "1700000000.jpg"),
            "http://shop.test:5000/uploads/1700000000.jpg"
        );
    }
}
