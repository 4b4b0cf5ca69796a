use std::path::Path;

use chrono::Utc;

/// Prefixes the original file name with the current unix-millis timestamp so
/// concurrent uploads of the same file name cannot collide on disk. Only the
/// final path component of the client-supplied name is kept; anything without
/// one falls back to `image`.
pub fn unique_filename(original: &str) -> String {
    let name = Path::new(original)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("image");

    format!("{}-{}", Utc::now().timestamp_millis(), name)
}

/// Map link stored at filing time, built from the raw form values.
pub fn filing_map_link(raw_lat: &str, raw_lng: &str) -> String {
    format!("https://www.google.com/maps?q={raw_lat},{raw_lng}")
}

/// Map link re-derived when listing, built from the stored coordinates.
pub fn listing_map_link(lat: f64, lng: f64) -> String {
    format!("https://maps.google.com/?q={lat},{lng}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unique_filename_keeps_original_name() {
        let name = unique_filename("pothole.jpg");
        assert!(name.ends_with("-pothole.jpg"));

        let (prefix, _) = name.split_once('-').unwrap();
        assert!(prefix.parse::<i64>().is_ok());
    }

    #[test]
    fn unique_filename_strips_directory_components() {
        let name = unique_filename("../escape.txt");
        assert!(name.ends_with("-escape.txt"));
        assert!(!name.contains(".."));
        assert!(!name.contains('/'));

        let name = unique_filename("nested/dir/photo.jpg");
        assert!(name.ends_with("-photo.jpg"));
        assert!(!name.contains('/'));
    }

    #[test]
    fn unique_filename_falls_back_for_pathological_names() {
        assert!(unique_filename("").ends_with("-image"));
        assert!(unique_filename("..").ends_with("-image"));
    }

    #[test]
    fn filing_map_link_uses_raw_values_verbatim() {
        assert_eq!(
            filing_map_link("10", "20"),
            "https://www.google.com/maps?q=10,20"
        );
    }

    #[test]
    fn listing_map_link_formats_coordinates() {
        assert_eq!(
            listing_map_link(12.9716, 77.5946),
            "https://maps.google.com/?q=12.9716,77.5946"
        );
    }
}
