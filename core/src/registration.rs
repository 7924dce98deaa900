//! # Registration Check
//!
//! Idempotency guard run before any patching.

/// True if `file_name` occurs anywhere in the manifest.
///
/// Any occurrence counts (reference, build entry, group or phase member), so
/// a half-registered file is never registered a second time. Names that are
/// a substring of another registered name also count as present.
pub fn is_registered(manifest: &str, file_name: &str) -> bool {
    !file_name.is_empty() && manifest.contains(file_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_found_in_any_section() {
        let text = "\t\t\t\tAAAAAAAAAAAAAAAAAAAAAAAA /* Y.swift in Sources */,\n";
        assert!(is_registered(text, "Y.swift"));
    }

    #[test]
    fn test_absent() {
        assert!(!is_registered("/* X.swift */", "Y.swift"));
    }

    #[test]
    fn test_conservative_substring_match() {
        assert!(is_registered("/* MyY.swift */", "Y.swift"));
    }

    #[test]
    fn test_empty_name_is_never_registered() {
        assert!(!is_registered("anything", ""));
    }
}
