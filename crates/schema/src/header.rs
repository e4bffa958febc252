use serde::Serialize;

/// One header and the key it is compared by.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeaderKey {
    pub index: usize,
    pub original: String,
    pub key: String,
}

/// Headers in column order, each paired with its comparison key.
///
/// Kept as an ordered list rather than a map: sheets do carry duplicate
/// headers, and column order decides ties during mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HeaderTransform {
    pub entries: Vec<HeaderKey>,
}

impl HeaderTransform {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &HeaderKey> {
        self.entries.iter()
    }

    /// Comparison key for an original header, if present.
    pub fn key_of(&self, original: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.original == original)
            .map(|e| e.key.as_str())
    }
}

/// Trim, collapse inner whitespace runs to one space, lower-case.
pub fn normalize_key(header: &str) -> String {
    header
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

pub fn normalize_headers<S: AsRef<str>>(raw_headers: &[S]) -> HeaderTransform {
    let entries = raw_headers
        .iter()
        .enumerate()
        .map(|(index, h)| HeaderKey {
            index,
            original: h.as_ref().to_string(),
            key: normalize_key(h.as_ref()),
        })
        .collect();
    HeaderTransform { entries }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn trims_collapses_and_lowercases() {
        assert_eq!(normalize_key("  Tanggal   Pengiriman "), "tanggal pengiriman");
        assert_eq!(normalize_key("DP\tNo"), "dp no");
        assert_eq!(normalize_key("Plant\u{a0}Name"), "plant name");
        assert_eq!(normalize_key("QTY"), "qty");
    }

    #[test]
    fn empty_header_maps_to_empty_key() {
        let t = normalize_headers(&["", "   "]);
        assert_eq!(t.len(), 2);
        assert_eq!(t.entries[0].key, "");
        assert_eq!(t.entries[1].key, "");
    }

    #[test]
    fn keeps_column_order_and_duplicates() {
        let t = normalize_headers(&["Area", "AREA", "Qty"]);
        let keys: Vec<_> = t.iter().map(|e| e.key.as_str()).collect();
        assert_eq!(keys, vec!["area", "area", "qty"]);
        assert_eq!(t.entries[1].index, 1);
        assert_eq!(t.key_of("Qty"), Some("qty"));
    }

    proptest! {
        #[test]
        fn normalization_is_idempotent(s in "[ a-zA-Z0-9\\t_.()/-]{0,40}") {
            let once = normalize_key(&s);
            prop_assert_eq!(normalize_key(&once), once.clone());
        }

        #[test]
        fn normalized_keys_have_no_edge_or_double_spaces(s in "[ a-zA-Z\\t]{0,40}") {
            let key = normalize_key(&s);
            prop_assert!(!key.starts_with(' '));
            prop_assert!(!key.ends_with(' '));
            prop_assert!(!key.contains("  "));
        }
    }
}
