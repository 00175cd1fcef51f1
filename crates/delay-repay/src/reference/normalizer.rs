pub(crate) fn normalize_name(value: &str) -> String {
    let cleaned = value.replace(['\u{feff}', '\u{200b}'], "");
    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub(crate) fn normalize_code(value: &str) -> String {
    normalize_name(value).to_ascii_uppercase()
}

/// Placeholder codes used by the source tables for "operator not known".
pub(crate) fn is_placeholder_code(code: &str) -> bool {
    matches!(code, "" | "ZZ" | "UNKNOWN")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_name_strips_invisible_characters() {
        assert_eq!(
            normalize_name("\u{feff}Great  Western\u{200b} Railway "),
            "Great Western Railway"
        );
    }

    #[test]
    fn normalize_code_uppercases() {
        assert_eq!(normalize_code(" xc "), "XC");
    }

    #[test]
    fn placeholder_codes_are_recognized() {
        assert!(is_placeholder_code(""));
        assert!(is_placeholder_code("ZZ"));
        assert!(is_placeholder_code("UNKNOWN"));
        assert!(!is_placeholder_code("GW"));
    }
}
