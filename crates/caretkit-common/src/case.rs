//! Style-property key casing.

/// Separators recognized by [`camelize_key`].
pub const DEFAULT_SEPARATORS: &[char] = &['-', '_'];

/// Convert a hyphen- or underscore-separated key to camel case.
///
/// `"max-width"` becomes `"maxWidth"`, `"padding_top"` becomes `"paddingTop"`.
pub fn camelize_key(key: &str) -> String {
    camelize_key_with(key, DEFAULT_SEPARATORS)
}

/// Convert `key` to camel case, treating every char in `separators` as a
/// word boundary. The character after a separator is upper-cased and the
/// separator dropped; a trailing separator is dropped.
pub fn camelize_key_with(key: &str, separators: &[char]) -> String {
    let mut out = String::with_capacity(key.len());
    let mut chars = key.chars();

    while let Some(c) = chars.next() {
        if separators.contains(&c) {
            if let Some(next) = chars.next() {
                out.extend(next.to_uppercase());
            }
        } else {
            out.push(c);
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_camelize_hyphenated() {
        assert_eq!(camelize_key("max-width"), "maxWidth");
        assert_eq!(camelize_key("border-left-width"), "borderLeftWidth");
    }

    #[test]
    fn test_camelize_underscored() {
        assert_eq!(camelize_key("padding_top"), "paddingTop");
    }

    #[test]
    fn test_camelize_plain_key_unchanged() {
        assert_eq!(camelize_key("width"), "width");
        assert_eq!(camelize_key(""), "");
    }

    #[test]
    fn test_camelize_trailing_separator() {
        assert_eq!(camelize_key("width-"), "width");
    }

    #[test]
    fn test_camelize_custom_separators() {
        assert_eq!(camelize_key_with("font.size", &['.']), "fontSize");
        assert_eq!(camelize_key_with("font-size", &['.']), "font-size");
    }
}
