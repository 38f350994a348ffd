// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Field name conversions used by the JSON mapping.

/// Derive the lowerCamelCase JSON name of a declared field name.
///
/// Underscores are dropped and the character following each one is
/// upper-cased, matching what `protoc` writes into `json_name`.
pub fn to_json_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut capitalize_next = false;

    for c in name.chars() {
        if c == '_' {
            capitalize_next = true;
        } else if capitalize_next {
            out.extend(c.to_uppercase());
            capitalize_next = false;
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
    fn test_to_json_name() {
        assert_eq!(to_json_name("foo_bar"), "fooBar");
        assert_eq!(to_json_name("foo"), "foo");
        assert_eq!(to_json_name("foo_bar_baz"), "fooBarBaz");
        assert_eq!(to_json_name("_leading"), "Leading");
        assert_eq!(to_json_name("trailing_"), "trailing");
        assert_eq!(to_json_name("double__under"), "doubleUnder");
        assert_eq!(to_json_name("field_1"), "field1");
        assert_eq!(to_json_name("Mixed_Case"), "MixedCase");
    }
}
