//! Identifier case conversion.
//!
//! Word splitting is left to `heck`; on top of it, a letter directly after a
//! digit starts a new word in the camel styles (`v4address` → `V4Address`).
use heck::ToLowerCamelCase;
use heck::ToSnakeCase;
use heck::ToUpperCamelCase;

/// `SampleTable Set` → `sample_table_set`
pub(crate) fn to_snake(value: &str) -> String {
    value.to_snake_case()
}

/// `created_at` → `CreatedAt`
pub(crate) fn to_camel(value: &str) -> String {
    capitalize_after_digits(&value.to_upper_camel_case())
}

/// `sample_table` → `sampleTable`
pub(crate) fn to_lower_camel(value: &str) -> String {
    capitalize_after_digits(&value.to_lower_camel_case())
}

fn capitalize_after_digits(value: &str) -> String {
    let mut result = String::with_capacity(value.len());
    let mut after_digit = false;
    for character in value.chars() {
        if after_digit {
            result.extend(character.to_uppercase());
        } else {
            result.push(character);
        }
        after_digit = character.is_ascii_digit();
    }
    result
}
