//! Input filters
//!
//! These filters normalize raw form input before validation or submission

/// Filter: keep only ASCII digits
pub fn digits_only(input: &str) -> String {
    input.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Filter: trim surrounding whitespace
pub fn trim(input: &str) -> String {
    input.trim().to_string()
}

/// Filter: expand an expiry year to four digits
///
/// `"27"` becomes `2027`, `"2027"` stays as is. Any other digit count is
/// not a year.
pub fn normalize_expiry_year(input: &str) -> Option<i32> {
    let digits = digits_only(input);
    match digits.len() {
        2 => format!("20{}", digits).parse().ok(),
        4 => digits.parse().ok(),
        _ => None,
    }
}

/// Filter: group card digits in blocks of four for display
///
/// Non-digits are dropped and input beyond `max_digits` is cut off.
pub fn format_card_number(input: &str, max_digits: usize) -> String {
    let digits: Vec<char> = input
        .chars()
        .filter(|c| c.is_ascii_digit())
        .take(max_digits)
        .collect();

    digits
        .chunks(4)
        .map(|chunk| chunk.iter().collect::<String>())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Filter: mask all but the last four digits
pub fn mask_card_number(input: &str) -> String {
    let digits = digits_only(input);
    let visible = digits.len().saturating_sub(4);
    format!("{}{}", "*".repeat(visible), &digits[visible..])
}
