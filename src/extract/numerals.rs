// src/extract/numerals.rs
// =============================================================================
// Numeral normalization: rewrite decimal digits from other scripts as ASCII
// digits, leaving every other character alone.
//
// "۱۲۰,۰۰۰,۰۰۰ تومان" -> "120,000,000 تومان"
//
// Each supported script stores its digits 0-9 as ten consecutive code points,
// so a digit's value is its offset from that script's zero.
// =============================================================================

const DIGIT_ZEROS: [char; 6] = [
    '\u{0660}', // Arabic-Indic
    '\u{06F0}', // Extended Arabic-Indic (Persian, Urdu)
    '\u{0966}', // Devanagari
    '\u{09E6}', // Bengali
    '\u{0E50}', // Thai
    '\u{FF10}', // Fullwidth
];

/// Returns the ASCII digit for `c` if it is a decimal digit in a supported script.
pub fn latin_digit(c: char) -> Option<char> {
    if c.is_ascii_digit() {
        return Some(c);
    }
    DIGIT_ZEROS.iter().find_map(|&zero| {
        let offset = (c as u32).checked_sub(zero as u32)?;
        if offset < 10 {
            char::from_digit(offset, 10)
        } else {
            None
        }
    })
}

pub fn to_latin_digits(text: &str) -> String {
    text.chars().map(|c| latin_digit(c).unwrap_or(c)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_persian_digits() {
        assert_eq!(to_latin_digits("۱۲۳"), "123");
        assert_eq!(to_latin_digits("۰۹"), "09");
    }

    #[test]
    fn test_latin_is_unchanged() {
        assert_eq!(to_latin_digits("123"), "123");
        assert_eq!(to_latin_digits("1,000,000"), "1,000,000");
        assert_eq!(to_latin_digits(""), "");
    }

    #[test]
    fn test_surrounding_text_kept() {
        assert_eq!(to_latin_digits("۱۲۰,۰۰۰,۰۰۰ تومان"), "120,000,000 تومان");
        assert_eq!(to_latin_digits("۸۵ متر"), "85 متر");
    }

    #[test]
    fn test_other_scripts() {
        // Arabic-Indic
        assert_eq!(to_latin_digits("٤٥٦"), "456");
        // Devanagari
        assert_eq!(to_latin_digits("२०२४"), "2024");
        // Bengali
        assert_eq!(to_latin_digits("১৯"), "19");
        // Thai
        assert_eq!(to_latin_digits("๒๕๖๗"), "2567");
        // Fullwidth
        assert_eq!(to_latin_digits("７８"), "78");
    }

    #[test]
    fn test_non_digits_near_digit_blocks() {
        // Arabic thousands separator and letters next to the digit block
        assert_eq!(latin_digit('\u{066C}'), None);
        assert_eq!(latin_digit('\u{06FA}'), None);
        assert_eq!(latin_digit('a'), None);
    }
}
