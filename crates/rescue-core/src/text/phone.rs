//! Thai phone number formatting.

use super::patterns::{PHONE_RUN, THAI_COUNTRY_PREFIX};

/// Format a free-form phone string for display.
///
/// - mobile (10 digits, leading 0): `0XX-XXX-XXXX`
/// - Bangkok landline (9 digits, leading 02): `02-XXX-XXXX`
/// - provincial landline (9 digits, leading 0): `0XX-XXX-XXX`
///
/// A `+66`/`66` country prefix is rewritten to the national `0`. Text with
/// letters (`"โทร 0812345678"`) has its number formatted in place when it
/// holds exactly one digit run. Anything else comes back trimmed but
/// otherwise unchanged. Idempotent.
pub fn format_phone(raw: &str) -> String {
    let trimmed = raw.trim();

    if trimmed.chars().any(char::is_alphabetic) {
        return format_embedded(trimmed);
    }

    format_number(trimmed).unwrap_or_else(|| trimmed.to_string())
}

/// Format the single phone-like run in a labelled value. Several runs, or a
/// run that is not a Thai number, leave the text alone.
fn format_embedded(text: &str) -> String {
    let mut runs = PHONE_RUN.find_iter(text);
    let (Some(run), None) = (runs.next(), runs.next()) else {
        return text.to_string();
    };

    match format_number(run.as_str()) {
        Some(formatted) => format!("{}{}{}", &text[..run.start()], formatted, &text[run.end()..]),
        None => text.to_string(),
    }
}

fn format_number(text: &str) -> Option<String> {
    let digits = national_digits(text);

    match (digits.len(), digits.as_bytes()) {
        (10, [b'0', ..]) => Some(format!("{}-{}-{}", &digits[0..3], &digits[3..6], &digits[6..10])),
        (9, [b'0', b'2', ..]) => Some(format!("{}-{}-{}", &digits[0..2], &digits[2..5], &digits[5..9])),
        (9, [b'0', ..]) => Some(format!("{}-{}-{}", &digits[0..3], &digits[3..6], &digits[6..9])),
        _ => None,
    }
}

/// Split a comma-separated phone list, dropping empty entries and formatting
/// the rest. Order is preserved; duplicates are kept.
pub fn split_phones(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(format_phone)
        .collect()
}

fn national_digits(text: &str) -> String {
    let compact: String = text
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '+')
        .collect();

    let digits: String = compact.chars().filter(char::is_ascii_digit).collect();

    // 66 + 8 or 9 national digits (the trunk 0 is dropped internationally)
    if THAI_COUNTRY_PREFIX.is_match(&compact) && (digits.len() == 10 || digits.len() == 11) {
        return format!("0{}", &digits[2..]);
    }

    digits
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_format_mobile() {
        assert_eq!(format_phone("0812345678"), "081-234-5678");
        assert_eq!(format_phone("081 234 5678"), "081-234-5678");
        assert_eq!(format_phone("(081)234-5678"), "081-234-5678");
        assert_eq!(format_phone("081-234-5678"), "081-234-5678");
    }

    #[test]
    fn test_format_landline() {
        assert_eq!(format_phone("021234567"), "02-123-4567");
        assert_eq!(format_phone("053123456"), "053-123-456");
    }

    #[test]
    fn test_format_country_prefix() {
        assert_eq!(format_phone("+66812345678"), "081-234-5678");
        assert_eq!(format_phone("+66 2 123 4567"), "02-123-4567");
        assert_eq!(format_phone("66812345678"), "081-234-5678");
    }

    #[test]
    fn test_format_passthrough() {
        assert_eq!(format_phone("  1669 "), "1669");
        assert_eq!(format_phone("call village head"), "call village head");
        assert_eq!(format_phone("12345"), "12345");
        assert_eq!(format_phone(""), "");
    }

    #[test]
    fn test_format_labelled_number() {
        assert_eq!(format_phone("โทร 0812345678"), "โทร 081-234-5678");
        assert_eq!(format_phone("Tel: +66 81 234 5678 (ลูกสาว)"), "Tel: 081-234-5678 (ลูกสาว)");
        assert_eq!(format_phone("บ้าน 02 123 4567"), "บ้าน 02-123-4567");
        assert_eq!(format_phone("โทร 081-234-5678"), "โทร 081-234-5678");
    }

    #[test]
    fn test_format_labelled_ambiguous() {
        assert_eq!(
            format_phone("พ่อ 0811111111 แม่ 0822222222"),
            "พ่อ 0811111111 แม่ 0822222222"
        );
        assert_eq!(format_phone("ผู้ใหญ่บ้าน 1669"), "ผู้ใหญ่บ้าน 1669");
        assert_eq!(format_phone("ref 12345678901"), "ref 12345678901");
    }

    #[test]
    fn test_format_idempotent() {
        let samples = [
            "0812345678",
            "+66812345678",
            "021234567",
            "053123456",
            " 1669 ",
            "ext 12",
            "08-1234-5678",
            "66 81 234 5678",
            "โทร 0812345678",
            "Tel +66812345678 ด่วน",
            "",
        ];
        for s in samples {
            let once = format_phone(s);
            assert_eq!(format_phone(&once), once, "not idempotent for {:?}", s);
        }
    }

    #[test]
    fn test_split_phones() {
        assert_eq!(
            split_phones("081-111-1111, 0822222222"),
            vec!["081-111-1111", "082-222-2222"]
        );
        assert_eq!(split_phones(" , 0812345678,, "), vec!["081-234-5678"]);
        assert!(split_phones("").is_empty());
    }
}
