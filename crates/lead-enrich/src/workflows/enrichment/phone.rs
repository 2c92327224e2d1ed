use std::sync::OnceLock;

use regex::Regex;

use super::domain::{PhoneKind, PhoneNumber};

const MIN_DIGITS: usize = 8;

fn mobile_patterns() -> &'static [Regex; 3] {
    static PATTERNS: OnceLock<[Regex; 3]> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [
            Regex::new(r"^(?:\+49|0049|0)1[5-7]\d").expect("valid German mobile pattern"),
            Regex::new(r"^(?:\+43|0043)6\d").expect("valid Austrian mobile pattern"),
            Regex::new(r"^(?:\+41|0041)7[6-9]\d").expect("valid Swiss mobile pattern"),
        ]
    })
}

/// Digits plus a `+` that precedes the first digit, so `(+49) 30 ...` keeps
/// its country code.
pub(crate) fn clean_number(raw: &str) -> String {
    let mut cleaned = String::with_capacity(raw.len());
    for ch in raw.trim().chars() {
        if ch.is_ascii_digit() || (ch == '+' && cleaned.is_empty()) {
            cleaned.push(ch);
        }
    }
    cleaned
}

/// Germany, Austria or Switzerland, international or domestic notation.
pub(crate) fn is_dach_number(raw: &str) -> bool {
    let cleaned = clean_number(raw);
    let digits = cleaned.chars().filter(char::is_ascii_digit).count();
    if digits < MIN_DIGITS {
        return false;
    }

    ["+49", "+43", "+41", "0049", "0043", "0041"]
        .iter()
        .any(|prefix| cleaned.starts_with(prefix))
        || (cleaned.starts_with('0') && !cleaned.starts_with("00"))
}

/// Keeps a provider's answer when it names the kind, otherwise infers it from
/// the DACH mobile ranges.
pub(crate) fn classify_kind(raw: &str, hint: PhoneKind) -> PhoneKind {
    if hint != PhoneKind::Unknown {
        return hint;
    }
    let cleaned = clean_number(raw);
    if mobile_patterns().iter().any(|pattern| pattern.is_match(&cleaned)) {
        PhoneKind::Mobile
    } else {
        PhoneKind::Landline
    }
}

/// Best DACH phone in `phones`, mobile first, otherwise the first landline.
pub(crate) fn best_dach_phone(phones: &[PhoneNumber]) -> Option<PhoneNumber> {
    let mut landline = None;
    for phone in phones.iter().filter(|phone| is_dach_number(&phone.number)) {
        let kind = classify_kind(&phone.number, phone.kind);
        let number = PhoneNumber::new(phone.number.trim(), kind);
        if kind == PhoneKind::Mobile {
            return Some(number);
        }
        landline.get_or_insert(number);
    }
    landline
}

pub(crate) fn country_label(raw: &str) -> &'static str {
    let cleaned = clean_number(raw);
    if cleaned.starts_with("+49") || cleaned.starts_with("0049") {
        "DE"
    } else if cleaned.starts_with("+43") || cleaned.starts_with("0043") {
        "AT"
    } else if cleaned.starts_with("+41") || cleaned.starts_with("0041") {
        "CH"
    } else if cleaned.starts_with('0') && !cleaned.starts_with("00") {
        "domestic"
    } else {
        "other"
    }
}
