use std::borrow::Cow;

const TRUNCATION_MARKER: &str = "\n\n[... truncated ...]\n\n";
const HEAD_SHARE_PERCENT: usize = 60;

const GENERIC_MAILBOXES: &[&str] = &[
    "kontakt", "info", "contact", "bewerbung", "jobs", "hinweise", "office", "mail", "service",
    "support", "karriere", "personal", "hr", "team", "hello", "hallo",
];

const IMAGE_SUFFIXES: &[&str] = &[".png", ".jpg", ".jpeg", ".gif", ".svg", ".webp"];

/// Lowercased, whitespace-collapsed form used for identity comparisons.
pub(crate) fn normalize_name(value: &str) -> String {
    let cleaned = value.replace(['\u{feff}', '\u{200b}', '\u{a0}'], " ");
    let collapsed = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed.to_lowercase()
}

/// Bare host of a domain or URL: no scheme, `www.`, port, path, or trailing dot.
pub(crate) fn normalize_domain(value: &str) -> Option<String> {
    let trimmed = value.trim().to_lowercase();
    let without_scheme = trimmed
        .split_once("://")
        .map(|(_, rest)| rest)
        .unwrap_or(trimmed.as_str());
    let host = without_scheme
        .split(['/', '?', '#'])
        .next()
        .unwrap_or("")
        .split(':')
        .next()
        .unwrap_or("")
        .trim_end_matches('.');
    let host = host.strip_prefix("www.").unwrap_or(host);

    (!host.is_empty() && host.contains('.')).then(|| host.to_string())
}

pub(crate) fn email_domain(email: &str) -> Option<String> {
    let (local, domain) = email.trim().rsplit_once('@')?;
    if local.is_empty() {
        return None;
    }
    normalize_domain(domain)
}

/// True when `domain` equals `company_domain` or is one of its subdomains.
pub(crate) fn domain_matches(domain: &str, company_domain: &str) -> bool {
    domain == company_domain || domain.ends_with(&format!(".{company_domain}"))
}

/// Cleans a collected address; `None` for anything that is not a usable email.
pub(crate) fn clean_email(raw: &str) -> Option<String> {
    let email = raw.trim().trim_matches(['<', '>', '"', '\'']).to_lowercase();
    let (local, domain) = email.split_once('@')?;
    if local.is_empty() || !domain.contains('.') || domain.contains('@') {
        return None;
    }
    if IMAGE_SUFFIXES.iter().any(|suffix| email.ends_with(suffix)) {
        return None;
    }
    Some(email)
}

/// Role mailboxes such as `info@` or `bewerbung@` that do not identify a person.
pub(crate) fn is_generic_mailbox(email: &str) -> bool {
    email
        .split_once('@')
        .map(|(local, _)| GENERIC_MAILBOXES.contains(&local))
        .unwrap_or(false)
}

/// Fits `text` into `budget` characters keeping both ends.
///
/// Contact and registry blocks tend to sit at the bottom of long pages, so the
/// tail is kept alongside the head instead of cutting it off.
pub(crate) fn truncate_head_tail(text: &str, budget: usize) -> Cow<'_, str> {
    let total = text.chars().count();
    if total <= budget {
        return Cow::Borrowed(text);
    }

    let marker_len = TRUNCATION_MARKER.chars().count();
    if budget <= marker_len {
        return Cow::Owned(text.chars().take(budget).collect());
    }

    let head = budget * HEAD_SHARE_PERCENT / 100;
    let tail = budget.saturating_sub(head + marker_len);

    let mut truncated = String::with_capacity(budget * 4);
    truncated.extend(text.chars().take(head));
    truncated.push_str(TRUNCATION_MARKER);
    truncated.extend(text.chars().skip(total - tail));
    Cow::Owned(truncated)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_name_collapses_whitespace_and_case() {
        assert_eq!(normalize_name("  Anna\u{a0}KAISER "), "anna kaiser");
        assert_eq!(normalize_name("Jürgen  Öztürk"), "jürgen öztürk");
    }

    #[test]
    fn normalize_domain_strips_url_parts() {
        assert_eq!(
            normalize_domain("https://www.Target.de/karriere?x=1").as_deref(),
            Some("target.de")
        );
        assert_eq!(normalize_domain("target.de:443").as_deref(), Some("target.de"));
        assert_eq!(normalize_domain("localhost"), None);
        assert_eq!(normalize_domain("  "), None);
    }

    #[test]
    fn domain_matching_accepts_subdomains_only() {
        assert!(domain_matches("target.de", "target.de"));
        assert!(domain_matches("jobs.target.de", "target.de"));
        assert!(!domain_matches("othertarget.de", "target.de"));
    }

    #[test]
    fn emails_are_cleaned() {
        assert_eq!(
            clean_email(" <A.Kaiser@Target.de> ").as_deref(),
            Some("a.kaiser@target.de")
        );
        assert_eq!(clean_email("logo@2x.png"), None);
        assert_eq!(clean_email("not-an-email"), None);
        assert_eq!(email_domain("a.kaiser@jobs.target.de").as_deref(), Some("jobs.target.de"));
        assert!(is_generic_mailbox("bewerbung@target.de"));
        assert!(!is_generic_mailbox("a.kaiser@target.de"));
    }

    #[test]
    fn short_text_is_untouched() {
        assert!(matches!(truncate_head_tail("kurz", 100), Cow::Borrowed("kurz")));
    }

    #[test]
    fn long_text_keeps_head_and_tail() {
        let text = format!("{}{}", "a".repeat(500), "Impressum: Geschäftsführer Max Muster");
        let truncated = truncate_head_tail(&text, 200);

        assert_eq!(truncated.chars().count(), 200);
        assert!(truncated.starts_with(&"a".repeat(120)));
        assert!(truncated.contains("[... truncated ...]"));
        assert!(truncated.ends_with("Geschäftsführer Max Muster"));
    }
}
