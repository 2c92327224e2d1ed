use super::super::domain::{Candidate, RoleClass};
use super::super::text::{domain_matches, email_domain, normalize_domain, normalize_name};

const MIN_NAME_CHARS: usize = 3;
const MAX_NAME_CHARS: usize = 60;

/// Words that never appear in a personal name but do appear in page chrome.
const BLOCKED_WORDS: &[&str] = &[
    "karriere", "jobs", "job", "stellenangebote", "kontakt", "impressum", "datenschutz", "cookie",
    "cookies", "agb", "startseite", "navigation", "menü", "übersicht", "angebot", "weitere",
    "möglichkeiten", "helfen", "weiterlesen", "unsere", "unser", "gmbh", "ag", "kg", "mbh",
];

const BLOCKED_PHRASES: &[&str] = &[
    "mehr erfahren",
    "hier klicken",
    "jetzt bewerben",
    "alle rechte",
    "nutzungsbedingungen",
    "unser team",
];

const RECRUITING_MARKERS: &[&str] = &[
    "human resources",
    "personal",
    "recruit",
    "talent",
    "people",
];
const EXECUTIVE_MARKERS: &[&str] = &[
    "geschäftsführer",
    "geschäftsführerin",
    "geschaeftsfuehrer",
    "geschäftsleitung",
    "managing director",
    "inhaber",
    "owner",
    "vorstand",
    "founder",
    "gründer",
    "prokurist",
];
const EXECUTIVE_ACRONYMS: &[&str] = &["ceo", "cfo", "cto", "coo"];
const TEAM_LEAD_MARKERS: &[&str] = &["leiter", "leitung", "head of", "team lead", "lead"];

pub(crate) fn prefilter_name(name: &str) -> Result<(), String> {
    let name = name.trim();
    let length = name.chars().count();
    if length < MIN_NAME_CHARS {
        return Err("name too short".to_string());
    }
    if length > MAX_NAME_CHARS {
        return Err("name too long".to_string());
    }
    if name.split_whitespace().count() < 2 {
        return Err("single word, not a full name".to_string());
    }
    if name
        .chars()
        .any(|ch| ch.is_ascii_digit() || matches!(ch, '@' | '&' | '|' | '/' | ':'))
    {
        return Err("contains characters that do not occur in names".to_string());
    }

    let lowered = normalize_name(name);
    if let Some(word) = words(&lowered).find(|word| BLOCKED_WORDS.contains(word)) {
        return Err(format!("contains non-name word '{word}'"));
    }
    if let Some(phrase) = BLOCKED_PHRASES.iter().find(|phrase| lowered.contains(*phrase)) {
        return Err(format!("contains non-name phrase '{phrase}'"));
    }
    Ok(())
}

/// Local verdict on whether an email belongs to the company.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum EmailFit {
    /// Company domain, one of its subdomains, or a declared related domain.
    Match,
    /// Known company domain and a different email domain.
    Mismatch { email_domain: String },
    /// No company domain to compare against.
    Undetermined,
    Unusable,
}

pub(crate) fn local_email_fit(
    email: &str,
    company_domain: Option<&str>,
    related_domains: &[String],
) -> EmailFit {
    let Some(domain) = email_domain(email) else {
        return EmailFit::Unusable;
    };

    let Some(company) = company_domain.and_then(normalize_domain) else {
        return EmailFit::Undetermined;
    };

    let mut related = related_domains
        .iter()
        .filter_map(|related| normalize_domain(related));
    if domain_matches(&domain, &company) || related.any(|related| domain_matches(&domain, &related)) {
        EmailFit::Match
    } else {
        EmailFit::Mismatch {
            email_domain: domain,
        }
    }
}

/// Role bucket from the candidate's title; recruiting markers win over
/// leadership markers ("Leiterin Personal" is a recruiting contact).
pub(crate) fn classify_role(candidate: &Candidate) -> RoleClass {
    let Some(title) = candidate.title.as_deref() else {
        return RoleClass::Unclassified;
    };
    let title = normalize_name(title);
    let title_words: Vec<&str> = words(&title).collect();

    if title_words.iter().any(|word| *word == "hr")
        || RECRUITING_MARKERS.iter().any(|marker| title.contains(marker))
    {
        return RoleClass::Recruiting;
    }
    if TEAM_LEAD_MARKERS.iter().any(|marker| title.contains(marker))
        && !EXECUTIVE_MARKERS.iter().any(|marker| title.contains(marker))
    {
        return RoleClass::TeamLead;
    }
    if EXECUTIVE_MARKERS.iter().any(|marker| title.contains(marker))
        || title_words
            .iter()
            .any(|word| EXECUTIVE_ACRONYMS.contains(word))
    {
        return RoleClass::Executive;
    }
    RoleClass::Unclassified
}

/// 0..=100 relevance for a hiring conversation about `job_category`.
pub(crate) fn relevance_score(candidate: &Candidate, role: RoleClass, job_category: Option<&str>) -> f32 {
    let base: f32 = match role {
        RoleClass::Recruiting => 100.0,
        RoleClass::TeamLead => 80.0,
        RoleClass::Executive => 60.0,
        RoleClass::Unclassified => 40.0,
    };

    let category_affinity = match (candidate.title.as_deref(), job_category) {
        (Some(title), Some(category)) if !category.trim().is_empty() => {
            let title = normalize_name(title);
            let category = normalize_name(category);
            let matched = words(&category)
                .filter(|word| word.chars().count() > 3)
                .any(|word| title.contains(word));
            matched
        }
        _ => false,
    };

    if category_affinity {
        (base + 5.0).min(100.0)
    } else {
        base
    }
}

fn words(value: &str) -> impl Iterator<Item = &str> {
    value
        .split(|ch: char| !ch.is_alphanumeric())
        .filter(|word| !word.is_empty())
}
