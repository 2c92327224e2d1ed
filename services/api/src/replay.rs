//! Offline collaborator backend answering every call from a JSON fixture.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, OnceLock};

use async_trait::async_trait;
use lead_enrich::workflows::enrichment::{
    Candidate, CandidateClassifier, CollaboratorError, Collaborators, CompanyIntel,
    CompanyResearcher, ContactExtractor, ContactPhoneProvider, Discovery, EmploymentVerdict,
    JobParser, JobPayload, PageFetcher, PageType, ParsedJobContext, ProfileHit,
    ProfilePhoneProvider, ProviderHit, RawContact, Verdict,
};
use regex::Regex;
use serde::Deserialize;

/// Recorded collaborator answers for one or more leads.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub(crate) struct ReplayFixture {
    /// Sample payload used by the demo command.
    pub(crate) payload: Option<JobPayload>,
    /// Parser answer; the parser reports itself unavailable without one.
    pub(crate) job: Option<ParsedJobContext>,
    pub(crate) company_domain: Option<String>,
    pub(crate) pages: HashMap<String, String>,
    pub(crate) team_pages: Vec<String>,
    pub(crate) profiles: HashMap<String, String>,
    pub(crate) role_hits: HashMap<String, Vec<ProfileHit>>,
    pub(crate) employment: HashMap<String, EmploymentVerdict>,
    pub(crate) rejected_names: HashSet<String>,
    pub(crate) accepted_email_domains: HashSet<String>,
    pub(crate) contact_phones: HashMap<String, ProviderHit>,
    pub(crate) profile_phones: HashMap<String, ProviderHit>,
    pub(crate) company_intel: Option<CompanyIntel>,
}

pub(crate) struct ReplayBackend {
    fixture: ReplayFixture,
}

impl ReplayBackend {
    pub(crate) fn new(fixture: ReplayFixture) -> Self {
        Self { fixture }
    }

    pub(crate) fn into_collaborators(self) -> Collaborators {
        let backend = Arc::new(self);
        Collaborators {
            parser: backend.clone(),
            fetcher: backend.clone(),
            extractor: backend.clone(),
            classifier: backend.clone(),
            discovery: backend.clone(),
            contact_provider: backend.clone(),
            profile_provider: backend.clone(),
            researcher: backend,
        }
    }
}

#[async_trait]
impl JobParser for ReplayBackend {
    async fn parse(&self, _payload: &JobPayload) -> Result<ParsedJobContext, CollaboratorError> {
        self.fixture
            .job
            .clone()
            .ok_or_else(|| CollaboratorError::Unavailable("replay job parser".to_string()))
    }
}

#[async_trait]
impl PageFetcher for ReplayBackend {
    async fn fetch_text(&self, url: &str) -> Result<Option<String>, CollaboratorError> {
        let page = self.fixture.pages.get(url.trim_end_matches('/')).cloned();
        tracing::debug!(%url, found = page.is_some(), "replayed page fetch");
        Ok(page)
    }
}

#[async_trait]
impl ContactExtractor for ReplayBackend {
    async fn extract(
        &self,
        text: &str,
        _company_name: &str,
        _page_type: PageType,
    ) -> Result<Vec<RawContact>, CollaboratorError> {
        Ok(PatternExtractor::extract(text))
    }
}

#[async_trait]
impl CandidateClassifier for ReplayBackend {
    async fn classify_name(&self, name: &str) -> Result<Verdict, CollaboratorError> {
        if self.fixture.rejected_names.contains(name) {
            Ok(Verdict::invalid("listed as a non-person in the fixture"))
        } else {
            Ok(Verdict::valid("personal name"))
        }
    }

    async fn classify_email_domain_fit(
        &self,
        email: &str,
        _company_name: &str,
        _company_domain: Option<&str>,
    ) -> Result<Verdict, CollaboratorError> {
        let domain = email
            .rsplit_once('@')
            .map(|(_, domain)| domain.trim().to_lowercase())
            .unwrap_or_default();
        if self.fixture.accepted_email_domains.contains(&domain) {
            Ok(Verdict::valid(format!("{domain} belongs to the company group")))
        } else {
            Ok(Verdict::invalid(format!("{domain} belongs to another company")))
        }
    }

    async fn classify_currently_employed(
        &self,
        _snippet: &str,
        person_name: &str,
        _company_name: &str,
    ) -> Result<EmploymentVerdict, CollaboratorError> {
        Ok(self
            .fixture
            .employment
            .get(person_name)
            .copied()
            .unwrap_or_default())
    }
}

#[async_trait]
impl Discovery for ReplayBackend {
    async fn discover_candidate_pages(
        &self,
        _company_name: &str,
        _domain: Option<&str>,
    ) -> Result<Vec<String>, CollaboratorError> {
        Ok(self.fixture.team_pages.clone())
    }

    async fn search_person_by_role(
        &self,
        _company_name: &str,
        role_title: &str,
    ) -> Result<Vec<ProfileHit>, CollaboratorError> {
        Ok(self
            .fixture
            .role_hits
            .get(role_title)
            .cloned()
            .unwrap_or_default())
    }

    async fn find_profile(
        &self,
        person_name: &str,
        _company_name: &str,
        _domain: Option<&str>,
    ) -> Result<Option<String>, CollaboratorError> {
        Ok(self.fixture.profiles.get(person_name).cloned())
    }

    async fn find_company_domain(
        &self,
        _company_name: &str,
    ) -> Result<Option<String>, CollaboratorError> {
        Ok(self.fixture.company_domain.clone())
    }
}

#[async_trait]
impl ContactPhoneProvider for ReplayBackend {
    fn name(&self) -> &str {
        "contact_lookup"
    }

    async fn try_enrich(
        &self,
        candidate: &Candidate,
        _job: &ParsedJobContext,
    ) -> Result<Option<ProviderHit>, CollaboratorError> {
        Ok(self.fixture.contact_phones.get(&candidate.name).cloned())
    }
}

#[async_trait]
impl ProfilePhoneProvider for ReplayBackend {
    fn name(&self) -> &str {
        "profile_lookup"
    }

    async fn try_enrich(
        &self,
        candidate: &Candidate,
        _profile_url: &str,
    ) -> Result<Option<ProviderHit>, CollaboratorError> {
        Ok(self.fixture.profile_phones.get(&candidate.name).cloned())
    }
}

#[async_trait]
impl CompanyResearcher for ReplayBackend {
    async fn research(
        &self,
        _job: &ParsedJobContext,
    ) -> Result<Option<CompanyIntel>, CollaboratorError> {
        Ok(self.fixture.company_intel.clone())
    }
}

/// Line-oriented contact extraction for German imprint and team pages.
///
/// Recognizes `Name | Title` or `Name - Title` listings and labelled lines
/// such as `Ansprechpartnerin: Name (Title)` or `Geschäftsführer: Name`.
/// Email and phone are taken from the same line or the two lines after it.
pub(crate) struct PatternExtractor;

const NAME: &str = r"\p{Lu}[\p{L}'.-]+(?:\s+\p{Lu}[\p{L}'-]+){1,3}";
const LOOKAHEAD_LINES: usize = 2;

fn listed_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(&format!(
            r"^(?P<name>{NAME})\s*(?:,|\||–|\s-\s)\s*(?P<title>[^,|@]+?)\s*(?:[,|].*)?$"
        ))
        .expect("valid listing pattern")
    })
}

fn labelled_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(&format!(
            r"(?i:(?P<label>ihre?\s+ansprechpartner(?:in)?|ansprechpartner(?:in)?|kontaktperson|geschäftsführer(?:in)?|geschäftsführung|vertreten\s+durch|inhaber(?:in)?))\s*:\s*(?P<name>{NAME})(?:\s*[,(]\s*(?P<title>[^,)@]+))?"
        ))
        .expect("valid labelled pattern")
    })
}

fn email_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}").expect("valid email pattern")
    })
}

fn phone_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)(?:tel\.?|telefon|phone|mobil)\s*:?\s*(?P<number>\+?[0-9][0-9 /()-]{6,}[0-9])")
            .expect("valid phone pattern")
    })
}

impl PatternExtractor {
    pub(crate) fn extract(text: &str) -> Vec<RawContact> {
        let lines: Vec<&str> = text.lines().map(str::trim).collect();
        let mut contacts = Vec::new();

        for (index, line) in lines.iter().enumerate() {
            let Some((name, title)) = Self::contact_line(line) else {
                continue;
            };

            let window = &lines[index..lines.len().min(index + 1 + LOOKAHEAD_LINES)];
            let email = window
                .iter()
                .find_map(|line| email_pattern().find(line))
                .map(|found| found.as_str().to_string());
            let phone = window
                .iter()
                .find_map(|line| phone_pattern().captures(line))
                .and_then(|caps| caps.name("number"))
                .map(|number| number.as_str().trim().to_string());

            contacts.push(RawContact {
                name,
                title,
                email,
                phone,
                profile_url: None,
            });
        }
        contacts
    }

    fn contact_line(line: &str) -> Option<(String, Option<String>)> {
        if let Some(caps) = labelled_pattern().captures(line) {
            let name = caps.name("name")?.as_str().trim().to_string();
            let title = caps
                .name("title")
                .map(|title| title.as_str().trim().to_string())
                .or_else(|| {
                    let label = caps.name("label")?.as_str().to_lowercase();
                    (label.starts_with("geschäftsführ") || label.starts_with("inhaber"))
                        .then(|| "Geschäftsführer".to_string())
                });
            return Some((name, title));
        }

        let caps = listed_pattern().captures(line)?;
        let name = caps.name("name")?.as_str().trim().to_string();
        let title = caps
            .name("title")
            .map(|title| title.as_str().trim().to_string())
            .filter(|title| !title.is_empty());
        Some((name, title))
    }
}
