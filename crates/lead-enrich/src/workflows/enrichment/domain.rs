use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Collector that produced a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CandidateSource {
    JobPosting,
    JobMetadataParse,
    TeamPage,
    BusinessRegistry,
    /// Produced by the role search of the fallback controller.
    ProfessionalNetwork,
}

/// Source trust ranking. The only place base priorities are defined.
pub const BASE_PRIORITY: [(CandidateSource, u8); 5] = [
    (CandidateSource::JobPosting, 100),
    (CandidateSource::JobMetadataParse, 90),
    (CandidateSource::TeamPage, 70),
    (CandidateSource::BusinessRegistry, 50),
    (CandidateSource::ProfessionalNetwork, 30),
];

impl CandidateSource {
    pub fn base_priority(self) -> u8 {
        BASE_PRIORITY
            .iter()
            .find(|(source, _)| *source == self)
            .map(|(_, priority)| *priority)
            .unwrap_or(0)
    }

    pub fn label(self) -> &'static str {
        match self {
            CandidateSource::JobPosting => "job_posting",
            CandidateSource::JobMetadataParse => "job_metadata_parse",
            CandidateSource::TeamPage => "team_page",
            CandidateSource::BusinessRegistry => "business_registry",
            CandidateSource::ProfessionalNetwork => "professional_network",
        }
    }
}

impl fmt::Display for CandidateSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Relevance of a candidate's role for a hiring conversation, lowest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleClass {
    Unclassified,
    Executive,
    TeamLead,
    Recruiting,
}

impl RoleClass {
    pub fn rank(self) -> u8 {
        match self {
            RoleClass::Unclassified => 0,
            RoleClass::Executive => 1,
            RoleClass::TeamLead => 2,
            RoleClass::Recruiting => 3,
        }
    }
}

/// Validation state of a candidate.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Validity {
    /// Not validated yet, or a classification call degraded. Included in rankings.
    #[default]
    Unknown,
    Valid,
    Invalid { reason: String },
}

impl Validity {
    pub fn is_excluded(&self) -> bool {
        matches!(self, Validity::Invalid { .. })
    }
}

/// Prospective contact, normalized independently of the collector that found it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Set only by the decision-maker selector.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// Phone printed next to the contact in the source material.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub professional_profile_url: Option<String>,
    pub source: CandidateSource,
    pub base_priority: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<RoleClass>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rank_score: Option<f32>,
    #[serde(default)]
    pub valid: Validity,
    #[serde(default)]
    pub encounter_order: usize,
}

impl Candidate {
    pub fn new(name: impl Into<String>, source: CandidateSource) -> Self {
        Self {
            name: name.into().trim().to_string(),
            title: None,
            email: None,
            phone: None,
            source_phone: None,
            professional_profile_url: None,
            source,
            base_priority: source.base_priority(),
            role: None,
            rank_score: None,
            valid: Validity::Unknown,
            encounter_order: 0,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = non_blank(title.into());
        self
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = non_blank(email.into());
        self
    }

    pub fn with_source_phone(mut self, phone: impl Into<String>) -> Self {
        self.source_phone = non_blank(phone.into());
        self
    }

    pub fn with_profile_url(mut self, url: impl Into<String>) -> Self {
        self.professional_profile_url = non_blank(url.into());
        self
    }

    pub fn role_rank(&self) -> u8 {
        self.role.map(RoleClass::rank).unwrap_or(0)
    }

    pub fn first_name(&self) -> &str {
        self.name.split_whitespace().next().unwrap_or("")
    }

    /// Everything after the first name token, joined by single spaces.
    pub fn last_name(&self) -> String {
        self.name
            .split_whitespace()
            .skip(1)
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Copies optional fields the receiver is missing from `other`.
    pub(crate) fn fill_missing_from(&mut self, other: &Candidate) {
        fill(&mut self.title, &other.title);
        fill(&mut self.email, &other.email);
        fill(&mut self.source_phone, &other.source_phone);
        fill(&mut self.professional_profile_url, &other.professional_profile_url);
    }
}

fn fill(target: &mut Option<String>, donor: &Option<String>) {
    if target.as_deref().map(str::trim).unwrap_or("").is_empty() {
        if let Some(value) = donor.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
            *target = Some(value.to_string());
        }
    }
}

fn non_blank(value: String) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Contact record as returned by the extraction capability.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawContact {
    pub name: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub profile_url: Option<String>,
}

impl RawContact {
    pub fn into_candidate(self, source: CandidateSource) -> Candidate {
        let mut candidate = Candidate::new(self.name, source);
        candidate.title = self.title.and_then(non_blank);
        candidate.email = self.email.and_then(non_blank);
        candidate.source_phone = self.phone.and_then(non_blank);
        candidate.professional_profile_url = self.profile_url.and_then(non_blank);
        candidate
    }
}

/// Kind of page handed to the extraction capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageType {
    JobPosting,
    Team,
    BusinessRegistry,
}

impl PageType {
    /// Character budget for extraction input on this page type.
    pub fn input_budget(self, max_input_chars: usize) -> usize {
        match self {
            PageType::Team => max_input_chars,
            PageType::JobPosting | PageType::BusinessRegistry => max_input_chars.min(8_000),
        }
    }
}

/// Inbound job posting as delivered by the lead feed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobPayload {
    pub id: String,
    pub company: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub date_posted: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
}

/// Structured view of a job posting produced by the external parser.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedJobContext {
    pub company_name: String,
    #[serde(default)]
    pub company_domain: Option<String>,
    /// Declared parent or subsidiary domains that count as the company's own.
    #[serde(default)]
    pub related_domains: Vec<String>,
    #[serde(default)]
    pub job_category: Option<String>,
    #[serde(default)]
    pub job_title: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub contact_name: Option<String>,
    #[serde(default)]
    pub contact_email: Option<String>,
    #[serde(default)]
    pub contact_phone: Option<String>,
}

impl ParsedJobContext {
    /// Minimal context used when the parser is unavailable.
    pub fn from_payload(payload: &JobPayload) -> Self {
        Self {
            company_name: payload.company.trim().to_string(),
            job_category: payload.category.clone(),
            job_title: Some(payload.title.clone()).filter(|title| !title.trim().is_empty()),
            description: payload.description.clone(),
            location: payload.location.clone(),
            ..Self::default()
        }
    }
}

/// Company-level facts gathered for sales preparation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompanyIntel {
    pub summary: String,
    pub description: String,
    pub industry: String,
    pub employee_count: Option<String>,
    pub founded: Option<String>,
    pub headquarters: String,
    pub products_services: Vec<String>,
    pub hiring_signals: Vec<String>,
    pub website_url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyInfo {
    pub name: String,
    pub domain: Option<String>,
    pub industry: Option<String>,
    pub employee_count: Option<String>,
    pub location: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhoneKind {
    Mobile,
    Landline,
    #[default]
    Unknown,
}

/// Phone number as reported by a provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhoneNumber {
    pub number: String,
    #[serde(default)]
    pub kind: PhoneKind,
}

impl PhoneNumber {
    pub fn new(number: impl Into<String>, kind: PhoneKind) -> Self {
        Self {
            number: number.into(),
            kind,
        }
    }
}

/// Phone attached to the selected decision-maker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhoneResult {
    pub number: String,
    pub kind: PhoneKind,
    /// Provider name, or the candidate source when the number came from source material.
    pub origin: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhoneStatus {
    FoundMobile,
    FoundLandline,
    SkippedPaidProviders,
    NoDecisionMaker,
    NoProfile,
    ProviderNoResult,
}

/// Ordered record of the strategies a run executed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EnrichmentPath(Vec<String>);

impl EnrichmentPath {
    pub fn record(&mut self, step: impl Into<String>) {
        let step = step.into();
        tracing::debug!(target: "enrichment_path", %step, "strategy executed");
        self.0.push(step);
    }

    pub fn steps(&self) -> &[String] {
        &self.0
    }

    pub fn contains(&self, step: &str) -> bool {
        self.0.iter().any(|recorded| recorded == step)
    }

    pub fn position(&self, step: &str) -> Option<usize> {
        self.0.iter().position(|recorded| recorded == step)
    }
}

/// Final artifact handed back to the caller of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichmentResult {
    pub success: bool,
    pub job_id: String,
    pub job_title: String,
    pub company: CompanyInfo,
    pub company_intel: Option<CompanyIntel>,
    pub decision_maker: Option<Candidate>,
    pub phone: Option<PhoneResult>,
    pub phone_status: PhoneStatus,
    pub emails: BTreeSet<String>,
    pub enrichment_path: EnrichmentPath,
}
