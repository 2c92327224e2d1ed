use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::domain::{
    Candidate, CompanyIntel, JobPayload, PageType, ParsedJobContext, PhoneNumber, RawContact,
};

/// Failure of a single collaborator call. Never escapes an enrichment run.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CollaboratorError {
    #[error("{operation} timed out after {elapsed_ms} ms")]
    Timeout { operation: String, elapsed_ms: u64 },
    #[error("{0} is unavailable")]
    Unavailable(String),
    #[error("malformed response from {operation}: {detail}")]
    Malformed { operation: String, detail: String },
    #[error("{0}")]
    Failed(String),
}

impl CollaboratorError {
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            CollaboratorError::Timeout { .. } | CollaboratorError::Unavailable(_)
        )
    }
}

/// Boolean verdict with a human-readable reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    pub valid: bool,
    pub reason: String,
}

impl Verdict {
    pub fn valid(reason: impl Into<String>) -> Self {
        Self {
            valid: true,
            reason: reason.into(),
        }
    }

    pub fn invalid(reason: impl Into<String>) -> Self {
        Self {
            valid: false,
            reason: reason.into(),
        }
    }
}

/// Whether a search hit describes someone currently employed at the company.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EmploymentVerdict {
    pub is_current: bool,
    pub confidence: f32,
}

impl Default for EmploymentVerdict {
    fn default() -> Self {
        Self {
            is_current: false,
            confidence: 0.0,
        }
    }
}

/// A professional-network search result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileHit {
    pub url: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub snippet: String,
}

/// What a phone provider returned for one lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderHit {
    #[serde(default)]
    pub phones: Vec<PhoneNumber>,
    #[serde(default)]
    pub emails: Vec<String>,
}

#[async_trait]
pub trait JobParser: Send + Sync {
    async fn parse(&self, payload: &JobPayload) -> Result<ParsedJobContext, CollaboratorError>;
}

/// Retrieves the visible text of a page. `Ok(None)` means the page does not exist.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch_text(&self, url: &str) -> Result<Option<String>, CollaboratorError>;
}

#[async_trait]
pub trait ContactExtractor: Send + Sync {
    /// Input is already truncated to the page type's budget.
    async fn extract(
        &self,
        text: &str,
        company_name: &str,
        page_type: PageType,
    ) -> Result<Vec<RawContact>, CollaboratorError>;
}

#[async_trait]
pub trait CandidateClassifier: Send + Sync {
    async fn classify_name(&self, name: &str) -> Result<Verdict, CollaboratorError>;

    async fn classify_email_domain_fit(
        &self,
        email: &str,
        company_name: &str,
        company_domain: Option<&str>,
    ) -> Result<Verdict, CollaboratorError>;

    async fn classify_currently_employed(
        &self,
        snippet: &str,
        person_name: &str,
        company_name: &str,
    ) -> Result<EmploymentVerdict, CollaboratorError>;
}

#[async_trait]
pub trait Discovery: Send + Sync {
    /// Up to three URLs likely to list team members, best first.
    async fn discover_candidate_pages(
        &self,
        company_name: &str,
        domain: Option<&str>,
    ) -> Result<Vec<String>, CollaboratorError>;

    async fn search_person_by_role(
        &self,
        company_name: &str,
        role_title: &str,
    ) -> Result<Vec<ProfileHit>, CollaboratorError>;

    async fn find_profile(
        &self,
        person_name: &str,
        company_name: &str,
        domain: Option<&str>,
    ) -> Result<Option<String>, CollaboratorError>;

    async fn find_company_domain(
        &self,
        company_name: &str,
    ) -> Result<Option<String>, CollaboratorError>;
}

/// Phone provider that works from name and company alone.
#[async_trait]
pub trait ContactPhoneProvider: Send + Sync {
    fn name(&self) -> &str;

    async fn try_enrich(
        &self,
        candidate: &Candidate,
        job: &ParsedJobContext,
    ) -> Result<Option<ProviderHit>, CollaboratorError>;
}

/// Phone provider keyed on a professional-network profile URL.
#[async_trait]
pub trait ProfilePhoneProvider: Send + Sync {
    fn name(&self) -> &str;

    async fn try_enrich(
        &self,
        candidate: &Candidate,
        profile_url: &str,
    ) -> Result<Option<ProviderHit>, CollaboratorError>;
}

#[async_trait]
pub trait CompanyResearcher: Send + Sync {
    async fn research(
        &self,
        job: &ParsedJobContext,
    ) -> Result<Option<CompanyIntel>, CollaboratorError>;
}

/// Every collaborator an enrichment run talks to.
#[derive(Clone)]
pub struct Collaborators {
    pub parser: Arc<dyn JobParser>,
    pub fetcher: Arc<dyn PageFetcher>,
    pub extractor: Arc<dyn ContactExtractor>,
    pub classifier: Arc<dyn CandidateClassifier>,
    pub discovery: Arc<dyn Discovery>,
    pub contact_provider: Arc<dyn ContactPhoneProvider>,
    pub profile_provider: Arc<dyn ProfilePhoneProvider>,
    pub researcher: Arc<dyn CompanyResearcher>,
}
