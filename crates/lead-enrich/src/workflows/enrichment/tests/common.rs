use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::response::Response;
use serde_json::Value;

use crate::config::EnrichmentConfig;
use crate::workflows::enrichment::collaborators::{
    CandidateClassifier, CollaboratorError, Collaborators, CompanyResearcher, ContactExtractor,
    ContactPhoneProvider, Discovery, EmploymentVerdict, JobParser, PageFetcher, ProfileHit,
    ProfilePhoneProvider, ProviderHit, Verdict,
};
use crate::workflows::enrichment::domain::{
    Candidate, CandidateSource, CompanyIntel, JobPayload, PageType, ParsedJobContext, PhoneKind,
    PhoneNumber, RawContact,
};
use crate::workflows::enrichment::retry::RetryPolicy;
use crate::workflows::enrichment::text::email_domain;

pub(super) const COMPANY: &str = "Target GmbH";
pub(super) const DOMAIN: &str = "target.de";
pub(super) const POSTING_URL: &str = "https://jobs.example.com/target/disponent";

pub(super) fn payload() -> JobPayload {
    JobPayload {
        id: "job-42".to_string(),
        company: COMPANY.to_string(),
        title: "Disponent (m/w/d)".to_string(),
        description: "Wir suchen Verstärkung für unsere Disposition.".to_string(),
        url: Some(POSTING_URL.to_string()),
        category: Some("Logistik".to_string()),
        location: Some("Hamburg".to_string()),
        ..JobPayload::default()
    }
}

pub(super) fn job_context() -> ParsedJobContext {
    ParsedJobContext {
        company_name: COMPANY.to_string(),
        company_domain: Some(DOMAIN.to_string()),
        job_category: Some("Logistik".to_string()),
        job_title: Some("Disponent (m/w/d)".to_string()),
        location: Some("Hamburg".to_string()),
        ..ParsedJobContext::default()
    }
}

pub(super) fn candidate(name: &str, source: CandidateSource) -> Candidate {
    Candidate::new(name, source)
}

pub(super) fn contact(name: &str, title: Option<&str>, email: Option<&str>) -> RawContact {
    RawContact {
        name: name.to_string(),
        title: title.map(str::to_string),
        email: email.map(str::to_string),
        ..RawContact::default()
    }
}

pub(super) fn mobile(number: &str) -> PhoneNumber {
    PhoneNumber::new(number, PhoneKind::Mobile)
}

pub(super) fn phones(numbers: &[PhoneNumber]) -> ProviderHit {
    ProviderHit {
        phones: numbers.to_vec(),
        emails: Vec::new(),
    }
}

pub(super) fn quick_policy() -> RetryPolicy {
    RetryPolicy {
        max_attempts: 1,
        initial_backoff: Duration::from_millis(1),
        max_backoff: Duration::from_millis(1),
        call_timeout: Duration::from_secs(5),
    }
}

pub(super) fn test_config() -> EnrichmentConfig {
    EnrichmentConfig {
        collector_timeout: Duration::from_secs(2),
        call_timeout: Duration::from_secs(5),
        retry_max_attempts: 1,
        retry_backoff: Duration::from_millis(1),
        ..EnrichmentConfig::default()
    }
}

pub(super) fn profile_hit(url: &str, title: &str) -> ProfileHit {
    ProfileHit {
        url: url.to_string(),
        title: title.to_string(),
        snippet: format!("{title} bei {COMPANY}"),
    }
}

pub(super) async fn read_body(response: Response) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body")
        .to_vec()
}

pub(super) async fn read_json_body(response: Response) -> Value {
    serde_json::from_slice(&read_body(response).await).expect("json payload")
}

fn record(log: &Mutex<Vec<String>>, entry: impl Into<String>) {
    log.lock().expect("call log poisoned").push(entry.into());
}

fn entries(log: &Mutex<Vec<String>>) -> Vec<String> {
    log.lock().expect("call log poisoned").clone()
}

#[derive(Default)]
pub(super) struct FakeParser {
    pub parsed: Option<ParsedJobContext>,
}

#[async_trait]
impl JobParser for FakeParser {
    async fn parse(&self, _payload: &JobPayload) -> Result<ParsedJobContext, CollaboratorError> {
        self.parsed
            .clone()
            .ok_or_else(|| CollaboratorError::Unavailable("parser".to_string()))
    }
}

#[derive(Default)]
pub(super) struct FakeFetcher {
    pub pages: HashMap<String, String>,
    pub failing: HashSet<String>,
    pub delay: Option<Duration>,
    pub calls: Mutex<Vec<String>>,
}

impl FakeFetcher {
    pub fn calls(&self) -> Vec<String> {
        entries(&self.calls)
    }
}

#[async_trait]
impl PageFetcher for FakeFetcher {
    async fn fetch_text(&self, url: &str) -> Result<Option<String>, CollaboratorError> {
        record(&self.calls, url);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.failing.contains(url) {
            return Err(CollaboratorError::Failed(format!("{url} returned 500")));
        }
        Ok(self.pages.get(url).cloned())
    }
}

/// Returns the contacts registered for an exact page text.
#[derive(Default)]
pub(super) struct FakeExtractor {
    pub contacts: HashMap<String, Vec<RawContact>>,
    pub calls: Mutex<Vec<(usize, PageType)>>,
}

impl FakeExtractor {
    pub fn calls(&self) -> Vec<(usize, PageType)> {
        self.calls.lock().expect("call log poisoned").clone()
    }
}

#[async_trait]
impl ContactExtractor for FakeExtractor {
    async fn extract(
        &self,
        text: &str,
        _company_name: &str,
        page_type: PageType,
    ) -> Result<Vec<RawContact>, CollaboratorError> {
        self.calls
            .lock()
            .expect("call log poisoned")
            .push((text.chars().count(), page_type));
        Ok(self.contacts.get(text).cloned().unwrap_or_default())
    }
}

/// Accepts every name except `invalid_names`, and email domains listed in
/// `accepted_email_domains`.
#[derive(Default)]
pub(super) struct FakeClassifier {
    pub invalid_names: HashSet<String>,
    pub accepted_email_domains: HashSet<String>,
    pub unavailable: bool,
    pub employment: HashMap<String, EmploymentVerdict>,
    pub failing_employment: HashSet<String>,
    pub calls: Mutex<Vec<String>>,
}

impl FakeClassifier {
    pub fn calls(&self) -> Vec<String> {
        entries(&self.calls)
    }

    pub fn employs(mut self, name: &str, confidence: f32) -> Self {
        self.employment.insert(
            name.to_string(),
            EmploymentVerdict {
                is_current: true,
                confidence,
            },
        );
        self
    }
}

#[async_trait]
impl CandidateClassifier for FakeClassifier {
    async fn classify_name(&self, name: &str) -> Result<Verdict, CollaboratorError> {
        record(&self.calls, format!("name:{name}"));
        if self.unavailable {
            return Err(CollaboratorError::Unavailable("classifier".to_string()));
        }
        if self.invalid_names.contains(name) {
            Ok(Verdict::invalid("not a personal name"))
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
        record(&self.calls, format!("email:{email}"));
        if self.unavailable {
            return Err(CollaboratorError::Unavailable("classifier".to_string()));
        }
        let accepted = email_domain(email)
            .map(|domain| self.accepted_email_domains.contains(&domain))
            .unwrap_or(false);
        if accepted {
            Ok(Verdict::valid("related company"))
        } else {
            Ok(Verdict::invalid("different company"))
        }
    }

    async fn classify_currently_employed(
        &self,
        _snippet: &str,
        person_name: &str,
        _company_name: &str,
    ) -> Result<EmploymentVerdict, CollaboratorError> {
        record(&self.calls, format!("employment:{person_name}"));
        if self.failing_employment.contains(person_name) {
            return Err(CollaboratorError::Failed("employment check".to_string()));
        }
        Ok(self
            .employment
            .get(person_name)
            .copied()
            .unwrap_or_default())
    }
}

#[derive(Default)]
pub(super) struct FakeDiscovery {
    pub team_pages: Vec<String>,
    pub role_hits: HashMap<String, Vec<ProfileHit>>,
    pub failing_roles: HashSet<String>,
    pub profiles: HashMap<String, String>,
    pub domain: Option<String>,
    pub calls: Mutex<Vec<String>>,
}

impl FakeDiscovery {
    pub fn calls(&self) -> Vec<String> {
        entries(&self.calls)
    }

    pub fn role_searches(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| call.strip_prefix("role:").map(str::to_string))
            .collect()
    }
}

#[async_trait]
impl Discovery for FakeDiscovery {
    async fn discover_candidate_pages(
        &self,
        _company_name: &str,
        _domain: Option<&str>,
    ) -> Result<Vec<String>, CollaboratorError> {
        record(&self.calls, "pages");
        Ok(self.team_pages.clone())
    }

    async fn search_person_by_role(
        &self,
        _company_name: &str,
        role_title: &str,
    ) -> Result<Vec<ProfileHit>, CollaboratorError> {
        record(&self.calls, format!("role:{role_title}"));
        if self.failing_roles.contains(role_title) {
            return Err(CollaboratorError::Unavailable("search".to_string()));
        }
        Ok(self.role_hits.get(role_title).cloned().unwrap_or_default())
    }

    async fn find_profile(
        &self,
        person_name: &str,
        _company_name: &str,
        _domain: Option<&str>,
    ) -> Result<Option<String>, CollaboratorError> {
        record(&self.calls, format!("profile:{person_name}"));
        Ok(self.profiles.get(person_name).cloned())
    }

    async fn find_company_domain(
        &self,
        _company_name: &str,
    ) -> Result<Option<String>, CollaboratorError> {
        record(&self.calls, "domain");
        Ok(self.domain.clone())
    }
}

/// Answers keyed by candidate name; unknown names get `Ok(None)`.
#[derive(Default)]
pub(super) struct FakeProvider {
    pub answers: HashMap<String, Result<Option<ProviderHit>, CollaboratorError>>,
    pub calls: Mutex<Vec<String>>,
}

impl FakeProvider {
    pub fn answering(mut self, name: &str, answer: Result<Option<ProviderHit>, CollaboratorError>) -> Self {
        self.answers.insert(name.to_string(), answer);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        entries(&self.calls)
    }

    fn answer(&self, name: &str) -> Result<Option<ProviderHit>, CollaboratorError> {
        record(&self.calls, name);
        self.answers.get(name).cloned().unwrap_or(Ok(None))
    }
}

#[async_trait]
impl ContactPhoneProvider for FakeProvider {
    fn name(&self) -> &str {
        "contact_lookup"
    }

    async fn try_enrich(
        &self,
        candidate: &Candidate,
        _job: &ParsedJobContext,
    ) -> Result<Option<ProviderHit>, CollaboratorError> {
        self.answer(&candidate.name)
    }
}

/// Same answering scheme as [`FakeProvider`], for the profile-keyed lookup.
#[derive(Default)]
pub(super) struct FakeProfileProvider {
    pub inner: FakeProvider,
}

impl FakeProfileProvider {
    pub fn answering(self, name: &str, answer: Result<Option<ProviderHit>, CollaboratorError>) -> Self {
        Self {
            inner: self.inner.answering(name, answer),
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.inner.calls()
    }
}

#[async_trait]
impl ProfilePhoneProvider for FakeProfileProvider {
    fn name(&self) -> &str {
        "profile_lookup"
    }

    async fn try_enrich(
        &self,
        candidate: &Candidate,
        _profile_url: &str,
    ) -> Result<Option<ProviderHit>, CollaboratorError> {
        self.inner.answer(&candidate.name)
    }
}

#[derive(Default)]
pub(super) struct FakeResearcher {
    pub intel: Option<CompanyIntel>,
    pub unavailable: bool,
}

#[async_trait]
impl CompanyResearcher for FakeResearcher {
    async fn research(
        &self,
        _job: &ParsedJobContext,
    ) -> Result<Option<CompanyIntel>, CollaboratorError> {
        if self.unavailable {
            return Err(CollaboratorError::Unavailable("research".to_string()));
        }
        Ok(self.intel.clone())
    }
}

/// Every fake behind its own `Arc` so tests can inspect call logs afterwards.
pub(super) struct Fakes {
    pub parser: Arc<FakeParser>,
    pub fetcher: Arc<FakeFetcher>,
    pub extractor: Arc<FakeExtractor>,
    pub classifier: Arc<FakeClassifier>,
    pub discovery: Arc<FakeDiscovery>,
    pub contact_provider: Arc<FakeProvider>,
    pub profile_provider: Arc<FakeProfileProvider>,
    pub researcher: Arc<FakeResearcher>,
}

impl Default for Fakes {
    fn default() -> Self {
        Self {
            parser: Arc::new(FakeParser {
                parsed: Some(job_context()),
            }),
            fetcher: Arc::new(FakeFetcher::default()),
            extractor: Arc::new(FakeExtractor::default()),
            classifier: Arc::new(FakeClassifier::default()),
            discovery: Arc::new(FakeDiscovery::default()),
            contact_provider: Arc::new(FakeProvider::default()),
            profile_provider: Arc::new(FakeProfileProvider::default()),
            researcher: Arc::new(FakeResearcher::default()),
        }
    }
}

impl Fakes {
    pub fn collaborators(&self) -> Collaborators {
        Collaborators {
            parser: self.parser.clone(),
            fetcher: self.fetcher.clone(),
            extractor: self.extractor.clone(),
            classifier: self.classifier.clone(),
            discovery: self.discovery.clone(),
            contact_provider: self.contact_provider.clone(),
            profile_provider: self.profile_provider.clone(),
            researcher: self.researcher.clone(),
        }
    }
}
