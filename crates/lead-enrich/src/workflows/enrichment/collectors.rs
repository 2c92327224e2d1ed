use std::future::Future;
use std::time::Duration;

use super::collaborators::{CollaboratorError, ContactExtractor, Discovery, PageFetcher};
use super::domain::{Candidate, CandidateSource, JobPayload, PageType, ParsedJobContext, RawContact};
use super::retry::RetryPolicy;
use super::text::truncate_head_tail;

/// Disclosure pages tried in order on the company domain.
pub const REGISTRY_PATHS: [&str; 5] = [
    "/impressum",
    "/impressum.html",
    "/de/impressum",
    "/imprint",
    "/kontakt",
];

const MAX_DISCOVERED_PAGES: usize = 3;

/// How a fan-out branch resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CollectorStatus {
    Collected(usize),
    Empty,
    /// Preconditions missing, e.g. no posting URL or company domain.
    Skipped,
    Failed(String),
    TimedOut,
}

/// One collector's private output slot, merged only at the join.
#[derive(Debug, Clone, PartialEq)]
pub struct CollectorOutcome {
    pub source: CandidateSource,
    pub status: CollectorStatus,
    pub candidates: Vec<Candidate>,
}

impl CollectorOutcome {
    pub fn path_label(&self) -> String {
        match &self.status {
            CollectorStatus::Collected(count) => format!("{}_{count}_contacts", self.source),
            CollectorStatus::Empty => format!("{}_empty", self.source),
            CollectorStatus::Skipped => format!("{}_skipped", self.source),
            CollectorStatus::Failed(_) => format!("{}_error", self.source),
            CollectorStatus::TimedOut => format!("{}_timeout", self.source),
        }
    }
}

/// Bounds a collector by `budget`. Failures and timeouts become empty
/// contributions; nothing escapes to the run.
pub(crate) async fn run_bounded<F>(source: CandidateSource, budget: Duration, collector: F) -> CollectorOutcome
where
    F: Future<Output = Result<Option<Vec<Candidate>>, CollaboratorError>>,
{
    let (status, candidates) = match tokio::time::timeout(budget, collector).await {
        Ok(Ok(Some(candidates))) if candidates.is_empty() => (CollectorStatus::Empty, candidates),
        Ok(Ok(Some(candidates))) => (CollectorStatus::Collected(candidates.len()), candidates),
        Ok(Ok(None)) => (CollectorStatus::Skipped, Vec::new()),
        Ok(Err(error)) => {
            tracing::warn!(%source, %error, "collector failed");
            (CollectorStatus::Failed(error.to_string()), Vec::new())
        }
        Err(_) => {
            tracing::warn!(%source, budget_ms = budget.as_millis() as u64, "collector timed out");
            (CollectorStatus::TimedOut, Vec::new())
        }
    };

    CollectorOutcome {
        source,
        status,
        candidates,
    }
}

/// The four candidate collectors, composed from the fetch, extract and
/// discovery capabilities.
pub(crate) struct SourceCollectors<'a> {
    pub fetcher: &'a dyn PageFetcher,
    pub extractor: &'a dyn ContactExtractor,
    pub discovery: &'a dyn Discovery,
    pub policy: RetryPolicy,
    pub max_input_chars: usize,
    pub max_team_pages: usize,
}

impl SourceCollectors<'_> {
    pub async fn job_posting(
        &self,
        payload: &JobPayload,
        company_name: &str,
    ) -> Result<Option<Vec<Candidate>>, CollaboratorError> {
        let Some(url) = payload.url.as_deref().filter(|url| !url.trim().is_empty()) else {
            return Ok(None);
        };
        let Some(text) = self.fetch(url).await? else {
            return Ok(Some(Vec::new()));
        };
        let contacts = self.extract(&text, company_name, PageType::JobPosting).await?;
        Ok(Some(into_candidates(contacts, CandidateSource::JobPosting)))
    }

    /// Contact fields the parser already found; no external call.
    pub async fn job_metadata(
        &self,
        job: &ParsedJobContext,
    ) -> Result<Option<Vec<Candidate>>, CollaboratorError> {
        let Some(name) = job.contact_name.as_deref().filter(|name| !name.trim().is_empty()) else {
            return Ok(None);
        };
        let contact = RawContact {
            name: name.to_string(),
            title: None,
            email: job.contact_email.clone(),
            phone: job.contact_phone.clone(),
            profile_url: None,
        };
        Ok(Some(vec![contact.into_candidate(CandidateSource::JobMetadataParse)]))
    }

    /// Scrapes the first `max_team_pages` discovered pages one after another.
    /// A page that fails is skipped; only a failed discovery fails the branch.
    pub async fn team_pages(
        &self,
        company_name: &str,
        domain: Option<&str>,
    ) -> Result<Option<Vec<Candidate>>, CollaboratorError> {
        let discovery = self.discovery;
        let urls = self
            .policy
            .run("discover_candidate_pages", move || {
                discovery.discover_candidate_pages(company_name, domain)
            })
            .await?;

        let mut candidates = Vec::new();
        for url in urls
            .iter()
            .take(MAX_DISCOVERED_PAGES)
            .take(self.max_team_pages)
        {
            let contacts = match self.fetch(url).await {
                Ok(Some(text)) => self.extract(&text, company_name, PageType::Team).await,
                Ok(None) => continue,
                Err(error) => Err(error),
            };
            match contacts {
                Ok(contacts) => {
                    tracing::debug!(%url, contacts = contacts.len(), "team page scraped");
                    candidates.extend(into_candidates(contacts, CandidateSource::TeamPage));
                }
                Err(error) => tracing::warn!(%url, %error, "team page skipped"),
            }
        }
        Ok(Some(candidates))
    }

    /// First registry page with text wins.
    pub async fn business_registry(
        &self,
        company_name: &str,
        domain: Option<&str>,
    ) -> Result<Option<Vec<Candidate>>, CollaboratorError> {
        let Some(domain) = domain else {
            return Ok(None);
        };

        let mut last_error = None;
        let mut any_answer = false;
        for path in REGISTRY_PATHS {
            let url = format!("https://{domain}{path}");
            match self.fetch(&url).await {
                Ok(Some(text)) if !text.trim().is_empty() => {
                    tracing::debug!(%url, "registry page found");
                    let contacts = self
                        .extract(&text, company_name, PageType::BusinessRegistry)
                        .await?;
                    return Ok(Some(into_candidates(
                        contacts,
                        CandidateSource::BusinessRegistry,
                    )));
                }
                Ok(_) => any_answer = true,
                Err(error) => last_error = Some(error),
            }
        }

        match last_error {
            Some(error) if !any_answer => Err(error),
            _ => Ok(Some(Vec::new())),
        }
    }

    async fn fetch(&self, url: &str) -> Result<Option<String>, CollaboratorError> {
        let fetcher = self.fetcher;
        self.policy
            .run("fetch_text", move || fetcher.fetch_text(url))
            .await
    }

    async fn extract(
        &self,
        text: &str,
        company_name: &str,
        page_type: PageType,
    ) -> Result<Vec<RawContact>, CollaboratorError> {
        let budget = page_type.input_budget(self.max_input_chars);
        let input = truncate_head_tail(text, budget);
        let input = input.as_ref();
        let extractor = self.extractor;
        self.policy
            .run("extract_contacts", move || {
                extractor.extract(input, company_name, page_type)
            })
            .await
    }
}

fn into_candidates(contacts: Vec<RawContact>, source: CandidateSource) -> Vec<Candidate> {
    contacts
        .into_iter()
        .map(|contact| contact.into_candidate(source))
        .collect()
}
