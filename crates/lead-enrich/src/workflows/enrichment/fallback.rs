use std::collections::HashSet;
use std::sync::{Arc, OnceLock};

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::collaborators::{CandidateClassifier, Discovery, EmploymentVerdict, ProfileHit};
use super::domain::{Candidate, CandidateSource, EnrichmentPath, ParsedJobContext, Validity};
use super::retry::RetryPolicy;
use super::text::normalize_name;
use super::validation::assign_rank;

/// Canonical role titles for the secondary search, searched in this order.
pub const SECONDARY_SEARCH_ROLES: [&str; 3] = ["Geschäftsführer", "HR Manager", "Personalleiter"];

/// Candidate discovery state. `Primary` and `Exhausted` are terminal, and so
/// is `SecondarySearch` once a match is found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackState {
    Primary,
    SecondarySearch,
    Exhausted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackEvent {
    RankedAvailable,
    RankedEmpty,
    MatchFound,
    NoCurrentMatch,
}

impl FallbackState {
    pub fn advance(self, event: FallbackEvent) -> Self {
        match (self, event) {
            (FallbackState::Primary, FallbackEvent::RankedEmpty) => FallbackState::SecondarySearch,
            (FallbackState::SecondarySearch, FallbackEvent::NoCurrentMatch) => {
                FallbackState::Exhausted
            }
            (state, _) => state,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FallbackResolution {
    pub state: FallbackState,
    /// Ranked collector candidates in `Primary`, verified search matches in
    /// `SecondarySearch`, empty in `Exhausted`.
    pub candidates: Vec<Candidate>,
}

/// Escalates to a role search on the professional network when collectors
/// produced no valid candidate.
pub struct FallbackController {
    discovery: Arc<dyn Discovery>,
    classifier: Arc<dyn CandidateClassifier>,
    policy: RetryPolicy,
    min_confidence: f32,
    max_matches: usize,
    profile_marker: String,
}

impl FallbackController {
    /// Search queries get exactly one attempt each; `policy` only contributes
    /// its timeout.
    pub fn new(
        discovery: Arc<dyn Discovery>,
        classifier: Arc<dyn CandidateClassifier>,
        policy: RetryPolicy,
        min_confidence: f32,
        max_matches: usize,
    ) -> Self {
        Self {
            discovery,
            classifier,
            policy: policy.single_attempt(),
            min_confidence,
            max_matches: max_matches.max(1),
            profile_marker: "linkedin.com/in/".to_string(),
        }
    }

    /// Hits whose URL lacks `marker` are company pages or posts, not people.
    pub fn with_profile_marker(mut self, marker: impl Into<String>) -> Self {
        self.profile_marker = marker.into().to_lowercase();
        self
    }

    pub async fn resolve(
        &self,
        ranked: Vec<Candidate>,
        job: &ParsedJobContext,
        path: &mut EnrichmentPath,
    ) -> FallbackResolution {
        let state = FallbackState::Primary;
        if !ranked.is_empty() {
            return FallbackResolution {
                state: state.advance(FallbackEvent::RankedAvailable),
                candidates: ranked,
            };
        }

        let state = state.advance(FallbackEvent::RankedEmpty);
        path.record("secondary_search");
        tracing::info!(company = %job.company_name, "no valid candidates, searching by role");

        let matches = self.secondary_search(job).await;
        if matches.is_empty() {
            path.record("secondary_search_exhausted");
            tracing::info!(company = %job.company_name, "secondary search exhausted");
            return FallbackResolution {
                state: state.advance(FallbackEvent::NoCurrentMatch),
                candidates: matches,
            };
        }

        path.record(format!("secondary_search_{}_matches", matches.len()));
        FallbackResolution {
            state: state.advance(FallbackEvent::MatchFound),
            candidates: matches,
        }
    }

    async fn secondary_search(&self, job: &ParsedJobContext) -> Vec<Candidate> {
        let discovery = self.discovery.as_ref();
        let company = job.company_name.as_str();
        let mut seen = HashSet::new();
        let mut matches = Vec::new();

        'roles: for role_title in SECONDARY_SEARCH_ROLES {
            let hits = match self
                .policy
                .run("search_person_by_role", move || {
                    discovery.search_person_by_role(company, role_title)
                })
                .await
            {
                Ok(hits) => hits,
                Err(error) => {
                    tracing::warn!(role = role_title, %error, "role search failed");
                    continue;
                }
            };

            for hit in hits {
                let Some((name, url)) = profile_candidate(&hit, &self.profile_marker) else {
                    continue;
                };
                if seen.contains(&normalize_name(&name)) {
                    continue;
                }

                let verdict = self.employment(&hit, &name, company).await;
                if !verdict.is_current || verdict.confidence < self.min_confidence {
                    tracing::debug!(
                        %name,
                        confidence = verdict.confidence,
                        "search hit not currently employed"
                    );
                    continue;
                }

                seen.insert(normalize_name(&name));
                let mut candidate = Candidate::new(name, CandidateSource::ProfessionalNetwork)
                    .with_title(role_title)
                    .with_profile_url(url);
                candidate.valid = Validity::Valid;
                candidate.encounter_order = matches.len();
                assign_rank(&mut candidate, job.job_category.as_deref());
                matches.push(candidate);

                if matches.len() >= self.max_matches {
                    break 'roles;
                }
            }
        }

        matches
    }

    /// Failed checks fall back to "not current".
    async fn employment(&self, hit: &ProfileHit, name: &str, company: &str) -> EmploymentVerdict {
        let snippet = format!("{}\n{}", hit.title, hit.snippet);
        let classifier = self.classifier.as_ref();
        let snippet = snippet.as_str();
        match self
            .policy
            .run("classify_currently_employed", move || {
                classifier.classify_currently_employed(snippet, name, company)
            })
            .await
        {
            Ok(verdict) => verdict,
            Err(error) => {
                tracing::warn!(%name, %error, "employment check failed");
                EmploymentVerdict::default()
            }
        }
    }
}

/// Person name and normalized profile URL, or `None` for company pages and
/// titles without a full name.
fn profile_candidate(hit: &ProfileHit, marker: &str) -> Option<(String, String)> {
    if !hit.url.to_lowercase().contains(marker) {
        return None;
    }
    let name = name_from_profile_title(&hit.title)?;
    Some((name, normalize_profile_url(&hit.url)))
}

fn name_from_profile_title(title: &str) -> Option<String> {
    static SUFFIX: OnceLock<Regex> = OnceLock::new();
    static SEPARATOR: OnceLock<Regex> = OnceLock::new();
    let suffix = SUFFIX.get_or_init(|| Regex::new(r"(?i)\s*\|\s*linkedin.*$").expect("valid regex"));
    let separator = SEPARATOR.get_or_init(|| Regex::new(r"\s+[-–]\s+").expect("valid regex"));

    let title = suffix.replace(title, "");
    let name = separator.split(&title).next()?.trim();
    (name.split_whitespace().count() >= 2).then(|| name.to_string())
}

pub(crate) fn normalize_profile_url(url: &str) -> String {
    static LOCALE: OnceLock<Regex> = OnceLock::new();
    let locale = LOCALE.get_or_init(|| Regex::new(r"linkedin\.com/[a-z]{2}/in/").expect("valid regex"));

    let url = url.trim().split(['?', '#']).next().unwrap_or("").trim_end_matches('/');
    let url = match url.strip_prefix("http://") {
        Some(rest) => format!("https://{rest}"),
        None => url.to_string(),
    };
    locale.replace(&url, "linkedin.com/in/").into_owned()
}
