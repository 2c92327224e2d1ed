use std::sync::Arc;
use std::time::Duration;

use crate::config::EnrichmentConfig;

use super::aggregation::CandidateAggregator;
use super::assembly::{AssemblyInput, ResultAssembler};
use super::collaborators::Collaborators;
use super::collectors::{run_bounded, CollectorOutcome, SourceCollectors};
use super::domain::{
    Candidate, CandidateSource, CompanyIntel, EnrichmentPath, EnrichmentResult, JobPayload,
    ParsedJobContext,
};
use super::fallback::{normalize_profile_url, FallbackController};
use super::retry::RetryPolicy;
use super::selector::DecisionMakerSelector;
use super::stats::ProviderStats;
use super::text::normalize_domain;
use super::validation::{RankingContext, ValidationEngine};

/// Per-request switches layered over [`EnrichmentConfig`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EnrichOptions {
    pub skip_paid_providers: bool,
}

/// Enriches one job posting into a decision-maker contact plus company facts.
///
/// A run has two regions joined by a single barrier: the collectors and the
/// company research fan out concurrently, then aggregation, validation,
/// fallback and selection proceed strictly in sequence.
pub struct LeadEnrichmentService {
    collaborators: Collaborators,
    config: EnrichmentConfig,
    stats: Arc<ProviderStats>,
}

impl LeadEnrichmentService {
    pub fn new(collaborators: Collaborators, config: EnrichmentConfig) -> Self {
        Self::with_stats(collaborators, config, Arc::new(ProviderStats::new()))
    }

    pub fn with_stats(
        collaborators: Collaborators,
        config: EnrichmentConfig,
        stats: Arc<ProviderStats>,
    ) -> Self {
        Self {
            collaborators,
            config,
            stats,
        }
    }

    pub fn config(&self) -> &EnrichmentConfig {
        &self.config
    }

    pub fn stats(&self) -> &Arc<ProviderStats> {
        &self.stats
    }

    pub async fn enrich(&self, payload: &JobPayload) -> EnrichmentResult {
        let options = EnrichOptions {
            skip_paid_providers: self.config.skip_paid_providers,
        };
        self.enrich_with_options(payload, options).await
    }

    /// Never fails: every collaborator error degrades to fewer candidates.
    #[tracing::instrument(skip(self, payload), fields(job_id = %payload.id, company = %payload.company))]
    pub async fn enrich_with_options(
        &self,
        payload: &JobPayload,
        options: EnrichOptions,
    ) -> EnrichmentResult {
        let policy = self.config.retry_policy();
        let mut path = EnrichmentPath::default();

        let mut job = self.parse(payload, policy, &mut path).await;
        self.resolve_domain(&mut job, policy, &mut path).await;

        // Fan-out region. Each branch owns its output; the join is the barrier.
        let (outcomes, company_intel) = self.fan_out(payload, &job, policy).await;
        for outcome in &outcomes {
            path.record(outcome.path_label());
        }
        if company_intel.is_some() {
            path.record("company_research");
        }

        // Decision region.
        let raw: Vec<Candidate> = outcomes
            .into_iter()
            .flat_map(|outcome| outcome.candidates)
            .collect();
        path.record(format!("total_{}_raw_candidates", raw.len()));
        let candidate_emails: Vec<String> = raw
            .iter()
            .filter_map(|candidate| candidate.email.clone())
            .collect();

        let aggregated = CandidateAggregator::new(job.company_domain.as_deref()).aggregate(raw);
        let ranked = if aggregated.is_empty() {
            aggregated
        } else {
            let engine = ValidationEngine::new(
                self.config.validation(),
                self.collaborators.classifier.clone(),
                policy,
            );
            let ranked = engine
                .validate_and_rank(aggregated, &RankingContext::from(&job))
                .await;
            path.record(format!("validated_{}_candidates", ranked.len()));
            ranked
        };

        let fallback = FallbackController::new(
            self.collaborators.discovery.clone(),
            self.collaborators.classifier.clone(),
            policy,
            self.config.min_employment_confidence,
            self.config.max_secondary_matches,
        )
        .with_profile_marker(self.config.profile_url_marker.as_str());
        let resolution = fallback.resolve(ranked, &job, &mut path).await;

        let mut candidates = resolution.candidates;
        self.find_profiles(&mut candidates, &job, policy, &mut path)
            .await;

        let selection = DecisionMakerSelector::new(
            self.collaborators.contact_provider.clone(),
            self.collaborators.profile_provider.clone(),
            policy,
            self.stats.clone(),
            self.config.max_enrichment_candidates,
        )
        .skip_paid_providers(options.skip_paid_providers)
        .select(&candidates, &job, &mut path)
        .await;

        ResultAssembler::assemble(AssemblyInput {
            payload,
            job: &job,
            fallback_state: resolution.state,
            selection,
            company_intel,
            candidate_emails,
            path,
        })
    }

    async fn parse(
        &self,
        payload: &JobPayload,
        policy: RetryPolicy,
        path: &mut EnrichmentPath,
    ) -> ParsedJobContext {
        let parser = self.collaborators.parser.as_ref();
        let mut job = match policy.run("parse_job", move || parser.parse(payload)).await {
            Ok(job) => {
                path.record("job_parsed");
                job
            }
            Err(error) => {
                tracing::warn!(%error, "job parsing failed, using payload fields");
                path.record("job_parse_failed");
                ParsedJobContext::from_payload(payload)
            }
        };

        if job.company_name.trim().is_empty() {
            job.company_name = payload.company.trim().to_string();
        }
        if job.job_category.is_none() {
            job.job_category = payload.category.clone();
        }
        job.company_domain = job.company_domain.as_deref().and_then(normalize_domain);
        job
    }

    async fn resolve_domain(
        &self,
        job: &mut ParsedJobContext,
        policy: RetryPolicy,
        path: &mut EnrichmentPath,
    ) {
        if job.company_domain.is_some() || job.company_name.is_empty() {
            return;
        }

        let discovery = self.collaborators.discovery.as_ref();
        let company = job.company_name.as_str();
        let found = policy
            .run("find_company_domain", move || discovery.find_company_domain(company))
            .await;
        match found {
            Ok(Some(domain)) => {
                if let Some(domain) = normalize_domain(&domain) {
                    tracing::info!(%domain, "company domain discovered");
                    job.company_domain = Some(domain);
                    path.record("domain_discovered");
                }
            }
            Ok(None) => tracing::info!("no company domain found"),
            Err(error) => tracing::warn!(%error, "domain discovery failed"),
        }
    }

    async fn fan_out(
        &self,
        payload: &JobPayload,
        job: &ParsedJobContext,
        policy: RetryPolicy,
    ) -> (Vec<CollectorOutcome>, Option<CompanyIntel>) {
        let collectors = SourceCollectors {
            fetcher: self.collaborators.fetcher.as_ref(),
            extractor: self.collaborators.extractor.as_ref(),
            discovery: self.collaborators.discovery.as_ref(),
            policy,
            max_input_chars: self.config.max_input_chars,
            max_team_pages: self.config.max_team_pages,
        };
        let budget = self.config.collector_timeout;
        let company = job.company_name.as_str();
        let domain = job.company_domain.as_deref();

        let (posting, metadata, team, registry, intel) = tokio::join!(
            run_bounded(
                CandidateSource::JobPosting,
                budget,
                collectors.job_posting(payload, company)
            ),
            run_bounded(
                CandidateSource::JobMetadataParse,
                budget,
                collectors.job_metadata(job)
            ),
            run_bounded(
                CandidateSource::TeamPage,
                budget,
                collectors.team_pages(company, domain)
            ),
            run_bounded(
                CandidateSource::BusinessRegistry,
                budget,
                collectors.business_registry(company, domain)
            ),
            self.research(job, policy, budget),
        );

        (vec![posting, metadata, team, registry], intel)
    }

    async fn research(
        &self,
        job: &ParsedJobContext,
        policy: RetryPolicy,
        budget: Duration,
    ) -> Option<CompanyIntel> {
        let researcher = self.collaborators.researcher.as_ref();
        let call = policy.run("company_research", move || researcher.research(job));
        match tokio::time::timeout(budget, call).await {
            Ok(Ok(Some(intel))) => Some(intel),
            Ok(Ok(None)) => {
                tracing::info!("company research returned nothing");
                None
            }
            Ok(Err(error)) => {
                tracing::warn!(%error, "company research failed");
                None
            }
            Err(_) => {
                tracing::warn!(budget_ms = budget.as_millis() as u64, "company research timed out");
                None
            }
        }
    }

    /// Looks up missing profile URLs for the candidates the selector will try.
    async fn find_profiles(
        &self,
        candidates: &mut [Candidate],
        job: &ParsedJobContext,
        policy: RetryPolicy,
        path: &mut EnrichmentPath,
    ) {
        let discovery = self.collaborators.discovery.as_ref();
        let company = job.company_name.as_str();
        let domain = job.company_domain.as_deref();
        let limit = self.config.max_enrichment_candidates.max(1);

        for candidate in candidates.iter_mut().take(limit) {
            if candidate.professional_profile_url.is_some() {
                continue;
            }
            let name = candidate.name.as_str();
            let found = policy
                .run("find_profile", move || discovery.find_profile(name, company, domain))
                .await;
            match found {
                Ok(Some(url)) => {
                    path.record(format!("profile_found_{}", candidate.first_name()));
                    tracing::debug!(candidate = %candidate.name, %url, "profile found");
                    candidate.professional_profile_url = Some(normalize_profile_url(&url));
                }
                Ok(None) => {}
                Err(error) => {
                    tracing::warn!(candidate = %candidate.name, %error, "profile lookup failed")
                }
            }
        }
    }
}
