mod config;
mod policy;
mod rules;

pub use config::ValidationConfig;

pub(crate) use policy::ranking_order;

use std::sync::Arc;

use super::collaborators::CandidateClassifier;
use super::domain::{Candidate, ParsedJobContext};
use super::retry::RetryPolicy;
use policy::{combine, CheckResult};
use rules::EmailFit;

/// Company context a candidate list is validated against.
#[derive(Debug, Clone, Copy)]
pub struct RankingContext<'a> {
    pub company_name: &'a str,
    pub company_domain: Option<&'a str>,
    pub related_domains: &'a [String],
    pub job_category: Option<&'a str>,
}

impl<'a> From<&'a ParsedJobContext> for RankingContext<'a> {
    fn from(job: &'a ParsedJobContext) -> Self {
        Self {
            company_name: &job.company_name,
            company_domain: job.company_domain.as_deref(),
            related_domains: &job.related_domains,
            job_category: job.job_category.as_deref(),
        }
    }
}

/// Sets role and relevance on a candidate whose validity was settled elsewhere.
pub(crate) fn assign_rank(candidate: &mut Candidate, job_category: Option<&str>) {
    let role = rules::classify_role(candidate);
    candidate.role = Some(role);
    candidate.rank_score = Some(rules::relevance_score(candidate, role, job_category));
}

/// Filters implausible candidates and orders the rest for the selector.
pub struct ValidationEngine {
    config: ValidationConfig,
    classifier: Arc<dyn CandidateClassifier>,
    policy: RetryPolicy,
}

impl ValidationEngine {
    pub fn new(
        config: ValidationConfig,
        classifier: Arc<dyn CandidateClassifier>,
        policy: RetryPolicy,
    ) -> Self {
        Self {
            config,
            classifier,
            policy,
        }
    }

    /// Returns only included candidates, sorted by [`ranking_order`]. Invalid
    /// candidates are dropped, never down-ranked; a classification failure
    /// keeps the candidate with `Validity::Unknown`.
    pub async fn validate_and_rank(
        &self,
        candidates: Vec<Candidate>,
        context: &RankingContext<'_>,
    ) -> Vec<Candidate> {
        let mut ranked = Vec::with_capacity(candidates.len());

        for mut candidate in candidates {
            let name_check = self.check_name(&candidate.name).await;
            let mut checks = vec![name_check];
            if !matches!(checks[0], CheckResult::Rejected(_)) {
                if let Some(email) = candidate.email.clone() {
                    checks.push(self.check_email(&email, context).await);
                }
            }

            for check in &checks {
                if let CheckResult::Degraded(reason) = check {
                    tracing::warn!(
                        candidate = %candidate.name,
                        source = %candidate.source,
                        %reason,
                        "classification degraded, keeping candidate"
                    );
                }
            }

            candidate.valid = combine(&checks);
            if candidate.valid.is_excluded() {
                tracing::info!(
                    candidate = %candidate.name,
                    source = %candidate.source,
                    validity = ?candidate.valid,
                    "candidate excluded"
                );
                continue;
            }

            assign_rank(&mut candidate, context.job_category);
            ranked.push(candidate);
        }

        ranked.sort_by(ranking_order);
        ranked
    }

    async fn check_name(&self, name: &str) -> CheckResult {
        if name.trim().is_empty() {
            return CheckResult::Rejected("empty name".to_string());
        }
        if self.config.name_prefilter {
            if let Err(reason) = rules::prefilter_name(name) {
                return CheckResult::Rejected(reason);
            }
        }
        if !self.config.ai_classification {
            return CheckResult::Passed;
        }

        let classifier = self.classifier.as_ref();
        match self
            .policy
            .run("classify_name", move || classifier.classify_name(name))
            .await
        {
            Ok(verdict) if verdict.valid => CheckResult::Passed,
            Ok(verdict) => CheckResult::Rejected(verdict.reason),
            Err(error) => CheckResult::Degraded(error.to_string()),
        }
    }

    async fn check_email(&self, email: &str, context: &RankingContext<'_>) -> CheckResult {
        match rules::local_email_fit(email, context.company_domain, context.related_domains) {
            EmailFit::Match => CheckResult::Passed,
            EmailFit::Unusable => CheckResult::Rejected(format!("unusable email '{email}'")),
            EmailFit::Undetermined if !self.config.ai_classification => CheckResult::Passed,
            EmailFit::Mismatch { email_domain } if !self.config.ai_classification => {
                CheckResult::Rejected(format!("email domain {email_domain} is not the company's"))
            }
            fit @ (EmailFit::Undetermined | EmailFit::Mismatch { .. }) => {
                let classifier = self.classifier.as_ref();
                match self
                    .policy
                    .run("classify_email_domain_fit", move || {
                        classifier.classify_email_domain_fit(
                            email,
                            context.company_name,
                            context.company_domain,
                        )
                    })
                    .await
                {
                    Ok(verdict) if verdict.valid => CheckResult::Passed,
                    Ok(verdict) => CheckResult::Rejected(verdict.reason),
                    Err(error) => match fit {
                        EmailFit::Mismatch { email_domain } => {
                            tracing::warn!(%email, %error, "email fit unverified, domain differs");
                            CheckResult::Rejected(format!(
                                "email domain {email_domain} is not the company's"
                            ))
                        }
                        _ => CheckResult::Degraded(error.to_string()),
                    },
                }
            }
        }
    }
}
