use std::sync::Arc;

use super::collaborators::{CollaboratorError, ContactPhoneProvider, ProfilePhoneProvider, ProviderHit};
use super::domain::{
    Candidate, EnrichmentPath, ParsedJobContext, PhoneKind, PhoneNumber, PhoneResult, PhoneStatus,
};
use super::phone::{best_dach_phone, classify_kind, is_dach_number};
use super::retry::RetryPolicy;
use super::stats::ProviderStats;

/// Outcome of the decision region.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub decision_maker: Option<Candidate>,
    pub phone: Option<PhoneResult>,
    pub phone_status: PhoneStatus,
    /// Addresses returned by providers along the way.
    pub emails: Vec<String>,
}

/// Walks the ranked list one candidate at a time until a provider yields a
/// DACH phone number.
pub struct DecisionMakerSelector {
    contact_provider: Arc<dyn ContactPhoneProvider>,
    profile_provider: Arc<dyn ProfilePhoneProvider>,
    policy: RetryPolicy,
    stats: Arc<ProviderStats>,
    max_candidates: usize,
    skip_paid_providers: bool,
}

impl DecisionMakerSelector {
    pub fn new(
        contact_provider: Arc<dyn ContactPhoneProvider>,
        profile_provider: Arc<dyn ProfilePhoneProvider>,
        policy: RetryPolicy,
        stats: Arc<ProviderStats>,
        max_candidates: usize,
    ) -> Self {
        Self {
            contact_provider,
            profile_provider,
            policy,
            stats,
            max_candidates: max_candidates.max(1),
            skip_paid_providers: false,
        }
    }

    /// Falls back to `ranked[0]` without calling any provider.
    pub fn skip_paid_providers(mut self, skip: bool) -> Self {
        self.skip_paid_providers = skip;
        self
    }

    pub async fn select(
        &self,
        ranked: &[Candidate],
        job: &ParsedJobContext,
        path: &mut EnrichmentPath,
    ) -> Selection {
        let Some(best) = ranked.first() else {
            return Selection {
                decision_maker: None,
                phone: None,
                phone_status: PhoneStatus::NoDecisionMaker,
                emails: Vec::new(),
            };
        };
        let attempted = &ranked[..ranked.len().min(self.max_candidates)];

        if let Some(selection) = self.phone_from_source(attempted, path) {
            return selection;
        }

        let mut emails = Vec::new();
        if self.skip_paid_providers {
            tracing::info!("paid phone providers skipped");
            return self.without_phone(best, PhoneStatus::SkippedPaidProviders, emails, path);
        }

        for (index, candidate) in attempted.iter().enumerate() {
            tracing::info!(
                candidate = %candidate.name,
                position = index + 1,
                "attempting phone enrichment"
            );

            let mut found = None;
            if !candidate.last_name().is_empty() {
                let provider = self.contact_provider.name();
                let contact_provider = self.contact_provider.as_ref();
                let outcome = self
                    .policy
                    .run(provider, move || contact_provider.try_enrich(candidate, job))
                    .await;
                found = self.settle(provider, outcome, &mut emails, path);
            }

            if found.is_none() {
                if let Some(url) = candidate.professional_profile_url.as_deref() {
                    let provider = self.profile_provider.name();
                    let profile_provider = self.profile_provider.as_ref();
                    let outcome = self
                        .policy
                        .run(provider, move || profile_provider.try_enrich(candidate, url))
                        .await;
                    found = self.settle(provider, outcome, &mut emails, path);
                }
            }

            if let Some(phone) = found {
                path.record(format!("phone_found_candidate_{}", index + 1));
                tracing::info!(candidate = %candidate.name, origin = %phone.origin, "phone found");
                let mut decision_maker = candidate.clone();
                decision_maker.phone = Some(phone.number.clone());
                return Selection {
                    decision_maker: Some(decision_maker),
                    phone_status: found_status(phone.kind),
                    phone: Some(phone),
                    emails,
                };
            }
        }

        let status = if attempted
            .iter()
            .any(|candidate| candidate.professional_profile_url.is_some())
        {
            PhoneStatus::ProviderNoResult
        } else {
            PhoneStatus::NoProfile
        };
        self.without_phone(best, status, emails, path)
    }

    /// A DACH number printed next to the contact beats any provider lookup.
    fn phone_from_source(
        &self,
        attempted: &[Candidate],
        path: &mut EnrichmentPath,
    ) -> Option<Selection> {
        let (candidate, number) = attempted.iter().find_map(|candidate| {
            candidate
                .source_phone
                .as_deref()
                .filter(|number| is_dach_number(number))
                .map(|number| (candidate, number))
        })?;

        path.record("phone_from_source");
        tracing::info!(candidate = %candidate.name, source = %candidate.source, "using phone from source material");
        let kind = classify_kind(number, PhoneKind::Unknown);
        let mut decision_maker = candidate.clone();
        decision_maker.phone = Some(number.to_string());
        Some(Selection {
            decision_maker: Some(decision_maker),
            phone: Some(PhoneResult {
                number: number.to_string(),
                kind,
                origin: candidate.source.label().to_string(),
            }),
            phone_status: found_status(kind),
            emails: Vec::new(),
        })
    }

    /// Turns one provider call into an accepted phone, recording stats and path.
    fn settle(
        &self,
        provider: &str,
        outcome: Result<Option<ProviderHit>, CollaboratorError>,
        emails: &mut Vec<String>,
        path: &mut EnrichmentPath,
    ) -> Option<PhoneResult> {
        let hit = match outcome {
            Ok(Some(hit)) => hit,
            Ok(None) => {
                self.stats.record_attempt(provider, &[], None);
                return None;
            }
            Err(error) => {
                tracing::warn!(provider, %error, "phone provider failed");
                self.stats.record_failure(provider);
                path.record(format!("{provider}_failed"));
                return None;
            }
        };

        path.record(provider);
        emails.extend(hit.emails.iter().cloned());

        let accepted = best_dach_phone(&hit.phones);
        self.stats
            .record_attempt(provider, &hit.phones, accepted.as_ref());

        match accepted {
            Some(PhoneNumber { number, kind }) => {
                path.record(format!("{provider}_phone_found"));
                Some(PhoneResult {
                    number,
                    kind,
                    origin: provider.to_string(),
                })
            }
            None => {
                if !hit.phones.is_empty() {
                    path.record(format!("{provider}_filtered_non_dach"));
                }
                None
            }
        }
    }

    fn without_phone(
        &self,
        best: &Candidate,
        phone_status: PhoneStatus,
        emails: Vec<String>,
        path: &mut EnrichmentPath,
    ) -> Selection {
        path.record("using_best_candidate_no_phone");
        tracing::info!(candidate = %best.name, ?phone_status, "using best candidate without phone");
        Selection {
            decision_maker: Some(best.clone()),
            phone: None,
            phone_status,
            emails,
        }
    }
}

fn found_status(kind: PhoneKind) -> PhoneStatus {
    match kind {
        PhoneKind::Mobile => PhoneStatus::FoundMobile,
        PhoneKind::Landline | PhoneKind::Unknown => PhoneStatus::FoundLandline,
    }
}
