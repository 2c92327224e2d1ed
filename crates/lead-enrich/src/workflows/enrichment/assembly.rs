use std::collections::BTreeSet;

use super::domain::{
    Candidate, CompanyInfo, CompanyIntel, EnrichmentPath, EnrichmentResult, JobPayload,
    ParsedJobContext,
};
use super::fallback::FallbackState;
use super::selector::Selection;
use super::text::{clean_email, domain_matches, email_domain, is_generic_mailbox, normalize_domain};

/// Everything the result is built from.
#[derive(Debug)]
pub struct AssemblyInput<'a> {
    pub payload: &'a JobPayload,
    pub job: &'a ParsedJobContext,
    pub fallback_state: FallbackState,
    pub selection: Selection,
    pub company_intel: Option<CompanyIntel>,
    /// Addresses seen on any collected candidate.
    pub candidate_emails: Vec<String>,
    pub path: EnrichmentPath,
}

pub struct ResultAssembler;

impl ResultAssembler {
    /// `success` is exactly "a decision-maker was selected"; company
    /// intelligence never influences it.
    pub fn assemble(input: AssemblyInput<'_>) -> EnrichmentResult {
        let AssemblyInput {
            payload,
            job,
            fallback_state,
            selection,
            company_intel,
            candidate_emails,
            path,
        } = input;

        let emails: BTreeSet<String> = candidate_emails
            .iter()
            .chain(selection.emails.iter())
            .filter_map(|email| clean_email(email))
            .collect();

        let company_domain = job.company_domain.as_deref().and_then(normalize_domain);
        let mut decision_maker = selection.decision_maker;
        if let (Some(person), Some(domain)) = (decision_maker.as_mut(), company_domain.as_deref()) {
            assign_personal_email(person, &emails, domain);
        }

        let company = company_info(job, payload, company_domain, company_intel.as_ref());
        let success = decision_maker.is_some();

        tracing::info!(
            job_id = %payload.id,
            success,
            ?fallback_state,
            phone_status = ?selection.phone_status,
            steps = path.steps().len(),
            "enrichment assembled"
        );

        EnrichmentResult {
            success,
            job_id: payload.id.clone(),
            job_title: payload.title.clone(),
            company,
            company_intel,
            decision_maker,
            phone: selection.phone,
            phone_status: selection.phone_status,
            emails,
            enrichment_path: path,
        }
    }
}

/// Gives a decision-maker without email the first personal company address.
fn assign_personal_email(person: &mut Candidate, emails: &BTreeSet<String>, company_domain: &str) {
    if person.email.is_some() {
        return;
    }
    let personal = emails.iter().find(|email| {
        !is_generic_mailbox(email)
            && email_domain(email)
                .map(|domain| domain_matches(&domain, company_domain))
                .unwrap_or(false)
    });
    if let Some(email) = personal {
        tracing::debug!(candidate = %person.name, %email, "assigned company email to decision-maker");
        person.email = Some(email.clone());
    }
}

fn company_info(
    job: &ParsedJobContext,
    payload: &JobPayload,
    domain: Option<String>,
    intel: Option<&CompanyIntel>,
) -> CompanyInfo {
    CompanyInfo {
        name: non_blank(&job.company_name).unwrap_or_else(|| payload.company.trim().to_string()),
        domain,
        industry: intel.and_then(|intel| non_blank(&intel.industry)),
        employee_count: intel
            .and_then(|intel| intel.employee_count.as_deref())
            .and_then(non_blank),
        location: job.location.clone().or_else(|| payload.location.clone()),
    }
}

fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
