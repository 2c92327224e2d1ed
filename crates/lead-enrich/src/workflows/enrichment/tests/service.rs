use std::sync::Arc;
use std::time::Duration;

use super::common::{
    contact, mobile, payload, phones, profile_hit, test_config, FakeClassifier, FakeDiscovery,
    FakeExtractor, FakeFetcher, FakeParser, FakeProfileProvider, FakeProvider, FakeResearcher,
    Fakes, COMPANY, DOMAIN, POSTING_URL,
};
use crate::workflows::enrichment::domain::{
    CandidateSource, CompanyIntel, PageType, ParsedJobContext, PhoneKind, PhoneStatus,
};
use crate::workflows::enrichment::service::{EnrichOptions, LeadEnrichmentService};

const TEAM_URL: &str = "https://target.de/ueber-uns/team";

fn service(fakes: &Fakes) -> LeadEnrichmentService {
    LeadEnrichmentService::new(fakes.collaborators(), test_config())
}

fn position(steps: &[String], step: &str) -> usize {
    steps
        .iter()
        .position(|recorded| recorded == step)
        .unwrap_or_else(|| panic!("missing step {step} in {steps:?}"))
}

#[tokio::test]
async fn rejected_collector_output_escalates_to_the_role_search() {
    let mut discovery = FakeDiscovery {
        team_pages: vec![TEAM_URL.to_string()],
        ..FakeDiscovery::default()
    };
    discovery.role_hits.insert(
        "Geschäftsführer".to_string(),
        vec![profile_hit(
            "https://www.linkedin.com/in/max-mueller",
            "Max Müller - Geschäftsführer - Target GmbH | LinkedIn",
        )],
    );

    let fakes = Fakes {
        fetcher: Arc::new(FakeFetcher {
            pages: [
                (POSTING_URL.to_string(), "posting".to_string()),
                (TEAM_URL.to_string(), "team".to_string()),
            ]
            .into(),
            ..FakeFetcher::default()
        }),
        extractor: Arc::new(FakeExtractor {
            contacts: [
                (
                    "posting".to_string(),
                    vec![contact(
                        "Anna Kaiser",
                        Some("Recruiterin"),
                        Some("a.kaiser@othercompany.com"),
                    )],
                ),
                (
                    "team".to_string(),
                    vec![contact("Jobs & Karriere", None, None)],
                ),
            ]
            .into(),
            ..FakeExtractor::default()
        }),
        discovery: Arc::new(discovery),
        classifier: Arc::new(FakeClassifier::default().employs("Max Müller", 0.9)),
        contact_provider: Arc::new(
            FakeProvider::default()
                .answering("Max Müller", Ok(Some(phones(&[mobile("+49 171 2345678")])))),
        ),
        ..Fakes::default()
    };

    let result = service(&fakes).enrich(&payload()).await;

    assert!(result.success);
    let person = result.decision_maker.expect("secondary search match selected");
    assert_eq!(person.name, "Max Müller");
    assert_eq!(person.source, CandidateSource::ProfessionalNetwork);
    assert_eq!(result.phone_status, PhoneStatus::FoundMobile);
    assert_eq!(
        result.phone.map(|phone| phone.number).as_deref(),
        Some("+49 171 2345678")
    );

    let steps = result.enrichment_path.steps();
    assert_eq!(steps[0], "job_parsed");
    for expected in [
        "job_posting_1_contacts",
        "job_metadata_parse_skipped",
        "team_page_1_contacts",
        "business_registry_empty",
        "total_2_raw_candidates",
        "validated_0_candidates",
        "secondary_search",
        "secondary_search_1_matches",
        "contact_lookup_phone_found",
        "phone_found_candidate_1",
    ] {
        assert!(result.enrichment_path.contains(expected), "missing {expected} in {steps:?}");
    }
    assert!(position(steps, "total_2_raw_candidates") > position(steps, "business_registry_empty"));
    assert!(position(steps, "secondary_search") > position(steps, "validated_0_candidates"));
    assert!(position(steps, "phone_found_candidate_1") > position(steps, "secondary_search_1_matches"));

    let extractions = fakes.extractor.calls();
    assert_eq!(extractions.len(), 2);
    assert!(extractions.contains(&(7, PageType::JobPosting)));
    assert!(extractions.contains(&(4, PageType::Team)));
}

#[tokio::test]
async fn total_failure_still_returns_a_result() {
    let fakes = Fakes {
        parser: Arc::new(FakeParser { parsed: None }),
        classifier: Arc::new(FakeClassifier {
            unavailable: true,
            ..FakeClassifier::default()
        }),
        researcher: Arc::new(FakeResearcher {
            unavailable: true,
            ..FakeResearcher::default()
        }),
        ..Fakes::default()
    };

    let result = service(&fakes).enrich(&payload()).await;

    assert!(!result.success);
    assert!(result.decision_maker.is_none());
    assert!(result.phone.is_none());
    assert_eq!(result.phone_status, PhoneStatus::NoDecisionMaker);
    assert_eq!(result.company.name, COMPANY);
    assert!(result.company.domain.is_none());
    assert!(result.company_intel.is_none());

    let path = &result.enrichment_path;
    assert!(path.contains("job_parse_failed"));
    assert!(path.contains("business_registry_skipped"));
    assert!(path.contains("total_0_raw_candidates"));
    assert!(path.contains("secondary_search_exhausted"));
    assert!(!path.contains("company_research"));
}

#[tokio::test(start_paused = true)]
async fn slow_collectors_time_out_without_blocking_the_run() {
    let parsed = ParsedJobContext {
        contact_name: Some("Anna Kaiser".to_string()),
        contact_email: Some("a.kaiser@target.de".to_string()),
        contact_phone: Some("+49 40 1234567".to_string()),
        ..super::common::job_context()
    };
    let fakes = Fakes {
        parser: Arc::new(FakeParser {
            parsed: Some(parsed),
        }),
        fetcher: Arc::new(FakeFetcher {
            pages: [(POSTING_URL.to_string(), "posting".to_string())].into(),
            delay: Some(Duration::from_secs(60)),
            ..FakeFetcher::default()
        }),
        discovery: Arc::new(FakeDiscovery {
            team_pages: vec![TEAM_URL.to_string()],
            ..FakeDiscovery::default()
        }),
        ..Fakes::default()
    };

    let started = tokio::time::Instant::now();
    let result = service(&fakes).enrich(&payload()).await;

    assert!(started.elapsed() < Duration::from_secs(60));
    assert!(result.success);
    let path = &result.enrichment_path;
    assert!(path.contains("job_posting_timeout"));
    assert!(path.contains("team_page_timeout"));
    assert!(path.contains("business_registry_timeout"));
    assert!(path.contains("job_metadata_parse_1_contacts"));
    assert!(path.contains("phone_from_source"));

    assert_eq!(result.phone_status, PhoneStatus::FoundLandline);
    let phone = result.phone.expect("phone printed in the posting");
    assert_eq!(phone.origin, "job_metadata_parse");
    assert_eq!(phone.kind, PhoneKind::Landline);
    assert!(fakes.contact_provider.calls().is_empty());
}

#[tokio::test]
async fn missing_domain_is_discovered_before_collecting() {
    let parsed = ParsedJobContext {
        company_domain: None,
        ..super::common::job_context()
    };
    let fakes = Fakes {
        parser: Arc::new(FakeParser {
            parsed: Some(parsed),
        }),
        fetcher: Arc::new(FakeFetcher {
            pages: [(
                "https://target.de/impressum".to_string(),
                "impressum".to_string(),
            )]
            .into(),
            ..FakeFetcher::default()
        }),
        extractor: Arc::new(FakeExtractor {
            contacts: [(
                "impressum".to_string(),
                vec![contact("Jonas Weber", Some("Geschäftsführer"), None)],
            )]
            .into(),
            ..FakeExtractor::default()
        }),
        discovery: Arc::new(FakeDiscovery {
            domain: Some("https://www.Target.de/".to_string()),
            ..FakeDiscovery::default()
        }),
        ..Fakes::default()
    };

    let result = service(&fakes).enrich(&payload()).await;

    assert_eq!(result.company.domain.as_deref(), Some(DOMAIN));
    assert!(result.enrichment_path.contains("domain_discovered"));
    assert!(result.enrichment_path.contains("business_registry_1_contacts"));
    assert!(fakes
        .fetcher
        .calls()
        .contains(&"https://target.de/impressum".to_string()));
    assert!(
        !fakes
            .fetcher
            .calls()
            .contains(&"https://target.de/impressum.html".to_string()),
        "first registry page with text wins"
    );
    assert_eq!(
        result.decision_maker.map(|person| person.name).as_deref(),
        Some("Jonas Weber")
    );
    assert_eq!(result.phone_status, PhoneStatus::NoProfile);
}

#[tokio::test]
async fn company_research_never_decides_success() {
    let intel = CompanyIntel {
        summary: "Regionaler Logistikdienstleister".to_string(),
        industry: "Logistik".to_string(),
        employee_count: Some("250".to_string()),
        ..CompanyIntel::default()
    };
    let fakes = Fakes {
        researcher: Arc::new(FakeResearcher {
            intel: Some(intel.clone()),
            ..FakeResearcher::default()
        }),
        ..Fakes::default()
    };

    let result = service(&fakes).enrich(&payload()).await;

    assert!(!result.success, "intel alone is not a decision-maker");
    assert_eq!(result.company_intel, Some(intel));
    assert_eq!(result.company.industry.as_deref(), Some("Logistik"));
    assert_eq!(result.company.employee_count.as_deref(), Some("250"));
    assert!(result.enrichment_path.contains("company_research"));
}

#[tokio::test]
async fn profiles_are_looked_up_for_the_selector() {
    let mut discovery = FakeDiscovery::default();
    discovery.profiles.insert(
        "Anna Kaiser".to_string(),
        "http://de.linkedin.com/in/anna-kaiser/?originalSubdomain=de".to_string(),
    );
    let parsed = ParsedJobContext {
        contact_name: Some("Anna Kaiser".to_string()),
        ..super::common::job_context()
    };
    let fakes = Fakes {
        parser: Arc::new(FakeParser {
            parsed: Some(parsed),
        }),
        discovery: Arc::new(discovery),
        profile_provider: Arc::new(FakeProfileProvider::default().answering(
            "Anna Kaiser",
            Ok(Some(phones(&[mobile("+41 79 123 45 67")]))),
        )),
        ..Fakes::default()
    };

    let result = service(&fakes).enrich(&payload()).await;

    let person = result.decision_maker.expect("metadata contact selected");
    assert_eq!(
        person.professional_profile_url.as_deref(),
        Some("https://de.linkedin.com/in/anna-kaiser")
    );
    assert_eq!(person.phone.as_deref(), Some("+41 79 123 45 67"));
    assert!(result.enrichment_path.contains("profile_found_Anna"));
    assert!(result.enrichment_path.contains("profile_lookup_phone_found"));
    assert_eq!(fakes.contact_provider.calls(), ["Anna Kaiser"]);
    assert_eq!(fakes.profile_provider.calls(), ["Anna Kaiser"]);
}

#[tokio::test]
async fn test_mode_skips_paid_providers() {
    let parsed = ParsedJobContext {
        contact_name: Some("Anna Kaiser".to_string()),
        contact_email: Some("a.kaiser@target.de".to_string()),
        ..super::common::job_context()
    };
    let fakes = Fakes {
        parser: Arc::new(FakeParser {
            parsed: Some(parsed),
        }),
        ..Fakes::default()
    };

    let result = service(&fakes)
        .enrich_with_options(
            &payload(),
            EnrichOptions {
                skip_paid_providers: true,
            },
        )
        .await;

    assert!(result.success);
    assert_eq!(result.phone_status, PhoneStatus::SkippedPaidProviders);
    assert!(result.emails.contains("a.kaiser@target.de"));
    assert!(fakes.contact_provider.calls().is_empty());
    assert!(fakes.profile_provider.calls().is_empty());
}
