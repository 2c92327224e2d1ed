use super::common::{candidate, DOMAIN};
use crate::workflows::enrichment::aggregation::CandidateAggregator;
use crate::workflows::enrichment::domain::CandidateSource;

#[test]
fn duplicates_collapse_into_the_highest_priority_record() {
    let raw = vec![
        candidate("anna  KAISER", CandidateSource::TeamPage)
            .with_title("Leitung Personal")
            .with_profile_url("https://www.linkedin.com/in/anna-kaiser"),
        candidate("Jonas Weber", CandidateSource::BusinessRegistry).with_title("Geschäftsführer"),
        candidate("Anna Kaiser", CandidateSource::JobPosting).with_email("a.kaiser@target.de"),
    ];

    let merged = CandidateAggregator::new(Some(DOMAIN)).aggregate(raw);

    assert_eq!(merged.len(), 2);
    let anna = &merged[0];
    assert_eq!(anna.name, "Anna Kaiser");
    assert_eq!(anna.source, CandidateSource::JobPosting);
    assert_eq!(anna.base_priority, 100);
    assert_eq!(anna.email.as_deref(), Some("a.kaiser@target.de"));
    assert_eq!(anna.title.as_deref(), Some("Leitung Personal"));
    assert_eq!(
        anna.professional_profile_url.as_deref(),
        Some("https://www.linkedin.com/in/anna-kaiser")
    );
    assert_eq!(anna.encounter_order, 0, "merged record keeps first encounter");
    assert_eq!(merged[1].name, "Jonas Weber");
}

#[test]
fn lower_priority_duplicates_only_fill_gaps() {
    let raw = vec![
        candidate("Anna Kaiser", CandidateSource::JobPosting).with_title("Recruiterin"),
        candidate("Anna Kaiser", CandidateSource::TeamPage)
            .with_title("Teamassistenz")
            .with_source_phone("+49 40 1234567"),
    ];

    let merged = CandidateAggregator::new(Some(DOMAIN)).aggregate(raw);

    assert_eq!(merged.len(), 1);
    assert_eq!(merged[0].source, CandidateSource::JobPosting);
    assert_eq!(merged[0].title.as_deref(), Some("Recruiterin"));
    assert_eq!(merged[0].source_phone.as_deref(), Some("+49 40 1234567"));
}

#[test]
fn output_is_ordered_by_priority_then_encounter() {
    let raw = vec![
        candidate("Petra Schulz", CandidateSource::BusinessRegistry),
        candidate("Jonas Weber", CandidateSource::TeamPage),
        candidate("Lena Vogel", CandidateSource::TeamPage),
        candidate("Anna Kaiser", CandidateSource::JobMetadataParse),
    ];

    let aggregator = CandidateAggregator::new(Some("https://www.target.de/karriere"));
    let merged = aggregator.aggregate(raw);
    let names: Vec<&str> = merged.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(
        names,
        ["Anna Kaiser", "Jonas Weber", "Lena Vogel", "Petra Schulz"]
    );

    let again = aggregator.aggregate(merged.clone());
    let names_again: Vec<&str> = again.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, names_again, "aggregation is idempotent");
}

#[test]
fn empty_input_yields_empty_output() {
    assert!(CandidateAggregator::new(None).aggregate(Vec::new()).is_empty());
}
