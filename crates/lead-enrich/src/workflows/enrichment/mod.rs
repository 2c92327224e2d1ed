//! Lead enrichment: turns a job posting into a validated decision-maker
//! contact, a phone number and company intelligence.
//!
//! Collectors and company research run concurrently and join at a single
//! barrier; aggregation, validation, the fallback search and the phone
//! selection then run strictly in sequence. Every collaborator sits behind a
//! trait in [`collaborators`] so the workflow never talks to the network itself.

pub mod aggregation;
pub mod assembly;
pub mod collaborators;
pub(crate) mod collectors;
pub mod domain;
pub mod fallback;
mod phone;
pub mod retry;
pub mod router;
pub mod selector;
pub mod service;
pub mod stats;
mod text;
pub mod validation;

#[cfg(test)]
mod tests;

pub use aggregation::CandidateAggregator;
pub use assembly::{AssemblyInput, ResultAssembler};
pub use collaborators::{
    CandidateClassifier, CollaboratorError, Collaborators, CompanyResearcher, ContactExtractor,
    ContactPhoneProvider, Discovery, EmploymentVerdict, JobParser, PageFetcher, ProfileHit,
    ProfilePhoneProvider, ProviderHit, Verdict,
};
pub use collectors::{CollectorOutcome, CollectorStatus, REGISTRY_PATHS};
pub use domain::{
    Candidate, CandidateSource, CompanyInfo, CompanyIntel, EnrichmentPath, EnrichmentResult,
    JobPayload, PageType, ParsedJobContext, PhoneKind, PhoneNumber, PhoneResult, PhoneStatus,
    RawContact, RoleClass, Validity, BASE_PRIORITY,
};
pub use fallback::{
    FallbackController, FallbackEvent, FallbackResolution, FallbackState, SECONDARY_SEARCH_ROLES,
};
pub use retry::RetryPolicy;
pub use router::enrichment_router;
pub use selector::{DecisionMakerSelector, Selection};
pub use service::{EnrichOptions, LeadEnrichmentService};
pub use stats::{ProviderCounters, ProviderStats, StatsSnapshot};
pub use validation::{RankingContext, ValidationConfig, ValidationEngine};
