use std::collections::HashMap;

use super::domain::Candidate;
use super::text::{normalize_domain, normalize_name};

/// Deduplication key: normalized name within one company-domain context.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CandidateIdentity {
    name: String,
    domain: String,
}

/// Merges raw collector output into one deduplicated, priority-ordered list.
#[derive(Debug, Clone, Default)]
pub struct CandidateAggregator {
    domain: String,
}

impl CandidateAggregator {
    pub fn new(company_domain: Option<&str>) -> Self {
        Self {
            domain: company_domain
                .and_then(normalize_domain)
                .unwrap_or_default(),
        }
    }

    fn identity(&self, candidate: &Candidate) -> CandidateIdentity {
        CandidateIdentity {
            name: normalize_name(&candidate.name),
            domain: self.domain.clone(),
        }
    }

    /// Input order is the encounter order. Records sharing an identity collapse
    /// into the higher-priority one, which inherits any optional field it lacks;
    /// the merged record keeps the identity's first encounter position.
    pub fn aggregate(&self, raw: Vec<Candidate>) -> Vec<Candidate> {
        let mut slots: HashMap<CandidateIdentity, usize> = HashMap::new();
        let mut merged: Vec<Candidate> = Vec::with_capacity(raw.len());

        for (order, mut candidate) in raw.into_iter().enumerate() {
            candidate.encounter_order = order;
            candidate.base_priority = candidate.source.base_priority();

            let identity = self.identity(&candidate);
            match slots.get(&identity) {
                Some(&slot) => {
                    let existing = &mut merged[slot];
                    if candidate.base_priority > existing.base_priority {
                        candidate.encounter_order = existing.encounter_order;
                        candidate.fill_missing_from(existing);
                        *existing = candidate;
                    } else {
                        existing.fill_missing_from(&candidate);
                    }
                }
                None => {
                    slots.insert(identity, merged.len());
                    merged.push(candidate);
                }
            }
        }

        merged.sort_by(|left, right| {
            right
                .base_priority
                .cmp(&left.base_priority)
                .then(left.encounter_order.cmp(&right.encounter_order))
        });

        tracing::debug!(
            unique = merged.len(),
            domain = %self.domain,
            "aggregated collector candidates"
        );
        merged
    }
}
