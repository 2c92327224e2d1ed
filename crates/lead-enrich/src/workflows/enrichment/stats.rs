use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{PhoneKind, PhoneNumber};
use super::phone::country_label;

/// Counters for one phone provider.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderCounters {
    pub total_attempts: u64,
    /// Attempts where the provider returned at least one phone.
    pub returned_phones: u64,
    /// Attempts where at least one returned phone passed the DACH filter.
    pub dach_valid_phones: u64,
    pub mobile_found: u64,
    pub landline_found: u64,
    /// Phones returned but none of them DACH.
    pub filtered_out: u64,
    pub no_phone_returned: u64,
    pub failures: u64,
    pub phone_countries: BTreeMap<String, u64>,
    pub last_attempt: Option<DateTime<Utc>>,
    pub last_success: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub created_at: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
    pub services: BTreeMap<String, ProviderCounters>,
}

/// Process-wide phone provider statistics, shared by every enrichment run.
#[derive(Debug)]
pub struct ProviderStats {
    inner: Mutex<StatsSnapshot>,
}

impl Default for ProviderStats {
    fn default() -> Self {
        Self::new()
    }
}

impl ProviderStats {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(empty_snapshot()),
        }
    }

    /// Records a completed provider call. `accepted` is the phone that survived
    /// the DACH filter, if any.
    pub fn record_attempt(
        &self,
        provider: &str,
        returned: &[PhoneNumber],
        accepted: Option<&PhoneNumber>,
    ) {
        let now = Utc::now();
        let mut stats = self.lock();
        stats.last_updated = now;
        let counters = stats.services.entry(provider.to_string()).or_default();
        counters.total_attempts += 1;
        counters.last_attempt = Some(now);

        if returned.is_empty() {
            counters.no_phone_returned += 1;
            return;
        }

        counters.returned_phones += 1;
        for phone in returned {
            *counters
                .phone_countries
                .entry(country_label(&phone.number).to_string())
                .or_default() += 1;
        }

        match accepted {
            Some(phone) => {
                counters.dach_valid_phones += 1;
                counters.last_success = Some(now);
                match phone.kind {
                    PhoneKind::Mobile => counters.mobile_found += 1,
                    PhoneKind::Landline => counters.landline_found += 1,
                    PhoneKind::Unknown => {}
                }
            }
            None => counters.filtered_out += 1,
        }
    }

    pub fn record_failure(&self, provider: &str) {
        let now = Utc::now();
        let mut stats = self.lock();
        stats.last_updated = now;
        let counters = stats.services.entry(provider.to_string()).or_default();
        counters.total_attempts += 1;
        counters.failures += 1;
        counters.last_attempt = Some(now);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        self.lock().clone()
    }

    pub fn reset(&self) {
        *self.lock() = empty_snapshot();
        tracing::info!("provider statistics reset");
    }

    /// Plain-text report for operators.
    pub fn summary(&self) -> String {
        let stats = self.snapshot();
        let mut out = String::new();
        let rule = "=".repeat(60);
        let _ = writeln!(out, "{rule}\nENRICHMENT PROVIDER STATISTICS\n{rule}");
        let _ = writeln!(out, "Last updated: {}\n", stats.last_updated.to_rfc3339());

        if stats.services.is_empty() {
            out.push_str("(no provider calls recorded)\n");
            return out;
        }

        for (name, svc) in &stats.services {
            let success_rate = percent(svc.dach_valid_phones, svc.total_attempts);
            let mobile_rate = percent(svc.mobile_found, svc.dach_valid_phones);
            let filter_rate = percent(svc.filtered_out, svc.returned_phones);

            let _ = writeln!(out, "--- {} ---", name.to_uppercase());
            let _ = writeln!(out, "  Total attempts:     {}", svc.total_attempts);
            let _ = writeln!(out, "  Returned phones:    {}", svc.returned_phones);
            let _ = writeln!(
                out,
                "  DACH valid:         {} ({success_rate:.1}% success rate)",
                svc.dach_valid_phones
            );
            let _ = writeln!(
                out,
                "  Mobile found:       {} ({mobile_rate:.1}% of valid)",
                svc.mobile_found
            );
            let _ = writeln!(
                out,
                "  Filtered out:       {} ({filter_rate:.1}% non-DACH)",
                svc.filtered_out
            );
            let _ = writeln!(out, "  No phone returned:  {}", svc.no_phone_returned);
            let _ = writeln!(out, "  Failures:           {}", svc.failures);
            let _ = writeln!(
                out,
                "  Last success:       {}",
                svc.last_success
                    .map(|at| at.to_rfc3339())
                    .unwrap_or_else(|| "never".to_string())
            );
            out.push_str("  Country distribution:\n");

            let mut countries: Vec<_> = svc.phone_countries.iter().collect();
            countries.sort_by(|left, right| right.1.cmp(left.1).then(left.0.cmp(right.0)));
            if countries.is_empty() {
                out.push_str("    (no data yet)\n");
            }
            for (country, count) in countries.into_iter().take(10) {
                let _ = writeln!(out, "    {country}: {count}");
            }
            out.push('\n');
        }
        out
    }

    fn lock(&self) -> MutexGuard<'_, StatsSnapshot> {
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn empty_snapshot() -> StatsSnapshot {
    let now = Utc::now();
    StatsSnapshot {
        created_at: now,
        last_updated: now,
        services: BTreeMap::new(),
    }
}

fn percent(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}
