use crate::infra::{load_fixture, read_payload, replay_service};
use chrono::Local;
use clap::Args;
use lead_enrich::config::EnrichmentConfig;
use lead_enrich::error::AppError;
use lead_enrich::workflows::enrichment::{EnrichOptions, EnrichmentResult, JobPayload};
use std::path::PathBuf;

#[derive(Args, Debug)]
pub(crate) struct EnrichArgs {
    /// Job payload JSON file to enrich
    #[arg(long)]
    pub(crate) payload: PathBuf,
    /// Replay fixture answering collaborator calls (defaults to the bundled sample)
    #[arg(long)]
    pub(crate) fixtures: Option<PathBuf>,
    /// Skip the paid phone providers
    #[arg(long)]
    pub(crate) test_mode: bool,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Skip the paid phone providers
    #[arg(long)]
    pub(crate) test_mode: bool,
    /// Print the provider statistics report after the run
    #[arg(long)]
    pub(crate) stats: bool,
}

pub(crate) async fn run_enrich(args: EnrichArgs) -> Result<(), AppError> {
    let EnrichArgs {
        payload,
        fixtures,
        test_mode,
    } = args;

    let payload = read_payload(&payload)?;
    let fixture = load_fixture(fixtures.as_deref())?;
    let config = EnrichmentConfig::from_env()?;
    let service = replay_service(fixture, config);

    let result = service
        .enrich_with_options(
            &payload,
            EnrichOptions {
                skip_paid_providers: test_mode,
            },
        )
        .await;
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

pub(crate) async fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs { test_mode, stats } = args;

    let fixture = load_fixture(None)?;
    let payload = fixture.payload.clone().unwrap_or_else(|| JobPayload {
        id: "lead-demo".to_string(),
        company: "Kaiser Logistik GmbH".to_string(),
        title: "Disponent (m/w/d)".to_string(),
        ..JobPayload::default()
    });
    let service = replay_service(fixture, EnrichmentConfig::default());

    println!("Lead enrichment demo ({})", Local::now().format("%Y-%m-%d %H:%M"));
    println!(
        "- Lead {}: {} at {}",
        payload.id, payload.title, payload.company
    );

    let result = service
        .enrich_with_options(
            &payload,
            EnrichOptions {
                skip_paid_providers: test_mode,
            },
        )
        .await;
    render_result(&result);

    if stats {
        println!("\n{}", service.stats().summary());
    }
    Ok(())
}

fn render_result(result: &EnrichmentResult) {
    println!(
        "- Outcome: {}",
        if result.success {
            "decision-maker found"
        } else {
            "no decision-maker"
        }
    );

    match &result.decision_maker {
        Some(person) => {
            println!(
                "  Decision-maker: {} ({})",
                person.name,
                person.title.as_deref().unwrap_or("no title")
            );
            println!(
                "  Source: {} | role: {:?} | relevance: {:.0}",
                person.source,
                person.role,
                person.rank_score.unwrap_or_default()
            );
            if let Some(email) = &person.email {
                println!("  Email: {email}");
            }
        }
        None => println!("  Decision-maker: none"),
    }

    match &result.phone {
        Some(phone) => println!(
            "  Phone: {} ({:?}, via {})",
            phone.number, phone.kind, phone.origin
        ),
        None => println!("  Phone: none ({:?})", result.phone_status),
    }

    let company = &result.company;
    println!(
        "- Company: {} | domain {} | industry {} | employees {}",
        company.name,
        company.domain.as_deref().unwrap_or("unknown"),
        company.industry.as_deref().unwrap_or("unknown"),
        company.employee_count.as_deref().unwrap_or("unknown")
    );
    if let Some(intel) = &result.company_intel {
        if !intel.summary.is_empty() {
            println!("  {}", intel.summary);
        }
        for signal in &intel.hiring_signals {
            println!("  Hiring signal: {signal}");
        }
    }

    if !result.emails.is_empty() {
        println!("- Emails collected:");
        for email in &result.emails {
            println!("  - {email}");
        }
    }

    println!("- Enrichment path:");
    for (index, step) in result.enrichment_path.steps().iter().enumerate() {
        println!("  {:>2}. {step}", index + 1);
    }
}
