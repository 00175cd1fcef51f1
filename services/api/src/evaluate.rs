use crate::infra::build_service;
use chrono::{Local, NaiveDate};
use clap::Args;
use delay_repay::config::AppConfig;
use delay_repay::eligibility::{
    Assessment, ClaimRoute, EligibilityReport, OperatorPolicy, SegmentReport,
};
use delay_repay::error::AppError;
use delay_repay::reference::{
    load_compensation_table, CompensationTable, OperatorCodeTable, ReferenceData,
};
use std::path::PathBuf;

#[derive(Args, Debug)]
pub(crate) struct EvaluateArgs {
    /// Path to the extracted ticket JSON (single segment or {"segments": [...]})
    #[arg(long)]
    pub(crate) ticket: PathBuf,
    /// Evaluation date used for the claim window (defaults to today)
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) today: Option<NaiveDate>,
    /// Print the raw JSON assessment instead of a summary
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug)]
pub(crate) struct PolicyArgs {
    /// Operator display name, e.g. "CrossCountry"
    #[arg(long)]
    pub(crate) operator: String,
}

pub(crate) async fn run_evaluate(args: EvaluateArgs) -> Result<(), AppError> {
    let EvaluateArgs {
        ticket,
        today,
        json,
    } = args;

    let config = AppConfig::load()?;
    let payload = std::fs::read(&ticket)?;
    if payload.is_empty() {
        return Err(AppError::Input(format!("{} is empty", ticket.display())));
    }

    let today = today.unwrap_or_else(|| Local::now().date_naive());
    let service = build_service(&config)?;
    let assessment = service.assess(&payload, today).await;

    if json {
        let rendered = serde_json::to_string_pretty(&assessment)?;
        println!("{rendered}");
    } else {
        print!("{}", render_assessment(&assessment, today));
    }
    Ok(())
}

pub(crate) fn run_policy(args: PolicyArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let compensation = load_compensation_table(&config.reference.compensation)?;
    print!("{}", render_policy(&compensation, &args.operator)?);
    Ok(())
}

fn render_policy(compensation: &CompensationTable, operator: &str) -> Result<String, AppError> {
    let reference = ReferenceData::new(OperatorCodeTable::default(), compensation.clone());
    let policy = OperatorPolicy::lookup(&reference, operator).ok_or_else(|| {
        AppError::Input(format!("operator '{operator}' is not in the compensation table"))
    })?;

    let mut out = format!("Delay Repay policy for {}\n", policy.operator);
    match policy.minimum_delay_minutes {
        Some(minutes) => out.push_str(&format!("- Minimum qualifying delay: {minutes} min\n")),
        None => out.push_str("- No compensation for any delay duration\n"),
    }
    for bracket in &policy.brackets {
        out.push_str(&format!("  {:>7} min: {}\n", bracket.bracket, bracket.percentage));
    }
    if let Some(portal) = &policy.claim_portal {
        out.push_str(&format!("- Automated claims via {portal}\n"));
    }
    Ok(out)
}

fn render_assessment(assessment: &Assessment, today: NaiveDate) -> String {
    let mut out = format!("Delay Repay assessment ({today})\n");
    match &assessment.report {
        EligibilityReport::Rejected(rejected) => {
            out.push_str(&format!(
                "Status: {}\n{}\nNext action: {:?}\n",
                rejected.status.label(),
                rejected.message,
                rejected.next_action
            ));
        }
        EligibilityReport::Journey(segment) => {
            render_segment(&mut out, segment, assessment.claims.first());
        }
        EligibilityReport::MultiLeg(report) => {
            out.push_str(&format!(
                "Status: {}\n{}\n",
                report.status.label(),
                report.message
            ));
            for (index, segment) in report.segments.iter().enumerate() {
                out.push_str(&format!("\nSegment {}\n", index + 1));
                render_segment(&mut out, segment, assessment.claims.get(index));
            }
        }
    }
    out
}

fn render_segment(out: &mut String, segment: &SegmentReport, claim: Option<&ClaimRoute>) {
    let from = segment
        .departure_station
        .as_deref()
        .or(segment.departure_crs.as_deref())
        .unwrap_or("?");
    let to = segment
        .arrival_station
        .as_deref()
        .or(segment.arrival_crs.as_deref())
        .unwrap_or("?");
    out.push_str(&format!(
        "- {} {} {} -> {} ({})\n",
        segment.ticket_date.as_deref().unwrap_or("?"),
        segment.departure_time.as_deref().unwrap_or("?"),
        from,
        to,
        segment.ticket_format.label()
    ));
    if let Some(operator) = &segment.train_operator {
        out.push_str(&format!("- Operator: {operator}\n"));
    }
    if let Some(delay) = segment.delay_minutes {
        out.push_str(&format!("- Arrival delay: {delay:.1} min\n"));
    }
    if let Some(percentage) = &segment.compensation_percentage {
        out.push_str(&format!("- Compensation: {percentage}\n"));
    }
    out.push_str(&format!(
        "- Status: {} ({})\n  {}\n",
        segment.status.label(),
        segment.delay_status,
        segment.message
    ));
    match claim {
        Some(ClaimRoute::Automated { portal_url, .. }) => {
            out.push_str(&format!("- Claim: automated via {portal_url}\n"));
        }
        Some(ClaimRoute::Manual { train_operator }) => {
            out.push_str(&format!("- Claim: submit manually with {train_operator}\n"));
        }
        Some(route) => out.push_str(&format!("- Claim: {}\n", route.label())),
        None => {}
    }
}
