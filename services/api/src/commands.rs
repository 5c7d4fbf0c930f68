use crate::infra::build_service;
use clap::Args;
use serde_json::Value;
use std::fmt::Write as _;
use std::path::PathBuf;
use talent_audit::audit::{AuditEvent, AuditScope, AuditSink, JsonLinesAuditLog};
use talent_audit::config::AppConfig;
use talent_audit::engine::router::RankRequest;
use talent_audit::engine::{ServiceError, DEFAULT_TIMELINE_LIMIT, MAX_TIMELINE_LIMIT};
use talent_audit::error::AppError;
use talent_audit::workflows::fairness::{
    DecisionCsvImporter, FairnessReport, FavorableLabel, GroupConfig,
};
use talent_audit::workflows::ranking::{RankedCandidate, SkillMatchMode};

fn parse_match_mode(raw: &str) -> Result<SkillMatchMode, String> {
    SkillMatchMode::parse(raw).ok_or_else(|| format!("unknown match mode '{raw}' (use exact or fuzzy-substring)"))
}

#[derive(Args, Debug)]
pub(crate) struct RankArgs {
    /// JSON file with `job`, `candidates`, and optional `weights`
    #[arg(long)]
    pub(crate) input: PathBuf,
    /// Skill matching mode (exact or fuzzy-substring)
    #[arg(long, value_parser = parse_match_mode)]
    pub(crate) mode: Option<SkillMatchMode>,
}

#[derive(Args, Debug)]
pub(crate) struct AuditArgs {
    /// CSV export with the attribute column, `decision` (or `status`), and `ground_truth`
    #[arg(long)]
    pub(crate) input: PathBuf,
    /// Protected attribute column to audit
    #[arg(long)]
    pub(crate) attribute: String,
    /// Reference group
    #[arg(long)]
    pub(crate) privileged: Option<String>,
    /// Comparison group
    #[arg(long)]
    pub(crate) unprivileged: Option<String>,
    /// Decision value counted as favorable (defaults to 1)
    #[arg(long)]
    pub(crate) favorable_label: Option<String>,
    /// Print the report as JSON
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug)]
pub(crate) struct TimelineArgs {
    /// Scope such as `job:<id>` or `audit:<attribute>`
    #[arg(long)]
    pub(crate) scope: String,
    /// Maximum number of events to show
    #[arg(long, default_value_t = DEFAULT_TIMELINE_LIMIT)]
    pub(crate) limit: usize,
}

pub(crate) fn run_rank(args: RankArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;
    if let Some(mode) = args.mode {
        config.engine.ranking.match_mode = mode;
    }

    let raw = std::fs::read_to_string(&args.input)?;
    let request: RankRequest = serde_json::from_str(&raw)?;
    let service = build_service(&config);
    let audited = service.rank_candidates(
        &request.job,
        &request.candidates,
        request.weights,
        request.actor.as_deref(),
    )?;

    print!("{}", render_rankings(&request.job.id.0, &audited.result));
    if let Some(warning) = audited.audit_warning {
        eprintln!("warning: {warning}");
    }
    Ok(())
}

pub(crate) fn run_audit(args: AuditArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let label = match args.favorable_label.as_deref() {
        Some(raw) => FavorableLabel::from_value(&label_value(raw)).map_err(ServiceError::from)?,
        None => FavorableLabel::default(),
    };

    let records = DecisionCsvImporter::from_path(&args.input, &args.attribute, &label)?;
    let groups = GroupConfig {
        privileged: args.privileged,
        unprivileged: args.unprivileged,
    };
    let service = build_service(&config);
    let audited = service.audit_fairness(&records, &args.attribute, &groups, None)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&audited.result)?);
    } else {
        print!("{}", render_report(&args.attribute, &audited.result));
    }
    if let Some(warning) = audited.audit_warning {
        eprintln!("warning: {warning}");
    }
    Ok(())
}

pub(crate) fn run_timeline(args: TimelineArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let Some(path) = config.audit.log_path else {
        println!("AUDIT_LOG_PATH is not set; audit events are only kept in memory by a running server");
        return Ok(());
    };

    let log = JsonLinesAuditLog::new(path);
    let events = log.timeline(
        &AuditScope(args.scope.trim().to_string()),
        args.limit.min(MAX_TIMELINE_LIMIT),
    )?;
    print!("{}", render_timeline(&args.scope, &events));
    Ok(())
}

/// Numbers and booleans keep their type; anything else is a text label.
fn label_value(raw: &str) -> Value {
    match serde_json::from_str::<Value>(raw.trim()) {
        Ok(value @ (Value::Number(_) | Value::Bool(_))) => value,
        _ => Value::String(raw.trim().to_string()),
    }
}

pub(crate) fn render_rankings(job_id: &str, rankings: &[RankedCandidate]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Ranking for job {job_id} ({} candidates)", rankings.len());
    let _ = writeln!(
        out,
        "{:>4}  {:<16} {:>7} {:>6} {:>6}  missing",
        "rank", "candidate", "overall", "skill", "exp"
    );
    for ranked in rankings {
        let missing = if ranked.missing_skills.is_empty() {
            "-".to_string()
        } else {
            ranked.missing_skills.join(", ")
        };
        let _ = writeln!(
            out,
            "{:>4}  {:<16} {:>7.1} {:>6} {:>6}  {}",
            ranked.rank,
            ranked.candidate_id.0,
            ranked.overall_score,
            ranked.skill_match_score,
            ranked.experience_score,
            missing
        );
    }
    out
}

pub(crate) fn render_report(attribute: &str, report: &FairnessReport) -> String {
    let mut out = String::new();
    let badge = &report.fairness_badge;
    let _ = writeln!(out, "Fairness audit for '{attribute}'");
    let _ = writeln!(
        out,
        "Badge: {} ({}) score {}/100",
        badge.grade.label(),
        badge.level,
        badge.score
    );
    let _ = writeln!(
        out,
        "Bias detected: {}",
        if report.bias_detected { "yes" } else { "no" }
    );

    let _ = writeln!(out, "\nMetrics");
    for (metric, value) in &report.fairness_metrics {
        let rendered = match value.value() {
            Some(number) => format!("{number:.4}"),
            None => "insufficient_data".to_string(),
        };
        let _ = writeln!(out, "  {:<32} {}", metric.label(), rendered);
    }

    if report.violations.is_empty() {
        let _ = writeln!(out, "\nViolations: none");
    } else {
        let _ = writeln!(out, "\nViolations");
        for violation in &report.violations {
            let _ = writeln!(
                out,
                "  [{}] {} = {:.4} (threshold {}): {}",
                violation.severity.label(),
                violation.metric.label(),
                violation.value,
                violation.threshold,
                violation.interpretation
            );
        }
    }

    if !report.data_quality_notes.is_empty() {
        let _ = writeln!(out, "\nData quality");
        for note in &report.data_quality_notes {
            let _ = writeln!(out, "  - {note}");
        }
    }

    let _ = writeln!(out, "\nRecommendations");
    for recommendation in &report.recommendations {
        let _ = writeln!(out, "  - {recommendation}");
    }
    out
}

pub(crate) fn render_timeline(scope: &str, events: &[AuditEvent]) -> String {
    let mut out = String::new();
    if events.is_empty() {
        let _ = writeln!(out, "No audit events recorded for {scope}");
        return out;
    }
    for event in events {
        let _ = writeln!(
            out,
            "{}  {}  {:<12} {}",
            event.timestamp.to_rfc3339(),
            event.id.0,
            event.event_type.label(),
            event.actor
        );
    }
    out
}
