//! Turns outcomes into report lines, one per outcome.

use progwall_common::outcome::{Outcome, OutcomeKind, PurgeReport};
use progwall_common::report::{LineStatus, ReportSink};

pub fn status_of(outcome: &Outcome) -> LineStatus {
    match outcome.kind {
        OutcomeKind::Created { .. } | OutcomeKind::Removed { .. } => LineStatus::Success,
        OutcomeKind::AlreadyExists { .. } | OutcomeKind::Kept { .. } | OutcomeKind::NoneFound => {
            LineStatus::Skipped
        }
        OutcomeKind::CreateFailed { .. }
        | OutcomeKind::RemovalFailed { .. }
        | OutcomeKind::QueryFailed { .. } => LineStatus::Failure,
    }
}

pub fn emit_outcomes(outcomes: &[Outcome], sink: &mut dyn ReportSink) {
    for outcome in outcomes {
        sink.emit(status_of(outcome), &outcome.to_string());
    }
}

/// Emits one line per failed removal followed by the summary line.
pub fn emit_purge(report: &PurgeReport, sink: &mut dyn ReportSink) {
    emit_outcomes(&report.failures, sink);
    sink.emit(LineStatus::Summary, &purge_summary(report));
}

pub fn purge_summary(report: &PurgeReport) -> String {
    if report.removed == 0 {
        return "Purged 0 orphaned rules".to_string();
    }

    let paths: Vec<String> = report
        .paths
        .iter()
        .map(|path| path.display().to_string())
        .collect();
    format!(
        "Purged {} orphaned rule{}:\n{}",
        report.removed,
        if report.removed == 1 { "" } else { "s" },
        paths.join("\n")
    )
}
