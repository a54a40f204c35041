// Plain-text report rendering for the CLI

use super::{BuildPerformanceReport, CommitActivityReport, TeamVelocityReport};
use crate::dora::DoraDashboard;

pub fn format_dora_report(dashboard: &DoraDashboard, days: u64) -> String {
    let mut report = String::new();

    report.push_str("DORA PERFORMANCE REPORT\n");
    report.push_str("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n");
    report.push_str(&format!("Window: last {days} days\n\n"));

    let df = &dashboard.deployment_frequency;
    report.push_str("DEPLOYMENT FREQUENCY\n");
    report.push_str(&format!("   Deployments:   {}\n", df.deployments));
    report.push_str(&format!("   Per day:       {:.2}\n", df.per_day));
    report.push_str(&format!("   Rating:        {}\n", df.rating));
    if let Some(source) = &df.source_metric {
        report.push_str(&format!("   Data source:   {source}\n"));
    }
    report.push('\n');

    let lt = &dashboard.lead_time;
    report.push_str("LEAD TIME FOR CHANGES\n");
    report.push_str(&format!("   Average:       {:.1}h\n", lt.average_hours));
    report.push_str(&format!("   Samples:       {}\n", lt.samples));
    report.push_str(&format!("   Rating:        {}\n", lt.rating));
    if let Some(p) = &lt.percentile {
        report.push_str(&format!("   p{:.0}:           {:.1}h\n", p.percentile, p.hours));
    }
    if let Some(breakdown) = &lt.breakdown {
        report.push_str("   Stage breakdown:\n");
        report.push_str(&format!("     • Code review: {:.1}h\n", breakdown.code_review_hours));
        report.push_str(&format!("     • CI:          {:.1}h\n", breakdown.ci_hours));
        report.push_str(&format!("     • QA:          {:.1}h\n", breakdown.qa_hours));
        report.push_str(&format!("     • Approval:    {:.1}h\n", breakdown.approval_hours));
        report.push_str(&format!("     • Deployment:  {:.1}h\n", breakdown.deployment_hours));
    }
    report.push('\n');

    let ttr = &dashboard.time_to_restore;
    report.push_str("TIME TO RESTORE SERVICE\n");
    report.push_str(&format!("   Average:       {:.1}h\n", ttr.average_hours));
    report.push_str(&format!("   Samples:       {}\n", ttr.samples));
    report.push_str(&format!("   Rating:        {}\n", ttr.rating));
    report.push('\n');

    let cfr = &dashboard.change_failure_rate;
    report.push_str("CHANGE FAILURE RATE\n");
    report.push_str(&format!("   Failed:        {} of {}\n", cfr.failed, cfr.total));
    report.push_str(&format!("   Rate:          {:.1}%\n", cfr.rate));
    report.push_str(&format!("   Rating:        {}\n", cfr.rating));
    report.push('\n');

    report.push_str(&format!("OVERALL: {}\n", dashboard.overall.label().to_uppercase()));
    report
}

pub fn format_commit_report(activity: &CommitActivityReport) -> String {
    let mut report = String::new();

    report.push_str("COMMIT ACTIVITY REPORT\n");
    report.push_str("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n");
    report.push_str(&format!("Total commits: {}\n\n", activity.total_commits));

    if !activity.directories.is_empty() {
        report.push_str("DIRECTORY HOTSPOTS\n");
        for entry in activity.directories.iter().take(10) {
            report.push_str(&format!(
                "   {:<30} {:>6} changes  {:>5.1}%\n",
                entry.name, entry.changes, entry.share
            ));
        }
        report.push('\n');
    }

    if !activity.extensions.is_empty() {
        report.push_str("FILE EXTENSIONS\n");
        for entry in activity.extensions.iter().take(10) {
            report.push_str(&format!(
                "   .{:<29} {:>6} changes  {:>5.1}%\n",
                entry.name, entry.changes, entry.share
            ));
        }
        report.push('\n');
    }

    if !activity.authors.is_empty() {
        report.push_str("TOP AUTHORS\n");
        for author in activity.authors.iter().take(10) {
            report.push_str(&format!("   {:<30} {:>6} commits\n", author.author, author.commits));
        }
    }

    report
}

pub fn format_build_report(builds: &BuildPerformanceReport) -> String {
    let mut report = String::new();

    report.push_str("BUILD PERFORMANCE REPORT\n");
    report.push_str("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n");
    report.push_str(&format!("   Total runs:    {}\n", builds.total_runs));
    report.push_str(&format!("   Success rate:  {:.1}%\n", builds.success_rate));
    report.push_str(&format!("   Avg duration:  {:.0}s\n", builds.average_duration_secs));
    report.push_str(&format!("   p95 duration:  {:.0}s\n\n", builds.p95_duration_secs));

    if !builds.workflows.is_empty() {
        report.push_str("PER WORKFLOW\n");
        for wf in &builds.workflows {
            report.push_str(&format!(
                "   {:<24} {:>5} runs  {:>5.1}% success\n",
                wf.workflow_name, wf.runs, wf.success_rate
            ));
        }
        report.push('\n');
    }

    if !builds.flaky.is_empty() {
        report.push_str("FLAKY JOBS\n");
        for job in &builds.flaky {
            report.push_str(&format!(
                "   {} / {}: {} flips across {} runs ({:.0}%)\n",
                job.workflow_name,
                job.job_name,
                job.transitions,
                job.observations,
                job.transition_rate * 100.0
            ));
        }
    } else {
        report.push_str("No flaky jobs detected\n");
    }

    report
}

pub fn format_velocity_report(velocity: &TeamVelocityReport) -> String {
    let mut report = String::new();

    report.push_str("TEAM VELOCITY REPORT\n");
    report.push_str("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n");
    report.push_str(&format!("   Issues closed:  {}\n", velocity.total_closed));
    report.push_str(&format!("   Weekly average: {:.1}\n\n", velocity.velocity));

    for week in &velocity.weekly {
        report.push_str(&format!(
            "   week of {}: {} closed\n",
            week.week_start.format("%Y-%m-%d"),
            week.closed
        ));
    }

    report
}
