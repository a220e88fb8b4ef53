use crate::OutputFormat;
use anyhow::Result;
use console::style;
use undocheck_core::{PhaseOutcome, Report, ReportWriter};

pub fn print_report(report: &Report, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Pretty => print!("{}", render_pretty(report)),
        OutputFormat::Json => println!("{}", ReportWriter::to_string(report)?),
    }
    Ok(())
}

pub fn render_pretty(report: &Report) -> String {
    let mut out = String::new();
    out.push('\n');
    out.push_str(&format!(
        "{} {} scenario against {}\n",
        style("▶").bold(),
        report.scenario.as_str(),
        report.url
    ));

    for record in &report.phases {
        let line = match &record.outcome {
            PhaseOutcome::Passed => format!(
                "  {} {} ({}ms)",
                style("✅").green(),
                record.phase,
                record.duration_ms
            ),
            PhaseOutcome::Failed { kind, detail } => format!(
                "  {} {} ({}ms) {}: {}",
                style("❌").red(),
                record.phase,
                record.duration_ms,
                style(kind).red().bold(),
                detail
            ),
            PhaseOutcome::Skipped => {
                format!("  {} {} skipped", style("⏭").dim(), style(record.phase).dim())
            }
        };
        out.push_str(&line);
        out.push('\n');
    }

    let screenshots = report.screenshots();
    if !screenshots.is_empty() {
        out.push_str("\n📸 Screenshots:\n");
        for path in screenshots {
            out.push_str(&format!("  {}\n", path.display()));
        }
    }

    out.push('\n');
    if report.passed() {
        out.push_str(&format!(
            "{} Verification passed in {}ms\n",
            style("✅").green(),
            report.duration_ms
        ));
    } else {
        out.push_str(&format!(
            "{} Verification failed after {}ms\n",
            style("❌").red(),
            report.duration_ms
        ));
    }
    out
}
