pub mod types;

pub use types::Report;

use crate::decision::{Action, PipelineOutcome, StarOutcome};
use crate::github::{EntryKind, ReadmeContent, RepoRef, RepositoryMetadata, RootEntry};
use colored::Colorize;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, instrument};

/// Width of the rule framing the raw model response.
const RULE_WIDTH: usize = 60;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Failed to write report file: {0}")]
    FileWrite(#[from] std::io::Error),
}

/// Collect the run's results into a Report.
pub fn build(
    target: RepoRef,
    metadata: RepositoryMetadata,
    root_entries: Vec<RootEntry>,
    readme: &ReadmeContent,
    outcome: PipelineOutcome,
) -> Report {
    Report {
        target,
        metadata,
        root_entries,
        readme_source: readme.source.clone(),
        outcome,
    }
}

/// Print the report to the terminal and, when `output_path` is given, also
/// write it there as markdown.
#[instrument(skip(report), fields(target = %report.target))]
pub fn output(report: &Report, output_path: Option<&Path>) -> Result<(), ReportError> {
    debug!("writing report to terminal");
    print_terminal_report(report);
    if let Some(path) = output_path {
        debug!(path = %path.display(), "writing report to file");
        write_markdown_report(report, path)?;
    }
    Ok(())
}

/// Print the redirect URL an operator must visit to connect GitHub.
pub fn print_connection_prompt(redirect_url: Option<&str>) {
    println!();
    println!("{}", "Please visit this URL to connect your GitHub account:".bold());
    match redirect_url {
        Some(url) => println!("{}", url.cyan().underline()),
        None => println!("{}", "(the backend did not return a redirect URL)".yellow()),
    }
    println!();
    println!("After connecting, restart the application.");
}

fn print_terminal_report(report: &Report) {
    let meta = &report.metadata;
    println!();
    println!("{}", "═══ Repository Details ═══".bold());
    println!("Name: {}", meta.name);
    println!("Owner: {}", meta.owner_login);
    println!(
        "Description: {}",
        meta.description.as_deref().unwrap_or("No description")
    );
    println!("Stars: {} | Forks: {}", meta.stargazers_count, meta.forks_count);
    println!("Created: {}", meta.created_at);
    println!("URL: {}", meta.html_url);
    println!();

    if !report.root_entries.is_empty() {
        println!("{}", "═══ Repository Root ═══".bold());
        for entry in &report.root_entries {
            let marker = match entry.kind {
                EntryKind::Dir => "dir ",
                EntryKind::File => "file",
                EntryKind::Other => "    ",
            };
            println!("  {} {}", marker.dimmed(), entry.name);
        }
        println!();
    }

    println!("README: {}", report.readme_label());
    println!();

    let outcome = &report.outcome;
    if let Some(error) = &outcome.model_error {
        println!("{} {}", "LLM analysis failed:".red().bold(), error);
        println!("Skipping star action due to analysis failure.");
        println!();
        return;
    }

    if let Some(response) = &outcome.response {
        println!("{}", "═══ LLM Full Response ═══".bold());
        println!("{}", "=".repeat(RULE_WIDTH));
        println!("{response}");
        println!("{}", "=".repeat(RULE_WIDTH));
        println!();
    }

    if let Some(decision) = &outcome.decision {
        if let Some(analysis) = &decision.analysis {
            println!("{}", "═══ LLM Analysis ═══".bold());
            println!("{analysis}");
            println!();
        }
        println!(
            "═══ LLM Decision: {} ═══",
            colorize_action(decision.verdict.action())
        );
        if let Some(reason) = decision.verdict.reason() {
            println!("Reason: {reason}");
        }
    }

    println!("Star action: {}", colorize_star(&outcome.star));
    if let StarOutcome::Starred { response } = &outcome.star {
        println!("Star result: {}", response.dimmed());
    }
    println!();
}

fn write_markdown_report(report: &Report, path: &Path) -> Result<(), ReportError> {
    let meta = &report.metadata;
    let mut md = String::new();
    md.push_str(&format!("# {}\n\n", report.target));
    md.push_str(&format!(
        "**Owner:** {} | **Stars:** {} | **Forks:** {} | **Created:** {}\n\n",
        meta.owner_login, meta.stargazers_count, meta.forks_count, meta.created_at
    ));
    md.push_str(&format!(
        "{}\n\n",
        meta.description.as_deref().unwrap_or("No description")
    ));
    md.push_str(&format!("- URL: <{}>\n", meta.html_url));
    md.push_str(&format!(
        "- Language: {}\n",
        meta.language.as_deref().unwrap_or("Not specified")
    ));
    md.push_str(&format!("- README: {}\n\n", report.readme_label()));

    let outcome = &report.outcome;
    if let Some(error) = &outcome.model_error {
        md.push_str(&format!("## LLM analysis failed\n\n{error}\n\n"));
    }

    if let Some(decision) = &outcome.decision {
        if let Some(analysis) = &decision.analysis {
            md.push_str(&format!("## Analysis\n\n{analysis}\n\n"));
        }
        md.push_str(&format!("## Decision: {}\n\n", decision.verdict.action()));
        if let Some(reason) = decision.verdict.reason() {
            md.push_str(&format!("**Reason:** {reason}\n\n"));
        }
    }

    md.push_str(&format!("## Star action: {}\n", star_label(&outcome.star)));

    std::fs::write(path, md)?;
    Ok(())
}

fn star_label(star: &StarOutcome) -> String {
    match star {
        StarOutcome::NotRequested => "not requested".to_string(),
        StarOutcome::Starred { .. } => "starred".to_string(),
        StarOutcome::ToolMissing => "star tool not found".to_string(),
        StarOutcome::Failed { error } => format!("failed ({error})"),
    }
}

fn colorize_action(action: Action) -> colored::ColoredString {
    match action {
        Action::Star => "STAR".green().bold(),
        Action::Skip => "SKIP".yellow().bold(),
        Action::Unknown => "UNKNOWN".red().bold(),
    }
}

fn colorize_star(star: &StarOutcome) -> colored::ColoredString {
    let label = star_label(star);
    match star {
        StarOutcome::Starred { .. } => label.green().bold(),
        StarOutcome::NotRequested => label.normal(),
        StarOutcome::ToolMissing | StarOutcome::Failed { .. } => label.red().bold(),
    }
}
