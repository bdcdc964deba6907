//! Command-line surface: argument definitions and the interactive confirmation.

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};
use dialoguer::Input;
use dialoguer::theme::ColorfulTheme;

use crate::data_models::{ContactLead, PhaseOutcome};
use crate::researcher::{Confirmation, VerificationPayload};

/// Research a company and generate demo preparation materials.
#[derive(Parser, Debug)]
#[command(name = "demo-prep")]
#[command(version)]
#[command(about = "Research a company and generate demo preparation materials")]
#[command(subcommand_negates_reqs = true, args_conflicts_with_subcommands = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Company domain, e.g. acme.com
    #[arg(required = true)]
    pub domain: Option<String>,

    /// Output markdown path (default: <company>_demo_prep.md)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Override the company name derived from the domain.
    #[arg(long)]
    pub company_name: Option<String>,

    /// Free-text context shown in the report header.
    #[arg(long)]
    pub company_context: Option<String>,

    /// Contact to enrich, as "Name|Title|email" (title and email optional).
    #[arg(long = "contact", value_parser = parse_contact)]
    pub contacts: Vec<ContactLead>,

    /// Do not stop for company verification.
    #[arg(long)]
    pub skip_verification: bool,

    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the web interface.
    Serve {
        /// Address to bind, overrides DEMO_PREP_BIND_ADDR.
        #[arg(long)]
        bind: Option<String>,
    },

    /// Convert a generated markdown report to PDF.
    Convert {
        /// Markdown file to convert.
        markdown: PathBuf,

        /// Output PDF (default: same name with .pdf).
        pdf: Option<PathBuf>,
    },
}

impl Cli {
    pub fn log_level(&self) -> tracing::Level {
        match self.verbose {
            0 => tracing::Level::INFO,
            1 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        }
    }
}

/// Parses `Name|Title|email`; empty fields are treated as absent.
pub fn parse_contact(raw: &str) -> Result<ContactLead, String> {
    let mut parts = raw.split('|').map(str::trim);
    let name = parts.next().unwrap_or_default();
    if name.is_empty() {
        return Err("contact name cannot be empty".to_string());
    }
    let title = parts.next().map(str::to_string);
    let email = parts.next().map(str::to_string);
    if parts.next().is_some() {
        return Err(format!("expected \"Name|Title|email\", got {raw:?}"));
    }
    Ok(ContactLead::new(name, title, email))
}

/// Human-readable summary of what was found before the user confirms.
pub fn verification_summary(payload: &VerificationPayload) -> String {
    let mut lines = vec![
        "=".repeat(60),
        "COMPANY VERIFICATION".to_string(),
        "=".repeat(60),
        format!("Company Name: {}", payload.company_name),
        format!("Domain: {}", payload.domain),
    ];
    if let Some(context) = &payload.context {
        lines.push(format!("Context: {context}"));
    }

    match &payload.website_info {
        PhaseOutcome::Ok(info) => {
            if let Some(title) = &info.title {
                lines.push(format!("Website Title: {title}"));
            }
            if let Some(description) = &info.description {
                lines.push(format!("Description: {description}"));
            }
        }
        PhaseOutcome::Skipped(reason) => lines.push(format!("Website: unavailable ({reason})")),
    }

    match &payload.company_info {
        PhaseOutcome::Ok(info) => {
            if let Some(profile) = &info.company_profile {
                lines.push(format!("Company Profile: {}", profile.url));
            }
            if let Some(crunchbase) = &info.crunchbase {
                lines.push(format!("Crunchbase: {}", crunchbase.url));
            }
            for item in info.about.iter().take(2) {
                lines.push(format!("Reference: {}", item.title));
            }
        }
        PhaseOutcome::Skipped(reason) => {
            lines.push(format!("Company information: unavailable ({reason})"))
        }
    }
    lines.push("=".repeat(60));
    lines.join("\n")
}

/// Maps a prompt answer onto a confirmation; `None` means ask again.
pub fn interpret_answer(answer: &str) -> Option<Confirmation> {
    match answer.trim().to_lowercase().as_str() {
        "y" | "yes" => Some(Confirmation::Proceed { context: None }),
        "n" | "no" => Some(Confirmation::Abort),
        _ => None,
    }
}

/// Asks y / n / c until the user gives a usable answer. Choosing `c` collects
/// additional context and proceeds with it.
pub fn prompt_confirmation() -> anyhow::Result<Confirmation> {
    let theme = ColorfulTheme::default();
    loop {
        let answer: String = Input::with_theme(&theme)
            .with_prompt("Is this the correct company? (y)es / (n)o / (c)ontext")
            .interact_text()?;

        if matches!(answer.trim().to_lowercase().as_str(), "c" | "context") {
            let context: String = Input::with_theme(&theme)
                .with_prompt("Additional context (industry, location, products)")
                .allow_empty(true)
                .interact_text()?;
            return Ok(Confirmation::Proceed {
                context: Some(context).filter(|c| !c.trim().is_empty()),
            });
        }

        match interpret_answer(&answer) {
            Some(confirmation) => return Ok(confirmation),
            None => println!("Please answer y, n or c."),
        }
    }
}
