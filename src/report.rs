//! Markdown rendering of a finished [`ResearchRecord`].

use std::fs;
use std::path::Path;

use crate::data_models::{
    CompanyInfo, ContactLead, ExtractedTerm, PhaseOutcome, ResearchRecord, SkipReason,
    Stakeholder, VendorConnection, WebsiteInfo,
};
use crate::error::RenderError;

/// Company Information lists at most this many general references.
pub const MAX_ABOUT_SOURCES: usize = 3;

pub fn render_markdown(record: &ResearchRecord) -> String {
    let mut md = MarkdownBuilder::default();

    md.line(format!("# Demo Prep: {}", record.company_name));
    md.blank();
    md.line(format!("**Domain:** {}", record.domain));
    md.blank();
    md.line(format!("**Research Date:** {}", record.research_date));
    if let Some(context) = &record.company_context {
        md.blank();
        md.line(format!("**Context:** {context}"));
    }
    md.blank();
    md.line("---");

    md.section("Company Overview");
    render_overview(&mut md, &record.website);

    md.section("Company Information");
    render_company_info(&mut md, &record.company_info);

    md.section("Contact Leads");
    render_contacts(&mut md, &record.contact_leads);

    md.section("Security Leadership");
    render_stakeholders(&mut md, &record.security_leadership, "security leadership");

    md.section("Executive Leadership");
    render_stakeholders(&mut md, &record.executive_leadership, "executive leadership");

    md.section("Technology Stack");
    render_terms(&mut md, &record.tech_stack, "tech stack", "tech stack detection");
    md.subsection("Security Tools & Practices");
    render_terms(
        &mut md,
        &record.security_tools,
        "security tools",
        "security tool detection",
    );

    md.section("Security Vendor Connections");
    md.line("*Verified connections with known security vendors*");
    md.blank();
    render_vendors(&mut md, &record.vendor_connections);

    md.section("Competitive Battle Cards");
    md.line("*Battle cards integration coming soon*");

    md.finish()
}

/// Renders `record` and writes it to `path`, creating parent directories.
pub fn write_markdown(record: &ResearchRecord, path: &Path) -> Result<(), RenderError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, render_markdown(record))?;
    tracing::info!("Document generated: {}", path.display());
    Ok(())
}

#[derive(Default)]
struct MarkdownBuilder {
    out: String,
}

impl MarkdownBuilder {
    fn line(&mut self, text: impl AsRef<str>) {
        self.out.push_str(text.as_ref());
        self.out.push('\n');
    }

    /// Collapses runs of blank lines to one.
    fn blank(&mut self) {
        if !self.out.is_empty() && !self.out.ends_with("\n\n") {
            self.out.push('\n');
        }
    }

    fn section(&mut self, title: &str) {
        self.blank();
        self.line(format!("## {title}"));
        self.blank();
    }

    fn subsection(&mut self, title: &str) {
        self.blank();
        self.line(format!("### {title}"));
        self.blank();
    }

    fn note(&mut self, text: impl AsRef<str>) {
        self.line(format!("*{}*", text.as_ref()));
        self.blank();
    }

    fn skipped(&mut self, reason: &SkipReason, enable_for: &str) {
        match reason {
            SkipReason::SearchDisabled => self.note(format!(
                "Web search not configured - enable search for {enable_for}"
            )),
            SkipReason::Failed(message) => self.note(format!("Research failed: {message}")),
        }
    }

    fn finish(mut self) -> String {
        while self.out.ends_with("\n\n") {
            self.out.pop();
        }
        self.out
    }
}

fn render_overview(md: &mut MarkdownBuilder, website: &PhaseOutcome<WebsiteInfo>) {
    let info = match website {
        PhaseOutcome::Ok(info) => info,
        PhaseOutcome::Skipped(reason) => {
            md.note(format!("Note: Error accessing website - {reason}"));
            return;
        }
    };
    if *info == WebsiteInfo::default() {
        md.note("No website metadata found");
        return;
    }
    if let Some(title) = &info.title {
        md.line(format!("**Website Title:** {title}"));
        md.blank();
    }
    if let Some(description) = &info.description {
        md.line(format!("**Description:** {description}"));
        md.blank();
    }
    if let Some(about) = &info.about {
        md.line("**About:**");
        md.blank();
        md.line(about);
        md.blank();
    }
}

fn render_company_info(md: &mut MarkdownBuilder, company_info: &PhaseOutcome<CompanyInfo>) {
    let info = match company_info {
        PhaseOutcome::Ok(info) if !info.is_empty() => info,
        PhaseOutcome::Skipped(reason) => {
            md.skipped(reason, "company information");
            return;
        }
        PhaseOutcome::Ok(_) => {
            md.note("No additional company information available");
            return;
        }
    };

    for (heading, profile) in [
        ("Company Profile", &info.company_profile),
        ("Crunchbase Profile", &info.crunchbase),
    ] {
        if let Some(profile) = profile {
            md.subsection(heading);
            md.line(format!("**URL:** [{0}]({0})", profile.url));
            md.blank();
            md.line(&profile.snippet);
            md.blank();
        }
    }

    if !info.about.is_empty() {
        md.subsection("Additional Information");
        for (idx, item) in info.about.iter().take(MAX_ABOUT_SOURCES).enumerate() {
            md.line(format!("**Source {}:** [{}]({})", idx + 1, item.title, item.url));
            md.blank();
            md.line(&item.snippet);
            md.blank();
        }
    }

    if !info.news.is_empty() {
        md.subsection("Recent News");
        for item in &info.news {
            md.line(format!("- [{}]({})", item.title, item.url));
            md.line(format!("  - {}", item.snippet));
        }
    }
}

fn render_contacts(md: &mut MarkdownBuilder, contacts: &[ContactLead]) {
    if contacts.is_empty() {
        md.note("No contact leads added");
        return;
    }
    md.note("Contacts to track for this demo preparation");
    for contact in contacts {
        md.subsection(&contact.name);
        if let Some(title) = &contact.title {
            md.line(format!("**Title:** {title}"));
            md.blank();
        }
        if let Some(email) = &contact.email {
            md.line(format!("**Email:** [{email}](mailto:{email})"));
            md.blank();
        }
        if let Some(url) = &contact.profile_url {
            md.line(format!("**LinkedIn:** [{url}]({url})"));
            md.blank();
        }
        if let Some(snippet) = contact.profile_snippet.as_deref().filter(|s| !s.is_empty()) {
            md.note(snippet);
        }
        if contact.title.is_none() && contact.email.is_none() && contact.profile_url.is_none() {
            md.note("No additional contact details");
        }
    }
}

fn render_stakeholders(
    md: &mut MarkdownBuilder,
    outcome: &PhaseOutcome<Vec<Stakeholder>>,
    label: &str,
) {
    match outcome {
        PhaseOutcome::Skipped(reason) => md.skipped(reason, "stakeholder research"),
        PhaseOutcome::Ok(people) if people.is_empty() => {
            md.note(format!("No {label} information found"))
        }
        PhaseOutcome::Ok(people) => {
            for person in people {
                md.subsection(&person.name);
                md.line(format!("**Title:** {}", person.title));
                md.blank();
                md.line(format!("**LinkedIn:** [{0}]({0})", person.profile_url));
                md.blank();
            }
        }
    }
}

fn render_terms(
    md: &mut MarkdownBuilder,
    outcome: &PhaseOutcome<Vec<ExtractedTerm>>,
    label: &str,
    enable_for: &str,
) {
    match outcome {
        PhaseOutcome::Skipped(reason) => md.skipped(reason, enable_for),
        PhaseOutcome::Ok(terms) if terms.is_empty() => {
            md.note(format!("No {label} information found"))
        }
        PhaseOutcome::Ok(terms) => {
            for item in terms {
                md.line(format!("- **{}**", item.term));
                md.line(format!("  - Source: {}", item.source_link));
                if !item.context_snippet.is_empty() {
                    md.line(format!("  - Context: {}", item.context_snippet));
                }
            }
            md.blank();
        }
    }
}

fn render_vendors(md: &mut MarkdownBuilder, outcome: &PhaseOutcome<Vec<VendorConnection>>) {
    match outcome {
        PhaseOutcome::Skipped(reason) => md.skipped(reason, "vendor detection"),
        PhaseOutcome::Ok(found) if found.is_empty() => md.note("No vendor connections found"),
        PhaseOutcome::Ok(found) => {
            md.line(format!("Found {} vendor connection(s):", found.len()));
            for item in found {
                md.subsection(&item.vendor);
                md.line(format!("**Source:** [{}]({})", item.title, item.source_link));
                md.blank();
                md.line(format!("**Context:** {}", item.context_snippet));
                md.blank();
            }
        }
    }
}
