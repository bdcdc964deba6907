//! Sequential research phases and the two-step begin/continue protocol.
//!
//! A run is split at the point where a human confirms the company:
//! [`CompanyResearcher::begin_research`] gathers just enough to verify the
//! target, and [`PendingResearch::continue_research`] runs every remaining
//! phase. Neither step touches the console.

use std::collections::HashSet;

use serde::Serialize;

use crate::data_models::{
    CompanyInfo, ContactLead, ExtractedTerm, PhaseOutcome, ProfileLink, ResearchRecord,
    SearchResult, SkipReason, SourceRef, Stakeholder, VendorConnection, WebsiteInfo,
};
use crate::extractor::TermCollector;
use crate::parser::{canonical_profile_url, extract_profile_url, parse_name, parse_title};
use crate::patterns::PatternBank;
use crate::query_planner::{
    EXECUTIVE_LEADERSHIP, QueryPlanner, RoleCategory, SECURITY_LEADERSHIP, result_counts,
};
use crate::search::SearchClient;
use crate::vendor::{VendorCatalog, find_connection};
use crate::website::WebsiteScraper;

/// Stop searching further role variants once a category has this many people.
pub const STAKEHOLDERS_PER_CATEGORY: usize = 2;

#[derive(Debug, Clone, Default)]
pub struct ResearchRequest {
    pub domain: String,
    pub company_name: Option<String>,
    pub company_context: Option<String>,
    pub contact_leads: Vec<ContactLead>,
}

impl ResearchRequest {
    pub fn new(domain: &str) -> Self {
        Self {
            domain: clean_domain(domain),
            ..Default::default()
        }
    }
}

/// What a human needs to see to confirm the right company is being researched.
#[derive(Debug, Clone, Serialize)]
pub struct VerificationPayload {
    pub company_name: String,
    pub domain: String,
    pub context: Option<String>,
    pub website_info: PhaseOutcome<WebsiteInfo>,
    pub company_info: PhaseOutcome<CompanyInfo>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Confirmation {
    /// Keep going; a non-empty context replaces the stored one.
    Proceed { context: Option<String> },
    Abort,
}

#[derive(Debug)]
pub enum ResearchOutcome {
    Completed(Box<ResearchRecord>),
    Aborted,
}

/// Counts a phase's queries so a phase whose every query failed can say so.
#[derive(Default)]
struct QueryTally {
    issued: usize,
    failed: usize,
    last_error: Option<String>,
}

impl QueryTally {
    fn finish<T>(self, data: T) -> PhaseOutcome<T> {
        if self.issued > 0 && self.failed == self.issued {
            let message = self
                .last_error
                .unwrap_or_else(|| "all searches failed".to_string());
            PhaseOutcome::Skipped(SkipReason::Failed(message))
        } else {
            PhaseOutcome::Ok(data)
        }
    }
}

pub struct CompanyResearcher<S> {
    search: S,
    website: WebsiteScraper,
    catalog: VendorCatalog,
}

impl<S: SearchClient> CompanyResearcher<S> {
    pub fn new(search: S, website: WebsiteScraper) -> Self {
        Self {
            search,
            website,
            catalog: VendorCatalog::default(),
        }
    }

    pub fn with_vendor_catalog(mut self, catalog: VendorCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn search_enabled(&self) -> bool {
        self.search.is_enabled()
    }

    /// Runs the verification phases (website, company info) and suspends.
    pub async fn begin_research(
        self,
        request: ResearchRequest,
    ) -> (PendingResearch<S>, VerificationPayload) {
        let domain = clean_domain(&request.domain);
        let company_name = request
            .company_name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| company_name_from_domain(&domain));
        let mut record = ResearchRecord::new(
            domain,
            company_name,
            request.company_context.filter(|c| !c.trim().is_empty()),
            request.contact_leads,
            self.search.is_enabled(),
        );

        record.website = self.research_website(&record.domain).await;
        record.company_info = self
            .research_company_info(&record.company_name, &record.domain)
            .await;

        let pending = PendingResearch {
            researcher: self,
            record,
        };
        let payload = pending.verification();
        (pending, payload)
    }

    /// Runs the whole pipeline without stopping for verification.
    pub async fn research(self, request: ResearchRequest) -> ResearchRecord {
        let (pending, _) = self.begin_research(request).await;
        pending.complete().await
    }

    pub async fn research_website(&self, domain: &str) -> PhaseOutcome<WebsiteInfo> {
        tracing::info!("Researching {domain}...");
        match self.website.scrape(domain).await {
            Ok(info) => {
                tracing::info!("Website scraped successfully");
                PhaseOutcome::Ok(info)
            }
            Err(e) => {
                tracing::warn!("Error scraping website: {e}");
                PhaseOutcome::Skipped(SkipReason::Failed(e.to_string()))
            }
        }
    }

    pub async fn research_company_info(
        &self,
        company: &str,
        domain: &str,
    ) -> PhaseOutcome<CompanyInfo> {
        tracing::info!("Gathering company information for {company}...");
        if let Some(skipped) = self.skip_if_disabled("company info") {
            return skipped;
        }

        let planner = QueryPlanner::new(company, domain);
        let mut tally = QueryTally::default();
        let mut info = CompanyInfo::default();

        let results = self
            .run_query(&planner.company_profile(), result_counts::COMPANY_PROFILE, &mut tally)
            .await;
        info.company_profile = first_link_containing(&results, "linkedin.com/company");

        let results = self
            .run_query(&planner.crunchbase(), result_counts::CRUNCHBASE, &mut tally)
            .await;
        info.crunchbase = first_link_containing(&results, "crunchbase.com");

        let results = self
            .run_query(&planner.general(), result_counts::GENERAL, &mut tally)
            .await;
        info.about = results.iter().map(SourceRef::from).collect();

        let results = self
            .run_query(&planner.news(), result_counts::NEWS, &mut tally)
            .await;
        info.news = results.iter().map(SourceRef::from).collect();

        let mut found = Vec::new();
        if info.company_profile.is_some() {
            found.push("company profile".to_string());
        }
        if info.crunchbase.is_some() {
            found.push("Crunchbase".to_string());
        }
        if !info.about.is_empty() {
            found.push(format!("{} references", info.about.len()));
        }
        if !info.news.is_empty() {
            found.push(format!("{} news items", info.news.len()));
        }
        if found.is_empty() {
            tracing::info!("Found: limited info");
        } else {
            tracing::info!("Found: {}", found.join(", "));
        }

        tally.finish(info)
    }

    pub async fn research_tech_stack(
        &self,
        company: &str,
        domain: &str,
    ) -> PhaseOutcome<Vec<ExtractedTerm>> {
        tracing::info!("Researching tech stack for {company}...");
        if let Some(skipped) = self.skip_if_disabled("tech stack") {
            return skipped;
        }
        let queries = QueryPlanner::new(company, domain).tech_stack();
        let outcome = self
            .collect_terms(&queries, result_counts::TECH_STACK, PatternBank::technology())
            .await;
        if let Some(terms) = outcome.data() {
            tracing::info!("Found {} technologies", terms.len());
        }
        outcome
    }

    pub async fn research_security_tools(
        &self,
        company: &str,
        domain: &str,
    ) -> PhaseOutcome<Vec<ExtractedTerm>> {
        tracing::info!("Researching security tools for {company}...");
        if let Some(skipped) = self.skip_if_disabled("security tools") {
            return skipped;
        }
        let queries = QueryPlanner::new(company, domain).security_tools();
        let outcome = self
            .collect_terms(&queries, result_counts::SECURITY_TOOLS, PatternBank::security())
            .await;
        if let Some(tools) = outcome.data() {
            tracing::info!("Found {} security tools/practices", tools.len());
        }
        outcome
    }

    async fn collect_terms(
        &self,
        queries: &[String],
        num_results: u8,
        bank: &'static PatternBank,
    ) -> PhaseOutcome<Vec<ExtractedTerm>> {
        let mut tally = QueryTally::default();
        let mut collector = TermCollector::new(bank);
        for query in queries {
            for result in self.run_query(query, num_results, &mut tally).await {
                collector.collect(&result);
            }
        }
        tally.finish(collector.into_terms())
    }

    /// One connection per vendor at most; a vendor is not searched again once confirmed.
    pub async fn research_vendor_connections(
        &self,
        company: &str,
        domain: &str,
    ) -> PhaseOutcome<Vec<VendorConnection>> {
        tracing::info!("Checking security vendor connections for {company}...");
        if let Some(skipped) = self.skip_if_disabled("vendor") {
            return skipped;
        }

        let planner = QueryPlanner::new(company, domain);
        let vendors = self.catalog.vendors_to_check();
        tracing::info!("Checking {} security vendors...", vendors.len());

        let mut tally = QueryTally::default();
        let mut seen = HashSet::new();
        let mut connections = Vec::new();
        for vendor in vendors {
            if seen.contains(&vendor.to_lowercase()) {
                continue;
            }
            let results = self
                .run_query(&planner.vendor(vendor), result_counts::VENDOR, &mut tally)
                .await;
            if let Some(connection) = find_connection(company, vendor, &results) {
                tracing::debug!(vendor, source = %connection.source_link, "vendor connection");
                seen.insert(vendor.to_lowercase());
                connections.push(connection);
            }
        }

        tracing::info!("Found {} vendor connections", connections.len());
        tally.finish(connections)
    }

    pub async fn research_stakeholders(
        &self,
        company: &str,
        domain: &str,
        category: &RoleCategory,
    ) -> PhaseOutcome<Vec<Stakeholder>> {
        tracing::info!("Researching {} for {company}...", category.label.to_lowercase());
        if let Some(skipped) = self.skip_if_disabled(category.label) {
            return skipped;
        }

        let planner = QueryPlanner::new(company, domain);
        let mut tally = QueryTally::default();
        let mut seen_urls = HashSet::new();
        let mut stakeholders = Vec::new();

        for role in category.variants {
            let results = self
                .run_query(&planner.stakeholder(role), result_counts::STAKEHOLDER, &mut tally)
                .await;
            for result in &results {
                let Some(profile_url) = extract_profile_url(&result.link) else {
                    continue;
                };
                if !seen_urls.insert(canonical_profile_url(&profile_url)) {
                    continue;
                }
                let Some(name) = parse_name(&result.title) else {
                    continue;
                };
                let title = parse_title(&result.title, &result.snippet)
                    .unwrap_or_else(|| role.to_string());
                stakeholders.push(Stakeholder {
                    name,
                    title,
                    profile_url,
                    role_category: category.label.to_string(),
                });
            }

            if stakeholders.len() >= STAKEHOLDERS_PER_CATEGORY {
                break;
            }
        }

        tracing::info!("Found {} {}", stakeholders.len(), category.label.to_lowercase());
        tally.finish(stakeholders)
    }

    /// Looks up a profile for every caller-supplied contact, in place.
    pub async fn enrich_contact_leads(&self, company: &str, domain: &str, contacts: &mut [ContactLead]) {
        if contacts.is_empty() {
            return;
        }
        tracing::info!("Enriching contact leads with profiles...");
        if !self.search.is_enabled() {
            tracing::warn!("Skipping contact enrichment - web search not configured");
            for contact in contacts.iter_mut() {
                contact.search_performed = false;
            }
            return;
        }

        let planner = QueryPlanner::new(company, domain);
        let mut enriched = 0;
        for contact in contacts.iter_mut() {
            let query = planner.contact(&contact.name, contact.title.as_deref());
            match self.search.search(&query, result_counts::CONTACT).await {
                Ok(results) => {
                    let matched = results.first().and_then(|r| {
                        extract_profile_url(&r.link).map(|url| (url, r.snippet.clone()))
                    });
                    contact.search_performed = true;
                    match matched {
                        Some((url, snippet)) => {
                            contact.profile_url = Some(url);
                            contact.profile_snippet = Some(snippet);
                            enriched += 1;
                        }
                        None => {
                            contact.profile_url = None;
                            contact.profile_snippet = None;
                        }
                    }
                }
                Err(e) => {
                    tracing::warn!("Error enriching contact {}: {e}", contact.name);
                    contact.search_performed = false;
                }
            }
        }
        tracing::info!("Enriched {enriched} of {} contact(s)", contacts.len());
    }

    fn skip_if_disabled<T>(&self, phase: &str) -> Option<PhaseOutcome<T>> {
        if self.search.is_enabled() {
            return None;
        }
        tracing::warn!("Skipping {phase} research - web search not configured");
        Some(PhaseOutcome::Skipped(SkipReason::SearchDisabled))
    }

    /// A failed query is logged and treated as having no results.
    async fn run_query(&self, query: &str, num_results: u8, tally: &mut QueryTally) -> Vec<SearchResult> {
        tally.issued += 1;
        match self.search.search(query, num_results).await {
            Ok(results) => {
                tracing::debug!(query, results = results.len(), "search complete");
                results
            }
            Err(e) => {
                tracing::warn!("Search error for {query:?}: {e}");
                tally.failed += 1;
                tally.last_error = Some(e.to_string());
                Vec::new()
            }
        }
    }
}

/// A run suspended after verification, waiting for [`Confirmation`].
pub struct PendingResearch<S> {
    researcher: CompanyResearcher<S>,
    record: ResearchRecord,
}

impl<S: SearchClient> PendingResearch<S> {
    pub fn record(&self) -> &ResearchRecord {
        &self.record
    }

    pub fn verification(&self) -> VerificationPayload {
        VerificationPayload {
            company_name: self.record.company_name.clone(),
            domain: self.record.domain.clone(),
            context: self.record.company_context.clone(),
            website_info: self.record.website.clone(),
            company_info: self.record.company_info.clone(),
        }
    }

    pub async fn continue_research(mut self, confirmation: Confirmation) -> ResearchOutcome {
        match confirmation {
            Confirmation::Abort => {
                tracing::info!("Research aborted by user");
                ResearchOutcome::Aborted
            }
            Confirmation::Proceed { context } => {
                if let Some(context) = context.filter(|c| !c.trim().is_empty()) {
                    self.record.company_context = Some(context);
                }
                ResearchOutcome::Completed(Box::new(self.complete().await))
            }
        }
    }

    async fn complete(mut self) -> ResearchRecord {
        let researcher = &self.researcher;
        let record = &mut self.record;
        let (company, domain) = (record.company_name.clone(), record.domain.clone());

        record.tech_stack = researcher.research_tech_stack(&company, &domain).await;
        record.security_tools = researcher.research_security_tools(&company, &domain).await;
        record.vendor_connections = researcher
            .research_vendor_connections(&company, &domain)
            .await;
        record.security_leadership = researcher
            .research_stakeholders(&company, &domain, &SECURITY_LEADERSHIP)
            .await;
        record.executive_leadership = researcher
            .research_stakeholders(&company, &domain, &EXECUTIVE_LEADERSHIP)
            .await;
        researcher
            .enrich_contact_leads(&company, &domain, &mut record.contact_leads)
            .await;

        self.record
    }
}

fn first_link_containing(results: &[SearchResult], needle: &str) -> Option<ProfileLink> {
    results
        .iter()
        .find(|r| r.link.contains(needle))
        .map(|r| ProfileLink {
            url: r.link.clone(),
            snippet: r.snippet.clone(),
        })
}

/// Strips the scheme and surrounding slashes from user input.
pub fn clean_domain(input: &str) -> String {
    let trimmed = input.trim();
    let without_scheme = trimmed
        .strip_prefix("https://")
        .or_else(|| trimmed.strip_prefix("http://"))
        .unwrap_or(trimmed);
    without_scheme.trim_matches('/').to_string()
}

/// First label of the domain, title-cased: `www.acme-labs.io` gives `Acme-Labs`.
pub fn company_name_from_domain(domain: &str) -> String {
    title_case(domain_slug(domain))
}

/// First label of the domain without `www.`.
pub fn domain_slug(domain: &str) -> &str {
    let domain = domain.strip_prefix("www.").unwrap_or(domain);
    domain.split('.').next().unwrap_or(domain)
}

/// File-name stem for reports. Only ASCII alphanumerics, `-` and `_` survive,
/// so the stem can never name a path outside the output directory.
pub fn report_slug(domain: &str) -> String {
    let slug: String = domain_slug(domain)
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_'))
        .collect();
    if slug.is_empty() {
        "report".to_string()
    } else {
        slug
    }
}

fn title_case(word: &str) -> String {
    let mut out = String::with_capacity(word.len());
    let mut prev_alpha = false;
    for c in word.chars() {
        if prev_alpha {
            out.extend(c.to_lowercase());
        } else {
            out.extend(c.to_uppercase());
        }
        prev_alpha = c.is_alphabetic();
    }
    out
}
