use serde::{Deserialize, Serialize};
use std::fmt;

/// Characters of snippet kept next to an extracted term.
pub const TERM_CONTEXT_CHARS: usize = 200;
/// Characters of snippet kept next to a vendor connection.
pub const VENDOR_CONTEXT_CHARS: usize = 250;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SearchResult {
    pub title: String,
    pub link: String,
    pub snippet: String,
}

impl SearchResult {
    pub fn new(
        title: impl Into<String>,
        link: impl Into<String>,
        snippet: impl Into<String>,
    ) -> SearchResult {
        SearchResult {
            title: title.into(),
            link: link.into(),
            snippet: snippet.into(),
        }
    }

    /// Title and snippet joined, the text every extractor works on.
    pub fn text(&self) -> String {
        format!("{} {}", self.title, self.snippet)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ExtractedTerm {
    pub term: String,
    pub source_link: String,
    pub context_snippet: String,
}

impl ExtractedTerm {
    pub fn new(term: String, result: &SearchResult) -> ExtractedTerm {
        ExtractedTerm {
            term,
            source_link: result.link.clone(),
            context_snippet: truncate_chars(&result.snippet, TERM_CONTEXT_CHARS),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct VendorConnection {
    pub vendor: String,
    pub source_link: String,
    pub title: String,
    pub context_snippet: String,
}

impl VendorConnection {
    pub fn new(vendor: &str, result: &SearchResult) -> VendorConnection {
        VendorConnection {
            vendor: vendor.to_string(),
            source_link: result.link.clone(),
            title: result.title.clone(),
            context_snippet: truncate_chars(&result.snippet, VENDOR_CONTEXT_CHARS),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Stakeholder {
    pub name: String,
    pub title: String,
    pub profile_url: String,
    pub role_category: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct ContactLead {
    pub name: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub profile_url: Option<String>,
    #[serde(default)]
    pub profile_snippet: Option<String>,
    #[serde(default)]
    pub search_performed: bool,
}

impl ContactLead {
    pub fn new(name: impl Into<String>, title: Option<String>, email: Option<String>) -> Self {
        ContactLead {
            name: name.into(),
            title: title.filter(|t| !t.trim().is_empty()),
            email: email.filter(|e| !e.trim().is_empty()),
            ..Default::default()
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct WebsiteInfo {
    pub title: Option<String>,
    pub description: Option<String>,
    pub about: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ProfileLink {
    pub url: String,
    pub snippet: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SourceRef {
    pub title: String,
    pub snippet: String,
    pub url: String,
}

impl From<&SearchResult> for SourceRef {
    fn from(result: &SearchResult) -> Self {
        SourceRef {
            title: result.title.clone(),
            snippet: result.snippet.clone(),
            url: result.link.clone(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct CompanyInfo {
    pub company_profile: Option<ProfileLink>,
    pub crunchbase: Option<ProfileLink>,
    pub about: Vec<SourceRef>,
    pub news: Vec<SourceRef>,
}

impl CompanyInfo {
    pub fn is_empty(&self) -> bool {
        self.company_profile.is_none()
            && self.crunchbase.is_none()
            && self.about.is_empty()
            && self.news.is_empty()
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    SearchDisabled,
    Failed(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::SearchDisabled => write!(f, "web search not configured"),
            SkipReason::Failed(message) => write!(f, "{message}"),
        }
    }
}

/// Result of one research phase: the data, or why the phase produced none.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PhaseOutcome<T> {
    Ok(T),
    Skipped(SkipReason),
}

impl<T> PhaseOutcome<T> {
    pub fn data(&self) -> Option<&T> {
        match self {
            PhaseOutcome::Ok(data) => Some(data),
            PhaseOutcome::Skipped(_) => None,
        }
    }

    pub fn skip_reason(&self) -> Option<&SkipReason> {
        match self {
            PhaseOutcome::Ok(_) => None,
            PhaseOutcome::Skipped(reason) => Some(reason),
        }
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, PhaseOutcome::Skipped(_))
    }
}

impl<T: Default> Default for PhaseOutcome<T> {
    fn default() -> Self {
        PhaseOutcome::Ok(T::default())
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ResearchRecord {
    pub domain: String,
    pub company_name: String,
    pub company_context: Option<String>,
    pub research_date: String,
    pub search_enabled: bool,
    pub website: PhaseOutcome<WebsiteInfo>,
    pub company_info: PhaseOutcome<CompanyInfo>,
    pub tech_stack: PhaseOutcome<Vec<ExtractedTerm>>,
    pub security_tools: PhaseOutcome<Vec<ExtractedTerm>>,
    pub vendor_connections: PhaseOutcome<Vec<VendorConnection>>,
    pub security_leadership: PhaseOutcome<Vec<Stakeholder>>,
    pub executive_leadership: PhaseOutcome<Vec<Stakeholder>>,
    pub contact_leads: Vec<ContactLead>,
}

impl ResearchRecord {
    pub fn new(
        domain: String,
        company_name: String,
        company_context: Option<String>,
        contact_leads: Vec<ContactLead>,
        search_enabled: bool,
    ) -> ResearchRecord {
        ResearchRecord {
            domain,
            company_name,
            company_context,
            research_date: chrono::Local::now().format("%Y-%m-%d").to_string(),
            search_enabled,
            website: PhaseOutcome::default(),
            company_info: PhaseOutcome::default(),
            tech_stack: PhaseOutcome::default(),
            security_tools: PhaseOutcome::default(),
            vendor_connections: PhaseOutcome::default(),
            security_leadership: PhaseOutcome::default(),
            executive_leadership: PhaseOutcome::default(),
            contact_leads,
        }
    }
}

/// Truncates on a char boundary so multi-byte snippets never panic.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_chars_multibyte() {
        assert_eq!(truncate_chars("héllo wörld", 4), "héll");
        assert_eq!(truncate_chars("short", 200), "short");
        assert_eq!(truncate_chars("", 3), "");
    }

    #[test]
    fn test_term_context_is_bounded() {
        let result = SearchResult::new("t", "https://x.test", "a".repeat(1000));
        let term = ExtractedTerm::new("Rust".into(), &result);
        assert_eq!(term.context_snippet.chars().count(), TERM_CONTEXT_CHARS);

        let conn = VendorConnection::new("Okta", &result);
        assert_eq!(conn.context_snippet.chars().count(), VENDOR_CONTEXT_CHARS);
    }

    #[test]
    fn test_phase_outcome_serializes_tagged() {
        let ok: PhaseOutcome<Vec<u8>> = PhaseOutcome::Ok(vec![1]);
        assert_eq!(serde_json::to_string(&ok).unwrap(), r#"{"ok":[1]}"#);

        let skipped: PhaseOutcome<Vec<u8>> = PhaseOutcome::Skipped(SkipReason::SearchDisabled);
        assert_eq!(
            serde_json::to_string(&skipped).unwrap(),
            r#"{"skipped":"search_disabled"}"#
        );
    }
}
