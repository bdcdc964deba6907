//! Search query templates for each research phase.

use chrono::Datelike;

/// Job-title variants searched under one label, most specific first.
#[derive(Debug, Clone, Copy)]
pub struct RoleCategory {
    pub label: &'static str,
    pub variants: &'static [&'static str],
}

pub const SECURITY_LEADERSHIP: RoleCategory = RoleCategory {
    label: "Security Leadership",
    variants: &[
        "CISO",
        "Chief Information Security Officer",
        "VP Security",
        "Vice President of Security",
        "Director of Security",
        "Security Manager",
        "Chief Security Officer",
        "Head of Security",
    ],
};

pub const EXECUTIVE_LEADERSHIP: RoleCategory = RoleCategory {
    label: "Executive Leadership",
    variants: &[
        "CEO",
        "Chief Executive Officer",
        "CTO",
        "Chief Technology Officer",
        "CFO",
        "Chief Financial Officer",
        "COO",
        "Chief Operating Officer",
        "CIO",
        "Chief Information Officer",
        "CPO",
        "Chief Product Officer",
    ],
};

/// Results requested per query, by phase.
pub mod result_counts {
    pub const COMPANY_PROFILE: u8 = 3;
    pub const CRUNCHBASE: u8 = 3;
    pub const GENERAL: u8 = 5;
    pub const NEWS: u8 = 3;
    pub const TECH_STACK: u8 = 3;
    pub const SECURITY_TOOLS: u8 = 3;
    pub const VENDOR: u8 = 2;
    pub const STAKEHOLDER: u8 = 2;
    pub const CONTACT: u8 = 1;
}

pub struct QueryPlanner<'a> {
    company: &'a str,
    domain: &'a str,
}

impl<'a> QueryPlanner<'a> {
    pub fn new(company: &'a str, domain: &'a str) -> Self {
        Self { company, domain }
    }

    pub fn company_profile(&self) -> String {
        format!("{} site:linkedin.com/company", self.company)
    }

    pub fn crunchbase(&self) -> String {
        format!("{} site:crunchbase.com", self.company)
    }

    pub fn general(&self) -> String {
        format!("{} {} company about", self.company, self.domain)
    }

    pub fn news(&self) -> String {
        format!("{} news {}", self.company, chrono::Local::now().year())
    }

    /// Job boards first: postings list the stack far more reliably than marketing pages.
    pub fn tech_stack(&self) -> Vec<String> {
        let (company, domain) = (self.company, self.domain);
        vec![
            format!(r#"site:linkedin.com/jobs "{company}" software engineer"#),
            format!(r#"site:glassdoor.com "{company}" developer"#),
            format!(r#"site:indeed.com "{company}" programmer"#),
            format!(r#""{company}" careers software requirements"#),
            format!(r#""{company}" tech stack"#),
            format!(r#"site:stackshare.io "{company}""#),
            format!("{domain} built with"),
            format!(r#"site:reddit.com "{company}" technologies"#),
        ]
    }

    pub fn security_tools(&self) -> Vec<String> {
        let (company, domain) = (self.company, self.domain);
        vec![
            format!(r#"site:linkedin.com/jobs "{company}" "SOC analyst""#),
            format!(r#"site:linkedin.com/jobs "{company}" "security operations""#),
            format!(r#"site:indeed.com "{company}" SIEM OR Splunk OR CrowdStrike"#),
            format!(r#""{company}" careers "security engineer" tools experience"#),
            format!(r#"site:crowdstrike.com "{company}""#),
            format!(r#"site:splunk.com customer "{company}""#),
            format!(r#"site:okta.com "{company}""#),
            format!(r#"site:paloaltonetworks.com "{company}""#),
            format!(r#"site:linkedin.com "{company}" "security engineer" Splunk OR CrowdStrike"#),
            format!(r#"site:linkedin.com "{company}" SOC analyst tools"#),
            format!(r#""{company}" partnership security OR deploys OR implements"#),
            format!(r#""{company}" selects security solution"#),
            format!(r#"site:reddit.com "{company}" security tools"#),
            format!("site:{domain} security"),
        ]
    }

    pub fn vendor(&self, vendor: &str) -> String {
        format!(r#""{}" "{vendor}""#, self.company)
    }

    pub fn stakeholder(&self, role: &str) -> String {
        format!(r#"site:linkedin.com/in "{}" "{role}""#, self.company)
    }

    pub fn contact(&self, name: &str, title: Option<&str>) -> String {
        match title {
            Some(title) => format!(
                r#"site:linkedin.com/in "{name}" "{}" "{title}""#,
                self.company
            ),
            None => format!(r#"site:linkedin.com/in "{name}" "{}""#, self.company),
        }
    }
}

#[test]
fn test_planner_templates() {
    let planner = QueryPlanner::new("Acme", "acme.com");
    assert_eq!(planner.vendor("CrowdStrike"), r#""Acme" "CrowdStrike""#);
    assert_eq!(planner.stakeholder("CISO"), r#"site:linkedin.com/in "Acme" "CISO""#);
    assert_eq!(
        planner.contact("Jane Smith", Some("CTO")),
        r#"site:linkedin.com/in "Jane Smith" "Acme" "CTO""#
    );
    assert_eq!(planner.tech_stack().len(), 8);
    assert_eq!(planner.security_tools().last().unwrap(), "site:acme.com security");
}
