//! Security vendor catalog and the company/vendor co-occurrence check.

use std::collections::HashSet;

use crate::data_models::{SearchResult, VendorConnection};

/// Vendors checked first in every run.
pub const PRIORITY_VENDORS: &[&str] = &[
    "CrowdStrike",
    "Splunk",
    "CyberArk",
    "Okta",
    "Palo Alto Networks",
    "Fortinet",
    "Proofpoint",
    "Tenable",
    "Rapid7",
    "SentinelOne",
    "Wiz",
    "Zscaler",
    "Mimecast",
    "Varonis",
    "Recorded Future",
];

/// Major security vendors, grouped by market.
pub const CURATED_VENDORS: &[&str] = &[
    // Endpoint Security / EDR
    "CrowdStrike",
    "SentinelOne",
    "Carbon Black",
    "Cylance",
    "Microsoft Defender",
    "Symantec",
    "McAfee",
    "Trend Micro",
    "Sophos",
    // SIEM / Security Analytics
    "Splunk",
    "IBM QRadar",
    "LogRhythm",
    "ArcSight",
    "Sumo Logic",
    "Elastic Security",
    "Azure Sentinel",
    // Identity & Access Management
    "CyberArk",
    "Okta",
    "Ping Identity",
    "ForgeRock",
    "BeyondTrust",
    "Auth0",
    "Duo Security",
    // Network Security
    "Palo Alto Networks",
    "Fortinet",
    "Cisco",
    "Check Point",
    "Zscaler",
    "F5 Networks",
    // Cloud Security
    "Wiz",
    "Lacework",
    "Prisma Cloud",
    "Orca Security",
    "Aqua Security",
    // Application Security
    "Snyk",
    "Veracode",
    "Checkmarx",
    "Fortify",
    "Qualys",
    // Vulnerability Management
    "Tenable",
    "Rapid7",
    "Nessus",
    // Email Security
    "Proofpoint",
    "Mimecast",
    "Barracuda",
    // Threat Intelligence
    "Recorded Future",
    "Mandiant",
    "CrowdStrike Threat Intelligence",
    "Anomali",
    // SOAR
    "Palo Alto Cortex",
    "Splunk SOAR",
    "IBM Resilient",
    // DLP
    "Varonis",
    "Digital Guardian",
    "Forcepoint",
    // CASB
    "Netskope",
    "McAfee MVISION",
    // Other
    "Cloudflare",
    "Akamai",
    "FireEye",
    "Darktrace",
    "SonicWall",
];

pub const DEFAULT_MAX_VENDOR_CHECKS: usize = 20;

/// Immutable vendor configuration for a research run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VendorCatalog {
    priority: Vec<String>,
    vendors: Vec<String>,
    max_checks: usize,
}

impl Default for VendorCatalog {
    fn default() -> Self {
        Self::new(
            PRIORITY_VENDORS.iter().map(|v| v.to_string()).collect(),
            CURATED_VENDORS.iter().map(|v| v.to_string()).collect(),
        )
    }
}

impl VendorCatalog {
    pub fn new(priority: Vec<String>, vendors: Vec<String>) -> Self {
        Self {
            priority,
            vendors,
            max_checks: DEFAULT_MAX_VENDOR_CHECKS,
        }
    }

    pub fn with_max_checks(mut self, max_checks: usize) -> Self {
        self.max_checks = max_checks;
        self
    }

    /// A copy of this catalog that also lists `vendor`. Unchanged if already present.
    pub fn with_vendor(&self, vendor: &str) -> Self {
        let mut next = self.clone();
        if !next.contains(vendor) {
            next.vendors.push(vendor.to_string());
        }
        next
    }

    pub fn contains(&self, vendor: &str) -> bool {
        self.priority
            .iter()
            .chain(self.vendors.iter())
            .any(|v| v.eq_ignore_ascii_case(vendor))
    }

    pub fn vendors(&self) -> &[String] {
        &self.vendors
    }

    pub fn priority(&self) -> &[String] {
        &self.priority
    }

    pub fn max_checks(&self) -> usize {
        self.max_checks
    }

    /// Priority vendors, then the rest of the catalog, case-insensitively
    /// distinct and capped at `max_checks`.
    pub fn vendors_to_check(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.priority
            .iter()
            .chain(self.vendors.iter())
            .map(String::as_str)
            .filter(|v| seen.insert(v.to_lowercase()))
            .take(self.max_checks)
            .collect()
    }
}

/// Plain substring co-occurrence of both names in the result text.
///
/// Not word-boundary aware: a vendor whose name is part of another word still
/// counts, as does a short company name that appears inside unrelated text.
pub fn mentions_both(company: &str, vendor: &str, result: &SearchResult) -> bool {
    let text = result.text().to_lowercase();
    text.contains(&company.to_lowercase()) && text.contains(&vendor.to_lowercase())
}

/// First result mentioning both the company and the vendor.
pub fn find_connection(
    company: &str,
    vendor: &str,
    results: &[SearchResult],
) -> Option<VendorConnection> {
    results
        .iter()
        .find(|r| mentions_both(company, vendor, r))
        .map(|r| VendorConnection::new(vendor, r))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_catalog_checks_twenty_distinct() {
        let catalog = VendorCatalog::default();
        let to_check = catalog.vendors_to_check();
        assert_eq!(to_check.len(), 20);
        assert_eq!(&to_check[..15], PRIORITY_VENDORS);
        // first curated vendors not already in the priority list
        assert_eq!(
            &to_check[15..],
            &["Carbon Black", "Cylance", "Microsoft Defender", "Symantec", "McAfee"]
        );
    }

    #[test]
    fn test_with_vendor_returns_new_catalog() {
        let base = VendorCatalog::new(vec![], vec!["Okta".into()]);
        let extended = base.with_vendor("Abnormal Security");

        assert!(!base.contains("Abnormal Security"));
        assert!(extended.contains("Abnormal Security"));
        assert_eq!(extended.with_vendor("okta"), extended);
    }

    #[test]
    fn test_max_checks_cap() {
        let catalog = VendorCatalog::default().with_max_checks(3);
        assert_eq!(catalog.vendors_to_check(), vec!["CrowdStrike", "Splunk", "CyberArk"]);
    }
}
