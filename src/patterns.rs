//! Static catalog of technology and security terms recognised in search snippets.
//!
//! Each [`Term`] has one canonical display spelling and optionally a set of
//! synonymous spellings written as regex fragments (without capture groups).
//! A term with no explicit spellings matches its canonical name literally.
//!
//! Matches are case-insensitive and must not touch a word character on either
//! side, so `Go` never matches inside `Google` while `C++` still matches in
//! `C++, Java`. Within a category, earlier terms win when two terms match at the
//! same position, which is why longer phrases are listed before their prefixes.

use once_cell::sync::Lazy;
use regex::Regex;

#[derive(Debug)]
pub struct Term {
    pub canonical: &'static str,
    spellings: &'static [&'static str],
}

impl Term {
    fn fragment(&self) -> String {
        if self.spellings.is_empty() {
            regex::escape(self.canonical).replace(' ', r"\s+")
        } else {
            self.spellings.join("|")
        }
    }
}

macro_rules! term {
    ($canonical:literal) => {
        Term {
            canonical: $canonical,
            spellings: &[],
        }
    };
    ($canonical:literal, $($spelling:literal),+) => {
        Term {
            canonical: $canonical,
            spellings: &[$($spelling),+],
        }
    };
}

type CategoryTable = &'static [(&'static str, &'static [Term])];

const TECHNOLOGY_TERMS: CategoryTable = &[
    (
        "Programming Languages",
        &[
            term!("Python"),
            term!("JavaScript"),
            term!("TypeScript"),
            term!("Java"),
            term!("Go", "Golang", "Go"),
            term!("Rust"),
            term!("Ruby"),
            term!("PHP"),
            term!("C++"),
            term!("C#"),
            term!("VB.NET"),
            term!(".NET"),
            term!("Swift"),
            term!("Kotlin"),
            term!("Scala"),
            term!("Perl"),
            term!("Objective-C"),
            term!("Visual Basic"),
        ],
    ),
    (
        "Web Frameworks",
        &[
            term!("React"),
            term!("Angular"),
            term!("Vue.js", r"Vue\.js", "Vue"),
            term!("Django"),
            term!("Flask"),
            term!("FastAPI"),
            term!("Ruby on Rails", r"Ruby\s+on\s+Rails", "Rails"),
            term!("Spring Boot"),
            term!("Spring"),
            term!("Express"),
            term!("Next.js"),
            term!("Node.js"),
            term!("ASP.NET"),
            term!("Laravel"),
        ],
    ),
    (
        "Mobile",
        &[
            term!("React Native"),
            term!("Flutter"),
            term!("Xamarin"),
            term!("Ionic"),
            term!("SwiftUI"),
        ],
    ),
    (
        "Databases",
        &[
            term!("PostgreSQL", "PostgreSQL", "Postgres"),
            term!("MySQL"),
            term!("SQL Server", r"(?:Microsoft\s+)?SQL\s+Server", "MSSQL"),
            term!("MongoDB"),
            term!("Redis"),
            term!("Elasticsearch"),
            term!("DynamoDB"),
            term!("Cassandra"),
            term!("Oracle"),
            term!("DB2"),
            term!("MariaDB"),
            term!("SQLite"),
            term!("Couchbase"),
            term!("Neo4j"),
        ],
    ),
    (
        "Specialized Databases",
        &[
            term!("InterSystems Caché", r"InterSystems\s+Cach[eé]", "Caché"),
            term!("MUMPS"),
            term!("M technology"),
        ],
    ),
    (
        "Cloud & Infrastructure",
        &[
            term!("AWS", r"Amazon\s+Web\s+Services", "AWS"),
            term!("Azure", r"Microsoft\s+Azure", "Azure"),
            term!("Google Cloud", r"Google\s+Cloud(?:\s+Platform)?", "GCP"),
            term!("Kubernetes", "Kubernetes", "K8s"),
            term!("Docker"),
            term!("Terraform"),
            term!("Ansible"),
            term!("Chef"),
            term!("Puppet"),
            term!("CloudFormation"),
        ],
    ),
    (
        "CI/CD",
        &[
            term!("Jenkins"),
            term!("GitLab CI", r"GitLab\s+CI(?:/CD)?"),
            term!("GitHub Actions"),
            term!("CircleCI"),
            term!("Travis CI"),
            term!("TeamCity"),
            term!("Bamboo"),
        ],
    ),
    (
        "Messaging & Streaming",
        &[
            term!("Kafka", r"Apache\s+Kafka", "Kafka"),
            term!("RabbitMQ"),
            term!("ActiveMQ"),
            term!("Redis Queue"),
            term!("SQS", r"Amazon\s+SQS", "SQS"),
            term!("Kinesis"),
            term!("Apache Flink", r"Apache\s+Flink", "Flink"),
            term!("Apache Storm"),
        ],
    ),
    (
        "APIs & Integration",
        &[
            term!("GraphQL"),
            term!("REST API", r"REST(?:ful)?\s+APIs?"),
            term!("SOAP"),
            term!("gRPC"),
            term!("Microservices", "Microservices?"),
            term!("FHIR"),
            term!("HL7"),
        ],
    ),
    (
        "Frontend Tooling",
        &[
            term!("Webpack"),
            term!("Vite"),
            term!("Babel"),
            term!("jQuery"),
            term!("Bootstrap"),
            term!("Tailwind CSS", r"Tailwind(?:\s+CSS)?"),
            term!("Material UI", r"Material[\s-]UI", "MUI"),
            term!("Redux"),
            term!("MobX"),
        ],
    ),
    (
        "Testing",
        &[
            term!("Jest"),
            term!("Mocha"),
            term!("Pytest"),
            term!("JUnit"),
            term!("Selenium"),
            term!("Cypress"),
            term!("TestNG"),
            term!("Cucumber"),
        ],
    ),
    (
        "Version Control",
        &[
            term!("GitHub"),
            term!("GitLab"),
            term!("Bitbucket"),
            term!("Git"),
            term!("Subversion", "Subversion", "SVN"),
            term!("Mercurial"),
        ],
    ),
    (
        "Platform Tooling",
        &[
            term!("Linux"),
            term!("Unix"),
            term!("Windows Server"),
            term!("Tomcat", r"(?:Apache\s+)?Tomcat"),
            term!("Apache"),
            term!("Nginx"),
            term!("IIS"),
            term!("Maven"),
            term!("Gradle"),
            term!("npm"),
            term!("pip"),
        ],
    ),
];

const SECURITY_TERMS: CategoryTable = &[
    (
        "SIEM & Monitoring",
        &[
            term!("Splunk", r"Splunk(?:\s+Enterprise)?"),
            term!("Datadog"),
            term!("New Relic"),
            term!("Sumo Logic"),
            term!("ELK Stack"),
            term!("Elasticsearch"),
            term!("Elastic", r"Elastic(?:\s+Security)?"),
            term!("LogRhythm"),
            term!("QRadar", r"(?:IBM\s+)?QRadar"),
            term!("ArcSight", r"(?:HP\s+|Micro\s+Focus\s+)?ArcSight"),
        ],
    ),
    (
        "Identity & Access Management",
        &[
            term!("CyberArk"),
            term!("Okta"),
            term!("Auth0"),
            term!("Azure AD", r"Azure\s+AD", r"Azure\s+Active\s+Directory", r"Entra\s+ID"),
            term!("Active Directory"),
            term!("Ping Identity"),
            term!("OneLogin"),
            term!("Duo Security", r"Duo\s+Security", "Duo"),
            term!("ForgeRock"),
            term!("BeyondTrust"),
            term!("Thycotic"),
            term!("Centrify"),
        ],
    ),
    (
        "Endpoint Security",
        &[
            term!("CrowdStrike Falcon"),
            term!("CrowdStrike"),
            term!("Carbon Black", r"(?:VMware\s+)?Carbon\s+Black"),
            term!("SentinelOne"),
            term!("Cylance"),
            term!("Symantec", r"Symantec(?:\s+Endpoint(?:\s+Protection)?)?"),
            term!("McAfee"),
            term!("Trend Micro"),
            term!("Sophos"),
            term!("Microsoft Defender", r"Microsoft\s+Defender(?:\s+for\s+Endpoint)?"),
        ],
    ),
    (
        "Network Security",
        &[
            term!("Palo Alto Networks", r"Palo\s+Alto(?:\s+Networks)?"),
            term!("Fortinet"),
            term!("FortiGate"),
            term!("Cisco ASA"),
            term!("Cisco Firepower"),
            term!("Cisco Umbrella"),
            term!("Check Point"),
            term!("F5 Networks", r"F5(?:\s+Networks)?"),
            term!("Barracuda"),
            term!("Zscaler"),
        ],
    ),
    (
        "Cloud Security",
        &[
            term!("Cloudflare"),
            term!("Akamai"),
            term!("AWS GuardDuty", r"(?:AWS\s+|Amazon\s+)?GuardDuty"),
            term!("AWS Security Hub"),
            term!("Azure Security Center"),
            term!("Azure Sentinel", r"(?:Azure|Microsoft)\s+Sentinel"),
            term!("Google Cloud Security"),
            term!("Prisma Cloud"),
            term!("Wiz"),
            term!("Lacework"),
            term!("Orca Security"),
        ],
    ),
    (
        "Application Security",
        &[
            term!("Snyk"),
            term!("Veracode"),
            term!("Checkmarx"),
            term!("SonarQube"),
            term!("WhiteSource"),
            term!("Mend"),
            term!("Black Duck"),
            term!("Fortify", r"(?:HP\s+)?Fortify"),
            term!("Qualys VMDR"),
            term!("Qualys"),
            term!("Aqua Security"),
            term!("Twistlock"),
        ],
    ),
    (
        "Vulnerability Management",
        &[
            term!("Nessus", r"Tenable\s+Nessus", "Nessus"),
            term!("Tenable.io"),
            term!("Tenable"),
            term!("Rapid7"),
            term!("InsightVM"),
            term!("OpenVAS"),
            term!("Nexpose"),
        ],
    ),
    (
        "Email Security",
        &[
            term!("Proofpoint"),
            term!("Mimecast"),
            term!("Barracuda Email Security"),
            term!("Microsoft Defender for Office"),
            term!("Cisco Email Security"),
        ],
    ),
    (
        "Threat Intelligence",
        &[
            term!("Recorded Future"),
            term!("ThreatConnect"),
            term!("Anomali"),
            term!(
                "CrowdStrike Threat Intelligence",
                r"CrowdStrike\s+Threat\s+Intel(?:ligence)?"
            ),
            term!("Mandiant"),
            term!("FireEye"),
        ],
    ),
    (
        "CASB",
        &[
            term!("Netskope"),
            term!("McAfee MVISION"),
            term!("Symantec CloudSOC"),
            term!("Microsoft Cloud App Security"),
        ],
    ),
    (
        "SOAR",
        &[
            term!("Cortex XSOAR", r"(?:Palo\s+Alto\s+)?Cortex\s+XSOAR"),
            term!("Splunk SOAR", r"Splunk\s+(?:SOAR|Phantom)"),
            term!("Phantom"),
            term!("IBM Resilient"),
            term!("Swimlane"),
            term!("Demisto"),
        ],
    ),
    (
        "Compliance Standards",
        &[
            term!("SOC 2", r"SOC\s?2(?:\s+Type\s+(?:II|2))?"),
            term!("ISO 27001", r"ISO(?:/IEC)?\s?27001"),
            term!("HIPAA"),
            term!("HITECH"),
            term!("GDPR"),
            term!("PCI DSS", r"PCI[\s-]?DSS"),
            term!("FedRAMP"),
            term!("NIST"),
            term!("CCPA"),
        ],
    ),
    (
        "Security Practices",
        &[
            term!("WAF", "WAF", r"Web\s+Application\s+Firewalls?"),
            term!("Firewall", "Firewalls?"),
            term!("IDS"),
            term!("IPS"),
            term!("SIEM"),
            term!("VPN"),
            term!("MFA", "MFA", r"Multi-Factor(?:\s+Authentication)?", "2FA"),
            term!("SSO", "SSO", r"Single\s+Sign-On"),
            term!("Zero Trust"),
            term!("Penetration Testing", r"Penetration\s+Test(?:ing)?", r"Pen\s?Test(?:ing)?"),
            term!("Red Team"),
            term!("Blue Team"),
        ],
    ),
    (
        "Encryption & PKI",
        &[
            term!("TLS"),
            term!("SSL"),
            term!("AES"),
            term!("RSA"),
            term!("PKI"),
            term!("Certificate Authority"),
            term!("HSM", "HSMs?", r"Hardware\s+Security\s+Modules?"),
        ],
    ),
    (
        "Security Frameworks",
        &[
            term!("OWASP"),
            term!("CIS Controls"),
            term!("NIST CSF", r"NIST\s+CSF", r"NIST\s+Cybersecurity\s+Framework"),
            term!("MITRE ATT&CK", r"MITRE\s+ATT&CK"),
        ],
    ),
    (
        "Data Loss Prevention",
        &[
            term!("DLP", "DLP", r"Data\s+Loss\s+Prevention"),
            term!("Varonis"),
            term!("Digital Guardian"),
            term!("Forcepoint", r"Forcepoint(?:\s+DLP)?"),
        ],
    ),
    (
        "Incident Response",
        &[
            term!("PagerDuty"),
            term!("ServiceNow Security Operations", r"ServiceNow\s+(?:Security\s+Operations|SecOps)"),
            term!("Jira Service Management"),
        ],
    ),
];

pub static TECHNOLOGY: Lazy<PatternBank> =
    Lazy::new(|| PatternBank::build("technology", TECHNOLOGY_TERMS));
pub static SECURITY: Lazy<PatternBank> =
    Lazy::new(|| PatternBank::build("security", SECURITY_TERMS));

#[derive(Debug)]
pub struct PatternCategory {
    pub name: &'static str,
    terms: &'static [Term],
    regex: Regex,
}

impl PatternCategory {
    fn build(name: &'static str, terms: &'static [Term]) -> PatternCategory {
        let alternatives = terms
            .iter()
            .map(|t| format!("({})", t.fragment()))
            .collect::<Vec<String>>()
            .join("|");
        // one capture group per term; the surrounding groups only check the neighbours
        let pattern = format!(r"(?i)(?:^|[^\w])(?:{alternatives})(?:$|[^\w])");
        PatternCategory {
            name,
            terms,
            regex: Regex::new(&pattern).unwrap(),
        }
    }

    pub fn terms(&self) -> impl Iterator<Item = &'static str> {
        self.terms.iter().map(|t| t.canonical)
    }

    /// Canonical spellings of every match in `text`, in text order.
    pub fn find_terms(&self, text: &str) -> Vec<&'static str> {
        let mut found = Vec::new();
        let mut at = 0;
        while at <= text.len() {
            let Some(caps) = self.regex.captures_at(text, at) else {
                break;
            };
            let Some((idx, m)) = caps
                .iter()
                .skip(1)
                .enumerate()
                .find_map(|(idx, group)| group.map(|m| (idx, m)))
            else {
                break;
            };
            found.push(self.terms[idx].canonical);
            // resume at the end of the term, not the match, so the trailing
            // separator can serve as the leading one of the next term
            at = m.end();
        }
        found
    }
}

#[derive(Debug)]
pub struct PatternBank {
    pub name: &'static str,
    categories: Vec<PatternCategory>,
}

impl PatternBank {
    fn build(name: &'static str, table: CategoryTable) -> PatternBank {
        PatternBank {
            name,
            categories: table
                .iter()
                .map(|(category, terms)| PatternCategory::build(category, terms))
                .collect(),
        }
    }

    pub fn technology() -> &'static PatternBank {
        &TECHNOLOGY
    }

    pub fn security() -> &'static PatternBank {
        &SECURITY
    }

    pub fn categories(&self) -> &[PatternCategory] {
        &self.categories
    }

    pub fn category(&self, name: &str) -> Option<&PatternCategory> {
        self.categories.iter().find(|c| c.name.eq_ignore_ascii_case(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_banks_compile() {
        assert_eq!(PatternBank::technology().categories().len(), 13);
        assert_eq!(PatternBank::security().categories().len(), 17);
    }

    #[test]
    fn test_symbol_terms_match_next_to_punctuation() {
        let langs = PatternBank::technology()
            .category("programming languages")
            .unwrap();
        assert_eq!(
            langs.find_terms("C++, C# and .NET (VB.NET too)"),
            vec!["C++", "C#", ".NET", "VB.NET"]
        );
    }

    #[test]
    fn test_go_is_not_found_inside_words() {
        let langs = PatternBank::technology()
            .category("Programming Languages")
            .unwrap();
        assert!(langs.find_terms("Google Golf goes").is_empty());
        assert_eq!(langs.find_terms("we write Go, and golang"), vec!["Go", "Go"]);
    }

    #[test]
    fn test_longer_phrase_wins_at_same_position() {
        let frameworks = PatternBank::technology().category("Web Frameworks").unwrap();
        assert_eq!(frameworks.find_terms("Spring Boot services"), vec!["Spring Boot"]);
        assert_eq!(
            frameworks.find_terms("Ruby on Rails and Rails"),
            vec!["Ruby on Rails", "Ruby on Rails"]
        );
    }

    #[test]
    fn test_adjacent_terms_share_separator() {
        let langs = PatternBank::technology()
            .category("Programming Languages")
            .unwrap();
        assert_eq!(langs.find_terms("Python Java Rust"), vec!["Python", "Java", "Rust"]);
    }
}
