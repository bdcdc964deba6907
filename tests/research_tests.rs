mod common;

use common::{CannedSearch, mock_homepage, result, unreachable_scraper};
use demo_prep::data_models::{ContactLead, PhaseOutcome, SkipReason};
use demo_prep::query_planner::{EXECUTIVE_LEADERSHIP, QueryPlanner, SECURITY_LEADERSHIP};
use demo_prep::researcher::{
    CompanyResearcher, Confirmation, ResearchOutcome, ResearchRequest,
};
use demo_prep::vendor::VendorCatalog;
use demo_prep::website::WebsiteScraper;
use std::time::Duration;

fn planner() -> QueryPlanner<'static> {
    QueryPlanner::new("Acme", "acme.com")
}

fn researcher(search: CannedSearch) -> CompanyResearcher<CannedSearch> {
    CompanyResearcher::new(search, unreachable_scraper())
}

#[tokio::test]
async fn test_vendor_connection_found_once() {
    let search = CannedSearch::new().with_results(
        &planner().vendor("CrowdStrike"),
        vec![
            result(
                "Acme selects CrowdStrike Falcon",
                "https://news.test/acme-crowdstrike",
                "Acme deploys CrowdStrike across its endpoints.",
            ),
            result(
                "CrowdStrike customer story",
                "https://crowdstrike.test/acme",
                "How Acme stopped breaches with CrowdStrike.",
            ),
        ],
    );
    let catalog = VendorCatalog::new(
        vec!["CrowdStrike".into()],
        vec!["crowdstrike".into(), "Okta".into()],
    );
    let researcher = researcher(search.clone()).with_vendor_catalog(catalog);

    let outcome = researcher
        .research_vendor_connections("Acme", "acme.com")
        .await;

    let connections = outcome.data().unwrap();
    assert_eq!(connections.len(), 1);
    assert_eq!(connections[0].vendor, "CrowdStrike");
    assert_eq!(connections[0].source_link, "https://news.test/acme-crowdstrike");
    assert_eq!(connections[0].title, "Acme selects CrowdStrike Falcon");
    // the duplicate catalog entry is never searched again
    assert_eq!(search.count_queries_containing("CrowdStrike"), 1);
    assert_eq!(search.queries().len(), 2);
}

#[tokio::test]
async fn test_vendor_without_cooccurrence_is_ignored() {
    let search = CannedSearch::new().with_results(
        &planner().vendor("Okta"),
        vec![result("Okta pricing", "https://okta.test", "Plans for every team")],
    );
    let catalog = VendorCatalog::new(vec!["Okta".into()], vec![]);
    let outcome = researcher(search)
        .with_vendor_catalog(catalog)
        .research_vendor_connections("Acme", "acme.com")
        .await;
    assert_eq!(outcome, PhaseOutcome::Ok(vec![]));
}

#[tokio::test]
async fn test_stakeholders_dedup_and_stop_early() {
    let search = CannedSearch::new()
        .with_results(
            &planner().stakeholder("CISO"),
            vec![
                result(
                    "Jane A. Smith - VP of Security at Acme | LinkedIn",
                    "https://www.linkedin.com/in/janesmith?trk=public",
                    "Security leader",
                ),
                result(
                    "Jane Smith - CISO at Acme | LinkedIn",
                    "https://www.linkedin.com/in/JaneSmith/",
                    "Duplicate profile",
                ),
            ],
        )
        .with_results(
            &planner().stakeholder("Chief Information Security Officer"),
            vec![
                result(
                    "LinkedIn Member - Security | LinkedIn",
                    "https://www.linkedin.com/in/member123",
                    "",
                ),
                result(
                    "Bob Lee | Acme",
                    "https://www.linkedin.com/in/boblee",
                    "Bob Lee - Head of Security at Acme",
                ),
            ],
        );

    let outcome = researcher(search.clone())
        .research_stakeholders("Acme", "acme.com", &SECURITY_LEADERSHIP)
        .await;
    let people = outcome.data().unwrap();

    assert_eq!(people.len(), 2);
    assert_eq!(people[0].name, "Jane A. Smith");
    assert_eq!(people[0].title, "VP of Security");
    assert_eq!(people[0].profile_url, "https://www.linkedin.com/in/janesmith");
    assert_eq!(people[0].role_category, "Security Leadership");
    assert_eq!(people[1].name, "Bob Lee");
    // title falls back to the snippet
    assert_eq!(people[1].title, "Head of Security");

    // two collected after the second variant, so the third is never searched
    assert_eq!(search.queries().len(), 2);
    assert_eq!(search.count_queries_containing("VP Security"), 0);
}

#[tokio::test]
async fn test_stakeholder_title_falls_back_to_role() {
    let search = CannedSearch::new().with_results(
        &planner().stakeholder("CEO"),
        vec![result(
            "Alice Wong | Professional Profile",
            "https://uk.linkedin.com/in/alicewong",
            "Leads the company",
        )],
    );
    let outcome = researcher(search.clone())
        .research_stakeholders("Acme", "acme.com", &EXECUTIVE_LEADERSHIP)
        .await;
    let people = outcome.data().unwrap();
    assert_eq!(people.len(), 1);
    assert_eq!(people[0].title, "CEO");
    // fewer than two found, so every variant is tried
    assert_eq!(search.queries().len(), EXECUTIVE_LEADERSHIP.variants.len());
}

#[tokio::test]
async fn test_tech_stack_dedup_across_results() {
    let queries = planner().tech_stack();
    let search = CannedSearch::new()
        .with_results(
            &queries[0],
            vec![result(
                "Acme Software Engineer",
                "https://jobs.test/1",
                "Python, Kubernetes and PostgreSQL experience",
            )],
        )
        .with_results(
            &queries[4],
            vec![result(
                "Acme tech stack",
                "https://stack.test/acme",
                "python services on AWS with Kafka",
            )],
        );

    let outcome = researcher(search).research_tech_stack("Acme", "acme.com").await;
    let terms = outcome.data().unwrap();
    let names: Vec<_> = terms.iter().map(|t| t.term.as_str()).collect();

    assert_eq!(names.iter().filter(|t| t.eq_ignore_ascii_case("python")).count(), 1);
    assert!(names.contains(&"Kubernetes"));
    assert!(names.contains(&"Kafka"));
    let python = terms.iter().find(|t| t.term == "Python").unwrap();
    assert_eq!(python.source_link, "https://jobs.test/1");
}

#[tokio::test]
async fn test_security_tools_phase() {
    let queries = planner().security_tools();
    let search = CannedSearch::new().with_results(
        queries.last().unwrap(),
        vec![result(
            "Security at Acme",
            "https://acme.com/security",
            "We are SOC 2 compliant and run Splunk for SIEM.",
        )],
    );
    let outcome = researcher(search)
        .research_security_tools("Acme", "acme.com")
        .await;
    let names: Vec<_> = outcome
        .data()
        .unwrap()
        .iter()
        .map(|t| t.term.clone())
        .collect();
    assert!(names.contains(&"Splunk".to_string()));
    assert!(names.contains(&"SOC 2".to_string()));
}

#[tokio::test]
async fn test_search_disabled_skips_every_search_phase() {
    let search = CannedSearch::disabled();
    let contacts = vec![ContactLead::new("Jane Smith", Some("CISO".into()), None)];
    let mut request = ResearchRequest::new("https://acme.com/");
    request.contact_leads = contacts;

    let record = researcher(search.clone()).research(request).await;

    assert!(!record.search_enabled);
    assert_eq!(record.domain, "acme.com");
    assert_eq!(record.company_name, "Acme");
    for skipped in [
        record.tech_stack.skip_reason(),
        record.security_tools.skip_reason(),
        record.vendor_connections.skip_reason(),
        record.security_leadership.skip_reason(),
        record.executive_leadership.skip_reason(),
        record.company_info.skip_reason(),
    ] {
        assert_eq!(skipped, Some(&SkipReason::SearchDisabled));
    }
    assert!(!record.contact_leads[0].search_performed);
    assert!(search.queries().is_empty());
    // the homepage fetch still ran and failed
    assert!(matches!(record.website, PhaseOutcome::Skipped(SkipReason::Failed(_))));
}

#[tokio::test]
async fn test_all_queries_failing_marks_phase_failed() {
    let outcome = researcher(CannedSearch::failing())
        .research_tech_stack("Acme", "acme.com")
        .await;
    match outcome {
        PhaseOutcome::Skipped(SkipReason::Failed(message)) => {
            assert!(message.contains("500"), "unexpected message {message}")
        }
        other => panic!("expected failed phase, got {other:?}"),
    }
}

#[tokio::test]
async fn test_contact_enrichment() {
    let search = CannedSearch::new().with_results(
        &planner().contact("Jane Smith", Some("CISO")),
        vec![result(
            "Jane Smith - CISO at Acme | LinkedIn",
            "https://www.linkedin.com/in/janesmith",
            "Jane leads security at Acme.",
        )],
    );
    let mut contacts = vec![
        ContactLead::new("Jane Smith", Some("CISO".into()), Some("jane@acme.com".into())),
        ContactLead::new("Nobody Known", None, None),
    ];

    researcher(search.clone())
        .enrich_contact_leads("Acme", "acme.com", &mut contacts)
        .await;

    assert_eq!(
        contacts[0].profile_url.as_deref(),
        Some("https://www.linkedin.com/in/janesmith")
    );
    assert_eq!(contacts[0].profile_snippet.as_deref(), Some("Jane leads security at Acme."));
    assert!(contacts[0].search_performed);
    assert_eq!(contacts[1].profile_url, None);
    assert!(contacts[1].search_performed);
    assert_eq!(
        search.queries()[1],
        r#"site:linkedin.com/in "Nobody Known" "Acme""#
    );
}

#[tokio::test]
async fn test_begin_then_continue_with_new_context() {
    let server = mock_homepage(
        r#"<html><head><title>Acme Corp</title>
        <meta name="description" content="Rockets and anvils"></head>
        <body><p>About Acme: we build rockets.</p></body></html>"#,
    )
    .await;
    let scraper = WebsiteScraper::new(Duration::from_secs(5))
        .unwrap()
        .with_base_url(server.uri());
    let search = CannedSearch::new().with_results(
        &planner().company_profile(),
        vec![result(
            "Acme | LinkedIn",
            "https://www.linkedin.com/company/acme",
            "Acme makes rockets.",
        )],
    );

    let mut request = ResearchRequest::new("acme.com");
    request.company_context = Some("aerospace".into());
    let (pending, payload) = CompanyResearcher::new(search.clone(), scraper)
        .begin_research(request)
        .await;

    assert_eq!(payload.company_name, "Acme");
    assert_eq!(payload.context.as_deref(), Some("aerospace"));
    let website = payload.website_info.data().unwrap();
    assert_eq!(website.title.as_deref(), Some("Acme Corp"));
    let info = payload.company_info.data().unwrap();
    assert_eq!(
        info.company_profile.as_ref().map(|p| p.url.as_str()),
        Some("https://www.linkedin.com/company/acme")
    );
    // only the four company-info queries ran before confirmation
    assert_eq!(search.queries().len(), 4);

    let outcome = pending
        .continue_research(Confirmation::Proceed {
            context: Some("rocket manufacturer".into()),
        })
        .await;
    let ResearchOutcome::Completed(record) = outcome else {
        panic!("expected completed research");
    };
    assert_eq!(record.company_context.as_deref(), Some("rocket manufacturer"));
    assert!(search.queries().len() > 4);
}

#[tokio::test]
async fn test_abort_runs_nothing_more() {
    let search = CannedSearch::new();
    let (pending, _) = researcher(search.clone())
        .begin_research(ResearchRequest::new("acme.com"))
        .await;
    let before = search.queries().len();

    let outcome = pending.continue_research(Confirmation::Abort).await;

    assert!(matches!(outcome, ResearchOutcome::Aborted));
    assert_eq!(search.queries().len(), before);
}

#[tokio::test]
async fn test_company_name_override() {
    let mut request = ResearchRequest::new("epic.com");
    request.company_name = Some("Epic Systems".into());
    let (pending, payload) = researcher(CannedSearch::disabled())
        .begin_research(request)
        .await;
    assert_eq!(payload.company_name, "Epic Systems");
    assert_eq!(pending.record().domain, "epic.com");
}
