use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;

use demo_prep::api::{AppState, create_router};
use demo_prep::cli::{Cli, Commands, prompt_confirmation, verification_summary};
use demo_prep::config::CONFIG;
use demo_prep::pdf::markdown_to_pdf;
use demo_prep::report::write_markdown;
use demo_prep::researcher::{
    CompanyResearcher, Confirmation, ResearchOutcome, ResearchRequest, clean_domain, report_slug,
};
use demo_prep::search::{GoogleSearchClient, SearchClient};
use demo_prep::vendor::VendorCatalog;
use demo_prep::website::WebsiteScraper;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let mut cli = Cli::parse();

    // Initialize tracing subscriber (handles both tracing and log crate)
    tracing_subscriber::fmt()
        .with_max_level(cli.log_level())
        .with_target(true)
        .init();

    match cli.command.take() {
        Some(Commands::Convert { markdown, pdf }) => {
            let path = markdown_to_pdf(&markdown, pdf.as_deref())
                .with_context(|| format!("error generating PDF from {}", markdown.display()))?;
            println!("PDF generated: {}", path.display());
        }
        Some(Commands::Serve { bind }) => serve(bind).await?,
        None => research(cli).await?,
    }
    Ok(())
}

async fn research(cli: Cli) -> anyhow::Result<()> {
    let domain = clean_domain(cli.domain.as_deref().unwrap_or_default());
    anyhow::ensure!(!domain.is_empty(), "a company domain is required");
    let output = cli
        .output
        .unwrap_or_else(|| PathBuf::from(format!("{}_demo_prep.md", report_slug(&domain))));

    println!("{}", "=".repeat(60));
    println!("Demo Prep Tool");
    println!("{}", "=".repeat(60));
    println!("Company: {domain}");
    println!("Output: {}", output.display());
    println!("{}", "=".repeat(60));

    let search = GoogleSearchClient::from_config(&CONFIG)?;
    if search.is_enabled() {
        tracing::info!("Web search enabled");
    } else {
        tracing::warn!(
            "Web search disabled - set GOOGLE_API_KEY and GOOGLE_SEARCH_ENGINE_ID to enable profile, tech stack and security tools research"
        );
    }
    let scraper = WebsiteScraper::new(CONFIG.request_timeout)?;
    let catalog = VendorCatalog::default().with_max_checks(CONFIG.max_vendor_checks);
    let researcher = CompanyResearcher::new(search, scraper).with_vendor_catalog(catalog);

    let request = ResearchRequest {
        domain,
        company_name: cli.company_name,
        company_context: cli.company_context,
        contact_leads: cli.contacts,
    };
    let (pending, payload) = researcher.begin_research(request).await;

    let confirmation = if cli.skip_verification {
        Confirmation::Proceed { context: None }
    } else {
        println!("\n{}", verification_summary(&payload));
        tokio::task::spawn_blocking(prompt_confirmation).await??
    };

    let record = match pending.continue_research(confirmation).await {
        ResearchOutcome::Completed(record) => *record,
        ResearchOutcome::Aborted => {
            println!("Research aborted by user.");
            return Ok(());
        }
    };

    write_markdown(&record, &output)
        .with_context(|| format!("error writing {}", output.display()))?;
    let pdf_path = markdown_to_pdf(&output, None)
        .with_context(|| format!("error generating PDF from {}", output.display()))?;

    println!("{}", "=".repeat(60));
    println!("Complete! Open {} to view the demo prep document.", output.display());
    println!("PDF: {}", pdf_path.display());
    println!("{}", "=".repeat(60));
    Ok(())
}

async fn serve(bind: Option<String>) -> anyhow::Result<()> {
    let bind = bind.unwrap_or_else(|| CONFIG.bind_addr.clone());
    std::fs::create_dir_all(&CONFIG.output_dir)
        .with_context(|| format!("cannot create output dir {}", CONFIG.output_dir))?;

    let search = GoogleSearchClient::from_config(&CONFIG)?;
    if !search.is_enabled() {
        tracing::warn!("Web search not configured; /api/research will reject requests");
    }
    let scraper = WebsiteScraper::new(CONFIG.request_timeout)?;
    let catalog = VendorCatalog::default().with_max_checks(CONFIG.max_vendor_checks);
    let state = Arc::new(
        AppState::new(search, scraper, catalog, &CONFIG.output_dir)
            .with_session_ttl(CONFIG.session_ttl),
    );

    let app = create_router(state);
    let listener = tokio::net::TcpListener::bind(&bind)
        .await
        .with_context(|| format!("cannot bind {bind}"))?;
    tracing::info!("Demo Prep web interface listening on http://{bind}");
    axum::serve(listener, app).await?;
    Ok(())
}
