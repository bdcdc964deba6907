use axum::{Json, extract::State};
use std::sync::Arc;

use crate::pdf::markdown_to_pdf;
use crate::report::write_markdown;
use crate::researcher::{
    CompanyResearcher, Confirmation, ResearchOutcome, ResearchRequest, clean_domain, report_slug,
};
use crate::search::SearchClient;

use super::AppState;
use super::models::{
    ApiError, CompletedResponse, ContinueRequestBody, GeneratedFiles, HealthResponse,
    ResearchRequestBody, VerificationResponse, parse_contact_leads,
};

pub async fn research_handler<S: SearchClient + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Json(body): Json<ResearchRequestBody>,
) -> Result<Json<VerificationResponse>, ApiError> {
    let domain = clean_domain(&body.domain);
    if domain.is_empty() {
        return Err(ApiError::bad_request("Domain is required"));
    }
    let contact_leads = parse_contact_leads(body.contact_leads)?;

    if !state.search.is_enabled() {
        return Err(ApiError::bad_request(
            "Web search not configured. Set GOOGLE_API_KEY and GOOGLE_SEARCH_ENGINE_ID environment variables.",
        ));
    }

    let researcher = CompanyResearcher::new(state.search.clone(), state.scraper.clone())
        .with_vendor_catalog(state.catalog.clone());
    let request = ResearchRequest {
        domain,
        company_name: body.company_name.map(|n| n.trim().to_string()),
        company_context: body.company_context.map(|c| c.trim().to_string()),
        contact_leads,
    };
    let (pending, payload) = researcher.begin_research(request).await;

    let session_id = nanoid::nanoid!();
    tracing::info!(session_id = %session_id, domain = %payload.domain, "research awaiting verification");
    state.insert_session(session_id.clone(), pending);

    Ok(Json(VerificationResponse {
        status: "verification_needed",
        session_id,
        data: payload,
    }))
}

pub async fn continue_handler<S: SearchClient + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Json(body): Json<ContinueRequestBody>,
) -> Result<Json<CompletedResponse>, ApiError> {
    let Some(pending) = state.take_session(&body.session_id) else {
        return Err(ApiError::bad_request("No research session found"));
    };

    let context = body.context.map(|c| c.trim().to_string());
    let record = match pending.continue_research(Confirmation::Proceed { context }).await {
        ResearchOutcome::Completed(record) => *record,
        ResearchOutcome::Aborted => return Err(ApiError::bad_request("Research aborted")),
    };

    let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
    let stem = format!("{}_{timestamp}", report_slug(&record.domain));
    let files = GeneratedFiles {
        markdown: format!("{stem}.md"),
        pdf: format!("{stem}.pdf"),
    };
    let md_path = state.output_dir.join(&files.markdown);
    let pdf_path = state.output_dir.join(&files.pdf);

    let record = tokio::task::spawn_blocking(move || {
        write_markdown(&record, &md_path)
            .map_err(|e| ApiError::internal(format!("Report error: {e}")))?;
        markdown_to_pdf(&md_path, Some(&pdf_path))
            .map_err(|e| ApiError::internal(format!("PDF error: {e}")))?;
        Ok::<_, ApiError>(record)
    })
    .await
    .map_err(|e| ApiError::internal(format!("Report task failed: {e}")))??;

    Ok(Json(CompletedResponse {
        status: "complete",
        company_name: record.company_name.clone(),
        domain: record.domain.clone(),
        data: record,
        files,
    }))
}

pub async fn health_handler<S: SearchClient + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        web_search_enabled: state.search.is_enabled(),
        timestamp: chrono::Local::now().to_rfc3339(),
    })
}
