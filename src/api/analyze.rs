use crate::extractor;
use crate::models::{AnalysisResult, AnalyzeRequest};
use crate::server::ServerState;
use rocket::http::Status;
use rocket::response::status;
use rocket::serde::json::Json;
use rocket::{post, State};
use serde_json::{json, Value};
use tracing::info;

/// Analyze one email submission: extract text and links, scan the links,
/// then ask the model for a confidence score.
///
/// Per-link scan failures and assessment failures ride inside the 200
/// payload as inline error objects; only a failure of the handler itself
/// becomes a 500 envelope. Callers inspecting partial failures must look at
/// the payload shape, not the HTTP status.
#[post("/analyze", data = "<request>")]
pub async fn analyze_email(
    state: &State<ServerState>,
    request: Json<AnalyzeRequest>,
) -> status::Custom<Json<Value>> {
    let content = extractor::extract(&request.email_content);
    info!(
        "Analyzing submission: {} chars of text, {} links",
        content.text.len(),
        content.links.len()
    );

    let virus_total_results = state.scanner.scan(&content.links).await;
    let phishing_score = state
        .assessor
        .assess(&content.text, &virus_total_results)
        .await;

    let result = AnalysisResult {
        phishing_score,
        virus_total_results,
    };

    match serde_json::to_value(&result) {
        Ok(body) => status::Custom(Status::Ok, Json(body)),
        Err(e) => status::Custom(
            Status::InternalServerError,
            Json(json!({ "error": e.to_string() })),
        ),
    }
}
