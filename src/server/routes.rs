pub mod health {
    use rocket::{get, serde::json::Json};
    use serde_json::{json, Value};

    #[get("/health")]
    pub async fn health_check() -> Json<Value> {
        Json(json!({
            "status": "healthy",
            "timestamp": chrono::Utc::now().to_rfc3339(),
            "service": "phishing-analyzer"
        }))
    }

    #[get("/")]
    pub async fn index() -> Json<Value> {
        Json(json!({
            "name": "Phishing Analyzer API",
            "version": "0.1.0",
            "description": "Analyzes email content for phishing indicators",
            "endpoints": {
                "health": "/health",
                "analyze": "/analyze"
            }
        }))
    }
}
