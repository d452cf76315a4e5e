use crate::api::analyze_email;
use crate::openai::RiskAssessor;
use crate::virustotal::VirusTotalClient;
use rocket::fairing::{Fairing, Info, Kind};
use rocket::http::Header;
use rocket::serde::json::Json;
use rocket::{catch, catchers, options, routes, Build, Request, Response, Rocket};
use serde_json::{json, Value};

pub mod routes;

/// Per-process state handed to the request handlers. The two outbound
/// clients carry their keys and endpoints; nothing here is mutated after
/// startup.
pub struct ServerState {
    pub scanner: VirusTotalClient,
    pub assessor: RiskAssessor,
}

pub fn build_rocket(state: ServerState, port: u16) -> Rocket<Build> {
    let figment = rocket::Config::figment().merge(("port", port));

    rocket::custom(figment)
        .manage(state)
        .attach(Cors)
        .register("/", catchers![internal_error])
        .mount(
            "/",
            routes![
                analyze_email,
                cors_preflight,
                routes::health::health_check,
                routes::health::index,
            ],
        )
}

/// The analyze endpoint is called from browser extensions, so every
/// response allows any origin.
struct Cors;

#[rocket::async_trait]
impl Fairing for Cors {
    fn info(&self) -> Info {
        Info {
            name: "Permissive CORS headers",
            kind: Kind::Response,
        }
    }

    async fn on_response<'r>(&self, _request: &'r Request<'_>, response: &mut Response<'r>) {
        response.set_header(Header::new("Access-Control-Allow-Origin", "*"));
        response.set_header(Header::new(
            "Access-Control-Allow-Methods",
            "GET, POST, OPTIONS",
        ));
        response.set_header(Header::new("Access-Control-Allow-Headers", "Content-Type"));
    }
}

#[options("/<_..>")]
fn cors_preflight() {}

#[catch(500)]
fn internal_error() -> Json<Value> {
    Json(json!({ "error": "internal server error" }))
}
