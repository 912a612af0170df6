//! Single binary web server: the bot posts tournament state, gets back a bracket PNG.
//! Run with: cargo run --bin web
//! Listens on 0.0.0.0:8080 by default.
//! Override with env: HOST (e.g. 0.0.0.0), PORT (e.g. 8080). Rendering is configured with
//! the BRACKET_* variables (see `RenderConfig::from_env`).

use actix_web::{
    get, post,
    http::header::ContentType,
    web::{Data, Json},
    App, HttpResponse, HttpServer, Responder,
};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::sync::Arc;
use tournament_bracket_web::{
    build_bracket, first_round_summary, lenient, lenient_list, normalize_participants,
    render::fonts, render_tournament, CompletedGameRecord, RenderConfig, RenderResult,
    TournamentStateDocument,
};
use uuid::Uuid;

type AppConfig = Data<Arc<RenderConfig>>;

#[derive(serde::Serialize)]
struct HealthResponse {
    ok: bool,
    service: &'static str,
}

#[derive(serde::Serialize)]
struct SummaryResponse {
    summary: String,
}

/// Body shared by every bracket endpoint.
#[derive(Deserialize)]
struct BracketRequest {
    #[serde(default, deserialize_with = "lenient")]
    tournament: TournamentStateDocument,
    /// Fallback participant list in seeding order, as stored by the bot.
    #[serde(default, deserialize_with = "lenient_list")]
    participants: Vec<Map<String, Value>>,
    #[serde(default, deserialize_with = "lenient_list")]
    completed_games: Vec<CompletedGameRecord>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

#[get("/api/health")]
async fn api_health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        ok: true,
        service: "tournament-bracket-web",
    })
}

/// Reconstructed bracket as JSON (debugging aid for the bot side).
#[post("/api/brackets")]
async fn api_build_bracket(config: AppConfig, body: Json<BracketRequest>) -> HttpResponse {
    let locale = config.locale;
    let fallback = normalize_participants(&body.participants, locale);
    let bracket = build_bracket(&body.tournament, &fallback, &body.completed_games, locale);
    HttpResponse::Ok().json(bracket)
}

/// First-round pairings caption only.
#[post("/api/brackets/summary")]
async fn api_bracket_summary(config: AppConfig, body: Json<BracketRequest>) -> HttpResponse {
    let locale = config.locale;
    let fallback = normalize_participants(&body.participants, locale);
    let bracket = build_bracket(&body.tournament, &fallback, &body.completed_games, locale);
    HttpResponse::Ok().json(SummaryResponse {
        summary: first_round_summary(&bracket, locale),
    })
}

/// Render the bracket image. Degraded renders still answer 200 with the error image;
/// `X-Render-Status` tells them apart.
#[post("/api/brackets/render")]
async fn api_render_bracket(config: AppConfig, body: Json<BracketRequest>) -> HttpResponse {
    let request_id = Uuid::new_v4();
    let request = body.into_inner();
    let name = request.tournament.name.clone();
    log::info!("[{}] Rendering bracket {:?}", request_id, name);

    let config = Arc::clone(config.get_ref());
    let rendered = tokio::task::spawn_blocking(move || {
        render_tournament(
            &request.tournament,
            &request.participants,
            &request.completed_games,
            &config,
        )
    })
    .await;

    let result = match rendered {
        Ok(result) => result,
        Err(e) => {
            log::error!("[{}] Render task failed: {}", request_id, e);
            return HttpResponse::InternalServerError().json(serde_json::json!({ "error": "render failed" }));
        }
    };
    let status = match &result {
        RenderResult::Ok { .. } => "ok",
        RenderResult::Degraded { reason, .. } => {
            log::warn!("[{}] Degraded render of {:?}: {}", request_id, name, reason);
            "degraded"
        }
    };
    let (png, _) = result.into_parts();
    log::info!("[{}] Rendered {:?} ({} bytes, {})", request_id, name, png.len(), status);
    HttpResponse::Ok()
        .content_type(ContentType::png())
        .insert_header(("X-Render-Status", status))
        .insert_header(("X-Request-Id", request_id.to_string()))
        .body(png)
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let host = std::env::var("HOST").unwrap_or_else(|_| default_host());
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or_else(default_port);
    let config = RenderConfig::from_env();
    let loaded = fonts::init(&config);
    if loaded.regular.is_builtin() {
        log::warn!("Rendering with the built-in bitmap font; set BRACKET_FONT for better output");
    }
    log::info!(
        "Media from {}, avatars from {}, locale {:?}",
        config.media_dir.display(),
        config.avatar_dir.display(),
        config.locale
    );
    let config = Data::new(Arc::new(config));

    let bind = (host.as_str(), port);
    log::info!("Starting server at http://{}:{}", bind.0, bind.1);

    HttpServer::new(move || {
        App::new()
            .app_data(config.clone())
            .app_data(actix_web::web::JsonConfig::default().limit(4 * 1024 * 1024))
            .service(api_health)
            .service(api_build_bracket)
            .service(api_bracket_summary)
            .service(api_render_bracket)
    })
    .bind(bind)?
    .run()
    .await
}
