use actix_multipart::Multipart;
use actix_web::cookie::Cookie;
use actix_web::{web, HttpRequest, HttpResponse};
use futures_util::StreamExt;
use serde_json::json;
use tracing::{debug, error, info};

use crate::category::{Category, ACCEPTED_EXTENSIONS};
use crate::decision::{self, Label};
use crate::error::AppError;
use crate::models::{ApiResponse, CategoryInfo, LoginRequest, PredictionResponse, SessionInfo};
use crate::preprocess;
use crate::session::{Session, SESSION_COOKIE};
use crate::state::AppState;

const INDEX_HTML: &str = include_str!("../static/index.html");

/// Multipart field carrying the image.
const FILE_FIELD: &str = "file";

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _req| {
        AppError::BadRequest(format!("Invalid request body: {}", err)).into()
    }))
    .route("/", web::get().to(index))
        .route("/health", web::get().to(health))
        .service(
            web::scope("/api")
                .route("/login", web::post().to(login))
                .route("/logout", web::post().to(logout))
                .route("/session", web::get().to(session_info))
                .route("/categories", web::get().to(categories))
                .route("/predict/{category}", web::post().to(predict)),
        );
}

pub async fn index() -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(INDEX_HTML)
}

pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(json!({ "status": "OK" }))
}

fn current_session(req: &HttpRequest, state: &AppState) -> Option<Session> {
    let cookie = req.cookie(SESSION_COOKIE)?;
    state.sessions.get(cookie.value())
}

fn require_login(req: &HttpRequest, state: &AppState) -> Result<Session, AppError> {
    match current_session(req, state) {
        Some(session) if session.logged_in => Ok(session),
        _ => Err(AppError::Unauthorized),
    }
}

fn session_cookie(session: &Session) -> Cookie<'static> {
    Cookie::build(SESSION_COOKIE, session.id.to_string())
        .path("/")
        .http_only(true)
        .finish()
}

pub async fn login(
    req: HttpRequest,
    state: web::Data<AppState>,
    body: web::Json<LoginRequest>,
) -> Result<HttpResponse, AppError> {
    // a fresh id on every successful login
    let mut session = Session::new();
    if !state.gate.login(&mut session, &body.username, &body.password) {
        return Err(AppError::InvalidCredentials);
    }

    if let Some(previous) = req.cookie(SESSION_COOKIE) {
        state.sessions.remove(previous.value());
    }

    let cookie = session_cookie(&session);
    let info = SessionInfo {
        logged_in: session.logged_in,
        username: session.username.clone(),
    };
    let id = session.id;
    state.sessions.save(session).map_err(|e| {
        error!("Could not store session {}: {}", id, e);
        AppError::Internal(e.to_string())
    })?;

    Ok(HttpResponse::Ok().cookie(cookie).json(
        ApiResponse::success(info).with_message(format!("Successfully Logged in as {}", body.username)),
    ))
}

pub async fn logout(req: HttpRequest, state: web::Data<AppState>) -> HttpResponse {
    if let Some(cookie) = req.cookie(SESSION_COOKIE) {
        if let Some(mut session) = state.sessions.remove(cookie.value()) {
            state.gate.logout(&mut session);
            info!("Session {} logged out", session.id);
        }
    }

    let mut removal = Cookie::build(SESSION_COOKIE, "").path("/").finish();
    removal.make_removal();

    HttpResponse::Ok().cookie(removal).json(ApiResponse::success(SessionInfo {
        logged_in: false,
        username: None,
    }))
}

pub async fn session_info(req: HttpRequest, state: web::Data<AppState>) -> HttpResponse {
    let session = current_session(&req, &state).unwrap_or_default();
    HttpResponse::Ok().json(ApiResponse::success(SessionInfo {
        logged_in: session.logged_in,
        username: session.username,
    }))
}

pub async fn categories(
    req: HttpRequest,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    require_login(&req, &state)?;
    let entries: Vec<CategoryInfo> = Category::ALL.into_iter().map(CategoryInfo::from).collect();
    Ok(HttpResponse::Ok().json(ApiResponse::success(entries)))
}

pub async fn predict(
    req: HttpRequest,
    path: web::Path<String>,
    mut payload: Multipart,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let session = require_login(&req, &state)?;
    let category: Category = path.into_inner().parse()?;

    let upload = read_upload(&mut payload, state.max_upload_bytes).await?;
    debug!(
        "Session {} uploaded {} bytes for {}",
        session.id,
        upload.len(),
        category
    );

    let worker = state.clone();
    let outcome = web::block(move || -> Result<(Label, Vec<f32>), AppError> {
        let image = preprocess::decode_upload(&upload)?;
        let input = preprocess::preprocess(&image, category);
        let output = worker.registry.predict(category, &input)?;
        let label = decision::decide(category, &output)?;
        Ok((label, output.iter().copied().collect()))
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))?;

    match outcome {
        Ok((label, scores)) => {
            info!("{} prediction: {} (scores {:?})", category, label.banner(), scores);
            Ok(HttpResponse::Ok().json(ApiResponse::success(PredictionResponse::new(
                category, label, scores,
            ))))
        }
        Err(e) => {
            error!("{} prediction failed: {}", category, e);
            Err(e)
        }
    }
}

/// Reads the `file` field into memory, refusing anything past `limit` bytes.
async fn read_upload(payload: &mut Multipart, limit: usize) -> Result<Vec<u8>, AppError> {
    while let Some(item) = payload.next().await {
        let mut field = item.map_err(|e| AppError::BadRequest(format!("Malformed upload: {}", e)))?;

        let disposition = field.content_disposition();
        let is_file = disposition.get_name() == Some(FILE_FIELD);
        let filename = disposition.get_filename().map(str::to_owned);

        if !is_file {
            while let Some(chunk) = field.next().await {
                chunk.map_err(|e| AppError::BadRequest(format!("Malformed upload: {}", e)))?;
            }
            continue;
        }

        if let Some(name) = filename.as_deref() {
            if !has_accepted_extension(name) {
                return Err(AppError::BadRequest(format!(
                    "Unsupported file type: {} (expected one of {})",
                    name,
                    ACCEPTED_EXTENSIONS.join(", ")
                )));
            }
        }

        let mut data = Vec::new();
        while let Some(chunk) = field.next().await {
            let chunk = chunk.map_err(|e| AppError::BadRequest(format!("Malformed upload: {}", e)))?;
            if data.len() + chunk.len() > limit {
                return Err(AppError::PayloadTooLarge(limit));
            }
            data.extend_from_slice(&chunk);
        }

        if data.is_empty() {
            return Err(AppError::BadRequest("Uploaded file is empty".to_string()));
        }
        return Ok(data);
    }

    Err(AppError::BadRequest("No file uploaded".to_string()))
}

fn has_accepted_extension(filename: &str) -> bool {
    filename
        .rsplit_once('.')
        .map(|(_, ext)| {
            ACCEPTED_EXTENSIONS
                .iter()
                .any(|accepted| accepted.eq_ignore_ascii_case(ext))
        })
        .unwrap_or(false)
}
