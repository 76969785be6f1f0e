//! Study Hub routes

use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Multipart, Path, State},
    http::{StatusCode, header},
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
};
use axum_extra::extract::cookie::SignedCookieJar;
use serde::Deserialize;
use serde_json::json;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::{
    ctx::{Ctx, clear_session_cookie, session_cookie},
    error::{HubError, HubResult},
    flash::{Flash, FlashLevel, set_flash, take_flash},
    messaging::DEFAULT_RECENT_LIMIT,
    realtime::ws_handler,
    state::AppState,
    uploads::attachment_disposition,
    views,
};

/// Multipart field carrying the uploaded file
pub const UPLOAD_FIELD: &str = "study_file";

/// Create the router for the Study Hub
pub fn create_router(state: AppState) -> Router {
    let upload_limit = DefaultBodyLimit::max(state.max_upload_bytes);

    Router::new()
        .route("/", get(index))
        .route("/register", get(register_page).post(register))
        .route("/login", get(login_page).post(login))
        .route("/logout", get(logout))
        .route(
            "/study-hub",
            get(study_hub).post(upload_material).layer(upload_limit),
        )
        .route("/static/study_materials/:filename", get(download_material))
        .route("/ws", get(ws_handler))
        .route("/health", get(health_check))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

type Redirected = (SignedCookieJar, Redirect);

fn redirect_with(jar: SignedCookieJar, flash: Flash, to: &str) -> Redirected {
    (set_flash(jar, flash), Redirect::to(to))
}

/// Turn a user-facing failure into a notice on `to`; anything else bubbles up.
fn recover(jar: SignedCookieJar, err: HubError, to: &str) -> HubResult<Redirected> {
    if !err.is_recoverable() {
        return Err(err);
    }
    Ok(redirect_with(
        jar,
        Flash::new(FlashLevel::Error, err.notice()),
        to,
    ))
}

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let healthy = match &state.db_pool {
        Some(pool) => common::database::health_check(pool).await,
        None => true,
    };

    let (status, label) = if healthy {
        (StatusCode::OK, "ok")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "unavailable")
    };
    (
        status,
        Json(json!({
            "status": label,
            "service": "study-hub"
        })),
    )
}

pub async fn index(ctx: Ctx, jar: SignedCookieJar) -> impl IntoResponse {
    let (jar, flash) = take_flash(jar);
    (jar, Html(views::index(ctx.user(), flash.as_ref())))
}

pub async fn register_page(jar: SignedCookieJar) -> impl IntoResponse {
    let (jar, flash) = take_flash(jar);
    (jar, Html(views::register(flash.as_ref())))
}

#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub name: String,
}

pub async fn register(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    axum::Form(form): axum::Form<RegisterForm>,
) -> HubResult<Redirected> {
    match state
        .identity
        .register(&form.email, &form.password, &form.name)
        .await
    {
        Ok(user) => Ok(redirect_with(
            jar,
            Flash::new(
                FlashLevel::Success,
                format!(
                    "Welcome, {}! Account created successfully. Please log in.",
                    user.display_name()
                ),
            ),
            "/login",
        )),
        Err(e) => recover(jar, e, "/register"),
    }
}

pub async fn login_page(jar: SignedCookieJar) -> impl IntoResponse {
    let (jar, flash) = take_flash(jar);
    (jar, Html(views::login(flash.as_ref())))
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

pub async fn login(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    axum::Form(form): axum::Form<LoginForm>,
) -> HubResult<Redirected> {
    let user_id = match state.identity.authenticate(&form.email, &form.password).await {
        Ok(user_id) => user_id,
        Err(e) => return recover(jar, e, "/login"),
    };

    let token = state
        .sessions
        .create_session(user_id)
        .await
        .map_err(HubError::Session)?;

    let jar = jar.add(session_cookie(token));
    Ok(redirect_with(
        jar,
        Flash::new(FlashLevel::Success, "Login successful! Welcome."),
        "/study-hub",
    ))
}

pub async fn logout(
    State(state): State<AppState>,
    ctx: Ctx,
    jar: SignedCookieJar,
) -> HubResult<Redirected> {
    if let Some(token) = ctx.session_token() {
        state
            .sessions
            .destroy_session(token)
            .await
            .map_err(HubError::Session)?;
    }

    let jar = clear_session_cookie(jar);
    Ok(redirect_with(
        jar,
        Flash::new(FlashLevel::Info, "You have been logged out."),
        "/",
    ))
}

pub async fn study_hub(
    State(state): State<AppState>,
    ctx: Ctx,
    jar: SignedCookieJar,
) -> HubResult<Response> {
    let user = match ctx.require_user() {
        Ok(user) => user,
        Err(e) => return Ok(recover(jar, e, "/login")?.into_response()),
    };

    let messages = state.messaging.recent_messages(DEFAULT_RECENT_LIMIT).await?;
    let materials = state.materials.list_materials().await?;

    let (jar, flash) = take_flash(jar);
    let page = views::hub(user, &messages, &materials, flash.as_ref());
    Ok((jar, Html(page)).into_response())
}

pub async fn upload_material(
    State(state): State<AppState>,
    ctx: Ctx,
    jar: SignedCookieJar,
    multipart: Multipart,
) -> HubResult<Redirected> {
    let user = match ctx.require_user() {
        Ok(user) => user,
        Err(e) => return recover(jar, e, "/login"),
    };

    let (original_filename, bytes) = match read_upload(multipart).await {
        Ok(upload) => upload,
        Err(e) => return recover(jar, e, "/study-hub"),
    };

    let stored = match state.uploads.store(&original_filename, &bytes).await {
        Ok(stored) => stored,
        Err(e) => {
            warn!("Upload of '{}' rejected: {}", original_filename, e);
            return recover(jar, e, "/study-hub");
        }
    };

    state
        .materials
        .save_material(
            user.id,
            user.display_name(),
            &original_filename,
            &stored.stored_filename,
            &stored.file_url,
        )
        .await?;

    Ok(redirect_with(
        jar,
        Flash::new(
            FlashLevel::Success,
            format!("File '{}' uploaded successfully!", original_filename),
        ),
        "/study-hub",
    ))
}

/// Pull the `study_file` part out of the form.
async fn read_upload(mut multipart: Multipart) -> HubResult<(String, Vec<u8>)> {
    while let Some(field) = multipart.next_field().await.map_err(|e| {
        warn!("Malformed upload: {}", e);
        HubError::InvalidInput("File upload failed. The file could not be read.".to_string())
    })? {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }

        let filename = field.file_name().unwrap_or_default().to_string();
        if filename.is_empty() {
            return Err(HubError::NoFileSelected);
        }

        let bytes = field.bytes().await.map_err(|e| {
            warn!("Failed to read upload '{}': {}", filename, e);
            HubError::InvalidInput("File upload failed. The file could not be read.".to_string())
        })?;
        return Ok((filename, bytes.to_vec()));
    }

    Err(HubError::NoFileSelected)
}

pub async fn download_material(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> HubResult<Response> {
    let Some(bytes) = state.uploads.read(&filename).await? else {
        return Ok((StatusCode::NOT_FOUND, "File not found").into_response());
    };

    info!("Serving material {}", filename);
    let content_type = mime_guess::from_path(&filename)
        .first_or_octet_stream()
        .to_string();

    Ok((
        [
            (header::CONTENT_TYPE, content_type),
            (header::CONTENT_DISPOSITION, attachment_disposition(&filename)),
        ],
        bytes,
    )
        .into_response())
}
