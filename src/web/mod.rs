//! Web form: pick a word and a color, get a mandala back.

use std::num::NonZeroU16;

use axum::Router;

use crate::constants::DEFAULT_COLOR;
use crate::generation::GenerationClient;
use crate::submission::{GenerationRequest, submit};

mod prelude;
mod views;

use prelude::*;
use views::{ColorName, FormTemplate, ResultTemplate};

#[derive(Clone, Debug)]
pub(crate) struct AppState {
    client: GenerationClient,
    prompt_mode: PromptMode,
}

impl AppState {
    fn new(client: GenerationClient, prompt_mode: PromptMode) -> Self {
        Self {
            client,
            prompt_mode,
        }
    }
}

#[derive(Deserialize, Debug)]
pub(crate) struct GenerateForm {
    #[serde(default)]
    inspiration: String,
    #[serde(default)]
    color: String,
    #[serde(default)]
    api_key: String,
    #[serde(default)]
    mode: Option<PromptMode>,
}

#[derive(Deserialize, Debug)]
pub(crate) struct ColorQuery {
    color: String,
}

/// handles the / GET
async fn form_handler(State(state): State<AppState>) -> FormTemplate {
    FormTemplate::new("", DEFAULT_COLOR, state.prompt_mode)
}

/// handles the /generate POST
async fn generate_handler(
    State(state): State<AppState>,
    Form(form): Form<GenerateForm>,
) -> Response {
    let mode = form.mode.unwrap_or(state.prompt_mode);
    let color: Color = match form.color.parse() {
        Ok(color) => color,
        Err(err) => {
            // a missing word or key is reported ahead of the color
            let err = match GenerationRequest::new(
                form.inspiration.as_str(),
                DEFAULT_COLOR,
                form.api_key.as_str(),
            )
            .validate()
            {
                Err(invalid) => MandalaError::from(invalid),
                Ok(()) => MandalaError::from(err),
            };
            return form_with_error(&form.inspiration, DEFAULT_COLOR, mode, err);
        }
    };
    let request = GenerationRequest::new(form.inspiration.as_str(), color, form.api_key)
        .with_label(name_color(color));

    match submit(&state.client, &request, mode, |phase| {
        debug!("Submission is {}", phase)
    })
    .await
    {
        Ok(mandala) => ResultTemplate::from(&mandala).into_response(),
        Err(err) => form_with_error(&form.inspiration, color, mode, err),
    }
}

/// Re-renders the form with `err` shown above it.
fn form_with_error(
    inspiration: &str,
    color: Color,
    mode: PromptMode,
    err: MandalaError,
) -> Response {
    let status = match &err {
        MandalaError::Validation(_) | MandalaError::InvalidColor(_) => {
            info!("Rejected submission: {}", err);
            StatusCode::BAD_REQUEST
        }
        MandalaError::Generation(_) => {
            error!("{}", err);
            StatusCode::BAD_GATEWAY
        }
    };
    let page = FormTemplate::new(inspiration, color, mode).with_error(err.to_string());
    (status, page).into_response()
}

/// handles the /color-name GET
async fn color_name_handler(
    Query(query): Query<ColorQuery>,
) -> Result<Json<ColorName>, MandalaError> {
    let color: Color = query.color.parse()?;
    Ok(Json(ColorName::from(color)))
}

async fn styles_handler() -> impl IntoResponse {
    const STYLES: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/static/styles.css"));
    ([(CONTENT_TYPE, "text/css")], STYLES)
}

fn create_router() -> Router<AppState> {
    Router::new()
        .route("/", axum::routing::get(form_handler))
        .route("/generate", axum::routing::post(generate_handler))
        .route("/color-name", axum::routing::get(color_name_handler))
        .route("/static/styles.css", axum::routing::get(styles_handler))
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for ctrl-c: {}", err);
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}

/// Serves the form until ctrl-c.
pub async fn setup_server(
    listen_addr: &str,
    port: NonZeroU16,
    client: GenerationClient,
    prompt_mode: PromptMode,
) -> Result<(), anyhow::Error> {
    let app = create_router().with_state(AppState::new(client, prompt_mode));

    let addr = format!("{}:{}", listen_addr, port);
    info!("Starting server on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    if let Err(err) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("Server error: {}", err);
    }
    Ok(())
}
