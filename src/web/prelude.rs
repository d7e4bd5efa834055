pub(crate) use crate::color::{Color, name_color};
pub(crate) use crate::error::MandalaError;
pub(crate) use crate::prompt::PromptMode;
pub(crate) use askama::Template;
pub(crate) use askama_web::WebTemplate;
pub(crate) use axum::extract::{Form, Query, State};
pub(crate) use axum::http::{StatusCode, header::CONTENT_TYPE};
pub(crate) use axum::response::{IntoResponse, Json, Response};
pub(crate) use serde::{Deserialize, Serialize};
pub(crate) use tracing::{debug, error, info};
