pub(crate) use crate::category::Category;
pub(crate) use crate::error::ThumbforgeError;
pub(crate) use crate::web::AppState;
pub(crate) use axum::Json;
pub(crate) use axum::extract::State;
pub(crate) use serde::Deserialize;
pub(crate) use serde_json::{Value, json};
pub(crate) use std::sync::Arc;
pub(crate) use tracing::{info, warn};
