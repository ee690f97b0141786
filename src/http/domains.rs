//! Allow-listed domain discovery.

use crate::app::AppState;
use axum::{Json, extract::State, response::IntoResponse};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct DomainsResponse {
  pub success: bool,
  pub result: Vec<String>,
}

pub async fn get_domains(State(state): State<AppState>) -> impl IntoResponse {
  Json(DomainsResponse {
    success: true,
    result: state.config.domains.clone(),
  })
}
