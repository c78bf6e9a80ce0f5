// src/handlers/relatorio.rs

use axum::{Json, extract::State, response::IntoResponse};

use crate::{common::error::AppError, config::AppState};

// Relatório geral do portfólio: ocupação e média de permanência por setor,
// nos grupos geral / em contratação / empenhados.
pub async fn relatorio_geral(
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let relatorio = app_state.relatorio_service.relatorio_geral().await?;
    Ok(Json(relatorio))
}
