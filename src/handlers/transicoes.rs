// src/handlers/transicoes.rs
//
// Transições entre partições que pararam no meio: listagem dos diários
// pendentes e a rolagem para frente.

use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use serde_json::json;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::rbac::{PermEditarProcesso, RequirePermission},
};

pub async fn list_pendentes(
    State(app_state): State<AppState>,
    _guard: RequirePermission<PermEditarProcesso>,
) -> Result<impl IntoResponse, AppError> {
    let pendentes = app_state.processo_service.transicoes_pendentes().await?;
    Ok(Json(pendentes))
}

pub async fn retomar(
    State(app_state): State<AppState>,
    Path(nup): Path<String>,
    _guard: RequirePermission<PermEditarProcesso>,
) -> Result<impl IntoResponse, AppError> {
    app_state.processo_service.retomar_transicao(&nup).await?;
    Ok(Json(json!({ "mensagem": "Transição concluída com sucesso!" })))
}
