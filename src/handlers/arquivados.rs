// src/handlers/arquivados.rs
//
// Rotas dos processos arquivados: leitura somente.

use axum::{
    Json,
    extract::{Path, Query, State},
    response::IntoResponse,
};

use crate::{
    common::{
        consulta::{ConsultaParams, aplicar},
        error::AppError,
    },
    config::AppState,
    db::store::Familia,
};

pub async fn list_arquivados(
    State(app_state): State<AppState>,
    Query(params): Query<ConsultaParams>,
) -> Result<impl IntoResponse, AppError> {
    let lista = app_state
        .processo_service
        .list_processos(Familia::Arquivados)
        .await?;
    Ok(Json(aplicar(&params, lista)))
}

pub async fn get_arquivado(
    State(app_state): State<AppState>,
    Path(nup): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let detalhe = app_state
        .processo_service
        .find_com_etapas(Familia::Arquivados, &nup)
        .await?;
    Ok(Json(detalhe))
}
