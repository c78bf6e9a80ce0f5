// src/handlers/empenhados.rs
//
// Rotas dos contratos empenhados. Mesmo desenho das rotas de processos,
// apontando para a família de partições dos empenhados.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::NaiveDate;
use serde_json::json;
use validator::Validate;

use crate::{
    common::{
        consulta::{ConsultaParams, aplicar},
        error::AppError,
    },
    config::AppState,
    db::store::Familia,
    middleware::rbac::{PermEditarProcesso, PermExcluirProcesso, RequirePermission},
    models::{etapa::NovaEtapaPayload, processo::EditarProcessoPayload},
};

pub async fn list_empenhados(
    State(app_state): State<AppState>,
    Query(params): Query<ConsultaParams>,
) -> Result<impl IntoResponse, AppError> {
    let lista = app_state
        .processo_service
        .list_processos(Familia::Empenhados)
        .await?;
    Ok(Json(aplicar(&params, lista)))
}

pub async fn get_empenhado(
    State(app_state): State<AppState>,
    Path(nup): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let detalhe = app_state
        .processo_service
        .find_com_etapas(Familia::Empenhados, &nup)
        .await?;
    Ok(Json(detalhe))
}

pub async fn update_empenhado(
    State(app_state): State<AppState>,
    Path(nup): Path<String>,
    _guard: RequirePermission<PermEditarProcesso>,
    Json(payload): Json<EditarProcessoPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let processo = app_state
        .processo_service
        .update_campos(Familia::Empenhados, &nup, &payload)
        .await?;
    Ok(Json(processo))
}

pub async fn delete_empenhado(
    State(app_state): State<AppState>,
    Path(nup): Path<String>,
    _guard: RequirePermission<PermExcluirProcesso>,
) -> Result<impl IntoResponse, AppError> {
    app_state
        .processo_service
        .excluir_processo(Familia::Empenhados, &nup)
        .await?;
    Ok(Json(json!({ "mensagem": "Processo excluído com sucesso!" })))
}

pub async fn add_etapa(
    State(app_state): State<AppState>,
    Path(nup): Path<String>,
    _guard: RequirePermission<PermEditarProcesso>,
    Json(payload): Json<NovaEtapaPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let etapa = app_state
        .processo_service
        .add_etapa(Familia::Empenhados, &nup, payload)
        .await?;
    Ok((StatusCode::CREATED, Json(etapa)))
}

pub async fn edit_etapa(
    State(app_state): State<AppState>,
    Path((nup, data)): Path<(String, NaiveDate)>,
    _guard: RequirePermission<PermEditarProcesso>,
    Json(payload): Json<NovaEtapaPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let etapa = app_state
        .processo_service
        .edit_etapa(Familia::Empenhados, &nup, data, payload)
        .await?;
    Ok(Json(etapa))
}

pub async fn arquivar(
    State(app_state): State<AppState>,
    Path(nup): Path<String>,
    _guard: RequirePermission<PermEditarProcesso>,
) -> Result<impl IntoResponse, AppError> {
    app_state
        .processo_service
        .arquivar(Familia::Empenhados, &nup)
        .await?;
    Ok(Json(json!({ "mensagem": "Processo arquivado com sucesso!" })))
}

pub async fn linha_tempo(
    State(app_state): State<AppState>,
    Path(nup): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let linha = app_state
        .relatorio_service
        .linha_tempo(Familia::Empenhados, &nup)
        .await?;
    Ok(Json(linha))
}
