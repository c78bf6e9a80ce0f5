// src/handlers/auth.rs

use axum::{Json, extract::State, http::HeaderMap};
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::{AuthenticatedUser, extrair_bearer},
    models::auth::{AuthResponse, LoginUserPayload, RegisterUserPayload, UsuarioResponse},
};

// Handler de registro. A rota é pública por causa do bootstrap (primeiro
// usuário); nos demais casos o serviço exige um gerente autenticado, então
// o token, se veio, é resolvido aqui e repassado.
pub async fn register(
    State(app_state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<RegisterUserPayload>,
) -> Result<Json<AuthResponse>, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let solicitante = match extrair_bearer(&headers) {
        Some(token) => Some(app_state.auth_service.validate_token(token).await?),
        None => None,
    };

    let token = app_state
        .auth_service
        .register_user(payload, solicitante.as_ref())
        .await?;

    Ok(Json(AuthResponse { token }))
}

// Handler de login
pub async fn login(
    State(app_state): State<AppState>,
    Json(payload): Json<LoginUserPayload>,
) -> Result<Json<AuthResponse>, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let token = app_state
        .auth_service
        .login_user(&payload.email, &payload.senha)
        .await?;

    Ok(Json(AuthResponse { token }))
}

// Handler da rota protegida /me
pub async fn get_me(AuthenticatedUser(usuario): AuthenticatedUser) -> Json<UsuarioResponse> {
    Json(UsuarioResponse::from(&usuario))
}
