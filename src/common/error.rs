use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

// Nosso tipo de erro central, com `thiserror` para melhor ergonomia.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    // Campo obrigatório ausente/vazio fora do circuito do `validator`
    // (ex.: transição chamada direto pelo serviço).
    #[error("O campo '{0}' é obrigatório")]
    CampoObrigatorio(&'static str),

    #[error("Já existe um processo com este NUP")]
    NupJaExiste,

    #[error("E-mail já existe")]
    EmailAlreadyExists,

    #[error("Credenciais inválidas")]
    InvalidCredentials,

    #[error("Token inválido")]
    InvalidToken,

    #[error("Acesso negado: {0}")]
    AcessoNegado(String),

    #[error("Processo não encontrado")]
    ProcessoNaoEncontrado,

    #[error("Etapa não encontrada")]
    EtapaNaoEncontrada,

    #[error("Usuário não encontrado")]
    UserNotFound,

    #[error("Não há transição pendente para este processo")]
    TransicaoNaoEncontrada,

    // Uma transição entre partições falhou no meio da sequência de escritas.
    // Não há rollback automático: o chamador precisa enxergar em qual passo
    // parou para reexecutar (`retomar`) ou acionar um operador.
    #[error("Transição do processo {nup} interrompida no passo {passo} de {total}: {causa}")]
    TransicaoParcial {
        nup: String,
        passo: usize,
        total: usize,
        causa: String,
    },

    // Variante para erros de banco de dados (sqlx)
    #[error("Erro de banco de dados")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Erro de serialização")]
    SerializacaoError(#[from] serde_json::Error),

    // Variante genérica para qualquer outro erro inesperado
    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            // Retorna todos os detalhes da validação, campo a campo.
            AppError::ValidationError(errors) => {
                let mut details = std::collections::HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                let body = Json(json!({
                    "error": "Um ou mais campos são inválidos.",
                    "details": details,
                }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }

            // O chamador precisa dos dados estruturados para detectar o estado
            // parcial e decidir entre retomar ou alertar um operador.
            AppError::TransicaoParcial { nup, passo, total, causa } => {
                tracing::error!(
                    "Transição parcial do processo {}: passo {}/{} falhou ({})",
                    nup, passo, total, causa
                );
                let body = Json(json!({
                    "error": "A transição foi interrompida no meio. Use a rota de retomada ou contate o administrador.",
                    "nup": nup,
                    "passo": passo,
                    "total": total,
                    "causa": causa,
                }));
                return (StatusCode::INTERNAL_SERVER_ERROR, body).into_response();
            }

            AppError::CampoObrigatorio(campo) => {
                let body = Json(json!({
                    "error": format!("O campo '{campo}' é obrigatório."),
                }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }

            AppError::NupJaExiste => (StatusCode::CONFLICT, "Já existe um processo cadastrado com este NUP."),
            AppError::EmailAlreadyExists => (StatusCode::CONFLICT, "Este e-mail já está em uso."),
            AppError::InvalidCredentials => (StatusCode::UNAUTHORIZED, "E-mail ou senha inválidos."),
            AppError::InvalidToken => (StatusCode::UNAUTHORIZED, "Token de autenticação inválido ou ausente."),
            AppError::AcessoNegado(motivo) => {
                let body = Json(json!({ "error": motivo }));
                return (StatusCode::FORBIDDEN, body).into_response();
            }
            AppError::ProcessoNaoEncontrado => (StatusCode::NOT_FOUND, "Processo não encontrado."),
            AppError::EtapaNaoEncontrada => (StatusCode::NOT_FOUND, "Etapa não encontrada."),
            AppError::UserNotFound => (StatusCode::NOT_FOUND, "Usuário não encontrado."),
            AppError::TransicaoNaoEncontrada => {
                (StatusCode::NOT_FOUND, "Não há transição pendente para este processo.")
            }

            // Todos os outros erros (DatabaseError, SerializacaoError, etc.) viram 500.
            // O `tracing` loga a mensagem detalhada que o `thiserror` nos deu.
            ref e => {
                tracing::error!("Erro Interno do Servidor: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Ocorreu um erro inesperado.")
            }
        };

        // Resposta padrão para erros simples que só têm uma mensagem.
        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}
