// src/middleware/rbac.rs

use axum::{extract::FromRequestParts, http::request::Parts};
use std::marker::PhantomData;

use crate::{common::error::AppError, models::auth::{Permissao, Usuario}};

// 1. O trait que amarra um tipo-marcador a uma permissão do mapa fixo.
pub trait PermissaoDef: Send + Sync + 'static {
    fn permissao() -> Permissao;
    fn descricao() -> &'static str;
}

macro_rules! permissao {
    ($nome:ident, $variante:ident, $descricao:expr) => {
        pub struct $nome;
        impl PermissaoDef for $nome {
            fn permissao() -> Permissao {
                Permissao::$variante
            }
            fn descricao() -> &'static str {
                $descricao
            }
        }
    };
}

permissao!(PermCadastrarProcesso, CadastrarProcesso, "cadastrar processos");
permissao!(PermEditarProcesso, EditarProcesso, "editar processos");
permissao!(PermExcluirProcesso, ExcluirProcesso, "excluir processos");

// 2. O extrator-guardião: basta declará-lo na assinatura do handler para a
// rota exigir a permissão. Depende do `auth_guard` já ter posto o usuário
// nos extensions.
pub struct RequirePermission<T>(PhantomData<T>);

impl<T, S> FromRequestParts<S> for RequirePermission<T>
where
    T: PermissaoDef,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let usuario = parts
            .extensions
            .get::<Usuario>()
            .ok_or(AppError::InvalidToken)?;

        if !usuario.perfil.tem_permissao(T::permissao()) {
            return Err(AppError::AcessoNegado(format!(
                "Seu perfil não permite {}.",
                T::descricao()
            )));
        }

        Ok(RequirePermission(PhantomData))
    }
}
