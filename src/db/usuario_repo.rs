// src/db/usuario_repo.rs

use std::sync::Arc;

use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::store::{Particao, RecordStore},
    models::auth::Usuario,
};

// O repositório de usuários, sobre a partição 'usuarios' do armazém.
#[derive(Clone)]
pub struct UsuarioRepository {
    store: Arc<dyn RecordStore>,
}

impl UsuarioRepository {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    // Busca um usuário pelo seu e-mail
    pub async fn find_by_email(&self, email: &str) -> Result<Option<Usuario>, AppError> {
        let documentos = self
            .store
            .query_by_equality(Particao::Usuarios, "email", email)
            .await?;
        match documentos.into_iter().next() {
            Some(doc) => Ok(Some(serde_json::from_value(doc)?)),
            None => Ok(None),
        }
    }

    // Busca um usuário pelo seu ID
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Usuario>, AppError> {
        let doc = self.store.get(Particao::Usuarios, &id.to_string()).await?;
        match doc {
            Some(doc) => Ok(Some(serde_json::from_value(doc)?)),
            None => Ok(None),
        }
    }

    pub async fn create(&self, usuario: &Usuario) -> Result<(), AppError> {
        let dados = serde_json::to_value(usuario)?;
        self.store
            .put(Particao::Usuarios, &usuario.id.to_string(), dados)
            .await
    }

    pub async fn count(&self) -> Result<i64, AppError> {
        self.store.count(Particao::Usuarios).await
    }
}
