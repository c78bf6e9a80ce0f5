// src/db/postgres.rs

use async_trait::async_trait;
use serde_json::Value;
use sqlx::PgPool;

use crate::{
    common::error::AppError,
    db::store::{Particao, RecordStore},
};

// Implementação do armazém sobre Postgres: uma tabela única `documentos`
// com (particao, id) como chave e o documento em JSONB.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RecordStore for PgStore {
    async fn get(&self, particao: Particao, id: &str) -> Result<Option<Value>, AppError> {
        let dados = sqlx::query_scalar::<_, Value>(
            "SELECT dados FROM documentos WHERE particao = $1 AND id = $2",
        )
        .bind(particao.as_str())
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(dados)
    }

    async fn put(&self, particao: Particao, id: &str, dados: Value) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO documentos (particao, id, dados) VALUES ($1, $2, $3)
             ON CONFLICT (particao, id) DO UPDATE SET dados = EXCLUDED.dados",
        )
        .bind(particao.as_str())
        .bind(id)
        .bind(dados)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn query_by_equality(
        &self,
        particao: Particao,
        campo: &str,
        valor: &str,
    ) -> Result<Vec<Value>, AppError> {
        // `campo` chega como parâmetro ($2), nunca interpolado na query.
        let dados = sqlx::query_scalar::<_, Value>(
            "SELECT dados FROM documentos WHERE particao = $1 AND dados ->> $2 = $3",
        )
        .bind(particao.as_str())
        .bind(campo)
        .bind(valor)
        .fetch_all(&self.pool)
        .await?;

        Ok(dados)
    }

    async fn list_all(&self, particao: Particao) -> Result<Vec<Value>, AppError> {
        let dados = sqlx::query_scalar::<_, Value>(
            "SELECT dados FROM documentos WHERE particao = $1 ORDER BY id",
        )
        .bind(particao.as_str())
        .fetch_all(&self.pool)
        .await?;

        Ok(dados)
    }

    async fn count(&self, particao: Particao) -> Result<i64, AppError> {
        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM documentos WHERE particao = $1",
        )
        .bind(particao.as_str())
        .fetch_one(&self.pool)
        .await?;

        Ok(total)
    }

    async fn delete(&self, particao: Particao, id: &str) -> Result<(), AppError> {
        sqlx::query("DELETE FROM documentos WHERE particao = $1 AND id = $2")
            .bind(particao.as_str())
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
