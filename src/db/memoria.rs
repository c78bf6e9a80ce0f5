// src/db/memoria.rs

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use crate::{
    common::error::AppError,
    db::store::{Particao, RecordStore},
};

// Armazém em memória, com a mesma semântica documento-a-documento do PgStore.
// É o dublê de testes dos serviços; nada aqui é persistente.
#[derive(Default)]
pub struct MemStore {
    documentos: RwLock<HashMap<(Particao, String), Value>>,
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RecordStore for MemStore {
    async fn get(&self, particao: Particao, id: &str) -> Result<Option<Value>, AppError> {
        let documentos = self.documentos.read().await;
        Ok(documentos.get(&(particao, id.to_string())).cloned())
    }

    async fn put(&self, particao: Particao, id: &str, dados: Value) -> Result<(), AppError> {
        let mut documentos = self.documentos.write().await;
        documentos.insert((particao, id.to_string()), dados);
        Ok(())
    }

    async fn query_by_equality(
        &self,
        particao: Particao,
        campo: &str,
        valor: &str,
    ) -> Result<Vec<Value>, AppError> {
        let documentos = self.documentos.read().await;
        let mut achados: Vec<(String, Value)> = documentos
            .iter()
            .filter(|((p, _), dados)| {
                *p == particao && dados.get(campo).and_then(Value::as_str) == Some(valor)
            })
            .map(|((_, id), dados)| (id.clone(), dados.clone()))
            .collect();

        // Ordena pela chave para devolver resultados determinísticos.
        achados.sort_by(|(a, _), (b, _)| a.cmp(b));
        Ok(achados.into_iter().map(|(_, dados)| dados).collect())
    }

    async fn list_all(&self, particao: Particao) -> Result<Vec<Value>, AppError> {
        let documentos = self.documentos.read().await;
        let mut achados: Vec<(String, Value)> = documentos
            .iter()
            .filter(|((p, _), _)| *p == particao)
            .map(|((_, id), dados)| (id.clone(), dados.clone()))
            .collect();

        achados.sort_by(|(a, _), (b, _)| a.cmp(b));
        Ok(achados.into_iter().map(|(_, dados)| dados).collect())
    }

    async fn count(&self, particao: Particao) -> Result<i64, AppError> {
        let documentos = self.documentos.read().await;
        Ok(documentos.keys().filter(|(p, _)| *p == particao).count() as i64)
    }

    async fn delete(&self, particao: Particao, id: &str) -> Result<(), AppError> {
        let mut documentos = self.documentos.write().await;
        documentos.remove(&(particao, id.to_string()));
        Ok(())
    }
}
