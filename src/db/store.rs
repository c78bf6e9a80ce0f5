// src/db/store.rs

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::common::error::AppError;

// As partições lógicas do armazém. Os nomes em `as_str` são os mesmos das
// coleções do sistema de origem, então os documentos gravados aqui são
// intercambiáveis com elas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Particao {
    Processos,
    Etapas,
    ContratosEmpenhados,
    ContratosEmpenhadosEtapas,
    ProcessosConcluidos,
    ProcessosConcluidosEtapas,
    Usuarios,
    TransicoesPendentes,
}

impl Particao {
    pub fn as_str(&self) -> &'static str {
        match self {
            Particao::Processos => "processos",
            Particao::Etapas => "etapas",
            Particao::ContratosEmpenhados => "contratos_empenhados",
            Particao::ContratosEmpenhadosEtapas => "contratos_empenhados_etapas",
            Particao::ProcessosConcluidos => "z_processos_concluidos",
            Particao::ProcessosConcluidosEtapas => "z_processos_concluidos_etapas",
            Particao::Usuarios => "usuarios",
            Particao::TransicoesPendentes => "transicoes_pendentes",
        }
    }
}

// Um processo vive em exatamente uma família de partições por vez:
// cada família agrupa a partição de processos e a de etapas correspondente.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Familia {
    Ativos,
    Empenhados,
    Arquivados,
}

impl Familia {
    pub fn processos(self) -> Particao {
        match self {
            Familia::Ativos => Particao::Processos,
            Familia::Empenhados => Particao::ContratosEmpenhados,
            Familia::Arquivados => Particao::ProcessosConcluidos,
        }
    }

    pub fn etapas(self) -> Particao {
        match self {
            Familia::Ativos => Particao::Etapas,
            Familia::Empenhados => Particao::ContratosEmpenhadosEtapas,
            Familia::Arquivados => Particao::ProcessosConcluidosEtapas,
        }
    }
}

// O contrato do armazém de documentos. É a costura de injeção da aplicação:
// produção usa `PgStore` (Postgres/JSONB), testes usam `MemStore`.
// Nenhuma operação oferece atomicidade entre documentos: quem precisa de
// sequência coerente de escritas (transições de partição) sequencia por conta
// própria e lida com falha parcial.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn get(&self, particao: Particao, id: &str) -> Result<Option<Value>, AppError>;

    // Upsert de documento inteiro (sem merge parcial).
    async fn put(&self, particao: Particao, id: &str, dados: Value) -> Result<(), AppError>;

    async fn query_by_equality(
        &self,
        particao: Particao,
        campo: &str,
        valor: &str,
    ) -> Result<Vec<Value>, AppError>;

    async fn list_all(&self, particao: Particao) -> Result<Vec<Value>, AppError>;

    async fn count(&self, particao: Particao) -> Result<i64, AppError>;

    // Idempotente: excluir um id inexistente não é erro.
    async fn delete(&self, particao: Particao, id: &str) -> Result<(), AppError>;
}
