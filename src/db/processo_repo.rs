// src/db/processo_repo.rs

use std::sync::Arc;

use serde_json::{Map, Value};

use crate::{
    common::error::AppError,
    db::store::{Familia, RecordStore},
    models::{
        etapa::{Etapa, doc_id_de},
        processo::Processo,
    },
};

// O repositório de processos e etapas, tipado sobre o armazém de documentos.
// Toda operação recebe a família de partições (ativos/empenhados/arquivados):
// o mesmo esquema vive nas três, só muda o estado do ciclo de vida.
#[derive(Clone)]
pub struct ProcessoRepository {
    store: Arc<dyn RecordStore>,
}

// Decodificação tolerante para listagens: documento que não desserializa é
// logado e pulado, nunca derruba a leitura da coleção inteira.
fn decodificar_lista<T: serde::de::DeserializeOwned>(documentos: Vec<Value>, contexto: &str) -> Vec<T> {
    documentos
        .into_iter()
        .filter_map(|doc| match serde_json::from_value(doc) {
            Ok(item) => Some(item),
            Err(e) => {
                tracing::warn!("Documento inválido ignorado em {}: {}", contexto, e);
                None
            }
        })
        .collect()
}

impl ProcessoRepository {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    // --- Processos ---

    pub async fn find_processo(
        &self,
        familia: Familia,
        nup: &str,
    ) -> Result<Option<Processo>, AppError> {
        let doc = self.store.get(familia.processos(), nup).await?;
        match doc {
            Some(doc) => Ok(Some(serde_json::from_value(doc)?)),
            None => Ok(None),
        }
    }

    pub async fn list_processos(&self, familia: Familia) -> Result<Vec<Processo>, AppError> {
        let documentos = self.store.list_all(familia.processos()).await?;
        Ok(decodificar_lista(documentos, familia.processos().as_str()))
    }

    pub async fn save_processo(
        &self,
        familia: Familia,
        processo: &Processo,
    ) -> Result<(), AppError> {
        let dados = serde_json::to_value(processo)?;
        self.store.put(familia.processos(), &processo.nup, dados).await
    }

    pub async fn delete_processo(&self, familia: Familia, nup: &str) -> Result<(), AppError> {
        self.store.delete(familia.processos(), nup).await
    }

    pub async fn count_processos(&self, familia: Familia) -> Result<i64, AppError> {
        self.store.count(familia.processos()).await
    }

    // Edição campo a campo: lê o documento, mescla apenas os campos
    // informados e regrava inteiro (o armazém não tem patch parcial).
    pub async fn update_campos(
        &self,
        familia: Familia,
        nup: &str,
        campos: Map<String, Value>,
    ) -> Result<Processo, AppError> {
        let doc = self
            .store
            .get(familia.processos(), nup)
            .await?
            .ok_or(AppError::ProcessoNaoEncontrado)?;

        let mut objeto = match doc {
            Value::Object(objeto) => objeto,
            _ => return Err(AppError::ProcessoNaoEncontrado),
        };
        for (campo, valor) in campos {
            objeto.insert(campo, valor);
        }

        let atualizado: Processo = serde_json::from_value(Value::Object(objeto.clone()))?;
        self.store
            .put(familia.processos(), nup, Value::Object(objeto))
            .await?;
        Ok(atualizado)
    }

    // --- Etapas ---

    // Etapas de um processo, mais recente primeiro (ordem das telas; a
    // agregação de permanência também parte desta ordem).
    pub async fn list_etapas(&self, familia: Familia, nup: &str) -> Result<Vec<Etapa>, AppError> {
        let documentos = self
            .store
            .query_by_equality(familia.etapas(), "nup", nup)
            .await?;
        let mut etapas: Vec<Etapa> = decodificar_lista(documentos, familia.etapas().as_str());
        etapas.sort_by(|a, b| b.data.cmp(&a.data));
        Ok(etapas)
    }

    pub async fn find_etapa(
        &self,
        familia: Familia,
        nup: &str,
        data: chrono::NaiveDate,
    ) -> Result<Option<Etapa>, AppError> {
        let doc = self.store.get(familia.etapas(), &doc_id_de(nup, data)).await?;
        match doc {
            Some(doc) => Ok(Some(serde_json::from_value(doc)?)),
            None => Ok(None),
        }
    }

    pub async fn save_etapa(&self, familia: Familia, etapa: &Etapa) -> Result<(), AppError> {
        let dados = serde_json::to_value(etapa)?;
        self.store.put(familia.etapas(), &etapa.doc_id(), dados).await
    }

    pub async fn delete_etapa(
        &self,
        familia: Familia,
        nup: &str,
        data: chrono::NaiveDate,
    ) -> Result<(), AppError> {
        self.store.delete(familia.etapas(), &doc_id_de(nup, data)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::memoria::MemStore;
    use chrono::NaiveDate;
    use serde_json::json;

    fn repo() -> ProcessoRepository {
        ProcessoRepository::new(Arc::new(MemStore::new()))
    }

    fn data(ano: i32, mes: u32, dia: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(ano, mes, dia).unwrap()
    }

    #[tokio::test]
    async fn listagem_ignora_documento_corrompido() {
        let repo = repo();
        let etapa = Etapa {
            nup: "1-2025".into(),
            data: data(2025, 1, 1),
            local: "SECOMP".into(),
            status: "Autuado".into(),
        };
        repo.save_etapa(Familia::Ativos, &etapa).await.unwrap();
        // Documento com a data quebrada, como um registro antigo corrompido.
        repo.store
            .put(
                crate::db::store::Particao::Etapas,
                "1-2025_lixo",
                json!({ "nup": "1-2025", "data": "31/01/2025", "local": "CPL", "status": "x" }),
            )
            .await
            .unwrap();

        let etapas = repo.list_etapas(Familia::Ativos, "1-2025").await.unwrap();
        assert_eq!(etapas, vec![etapa]);
    }

    #[tokio::test]
    async fn etapas_vem_da_mais_recente_para_a_mais_antiga() {
        let repo = repo();
        for (dia, local) in [(5, "CPL"), (20, "SOFI"), (1, "SECOMP")] {
            repo.save_etapa(
                Familia::Ativos,
                &Etapa {
                    nup: "1-2025".into(),
                    data: data(2025, 3, dia),
                    local: local.into(),
                    status: "ok".into(),
                },
            )
            .await
            .unwrap();
        }

        let etapas = repo.list_etapas(Familia::Ativos, "1-2025").await.unwrap();
        let locais: Vec<&str> = etapas.iter().map(|e| e.local.as_str()).collect();
        assert_eq!(locais, vec!["SOFI", "CPL", "SECOMP"]);
    }

    #[tokio::test]
    async fn update_campos_preserva_os_demais() {
        let repo = repo();
        let processo = Processo {
            nup: "1-2025".into(),
            num_sgc: None,
            fonte_recebimento: "FESP".into(),
            categoria: None,
            objeto: "Coletes".into(),
            quantidade: 10,
            uopm_beneficiada: "1º BPM".into(),
            valor: rust_decimal::Decimal::new(100_000, 2),
            data_primeira_etapa: data(2025, 1, 1),
            data_etapa_mais_recente: data(2025, 1, 1),
            status: "Autuado".into(),
            num_empenho: None,
            prazo_entrega: None,
            observacoes: None,
        };
        repo.save_processo(Familia::Ativos, &processo).await.unwrap();

        let mut campos = Map::new();
        campos.insert("objeto".into(), json!("Coletes balísticos nível III"));
        let atualizado = repo
            .update_campos(Familia::Ativos, "1-2025", campos)
            .await
            .unwrap();

        assert_eq!(atualizado.objeto, "Coletes balísticos nível III");
        assert_eq!(atualizado.fonte_recebimento, "FESP");
        assert_eq!(atualizado.quantidade, 10);
    }

    #[tokio::test]
    async fn update_campos_em_nup_inexistente_e_not_found() {
        let repo = repo();
        let resultado = repo.update_campos(Familia::Ativos, "9-2025", Map::new()).await;
        assert!(matches!(resultado, Err(AppError::ProcessoNaoEncontrado)));
    }
}
