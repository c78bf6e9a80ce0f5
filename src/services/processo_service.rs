// src/services/processo_service.rs
//
// Ciclo de vida do processo: cadastro, edição, etapas e as transições entre
// partições (empenho, arquivamento, exclusão). As transições copiam antes de
// excluir e registram um diário com cursor: uma falha no meio deixa o
// sistema duplicado (nunca sem o dado) e o diário permite rolar para frente.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};

use crate::{
    common::error::AppError,
    db::{
        ProcessoRepository,
        store::{Familia, Particao, RecordStore},
    },
    models::{
        etapa::{Etapa, NovaEtapaPayload},
        processo::{
            CreateProcessoPayload, EditarProcessoPayload, EmpenharPayload, Processo,
            ProcessoComEtapas,
        },
        transicao::{PassoTransicao, TransicaoPendente},
    },
};

#[derive(Clone)]
pub struct ProcessoService {
    repo: ProcessoRepository,
    store: Arc<dyn RecordStore>,
}

impl ProcessoService {
    pub fn new(repo: ProcessoRepository, store: Arc<dyn RecordStore>) -> Self {
        Self { repo, store }
    }

    // --- CADASTRO ---
    // O processo nasce na partição de ativos junto com sua etapa inicial;
    // os campos desnormalizados partem dela.
    pub async fn create_processo(
        &self,
        payload: CreateProcessoPayload,
    ) -> Result<Processo, AppError> {
        // O NUP é único entre as três partições.
        for familia in [Familia::Ativos, Familia::Empenhados, Familia::Arquivados] {
            if self.repo.find_processo(familia, &payload.nup).await?.is_some() {
                return Err(AppError::NupJaExiste);
            }
        }

        let processo = Processo {
            nup: payload.nup.clone(),
            num_sgc: payload.num_sgc,
            fonte_recebimento: payload.fonte_recebimento,
            categoria: payload.categoria,
            objeto: payload.objeto,
            quantidade: payload.quantidade,
            uopm_beneficiada: payload.uopm_beneficiada,
            valor: payload.valor,
            data_primeira_etapa: payload.data_primeira_etapa,
            data_etapa_mais_recente: payload.data_primeira_etapa,
            status: payload.status.clone(),
            num_empenho: None,
            prazo_entrega: None,
            observacoes: None,
        };

        let etapa_inicial = Etapa {
            nup: payload.nup,
            data: payload.data_primeira_etapa,
            local: payload.local,
            status: payload.status,
        };

        self.repo.save_processo(Familia::Ativos, &processo).await?;
        self.repo.save_etapa(Familia::Ativos, &etapa_inicial).await?;

        tracing::info!("Processo {} cadastrado", processo.nup);
        Ok(processo)
    }

    // --- CONSULTA ---

    pub async fn list_processos(&self, familia: Familia) -> Result<Vec<Processo>, AppError> {
        self.repo.list_processos(familia).await
    }

    pub async fn find_com_etapas(
        &self,
        familia: Familia,
        nup: &str,
    ) -> Result<ProcessoComEtapas, AppError> {
        let processo = self
            .repo
            .find_processo(familia, nup)
            .await?
            .ok_or(AppError::ProcessoNaoEncontrado)?;
        let etapas = self.repo.list_etapas(familia, nup).await?;
        Ok(ProcessoComEtapas { processo, etapas })
    }

    // --- EDIÇÃO DE CAMPOS ---

    pub async fn update_campos(
        &self,
        familia: Familia,
        nup: &str,
        payload: &EditarProcessoPayload,
    ) -> Result<Processo, AppError> {
        self.repo.update_campos(familia, nup, payload.como_mapa()).await
    }

    // --- ETAPAS ---
    // Grava (ou sobrescreve, se a data repetir) a etapa na chave `nup_data`.
    // Se a data for estritamente mais nova que a etapa mais recente conhecida,
    // o status e a data desnormalizados do processo acompanham; uma etapa
    // retroativa não toca neles.
    pub async fn add_etapa(
        &self,
        familia: Familia,
        nup: &str,
        payload: NovaEtapaPayload,
    ) -> Result<Etapa, AppError> {
        let processo = self
            .repo
            .find_processo(familia, nup)
            .await?
            .ok_or(AppError::ProcessoNaoEncontrado)?;

        let etapa = Etapa {
            nup: nup.to_string(),
            data: payload.data,
            local: payload.local,
            status: payload.status,
        };
        self.repo.save_etapa(familia, &etapa).await?;

        if etapa.data > processo.data_etapa_mais_recente {
            let mut campos = serde_json::Map::new();
            campos.insert("status".into(), serde_json::json!(etapa.status));
            campos.insert(
                "data_etapa_mais_recente".into(),
                serde_json::json!(etapa.data),
            );
            self.repo.update_campos(familia, nup, campos).await?;
        }

        Ok(etapa)
    }

    // Editar é excluir a etapa da chave antiga e regravar pela regra de
    // inclusão. Mudar a data muda a chave e pode arrastar a desnormalização.
    pub async fn edit_etapa(
        &self,
        familia: Familia,
        nup: &str,
        data_antiga: NaiveDate,
        payload: NovaEtapaPayload,
    ) -> Result<Etapa, AppError> {
        self.repo
            .find_etapa(familia, nup, data_antiga)
            .await?
            .ok_or(AppError::EtapaNaoEncontrada)?;

        self.repo.delete_etapa(familia, nup, data_antiga).await?;
        self.add_etapa(familia, nup, payload).await
    }

    // --- EXCLUSÃO (Ativo ou Empenhado -> some) ---
    // Destrutivo e sem cópia: exclui o processo e cada etapa em cascata.
    // As exclusões são independentes; uma falha parcial pode deixar etapas
    // órfãs, que a agregação tolera (ela parte sempre dos processos).
    pub async fn excluir_processo(&self, familia: Familia, nup: &str) -> Result<(), AppError> {
        self.repo
            .find_processo(familia, nup)
            .await?
            .ok_or(AppError::ProcessoNaoEncontrado)?;

        self.repo.delete_processo(familia, nup).await?;

        let etapas = self.repo.list_etapas(familia, nup).await?;
        for etapa in &etapas {
            self.repo.delete_etapa(familia, nup, etapa.data).await?;
        }

        tracing::info!("Processo {} excluído ({} etapas)", nup, etapas.len());
        Ok(())
    }

    // --- EMPENHO (Ativo -> Empenhado) ---
    pub async fn empenhar(&self, nup: &str, payload: EmpenharPayload) -> Result<(), AppError> {
        // Sem número de empenho e prazo, a transição não executa.
        if payload.num_empenho.trim().is_empty() {
            return Err(AppError::CampoObrigatorio("num_empenho"));
        }

        let processo = self
            .repo
            .find_processo(Familia::Ativos, nup)
            .await?
            .ok_or(AppError::ProcessoNaoEncontrado)?;

        let destino = Processo {
            num_empenho: Some(payload.num_empenho),
            prazo_entrega: Some(payload.prazo_entrega),
            observacoes: payload.observacoes.or(processo.observacoes.clone()),
            ..processo
        };

        let passos = self
            .montar_passos(Familia::Ativos, Familia::Empenhados, &destino)
            .await?;
        self.executar_transicao(nup, "empenho", passos).await?;

        tracing::info!("Processo {} empenhado", nup);
        Ok(())
    }

    // --- ARQUIVAMENTO (Ativo ou Empenhado -> Arquivado) ---
    // Cópia literal do processo e das etapas, depois exclusão dos originais.
    pub async fn arquivar(&self, origem: Familia, nup: &str) -> Result<(), AppError> {
        let processo = self
            .repo
            .find_processo(origem, nup)
            .await?
            .ok_or(AppError::ProcessoNaoEncontrado)?;

        let passos = self
            .montar_passos(origem, Familia::Arquivados, &processo)
            .await?;
        self.executar_transicao(nup, "arquivamento", passos).await?;

        tracing::info!("Processo {} arquivado", nup);
        Ok(())
    }

    // Sequência padrão das transições: copiar o processo, copiar cada etapa,
    // excluir cada etapa da origem e por fim o processo. A ordem vicia o modo
    // de falha para duplicação em vez de perda.
    async fn montar_passos(
        &self,
        origem: Familia,
        destino: Familia,
        processo_destino: &Processo,
    ) -> Result<Vec<PassoTransicao>, AppError> {
        let nup = &processo_destino.nup;
        let etapas = self.repo.list_etapas(origem, nup).await?;

        let mut passos = vec![PassoTransicao::CopiarProcesso {
            para: destino.processos(),
            id: nup.clone(),
            dados: serde_json::to_value(processo_destino)?,
        }];
        for etapa in &etapas {
            passos.push(PassoTransicao::CopiarEtapa {
                para: destino.etapas(),
                id: etapa.doc_id(),
                dados: serde_json::to_value(etapa)?,
            });
        }
        for etapa in &etapas {
            passos.push(PassoTransicao::ExcluirEtapa {
                de: origem.etapas(),
                id: etapa.doc_id(),
            });
        }
        passos.push(PassoTransicao::ExcluirProcesso {
            de: origem.processos(),
            id: nup.clone(),
        });
        Ok(passos)
    }

    async fn executar_transicao(
        &self,
        nup: &str,
        descricao: &str,
        passos: Vec<PassoTransicao>,
    ) -> Result<(), AppError> {
        let mut jornal = TransicaoPendente {
            nup: nup.to_string(),
            descricao: descricao.to_string(),
            passos,
            proximo_passo: 0,
            criada_em: Utc::now(),
        };
        self.gravar_jornal(&jornal).await?;
        self.executar_passos(&mut jornal).await
    }

    // Executa do cursor em diante, persistindo o cursor após cada passo.
    // Qualquer falha vira `TransicaoParcial` com o passo em que parou; o
    // diário continua gravado para a retomada.
    async fn executar_passos(&self, jornal: &mut TransicaoPendente) -> Result<(), AppError> {
        let total = jornal.passos.len();
        while jornal.proximo_passo < total {
            let indice = jornal.proximo_passo;
            let passo = jornal.passos[indice].clone();

            let resultado = async {
                self.executar_passo(passo).await?;
                jornal.proximo_passo = indice + 1;
                self.gravar_jornal(jornal).await
            }
            .await;

            resultado.map_err(|e| AppError::TransicaoParcial {
                nup: jornal.nup.clone(),
                passo: indice,
                total,
                causa: e.to_string(),
            })?;
        }

        self.store
            .delete(Particao::TransicoesPendentes, &jornal.nup)
            .await
    }

    async fn executar_passo(&self, passo: PassoTransicao) -> Result<(), AppError> {
        match passo {
            PassoTransicao::CopiarProcesso { para, id, dados }
            | PassoTransicao::CopiarEtapa { para, id, dados } => {
                self.store.put(para, &id, dados).await
            }
            PassoTransicao::ExcluirEtapa { de, id }
            | PassoTransicao::ExcluirProcesso { de, id } => self.store.delete(de, &id).await,
        }
    }

    async fn gravar_jornal(&self, jornal: &TransicaoPendente) -> Result<(), AppError> {
        let dados = serde_json::to_value(jornal)?;
        self.store
            .put(Particao::TransicoesPendentes, &jornal.nup, dados)
            .await
    }

    // --- RETOMADA ---

    pub async fn transicoes_pendentes(&self) -> Result<Vec<TransicaoPendente>, AppError> {
        let documentos = self.store.list_all(Particao::TransicoesPendentes).await?;
        let mut pendentes = Vec::with_capacity(documentos.len());
        for doc in documentos {
            pendentes.push(serde_json::from_value(doc)?);
        }
        Ok(pendentes)
    }

    // Rola uma transição interrompida para frente, do último passo concluído
    // em diante. Os passos são idempotentes, então repetir não faz mal.
    pub async fn retomar_transicao(&self, nup: &str) -> Result<(), AppError> {
        let doc = self
            .store
            .get(Particao::TransicoesPendentes, nup)
            .await?
            .ok_or(AppError::TransicaoNaoEncontrada)?;
        let mut jornal: TransicaoPendente = serde_json::from_value(doc)?;

        tracing::info!(
            "Retomando {} do processo {} a partir do passo {}",
            jornal.descricao,
            nup,
            jornal.proximo_passo
        );
        self.executar_passos(&mut jornal).await
    }
}
