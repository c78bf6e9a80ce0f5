// src/services/relatorio_service.rs
//
// Agregação de permanência: quantos dias cada processo ficou (ou está) em
// cada setor. Alimenta a linha do tempo de um processo e o relatório geral
// do portfólio.

use chrono::{NaiveDate, Utc};
use std::collections::BTreeMap;

use crate::{
    common::error::AppError,
    db::{ProcessoRepository, store::Familia},
    models::{
        etapa::Etapa,
        local::Local,
        relatorio::{
            DadosSetor, LinhaSetor, LinhaTempo, OcupacaoSetor, PermanenciaEtapa, RelatorioGeral,
            TotalLocal,
        },
    },
};

// Média arredondada para cima; 0 quando não houve passagem alguma.
fn media_teto(num_dias: i64, contagem: i64) -> i64 {
    if contagem == 0 {
        0
    } else {
        (num_dias + contagem - 1) / contagem
    }
}

// Permanência etapa a etapa de UM processo, a partir da lista ordenada da
// mais recente para a mais antiga. A etapa no índice 0 ainda está em curso:
// conta da chegada até hoje. As demais contam da sua data até a data da
// etapa seguinte (índice i-1). Diferença em dias de calendário, nunca
// negativa (dados fora de ordem viram 0, não contaminam a soma).
pub fn dias_por_etapa(etapas_desc: &[Etapa], hoje: NaiveDate) -> Vec<PermanenciaEtapa> {
    etapas_desc
        .iter()
        .enumerate()
        .map(|(i, etapa)| {
            let referencia = if i == 0 { hoje } else { etapas_desc[i - 1].data };
            let num_dias = (referencia - etapa.data).num_days().max(0);
            PermanenciaEtapa {
                local: etapa.local.clone(),
                data: etapa.data,
                status: etapa.status.clone(),
                num_dias,
            }
        })
        .collect()
}

// Soma os dias por setor dentro de um processo, preservando a ordem de
// primeira aparição (gráfico agrupado da tela de visualização).
pub fn somar_por_local(permanencias: &[PermanenciaEtapa]) -> Vec<TotalLocal> {
    let mut totais: Vec<TotalLocal> = Vec::new();
    for p in permanencias {
        match totais.iter_mut().find(|t| t.local == p.local) {
            Some(total) => total.num_dias += p.num_dias,
            None => totais.push(TotalLocal {
                local: p.local.clone(),
                num_dias: p.num_dias,
            }),
        }
    }
    totais
}

// Acumuladores de um grupo de processos (geral, em contratação, empenhados).
// Inicializa todos os setores do conjunto fixo, para os gráficos sempre
// terem a lista completa mesmo com contagem zero.
#[derive(Debug, Clone)]
struct Acumulador {
    dias: BTreeMap<Local, DadosSetor>,
    ocupacao: BTreeMap<Local, i64>,
}

impl Acumulador {
    fn new() -> Self {
        Self {
            dias: Local::TODOS.iter().map(|l| (*l, DadosSetor::default())).collect(),
            ocupacao: Local::TODOS.iter().map(|l| (*l, 0)).collect(),
        }
    }

    fn registrar_permanencia(&mut self, local: Local, num_dias: i64) {
        let dados = self.dias.entry(local).or_default();
        dados.num_dias += num_dias;
        dados.contagem += 1;
        dados.media = media_teto(dados.num_dias, dados.contagem);
    }

    fn registrar_ocupacao(&mut self, local: Local) {
        *self.ocupacao.entry(local).or_default() += 1;
    }

    fn linhas_de_dias(&self) -> Vec<LinhaSetor> {
        Local::TODOS
            .iter()
            .map(|local| LinhaSetor {
                setor: *local,
                dados: self.dias[local],
            })
            .collect()
    }

    // A ocupação só lista setores com pelo menos um processo parado hoje.
    fn linhas_de_ocupacao(&self) -> Vec<OcupacaoSetor> {
        Local::TODOS
            .iter()
            .filter(|local| self.ocupacao[local] > 0)
            .map(|local| OcupacaoSetor {
                setor: *local,
                quantidade: self.ocupacao[local],
            })
            .collect()
    }
}

// Acumula as permanências de um processo em todos os grupos-alvo de uma vez
// (o subgrupo da partição e o geral), garantindo contribuição idêntica nos
// dois. Etapa com setor fora do conjunto válido é pulada em silêncio; a
// ocupação conta uma única vez por processo, no setor da etapa mais recente.
fn acumular_processo(etapas_desc: &[Etapa], hoje: NaiveDate, alvos: &mut [&mut Acumulador]) {
    for (i, permanencia) in dias_por_etapa(etapas_desc, hoje).iter().enumerate() {
        let Some(local) = Local::parse(&permanencia.local) else {
            continue;
        };
        for alvo in alvos.iter_mut() {
            alvo.registrar_permanencia(local, permanencia.num_dias);
            if i == 0 {
                alvo.registrar_ocupacao(local);
            }
        }
    }
}

#[derive(Clone)]
pub struct RelatorioService {
    repo: ProcessoRepository,
}

impl RelatorioService {
    pub fn new(repo: ProcessoRepository) -> Self {
        Self { repo }
    }

    pub async fn relatorio_geral(&self) -> Result<RelatorioGeral, AppError> {
        self.relatorio_geral_em(Utc::now().date_naive()).await
    }

    // Recebe a data de referência para o cálculo ser reprodutível em teste.
    pub async fn relatorio_geral_em(&self, hoje: NaiveDate) -> Result<RelatorioGeral, AppError> {
        let mut geral = Acumulador::new();
        let mut ativos = Acumulador::new();
        let mut empenhados = Acumulador::new();

        // Processos em fase de contratação e suas etapas.
        let lista_ativos = self.repo.list_processos(Familia::Ativos).await?;
        for processo in &lista_ativos {
            let etapas = self.repo.list_etapas(Familia::Ativos, &processo.nup).await?;
            acumular_processo(&etapas, hoje, &mut [&mut geral, &mut ativos]);
        }

        // Processos empenhados e suas etapas.
        let lista_empenhados = self.repo.list_processos(Familia::Empenhados).await?;
        for processo in &lista_empenhados {
            let etapas = self
                .repo
                .list_etapas(Familia::Empenhados, &processo.nup)
                .await?;
            acumular_processo(&etapas, hoje, &mut [&mut geral, &mut empenhados]);
        }

        let arquivados = self.repo.count_processos(Familia::Arquivados).await?;

        Ok(RelatorioGeral {
            total_processos: (lista_ativos.len() + lista_empenhados.len()) as i64,
            em_contratacao: lista_ativos.len() as i64,
            com_empenho: lista_empenhados.len() as i64,
            arquivados,
            processos_por_setor: geral.linhas_de_ocupacao(),
            processos_em_contratacao_por_setor: ativos.linhas_de_ocupacao(),
            processos_empenhados_por_setor: empenhados.linhas_de_ocupacao(),
            dias_por_setor: geral.linhas_de_dias(),
            dias_em_contratacao_por_setor: ativos.linhas_de_dias(),
            dias_empenhados_por_setor: empenhados.linhas_de_dias(),
        })
    }

    pub async fn linha_tempo(&self, familia: Familia, nup: &str) -> Result<LinhaTempo, AppError> {
        self.linha_tempo_em(familia, nup, Utc::now().date_naive()).await
    }

    pub async fn linha_tempo_em(
        &self,
        familia: Familia,
        nup: &str,
        hoje: NaiveDate,
    ) -> Result<LinhaTempo, AppError> {
        self.repo
            .find_processo(familia, nup)
            .await?
            .ok_or(AppError::ProcessoNaoEncontrado)?;

        let etapas = self.repo.list_etapas(familia, nup).await?;
        let permanencias = dias_por_etapa(&etapas, hoje);
        let total_por_local = somar_por_local(&permanencias);
        Ok(LinhaTempo {
            permanencias,
            total_por_local,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{MemStore, store::RecordStore};
    use crate::models::processo::Processo;
    use rust_decimal::Decimal;
    use std::sync::Arc;

    fn data(ano: i32, mes: u32, dia: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(ano, mes, dia).unwrap()
    }

    fn etapa(nup: &str, d: NaiveDate, local: &str) -> Etapa {
        Etapa {
            nup: nup.into(),
            data: d,
            local: local.into(),
            status: "andamento".into(),
        }
    }

    fn processo(nup: &str, ultima: NaiveDate) -> Processo {
        Processo {
            nup: nup.into(),
            num_sgc: None,
            fonte_recebimento: "FESP".into(),
            categoria: None,
            objeto: "objeto".into(),
            quantidade: 1,
            uopm_beneficiada: "1º BPM".into(),
            valor: Decimal::new(1000, 2),
            data_primeira_etapa: ultima,
            data_etapa_mais_recente: ultima,
            status: "andamento".into(),
            num_empenho: None,
            prazo_entrega: None,
            observacoes: None,
        }
    }

    #[test]
    fn etapa_mais_recente_conta_ate_hoje() {
        let etapas = vec![etapa("1-2025", data(2025, 6, 10), "SECOMP")];
        let permanencias = dias_por_etapa(&etapas, data(2025, 6, 25));
        assert_eq!(permanencias[0].num_dias, 15);
    }

    #[test]
    fn etapas_anteriores_contam_ate_a_seguinte() {
        // Mais recente primeiro: CPL (01/06), SECOMP (10/05), DAL (01/05).
        let etapas = vec![
            etapa("1-2025", data(2025, 6, 1), "CPL"),
            etapa("1-2025", data(2025, 5, 10), "SECOMP"),
            etapa("1-2025", data(2025, 5, 1), "DAL"),
        ];
        let permanencias = dias_por_etapa(&etapas, data(2025, 6, 4));
        let dias: Vec<i64> = permanencias.iter().map(|p| p.num_dias).collect();
        assert_eq!(dias, vec![3, 22, 9]);
    }

    #[test]
    fn permanencia_nunca_e_negativa() {
        // Histórico bagunçado: data futura e datas duplicadas.
        let etapas = vec![
            etapa("1-2025", data(2025, 12, 31), "CPL"),
            etapa("1-2025", data(2025, 5, 10), "SECOMP"),
            etapa("1-2025", data(2025, 5, 10), "DAL"),
            etapa("1-2025", data(2025, 6, 1), "SOFI"),
        ];
        for p in dias_por_etapa(&etapas, data(2025, 6, 4)) {
            assert!(p.num_dias >= 0, "permanência negativa em {}", p.local);
        }
    }

    #[test]
    fn historico_vazio_nao_quebra() {
        assert!(dias_por_etapa(&[], data(2025, 6, 4)).is_empty());
    }

    #[test]
    fn media_arredonda_para_cima() {
        let mut acumulador = Acumulador::new();
        acumulador.registrar_permanencia(Local::Secomp, 4);
        acumulador.registrar_permanencia(Local::Secomp, 6);
        acumulador.registrar_permanencia(Local::Cpl, 10);

        assert_eq!(acumulador.dias[&Local::Secomp].media, 5);
        assert_eq!(acumulador.dias[&Local::Cpl].media, 10);
        // ceil(11/2) = 6
        acumulador.registrar_permanencia(Local::Cpl, 1);
        assert_eq!(acumulador.dias[&Local::Cpl].media, 6);
    }

    #[test]
    fn setor_sem_visitas_tem_media_zero() {
        let acumulador = Acumulador::new();
        for linha in acumulador.linhas_de_dias() {
            assert_eq!(linha.dados.media, 0);
            assert_eq!(linha.dados.contagem, 0);
        }
    }

    #[test]
    fn somar_por_local_agrupa_preservando_ordem() {
        let permanencias = vec![
            PermanenciaEtapa { local: "CPL".into(), data: data(2025, 6, 1), status: "a".into(), num_dias: 3 },
            PermanenciaEtapa { local: "SECOMP".into(), data: data(2025, 5, 10), status: "b".into(), num_dias: 22 },
            PermanenciaEtapa { local: "CPL".into(), data: data(2025, 4, 1), status: "c".into(), num_dias: 5 },
        ];
        let totais = somar_por_local(&permanencias);
        assert_eq!(totais.len(), 2);
        assert_eq!(totais[0].local, "CPL");
        assert_eq!(totais[0].num_dias, 8);
        assert_eq!(totais[1].local, "SECOMP");
        assert_eq!(totais[1].num_dias, 22);
    }

    async fn montar_cenario() -> RelatorioService {
        let store: Arc<dyn RecordStore> = Arc::new(MemStore::new());
        let repo = ProcessoRepository::new(store);

        // Ativo: parado na CPL há 10 dias, passou 5 dias na SECOMP.
        repo.save_processo(Familia::Ativos, &processo("1-2025", data(2025, 6, 10)))
            .await
            .unwrap();
        repo.save_etapa(Familia::Ativos, &etapa("1-2025", data(2025, 6, 10), "CPL"))
            .await
            .unwrap();
        repo.save_etapa(Familia::Ativos, &etapa("1-2025", data(2025, 6, 5), "SECOMP"))
            .await
            .unwrap();

        // Empenhado: parado na CPL há 2 dias; uma etapa com setor inválido.
        repo.save_processo(Familia::Empenhados, &processo("2-2025", data(2025, 6, 18)))
            .await
            .unwrap();
        repo.save_etapa(Familia::Empenhados, &etapa("2-2025", data(2025, 6, 18), "CPL"))
            .await
            .unwrap();
        repo.save_etapa(
            Familia::Empenhados,
            &etapa("2-2025", data(2025, 6, 1), "Setor Fantasma"),
        )
        .await
        .unwrap();

        // Ativo sem etapa nenhuma: não contribui e não quebra.
        repo.save_processo(Familia::Ativos, &processo("3-2025", data(2025, 6, 1)))
            .await
            .unwrap();

        RelatorioService::new(repo)
    }

    fn dados_de(linhas: &[LinhaSetor], setor: Local) -> DadosSetor {
        linhas.iter().find(|l| l.setor == setor).unwrap().dados
    }

    #[tokio::test]
    async fn relatorio_mantem_subgrupos_independentes() {
        let service = montar_cenario().await;
        let hoje = data(2025, 6, 20);
        let relatorio = service.relatorio_geral_em(hoje).await.unwrap();

        assert_eq!(relatorio.total_processos, 3);
        assert_eq!(relatorio.em_contratacao, 2);
        assert_eq!(relatorio.com_empenho, 1);
        assert_eq!(relatorio.arquivados, 0);

        // Ativos: CPL recebeu 10 dias (1 passagem), SECOMP 5 dias.
        let ativos_cpl = dados_de(&relatorio.dias_em_contratacao_por_setor, Local::Cpl);
        assert_eq!(ativos_cpl, DadosSetor { num_dias: 10, contagem: 1, media: 10 });
        let ativos_secomp = dados_de(&relatorio.dias_em_contratacao_por_setor, Local::Secomp);
        assert_eq!(ativos_secomp, DadosSetor { num_dias: 5, contagem: 1, media: 5 });

        // Empenhados: só a CPL com 2 dias. O setor inválido foi descartado
        // e nada do grupo ativo vazou para cá.
        let empenhados_cpl = dados_de(&relatorio.dias_empenhados_por_setor, Local::Cpl);
        assert_eq!(empenhados_cpl, DadosSetor { num_dias: 2, contagem: 1, media: 2 });
        let empenhados_secomp = dados_de(&relatorio.dias_empenhados_por_setor, Local::Secomp);
        assert_eq!(empenhados_secomp.contagem, 0);

        // Geral = soma exata dos dois subgrupos, sem dupla contagem.
        let geral_cpl = dados_de(&relatorio.dias_por_setor, Local::Cpl);
        assert_eq!(geral_cpl, DadosSetor { num_dias: 12, contagem: 2, media: 6 });

        // Ocupação: cada processo conta uma vez, no setor da etapa mais
        // recente (o processo sem etapas não aparece).
        let ocupacao_cpl = relatorio
            .processos_por_setor
            .iter()
            .find(|o| o.setor == Local::Cpl)
            .unwrap();
        assert_eq!(ocupacao_cpl.quantidade, 2);
        assert_eq!(relatorio.processos_por_setor.len(), 1);
    }

    #[tokio::test]
    async fn linha_tempo_calcula_permanencias_do_processo() {
        let service = montar_cenario().await;
        let linha = service
            .linha_tempo_em(Familia::Ativos, "1-2025", data(2025, 6, 20))
            .await
            .unwrap();

        assert_eq!(linha.permanencias.len(), 2);
        assert_eq!(linha.permanencias[0].local, "CPL");
        assert_eq!(linha.permanencias[0].num_dias, 10);
        assert_eq!(linha.permanencias[1].local, "SECOMP");
        assert_eq!(linha.permanencias[1].num_dias, 5);
        assert_eq!(linha.total_por_local.len(), 2);
    }

    #[tokio::test]
    async fn linha_tempo_de_nup_inexistente_e_not_found() {
        let service = montar_cenario().await;
        let resultado = service
            .linha_tempo_em(Familia::Ativos, "9-2099", data(2025, 6, 20))
            .await;
        assert!(matches!(resultado, Err(AppError::ProcessoNaoEncontrado)));
    }
}
