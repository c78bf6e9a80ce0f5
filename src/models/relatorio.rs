// src/models/relatorio.rs

use chrono::NaiveDate;
use serde::Serialize;

use crate::models::local::Local;

// Acumulador de permanência de um setor: total de dias somados, quantas
// passagens contribuíram e a média arredondada para cima.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DadosSetor {
    pub num_dias: i64,
    pub contagem: i64,
    pub media: i64,
}

// Linha dos gráficos de média de dias por setor.
#[derive(Debug, Serialize)]
pub struct LinhaSetor {
    pub setor: Local,
    #[serde(flatten)]
    pub dados: DadosSetor,
}

// Linha dos gráficos de ocupação ("nº de processos em cada setor, hoje").
#[derive(Debug, Serialize)]
pub struct OcupacaoSetor {
    pub setor: Local,
    pub quantidade: i64,
}

// O relatório geral do portfólio. Os três pares de listas reproduzem os
// gráficos da tela de relatório (geral, em contratação e empenhados);
// cada processo contribui para exatamente um subgrupo e para o geral.
#[derive(Debug, Serialize)]
pub struct RelatorioGeral {
    pub total_processos: i64,
    pub em_contratacao: i64,
    pub com_empenho: i64,
    pub arquivados: i64,

    pub processos_por_setor: Vec<OcupacaoSetor>,
    pub processos_em_contratacao_por_setor: Vec<OcupacaoSetor>,
    pub processos_empenhados_por_setor: Vec<OcupacaoSetor>,

    pub dias_por_setor: Vec<LinhaSetor>,
    pub dias_em_contratacao_por_setor: Vec<LinhaSetor>,
    pub dias_empenhados_por_setor: Vec<LinhaSetor>,
}

// Uma etapa com sua permanência calculada, para a linha do tempo de um
// processo. O local fica como texto cru: a tela mostra a etapa mesmo que o
// setor não pertença ao conjunto válido (só a agregação o descarta).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PermanenciaEtapa {
    pub local: String,
    pub data: NaiveDate,
    pub status: String,
    pub num_dias: i64,
}

// Soma de dias por setor dentro de um único processo (gráfico agrupado).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TotalLocal {
    pub local: String,
    pub num_dias: i64,
}

#[derive(Debug, Serialize)]
pub struct LinhaTempo {
    pub permanencias: Vec<PermanenciaEtapa>,
    pub total_por_local: Vec<TotalLocal>,
}
