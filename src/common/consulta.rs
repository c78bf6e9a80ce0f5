// src/common/consulta.rs
//
// Fachada de consulta: ordenação, filtro e paginação sobre uma lista já
// carregada em memória. Nada aqui toca o armazém: os handlers buscam a
// coleção inteira e aplicam isto no resultado, como a tela de consulta faz.

use std::cmp::Ordering;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::processo::Processo;

// Valor sentinela de "itens por página": devolve a lista inteira ("Todos").
pub const TODOS: i64 = -1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direcao {
    #[default]
    Asc,
    Desc,
}

// ---
// Comparador de NUP
// ---
// O NUP tem a forma <serial>-<ano>. Compara primeiro o ano (numérico),
// e só então o prefixo (lexicográfico), assim a ordenação fica cronológica
// independente de zeros à esquerda no serial.
pub fn comparar_nups(a: &str, b: &str) -> Ordering {
    fn ano(nup: &str) -> i32 {
        nup.rsplit_once('-')
            .and_then(|(_, ano)| ano.parse().ok())
            .unwrap_or(0)
    }

    fn prefixo(nup: &str) -> &str {
        nup.rsplit_once('-').map(|(p, _)| p).unwrap_or(nup)
    }

    ano(a).cmp(&ano(b)).then_with(|| prefixo(a).cmp(prefixo(b)))
}

// Chave de ordenação de uma coluna. O despacho por tipo reproduz a tabela:
// valor compara como número, prazos e datas como data, NUP com o comparador
// composto, e o resto como texto sem diferenciar maiúsculas.
enum Chave {
    Nup(String),
    Texto(String),
    Inteiro(i64),
    Numero(Decimal),
    Data(Option<NaiveDate>),
}

fn chave_do_processo(processo: &Processo, campo: &str) -> Chave {
    let texto = |v: &str| Chave::Texto(v.to_lowercase());
    match campo {
        "nup" => Chave::Nup(processo.nup.clone()),
        "valor" => Chave::Numero(processo.valor),
        "quantidade" => Chave::Inteiro(processo.quantidade),
        "prazo_entrega" => Chave::Data(processo.prazo_entrega),
        "data_etapa_mais_recente" => Chave::Data(Some(processo.data_etapa_mais_recente)),
        "data_primeira_etapa" => Chave::Data(Some(processo.data_primeira_etapa)),
        "fonte_recebimento" => texto(&processo.fonte_recebimento),
        "objeto" => texto(&processo.objeto),
        "uopm_beneficiada" => texto(&processo.uopm_beneficiada),
        "status" => texto(&processo.status),
        "categoria" => texto(processo.categoria.as_deref().unwrap_or("")),
        "num_sgc" => texto(processo.num_sgc.as_deref().unwrap_or("")),
        "num_empenho" => texto(processo.num_empenho.as_deref().unwrap_or("")),
        // Coluna desconhecida: cai na ordenação padrão da tabela.
        _ => Chave::Nup(processo.nup.clone()),
    }
}

fn comparar_chaves(a: &Chave, b: &Chave) -> Ordering {
    match (a, b) {
        (Chave::Nup(a), Chave::Nup(b)) => comparar_nups(a, b),
        (Chave::Texto(a), Chave::Texto(b)) => a.cmp(b),
        (Chave::Inteiro(a), Chave::Inteiro(b)) => a.cmp(b),
        (Chave::Numero(a), Chave::Numero(b)) => a.cmp(b),
        // Processos sem a data (ex.: sem prazo de entrega) vêm primeiro.
        (Chave::Data(a), Chave::Data(b)) => a.cmp(b),
        // Chaves do mesmo campo têm sempre a mesma variante.
        _ => Ordering::Equal,
    }
}

// `sort_by` é estável: empates preservam a ordem original da lista, inclusive
// na direção descendente (o reverso de um empate continua empate).
pub fn ordenar_processos(lista: &mut [Processo], campo: &str, direcao: Direcao) {
    lista.sort_by(|a, b| {
        let ordem = comparar_chaves(&chave_do_processo(a, campo), &chave_do_processo(b, campo));
        match direcao {
            Direcao::Asc => ordem,
            Direcao::Desc => ordem.reverse(),
        }
    });
}

// ---
// Paginação
// ---
pub fn paginar<T>(lista: Vec<T>, pagina: usize, por_pagina: i64) -> Vec<T> {
    if por_pagina == TODOS {
        return lista;
    }
    let tamanho = por_pagina.max(0) as usize;
    if tamanho == 0 {
        return Vec::new();
    }
    lista.into_iter().skip(pagina * tamanho).take(tamanho).collect()
}

// ---
// Filtros
// ---
// Conjunção de predicados independentes por coluna: categoria casa por
// igualdade exata (ou passa, se não informada); as colunas de texto livre
// casam por substring sem diferenciar maiúsculas. Filtro vazio deixa tudo
// passar.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FiltroProcessos {
    pub nup: Option<String>,
    pub objeto: Option<String>,
    pub uopm_beneficiada: Option<String>,
    pub fonte_recebimento: Option<String>,
    pub status: Option<String>,
    pub categoria: Option<String>,
}

fn contem(filtro: &Option<String>, valor: &str) -> bool {
    match filtro.as_deref().map(str::trim) {
        None | Some("") => true,
        Some(f) => valor.to_lowercase().contains(&f.to_lowercase()),
    }
}

impl FiltroProcessos {
    pub fn aceita(&self, processo: &Processo) -> bool {
        let categoria_ok = match self.categoria.as_deref().map(str::trim) {
            None | Some("") => true,
            Some(filtro) => processo.categoria.as_deref() == Some(filtro),
        };

        categoria_ok
            && contem(&self.nup, &processo.nup)
            && contem(&self.objeto, &processo.objeto)
            && contem(&self.uopm_beneficiada, &processo.uopm_beneficiada)
            && contem(&self.fonte_recebimento, &processo.fonte_recebimento)
            && contem(&self.status, &processo.status)
    }
}

// ---
// Parâmetros de consulta das listagens
// ---
// Campos achatados à mão (em vez de #[serde(flatten)]) porque o extrator de
// query string não desserializa números dentro de structs achatados.
#[derive(Debug, Clone, Deserialize)]
pub struct ConsultaParams {
    #[serde(default)]
    pub pagina: usize,
    #[serde(default = "por_pagina_padrao")]
    pub por_pagina: i64,
    #[serde(default = "ordenar_por_padrao")]
    pub ordenar_por: String,
    #[serde(default)]
    pub direcao: Direcao,

    pub nup: Option<String>,
    pub objeto: Option<String>,
    pub uopm_beneficiada: Option<String>,
    pub fonte_recebimento: Option<String>,
    pub status: Option<String>,
    pub categoria: Option<String>,
}

fn por_pagina_padrao() -> i64 {
    10
}

fn ordenar_por_padrao() -> String {
    "nup".to_string()
}

impl Default for ConsultaParams {
    fn default() -> Self {
        Self {
            pagina: 0,
            por_pagina: por_pagina_padrao(),
            ordenar_por: ordenar_por_padrao(),
            direcao: Direcao::Asc,
            nup: None,
            objeto: None,
            uopm_beneficiada: None,
            fonte_recebimento: None,
            status: None,
            categoria: None,
        }
    }
}

impl ConsultaParams {
    fn filtro(&self) -> FiltroProcessos {
        FiltroProcessos {
            nup: self.nup.clone(),
            objeto: self.objeto.clone(),
            uopm_beneficiada: self.uopm_beneficiada.clone(),
            fonte_recebimento: self.fonte_recebimento.clone(),
            status: self.status.clone(),
            categoria: self.categoria.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ResultadoConsulta {
    // Total DEPOIS do filtro e ANTES do recorte de página, para o front
    // montar a paginação.
    pub total: usize,
    pub itens: Vec<Processo>,
}

pub fn aplicar(params: &ConsultaParams, mut lista: Vec<Processo>) -> ResultadoConsulta {
    let filtro = params.filtro();
    lista.retain(|p| filtro.aceita(p));
    ordenar_processos(&mut lista, &params.ordenar_por, params.direcao);
    let total = lista.len();
    let itens = paginar(lista, params.pagina, params.por_pagina);
    ResultadoConsulta { total, itens }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn processo(nup: &str, valor: i64, objeto: &str) -> Processo {
        Processo {
            nup: nup.into(),
            num_sgc: None,
            fonte_recebimento: "FESP".into(),
            categoria: None,
            objeto: objeto.into(),
            quantidade: 1,
            uopm_beneficiada: "1º BPM".into(),
            valor: Decimal::new(valor * 100, 2),
            data_primeira_etapa: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            data_etapa_mais_recente: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            status: "Em cotação".into(),
            num_empenho: None,
            prazo_entrega: None,
            observacoes: None,
        }
    }

    #[test]
    fn comparador_de_nup_e_antissimetrico() {
        let nups = [
            "31.000.100-2024",
            "02.000.000-2025",
            "31.000.099-2024",
            "1-2023",
            "sem_hifen",
        ];
        for a in &nups {
            for b in &nups {
                assert_eq!(comparar_nups(a, b), comparar_nups(b, a).reverse());
            }
        }
    }

    #[test]
    fn comparador_de_nup_ordena_por_ano_depois_prefixo() {
        let mut nups = vec![
            "31.000.100-2025",
            "99.999.999-2024",
            "31.000.099-2025",
            "01.000.000-2024",
        ];
        nups.sort_by(|a, b| comparar_nups(a, b));
        assert_eq!(
            nups,
            vec![
                "01.000.000-2024",
                "99.999.999-2024",
                "31.000.099-2025",
                "31.000.100-2025",
            ]
        );
    }

    #[test]
    fn nup_sem_hifen_assume_ano_zero() {
        // Sem hífen o ano vale 0, então vem antes de qualquer NUP datado.
        assert_eq!(comparar_nups("sem_hifen", "1-2020"), Ordering::Less);
    }

    #[test]
    fn ordenacao_e_estavel_em_empates() {
        let mut lista = vec![
            processo("1-2025", 5, "colete"),
            processo("2-2025", 5, "munição"),
            processo("3-2025", 3, "viatura"),
        ];
        ordenar_processos(&mut lista, "valor", Direcao::Asc);
        let nups: Vec<&str> = lista.iter().map(|p| p.nup.as_str()).collect();
        // Os dois empatados em 5 preservam a ordem original (1-2025, 2-2025).
        assert_eq!(nups, vec!["3-2025", "1-2025", "2-2025"]);
    }

    #[test]
    fn ordenacao_por_valor_e_numerica() {
        let mut lista = vec![
            processo("1-2025", 1000, "a"),
            processo("2-2025", 200, "b"),
            processo("3-2025", 30, "c"),
        ];
        ordenar_processos(&mut lista, "valor", Direcao::Desc);
        let nups: Vec<&str> = lista.iter().map(|p| p.nup.as_str()).collect();
        assert_eq!(nups, vec!["1-2025", "2-2025", "3-2025"]);
    }

    #[test]
    fn paginacao_com_sentinela_devolve_tudo() {
        let lista: Vec<i32> = (0..37).collect();
        // Qualquer índice de página: o sentinela ignora o recorte.
        assert_eq!(paginar(lista.clone(), 3, TODOS).len(), 37);
        assert_eq!(paginar(lista.clone(), 0, 10).len(), 10);
        assert_eq!(paginar(lista.clone(), 3, 10), vec![30, 31, 32, 33, 34, 35, 36]);
        assert_eq!(paginar(lista, 4, 10).len(), 0);
    }

    #[test]
    fn filtro_combina_predicados_por_e() {
        let mut a = processo("1-2025", 10, "Colete balístico");
        a.categoria = Some("Equipamento".into());
        let mut b = processo("2-2025", 10, "Munição");
        b.categoria = Some("Equipamento".into());

        let filtro = FiltroProcessos {
            objeto: Some("colete".into()),
            categoria: Some("Equipamento".into()),
            ..Default::default()
        };
        assert!(filtro.aceita(&a));
        assert!(!filtro.aceita(&b));
    }

    #[test]
    fn filtro_vazio_deixa_tudo_passar() {
        let filtro = FiltroProcessos {
            objeto: Some("   ".into()),
            ..Default::default()
        };
        assert!(filtro.aceita(&processo("1-2025", 1, "qualquer coisa")));
    }

    #[test]
    fn categoria_exige_igualdade_exata() {
        let mut p = processo("1-2025", 1, "x");
        p.categoria = Some("Equipamento".into());
        let filtro = FiltroProcessos {
            categoria: Some("Equip".into()),
            ..Default::default()
        };
        assert!(!filtro.aceita(&p));
    }

    #[test]
    fn aplicar_conta_o_total_antes_do_recorte() {
        let lista: Vec<Processo> = (1..=25)
            .map(|i| processo(&format!("{i}-2025"), i, "objeto"))
            .collect();
        let params = ConsultaParams {
            por_pagina: 10,
            pagina: 2,
            ordenar_por: "valor".into(),
            ..Default::default()
        };
        let resultado = aplicar(&params, lista);
        assert_eq!(resultado.total, 25);
        assert_eq!(resultado.itens.len(), 5);
    }
}
