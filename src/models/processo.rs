// src/models/processo.rs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use validator::{Validate, ValidationError};

use crate::models::etapa::Etapa;

// Um processo de compra. Os nomes de campo são os mesmos dos documentos do
// sistema de origem, sem rename, para manter as coleções intercambiáveis.
// O mesmo struct serve às três partições: os campos de empenho só existem
// depois da transição Ativo -> Empenhado, e documentos arquivados preservam
// a forma que tinham na origem.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Processo {
    pub nup: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_sgc: Option<String>,

    pub fonte_recebimento: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub categoria: Option<String>,

    pub objeto: String,
    pub quantidade: i64,
    pub uopm_beneficiada: String,
    pub valor: Decimal,

    // Imutável após o cadastro.
    pub data_primeira_etapa: NaiveDate,

    // Cópias desnormalizadas da etapa cronologicamente mais recente do
    // processo. Toda gravação de etapa com data estritamente mais nova
    // atualiza os dois; etapas retroativas não tocam em nenhum.
    pub data_etapa_mais_recente: NaiveDate,
    pub status: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_empenho: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prazo_entrega: Option<NaiveDate>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observacoes: Option<String>,
}

// Resposta de detalhe: o processo com sua lista de etapas (mais recente
// primeiro), como o objeto único que a tela de visualização monta.
#[derive(Debug, Serialize)]
pub struct ProcessoComEtapas {
    #[serde(flatten)]
    pub processo: Processo,
    pub etapas: Vec<Etapa>,
}

// O NUP tem a forma <serial>-<ano>: dígitos e pontos, hífen, ano com 4 dígitos.
fn validar_nup(nup: &str) -> Result<(), ValidationError> {
    let valido = match nup.rsplit_once('-') {
        Some((prefixo, ano)) => {
            !prefixo.is_empty()
                && ano.len() == 4
                && ano.chars().all(|c| c.is_ascii_digit())
                && prefixo.chars().all(|c| c.is_ascii_digit() || c == '.')
        }
        None => false,
    };

    if valido {
        Ok(())
    } else {
        let mut err = ValidationError::new("nup");
        err.message = Some("O NUP deve ter o formato 31.000.000-2025.".into());
        Err(err)
    }
}

fn validar_nao_negativo(valor: &Decimal) -> Result<(), ValidationError> {
    if valor.is_sign_negative() {
        let mut err = ValidationError::new("range");
        err.message = Some("O valor não pode ser negativo.".into());
        return Err(err);
    }
    Ok(())
}

// ---
// Payload: cadastro de processo (cria também a etapa inicial)
// ---
#[derive(Debug, Deserialize, Validate)]
pub struct CreateProcessoPayload {
    #[validate(custom(function = "validar_nup"))]
    pub nup: String,

    pub num_sgc: Option<String>,

    #[validate(length(min = 1, message = "A fonte de recebimento é obrigatória."))]
    pub fonte_recebimento: String,

    pub categoria: Option<String>,

    #[validate(length(min = 1, message = "O objeto é obrigatório."))]
    pub objeto: String,

    #[validate(range(min = 1, message = "A quantidade deve ser de pelo menos 1."))]
    pub quantidade: i64,

    #[validate(length(min = 1, message = "A UOPM beneficiada é obrigatória."))]
    pub uopm_beneficiada: String,

    #[validate(custom(function = "validar_nao_negativo"))]
    pub valor: Decimal,

    pub data_primeira_etapa: NaiveDate,

    // Dados da etapa inicial.
    #[validate(length(min = 1, message = "O local da etapa inicial é obrigatório."))]
    pub local: String,

    #[validate(length(min = 1, message = "O status da etapa inicial é obrigatório."))]
    pub status: String,
}

// ---
// Payload: edição parcial de campos do processo
// ---
// `nup` e `data_primeira_etapa` são imutáveis; `status` e
// `data_etapa_mais_recente` só mudam via gravação de etapa.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct EditarProcessoPayload {
    pub num_sgc: Option<String>,
    pub fonte_recebimento: Option<String>,
    pub categoria: Option<String>,
    pub objeto: Option<String>,

    #[validate(range(min = 1, message = "A quantidade deve ser de pelo menos 1."))]
    pub quantidade: Option<i64>,

    pub uopm_beneficiada: Option<String>,

    #[validate(custom(function = "validar_nao_negativo"))]
    pub valor: Option<Decimal>,

    pub num_empenho: Option<String>,
    pub prazo_entrega: Option<NaiveDate>,
    pub observacoes: Option<String>,
}

impl EditarProcessoPayload {
    // Apenas os campos informados entram no merge; os demais ficam como estão
    // no documento (edição campo a campo, último escritor vence).
    pub fn como_mapa(&self) -> Map<String, Value> {
        let mut campos = Map::new();
        if let Some(v) = &self.num_sgc {
            campos.insert("num_sgc".into(), json!(v));
        }
        if let Some(v) = &self.fonte_recebimento {
            campos.insert("fonte_recebimento".into(), json!(v));
        }
        if let Some(v) = &self.categoria {
            campos.insert("categoria".into(), json!(v));
        }
        if let Some(v) = &self.objeto {
            campos.insert("objeto".into(), json!(v));
        }
        if let Some(v) = self.quantidade {
            campos.insert("quantidade".into(), json!(v));
        }
        if let Some(v) = &self.uopm_beneficiada {
            campos.insert("uopm_beneficiada".into(), json!(v));
        }
        if let Some(v) = self.valor {
            campos.insert("valor".into(), json!(v));
        }
        if let Some(v) = &self.num_empenho {
            campos.insert("num_empenho".into(), json!(v));
        }
        if let Some(v) = self.prazo_entrega {
            campos.insert("prazo_entrega".into(), json!(v));
        }
        if let Some(v) = &self.observacoes {
            campos.insert("observacoes".into(), json!(v));
        }
        campos
    }
}

// ---
// Payload: empenho (transição Ativo -> Empenhado)
// ---
#[derive(Debug, Deserialize, Validate)]
pub struct EmpenharPayload {
    #[validate(length(min = 1, message = "O número do empenho é obrigatório."))]
    pub num_empenho: String,

    pub prazo_entrega: NaiveDate,

    pub observacoes: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nup_no_formato_padrao_passa() {
        assert!(validar_nup("31.000.000-2025").is_ok());
        assert!(validar_nup("1-2024").is_ok());
    }

    #[test]
    fn nup_sem_ano_ou_com_lixo_falha() {
        assert!(validar_nup("31.000.000").is_err());
        assert!(validar_nup("31.000.000-25").is_err());
        assert!(validar_nup("abc-2025").is_err());
        assert!(validar_nup("-2025").is_err());
    }

    #[test]
    fn edicao_parcial_so_inclui_campos_informados() {
        let payload = EditarProcessoPayload {
            objeto: Some("Munição calibre .40".into()),
            quantidade: Some(500),
            ..Default::default()
        };
        let campos = payload.como_mapa();
        assert_eq!(campos.len(), 2);
        assert_eq!(campos["objeto"], json!("Munição calibre .40"));
        assert!(!campos.contains_key("valor"));
    }
}
