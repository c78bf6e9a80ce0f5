// src/models/etapa.rs

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

// Uma etapa: o registro de que um processo chegou a um setor em uma data.
// O id do documento é `nup_data` (data em ISO para facilitar ordenação),
// logo existe no máximo uma etapa por processo por dia: gravar de novo na
// mesma data sobrescreve a anterior.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Etapa {
    pub nup: String,
    pub data: NaiveDate,
    pub local: String,
    pub status: String,
}

impl Etapa {
    pub fn doc_id(&self) -> String {
        doc_id_de(&self.nup, self.data)
    }
}

// Exemplo: 31.000.000-2025_2025-12-31
pub fn doc_id_de(nup: &str, data: NaiveDate) -> String {
    format!("{nup}_{data}")
}

// ---
// Payload: nova etapa (também usado na edição, que regrava em outra chave)
// ---
#[derive(Debug, Deserialize, Validate)]
pub struct NovaEtapaPayload {
    pub data: NaiveDate,

    #[validate(length(min = 1, message = "O local é obrigatório."))]
    pub local: String,

    #[validate(length(min = 1, message = "O status é obrigatório."))]
    pub status: String,
}
