// src/models/transicao.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::db::store::Particao;

// Um passo de uma transição entre partições. Cada passo é um dado
// serializável (não uma closure) justamente para o diário poder ser
// persistido e reexecutado; todos são idempotentes (upsert/delete), então
// repetir um passo já aplicado é inofensivo.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "tipo", rename_all = "snake_case")]
pub enum PassoTransicao {
    CopiarProcesso {
        para: Particao,
        id: String,
        dados: Value,
    },
    CopiarEtapa {
        para: Particao,
        id: String,
        dados: Value,
    },
    ExcluirEtapa {
        de: Particao,
        id: String,
    },
    ExcluirProcesso {
        de: Particao,
        id: String,
    },
}

// O diário de uma transição em andamento, gravado em `transicoes_pendentes`
// sob o nup. `proximo_passo` é o cursor: avança depois de cada passo
// concluído, e o documento é removido quando a sequência termina. Se ele
// ainda existe, a transição parou no meio e pode ser rolada para frente.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransicaoPendente {
    pub nup: String,
    // "empenho" ou "arquivamento", só para leitura humana nas listagens.
    pub descricao: String,
    pub passos: Vec<PassoTransicao>,
    pub proximo_passo: usize,
    pub criada_em: DateTime<Utc>,
}
