// src/models/local.rs

use serde::{Deserialize, Serialize};

// O conjunto fechado de setores por onde um processo pode passar. As etapas
// guardam o setor como texto; a agregação só contabiliza valores que
// pertencem a este conjunto e ignora o resto em silêncio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Local {
    Secomp,
    Cpl,
    Sofi,
    Dal,
    Suplantec,
    Gabinete,
    Almoxarifado,
}

impl Local {
    // A iteração dos relatórios percorre sempre a lista inteira, na ordem.
    pub const TODOS: [Local; 7] = [
        Local::Secomp,
        Local::Cpl,
        Local::Sofi,
        Local::Dal,
        Local::Suplantec,
        Local::Gabinete,
        Local::Almoxarifado,
    ];

    pub fn nome(&self) -> &'static str {
        match self {
            Local::Secomp => "SECOMP",
            Local::Cpl => "CPL",
            Local::Sofi => "SOFI",
            Local::Dal => "DAL",
            Local::Suplantec => "SUPLANTEC",
            Local::Gabinete => "GABINETE",
            Local::Almoxarifado => "ALMOXARIFADO",
        }
    }

    pub fn parse(texto: &str) -> Option<Local> {
        Local::TODOS.iter().copied().find(|l| l.nome() == texto)
    }
}
