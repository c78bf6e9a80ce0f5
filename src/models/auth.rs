// src/models/auth.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

// Os dois perfis do sistema. O mapa perfil -> permissões é fixo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Perfil {
    Gerente,
    Usuario,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permissao {
    VisualizarPainel,
    VisualizarProcessos,
    CadastrarProcesso,
    EditarProcesso,
    ExcluirProcesso,
    GerenciarUsuarios,
}

impl Perfil {
    pub fn permissoes(&self) -> &'static [Permissao] {
        match self {
            Perfil::Gerente => &[
                Permissao::VisualizarPainel,
                Permissao::VisualizarProcessos,
                Permissao::CadastrarProcesso,
                Permissao::EditarProcesso,
                Permissao::ExcluirProcesso,
                Permissao::GerenciarUsuarios,
            ],
            Perfil::Usuario => &[
                Permissao::VisualizarPainel,
                Permissao::VisualizarProcessos,
            ],
        }
    }

    pub fn tem_permissao(&self, permissao: Permissao) -> bool {
        self.permissoes().contains(&permissao)
    }
}

// Representa um usuário como gravado no armazém. Diferente da resposta da
// API, aqui o hash da senha PRECISA ser serializado: é o próprio documento
// persistido. Nunca devolva este struct em um handler; use `UsuarioResponse`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Usuario {
    pub id: Uuid,
    pub email: String,
    pub senha_hash: String,
    pub perfil: Perfil,
    pub criado_em: DateTime<Utc>,
}

// Versão pública do usuário, sem o hash.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UsuarioResponse {
    pub id: Uuid,
    pub email: String,
    pub perfil: Perfil,
    pub criado_em: DateTime<Utc>,
}

impl From<&Usuario> for UsuarioResponse {
    fn from(usuario: &Usuario) -> Self {
        Self {
            id: usuario.id,
            email: usuario.email.clone(),
            perfil: usuario.perfil,
            criado_em: usuario.criado_em,
        }
    }
}

// Dados para registro de um novo usuário
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterUserPayload {
    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: String,
    #[validate(length(min = 6, message = "A senha deve ter no mínimo 6 caracteres."))]
    pub senha: String,
    // Perfil desejado; se omitido, entra como `usuario`.
    pub perfil: Option<Perfil>,
}

// Dados para login
#[derive(Debug, Deserialize, Validate)]
pub struct LoginUserPayload {
    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: String,
    #[validate(length(min = 6, message = "A senha deve ter no mínimo 6 caracteres."))]
    pub senha: String,
}

// Resposta de autenticação com o token
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
}

// Estrutura de dados ("claims") dentro do JWT
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,      // Subject (ID do usuário)
    pub perfil: Perfil, // Perfil vigente quando o token foi emitido
    pub exp: usize,     // Expiration time (quando o token expira)
    pub iat: usize,     // Issued At (quando o token foi criado)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn usuario_comum_nao_edita_nem_exclui() {
        assert!(Perfil::Usuario.tem_permissao(Permissao::VisualizarProcessos));
        assert!(!Perfil::Usuario.tem_permissao(Permissao::EditarProcesso));
        assert!(!Perfil::Usuario.tem_permissao(Permissao::ExcluirProcesso));
        assert!(!Perfil::Usuario.tem_permissao(Permissao::GerenciarUsuarios));
    }

    #[test]
    fn gerente_tem_todas_as_permissoes() {
        for permissao in [
            Permissao::VisualizarPainel,
            Permissao::VisualizarProcessos,
            Permissao::CadastrarProcesso,
            Permissao::EditarProcesso,
            Permissao::ExcluirProcesso,
            Permissao::GerenciarUsuarios,
        ] {
            assert!(Perfil::Gerente.tem_permissao(permissao));
        }
    }
}
