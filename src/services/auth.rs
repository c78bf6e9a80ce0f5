// src/services/auth.rs

use bcrypt::{hash, verify};
use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};

use crate::{
    common::error::AppError,
    db::UsuarioRepository,
    models::auth::{Claims, Perfil, Permissao, RegisterUserPayload, Usuario},
};

#[derive(Clone)]
pub struct AuthService {
    usuario_repo: UsuarioRepository,
    jwt_secret: String,
}

impl AuthService {
    pub fn new(usuario_repo: UsuarioRepository, jwt_secret: String) -> Self {
        Self { usuario_repo, jwt_secret }
    }

    // Cadastro de usuário. O primeiro usuário do sistema entra como gerente
    // (bootstrap); depois disso, só um gerente autenticado pode cadastrar.
    pub async fn register_user(
        &self,
        payload: RegisterUserPayload,
        solicitante: Option<&Usuario>,
    ) -> Result<String, AppError> {
        let existentes = self.usuario_repo.count().await?;

        let perfil = if existentes == 0 {
            Perfil::Gerente
        } else {
            match solicitante {
                Some(usuario) if usuario.perfil.tem_permissao(Permissao::GerenciarUsuarios) => {
                    payload.perfil.unwrap_or(Perfil::Usuario)
                }
                Some(_) => {
                    return Err(AppError::AcessoNegado(
                        "Apenas gerentes podem cadastrar novos usuários.".into(),
                    ));
                }
                None => return Err(AppError::InvalidToken),
            }
        };

        if self.usuario_repo.find_by_email(&payload.email).await?.is_some() {
            return Err(AppError::EmailAlreadyExists);
        }

        // Hashing fora do executor assíncrono, pois o bcrypt é pesado.
        let senha = payload.senha.clone();
        let senha_hash = tokio::task::spawn_blocking(move || hash(&senha, bcrypt::DEFAULT_COST))
            .await
            .map_err(|e| anyhow::anyhow!("Falha na task de hashing: {}", e))??;

        let usuario = Usuario {
            id: uuid::Uuid::new_v4(),
            email: payload.email,
            senha_hash,
            perfil,
            criado_em: Utc::now(),
        };
        self.usuario_repo.create(&usuario).await?;

        tracing::info!("Usuário {} cadastrado com perfil {:?}", usuario.email, perfil);
        self.create_token(&usuario)
    }

    pub async fn login_user(&self, email: &str, senha: &str) -> Result<String, AppError> {
        let usuario = self
            .usuario_repo
            .find_by_email(email)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        let senha = senha.to_owned();
        let senha_hash = usuario.senha_hash.clone();

        // Executa a verificação em um thread separado
        let senha_valida = tokio::task::spawn_blocking(move || verify(&senha, &senha_hash))
            .await
            .map_err(|e| anyhow::anyhow!("Falha na task de verificação de senha: {}", e))??;

        if !senha_valida {
            return Err(AppError::InvalidCredentials);
        }

        self.create_token(&usuario)
    }

    pub async fn validate_token(&self, token: &str) -> Result<Usuario, AppError> {
        let validation = Validation::default();
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_ref()),
            &validation,
        )
        .map_err(|_| AppError::InvalidToken)?;

        self.usuario_repo
            .find_by_id(token_data.claims.sub)
            .await?
            .ok_or(AppError::UserNotFound)
    }

    fn create_token(&self, usuario: &Usuario) -> Result<String, AppError> {
        let now = Utc::now();
        let expires_at = now + chrono::Duration::days(7);

        let claims = Claims {
            sub: usuario.id,
            perfil: usuario.perfil,
            exp: expires_at.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        Ok(encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_ref()),
        )?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{MemStore, store::RecordStore};
    use std::sync::Arc;

    fn service() -> AuthService {
        let store: Arc<dyn RecordStore> = Arc::new(MemStore::new());
        AuthService::new(UsuarioRepository::new(store), "segredo-de-teste".into())
    }

    fn payload(email: &str, perfil: Option<Perfil>) -> RegisterUserPayload {
        RegisterUserPayload {
            email: email.into(),
            senha: "senha-forte".into(),
            perfil,
        }
    }

    #[tokio::test]
    async fn primeiro_usuario_vira_gerente_e_loga() {
        let service = service();
        // Pede perfil comum, mas o bootstrap força gerente.
        service
            .register_user(payload("chefe@pm.gov.br", Some(Perfil::Usuario)), None)
            .await
            .unwrap();

        let token = service
            .login_user("chefe@pm.gov.br", "senha-forte")
            .await
            .unwrap();
        let usuario = service.validate_token(&token).await.unwrap();
        assert_eq!(usuario.perfil, Perfil::Gerente);
    }

    #[tokio::test]
    async fn segundo_cadastro_exige_gerente_autenticado() {
        let service = service();
        let token = service
            .register_user(payload("chefe@pm.gov.br", None), None)
            .await
            .unwrap();
        let gerente = service.validate_token(&token).await.unwrap();

        // Sem solicitante: negado.
        let resultado = service
            .register_user(payload("novato@pm.gov.br", None), None)
            .await;
        assert!(matches!(resultado, Err(AppError::InvalidToken)));

        // Com o gerente: entra como usuário comum.
        let token_novato = service
            .register_user(payload("novato@pm.gov.br", None), Some(&gerente))
            .await
            .unwrap();
        let novato = service.validate_token(&token_novato).await.unwrap();
        assert_eq!(novato.perfil, Perfil::Usuario);

        // O usuário comum não pode cadastrar terceiros.
        let resultado = service
            .register_user(payload("outro@pm.gov.br", None), Some(&novato))
            .await;
        assert!(matches!(resultado, Err(AppError::AcessoNegado(_))));
    }

    #[tokio::test]
    async fn email_duplicado_e_conflito() {
        let service = service();
        let token = service
            .register_user(payload("chefe@pm.gov.br", None), None)
            .await
            .unwrap();
        let gerente = service.validate_token(&token).await.unwrap();

        let resultado = service
            .register_user(payload("chefe@pm.gov.br", None), Some(&gerente))
            .await;
        assert!(matches!(resultado, Err(AppError::EmailAlreadyExists)));
    }

    #[tokio::test]
    async fn senha_errada_e_credencial_invalida() {
        let service = service();
        service
            .register_user(payload("chefe@pm.gov.br", None), None)
            .await
            .unwrap();
        let resultado = service.login_user("chefe@pm.gov.br", "senha-errada").await;
        assert!(matches!(resultado, Err(AppError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn token_adulterado_e_invalido() {
        let service = service();
        service
            .register_user(payload("chefe@pm.gov.br", None), None)
            .await
            .unwrap();
        let resultado = service.validate_token("um.token.qualquer").await;
        assert!(matches!(resultado, Err(AppError::InvalidToken)));
    }
}
