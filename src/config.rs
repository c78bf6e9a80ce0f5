// src/config.rs

use std::{env, sync::Arc, time::Duration};

use anyhow::Context;
use sqlx::{PgPool, postgres::PgPoolOptions};

use crate::{
    db::{PgStore, ProcessoRepository, RecordStore, UsuarioRepository},
    services::{AuthService, ProcessoService, RelatorioService},
};

// O estado compartilhado que será acessível em toda a aplicação
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub auth_service: AuthService,
    pub processo_service: ProcessoService,
    pub relatorio_service: RelatorioService,
}

impl AppState {
    // Carrega as configurações, conecta no banco e monta os serviços.
    pub async fn new() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").context("DATABASE_URL deve ser definida")?;
        let jwt_secret = env::var("JWT_SECRET").context("JWT_SECRET deve ser definido")?;

        let db_pool = match PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&database_url)
            .await
        {
            Ok(pool) => {
                tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");
                pool
            }
            Err(e) => {
                tracing::error!("🔥 Falha ao conectar ao banco de dados: {:?}", e);
                return Err(e).context("não foi possível conectar ao banco de dados");
            }
        };

        // O armazém de documentos é injetado como trait: os serviços não
        // sabem (nem precisam saber) que embaixo é Postgres.
        let store: Arc<dyn RecordStore> = Arc::new(PgStore::new(db_pool.clone()));

        let processo_repo = ProcessoRepository::new(store.clone());
        let usuario_repo = UsuarioRepository::new(store.clone());

        Ok(Self {
            db_pool,
            auth_service: AuthService::new(usuario_repo, jwt_secret),
            processo_service: ProcessoService::new(processo_repo.clone(), store),
            relatorio_service: RelatorioService::new(processo_repo),
        })
    }
}
