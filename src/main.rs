// src/main.rs

use axum::{
    Router,
    middleware as axum_middleware,
    routing::{get, post, put},
};
use tokio::net::TcpListener;

// Declaração dos nossos módulos
mod common;
mod config;
mod db;
mod handlers;
mod middleware;
mod models;
mod services;

use crate::config::AppState;
use crate::middleware::auth::auth_guard;

#[tokio::main]
async fn main() {
    // Inicializa o logger.
    tracing_subscriber::fmt().with_target(false).compact().init();

    // .expect() é bom aqui: se a configuração falhar, a aplicação não deve iniciar.
    let app_state = AppState::new()
        .await
        .expect("Falha ao inicializar o estado da aplicação.");

    // Roda as migrações do SQLx na inicialização (cria a tabela de documentos).
    sqlx::migrate!()
        .run(&app_state.db_pool)
        .await
        .expect("Falha ao rodar as migrações do banco de dados.");

    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    // Rotas de autenticação (públicas; o registro decide sozinho se exige gerente)
    let auth_routes = Router::new()
        .route("/register", post(handlers::auth::register))
        .route("/login", post(handlers::auth::login));

    // Rotas de usuário (protegidas pelo middleware)
    let usuario_routes = Router::new()
        .route("/me", get(handlers::auth::get_me))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    // Processos em fase de contratação
    let processo_routes = Router::new()
        .route("/",
               get(handlers::processos::list_processos)
               .post(handlers::processos::create_processo),
        )
        .route("/{nup}",
               get(handlers::processos::get_processo)
               .patch(handlers::processos::update_processo)
               .delete(handlers::processos::delete_processo),
        )
        .route("/{nup}/etapas", post(handlers::processos::add_etapa))
        .route("/{nup}/etapas/{data}", put(handlers::processos::edit_etapa))
        .route("/{nup}/empenhar", post(handlers::processos::empenhar))
        .route("/{nup}/arquivar", post(handlers::processos::arquivar))
        .route("/{nup}/linha-tempo", get(handlers::processos::linha_tempo))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    // Contratos empenhados
    let empenhado_routes = Router::new()
        .route("/", get(handlers::empenhados::list_empenhados))
        .route("/{nup}",
               get(handlers::empenhados::get_empenhado)
               .patch(handlers::empenhados::update_empenhado)
               .delete(handlers::empenhados::delete_empenhado),
        )
        .route("/{nup}/etapas", post(handlers::empenhados::add_etapa))
        .route("/{nup}/etapas/{data}", put(handlers::empenhados::edit_etapa))
        .route("/{nup}/arquivar", post(handlers::empenhados::arquivar))
        .route("/{nup}/linha-tempo", get(handlers::empenhados::linha_tempo))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    // Processos arquivados (leitura somente)
    let arquivado_routes = Router::new()
        .route("/", get(handlers::arquivados::list_arquivados))
        .route("/{nup}", get(handlers::arquivados::get_arquivado))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let relatorio_routes = Router::new()
        .route("/geral", get(handlers::relatorio::relatorio_geral))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    // Transições interrompidas (diários pendentes)
    let transicao_routes = Router::new()
        .route("/", get(handlers::transicoes::list_pendentes))
        .route("/{nup}/retomar", post(handlers::transicoes::retomar))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    // Combina tudo no router principal
    let app = Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .nest("/api/auth", auth_routes)
        .nest("/api/usuarios", usuario_routes)
        .nest("/api/processos", processo_routes)
        .nest("/api/empenhados", empenhado_routes)
        .nest("/api/arquivados", arquivado_routes)
        .nest("/api/relatorio", relatorio_routes)
        .nest("/api/transicoes", transicao_routes)
        .with_state(app_state);

    // Inicia o servidor
    let addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
    let listener = TcpListener::bind(&addr)
        .await
        .expect("Falha ao iniciar o listener TCP");
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr().unwrap());
    axum::serve(listener, app).await.expect("Erro no servidor Axum");
}
