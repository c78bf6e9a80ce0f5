pub mod auth;
pub use auth::AuthService;
pub mod processo_service;
pub use processo_service::ProcessoService;
pub mod relatorio_service;
pub use relatorio_service::RelatorioService;
