pub mod store;
pub use store::{Familia, Particao, RecordStore};
pub mod postgres;
pub use postgres::PgStore;
pub mod memoria;
pub use memoria::MemStore;
pub mod processo_repo;
pub use processo_repo::ProcessoRepository;
pub mod usuario_repo;
pub use usuario_repo::UsuarioRepository;
