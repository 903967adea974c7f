//! database (db) union structure.
pub mod memory;
pub mod postgres;

use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;

use crate::post::PostRepository;
use crate::profile::ProfileRepository;
use crate::user::UserRepository;

pub const DEFAULT_CREDENTIALS: &str = "postgres";
pub const DEFAULT_DATABASE_NAME: &str = "devhub";
pub const DEFAULT_POOL_SIZE: u32 = 10;

/// Custom db structure to pass to Axum.
#[derive(Clone)]
pub struct Database {
    pub users: Arc<dyn UserRepository>,
    pub profiles: Arc<dyn ProfileRepository>,
    pub posts: Arc<dyn PostRepository>,
}

impl Database {
    /// Init PostgreSQL connections and run migrations.
    pub async fn new(
        hostname: &str,
        username: &str,
        password: &str,
        db: &str,
        pool: u32,
    ) -> Result<Self, sqlx::Error> {
        let addr = format!("postgres://{username}:{password}@{hostname}/{db}");
        let pool = PgPoolOptions::new().max_connections(pool);
        let postgres = pool.connect(&addr).await?;

        tracing::info!(%hostname, %db, "postgres connected");

        // execute migrations scripts on start.
        sqlx::migrate!().run(&postgres).await?;

        let store = Arc::new(postgres::PgStore::new(postgres));
        Ok(Self {
            users: store.clone(),
            profiles: store.clone(),
            posts: store,
        })
    }

    /// Process-local storage. Data is lost on restart.
    pub fn memory(store: memory::MemoryStore) -> Self {
        let store = Arc::new(store);
        Self {
            users: store.clone(),
            profiles: store.clone(),
            posts: store,
        }
    }
}
