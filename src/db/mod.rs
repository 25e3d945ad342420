use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

pub mod byte_array;
pub mod competitions;
pub mod order_executions;
pub mod orders;

#[derive(Debug, Clone)]
pub struct Postgres {
    pub pool: PgPool,
}

impl Postgres {
    pub async fn connect(url: &str, max_connections: u32) -> sqlx::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(url)
            .await?;
        Ok(Self { pool })
    }

    /// Builds the pool without touching the network; connections are only
    /// opened on first use.
    pub fn connect_lazy(url: &str, max_connections: u32) -> sqlx::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect_lazy(url)?;
        Ok(Self { pool })
    }
}
