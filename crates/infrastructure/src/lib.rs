//! 基础设施层。
//!
//! PostgreSQL 持久化适配器：把应用层的仓库 trait 落到 sqlx 上。

pub mod repository;

pub use repository::{create_pg_pool, PgMessageRepository, PgParticipantRepository};
