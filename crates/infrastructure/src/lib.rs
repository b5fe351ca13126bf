//! 基础设施层实现。
//!
//! 提供领域层存储接口的两种实现：进程内内存存储，以及基于 sqlx 的 PostgreSQL 存储。

pub mod memory;
pub mod migrations;
pub mod repository;

pub use memory::{MemoryMessageRepository, MemoryParticipantRepository};
pub use migrations::MIGRATOR;
pub use repository::{create_pg_pool, PgMessageRepository, PgParticipantRepository};
