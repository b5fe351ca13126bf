//! Web API 层。
//!
//! 提供 Axum 路由，将 HTTP 请求委托给应用层的用例服务。

mod error;
mod identity;
mod routes;
mod state;

pub use error::{ApiError, ErrorBody};
pub use identity::{Identity, USER_HEADER};
pub use routes::router;
pub use state::AppState;
