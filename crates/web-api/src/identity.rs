use std::convert::Infallible;

use axum::{extract::FromRequestParts, http::request::Parts};

/// 携带调用方身份的请求头
pub const USER_HEADER: &str = "User";

/// 调用方自报的参与者名称；缺失或为空时为 `None`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity(pub Option<String>);

impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // 允许 UTF-8 名称（例如带重音的名字）
        let name = parts
            .headers
            .get(USER_HEADER)
            .and_then(|value| std::str::from_utf8(value.as_bytes()).ok())
            .map(|value| value.trim().to_owned())
            .filter(|value| !value.is_empty());
        Ok(Self(name))
    }
}
