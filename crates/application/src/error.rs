use domain::{DomainError, RepositoryError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApplicationError {
    #[error("domain error: {0}")]
    Domain(#[from] DomainError),
    #[error("infrastructure error: {message}")]
    Infrastructure {
        message: String,
        #[source]
        source: Option<RepositoryError>,
    },
}

impl ApplicationError {
    pub fn is_infrastructure(&self) -> bool {
        matches!(self, ApplicationError::Infrastructure { .. })
    }
}

/// 未被服务显式翻译的存储错误都视为基础设施故障
impl From<RepositoryError> for ApplicationError {
    fn from(value: RepositoryError) -> Self {
        ApplicationError::Infrastructure {
            message: value.to_string(),
            source: Some(value),
        }
    }
}
