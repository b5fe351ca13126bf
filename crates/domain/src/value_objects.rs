use std::fmt;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::errors::DomainError;

/// 统一的时间戳类型。
pub type Timestamp = OffsetDateTime;

/// 参与者名称的最大字符数。
pub const MAX_NAME_LEN: usize = 64;

/// 经过验证的参与者名称。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ParticipantName(String);

impl ParticipantName {
    pub fn parse(value: impl Into<String>) -> Result<Self, DomainError> {
        let value = value.into().trim().to_owned();
        if value.is_empty() {
            return Err(DomainError::invalid_argument("name", "cannot be empty"));
        }
        if value.chars().count() > MAX_NAME_LEN {
            return Err(DomainError::invalid_argument("name", "too long"));
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ParticipantName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for ParticipantName {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<ParticipantName> for String {
    fn from(value: ParticipantName) -> Self {
        value.0
    }
}

impl AsRef<str> for ParticipantName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// 消息查询条数上限，必须为正整数。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageLimit(usize);

impl MessageLimit {
    pub fn new(value: i64) -> Result<Self, DomainError> {
        if value <= 0 {
            return Err(DomainError::invalid_argument(
                "limit",
                "must be a positive integer",
            ));
        }
        let value = usize::try_from(value)
            .map_err(|_| DomainError::invalid_argument("limit", "out of range"))?;
        Ok(Self(value))
    }

    /// 解析查询字符串中的原始值；超出范围的正整数按最大值处理。
    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        let invalid = || DomainError::invalid_argument("limit", "must be a positive integer");
        let digits = raw.trim();
        let digits = digits.strip_prefix('+').unwrap_or(digits);
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }

        // 全是数字时解析失败只可能是溢出
        let value = digits.parse::<u64>().unwrap_or(u64::MAX);
        if value == 0 {
            return Err(invalid());
        }
        Ok(Self(usize::try_from(value).unwrap_or(usize::MAX)))
    }

    pub fn get(self) -> usize {
        self.0
    }
}

impl fmt::Display for MessageLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
