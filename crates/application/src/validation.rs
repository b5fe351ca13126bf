//! 写接口的输入校验
//!
//! 所有写接口共用同一套流程：反序列化为带类型的输入结构，
//! 再通过 [`validate_input`] 得到字段级错误列表。

use std::borrow::Cow;

use domain::{value_objects::MAX_NAME_LEN, DomainError, FieldError, MessageKind};
use serde::Deserialize;
use validator::{Validate, ValidationError, ValidationErrors};

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct RegisterParticipantInput {
    #[serde(default)]
    #[validate(custom(function = "participant_name"))]
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewMessageInput {
    #[serde(default)]
    pub to: String,
    #[serde(default)]
    pub text: String,
    #[serde(default, rename = "type")]
    pub kind: String,
}

// 手写实现，让错误使用线上字段名 `type`
impl Validate for NewMessageInput {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if let Err(err) = not_blank(&self.to) {
            errors.add("to", err);
        }
        if let Err(err) = not_blank(&self.text) {
            errors.add("text", err);
        }
        if let Err(err) = client_message_kind(&self.kind) {
            errors.add("type", err);
        }

        if errors.errors().is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

impl NewMessageInput {
    /// 仅在校验通过后调用
    pub fn message_kind(&self) -> Result<MessageKind, DomainError> {
        self.kind.parse()
    }
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("required").with_message(Cow::Borrowed("is required")));
    }
    Ok(())
}

/// 与 `ParticipantName::parse` 一致：先去掉首尾空白再检查长度
fn participant_name(value: &str) -> Result<(), ValidationError> {
    not_blank(value)?;
    if value.trim().chars().count() > MAX_NAME_LEN {
        return Err(ValidationError::new("length").with_message(Cow::Borrowed("too long")));
    }
    Ok(())
}

/// 客户端只能发送公开消息或私信，`status` 保留给系统
fn client_message_kind(value: &str) -> Result<(), ValidationError> {
    match value.parse::<MessageKind>() {
        Ok(MessageKind::Message) | Ok(MessageKind::PrivateMessage) => Ok(()),
        _ => Err(ValidationError::new("one_of")
            .with_message(Cow::Borrowed("must be 'message' or 'private_message'"))),
    }
}

/// 收集字段级错误，按字段名排序
pub fn field_errors<T: Validate>(input: &T) -> Vec<FieldError> {
    let Err(errors) = input.validate() else {
        return Vec::new();
    };

    let mut fields: Vec<FieldError> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |err| {
                let message = err
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| err.code.to_string());
                FieldError::new(field.to_string(), message)
            })
        })
        .collect();
    fields.sort_by(|a, b| a.field.cmp(&b.field).then_with(|| a.message.cmp(&b.message)));
    fields
}

pub fn validate_input<T: Validate>(input: &T) -> Result<(), DomainError> {
    let errors = field_errors(input);
    if errors.is_empty() {
        Ok(())
    } else {
        Err(DomainError::validation(errors))
    }
}
