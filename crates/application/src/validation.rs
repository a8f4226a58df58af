//! 操作输入的 schema 校验。
//!
//! 单次校验收集全部违反项；`ValidationErrors` 底层是映射，
//! 所以按显式声明的字段顺序拉平成有序消息列表。

use domain::DomainError;
use validator::{Validate, ValidationErrors};

/// 校验输入；失败时返回按 `order` 排列的全部错误消息。
pub fn check<T: Validate>(input: &T, order: &[&str]) -> Result<(), DomainError> {
    match input.validate() {
        Ok(()) => Ok(()),
        Err(errors) => Err(DomainError::validation(ordered_messages(&errors, order))),
    }
}

fn ordered_messages(errors: &ValidationErrors, order: &[&str]) -> Vec<String> {
    let fields = errors.field_errors();
    let mut messages = Vec::new();
    for field in order {
        if let Some(list) = fields.get(*field) {
            for error in list.iter() {
                match &error.message {
                    Some(text) => messages.push(text.to_string()),
                    None => messages.push(format!("{field} is invalid")),
                }
            }
        }
    }
    messages
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[derive(Debug, Validate)]
    struct Sample {
        #[validate(length(min = 1, message = "first must not be empty"))]
        first: String,
        #[validate(length(min = 1, message = "second must not be empty"))]
        second: String,
    }

    #[test]
    fn collects_all_violations_in_declared_order() {
        let sample = Sample {
            first: String::new(),
            second: String::new(),
        };
        let err = check(&sample, &["first", "second"]).unwrap_err();
        match err {
            DomainError::Validation { errors } => {
                assert_eq!(
                    errors,
                    vec![
                        "first must not be empty".to_string(),
                        "second must not be empty".to_string()
                    ]
                );
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn valid_input_passes() {
        let sample = Sample {
            first: "a".into(),
            second: "b".into(),
        };
        assert!(check(&sample, &["first", "second"]).is_ok());
    }
}
