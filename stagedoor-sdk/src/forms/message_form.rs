use super::rules::{not_blank, schema_errors};
use super::{FieldErrors, Validate};

pub const MESSAGE_MAX: usize = 5000;

/// Composer of the active thread. Validates to the trimmed body.
#[derive(Debug, Clone, Default, PartialEq, Eq, validator::Validate)]
pub struct MessageForm {
    #[validate(custom(function = "not_blank", message = "Message is required"))]
    pub body: String,
}

impl MessageForm {
    /// Empty the composer after a successful send.
    pub fn clear(&mut self) {
        self.body.clear();
    }
}

impl Validate for MessageForm {
    type Output = String;

    fn validate(&self) -> Result<String, FieldErrors> {
        let body = self.body.trim();
        let mut errors = schema_errors(self);
        errors.check(
            "body",
            body.chars().count() <= MESSAGE_MAX,
            format!("Message may not be longer than {MESSAGE_MAX} characters"),
        );
        errors.into_result()?;
        Ok(body.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whitespace_only_is_empty() {
        let form = MessageForm { body: " \n ".into() };
        assert_eq!(form.validate().unwrap_err().first("body"), Some("Message is required"));
    }

    #[test]
    fn body_is_trimmed() {
        let form = MessageForm { body: "  See you at the audition \n".into() };
        assert_eq!(form.validate().unwrap(), "See you at the audition");
    }
}
