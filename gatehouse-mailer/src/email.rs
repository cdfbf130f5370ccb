use crate::MailerError;
use serde::{Deserialize, Serialize};

/// An outgoing email message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Email {
    pub to: Vec<String>,
    pub from: String,
    pub reply_to: Option<String>,
    pub subject: String,
    pub text_body: Option<String>,
    pub html_body: Option<String>,
}

impl Email {
    pub fn builder() -> EmailBuilder {
        EmailBuilder::default()
    }

    pub fn validate(&self) -> Result<(), MailerError> {
        if self.to.is_empty() {
            return Err(MailerError::Builder(
                "At least one recipient is required".to_string(),
            ));
        }

        if self.from.is_empty() {
            return Err(MailerError::Builder("From address is required".to_string()));
        }

        if self.subject.is_empty() {
            return Err(MailerError::Builder("Subject is required".to_string()));
        }

        if self.text_body.is_none() && self.html_body.is_none() {
            return Err(MailerError::Builder(
                "Either a text or an HTML body is required".to_string(),
            ));
        }

        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct EmailBuilder {
    to: Vec<String>,
    from: Option<String>,
    reply_to: Option<String>,
    subject: Option<String>,
    text_body: Option<String>,
    html_body: Option<String>,
}

impl EmailBuilder {
    pub fn to(mut self, to: String) -> Self {
        self.to.push(to);
        self
    }

    pub fn from(mut self, from: String) -> Self {
        self.from = Some(from);
        self
    }

    pub fn reply_to(mut self, reply_to: String) -> Self {
        self.reply_to = Some(reply_to);
        self
    }

    pub fn subject(mut self, subject: String) -> Self {
        self.subject = Some(subject);
        self
    }

    pub fn text_body(mut self, text_body: String) -> Self {
        self.text_body = Some(text_body);
        self
    }

    pub fn html_body(mut self, html_body: String) -> Self {
        self.html_body = Some(html_body);
        self
    }

    pub fn build(self) -> Result<Email, MailerError> {
        let email = Email {
            to: self.to,
            from: self
                .from
                .ok_or_else(|| MailerError::Builder("From address is required".to_string()))?,
            reply_to: self.reply_to,
            subject: self
                .subject
                .ok_or_else(|| MailerError::Builder("Subject is required".to_string()))?,
            text_body: self.text_body,
            html_body: self.html_body,
        };

        email.validate()?;
        Ok(email)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_builds_valid_email() {
        let email = Email::builder()
            .from("noreply@example.com".to_string())
            .to("player@example.com".to_string())
            .subject("Account Verification".to_string())
            .text_body("confirm here".to_string())
            .build()
            .unwrap();

        assert_eq!(email.to, vec!["player@example.com"]);
        assert!(email.html_body.is_none());
    }

    #[test]
    fn test_builder_rejects_incomplete_email() {
        // No recipient
        let result = Email::builder()
            .from("noreply@example.com".to_string())
            .subject("Subject".to_string())
            .text_body("body".to_string())
            .build();
        assert!(result.is_err());

        // No body at all
        let result = Email::builder()
            .from("noreply@example.com".to_string())
            .to("player@example.com".to_string())
            .subject("Subject".to_string())
            .build();
        assert!(result.is_err());
    }
}
