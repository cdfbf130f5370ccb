mod file;
mod smtp;

pub use file::FileTransport;
pub use smtp::{SmtpTransport, TlsConfig};

use crate::{Email, MailerError};
use lettre::Message;
use lettre::message::{MultiPart, SinglePart};

/// Convert an [`Email`] into a lettre [`Message`]. Shared by all transports.
pub(crate) fn build_message(email: Email) -> Result<Message, MailerError> {
    email.validate()?;

    let mut builder = Message::builder()
        .from(email.from.parse()?)
        .subject(email.subject);

    for to in email.to {
        builder = builder.to(to.parse()?);
    }

    if let Some(reply_to) = email.reply_to {
        builder = builder.reply_to(reply_to.parse()?);
    }

    let message = match (email.text_body, email.html_body) {
        (Some(text), Some(html)) => builder.multipart(
            MultiPart::alternative()
                .singlepart(SinglePart::plain(text))
                .singlepart(SinglePart::html(html)),
        )?,
        (None, Some(html)) => builder.singlepart(SinglePart::html(html))?,
        (Some(text), None) => builder.body(text)?,
        // validate() above guarantees at least one body
        (None, None) => unreachable!(),
    };

    Ok(message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_message() {
        let email = Email::builder()
            .from("sender@example.com".to_string())
            .to("recipient@example.com".to_string())
            .subject("Test Subject".to_string())
            .text_body("Hello".to_string())
            .build()
            .unwrap();

        assert!(build_message(email).is_ok());
    }

    #[test]
    fn test_build_message_rejects_bad_address() {
        let email = Email {
            to: vec!["not an address".to_string()],
            from: "sender@example.com".to_string(),
            reply_to: None,
            subject: "Test Subject".to_string(),
            text_body: Some("Hello".to_string()),
            html_body: None,
        };

        assert!(matches!(
            build_message(email),
            Err(MailerError::Address(_))
        ));
    }
}
