use crate::transports::TlsConfig;
use crate::{FileTransport, Mailer, MailerError, SmtpTransport};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Mail delivery configuration, read once at startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailerConfig {
    pub transport: TransportConfig,
    pub from_address: String,
    pub from_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TransportConfig {
    Smtp {
        host: String,
        port: Option<u16>,
        username: String,
        password: String,
        tls: Option<TlsType>,
    },
    File {
        output_dir: PathBuf,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TlsType {
    None,
    StartTls,
    Tls,
}

impl From<TlsType> for TlsConfig {
    fn from(tls_type: TlsType) -> Self {
        match tls_type {
            TlsType::None => TlsConfig::None,
            TlsType::StartTls => TlsConfig::StartTls,
            TlsType::Tls => TlsConfig::Tls,
        }
    }
}

impl MailerConfig {
    /// Read mail configuration from the environment.
    ///
    /// Requires either an SMTP relay (`GATEHOUSE_SMTP_HOST` plus credentials)
    /// or an explicit file output directory (`GATEHOUSE_MAIL_FILE_DIR`).
    /// Neither being present is a startup-fatal configuration error — the
    /// service cannot run a registration flow without a way to reach inboxes.
    pub fn from_env() -> Result<Self, MailerError> {
        let transport = if let Ok(host) = std::env::var("GATEHOUSE_SMTP_HOST") {
            let username = std::env::var("GATEHOUSE_SMTP_USERNAME").map_err(|_| {
                MailerError::Config("GATEHOUSE_SMTP_USERNAME is required with SMTP".to_string())
            })?;
            let password = std::env::var("GATEHOUSE_SMTP_PASSWORD").map_err(|_| {
                MailerError::Config("GATEHOUSE_SMTP_PASSWORD is required with SMTP".to_string())
            })?;

            TransportConfig::Smtp {
                host,
                port: std::env::var("GATEHOUSE_SMTP_PORT")
                    .ok()
                    .and_then(|p| p.parse().ok()),
                username,
                password,
                tls: std::env::var("GATEHOUSE_SMTP_TLS").ok().and_then(|t| {
                    match t.to_lowercase().as_str() {
                        "none" => Some(TlsType::None),
                        "starttls" => Some(TlsType::StartTls),
                        "tls" => Some(TlsType::Tls),
                        _ => None,
                    }
                }),
            }
        } else if let Ok(output_dir) = std::env::var("GATEHOUSE_MAIL_FILE_DIR") {
            TransportConfig::File {
                output_dir: PathBuf::from(output_dir),
            }
        } else {
            return Err(MailerError::Config(
                "mail transport not configured; set GATEHOUSE_SMTP_HOST or GATEHOUSE_MAIL_FILE_DIR"
                    .to_string(),
            ));
        };

        Ok(Self {
            transport,
            from_address: std::env::var("GATEHOUSE_MAIL_FROM")
                .unwrap_or_else(|_| "noreply@localhost".to_string()),
            from_name: std::env::var("GATEHOUSE_MAIL_FROM_NAME").ok(),
        })
    }

    /// The `From:` header value, with the display name when configured.
    pub fn get_from_address(&self) -> String {
        match &self.from_name {
            Some(name) => format!("{name} <{}>", self.from_address),
            None => self.from_address.clone(),
        }
    }

    pub fn build_transport(&self) -> Result<Box<dyn Mailer>, MailerError> {
        match &self.transport {
            TransportConfig::Smtp {
                host,
                port,
                username,
                password,
                tls,
            } => {
                let mut builder = SmtpTransport::builder(host).credentials(username, password);

                if let Some(port) = port {
                    builder = builder.port(*port);
                }

                if let Some(tls) = tls {
                    builder = builder.tls(tls.clone().into());
                }

                Ok(Box::new(builder.build()?))
            }
            TransportConfig::File { output_dir } => {
                Ok(Box::new(FileTransport::new(output_dir)?))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_address_with_display_name() {
        let config = MailerConfig {
            transport: TransportConfig::File {
                output_dir: PathBuf::from("/tmp/mail"),
            },
            from_address: "noreply@example.com".to_string(),
            from_name: Some("Gatehouse".to_string()),
        };

        assert_eq!(config.get_from_address(), "Gatehouse <noreply@example.com>");
    }

    #[test]
    fn test_build_transport_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = MailerConfig {
            transport: TransportConfig::File {
                output_dir: dir.path().to_path_buf(),
            },
            from_address: "noreply@example.com".to_string(),
            from_name: None,
        };

        assert!(config.build_transport().is_ok());
    }
}
