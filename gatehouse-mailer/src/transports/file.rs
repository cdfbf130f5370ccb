use crate::{Email, Mailer, MailerError};
use async_trait::async_trait;
use lettre::transport::file::AsyncFileTransport;
use lettre::{AsyncTransport, Tokio1Executor};
use std::path::{Path, PathBuf};

/// Writes each message to a file instead of sending it. For development and
/// tests.
pub struct FileTransport {
    transport: AsyncFileTransport<Tokio1Executor>,
    output_dir: PathBuf,
}

impl FileTransport {
    pub fn new<P: AsRef<Path>>(output_dir: P) -> Result<Self, MailerError> {
        let output_dir = output_dir.as_ref().to_path_buf();

        if !output_dir.exists() {
            std::fs::create_dir_all(&output_dir)?;
        }

        let transport = AsyncFileTransport::new(&output_dir);

        Ok(Self {
            transport,
            output_dir,
        })
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }
}

#[async_trait]
impl Mailer for FileTransport {
    async fn send_email(&self, email: Email) -> Result<(), MailerError> {
        let message = super::build_message(email)?;
        self.transport.send(message).await?;
        Ok(())
    }
}
