//! SMTP 邮件发送

use application::mailer::{Mailer, MailerError};
use async_trait::async_trait;
use config::EmailConfig;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    pub fn new(config: &EmailConfig) -> Result<Self, MailerError> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&config.smtp_host)
            .map_err(|err| MailerError::Transport(err.to_string()))?
            .port(config.smtp_port)
            .credentials(Credentials::new(
                config.username.clone(),
                config.password.clone(),
            ))
            .build();

        let from = config
            .from
            .parse::<Mailbox>()
            .map_err(|err| MailerError::Build(err.to_string()))?;

        Ok(Self { transport, from })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send_verification_code(
        &self,
        to: &str,
        nickname: &str,
        code: &str,
    ) -> Result<(), MailerError> {
        let to = to
            .parse::<Mailbox>()
            .map_err(|err| MailerError::Build(err.to_string()))?;

        let body = format!(
            "Hi {},\n\nYour Readmeow verification code is: {}\n\n\
             The code expires soon, enter it to finish signing up.\n",
            nickname, code
        );

        let message = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject("Readmeow verification code")
            .body(body)
            .map_err(|err| MailerError::Build(err.to_string()))?;

        self.transport
            .send(message)
            .await
            .map_err(|err| MailerError::Transport(err.to_string()))?;
        Ok(())
    }
}
