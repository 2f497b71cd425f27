use crate::{Email, MailerError};
use async_trait::async_trait;

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send_email(&self, email: Email) -> Result<(), MailerError>;
}

#[async_trait]
impl<M: Mailer + ?Sized> Mailer for Box<M> {
    async fn send_email(&self, email: Email) -> Result<(), MailerError> {
        (**self).send_email(email).await
    }
}

/// Wraps a transport and logs every delivery attempt.
#[derive(Debug, Clone)]
pub struct MailerService<T: Mailer> {
    transport: T,
}

impl<T: Mailer> MailerService<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub async fn send(&self, email: Email) -> Result<(), MailerError> {
        let recipients = email.to.join(", ");
        match self.transport.send_email(email).await {
            Ok(()) => {
                tracing::debug!(to = %recipients, "Email handed to transport");
                Ok(())
            }
            Err(e) => {
                tracing::warn!(to = %recipients, error = %e, "Email transport rejected message");
                Err(e)
            }
        }
    }
}

#[async_trait]
impl<T: Mailer> Mailer for MailerService<T> {
    async fn send_email(&self, email: Email) -> Result<(), MailerError> {
        self.send(email).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    struct RecordingMailer {
        sent: Arc<Mutex<Vec<Email>>>,
    }

    #[async_trait]
    impl Mailer for RecordingMailer {
        async fn send_email(&self, email: Email) -> Result<(), MailerError> {
            self.sent.lock().unwrap().push(email);
            Ok(())
        }
    }

    struct RejectingMailer;

    #[async_trait]
    impl Mailer for RejectingMailer {
        async fn send_email(&self, _email: Email) -> Result<(), MailerError> {
            Err(MailerError::Builder("relay refused".to_string()))
        }
    }

    fn email() -> Email {
        Email::builder()
            .from("noreply@example.com")
            .to("user@example.com")
            .subject("Hello")
            .text_body("Hi")
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn test_service_forwards_to_transport() {
        let transport = RecordingMailer::default();
        let sent = transport.sent.clone();
        let service = MailerService::new(transport);

        service.send(email()).await.unwrap();

        let sent = sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, vec!["user@example.com"]);
    }

    #[tokio::test]
    async fn test_service_propagates_transport_error() {
        let service = MailerService::new(RejectingMailer);
        let result = service.send(email()).await;
        assert!(matches!(result, Err(MailerError::Builder(_))));
    }

    #[tokio::test]
    async fn test_boxed_mailer_dispatches() {
        let boxed: Box<dyn Mailer> = Box::new(RecordingMailer::default());
        assert!(boxed.send_email(email()).await.is_ok());
    }
}
