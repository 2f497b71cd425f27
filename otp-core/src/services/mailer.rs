#[cfg(feature = "mailer")]
pub use self::mailer_impl::*;

#[cfg(feature = "mailer")]
mod mailer_impl {
    use crate::{Error, OtpRecord, error::NotificationError, services::OtpNotifier};
    use async_trait::async_trait;
    use otp_mailer::prelude::*;

    /// [`OtpNotifier`] that emails the code through an `otp-mailer` transport.
    pub struct MailerOtpNotifier {
        transport: Box<dyn Mailer>,
        from_address: String,
    }

    impl MailerOtpNotifier {
        pub fn new(config: MailerConfig) -> Result<Self, Error> {
            let transport = config
                .build_transport()
                .map_err(|e| NotificationError::Build(e.to_string()))?;

            Ok(Self {
                transport,
                from_address: config.get_from_address(),
            })
        }

        pub fn from_env() -> Result<Self, Error> {
            let config =
                MailerConfig::from_env().map_err(|e| NotificationError::Build(e.to_string()))?;
            Self::new(config)
        }

        pub fn with_transport(transport: Box<dyn Mailer>, from_address: impl Into<String>) -> Self {
            Self {
                transport,
                from_address: from_address.into(),
            }
        }
    }

    #[async_trait]
    impl OtpNotifier for MailerOtpNotifier {
        async fn send_otp(&self, to: &str, record: &OtpRecord) -> Result<(), Error> {
            let valid_for = valid_for_minutes(record);

            let email = OtpEmail::build(&self.from_address, to, record.code().as_str(), valid_for)
                .map_err(|e| NotificationError::Build(e.to_string()))?;

            self.transport
                .send_email(email)
                .await
                .map_err(|e| NotificationError::Delivery(e.to_string()))?;

            Ok(())
        }
    }

    /// Whole minutes until expiry, rounded up and never below one. The default
    /// policy reads "10 minutes"; a custom policy states its own window.
    fn valid_for_minutes(record: &OtpRecord) -> i64 {
        let seconds = (record.expires_at() - record.created_at()).num_seconds();
        ((seconds + 59) / 60).max(1)
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use crate::{OtpPolicy, OtpType, UserId, otp::create_otp_record};
        use std::sync::{Arc, Mutex};

        #[derive(Clone, Default)]
        struct MockMailer {
            sent_emails: Arc<Mutex<Vec<Email>>>,
        }

        #[async_trait]
        impl Mailer for MockMailer {
            async fn send_email(&self, email: Email) -> Result<(), MailerError> {
                self.sent_emails.lock().unwrap().push(email);
                Ok(())
            }
        }

        struct DownMailer;

        #[async_trait]
        impl Mailer for DownMailer {
            async fn send_email(&self, _email: Email) -> Result<(), MailerError> {
                Err(MailerError::Config("relay unreachable".to_string()))
            }
        }

        #[tokio::test]
        async fn test_send_otp_email() {
            let mailer = MockMailer::default();
            let notifier =
                MailerOtpNotifier::with_transport(Box::new(mailer.clone()), "noreply@example.com");
            let record = create_otp_record(UserId::new("U1"), None).unwrap();

            notifier.send_otp("a@x.com", &record).await.unwrap();

            let sent = mailer.sent_emails.lock().unwrap();
            assert_eq!(sent.len(), 1);
            assert_eq!(sent[0].to, vec!["a@x.com"]);
            assert_eq!(sent[0].from, "noreply@example.com");
            assert_eq!(sent[0].subject, "Your Verification Code");
            assert_eq!(
                sent[0].text_body.as_deref().unwrap(),
                format!(
                    "Your OTP is {}. It will expire in 10 minutes.",
                    record.code()
                )
            );
        }

        #[tokio::test]
        async fn test_transport_failure_is_notification_error() {
            let notifier =
                MailerOtpNotifier::with_transport(Box::new(DownMailer), "noreply@example.com");
            let record = create_otp_record(UserId::new("U1"), None).unwrap();

            let err = notifier.send_otp("a@x.com", &record).await.unwrap_err();
            assert!(matches!(
                err,
                Error::Notification(NotificationError::Delivery(_))
            ));
        }

        #[tokio::test]
        async fn test_invalid_sender_is_build_error() {
            let notifier = MailerOtpNotifier::with_transport(Box::new(DownMailer), "");
            let record = create_otp_record(UserId::new("U1"), None).unwrap();

            let err = notifier.send_otp("a@x.com", &record).await.unwrap_err();
            assert!(matches!(err, Error::Notification(NotificationError::Build(_))));
        }

        fn record_valid_for(validity: chrono::Duration) -> OtpRecord {
            let policy = OtpPolicy::default().with_validity(validity);
            OtpRecord::create(UserId::new("U1"), OtpType::EmailVerification, &policy).unwrap()
        }

        #[test]
        fn test_minutes_round_up_and_never_reach_zero() {
            use chrono::Duration;

            assert_eq!(valid_for_minutes(&record_valid_for(Duration::minutes(10))), 10);
            assert_eq!(valid_for_minutes(&record_valid_for(Duration::seconds(90))), 2);
            assert_eq!(valid_for_minutes(&record_valid_for(Duration::seconds(30))), 1);
        }

        #[tokio::test]
        async fn test_sub_minute_policy_states_one_minute() {
            let mailer = MockMailer::default();
            let notifier =
                MailerOtpNotifier::with_transport(Box::new(mailer.clone()), "noreply@example.com");
            let record = record_valid_for(chrono::Duration::seconds(30));

            notifier.send_otp("a@x.com", &record).await.unwrap();

            let sent = mailer.sent_emails.lock().unwrap();
            assert_eq!(
                sent[0].text_body.as_deref().unwrap(),
                format!("Your OTP is {}. It will expire in 1 minute.", record.code())
            );
        }

        #[test]
        fn test_new_with_file_transport() {
            let dir = tempfile::tempdir().unwrap();
            let config = MailerConfig {
                transport: otp_mailer::config::TransportConfig::File {
                    output_dir: dir.path().to_path_buf(),
                },
                from_address: "otp@example.com".to_string(),
                from_name: Some("Accounts".to_string()),
            };
            assert!(MailerOtpNotifier::new(config).is_ok());
        }
    }
}
