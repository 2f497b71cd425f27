pub mod config;
pub mod email;
pub mod email_types;
pub mod error;
pub mod mailer;
pub mod transports;

pub use config::MailerConfig;
pub use email::{Email, EmailBuilder};
pub use email_types::OtpEmail;
pub use error::MailerError;
pub use mailer::{Mailer, MailerService};
pub use transports::{FileTransport, SendmailTransport, SmtpTransport};

pub mod prelude {
    pub use crate::{
        Email, EmailBuilder, FileTransport, Mailer, MailerConfig, MailerError, MailerService,
        OtpEmail, SendmailTransport, SmtpTransport,
    };
}
