use crate::transports::TlsConfig;
use crate::{FileTransport, Mailer, MailerError, SendmailTransport, SmtpTransport};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

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
        username: Option<String>,
        password: Option<String>,
        tls: Option<TlsType>,
    },
    File {
        output_dir: PathBuf,
    },
    Sendmail {
        command: Option<String>,
    },
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
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

impl std::str::FromStr for TlsType {
    type Err = MailerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "none" => Ok(TlsType::None),
            "starttls" => Ok(TlsType::StartTls),
            "tls" => Ok(TlsType::Tls),
            other => Err(MailerError::Config(format!(
                "MAILER_SMTP_TLS must be one of none, starttls, tls (got {other})"
            ))),
        }
    }
}

impl MailerConfig {
    pub fn from_env() -> Result<Self, MailerError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, MailerError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let transport = if let Some(host) = lookup("MAILER_SMTP_HOST") {
            let port = lookup("MAILER_SMTP_PORT")
                .map(|p| {
                    p.parse::<u16>().map_err(|_| {
                        MailerError::Config(format!("MAILER_SMTP_PORT is not a valid port: {p}"))
                    })
                })
                .transpose()?;
            let tls = lookup("MAILER_SMTP_TLS")
                .map(|t| t.parse::<TlsType>())
                .transpose()?;

            TransportConfig::Smtp {
                host,
                port,
                username: lookup("MAILER_SMTP_USERNAME"),
                password: lookup("MAILER_SMTP_PASSWORD"),
                tls,
            }
        } else if let Some(output_dir) = lookup("MAILER_FILE_OUTPUT_DIR") {
            TransportConfig::File {
                output_dir: PathBuf::from(output_dir),
            }
        } else if lookup("MAILER_SENDMAIL").is_some() {
            TransportConfig::Sendmail {
                command: lookup("MAILER_SENDMAIL_COMMAND"),
            }
        } else {
            // Default to file transport for development
            TransportConfig::File {
                output_dir: PathBuf::from("./emails"),
            }
        };

        Ok(Self {
            transport,
            from_address: lookup("MAILER_FROM_ADDRESS")
                .unwrap_or_else(|| "noreply@example.com".to_string()),
            from_name: lookup("MAILER_FROM_NAME"),
        })
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
                let mut builder = SmtpTransport::builder(host);

                if let Some(port) = port {
                    builder = builder.port(*port);
                }

                if let (Some(username), Some(password)) = (username, password) {
                    builder = builder.credentials(username, password);
                }

                if let Some(tls) = tls {
                    builder = builder.tls((*tls).into());
                }

                tracing::info!(host = %host, "Using SMTP mail transport");
                Ok(Box::new(builder.build()?))
            }
            TransportConfig::File { output_dir } => {
                tracing::info!(output_dir = %output_dir.display(), "Using file mail transport");
                Ok(Box::new(FileTransport::new(output_dir)?))
            }
            TransportConfig::Sendmail { command } => {
                tracing::info!("Using sendmail mail transport");
                if let Some(command) = command {
                    Ok(Box::new(SendmailTransport::with_command(command)))
                } else {
                    Ok(Box::new(SendmailTransport::new()))
                }
            }
        }
    }

    pub fn get_from_address(&self) -> String {
        if let Some(name) = &self.from_name {
            format!("{} <{}>", name, self.from_address)
        } else {
            self.from_address.clone()
        }
    }
}

impl Default for MailerConfig {
    fn default() -> Self {
        Self {
            transport: TransportConfig::File {
                output_dir: PathBuf::from("./emails"),
            },
            from_address: "noreply@example.com".to_string(),
            from_name: None,
        }
    }
}
