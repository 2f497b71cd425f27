use crate::{Email, MailerError};

/// Subject line used for every passcode email.
pub const OTP_EMAIL_SUBJECT: &str = "Your Verification Code";

/// The plain-text passcode notification.
pub struct OtpEmail;

impl OtpEmail {
    pub fn build(
        from: &str,
        to: &str,
        code: &str,
        valid_for_minutes: i64,
    ) -> Result<Email, MailerError> {
        Email::builder()
            .from(from)
            .to(to)
            .subject(OTP_EMAIL_SUBJECT)
            .text_body(Self::text_body(code, valid_for_minutes))
            .build()
    }

    pub fn text_body(code: &str, valid_for_minutes: i64) -> String {
        let unit = if valid_for_minutes == 1 { "minute" } else { "minutes" };
        format!("Your OTP is {code}. It will expire in {valid_for_minutes} {unit}.")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_otp_email() {
        let email = OtpEmail::build("noreply@example.com", "a@x.com", "042917", 10).unwrap();

        assert_eq!(email.to, vec!["a@x.com"]);
        assert_eq!(email.subject, "Your Verification Code");
        assert_eq!(
            email.text_body.as_deref(),
            Some("Your OTP is 042917. It will expire in 10 minutes.")
        );
        assert!(email.html_body.is_none());
    }

    #[test]
    fn test_single_minute_wording() {
        assert_eq!(
            OtpEmail::text_body("042917", 1),
            "Your OTP is 042917. It will expire in 1 minute."
        );
    }

    #[test]
    fn test_otp_email_requires_sender() {
        assert!(OtpEmail::build("", "a@x.com", "123456", 10).is_err());
    }
}
