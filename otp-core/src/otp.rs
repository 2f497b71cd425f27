//! One-time passcode issuance
//!
//! An [`OtpRecord`] is created once per resolved request, persisted once and
//! never mutated. Expiry is enforced downstream by whoever verifies the code.
//!
//! | Field        | Description                                          |
//! | ------------ | ---------------------------------------------------- |
//! | `id`         | Prefixed unique identifier (`otp_...`)               |
//! | `user_id`    | The user the code was issued to                      |
//! | `code`       | Fixed-length decimal string                          |
//! | `otp_type`   | Purpose tag, e.g. `email_verification`               |
//! | `created_at` | Issue time                                           |
//! | `expires_at` | `created_at` plus the policy validity window         |

use std::num::NonZeroUsize;

use chrono::{DateTime, Duration, SubsecRound, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{
    Error, UserId,
    id::{IdGenerator, OsRngIdGenerator},
};

/// Default number of digits in a code.
pub const DEFAULT_CODE_LENGTH: NonZeroUsize = match NonZeroUsize::new(6) {
    Some(n) => n,
    None => unreachable!(),
};

/// Default validity window for a code.
pub const DEFAULT_VALIDITY: Duration = Duration::minutes(10);

const OTP_ID_PREFIX: &str = "otp";

/// A decimal passcode. `Debug` is redacted so codes do not end up in logs.
#[derive(Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct OtpCode(String);

impl OtpCode {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl std::fmt::Debug for OtpCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "OtpCode(<{} digits>)", self.0.len())
    }
}

impl std::fmt::Display for OtpCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Generate a code of `length` digits from the thread-local generator.
pub fn generate_code(length: NonZeroUsize) -> OtpCode {
    generate_code_with_rng(&mut rand::rng(), length)
}

/// Generate a code of `length` digits, each drawn independently and uniformly from 0-9.
pub fn generate_code_with_rng<R: Rng>(rng: &mut R, length: NonZeroUsize) -> OtpCode {
    let code = (0..length.get())
        .map(|_| char::from(b'0' + rng.random_range(0..10u8)))
        .collect();
    OtpCode(code)
}

/// What a code is for. Unknown tags are carried through untouched.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum OtpType {
    #[default]
    EmailVerification,
    PasswordReset,
    Login,
    Other(String),
}

impl OtpType {
    pub fn as_str(&self) -> &str {
        match self {
            OtpType::EmailVerification => "email_verification",
            OtpType::PasswordReset => "password_reset",
            OtpType::Login => "login",
            OtpType::Other(s) => s,
        }
    }
}

impl From<String> for OtpType {
    fn from(s: String) -> Self {
        match s.as_str() {
            "email_verification" => OtpType::EmailVerification,
            "password_reset" => OtpType::PasswordReset,
            "login" => OtpType::Login,
            _ => OtpType::Other(s),
        }
    }
}

impl From<&str> for OtpType {
    fn from(s: &str) -> Self {
        OtpType::from(s.to_string())
    }
}

impl std::fmt::Display for OtpType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for OtpType {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for OtpType {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(OtpType::from)
    }
}

/// Code length and validity window used when issuing records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OtpPolicy {
    pub code_length: NonZeroUsize,
    pub validity: Duration,
}

impl OtpPolicy {
    pub fn with_code_length(mut self, code_length: NonZeroUsize) -> Self {
        self.code_length = code_length;
        self
    }

    pub fn with_validity(mut self, validity: Duration) -> Self {
        self.validity = validity;
        self
    }

    /// Validity rounded down to whole minutes, as shown to users.
    pub fn validity_minutes(&self) -> i64 {
        self.validity.num_minutes()
    }
}

impl Default for OtpPolicy {
    fn default() -> Self {
        Self {
            code_length: DEFAULT_CODE_LENGTH,
            validity: DEFAULT_VALIDITY,
        }
    }
}

/// An issued passcode, ready to be persisted.
///
/// Timestamps carry microsecond precision so a record read back from storage
/// compares equal to the one issued.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OtpRecord {
    id: String,
    user_id: UserId,
    code: OtpCode,
    #[serde(rename = "type")]
    otp_type: OtpType,
    created_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

impl OtpRecord {
    /// Issue a new record for `user_id`.
    ///
    /// The caller is responsible for having resolved `user_id` against the
    /// user store. Fails only when the identifier entropy source is unavailable.
    pub fn create(user_id: UserId, otp_type: OtpType, policy: &OtpPolicy) -> Result<Self, Error> {
        Self::create_with(user_id, otp_type, policy, &OsRngIdGenerator)
    }

    /// Like [`OtpRecord::create`], drawing the id from `ids`.
    pub fn create_with(
        user_id: UserId,
        otp_type: OtpType,
        policy: &OtpPolicy,
        ids: &dyn IdGenerator,
    ) -> Result<Self, Error> {
        let id = ids.generate(OTP_ID_PREFIX)?;
        let code = generate_code(policy.code_length);
        let created_at = Utc::now().trunc_subsecs(6);

        Ok(Self {
            id,
            user_id,
            code,
            otp_type,
            created_at,
            expires_at: created_at + policy.validity,
        })
    }

    /// Rebuild a record read back from storage.
    pub fn from_storage(
        id: String,
        user_id: UserId,
        code: String,
        otp_type: OtpType,
        created_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            user_id,
            code: OtpCode(code),
            otp_type,
            created_at,
            expires_at,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn code(&self) -> &OtpCode {
        &self.code
    }

    pub fn otp_type(&self) -> &OtpType {
        &self.otp_type
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// Issue a record with the default policy; `otp_type` defaults to email verification.
pub fn create_otp_record(user_id: UserId, otp_type: Option<OtpType>) -> Result<OtpRecord, Error> {
    OtpRecord::create(user_id, otp_type.unwrap_or_default(), &OtpPolicy::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GenerationError;
    use rand::{SeedableRng, rngs::StdRng};
    use std::collections::HashSet;

    fn len(n: usize) -> NonZeroUsize {
        NonZeroUsize::new(n).unwrap()
    }

    #[test]
    fn test_generate_code_length_and_alphabet() {
        for n in [1, 4, 6, 8, 32] {
            let code = generate_code(len(n));
            assert_eq!(code.len(), n);
            assert!(code.as_str().chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn test_generate_code_keeps_leading_zeros() {
        let mut rng = StdRng::seed_from_u64(7);
        let saw_leading_zero = (0..500)
            .map(|_| generate_code_with_rng(&mut rng, len(6)))
            .any(|code| code.as_str().starts_with('0'));
        assert!(saw_leading_zero);
    }

    #[test]
    fn test_generate_code_uses_every_digit() {
        let mut rng = StdRng::seed_from_u64(42);
        let code = generate_code_with_rng(&mut rng, len(2_000));
        let digits: HashSet<char> = code.as_str().chars().collect();
        assert_eq!(digits.len(), 10);
    }

    #[test]
    fn test_seeded_generation_is_reproducible() {
        let a = generate_code_with_rng(&mut StdRng::seed_from_u64(1), len(6));
        let b = generate_code_with_rng(&mut StdRng::seed_from_u64(1), len(6));
        assert_eq!(a, b);
    }

    #[test]
    fn test_code_debug_is_redacted() {
        let code = generate_code(len(6));
        let debug = format!("{code:?}");
        assert_eq!(debug, "OtpCode(<6 digits>)");
        assert!(!debug.contains(code.as_str()));
    }

    #[test]
    fn test_create_otp_record_defaults() {
        let record = create_otp_record(UserId::new("U1"), None).unwrap();

        assert!(record.id().starts_with("otp_"));
        assert_eq!(record.user_id(), &UserId::new("U1"));
        assert_eq!(record.otp_type(), &OtpType::EmailVerification);
        assert_eq!(record.code().len(), 6);
        assert_eq!(
            record.expires_at() - record.created_at(),
            Duration::minutes(10)
        );
    }

    #[test]
    fn test_create_honours_policy() {
        let policy = OtpPolicy::default()
            .with_code_length(len(8))
            .with_validity(Duration::minutes(3));
        let record = OtpRecord::create(UserId::new("U2"), OtpType::Login, &policy).unwrap();

        assert_eq!(record.code().len(), 8);
        assert_eq!(record.expires_at() - record.created_at(), Duration::minutes(3));
        assert!(record.expires_at() > record.created_at());
    }

    #[test]
    fn test_record_ids_are_unique() {
        let ids: HashSet<String> = (0..500)
            .map(|_| {
                create_otp_record(UserId::new("U1"), None)
                    .unwrap()
                    .id()
                    .to_string()
            })
            .collect();
        assert_eq!(ids.len(), 500);
    }

    #[test]
    fn test_is_expired_at() {
        let record = create_otp_record(UserId::new("U1"), None).unwrap();
        assert!(!record.is_expired_at(record.created_at()));
        assert!(!record.is_expired_at(record.expires_at() - Duration::seconds(1)));
        assert!(record.is_expired_at(record.expires_at()));
    }

    #[test]
    fn test_otp_type_round_trip() {
        assert_eq!(OtpType::from("email_verification"), OtpType::EmailVerification);
        assert_eq!(OtpType::from("password_reset"), OtpType::PasswordReset);
        assert_eq!(OtpType::from("login"), OtpType::Login);
        assert_eq!(
            OtpType::from("phone_change"),
            OtpType::Other("phone_change".to_string())
        );
        assert_eq!(OtpType::Other("phone_change".to_string()).as_str(), "phone_change");

        let json = serde_json::to_string(&OtpType::PasswordReset).unwrap();
        assert_eq!(json, "\"password_reset\"");
        let parsed: OtpType = serde_json::from_str("\"mfa\"").unwrap();
        assert_eq!(parsed, OtpType::Other("mfa".to_string()));
    }

    struct NoIds;

    impl IdGenerator for NoIds {
        fn generate(&self, _prefix: &str) -> Result<String, GenerationError> {
            Err(GenerationError::EntropyUnavailable("no entropy".to_string()))
        }
    }

    #[test]
    fn test_create_fails_without_ids() {
        let err = OtpRecord::create_with(
            UserId::new("U1"),
            OtpType::EmailVerification,
            &OtpPolicy::default(),
            &NoIds,
        )
        .unwrap_err();
        assert!(err.is_generation_error());
    }

    #[test]
    fn test_timestamps_survive_microsecond_storage() {
        let record = create_otp_record(UserId::new("U1"), None).unwrap();
        let rebuilt = OtpRecord::from_storage(
            record.id().to_string(),
            record.user_id().clone(),
            record.code().to_string(),
            record.otp_type().clone(),
            DateTime::from_timestamp_micros(record.created_at().timestamp_micros()).unwrap(),
            DateTime::from_timestamp_micros(record.expires_at().timestamp_micros()).unwrap(),
        );
        assert_eq!(rebuilt, record);
    }

    #[test]
    fn test_record_serializes_type_key() {
        let record = create_otp_record(UserId::new("U1"), Some(OtpType::Login)).unwrap();
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["type"], "login");
        assert_eq!(json["user_id"], "U1");
        assert_eq!(json["code"], record.code().as_str());
    }

    #[test]
    fn test_policy_defaults() {
        let policy = OtpPolicy::default();
        assert_eq!(policy.code_length.get(), 6);
        assert_eq!(policy.validity_minutes(), 10);
    }
}
