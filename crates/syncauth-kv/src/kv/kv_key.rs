//! Key-value key types and traits.

use std::fmt;
use std::str::FromStr;

use syncauth_core::UserId;

use crate::Error;

/// Marker trait for KV key types.
///
/// This trait defines how keys are formatted for storage. Every key type
/// renders with a distinct prefix so that all of them can share one bucket.
pub trait KvKey: fmt::Debug + fmt::Display + FromStr + Clone + Send + Sync + 'static {
    /// Prefix preceding the first `:` of the rendered key.
    const PREFIX: &'static str;
}

fn strip_prefix<'a>(s: &'a str, prefix: &str) -> Result<&'a str, Error> {
    s.strip_prefix(prefix)
        .and_then(|rest| rest.strip_prefix(':'))
        .ok_or_else(|| Error::invalid_key(s, format!("expected '{prefix}:' prefix")))
}

/// Reverse-lookup key of a refresh token bound to a device fingerprint.
///
/// Renders as `refresh:{token}:{fingerprint}`. Tokens are URL-safe base64 and
/// never contain `:`, so the fingerprint is everything after the second colon.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RefreshTokenKey {
    pub token: String,
    pub fingerprint: String,
}

impl RefreshTokenKey {
    /// Creates a new key.
    pub fn new(token: impl Into<String>, fingerprint: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            fingerprint: fingerprint.into(),
        }
    }

    /// Returns whether this key is bound to `fingerprint`.
    #[inline]
    pub fn matches_fingerprint(&self, fingerprint: &str) -> bool {
        self.fingerprint == fingerprint
    }
}

impl KvKey for RefreshTokenKey {
    const PREFIX: &'static str = "refresh";
}

impl fmt::Display for RefreshTokenKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", Self::PREFIX, self.token, self.fingerprint)
    }
}

impl FromStr for RefreshTokenKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rest = strip_prefix(s, Self::PREFIX)?;
        let (token, fingerprint) = rest
            .split_once(':')
            .ok_or_else(|| Error::invalid_key(s, "missing fingerprint"))?;
        if token.is_empty() {
            return Err(Error::invalid_key(s, "empty token"));
        }

        Ok(Self::new(token, fingerprint))
    }
}

/// Key of the set of refresh-token keys issued to a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UserTokensKey(pub UserId);

impl KvKey for UserTokensKey {
    const PREFIX: &'static str = "tokens";
}

impl fmt::Display for UserTokensKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", Self::PREFIX, self.0)
    }
}

impl FromStr for UserTokensKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let id = strip_prefix(s, Self::PREFIX)?
            .parse()
            .map_err(|e: std::num::ParseIntError| Error::invalid_key(s, e.to_string()))?;
        Ok(Self(id))
    }
}

impl From<UserId> for UserTokensKey {
    fn from(id: UserId) -> Self {
        Self(id)
    }
}

/// Key of a user's pending verification code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VerificationCodeKey(pub UserId);

impl KvKey for VerificationCodeKey {
    const PREFIX: &'static str = "code";
}

impl fmt::Display for VerificationCodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", Self::PREFIX, self.0)
    }
}

impl FromStr for VerificationCodeKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let id = strip_prefix(s, Self::PREFIX)?
            .parse()
            .map_err(|e: std::num::ParseIntError| Error::invalid_key(s, e.to_string()))?;
        Ok(Self(id))
    }
}

impl From<UserId> for VerificationCodeKey {
    fn from(id: UserId) -> Self {
        Self(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn refresh_key_layout() {
        let key = RefreshTokenKey::new("abc-_=", "device-1");
        assert_eq!(key.to_string(), "refresh:abc-_=:device-1");
    }

    #[test]
    fn refresh_key_fingerprint_may_contain_colons() -> anyhow::Result<()> {
        let key: RefreshTokenKey = "refresh:tok:mac:aa:bb".parse()?;
        assert_eq!(key.token, "tok");
        assert_eq!(key.fingerprint, "mac:aa:bb");
        assert!(key.matches_fingerprint("mac:aa:bb"));
        assert!(!key.matches_fingerprint("mac:aa"));
        Ok(())
    }

    #[test]
    fn fingerprint_match_is_exact() -> anyhow::Result<()> {
        let key: RefreshTokenKey = "refresh:tok:device-10".parse()?;
        assert!(!key.matches_fingerprint("device-1"));
        assert!(!key.matches_fingerprint("10"));
        Ok(())
    }

    #[test]
    fn refresh_key_rejects_foreign_prefix() {
        assert!("tokens:7".parse::<RefreshTokenKey>().is_err());
        assert!("refresh:only-token".parse::<RefreshTokenKey>().is_err());
        assert!("refreshx:tok:fp".parse::<RefreshTokenKey>().is_err());
    }

    #[test]
    fn user_keys_render_with_prefix() -> anyhow::Result<()> {
        let id = UserId::new(7);
        assert_eq!(UserTokensKey(id).to_string(), "tokens:7");
        assert_eq!(VerificationCodeKey(id).to_string(), "code:7");
        assert_eq!("code:7".parse::<VerificationCodeKey>()?, VerificationCodeKey(id));
        assert!("code:seven".parse::<VerificationCodeKey>().is_err());
        Ok(())
    }
}
