//! Phone number type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`PhoneNumber`].
#[derive(thiserror::Error, Debug, Clone)]
pub enum PhoneError {
    /// The input string is empty.
    #[error("phone number cannot be empty")]
    Empty,
    /// The input does not start with the +998 country code.
    #[error("phone number must start with +998")]
    MissingCountryCode,
    /// The subscriber part is not exactly nine digits.
    #[error("phone number must have exactly 9 digits after +998")]
    InvalidSubscriberNumber,
}

/// An Uzbekistan phone number in international format.
///
/// Bazaar accounts are keyed by phone number. The accepted shape is
/// `+998` followed by exactly nine digits, with no separators.
///
/// ## Examples
///
/// ```
/// use bazaar_core::PhoneNumber;
///
/// // Valid
/// assert!(PhoneNumber::parse("+998901234567").is_ok());
///
/// // Invalid
/// assert!(PhoneNumber::parse("").is_err());              // empty
/// assert!(PhoneNumber::parse("998901234567").is_err());  // missing +
/// assert!(PhoneNumber::parse("+7901234567").is_err());   // wrong country code
/// assert!(PhoneNumber::parse("+99890123456").is_err());  // too short
/// assert!(PhoneNumber::parse("+998 90 123 45 67").is_err()); // separators
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct PhoneNumber(String);

impl PhoneNumber {
    /// Country-code prefix every accepted number starts with.
    pub const PREFIX: &'static str = "+998";

    /// Number of digits after the country code.
    pub const SUBSCRIBER_DIGITS: usize = 9;

    /// Parse a `PhoneNumber` from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the input:
    /// - Is empty
    /// - Does not start with `+998`
    /// - Does not have exactly nine digits after the country code
    pub fn parse(s: &str) -> Result<Self, PhoneError> {
        if s.is_empty() {
            return Err(PhoneError::Empty);
        }

        let subscriber = s
            .strip_prefix(Self::PREFIX)
            .ok_or(PhoneError::MissingCountryCode)?;

        if subscriber.len() != Self::SUBSCRIBER_DIGITS
            || !subscriber.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(PhoneError::InvalidSubscriberNumber);
        }

        Ok(Self(s.to_owned()))
    }

    /// Returns the phone number as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `PhoneNumber` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }

    /// Returns the nine subscriber digits after the country code.
    #[must_use]
    pub fn subscriber_number(&self) -> &str {
        self.0.get(Self::PREFIX.len()..).unwrap_or("")
    }
}

impl fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for PhoneNumber {
    type Err = PhoneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for PhoneNumber {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// SQLx support (with postgres feature)
#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for PhoneNumber {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for PhoneNumber {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <String as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        // Database values are assumed valid
        Ok(Self(s))
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for PhoneNumber {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <String as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}
