//! Affiliate codes, the affiliate commission rate and share links.

use core::fmt;

use rand::Rng;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{ProductId, UserId};

/// Percentage of the order total paid to the purchaser's referrer.
///
/// Recorded verbatim on every commission document.
pub const AFFILIATE_COMMISSION_PERCENT: Decimal = Decimal::from_parts(5, 0, 0, false, 0);

/// Maximum number of letters taken from the first name.
const PREFIX_MAX_LEN: usize = 5;

/// Number of random base-36 characters appended to the prefix.
const SUFFIX_LEN: usize = 4;

/// Prefix used when the name is empty.
const FALLBACK_NAME: &str = "USER";

const BASE36: &[u8; 36] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// A shareable affiliate code such as `JOAO7K2F`.
///
/// Codes are generated once when a profile is created. Uniqueness is intended
/// but not checked against existing codes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AffiliateCode(String);

impl AffiliateCode {
    /// Wrap an existing code (e.g. one read from a stored profile).
    #[must_use]
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    /// Generate a new code for `name`: [`Self::prefix_for`] followed by four
    /// random characters from `0-9A-Z`.
    pub fn generate<R: Rng>(name: &str, rng: &mut R) -> Self {
        let mut code = Self::prefix_for(name);
        code.extend((0..SUFFIX_LEN).map(|_| {
            let idx = rng.random_range(0..BASE36.len());
            char::from(BASE36.get(idx).copied().unwrap_or(b'0'))
        }));
        Self(code)
    }

    /// Deterministic part of a generated code.
    ///
    /// Takes the first space-separated word of the name, keeps ASCII letters,
    /// uppercases them and truncates to five characters.
    ///
    /// ```
    /// use moda_brasil_core::AffiliateCode;
    ///
    /// assert_eq!(AffiliateCode::prefix_for("João Silva"), "JOO");
    /// assert_eq!(AffiliateCode::prefix_for("Mariana Costa"), "MARIA");
    /// assert_eq!(AffiliateCode::prefix_for(""), "USER");
    /// ```
    #[must_use]
    pub fn prefix_for(name: &str) -> String {
        let name = if name.is_empty() { FALLBACK_NAME } else { name };
        name.split(' ')
            .next()
            .unwrap_or_default()
            .chars()
            .filter(char::is_ascii_alphabetic)
            .map(|c| c.to_ascii_uppercase())
            .take(PREFIX_MAX_LEN)
            .collect()
    }

    /// The code as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AffiliateCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for AffiliateCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Shareable affiliate link: `{base}/?ref={code}#/login`.
///
/// The query sits before the route fragment so the code is visible to the
/// server and to the first page load.
#[must_use]
pub fn affiliate_link(base_url: &str, code: &AffiliateCode) -> String {
    format!("{}/?ref={}#/login", base_url.trim_end_matches('/'), code)
}

/// Legacy partner share link for a product: `{base}#/product/{id}?seller={uid}`.
#[must_use]
pub fn partner_product_link(base_url: &str, product_id: &ProductId, seller_id: &UserId) -> String {
    let base = base_url.split('#').next().unwrap_or_default();
    format!("{base}#/product/{product_id}?seller={seller_id}")
}
