//! Static quota policy: user class → daily allowance.

use std::collections::BTreeMap;
use std::fmt;

use quota_core::defaults::{DEFAULT_STANDARD_DAILY_ALLOWANCE, UNLIMITED_ALLOWANCE};
use serde::{Deserialize, Serialize};

use crate::error::LimiterError;
use crate::user::UserClass;

/// Daily allowance of metered requests.
///
/// In configuration this is an integer: `-1` means unlimited, any value
/// `>= 0` is a fixed daily cap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum Allowance {
    /// No daily cap; checks never touch storage.
    Unlimited,
    /// At most this many serviced requests per UTC day.
    Daily(u32),
}

impl Allowance {
    #[inline]
    pub fn is_unlimited(&self) -> bool {
        matches!(self, Self::Unlimited)
    }

    /// Whether `count` requests today exceed this allowance.
    #[inline]
    pub fn is_exceeded_by(&self, count: u64) -> bool {
        match self {
            Self::Unlimited => false,
            Self::Daily(limit) => count > u64::from(*limit),
        }
    }

    /// Remaining requests after `count`, floored at zero.
    #[inline]
    pub fn remaining_after(&self, count: u64) -> Option<u64> {
        match self {
            Self::Unlimited => None,
            Self::Daily(limit) => Some(u64::from(*limit).saturating_sub(count)),
        }
    }

    /// The more restrictive of two allowances.
    fn min(self, other: Self) -> Self {
        match (self, other) {
            (Self::Unlimited, x) | (x, Self::Unlimited) => x,
            (Self::Daily(a), Self::Daily(b)) => Self::Daily(a.min(b)),
        }
    }
}

impl TryFrom<i64> for Allowance {
    type Error = String;

    fn try_from(v: i64) -> Result<Self, Self::Error> {
        if v == UNLIMITED_ALLOWANCE {
            Ok(Self::Unlimited)
        } else {
            u32::try_from(v)
                .map(Self::Daily)
                .map_err(|_| format!("allowance must be -1 (unlimited) or 0..={}, got {v}", u32::MAX))
        }
    }
}

impl From<Allowance> for i64 {
    fn from(a: Allowance) -> Self {
        match a {
            Allowance::Unlimited => UNLIMITED_ALLOWANCE,
            Allowance::Daily(n) => i64::from(n),
        }
    }
}

impl fmt::Display for Allowance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unlimited => f.write_str("unlimited"),
            Self::Daily(n) => write!(f, "{n}/day"),
        }
    }
}

/// Where a resolved allowance came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicySource {
    /// The class has its own entry.
    Configured,
    /// The class is unknown; the fallback allowance applies.
    UnknownClassFallback,
}

/// Result of looking up a class in the [`PolicyTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolved {
    pub allowance: Allowance,
    pub source: PolicySource,
}

/// Immutable mapping from user class to daily allowance.
///
/// Unknown classes are not folded into the standard class: they resolve
/// to a separate fallback allowance so that a misconfigured caller tier is
/// visible in logs and metrics instead of silently looking like a regular
/// user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyTable {
    entries: BTreeMap<UserClass, Allowance>,
    unknown_class: Allowance,
}

impl PolicyTable {
    /// Build a table from `(class, allowance)` pairs.
    ///
    /// When `unknown_class` is `None`, the fallback is the most restrictive
    /// finite allowance in the table, or the standard default when the table
    /// has no finite entry.
    pub fn from_entries<I, C>(entries: I, unknown_class: Option<Allowance>) -> Self
    where
        I: IntoIterator<Item = (C, Allowance)>,
        C: Into<UserClass>,
    {
        let entries: BTreeMap<UserClass, Allowance> =
            entries.into_iter().map(|(c, a)| (c.into(), a)).collect();

        let unknown_class = unknown_class.unwrap_or_else(|| {
            entries
                .values()
                .copied()
                .filter(|a| !a.is_unlimited())
                .reduce(Allowance::min)
                .unwrap_or(Allowance::Daily(DEFAULT_STANDARD_DAILY_ALLOWANCE))
        });

        Self {
            entries,
            unknown_class,
        }
    }

    /// Build a table from raw configuration integers (`-1` = unlimited).
    pub fn from_config<'a, I>(entries: I, unknown_class: Option<i64>) -> Result<Self, String>
    where
        I: IntoIterator<Item = (&'a String, &'a i64)>,
    {
        let mut parsed = BTreeMap::new();
        for (class, raw) in entries {
            let allowance =
                Allowance::try_from(*raw).map_err(|e| format!("policy.classes.{class}: {e}"))?;
            // Class names are case-insensitive.
            if parsed.insert(UserClass::new(class), allowance).is_some() {
                return Err(format!("policy.classes.{class}: duplicate class"));
            }
        }
        let unknown = unknown_class
            .map(Allowance::try_from)
            .transpose()
            .map_err(|e| format!("policy.unknown_class: {e}"))?;
        Ok(Self::from_entries(parsed, unknown))
    }

    /// Look up a class, falling back for unknown classes.
    pub fn resolve(&self, class: &UserClass) -> Resolved {
        match self.entries.get(class) {
            Some(&allowance) => Resolved {
                allowance,
                source: PolicySource::Configured,
            },
            None => Resolved {
                allowance: self.unknown_class,
                source: PolicySource::UnknownClassFallback,
            },
        }
    }

    /// Strict lookup without the fallback.
    pub fn get(&self, class: &UserClass) -> Result<Allowance, LimiterError> {
        self.entries
            .get(class)
            .copied()
            .ok_or_else(|| LimiterError::PolicyNotFound(class.to_string()))
    }

    /// Allowance applied to classes without an entry.
    #[inline]
    pub fn unknown_class_allowance(&self) -> Allowance {
        self.unknown_class
    }

    /// Iterate configured entries in class order.
    pub fn iter(&self) -> impl Iterator<Item = (&UserClass, &Allowance)> {
        self.entries.iter()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for PolicyTable {
    /// `admin` unlimited, `standard` five per day.
    fn default() -> Self {
        Self::from_entries(
            [
                (UserClass::admin(), Allowance::Unlimited),
                (
                    UserClass::standard(),
                    Allowance::Daily(DEFAULT_STANDARD_DAILY_ALLOWANCE),
                ),
            ],
            None,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allowance_from_config_integers() {
        assert_eq!(Allowance::try_from(-1).unwrap(), Allowance::Unlimited);
        assert_eq!(Allowance::try_from(0).unwrap(), Allowance::Daily(0));
        assert_eq!(Allowance::try_from(5).unwrap(), Allowance::Daily(5));
        assert!(Allowance::try_from(-2).is_err());
        assert!(Allowance::try_from(i64::from(u32::MAX) + 1).is_err());
    }

    #[test]
    fn test_allowance_serde() {
        let a: Allowance = serde_json::from_str("-1").unwrap();
        assert!(a.is_unlimited());
        let a: Allowance = serde_json::from_str("5").unwrap();
        assert_eq!(a, Allowance::Daily(5));
        assert!(serde_json::from_str::<Allowance>("-7").is_err());
        assert_eq!(serde_json::to_string(&Allowance::Unlimited).unwrap(), "-1");
    }

    #[test]
    fn test_allowance_limits() {
        let five = Allowance::Daily(5);
        assert!(!five.is_exceeded_by(5));
        assert!(five.is_exceeded_by(6));
        assert_eq!(five.remaining_after(3), Some(2));
        assert_eq!(five.remaining_after(9), Some(0));
        assert!(!Allowance::Unlimited.is_exceeded_by(u64::MAX));
        assert_eq!(Allowance::Unlimited.remaining_after(10), None);
    }

    #[test]
    fn test_default_table() {
        let table = PolicyTable::default();
        assert_eq!(
            table.resolve(&UserClass::admin()).allowance,
            Allowance::Unlimited
        );
        let standard = table.resolve(&UserClass::standard());
        assert_eq!(standard.allowance, Allowance::Daily(5));
        assert_eq!(standard.source, PolicySource::Configured);
    }

    #[test]
    fn test_unknown_class_uses_most_restrictive_known() {
        let table = PolicyTable::from_entries(
            [
                ("admin", Allowance::Unlimited),
                ("standard", Allowance::Daily(5)),
                ("trial", Allowance::Daily(2)),
            ],
            None,
        );
        let resolved = table.resolve(&UserClass::new("gold"));
        assert_eq!(resolved.allowance, Allowance::Daily(2));
        assert_eq!(resolved.source, PolicySource::UnknownClassFallback);
        assert!(matches!(
            table.get(&UserClass::new("gold")),
            Err(LimiterError::PolicyNotFound(_))
        ));
    }

    #[test]
    fn test_unknown_class_explicit_fallback() {
        let table = PolicyTable::from_entries(
            [("standard", Allowance::Daily(5))],
            Some(Allowance::Daily(0)),
        );
        assert_eq!(table.unknown_class_allowance(), Allowance::Daily(0));
    }

    #[test]
    fn test_unknown_class_all_unlimited_table() {
        let table = PolicyTable::from_entries([("admin", Allowance::Unlimited)], None);
        assert_eq!(
            table.unknown_class_allowance(),
            Allowance::Daily(DEFAULT_STANDARD_DAILY_ALLOWANCE)
        );
    }

    #[test]
    fn test_from_config() {
        let mut raw = BTreeMap::new();
        raw.insert("Admin".to_string(), -1i64);
        raw.insert("standard".to_string(), 5i64);
        let table = PolicyTable::from_config(&raw, None).unwrap();
        assert_eq!(table.len(), 2);
        assert!(table.get(&UserClass::admin()).unwrap().is_unlimited());

        raw.insert("broken".to_string(), -3i64);
        let err = PolicyTable::from_config(&raw, None).unwrap_err();
        assert!(err.contains("policy.classes.broken"));
    }

    #[test]
    fn test_from_config_rejects_case_duplicates() {
        let mut raw = BTreeMap::new();
        raw.insert("Admin".to_string(), 3i64);
        raw.insert("admin".to_string(), -1i64);
        let err = PolicyTable::from_config(&raw, None).unwrap_err();
        assert!(err.contains("duplicate class"));
    }
}
