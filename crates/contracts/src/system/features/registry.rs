use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// A togglable functional area of the application.
///
/// The set is closed: adding an area means adding a variant here, and the
/// exhaustive matches in [`FeatureKey::label`] and [`FeatureKey::icon`] will
/// refuse to compile until the new variant has both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureKey {
    Maintenance,
    Facilities,
    Parcels,
    Transport,
    Sos,
    Visitors,
    Support,
}

/// All feature keys in registry order
pub const FEATURE_KEYS: [FeatureKey; 7] = [
    FeatureKey::Maintenance,
    FeatureKey::Facilities,
    FeatureKey::Parcels,
    FeatureKey::Transport,
    FeatureKey::Sos,
    FeatureKey::Visitors,
    FeatureKey::Support,
];

/// Human-readable label per feature key
pub static FEATURE_LABELS: Lazy<BTreeMap<FeatureKey, &'static str>> =
    Lazy::new(|| FEATURE_KEYS.iter().map(|k| (*k, k.label())).collect());

/// Icon glyph per feature key
pub static FEATURE_ICONS: Lazy<BTreeMap<FeatureKey, &'static str>> =
    Lazy::new(|| FEATURE_KEYS.iter().map(|k| (*k, k.icon())).collect());

impl FeatureKey {
    /// Wire name, e.g. `"maintenance"`
    pub const fn as_str(self) -> &'static str {
        match self {
            FeatureKey::Maintenance => "maintenance",
            FeatureKey::Facilities => "facilities",
            FeatureKey::Parcels => "parcels",
            FeatureKey::Transport => "transport",
            FeatureKey::Sos => "sos",
            FeatureKey::Visitors => "visitors",
            FeatureKey::Support => "support",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            FeatureKey::Maintenance => "Maintenance",
            FeatureKey::Facilities => "Facility Booking",
            FeatureKey::Parcels => "Parcels",
            FeatureKey::Transport => "Transport",
            FeatureKey::Sos => "SOS Emergency",
            FeatureKey::Visitors => "Visitors",
            FeatureKey::Support => "Support Tickets",
        }
    }

    pub const fn icon(self) -> &'static str {
        match self {
            FeatureKey::Maintenance => "🔧",
            FeatureKey::Facilities => "🏊",
            FeatureKey::Parcels => "📦",
            FeatureKey::Transport => "🚌",
            FeatureKey::Sos => "🚨",
            FeatureKey::Visitors => "👥",
            FeatureKey::Support => "💬",
        }
    }
}

impl fmt::Display for FeatureKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string does not name a registered feature
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownFeatureKey(pub String);

impl fmt::Display for UnknownFeatureKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown feature key: {}", self.0)
    }
}

impl std::error::Error for UnknownFeatureKey {}

impl FromStr for FeatureKey {
    type Err = UnknownFeatureKey;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FEATURE_KEYS
            .iter()
            .copied()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| UnknownFeatureKey(s.to_string()))
    }
}
