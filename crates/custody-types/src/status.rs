use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Lifecycle status of one evidence item within a case.
///
/// `CheckedIn` is both the initial status (on first add) and re-enterable
/// after a checkout/checkin cycle. `Released`, `Disposed`, and `Destroyed`
/// are terminal: once reached, no further transition is legal for that
/// item within that case.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ItemStatus {
    CheckedIn,
    CheckedOut,
    Released,
    Disposed,
    Destroyed,
}

impl ItemStatus {
    /// Returns `true` if no further transition is legal from this status.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Released | Self::Disposed | Self::Destroyed)
    }
}

impl fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CheckedIn => write!(f, "CHECKEDIN"),
            Self::CheckedOut => write!(f, "CHECKEDOUT"),
            Self::Released => write!(f, "RELEASED"),
            Self::Disposed => write!(f, "DISPOSED"),
            Self::Destroyed => write!(f, "DESTROYED"),
        }
    }
}

impl FromStr for ItemStatus {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "CHECKEDIN" => Ok(Self::CheckedIn),
            "CHECKEDOUT" => Ok(Self::CheckedOut),
            "RELEASED" => Ok(Self::Released),
            "DISPOSED" => Ok(Self::Disposed),
            "DESTROYED" => Ok(Self::Destroyed),
            other => Err(TypeError::UnknownStatus(other.to_string())),
        }
    }
}

/// Terminal disposition chosen when an item is removed from custody.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RemovalReason {
    Released,
    Disposed,
    Destroyed,
}

impl RemovalReason {
    /// The terminal status an item enters when removed for this reason.
    pub fn terminal_status(&self) -> ItemStatus {
        match self {
            Self::Released => ItemStatus::Released,
            Self::Disposed => ItemStatus::Disposed,
            Self::Destroyed => ItemStatus::Destroyed,
        }
    }
}

impl fmt::Display for RemovalReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.terminal_status())
    }
}

impl FromStr for RemovalReason {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "RELEASED" => Ok(Self::Released),
            "DISPOSED" => Ok(Self::Disposed),
            "DESTROYED" => Ok(Self::Destroyed),
            other => Err(TypeError::UnknownReason(other.to_string())),
        }
    }
}
