//! Action names
//!
//! The fixed set of high-level operations callers may request.

use std::fmt;
use std::str::FromStr;

use crate::error::RosgateError;

/// Named high-level actions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    TestConnection,
    Interfaces,
    IpAddresses,
    PppActive,
    HotspotActive,
    PppProfiles,
    PppSecrets,
    Log,
    PppSetDisabled,
    PppAddSecret,
    Batch,
    Run,
}

impl Action {
    pub const ALL: [Action; 12] = [
        Action::TestConnection,
        Action::Interfaces,
        Action::IpAddresses,
        Action::PppActive,
        Action::HotspotActive,
        Action::PppProfiles,
        Action::PppSecrets,
        Action::Log,
        Action::PppSetDisabled,
        Action::PppAddSecret,
        Action::Batch,
        Action::Run,
    ];

    /// Wire name used in requests
    pub fn name(self) -> &'static str {
        match self {
            Action::TestConnection => "test_connection",
            Action::Interfaces => "interfaces",
            Action::IpAddresses => "ip_addresses",
            Action::PppActive => "ppp_active",
            Action::HotspotActive => "hotspot_active",
            Action::PppProfiles => "ppp_profiles",
            Action::PppSecrets => "ppp_secrets",
            Action::Log => "log",
            Action::PppSetDisabled => "ppp_set_disabled",
            Action::PppAddSecret => "ppp_add_secret",
            Action::Batch => "batch",
            Action::Run => "run",
        }
    }

    /// Command path of single-listing actions
    pub fn listing_path(self) -> Option<&'static str> {
        match self {
            Action::Interfaces => Some("/interface/print"),
            Action::IpAddresses => Some("/ip/address/print"),
            Action::PppActive => Some("/ppp/active/print"),
            Action::HotspotActive => Some("/ip/hotspot/active/print"),
            Action::PppProfiles => Some("/ppp/profile/print"),
            Action::PppSecrets => Some("/ppp/secret/print"),
            _ => None,
        }
    }

    /// Whether this action may appear inside a batch
    pub fn batchable(self) -> bool {
        !matches!(self, Action::Batch | Action::Run)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Action {
    type Err = RosgateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Action::ALL
            .iter()
            .copied()
            .find(|a| a.name() == s)
            .ok_or_else(|| RosgateError::Validation(format!("unknown action {s:?}")))
    }
}
