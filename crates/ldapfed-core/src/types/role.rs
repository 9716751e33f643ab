//! Organization role types

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Organization identifier
pub type OrgId = i64;

/// Role a user holds inside an organization.
///
/// Variants are declared in privilege order so `Ord` compares privilege.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum OrgRole {
    Viewer,
    Editor,
    Admin,
}

impl OrgRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrgRole::Viewer => "Viewer",
            OrgRole::Editor => "Editor",
            OrgRole::Admin => "Admin",
        }
    }
}

impl fmt::Display for OrgRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrgRole {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s {
            "Viewer" => Ok(OrgRole::Viewer),
            "Editor" => Ok(OrgRole::Editor),
            "Admin" => Ok(OrgRole::Admin),
            other => Err(crate::Error::InvalidConfig(format!(
                "Unknown organization role: {}",
                other
            ))),
        }
    }
}
