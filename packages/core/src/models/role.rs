use serde::{Deserialize, Serialize};
use std::fmt;

/// Account role carried in the `role` claim of an access token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Volunteer,
    Ngo,
    Corporate,
    Admin,
}

impl Role {
    /// Case-insensitive parse of a raw claim value.
    ///
    /// Missing, empty and unrecognised values all fall back to `Volunteer`.
    pub fn from_claim(value: Option<&str>) -> Self {
        match value.map(|v| v.trim().to_uppercase()).as_deref() {
            Some("NGO") => Role::Ngo,
            Some("CORPORATE") => Role::Corporate,
            Some("ADMIN") => Role::Admin,
            _ => Role::Volunteer,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Volunteer => "VOLUNTEER",
            Role::Ngo => "NGO",
            Role::Corporate => "CORPORATE",
            Role::Admin => "ADMIN",
        }
    }
}

impl Default for Role {
    fn default() -> Self {
        Role::Volunteer
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.pad(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(Some("NGO"), Role::Ngo ; "upper ngo")]
    #[test_case(Some("ngo"), Role::Ngo ; "lower ngo")]
    #[test_case(Some("Corporate"), Role::Corporate ; "mixed corporate")]
    #[test_case(Some("admin"), Role::Admin ; "lower admin")]
    #[test_case(Some(" ADMIN "), Role::Admin ; "padded admin")]
    #[test_case(Some("VOLUNTEER"), Role::Volunteer ; "volunteer")]
    #[test_case(Some("superuser"), Role::Volunteer ; "unknown role")]
    #[test_case(Some(""), Role::Volunteer ; "empty role")]
    #[test_case(None, Role::Volunteer ; "missing role")]
    fn test_from_claim(input: Option<&str>, expected: Role) {
        assert_eq!(Role::from_claim(input), expected);
    }

    #[test]
    fn test_display_is_uppercase() {
        assert_eq!(Role::Ngo.to_string(), "NGO");
        assert_eq!(Role::Admin.to_string(), "ADMIN");
    }

    #[test]
    fn test_serde_uses_uppercase_names() {
        let json = serde_json::to_string(&Role::Corporate).unwrap();
        assert_eq!(json, "\"CORPORATE\"");
        let role: Role = serde_json::from_str("\"VOLUNTEER\"").unwrap();
        assert_eq!(role, Role::Volunteer);
    }
}
