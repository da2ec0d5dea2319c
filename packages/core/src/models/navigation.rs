use std::fmt;
use std::str::FromStr;

use crate::models::role::Role;

/// A navigation target produced by the role router or a gate rejection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Home,
    Login,
    /// Parameterised by subject id when the token carries one.
    VolunteerDashboard(Option<String>),
    NgoDashboard(Option<String>),
    CorporateDashboard,
    AdminDashboard,
}

impl Route {
    pub fn path(&self) -> String {
        match self {
            Route::Home => "/".to_string(),
            Route::Login => "/login".to_string(),
            Route::VolunteerDashboard(id) => with_subject("/volunteer-dashboard", id.as_deref()),
            Route::NgoDashboard(id) => with_subject("/ngo-dashboard", id.as_deref()),
            Route::CorporateDashboard => "/corporate-dashboard".to_string(),
            Route::AdminDashboard => "/admin-dashboard".to_string(),
        }
    }
}

fn with_subject(base: &str, subject_id: Option<&str>) -> String {
    match subject_id {
        Some(id) => format!("{}/{}", base, id),
        None => base.to_string(),
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.path())
    }
}

/// A protected screen, optionally restricted to one role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Screen {
    pub name: &'static str,
    pub required_role: Option<Role>,
}

impl Screen {
    pub const VOLUNTEER_DASHBOARD: Screen = Screen::open("volunteer-dashboard");
    pub const NGO_DASHBOARD: Screen = Screen::open("ngo-dashboard");
    pub const CORPORATE_DASHBOARD: Screen = Screen::open("corporate-dashboard");
    pub const ADMIN_DASHBOARD: Screen = Screen::restricted("admin-dashboard", Role::Admin);
    pub const OPPORTUNITIES: Screen = Screen::open("opportunities");
    pub const CREATE_OPPORTUNITY: Screen = Screen::open("create-opportunity");
    pub const MANAGE_OPPORTUNITIES: Screen = Screen::open("manage-opportunities");
    pub const MY_APPLICATIONS: Screen = Screen::open("my-applications");

    pub const ALL: &'static [Screen] = &[
        Screen::VOLUNTEER_DASHBOARD,
        Screen::NGO_DASHBOARD,
        Screen::CORPORATE_DASHBOARD,
        Screen::ADMIN_DASHBOARD,
        Screen::OPPORTUNITIES,
        Screen::CREATE_OPPORTUNITY,
        Screen::MANAGE_OPPORTUNITIES,
        Screen::MY_APPLICATIONS,
    ];

    /// Any logged-in role may enter.
    pub const fn open(name: &'static str) -> Self {
        Screen {
            name,
            required_role: None,
        }
    }

    pub const fn restricted(name: &'static str, role: Role) -> Self {
        Screen {
            name,
            required_role: Some(role),
        }
    }
}

impl FromStr for Screen {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().trim_start_matches('/');
        Screen::ALL
            .iter()
            .find(|screen| screen.name == name)
            .copied()
            .ok_or_else(|| format!("Unknown screen: {}", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(Route::Login, "/login")]
    #[test_case(Route::Home, "/")]
    #[test_case(Route::NgoDashboard(Some("42".to_string())), "/ngo-dashboard/42")]
    #[test_case(Route::VolunteerDashboard(Some("v-1".to_string())), "/volunteer-dashboard/v-1")]
    #[test_case(Route::VolunteerDashboard(None), "/volunteer-dashboard")]
    #[test_case(Route::CorporateDashboard, "/corporate-dashboard")]
    #[test_case(Route::AdminDashboard, "/admin-dashboard")]
    fn test_route_paths(route: Route, expected: &str) {
        assert_eq!(route.path(), expected);
        assert_eq!(route.to_string(), expected);
    }

    #[test]
    fn test_screen_parsing() {
        assert_eq!(
            "admin-dashboard".parse::<Screen>().unwrap(),
            Screen::ADMIN_DASHBOARD
        );
        assert_eq!(
            "/opportunities".parse::<Screen>().unwrap(),
            Screen::OPPORTUNITIES
        );
        assert!("nowhere".parse::<Screen>().is_err());
    }

    #[test]
    fn test_only_admin_dashboard_is_restricted() {
        let restricted: Vec<_> = Screen::ALL
            .iter()
            .filter(|s| s.required_role.is_some())
            .collect();
        assert_eq!(restricted.len(), 1);
        assert_eq!(restricted[0].required_role, Some(Role::Admin));
    }
}
