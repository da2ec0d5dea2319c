use crate::models::claims::Claims;
use crate::models::navigation::Route;
use crate::models::role::Role;

/// Post-login destination for the given claims.
///
/// Unknown and missing roles land on the volunteer dashboard.
pub fn route_for(claims: &Claims) -> Route {
    route_for_role(claims.role(), claims.subject_id())
}

pub fn route_for_role(role: Role, subject_id: Option<String>) -> Route {
    match role {
        Role::Ngo => Route::NgoDashboard(subject_id),
        Role::Corporate => Route::CorporateDashboard,
        Role::Admin => Route::AdminDashboard,
        Role::Volunteer => Route::VolunteerDashboard(subject_id),
    }
}
