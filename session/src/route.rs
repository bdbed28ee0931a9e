//! Navigation surface and each route's access requirement.

#[cfg(test)]
#[path = "route_test.rs"]
mod tests;

use crate::profile::Role;

/// Who may see a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Public,
    /// Any signed-in viewer with a usable profile.
    Authenticated,
    Roles(&'static [Role]),
}

impl Access {
    /// Role set handed to the guard; `None` means no role check.
    #[must_use]
    pub const fn required_roles(self) -> Option<&'static [Role]> {
        match self {
            Self::Roles(roles) => Some(roles),
            Self::Public | Self::Authenticated => None,
        }
    }
}

const SEEKER: &[Role] = &[Role::Seeker];
const EMPLOYER: &[Role] = &[Role::Employer];
const ADMIN: &[Role] = &[Role::Admin];

/// Every page of the application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Home,
    Jobs,
    /// Job detail, keyed by slug or document id.
    JobDetail(String),
    Apply(String),
    Login,
    Register,
    Dashboard,
    SeekerDashboard,
    EmployerDashboard,
    PostJob,
    AdminDashboard,
    AdminUsers,
    AdminJobs,
    Profile,
}

impl Route {
    #[must_use]
    pub fn path(&self) -> String {
        match self {
            Self::Home => "/".to_owned(),
            Self::Jobs => "/jobs".to_owned(),
            Self::JobDetail(id) => format!("/jobs/{id}"),
            Self::Apply(id) => format!("/apply/{id}"),
            Self::Login => "/auth/login".to_owned(),
            Self::Register => "/auth/register".to_owned(),
            Self::Dashboard => "/dashboard".to_owned(),
            Self::SeekerDashboard => "/dashboard/seeker".to_owned(),
            Self::EmployerDashboard => "/dashboard/employer".to_owned(),
            Self::PostJob => "/dashboard/employer/post-job".to_owned(),
            Self::AdminDashboard => "/dashboard/admin".to_owned(),
            Self::AdminUsers => "/dashboard/admin/users".to_owned(),
            Self::AdminJobs => "/dashboard/admin/jobs".to_owned(),
            Self::Profile => "/profile".to_owned(),
        }
    }

    #[must_use]
    pub const fn access(&self) -> Access {
        match self {
            Self::Home | Self::Jobs | Self::JobDetail(_) | Self::Login | Self::Register => Access::Public,
            Self::Dashboard | Self::Profile => Access::Authenticated,
            Self::Apply(_) | Self::SeekerDashboard => Access::Roles(SEEKER),
            Self::EmployerDashboard | Self::PostJob => Access::Roles(EMPLOYER),
            Self::AdminDashboard | Self::AdminUsers | Self::AdminJobs => Access::Roles(ADMIN),
        }
    }

    /// Landing page for a role after sign-in.
    #[must_use]
    pub const fn dashboard_for(role: Role) -> Self {
        match role {
            Role::Seeker => Self::SeekerDashboard,
            Role::Employer => Self::EmployerDashboard,
            Role::Admin => Self::AdminDashboard,
            Role::User => Self::Dashboard,
        }
    }
}
