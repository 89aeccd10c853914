//! Permission naming and per-action authorization.
//!
//! Every protected operation maps to one `(Resource, Action)` pair. The
//! required permission name comes from a single template so deployments can
//! keep whichever namespace their permission registry was seeded with.

use axum::http::Method;

use crate::error::{Error, Result};
use crate::middleware::auth::CurrentUser;
use crate::models::user::NewPermission;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    Applicant,
    ApplicantComment,
    User,
}

impl Resource {
    pub const ALL: [Resource; 3] = [Resource::Applicant, Resource::ApplicantComment, Resource::User];

    /// Resource-type name substituted into the permission template.
    pub fn name(self) -> &'static str {
        match self {
            Resource::Applicant => "applicant",
            Resource::ApplicantComment => "applicantcomment",
            Resource::User => "user",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Resource::Applicant => "applicant",
            Resource::ApplicantComment => "applicant comment",
            Resource::User => "user",
        }
    }

    /// Actions that carry a permission for this resource.
    pub fn actions(self) -> &'static [Action] {
        match self {
            Resource::Applicant => &[Action::Read, Action::Create, Action::Update, Action::Delete],
            Resource::ApplicantComment => &[Action::Read, Action::Create],
            Resource::User => &[Action::Read],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Read,
    Create,
    Update,
    Delete,
}

impl Action {
    pub fn verb(self) -> &'static str {
        match self {
            Action::Read => "view",
            Action::Create => "add",
            Action::Update => "change",
            Action::Delete => "delete",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionNaming {
    template: String,
}

impl PermissionNaming {
    pub const DEFAULT_TEMPLATE: &'static str = "applications.{action}_{resource}";

    pub fn new(template: &str) -> Result<Self> {
        if !template.contains("{action}") || !template.contains("{resource}") {
            return Err(Error::Config(format!(
                "Permission template must contain {{action}} and {{resource}}: {}",
                template
            )));
        }
        Ok(Self {
            template: template.to_string(),
        })
    }

    pub fn name(&self, action: Action, resource: Resource) -> String {
        self.template
            .replace("{action}", action.verb())
            .replace("{resource}", resource.name())
    }
}

impl Default for PermissionNaming {
    fn default() -> Self {
        Self {
            template: Self::DEFAULT_TEMPLATE.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct PermissionPolicy {
    naming: PermissionNaming,
}

impl PermissionPolicy {
    pub fn new(naming: PermissionNaming) -> Self {
        Self { naming }
    }

    pub fn required_permission(&self, resource: Resource, action: Action) -> Result<String> {
        if !resource.actions().contains(&action) {
            return Err(Error::MethodNotAllowed(format!(
                "{} is not supported on {}",
                action.verb(),
                resource.name()
            )));
        }
        Ok(self.naming.name(action, resource))
    }

    /// `authorize` for a request method. HEAD and OPTIONS only describe a
    /// resource and pass for any authenticated identity.
    pub fn authorize_method(
        &self,
        user: &CurrentUser,
        method: &Method,
        resource: Resource,
        action: Action,
    ) -> Result<()> {
        if *method == Method::HEAD || *method == Method::OPTIONS {
            return Ok(());
        }
        self.authorize(user, resource, action)
    }

    pub fn authorize(&self, user: &CurrentUser, resource: Resource, action: Action) -> Result<()> {
        let required = self.required_permission(resource, action)?;
        if user.has_permission(&required) {
            Ok(())
        } else {
            tracing::warn!(
                user = %user.username,
                permission = %required,
                "permission denied"
            );
            Err(Error::Forbidden(
                "You do not have permission to perform this action".to_string(),
            ))
        }
    }

    /// The full set of permissions the service knows about.
    pub fn seed(&self) -> Vec<NewPermission> {
        Resource::ALL
            .iter()
            .flat_map(|resource| {
                resource.actions().iter().map(move |action| NewPermission {
                    codename: self.naming.name(*action, *resource),
                    name: format!("Can {} {}", action.verb(), resource.label()),
                })
            })
            .collect()
    }
}
