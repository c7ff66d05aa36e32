// SPDX-License-Identifier: Apache-2.0

use crate::ValidationError;

const AUTHORITY_PREFIX: &str = "ROLE_";

wire_enum! {
    /// Account-wide role carried in the `role` JWT claim.
    Role, "role" {
        User => "USER",
        Manager => "MANAGER",
        Admin => "ADMIN",
    }
}

impl Role {
    /// Authority string as seen by clients, e.g. `ROLE_MANAGER`.
    #[must_use]
    pub const fn authority(self) -> &'static str {
        match self {
            Self::User => "ROLE_USER",
            Self::Manager => "ROLE_MANAGER",
            Self::Admin => "ROLE_ADMIN",
        }
    }

    pub fn from_authority(input: &str) -> Result<Self, ValidationError> {
        let trimmed = input.trim();
        let bare = trimmed.strip_prefix(AUTHORITY_PREFIX).ok_or_else(|| {
            ValidationError(format!("authority must start with {AUTHORITY_PREFIX}"))
        })?;
        Self::parse(bare)
    }

    /// Roles that may be granted through administration; `ADMIN` is only
    /// ever created by bootstrap seeding.
    #[must_use]
    pub const fn is_assignable(self) -> bool {
        matches!(self, Self::User | Self::Manager)
    }

    /// Parses a role an administrator may grant. Accepts both `MANAGER`
    /// and `ROLE_MANAGER`.
    pub fn parse_assignable(input: &str) -> Result<Self, ValidationError> {
        let role = Self::parse(input).or_else(|_| Self::from_authority(input))?;
        if !role.is_assignable() {
            return Err(ValidationError(format!(
                "role {} cannot be granted",
                role.as_str()
            )));
        }
        Ok(role)
    }
}

wire_enum! {
    /// Function a member performs inside a single project.
    ProjectRole, "project role" {
        ProjectManager => "PROJECT_MANAGER",
        TechLead => "TECH_LEAD",
        Developer => "DEVELOPER",
        Tester => "TESTER",
        Analyst => "ANALYST",
        Designer => "DESIGNER",
        ScrumMaster => "SCRUM_MASTER",
        DevopsEngineer => "DEVOPS_ENGINEER",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn authority_roundtrips_for_every_role() {
        for role in Role::ALL {
            assert_eq!(Role::from_authority(role.authority()).expect("authority"), *role);
        }
    }

    #[test]
    fn parse_assignable_accepts_both_spellings() {
        assert_eq!(Role::parse_assignable("manager").expect("role"), Role::Manager);
        assert_eq!(Role::parse_assignable("ROLE_USER").expect("role"), Role::User);
        assert!(Role::parse_assignable("ADMIN").is_err());
        assert!(Role::parse_assignable("ROLE_ADMIN").is_err());
        assert!(Role::parse_assignable("owner").is_err());
    }

    #[test]
    fn authority_requires_prefix() {
        let err = Role::from_authority("ADMIN").expect_err("missing prefix");
        assert!(err.0.contains("ROLE_"));
    }

    #[test]
    fn only_user_and_manager_are_assignable() {
        assert!(Role::User.is_assignable());
        assert!(Role::Manager.is_assignable());
        assert!(!Role::Admin.is_assignable());
    }

    #[test]
    fn project_role_parse_is_case_insensitive() {
        assert_eq!(
            ProjectRole::parse("devops_engineer").expect("role"),
            ProjectRole::DevopsEngineer
        );
        assert!(ProjectRole::parse("JANITOR").is_err());
    }
}
