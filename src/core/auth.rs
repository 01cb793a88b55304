//! Authorization policies
//!
//! Every request resolves to an [`AuthContext`]; each registry operation is
//! guarded by an [`AuthPolicy`] parsed from configuration.

use uuid::Uuid;

/// Authorization context extracted from a request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthContext {
    /// Signed-in user with an active profile
    User {
        user_id: Uuid,
        email: String,
        name: String,
        role: String,
    },

    /// No session
    Anonymous,
}

impl AuthContext {
    pub fn is_admin(&self) -> bool {
        self.role() == Some("admin")
    }

    pub fn user_id(&self) -> Option<Uuid> {
        match self {
            AuthContext::User { user_id, .. } => Some(*user_id),
            AuthContext::Anonymous => None,
        }
    }

    pub fn email(&self) -> Option<&str> {
        match self {
            AuthContext::User { email, .. } => Some(email),
            AuthContext::Anonymous => None,
        }
    }

    pub fn role(&self) -> Option<&str> {
        match self {
            AuthContext::User { role, .. } => Some(role),
            AuthContext::Anonymous => None,
        }
    }
}

/// Authorization policy for an operation
#[derive(Debug, Clone)]
pub enum AuthPolicy {
    /// Public access (no auth required)
    Public,

    /// Any signed-in user
    Authenticated,

    /// User must have one of these roles
    HasRole(Vec<String>),

    /// Admin only
    AdminOnly,

    /// Combination of policies (AND)
    And(Vec<AuthPolicy>),

    /// Combination of policies (OR)
    Or(Vec<AuthPolicy>),

    /// Custom policy function
    Custom(fn(&AuthContext) -> bool),
}

impl AuthPolicy {
    /// Check if auth context satisfies this policy
    pub fn check(&self, context: &AuthContext) -> bool {
        match self {
            AuthPolicy::Public => true,

            AuthPolicy::Authenticated => !matches!(context, AuthContext::Anonymous),

            AuthPolicy::HasRole(required_roles) => context
                .role()
                .is_some_and(|role| required_roles.iter().any(|r| r == role)),

            AuthPolicy::AdminOnly => context.is_admin(),

            AuthPolicy::And(policies) => policies.iter().all(|p| p.check(context)),

            AuthPolicy::Or(policies) => policies.iter().any(|p| p.check(context)),

            AuthPolicy::Custom(f) => f(context),
        }
    }

    /// Parse a policy string, returning `None` when any part is unknown
    ///
    /// Grammar: `public`, `authenticated`, `admin_only`, `role:<name>` or
    /// `role:<a>,<b>`, joined with `&` (all) or `|` (any); `|` binds loosest.
    pub fn try_parse(s: &str) -> Option<Self> {
        let alternatives: Vec<&str> = s.split('|').map(str::trim).collect();
        if alternatives.len() > 1 {
            return alternatives
                .into_iter()
                .map(Self::try_parse)
                .collect::<Option<Vec<_>>>()
                .map(AuthPolicy::Or);
        }

        let requirements: Vec<&str> = s.split('&').map(str::trim).collect();
        if requirements.len() > 1 {
            return requirements
                .into_iter()
                .map(Self::try_parse)
                .collect::<Option<Vec<_>>>()
                .map(AuthPolicy::And);
        }

        match s.trim() {
            "public" => Some(AuthPolicy::Public),
            "authenticated" => Some(AuthPolicy::Authenticated),
            "admin_only" => Some(AuthPolicy::AdminOnly),
            s => {
                let roles: Vec<String> = s
                    .strip_prefix("role:")?
                    .split(',')
                    .map(str::trim)
                    .filter(|r| !r.is_empty())
                    .map(str::to_string)
                    .collect();
                (!roles.is_empty()).then_some(AuthPolicy::HasRole(roles))
            }
        }
    }

    /// Parse policy from string (for YAML config); unknown strings fall back
    /// to [`AuthPolicy::Authenticated`]
    pub fn parse_policy(s: &str) -> Self {
        Self::try_parse(s).unwrap_or(AuthPolicy::Authenticated)
    }
}
