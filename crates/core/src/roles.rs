//! Role names for dashboard accounts.

/// Full access: user management, tag deletion, campaign sending.
pub const ROLE_ADMIN: &str = "admin";

/// Day-to-day dashboard access without destructive operations.
pub const ROLE_EDITOR: &str = "editor";
