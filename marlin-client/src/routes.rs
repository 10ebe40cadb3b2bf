//! Route table and navigation seam
//!
//! Destinations the session layer knows about, the permission sets that
//! gate them, and the trait through which forced redirects reach the UI
//! shell's router.

/// UI destinations known to the session layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Destination {
    Home,
    Login,
    Register,
    VerifyOtp,
    ResetPassword,
    Unauthorized,
    Dashboard,
    BankingOperations,
    TransactionHistory,
    AccountManagement,
    TransactionManagement,
    PendingTransactions,
    CustomerManagement,
    RoleManagement,
    ManagerManagement,
    PermissionManagement,
}

impl Destination {
    /// Route path rendered by the UI shell.
    pub fn path(&self) -> &'static str {
        match self {
            Destination::Home => "/",
            Destination::Login => "/login",
            Destination::Register => "/signup",
            Destination::VerifyOtp => "/verify-otp",
            Destination::ResetPassword => "/reset-password",
            Destination::Unauthorized => "/unauthorized",
            Destination::Dashboard => "/dashboard",
            Destination::BankingOperations => "/banking-operations",
            Destination::TransactionHistory => "/transaction-history",
            Destination::AccountManagement => "/account-management",
            Destination::TransactionManagement => "/transaction-management",
            Destination::PendingTransactions => "/pending-transactions",
            Destination::CustomerManagement => "/customer-management",
            Destination::RoleManagement => "/role-management",
            Destination::ManagerManagement => "/manager-management",
            Destination::PermissionManagement => "/permission-management",
        }
    }

    /// Permissions gating this destination, at-least-one-of. An empty set
    /// means the destination only requires authentication (or is public).
    pub fn required_permissions(&self) -> &'static [&'static str] {
        match self {
            Destination::BankingOperations => &["MakeDeposit", "MakeWithdrawal", "MakeTransfer"],
            Destination::TransactionHistory => &["ViewTransactions", "ViewCustomTransactions"],
            Destination::AccountManagement
            | Destination::TransactionManagement
            | Destination::PendingTransactions
            | Destination::CustomerManagement => &[
                "ApproveAccount",
                "ViewPendingTransactions",
                "ApproveTransaction",
                "RejectTransaction",
                "ViewUsers",
            ],
            Destination::RoleManagement
            | Destination::ManagerManagement
            | Destination::PermissionManagement => &[
                "CreateRole",
                "DeleteRole",
                "ViewRoles",
                "CreateManager",
                "VerifyManager",
                "ManagePermissions",
            ],
            _ => &[],
        }
    }

    /// Public destinations are reachable without a session.
    pub fn is_public(&self) -> bool {
        matches!(
            self,
            Destination::Home
                | Destination::Login
                | Destination::Register
                | Destination::VerifyOtp
                | Destination::ResetPassword
                | Destination::Unauthorized
        )
    }
}

/// Seam to the UI shell's router. The session layer redirects through
/// this on forced logout and at flow terminal states.
pub trait Navigator: Send + Sync {
    fn redirect(&self, to: Destination);
}
