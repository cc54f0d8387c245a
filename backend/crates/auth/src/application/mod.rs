//! Application Layer
//!
//! Use cases and application services.

pub mod admin;
pub mod authenticate;
pub mod config;
pub mod email_change;
pub mod login;
pub mod mail;
pub mod maintenance;
pub mod password;
pub mod profile;
pub mod register;
pub mod session;
pub mod verify_email;

// Re-exports
pub use admin::AdminUserUseCase;
pub use authenticate::authenticate;
pub use config::AuthConfig;
pub use email_change::{UpdateEmailUseCase, VerifyUpdateEmailUseCase};
pub use login::{LoginInput, LoginOutput, LoginUseCase, SessionTokens};
pub use maintenance::{IdentityMaintenanceUseCase, MaintenanceReport};
pub use password::{ChangePasswordUseCase, ForgotPasswordUseCase, ResetPasswordUseCase};
pub use profile::{ProfileChanges, ProfileUseCase};
pub use register::{RegisterInput, RegisterOutput, RegisterUseCase, ResendVerificationUseCase};
pub use session::{LogoutUseCase, RefreshUseCase};
pub use verify_email::VerifyEmailUseCase;
