pub mod credentials;
pub mod registration;
pub mod session;

pub use credentials::CredentialService;
pub use registration::RegistrationService;
pub use session::SessionService;
