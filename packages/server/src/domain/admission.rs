//! Admission Gate: decides whether a join attempt may proceed.

use thiserror::Error;

use super::{
    presence::PresenceRegistry,
    value_object::{Identity, SharedSecret},
};

/// Why a join attempt was turned away. Checks run in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AdmissionRejection {
    #[error("a nickname is required")]
    MissingIdentity,

    #[error("the password is incorrect")]
    BadCredential,

    #[error("the nickname is already taken")]
    IdentityTaken,
}

impl AdmissionRejection {
    /// Stable machine-readable reason.
    pub fn code(&self) -> &'static str {
        match self {
            AdmissionRejection::MissingIdentity => "missing-identity",
            AdmissionRejection::BadCredential => "bad-credential",
            AdmissionRejection::IdentityTaken => "identity-taken",
        }
    }
}

/// Join policy backed by a single shared secret.
///
/// The gate has no side effects; inserting into presence is the caller's job.
#[derive(Debug, Clone)]
pub struct AdmissionGate {
    secret: SharedSecret,
}

impl AdmissionGate {
    pub fn new(secret: SharedSecret) -> Self {
        Self { secret }
    }

    pub fn admit(
        &self,
        candidate: &str,
        credential: &str,
        presence: &PresenceRegistry,
    ) -> Result<Identity, AdmissionRejection> {
        let identity = Identity::new(candidate).map_err(|_| AdmissionRejection::MissingIdentity)?;

        if !self.secret.matches(credential) {
            return Err(AdmissionRejection::BadCredential);
        }

        if presence.contains(&identity) {
            return Err(AdmissionRejection::IdentityTaken);
        }

        Ok(identity)
    }
}
