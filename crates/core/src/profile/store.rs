//! Profile store boundary and missing-profile policy.

use billflow_shared::config::MissingProfilePolicy;
use thiserror::Error;
use tracing::warn;

use super::types::TemplateVisibilityProfile;

/// Errors raised while resolving a visibility profile.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProfileError {
    /// No profile exists and the policy forbids the default.
    #[error("No visibility profile for business {0}")]
    Missing(String),

    /// The store could not be queried.
    #[error("Profile store error: {0}")]
    Store(String),
}

impl ProfileError {
    /// Returns the error code for logs and operator output.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Missing(_) => "PROFILE_MISSING",
            Self::Store(_) => "PROFILE_STORE_ERROR",
        }
    }
}

/// Read-only store of visibility profiles keyed by business id.
pub trait ProfileStore: Send + Sync {
    /// Fetch the profile for a business, if one exists.
    fn get_profile(
        &self,
        business_id: &str,
    ) -> impl std::future::Future<Output = Result<Option<TemplateVisibilityProfile>, ProfileError>>
    + Send;
}

/// Resolves a profile, applying the policy when none exists.
///
/// # Errors
///
/// Returns `Missing` under the `fail` policy, or `Store` if the lookup fails.
pub async fn resolve_profile<P: ProfileStore>(
    store: &P,
    business_id: &str,
    policy: MissingProfilePolicy,
) -> Result<TemplateVisibilityProfile, ProfileError> {
    match store.get_profile(business_id).await? {
        Some(profile) => Ok(profile),
        None => match policy {
            MissingProfilePolicy::Default => {
                warn!(business_id, "no visibility profile, rendering with all sections visible");
                Ok(TemplateVisibilityProfile::all_visible(business_id))
            }
            MissingProfilePolicy::Fail => Err(ProfileError::Missing(business_id.to_string())),
        },
    }
}
