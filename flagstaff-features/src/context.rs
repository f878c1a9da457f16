//! Evaluation context
//!
//! The attributes of the caller that targeting rules look at. Built fresh for
//! every evaluation, usually from the authenticated principal of a request.

use crate::value::FlagValue;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Who a flag is being evaluated for.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlagContext {
    pub user_id: Option<String>,
    pub email: Option<String>,
    pub organization_id: Option<String>,
    /// Informational. Environment-specific values follow the engine's
    /// current environment, not this field.
    pub environment: Option<String>,
    pub attributes: BTreeMap<String, FlagValue>,
}

impl FlagContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// A context with no identifier. Rollout rules never match it.
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Build a context from an authenticated principal.
    ///
    /// ```
    /// use flagstaff_features::{FlagContext, Principal};
    ///
    /// struct Session { user: String, org: String }
    ///
    /// impl Principal for Session {
    ///     fn user_id(&self) -> Option<&str> { Some(self.user.as_str()) }
    ///     fn organization_id(&self) -> Option<&str> { Some(self.org.as_str()) }
    /// }
    ///
    /// let session = Session { user: "user-42".into(), org: "acme".into() };
    /// let context = FlagContext::from_principal(&session);
    /// assert_eq!(context.identifier(), Some("user-42"));
    /// ```
    pub fn from_principal<P: Principal + ?Sized>(principal: &P) -> Self {
        Self {
            user_id: principal.user_id().map(str::to_string),
            email: principal.email().map(str::to_string),
            organization_id: principal.organization_id().map(str::to_string),
            ..Self::default()
        }
    }

    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_organization_id(mut self, organization_id: impl Into<String>) -> Self {
        self.organization_id = Some(organization_id.into());
        self
    }

    pub fn with_environment(mut self, environment: impl Into<String>) -> Self {
        self.environment = Some(environment.into());
        self
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<FlagValue>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn attribute(&self, key: &str) -> Option<&FlagValue> {
        self.attributes.get(key)
    }

    /// Identifier used for allowlist, blocklist and bucketing.
    ///
    /// The first non-empty of user id, organization id and email.
    pub fn identifier(&self) -> Option<&str> {
        [&self.user_id, &self.organization_id, &self.email]
            .into_iter()
            .filter_map(|id| id.as_deref())
            .find(|id| !id.is_empty())
    }
}

/// An authenticated caller that can be turned into a [`FlagContext`].
pub trait Principal {
    fn user_id(&self) -> Option<&str>;

    fn email(&self) -> Option<&str> {
        None
    }

    fn organization_id(&self) -> Option<&str> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct ApiKey;

    impl Principal for ApiKey {
        fn user_id(&self) -> Option<&str> {
            None
        }

        fn email(&self) -> Option<&str> {
            Some("ops@example.com")
        }
    }

    #[test]
    fn test_identifier_priority() {
        let full = FlagContext::new()
            .with_email("a@example.com")
            .with_organization_id("org-1")
            .with_user_id("user-1");
        assert_eq!(full.identifier(), Some("user-1"));

        let org = FlagContext::new()
            .with_email("a@example.com")
            .with_organization_id("org-1");
        assert_eq!(org.identifier(), Some("org-1"));

        let email = FlagContext::new().with_email("a@example.com");
        assert_eq!(email.identifier(), Some("a@example.com"));

        assert_eq!(FlagContext::anonymous().identifier(), None);
    }

    #[test]
    fn test_empty_identifier_is_skipped() {
        let context = FlagContext::new().with_user_id("").with_email("a@example.com");
        assert_eq!(context.identifier(), Some("a@example.com"));
    }

    #[test]
    fn test_from_principal() {
        let context = FlagContext::from_principal(&ApiKey);
        assert_eq!(context.user_id, None);
        assert_eq!(context.identifier(), Some("ops@example.com"));
    }

    #[test]
    fn test_attributes() {
        let context = FlagContext::new()
            .with_attribute("plan", "pro")
            .with_attribute("seats", 12);

        assert_eq!(context.attribute("plan"), Some(&FlagValue::from("pro")));
        assert_eq!(context.attribute("seats"), Some(&FlagValue::Number(12.0)));
        assert_eq!(context.attribute("region"), None);
    }

    #[test]
    fn test_deserialize_partial_context() {
        let context: FlagContext =
            serde_json::from_str(r#"{"user_id": "user-7", "attributes": {"beta": true}}"#).unwrap();
        assert_eq!(context.identifier(), Some("user-7"));
        assert_eq!(context.attribute("beta"), Some(&FlagValue::Bool(true)));
    }
}
