//! License lookup and the access gate.
//!
//! A request carries two unrelated secrets: the license key identifying the
//! paying customer, and the caller's own upstream model credential. The gate
//! checks both before any byte of the upload is read.

use crate::error::{AccessError, AnalysisError};
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use tracing::{debug, info};

/// Resolves a license key to the customer it was issued to.
///
/// Implementations must be cheap and side-effect free; the gate calls this on
/// every request. A database-backed store can replace [`StaticLicenseRegistry`]
/// without touching the gate.
pub trait LicenseRegistry: Send + Sync {
    /// Return the customer identifier for `key`, or `None` if unknown.
    fn resolve(&self, key: &str) -> Option<String>;
}

static BUILTIN_LICENSES: Lazy<HashMap<String, String>> = Lazy::new(|| {
    [("LICENCIA123", "cliente1"), ("LICENCIA456", "cliente2")]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
});

/// In-memory license table, fixed for the lifetime of the process.
#[derive(Debug, Clone)]
pub struct StaticLicenseRegistry {
    licenses: HashMap<String, String>,
}

impl StaticLicenseRegistry {
    pub fn new(licenses: HashMap<String, String>) -> Self {
        Self { licenses }
    }

    /// The compiled-in table.
    pub fn builtin() -> Self {
        Self::new(BUILTIN_LICENSES.clone())
    }

    /// Load a table from a JSON object of `{"license-key": "customer"}` pairs.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, AnalysisError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            AnalysisError::InvalidConfig(format!(
                "cannot read license file '{}': {e}",
                path.display()
            ))
        })?;
        let licenses: HashMap<String, String> = serde_json::from_str(&raw).map_err(|e| {
            AnalysisError::InvalidConfig(format!(
                "license file '{}' is not a JSON object of strings: {e}",
                path.display()
            ))
        })?;
        info!("Loaded {} licenses from {}", licenses.len(), path.display());
        Ok(Self::new(licenses))
    }

    pub fn len(&self) -> usize {
        self.licenses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.licenses.is_empty()
    }
}

impl LicenseRegistry for StaticLicenseRegistry {
    fn resolve(&self, key: &str) -> Option<String> {
        self.licenses.get(key).cloned()
    }
}

/// The caller's upstream model-provider secret.
///
/// Lives for one request. `Debug` is redacted and there is no `Display`, so
/// the value cannot end up in a log line by accident.
#[derive(Clone)]
pub struct UpstreamCredential(String);

impl UpstreamCredential {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    /// The raw secret, for handing to the provider client only.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for UpstreamCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("UpstreamCredential(<redacted>)")
    }
}

/// A request that passed the gate.
#[derive(Debug, Clone)]
pub struct Authorized {
    pub customer: String,
    pub credential: UpstreamCredential,
}

/// Check the license key, then the upstream credential.
///
/// The license is checked first: a request with neither header is a 403,
/// not a 401. A blank credential counts as missing.
pub fn authorize(
    registry: &dyn LicenseRegistry,
    license_key: Option<&str>,
    credential: Option<&str>,
) -> Result<Authorized, AccessError> {
    let customer = license_key
        .and_then(|key| registry.resolve(key))
        .ok_or(AccessError::LicenseInvalid)?;

    let credential = credential
        .filter(|c| !c.trim().is_empty())
        .map(UpstreamCredential::new)
        .ok_or(AccessError::CredentialMissing)?;

    debug!("License accepted for customer '{}'", customer);
    Ok(Authorized {
        customer,
        credential,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn builtin_table_maps_known_keys() {
        let reg = StaticLicenseRegistry::builtin();
        assert_eq!(reg.resolve("LICENCIA123").as_deref(), Some("cliente1"));
        assert_eq!(reg.resolve("LICENCIA456").as_deref(), Some("cliente2"));
        assert_eq!(reg.resolve("licencia123"), None);
        assert_eq!(reg.len(), 2);
    }

    #[test]
    fn authorize_accepts_valid_pair() {
        let reg = StaticLicenseRegistry::builtin();
        let auth = authorize(&reg, Some("LICENCIA123"), Some("sk-test")).unwrap();
        assert_eq!(auth.customer, "cliente1");
        assert_eq!(auth.credential.expose(), "sk-test");
    }

    #[test]
    fn license_is_checked_before_credential() {
        let reg = StaticLicenseRegistry::builtin();
        assert_eq!(
            authorize(&reg, None, None).unwrap_err(),
            AccessError::LicenseInvalid
        );
        assert_eq!(
            authorize(&reg, Some("NOPE"), None).unwrap_err(),
            AccessError::LicenseInvalid
        );
    }

    #[test]
    fn missing_or_blank_credential_is_rejected() {
        let reg = StaticLicenseRegistry::builtin();
        assert_eq!(
            authorize(&reg, Some("LICENCIA456"), None).unwrap_err(),
            AccessError::CredentialMissing
        );
        assert_eq!(
            authorize(&reg, Some("LICENCIA456"), Some("   ")).unwrap_err(),
            AccessError::CredentialMissing
        );
    }

    #[test]
    fn credential_debug_is_redacted() {
        let cred = UpstreamCredential::new("sk-very-secret");
        let shown = format!("{cred:?}");
        assert!(!shown.contains("sk-very-secret"));
        let auth = Authorized {
            customer: "c".into(),
            credential: cred,
        };
        assert!(!format!("{auth:?}").contains("sk-very-secret"));
    }

    #[test]
    fn loads_table_from_json_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"ACME-1": "acme", "ACME-2": "acme-labs"}}"#).unwrap();
        let reg = StaticLicenseRegistry::from_json_file(file.path()).unwrap();
        assert_eq!(reg.resolve("ACME-2").as_deref(), Some("acme-labs"));
        assert_eq!(reg.resolve("LICENCIA123"), None);
    }

    #[test]
    fn rejects_malformed_license_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "[1, 2, 3]").unwrap();
        let err = StaticLicenseRegistry::from_json_file(file.path()).unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidConfig(_)));
    }
}
