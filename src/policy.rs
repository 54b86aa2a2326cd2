use std::{fs, path::PathBuf};

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};

use crate::{
    document::JwsJsonDocument, entry::SignatureEntry, error::VerificationIssue,
    verifier::VerifierType,
};

/// A set of verifiers that must all find a signature before a document is
/// trusted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrustPolicy {
    /// One verifier per required signature
    pub verifiers: Vec<VerifierType>,
}

impl TrustPolicy {
    pub fn new(verifiers: Vec<VerifierType>) -> Self {
        Self { verifiers }
    }

    /// Returns true if every signature of `document` is validated by one of the
    /// policy's verifiers.
    pub fn evaluate(&self, document: &JwsJsonDocument) -> bool {
        document.verify_all_with(&self.verifiers)
    }

    /// The signatures of `document` that no verifier of this policy validated.
    pub fn unverified<'a>(
        &self,
        document: &'a JwsJsonDocument,
    ) -> Result<Vec<&'a SignatureEntry>, VerificationIssue> {
        document.verify_and_get_non_validated(&self.verifiers)
    }
}

/// Saves a trust policy as JSON in the specified folder.
///
/// # Arguments
///
/// * `policy` - The policy to save.
/// * `folder` - The directory to save the policy file in.
/// * `name` - The filename for the policy file.
pub fn save_policy(policy: &TrustPolicy, folder: PathBuf, name: &str) -> Result<()> {
    let policy_file = folder.join(name);

    let policy_str = serde_json::to_string_pretty(policy)?;

    fs::write(policy_file, policy_str).map_err(|e| anyhow!("Failed to write to file: {e}"))?;
    Ok(())
}

/// Loads a trust policy from a JSON file.
pub fn load_policy(policy_file: PathBuf) -> Result<TrustPolicy> {
    let policy_str = fs::read_to_string(&policy_file)
        .with_context(|| format!("Failed to read policy file {}", policy_file.display()))?;
    let policy = serde_json::from_str(&policy_str)
        .with_context(|| format!("Invalid policy file {}", policy_file.display()))?;
    log::debug!("Loaded trust policy from {}", policy_file.display());
    Ok(policy)
}
