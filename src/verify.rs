use std::collections::HashMap;

use crate::{entry::SignatureEntry, error::VerificationIssue, verifier::SignatureVerifier};

/// Signature entries bucketed by algorithm.
///
/// Every bucket keeps document order. Entries without an algorithm are left out
/// and so can never be matched with a verifier.
#[derive(Debug, Clone)]
pub struct SignatureIndex<'a> {
    entries: &'a [SignatureEntry],
    buckets: HashMap<&'a str, Vec<usize>>,
}

impl<'a> SignatureIndex<'a> {
    /// Indexes `entries` by their algorithm.
    pub fn build(entries: &'a [SignatureEntry]) -> Self {
        let mut buckets: HashMap<&'a str, Vec<usize>> = HashMap::new();
        for (position, entry) in entries.iter().enumerate() {
            if let Some(algorithm) = entry.algorithm() {
                buckets.entry(algorithm).or_default().push(position);
            }
        }

        Self { entries, buckets }
    }

    /// Entries signed with `algorithm`, in document order.
    pub fn get(&self, algorithm: &str) -> Vec<&'a SignatureEntry> {
        self.positions(algorithm)
            .iter()
            .map(|&position| &self.entries[position])
            .collect()
    }

    /// The distinct algorithms present in the document.
    pub fn algorithms(&self) -> impl Iterator<Item = &'a str> + '_ {
        self.buckets.keys().copied()
    }

    /// True when no entry carries an algorithm.
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    fn positions(&self, algorithm: &str) -> &[usize] {
        self.buckets
            .get(algorithm)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}

/// Returns true if `verifier` validates any entry of its algorithm.
///
/// Entries whose signature value cannot be decoded are skipped.
pub fn verify_with<V>(entries: &[SignatureEntry], verifier: &V) -> bool
where
    V: SignatureVerifier + ?Sized,
{
    let index = SignatureIndex::build(entries);

    for entry in index.get(verifier.algorithm()) {
        match entry.verify_with(verifier) {
            Ok(true) => return true,
            Ok(false) => {}
            Err(e) => log::warn!("Skipping JWS signature entry: {e}"),
        }
    }

    log::debug!("No {} signature entry was validated", verifier.algorithm());
    false
}

/// Matches each verifier with at most one entry and returns the entries left
/// unvalidated, in document order.
///
/// Verifiers are tried in list order. Each one scans the entries of its own
/// algorithm in document order, skips entries already claimed by an earlier
/// verifier, and claims the first one it validates.
///
/// # Returns
/// * `Ok(entries)` - The unvalidated entries; empty when every entry is accounted for
/// * `Err(VerificationIssue)` - A candidate entry's signature could not be decoded
pub fn verify_and_get_non_validated<'a, V: SignatureVerifier>(
    entries: &'a [SignatureEntry],
    verifiers: &[V],
) -> Result<Vec<&'a SignatureEntry>, VerificationIssue> {
    let index = SignatureIndex::build(entries);
    let mut claimed = vec![false; entries.len()];

    for verifier in verifiers {
        for &position in index.positions(verifier.algorithm()) {
            if claimed[position] {
                continue;
            }
            if entries[position].verify_with(verifier)? {
                claimed[position] = true;
                break;
            }
        }
    }

    Ok(entries
        .iter()
        .zip(claimed)
        .filter(|(_, claimed)| !claimed)
        .map(|(entry, _)| entry)
        .collect())
}

/// Returns true if every entry is validated by some verifier in `verifiers`.
///
/// Fails closed: a `VerificationIssue` counts as a failed verification.
pub fn verify_all_with<V: SignatureVerifier>(entries: &[SignatureEntry], verifiers: &[V]) -> bool {
    match verify_and_get_non_validated(entries, verifiers) {
        Ok(remaining) if remaining.is_empty() => true,
        Ok(remaining) => {
            log::warn!(
                "{} of {} JSON JWS signatures were not validated",
                remaining.len(),
                entries.len()
            );
            false
        }
        Err(e) => {
            log::warn!("JSON JWS signature verification failed: {e}");
            false
        }
    }
}
