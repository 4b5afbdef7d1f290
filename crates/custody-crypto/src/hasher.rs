use chrono::{DateTime, SecondsFormat, Utc};
use custody_types::EntryHash;

/// Domain-separated BLAKE3 hasher for ledger entries.
///
/// The digest covers (timestamp, payload, previous hash) and nothing else:
/// it is a pure function of those three fields. The payload is serialized
/// to canonical JSON and the timestamp to a fixed-precision RFC 3339
/// string, so the same logical content hashes identically across process
/// restarts and regardless of the on-disk encoding.
pub struct EntryHasher {
    domain: &'static str,
}

impl EntryHasher {
    /// Hasher for chain-of-custody ledger entries.
    pub const ENTRY: Self = Self {
        domain: "custody-entry-v1",
    };

    /// Create a hasher with a custom domain tag.
    pub const fn new(domain: &'static str) -> Self {
        Self { domain }
    }

    /// Compute the digest over (timestamp, payload, previous hash).
    pub fn compute<T: serde::Serialize>(
        &self,
        timestamp: DateTime<Utc>,
        payload: &T,
        previous_hash: &EntryHash,
    ) -> Result<EntryHash, HasherError> {
        let payload_bytes = serde_json::to_vec(payload)
            .map_err(|e| HasherError::Serialization(e.to_string()))?;

        let mut hasher = blake3::Hasher::new();
        hasher.update(self.domain.as_bytes());
        hasher.update(b":");
        hasher.update(canonical_timestamp(timestamp).as_bytes());
        hasher.update(b":");
        hasher.update(&payload_bytes);
        hasher.update(b":");
        hasher.update(previous_hash.as_bytes());
        Ok(EntryHash::from_digest(*hasher.finalize().as_bytes()))
    }

    /// Verify that the fields reproduce the expected digest.
    pub fn verify<T: serde::Serialize>(
        &self,
        timestamp: DateTime<Utc>,
        payload: &T,
        previous_hash: &EntryHash,
        expected: &EntryHash,
    ) -> Result<bool, HasherError> {
        Ok(self.compute(timestamp, payload, previous_hash)? == *expected)
    }

    /// The domain tag used by this hasher.
    pub fn domain(&self) -> &str {
        self.domain
    }
}

/// Fixed-precision (microsecond) RFC 3339 form used for hashing.
fn canonical_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Errors from hashing operations.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum HasherError {
    #[error("serialization error: {0}")]
    Serialization(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn when(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    #[test]
    fn compute_is_deterministic() {
        let payload = serde_json::json!({"case_id": "CASE1"});
        let h1 = EntryHasher::ENTRY
            .compute(when(100), &payload, &EntryHash::null())
            .unwrap();
        let h2 = EntryHasher::ENTRY
            .compute(when(100), &payload, &EntryHash::null())
            .unwrap();
        assert_eq!(h1, h2);
    }

    #[test]
    fn digest_depends_on_every_field() {
        let payload = serde_json::json!({"item": 100});
        let base = EntryHasher::ENTRY
            .compute(when(100), &payload, &EntryHash::null())
            .unwrap();

        let other_time = EntryHasher::ENTRY
            .compute(when(101), &payload, &EntryHash::null())
            .unwrap();
        assert_ne!(base, other_time);

        let other_payload = EntryHasher::ENTRY
            .compute(when(100), &serde_json::json!({"item": 101}), &EntryHash::null())
            .unwrap();
        assert_ne!(base, other_payload);

        let other_prev = EntryHasher::ENTRY
            .compute(when(100), &payload, &EntryHash::from_digest([7; 32]))
            .unwrap();
        assert_ne!(base, other_prev);
    }

    #[test]
    fn verify_accepts_and_rejects() {
        let payload = serde_json::json!(["a", "b"]);
        let hash = EntryHasher::ENTRY
            .compute(when(5), &payload, &EntryHash::null())
            .unwrap();

        assert!(EntryHasher::ENTRY
            .verify(when(5), &payload, &EntryHash::null(), &hash)
            .unwrap());
        assert!(!EntryHasher::ENTRY
            .verify(when(6), &payload, &EntryHash::null(), &hash)
            .unwrap());
    }

    #[test]
    fn different_domains_produce_different_hashes() {
        let payload = serde_json::json!("same");
        let a = EntryHasher::ENTRY
            .compute(when(1), &payload, &EntryHash::null())
            .unwrap();
        let b = EntryHasher::new("custody-other-v1")
            .compute(when(1), &payload, &EntryHash::null())
            .unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn canonical_timestamp_is_fixed_precision() {
        let ts = canonical_timestamp(when(0));
        assert_eq!(ts, "1970-01-01T00:00:00.000000Z");
    }
}
