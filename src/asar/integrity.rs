use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HashAlgorithm {
    #[serde(rename = "SHA256")]
    Sha256,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Integrity {
    pub algorithm: HashAlgorithm,
    pub hash: String,
    pub block_size: u64,
    pub blocks: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntegrityCheck {
    Valid,
    BlockCountMismatch { expected: usize, actual: usize },
    BlockMismatch { index: usize, expected: String, actual: String },
    HashMismatch { expected: String, actual: String },
}

impl IntegrityCheck {
    pub fn is_valid(&self) -> bool {
        matches!(self, IntegrityCheck::Valid)
    }
}

impl fmt::Display for IntegrityCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IntegrityCheck::Valid => write!(f, "valid"),
            IntegrityCheck::BlockCountMismatch { expected, actual } => {
                write!(f, "expected {} content blocks, found {}", expected, actual)
            }
            IntegrityCheck::BlockMismatch {
                index,
                expected,
                actual,
            } => write!(
                f,
                "block {} hash mismatch (wants {}, got {})",
                index, expected, actual
            ),
            IntegrityCheck::HashMismatch { expected, actual } => {
                write!(f, "content hash mismatch (wants {}, got {})", expected, actual)
            }
        }
    }
}

/// Checks `data` against the recorded checksums: per-block hashes first,
/// then the whole-entry hash. The first divergence wins.
pub fn verify(data: &[u8], integrity: &Integrity) -> IntegrityCheck {
    match integrity.algorithm {
        HashAlgorithm::Sha256 => check_sha256(data, integrity),
    }
}

fn check_sha256(data: &[u8], integrity: &Integrity) -> IntegrityCheck {
    if integrity.block_size > 0 {
        let chunks: Vec<&[u8]> = data.chunks(integrity.block_size as usize).collect();
        if chunks.len() != integrity.blocks.len() {
            return IntegrityCheck::BlockCountMismatch {
                expected: integrity.blocks.len(),
                actual: chunks.len(),
            };
        }
        for (index, (chunk, expected)) in chunks.iter().zip(&integrity.blocks).enumerate() {
            let actual = sha256_hex(chunk);
            if actual != *expected {
                return IntegrityCheck::BlockMismatch {
                    index,
                    expected: expected.clone(),
                    actual,
                };
            }
        }
    }

    let actual = sha256_hex(data);
    if actual != integrity.hash {
        return IntegrityCheck::HashMismatch {
            expected: integrity.hash.clone(),
            actual,
        };
    }

    IntegrityCheck::Valid
}

pub fn sha256_hex(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    // SHA-256 of the ASCII string "abc", a published test vector.
    const ABC_DIGEST: &str = "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad";
    const EMPTY_DIGEST: &str = "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";

    fn integrity_for(data: &[u8], block_size: u64) -> Integrity {
        let blocks = if block_size > 0 {
            data.chunks(block_size as usize).map(sha256_hex).collect()
        } else {
            Vec::new()
        };
        Integrity {
            algorithm: HashAlgorithm::Sha256,
            hash: sha256_hex(data),
            block_size,
            blocks,
        }
    }

    #[test]
    fn test_sha256_matches_known_vector() {
        assert_eq!(sha256_hex(b"abc"), ABC_DIGEST);
        assert_eq!(sha256_hex(b""), EMPTY_DIGEST);
    }

    #[test]
    fn test_valid_single_block() {
        let integrity = Integrity {
            algorithm: HashAlgorithm::Sha256,
            hash: ABC_DIGEST.to_string(),
            block_size: 4194304,
            blocks: vec![ABC_DIGEST.to_string()],
        };
        assert_eq!(verify(b"abc", &integrity), IntegrityCheck::Valid);
    }

    #[test]
    fn test_hash_mismatch_reports_digests() {
        let mut integrity = integrity_for(b"abc", 4194304);
        integrity.hash = EMPTY_DIGEST.to_string();
        match verify(b"abc", &integrity) {
            IntegrityCheck::HashMismatch { expected, actual } => {
                assert_eq!(expected, EMPTY_DIGEST);
                assert_eq!(actual, ABC_DIGEST);
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[test]
    fn test_block_mismatch_reports_index() {
        let data = b"abcdefgh";
        let mut integrity = integrity_for(data, 3);
        integrity.blocks[1] = EMPTY_DIGEST.to_string();
        match verify(data, &integrity) {
            IntegrityCheck::BlockMismatch { index, .. } => assert_eq!(index, 1),
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[test]
    fn test_block_count_mismatch() {
        let data = b"abcdefgh";
        let mut integrity = integrity_for(data, 3);
        integrity.blocks.pop();
        assert_eq!(
            verify(data, &integrity),
            IntegrityCheck::BlockCountMismatch {
                expected: 2,
                actual: 3,
            }
        );
    }

    #[test]
    fn test_empty_entry_is_valid() {
        let integrity = Integrity {
            algorithm: HashAlgorithm::Sha256,
            hash: EMPTY_DIGEST.to_string(),
            block_size: 4194304,
            blocks: Vec::new(),
        };
        assert_eq!(verify(b"", &integrity), IntegrityCheck::Valid);
    }

    #[test]
    fn test_deserialize_integrity_json() {
        let json = r#"{
            "algorithm": "SHA256",
            "hash": "932cafcedb9780bd300f3a03fab763dc700dbe89cedd0c77b0b57258f92ef480",
            "blockSize": 4194304,
            "blocks": [
                "932cafcedb9780bd300f3a03fab763dc700dbe89cedd0c77b0b57258f92ef480"
            ]
        }"#;
        let integrity: Integrity = serde_json::from_str(json).unwrap();
        assert_eq!(integrity.algorithm, HashAlgorithm::Sha256);
        assert_eq!(integrity.block_size, 4194304);
        assert_eq!(integrity.blocks.len(), 1);
    }

    #[test]
    fn test_unknown_algorithm_rejected() {
        let json = r#"{
            "algorithm": "MD5",
            "hash": "00",
            "blockSize": 4,
            "blocks": []
        }"#;
        assert!(serde_json::from_str::<Integrity>(json).is_err());
    }

    #[test]
    fn test_mismatch_display() {
        let outcome = IntegrityCheck::BlockMismatch {
            index: 2,
            expected: "aa".to_string(),
            actual: "bb".to_string(),
        };
        assert_eq!(outcome.to_string(), "block 2 hash mismatch (wants aa, got bb)");
        assert!(!outcome.is_valid());
    }
}
