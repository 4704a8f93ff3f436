use tracing::{trace, warn};

use super::structures::{AccountHash, AccountMeta, AccountRecord, HASH_SIZE, StoredMeta, padded};

const STORED_META_STRIDE: usize = stride(StoredMeta::SIZE);
const ACCOUNT_META_STRIDE: usize = stride(AccountMeta::SIZE);
const HASH_STRIDE: usize = stride(HASH_SIZE);

const fn stride(size: usize) -> usize {
    match padded(size as u64) {
        Some(len) => len as usize,
        None => panic!("segment size overflows"),
    }
}

/// Result of decoding one entry body.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecodeOutcome {
    /// Records handed to the callback.
    pub records: usize,
    /// Bytes after the last complete record that did not form a record.
    pub trailing_bytes: usize,
}

impl DecodeOutcome {
    pub fn is_truncated(&self) -> bool {
        self.trailing_bytes > 0
    }
}

/// Walks the packed account records stored in snapshot account files.
///
/// Each record is four segments laid out back to back, every one padded to
/// an 8-byte boundary:
///
/// ```text
/// +-------------+--------------+------+-------------------+
/// | StoredMeta  | AccountMeta  | hash | payload           |
/// | 48 bytes    | 49 -> 56     | 32   | data_len -> pad 8 |
/// +-------------+--------------+------+-------------------+
/// ```
///
/// Decoding stops quietly at the first segment that does not fit in the
/// remaining bytes; every record before it is still reported.
#[derive(Debug, Clone)]
pub struct AccountDecoder {
    prefix: String,
}

impl Default for AccountDecoder {
    fn default() -> Self {
        Self::new(Self::DEFAULT_PREFIX)
    }
}

impl AccountDecoder {
    /// Path prefix of account files inside a snapshot archive.
    pub const DEFAULT_PREFIX: &'static str = "accounts/";

    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Whether an entry with this name holds account records.
    pub fn matches(&self, entry_name: &str) -> bool {
        entry_name.starts_with(&self.prefix)
    }

    /// Decode every complete record in `body`, calling `on_record` for each
    /// in layout order.
    ///
    /// Entries outside the prefix and empty bodies are ignored.
    pub fn decode<F>(&self, entry_name: &str, body: &[u8], mut on_record: F) -> DecodeOutcome
    where
        F: FnMut(&AccountRecord),
    {
        let mut outcome = DecodeOutcome::default();
        if body.is_empty() || !self.matches(entry_name) {
            return outcome;
        }

        let mut pos = 0usize;
        loop {
            let start = pos;
            let remaining = |pos: usize| body.len() - pos;

            if remaining(pos) < STORED_META_STRIDE {
                break;
            }
            let Ok(stored) = StoredMeta::from_bytes(&body[pos..pos + StoredMeta::SIZE]) else {
                break;
            };
            pos += STORED_META_STRIDE;

            if remaining(pos) < ACCOUNT_META_STRIDE {
                pos = start;
                break;
            }
            let Ok(account) = AccountMeta::from_bytes(&body[pos..pos + AccountMeta::SIZE]) else {
                pos = start;
                break;
            };
            pos += ACCOUNT_META_STRIDE;

            if remaining(pos) < HASH_STRIDE {
                pos = start;
                break;
            }
            let mut hash = [0u8; HASH_SIZE];
            hash.copy_from_slice(&body[pos..pos + HASH_SIZE]);
            pos += HASH_STRIDE;

            let payload = match padded(stored.data_len) {
                Some(len) if len <= remaining(pos) as u64 => len as usize,
                _ => {
                    pos = start;
                    break;
                }
            };
            pos += payload;

            let record = AccountRecord {
                stored,
                account,
                hash: AccountHash(hash),
                offset: start,
            };
            trace!(entry = entry_name, pubkey = %record.stored.pubkey, offset = start, "account record");
            on_record(&record);
            outcome.records += 1;
        }

        outcome.trailing_bytes = body.len() - pos;
        if outcome.is_truncated() {
            warn!(
                entry = entry_name,
                records = outcome.records,
                trailing_bytes = outcome.trailing_bytes,
                "account entry ends with an incomplete record"
            );
        }
        outcome
    }
}
