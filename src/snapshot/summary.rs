use std::ops::ControlFlow;

use super::SnapshotVisitor;
use crate::accounts::{AccountRecord, DecodeOutcome};
use crate::tar::Entry;

/// Aggregate statistics over a scanned snapshot.
#[derive(Debug, Clone, Default)]
pub struct Summary {
    /// Entries with content, in any directory.
    pub entries: u64,
    /// Logical bytes across all entries.
    pub entry_bytes: u64,
    /// Entries decoded as account files.
    pub account_entries: u64,
    /// Account records decoded.
    pub accounts: u64,
    pub executable_accounts: u64,
    pub lamports: u128,
    /// Declared payload bytes across all accounts (padding excluded).
    pub data_bytes: u64,
    /// Account files that ended with an incomplete record.
    pub truncated_entries: u64,
    /// Entry names in archive order, if recording was requested.
    pub names: Vec<String>,
    record_names: bool,
    stop_after: Option<u64>,
}

impl Summary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep the name of every entry in [`Summary::names`].
    pub fn record_names(mut self, enabled: bool) -> Self {
        self.record_names = enabled;
        self
    }

    /// Stop the scan once `limit` entries have been processed.
    pub fn stop_after(mut self, limit: Option<u64>) -> Self {
        self.stop_after = limit;
        self
    }
}

impl SnapshotVisitor for Summary {
    fn on_entry(&mut self, entry: &Entry<'_>) -> ControlFlow<()> {
        self.entries += 1;
        self.entry_bytes += entry.body.len() as u64;
        if self.record_names {
            self.names.push(entry.name.to_string());
        }
        ControlFlow::Continue(())
    }

    fn on_account(&mut self, _entry: &Entry<'_>, record: &AccountRecord) {
        self.accounts += 1;
        self.lamports += u128::from(record.account.lamports);
        self.data_bytes += record.data_len();
        if record.account.executable {
            self.executable_accounts += 1;
        }
    }

    fn on_entry_end(&mut self, _entry: &Entry<'_>, accounts: Option<&DecodeOutcome>) -> ControlFlow<()> {
        if let Some(outcome) = accounts {
            self.account_entries += 1;
            if outcome.is_truncated() {
                self.truncated_entries += 1;
            }
        }
        match self.stop_after {
            Some(limit) if self.entries >= limit => ControlFlow::Break(()),
            _ => ControlFlow::Continue(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accounts::{AccountHash, AccountMeta, Pubkey, StoredMeta};
    use crate::tar::EntryKind;

    fn entry<'a>(name: &'a str, body: &'a [u8]) -> Entry<'a> {
        Entry {
            name,
            kind: EntryKind::Regular,
            body,
            offset: 0,
        }
    }

    fn record(lamports: u64, data_len: u64, executable: bool) -> AccountRecord {
        AccountRecord {
            stored: StoredMeta {
                write_version: 0,
                pubkey: Pubkey::default(),
                data_len,
            },
            account: AccountMeta {
                lamports,
                rent_epoch: 0,
                owner: Pubkey::default(),
                executable,
            },
            hash: AccountHash::default(),
            offset: 0,
        }
    }

    #[test]
    fn accumulates_entries_and_accounts() {
        let mut summary = Summary::new().record_names(true);
        let e = entry("accounts/1.1", b"....");
        assert!(summary.on_entry(&e).is_continue());
        summary.on_account(&e, &record(u64::MAX, 10, false));
        summary.on_account(&e, &record(5, 0, true));
        let outcome = DecodeOutcome {
            records: 2,
            trailing_bytes: 3,
        };
        assert!(summary.on_entry_end(&e, Some(&outcome)).is_continue());

        let v = entry("version", b"1.2.3");
        let _ = summary.on_entry(&v);
        let _ = summary.on_entry_end(&v, None);

        assert_eq!(summary.entries, 2);
        assert_eq!(summary.entry_bytes, 9);
        assert_eq!(summary.account_entries, 1);
        assert_eq!(summary.accounts, 2);
        assert_eq!(summary.executable_accounts, 1);
        assert_eq!(summary.lamports, u128::from(u64::MAX) + 5);
        assert_eq!(summary.data_bytes, 10);
        assert_eq!(summary.truncated_entries, 1);
        assert_eq!(summary.names, ["accounts/1.1", "version"]);
    }

    #[test]
    fn stop_after_breaks_on_limit() {
        let mut summary = Summary::new().stop_after(Some(2));
        let e = entry("a", b"x");
        let _ = summary.on_entry(&e);
        assert!(summary.on_entry_end(&e, None).is_continue());
        let _ = summary.on_entry(&e);
        assert!(summary.on_entry_end(&e, None).is_break());
    }
}
