use byteorder::{LittleEndian, ReadBytesExt};
use std::fmt;
use std::io::{Cursor, Read};

/// Round a segment size up to the 8-byte alignment used by account files.
///
/// Returns `None` if the padded size does not fit in `u64`.
pub const fn padded(size: u64) -> Option<u64> {
    match size.checked_add(7) {
        Some(s) => Some(s & !7),
        None => None,
    }
}

/// A 32-byte opaque key (account address or program owner).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Pubkey(pub [u8; 32]);

/// A 32-byte opaque account hash.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct AccountHash(pub [u8; 32]);

fn write_hex(f: &mut fmt::Formatter<'_>, bytes: &[u8]) -> fmt::Result {
    for b in bytes {
        write!(f, "{b:02x}")?;
    }
    Ok(())
}

impl fmt::Display for Pubkey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_hex(f, &self.0)
    }
}

impl fmt::Debug for Pubkey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Pubkey({self})")
    }
}

impl fmt::Display for AccountHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_hex(f, &self.0)
    }
}

impl fmt::Debug for AccountHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AccountHash({self})")
    }
}

fn read_key(cursor: &mut Cursor<&[u8]>) -> std::io::Result<[u8; 32]> {
    let mut key = [0u8; 32];
    cursor.read_exact(&mut key)?;
    Ok(key)
}

/// Storage header of an account: 48 bytes on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoredMeta {
    /// Obsolete global write version.
    pub write_version: u64,
    pub pubkey: Pubkey,
    /// Length of the payload that follows the hash segment.
    pub data_len: u64,
}

impl StoredMeta {
    pub const SIZE: usize = 48;

    /// Decode from at least [`Self::SIZE`] bytes.
    pub fn from_bytes(data: &[u8]) -> std::io::Result<Self> {
        let mut cursor = Cursor::new(data);
        Ok(Self {
            write_version: cursor.read_u64::<LittleEndian>()?,
            pubkey: Pubkey(read_key(&mut cursor)?),
            data_len: cursor.read_u64::<LittleEndian>()?,
        })
    }
}

/// Balance and ownership of an account: 49 bytes on disk, padded to 56.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccountMeta {
    pub lamports: u64,
    pub rent_epoch: u64,
    pub owner: Pubkey,
    pub executable: bool,
}

impl AccountMeta {
    pub const SIZE: usize = 49;

    /// Decode from at least [`Self::SIZE`] bytes.
    pub fn from_bytes(data: &[u8]) -> std::io::Result<Self> {
        let mut cursor = Cursor::new(data);
        Ok(Self {
            lamports: cursor.read_u64::<LittleEndian>()?,
            rent_epoch: cursor.read_u64::<LittleEndian>()?,
            owner: Pubkey(read_key(&mut cursor)?),
            executable: cursor.read_u8()? != 0,
        })
    }
}

pub const HASH_SIZE: usize = 32;

/// Metadata of one decoded account. The payload itself is skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccountRecord {
    pub stored: StoredMeta,
    pub account: AccountMeta,
    pub hash: AccountHash,
    /// Offset of the record's stored-metadata inside its entry.
    pub offset: usize,
}

impl AccountRecord {
    pub fn pubkey(&self) -> &Pubkey {
        &self.stored.pubkey
    }

    pub fn data_len(&self) -> u64 {
        self.stored.data_len
    }
}
