use std::fmt;

/// Size of every archive block (headers and content) in bytes.
pub const BLOCK_SIZE: usize = 512;

/// Magic value carried by GNU tar headers at [`MAGIC_OFFSET`].
pub const MAGIC: &[u8; 6] = b"ustar ";

const NAME_OFFSET: usize = 0;
const NAME_LEN: usize = 100;
const SIZE_OFFSET: usize = 124;
const SIZE_LEN: usize = 12;
const TYPEFLAG_OFFSET: usize = 156;
pub const MAGIC_OFFSET: usize = 257;

/// Round a logical entry size up to the next block boundary.
///
/// Returns `None` if the rounded size does not fit in `usize`.
pub fn round_to_block(size: usize) -> Option<usize> {
    size.checked_add(BLOCK_SIZE - 1)
        .map(|s| s & !(BLOCK_SIZE - 1))
}

/// Radix used to decode the textual size field of a header.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SizeRadix {
    /// Size fields are read as base-10 text.
    #[default]
    Decimal,
    /// Size fields are read as base-8 text, as standard tar writers emit them.
    Octal,
}

impl SizeRadix {
    fn base(self) -> u64 {
        match self {
            SizeRadix::Decimal => 10,
            SizeRadix::Octal => 8,
        }
    }
}

/// Entry type taken from the header's type flag.
///
/// Informational only: content-less entries are recognised by their size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Regular,
    Directory,
    Symlink,
    Other(u8),
}

impl EntryKind {
    pub fn from_typeflag(flag: u8) -> Self {
        match flag {
            b'0' | 0 => EntryKind::Regular,
            b'5' => EntryKind::Directory,
            b'2' => EntryKind::Symlink,
            other => EntryKind::Other(other),
        }
    }
}

/// Reasons a header block can be rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderError {
    BadMagic([u8; 6]),
    SizeOverflow,
}

impl fmt::Display for HeaderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HeaderError::BadMagic(found) => write!(
                f,
                "tar file has wrong magic number (found {:?}, expected {:?})",
                String::from_utf8_lossy(found),
                String::from_utf8_lossy(MAGIC)
            ),
            HeaderError::SizeOverflow => write!(f, "entry size field overflows"),
        }
    }
}

/// Parsed view of one header block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TarHeader {
    pub name: String,
    pub size: usize,
    pub kind: EntryKind,
}

impl TarHeader {
    /// Parse a complete header block.
    pub fn from_block(block: &[u8; BLOCK_SIZE], radix: SizeRadix) -> Result<Self, HeaderError> {
        let magic = &block[MAGIC_OFFSET..MAGIC_OFFSET + MAGIC.len()];
        if magic != MAGIC {
            let mut found = [0u8; 6];
            found.copy_from_slice(magic);
            return Err(HeaderError::BadMagic(found));
        }

        let name_field = &block[NAME_OFFSET..NAME_OFFSET + NAME_LEN];
        let name_len = name_field
            .iter()
            .position(|&b| b == 0)
            .unwrap_or(NAME_LEN);
        let name = String::from_utf8_lossy(&name_field[..name_len]).into_owned();

        let size = parse_size(&block[SIZE_OFFSET..SIZE_OFFSET + SIZE_LEN], radix)?;

        Ok(Self {
            name,
            size,
            kind: EntryKind::from_typeflag(block[TYPEFLAG_OFFSET]),
        })
    }

    /// Whether the block is entirely zero, as the end-of-archive marker is.
    pub fn is_zero_block(block: &[u8; BLOCK_SIZE]) -> bool {
        block.iter().all(|&b| b == 0)
    }
}

/// Decode a textual size field the way `strtol` does: skip leading
/// whitespace, read digits until the first non-digit, no digits means zero.
pub fn parse_size(field: &[u8], radix: SizeRadix) -> Result<usize, HeaderError> {
    let base = radix.base();
    let mut value: u64 = 0;
    for digit in field
        .iter()
        .skip_while(|b| b.is_ascii_whitespace())
        .map_while(|&b| (b as char).to_digit(base as u32))
    {
        value = value
            .checked_mul(base)
            .and_then(|v| v.checked_add(digit as u64))
            .ok_or(HeaderError::SizeOverflow)?;
    }
    usize::try_from(value).map_err(|_| HeaderError::SizeOverflow)
}
