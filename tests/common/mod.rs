//! Fixture builders for snapshot archives.

#![allow(dead_code)]

pub const BLOCK: usize = 512;

/// Field values of one synthetic account record.
#[derive(Debug, Clone)]
pub struct AccountSpec {
    pub write_version: u64,
    pub pubkey: [u8; 32],
    pub lamports: u64,
    pub rent_epoch: u64,
    pub owner: [u8; 32],
    pub executable: bool,
    pub hash: [u8; 32],
    pub data: Vec<u8>,
}

impl AccountSpec {
    pub fn new(seed: u8, lamports: u64, data_len: usize) -> Self {
        Self {
            write_version: u64::from(seed) * 10,
            pubkey: [seed; 32],
            lamports,
            rent_epoch: 361,
            owner: [seed ^ 0xFF; 32],
            executable: seed % 2 == 1,
            hash: [seed.wrapping_mul(3); 32],
            data: vec![seed; data_len],
        }
    }

    /// Serialise with every segment padded to 8 bytes.
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend(self.write_version.to_le_bytes());
        out.extend(self.pubkey);
        out.extend((self.data.len() as u64).to_le_bytes());

        out.extend(self.lamports.to_le_bytes());
        out.extend(self.rent_epoch.to_le_bytes());
        out.extend(self.owner);
        out.push(u8::from(self.executable));
        pad8(&mut out);

        out.extend(self.hash);
        out.extend_from_slice(&self.data);
        pad8(&mut out);
        out
    }
}

fn pad8(buf: &mut Vec<u8>) {
    buf.resize((buf.len() + 7) & !7, 0);
}

pub fn account_file(accounts: &[AccountSpec]) -> Vec<u8> {
    accounts.iter().flat_map(AccountSpec::encode).collect()
}

/// Build a GNU tar header block with a decimal size field.
pub fn header(name: &str, size: usize, typeflag: u8) -> Vec<u8> {
    let mut block = vec![0u8; BLOCK];
    block[..name.len()].copy_from_slice(name.as_bytes());
    block[100..107].copy_from_slice(b"0000644");
    let size_field = format!("{size:011}");
    block[124..135].copy_from_slice(size_field.as_bytes());
    block[156] = typeflag;
    block[257..263].copy_from_slice(b"ustar ");
    block[263..265].copy_from_slice(b" \0");
    block
}

/// Build a tar archive from (name, body) pairs; empty bodies become directories.
pub fn tar(entries: &[(&str, Vec<u8>)]) -> Vec<u8> {
    let mut out = Vec::new();
    for (name, body) in entries {
        let typeflag = if body.is_empty() { b'5' } else { b'0' };
        out.extend(header(name, body.len(), typeflag));
        out.extend_from_slice(body);
        out.resize(out.len().div_ceil(BLOCK) * BLOCK, 0);
    }
    out.extend([0u8; 2 * BLOCK]);
    out
}

pub fn zstd(data: &[u8]) -> Vec<u8> {
    ::zstd::encode_all(data, 3).unwrap()
}

/// A small but representative snapshot archive.
pub fn sample_snapshot() -> Vec<u8> {
    tar(&[
        ("version", b"1.2.0".to_vec()),
        ("accounts/", Vec::new()),
        (
            "accounts/100.0",
            account_file(&[
                AccountSpec::new(1, 1_000, 0),
                AccountSpec::new(2, 2_000, 13),
                AccountSpec::new(3, 3_000, 700),
            ]),
        ),
        ("snapshots/100/100", vec![0x5A; 1300]),
        (
            "accounts/101.1",
            account_file(&[AccountSpec::new(4, 4_000, 8), AccountSpec::new(5, 5_000, 0)]),
        ),
        ("snapshots/status_cache", vec![0x11; 512]),
    ])
}
