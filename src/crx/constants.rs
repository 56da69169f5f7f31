/// "Cr24" in ASCII.
pub const CRX_MAGIC_VALUE: [u8; 4] = [0x43, 0x72, 0x32, 0x34];

pub const CRX2_VERSION: u32 = 2;
pub const CRX3_VERSION: u32 = 3;

/// magic + version + pubkey length + signature length
pub const CRX2_PREFIX_LENGTH: usize = 16;
/// magic + version + header length
pub const CRX3_PREFIX_LENGTH: usize = 12;

// Sanity ceilings for lengths declared in headers we read.
pub const CRX2_MAX_PUBLIC_KEY_LENGTH: u32 = 1024 * 32;
pub const CRX2_MAX_SIGNATURE_LENGTH: u32 = 1024 * 64;
pub const CRX3_MAX_HEADER_LENGTH: u32 = 1024 * 128;

// Limits for headers we write.
pub const PACK_MAX_PUBLIC_KEY_LENGTH: usize = 1024 * 32;
pub const PACK_MAX_SIGNATURE_LENGTH: usize = 1024 * 128;

/// Number of characters in an extension id.
pub const ID_LEN: usize = 32;
