mod cipher;
mod digest;
mod envelope;
mod error;
#[cfg(feature = "json")]
mod json;
mod keystream;

pub use {cipher::*, digest::*, envelope::*, error::*, keystream::*};

#[cfg(feature = "json")]
pub use json::*;

/// Size of a single cipher block, counter block and digest block
pub const BLOCK_LEN: usize = 16;
/// Size of the nonce leading every envelope
pub const NONCE_LEN: usize = 12;
/// Size of the authentication tag trailing every envelope
pub const TAG_LEN: usize = 16;
/// Size of the key used by the game client and server
pub const KEY_LEN: usize = 32;

pub type Block = [u8; BLOCK_LEN];
pub type Nonce = [u8; NONCE_LEN];
pub type Tag = [u8; TAG_LEN];

/// AES-256 key shared by the game client and server
pub const PROTOCOL_KEY: [u8; KEY_LEN] = [
    0x4C, 0x48, 0x77, 0x55, 0x47, 0x6E, 0x6B, 0x74, 0x43, 0x6C, 0x4E, 0x76, 0x39, 0x55, 0x6F, 0x63,
    0x31, 0x47, 0x71, 0x7A, 0x63, 0x63, 0x62, 0x68, 0x72, 0x64, 0x61, 0x4A, 0x33, 0x41, 0x06, 0x0A,
];

#[repr(u8)]
#[derive(
    Clone,
    Copy,
    PartialEq,
    Eq,
    Debug,
    strum::Display,
    strum::FromRepr,
    strum::EnumIter,
)]
/// Trailing byte of a counter block, selects which keystream is derived from a key/nonce pair
pub enum Discriminator {
    Tag = 1,     // encrypts the field digest
    Payload = 2, // encrypts the message body
}

// strum shouldn't need to be installed by users
impl Discriminator {
    pub fn iter() -> DiscriminatorIter {
        <Discriminator as strum::IntoEnumIterator>::iter()
    }
}
