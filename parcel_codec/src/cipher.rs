use aes::cipher::{BlockEncrypt, KeyInit};

use crate::{Block, Error};

/// Forward direction of a 128-bit block cipher.
///
/// Both the keystream and the digest subkey derivation only ever need to encrypt,
/// so this is the whole capability the codec asks of a cipher.
pub trait BlockCipher {
    fn encrypt_block(&self, block: &mut Block);
}

impl<C: BlockCipher + ?Sized> BlockCipher for &C {
    fn encrypt_block(&self, block: &mut Block) {
        (**self).encrypt_block(block)
    }
}

macro_rules! impl_block_cipher {
    ($($cipher:ty),*) => {$(
        impl BlockCipher for $cipher {
            fn encrypt_block(&self, block: &mut Block) {
                BlockEncrypt::encrypt_block(self, aes::Block::from_mut_slice(block));
            }
        }
    )*};
}

impl_block_cipher!(aes::Aes128, aes::Aes192, aes::Aes256);

/// AES key schedule for any of the key sizes AES accepts
#[allow(clippy::large_enum_variant)]
#[derive(Clone)]
pub enum Key {
    Aes128(aes::Aes128),
    Aes192(aes::Aes192),
    Aes256(aes::Aes256),
}

impl Key {
    /// Expand raw key bytes, selecting the AES variant from the length
    pub fn new_from_slice(key: &[u8]) -> Result<Self, Error> {
        let invalid = |_| Error::InvalidKey(key.len());
        Ok(match key.len() {
            16 => Self::Aes128(aes::Aes128::new_from_slice(key).map_err(invalid)?),
            24 => Self::Aes192(aes::Aes192::new_from_slice(key).map_err(invalid)?),
            32 => Self::Aes256(aes::Aes256::new_from_slice(key).map_err(invalid)?),
            len => return Err(Error::InvalidKey(len)),
        })
    }

    /// Key size in bits
    pub fn bits(&self) -> usize {
        match self {
            Self::Aes128(_) => 128,
            Self::Aes192(_) => 192,
            Self::Aes256(_) => 256,
        }
    }
}

impl BlockCipher for Key {
    fn encrypt_block(&self, block: &mut Block) {
        match self {
            Self::Aes128(cipher) => BlockCipher::encrypt_block(cipher, block),
            Self::Aes192(cipher) => BlockCipher::encrypt_block(cipher, block),
            Self::Aes256(cipher) => BlockCipher::encrypt_block(cipher, block),
        }
    }
}

// never print round keys
impl std::fmt::Debug for Key {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Key(AES-{})", self.bits())
    }
}

impl From<aes::Aes128> for Key {
    fn from(value: aes::Aes128) -> Self {
        Self::Aes128(value)
    }
}

impl From<aes::Aes192> for Key {
    fn from(value: aes::Aes192) -> Self {
        Self::Aes192(value)
    }
}

impl From<aes::Aes256> for Key {
    fn from(value: aes::Aes256) -> Self {
        Self::Aes256(value)
    }
}

impl TryFrom<&[u8]> for Key {
    type Error = Error;

    fn try_from(value: &[u8]) -> Result<Self, Self::Error> {
        Self::new_from_slice(value)
    }
}
