use byteorder::{ByteOrder, BE};

use crate::{Block, BlockCipher, BLOCK_LEN};

/// Reduction feedback of the field polynomial x^128 + x^7 + x^2 + x + 1, in reflected bit order
const REDUCTION: u8 = 0xE1;

/// Multiplier of the field digest.
///
/// The protocol uses one hard coded value for every session. It happens to equal the
/// encryption of an all zero block under [`crate::PROTOCOL_KEY`], which is what
/// [`Subkey::derive`] computes, but nothing in the game derives it at runtime.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Subkey(Block);

impl Subkey {
    pub const PROTOCOL: Subkey = Subkey([
        0xE7, 0xB2, 0x87, 0x76, 0xD1, 0xEF, 0x3F, 0xE0, 0xE0, 0x68, 0xE4, 0x1D, 0xD5, 0xC9, 0x57,
        0xFF,
    ]);

    pub const fn from_bytes(bytes: Block) -> Self {
        Self(bytes)
    }

    /// Subkey obtained by encrypting the zero block
    pub fn derive<C: BlockCipher>(cipher: &C) -> Self {
        let mut block = [0; BLOCK_LEN];
        cipher.encrypt_block(&mut block);
        Self(block)
    }

    pub fn as_bytes(&self) -> &Block {
        &self.0
    }
}

impl Default for Subkey {
    fn default() -> Self {
        Self::PROTOCOL
    }
}

/// Carry-less product of `a` and `b` in GF(2^128).
///
/// Bits are consumed from `a` most significant first. After each bit the running copy of
/// `b` moves one position right across all 16 bytes and is reduced when a bit falls off.
pub fn multiply(a: &Block, b: &Block) -> Block {
    let mut product = [0; BLOCK_LEN];
    let mut rolling = *b;
    for byte in a {
        for bit in 0..8 {
            if byte & (0x80 >> bit) != 0 {
                xor_into(&mut product, &rolling);
            }
            if shift_right(&mut rolling) {
                rolling[0] ^= REDUCTION;
            }
        }
    }
    product
}

/// Shift a big endian 128-bit value right by one, returning the bit shifted out
fn shift_right(value: &mut Block) -> bool {
    let wide = u128::from_be_bytes(*value);
    *value = (wide >> 1).to_be_bytes();
    wide & 1 != 0
}

fn xor_into(acc: &mut Block, block: &Block) {
    for (a, b) in acc.iter_mut().zip(block) {
        *a ^= b;
    }
}

/// Fold `data` into the accumulator one block at a time, right padding the last block with zeros
fn absorb(acc: &mut Block, subkey: &Subkey, data: &[u8]) {
    for chunk in data.chunks(BLOCK_LEN) {
        let mut block = [0; BLOCK_LEN];
        block[..chunk.len()].copy_from_slice(chunk);
        xor_into(acc, &block);
        *acc = multiply(acc, &subkey.0);
    }
}

/// Final block binding the lengths (in bits) of the associated data and the ciphertext
pub fn length_block(associated_len: usize, data_len: usize) -> Block {
    // the game only keeps 32 bits of each bit length
    let bits = |len: usize| (len as u32).wrapping_mul(8);
    let mut block = [0; BLOCK_LEN];
    BE::write_u32(&mut block[4..8], bits(associated_len));
    BE::write_u32(&mut block[12..16], bits(data_len));
    block
}

/// Field digest of `data` with no associated data
pub fn digest(subkey: &Subkey, data: &[u8]) -> Block {
    digest_with_associated_data(subkey, &[], data)
}

/// Field digest of `associated` followed by `data`, each padded to whole blocks, then the length block
pub fn digest_with_associated_data(subkey: &Subkey, associated: &[u8], data: &[u8]) -> Block {
    let mut acc = [0; BLOCK_LEN];
    absorb(&mut acc, subkey, associated);
    absorb(&mut acc, subkey, data);
    absorb(&mut acc, subkey, &length_block(associated.len(), data.len()));
    acc
}
