use byteorder::{ByteOrder, BE};

use crate::{Block, BlockCipher, Discriminator, Error, Key, Nonce, BLOCK_LEN, NONCE_LEN};

type Result<T, E = Error> = std::result::Result<T, E>;

/// Initial cipher input of a keystream: nonce, three zero bytes and a discriminator.
///
/// Only the trailing 32 bits count up, the nonce part is never touched.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct CounterBlock(Block);

impl CounterBlock {
    pub fn new(nonce: &Nonce, discriminator: Discriminator) -> Self {
        let mut block = [0; BLOCK_LEN];
        block[..NONCE_LEN].copy_from_slice(nonce);
        block[BLOCK_LEN - 1] = discriminator as u8;
        Self(block)
    }

    pub fn from_bytes(block: Block) -> Self {
        Self(block)
    }

    pub fn as_bytes(&self) -> &Block {
        &self.0
    }

    pub fn nonce(&self) -> &[u8] {
        &self.0[..NONCE_LEN]
    }

    /// Big endian counter word occupying bytes 12..16
    pub fn counter(&self) -> u32 {
        BE::read_u32(&self.0[NONCE_LEN..])
    }

    /// Step to the next block, wrapping the counter word without carrying into the nonce
    pub fn increment(&mut self) {
        let next = self.counter().wrapping_add(1);
        BE::write_u32(&mut self.0[NONCE_LEN..], next);
    }
}

impl From<CounterBlock> for Block {
    fn from(value: CounterBlock) -> Self {
        value.0
    }
}

/// Counter mode keystream over any [`BlockCipher`].
///
/// The position is kept between calls to [`Keystream::apply`], so transforming a
/// buffer in several chunks gives the same bytes as transforming it at once.
pub struct Keystream<C> {
    cipher: C,
    counter: CounterBlock,
    block: Block,
    position: u64,
    blocks: u64,
}

impl<C: BlockCipher> Keystream<C> {
    pub fn new(cipher: C, counter: CounterBlock) -> Self {
        Self {
            cipher,
            counter,
            block: [0; BLOCK_LEN],
            position: 0,
            blocks: 0,
        }
    }

    /// XOR keystream into `data`. Encrypts and decrypts alike.
    pub fn apply(&mut self, mut data: &mut [u8]) {
        while !data.is_empty() {
            let offset = (self.position % BLOCK_LEN as u64) as usize;
            if offset == 0 {
                self.next_block();
            }
            let take = data.len().min(BLOCK_LEN - offset);
            let (head, rest) = std::mem::take(&mut data).split_at_mut(take);
            for (byte, key) in head.iter_mut().zip(&self.block[offset..]) {
                *byte ^= key;
            }
            self.position += take as u64;
            data = rest;
        }
    }

    /// Write raw keystream bytes into `out`
    pub fn fill(&mut self, out: &mut [u8]) {
        out.fill(0);
        self.apply(out);
    }

    /// Number of keystream bytes consumed so far
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Number of blocks the cipher has encrypted so far
    pub fn blocks(&self) -> u64 {
        self.blocks
    }

    /// Counter block that produced the most recent keystream block
    pub fn counter(&self) -> &CounterBlock {
        &self.counter
    }

    fn next_block(&mut self) {
        // the very first block uses the initial counter as is
        if self.blocks != 0 {
            self.counter.increment();
        }
        self.block = *self.counter.as_bytes();
        self.cipher.encrypt_block(&mut self.block);
        self.blocks += 1;
    }
}

/// Produce `len` keystream bytes for a raw AES key
pub fn generate(key: &[u8], counter: CounterBlock, len: usize) -> Result<Vec<u8>> {
    let key = Key::new_from_slice(key)?;
    let mut out = vec![0; len];
    Keystream::new(&key, counter).fill(&mut out);
    Ok(out)
}

/// Encrypt or decrypt `data` with a raw AES key, returning the transformed copy
pub fn apply(key: &[u8], counter: CounterBlock, data: &[u8]) -> Result<Vec<u8>> {
    let key = Key::new_from_slice(key)?;
    let mut out = data.to_vec();
    Keystream::new(&key, counter).apply(&mut out);
    Ok(out)
}
