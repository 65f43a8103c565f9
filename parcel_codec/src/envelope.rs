use std::io::Write;

use aes::cipher::KeyInit;
use rand::RngCore;
use subtle::ConstantTimeEq;
use tracing::{debug, trace};

use crate::{
    digest_with_associated_data, BlockCipher, CounterBlock, Discriminator, Error, Key, Keystream,
    Nonce, Subkey, Tag, NONCE_LEN, PROTOCOL_KEY, TAG_LEN,
};

type Result<T, E = Error> = std::result::Result<T, E>;

/// Borrowed view of `nonce ‖ ciphertext ‖ tag`
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Envelope<'a> {
    pub nonce: &'a Nonce,
    pub ciphertext: &'a [u8],
    pub tag: &'a Tag,
}

impl<'a> Envelope<'a> {
    /// Split raw envelope bytes. Anything shorter than nonce plus tag is rejected.
    pub fn parse(bytes: &'a [u8]) -> Result<Self> {
        let invalid = || Error::InvalidEnvelope(bytes.len());
        if bytes.len() < NONCE_LEN + TAG_LEN {
            return Err(invalid());
        }
        let (nonce, rest) = bytes.split_at(NONCE_LEN);
        let (ciphertext, tag) = rest.split_at(rest.len() - TAG_LEN);
        Ok(Self {
            nonce: nonce.try_into().map_err(|_| invalid())?,
            ciphertext,
            tag: tag.try_into().map_err(|_| invalid())?,
        })
    }

    /// Total size on the wire
    pub fn encoded_len(&self) -> usize {
        NONCE_LEN + self.ciphertext.len() + TAG_LEN
    }

    pub fn write<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_all(self.nonce)?;
        writer.write_all(self.ciphertext)?;
        writer.write_all(self.tag)?;
        Ok(())
    }

    pub fn to_vec(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.encoded_len());
        bytes.extend_from_slice(self.nonce);
        bytes.extend_from_slice(self.ciphertext);
        bytes.extend_from_slice(self.tag);
        bytes
    }
}

/// Seals and opens envelopes for one key.
///
/// The payload keystream uses [`Discriminator::Payload`], the digest of the ciphertext is
/// encrypted into the tag with [`Discriminator::Tag`]. A codec holds no mutable state and
/// can be shared between threads.
#[derive(Clone, Debug)]
pub struct Codec<C = Key> {
    cipher: C,
    subkey: Subkey,
}

impl Codec<Key> {
    /// Codec for a raw 16, 24 or 32 byte AES key using the protocol subkey
    pub fn new(key: &[u8]) -> Result<Self> {
        Ok(Self::with_cipher(Key::new_from_slice(key)?))
    }

    /// Codec for the key baked into the game
    pub fn protocol() -> Self {
        Self::with_cipher(Key::Aes256(aes::Aes256::new(&PROTOCOL_KEY.into())))
    }

    /// Codec whose digest subkey is derived from its own key instead of the protocol constant
    pub fn with_derived_subkey(key: &[u8]) -> Result<Self> {
        let codec = Self::new(key)?;
        let subkey = Subkey::derive(&codec.cipher);
        Ok(codec.with_subkey(subkey))
    }
}

impl Default for Codec<Key> {
    fn default() -> Self {
        Self::protocol()
    }
}

impl<C: BlockCipher> Codec<C> {
    pub fn with_cipher(cipher: C) -> Self {
        Self {
            cipher,
            subkey: Subkey::PROTOCOL,
        }
    }

    pub fn with_subkey(mut self, subkey: Subkey) -> Self {
        self.subkey = subkey;
        self
    }

    pub fn subkey(&self) -> &Subkey {
        &self.subkey
    }

    pub fn cipher(&self) -> &C {
        &self.cipher
    }

    /// Fresh keystream for a nonce, starting at the counter selected by `discriminator`
    pub fn keystream(&self, nonce: &Nonce, discriminator: Discriminator) -> Keystream<&C> {
        Keystream::new(&self.cipher, CounterBlock::new(nonce, discriminator))
    }

    /// Expected tag for a ciphertext
    pub fn tag(&self, nonce: &Nonce, associated: &[u8], ciphertext: &[u8]) -> Tag {
        let mut tag = digest_with_associated_data(&self.subkey, associated, ciphertext);
        self.keystream(nonce, Discriminator::Tag).apply(&mut tag);
        tag
    }

    pub fn seal(&self, nonce: &Nonce, plaintext: &[u8]) -> Vec<u8> {
        self.seal_with_associated_data(nonce, &[], plaintext)
    }

    pub fn seal_with_associated_data(
        &self,
        nonce: &Nonce,
        associated: &[u8],
        plaintext: &[u8],
    ) -> Vec<u8> {
        let mut envelope = Vec::with_capacity(NONCE_LEN + plaintext.len() + TAG_LEN);
        envelope.extend_from_slice(nonce);
        envelope.extend_from_slice(plaintext);

        let mut payload = self.keystream(nonce, Discriminator::Payload);
        payload.apply(&mut envelope[NONCE_LEN..]);

        let tag = self.tag(nonce, associated, &envelope[NONCE_LEN..]);
        envelope.extend_from_slice(&tag);

        trace!(
            len = plaintext.len(),
            blocks = payload.blocks(),
            "sealed envelope"
        );
        envelope
    }

    /// Seal under a nonce drawn from the thread local CSPRNG
    pub fn seal_random(&self, plaintext: &[u8]) -> Vec<u8> {
        let mut nonce = [0; NONCE_LEN];
        rand::thread_rng().fill_bytes(&mut nonce);
        self.seal(&nonce, plaintext)
    }

    pub fn open(&self, envelope: &[u8]) -> Result<Vec<u8>> {
        self.open_with_associated_data(&[], envelope)
    }

    pub fn open_with_associated_data(&self, associated: &[u8], envelope: &[u8]) -> Result<Vec<u8>> {
        let envelope = match Envelope::parse(envelope) {
            Ok(envelope) => envelope,
            Err(err) => {
                debug!("rejected envelope: {err}");
                return Err(err);
            }
        };
        self.open_envelope(associated, &envelope)
    }

    /// Verify the tag and only then decrypt, so unauthenticated plaintext never exists
    pub fn open_envelope(&self, associated: &[u8], envelope: &Envelope) -> Result<Vec<u8>> {
        let expected = self.tag(envelope.nonce, associated, envelope.ciphertext);
        if !bool::from(expected[..].ct_eq(&envelope.tag[..])) {
            debug!(
                len = envelope.ciphertext.len(),
                "envelope failed authentication"
            );
            return Err(Error::AuthenticationFailure);
        }

        let mut plaintext = envelope.ciphertext.to_vec();
        let mut payload = self.keystream(envelope.nonce, Discriminator::Payload);
        payload.apply(&mut plaintext);

        trace!(
            len = plaintext.len(),
            blocks = payload.blocks(),
            "opened envelope"
        );
        Ok(plaintext)
    }
}

/// Decrypt and verify an envelope with a raw AES key
pub fn open(key: &[u8], envelope: &[u8]) -> Result<Vec<u8>> {
    Codec::new(key)?.open(envelope)
}

/// Encrypt `plaintext` and append its tag, producing `nonce ‖ ciphertext ‖ tag`
pub fn seal(key: &[u8], nonce: &Nonce, plaintext: &[u8]) -> Result<Vec<u8>> {
    Ok(Codec::new(key)?.seal(nonce, plaintext))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_parse_layout() {
        let bytes: Vec<u8> = (0..40).collect();
        let envelope = Envelope::parse(&bytes).unwrap();
        assert_eq!(envelope.nonce, &[0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11]);
        assert_eq!(envelope.ciphertext, &[12, 13, 14, 15, 16, 17, 18, 19, 20, 21, 22, 23]);
        assert_eq!(envelope.tag[0], 24);
        assert_eq!(envelope.tag[15], 39);
        assert_eq!(envelope.encoded_len(), 40);
        assert_eq!(envelope.to_vec(), bytes);

        let mut written = vec![];
        envelope.write(&mut written).unwrap();
        assert_eq!(written, bytes);
    }

    #[test]
    fn test_parse_minimum() {
        let envelope = Envelope::parse(&[0; 28]).unwrap();
        assert!(envelope.ciphertext.is_empty());
        assert!(matches!(
            Envelope::parse(&[0; 27]),
            Err(Error::InvalidEnvelope(27))
        ));
        assert!(matches!(Envelope::parse(&[]), Err(Error::InvalidEnvelope(0))));
    }

    #[test]
    fn test_codec_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Codec>();
    }

    #[test]
    fn test_default_is_protocol() {
        let codec = Codec::default();
        assert_eq!(codec.subkey(), &Subkey::PROTOCOL);
        assert_eq!(codec.cipher().bits(), 256);
    }
}
