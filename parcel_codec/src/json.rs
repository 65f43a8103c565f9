use base64::{engine::general_purpose, Engine as _};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{BlockCipher, Codec, Error, Nonce};

type Result<T, E = Error> = std::result::Result<T, E>;

/// HTTP body wrapping a base64 encoded envelope
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedData {
    pub data: Option<String>,
}

impl<C: BlockCipher> Codec<C> {
    /// Decode a base64 envelope and return its plaintext as a string
    pub fn decrypt_json_data(&self, data: &str) -> Result<String> {
        let envelope = general_purpose::STANDARD
            .decode(data.trim())
            .map_err(|_| Error::Base64)?;
        Ok(String::from_utf8(self.open(&envelope)?)?)
    }

    /// Seal `utf8_bytes` under a random nonce and return the envelope as base64
    pub fn encrypt_json_data(&self, utf8_bytes: &[u8]) -> String {
        general_purpose::STANDARD.encode(self.seal_random(utf8_bytes))
    }

    pub fn encrypt_json_data_with_nonce(&self, nonce: &Nonce, utf8_bytes: &[u8]) -> String {
        general_purpose::STANDARD.encode(self.seal(nonce, utf8_bytes))
    }

    /// Unwrap an [`EncryptedData`] body. A body without `data` yields `None`.
    pub fn decrypt_json_response(&self, body: &str) -> Result<Option<String>> {
        let response = serde_json::from_str::<EncryptedData>(body.trim())?;
        match response.data {
            Some(data) => self.decrypt_json_data(&data).map(Some).map_err(|err| {
                debug!("could not decrypt json body: {err}");
                err
            }),
            None => Ok(None),
        }
    }

    /// Seal `utf8_bytes` and wrap the envelope in an [`EncryptedData`] body
    pub fn encrypt_json_response(&self, utf8_bytes: &[u8]) -> Result<String> {
        Ok(serde_json::to_string(&EncryptedData {
            data: Some(self.encrypt_json_data(utf8_bytes)),
        })?)
    }
}
