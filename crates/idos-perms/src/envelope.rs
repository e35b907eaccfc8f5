//! Sealed credential envelope.
//!
//! A sealed message is the box nonce followed by the box ciphertext, carried
//! as base64 text. Consumers treat it as opaque beyond the nonce prefix.

use crypto_box::aead::generic_array::GenericArray;
use crypto_box::aead::Aead;
use crypto_box::SalsaBox;

use idos_core::codec;

use crate::crypto::{BoxNonce, BoxPublicKey, BoxSecretKey, NONCE_LEN, TAG_LEN};
use crate::error::{PermsError, Result};

/// A sealed credential body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SealedMessage {
    /// Nonce used for this seal (unique per seal, public).
    pub nonce: BoxNonce,

    /// Box ciphertext, including the authentication tag.
    pub ciphertext: Vec<u8>,
}

impl SealedMessage {
    /// Seal `plaintext` from `sender` to `recipient` under a fresh nonce.
    pub fn seal(
        plaintext: &[u8],
        recipient: &BoxPublicKey,
        sender: &BoxSecretKey,
    ) -> Result<Self> {
        Self::seal_with_nonce(plaintext, recipient, sender, BoxNonce::generate())
    }

    /// Seal under a caller-chosen nonce.
    ///
    /// The nonce must never be reused with the same key pair.
    pub fn seal_with_nonce(
        plaintext: &[u8],
        recipient: &BoxPublicKey,
        sender: &BoxSecretKey,
        nonce: BoxNonce,
    ) -> Result<Self> {
        let salsa = SalsaBox::new(
            &crypto_box::PublicKey::from(recipient.0),
            &sender.to_box_secret(),
        );
        let ciphertext = salsa
            .encrypt(GenericArray::from_slice(&nonce.0[..]), plaintext)
            .map_err(|e| PermsError::EncryptionError(e.to_string()))?;

        Ok(Self { nonce, ciphertext })
    }

    /// Open with the sender's public key and the recipient's secret key.
    ///
    /// Returns `None` if the ciphertext does not authenticate.
    pub fn open(&self, sender: &BoxPublicKey, recipient: &BoxSecretKey) -> Option<Vec<u8>> {
        let salsa = SalsaBox::new(
            &crypto_box::PublicKey::from(sender.0),
            &recipient.to_box_secret(),
        );
        salsa
            .decrypt(GenericArray::from_slice(&self.nonce.0[..]), self.ciphertext.as_slice())
            .ok()
    }

    /// Split raw `nonce || ciphertext` bytes.
    ///
    /// Returns `None` if the input is too short to hold a nonce and a tag.
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < NONCE_LEN + TAG_LEN {
            return None;
        }
        let (nonce, ciphertext) = bytes.split_at(NONCE_LEN);
        let nonce = codec::decode_fixed(nonce).ok()?;
        Some(Self {
            nonce: BoxNonce(nonce),
            ciphertext: ciphertext.to_vec(),
        })
    }

    /// Raw `nonce || ciphertext` bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        codec::concat(&[&self.nonce.0[..], &self.ciphertext[..]])
    }

    /// Parse the base64 wire form.
    ///
    /// A decodable but too-short message yields `Ok(None)`.
    pub fn from_base64(text: &str) -> Result<Option<Self>> {
        Ok(Self::from_bytes(&codec::base64_decode(text)?))
    }

    /// Encode to the base64 wire form.
    pub fn to_base64(&self) -> String {
        codec::base64_encode(&self.to_bytes())
    }

    /// Length of the plaintext this message decrypts to.
    pub fn plaintext_len(&self) -> usize {
        self.ciphertext.len().saturating_sub(TAG_LEN)
    }
}

/// Seal `plaintext` for a recipient, returning `base64(nonce || ciphertext)`.
pub fn seal(
    plaintext: &[u8],
    recipient_public_key: &[u8],
    sender_secret_key: &[u8],
) -> Result<String> {
    let recipient = BoxPublicKey::from_slice(recipient_public_key)?;
    let sender = BoxSecretKey::from_slice(sender_secret_key)?;
    Ok(SealedMessage::seal(plaintext, &recipient, &sender)?.to_base64())
}

/// Seal under a fixed nonce, for known-answer tests.
pub fn seal_with_nonce(
    plaintext: &[u8],
    recipient_public_key: &[u8],
    sender_secret_key: &[u8],
    nonce: BoxNonce,
) -> Result<String> {
    let recipient = BoxPublicKey::from_slice(recipient_public_key)?;
    let sender = BoxSecretKey::from_slice(sender_secret_key)?;
    Ok(SealedMessage::seal_with_nonce(plaintext, &recipient, &sender, nonce)?.to_base64())
}

/// Open a base64 sealed message.
///
/// Malformed base64 and wrong-length keys are errors. A message that is too
/// short, was tampered with, or was sealed for someone else yields `Ok(None)`:
/// callers must read that as "not decryptable with these keys", never as an
/// empty credential.
pub fn open(
    sealed_message_b64: &str,
    sender_public_key_b64: &str,
    recipient_secret_key_b64: &str,
) -> Result<Option<Vec<u8>>> {
    let sealed = SealedMessage::from_base64(sealed_message_b64)?;
    let sender = BoxPublicKey::from_base64(sender_public_key_b64)?;
    let recipient = BoxSecretKey::from_base64(recipient_secret_key_b64)?;

    Ok(sealed.and_then(|message| message.open(&sender, &recipient)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::BoxKeyPair;
    use proptest::prelude::*;

    fn b64(bytes: &[u8]) -> String {
        codec::base64_encode(bytes)
    }

    #[test]
    fn test_seal_open_roundtrip() {
        let sender = BoxKeyPair::generate();
        let recipient = BoxKeyPair::generate();

        let sealed = seal(
            b"hello",
            recipient.public_key().as_bytes(),
            sender.secret_key().as_bytes(),
        )
        .unwrap();

        let opened = open(
            &sealed,
            &sender.public_key().to_base64(),
            &b64(recipient.secret_key().as_bytes()),
        )
        .unwrap();

        assert_eq!(opened, Some(b"hello".to_vec()));
    }

    #[test]
    fn test_wrong_recipient_is_empty() {
        let sender = BoxKeyPair::generate();
        let recipient = BoxKeyPair::generate();
        let intruder = BoxKeyPair::generate();

        let sealed = seal(
            b"secret",
            recipient.public_key().as_bytes(),
            sender.secret_key().as_bytes(),
        )
        .unwrap();

        let opened = open(
            &sealed,
            &sender.public_key().to_base64(),
            &b64(intruder.secret_key().as_bytes()),
        )
        .unwrap();

        assert_eq!(opened, None);
    }

    #[test]
    fn test_wrong_sender_key_is_empty() {
        let sender = BoxKeyPair::generate();
        let recipient = BoxKeyPair::generate();
        let other = BoxKeyPair::generate();

        let sealed = SealedMessage::seal(b"x", &recipient.public_key(), sender.secret_key()).unwrap();
        assert!(sealed.open(&other.public_key(), recipient.secret_key()).is_none());
    }

    #[test]
    fn test_tampered_ciphertext_is_empty() {
        let sender = BoxKeyPair::generate();
        let recipient = BoxKeyPair::generate();

        let mut sealed =
            SealedMessage::seal(b"tamper me", &recipient.public_key(), sender.secret_key())
                .unwrap();
        sealed.ciphertext[0] ^= 0x01;

        assert!(sealed.open(&sender.public_key(), recipient.secret_key()).is_none());
    }

    #[test]
    fn test_short_message_is_empty() {
        let sender = BoxKeyPair::generate();
        let recipient = BoxKeyPair::generate();

        let opened = open(
            &b64(&[0u8; NONCE_LEN]),
            &sender.public_key().to_base64(),
            &b64(recipient.secret_key().as_bytes()),
        )
        .unwrap();
        assert_eq!(opened, None);
    }

    #[test]
    fn test_malformed_base64_is_error() {
        let pair = BoxKeyPair::generate();
        let result = open(
            "%%%not-base64%%%",
            &pair.public_key().to_base64(),
            &b64(pair.secret_key().as_bytes()),
        );
        assert!(matches!(result, Err(PermsError::Decode(_))));
    }

    #[test]
    fn test_wrong_key_length_is_error() {
        let pair = BoxKeyPair::generate();
        assert!(matches!(
            seal(b"x", &[0u8; 16], pair.secret_key().as_bytes()),
            Err(PermsError::InvalidKey(_))
        ));
    }

    #[test]
    fn test_wire_layout() {
        let sender = BoxKeyPair::from_seed([1; 32]);
        let recipient = BoxKeyPair::from_seed([2; 32]);
        let nonce = BoxNonce::from_bytes([7; NONCE_LEN]);

        let sealed = seal_with_nonce(
            b"hello",
            recipient.public_key().as_bytes(),
            sender.secret_key().as_bytes(),
            nonce,
        )
        .unwrap();

        let raw = codec::base64_decode(&sealed).unwrap();
        assert_eq!(raw.len(), NONCE_LEN + 5 + TAG_LEN);
        assert_eq!(&raw[..NONCE_LEN], nonce.as_bytes());

        let parsed = SealedMessage::from_base64(&sealed).unwrap().unwrap();
        assert_eq!(parsed.plaintext_len(), 5);
        assert_eq!(parsed.to_base64(), sealed);

        // Same inputs and nonce give the same output.
        let again = seal_with_nonce(
            b"hello",
            recipient.public_key().as_bytes(),
            sender.secret_key().as_bytes(),
            nonce,
        )
        .unwrap();
        assert_eq!(sealed, again);
    }

    #[test]
    fn test_fresh_nonce_per_seal() {
        let sender = BoxKeyPair::generate();
        let recipient = BoxKeyPair::generate();

        let a = SealedMessage::seal(b"same", &recipient.public_key(), sender.secret_key()).unwrap();
        let b = SealedMessage::seal(b"same", &recipient.public_key(), sender.secret_key()).unwrap();
        assert_ne!(a.nonce, b.nonce);
        assert_ne!(a.ciphertext, b.ciphertext);
    }

    #[test]
    fn test_box_is_symmetric_in_key_agreement() {
        // The recipient can also seal back to the sender with the same pair of keys.
        let a = BoxKeyPair::generate();
        let b = BoxKeyPair::generate();

        let to_b = SealedMessage::seal(b"ping", &b.public_key(), a.secret_key()).unwrap();
        let to_a = SealedMessage::seal(b"pong", &a.public_key(), b.secret_key()).unwrap();

        assert_eq!(to_b.open(&a.public_key(), b.secret_key()).unwrap(), b"ping");
        assert_eq!(to_a.open(&b.public_key(), a.secret_key()).unwrap(), b"pong");
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn prop_open_recovers_plaintext(
            plaintext in prop::collection::vec(any::<u8>(), 0..512),
            sender_seed in any::<[u8; 32]>(),
            recipient_seed in any::<[u8; 32]>(),
        ) {
            let sender = BoxKeyPair::from_seed(sender_seed);
            let recipient = BoxKeyPair::from_seed(recipient_seed);

            let sealed = seal(&plaintext, recipient.public_key().as_bytes(), sender.secret_key().as_bytes()).unwrap();
            let opened = open(&sealed, &sender.public_key().to_base64(), &b64(recipient.secret_key().as_bytes())).unwrap();

            prop_assert_eq!(opened, Some(plaintext));
        }
    }
}
