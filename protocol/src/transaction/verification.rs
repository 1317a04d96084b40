//! Validation of signed records.
//!
//! [`Verifier::validate`] is the only gate a received [`SignedTx`] has to
//! pass. The checks run in a fixed order and the first failure wins, so the
//! error a caller sees is deterministic for any given input:
//!
//! 1. chain id
//! 2. account id format of `from` and `to`
//! 3. self-transfer
//! 4. signature value ranges
//! 5. signer recovery against `from`
//!
//! The cheap policy checks come before any curve arithmetic.

use super::signing::SignedTx;
use crate::config::SchemeConfig;
use crate::crypto::hash;
use crate::crypto::signatures;
use crate::error::StampError;
use crate::identity::{is_account_id, AccountId};

/// Validates [`SignedTx`]s produced under one scheme.
#[derive(Debug, Clone, Default)]
pub struct Verifier {
    scheme: SchemeConfig,
}

impl Verifier {
    pub fn new(scheme: SchemeConfig) -> Self {
        Self { scheme }
    }

    pub fn scheme(&self) -> &SchemeConfig {
        &self.scheme
    }

    /// Runs the ordered validation gate against `expected_chain_id`.
    ///
    /// # Errors
    ///
    /// - [`StampError::ChainMismatch`]
    /// - [`StampError::InvalidAccountFormat`]
    /// - [`StampError::SelfTransferRejected`]
    /// - [`StampError::InvalidSignatureValues`]
    /// - [`StampError::SignerMismatch`]
    /// - [`StampError::RecoveryFailed`] if no public key can be recovered
    ///   from otherwise well-formed values.
    pub fn validate(&self, signed: &SignedTx, expected_chain_id: u16) -> Result<(), StampError> {
        self.validate_signer(signed, expected_chain_id).map(|_| ())
    }

    /// Same gate as [`Verifier::validate`], returning the recovered signer on
    /// success so callers need not recover it a second time.
    pub fn validate_signer(
        &self,
        signed: &SignedTx,
        expected_chain_id: u16,
    ) -> Result<AccountId, StampError> {
        let result = self.run_gate(signed, expected_chain_id);
        if let Err(ref e) = result {
            tracing::debug!(
                scheme = self.scheme.name(),
                chain_id = signed.tx.chain_id(),
                nonce = signed.tx.nonce(),
                from = %signed.tx.from(),
                error = %e,
                "signed transaction rejected"
            );
        }
        result
    }

    fn run_gate(
        &self,
        signed: &SignedTx,
        expected_chain_id: u16,
    ) -> Result<AccountId, StampError> {
        let tx = &signed.tx;

        if tx.chain_id() != expected_chain_id {
            return Err(StampError::ChainMismatch {
                expected: expected_chain_id,
                got: tx.chain_id(),
            });
        }

        for (field, account) in [("from", tx.from()), ("to", tx.to())] {
            if !is_account_id(account.as_str()) {
                return Err(StampError::InvalidAccountFormat {
                    field,
                    value: account.to_string(),
                });
            }
        }

        if tx.from() == tx.to() {
            return Err(StampError::SelfTransferRejected {
                from: tx.from().to_string(),
                to: tx.to().to_string(),
            });
        }

        signatures::validate_signature_values(
            &signed.v,
            &signed.r,
            &signed.s,
            self.scheme.offset(),
        )?;

        let recovered = self.from_address(signed)?;
        if recovered != *tx.from() {
            return Err(StampError::SignerMismatch {
                expected: tx.from().to_string(),
                recovered: recovered.to_string(),
            });
        }

        Ok(recovered)
    }

    /// Recovers the address that signed `signed`, with no policy checks.
    ///
    /// Does not compare the result with `from`; use [`Verifier::validate`]
    /// for that.
    pub fn from_address(&self, signed: &SignedTx) -> Result<AccountId, StampError> {
        let digest = hash::stamp(&self.scheme, &signed.tx)?;
        let raw = signed.raw_signature(&self.scheme)?;
        signatures::recover_address(&digest, &raw)
    }

    /// Validates each record independently, returning one result per input
    /// in the same order.
    pub fn validate_batch(
        &self,
        batch: &[SignedTx],
        expected_chain_id: u16,
    ) -> Vec<Result<(), StampError>> {
        batch
            .iter()
            .map(|signed| self.validate(signed, expected_chain_id))
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::keys::Secp256k1Keypair;
    use crate::transaction::builder::Tx;
    use crate::transaction::signing::Signer;
    use num_bigint::BigUint;

    const TO: &str = "0xffac146642b60Fbc7E1b096455F6D144b15fdfff";

    fn tx_from(kp: &Secp256k1Keypair) -> Tx {
        let from = kp.address().to_string();
        Tx::new(1, 0, &from, TO, 80_000, 0, b"hello".to_vec()).unwrap()
    }

    fn signed_tx() -> (Secp256k1Keypair, SignedTx) {
        let kp = Secp256k1Keypair::generate();
        let signed = Signer::default().sign(&tx_from(&kp), &kp).unwrap();
        (kp, signed)
    }

    /// Re-wraps `signed` around a different record, keeping the signature.
    fn with_tx(signed: &SignedTx, tx: Tx) -> SignedTx {
        SignedTx {
            tx,
            ..signed.clone()
        }
    }

    #[test]
    fn valid_transaction_passes() {
        let (_, signed) = signed_tx();
        assert!(Verifier::default().validate(&signed, 1).is_ok());
    }

    #[test]
    fn validate_signer_returns_recovered_address() {
        let (kp, signed) = signed_tx();
        let verifier = Verifier::default();
        assert_eq!(verifier.validate_signer(&signed, 1).unwrap(), kp.address());
        assert!(matches!(
            verifier.validate_signer(&signed, 2),
            Err(StampError::ChainMismatch { .. })
        ));
    }

    #[test]
    fn from_address_recovers_signer() {
        let (kp, signed) = signed_tx();
        assert_eq!(Verifier::default().from_address(&signed).unwrap(), kp.address());
    }

    #[test]
    fn chain_mismatch() {
        let (_, signed) = signed_tx();
        match Verifier::default().validate(&signed, 2) {
            Err(StampError::ChainMismatch { expected: 2, got: 1 }) => {}
            other => panic!("expected ChainMismatch, got {:?}", other),
        }
    }

    #[test]
    fn self_transfer_rejected() {
        let kp = Secp256k1Keypair::generate();
        let addr = kp.address().to_string();
        let tx = Tx::new(1, 0, &addr, &addr, 1, 0, Vec::new()).unwrap();
        let signed = Signer::default().sign(&tx, &kp).unwrap();
        match Verifier::default().validate(&signed, 1) {
            Err(StampError::SelfTransferRejected { .. }) => {}
            other => panic!("expected SelfTransferRejected, got {:?}", other),
        }
    }

    #[test]
    fn self_transfer_ignores_hex_case() {
        let kp = Secp256k1Keypair::generate();
        let addr = kp.address().to_string();
        let tx = Tx::new(1, 0, &addr, &addr.to_lowercase(), 1, 0, Vec::new()).unwrap();
        let signed = Signer::default().sign(&tx, &kp).unwrap();
        assert!(matches!(
            Verifier::default().validate(&signed, 1),
            Err(StampError::SelfTransferRejected { .. })
        ));
    }

    #[test]
    fn chain_is_checked_before_self_transfer() {
        let kp = Secp256k1Keypair::generate();
        let addr = kp.address().to_string();
        let tx = Tx::new(5, 0, &addr, &addr, 1, 0, Vec::new()).unwrap();
        let signed = Signer::default().sign(&tx, &kp).unwrap();
        assert!(matches!(
            Verifier::default().validate(&signed, 1),
            Err(StampError::ChainMismatch { .. })
        ));
    }

    #[test]
    fn ethereum_style_v_is_rejected() {
        let (_, mut signed) = signed_tx();
        signed.v = BigUint::from(27u8);
        match Verifier::default().validate(&signed, 1) {
            Err(StampError::InvalidSignatureValues { .. }) => {}
            other => panic!("expected InvalidSignatureValues, got {:?}", other),
        }
    }

    #[test]
    fn zero_r_is_rejected() {
        let (_, mut signed) = signed_tx();
        signed.r = BigUint::from(0u8);
        assert!(matches!(
            Verifier::default().validate(&signed, 1),
            Err(StampError::InvalidSignatureValues { .. })
        ));
    }

    #[test]
    fn high_s_is_rejected() {
        let (_, mut signed) = signed_tx();
        // n - s is the malleable twin of a low-s signature.
        let n = BigUint::parse_bytes(
            b"FFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFEBAAEDCE6AF48A03BBFD25E8CD0364141",
            16,
        )
        .unwrap();
        signed.s = &n - &signed.s;
        match Verifier::default().validate(&signed, 1) {
            Err(StampError::InvalidSignatureValues { .. }) => {}
            other => panic!("expected InvalidSignatureValues, got {:?}", other),
        }
    }

    #[test]
    fn tampered_fields_fail_with_signer_mismatch() {
        let (kp, signed) = signed_tx();
        let from = kp.address().to_string();
        let other_to = "0x00000000000000000000000000000000000000aa";
        let tampered = [
            Tx::new(1, 1, &from, TO, 80_000, 0, b"hello".to_vec()).unwrap(),
            Tx::new(1, 0, &from, other_to, 80_000, 0, b"hello".to_vec()).unwrap(),
            Tx::new(1, 0, &from, TO, 80_001, 0, b"hello".to_vec()).unwrap(),
            Tx::new(1, 0, &from, TO, 80_000, 7, b"hello".to_vec()).unwrap(),
            Tx::new(1, 0, &from, TO, 80_000, 0, b"hellO".to_vec()).unwrap(),
        ];
        for tx in tampered {
            let forged = with_tx(&signed, tx);
            match Verifier::default().validate(&forged, 1) {
                Err(StampError::SignerMismatch { .. }) => {}
                other => panic!("expected SignerMismatch, got {:?}", other),
            }
        }
    }

    #[test]
    fn claimed_sender_must_be_signer() {
        let signer = Secp256k1Keypair::generate();
        let claimed = Secp256k1Keypair::generate();
        let tx = tx_from(&claimed);
        let signed = Signer::default().sign(&tx, &signer).unwrap();
        match Verifier::default().validate(&signed, 1) {
            Err(StampError::SignerMismatch {
                expected,
                recovered,
            }) => {
                assert_eq!(expected, claimed.address().to_string());
                assert_eq!(recovered, signer.address().to_string());
            }
            other => panic!("expected SignerMismatch, got {:?}", other),
        }
    }

    #[test]
    fn other_scheme_name_does_not_validate() {
        let kp = Secp256k1Keypair::generate();
        let acme = SchemeConfig::new("Acme", 29).unwrap();
        let signed = Signer::new(acme).sign(&tx_from(&kp), &kp).unwrap();

        assert!(matches!(
            Verifier::default().validate(&signed, 1),
            Err(StampError::SignerMismatch { .. })
        ));
    }

    #[test]
    fn other_scheme_offset_does_not_validate() {
        let kp = Secp256k1Keypair::generate();
        let eth_offset = SchemeConfig::new("Jesserc", 27).unwrap();
        let signed = Signer::new(eth_offset.clone()).sign(&tx_from(&kp), &kp).unwrap();

        assert!(Verifier::new(eth_offset).validate(&signed, 1).is_ok());
        assert!(matches!(
            Verifier::default().validate(&signed, 1),
            Err(StampError::InvalidSignatureValues { .. })
        ));
    }

    #[test]
    fn batch_results_are_independent() {
        let (_, good) = signed_tx();
        let (_, mut bad) = signed_tx();
        bad.v = BigUint::from(31u8);

        let results = Verifier::default().validate_batch(&[good.clone(), bad, good], 1);
        assert_eq!(results.len(), 3);
        assert!(results[0].is_ok());
        assert!(matches!(results[1], Err(StampError::InvalidSignatureValues { .. })));
        assert!(results[2].is_ok());
    }

    #[test]
    fn convenience_wrappers_agree() {
        let (kp, signed) = signed_tx();
        let scheme = SchemeConfig::default();
        assert!(signed.validate(&scheme, 1).is_ok());
        assert_eq!(signed.from_address(&scheme).unwrap(), kp.address());
    }
}
