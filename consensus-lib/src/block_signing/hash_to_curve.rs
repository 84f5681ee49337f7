//! Hashing of coinbase messages onto G1, compatible with mcl's
//! `hashAndMapToG1`.
//!
//! The SHA-256 digest of the message is read as a little-endian integer and
//! truncated to 254 bits, or to 253 bits when that is still not below the
//! field modulus. The resulting field element is mapped onto the curve with
//! the Fouque-Tibouchi encoding for BN curves.

use super::curve::{g1, Fq, G1Affine};
use super::keys::field_from_le;
use crate::common::hashes::calculate_sha256;
use ark_ec::short_weierstrass::SWCurveConfig;
use ark_ff::{Field, MontFp, PrimeField, Zero};

/// sqrt(-3), the root `a^((p + 1) / 4)` picks.
const SQRT_MINUS_THREE: Fq =
    MontFp!("16798108731015832281326531451663778978262632916709829269670106367266327101444");
/// (sqrt(-3) - 1) / 2
const SQRT_MINUS_THREE_MINUS_ONE_DIV_TWO: Fq =
    MontFp!("16798108731015832283133667796947756444075910019074449559301910896669540483083");

pub fn hash_to_field(message: &[u8]) -> Fq {
    let mut digest = calculate_sha256(message);
    digest[31] &= 0x3f;
    if let Some(t) = field_from_le(&digest) {
        return t;
    }
    digest[31] &= 0x1f;
    Fq::from_le_bytes_mod_order(&digest)
}

/// Maps a field element onto G1. Returns `None` for the handful of inputs
/// the encoding is undefined on.
pub fn map_to_g1(t: Fq) -> Option<G1Affine> {
    if t.is_zero() {
        return None;
    }
    let negative = t.legendre().is_qnr();
    let b = g1::Config::COEFF_B;

    let w = SQRT_MINUS_THREE * t * (t.square() + b + Fq::ONE).inverse()?;
    let x1 = SQRT_MINUS_THREE_MINUS_ONE_DIV_TWO - t * w;
    let x2 = -x1 - Fq::ONE;
    let x3 = Fq::ONE + w.square().inverse()?;

    [x1, x2, x3].into_iter().find_map(|x| {
        let y = (x.square() * x + b).sqrt()?;
        let y = if negative { -y } else { y };
        Some(G1Affine::new_unchecked(x, y))
    })
}

pub fn hash_to_g1(message: &[u8]) -> Option<G1Affine> {
    map_to_g1(hash_to_field(message))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block_signing::Signature;
    use ark_ff::AdditiveGroup;

    fn hash_hex(message: &[u8]) -> String {
        Signature::from_point(hash_to_g1(message).unwrap()).to_string()
    }

    #[test]
    fn test_map_constants() {
        assert_eq!(SQRT_MINUS_THREE.square(), -Fq::from(3u8));
        assert_eq!(
            SQRT_MINUS_THREE_MINUS_ONE_DIV_TWO.double(),
            SQRT_MINUS_THREE - Fq::ONE
        );
        assert_eq!((-Fq::from(3u8)).sqrt(), Some(SQRT_MINUS_THREE));
    }

    #[test]
    fn test_known_message_vector() {
        let message = b"100:5:000000000019d6689c085ae165831e934ff763ae46a2a6c172b3f1b60a8ce26f";
        let t: Fq =
            MontFp!("12756837465536303783362358112543015366116860440932170181955787650991743779225");
        assert_eq!(hash_to_field(message), t);

        let point = hash_to_g1(message).unwrap();
        assert_eq!(
            point,
            G1Affine::new_unchecked(
                MontFp!("1505147862516688554466285880315107700768236528791931495706099480725581184219"),
                MontFp!("16076823062947562624577984871038704967805866301218239001252211599632500977886"),
            )
        );
        assert_eq!(
            hash_hex(message),
            "dbbc6bd2fb4ca5f45d9900d4c27717a141155f623c2f38076aabe9172de25303"
        );
    }

    #[test]
    fn test_wide_digest_drops_another_bit() {
        // The 254-bit truncation of this digest is not below the modulus.
        let t: Fq =
            MontFp!("4696094644309905352059820424657884800086612756269072816929812856431492373828");
        assert_eq!(hash_to_field(b"0:0:00"), t);
        assert_eq!(
            hash_hex(b"0:0:00"),
            "d9226a3ed37d912b85e5f64c90d9d522d5f127dd2330422cda5d9bb7a036d612"
        );
    }

    #[test]
    fn test_points_are_valid_and_distinct() {
        let a = hash_to_g1(b"1:0:aa").unwrap();
        let b = hash_to_g1(b"1:0:ab").unwrap();
        assert!(a.is_on_curve());
        assert!(b.is_on_curve());
        assert_ne!(a, b);
        assert_eq!(Some(a), hash_to_g1(b"1:0:aa"));
        assert_eq!(
            hash_hex(b""),
            "740cc0190fcf8b7887fed89f1e5d2f4776dc9dd888db87641af672e6185a939b"
        );
    }

    #[test]
    fn test_zero_has_no_image() {
        assert_eq!(map_to_g1(Fq::ZERO), None);
    }
}
