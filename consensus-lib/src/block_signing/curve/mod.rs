//! The BN254 curve of the mcl library (`Fp254BNb`), which the network signer
//! keys are defined over.
//!
//! It is parameterized by `u = -(2^62 + 2^55 + 1)`. The quadratic extension
//! uses `i^2 = -1` and the sextic twist uses `xi = 1 + i`. G1 is
//! `y^2 = x^3 + 2` over `Fq` and G2 is the D-type twist `y^2 = x^3 + 2/xi`
//! over `Fq2`. This is not the `alt_bn128` curve.

use ark_ec::bn::{self, Bn, BnConfig, TwistType};
use ark_ff::MontFp;

mod fields;
pub mod g1;
pub mod g2;

pub use fields::*;

pub struct Config;

impl BnConfig for Config {
    const X: &'static [u64] = &[0x4080000000000001];
    /// `u` is negative.
    const X_IS_NEGATIVE: bool = true;
    /// NAF of `|6u + 2|`, least significant digit first.
    #[rustfmt::skip]
    const ATE_LOOP_COUNT: &'static [i8] = &[
        0, 0, 1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
        0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
        0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
        0, 0, 0, 0, 0, 0, 0, 0, -1, 0, 1, 0, 0, 0, 0, -1,
        0, 1,
    ];

    /// xi^((p - 1) / 3)
    const TWIST_MUL_BY_Q_X: Fq2 = Fq2::new(
        MontFp!("0"),
        MontFp!("16798108731015832283133667796947756444075910019074449559301910896669540483083"),
    );
    /// xi^((p - 1) / 2)
    const TWIST_MUL_BY_Q_Y: Fq2 = Fq2::new(
        MontFp!("16226349498735898878582721725794281106152147739300925444201528929117996286405"),
        MontFp!("16226349498735898878582721725794281106152147739300925444201528929117996286405"),
    );
    const TWIST_TYPE: TwistType = TwistType::D;
    type Fp = Fq;
    type Fp2Config = Fq2Config;
    type Fp6Config = Fq6Config;
    type Fp12Config = Fq12Config;
    type G1Config = g1::Config;
    type G2Config = g2::Config;
}

pub type Bn254 = Bn<Config>;

pub type G1Affine = bn::G1Affine<Config>;
pub type G1Projective = bn::G1Projective<Config>;
pub type G2Affine = bn::G2Affine<Config>;
pub type G2Projective = bn::G2Projective<Config>;

#[cfg(test)]
mod tests {
    use super::*;
    use ark_ec::pairing::Pairing;
    use ark_ec::{AffineRepr, CurveGroup, PrimeGroup};
    use ark_ff::fields::Fp6Config;
    use ark_ff::{Field, One, PrimeField, Zero};

    #[test]
    fn test_loop_count_is_six_u_plus_two() {
        let u = Config::X[0] as i128;
        let naf: i128 = Config::ATE_LOOP_COUNT
            .iter()
            .rev()
            .fold(0, |acc, digit| 2 * acc + *digit as i128);
        assert_eq!(naf, 6 * u - 2);
    }

    #[test]
    fn test_generators_are_valid() {
        let g1 = G1Affine::generator();
        assert!(g1.is_on_curve());

        let g2 = G2Affine::generator();
        assert!(g2.is_on_curve());
        assert!(g2.is_in_correct_subgroup_assuming_on_curve());
        assert!(g2.mul_bigint(Fr::MODULUS).is_zero());

        // The twist constant is xi^((p - 1) / 3).
        let p_minus_one_div_three = Fq::from(-1i64).into_bigint();
        let mut exponent = num_bigint::BigUint::from(p_minus_one_div_three);
        exponent /= 3u8;
        assert_eq!(
            Fq6Config::NONRESIDUE.pow(exponent.to_u64_digits()),
            Config::TWIST_MUL_BY_Q_X
        );
    }

    #[test]
    fn test_pairing_is_bilinear() {
        let a = Fr::from(0x1234_5678u64);
        let b = Fr::from(0x9abc_def0u64);
        let g1 = G1Projective::generator();
        let g2 = G2Projective::generator();

        let base = Bn254::pairing(g1, g2);
        assert!(!base.is_zero());
        assert_eq!(Bn254::pairing(g1 * a, g2 * b), base * (a * b));
        assert_eq!(
            Bn254::pairing(g1 * a, g2),
            Bn254::pairing(g1, (g2 * a).into_affine())
        );
        assert!(Bn254::pairing(g1, g2).0.pow(Fr::MODULUS).is_one());
    }
}
