use super::{Fq, Fr};
use ark_ec::models::{short_weierstrass::SWCurveConfig, CurveConfig};
use ark_ec::short_weierstrass::Affine;
use ark_ff::{AdditiveGroup, Field, MontFp, Zero};

#[derive(Clone, Default, PartialEq, Eq)]
pub struct Config;

pub type G1Affine = Affine<Config>;

impl CurveConfig for Config {
    type BaseField = Fq;
    type ScalarField = Fr;

    /// COFACTOR = 1
    const COFACTOR: &'static [u64] = &[0x1];

    /// COFACTOR_INV = COFACTOR^{-1} mod r = 1
    const COFACTOR_INV: Fr = Fr::ONE;
}

impl SWCurveConfig for Config {
    /// COEFF_A = 0
    const COEFF_A: Fq = Fq::ZERO;

    /// COEFF_B = 2
    const COEFF_B: Fq = MontFp!("2");

    /// GENERATOR = (-1, 1)
    const GENERATOR: G1Affine = G1Affine::new_unchecked(MontFp!("-1"), Fq::ONE);

    #[inline(always)]
    fn mul_by_a(_: Self::BaseField) -> Self::BaseField {
        Self::BaseField::zero()
    }

    #[inline]
    fn is_in_correct_subgroup_assuming_on_curve(_p: &G1Affine) -> bool {
        // E(Fq) has prime order.
        true
    }
}
