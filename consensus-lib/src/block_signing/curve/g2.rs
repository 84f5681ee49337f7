use super::{Fq, Fq2, Fr};
use ark_ec::models::{short_weierstrass::SWCurveConfig, CurveConfig};
use ark_ec::short_weierstrass::Affine;
use ark_ff::{AdditiveGroup, Field, MontFp, Zero};

pub type G2Affine = Affine<Config>;

#[derive(Clone, Default, PartialEq, Eq)]
pub struct Config;

impl CurveConfig for Config {
    type BaseField = Fq2;
    type ScalarField = Fr;

    /// COFACTOR = 36u^4 + 36u^3 + 30u^2 + 6u + 1
    #[rustfmt::skip]
    const COFACTOR: &'static [u64] = &[
        0xad00000000000019,
        0xc2a2800000000016,
        0xba344d8000000008,
        0x2523648240000001,
    ];

    /// COFACTOR_INV = COFACTOR^{-1} mod r
    const COFACTOR_INV: Fr =
        MontFp!("8399054365507916140663265725831889489001708940320597534943659766172318957567");
}

impl SWCurveConfig for Config {
    /// COEFF_A = [0, 0]
    const COEFF_A: Fq2 = Fq2::ZERO;

    /// COEFF_B = 2 / (1 + i) = 1 - i
    const COEFF_B: Fq2 = Fq2::new(Fq::ONE, MontFp!("-1"));

    /// The generator the signer keys are derived from.
    const GENERATOR: G2Affine = G2Affine::new_unchecked(G2_GENERATOR_X, G2_GENERATOR_Y);

    #[inline(always)]
    fn mul_by_a(_: Self::BaseField) -> Self::BaseField {
        Self::BaseField::zero()
    }
}

pub const G2_GENERATOR_X: Fq2 = Fq2::new(
    MontFp!("12723517038133731887338407189719511622662176727675373276651903807414909099441"),
    MontFp!("4168783608814932154536427934509895782246573715297911553964171371032945126671"),
);

pub const G2_GENERATOR_Y: Fq2 = Fq2::new(
    MontFp!("13891744915211034074451795021214165905772212241412891944830863846330766296736"),
    MontFp!("7937318970632701341203597196594272556916396164729705624521405069090520231616"),
);
