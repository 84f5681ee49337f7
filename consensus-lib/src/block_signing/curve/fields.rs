use ark_ff::fields::{Fp256, MontBackend, MontConfig};
use ark_ff::{fields::*, MontFp};

/// p = 36u^4 + 36u^3 + 24u^2 + 6u + 1
#[derive(MontConfig)]
#[modulus = "16798108731015832284940804142231733909889187121439069848933715426072753864723"]
#[generator = "3"]
pub struct FqConfig;
pub type Fq = Fp256<MontBackend<FqConfig, 4>>;

/// r = 36u^4 + 36u^3 + 18u^2 + 6u + 1
#[derive(MontConfig)]
#[modulus = "16798108731015832284940804142231733909759579603404752749028378864165570215949"]
#[generator = "2"]
pub struct FrConfig;
pub type Fr = Fp256<MontBackend<FrConfig, 4>>;

pub type Fq2 = Fp2<Fq2Config>;

pub struct Fq2Config;

impl Fp2Config for Fq2Config {
    type Fp = Fq;

    /// NONRESIDUE = -1
    const NONRESIDUE: Fq = MontFp!("-1");

    const FROBENIUS_COEFF_FP2_C1: &'static [Fq] = &[Fq::ONE, MontFp!("-1")];

    #[inline(always)]
    fn mul_fp_by_nonresidue_in_place(fe: &mut Self::Fp) -> &mut Self::Fp {
        fe.neg_in_place()
    }
}

pub type Fq6 = Fp6<Fq6Config>;

#[derive(Clone, Copy)]
pub struct Fq6Config;

impl Fp6Config for Fq6Config {
    type Fp2Config = Fq2Config;

    /// NONRESIDUE = xi = 1 + i
    const NONRESIDUE: Fq2 = Fq2::new(Fq::ONE, Fq::ONE);

    // xi^((p^k - 1) / 3)
    const FROBENIUS_COEFF_FP6_C1: &'static [Fq2] = &[
        Fq2::new(Fq::ONE, Fq::ZERO),
        Fq2::new(
            Fq::ZERO,
            MontFp!("16798108731015832283133667796947756444075910019074449559301910896669540483083"),
        ),
        Fq2::new(
            MontFp!("1807136345283977465813277102364620289631804529403213381639"),
            Fq::ZERO,
        ),
        Fq2::new(Fq::ZERO, Fq::ONE),
        Fq2::new(
            MontFp!("16798108731015832283133667796947756444075910019074449559301910896669540483083"),
            Fq::ZERO,
        ),
        Fq2::new(
            Fq::ZERO,
            MontFp!("1807136345283977465813277102364620289631804529403213381639"),
        ),
    ];

    // xi^((2p^k - 2) / 3)
    const FROBENIUS_COEFF_FP6_C2: &'static [Fq2] = &[
        Fq2::new(Fq::ONE, Fq::ZERO),
        Fq2::new(
            MontFp!("16798108731015832283133667796947756444075910019074449559301910896669540483084"),
            Fq::ZERO,
        ),
        Fq2::new(
            MontFp!("16798108731015832283133667796947756444075910019074449559301910896669540483083"),
            Fq::ZERO,
        ),
        Fq2::new(MontFp!("-1"), Fq::ZERO),
        Fq2::new(
            MontFp!("1807136345283977465813277102364620289631804529403213381639"),
            Fq::ZERO,
        ),
        Fq2::new(
            MontFp!("1807136345283977465813277102364620289631804529403213381640"),
            Fq::ZERO,
        ),
    ];

    #[inline(always)]
    fn mul_fp2_by_nonresidue_in_place(fe: &mut Fq2) -> &mut Fq2 {
        // (c0 + c1 * i) * (1 + i) = (c0 - c1) + (c0 + c1) * i
        let c0 = fe.c0 - fe.c1;
        fe.c1 += fe.c0;
        fe.c0 = c0;
        fe
    }
}

pub type Fq12 = Fp12<Fq12Config>;

#[derive(Clone, Copy)]
pub struct Fq12Config;

impl Fp12Config for Fq12Config {
    type Fp6Config = Fq6Config;

    const NONRESIDUE: Fq6 = Fq6::new(Fq2::ZERO, Fq2::ONE, Fq2::ZERO);

    // xi^((p^k - 1) / 6)
    const FROBENIUS_COEFF_FP12_C1: &'static [Fq2] = &[
        Fq2::new(Fq::ONE, Fq::ZERO),
        Fq2::new(
            MontFp!("12310438583873020660552735091161044116898065562217439662059245424880585960937"),
            MontFp!("4487670147142811624388069051070689792991121559221630186874470001192167903786"),
        ),
        Fq2::new(
            MontFp!("1807136345283977465813277102364620289631804529403213381640"),
            Fq::ZERO,
        ),
        Fq2::new(
            MontFp!("571759232279933406358082416437452803737039382138144404732186496954757578318"),
            MontFp!("16226349498735898878582721725794281106152147739300925444201528929117996286405"),
        ),
        Fq2::new(
            MontFp!("1807136345283977465813277102364620289631804529403213381639"),
            Fq::ZERO,
        ),
        Fq2::new(
            MontFp!("5059429379422745030746151467508142596728160941359774591606656498146925482104"),
            MontFp!("11738679351593087254194652674723591313161026180079295257327058927925828382619"),
        ),
        Fq2::new(MontFp!("-1"), Fq::ZERO),
        Fq2::new(
            MontFp!("4487670147142811624388069051070689792991121559221630186874470001192167903786"),
            MontFp!("12310438583873020660552735091161044116898065562217439662059245424880585960937"),
        ),
        Fq2::new(
            MontFp!("16798108731015832283133667796947756444075910019074449559301910896669540483083"),
            Fq::ZERO,
        ),
        Fq2::new(
            MontFp!("16226349498735898878582721725794281106152147739300925444201528929117996286405"),
            MontFp!("571759232279933406358082416437452803737039382138144404732186496954757578318"),
        ),
        Fq2::new(
            MontFp!("16798108731015832283133667796947756444075910019074449559301910896669540483084"),
            Fq::ZERO,
        ),
        Fq2::new(
            MontFp!("11738679351593087254194652674723591313161026180079295257327058927925828382619"),
            MontFp!("5059429379422745030746151467508142596728160941359774591606656498146925482104"),
        ),
    ];
}
