//! MNT6-298, the other half of the MNT cycle: embedding degree 6 over a
//! 298-bit prime field, with `y^2 = x^3 + 11x + b` and a quadratic twist by
//! `X` over `Fq3 = Fq[X]/(X^3 - 5)`. The ate loop count is negative for
//! this curve.

use std::sync::Arc;

use crate::biginteger::BigInteger;
use crate::curves::pairing::{CurveFamily, CurveInstance, PairingCurve, TwistType};
use crate::curves::Affine;
use crate::fields::{ExtElement, Fp, FpParameters};

const MODULUS: &str = "475922286169261325753349249653048451545124878552823515553267735739164647307408490559963137";

const ORDER: &str = "475922286169261325753349249653048451545124879242694725395555128576210262817955800483758081";

const COEFF_B: &str = "106700080510851735677967319632585352256454251201367587890185989362936000262606668469523074";

// |t - 1|; the trace is negative for MNT6-298.
const ATE_LOOP_COUNT: &str = "689871209842287392837045615510547309923794944";

const G1_GENERATOR_X: &str = "336685752883082228109289846353937104185698209371404178342968838739115829740084426881123453";
const G1_GENERATOR_Y: &str = "402596290139780989709332707716568920777622032073762749862342374583908837063963736098549800";

const G2_GENERATOR_X_C0: &str = "421456435772811846256826561593908322288509115489119907560382401870203318738334702321297427";
const G2_GENERATOR_X_C1: &str = "103072927438548502463527009961344915021167584706439945404959058962657261178393635706405114";
const G2_GENERATOR_X_C2: &str = "143029172143731852627002926324735183809768363301149009204849580478324784395590388826052558";
const G2_GENERATOR_Y_C0: &str = "464673596668689463130099227575639512541218133445388869383893594087634649237515554342751377";
const G2_GENERATOR_Y_C1: &str = "100642907501977375184575075967118071807821117960152743335603284583254620685343989304941678";
const G2_GENERATOR_Y_C2: &str = "123019855502969896026940545715841181300275180157288044663051565390506010149881373807142903";

fn fp(params: &Arc<FpParameters>, digits: &str) -> Fp {
    let repr = BigInteger::from_decimal_str(digits).expect("valid decimal literal");
    Fp::from_repr(&repr, params).expect("constant below the modulus")
}

pub fn instance() -> CurveInstance {
    let modulus = BigInteger::from_decimal_str(MODULUS).expect("valid decimal literal");
    let params = FpParameters::new(modulus).expect("the MNT6-298 modulus is odd");

    let a = Fp::from_u64(11, &params);
    let b = fp(&params, COEFF_B);
    let order = BigInteger::from_decimal_str(ORDER).expect("valid decimal literal");
    let non_residue = Fp::from_u64(5, &params);
    let x = BigInteger::from_decimal_str(ATE_LOOP_COUNT).expect("valid decimal literal");

    let pairing = PairingCurve::new(
        CurveFamily::Mnt6,
        params.clone(),
        a,
        b,
        order,
        non_residue,
        None,
        TwistType::M,
        x,
        true,
    )
    .expect("the MNT6-298 parameters are consistent");

    let g1_generator = Affine::new(
        fp(&params, G1_GENERATOR_X),
        fp(&params, G1_GENERATOR_Y),
    );

    let fqe = pairing.fqe.clone();
    let g2_generator = Affine::new(
        ExtElement::new(
            vec![
                fp(&params, G2_GENERATOR_X_C0),
                fp(&params, G2_GENERATOR_X_C1),
                fp(&params, G2_GENERATOR_X_C2),
            ],
            &fqe,
        ),
        ExtElement::new(
            vec![
                fp(&params, G2_GENERATOR_Y_C0),
                fp(&params, G2_GENERATOR_Y_C1),
                fp(&params, G2_GENERATOR_Y_C2),
            ],
            &fqe,
        ),
    );

    CurveInstance {
        pairing,
        g1_generator,
        g2_generator,
    }
}
