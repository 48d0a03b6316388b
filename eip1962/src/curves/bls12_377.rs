//! BLS12-377, the inner curve of the Zexe construction: a
//! Barreto--Lynn--Scott curve of embedding degree 12 over a 377-bit prime
//! field, with `y^2 = x^3 + 1` and a D-type sextic twist by `xi = X` over
//! `Fq2 = Fq[X]/(X^2 + 5)`.

use std::sync::Arc;

use crate::biginteger::BigInteger;
use crate::curves::pairing::{CurveFamily, CurveInstance, PairingCurve, TwistType};
use crate::curves::Affine;
use crate::fields::{ExtElement, Field, Fp, FpParameters};

pub const X: u64 = 0x8508c00000000001;

const MODULUS: &str = "258664426012969094010652733694893533536393512754914660539884262666720468348340822774968888139573360124440321458177";

const ORDER: &str =
    "8444461749428370424248824938781546531375899335154063827935233455917409239041";

const G1_GENERATOR_X: &str = "81937999373150964239938255573465948239988671502647976594219695644855304257327692006745978603320413799295628339695";
const G1_GENERATOR_Y: &str = "17397676153253620270863855454307851802466321586312764156125140564607560990561071773762088186709545111705113293147";

const G2_GENERATOR_X_C0: &str = "233578398248691099356572568220835526895379068987715365179118596935057653620464273615301663571204657964920925606294";
const G2_GENERATOR_X_C1: &str = "140913150380207355837477652521042157274541796891053068589147167627541651775299824604154852141315666357241556069118";
const G2_GENERATOR_Y_C0: &str = "63160294768292073209381361943935198908131692476676907196754037919244929611450776219210369229519898517858833747423";
const G2_GENERATOR_Y_C1: &str = "149157405641012693445398062341192467754805999074082136895788947234480009303640899064710353187729182149407503257491";

fn fp(params: &Arc<FpParameters>, digits: &str) -> Fp {
    let repr = BigInteger::from_decimal_str(digits).expect("valid decimal literal");
    Fp::from_repr(&repr, params).expect("constant below the modulus")
}

pub fn instance() -> CurveInstance {
    let modulus = BigInteger::from_decimal_str(MODULUS).expect("valid decimal literal");
    let params = FpParameters::new(modulus).expect("the BLS12-377 modulus is odd");

    let a = Fp::zero(&params);
    let b = Fp::from_u64(1, &params);
    let order = BigInteger::from_decimal_str(ORDER).expect("valid decimal literal");
    let fp2_non_residue = Fp::from_u64(5, &params).neg();
    let fp6_non_residue = (Fp::zero(&params), Fp::one(&params));

    let pairing = PairingCurve::new(
        CurveFamily::Bls12,
        params.clone(),
        a,
        b,
        order,
        fp2_non_residue,
        Some(fp6_non_residue),
        TwistType::D,
        BigInteger::from_u64(X, 1),
        false,
    )
    .expect("the BLS12-377 parameters are consistent");

    let g1_generator = Affine::new(
        fp(&params, G1_GENERATOR_X),
        fp(&params, G1_GENERATOR_Y),
    );

    let fqe = pairing.fqe.clone();
    let g2_generator = Affine::new(
        ExtElement::new(
            vec![fp(&params, G2_GENERATOR_X_C0), fp(&params, G2_GENERATOR_X_C1)],
            &fqe,
        ),
        ExtElement::new(
            vec![fp(&params, G2_GENERATOR_Y_C0), fp(&params, G2_GENERATOR_Y_C1)],
            &fqe,
        ),
    );

    CurveInstance {
        pairing,
        g1_generator,
        g2_generator,
    }
}
