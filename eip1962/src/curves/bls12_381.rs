//! BLS12-381, the curve of the Ethereum 2 and Zcash Sapling deployments:
//! embedding degree 12 over a 381-bit prime field, `y^2 = x^3 + 4`, with an
//! M-type sextic twist by `xi = 1 + X` over `Fq2 = Fq[X]/(X^2 + 1)`. The
//! BLS parameter x is negative for this curve.

use std::sync::Arc;

use crate::biginteger::BigInteger;
use crate::curves::pairing::{CurveFamily, CurveInstance, PairingCurve, TwistType};
use crate::curves::Affine;
use crate::fields::{ExtElement, Field, Fp, FpParameters};

pub const X: u64 = 0xd201000000010000;

const MODULUS: &str = "4002409555221667393417789825735904156556882819939007885332058136124031650490837864442687629129015664037894272559787";

const ORDER: &str =
    "52435875175126190479447740508185965837690552500527637822603658699938581184513";

const G1_GENERATOR_X: &str = "3685416753713387016781088315183077757961620795782546409894578378688607592378376318836054947676345821548104185464507";
const G1_GENERATOR_Y: &str = "1339506544944476473020471379941921221584933875938349620426543736416511423956333506472724655353366534992391756441569";

const G2_GENERATOR_X_C0: &str = "352701069587466618187139116011060144890029952792775240219908644239793785735715026873347600343865175952761926303160";
const G2_GENERATOR_X_C1: &str = "3059144344244213709971259814753781636986470325476647558659373206291635324768958432433509563104347017837885763365758";
const G2_GENERATOR_Y_C0: &str = "1985150602287291935568054521177171638300868978215655730859378665066344726373823718423869104263333984641494340347905";
const G2_GENERATOR_Y_C1: &str = "927553665492332455747201965776037880757740193453592970025027978793976877002675564980949289727957565575433344219582";

fn fp(params: &Arc<FpParameters>, digits: &str) -> Fp {
    let repr = BigInteger::from_decimal_str(digits).expect("valid decimal literal");
    Fp::from_repr(&repr, params).expect("constant below the modulus")
}

pub fn instance() -> CurveInstance {
    let modulus = BigInteger::from_decimal_str(MODULUS).expect("valid decimal literal");
    let params = FpParameters::new(modulus).expect("the BLS12-381 modulus is odd");

    let a = Fp::zero(&params);
    let b = Fp::from_u64(4, &params);
    let order = BigInteger::from_decimal_str(ORDER).expect("valid decimal literal");
    let fp2_non_residue = Fp::one(&params).neg();
    let fp6_non_residue = (Fp::one(&params), Fp::one(&params));

    let pairing = PairingCurve::new(
        CurveFamily::Bls12,
        params.clone(),
        a,
        b,
        order,
        fp2_non_residue,
        Some(fp6_non_residue),
        TwistType::M,
        BigInteger::from_u64(X, 1),
        true,
    )
    .expect("the BLS12-381 parameters are consistent");

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
