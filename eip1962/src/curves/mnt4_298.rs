//! MNT4-298, one half of the MNT cycle sampled by Miyaji, Nakabayashi and
//! Takano: embedding degree 4 over a 298-bit prime field, with
//! `y^2 = x^3 + 2x + b` and a quadratic twist by `X` over
//! `Fq2 = Fq[X]/(X^2 - 17)`. Its base field is the scalar field of
//! MNT6-298 and vice versa.

use std::sync::Arc;

use crate::biginteger::BigInteger;
use crate::curves::pairing::{CurveFamily, CurveInstance, PairingCurve, TwistType};
use crate::curves::Affine;
use crate::fields::{ExtElement, Fp, FpParameters};

const MODULUS: &str = "475922286169261325753349249653048451545124879242694725395555128576210262817955800483758081";

const ORDER: &str = "475922286169261325753349249653048451545124878552823515553267735739164647307408490559963137";

const COEFF_B: &str = "423894536526684178289416011533888240029318103673896002803341544124054745019340795360841685";

// |t - 1|, the ate loop count.
const ATE_LOOP_COUNT: &str = "689871209842287392837045615510547309923794944";

const G1_GENERATOR_X: &str = "60760244141852568949126569781626075788424196370144486719385562369396875346601926534016838";
const G1_GENERATOR_Y: &str = "363732850702582978263902770815145784459747722357071843971107674179038674942891694705904306";

const G2_GENERATOR_X_C0: &str = "438374926219350099854919100077809681842783509163790991847867546339851681564223481322252708";
const G2_GENERATOR_X_C1: &str = "37620953615500480110935514360923278605464476459712393277679280819942849043649216370485641";
const G2_GENERATOR_Y_C0: &str = "37437409008528968268352521034936931842973546441370663118543015118291998305624025037512482";
const G2_GENERATOR_Y_C1: &str = "424621479598893882672393190337420680597584695892317197646113820787463109735345923009077489";

fn fp(params: &Arc<FpParameters>, digits: &str) -> Fp {
    let repr = BigInteger::from_decimal_str(digits).expect("valid decimal literal");
    Fp::from_repr(&repr, params).expect("constant below the modulus")
}

pub fn instance() -> CurveInstance {
    let modulus = BigInteger::from_decimal_str(MODULUS).expect("valid decimal literal");
    let params = FpParameters::new(modulus).expect("the MNT4-298 modulus is odd");

    let a = Fp::from_u64(2, &params);
    let b = fp(&params, COEFF_B);
    let order = BigInteger::from_decimal_str(ORDER).expect("valid decimal literal");
    let non_residue = Fp::from_u64(17, &params);
    let x = BigInteger::from_decimal_str(ATE_LOOP_COUNT).expect("valid decimal literal");

    let pairing = PairingCurve::new(
        CurveFamily::Mnt4,
        params.clone(),
        a,
        b,
        order,
        non_residue,
        None,
        TwistType::M,
        x,
        false,
    )
    .expect("the MNT4-298 parameters are consistent");

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
