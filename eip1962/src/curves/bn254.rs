//! BN254 (alt_bn128), the Barreto--Naehrig curve of the Ethereum 1
//! precompiles: embedding degree 12 over a 254-bit prime field,
//! `y^2 = x^3 + 3`, with a D-type sextic twist by `xi = 9 + X` over
//! `Fq2 = Fq[X]/(X^2 + 1)`. The ate loop count is `t - 1 = 6x^2`.

use std::sync::Arc;

use crate::biginteger::BigInteger;
use crate::curves::pairing::{CurveFamily, CurveInstance, PairingCurve, TwistType};
use crate::curves::Affine;
use crate::fields::{ExtElement, Field, Fp, FpParameters};

pub const X: u64 = 4965661367192848881;

const MODULUS: &str =
    "21888242871839275222246405745257275088696311157297823662689037894645226208583";

const ORDER: &str =
    "21888242871839275222246405745257275088548364400416034343698204186575808495617";

const G2_GENERATOR_X_C0: &str =
    "10857046999023057135944570762232829481370756359578518086990519993285655852781";
const G2_GENERATOR_X_C1: &str =
    "11559732032986387107991004021392285783925812861821192530917403151452391805634";
const G2_GENERATOR_Y_C0: &str =
    "8495653923123431417604973247489272438418190587263600148770280649306958101930";
const G2_GENERATOR_Y_C1: &str =
    "4082367875863433681332203403145435568316851327593401208105741076214120093531";

fn fp(params: &Arc<FpParameters>, digits: &str) -> Fp {
    let repr = BigInteger::from_decimal_str(digits).expect("valid decimal literal");
    Fp::from_repr(&repr, params).expect("constant below the modulus")
}

pub fn instance() -> CurveInstance {
    let modulus = BigInteger::from_decimal_str(MODULUS).expect("valid decimal literal");
    let params = FpParameters::new(modulus).expect("the BN254 modulus is odd");

    let a = Fp::zero(&params);
    let b = Fp::from_u64(3, &params);
    let order = BigInteger::from_decimal_str(ORDER).expect("valid decimal literal");
    let fp2_non_residue = Fp::one(&params).neg();
    let fp6_non_residue = (Fp::from_u64(9, &params), Fp::one(&params));

    let pairing = PairingCurve::new(
        CurveFamily::Bn,
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
    .expect("the BN254 parameters are consistent");

    let g1_generator = Affine::new(Fp::from_u64(1, &params), Fp::from_u64(2, &params));

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
