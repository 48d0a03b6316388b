use crate::biginteger::BigInteger;
use crate::curves::pairing::CurveInstance;
use crate::curves::{bls12_377, bn254, Affine};
use crate::error::Error;
use crate::exec::{execute, execute_with_options, ExecutionOptions};
use crate::fields::{ExtElement, Field, Fp};
use crate::parser::{self, encode_fp, encode_g1_point, encode_g2_point};

const FIELD_LEN: usize = 48;
const ORDER_LEN: usize = 32;

const BLS12_377_MODULUS_HEX: &str =
    "01ae3a4617c510eac63b05c06ca1493b1a22d9f300f5138f1ef3622fba094800170b5d44300000008508c00000000001";

fn push_scalar(out: &mut Vec<u8>, scalar: &BigInteger, width: usize) {
    out.extend_from_slice(&scalar.to_be_bytes(width));
}

// <field_length:1> <modulus> <A> <B> <order_length:1> <order>
fn g1_prefix(instance: &CurveInstance, out: &mut Vec<u8>) {
    out.push(FIELD_LEN as u8);
    out.extend_from_slice(&instance.pairing.fp.modulus().to_be_bytes(FIELD_LEN));
    encode_fp(&instance.pairing.g1.a, FIELD_LEN, out);
    encode_fp(&instance.pairing.g1.b, FIELD_LEN, out);
    out.push(ORDER_LEN as u8);
    push_scalar(out, &instance.pairing.g1.order, ORDER_LEN);
}

// <field_length:1> <modulus> <degree:1> <non_residue> <A> <B>
// <order_length:1> <order>
fn g2_prefix(instance: &CurveInstance, out: &mut Vec<u8>) {
    let fp = &instance.pairing.fp;
    out.push(FIELD_LEN as u8);
    out.extend_from_slice(&fp.modulus().to_be_bytes(FIELD_LEN));
    out.push(2);
    encode_fp(&Fp::from_u64(5, fp).neg(), FIELD_LEN, out);
    encode_fqe(&instance.pairing.g2.a, out);
    encode_fqe(&instance.pairing.g2.b, out);
    out.push(ORDER_LEN as u8);
    push_scalar(out, &instance.pairing.g2.order, ORDER_LEN);
}

fn encode_fqe(value: &ExtElement, out: &mut Vec<u8>) {
    for coeff in value.coeffs() {
        encode_fp(coeff, FIELD_LEN, out);
    }
}

fn pairing_request(
    instance: &CurveInstance,
    pairs: &[(Affine<Fp>, Affine<ExtElement>)],
) -> Vec<u8> {
    let fp = &instance.pairing.fp;
    let mut out = vec![7u8, 1u8]; // PAIRING, family BLS12
    out.push(FIELD_LEN as u8);
    out.extend_from_slice(&fp.modulus().to_be_bytes(FIELD_LEN));
    encode_fp(&Fp::zero(fp), FIELD_LEN, &mut out);
    encode_fp(&Fp::from_u64(1, fp), FIELD_LEN, &mut out);
    out.push(ORDER_LEN as u8);
    push_scalar(&mut out, &instance.pairing.g1.order, ORDER_LEN);
    // fp2 non-residue -5, fp6 non-residue (0, 1)
    encode_fp(&Fp::from_u64(5, fp).neg(), FIELD_LEN, &mut out);
    encode_fp(&Fp::zero(fp), FIELD_LEN, &mut out);
    encode_fp(&Fp::one(fp), FIELD_LEN, &mut out);
    out.push(2); // D twist
    out.push(8); // x length
    push_scalar(&mut out, &BigInteger::from_u64(bls12_377::X, 1), 8);
    out.push(0); // x sign: positive
    out.push(pairs.len() as u8);
    for (p, q) in pairs {
        encode_g1_point(p, FIELD_LEN, &mut out);
        encode_g2_point(q, FIELD_LEN, 2, &mut out);
    }
    out
}

#[test]
fn modulus_matches_reference_hex() {
    let instance = bls12_377::instance();
    assert_eq!(
        instance.pairing.fp.modulus().to_be_bytes(FIELD_LEN),
        hex::decode(BLS12_377_MODULUS_HEX).unwrap()
    );
}

#[test]
fn g1_add_identity_returns_infinity() {
    let instance = bls12_377::instance();
    let g = &instance.g1_generator;

    let mut request = vec![1u8];
    g1_prefix(&instance, &mut request);
    encode_g1_point(g, FIELD_LEN, &mut request);
    encode_g1_point(&g.neg(), FIELD_LEN, &mut request);

    let result = execute(&request).unwrap();
    assert_eq!(result, vec![0u8; 2 * FIELD_LEN]);
}

#[test]
fn g1_add_with_wire_infinity() {
    // (0, 0) on the wire is the identity: adding it returns the other
    // operand unchanged.
    let instance = bls12_377::instance();
    let g = &instance.g1_generator;

    let mut request = vec![1u8];
    g1_prefix(&instance, &mut request);
    request.extend_from_slice(&vec![0u8; 2 * FIELD_LEN]);
    encode_g1_point(g, FIELD_LEN, &mut request);

    let mut expected = Vec::new();
    encode_g1_point(g, FIELD_LEN, &mut expected);
    assert_eq!(execute(&request).unwrap(), expected);
}

#[test]
fn g1_mul_by_zero_returns_infinity() {
    let instance = bls12_377::instance();

    let mut request = vec![2u8];
    g1_prefix(&instance, &mut request);
    encode_g1_point(&instance.g1_generator, FIELD_LEN, &mut request);
    push_scalar(&mut request, &BigInteger::zero(1), ORDER_LEN);

    assert_eq!(execute(&request).unwrap(), vec![0u8; 2 * FIELD_LEN]);
}

#[test]
fn g1_mul_by_order_minus_one_negates() {
    let instance = bls12_377::instance();
    let g = &instance.g1_generator;

    let mut order_minus_one = instance.pairing.g1.order.clone();
    order_minus_one.sub_small(1);

    let mut request = vec![2u8];
    g1_prefix(&instance, &mut request);
    encode_g1_point(g, FIELD_LEN, &mut request);
    push_scalar(&mut request, &order_minus_one, ORDER_LEN);

    let mut expected = Vec::new();
    encode_g1_point(&g.neg(), FIELD_LEN, &mut expected);
    assert_eq!(execute(&request).unwrap(), expected);
}

#[test]
fn g1_multi_exp_accumulates() {
    let instance = bn254::instance();
    let curve = &instance.pairing.g1;
    let g = &instance.g1_generator;
    let len = 32usize;

    let mut request = vec![3u8, len as u8];
    request.extend_from_slice(&instance.pairing.fp.modulus().to_be_bytes(len));
    encode_fp(&curve.a, len, &mut request);
    encode_fp(&curve.b, len, &mut request);
    request.push(32);
    push_scalar(&mut request, &curve.order, 32);
    request.push(3);
    for scalar in [2u64, 3, 4] {
        encode_g1_point(g, len, &mut request);
        push_scalar(&mut request, &BigInteger::from_u64(scalar, 1), 32);
    }

    let nine = curve.mul(g, &BigInteger::from_u64(9, 1)).unwrap();
    let mut expected = Vec::new();
    encode_g1_point(&nine, len, &mut expected);
    assert_eq!(execute(&request).unwrap(), expected);
}

#[test]
fn g2_add_identity_returns_infinity() {
    let instance = bls12_377::instance();
    let g = &instance.g2_generator;

    let mut request = vec![4u8];
    g2_prefix(&instance, &mut request);
    encode_g2_point(g, FIELD_LEN, 2, &mut request);
    encode_g2_point(&g.neg(), FIELD_LEN, 2, &mut request);

    assert_eq!(execute(&request).unwrap(), vec![0u8; 4 * FIELD_LEN]);
}

#[test]
fn g2_mul_matches_group_law() {
    let instance = bls12_377::instance();
    let g = &instance.g2_generator;
    let seven = BigInteger::from_u64(7, 1);

    let mut request = vec![5u8];
    g2_prefix(&instance, &mut request);
    encode_g2_point(g, FIELD_LEN, 2, &mut request);
    push_scalar(&mut request, &seven, ORDER_LEN);

    let expected_point = instance.pairing.g2.mul(g, &seven).unwrap();
    let mut expected = Vec::new();
    encode_g2_point(&expected_point, FIELD_LEN, 2, &mut expected);
    assert_eq!(execute(&request).unwrap(), expected);
}

#[test]
fn mnt6_g2_ops_through_the_wire() {
    // MNT6's G2 lives over a cubic extension: three coefficients per
    // coordinate on the wire.
    let instance = crate::curves::mnt6_298::instance();
    let e = &instance.pairing;
    let fp = &e.fp;
    let g = &instance.g2_generator;
    let len = 38usize; // 298 bits

    let mut prefix = vec![len as u8];
    prefix.extend_from_slice(&fp.modulus().to_be_bytes(len));
    prefix.push(3); // extension degree
    encode_fp(&Fp::from_u64(5, fp), len, &mut prefix); // non-residue
    for coeff in e.g2.a.coeffs() {
        encode_fp(coeff, len, &mut prefix);
    }
    for coeff in e.g2.b.coeffs() {
        encode_fp(coeff, len, &mut prefix);
    }
    prefix.push(len as u8);
    push_scalar(&mut prefix, &e.g2.order, len);

    // g + (-g) comes back as the six-coordinate infinity encoding.
    let mut request = vec![4u8];
    request.extend_from_slice(&prefix);
    encode_g2_point(g, len, 3, &mut request);
    encode_g2_point(&g.neg(), len, 3, &mut request);
    assert_eq!(execute(&request).unwrap(), vec![0u8; 6 * len]);

    // Scalar multiplication through the same prefix matches the group law.
    let nine = BigInteger::from_u64(9, 1);
    let mut request = vec![5u8];
    request.extend_from_slice(&prefix);
    encode_g2_point(g, len, 3, &mut request);
    push_scalar(&mut request, &nine, len);

    let expected_point = e.g2.mul(g, &nine).unwrap();
    let mut expected = Vec::new();
    encode_g2_point(&expected_point, len, 3, &mut expected);
    assert_eq!(execute(&request).unwrap(), expected);
}

#[test]
fn pairing_product_check_passes_and_fails() {
    let instance = bls12_377::instance();
    let e = &instance.pairing;
    let g1 = &instance.g1_generator;
    let g2 = &instance.g2_generator;

    let twenty = BigInteger::from_u64(20, 1);
    let g1_20 = e.g1.mul(g1, &twenty).unwrap();
    let g2_20 = e.g2.mul(g2, &twenty).unwrap();

    // e(20 g1, g2) * e(-g1, 20 g2) == 1: bilinearity through the wire.
    let request = pairing_request(&instance, &[(g1_20, g2.clone()), (g1.neg(), g2_20)]);
    assert_eq!(execute(&request).unwrap(), vec![1u8]);

    // A single non-degenerate pair is not the identity.
    let request = pairing_request(&instance, &[(g1.clone(), g2.clone())]);
    assert_eq!(execute(&request).unwrap(), vec![0u8]);

    // An empty pair list passes vacuously.
    let request = pairing_request(&instance, &[]);
    assert_eq!(execute(&request).unwrap(), vec![1u8]);
}

#[test]
fn mnt4_pairing_product_check_through_the_wire() {
    let instance = crate::curves::mnt4_298::instance();
    let e = &instance.pairing;
    let fp = &e.fp;
    let g1 = &instance.g1_generator;
    let g2 = &instance.g2_generator;
    let len = 38usize; // 298 bits
    let x = BigInteger::from_decimal_str("689871209842287392837045615510547309923794944").unwrap();

    let mut request = vec![7u8, 3u8]; // PAIRING, family MNT4
    request.push(len as u8);
    request.extend_from_slice(&fp.modulus().to_be_bytes(len));
    encode_fp(&Fp::from_u64(2, fp), len, &mut request);
    encode_fp(&e.g1.b, len, &mut request);
    request.push(len as u8);
    push_scalar(&mut request, &e.g1.order, len);
    encode_fp(&Fp::from_u64(17, fp), len, &mut request); // Fp2 non-residue
    request.push(1); // M twist
    request.push(19); // x length
    push_scalar(&mut request, &x, 19);
    request.push(0); // positive trace
    request.push(2);
    for (p, q) in [(g1.clone(), g2.clone()), (g1.neg(), g2.clone())] {
        encode_g1_point(&p, len, &mut request);
        encode_g2_point(&q, len, 2, &mut request);
    }

    assert_eq!(execute(&request).unwrap(), vec![1u8]);
}

#[test]
fn parse_round_trips_to_original_bytes() {
    let instance = bls12_377::instance();
    let g = &instance.g1_generator;

    let mut request = vec![1u8];
    g1_prefix(&instance, &mut request);
    encode_g1_point(g, FIELD_LEN, &mut request);
    encode_g1_point(&g.neg(), FIELD_LEN, &mut request);

    let options = ExecutionOptions::default();
    let operation = parser::parse(&request, &options).unwrap();
    assert_eq!(operation.encode(), request);

    let pairing = pairing_request(
        &instance,
        &[(g.clone(), instance.g2_generator.clone())],
    );
    let operation = parser::parse(&pairing, &options).unwrap();
    assert_eq!(operation.encode(), pairing);
}

#[test]
fn unknown_opcode_is_rejected() {
    assert_eq!(
        execute(&[0xff]),
        Err(Error::ParseBadEnum {
            offset: 0,
            value: 0xff
        })
    );
    assert_eq!(
        execute(&[]),
        Err(Error::ParseTruncated {
            offset: 0,
            wanted: 1
        })
    );
}

#[test]
fn truncated_scalar_is_rejected() {
    let instance = bls12_377::instance();

    let mut request = vec![2u8];
    g1_prefix(&instance, &mut request);
    encode_g1_point(&instance.g1_generator, FIELD_LEN, &mut request);
    let offset = request.len();
    request.extend_from_slice(&[0u8; ORDER_LEN - 1]); // one byte short

    assert_eq!(
        execute(&request),
        Err(Error::ParseTruncated {
            offset,
            wanted: ORDER_LEN
        })
    );
}

#[test]
fn non_canonical_coordinate_is_rejected() {
    let instance = bls12_377::instance();

    let mut request = vec![1u8];
    g1_prefix(&instance, &mut request);
    let offset = request.len();
    // x = modulus is not canonical.
    request.extend_from_slice(&instance.pairing.fp.modulus().to_be_bytes(FIELD_LEN));
    encode_fp(&instance.g1_generator.y, FIELD_LEN, &mut request);
    encode_g1_point(&instance.g1_generator, FIELD_LEN, &mut request);

    assert_eq!(execute(&request), Err(Error::ParseNotCanonical { offset }));
}

#[test]
fn off_curve_point_is_rejected() {
    let instance = bls12_377::instance();

    let mut request = vec![1u8];
    g1_prefix(&instance, &mut request);
    let offset = request.len();
    // (1, 1) does not satisfy y^2 = x^3 + 1.
    push_scalar(&mut request, &BigInteger::from_u64(1, 1), FIELD_LEN);
    push_scalar(&mut request, &BigInteger::from_u64(1, 1), FIELD_LEN);
    encode_g1_point(&instance.g1_generator, FIELD_LEN, &mut request);

    assert_eq!(execute(&request), Err(Error::NotOnCurve { offset }));
}

#[test]
fn bls12_pairing_with_nonzero_a_is_rejected() {
    let instance = bls12_377::instance();
    let fp = &instance.pairing.fp;

    let mut request = vec![7u8, 1u8];
    request.push(FIELD_LEN as u8);
    request.extend_from_slice(&fp.modulus().to_be_bytes(FIELD_LEN));
    encode_fp(&Fp::from_u64(1, fp), FIELD_LEN, &mut request); // A = 1
    encode_fp(&Fp::from_u64(1, fp), FIELD_LEN, &mut request);

    assert_eq!(
        execute(&request),
        Err(Error::InvalidCurve {
            reason: "A parameter must be zero for a BLS12 curve"
        })
    );
}

#[test]
fn pairing_with_residue_non_residue_is_rejected() {
    // 4 = 2^2 is a square, so it cannot define Fp2.
    let instance = bls12_377::instance();
    let fp = &instance.pairing.fp;

    let mut request = vec![7u8, 1u8];
    request.push(FIELD_LEN as u8);
    request.extend_from_slice(&fp.modulus().to_be_bytes(FIELD_LEN));
    encode_fp(&Fp::zero(fp), FIELD_LEN, &mut request);
    encode_fp(&Fp::from_u64(1, fp), FIELD_LEN, &mut request);
    request.push(ORDER_LEN as u8);
    push_scalar(&mut request, &instance.pairing.g1.order, ORDER_LEN);
    encode_fp(&Fp::from_u64(4, fp), FIELD_LEN, &mut request);

    assert_eq!(
        execute(&request),
        Err(Error::InvalidCurve {
            reason: "non-residue for Fp2 is actually a residue"
        })
    );
}

#[test]
fn unsupported_family_and_enums_are_rejected() {
    // Unknown family byte.
    assert_eq!(
        execute(&[7u8, 0xaa]),
        Err(Error::ParseBadEnum {
            offset: 1,
            value: 0xaa
        })
    );

    // CP is a recognised family without an engine.
    let instance = bls12_377::instance();
    let fp = &instance.pairing.fp;
    let mut request = vec![7u8, 5u8];
    request.push(FIELD_LEN as u8);
    request.extend_from_slice(&fp.modulus().to_be_bytes(FIELD_LEN));
    encode_fp(&Fp::zero(fp), FIELD_LEN, &mut request);
    encode_fp(&Fp::from_u64(1, fp), FIELD_LEN, &mut request);
    request.push(ORDER_LEN as u8);
    push_scalar(&mut request, &instance.pairing.g1.order, ORDER_LEN);
    assert_eq!(
        execute(&request),
        Err(Error::InvalidCurve {
            reason: "the CP family has no pairing engine"
        })
    );
}

#[test]
fn degenerate_declarations_are_rejected() {
    // Zero field length.
    assert!(matches!(
        execute(&[1u8, 0u8]),
        Err(Error::InvalidCurve { .. })
    ));

    // Even modulus.
    let request = vec![1u8, 1u8, 0x10u8];
    assert!(matches!(
        execute(&request),
        Err(Error::InvalidCurve { .. })
    ));

    // Zero group order.
    let mut request = vec![1u8, 1u8, 0x61u8]; // modulus 97
    request.push(0x03); // A = 3
    request.push(0x05); // B = 5
    request.push(1); // order length
    request.push(0); // order = 0
    assert!(matches!(
        execute(&request),
        Err(Error::InvalidCurve {
            reason: "group order is zero"
        })
    ));
}

#[test]
fn field_length_cap_is_configurable() {
    let instance = bls12_377::instance();
    let g = &instance.g1_generator;

    let mut request = vec![1u8];
    g1_prefix(&instance, &mut request);
    encode_g1_point(g, FIELD_LEN, &mut request);
    encode_g1_point(&g.neg(), FIELD_LEN, &mut request);

    let options = ExecutionOptions {
        max_field_length: 32,
        ..ExecutionOptions::default()
    };
    assert!(matches!(
        execute_with_options(&request, &options),
        Err(Error::InvalidCurve { .. })
    ));
}

#[test]
fn cancelled_request_reports_cancellation() {
    let instance = bls12_377::instance();
    let request = pairing_request(
        &instance,
        &[(
            instance.g1_generator.clone(),
            instance.g2_generator.clone(),
        )],
    );

    let options = ExecutionOptions::default();
    options.cancellation.cancel();
    assert_eq!(
        execute_with_options(&request, &options),
        Err(Error::Cancelled)
    );
}
