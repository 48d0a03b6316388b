use rand::Rng;

use crate::biginteger::BigInteger;
use crate::curves::pairing::{CurveFamily, CurveInstance, PairingCurve, TwistType};
use crate::curves::{bls12_377, bls12_381, bn254, mnt4_298, mnt6_298, Affine, Curve};
use crate::error::Error;
use crate::exec::CancellationToken;
use crate::fields::{Field, Fp};
use crate::tests::test_rng;

fn group_law_tests<F: Field>(curve: &Curve<F>, generator: &Affine<F>) {
    let g = generator.clone();
    assert!(curve.is_on_curve(&g));

    // Negation and the identity.
    let id = curve.add(&g, &g.neg()).unwrap();
    assert!(id.is_zero());
    assert_eq!(curve.add(&g, &id).unwrap(), g);

    // The generator has the declared order. The public `mul` reduces its
    // scalar first, so drive the raw bit loop for this one.
    assert!(curve.mul_bits(&g, &curve.order).unwrap().is_zero());
    assert!(curve.mul(&g, &curve.order).unwrap().is_zero());
    let mut order_minus_one = curve.order.clone();
    order_minus_one.sub_small(1);
    assert_eq!(curve.mul(&g, &order_minus_one).unwrap(), g.neg());

    // Repeated addition agrees with doubling.
    let g2 = curve.add(&g, &g).unwrap();
    let g3 = curve.add(&g2, &g).unwrap();
    let g4 = curve.add(&g3, &g).unwrap();
    let dbl_dbl = curve.double(&curve.double(&g).unwrap()).unwrap();
    assert_eq!(g4, dbl_dbl);

    // Scalar shortcuts.
    assert!(curve.mul(&g, &BigInteger::zero(1)).unwrap().is_zero());
    assert_eq!(curve.mul(&g, &BigInteger::from_u64(1, 1)).unwrap(), g);
    let infinity = curve.infinity();
    assert!(curve
        .mul(&infinity, &BigInteger::from_u64(7, 1))
        .unwrap()
        .is_zero());

    // Scalars are taken modulo the group order.
    let mut order_plus_five = curve.order.clone();
    order_plus_five.add_small(5);
    assert_eq!(
        curve.mul(&g, &order_plus_five).unwrap(),
        curve.mul(&g, &BigInteger::from_u64(5, 1)).unwrap()
    );
}

fn pairing_tests(instance: &CurveInstance) {
    let token = CancellationToken::new();
    let engine = &instance.pairing;
    let g1 = &instance.g1_generator;
    let g2 = &instance.g2_generator;

    let twenty = BigInteger::from_u64(20, 1);
    let g1_20 = engine.g1.mul(g1, &twenty).unwrap();
    let g2_20 = engine.g2.mul(g2, &twenty).unwrap();

    let a = engine.pairing(&g1_20, g2, &token).unwrap();
    let b = engine.pairing(g1, &g2_20, &token).unwrap();
    assert_eq!(a, b);

    // e(20 g1, g2) == e(g1, g2)^20, and the pairing is non-degenerate.
    let base = engine.pairing(g1, g2, &token).unwrap();
    assert!(!base.is_one());
    assert_eq!(a, base.pow(&twenty));

    // Product check: e(P, Q) * e(-P, Q) == 1.
    let pairs = vec![(g1.clone(), g2.clone()), (g1.neg(), g2.clone())];
    assert!(engine.pairing_check(&pairs, &token).unwrap());
    assert!(!engine
        .pairing_check(&[(g1.clone(), g2.clone())], &token)
        .unwrap());

    // An empty pair list passes vacuously.
    assert!(engine.pairing_check(&[], &token).unwrap());

    // Pairs with an infinity member contribute the neutral factor.
    let with_infinity = vec![(engine.g1.infinity(), g2.clone())];
    assert!(engine.pairing_check(&with_infinity, &token).unwrap());
}

#[test]
fn bls12_377_group_law() {
    let instance = bls12_377::instance();
    group_law_tests(&instance.pairing.g1, &instance.g1_generator);
    group_law_tests(&instance.pairing.g2, &instance.g2_generator);
}

#[test]
fn bls12_377_generator_coordinates() {
    // The documented G1 generator parses and passes the curve check.
    let instance = bls12_377::instance();
    let g = instance
        .pairing
        .g1
        .point(
            instance.g1_generator.x.clone(),
            instance.g1_generator.y.clone(),
        )
        .unwrap();
    assert!(instance.pairing.g1.is_on_curve(&g));
}

#[test]
fn bls12_377_pairing_bilinear() {
    pairing_tests(&bls12_377::instance());
}

#[test]
fn bls12_381_group_law() {
    let instance = bls12_381::instance();
    group_law_tests(&instance.pairing.g1, &instance.g1_generator);
    group_law_tests(&instance.pairing.g2, &instance.g2_generator);
}

#[test]
fn bls12_381_pairing_bilinear() {
    pairing_tests(&bls12_381::instance());
}

#[test]
fn bn254_group_law() {
    let instance = bn254::instance();
    group_law_tests(&instance.pairing.g1, &instance.g1_generator);
    group_law_tests(&instance.pairing.g2, &instance.g2_generator);
}

#[test]
fn bn254_pairing_bilinear() {
    pairing_tests(&bn254::instance());
}

#[test]
fn mnt4_298_group_law() {
    let instance = mnt4_298::instance();
    group_law_tests(&instance.pairing.g1, &instance.g1_generator);
    group_law_tests(&instance.pairing.g2, &instance.g2_generator);
}

#[test]
fn mnt4_298_pairing_bilinear() {
    pairing_tests(&mnt4_298::instance());
}

#[test]
fn mnt6_298_group_law() {
    let instance = mnt6_298::instance();
    group_law_tests(&instance.pairing.g1, &instance.g1_generator);
    group_law_tests(&instance.pairing.g2, &instance.g2_generator);
}

#[test]
fn mnt6_298_pairing_bilinear() {
    pairing_tests(&mnt6_298::instance());
}

#[test]
fn bn254_pairing_random_scalars() {
    let mut rng = test_rng();
    let instance = bn254::instance();
    let token = CancellationToken::new();
    let engine = &instance.pairing;
    let g1 = &instance.g1_generator;
    let g2 = &instance.g2_generator;

    let s = BigInteger::from_u64(rng.gen::<u32>() as u64, 1);
    let sp = engine.g1.mul(g1, &s).unwrap();
    let sq = engine.g2.mul(g2, &s).unwrap();

    let lhs = engine.pairing(&sp, g2, &token).unwrap();
    let rhs = engine.pairing(g1, &sq, &token).unwrap();
    assert_eq!(lhs, rhs);
    assert_eq!(lhs, engine.pairing(g1, g2, &token).unwrap().pow(&s));
}

#[test]
fn pairing_rejects_point_outside_declared_subgroup() {
    // Rebind the BN254 engine with a declared subgroup of order 1: every
    // non-identity input then fails the membership check.
    let instance = bn254::instance();
    let token = CancellationToken::new();
    let fp = instance.pairing.fp.clone();

    let engine = PairingCurve::new(
        CurveFamily::Bn,
        fp.clone(),
        Fp::zero(&fp),
        Fp::from_u64(3, &fp),
        BigInteger::from_u64(1, 1),
        Fp::one(&fp).neg(),
        Some((Fp::from_u64(9, &fp), Fp::one(&fp))),
        TwistType::D,
        BigInteger::from_u64(bn254::X, 1),
        false,
    )
    .unwrap();

    let result = engine.pairing_check(
        &[(instance.g1_generator.clone(), instance.g2_generator.clone())],
        &token,
    );
    assert_eq!(result, Err(Error::NotInSubgroup));
}

#[test]
fn multi_exp_matches_naive_sum() {
    let mut rng = test_rng();
    let instance = bn254::instance();
    let curve = &instance.pairing.g1;
    let g = &instance.g1_generator;
    let token = CancellationToken::new();

    // Enough pairs to cross the bucket threshold.
    let mut pairs = Vec::new();
    let mut point = g.clone();
    for _ in 0..40 {
        let scalar = BigInteger::from_u64(rng.gen::<u64>(), 1);
        pairs.push((point.clone(), scalar));
        point = curve.add(&point, g).unwrap();
    }

    let mut naive = curve.infinity();
    for (p, s) in &pairs {
        let term = curve.mul(p, s).unwrap();
        naive = curve.add(&naive, &term).unwrap();
    }

    assert_eq!(curve.multi_exp(&pairs, &token).unwrap(), naive);

    // And below the threshold.
    assert_eq!(curve.multi_exp(&pairs[..5], &token).unwrap(), {
        let mut acc = curve.infinity();
        for (p, s) in &pairs[..5] {
            let term = curve.mul(p, s).unwrap();
            acc = curve.add(&acc, &term).unwrap();
        }
        acc
    });
}

#[test]
fn cancellation_stops_the_pairing() {
    let instance = bn254::instance();
    let token = CancellationToken::new();
    token.cancel();
    let result = instance.pairing.pairing_check(
        &[(instance.g1_generator.clone(), instance.g2_generator.clone())],
        &token,
    );
    assert_eq!(result, Err(Error::Cancelled));
}

#[test]
fn cancellation_stops_multi_exp() {
    let instance = bn254::instance();
    let curve = &instance.pairing.g1;
    let token = CancellationToken::new();
    token.cancel();
    let pairs = vec![(instance.g1_generator.clone(), BigInteger::from_u64(3, 1))];
    assert_eq!(curve.multi_exp(&pairs, &token), Err(Error::Cancelled));
}

#[test]
fn frobenius_table_bls12_377() {
    // The precomputed Fq2 Frobenius c1 row in Montgomery limb form, as in
    // the reference vectors.
    let instance = bls12_377::instance();
    let table = instance
        .pairing
        .fqe
        .frobenius_coeffs()
        .expect("the Fq2 tower is a binomial");

    let expected_c1_0: [u64; 6] = [
        0x2cdffffffffff68,
        0x51409f837fffffb1,
        0x9f7db3a98a7d3ff2,
        0x7b4e97b76e7c6305,
        0x4cf495bf803c84e8,
        0x8d6661e2fdf49a,
    ];
    let expected_c1_1: [u64; 6] = [
        0x823ac00000000099,
        0xc5cabdc0b000004f,
        0x7f75ae862f8c080d,
        0x9ed4423b9278b089,
        0x79467000ec64c452,
        0x120d3e434c71c50,
    ];
    assert_eq!(table[0][0].mont_repr().as_ref(), &expected_c1_0[..]);
    assert_eq!(table[0][1].mont_repr().as_ref(), &expected_c1_1[..]);
}

#[test]
fn frobenius_table_bls12_381() {
    let instance = bls12_381::instance();
    let table = instance
        .pairing
        .fqe
        .frobenius_coeffs()
        .expect("the Fq2 tower is a binomial");

    let expected_c1_0: [u64; 6] = [
        0x760900000002fffd,
        0xebf4000bc40c0002,
        0x5f48985753c758ba,
        0x77ce585370525745,
        0x5c071a97a256ec6d,
        0x15f65ec3fa80e493,
    ];
    let expected_c1_1: [u64; 6] = [
        0x43f5fffffffcaaae,
        0x32b7fff2ed47fffd,
        0x7e83a49a2e99d69,
        0xeca8f3318332bb7a,
        0xef148d1ea0f4c069,
        0x40ab3263eff0206,
    ];
    assert_eq!(table[0][0].mont_repr().as_ref(), &expected_c1_0[..]);
    assert_eq!(table[0][1].mont_repr().as_ref(), &expected_c1_1[..]);
}
