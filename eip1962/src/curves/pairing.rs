use std::sync::Arc;

use log::trace;

use crate::biginteger::BigInteger;
use crate::curves::{Affine, Curve};
use crate::error::{ArithmeticError, Error};
use crate::exec::CancellationToken;
use crate::fields::{BitIterator, ExtElement, ExtParameters, Field, Fp, FpParameters};

/// The curve families a pairing request may name. `Cp` is recognised on the
/// wire but has no engine behind it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CurveFamily {
    Bls12 = 1,
    Bn = 2,
    Mnt4 = 3,
    Mnt6 = 4,
    Cp = 5,
}

impl CurveFamily {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            1 => Some(CurveFamily::Bls12),
            2 => Some(CurveFamily::Bn),
            3 => Some(CurveFamily::Mnt4),
            4 => Some(CurveFamily::Mnt6),
            5 => Some(CurveFamily::Cp),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TwistType {
    M = 1,
    D = 2,
}

impl TwistType {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            1 => Some(TwistType::M),
            2 => Some(TwistType::D),
            _ => None,
        }
    }
}

/// An optimal-ate pairing engine bound to one runtime curve description.
///
/// G1 lives on `E(Fq)`, G2 on the twist over `Fq^e` (e = 2 for BLS12, BN
/// and MNT4, e = 3 for MNT6), and the Miller loop runs on the untwisted
/// curve over the full tower `Fq^k` (k = 12, 12, 4, 6 respectively).
pub struct PairingCurve {
    pub family: CurveFamily,
    pub fp: Arc<FpParameters>,
    pub fqe: Arc<ExtParameters>,
    pub fqk: Arc<ExtParameters>,
    pub g1: Curve<Fp>,
    pub g2: Curve<ExtElement>,
    pub gt: Curve<ExtElement>,
    pub twist: TwistType,
    pub loop_count: BigInteger,
    pub loop_is_negative: bool,
    // xi = xi0 + xi1 * X relates the tower generator w to the Fq^e
    // generator X through X = (w^(k/e) - xi0) / xi1.
    xi0: Fp,
    xi1_inv: Fp,
    // (w^2, w^3) or their inverses, fixed by the twist kind.
    twist_scale: (ExtElement, ExtElement),
    // (p^k - 1) / r
    final_exp: BigInteger,
}

impl PairingCurve {
    /// Binds an engine to a curve descriptor. `fqe_non_residue` is the
    /// non-residue beta of the first tower step `Fq^e = Fq[X]/(X^e - beta)`;
    /// `fp6_non_residue` is the sextic non-residue xi in Fq^2 (BLS12 and BN
    /// only). Validates the tower shape and the final-exponentiation
    /// divisibility precondition.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        family: CurveFamily,
        fp: Arc<FpParameters>,
        a: Fp,
        b: Fp,
        order: BigInteger,
        fqe_non_residue: Fp,
        fp6_non_residue: Option<(Fp, Fp)>,
        twist: TwistType,
        x: BigInteger,
        x_is_negative: bool,
    ) -> Result<Self, Error> {
        let (e, k) = match family {
            CurveFamily::Bls12 | CurveFamily::Bn => (2usize, 12usize),
            CurveFamily::Mnt4 => (2, 4),
            CurveFamily::Mnt6 => (3, 6),
            CurveFamily::Cp => {
                return Err(Error::InvalidCurve {
                    reason: "the CP family has no pairing engine",
                })
            }
        };

        let beta = fqe_non_residue;
        let mut fqe_coeffs = vec![beta.neg()];
        fqe_coeffs.resize(e, Fp::zero(&fp));
        let fqe = ExtParameters::new(&fp, fqe_coeffs)?;

        // The sextic towers need xi with a degree-one term; the MNT towers
        // relate X to w directly (X = w^(k/e)).
        let (xi0, xi1) = match family {
            CurveFamily::Bls12 | CurveFamily::Bn => fp6_non_residue.ok_or(Error::InvalidCurve {
                reason: "missing Fq6 non-residue",
            })?,
            _ => (Fp::zero(&fp), Fp::one(&fp)),
        };
        let xi1_inv = xi1.inverse().ok_or(Error::InvalidCurve {
            reason: "Fq6 non-residue must have a degree-one term",
        })?;

        // Minimal polynomial of the tower generator w over Fq.
        let mut fqk_coeffs = vec![Fp::zero(&fp); k];
        match family {
            CurveFamily::Bls12 | CurveFamily::Bn => {
                // w^6 = xi0 + xi1 * X  =>  w^12 - 2 xi0 w^6 + (xi0^2 - beta xi1^2) = 0
                fqk_coeffs[0] = xi0.square().sub(&beta.mul(&xi1.square()));
                fqk_coeffs[6] = xi0.double().neg();
            }
            // w^(k/e * e) = X^e = beta
            _ => {
                fqk_coeffs[0] = beta.neg();
            }
        }
        let fqk = ExtParameters::new(&fp, fqk_coeffs)?;

        if matches!(family, CurveFamily::Bls12 | CurveFamily::Bn) && !a.is_zero() {
            return Err(Error::InvalidCurve {
                reason: "BLS12 and BN curves require a = 0",
            });
        }

        // Twist curve coefficients over Fq^e.
        let (a2, b2) = match family {
            CurveFamily::Bls12 | CurveFamily::Bn => {
                let xi = ExtElement::new(vec![xi0.clone(), xi1.clone()], &fqe);
                let b2 = match twist {
                    TwistType::M => xi.mul_by_base(&b),
                    TwistType::D => xi
                        .inverse()
                        .ok_or(Error::InvalidCurve {
                            reason: "Fq6 non-residue is zero",
                        })?
                        .mul_by_base(&b),
                };
                (ExtElement::zero(&fqe), b2)
            }
            _ => {
                // Quadratic twist by t = X: (a * t^2, b * t^3).
                let t = ExtElement::basis(&fqe, 1);
                let t2 = t.square();
                let t3 = t2.mul(&t);
                match twist {
                    TwistType::M => (t2.mul_by_base(&a), t3.mul_by_base(&b)),
                    TwistType::D => {
                        let t2_inv = t2.inverse().ok_or(Error::InvalidCurve {
                            reason: "degenerate twist",
                        })?;
                        let t3_inv = t3.inverse().ok_or(Error::InvalidCurve {
                            reason: "degenerate twist",
                        })?;
                        (t2_inv.mul_by_base(&a), t3_inv.mul_by_base(&b))
                    }
                }
            }
        };

        let g1 = Curve::new(a.clone(), b.clone(), order.clone());
        let g2 = Curve::new(a2, b2, order.clone());
        let gt = Curve::new(
            ExtElement::from_base(&a, &fqk),
            ExtElement::from_base(&b, &fqk),
            order.clone(),
        );

        // The Miller loop parameter is the ate count t - 1: x itself for
        // BLS12 and the MNT families, 6x^2 for BN. The shorter 6x + 2
        // variant needs Frobenius-corrected line steps, and the dense
        // tower representation has no Frobenius for non-binomial
        // polynomials.
        let (loop_count, loop_is_negative) = match family {
            CurveFamily::Bn => {
                let mut t = x.mul_wide(&x);
                let carry = t.mul_small(6);
                if carry != 0 {
                    t.0.push(carry);
                }
                (t, false)
            }
            _ => (x, x_is_negative),
        };

        // (p^k - 1) must be divisible by r; the quotient is the final
        // exponent.
        let p = fp.modulus();
        let mut pk = p.clone();
        for _ in 1..k {
            pk = pk.mul_wide(p);
        }
        pk.sub_small(1);
        let (final_exp, remainder) = pk.div_rem(&order);
        if !remainder.is_zero() {
            return Err(Error::InvalidCurve {
                reason: "(p^k - 1) is not divisible by the group order",
            });
        }

        // Untwist scale factors for the G2 coordinates.
        let w2 = ExtElement::basis(&fqk, 2);
        let w3 = ExtElement::basis(&fqk, 3);
        let twist_scale = match twist {
            TwistType::M => {
                let w2_inv = w2.inverse().ok_or(Error::InvalidCurve {
                    reason: "tower polynomial is not irreducible",
                })?;
                let w3_inv = w3.inverse().ok_or(Error::InvalidCurve {
                    reason: "tower polynomial is not irreducible",
                })?;
                (w2_inv, w3_inv)
            }
            TwistType::D => (w2, w3),
        };

        Ok(PairingCurve {
            family,
            fp,
            fqe,
            fqk,
            g1,
            g2,
            gt,
            twist,
            loop_count,
            loop_is_negative,
            xi0,
            xi1_inv,
            twist_scale,
            final_exp,
        })
    }

    /// Embeds a G1 point into the constant subfield of Fq^k.
    pub fn g1_to_fqk(&self, p: &Affine<Fp>) -> Affine<ExtElement> {
        if p.is_zero() {
            return self.gt.infinity();
        }
        Affine::new(
            ExtElement::from_base(&p.x, &self.fqk),
            ExtElement::from_base(&p.y, &self.fqk),
        )
    }

    // Rewrites an Fq^e coordinate in the w-basis of Fq^k, via
    // X = (w^(k/e) - xi0) / xi1.
    fn untwist_coord(&self, c: &ExtElement) -> ExtElement {
        let e = self.fqe.degree();
        let d = self.fqk.degree() / e;

        let mut scale = Fp::one(&self.fp);
        let mut scaled = Vec::with_capacity(e);
        for coeff in c.coeffs() {
            scaled.push(coeff.mul(&scale));
            scale = scale.mul(&self.xi1_inv);
        }

        // For e = 3 the towers always have xi0 = 0, so the cross terms of
        // ((w^d - xi0)/xi1)^j vanish and the placement below is exact.
        let mut placed = vec![Fp::zero(&self.fp); self.fqk.degree()];
        for (j, value) in scaled.iter().enumerate() {
            placed[j * d] = value.clone();
        }
        if e == 2 && !self.xi0.is_zero() {
            placed[0] = placed[0].sub(&self.xi0.mul(&scaled[1]));
        }
        ExtElement::new(placed, &self.fqk)
    }

    /// Lifts a G2 point from the twist into `E(Fq^k)`: rebase both
    /// coordinates, then scale by `(w^2, w^3)` in the direction fixed by
    /// the twist kind.
    pub fn twist_to_fqk(&self, q: &Affine<ExtElement>) -> Affine<ExtElement> {
        if q.is_zero() {
            return self.gt.infinity();
        }
        let nx = self.untwist_coord(&q.x);
        let ny = self.untwist_coord(&q.y);
        Affine::new(nx.mul(&self.twist_scale.0), ny.mul(&self.twist_scale.1))
    }

    /// The line through `p1` and `p2` (tangent when they coincide),
    /// evaluated at `t`.
    fn line(
        &self,
        p1: &Affine<ExtElement>,
        p2: &Affine<ExtElement>,
        t: &Affine<ExtElement>,
    ) -> Result<ExtElement, ArithmeticError> {
        if p1.is_zero() || p2.is_zero() {
            return Ok(ExtElement::one(&self.fqk));
        }
        if p1.x != p2.x {
            let denom = p2
                .x
                .sub(&p1.x)
                .inverse()
                .ok_or(ArithmeticError::NonInvertible)?;
            let m = p2.y.sub(&p1.y).mul(&denom);
            Ok(m.mul(&t.x.sub(&p1.x)).sub(&t.y.sub(&p1.y)))
        } else if p1.y == p2.y {
            let x2 = p1.x.square();
            let numerator = x2.double().add(&x2).add(&self.gt.a);
            let denom = p1
                .y
                .double()
                .inverse()
                .ok_or(ArithmeticError::NonInvertible)?;
            let m = numerator.mul(&denom);
            Ok(m.mul(&t.x.sub(&p1.x)).sub(&t.y.sub(&p1.y)))
        } else {
            // Vertical line through p1 and -p1.
            Ok(t.x.sub(&p1.x))
        }
    }

    /// Miller's algorithm over the bits of the loop parameter, most
    /// significant bit skipped.
    fn miller_loop(
        &self,
        q: &Affine<ExtElement>,
        p: &Affine<ExtElement>,
        cancellation: &CancellationToken,
    ) -> Result<ExtElement, Error> {
        if q.is_zero() || p.is_zero() {
            return Ok(ExtElement::one(&self.fqk));
        }

        let mut f = ExtElement::one(&self.fqk);
        let mut r = q.clone();
        let mut found_one = false;

        for bit in BitIterator::new(&self.loop_count) {
            if !found_one {
                found_one = bit;
                continue;
            }
            if cancellation.is_cancelled() {
                return Err(Error::Cancelled);
            }

            f = f.square().mul(&self.line(&r, &r, p)?);
            r = self.gt.double(&r)?;

            if bit {
                f = f.mul(&self.line(&r, q, p)?);
                r = self.gt.add(&r, q)?;
            }
        }

        Ok(f)
    }

    /// The product of Miller evaluations over all pairs, with subgroup
    /// checks and the loop-sign inversion applied.
    fn miller_product(
        &self,
        pairs: &[(Affine<Fp>, Affine<ExtElement>)],
        cancellation: &CancellationToken,
    ) -> Result<ExtElement, Error> {
        trace!("miller loop over {} pair(s)", pairs.len());
        let mut f = ExtElement::one(&self.fqk);
        for (p, q) in pairs {
            if p.is_zero() || q.is_zero() {
                continue;
            }
            if !self.g1.mul_bits(p, &self.g1.order)?.is_zero() {
                return Err(Error::NotInSubgroup);
            }
            if !self.g2.mul_bits(q, &self.g2.order)?.is_zero() {
                return Err(Error::NotInSubgroup);
            }
            let p_t = self.g1_to_fqk(p);
            let q_t = self.twist_to_fqk(q);
            f = f.mul(&self.miller_loop(&q_t, &p_t, cancellation)?);
        }
        if self.loop_is_negative {
            f = f.inverse().ok_or(ArithmeticError::NonInvertible)?;
        }
        Ok(f)
    }

    /// The full pairing value `e(P, Q)` for a single pair.
    pub fn pairing(
        &self,
        p: &Affine<Fp>,
        q: &Affine<ExtElement>,
        cancellation: &CancellationToken,
    ) -> Result<ExtElement, Error> {
        let pairs = [(p.clone(), q.clone())];
        let f = self.miller_product(&pairs, cancellation)?;
        Ok(f.pow(&self.final_exp))
    }

    /// The pairing product check: whether `prod_i e(P_i, Q_i) == 1`. An
    /// empty pair list passes vacuously.
    pub fn pairing_check(
        &self,
        pairs: &[(Affine<Fp>, Affine<ExtElement>)],
        cancellation: &CancellationToken,
    ) -> Result<bool, Error> {
        let f = self.miller_product(pairs, cancellation)?;
        Ok(f.pow(&self.final_exp).is_one())
    }
}

/// A ready-made curve: the pairing engine plus its group generators.
pub struct CurveInstance {
    pub pairing: PairingCurve,
    pub g1_generator: Affine<Fp>,
    pub g2_generator: Affine<ExtElement>,
}
