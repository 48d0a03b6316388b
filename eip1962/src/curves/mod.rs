use core::fmt::{Display, Formatter, Result as FmtResult};

use derivative::Derivative;

use crate::biginteger::BigInteger;
use crate::error::{ArithmeticError, Error, PointError};
use crate::exec::CancellationToken;
use crate::fields::{BitIterator, Field};

pub mod bls12_377;
pub mod bls12_381;
pub mod bn254;
pub mod mnt4_298;
pub mod mnt6_298;
pub mod pairing;

/// Affine representation of a short-Weierstrass point. The same type serves
/// G1, G2 and the pairing target group; the coordinate field is whatever
/// implements [`Field`].
#[derive(Derivative)]
#[derivative(
    Clone(bound = "F: Field"),
    Debug(bound = "F: Field"),
    PartialEq(bound = "F: Field"),
    Eq(bound = "F: Field")
)]
pub struct Affine<F: Field> {
    pub x: F,
    pub y: F,
    pub infinity: bool,
}

impl<F: Field> Affine<F> {
    pub fn new(x: F, y: F) -> Self {
        Affine {
            x,
            y,
            infinity: false,
        }
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.infinity
    }

    /// `(x, y) -> (x, -y)`; infinity is its own negation.
    pub fn neg(&self) -> Self {
        if self.infinity {
            self.clone()
        } else {
            Affine {
                x: self.x.clone(),
                y: self.y.neg(),
                infinity: false,
            }
        }
    }
}

impl<F: Field> Display for Affine<F> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        if self.infinity {
            write!(f, "Affine(Infinity)")
        } else {
            write!(f, "Affine(x={:?}, y={:?})", self.x, self.y)
        }
    }
}

/// A short-Weierstrass curve `y^2 = x^3 + a*x + b` together with the prime
/// order of the subgroup the request operates in. The group law lives here
/// so that points stay plain data.
#[derive(Derivative)]
#[derivative(Clone(bound = "F: Field"), Debug(bound = "F: Field"))]
pub struct Curve<F: Field> {
    pub a: F,
    pub b: F,
    pub order: BigInteger,
}

impl<F: Field> Curve<F> {
    pub fn new(a: F, b: F, order: BigInteger) -> Self {
        Curve { a, b, order }
    }

    /// The group identity. Coordinates are normalized to `(0, 1)` so that
    /// derived equality treats all identity values alike.
    pub fn infinity(&self) -> Affine<F> {
        Affine {
            x: self.a.zero(),
            y: self.a.one(),
            infinity: true,
        }
    }

    /// Checked construction from raw coordinates. `(0, 0)` is the wire
    /// encoding of the identity and bypasses the curve equation.
    pub fn point(&self, x: F, y: F) -> Result<Affine<F>, PointError> {
        if x.is_zero() && y.is_zero() {
            return Ok(self.infinity());
        }
        let point = Affine::new(x, y);
        if self.is_on_curve(&point) {
            Ok(point)
        } else {
            Err(PointError::NotOnCurve)
        }
    }

    /// Evaluates `y^2 - (x^3 + a*x + b)` and compares with zero.
    pub fn is_on_curve(&self, point: &Affine<F>) -> bool {
        if point.is_zero() {
            return true;
        }
        let y2 = point.y.square();
        let x3b = point
            .x
            .square()
            .mul(&point.x)
            .add(&self.a.mul(&point.x))
            .add(&self.b);
        y2 == x3b
    }

    /// Chord addition. Doubles when the operands coincide; returns the
    /// identity for `P + (-P)`.
    pub fn add(&self, p: &Affine<F>, q: &Affine<F>) -> Result<Affine<F>, ArithmeticError> {
        if p.is_zero() {
            return Ok(q.clone());
        }
        if q.is_zero() {
            return Ok(p.clone());
        }
        if p.x == q.x {
            if p.y == q.y {
                return self.double(p);
            }
            return Ok(self.infinity());
        }

        let denom = q
            .x
            .sub(&p.x)
            .inverse()
            .ok_or(ArithmeticError::NonInvertible)?;
        let lambda = q.y.sub(&p.y).mul(&denom);
        let x3 = lambda.square().sub(&p.x).sub(&q.x);
        let y3 = lambda.mul(&p.x.sub(&x3)).sub(&p.y);
        Ok(Affine::new(x3, y3))
    }

    /// Tangent doubling. A point with `y = 0` is 2-torsion; its double is
    /// the identity.
    pub fn double(&self, p: &Affine<F>) -> Result<Affine<F>, ArithmeticError> {
        if p.is_zero() || p.y.is_zero() {
            return Ok(self.infinity());
        }

        let x2 = p.x.square();
        let numerator = x2.double().add(&x2).add(&self.a);
        let denom = p
            .y
            .double()
            .inverse()
            .ok_or(ArithmeticError::NonInvertible)?;
        let lambda = numerator.mul(&denom);
        let x3 = lambda.square().sub(&p.x.double());
        let y3 = lambda.mul(&p.x.sub(&x3)).sub(&p.y);
        Ok(Affine::new(x3, y3))
    }

    /// Left-to-right double-and-add. The scalar is reduced modulo the group
    /// order first, bounding the iteration count; `0 * P` and `s * infinity`
    /// short-circuit to the identity.
    pub fn mul(&self, p: &Affine<F>, scalar: &BigInteger) -> Result<Affine<F>, ArithmeticError> {
        if p.is_zero() {
            return Ok(self.infinity());
        }
        let (_, scalar) = scalar.div_rem(&self.order);
        if scalar.is_zero() {
            return Ok(self.infinity());
        }
        self.mul_bits(p, &scalar)
    }

    /// Double-and-add over the raw bits, without order reduction. Used by
    /// the subgroup membership test, where `order * P` must be computed
    /// literally.
    pub(crate) fn mul_bits(
        &self,
        p: &Affine<F>,
        bits: &BigInteger,
    ) -> Result<Affine<F>, ArithmeticError> {
        let mut res = self.infinity();
        for bit in BitIterator::new(bits) {
            res = self.double(&res)?;
            if bit {
                res = self.add(&res, p)?;
            }
        }
        Ok(res)
    }

    /// `sum_i s_i * P_i`. Below the threshold this is the naive
    /// multiply-then-accumulate; above it, windowed bucket accumulation.
    /// The observable result is identical.
    pub fn multi_exp(
        &self,
        pairs: &[(Affine<F>, BigInteger)],
        cancellation: &CancellationToken,
    ) -> Result<Affine<F>, Error> {
        if pairs.len() < MULTIEXP_BUCKET_THRESHOLD {
            let mut acc = self.infinity();
            for (point, scalar) in pairs {
                if cancellation.is_cancelled() {
                    return Err(Error::Cancelled);
                }
                let term = self.mul(point, scalar)?;
                acc = self.add(&acc, &term)?;
            }
            return Ok(acc);
        }
        self.multi_exp_windowed(pairs, cancellation)
    }

    fn multi_exp_windowed(
        &self,
        pairs: &[(Affine<F>, BigInteger)],
        cancellation: &CancellationToken,
    ) -> Result<Affine<F>, Error> {
        // Widen the window until one bucket pass covers the pair count;
        // keeps the bucket fill amortised against the per-window doublings.
        let mut c = 3;
        while (1usize << c) < pairs.len() {
            c += 1;
        }
        let num_bits = self.order.num_bits() as usize;

        let reduced: Vec<(Affine<F>, BigInteger)> = pairs
            .iter()
            .map(|(point, scalar)| {
                let (_, s) = scalar.div_rem(&self.order);
                (point.clone(), s)
            })
            .collect();

        let mut result = self.infinity();
        let mut window_start = (num_bits / c) * c;
        loop {
            for _ in 0..c {
                result = self.double(&result)?;
            }

            let mut buckets = vec![self.infinity(); (1 << c) - 1];
            for (point, scalar) in &reduced {
                if cancellation.is_cancelled() {
                    return Err(Error::Cancelled);
                }
                let index = scalar.get_bits(window_start, c) as usize;
                if index > 0 {
                    buckets[index - 1] = self.add(&buckets[index - 1], point)?;
                }
            }

            // Summation by parts: buckets * their index via a running sum.
            let mut running_sum = self.infinity();
            let mut acc = self.infinity();
            for bucket in buckets.iter().rev() {
                running_sum = self.add(&running_sum, bucket)?;
                acc = self.add(&acc, &running_sum)?;
            }
            result = self.add(&result, &acc)?;

            if window_start == 0 {
                break;
            }
            window_start -= c;
        }
        Ok(result)
    }
}

/// Pair count above which `multi_exp` switches to bucket accumulation.
pub const MULTIEXP_BUCKET_THRESHOLD: usize = 32;
