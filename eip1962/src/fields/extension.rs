use core::fmt::{Display, Formatter, Result as FmtResult};
use std::sync::Arc;

use derivative::Derivative;

use crate::biginteger::BigInteger;
use crate::error::Error;
use crate::fields::{Field, Fp, FpParameters, LegendreSymbol};

/// Context of an extension field Fq^k presented as polynomials modulo a
/// reduction polynomial supplied at runtime.
///
/// The reduction polynomial is data, not a type parameter:
/// `m(X) = X^k + c_{k-1} X^{k-1} + ... + c_0`, with `modulus_coeffs`
/// holding `c_0..c_{k-1}` and the leading term implicit. Two contexts with
/// different polynomials are distinct fields; mixing their elements is a
/// programming error (debug-asserted).
#[derive(Derivative)]
#[derivative(Debug, PartialEq, Eq)]
pub struct ExtParameters {
    degree: usize,
    modulus_coeffs: Vec<Fp>,
    /// Frobenius multipliers: row `a - 1` holds, for coefficient index `a`,
    /// the factors `nr^(a * (p^j - 1) / degree)` for powers `j = 0..degree`.
    /// Present only for binomial reduction polynomials, where the
    /// coefficient-wise evaluation is exact.
    #[derivative(Debug = "ignore", PartialEq = "ignore")]
    frobenius_coeffs: Option<Vec<Vec<Fp>>>,
    #[derivative(Debug = "ignore", PartialEq = "ignore")]
    fp: Arc<FpParameters>,
}

impl ExtParameters {
    /// Builds the field `Fq[X] / m(X)` for the given low-to-high reduction
    /// coefficients.
    pub fn new(fp: &Arc<FpParameters>, modulus_coeffs: Vec<Fp>) -> Result<Arc<Self>, Error> {
        let degree = modulus_coeffs.len();
        if degree < 2 {
            return Err(Error::InvalidCurve {
                reason: "extension degree must be at least 2",
            });
        }

        let is_binomial =
            !modulus_coeffs[0].is_zero() && modulus_coeffs[1..].iter().all(|c| c.is_zero());
        let frobenius_coeffs = if is_binomial {
            // X^k = -c_0; the Frobenius acts on coefficient a by the
            // non-residue raised to a * (p^j - 1) / k.
            frobenius_coeffs(&modulus_coeffs[0].neg(), degree)
        } else {
            None
        };

        Ok(Arc::new(ExtParameters {
            degree,
            modulus_coeffs,
            frobenius_coeffs,
            fp: fp.clone(),
        }))
    }

    #[inline]
    pub fn degree(&self) -> usize {
        self.degree
    }

    #[inline]
    pub fn fp(&self) -> &Arc<FpParameters> {
        &self.fp
    }

    #[inline]
    pub fn modulus_coeffs(&self) -> &[Fp] {
        &self.modulus_coeffs
    }

    #[inline]
    pub fn frobenius_coeffs(&self) -> Option<&Vec<Vec<Fp>>> {
        self.frobenius_coeffs.as_ref()
    }

    /// The number of elements of this field, `p^degree`.
    pub fn field_order(&self) -> BigInteger {
        let p = self.fp.modulus();
        let mut order = p.clone();
        for _ in 1..self.degree {
            order = order.mul_wide(p);
        }
        order
    }
}

/// Precompute `nr^(a * (p^j - 1) / degree)` for every coefficient index and
/// Frobenius power. Returns `None` when an exponent is not integral, in
/// which case the coefficient-wise Frobenius is undefined for this tower.
fn frobenius_coeffs(non_residue: &Fp, degree: usize) -> Option<Vec<Vec<Fp>>> {
    let p = non_residue.params().modulus().clone();
    let mut rows = Vec::with_capacity(degree - 1);
    for a in 1..degree {
        let mut row = Vec::with_capacity(degree);
        let mut q_power = BigInteger::from_u64(1, p.num_limbs());
        for _ in 0..degree {
            let mut e = q_power.clone();
            e.sub_small(1);
            let carry = e.mul_small(a as u64);
            if carry != 0 {
                e.0.push(carry);
            }
            let divisor = BigInteger::from_u64(degree as u64, e.num_limbs());
            let (exp, rem) = e.div_rem(&divisor);
            if !rem.is_zero() {
                return None;
            }
            row.push(non_residue.pow(&exp));
            q_power = q_power.mul_wide(&p);
        }
        rows.push(row);
    }
    Some(rows)
}

/// An element of Fq^k: `k` base-field coefficients, lowest power first.
#[derive(Derivative)]
#[derivative(Clone, Debug, PartialEq, Eq)]
pub struct ExtElement {
    coeffs: Vec<Fp>,
    #[derivative(Debug = "ignore", PartialEq = "ignore")]
    params: Arc<ExtParameters>,
}

impl ExtElement {
    pub fn new(coeffs: Vec<Fp>, params: &Arc<ExtParameters>) -> Self {
        debug_assert_eq!(coeffs.len(), params.degree);
        ExtElement {
            coeffs,
            params: params.clone(),
        }
    }

    pub fn zero(params: &Arc<ExtParameters>) -> Self {
        let zero = Fp::zero(&params.fp);
        ExtElement {
            coeffs: vec![zero; params.degree],
            params: params.clone(),
        }
    }

    pub fn one(params: &Arc<ExtParameters>) -> Self {
        let mut out = Self::zero(params);
        out.coeffs[0] = Fp::one(&params.fp);
        out
    }

    /// The element `X^i`.
    pub fn basis(params: &Arc<ExtParameters>, i: usize) -> Self {
        debug_assert!(i < params.degree);
        let mut out = Self::zero(params);
        out.coeffs[i] = Fp::one(&params.fp);
        out
    }

    /// Embeds a base-field element into the constant coefficient.
    pub fn from_base(value: &Fp, params: &Arc<ExtParameters>) -> Self {
        let mut out = Self::zero(params);
        out.coeffs[0] = value.clone();
        out
    }

    #[inline]
    pub fn coeffs(&self) -> &[Fp] {
        &self.coeffs
    }

    #[inline]
    pub fn params(&self) -> &Arc<ExtParameters> {
        &self.params
    }

    pub fn mul_by_base(&self, other: &Fp) -> Self {
        let coeffs = self.coeffs.iter().map(|c| c.mul(other)).collect();
        ExtElement {
            coeffs,
            params: self.params.clone(),
        }
    }

    /// The field norm down to Fq: the product of all conjugates
    /// `self^(p^i)`. For a quadratic extension this is the closed form
    /// `c0^2 - beta * c1^2`.
    pub fn norm(&self) -> Fp {
        if self.params.degree == 2 {
            let beta = self.params.modulus_coeffs[0].neg();
            let t0 = self.coeffs[0].square();
            let t1 = beta.mul(&self.coeffs[1].square());
            return t0.sub(&t1);
        }

        let p = self.params.fp.modulus().clone();
        let mut conjugate = self.clone();
        let mut product = self.clone();
        for _ in 1..self.params.degree {
            conjugate = conjugate.pow(&p);
            product = product.mul(&conjugate);
        }
        debug_assert!(product.coeffs[1..].iter().all(|c| c.is_zero()));
        product.coeffs[0].clone()
    }

    /// Quadratic residuosity through the norm map.
    pub fn legendre(&self) -> LegendreSymbol {
        self.norm().legendre()
    }

    /// The Frobenius endomorphism `self^(p^power)`, evaluated as
    /// coefficient-wise multiplications by the precomputed table. Only
    /// available for binomial towers.
    pub fn frobenius_map(&self, power: usize) -> Self {
        let table = self
            .params
            .frobenius_coeffs
            .as_ref()
            .expect("Frobenius table is only defined for binomial towers");
        let power = power % self.params.degree;
        let mut out = self.clone();
        for a in 1..self.params.degree {
            out.coeffs[a] = out.coeffs[a].mul(&table[a - 1][power]);
        }
        out
    }
}

impl Field for ExtElement {
    fn zero(&self) -> Self {
        ExtElement::zero(&self.params)
    }

    fn one(&self) -> Self {
        ExtElement::one(&self.params)
    }

    fn is_zero(&self) -> bool {
        self.coeffs.iter().all(|c| c.is_zero())
    }

    fn is_one(&self) -> bool {
        self.coeffs[0].is_one() && self.coeffs[1..].iter().all(|c| c.is_zero())
    }

    fn add(&self, other: &Self) -> Self {
        debug_assert!(Arc::ptr_eq(&self.params, &other.params));
        let coeffs = self
            .coeffs
            .iter()
            .zip(&other.coeffs)
            .map(|(a, b)| a.add(b))
            .collect();
        ExtElement {
            coeffs,
            params: self.params.clone(),
        }
    }

    fn sub(&self, other: &Self) -> Self {
        debug_assert!(Arc::ptr_eq(&self.params, &other.params));
        let coeffs = self
            .coeffs
            .iter()
            .zip(&other.coeffs)
            .map(|(a, b)| a.sub(b))
            .collect();
        ExtElement {
            coeffs,
            params: self.params.clone(),
        }
    }

    fn mul(&self, other: &Self) -> Self {
        debug_assert!(Arc::ptr_eq(&self.params, &other.params));
        let k = self.params.degree;
        let zero = Fp::zero(&self.params.fp);

        // Schoolbook product, then fold X^k = -(c_{k-1} X^{k-1} + ... + c_0)
        // from the top down.
        let mut prod = vec![zero; 2 * k - 1];
        for i in 0..k {
            if self.coeffs[i].is_zero() {
                continue;
            }
            for j in 0..k {
                let t = self.coeffs[i].mul(&other.coeffs[j]);
                prod[i + j] = prod[i + j].add(&t);
            }
        }
        for i in (k..2 * k - 1).rev() {
            let top = prod[i].clone();
            if top.is_zero() {
                continue;
            }
            for j in 0..k {
                let t = top.mul(&self.params.modulus_coeffs[j]);
                prod[i - k + j] = prod[i - k + j].sub(&t);
            }
        }
        prod.truncate(k);
        ExtElement {
            coeffs: prod,
            params: self.params.clone(),
        }
    }

    fn double(&self) -> Self {
        let coeffs = self.coeffs.iter().map(|c| c.double()).collect();
        ExtElement {
            coeffs,
            params: self.params.clone(),
        }
    }

    fn square(&self) -> Self {
        self.mul(self)
    }

    fn neg(&self) -> Self {
        let coeffs = self.coeffs.iter().map(|c| c.neg()).collect();
        ExtElement {
            coeffs,
            params: self.params.clone(),
        }
    }

    fn inverse(&self) -> Option<Self> {
        if self.is_zero() {
            return None;
        }

        let k = self.params.degree;
        if k == 2 {
            // (a + bX)^{-1} = (a - bX) / (a^2 - beta * b^2)
            let beta = self.params.modulus_coeffs[0].neg();
            let v0 = self.coeffs[0].square();
            let v1 = beta.mul(&self.coeffs[1].square());
            let v0 = v0.sub(&v1);
            return v0.inverse().map(|v1| {
                let c0 = self.coeffs[0].mul(&v1);
                let c1 = self.coeffs[1].mul(&v1).neg();
                ExtElement {
                    coeffs: vec![c0, c1],
                    params: self.params.clone(),
                }
            });
        }

        // Extended Euclid on polynomials against the reduction polynomial.
        let zero = Fp::zero(&self.params.fp);
        let one = Fp::one(&self.params.fp);

        let mut lm = vec![zero.clone(); k + 1];
        lm[0] = one.clone();
        let mut hm = vec![zero.clone(); k + 1];

        let mut low: Vec<Fp> = self.coeffs.iter().cloned().chain(Some(zero.clone())).collect();
        let mut high: Vec<Fp> = self
            .params
            .modulus_coeffs
            .iter()
            .cloned()
            .chain(Some(one))
            .collect();

        while poly_degree(&low) > 0 {
            let r = poly_quotient(&high, &low)?;
            let mut nm = hm.clone();
            let mut new = high.clone();
            for i in 0..=k {
                for j in 0..=(k - i) {
                    nm[i + j] = nm[i + j].sub(&lm[i].mul(&r[j]));
                    new[i + j] = new[i + j].sub(&low[i].mul(&r[j]));
                }
            }
            high = low;
            hm = lm;
            low = new;
            lm = nm;
        }

        let scale = low[0].inverse()?;
        let coeffs = lm[..k].iter().map(|c| c.mul(&scale)).collect();
        Some(ExtElement {
            coeffs,
            params: self.params.clone(),
        })
    }
}

fn poly_degree(coeffs: &[Fp]) -> usize {
    for i in (0..coeffs.len()).rev() {
        if !coeffs[i].is_zero() {
            return i;
        }
    }
    0
}

/// Quotient of dividing `a` by `b` over Fq, padded to `a.len()`
/// coefficients. Returns `None` when `b` is the zero polynomial.
fn poly_quotient(a: &[Fp], b: &[Fp]) -> Option<Vec<Fp>> {
    let deg_a = poly_degree(a);
    let deg_b = poly_degree(b);
    if b[deg_b].is_zero() {
        return None;
    }
    let lead_inv = b[deg_b].inverse()?;

    let zero = a[0].zero();
    let mut rem: Vec<Fp> = a.to_vec();
    let mut out = vec![zero; a.len()];
    if deg_a < deg_b {
        return Some(out);
    }
    for i in (0..=deg_a - deg_b).rev() {
        let coeff = rem[deg_b + i].mul(&lead_inv);
        for c in 0..=deg_b {
            rem[c + i] = rem[c + i].sub(&coeff.mul(&b[c]));
        }
        out[i] = coeff;
    }
    Some(out)
}

impl Display for ExtElement {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "Fqk(")?;
        for (i, c) in self.coeffs.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", c.into_repr())?;
        }
        write!(f, ")")
    }
}
