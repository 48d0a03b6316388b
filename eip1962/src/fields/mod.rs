use core::fmt::Debug;

pub mod extension;
pub mod fp;

pub use self::extension::{ExtElement, ExtParameters};
pub use self::fp::{Fp, FpParameters};

/// The capability set shared by all coordinate fields.
///
/// The modulus arrives at request time, so field constants cannot be
/// associated items: identities are derived from an existing element of the
/// same field, and every element carries a handle to its field context.
pub trait Field: Sized + Clone + PartialEq + Eq + Debug {
    /// The additive identity of this element's field.
    #[must_use]
    fn zero(&self) -> Self;

    /// The multiplicative identity of this element's field.
    #[must_use]
    fn one(&self) -> Self;

    fn is_zero(&self) -> bool;

    fn is_one(&self) -> bool;

    #[must_use]
    fn add(&self, other: &Self) -> Self;

    #[must_use]
    fn sub(&self, other: &Self) -> Self;

    #[must_use]
    fn mul(&self, other: &Self) -> Self;

    /// Returns `self + self`.
    #[must_use]
    fn double(&self) -> Self;

    /// Returns `self * self`.
    #[must_use]
    fn square(&self) -> Self;

    /// Returns `-self`.
    #[must_use]
    fn neg(&self) -> Self;

    /// Computes the multiplicative inverse of `self` if `self` is nonzero.
    #[must_use]
    fn inverse(&self) -> Option<Self>;

    /// Returns `self / other` if `other` is nonzero.
    #[must_use]
    fn div(&self, other: &Self) -> Option<Self> {
        other.inverse().map(|inv| self.mul(&inv))
    }

    /// Exponentiates this element by a number represented with `u64` limbs,
    /// least significant limb first.
    #[must_use]
    fn pow<S: AsRef<[u64]>>(&self, exp: S) -> Self {
        let mut res = self.one();

        let mut found_one = false;

        for i in BitIterator::new(exp) {
            if !found_one {
                if i {
                    found_one = true;
                } else {
                    continue;
                }
            }

            res = res.square();

            if i {
                res = res.mul(self);
            }
        }
        res
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum LegendreSymbol {
    Zero = 0,
    QuadraticResidue = 1,
    QuadraticNonResidue = -1,
}

impl LegendreSymbol {
    pub fn is_zero(&self) -> bool {
        *self == LegendreSymbol::Zero
    }

    pub fn is_qnr(&self) -> bool {
        *self == LegendreSymbol::QuadraticNonResidue
    }
}

/// Iterates the bits of a limb sequence, most significant bit first.
#[derive(Debug)]
pub struct BitIterator<E> {
    t: E,
    n: usize,
}

impl<E: AsRef<[u64]>> BitIterator<E> {
    pub fn new(t: E) -> Self {
        let n = t.as_ref().len() * 64;

        BitIterator { t, n }
    }
}

impl<E: AsRef<[u64]>> Iterator for BitIterator<E> {
    type Item = bool;

    fn next(&mut self) -> Option<bool> {
        if self.n == 0 {
            None
        } else {
            self.n -= 1;
            let part = self.n / 64;
            let bit = self.n - (64 * part);

            Some(self.t.as_ref()[part] & (1 << bit) > 0)
        }
    }
}

/// Whether `element` is *not* an n-th root in its field, i.e. whether it can
/// serve as the non-residue of a degree-`n` extension. `field_order` is the
/// multiplicative-group order plus one (q for Fq, q^e for an extension).
/// Returns false when `(field_order - 1) mod n != 0` or when
/// `element^((field_order - 1) / n) == 1`. For n = 2 this is exactly
/// `legendre(element) == -1`.
pub fn is_non_nth_root<F: Field>(
    element: &F,
    field_order: &crate::biginteger::BigInteger,
    n: u64,
) -> bool {
    if element.is_zero() {
        return false;
    }
    let mut order_minus_one = field_order.clone();
    order_minus_one.sub_small(1);
    let divisor = crate::biginteger::BigInteger::from_u64(n, order_minus_one.num_limbs());
    let (quotient, remainder) = order_minus_one.div_rem(&divisor);
    if !remainder.is_zero() {
        return false;
    }
    !element.pow(&quotient).is_one()
}
