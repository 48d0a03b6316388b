use core::fmt::{Display, Formatter, Result as FmtResult};
use std::sync::Arc;

use derivative::Derivative;

use crate::biginteger::{arithmetic as fa, BigInteger};
use crate::error::Error;
use crate::fields::{Field, LegendreSymbol};

/// Precomputed context of a prime field with a request-supplied modulus.
///
/// Mirrors the constants a compile-time field parameterisation would carry:
/// the modulus, the Montgomery constants `R = 2^(64 * limbs) mod N`,
/// `R^2 mod N` and `INV = -N^{-1} mod 2^64`, and `(N - 1) / 2` for the
/// Legendre symbol. Created once per request; every element of the field
/// holds a shared handle to it.
#[derive(Debug, PartialEq, Eq)]
pub struct FpParameters {
    modulus: BigInteger,
    modulus_bits: u32,
    num_limbs: usize,
    r: BigInteger,
    r2: BigInteger,
    inv: u64,
    modulus_minus_one_div_two: BigInteger,
}

impl FpParameters {
    /// Builds the Montgomery context for `modulus`. The modulus must be odd
    /// and at least 3.
    pub fn new(modulus: BigInteger) -> Result<Arc<Self>, Error> {
        if modulus.is_even() || modulus.num_bits() < 2 {
            return Err(Error::InvalidCurve {
                reason: "modulus must be odd and >= 3",
            });
        }

        let modulus_bits = modulus.num_bits();
        // Keep at least one spare bit in the top limb so that `a + b` and
        // `2a` of reduced values never overflow the backing limbs.
        let mut num_limbs = ((modulus_bits + 63) / 64) as usize;
        if modulus_bits as usize == 64 * num_limbs {
            num_limbs += 1;
        }
        let modulus = modulus.resized(num_limbs);

        // INV = -modulus^{-1} mod 2^64, by Newton iteration.
        let mut inv = 1u64;
        for _ in 0..63 {
            inv = inv.wrapping_mul(inv);
            inv = inv.wrapping_mul(modulus.0[0]);
        }
        inv = inv.wrapping_neg();

        // R = 2^(64 * num_limbs) mod N by repeated modular doubling of 1,
        // then R^2 mod N by doubling R as many times again.
        let mut r = BigInteger::from_u64(1, num_limbs);
        for _ in 0..64 * num_limbs {
            double_mod(&mut r, &modulus);
        }
        let mut r2 = r.clone();
        for _ in 0..64 * num_limbs {
            double_mod(&mut r2, &modulus);
        }

        let mut modulus_minus_one_div_two = modulus.clone();
        modulus_minus_one_div_two.sub_small(1);
        modulus_minus_one_div_two.div2();

        Ok(Arc::new(FpParameters {
            modulus,
            modulus_bits,
            num_limbs,
            r,
            r2,
            inv,
            modulus_minus_one_div_two,
        }))
    }

    #[inline]
    pub fn modulus(&self) -> &BigInteger {
        &self.modulus
    }

    #[inline]
    pub fn modulus_bits(&self) -> u32 {
        self.modulus_bits
    }

    #[inline]
    pub fn num_limbs(&self) -> usize {
        self.num_limbs
    }

    #[inline]
    pub fn modulus_minus_one_div_two(&self) -> &BigInteger {
        &self.modulus_minus_one_div_two
    }
}

#[inline]
fn double_mod(value: &mut BigInteger, modulus: &BigInteger) {
    value.mul2();
    if *value >= *modulus {
        value.sub_noborrow(modulus);
    }
}

/// An element of Fq, kept in Montgomery form between operations.
#[derive(Derivative)]
#[derivative(Clone, Debug, PartialEq, Eq)]
pub struct Fp {
    repr: BigInteger,
    #[derivative(Debug = "ignore", PartialEq = "ignore")]
    params: Arc<FpParameters>,
}

impl Fp {
    #[inline]
    pub fn zero(params: &Arc<FpParameters>) -> Self {
        Fp {
            repr: BigInteger::zero(params.num_limbs),
            params: params.clone(),
        }
    }

    #[inline]
    pub fn one(params: &Arc<FpParameters>) -> Self {
        Fp {
            repr: params.r.clone(),
            params: params.clone(),
        }
    }

    /// Converts a canonical representative into Montgomery form. Returns
    /// `None` if the value is not below the modulus.
    pub fn from_repr(repr: &BigInteger, params: &Arc<FpParameters>) -> Option<Self> {
        let repr = repr.resized_to(params.num_limbs)?;
        if repr >= params.modulus {
            return None;
        }
        let r2 = Fp {
            repr: params.r2.clone(),
            params: params.clone(),
        };
        let mut out = Fp {
            repr,
            params: params.clone(),
        };
        out = out.mul(&r2);
        Some(out)
    }

    /// Converts `value mod modulus` into an element; used for small
    /// constants and non-residues given as integers.
    pub fn from_u64(value: u64, params: &Arc<FpParameters>) -> Self {
        let repr = BigInteger::from_u64(value, params.num_limbs);
        let (_, repr) = repr.div_rem(&params.modulus);
        // Below the modulus by construction.
        Fp::from_repr(&repr, params).unwrap_or_else(|| Fp::zero(params))
    }

    /// Leaves Montgomery form: one Montgomery reduction of the internal
    /// representative.
    pub fn into_repr(&self) -> BigInteger {
        let n = self.params.num_limbs;
        let modulus = &self.params.modulus;
        let mut r = self.repr.0.clone();
        for i in 0..n {
            let k = r[i].wrapping_mul(self.params.inv);
            let mut carry = 0;
            fa::mac_with_carry(r[i], k, modulus.0[0], &mut carry);
            for j in 1..n {
                r[(j + i) % n] = fa::mac_with_carry(r[(j + i) % n], k, modulus.0[j], &mut carry);
            }
            r[i % n] = carry;
        }
        BigInteger(r)
    }

    /// The raw Montgomery-form limbs.
    #[inline]
    pub fn mont_repr(&self) -> &BigInteger {
        &self.repr
    }

    #[inline]
    pub fn params(&self) -> &Arc<FpParameters> {
        &self.params
    }

    /// Modular reduction after an addition: correct while the value is
    /// below `2 * modulus`.
    #[inline]
    fn reduce(&mut self) {
        if self.repr >= self.params.modulus {
            self.repr.sub_noborrow(&self.params.modulus);
        }
    }

    /// Generic CIOS Montgomery multiplication: a full schoolbook product
    /// followed by limb-wise reduction. The no-carry shortcut is not
    /// applicable because the modulus shape is unknown until runtime.
    fn mont_mul(&self, other: &Self) -> BigInteger {
        debug_assert!(Arc::ptr_eq(&self.params, &other.params));
        let n = self.params.num_limbs;
        let modulus = &self.params.modulus;
        let mut r = vec![0u64; 2 * n];

        for i in 0..n {
            let mut carry = 0;
            for j in 0..n {
                r[j + i] = fa::mac_with_carry(r[j + i], self.repr.0[i], other.repr.0[j], &mut carry);
            }
            r[n + i] = carry;
        }
        // Montgomery reduction
        let mut carry2 = 0;
        for i in 0..n {
            let k = r[i].wrapping_mul(self.params.inv);
            let mut carry = 0;
            fa::mac_discard(r[i], k, modulus.0[0], &mut carry);
            for j in 1..n {
                r[j + i] = fa::mac_with_carry(r[j + i], k, modulus.0[j], &mut carry);
            }
            r[n + i] = fa::adc(r[n + i], carry2, &mut carry);
            carry2 = carry;
        }
        debug_assert_eq!(carry2, 0);
        BigInteger(r[n..].to_vec())
    }

    pub fn legendre(&self) -> LegendreSymbol {
        use crate::fields::LegendreSymbol::*;

        if self.is_zero() {
            return Zero;
        }

        // s = self^((modulus - 1) // 2)
        let s = self.pow(&self.params.modulus_minus_one_div_two);
        if s.is_one() {
            QuadraticResidue
        } else {
            QuadraticNonResidue
        }
    }

    pub fn is_quadratic_residue(&self) -> bool {
        !self.legendre().is_qnr()
    }
}

impl Field for Fp {
    #[inline]
    fn zero(&self) -> Self {
        Fp::zero(&self.params)
    }

    #[inline]
    fn one(&self) -> Self {
        Fp::one(&self.params)
    }

    #[inline]
    fn is_zero(&self) -> bool {
        self.repr.is_zero()
    }

    #[inline]
    fn is_one(&self) -> bool {
        self.repr == self.params.r
    }

    fn add(&self, other: &Self) -> Self {
        debug_assert!(Arc::ptr_eq(&self.params, &other.params));
        let mut result = self.clone();
        // Cannot overflow: the top limb keeps a spare bit.
        result.repr.add_nocarry(&other.repr);
        result.reduce();
        result
    }

    fn sub(&self, other: &Self) -> Self {
        debug_assert!(Arc::ptr_eq(&self.params, &other.params));
        let mut result = self.clone();
        // If `other` is larger than `self`, add the modulus first.
        if other.repr > result.repr {
            result.repr.add_nocarry(&self.params.modulus);
        }
        result.repr.sub_noborrow(&other.repr);
        result
    }

    fn mul(&self, other: &Self) -> Self {
        let mut result = Fp {
            repr: self.mont_mul(other),
            params: self.params.clone(),
        };
        result.reduce();
        result
    }

    fn double(&self) -> Self {
        let mut result = self.clone();
        result.repr.mul2();
        result.reduce();
        result
    }

    fn square(&self) -> Self {
        self.mul(self)
    }

    fn neg(&self) -> Self {
        if self.is_zero() {
            return self.clone();
        }
        let mut repr = self.params.modulus.clone();
        repr.sub_noborrow(&self.repr);
        Fp {
            repr,
            params: self.params.clone(),
        }
    }

    fn inverse(&self) -> Option<Self> {
        if self.is_zero() {
            None
        } else {
            // Guajardo Kumar Paar Pelzl
            // Efficient Software-Implementation of Finite Fields with
            // Applications to Cryptography
            // Algorithm 16 (BEA for Inversion in Fp)

            let one = BigInteger::from_u64(1, self.params.num_limbs);

            let mut u = self.repr.clone();
            let mut v = self.params.modulus.clone();
            // Starting from R^2 folds the Montgomery conversion into the
            // result.
            let mut b = Fp {
                repr: self.params.r2.clone(),
                params: self.params.clone(),
            };
            let mut c = Fp::zero(&self.params);

            while u != one && v != one {
                while u.is_even() {
                    u.div2();

                    if b.repr.is_even() {
                        b.repr.div2();
                    } else {
                        b.repr.add_nocarry(&self.params.modulus);
                        b.repr.div2();
                    }
                }

                while v.is_even() {
                    v.div2();

                    if c.repr.is_even() {
                        c.repr.div2();
                    } else {
                        c.repr.add_nocarry(&self.params.modulus);
                        c.repr.div2();
                    }
                }

                if v < u {
                    u.sub_noborrow(&v);
                    b = b.sub(&c);
                } else {
                    v.sub_noborrow(&u);
                    c = c.sub(&b);
                }

                // A non-trivial common factor with the modulus stalls the
                // descent at zero; such an element has no inverse.
                if u.is_zero() || v.is_zero() {
                    return None;
                }
            }

            if u == one {
                Some(b)
            } else {
                Some(c)
            }
        }
    }
}

impl Display for Fp {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "Fp({})", self.into_repr())
    }
}
