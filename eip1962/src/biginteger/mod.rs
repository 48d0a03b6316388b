use core::cmp::Ordering;
use core::fmt;

pub mod arithmetic;

use self::arithmetic as fa;

/// A smart wrapper around a sequence of `u64` limbs, least-significant limb
/// first. Unlike a fixed-width big integer, the limb count is chosen at
/// runtime from the modulus declared by the request.
///
/// Two-operand primitives (`add_nocarry`, `sub_noborrow`, `cmp`, ...) accept
/// operands of differing lengths by treating missing limbs as zero.
#[derive(Clone, PartialEq, Eq, Hash, Default)]
pub struct BigInteger(pub Vec<u64>);

impl BigInteger {
    #[inline]
    pub fn new(limbs: Vec<u64>) -> Self {
        BigInteger(limbs)
    }

    /// The zero value occupying `num_limbs` limbs.
    #[inline]
    pub fn zero(num_limbs: usize) -> Self {
        BigInteger(vec![0u64; num_limbs])
    }

    #[inline]
    pub fn from_u64(value: u64, num_limbs: usize) -> Self {
        let mut limbs = vec![0u64; num_limbs];
        limbs[0] = value;
        BigInteger(limbs)
    }

    #[inline]
    pub fn num_limbs(&self) -> usize {
        self.0.len()
    }

    /// Returns a copy padded or truncated to `num_limbs` limbs. Truncation
    /// must not drop set limbs; that would silently change the value.
    pub fn resized(&self, num_limbs: usize) -> Self {
        let mut limbs = self.0.clone();
        if limbs.len() < num_limbs {
            limbs.resize(num_limbs, 0);
        } else {
            debug_assert!(limbs[num_limbs..].iter().all(|l| *l == 0));
            limbs.truncate(num_limbs);
        }
        BigInteger(limbs)
    }

    /// Add another representation to this one, returning the carry bit.
    pub fn add_nocarry(&mut self, other: &Self) -> bool {
        debug_assert!(other.num_limbs() <= self.num_limbs());
        let mut carry = 0;
        for (i, a) in self.0.iter_mut().enumerate() {
            let b = other.0.get(i).copied().unwrap_or(0);
            *a = fa::adc(*a, b, &mut carry);
        }
        carry != 0
    }

    /// Subtract another representation from this one, returning the borrow
    /// bit.
    pub fn sub_noborrow(&mut self, other: &Self) -> bool {
        debug_assert!(other.num_limbs() <= self.num_limbs());
        let mut borrow = 0;
        for (i, a) in self.0.iter_mut().enumerate() {
            let b = other.0.get(i).copied().unwrap_or(0);
            *a = fa::sbb(*a, b, &mut borrow);
        }
        borrow != 0
    }

    /// Performs a leftwise bitshift of this number, effectively multiplying
    /// it by 2. Returns the bit shifted out at the top.
    pub fn mul2(&mut self) -> bool {
        let mut last = 0;
        for i in &mut self.0 {
            let tmp = *i >> 63;
            *i <<= 1;
            *i |= last;
            last = tmp;
        }
        last != 0
    }

    /// Performs a rightwise bitshift of this number, effectively dividing
    /// it by 2.
    pub fn div2(&mut self) {
        let mut t = 0;
        for i in self.0.iter_mut().rev() {
            let t2 = *i << 63;
            *i >>= 1;
            *i |= t;
            t = t2;
        }
    }

    /// Performs a rightwise bitshift of this number by some amount.
    pub fn divn(&mut self, mut amt: u32) {
        if amt >= 64 * self.num_limbs() as u32 {
            for limb in &mut self.0 {
                *limb = 0;
            }
            return;
        }

        while amt >= 64 {
            let mut t = 0;
            for i in self.0.iter_mut().rev() {
                core::mem::swap(&mut t, i);
            }
            amt -= 64;
        }

        if amt > 0 {
            let mut t = 0;
            for i in self.0.iter_mut().rev() {
                let t2 = *i << (64 - amt);
                *i >>= amt;
                *i |= t;
                t = t2;
            }
        }
    }

    #[inline]
    pub fn is_odd(&self) -> bool {
        self.0[0] & 1 == 1
    }

    #[inline]
    pub fn is_even(&self) -> bool {
        !self.is_odd()
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|l| *l == 0)
    }

    #[inline]
    pub fn is_one(&self) -> bool {
        self.0[0] == 1 && self.0[1..].iter().all(|l| *l == 0)
    }

    /// Compute the number of bits needed to encode this number.
    pub fn num_bits(&self) -> u32 {
        let mut ret = 64 * self.num_limbs() as u32;
        for i in self.0.iter().rev() {
            let leading = i.leading_zeros();
            ret -= leading;
            if leading != 64 {
                break;
            }
        }
        ret
    }

    /// Compute the `i`-th bit of `self`.
    pub fn get_bit(&self, i: usize) -> bool {
        if i >= 64 * self.num_limbs() {
            false
        } else {
            let limb = i / 64;
            let bit = i - (64 * limb);
            (self.0[limb] >> bit) & 1 == 1
        }
    }

    pub fn set_bit(&mut self, i: usize) {
        let limb = i / 64;
        let bit = i - (64 * limb);
        self.0[limb] |= 1 << bit;
    }

    /// Extract `count` bits starting at bit `start` as a window index.
    /// `count` must be below 64.
    pub fn get_bits(&self, start: usize, count: usize) -> u64 {
        let mut out = 0u64;
        for i in (0..count).rev() {
            out <<= 1;
            if self.get_bit(start + i) {
                out |= 1;
            }
        }
        out
    }

    /// Full (widening) schoolbook product; the result occupies the combined
    /// limb count of the operands.
    pub fn mul_wide(&self, other: &Self) -> Self {
        let mut r = vec![0u64; self.num_limbs() + other.num_limbs()];
        for i in 0..self.num_limbs() {
            let mut carry = 0;
            for j in 0..other.num_limbs() {
                r[i + j] = fa::mac_with_carry(r[i + j], self.0[i], other.0[j], &mut carry);
            }
            r[i + other.num_limbs()] = carry;
        }
        BigInteger(r)
    }

    /// Multiply in place by a single limb, returning the carried-out limb.
    pub fn mul_small(&mut self, other: u64) -> u64 {
        let mut carry = 0;
        for a in self.0.iter_mut() {
            *a = fa::mac_with_carry(0, *a, other, &mut carry);
        }
        carry
    }

    /// Add a single limb in place, returning the carry bit.
    pub fn add_small(&mut self, other: u64) -> bool {
        let mut carry = other;
        for a in self.0.iter_mut() {
            if carry == 0 {
                break;
            }
            let (sum, overflow) = a.overflowing_add(carry);
            *a = sum;
            carry = overflow as u64;
        }
        carry != 0
    }

    /// Subtract a single limb in place. `self` must be at least `other`.
    pub fn sub_small(&mut self, other: u64) {
        let mut borrow = 0;
        for (i, a) in self.0.iter_mut().enumerate() {
            let b = if i == 0 { other } else { 0 };
            *a = fa::sbb(*a, b, &mut borrow);
            if i > 0 && borrow == 0 {
                break;
            }
        }
        debug_assert_eq!(borrow, 0);
    }

    /// Shift-subtract long division: returns `(self / divisor, self %
    /// divisor)`. The divisor must be non-zero; every caller validates this
    /// before dividing (the parser rejects a zero group order).
    pub fn div_rem(&self, divisor: &Self) -> (Self, Self) {
        assert!(!divisor.is_zero(), "division by zero");

        let n = self.num_limbs();
        let divisor = divisor.resized_up(n);
        let mut quotient = BigInteger::zero(n);
        let mut remainder = BigInteger::zero(divisor.num_limbs());

        for i in (0..self.num_bits() as usize).rev() {
            // The shifted-out bit means the (n+1)-limb value exceeds the
            // divisor; the wrapping subtraction below is then exact.
            let overflow = remainder.mul2();
            if self.get_bit(i) {
                remainder.0[0] |= 1;
            }
            if overflow || remainder >= divisor {
                remainder.sub_noborrow(&divisor);
                quotient.set_bit(i);
            }
        }
        (quotient, remainder)
    }

    /// Returns `None` when truncation would drop set limbs, i.e. the value
    /// needs more limbs than the target width provides.
    pub fn resized_to(&self, num_limbs: usize) -> Option<Self> {
        if self.num_limbs() > num_limbs && self.0[num_limbs..].iter().any(|l| *l != 0) {
            return None;
        }
        let mut limbs = self.0.clone();
        limbs.resize(num_limbs, 0);
        Some(BigInteger(limbs))
    }

    // Like `resized` but never truncates below the set limbs.
    fn resized_up(&self, num_limbs: usize) -> Self {
        if self.num_limbs() <= num_limbs {
            self.resized(num_limbs)
        } else {
            self.clone()
        }
    }

    /// Reads a big-endian byte string. The limb count is the smallest that
    /// fits the byte length.
    pub fn from_be_bytes(bytes: &[u8]) -> Self {
        let num_limbs = (bytes.len() + 7) / 8;
        let mut limbs = vec![0u64; num_limbs.max(1)];
        for (i, byte) in bytes.iter().rev().enumerate() {
            limbs[i / 8] |= (*byte as u64) << (8 * (i % 8));
        }
        BigInteger(limbs)
    }

    /// Writes `width` big-endian bytes. The value must fit.
    pub fn to_be_bytes(&self, width: usize) -> Vec<u8> {
        debug_assert!(self.num_bits() as usize <= width * 8);
        let mut out = vec![0u8; width];
        for i in 0..width {
            let limb = i / 8;
            let byte = i % 8;
            if limb < self.num_limbs() {
                out[width - 1 - i] = (self.0[limb] >> (8 * byte)) as u8;
            }
        }
        out
    }

    /// Interprets a string of decimal digits as a big integer. Used for
    /// well-known curve constants.
    pub fn from_decimal_str(s: &str) -> Option<Self> {
        if s.is_empty() {
            return None;
        }
        let mut res = BigInteger::zero(1);
        for c in s.chars() {
            let d = c.to_digit(10)? as u64;
            let carry = res.mul_small(10);
            if carry != 0 {
                res.0.push(carry);
            }
            if res.add_small(d) {
                res.0.push(1);
            }
        }
        Some(res)
    }
}

impl Ord for BigInteger {
    fn cmp(&self, other: &Self) -> Ordering {
        let len = self.num_limbs().max(other.num_limbs());
        for i in (0..len).rev() {
            let a = self.0.get(i).copied().unwrap_or(0);
            let b = other.0.get(i).copied().unwrap_or(0);
            match a.cmp(&b) {
                Ordering::Equal => (),
                order => return order,
            }
        }
        Ordering::Equal
    }
}

impl PartialOrd for BigInteger {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl AsRef<[u64]> for BigInteger {
    #[inline]
    fn as_ref(&self) -> &[u64] {
        &self.0
    }
}

impl fmt::Debug for BigInteger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BigInteger({})", self)
    }
}

impl fmt::Display for BigInteger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_zero() {
            return write!(f, "0");
        }
        // Peel off decimal digits 19 at a time.
        let chunk = BigInteger::from_u64(10_000_000_000_000_000_000u64, self.num_limbs().max(1));
        let mut value = self.clone();
        let mut chunks = Vec::new();
        while !value.is_zero() {
            let (q, r) = value.div_rem(&chunk);
            chunks.push(r.0[0]);
            value = q;
        }
        write!(f, "{}", chunks.pop().unwrap_or(0))?;
        for c in chunks.iter().rev() {
            write!(f, "{:019}", c)?;
        }
        Ok(())
    }
}
