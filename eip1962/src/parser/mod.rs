use std::sync::Arc;

use log::trace;

use crate::biginteger::BigInteger;
use crate::curves::pairing::{CurveFamily, PairingCurve, TwistType};
use crate::curves::{Affine, Curve};
use crate::error::Error;
use crate::exec::ExecutionOptions;
use crate::fields::{is_non_nth_root, ExtElement, ExtParameters, Field, Fp, FpParameters};

pub const OPERATION_ENCODING_LENGTH: usize = 1;
pub const BYTES_FOR_LENGTH_ENCODING: usize = 1;
pub const EXTENSION_DEGREE_ENCODING_LENGTH: usize = 1;
pub const CURVE_TYPE_LENGTH: usize = 1;
pub const TWIST_TYPE_LENGTH: usize = 1;
pub const SIGN_ENCODING_LENGTH: usize = 1;
pub const PAIR_COUNT_ENCODING_LENGTH: usize = 1;

/// Hard cap on the declared modulus byte length; bounds the memory any
/// request can pin (a caller may lower it further through
/// [`ExecutionOptions`]).
pub const MAX_MODULUS_BYTE_LEN: usize = 128;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Opcode {
    G1Add = 1,
    G1Mul = 2,
    G1MultiExp = 3,
    G2Add = 4,
    G2Mul = 5,
    G2MultiExp = 6,
    Pairing = 7,
}

impl Opcode {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            1 => Some(Opcode::G1Add),
            2 => Some(Opcode::G1Mul),
            3 => Some(Opcode::G1MultiExp),
            4 => Some(Opcode::G2Add),
            5 => Some(Opcode::G2Mul),
            6 => Some(Opcode::G2MultiExp),
            7 => Some(Opcode::Pairing),
            _ => None,
        }
    }

    pub fn is_g1(&self) -> bool {
        matches!(self, Opcode::G1Add | Opcode::G1Mul | Opcode::G1MultiExp)
    }

    pub fn is_g2(&self) -> bool {
        matches!(self, Opcode::G2Add | Opcode::G2Mul | Opcode::G2MultiExp)
    }

    pub fn is_pairing(&self) -> bool {
        matches!(self, Opcode::Pairing)
    }
}

/// The operating context of a G1 request: base field, curve and scalar
/// widths, exactly as declared on the wire.
pub struct G1Prefix {
    pub field_length: u8,
    pub fp: Arc<FpParameters>,
    pub curve: Curve<Fp>,
    pub order_length: u8,
}

/// The operating context of a G2 request: the extension field on top of
/// the declared base field, and the curve over it.
pub struct G2Prefix {
    pub field_length: u8,
    pub fp: Arc<FpParameters>,
    pub extension_degree: u8,
    pub non_residue: Fp,
    pub ext: Arc<ExtParameters>,
    pub curve: Curve<ExtElement>,
    pub order_length: u8,
}

/// A fully validated pairing request: the bound engine plus every raw
/// descriptor field needed to reproduce the original encoding.
pub struct PairingOp {
    pub family: CurveFamily,
    pub field_length: u8,
    pub order_length: u8,
    pub fqe_non_residue: Fp,
    pub fp6_non_residue: Option<(Fp, Fp)>,
    pub twist: TwistType,
    pub x_length: u8,
    pub x: BigInteger,
    pub x_is_negative: bool,
    pub engine: PairingCurve,
    pub pairs: Vec<(Affine<Fp>, Affine<ExtElement>)>,
}

/// A parsed, validated operation. Consumed by the dispatcher; never
/// persisted.
pub enum Operation {
    G1Add {
        prefix: G1Prefix,
        p: Affine<Fp>,
        q: Affine<Fp>,
    },
    G1Mul {
        prefix: G1Prefix,
        p: Affine<Fp>,
        scalar: BigInteger,
    },
    G1MultiExp {
        prefix: G1Prefix,
        pairs: Vec<(Affine<Fp>, BigInteger)>,
    },
    G2Add {
        prefix: G2Prefix,
        p: Affine<ExtElement>,
        q: Affine<ExtElement>,
    },
    G2Mul {
        prefix: G2Prefix,
        p: Affine<ExtElement>,
        scalar: BigInteger,
    },
    G2MultiExp {
        prefix: G2Prefix,
        pairs: Vec<(Affine<ExtElement>, BigInteger)>,
    },
    Pairing(PairingOp),
}

/// A stateful cursor over the request bytes. Primitive consumers advance
/// `remaining` and track the absolute offset for error reporting.
pub struct Parser<'a> {
    remaining: &'a [u8],
    offset: usize,
}

impl<'a> Parser<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Parser {
            remaining: bytes,
            offset: 0,
        }
    }

    #[inline]
    pub fn remaining(&self) -> usize {
        self.remaining.len()
    }

    fn consume(&mut self, n: usize) -> Result<&'a [u8], Error> {
        if self.remaining.len() < n {
            return Err(Error::ParseTruncated {
                offset: self.offset,
                wanted: n,
            });
        }
        let (head, tail) = self.remaining.split_at(n);
        self.remaining = tail;
        self.offset += n;
        Ok(head)
    }

    fn consume_byte(&mut self) -> Result<u8, Error> {
        Ok(self.consume(1)?[0])
    }

    fn consume_length(&mut self) -> Result<usize, Error> {
        Ok(self.consume(BYTES_FOR_LENGTH_ENCODING)?[0] as usize)
    }

    fn consume_biginteger(&mut self, n_bytes: usize) -> Result<BigInteger, Error> {
        Ok(BigInteger::from_be_bytes(self.consume(n_bytes)?))
    }

    /// A big-endian field element of exactly `field_length` bytes. Values
    /// at or above the modulus are rejected as non-canonical.
    fn consume_fp(
        &mut self,
        field_length: usize,
        params: &Arc<FpParameters>,
    ) -> Result<Fp, Error> {
        let offset = self.offset;
        let repr = self.consume_biginteger(field_length)?;
        Fp::from_repr(&repr, params).ok_or(Error::ParseNotCanonical { offset })
    }

    fn consume_fqe(
        &mut self,
        field_length: usize,
        ext: &Arc<ExtParameters>,
    ) -> Result<ExtElement, Error> {
        let mut coeffs = Vec::with_capacity(ext.degree());
        for _ in 0..ext.degree() {
            coeffs.push(self.consume_fp(field_length, ext.fp())?);
        }
        Ok(ExtElement::new(coeffs, ext))
    }

    fn consume_modulus(
        &mut self,
        field_length: usize,
    ) -> Result<Arc<FpParameters>, Error> {
        let modulus = self.consume_biginteger(field_length)?;
        FpParameters::new(modulus)
    }

    fn consume_field_length(&mut self, options: &ExecutionOptions) -> Result<usize, Error> {
        let field_length = self.consume_length()?;
        let cap = options.max_field_length.min(MAX_MODULUS_BYTE_LEN);
        if field_length == 0 || field_length > cap {
            return Err(Error::InvalidCurve {
                reason: "field length must be between 1 and 128 bytes",
            });
        }
        Ok(field_length)
    }

    fn consume_order(&mut self) -> Result<(u8, BigInteger), Error> {
        let order_length = self.consume_length()?;
        let order = self.consume_biginteger(order_length)?;
        if order.is_zero() {
            return Err(Error::InvalidCurve {
                reason: "group order is zero",
            });
        }
        Ok((order_length as u8, order))
    }

    fn consume_g1_point(&mut self, prefix: &G1Prefix) -> Result<Affine<Fp>, Error> {
        let offset = self.offset;
        let x = self.consume_fp(prefix.field_length as usize, &prefix.fp)?;
        let y = self.consume_fp(prefix.field_length as usize, &prefix.fp)?;
        prefix
            .curve
            .point(x, y)
            .map_err(|_| Error::NotOnCurve { offset })
    }

    fn g1_prefix(&mut self, options: &ExecutionOptions) -> Result<G1Prefix, Error> {
        let field_length = self.consume_field_length(options)?;
        let fp = self.consume_modulus(field_length)?;
        let a = self.consume_fp(field_length, &fp)?;
        let b = self.consume_fp(field_length, &fp)?;
        let (order_length, order) = self.consume_order()?;
        Ok(G1Prefix {
            field_length: field_length as u8,
            fp,
            curve: Curve::new(a, b, order),
            order_length,
        })
    }

    fn g1_op(&mut self, op: Opcode, options: &ExecutionOptions) -> Result<Operation, Error> {
        let prefix = self.g1_prefix(options)?;
        match op {
            Opcode::G1Add => {
                let p = self.consume_g1_point(&prefix)?;
                let q = self.consume_g1_point(&prefix)?;
                Ok(Operation::G1Add { prefix, p, q })
            }
            Opcode::G1Mul => {
                let p = self.consume_g1_point(&prefix)?;
                let scalar = self.consume_biginteger(prefix.order_length as usize)?;
                Ok(Operation::G1Mul { prefix, p, scalar })
            }
            Opcode::G1MultiExp => {
                let num_pairs = self.consume_byte()? as usize;
                let mut pairs = Vec::with_capacity(num_pairs);
                for _ in 0..num_pairs {
                    let p = self.consume_g1_point(&prefix)?;
                    let scalar = self.consume_biginteger(prefix.order_length as usize)?;
                    pairs.push((p, scalar));
                }
                Ok(Operation::G1MultiExp { prefix, pairs })
            }
            _ => unreachable!("dispatched by opcode group"),
        }
    }

    fn consume_g2_point(&mut self, prefix: &G2Prefix) -> Result<Affine<ExtElement>, Error> {
        let offset = self.offset;
        let x = self.consume_fqe(prefix.field_length as usize, &prefix.ext)?;
        let y = self.consume_fqe(prefix.field_length as usize, &prefix.ext)?;
        prefix
            .curve
            .point(x, y)
            .map_err(|_| Error::NotOnCurve { offset })
    }

    fn g2_prefix(&mut self, options: &ExecutionOptions) -> Result<G2Prefix, Error> {
        let field_length = self.consume_field_length(options)?;
        let fp = self.consume_modulus(field_length)?;

        let degree_offset = self.offset;
        let extension_degree = self.consume_byte()?;
        if extension_degree != 2 && extension_degree != 3 {
            return Err(Error::ParseBadEnum {
                offset: degree_offset,
                value: extension_degree,
            });
        }

        let non_residue = self.consume_fp(field_length, &fp)?;
        let mut coeffs = vec![non_residue.neg()];
        coeffs.resize(extension_degree as usize, Fp::zero(&fp));
        let ext = ExtParameters::new(&fp, coeffs)?;

        let a = self.consume_fqe(field_length, &ext)?;
        let b = self.consume_fqe(field_length, &ext)?;
        let (order_length, order) = self.consume_order()?;

        Ok(G2Prefix {
            field_length: field_length as u8,
            fp,
            extension_degree,
            non_residue,
            ext,
            curve: Curve::new(a, b, order),
            order_length,
        })
    }

    fn g2_op(&mut self, op: Opcode, options: &ExecutionOptions) -> Result<Operation, Error> {
        let prefix = self.g2_prefix(options)?;
        match op {
            Opcode::G2Add => {
                let p = self.consume_g2_point(&prefix)?;
                let q = self.consume_g2_point(&prefix)?;
                Ok(Operation::G2Add { prefix, p, q })
            }
            Opcode::G2Mul => {
                let p = self.consume_g2_point(&prefix)?;
                let scalar = self.consume_biginteger(prefix.order_length as usize)?;
                Ok(Operation::G2Mul { prefix, p, scalar })
            }
            Opcode::G2MultiExp => {
                let num_pairs = self.consume_byte()? as usize;
                let mut pairs = Vec::with_capacity(num_pairs);
                for _ in 0..num_pairs {
                    let p = self.consume_g2_point(&prefix)?;
                    let scalar = self.consume_biginteger(prefix.order_length as usize)?;
                    pairs.push((p, scalar));
                }
                Ok(Operation::G2MultiExp { prefix, pairs })
            }
            _ => unreachable!("dispatched by opcode group"),
        }
    }

    fn pairing_op(&mut self, options: &ExecutionOptions) -> Result<Operation, Error> {
        let family_offset = self.offset;
        let family_byte = self.consume_byte()?;
        let family = CurveFamily::from_u8(family_byte).ok_or(Error::ParseBadEnum {
            offset: family_offset,
            value: family_byte,
        })?;

        let field_length = self.consume_field_length(options)?;
        let fp = self.consume_modulus(field_length)?;
        let a = self.consume_fp(field_length, &fp)?;
        let b = self.consume_fp(field_length, &fp)?;

        if family == CurveFamily::Bls12 && !a.is_zero() {
            return Err(Error::InvalidCurve {
                reason: "A parameter must be zero for a BLS12 curve",
            });
        }

        let (order_length, order) = self.consume_order()?;

        // Family-specific tower tail.
        let (fqe_non_residue, fp6_non_residue) = match family {
            CurveFamily::Bls12 | CurveFamily::Bn => {
                let fp2_non_residue = self.consume_fp(field_length, &fp)?;
                if !is_non_nth_root(&fp2_non_residue, fp.modulus(), 2) {
                    return Err(Error::InvalidCurve {
                        reason: "non-residue for Fp2 is actually a residue",
                    });
                }

                let c0 = self.consume_fp(field_length, &fp)?;
                let c1 = self.consume_fp(field_length, &fp)?;
                // The cubic check runs in Fq2, whose multiplicative group
                // has order p^2 - 1.
                let fq2 = ExtParameters::new(&fp, vec![fp2_non_residue.neg(), Fp::zero(&fp)])?;
                let xi = ExtElement::new(vec![c0.clone(), c1.clone()], &fq2);
                if !is_non_nth_root(&xi, &fq2.field_order(), 3) {
                    return Err(Error::InvalidCurve {
                        reason: "non-residue for Fp6 is actually a residue",
                    });
                }
                (fp2_non_residue, Some((c0, c1)))
            }
            CurveFamily::Mnt4 => {
                let non_residue = self.consume_fp(field_length, &fp)?;
                if !is_non_nth_root(&non_residue, fp.modulus(), 2) {
                    return Err(Error::InvalidCurve {
                        reason: "non-residue for Fp2 is actually a residue",
                    });
                }
                (non_residue, None)
            }
            CurveFamily::Mnt6 => {
                let non_residue = self.consume_fp(field_length, &fp)?;
                if !is_non_nth_root(&non_residue, fp.modulus(), 3) {
                    return Err(Error::InvalidCurve {
                        reason: "non-residue for Fp3 is actually a residue",
                    });
                }
                (non_residue, None)
            }
            CurveFamily::Cp => {
                return Err(Error::InvalidCurve {
                    reason: "the CP family has no pairing engine",
                })
            }
        };

        let twist_offset = self.offset;
        let twist_byte = self.consume_byte()?;
        let twist = TwistType::from_u8(twist_byte).ok_or(Error::ParseBadEnum {
            offset: twist_offset,
            value: twist_byte,
        })?;

        let x_length = self.consume_length()?;
        let x = self.consume_biginteger(x_length)?;

        let sign_offset = self.offset;
        let sign_byte = self.consume_byte()?;
        let x_is_negative = match sign_byte {
            0 => false,
            1 => true,
            _ => {
                return Err(Error::ParseBadEnum {
                    offset: sign_offset,
                    value: sign_byte,
                })
            }
        };

        let engine = PairingCurve::new(
            family,
            fp,
            a,
            b,
            order,
            fqe_non_residue.clone(),
            fp6_non_residue.clone(),
            twist,
            x.clone(),
            x_is_negative,
        )?;

        let num_pairs = self.consume_byte()? as usize;
        if num_pairs > options.max_pairs {
            return Err(Error::InvalidCurve {
                reason: "pair count exceeds the configured limit",
            });
        }

        let mut pairs = Vec::with_capacity(num_pairs);
        for _ in 0..num_pairs {
            let g1_offset = self.offset;
            let g1_x = self.consume_fp(field_length, &engine.fp)?;
            let g1_y = self.consume_fp(field_length, &engine.fp)?;
            let p = engine
                .g1
                .point(g1_x, g1_y)
                .map_err(|_| Error::NotOnCurve { offset: g1_offset })?;

            let g2_offset = self.offset;
            let g2_x = self.consume_fqe(field_length, &engine.fqe)?;
            let g2_y = self.consume_fqe(field_length, &engine.fqe)?;
            let q = engine
                .g2
                .point(g2_x, g2_y)
                .map_err(|_| Error::NotOnCurve { offset: g2_offset })?;

            pairs.push((p, q));
        }

        Ok(Operation::Pairing(PairingOp {
            family,
            field_length: field_length as u8,
            order_length,
            fqe_non_residue,
            fp6_non_residue,
            twist,
            x_length: x_length as u8,
            x,
            x_is_negative,
            engine,
            pairs,
        }))
    }

    /// Top-level entry: one opcode byte, then the per-group layout.
    pub fn parse(&mut self, options: &ExecutionOptions) -> Result<Operation, Error> {
        let opcode_offset = self.offset;
        let opcode_byte = self.consume_byte()?;
        let opcode = Opcode::from_u8(opcode_byte).ok_or(Error::ParseBadEnum {
            offset: opcode_offset,
            value: opcode_byte,
        })?;
        trace!("parsing request with opcode {:?}", opcode);

        if opcode.is_g1() {
            self.g1_op(opcode, options)
        } else if opcode.is_g2() {
            self.g2_op(opcode, options)
        } else {
            self.pairing_op(options)
        }
    }
}

/// Parses a complete request with the given limits.
pub fn parse(bytes: &[u8], options: &ExecutionOptions) -> Result<Operation, Error> {
    Parser::new(bytes).parse(options)
}

// ---------------------------------------------------------------------------
// Re-encoding. Serialising a parsed operation reproduces the original bytes.
// ---------------------------------------------------------------------------

pub(crate) fn encode_fp(value: &Fp, field_length: usize, out: &mut Vec<u8>) {
    out.extend_from_slice(&value.into_repr().to_be_bytes(field_length));
}

pub(crate) fn encode_fqe(value: &ExtElement, field_length: usize, out: &mut Vec<u8>) {
    for coeff in value.coeffs() {
        encode_fp(coeff, field_length, out);
    }
}

pub(crate) fn encode_g1_point(point: &Affine<Fp>, field_length: usize, out: &mut Vec<u8>) {
    if point.is_zero() {
        out.extend(core::iter::repeat(0u8).take(2 * field_length));
    } else {
        encode_fp(&point.x, field_length, out);
        encode_fp(&point.y, field_length, out);
    }
}

pub(crate) fn encode_g2_point(
    point: &Affine<ExtElement>,
    field_length: usize,
    degree: usize,
    out: &mut Vec<u8>,
) {
    if point.is_zero() {
        out.extend(core::iter::repeat(0u8).take(2 * degree * field_length));
    } else {
        encode_fqe(&point.x, field_length, out);
        encode_fqe(&point.y, field_length, out);
    }
}

impl G1Prefix {
    fn encode(&self, out: &mut Vec<u8>) {
        let len = self.field_length as usize;
        out.push(self.field_length);
        out.extend_from_slice(&self.fp.modulus().to_be_bytes(len));
        encode_fp(&self.curve.a, len, out);
        encode_fp(&self.curve.b, len, out);
        out.push(self.order_length);
        out.extend_from_slice(&self.curve.order.to_be_bytes(self.order_length as usize));
    }
}

impl G2Prefix {
    fn encode(&self, out: &mut Vec<u8>) {
        let len = self.field_length as usize;
        out.push(self.field_length);
        out.extend_from_slice(&self.fp.modulus().to_be_bytes(len));
        out.push(self.extension_degree);
        encode_fp(&self.non_residue, len, out);
        encode_fqe(&self.curve.a, len, out);
        encode_fqe(&self.curve.b, len, out);
        out.push(self.order_length);
        out.extend_from_slice(&self.curve.order.to_be_bytes(self.order_length as usize));
    }
}

impl Operation {
    pub fn opcode(&self) -> Opcode {
        match self {
            Operation::G1Add { .. } => Opcode::G1Add,
            Operation::G1Mul { .. } => Opcode::G1Mul,
            Operation::G1MultiExp { .. } => Opcode::G1MultiExp,
            Operation::G2Add { .. } => Opcode::G2Add,
            Operation::G2Mul { .. } => Opcode::G2Mul,
            Operation::G2MultiExp { .. } => Opcode::G2MultiExp,
            Operation::Pairing(..) => Opcode::Pairing,
        }
    }

    /// Serialises the operation back into request bytes.
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::new();
        out.push(self.opcode() as u8);
        match self {
            Operation::G1Add { prefix, p, q } => {
                prefix.encode(&mut out);
                let len = prefix.field_length as usize;
                encode_g1_point(p, len, &mut out);
                encode_g1_point(q, len, &mut out);
            }
            Operation::G1Mul { prefix, p, scalar } => {
                prefix.encode(&mut out);
                let len = prefix.field_length as usize;
                encode_g1_point(p, len, &mut out);
                out.extend_from_slice(&scalar.to_be_bytes(prefix.order_length as usize));
            }
            Operation::G1MultiExp { prefix, pairs } => {
                prefix.encode(&mut out);
                let len = prefix.field_length as usize;
                out.push(pairs.len() as u8);
                for (p, scalar) in pairs {
                    encode_g1_point(p, len, &mut out);
                    out.extend_from_slice(&scalar.to_be_bytes(prefix.order_length as usize));
                }
            }
            Operation::G2Add { prefix, p, q } => {
                prefix.encode(&mut out);
                let len = prefix.field_length as usize;
                let degree = prefix.extension_degree as usize;
                encode_g2_point(p, len, degree, &mut out);
                encode_g2_point(q, len, degree, &mut out);
            }
            Operation::G2Mul { prefix, p, scalar } => {
                prefix.encode(&mut out);
                let len = prefix.field_length as usize;
                let degree = prefix.extension_degree as usize;
                encode_g2_point(p, len, degree, &mut out);
                out.extend_from_slice(&scalar.to_be_bytes(prefix.order_length as usize));
            }
            Operation::G2MultiExp { prefix, pairs } => {
                prefix.encode(&mut out);
                let len = prefix.field_length as usize;
                let degree = prefix.extension_degree as usize;
                out.push(pairs.len() as u8);
                for (p, scalar) in pairs {
                    encode_g2_point(p, len, degree, &mut out);
                    out.extend_from_slice(&scalar.to_be_bytes(prefix.order_length as usize));
                }
            }
            Operation::Pairing(op) => {
                let len = op.field_length as usize;
                out.push(op.family as u8);
                out.push(op.field_length);
                out.extend_from_slice(&op.engine.fp.modulus().to_be_bytes(len));
                encode_fp(&op.engine.g1.a, len, &mut out);
                encode_fp(&op.engine.g1.b, len, &mut out);
                out.push(op.order_length);
                out.extend_from_slice(&op.engine.g1.order.to_be_bytes(op.order_length as usize));
                encode_fp(&op.fqe_non_residue, len, &mut out);
                if let Some((c0, c1)) = &op.fp6_non_residue {
                    encode_fp(c0, len, &mut out);
                    encode_fp(c1, len, &mut out);
                }
                out.push(op.twist as u8);
                out.push(op.x_length);
                out.extend_from_slice(&op.x.to_be_bytes(op.x_length as usize));
                out.push(op.x_is_negative as u8);
                out.push(op.pairs.len() as u8);
                let degree = op.engine.fqe.degree();
                for (p, q) in &op.pairs {
                    encode_g1_point(p, len, &mut out);
                    encode_g2_point(q, len, degree, &mut out);
                }
            }
        }
        out
    }
}
