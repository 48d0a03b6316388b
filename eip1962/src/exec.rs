use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::debug;

use crate::error::Error;
use crate::parser::{self, Operation, MAX_MODULUS_BYTE_LEN};

/// A cooperative cancellation handle. Cloned into long-running operations,
/// which poll it at the top of each Miller-loop iteration and between
/// multi-exponentiation accumulation steps. Caller-imposed timeouts surface
/// through this token.
#[derive(Clone, Debug, Default)]
pub struct CancellationToken {
    inner: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        CancellationToken {
            inner: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn cancel(&self) {
        self.inner.store(true, Ordering::Relaxed);
    }

    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.inner.load(Ordering::Relaxed)
    }
}

/// Per-request execution limits and the cancellation handle.
pub struct ExecutionOptions {
    /// Upper bound on the declared modulus byte length; never above
    /// [`MAX_MODULUS_BYTE_LEN`].
    pub max_field_length: usize,
    /// Upper bound on the number of pairs in a pairing request.
    pub max_pairs: usize,
    pub cancellation: CancellationToken,
}

impl Default for ExecutionOptions {
    fn default() -> Self {
        ExecutionOptions {
            max_field_length: MAX_MODULUS_BYTE_LEN,
            max_pairs: 128,
            cancellation: CancellationToken::new(),
        }
    }
}

/// Parses and runs one request, returning the result bytes: two big-endian
/// coordinates for point outputs, a single `0x00`/`0x01` byte for pairing
/// checks.
pub fn execute(input: &[u8]) -> Result<Vec<u8>, Error> {
    execute_with_options(input, &ExecutionOptions::default())
}

pub fn execute_with_options(input: &[u8], options: &ExecutionOptions) -> Result<Vec<u8>, Error> {
    let operation = parser::parse(input, options)?;
    debug!("dispatching {:?} request", operation.opcode());
    run(&operation, options)
}

/// Runs an already parsed operation.
pub fn run(operation: &Operation, options: &ExecutionOptions) -> Result<Vec<u8>, Error> {
    let cancellation = &options.cancellation;
    let mut out = Vec::new();
    match operation {
        Operation::G1Add { prefix, p, q } => {
            let result = prefix.curve.add(p, q)?;
            parser::encode_g1_point(&result, prefix.field_length as usize, &mut out);
        }
        Operation::G1Mul { prefix, p, scalar } => {
            let result = prefix.curve.mul(p, scalar)?;
            parser::encode_g1_point(&result, prefix.field_length as usize, &mut out);
        }
        Operation::G1MultiExp { prefix, pairs } => {
            let result = prefix.curve.multi_exp(pairs, cancellation)?;
            parser::encode_g1_point(&result, prefix.field_length as usize, &mut out);
        }
        Operation::G2Add { prefix, p, q } => {
            let result = prefix.curve.add(p, q)?;
            parser::encode_g2_point(
                &result,
                prefix.field_length as usize,
                prefix.extension_degree as usize,
                &mut out,
            );
        }
        Operation::G2Mul { prefix, p, scalar } => {
            let result = prefix.curve.mul(p, scalar)?;
            parser::encode_g2_point(
                &result,
                prefix.field_length as usize,
                prefix.extension_degree as usize,
                &mut out,
            );
        }
        Operation::G2MultiExp { prefix, pairs } => {
            let result = prefix.curve.multi_exp(pairs, cancellation)?;
            parser::encode_g2_point(
                &result,
                prefix.field_length as usize,
                prefix.extension_degree as usize,
                &mut out,
            );
        }
        Operation::Pairing(op) => {
            let passed = op.engine.pairing_check(&op.pairs, cancellation)?;
            out.push(passed as u8);
        }
    }
    Ok(out)
}
