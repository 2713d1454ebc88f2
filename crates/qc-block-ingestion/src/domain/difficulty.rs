//! Compact difficulty encoding and work arithmetic
//!
//! Targets travel in block headers as a 32-bit "compact" float:
//! the high byte is a base-256 exponent, the low 23 bits the mantissa and
//! bit 23 a sign flag. Negative and overflowing encodings are invalid.

use shared_types::{Hash, U256};

const MANTISSA_MASK: u32 = 0x007f_ffff;
const SIGN_BIT: u32 = 0x0080_0000;
/// Retarget periods considered by [`easiest_target`]
const MAX_RETARGET_PERIODS: u64 = 256;

/// Decode a compact target. Returns `None` for negative or overflowing
/// encodings.
pub fn compact_to_target(bits: u32) -> Option<U256> {
    let exponent = bits >> 24;
    let mut mantissa = bits & MANTISSA_MASK;

    if mantissa != 0 && bits & SIGN_BIT != 0 {
        return None;
    }
    if mantissa != 0
        && (exponent > 34
            || (mantissa > 0xff && exponent > 33)
            || (mantissa > 0xffff && exponent > 32))
    {
        return None;
    }

    if exponent <= 3 {
        mantissa >>= 8 * (3 - exponent);
        Some(U256::from(mantissa))
    } else {
        Some(U256::from(mantissa) << (8 * (exponent - 3) as usize))
    }
}

/// Encode a target in compact form, dropping precision beyond 3 bytes.
pub fn target_to_compact(target: U256) -> u32 {
    if target.is_zero() {
        return 0;
    }

    let mut exponent = ((target.bits() + 7) / 8) as u32;
    let mut mantissa = if exponent <= 3 {
        target.low_u32() << (8 * (3 - exponent))
    } else {
        (target >> (8 * (exponent - 3) as usize)).low_u32()
    };

    // Keep the sign bit clear by shifting into the exponent.
    if mantissa & SIGN_BIT != 0 {
        mantissa >>= 8;
        exponent += 1;
    }

    (exponent << 24) | mantissa
}

/// Expected number of hashes needed to meet `bits`, i.e. `2^256 / (target + 1)`.
///
/// Invalid or zero targets contribute no work.
pub fn calc_work(bits: u32) -> U256 {
    let Some(target) = compact_to_target(bits) else {
        return U256::zero();
    };
    if target.is_zero() {
        return U256::zero();
    }
    if target == U256::MAX {
        return U256::one();
    }
    // 2^256 / (t + 1) == ~t / (t + 1) + 1 without a 257-bit intermediate
    (!target / (target + U256::one())) + U256::one()
}

/// Interpret a block hash as a big-endian number for target comparison.
pub fn hash_to_u256(hash: &Hash) -> U256 {
    U256::from_big_endian(hash)
}

/// Easiest target reachable from `checkpoint_bits` after `elapsed_secs`,
/// when each `max_retarget_timespan` may loosen the target by at most
/// `adjustment_factor`. Never easier than `pow_limit`.
pub fn easiest_target(
    checkpoint_bits: u32,
    elapsed_secs: u64,
    max_retarget_timespan: u64,
    adjustment_factor: u64,
    pow_limit: U256,
) -> U256 {
    let Some(mut target) = compact_to_target(checkpoint_bits) else {
        return pow_limit;
    };

    // A factor of one never loosens the target
    if adjustment_factor <= 1 {
        return target.min(pow_limit);
    }

    let factor = U256::from(adjustment_factor);
    let periods = elapsed_secs.div_ceil(max_retarget_timespan.max(1));
    // 256 multiplications by at least 2 saturate any U256 target
    for _ in 0..periods.min(MAX_RETARGET_PERIODS) {
        if target >= pow_limit {
            break;
        }
        target = target.saturating_mul(factor);
    }

    target.min(pow_limit)
}
