//! Joint fair value from two independently chosen numbers.

use crate::error::DiceError;

/// `(secret + counterpart) mod modulus`.
///
/// The counterpart's number must already lie in `[0, modulus - 1]`; anything
/// else is a caller error, never silently wrapped. If either input is uniform
/// and independent of the other, the result is uniform over the range.
pub fn combine(secret: u64, counterpart: u64, modulus: u64) -> Result<u64, DiceError> {
    if modulus == 0 {
        return Err(DiceError::ProtocolSequence(
            "combination modulus must be positive".into(),
        ));
    }
    if counterpart >= modulus {
        return Err(DiceError::ProtocolSequence(format!(
            "counterpart value {} outside [0, {}]",
            counterpart,
            modulus - 1
        )));
    }

    let joint = (secret as u128 + counterpart as u128) % modulus as u128;
    Ok(joint as u64)
}
