//! Splitting a file into ordered, size-bounded fragments.

use crate::error::{CodecError, Result};

/// Default fragment size as a percentage of the file size.
pub const DEFAULT_FRAGMENT_PERCENT: u8 = 10;

/// Fragment size in bytes for a file of `total` bytes.
///
/// `floor(total * percent / 100)`, but never less than one byte.
pub fn fragment_size(total: usize, percent: u8) -> Result<usize> {
    if percent == 0 || percent > 100 {
        return Err(CodecError::InvalidFragmentPercent(percent));
    }
    let size = (total as u128 * percent as u128 / 100) as usize;
    Ok(size.max(1))
}

/// Split `data` into consecutive chunks of [`fragment_size`] bytes.
///
/// The last chunk may be shorter. Empty input yields no chunks; any other
/// input yields at least one. Concatenating the chunks restores `data`.
pub fn split(data: &[u8], percent: u8) -> Result<Vec<&[u8]>> {
    let size = fragment_size(data.len(), percent)?;
    Ok(data.chunks(size).collect())
}
