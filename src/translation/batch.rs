/*!
 * Batch splitting.
 *
 * Subtitle entries are sent to the provider in fixed-size, contiguous groups.
 */

use crate::errors::PipelineError;

/// Split `items` into consecutive batches of at most `size` elements
///
/// Every element lands in exactly one batch and the original order is kept;
/// only the last batch may be shorter. A size of zero is rejected.
pub fn chunk_entries<T: Clone>(items: &[T], size: usize) -> Result<Vec<Vec<T>>, PipelineError> {
    if size == 0 {
        return Err(PipelineError::InvalidBatchSize(size));
    }

    Ok(items.chunks(size).map(|chunk| chunk.to_vec()).collect())
}

/// Number of batches `chunk_entries` produces for `len` items
pub fn batch_count(len: usize, size: usize) -> usize {
    if size == 0 {
        0
    } else {
        len.div_ceil(size)
    }
}
