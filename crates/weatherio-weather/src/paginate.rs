//! Fixed-size grouping for paged display.

/// Pagination errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PaginationError {
    #[error("Chunk size must be greater than zero")]
    ZeroChunkSize,
}

/// Split `items` into contiguous pages of `chunk_size`; the last page may be shorter.
///
/// # Errors
///
/// Returns [`PaginationError::ZeroChunkSize`] when `chunk_size` is 0.
pub fn split_into_groups<T: Clone>(
    items: &[T],
    chunk_size: usize,
) -> Result<Vec<Vec<T>>, PaginationError> {
    if chunk_size == 0 {
        return Err(PaginationError::ZeroChunkSize);
    }
    Ok(items.chunks(chunk_size).map(<[T]>::to_vec).collect())
}
