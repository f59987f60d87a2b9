use std::slice::Chunks;

/// Splits `items` into pages of `page_size`; the last page may be shorter.
/// A page size of zero is treated as one.
pub fn paginate<T>(items: &[T], page_size: usize) -> Chunks<'_, T> {
    items.chunks(page_size.max(1))
}
