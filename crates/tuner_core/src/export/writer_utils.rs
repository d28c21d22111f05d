use std::path::Path;

use crate::artifacts::atomic_write;
use crate::error::ReportError;

pub(crate) fn ensure_not_empty<T>(items: &[T]) -> Result<(), ReportError> {
    if items.is_empty() {
        return Err(ReportError::NoRows);
    }

    Ok(())
}

pub(crate) fn write_output_file(path: impl AsRef<Path>, bytes: &[u8]) -> Result<(), ReportError> {
    atomic_write(path.as_ref(), bytes)
}
