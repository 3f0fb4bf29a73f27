/// Parallel processing utilities

use crate::error::{ProtlocError, ProtlocResult};

/// Thread count for a requested value, where 0 means every core
pub fn effective_threads(threads: usize) -> usize {
    if threads == 0 {
        num_cpus::get()
    } else {
        threads
    }
}

pub fn configure_thread_pool(threads: usize) -> ProtlocResult<usize> {
    let threads = effective_threads(threads);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .map_err(|e| ProtlocError::Configuration(format!("Failed to build thread pool: {}", e)))?;
    Ok(threads)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effective_threads() {
        assert_eq!(effective_threads(3), 3);
        assert!(effective_threads(0) >= 1);
    }
}
