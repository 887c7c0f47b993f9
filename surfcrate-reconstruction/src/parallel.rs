//! Data-parallel helpers for per-node and per-cell work
//!
//! With the `parallel` feature the maps run on the rayon global pool; without it
//! they are plain sequential iterators. Output order always matches input order,
//! so results are identical either way.

use surfcrate_core::Result;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Inputs shorter than this are always mapped sequentially
pub const MIN_PARALLEL_LEN: usize = 256;

/// Check if parallel processing is compiled in
pub fn is_parallel_enabled() -> bool {
    cfg!(feature = "parallel")
}

/// Order-preserving map
pub fn parallel_map<T, U, F>(data: &[T], f: F) -> Vec<U>
where
    T: Sync,
    U: Send,
    F: Fn(&T) -> U + Sync + Send,
{
    #[cfg(feature = "parallel")]
    {
        if data.len() >= MIN_PARALLEL_LEN {
            return data.par_iter().map(f).collect();
        }
    }

    data.iter().map(f).collect()
}

/// Order-preserving fallible map, stopping at an error
pub fn parallel_try_map<T, U, F>(data: &[T], f: F) -> Result<Vec<U>>
where
    T: Sync,
    U: Send,
    F: Fn(&T) -> Result<U> + Sync + Send,
{
    #[cfg(feature = "parallel")]
    {
        if data.len() >= MIN_PARALLEL_LEN {
            return data.par_iter().map(f).collect();
        }
    }

    data.iter().map(f).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use surfcrate_core::Error;

    #[test]
    fn test_map_preserves_order() {
        let data: Vec<usize> = (0..1000).collect();
        let doubled = parallel_map(&data, |x| x * 2);

        assert_eq!(doubled.len(), data.len());
        assert!(doubled.iter().enumerate().all(|(i, &x)| x == i * 2));
    }

    #[test]
    fn test_try_map_reports_error() {
        let data: Vec<i32> = (0..1000).collect();
        let result = parallel_try_map(&data, |&x| {
            if x == 500 {
                Err(Error::Algorithm("boom".to_string()))
            } else {
                Ok(x)
            }
        });
        assert!(result.is_err());

        let ok = parallel_try_map(&data, |&x| Ok(x + 1)).unwrap();
        assert_eq!(ok[999], 1000);
    }
}
