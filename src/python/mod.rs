//! Python bindings via PyO3
//!
//! This module provides the Python interface for rapid_fdsm.

pub mod json;
pub mod native;

use pyo3::prelude::*;

/// Register all Python classes and functions
pub fn register_module(m: &Bound<'_, PyModule>) -> PyResult<()> {
    // Version
    m.add("__version__", env!("CARGO_PKG_VERSION"))?;

    // Native interface classes
    m.add_class::<native::PyFdsmConfig>()?;
    m.add_class::<native::PyScoredPair>()?;
    m.add_class::<native::PyFdsmResult>()?;
    m.add_function(wrap_pyfunction!(native::cooccurrences, m)?)?;
    m.add_function(wrap_pyfunction!(native::z_scores, m)?)?;
    m.add_function(wrap_pyfunction!(native::cosine_cooccurrences, m)?)?;

    // JSON interface functions
    m.add_function(wrap_pyfunction!(json::cooccurrences_from_json, m)?)?;
    m.add_function(wrap_pyfunction!(json::cooccurrences_batch_from_json, m)?)?;

    Ok(())
}

/// Map a library error onto `ValueError`
pub(crate) fn to_py_err(err: crate::errors::FdsmError) -> PyErr {
    pyo3::exceptions::PyValueError::new_err(err.to_string())
}
