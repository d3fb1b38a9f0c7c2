//! Module output.
//!
//! - [`result`] - the JSON result document printed on stdout

mod result;

pub use result::ModuleResult;
