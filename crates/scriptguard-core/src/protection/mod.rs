//! Script "protection" stubs.
//!
//! Neither module provides a security property. The transform is a reversible
//! base64 wrap and the findings are placeholders behind a trait so a real
//! analyzer can be plugged in later.

pub mod findings;
pub mod transform;

pub use findings::{Findings, FindingsGenerator, PlaceholderFindings};
pub use transform::{decode_artifact, sanitize_file_name, transform, TransformOutput};
