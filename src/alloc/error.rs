use derive_more::{Display, Error, From, IsVariant};

use crate::util::fatal::Fatal;

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Error)]
#[display("out of memory")]
pub struct OOMError;
impl Fatal for OOMError {}

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Error)]
#[display("capacity overflow")]
pub struct CapacityOverflowError;
impl Fatal for CapacityOverflowError {}

/// The ways in which a policy-checked allocation can fail. Only ever observed by callers using a
/// [`Reporting`](super::FailureMode::Reporting) policy.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, From, Error, IsVariant)]
pub enum AllocError {
    OOM(OOMError),
    CapacityOverflow(CapacityOverflowError),
}
impl Fatal for AllocError {}
