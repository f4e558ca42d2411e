//! Policy language core: URNs, syntax validation, matching and evaluation

pub mod iam;
pub mod urn;
pub mod validation;
