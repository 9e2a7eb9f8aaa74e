//! Rule families of the constraint matcher.
//!
//! Each submodule extends [`ConstraintMatcher`](crate::ConstraintMatcher)
//! with the rules for one kind of type:
//! - `unions`: `FutureOr` and nullable types on either side (rules 6 to 9)
//! - `interfaces`: interface types and superinterface search (rule 15)
//! - `functions`: function types, generic or not (rule 17)
//! - `records`: record types (rule 19)

pub(crate) mod functions;
pub(crate) mod interfaces;
pub(crate) mod records;
pub(crate) mod unions;
