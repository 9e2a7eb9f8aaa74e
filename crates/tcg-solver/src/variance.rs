//! Declared variance of generic type parameters.
//!
//! Variance determines how subtyping of generic types relates to subtyping
//! of their type arguments:
//!
//! - **Covariant**: `Box<Cat>` <: `Box<Animal>` if `Cat` <: `Animal`
//! - **Contravariant**: `Sink<Animal>` <: `Sink<Cat>` if `Cat` <: `Animal`
//! - **Invariant**: `Cell<Cat>` <: `Cell<Animal>` only if both directions hold
//! - **Unrelated**: the argument does not take part in the check
//!
//! Variance is declared on the type parameter rather than inferred from its
//! uses, so it is a property the declaration collaborator reports.

use bitflags::bitflags;
use std::fmt;

bitflags! {
    /// Variance of a type parameter, as the set of directions in which its
    /// arguments must be related.
    #[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
    pub struct Variance: u8 {
        /// Argument of the subtype must be a subtype of the supertype's argument.
        const COVARIANT = 1 << 0;
        /// Argument of the supertype must be a subtype of the subtype's argument.
        const CONTRAVARIANT = 1 << 1;
        /// Both directions.
        const INVARIANT = Self::COVARIANT.bits() | Self::CONTRAVARIANT.bits();
    }
}

impl Variance {
    /// No direction: the argument is ignored.
    pub const UNRELATED: Variance = Variance::empty();

    #[inline]
    pub fn is_covariant(self) -> bool {
        self == Variance::COVARIANT
    }

    #[inline]
    pub fn is_contravariant(self) -> bool {
        self == Variance::CONTRAVARIANT
    }

    #[inline]
    pub fn is_invariant(self) -> bool {
        self == Variance::INVARIANT
    }

    #[inline]
    pub fn is_unrelated(self) -> bool {
        self.is_empty()
    }

    /// Whether `arg_sub <: arg_super` has to hold.
    #[inline]
    pub fn requires_forward(self) -> bool {
        self.contains(Variance::COVARIANT)
    }

    /// Whether `arg_super <: arg_sub` has to hold.
    #[inline]
    pub fn requires_backward(self) -> bool {
        self.contains(Variance::CONTRAVARIANT)
    }
}

impl fmt::Display for Variance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = if self.is_invariant() {
            "inout"
        } else if self.is_covariant() {
            "out"
        } else if self.is_contravariant() {
            "in"
        } else {
            "unrelated"
        };
        f.write_str(name)
    }
}
