//! Registries of protocol parameters.
//!
//! Every type here is a newtype over the raw integer with an associated
//! constant per assigned value. Unassigned values can still be
//! represented and compare equal to a constant of the same value.
//!
//! Conversions from and to the integer go through `from_int`, `to_int`,
//! and `From`. Text conversion uses `FromStr` and `Display` on the
//! mnemonics. Record types and classes without a mnemonic use the
//! `TYPE###` and `CLASS###` forms of RFC 3597, everything else falls back
//! to the decimal value.

pub use self::class::Class;
pub use self::opcode::Opcode;
pub use self::rcode::Rcode;
pub use self::rtype::Rtype;
pub use self::tsigrcode::TsigRcode;

#[macro_use]
mod macros;

pub mod class;
pub mod opcode;
pub mod rcode;
pub mod rtype;
pub mod tsigrcode;
