//! Three-address intermediate representation
//!
//! A flat instruction sequence with structured instructions: every opcode is
//! a tagged variant with typed operand fields, and the textual form shown in
//! artifacts is plain `Display` formatting over that structure.

mod instr;
mod lower;
mod opt;

pub use instr::*;
pub use lower::*;
pub use opt::*;
