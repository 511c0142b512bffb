//! Outbound broadcast adaptation.
//!
//! Outbound hook events arrive as the server's typed broadcast parameters
//! instead of bytes. The adapter narrows them (checked), applies the
//! server's own clamping where the protocol defines it, and resolves tile
//! entities through a read-only registry supplied by the caller.

pub mod adapter;
pub mod fields;
pub mod registry;
