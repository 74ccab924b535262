//! Core type definitions using newtype patterns for type safety.
//!
//! These types keep hostnames, ports, and address families from being
//! passed around as loose strings and integers.

mod address;
mod port;
mod target;

pub use address::{
    is_valid_ipv4, is_valid_ipv6, AddressFamily, AddressFamilyPolicy, ResolvedAddress,
};
pub use port::{Port, PortError};
pub use target::ScanTarget;
