//! Core types for Ldapfed

mod identity;
mod role;
mod server;
mod status;
mod user;

pub use identity::*;
pub use role::*;
pub use server::*;
pub use status::*;
pub use user::*;
