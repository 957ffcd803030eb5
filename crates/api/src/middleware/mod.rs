//! Request extractors for gateway-resolved identity.
//!
//! - [`identity::Caller`] -- extracts the workspace and acting user that
//!   the upstream auth gateway resolved into request headers.

pub mod identity;
