//! Authentication adapters.
//!
//! Implementations of the `TokenValidator` port:
//!
//! - `entra` - Production Entra ID implementation with JWKS verification
//! - `mock` - Test implementation that doesn't require an identity provider

mod entra;
mod mock;

pub use entra::{EntraConfig, EntraTokenValidator};
pub use mock::MockTokenValidator;
