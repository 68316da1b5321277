//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! - `TokenValidator` - Bearer token verification and claim extraction
//! - `OperationOracle` - Authoritative marketplace operation status

mod operation_oracle;
mod token_validator;

pub use operation_oracle::{OperationOracle, OracleError};
pub use token_validator::{AuthError, TokenValidator};
