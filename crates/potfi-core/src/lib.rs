pub mod amount;
pub mod constants;
pub mod error;
pub mod pot;
pub mod types;

pub use amount::{format_token_amount, parse_token_amount};
pub use constants::*;
pub use error::PotfiError;
pub use pot::*;
pub use types::*;
