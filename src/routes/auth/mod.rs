pub mod access;
pub mod claims;
pub mod session;
pub mod token;

pub use token::handle_token;
