mod bcrypt_hasher;
mod interface;

pub use bcrypt_hasher::*;
pub use interface::*;
