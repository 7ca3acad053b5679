pub mod numeric;
pub mod pagination;
pub mod password;
pub mod token;
