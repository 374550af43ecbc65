pub mod constants;
pub mod path;
pub mod proof;
pub mod witness;
