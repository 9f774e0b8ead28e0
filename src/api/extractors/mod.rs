pub mod caller;
pub mod internal;
