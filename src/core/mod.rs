pub mod shared;
pub mod store;
pub mod urls;
