pub mod builder;
pub mod defaults;
pub mod handle;
pub mod runtime;
pub mod traits;
