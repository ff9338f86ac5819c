pub mod hello;
pub mod qualifying;
