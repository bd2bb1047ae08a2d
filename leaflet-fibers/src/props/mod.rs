mod map;
mod options;
mod value;

pub use map::{PropKey, Props};
pub use options::Options;
pub use value::{Children, PropValue};
