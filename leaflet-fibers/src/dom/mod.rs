mod arena;
mod document;
mod style;

pub use arena::{Dom, ElementData, ElementId};
pub use document::Document;
pub use style::{CssLength, ElementStyle, Size};
