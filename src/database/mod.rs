//! Schema model produced by the parser and consumed by the renderers.

pub mod column;
pub mod table;

pub use column::Column;
pub use column::Key;
pub use table::Table;
pub use table::TableSet;
