//! Low-level helpers shared by the workbook readers and the renderers.

pub(crate) mod case;
pub(crate) mod xml;
pub(crate) mod zip;
