//! Species-to-structure lookup backing the default
//! [`StructureResolver`](crate::engine::collaborators::StructureResolver).

pub mod registry;

pub use registry::TemplateRegistry;
