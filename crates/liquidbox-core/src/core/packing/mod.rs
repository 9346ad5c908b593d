//! The default [`Packer`](crate::engine::collaborators::Packer), backed by the
//! external packmol program.

pub mod packmol;

pub use packmol::PackmolPacker;
