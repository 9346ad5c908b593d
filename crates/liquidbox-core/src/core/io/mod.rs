//! File formats read and written by the workflows.
//!
//! Molecular coordinates (BGF, GRO, XYZ) share the [`traits::MolecularFile`]
//! interface. The remaining modules cover the box-spec list, the campaign
//! inputs, GROMACS-style topology text and tabular run logs.

pub mod bgf;
pub mod boxspec;
pub mod gro;
pub mod inputs;
pub mod runlog;
pub mod topfile;
pub mod traits;
pub mod xyz;
