/* ************************************************************************ **
** This file is part of phmodes, and is licensed under EITHER the MIT       **
** license or the Apache 2.0 license, at your option.                       **
**                                                                          **
**     http://www.apache.org/licenses/LICENSE-2.0                           **
**     http://opensource.org/licenses/MIT                                   **
**                                                                          **
** Be aware that not all of phmodes is provided under this permissive       **
** license, and that the project as a whole is licensed under the GPL 3.0.  **
** ************************************************************************ */

//! Thermal ensembles of frozen phonons in crystal supercells.
//!
//! The work is split over the workspace crates, re-exported here:
//!
//! * [`ddb`]: force constants by qpoint.
//! * [`dynmat`]: dynamical matrices and their eigenmodes.
//! * [`dispdb`]: the table of modes over all qpoints.
//! * [`structure`] and [`frozen`]: supercells, displacements, and projection onto modes.
//! * [`thermal`]: generating and decomposing trajectories.
//! * [`tasks`]: config, logging, and file formats of the binaries.

pub use phmodes_array_types as array_types;
pub use phmodes_structure as structure;
pub use phmodes_linalg as linalg;
pub use phmodes_ddb as ddb;
pub use phmodes_dynmat as dynmat;
pub use phmodes_dispdb as dispdb;
pub use phmodes_frozen as frozen;
pub use phmodes_thermal as thermal;
pub use phmodes_tasks as tasks;
