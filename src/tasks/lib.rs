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

//! The glue between the phmodes library crates and the command line.

#[macro_use] extern crate log;
#[macro_use] extern crate serde;
#[macro_use] extern crate failure;

pub type FailResult<T> = Result<T, failure::Error>;

pub mod cereal;
pub mod cmd;
pub mod entry_points;
mod env;
pub mod ui;

pub use phmodes_tasks_config as config;
