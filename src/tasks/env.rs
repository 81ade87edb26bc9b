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

use crate::FailResult;
use std::env;

fn var(key: &str) -> FailResult<Option<String>>
{ match env::var(key) {
    Ok(s) => Ok(Some(s)),
    Err(env::VarError::NotPresent) => Ok(None),
    Err(env::VarError::NotUnicode(s)) => bail!("env var not unicode: {}={:?}", key, s),
}}

fn nonempty_var(key: &str) -> FailResult<Option<String>>
{ match var(key) {
    Ok(Some(ref s)) if s == "" => Ok(None),
    r => r,
}}

/// Show module names in log output.
pub fn log_mod() -> FailResult<bool> {
    match nonempty_var("PHMODES_LOG_MOD")?.as_deref() {
        None | Some("0") => Ok(false),
        Some("1") => Ok(true),
        Some(s) => bail!("Invalid setting for PHMODES_LOG_MOD: {:?}", s),
    }
}

/// Show backtraces of errors.
pub fn backtrace() -> bool
{ env::var_os("RUST_BACKTRACE").map_or(false, |s| s == "1") }
