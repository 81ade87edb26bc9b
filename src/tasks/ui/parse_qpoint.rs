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
use phmodes_array_types::V3;

/// Parse three whitespace-separated floats or rationals, like `"1/3 1/3 0"`.
pub fn parse_qpoint(s: &str) -> FailResult<V3> {
    let words: Vec<_> = s.split_ascii_whitespace().collect();
    if words.len() != 3 {
        bail!("Expected 3 whitespace-separated floats or rationals in a qpoint, got {:?}", s);
    }

    let mut out = V3::zero();
    for (k, word) in words.into_iter().enumerate() {
        out[k] = parse_component(word)?;
    }
    Ok(out)
}

fn parse_component(word: &str) -> FailResult<f64> {
    if word.contains('/') {
        let mut iter = word.split('/');
        let mut next_int = || -> FailResult<i32> {
            let part = iter.next().unwrap_or("");
            part.parse().map_err(|_| format_err!("{:?} is not a valid rational number", word))
        };
        let numer = next_int()?;
        let denom = next_int()?;
        if iter.next().is_some() {
            bail!("a rational cannot have multiple '/'!")
        }
        if denom == 0 {
            bail!("zero denominator in {:?}", word);
        }
        Ok(numer as f64 / denom as f64)
    } else {
        word.parse::<f64>().map_err(|_| {
            // make sure error mentions possibility of using rationals
            format_err!("{:?} is not a valid floating point or rational number", word)
        })
    }
}

/// One qpoint per line; `#` starts a comment.
pub fn parse_qpoint_file(s: &str) -> FailResult<Vec<V3>> {
    s.lines()
        .map(|s| {
            let end = s.find('#').unwrap_or(s.len());
            s[..end].trim()
        })
        .filter(|s| !s.is_empty())
        .map(parse_qpoint)
        .collect()
}

#[cfg(test)]
#[deny(unused)]
mod tests {
    use super::*;

    #[test]
    fn rationals() {
        assert_eq!(parse_qpoint("1/2 0 -1/4").unwrap(), V3([0.5, 0.0, -0.25]));
        assert_eq!(parse_qpoint("  0.5\t1e-1 2 ").unwrap(), V3([0.5, 0.1, 2.0]));
    }

    #[test]
    fn bad() {
        assert!(parse_qpoint("1/2 0").is_err());
        assert!(parse_qpoint("1/2/3 0 0").is_err());
        assert!(parse_qpoint("1/0 0 0").is_err());
        assert!(parse_qpoint("x 0 0").is_err());
    }

    #[test]
    fn file() {
        let text = "# header\n0 0 0\n\n1/2 0 0  # M\n";
        assert_eq!(parse_qpoint_file(text).unwrap(), vec![V3::zero(), V3([0.5, 0.0, 0.0])]);
    }
}
