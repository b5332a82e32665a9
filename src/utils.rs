use std::fs::File;
use std::io;
use std::path::Path;

use crate::error::{EegError, Result};

/// Opens an existing file for reading, mapping a missing file to `NotFound`
pub fn open_existing(path: &Path) -> Result<File> {
    File::open(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => EegError::NotFound(format!("{}: {}", path.display(), e)),
        _ => EegError::Io(e),
    })
}

/// 检查字符串是否为有效的整数
pub fn is_integer_number(s: &str) -> bool {
    let s = s.trim();
    if s.is_empty() {
        return false;
    }

    let digits = s.strip_prefix(&['+', '-'][..]).unwrap_or(s);
    !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit())
}

/// Parses a non-negative integer cell of a metadata table
///
/// Accepts plain integers and integral floats (`"3.0"`), which is how
/// integer columns come back from tools that promote them to float.
pub fn parse_index(field: &str, s: &str) -> Result<u64> {
    let s = s.trim();

    if is_integer_number(s) {
        return s
            .strip_prefix('+')
            .unwrap_or(s)
            .parse::<u64>()
            .map_err(|_| EegError::InvalidFormat(format!("{}: '{}' is not a non-negative integer", field, s)));
    }

    // 处理 "3.0" 这类整数值的浮点表示
    match s.parse::<f64>() {
        // u64::MAX as f64 就是 2^64，已经超出范围
        Ok(v) if v.fract() == 0.0 && v >= 0.0 && v < u64::MAX as f64 => Ok(v as u64),
        _ => Err(EegError::InvalidFormat(format!(
            "{}: '{}' is not a non-negative integer",
            field, s
        ))),
    }
}

/// Parses one sample cell of a recording
///
/// Empty cells read as NaN, anything else that is not a number is an error
/// carrying the row and column it came from.
pub fn parse_sample(s: &str, row: usize, column: &str) -> Result<f64> {
    let s = s.trim();
    if s.is_empty() {
        return Ok(f64::NAN);
    }

    s.parse::<f64>().map_err(|_| {
        EegError::InvalidFormat(format!(
            "Row {}, column '{}': '{}' is not a number",
            row, column, s
        ))
    })
}
