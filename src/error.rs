//! 引擎错误类型
//!
//! 几何退化（共线、重复点、近零行列式）在引擎内部通过容差吸收，不会报错。
//! 这里只覆盖调用方误用的情况。

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("Index {index} out of range for point cloud of {len} points")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Invalid parameter `{name}`: {value} (must be finite and > 0)")]
    InvalidParameter { name: &'static str, value: f64 },
}

pub type EngineResult<T> = Result<T, EngineError>;
