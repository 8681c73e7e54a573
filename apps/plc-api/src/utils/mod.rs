//! handlers 共享的响应与验证辅助。

pub mod response;
pub mod validation;

pub use validation::{
    nonzero_u16, nonzero_u8, normalize_optional, normalize_required, parse_optional_date_ms,
};
