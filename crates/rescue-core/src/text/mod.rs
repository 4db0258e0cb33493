//! Text normalization and phone formatting.

mod normalize;
pub mod patterns;
mod phone;

pub use normalize::{append_staged, normalize_text};
pub use phone::{format_phone, split_phones};
