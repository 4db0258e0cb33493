pub mod config;
pub mod edit;
pub mod extract;
pub mod normalize;
pub mod ocr;
mod output;
pub mod phone;
pub mod show;
