pub mod constants;
pub mod url_utils;

pub use url_utils::directory_of;
