pub mod http;
pub mod response;
