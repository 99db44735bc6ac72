mod http;
pub(crate) mod types;

pub(crate) use http::synchronize;
