pub mod connection;
pub mod form;
pub mod headers;
pub mod server;

pub use connection::HttpConnection;
pub use headers::{
    CachePolicy, ContentHeaders, ContentType, HttpMethod, ResponseHeaders, TextEncoding,
};
pub use server::{HttpHandler, HttpServer};

#[derive(Debug)]
pub enum HttpError {
    Closed,
    Parse,
    NoData,
    Format,
}

impl From<core::fmt::Error> for HttpError {
    fn from(_error: core::fmt::Error) -> Self {
        HttpError::Format
    }
}

impl From<embassy_net::tcp::Error> for HttpError {
    fn from(err: embassy_net::tcp::Error) -> Self {
        match err {
            embassy_net::tcp::Error::ConnectionReset => HttpError::Closed,
        }
    }
}

pub type HttpResult = Result<(), HttpError>;
