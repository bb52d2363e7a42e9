use embassy_net::tcp::TcpSocket;
use embedded_io_async::Write as _;
use heapless::{String, Vec};

use super::headers::{
    BufferedWriter as _, HttpMethod, ResponseHeaders, find_content_length, parse_request_line,
    read_heading,
};
use super::{HttpError, HttpResult};

const HEADER_BUFFER_SIZE: usize = 512;
const BODY_BUFFER_SIZE: usize = 512;
const BODY_RX_CHUNK_SIZE: usize = 128;
const STREAM_CHUNK_SIZE: usize = 512;

/// One accepted request: parsed request line, buffered headers and the
/// socket for the rest of the exchange.
pub struct HttpConnection<'a> {
    pub method: HttpMethod,
    pub path: String<64>,

    socket: TcpSocket<'a>,
    content_length: u32,
    header_end: usize,
    header_buf: Vec<u8, HEADER_BUFFER_SIZE>,
    body_buf: Vec<u8, BODY_BUFFER_SIZE>,
}

impl<'a> HttpConnection<'a> {
    /// Read and parse the request heading from a freshly accepted socket.
    pub(crate) async fn from_socket(mut socket: TcpSocket<'a>) -> Result<Self, HttpError> {
        let mut header_buf = Vec::<u8, HEADER_BUFFER_SIZE>::new();
        header_buf.resize_default(header_buf.capacity()).ok();
        let (header_end, read) = read_heading(header_buf.as_mut_slice(), &mut socket).await?;
        header_buf.truncate(read);

        // Parse only up to the header terminator; body bytes may trail it.
        let headers_only = &header_buf.as_slice()[..header_end];
        let header_str = core::str::from_utf8(headers_only).map_err(|_| HttpError::Parse)?;
        let (method, raw_path, rest_headers) =
            parse_request_line(header_str).ok_or(HttpError::Parse)?;
        let content_length = find_content_length(rest_headers).unwrap_or(0);

        let mut path = String::new();
        let _ = path.push_str(raw_path);
        Ok(Self {
            method,
            path,
            socket,
            header_buf,
            body_buf: Vec::new(),
            content_length,
            header_end,
        })
    }

    /// Request method and path.
    pub(crate) fn route(&self) -> (HttpMethod, &'_ str) {
        (self.method, self.path.as_str())
    }

    /// Write the response headers.
    pub(crate) async fn write_headers(&mut self, headers: &ResponseHeaders) -> HttpResult {
        let mut buf = String::<HEADER_BUFFER_SIZE>::new();
        headers.write_to(&mut buf)?;
        self.socket.write_all(buf.as_bytes()).await?;
        self.socket.flush().await?;
        Ok(())
    }

    /// Write the response body.
    pub(crate) async fn write_body(&mut self, body: &[u8]) -> HttpResult {
        for chunk in body.chunks(STREAM_CHUNK_SIZE) {
            self.socket.write_all(chunk).await?;
        }
        self.socket.flush().await?;
        Ok(())
    }

    /// Flush and close the connection cleanly.
    pub(crate) async fn finish(&mut self) -> HttpResult {
        self.socket.flush().await?;
        self.socket.close();
        Ok(())
    }

    /// Read the request body, up to the advertised content length.
    ///
    /// Bytes that arrived with the heading are included. A body longer than
    /// the buffer is truncated; for the portal's one small form that only
    /// means an oversized submission loses its tail before normalization.
    pub(crate) async fn read_body(&mut self) -> Result<&[u8], HttpError> {
        if self.content_length == 0 {
            return Err(HttpError::NoData);
        }

        self.body_buf.clear();
        if self.header_buf.len() > self.header_end {
            let trailer = &self.header_buf.as_slice()[self.header_end..];
            let take = trailer.len().min(self.body_buf.capacity());
            self.body_buf.extend_from_slice(&trailer[..take]).ok();
        }

        let wanted = (self.content_length as usize).min(self.body_buf.capacity());
        while self.body_buf.len() < wanted {
            let mut chunk = [0u8; BODY_RX_CHUNK_SIZE];
            let n = self.socket.read(&mut chunk).await?;
            if n == 0 {
                break;
            }
            let room = self.body_buf.capacity() - self.body_buf.len();
            let take = n.min(room);
            self.body_buf.extend_from_slice(&chunk[..take]).ok();
        }

        Ok(self.body_buf.as_slice())
    }
}
