use core::fmt::Write;

use embassy_net::tcp::{Error as TcpError, TcpSocket};

fn reason_phrase(code: u16) -> &'static str {
    match code {
        200 => "OK",
        302 => "Found",
        400 => "Bad Request",
        404 => "Not Found",
        405 => "Method Not Allowed",
        500 => "Internal Server Error",
        _ => "Unknown",
    }
}

/// HTTP Content Type.
#[derive(Debug)]
pub enum ContentType {
    TextHtml,
    TextPlain,
}

impl ContentType {
    fn as_str(&self) -> &'static str {
        match self {
            ContentType::TextHtml => "text/html",
            ContentType::TextPlain => "text/plain",
        }
    }
}

/// Text Encoding.
#[derive(Debug)]
pub enum TextEncoding {
    Utf8,
}

impl TextEncoding {
    fn as_str(&self) -> &'static str {
        match self {
            TextEncoding::Utf8 => "utf-8",
        }
    }
}

/// Cache policy advertised to the client. The setup page must always be
/// re-fetched so it reflects the currently stored text.
#[derive(Debug)]
pub enum CachePolicy {
    NoStore,
}

impl CachePolicy {
    fn as_str(&self) -> &'static str {
        match self {
            CachePolicy::NoStore => "no-cache, no-store, must-revalidate",
        }
    }
}

/// HTTP socket connection policy.
#[derive(Debug)]
pub enum ConnectionPolicy {
    Close,
}

impl ConnectionPolicy {
    fn as_str(&self) -> &'static str {
        match self {
            ConnectionPolicy::Close => "close",
        }
    }
}

pub trait BufferedWriter {
    fn write_to(&self, writer: &mut impl Write) -> Result<(), core::fmt::Error>;
}

/// HTTP Content Headers.
pub struct ContentHeaders {
    content_type: ContentType,
    content_length: Option<usize>,
    text_encoding: Option<TextEncoding>,
}

impl ContentHeaders {
    pub const fn new(content_type: ContentType) -> Self {
        Self {
            content_type,
            content_length: None,
            text_encoding: None,
        }
    }

    #[must_use]
    pub const fn with_length(mut self, content_length: usize) -> Self {
        self.content_length = Some(content_length);
        self
    }

    #[must_use]
    pub const fn with_text_encoding(mut self, text_encoding: TextEncoding) -> Self {
        self.text_encoding = Some(text_encoding);
        self
    }
}

impl BufferedWriter for ContentHeaders {
    fn write_to(&self, writer: &mut impl Write) -> Result<(), core::fmt::Error> {
        write!(writer, "Content-Type: {}", self.content_type.as_str())?;
        if let Some(text_encoding) = &self.text_encoding {
            write!(writer, "; charset={}", text_encoding.as_str())?;
        }
        write!(writer, "\r\n")?;
        if let Some(content_length) = self.content_length {
            write!(writer, "Content-Length: {}\r\n", content_length)?;
        }
        Ok(())
    }
}

/// Response Headers.
pub struct ResponseHeaders {
    status: u16,
    connection: ConnectionPolicy,
    cache: Option<CachePolicy>,
    location: Option<&'static str>,
    content: Option<ContentHeaders>,
}

impl ResponseHeaders {
    pub const fn from_code(code: u16) -> Self {
        Self {
            status: code,
            connection: ConnectionPolicy::Close,
            cache: None,
            location: None,
            content: None,
        }
    }

    pub const fn success() -> Self {
        Self::from_code(200)
    }

    pub const fn not_found() -> Self {
        Self::from_code(404)
    }

    pub const fn bad_request() -> Self {
        Self::from_code(400)
    }

    /// A `302 Found` redirect to a fixed target.
    pub const fn redirect(location: &'static str) -> Self {
        let mut headers = Self::from_code(302);
        headers.location = Some(location);
        headers
    }

    #[must_use]
    pub const fn with_content(mut self, content: ContentHeaders) -> Self {
        self.content = Some(content);
        self
    }

    #[must_use]
    pub const fn with_cache(mut self, cache: CachePolicy) -> Self {
        self.cache = Some(cache);
        self
    }
}

impl BufferedWriter for ResponseHeaders {
    fn write_to(&self, writer: &mut impl Write) -> Result<(), core::fmt::Error> {
        write!(writer, "HTTP/1.1 {} {}\r\n", self.status, reason_phrase(self.status))?;
        if let Some(location) = self.location {
            write!(writer, "Location: {}\r\n", location)?;
        }
        if let Some(cache) = &self.cache {
            write!(writer, "Cache-Control: {}\r\n", cache.as_str())?;
        }
        if let Some(content) = &self.content {
            content.write_to(writer)?;
        }
        write!(writer, "Connection: {}\r\n", self.connection.as_str())?;
        write!(writer, "\r\n")?;
        Ok(())
    }
}

#[derive(Debug, Copy, Clone)]
pub enum HttpMethod {
    Get,
    Post,
    Head,
}

impl HttpMethod {
    pub(crate) fn parse(s: &str) -> Option<Self> {
        Some(match s {
            "GET" => HttpMethod::Get,
            "POST" => HttpMethod::Post,
            "HEAD" => HttpMethod::Head,
            _ => return None,
        })
    }
}

/// Parse the request line from the header string.
///
/// Returns the method, path, and rest of the header string.
pub(super) fn parse_request_line(header_str: &str) -> Option<(HttpMethod, &str, &str)> {
    let line_end = header_str.find("\r\n").unwrap_or(header_str.len());
    let first_line = &header_str[..line_end];
    let mut parts = first_line.split_whitespace();
    let method = parts.next().and_then(HttpMethod::parse)?;
    let path = parts.next()?;

    let rest = header_str.get(line_end + 2..).unwrap_or("");
    Some((method, path, rest))
}

/// Read the start line and headers from the socket.
///
/// Returns the position of the end of the headers and the total number of
/// bytes read (body bytes may trail the header terminator).
pub(super) async fn read_heading(
    buf: &mut [u8],
    socket: &mut TcpSocket<'_>,
) -> Result<(usize, usize), TcpError> {
    let mut read = 0;
    let mut header_end = None;
    loop {
        let n = socket.read(&mut buf[read..]).await?;
        if n == 0 {
            return Ok((0, 0));
        }
        read += n;
        if let Some(pos) = buf[..read].windows(4).position(|w| w == b"\r\n\r\n") {
            header_end = Some(pos + 4);
            break;
        }
        if read >= buf.len() {
            break;
        }
    }

    Ok((header_end.unwrap_or(read), read))
}

/// Find the content length in the header string.
pub(super) fn find_content_length(header: &str) -> Option<u32> {
    const TARGET: &str = "content-length:";
    for line in header.lines() {
        if line.len() >= TARGET.len() && line[..TARGET.len()].eq_ignore_ascii_case(TARGET) {
            let length = line[TARGET.len()..].trim().parse::<u64>().ok()?;
            if length > u64::from(u32::MAX) {
                return None;
            }
            return Some(length as u32);
        }
    }
    None
}
