use embassy_net::{Stack, tcp::TcpSocket};
use embassy_time::Duration;

use super::HttpResult;
use super::connection::HttpConnection;

const SOCKET_TIMEOUT: Duration = Duration::from_secs(10);

/// Route handler for the portal's HTTP surface.
#[allow(async_fn_in_trait)]
pub trait HttpHandler {
    async fn handle_request(&self, conn: HttpConnection<'_>) -> HttpResult;
}

/// Accept loop serving one connection at a time.
///
/// Single-connection service is deliberate: the server shares its execution
/// context with blink timing, and every await inside a request is a yield
/// point for the scheduler.
pub struct HttpServer<'a, H: HttpHandler> {
    handler: &'a H,
}

impl<'a, H: HttpHandler> HttpServer<'a, H> {
    pub fn new(handler: &'a H) -> Self {
        Self { handler }
    }

    /// Serve forever. All errors are per-connection: logged and dropped.
    pub async fn listen_and_serve(
        &self,
        stack: Stack<'static>,
        port: u16,
        rx_buffer: &mut [u8],
        tx_buffer: &mut [u8],
    ) {
        loop {
            let mut socket = TcpSocket::new(stack, rx_buffer, tx_buffer);
            socket.set_timeout(Some(SOCKET_TIMEOUT));

            if socket.accept(port).await.is_err() {
                continue;
            }

            match HttpConnection::from_socket(socket).await {
                Ok(conn) => {
                    if let Err(e) = self.handler.handle_request(conn).await {
                        log::warn!("http: request failed: {:?}", e);
                    }
                }
                Err(e) => log::warn!("http: bad request heading: {:?}", e),
            }
        }
    }
}
