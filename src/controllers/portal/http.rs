use heapless::String;
use morse_core::{MESSAGE_MAX_LEN, encode, normalize, render_pattern};

use super::{page, publish_message, save_message, with_portal_view};
use crate::core::net::http::{
    CachePolicy,
    ContentHeaders,
    ContentType,
    HttpConnection,
    HttpError,
    HttpHandler,
    HttpMethod,
    HttpResult,
    ResponseHeaders,
    TextEncoding,
    form::form_field,
};

/// Decoder slack for the raw form value; escapes and junk may triple the
/// byte count before normalization truncates to the stored bound.
const RAW_FIELD_SIZE: usize = MESSAGE_MAX_LEN * 4;

#[derive(Debug, Default)]
pub struct PortalHttpController;

impl HttpHandler for PortalHttpController {
    async fn handle_request(&self, conn: HttpConnection<'_>) -> HttpResult {
        let mut conn = conn;
        match conn.route() {
            (HttpMethod::Get | HttpMethod::Head, "/") => handle_get_page(&mut conn).await,
            (HttpMethod::Post, "/setup") => handle_setup(&mut conn).await,
            // Captive-portal probes and everything else land on the page.
            _ => redirect_home(&mut conn).await,
        }
    }
}

async fn handle_get_page(conn: &mut HttpConnection<'_>) -> HttpResult {
    let Some(rendered) = with_portal_view(page::render_page) else {
        return serve_unavailable(conn).await;
    };
    let body = rendered?;

    let content = ContentHeaders::new(ContentType::TextHtml)
        .with_text_encoding(TextEncoding::Utf8)
        .with_length(body.len());
    let headers = ResponseHeaders::success()
        .with_cache(CachePolicy::NoStore)
        .with_content(content);
    conn.write_headers(&headers).await?;
    if !matches!(conn.method, HttpMethod::Head) {
        conn.write_body(body.as_bytes()).await?;
    }
    conn.finish().await
}

async fn handle_setup(conn: &mut HttpConnection<'_>) -> HttpResult {
    let submitted: Option<String<RAW_FIELD_SIZE>> = match conn.read_body().await {
        Ok(body) => form_field(body, "text"),
        // A submission without a body or field just falls through to the
        // redirect, like any other unusable input.
        Err(HttpError::NoData) => None,
        Err(e) => return Err(e),
    };

    if let Some(raw) = submitted {
        let text = normalize(raw.as_str());
        if let Err(e) = save_message(text.as_str()).await {
            log::error!("portal: persisting message failed: {:?}", e);
        }
        let sequence = encode(text.as_str());
        let pattern = render_pattern(&sequence);
        log::info!("portal: text changed to '{}' [{}]", text.as_str(), pattern.as_str());
        publish_message(text, sequence, pattern);
    }

    redirect_home(conn).await
}

async fn redirect_home(conn: &mut HttpConnection<'_>) -> HttpResult {
    let headers = ResponseHeaders::redirect("/").with_cache(CachePolicy::NoStore);
    conn.write_headers(&headers).await?;
    conn.finish().await
}

async fn serve_unavailable(conn: &mut HttpConnection<'_>) -> HttpResult {
    conn.write_headers(&ResponseHeaders::from_code(500)).await?;
    conn.finish().await
}
