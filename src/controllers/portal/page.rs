//! Setup page markup, rendered server-side into a fixed buffer.
//!
//! The displayed text is already normalized to A-Z/0-9/space, so it can be
//! interpolated into the markup without escaping.

use core::fmt::{self, Write};

use heapless::String;

use super::PortalView;
use crate::config::BUILD_VERSION;

const PAGE_BUFFER_SIZE: usize = 2048;

pub(crate) type PageBuffer = String<PAGE_BUFFER_SIZE>;

const PAGE_HEAD: &str = "<!DOCTYPE html>\
<html>\
<head>\
<meta name='viewport' content='width=device-width, initial-scale=1'>\
<title>Morse Blinker</title>\
<style>\
* { box-sizing: border-box; }\
html { font-family: Consolas, monospace; font-size: 20px; background-color: #ccc; color: #000; }\
h1 { text-align: center; color: #c00; font-weight: normal; font-size: 40px; }\
textarea { font-family: Consolas, monospace; font-size: 20px; width: 100%; height: 3em; background-color: #fff; }\
input[type=submit] { font-family: Consolas, monospace; font-size: 20px; width: 100%; padding: 1ex; background-color: #c00; color: #fff; }\
footer { font-size: 12px; text-align: center; margin-top: 2ex; color: #666; }\
</style>\
</head>\
<body>";

const PAGE_TAIL: &str = "<footer>Configured over the setup access point</footer>\
</body>\
</html>";

pub(crate) fn render_page(view: &PortalView) -> Result<PageBuffer, fmt::Error> {
    let mut out = PageBuffer::new();
    write!(out, "{}", PAGE_HEAD)?;
    write!(out, "<h1>Morse Blinker<br/>{}</h1>", BUILD_VERSION)?;
    write!(
        out,
        "<p>Enter text to blink in Morse code:</p>\
         <form action='/setup' method='post'>\
         <textarea name='text'>{}</textarea>\
         <p><input type='submit' value='Submit'></p>\
         </form>",
        view.text
    )?;
    write!(out, "<p>Morse code:</p><p>{}</p>", view.pattern)?;
    write!(out, "{}", PAGE_TAIL)?;
    Ok(out)
}
