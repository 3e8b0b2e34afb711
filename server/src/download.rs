use lan_share::StoredFile;
use rocket::http::ContentType;
use rocket::request::Request;
use rocket::response::{self, Responder, Response};
use tokio::fs::File;

/// A stored file streamed back with its original name and type.
pub struct FileDownload {
    body: File,
    name: String,
    mime: String,
    size: u64,
}

impl FileDownload {
    pub fn new(body: File, stored: &StoredFile) -> Self {
        Self {
            body,
            name: stored.name.clone(),
            mime: stored.mime.clone(),
            size: stored.size,
        }
    }
}

impl<'r> Responder<'r, 'static> for FileDownload {
    fn respond_to(self, _: &'r Request<'_>) -> response::Result<'static> {
        let content_type = ContentType::parse_flexible(&self.mime).unwrap_or(ContentType::Binary);

        Response::build()
            .header(content_type)
            .raw_header("Content-Disposition", content_disposition(&self.name))
            .sized_body(usize::try_from(self.size).ok(), self.body)
            .ok()
    }
}

/// `attachment` disposition with an ASCII fallback name and the exact name
/// as RFC 5987 `filename*`.
pub fn content_disposition(name: &str) -> String {
    let fallback: String = name
        .chars()
        .map(|c| match c {
            '"' | '\\' => '_',
            c if c.is_ascii_graphic() || c == ' ' => c,
            _ => '_',
        })
        .collect();

    format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        fallback,
        percent_encode(name)
    )
}

fn percent_encode(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{:02X}", byte)),
        }
    }
    out
}
