use mime_guess::mime;
use std::path::Path;

/// Maps a file's extension to the Content-Type string served with it.
///
/// Unknown extensions fall back to `application/octet-stream`. HTML gets an
/// explicit charset since the served pages are UTF-8.
pub fn content_type_for(path: &Path) -> String {
    let guess = mime_guess::from_path(path).first_or_octet_stream();

    if guess.type_() == mime::TEXT && guess.subtype() == mime::HTML {
        "text/html; charset=utf-8".to_string()
    } else {
        guess.essence_str().to_string()
    }
}
