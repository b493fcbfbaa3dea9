use std::path::Path;

use infer::Infer;

const UNKNOWN: &str = "application/octet-stream";

/// MIME type as a file picker reports it: the extension wins, content sniffing
/// covers files without a recognised extension.
pub fn detect(path: &Path, bytes: &[u8]) -> String {
    if let Some(guess) = mime_guess::from_path(path).first() {
        return guess.essence_str().to_string();
    }

    let infer = Infer::new();
    match infer.get(bytes) {
        Some(kind) => kind.mime_type().to_string(),
        None => UNKNOWN.to_string(),
    }
}
