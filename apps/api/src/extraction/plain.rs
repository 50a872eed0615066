/// Decodes plain-text bytes: UTF-8 first, then Latin-1.
///
/// Latin-1 maps every byte to the code point of the same value, so this never fails.
pub fn decode(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(text) => text.strip_prefix('\u{feff}').unwrap_or(text).to_string(),
        Err(e) => {
            tracing::debug!("Not valid UTF-8 ({e}), decoding as Latin-1");
            bytes.iter().map(|&b| char::from(b)).collect()
        }
    }
}
