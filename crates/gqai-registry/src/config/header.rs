/// Convert a header name to canonical MIME casing, e.g. `x-api-key` becomes `X-Api-Key`.
///
/// Names containing bytes outside the HTTP token set are returned unchanged.
pub fn canonical_header_name(name: &str) -> String {
    if !name.bytes().all(is_token_byte) {
        return name.to_string();
    }

    let mut upper = true;
    name.chars()
        .map(|c| {
            let canonical = if upper {
                c.to_ascii_uppercase()
            } else {
                c.to_ascii_lowercase()
            };
            upper = c == '-';
            canonical
        })
        .collect()
}

fn is_token_byte(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || b"!#$%&'*+-.^_`|~".contains(&byte)
}
