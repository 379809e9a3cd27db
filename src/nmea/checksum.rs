//! NMEA 0183 checksum validation
//!
//! The checksum is the XOR of every byte between the start delimiter (`$` or `!`)
//! and the `*` that precedes two hex digits.

/// XOR of all bytes in `payload`.
pub fn compute(payload: &str) -> u8 {
    payload.bytes().fold(0u8, |acc, b| acc ^ b)
}

/// Check a complete sentence (without line terminator) against its checksum.
///
/// Returns `false` rather than failing for every malformed shape: no start
/// delimiter, no `*`, fewer or more than two digits, non-hex digits.
pub fn is_valid(sentence: &str) -> bool {
    let Some(body) = sentence.strip_prefix(['$', '!']) else {
        return false;
    };
    let Some((payload, digits)) = body.split_once('*') else {
        return false;
    };

    match parse_hex_pair(digits.trim_end()) {
        Some(expected) => compute(payload) == expected,
        None => false,
    }
}

/// Render `$<body>*HH` with an uppercase checksum.
pub fn append(body: &str) -> String {
    format!("${}*{:02X}", body, compute(body))
}

fn parse_hex_pair(digits: &str) -> Option<u8> {
    let bytes = digits.as_bytes();
    if bytes.len() != 2 || !bytes.iter().all(u8::is_ascii_hexdigit) {
        return None;
    }
    u8::from_str_radix(digits, 16).ok()
}
