//! Show directory naming.
//!
//! Show names are arbitrary Unicode; directory names are a reversible
//! percent-encoding so every distinct name maps to a distinct
//! directory. The literal set matches what browsers leave untouched:
//! `[A-Za-z0-9-_.~]` plus `!'()*`. Everything else is `%XX` per UTF-8
//! byte, uppercase hex.

/// byte survives encoding unchanged
fn is_literal(b: u8) -> bool {
    b.is_ascii_alphanumeric()
        || matches!(b, b'-' | b'_' | b'.' | b'~' | b'!' | b'\'' | b'(' | b')' | b'*')
}

/// Show name to on-disk directory name
#[must_use]
pub fn encode_show_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for b in name.bytes() {
        if is_literal(b) {
            out.push(b as char);
        } else {
            out.push_str(&format!("%{b:02X}"));
        }
    }
    out
}

/// Directory name back to show name. Stray `%` runs that are not a
/// valid escape pass through literally; names this system wrote always
/// round-trip.
#[must_use]
pub fn decode_show_name(dir: &str) -> String {
    let bytes = dir.as_bytes();
    let mut out: Vec<u8> = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        let hex_pair = (bytes[i] == b'%')
            .then(|| bytes.get(i + 1).zip(bytes.get(i + 2)))
            .flatten()
            .filter(|(hi, lo)| hi.is_ascii_hexdigit() && lo.is_ascii_hexdigit())
            .and_then(|(hi, lo)| {
                let pair = [*hi, *lo];
                let s = std::str::from_utf8(&pair).ok()?;
                u8::from_str_radix(s, 16).ok()
            });

        match hex_pair {
            Some(byte) => {
                out.push(byte);
                i += 3;
            },
            None => {
                out.push(bytes[i]);
                i += 1;
            },
        }
    }

    String::from_utf8_lossy(&out).into_owned()
}

#[cfg(test)]
mod encode_test {
    use super::{decode_show_name, encode_show_name};

    #[test]
    fn spaces_and_unicode() {
        assert_eq!(encode_show_name("My Show"), "My%20Show");
        assert_eq!(encode_show_name("Noël!"), "No%C3%ABl!");
        assert_eq!(decode_show_name("No%C3%ABl!"), "Noël!");
    }

    #[test]
    fn stray_percent_passes_through() {
        assert_eq!(decode_show_name("50%"), "50%");
        assert_eq!(decode_show_name("%zz"), "%zz");
    }
}
