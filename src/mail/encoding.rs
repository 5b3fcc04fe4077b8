//! Header and body encodings for non-ASCII mail content
//! (RFC 2047 encoded words and RFC 2045 quoted-printable).

use std::fmt::Write;

/// Charset every outgoing message is declared and encoded with.
pub const CHARSET: &str = "utf-8";

// RFC 2047 caps an encoded word at 75 characters.
const ENCODED_WORD_MAX: usize = 75;
const ENCODED_WORD_OVERHEAD: usize = "=?utf-8?q??=".len();

// RFC 2045 caps a quoted-printable line at 76 characters.
const QP_LINE_MAX: usize = 76;

const HEADER_SAFE: &[u8] = b"!*+-/";
const ADDRESS_SPECIALS: &[char] = &['(', ')', '<', '>', '[', ']', ':', ';', '@', '\\', ',', '.', '"'];

/// Encodes `text` as one or more `Q` encoded words. Words are
/// separated by folding whitespace and never split a character.
#[must_use]
pub fn encode_word(text: &str) -> String {
    let budget = ENCODED_WORD_MAX - ENCODED_WORD_OVERHEAD;

    let mut words = Vec::new();
    let mut current = String::new();
    let mut piece = String::new();
    let mut buf = [0u8; 4];

    for ch in text.chars() {
        piece.clear();
        if ch == ' ' {
            piece.push('_');
        } else if ch.is_ascii_alphanumeric() || (ch.is_ascii() && HEADER_SAFE.contains(&(ch as u8))) {
            piece.push(ch);
        } else {
            for byte in ch.encode_utf8(&mut buf).bytes() {
                write_hex(&mut piece, byte);
            }
        }

        if !current.is_empty() && current.len() + piece.len() > budget {
            words.push(std::mem::take(&mut current));
        }
        current.push_str(&piece);
    }
    words.push(current);

    words
        .iter()
        .map(|word| format!("=?{CHARSET}?q?{word}?="))
        .collect::<Vec<_>>()
        .join("\r\n ")
}

/// Formats an address header value. Display names holding non-ASCII
/// or control characters are emitted as encoded words, other names
/// are quoted only when they hold address specials.
#[must_use]
pub fn format_address(name: &str, address: &str) -> String {
    let name = name.trim();
    if name.is_empty() {
        address.to_string()
    } else if !name.is_ascii() || name.chars().any(char::is_control) {
        format!("{} <{address}>", encode_word(name))
    } else if name.contains(ADDRESS_SPECIALS) {
        let escaped = name.replace('\\', "\\\\").replace('"', "\\\"");
        format!("\"{escaped}\" <{address}>")
    } else {
        format!("{name} <{address}>")
    }
}

/// Quoted-printable encodes `text` using CRLF line endings and
/// soft line breaks to keep every line within 76 characters.
#[must_use]
pub fn quoted_printable(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + text.len() / 8);
    for (i, line) in text.split('\n').enumerate() {
        if i > 0 {
            out.push_str("\r\n");
        }
        encode_line(line.strip_suffix('\r').unwrap_or(line), &mut out);
    }
    out
}

fn encode_line(line: &str, out: &mut String) {
    let bytes = line.as_bytes();
    let mut column = 0;
    for (i, &byte) in bytes.iter().enumerate() {
        let last = i + 1 == bytes.len();
        let literal = match byte {
            // trailing whitespace would be stripped in transit
            b' ' | b'\t' => !last,
            b'=' => false,
            33..=126 => true,
            _ => false,
        };
        let width = if literal { 1 } else { 3 };

        // leave room for the soft break marker unless this is the
        // final token of the line
        let limit = if last { QP_LINE_MAX } else { QP_LINE_MAX - 1 };
        if column + width > limit {
            out.push_str("=\r\n");
            column = 0;
        }

        if literal {
            out.push(char::from(byte));
        } else {
            write_hex(out, byte);
        }
        column += width;
    }
}

fn write_hex(out: &mut String, byte: u8) {
    // writing into a String cannot fail
    write!(out, "={byte:02X}").ok();
}
