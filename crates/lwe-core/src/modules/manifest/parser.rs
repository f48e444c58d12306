/// Numeric tokens of a manifest line, in the order they appear.
///
/// A token is an optional sign, an optional leading point, at least one digit,
/// optional `,ddd` thousands groups, an optional point with trailing digits,
/// and an optional exponent. Thousands separators are dropped before
/// conversion.
pub(super) fn numeric_tokens(line: &str) -> Vec<f64> {
    let bytes = line.as_bytes();
    let mut tokens = Vec::new();
    let mut position = 0;

    while position < bytes.len() {
        match match_token(bytes, position) {
            Some(end) => {
                let text = line[position..end].replace(',', "");
                if let Ok(value) = text.parse::<f64>() {
                    tokens.push(value);
                }
                position = end;
            }
            None => position += 1,
        }
    }

    tokens
}

pub(super) fn last_numeric_token(line: &str) -> Option<f64> {
    numeric_tokens(line).pop()
}

fn match_token(bytes: &[u8], start: usize) -> Option<usize> {
    let mut cursor = start;

    if matches!(bytes.get(cursor), Some(b'+' | b'-')) {
        cursor += 1;
    }
    if bytes.get(cursor) == Some(&b'.') {
        cursor += 1;
    }

    let digits_start = cursor;
    cursor = skip_digits(bytes, cursor);
    if cursor == digits_start {
        return None;
    }

    while bytes.get(cursor) == Some(&b',')
        && bytes.len() > cursor + 3
        && bytes[cursor + 1..=cursor + 3].iter().all(u8::is_ascii_digit)
    {
        cursor += 4;
    }

    if bytes.get(cursor) == Some(&b'.') {
        cursor += 1;
    }
    cursor = skip_digits(bytes, cursor);

    if matches!(bytes.get(cursor), Some(b'e' | b'E')) {
        let mut exponent = cursor + 1;
        if matches!(bytes.get(exponent), Some(b'+' | b'-')) {
            exponent += 1;
        }
        let exponent_digits = skip_digits(bytes, exponent);
        if exponent_digits > exponent {
            cursor = exponent_digits;
        }
    }

    Some(cursor)
}

fn skip_digits(bytes: &[u8], mut cursor: usize) -> usize {
    while bytes.get(cursor).is_some_and(u8::is_ascii_digit) {
        cursor += 1;
    }
    cursor
}
