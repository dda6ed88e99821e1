/*!
 * Statement splitting.
 *
 * The scanner walks the text once and only treats `;` as a terminator in
 * the normal state. Pieces borrow from the input and concatenate back to it
 * exactly, so a caller can rebuild the file piece by piece.
 */

/// Lexical state of the scanner
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    Normal,
    LineComment,
    BlockComment,
    SingleQuoted,
    DoubleQuoted,
    DollarQuoted,
}

/// Splits a SQL blob into statements
pub struct StatementSplitter;

impl StatementSplitter {
    /// Split `sql` into statements, each keeping its terminating `;`.
    ///
    /// A trailing piece without a terminator is returned as-is, even when it
    /// is only whitespace, so that `split(s).concat() == s` always holds.
    pub fn split(sql: &str) -> Vec<&str> {
        let bytes = sql.as_bytes();
        let mut pieces = Vec::new();
        let mut state = ScanState::Normal;
        let mut dollar_tag: &[u8] = &[];
        let mut start = 0;
        let mut i = 0;

        while i < bytes.len() {
            let b = bytes[i];
            let next = bytes.get(i + 1).copied();

            match state {
                ScanState::Normal => match b {
                    b'-' if next == Some(b'-') => {
                        state = ScanState::LineComment;
                        i += 2;
                        continue;
                    }
                    b'/' if next == Some(b'*') => {
                        state = ScanState::BlockComment;
                        i += 2;
                        continue;
                    }
                    b'\'' => state = ScanState::SingleQuoted,
                    b'"' => state = ScanState::DoubleQuoted,
                    b'$' => {
                        if let Some(len) = dollar_tag_len(&bytes[i..]) {
                            dollar_tag = &bytes[i..i + len];
                            state = ScanState::DollarQuoted;
                            i += len;
                            continue;
                        }
                    }
                    b';' => {
                        pieces.push(&sql[start..=i]);
                        start = i + 1;
                    }
                    _ => {}
                },
                ScanState::LineComment => {
                    if b == b'\n' || b == b'\r' {
                        state = ScanState::Normal;
                    }
                }
                ScanState::BlockComment => {
                    if b == b'*' && next == Some(b'/') {
                        state = ScanState::Normal;
                        i += 2;
                        continue;
                    }
                }
                ScanState::SingleQuoted => {
                    if b == b'\'' {
                        if next == Some(b'\'') {
                            i += 2;
                            continue;
                        }
                        state = ScanState::Normal;
                    }
                }
                ScanState::DoubleQuoted => {
                    if b == b'"' {
                        if next == Some(b'"') {
                            i += 2;
                            continue;
                        }
                        state = ScanState::Normal;
                    }
                }
                ScanState::DollarQuoted => {
                    if bytes[i..].starts_with(dollar_tag) {
                        state = ScanState::Normal;
                        i += dollar_tag.len();
                        continue;
                    }
                }
            }
            i += 1;
        }

        if start < sql.len() {
            pieces.push(&sql[start..]);
        }
        pieces
    }
}

/// Length of a `$tag$` opener at the start of `bytes`, including both dollars.
///
/// Tags are alphanumeric or underscore; `$$` is the empty tag.
pub(crate) fn dollar_tag_len(bytes: &[u8]) -> Option<usize> {
    if bytes.first() != Some(&b'$') {
        return None;
    }
    let mut j = 1;
    while j < bytes.len() && (bytes[j].is_ascii_alphanumeric() || bytes[j] == b'_') {
        j += 1;
    }
    if j < bytes.len() && bytes[j] == b'$' {
        Some(j + 1)
    } else {
        None
    }
}
