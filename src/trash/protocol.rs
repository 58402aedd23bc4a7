//! Line protocol spoken by the trash AppleScript on its log stream.
//!
//! Every line is `XX:DETAIL` where `XX` is a field tag. A record is
//! `fn`, `ok`, then `et` and `en` when `ok` is `0`:
//!
//! ```text
//! fn:/Users/me/report.pdf
//! ok:0
//! et:The operation can&#38;t be completed.
//! en:-1743
//! ```
//!
//! The parser is a small state machine. A line that breaks framing or
//! arrives out of order is a [`ProtocolViolation`]; the partial record is
//! dropped and parsing resynchronises on the next `fn` line.
use std::borrow::Cow;
use std::fmt;

use thiserror::Error;

/// Fields of a record in the order they must appear.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Field {
    /// `fn`: path of the file the record is about.
    #[default]
    FileName,
    /// `ok`: `1` when the file was moved, `0` otherwise.
    Ok,
    /// `et`: error text of a failed move.
    ErrorText,
    /// `en`: error number of a failed move; ends the record.
    ErrorNumber,
}

impl Field {
    /// Two-character tag on the wire.
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::FileName => "fn",
            Self::Ok => "ok",
            Self::ErrorText => "et",
            Self::ErrorNumber => "en",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Outcome of moving one file to the Trash.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrashResult {
    /// Path reported by the script.
    pub filename: String,
    /// Whether the move succeeded.
    pub ok: bool,
    /// Error text, empty on success.
    pub error_text: String,
    /// Error number, empty on success.
    pub error_number: String,
}

/// What was wrong with a protocol line.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ViolationKind {
    /// The line is not `XX:DETAIL`.
    #[error("formatting error")]
    Framing,
    /// The tag is not the one expected next.
    #[error("wrong tag {found:?}, expected {tag:?}", tag = .expected.tag())]
    WrongTag {
        /// Field expected at this point in the record.
        expected: Field,
        /// Tag actually received.
        found: String,
    },
    /// An `fn` line with nothing after the colon.
    #[error("empty filename")]
    EmptyFilename,
    /// An `ok` line that is neither `0` nor `1`.
    #[error("invalid value for 'ok': {0:?}")]
    InvalidOk(String),
    /// The stream ended inside a record.
    #[error("unexpected end of input")]
    UnexpectedEnd,
}

/// A protocol violation with the line it happened on.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind} at line {line} line_text={text:?}")]
pub struct ProtocolViolation {
    /// What went wrong.
    pub kind: ViolationKind,
    /// 1-based line number; for [`ViolationKind::UnexpectedEnd`] the last
    /// line read.
    pub line: usize,
    /// The offending line as received.
    pub text: String,
}

/// Result of feeding one line to [`ParserState::step`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// The line was accepted; the record is still open.
    Pending,
    /// The line completed a record.
    Complete(TrashResult),
    /// The line was rejected and the open record discarded.
    Violation(ViolationKind),
}

/// Position in the record plus the fields collected so far.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParserState {
    expect: Field,
    partial: TrashResult,
}

impl ParserState {
    /// Whether no record is open.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.expect == Field::FileName
    }

    /// Field expected on the next line.
    #[must_use]
    pub const fn expected(&self) -> Field {
        self.expect
    }

    /// Consume one line (without its terminator) and return the next state.
    #[must_use]
    pub fn step(self, line: &str) -> (Self, Step) {
        let Some((tag, detail)) = split_line(line) else {
            return (Self::default(), Step::Violation(ViolationKind::Framing));
        };
        if tag != self.expect.tag() {
            let kind = ViolationKind::WrongTag {
                expected: self.expect,
                found: tag.to_string(),
            };
            return (Self::default(), Step::Violation(kind));
        }

        let detail = decode_detail(detail);
        let mut partial = self.partial;
        let next = match self.expect {
            Field::FileName => {
                if detail.is_empty() {
                    return (Self::default(), Step::Violation(ViolationKind::EmptyFilename));
                }
                partial.filename = detail.into_owned();
                Field::Ok
            }
            Field::Ok => match detail.as_ref() {
                "1" => {
                    partial.ok = true;
                    return (Self::default(), Step::Complete(partial));
                }
                "0" => Field::ErrorText,
                other => {
                    let kind = ViolationKind::InvalidOk(other.to_string());
                    return (Self::default(), Step::Violation(kind));
                }
            },
            Field::ErrorText => {
                partial.error_text = detail.into_owned();
                Field::ErrorNumber
            }
            Field::ErrorNumber => {
                partial.error_number = detail.into_owned();
                return (Self::default(), Step::Complete(partial));
            }
        };
        (
            Self {
                expect: next,
                partial,
            },
            Step::Pending,
        )
    }

    /// Violation to report when the stream ends in this state, if any.
    #[must_use]
    pub fn finish(&self) -> Option<ViolationKind> {
        (!self.is_idle()).then_some(ViolationKind::UnexpectedEnd)
    }
}

/// Split `XX:DETAIL` into tag and detail.
fn split_line(line: &str) -> Option<(&str, &str)> {
    let (colon, _) = line.char_indices().nth(2)?;
    let (tag, rest) = line.split_at(colon);
    Some((tag, rest.strip_prefix(':')?))
}

/// Undo the `&#N;` escaping the script applies to awkward characters.
///
/// Decimal and `&#x..;` hex references are decoded. Code points that are
/// not valid characters become U+FFFD. Anything else is left alone.
#[must_use]
pub fn decode_detail(detail: &str) -> Cow<'_, str> {
    if !detail.contains("&#") {
        return Cow::Borrowed(detail);
    }
    let mut out = String::with_capacity(detail.len());
    let mut rest = detail;
    while let Some(start) = rest.find("&#") {
        let (head, tail) = rest.split_at(start);
        out.push_str(head);
        let after = tail.strip_prefix("&#").unwrap_or_default();
        match parse_reference(after) {
            Some((c, used)) => {
                out.push(c);
                rest = after.get(used..).unwrap_or_default();
            }
            None => {
                out.push_str("&#");
                rest = after;
            }
        }
    }
    out.push_str(rest);
    Cow::Owned(out)
}

/// Parse `N;` or `xH;` and return the character and bytes consumed.
fn parse_reference(s: &str) -> Option<(char, usize)> {
    let (radix, digits_at) = match s.as_bytes().first()? {
        b'x' | b'X' => (16, 1),
        _ => (10, 0),
    };
    let body = s.get(digits_at..)?;
    let len = body
        .find(|c: char| !c.is_digit(radix))
        .unwrap_or(body.len());
    let (digits, tail) = body.split_at(len);
    if digits.is_empty() || !tail.starts_with(';') {
        return None;
    }
    let c = u32::from_str_radix(digits, radix)
        .ok()
        .and_then(char::from_u32)
        .filter(|&c| c != '\0')
        .unwrap_or(char::REPLACEMENT_CHARACTER);
    Some((c, digits_at + len + 1))
}

/// Stateful wrapper over [`ParserState`] that numbers lines.
#[derive(Debug, Default)]
pub struct LineParser {
    state: ParserState,
    line: usize,
    last_text: String,
    violations: usize,
}

impl LineParser {
    /// Create a parser expecting the start of a record.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one raw line; trailing `\r\n` is ignored.
    ///
    /// # Errors
    ///
    /// Returns the violation if the line breaks the protocol. Parsing may
    /// continue afterwards.
    pub fn feed(&mut self, raw: &str) -> Result<Option<TrashResult>, ProtocolViolation> {
        self.line += 1;
        raw.clone_into(&mut self.last_text);
        let line = raw.trim_end_matches(['\r', '\n']);
        let (state, step) = std::mem::take(&mut self.state).step(line);
        self.state = state;
        match step {
            Step::Pending => Ok(None),
            Step::Complete(result) => Ok(Some(result)),
            Step::Violation(kind) => Err(self.violation(kind)),
        }
    }

    /// Signal end of input.
    ///
    /// # Errors
    ///
    /// Returns [`ViolationKind::UnexpectedEnd`] if a record is still open.
    pub fn finish(&mut self) -> Result<(), ProtocolViolation> {
        match self.state.finish() {
            Some(kind) => {
                self.state = ParserState::default();
                Err(self.violation(kind))
            }
            None => Ok(()),
        }
    }

    /// Number of violations seen so far.
    #[must_use]
    pub const fn violation_count(&self) -> usize {
        self.violations
    }

    fn violation(&mut self, kind: ViolationKind) -> ProtocolViolation {
        self.violations += 1;
        ProtocolViolation {
            kind,
            line: self.line,
            text: self.last_text.clone(),
        }
    }
}
