//! POSIX shell quoting and the templates for generated scripts.
use std::borrow::Cow;

/// One word of a generated command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token<'a> {
    /// A literal argument, quoted as needed.
    Word(&'a str),
    /// The caller's arguments, forwarded verbatim as `"$@"`.
    AllArgs,
}

fn is_safe(c: char) -> bool {
    c.is_ascii_alphanumeric() || "@%+=:,./_-".contains(c)
}

/// Quote `s` so a POSIX shell reads it back as a single word.
///
/// Strings made only of safe characters are returned unchanged; anything
/// else is wrapped in single quotes with embedded quotes spelled `'"'"'`.
#[must_use]
pub fn shell_quote(s: &str) -> Cow<'_, str> {
    if s.is_empty() {
        return Cow::Borrowed("''");
    }
    if s.chars().all(is_safe) {
        return Cow::Borrowed(s);
    }
    Cow::Owned(format!("'{}'", s.replace('\'', r#"'"'"'"#)))
}

/// Join tokens into a single shell command line.
#[must_use]
pub fn command_line(tokens: &[Token<'_>]) -> String {
    tokens
        .iter()
        .map(|t| match t {
            Token::Word(w) => shell_quote(w),
            Token::AllArgs => Cow::Borrowed(r#""$@""#),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// A `/bin/sh` script that runs `command`.
#[must_use]
pub fn sh_script(command: &str) -> String {
    format!("#!/bin/sh\n{command}\n")
}

/// A script that tells the user to run `new` instead of `old`, then fails.
#[must_use]
pub fn habit_changer_script(old: &str, new: &str) -> String {
    format!(
        "#!/bin/sh\necho {}: Use {} instead. >&2\nexit 1\n",
        shell_quote(old),
        shell_quote(new)
    )
}
