//! AppleScript that asks Finder to trash each argument.
//!
//! For every path it logs one record in the line protocol parsed by
//! [`super::protocol`]. `log` writes to stderr. Characters below space,
//! `&`, NEL and the Unicode line and paragraph separators are written as
//! `&#N;` so every record field stays on one line.

/// Script source, sent to `osascript -` on stdin.
pub const SCRIPT: &str = r#"on escapeString(theString)
    set escaped to ""

    set codepoints to id of theString
    if (class of codepoints) is not list
        set codepoints to {codepoints}
    end

    repeat with cc in codepoints
        set cc to cc as integer
        if cc < 32 or cc = 38 or cc = 133 or cc = 8232 or cc = 8233 then
            set eseq to "&#" & cc & ";"
        else
            set eseq to character id cc
        end
        set escaped to escaped & eseq
    end repeat
    return escaped
end

on run argv
    repeat with thePath in argv
        log "fn:" & escapeString(thePath)
        try
            tell application "Finder" to move (thePath as POSIX file) to trash
            log "ok:1"
        on error errorText number errorNumber from errorSource
            log "ok:0"
            log "et:" & escapeString(errorText as text)
            log "en:" & escapeString(errorNumber as text)
        end try
    end repeat
end run
"#;
