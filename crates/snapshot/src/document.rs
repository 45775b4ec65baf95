use chrono::NaiveDate;
use serde::Serialize;
use serde_json::value::RawValue;

const INDENT: &str = "  ";

/// The JSON document written for one export target.
///
/// `data` borrows the array exactly as the database produced it. It is never
/// parsed into a `serde_json::Value`, so numeric precision and key order of
/// the rows are whatever the server wrote.
#[derive(Debug, Serialize)]
pub struct ExportDocument<'a> {
    pub data: &'a RawValue,
    pub export_date: NaiveDate,
}

impl<'a> ExportDocument<'a> {
    pub fn new(data: &'a RawValue, export_date: NaiveDate) -> Self {
        Self { data, export_date }
    }

    /// Serializes the document with two-space indentation, including the
    /// embedded rows.
    pub fn to_pretty_json(&self) -> Result<String, serde_json::Error> {
        // serde_json emits a RawValue untouched, even through its pretty
        // formatter, so lay out the whole text afterwards instead.
        let compact = serde_json::to_string(self)?;
        Ok(indent(&compact))
    }
}

/// Re-indents valid JSON text.
///
/// Insignificant whitespace is dropped and replaced by newlines and
/// [`INDENT`] per nesting level; `:` is followed by one space; empty arrays
/// and objects stay on one line. Tokens themselves, including string escapes
/// and number spellings, are copied unchanged.
pub fn indent(json: &str) -> String {
    let mut out = String::with_capacity(json.len() * 2);
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    // Set after `{` or `[` until we know whether the container is empty.
    let mut opened = false;

    for c in json.chars() {
        if in_string {
            out.push(c);
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }

        if matches!(c, ' ' | '\t' | '\n' | '\r') {
            continue;
        }

        if opened {
            opened = false;
            if c == '}' || c == ']' {
                depth = depth.saturating_sub(1);
                out.push(c);
                continue;
            }
            newline(&mut out, depth);
        }

        match c {
            '"' => {
                in_string = true;
                out.push(c);
            }
            '{' | '[' => {
                out.push(c);
                depth += 1;
                opened = true;
            }
            '}' | ']' => {
                depth = depth.saturating_sub(1);
                newline(&mut out, depth);
                out.push(c);
            }
            ',' => {
                out.push(c);
                newline(&mut out, depth);
            }
            ':' => out.push_str(": "),
            _ => out.push(c),
        }
    }

    out
}

fn newline(out: &mut String, depth: usize) {
    out.push('\n');
    for _ in 0..depth {
        out.push_str(INDENT);
    }
}
