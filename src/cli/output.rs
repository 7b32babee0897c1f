//! Output helpers: JSON encoding and the pager

use std::io::{self, IsTerminal, Write};
use std::process::{Command, Stdio};

use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};

/// Pager used when `$PAGER` is not set
pub const DEFAULT_PAGER: &str = "less -R";

/// Pretty JSON indented by `indent` spaces
pub fn to_json<T: Serialize + ?Sized>(value: &T, indent: usize) -> Result<String, serde_json::Error> {
    let indent = " ".repeat(indent);
    let mut buf = Vec::new();
    let mut serializer = Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(indent.as_bytes()));
    value.serialize(&mut serializer)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Write `text` to stdout, through the pager when asked and stdout is a terminal
pub fn emit(text: &str, pager: bool) -> io::Result<()> {
    if pager && io::stdout().is_terminal() {
        let command = std::env::var("PAGER")
            .ok()
            .filter(|p| !p.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_PAGER.to_string());

        match page(&command, text) {
            Ok(()) => return Ok(()),
            Err(e) => tracing::warn!(pager = %command, "cannot run pager: {}", e),
        }
    }

    print(text)
}

fn page(command: &str, text: &str) -> io::Result<()> {
    let mut parts = command.split_whitespace();
    let program = parts
        .next()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "empty pager command"))?;

    let mut child = Command::new(program)
        .args(parts)
        .stdin(Stdio::piped())
        .spawn()?;

    if let Some(mut stdin) = child.stdin.take() {
        // The pager may exit before reading everything
        match stdin.write_all(text.as_bytes()) {
            Err(e) if e.kind() != io::ErrorKind::BrokenPipe => return Err(e),
            _ => {}
        }
    }

    child.wait()?;
    Ok(())
}

/// Print to stdout, ignoring a closed pipe (`tp ls | head`)
pub fn print(text: &str) -> io::Result<()> {
    let mut out = io::stdout().lock();
    match out.write_all(text.as_bytes()).and_then(|_| out.flush()) {
        Err(e) if e.kind() == io::ErrorKind::BrokenPipe => Ok(()),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_indent() {
        let value = serde_json::json!({"Id": 1, "Tags": ["a"]});

        assert_eq!(
            to_json(&value, 2).unwrap(),
            "{\n  \"Id\": 1,\n  \"Tags\": [\n    \"a\"\n  ]\n}"
        );
        assert_eq!(to_json(&value, 0).unwrap(), "{\n\"Id\": 1,\n\"Tags\": [\n\"a\"\n]\n}");
    }
}
