//! Log events accepted by the sink

use std::sync::Arc;

/// An ordered group of text lines written together
///
/// Lines of one event are never interleaved with lines of another. The
/// event carries no timestamp; each line is stamped when it is written.
/// Cloning is cheap, the lines are shared.
///
/// Stored lines never contain `\n`: text with embedded newlines is split on
/// construction so every physical line in the file gets its own timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEvent {
    lines: Arc<[String]>,
}

impl LogEvent {
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut split = Vec::new();
        for line in lines {
            push_split(&mut split, line.into());
        }
        Self { lines: split.into() }
    }

    /// Event made of a single line, split further if it holds newlines
    pub fn line(line: impl Into<String>) -> Self {
        Self::new([line.into()])
    }

    /// Split text on newlines, one line per event line
    pub fn from_text(text: &str) -> Self {
        Self::new(text.lines())
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

impl From<&str> for LogEvent {
    fn from(line: &str) -> Self {
        Self::line(line)
    }
}

impl From<String> for LogEvent {
    fn from(line: String) -> Self {
        Self::line(line)
    }
}

impl From<Vec<String>> for LogEvent {
    fn from(lines: Vec<String>) -> Self {
        if lines.iter().any(|l| l.contains('\n')) {
            return Self::new(lines);
        }
        Self {
            lines: lines.into(),
        }
    }
}

fn push_split(out: &mut Vec<String>, line: String) {
    if line.contains('\n') {
        out.extend(line.lines().map(str::to_string));
    } else {
        out.push(line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_keeps_order() {
        let event = LogEvent::new(["first", "second", "third"]);
        assert_eq!(event.lines(), ["first", "second", "third"]);
        assert_eq!(event.len(), 3);
    }

    #[test]
    fn test_from_text_splits_lines() {
        let event = LogEvent::from_text("panic at main.rs\n  frame 0\n  frame 1");
        assert_eq!(event.len(), 3);
        assert_eq!(event.lines()[1], "  frame 0");
    }

    #[test]
    fn test_single_line_conversions() {
        assert_eq!(LogEvent::from("x"), LogEvent::line("x"));
        assert_eq!(LogEvent::from(String::from("x")).len(), 1);
        assert!(LogEvent::new(Vec::<String>::new()).is_empty());
        assert_eq!(LogEvent::line("").lines(), [""]);
    }

    #[test]
    fn test_embedded_newlines_become_separate_lines() {
        assert_eq!(LogEvent::from("first\nsecond").lines(), ["first", "second"]);
        assert_eq!(LogEvent::line("crlf\r\nend\n").lines(), ["crlf", "end"]);
        assert_eq!(
            LogEvent::new(["a", "b\nc"]).lines(),
            ["a", "b", "c"]
        );
        assert_eq!(
            LogEvent::from(vec!["x\ny".to_string()]).lines(),
            ["x", "y"]
        );
    }
}
