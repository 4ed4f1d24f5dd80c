pub mod parser;
pub mod writer;

/// Stand-in character for embedded newlines, so a multi-line note can
/// travel as one todo.txt line.
pub const LINE_BREAK_SENTINEL: char = '\u{10}';

pub fn encode_multiline(text: &str) -> String {
    text.replace('\n', "\u{10}")
}

pub fn decode_multiline(line: &str) -> String {
    line.replace(LINE_BREAK_SENTINEL, "\n")
}
