//! Source positions for JSON pointer paths.
//!
//! Contracts and rendered schemas are parsed into `serde_json::Value`s, which
//! drop positions. A [`SourceIndex`] recovers them by scanning the original
//! text once and recording where every key and sequence element starts. JSON
//! text is scanned token by token; anything else is treated as YAML and walked
//! by indentation. Flow collections written on a single line are indexed too.
//! A pointer that cannot be followed yields `None`, never an error.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A 1-based line and column in a source document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SpecLocation {
    /// Line number, or -1 when unknown.
    pub line: i64,
    /// Column number, or -1 when unknown.
    pub column: i64,
}

impl SpecLocation {
    /// Marker for "not locatable".
    pub const UNKNOWN: Self = Self {
        line: -1,
        column: -1,
    };

    /// Creates a location.
    pub const fn new(line: i64, column: i64) -> Self {
        Self { line, column }
    }

    /// Returns false for [`SpecLocation::UNKNOWN`].
    pub const fn is_known(&self) -> bool {
        self.line >= 0 && self.column >= 0
    }
}

impl Default for SpecLocation {
    fn default() -> Self {
        Self::UNKNOWN
    }
}

impl fmt::Display for SpecLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_known() {
            write!(f, "{}:{}", self.line, self.column)
        } else {
            f.write_str("unknown")
        }
    }
}

/// Splits a JSON pointer (`/a/b~1c`, optionally `#`-prefixed) into unescaped tokens.
pub fn split_pointer(pointer: &str) -> Vec<String> {
    let pointer = pointer.strip_prefix('#').unwrap_or(pointer);
    if pointer.is_empty() {
        return Vec::new();
    }
    pointer
        .strip_prefix('/')
        .unwrap_or(pointer)
        .split('/')
        .map(|token| token.replace("~1", "/").replace("~0", "~"))
        .collect()
}

fn join_pointer<S: AsRef<str>>(tokens: &[S]) -> String {
    let mut pointer = String::new();
    for token in tokens {
        pointer.push('/');
        pointer.push_str(&token.as_ref().replace('~', "~0").replace('/', "~1"));
    }
    pointer
}

/// Positions of every key and sequence element in a document.
///
/// Building the index costs one pass over the text; lookups are hash probes.
/// When a key repeats within one mapping the first occurrence wins.
///
/// ```
/// use theseus_core::{SourceIndex, SpecLocation};
///
/// let index = SourceIndex::new("paths:\n  /pets:\n    get: {operationId: listPets}\n");
/// assert_eq!(index.get(&["paths", "/pets", "get"]), Some(SpecLocation::new(3, 5)));
/// assert_eq!(
///     index.get(&["paths", "/pets", "get", "operationId"]),
///     Some(SpecLocation::new(3, 11))
/// );
/// ```
#[derive(Debug, Clone, Default)]
pub struct SourceIndex {
    positions: HashMap<String, SpecLocation>,
}

impl SourceIndex {
    /// Indexes `source`, detecting JSON by a leading `{` or `[`.
    pub fn new(source: &str) -> Self {
        let mut index = Self::default();
        match source.trim_start().chars().next() {
            Some('{' | '[') => json::scan(source, &mut index),
            Some(_) => yaml::scan(source, &mut index),
            None => {}
        }
        index
    }

    /// Position of the key (or sequence element) addressed by `pointer`.
    pub fn get<S: AsRef<str>>(&self, pointer: &[S]) -> Option<SpecLocation> {
        if pointer.is_empty() {
            return None;
        }
        self.positions.get(&join_pointer(pointer)).copied()
    }

    /// Number of indexed positions.
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Whether nothing was indexed.
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    fn record(&mut self, path: &[String], at: SpecLocation) {
        self.positions.entry(join_pointer(path)).or_insert(at);
    }
}

/// Finds the position of the key (or array element) addressed by `pointer`.
///
/// Indexes `source` on every call; hold a [`SourceIndex`] for repeated lookups.
///
/// # Example
///
/// ```
/// use theseus_core::{locate, SpecLocation};
///
/// let yaml = "paths:\n  /pets:\n    get:\n      operationId: listPets\n";
/// assert_eq!(
///     locate(yaml, &["paths", "/pets", "get"]),
///     Some(SpecLocation::new(3, 5))
/// );
/// ```
pub fn locate<S: AsRef<str>>(source: &str, pointer: &[S]) -> Option<SpecLocation> {
    SourceIndex::new(source).get(pointer)
}

mod json {
    use std::iter::Peekable;
    use std::str::Chars;

    use super::{SourceIndex, SpecLocation};

    pub(super) fn scan(source: &str, index: &mut SourceIndex) {
        let mut scanner = Scanner {
            chars: source.chars().peekable(),
            line: 1,
            column: 1,
        };
        scanner.value(&mut Vec::new(), index);
    }

    struct Scanner<'s> {
        chars: Peekable<Chars<'s>>,
        line: i64,
        column: i64,
    }

    impl Scanner<'_> {
        fn here(&self) -> SpecLocation {
            SpecLocation::new(self.line, self.column)
        }

        fn peek(&mut self) -> Option<char> {
            self.chars.peek().copied()
        }

        fn bump(&mut self) -> Option<char> {
            let c = self.chars.next()?;
            if c == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
            Some(c)
        }

        fn skip_ws(&mut self) {
            while matches!(self.peek(), Some(' ' | '\t' | '\n' | '\r')) {
                self.bump();
            }
        }

        fn string(&mut self) -> Option<String> {
            if self.bump()? != '"' {
                return None;
            }
            let mut out = String::new();
            loop {
                match self.bump()? {
                    '"' => return Some(out),
                    '\\' => {
                        let escaped = match self.bump()? {
                            'n' => '\n',
                            't' => '\t',
                            'r' => '\r',
                            'b' => '\u{8}',
                            'f' => '\u{c}',
                            'u' => {
                                let mut code = 0u32;
                                for _ in 0..4 {
                                    code = code * 16 + self.bump()?.to_digit(16)?;
                                }
                                char::from_u32(code).unwrap_or('\u{fffd}')
                            }
                            other => other,
                        };
                        out.push(escaped);
                    }
                    c => out.push(c),
                }
            }
        }

        fn value(&mut self, path: &mut Vec<String>, index: &mut SourceIndex) -> Option<()> {
            self.skip_ws();
            match self.peek()? {
                '{' => {
                    self.bump();
                    loop {
                        self.skip_ws();
                        match self.peek()? {
                            '}' => {
                                self.bump();
                                return Some(());
                            }
                            ',' => {
                                self.bump();
                                continue;
                            }
                            '"' => {}
                            _ => return None,
                        }
                        let at = self.here();
                        let key = self.string()?;
                        self.skip_ws();
                        if self.bump()? != ':' {
                            return None;
                        }
                        path.push(key);
                        index.record(path, at);
                        let scanned = self.value(path, index);
                        path.pop();
                        scanned?;
                    }
                }
                '[' => {
                    self.bump();
                    let mut position = 0usize;
                    loop {
                        self.skip_ws();
                        match self.peek()? {
                            ']' => {
                                self.bump();
                                return Some(());
                            }
                            ',' => {
                                self.bump();
                                continue;
                            }
                            _ => {}
                        }
                        path.push(position.to_string());
                        index.record(path, self.here());
                        let scanned = self.value(path, index);
                        path.pop();
                        scanned?;
                        position += 1;
                    }
                }
                '"' => self.string().map(drop),
                _ => {
                    let mut consumed = false;
                    while let Some(c) = self.peek() {
                        if matches!(c, ',' | '}' | ']') || c.is_whitespace() {
                            break;
                        }
                        self.bump();
                        consumed = true;
                    }
                    consumed.then_some(())
                }
            }
        }
    }
}

mod yaml {
    use super::{flow, SourceIndex, SpecLocation};

    #[derive(Debug, PartialEq, Eq)]
    enum Kind {
        Key(String),
        Item,
        Scalar,
    }

    #[derive(Debug)]
    struct Entry<'s> {
        line: i64,
        indent: usize,
        kind: Kind,
        // A single-line flow collection holding the entry's value, with the
        // 0-based column it opens at.
        flow: Option<(usize, &'s str)>,
    }

    // An open block node while scanning; children are the following entries
    // indented deeper, and a key also owns a sequence written at its own
    // indentation.
    struct Frame {
        indent: Option<usize>,
        owns_items: bool,
        path: Option<Vec<String>>,
        level: Option<(usize, bool)>,
        items: usize,
    }

    impl Frame {
        fn contains(&self, entry: &Entry<'_>) -> bool {
            self.indent.map_or(true, |indent| {
                entry.indent > indent
                    || (self.owns_items && entry.indent == indent && entry.kind == Kind::Item)
            })
        }

        // The first child fixes the level children sit at and whether they
        // are sequence items or mapping keys; anything else is unaddressable.
        fn child_path(&mut self, entry: &Entry<'_>) -> Option<Vec<String>> {
            let (level, sequence) = *self
                .level
                .get_or_insert((entry.indent, entry.kind == Kind::Item));
            if entry.indent != level {
                return None;
            }
            let token = match (&entry.kind, sequence) {
                (Kind::Item, true) => {
                    self.items += 1;
                    (self.items - 1).to_string()
                }
                (Kind::Key(key), false) => key.clone(),
                _ => return None,
            };
            let mut path = self.path.clone()?;
            path.push(token);
            Some(path)
        }
    }

    pub(super) fn scan(source: &str, index: &mut SourceIndex) {
        let mut stack = vec![Frame {
            indent: None,
            owns_items: false,
            path: Some(Vec::new()),
            level: None,
            items: 0,
        }];

        for entry in entries(source) {
            while stack.len() > 1 && !stack.last().is_some_and(|frame| frame.contains(&entry)) {
                stack.pop();
            }
            let Some(parent) = stack.last_mut() else {
                return;
            };

            let path = parent.child_path(&entry);
            if let Some(path) = &path {
                index.record(path, SpecLocation::new(entry.line, entry.indent as i64 + 1));
                if let Some((column, text)) = entry.flow {
                    flow::scan(text, entry.line, column, path, index);
                }
            }

            stack.push(Frame {
                indent: Some(entry.indent),
                owns_items: matches!(entry.kind, Kind::Key(_)),
                path,
                level: None,
                items: 0,
            });
        }
    }

    fn entries(source: &str) -> Vec<Entry<'_>> {
        let mut out: Vec<Entry<'_>> = Vec::new();
        for (n, raw) in source.lines().enumerate() {
            let line = n as i64 + 1;
            let trimmed = raw.trim_start_matches(' ');
            if trimmed.trim().is_empty()
                || trimmed.starts_with('#')
                || trimmed.starts_with("---")
                || trimmed.starts_with("...")
            {
                continue;
            }

            let mut indent = raw.len() - trimmed.len();
            let mut rest = trimmed;
            while rest == "-" || rest.starts_with("- ") {
                out.push(Entry {
                    line,
                    indent,
                    kind: Kind::Item,
                    flow: None,
                });
                let after = rest[1..].trim_start_matches(' ');
                indent += rest.len() - after.len();
                rest = after;
            }
            if rest.is_empty() {
                continue;
            }

            let column = |text: &str| raw[..raw.len() - text.len()].chars().count();

            if rest.starts_with(['{', '[']) {
                match out.last_mut() {
                    Some(item) if item.line == line && item.kind == Kind::Item => {
                        item.flow = Some((column(rest), rest));
                    }
                    _ => out.push(Entry {
                        line,
                        indent,
                        kind: Kind::Scalar,
                        flow: None,
                    }),
                }
                continue;
            }

            let entry = match key_of(rest) {
                Some((key, value)) => {
                    let value = value.trim_start();
                    Entry {
                        line,
                        indent,
                        kind: Kind::Key(key),
                        flow: value
                            .starts_with(['{', '['])
                            .then(|| (column(value), value)),
                    }
                }
                None => Entry {
                    line,
                    indent,
                    kind: Kind::Scalar,
                    flow: None,
                },
            };
            out.push(entry);
        }
        out
    }

    /// Splits `key: value` into the key and the text after the colon.
    fn key_of(text: &str) -> Option<(String, &str)> {
        match text.chars().next()? {
            '"' => {
                let mut key = String::new();
                let mut escaped = false;
                for (i, c) in text.char_indices().skip(1) {
                    if escaped {
                        key.push(match c {
                            'n' => '\n',
                            't' => '\t',
                            other => other,
                        });
                        escaped = false;
                    } else if c == '\\' {
                        escaped = true;
                    } else if c == '"' {
                        return text[i + 1..]
                            .trim_start()
                            .strip_prefix(':')
                            .map(|value| (key, value));
                    } else {
                        key.push(c);
                    }
                }
                None
            }
            '\'' => {
                let mut key = String::new();
                let mut chars = text.char_indices().skip(1).peekable();
                while let Some((i, c)) = chars.next() {
                    if c == '\'' {
                        if chars.peek().map(|&(_, next)| next) == Some('\'') {
                            key.push('\'');
                            chars.next();
                            continue;
                        }
                        return text[i + 1..]
                            .trim_start()
                            .strip_prefix(':')
                            .map(|value| (key, value));
                    }
                    key.push(c);
                }
                None
            }
            '{' | '[' | '|' | '>' | '&' | '*' | '!' | '?' => None,
            _ => {
                let end = text
                    .find(": ")
                    .or_else(|| text.find(":\t"))
                    .or_else(|| text.strip_suffix(':').map(str::len))?;
                Some((text[..end].trim_end().to_string(), &text[end + 1..]))
            }
        }
    }

}

// Single-line YAML flow collections such as `{type: integer}` or `[a, b]`.
mod flow {
    use super::{SourceIndex, SpecLocation};

    pub(super) fn scan(
        text: &str,
        line: i64,
        column: usize,
        path: &[String],
        index: &mut SourceIndex,
    ) {
        let mut scanner = Scanner {
            chars: text.chars().collect(),
            pos: 0,
            line,
            column,
        };
        scanner.value(&mut path.to_vec(), index);
    }

    struct Scanner {
        chars: Vec<char>,
        pos: usize,
        line: i64,
        column: usize,
    }

    impl Scanner {
        fn here(&self) -> SpecLocation {
            SpecLocation::new(self.line, (self.column + self.pos) as i64 + 1)
        }

        fn peek(&self) -> Option<char> {
            self.chars.get(self.pos).copied()
        }

        fn skip_spaces(&mut self) {
            while matches!(self.peek(), Some(' ' | '\t')) {
                self.pos += 1;
            }
        }

        fn value(&mut self, path: &mut Vec<String>, index: &mut SourceIndex) -> Option<()> {
            self.skip_spaces();
            match self.peek()? {
                '{' => {
                    self.pos += 1;
                    loop {
                        self.skip_spaces();
                        match self.peek()? {
                            '}' => {
                                self.pos += 1;
                                return Some(());
                            }
                            ',' => {
                                self.pos += 1;
                                continue;
                            }
                            _ => {}
                        }
                        let start = self.pos;
                        let at = self.here();
                        let key = self.scalar(true)?;
                        self.skip_spaces();
                        path.push(key);
                        index.record(path, at);
                        let scanned = if self.peek() == Some(':') {
                            self.pos += 1;
                            self.value(path, index)
                        } else {
                            Some(())
                        };
                        path.pop();
                        scanned?;
                        if self.pos == start {
                            return None;
                        }
                    }
                }
                '[' => {
                    self.pos += 1;
                    let mut position = 0usize;
                    loop {
                        self.skip_spaces();
                        match self.peek()? {
                            ']' => {
                                self.pos += 1;
                                return Some(());
                            }
                            ',' => {
                                self.pos += 1;
                                continue;
                            }
                            _ => {}
                        }
                        let start = self.pos;
                        path.push(position.to_string());
                        index.record(path, self.here());
                        let scanned = self.value(path, index);
                        path.pop();
                        scanned?;
                        if self.pos == start {
                            return None;
                        }
                        position += 1;
                    }
                }
                _ => self.scalar(false).map(drop),
            }
        }

        // Reads a quoted or plain scalar. A plain key ends at a `:` that is
        // followed by a space, an indicator or the end of the text.
        fn scalar(&mut self, key: bool) -> Option<String> {
            let quote = self.peek()?;
            if quote == '"' || quote == '\'' {
                self.pos += 1;
                let mut out = String::new();
                loop {
                    let c = self.peek()?;
                    self.pos += 1;
                    match c {
                        '\\' if quote == '"' => {
                            out.push(self.peek()?);
                            self.pos += 1;
                        }
                        '\'' if quote == '\'' && self.peek() == Some('\'') => {
                            out.push('\'');
                            self.pos += 1;
                        }
                        c if c == quote => return Some(out),
                        c => out.push(c),
                    }
                }
            }

            let start = self.pos;
            while let Some(c) = self.peek() {
                let ends_key = key
                    && c == ':'
                    && self
                        .chars
                        .get(self.pos + 1)
                        .map_or(true, |next| matches!(next, ' ' | '\t' | ',' | '{' | '}' | '[' | ']'));
                if matches!(c, ',' | '{' | '}' | '[' | ']') || ends_key {
                    break;
                }
                self.pos += 1;
            }
            Some(self.chars[start..self.pos].iter().collect::<String>().trim_end().to_string())
        }
    }
}
