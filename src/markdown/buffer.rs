/// An ordered sequence of text lines with index-based editing.
///
/// Line endings are normalized to `\n` on the way in. A final newline does not produce a trailing
/// empty line, so `LineBuffer::from_text("a\n")` holds exactly one line.
#[derive(Debug, Default, Clone, Eq, PartialEq)]
pub struct LineBuffer {
    lines: Vec<String>,
}

impl LineBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_text(text: &str) -> Self {
        let normalized = text.replace("\r\n", "\n").replace('\r', "\n");
        let mut lines: Vec<String> = normalized.split('\n').map(str::to_string).collect();
        if normalized.ends_with('\n') {
            lines.pop();
        }
        Self { lines }
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.lines.get(index).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(String::as_str)
    }

    /// Index of the first line whose trimmed text satisfies `predicate`.
    pub fn position(&self, predicate: impl Fn(&str) -> bool) -> Option<usize> {
        self.iter().position(|line| predicate(line.trim()))
    }

    pub fn push(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }

    /// Inserts `line` so that it ends up at `index`. `index` may equal `len()`.
    pub fn insert(&mut self, index: usize, line: impl Into<String>) {
        self.lines.insert(index.min(self.lines.len()), line.into());
    }

    pub fn remove(&mut self, index: usize) -> Option<String> {
        if index < self.lines.len() {
            Some(self.lines.remove(index))
        } else {
            None
        }
    }

    pub fn replace(&mut self, index: usize, line: impl Into<String>) -> Option<String> {
        self.lines
            .get_mut(index)
            .map(|slot| std::mem::replace(slot, line.into()))
    }

    /// Removes blank lines from the end.
    pub fn trim_trailing_blank(&mut self) {
        while self.lines.last().is_some_and(|l| l.trim().is_empty()) {
            self.lines.pop();
        }
    }

    /// Joins the lines with `\n`, trims trailing whitespace and ends with exactly one newline.
    pub fn to_text(&self) -> String {
        let joined = self.lines.join("\n");
        format!("{}\n", joined.trim_end())
    }
}
