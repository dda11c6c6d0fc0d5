/// Open-tag stack bounding one item container
///
/// Each start tag pushes its name and each end tag pops one entry. The
/// container has been fully consumed once the stack is empty again.
#[derive(Debug, Default)]
pub struct TokenStack {
    open: Vec<String>,
}

impl TokenStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, name: &str) {
        self.open.push(name.to_string());
    }

    pub fn pop(&mut self) -> Option<String> {
        self.open.pop()
    }

    pub fn len(&self) -> usize {
        self.open.len()
    }

    pub fn is_empty(&self) -> bool {
        self.open.is_empty()
    }
}
