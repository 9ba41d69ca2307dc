/// Column alignment taken from a table's separator row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Alignment {
    /// `---` and `:---` both render without an alignment style
    #[default]
    None,
    Center,
    Right,
}

/// A table column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub align: Alignment,
}

/// A GFM-style table. The first row is the header row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub columns: Vec<Column>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn header(&self) -> &[String] {
        self.rows.first().map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn body(&self) -> &[Vec<String>] {
        self.rows.get(1..).unwrap_or(&[])
    }
}

/// A single list item, which can own one nested list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListItem {
    pub text: String,
    pub nested: Option<Box<List>>,
}

/// A list (ordered or unordered)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct List {
    pub ordered: bool,
    pub items: Vec<ListItem>,
}

/// Block-level elements parsed from Markdown.
///
/// Text fields hold inline source; it is rendered when the block is
/// turned into HTML.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Heading {
        level: u8,
        content: String,
    },
    Paragraph {
        content: String,
    },
    CodeBlock {
        language: Option<String>,
        body: String,
    },
    Blockquote(Vec<Block>),
    List(List),
    Table(Table),
    Rule,
}
