/// Block-level elements recognized in a recommendation.
///
/// Text is kept raw; escaping and inline spans are applied when the block is
/// emitted as HTML.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Heading {
        /// 1 through 4
        level: u8,
        text: String,
    },
    Paragraph {
        /// Source lines joined with a single space
        text: String,
    },
    BulletList {
        items: Vec<String>,
    },
}

impl Block {
    /// HTML tag name for the block.
    pub fn tag(&self) -> &'static str {
        match self {
            Block::Heading { level: 1, .. } => "h1",
            Block::Heading { level: 2, .. } => "h2",
            Block::Heading { level: 3, .. } => "h3",
            Block::Heading { .. } => "h4",
            Block::Paragraph { .. } => "p",
            Block::BulletList { .. } => "ul",
        }
    }
}
