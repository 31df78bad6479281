use crate::block::Block;

/// Deepest heading level recognized. `#####` and beyond are paragraph text.
const MAX_HEADING_LEVEL: usize = 4;

/// Classify markdown lines into blocks.
pub fn parse(markdown: &str) -> Vec<Block> {
    let mut blocks = Vec::new();
    let mut state = ParseState::Idle;

    // `lines` splits on both "\n" and "\r\n"
    for raw in markdown.lines() {
        state = process_line(raw.trim(), state, &mut blocks);
    }
    finish(state, &mut blocks);

    blocks
}

/// Block in progress. Paragraph and list are mutually exclusive, so a list
/// is always closed before paragraph text is buffered.
#[derive(Debug)]
enum ParseState {
    Idle,
    Paragraph(Vec<String>),
    List(Vec<String>),
}

#[derive(Debug, PartialEq, Eq)]
enum Line<'a> {
    Blank,
    Heading { level: u8, text: &'a str },
    Bullet(&'a str),
    Text(&'a str),
}

fn process_line(line: &str, state: ParseState, blocks: &mut Vec<Block>) -> ParseState {
    match classify(line) {
        Line::Blank => {
            finish(state, blocks);
            ParseState::Idle
        }
        Line::Heading { level, text } => {
            finish(state, blocks);
            blocks.push(Block::Heading {
                level,
                text: text.to_string(),
            });
            ParseState::Idle
        }
        Line::Bullet(item) => match state {
            ParseState::List(mut items) => {
                items.push(item.to_string());
                ParseState::List(items)
            }
            other => {
                finish(other, blocks);
                ParseState::List(vec![item.to_string()])
            }
        },
        Line::Text(text) => match state {
            ParseState::Paragraph(mut lines) => {
                lines.push(text.to_string());
                ParseState::Paragraph(lines)
            }
            other => {
                finish(other, blocks);
                ParseState::Paragraph(vec![text.to_string()])
            }
        },
    }
}

/// Emit the block in progress, if any.
fn finish(state: ParseState, blocks: &mut Vec<Block>) {
    match state {
        ParseState::Idle => {}
        ParseState::Paragraph(lines) => blocks.push(Block::Paragraph {
            text: lines.join(" "),
        }),
        ParseState::List(items) => blocks.push(Block::BulletList { items }),
    }
}

/// Classify one trimmed line. Headings win over bullets, bullets over text.
fn classify(line: &str) -> Line<'_> {
    if line.is_empty() {
        return Line::Blank;
    }
    if let Some((level, text)) = heading(line) {
        return Line::Heading { level, text };
    }
    if let Some(item) = bullet(line) {
        return Line::Bullet(item);
    }
    Line::Text(line)
}

/// `#{1,4}`, at least one whitespace character, then content.
fn heading(line: &str) -> Option<(u8, &str)> {
    let hashes = line.bytes().take_while(|&b| b == b'#').count();
    if hashes == 0 || hashes > MAX_HEADING_LEVEL {
        return None;
    }
    let text = after_marker(&line[hashes..])?;
    Some((hashes as u8, text))
}

/// `-` or `*`, at least one whitespace character, then content.
fn bullet(line: &str) -> Option<&str> {
    let rest = line.strip_prefix('-').or_else(|| line.strip_prefix('*'))?;
    after_marker(rest)
}

fn after_marker(rest: &str) -> Option<&str> {
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }
    let text = rest.trim_start();
    if text.is_empty() { None } else { Some(text) }
}
