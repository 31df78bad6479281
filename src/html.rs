use crate::block::Block;
use crate::inline::render_inline;

/// Convert blocks to HTML
pub fn blocks_to_html(blocks: &[Block]) -> String {
    let mut out = String::new();
    for block in blocks {
        emit_block(block, &mut out);
    }
    out
}

fn emit_block(block: &Block, out: &mut String) {
    match block {
        Block::Heading { text, .. } | Block::Paragraph { text } => {
            let tag = block.tag();
            push_element(tag, text, out);
        }
        Block::BulletList { items } => {
            out.push_str("<ul>");
            for item in items {
                push_element("li", item, out);
            }
            out.push_str("</ul>");
        }
    }
}

fn push_element(tag: &str, text: &str, out: &mut String) {
    out.push('<');
    out.push_str(tag);
    out.push('>');
    out.push_str(&render_inline(text));
    out.push_str("</");
    out.push_str(tag);
    out.push('>');
}
