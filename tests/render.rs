use finantrack::{Block, markdown_to_sanitized_html, parse, render, to_display_html};

const RECOMMENDATION: &str = "### 🧾 Resumen de tu presupuesto\r\n\
Tu presupuesto prioriza **Comida** y *Metas*.\r\n\
Revisa el detalle abajo.\r\n\
\r\n\
#### 💡 Sugerencias para mejorar\r\n\
- ✅ Lleva almuerzo `2 veces` por semana\r\n\
- 🔥 Compara precios en [la guía](https://example.com/guia?a=1&b=2)\r\n\
\r\n\
¡Vas muy bien! 🎯\r\n";

#[test]
fn documented_examples() {
    assert_eq!(render(""), "");
    assert_eq!(render("### Hola"), "<h3>Hola</h3>");
    assert_eq!(render("- uno\n- dos"), "<ul><li>uno</li><li>dos</li></ul>");

    let html = render("Este es **importante** y *útil*.");
    assert!(html.starts_with("<p>") && html.ends_with("</p>"));
    assert_eq!(html.matches("<p>").count(), 1);
    assert!(html.contains("<strong>importante</strong>"));
    assert!(html.contains("<em>útil</em>"));

    assert_eq!(
        render("Línea uno\nLínea dos\n\nOtro párrafo"),
        "<p>Línea uno Línea dos</p><p>Otro párrafo</p>"
    );

    assert_eq!(
        render("Mira [ver más](https://example.com)"),
        "<p>Mira <a href=\"https://example.com\" target=\"_blank\" \
         rel=\"noopener noreferrer\">ver más</a></p>"
    );
}

#[test]
fn crlf_recommendation_renders_every_block() {
    let blocks = parse(RECOMMENDATION);
    assert_eq!(
        blocks,
        vec![
            Block::Heading {
                level: 3,
                text: "🧾 Resumen de tu presupuesto".into()
            },
            Block::Paragraph {
                text: "Tu presupuesto prioriza **Comida** y *Metas*. Revisa el detalle abajo."
                    .into()
            },
            Block::Heading {
                level: 4,
                text: "💡 Sugerencias para mejorar".into()
            },
            Block::BulletList {
                items: vec![
                    "✅ Lleva almuerzo `2 veces` por semana".into(),
                    "🔥 Compara precios en [la guía](https://example.com/guia?a=1&b=2)".into(),
                ]
            },
            Block::Paragraph {
                text: "¡Vas muy bien! 🎯".into()
            },
        ]
    );

    assert_eq!(
        render(RECOMMENDATION),
        "<h3>🧾 Resumen de tu presupuesto</h3>\
         <p>Tu presupuesto prioriza <strong>Comida</strong> y <em>Metas</em>. Revisa el detalle abajo.</p>\
         <h4>💡 Sugerencias para mejorar</h4>\
         <ul><li>✅ Lleva almuerzo <code>2 veces</code> por semana</li>\
         <li>🔥 Compara precios en <a href=\"https://example.com/guia?a=1&amp;b=2\" \
         target=\"_blank\" rel=\"noopener noreferrer\">la guía</a></li></ul>\
         <p>¡Vas muy bien! 🎯</p>"
    );
}

#[test]
fn never_emits_script_tags() {
    let inputs = [
        "<script>alert(1)</script>",
        "# <script>alert(1)</script>",
        "- <script>alert(1)</script>",
        "**<script>**alert(1)",
        "[<script>](javascript:alert(1))",
        "`<script>`",
        "a\n<script>\nb",
        "<scr<script>ipt>",
    ];
    for input in inputs {
        let html = render(input);
        assert!(!html.contains("<script"), "{input:?} -> {html}");
        let html = markdown_to_sanitized_html(input);
        assert!(!html.contains("<script"), "{input:?} -> {html}");
    }
}

#[test]
fn malformed_markdown_degrades_to_text() {
    let inputs = [
        "**",
        "*",
        "`",
        "[",
        "](",
        "#",
        "#####",
        "- ",
        "* *",
        "\r\n\r\n",
        "\u{0}\u{feff}",
        "### ### ###",
    ];
    for input in inputs {
        let html = render(input);
        assert!(!html.contains('\n'), "{input:?} -> {html}");
    }
    assert_eq!(render("**sin cierre"), "<p>**sin cierre</p>");
    assert_eq!(render("####### siete"), "<p>####### siete</p>");
    assert_eq!(render("#sin espacio"), "<p>#sin espacio</p>");
}

/// Tags the subset renderer emits itself.
const OWN_TAGS: &[&str] = &[
    "<p>", "</p>", "<h1>", "</h1>", "<h2>", "</h2>", "<h3>", "</h3>", "<h4>", "</h4>", "<ul>",
    "</ul>", "<li>", "</li>", "<strong>", "</strong>", "<em>", "</em>", "<code>", "</code>",
    "</a>",
];

fn strip_own_tags(html: &str) -> String {
    let mut rest = html.to_string();
    for tag in OWN_TAGS {
        rest = rest.replace(tag, "");
    }
    // Opening anchors carry a fixed attribute tail after the href
    while let Some(start) = rest.find("<a href=\"") {
        let tail = "\" target=\"_blank\" rel=\"noopener noreferrer\">";
        let Some(len) = rest[start..].find(tail) else {
            break;
        };
        let href = &rest[start + "<a href=\"".len()..start + len];
        assert!(!href.contains(['<', '"']), "{html}");
        rest.replace_range(start..start + len + tail.len(), "");
    }
    rest
}

/// Every string over `alphabet` of at most `max_len` characters.
fn strings_up_to(alphabet: &[char], max_len: usize) -> Vec<String> {
    let mut all = vec![String::new()];
    let mut frontier = vec![String::new()];
    for _ in 0..max_len {
        frontier = frontier
            .iter()
            .flat_map(|prefix| {
                alphabet.iter().map(move |&ch| {
                    let mut next = prefix.clone();
                    next.push(ch);
                    next
                })
            })
            .collect();
        all.extend(frontier.iter().cloned());
    }
    all
}

fn assert_renders_safely(input: &str) {
    let html = render(input);
    assert!(!html.contains("<script"), "{input:?} -> {html}");
    assert!(!html.contains('\n'), "{input:?} -> {html}");
    let rest = strip_own_tags(&html);
    assert!(!rest.contains('<'), "{input:?} -> {html}");
}

const ALPHABET: [char; 12] = ['#', '*', '-', '`', '[', ']', '(', ')', '<', ' ', '\n', 'a'];

#[test]
fn every_short_input_renders_safely() {
    let inputs = strings_up_to(&ALPHABET, 4);
    assert_eq!(inputs.len(), 1 + 12 + 144 + 1728 + 20736);
    for input in &inputs {
        assert_renders_safely(input);
    }
}

#[test]
fn every_short_link_renders_safely() {
    let parts = strings_up_to(&ALPHABET, 2);
    for text in &parts {
        for url in &parts {
            assert_renders_safely(&format!("[{text}]({url})"));
        }
    }
}

#[test]
fn display_html_decision() {
    assert_eq!(to_display_html("<h3>ya</h3>"), "<h3>ya</h3>");
    assert_eq!(to_display_html("### ya"), "<h3>ya</h3>");
    assert_eq!(to_display_html("\n  <p>x</p>"), "\n  <p>x</p>");
}
