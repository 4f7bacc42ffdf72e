//! Renders a MathML tree as LaTeX.

use super::parse::{MathElement, MathNode};
use super::symbols::{
    font_command, is_big_operator, is_function_name, over_accent, symbol, under_accent,
};
use crate::Result;

/// Renders the top-level nodes of a formula.
pub(super) fn render_nodes(nodes: &[MathNode]) -> Result<String> {
    let mut latex = Latex::default();
    for node in nodes {
        latex.node(node)?;
    }
    Ok(latex.out.trim().to_owned())
}

#[derive(Default)]
struct Latex {
    out: String,
}

impl Latex {
    /// Appends `s`, separating it from a preceding control word.
    fn push(&mut self, s: &str) {
        if s.is_empty() {
            return;
        }
        if ends_with_control_word(&self.out) && s.starts_with(|c: char| c.is_ascii_alphabetic()) {
            self.out.push(' ');
        }
        self.out.push_str(s);
    }

    fn node(&mut self, node: &MathNode) -> Result<()> {
        match node {
            MathNode::Element(element) => self.element(element),
            MathNode::Text(text) => {
                self.push(&map_chars(text.trim()));
                Ok(())
            }
        }
    }

    fn children(&mut self, element: &MathElement) -> Result<()> {
        for child in &element.children {
            self.node(child)?;
        }
        Ok(())
    }

    fn element(&mut self, e: &MathElement) -> Result<()> {
        match e.name.as_str() {
            "mi" => self.push(&identifier(e)),
            "mn" => self.push(&number(e)),
            "mo" => self.push(&operator(e)),
            "mtext" => self.push(&text_command(&e.text())),
            "ms" => {
                let open = e.attr("lquote").unwrap_or("\"");
                let close = e.attr("rquote").unwrap_or("\"");
                self.push(&text_command(&format!("{open}{}{close}", e.text())));
            }
            "mspace" => self.push(space(e)),
            "semantics" | "maction" => {
                if let Some(first) = e.elements().next() {
                    self.element(first)?;
                }
            }
            "annotation" | "annotation-xml" | "none" | "mprescripts" => {}
            "mfrac" => self.push(&fraction(e)?),
            "msqrt" => self.push(&format!("\\sqrt{{{}}}", render_children(e)?)),
            "mroot" => {
                let [base, index] = arguments(e)?;
                self.push(&format!("\\sqrt[{}]{{{}}}", render(index)?, render(base)?));
            }
            "mfenced" => self.fenced(e)?,
            "menclose" => self.push(&enclose(e)?),
            "mphantom" => self.push(&format!("\\phantom{{{}}}", render_children(e)?)),
            "msub" | "msup" | "msubsup" => self.push(&scripts(e)?),
            "mover" | "munder" | "munderover" => self.push(&under_over(e)?),
            "mmultiscripts" => self.push(&multiscripts(e)?),
            "mtable" => self.push(&table(e)?),
            // math, mrow, mstyle, mpadded, merror and anything unknown
            _ => self.children(e)?,
        }
        Ok(())
    }

    fn fenced(&mut self, e: &MathElement) -> Result<()> {
        let open = e.attr("open").unwrap_or("(");
        let close = e.attr("close").unwrap_or(")");
        let separators: Vec<char> = e
            .attr("separators")
            .unwrap_or(",")
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect();

        self.push("\\left");
        self.push(&delimiter(open));
        for (index, child) in e.elements().enumerate() {
            if index > 0
                && let Some(&last) = separators.last()
            {
                let separator = separators.get(index - 1).copied().unwrap_or(last);
                self.push(&map_chars(&separator.to_string()));
            }
            self.element(child)?;
        }
        self.push("\\right");
        self.push(&delimiter(close));
        Ok(())
    }
}

fn render(e: &MathElement) -> Result<String> {
    let mut latex = Latex::default();
    latex.element(e)?;
    Ok(latex.out)
}

fn render_children(e: &MathElement) -> Result<String> {
    let mut latex = Latex::default();
    latex.children(e)?;
    Ok(latex.out)
}

/// The child elements of a layout element with fixed arity.
fn arguments<const N: usize>(e: &MathElement) -> Result<[&MathElement; N]> {
    let children: Vec<&MathElement> = e.elements().collect();
    children.try_into().map_err(|children: Vec<&MathElement>| {
        format!("`{}` expects {N} children, found {}", e.name, children.len()).into()
    })
}

fn ends_with_control_word(out: &str) -> bool {
    let letters = out.bytes().rev().take_while(u8::is_ascii_alphabetic).count();
    letters > 0 && out[..out.len() - letters].ends_with('\\')
}

/// Wraps a script or base in braces unless it is a single token.
fn group(latex: String) -> String {
    let mut chars = latex.chars();
    let single_char = chars.next().is_some() && chars.next().is_none();
    let control_word = latex.len() > 1
        && latex.starts_with('\\')
        && latex[1..].bytes().all(|b| b.is_ascii_alphabetic());
    if single_char || control_word {
        latex
    } else {
        format!("{{{latex}}}")
    }
}

fn map_chars(text: &str) -> String {
    let mut latex = Latex::default();
    let mut buf = [0; 4];
    for ch in text.chars() {
        match symbol(ch) {
            Some(command) => latex.push(command),
            None => latex.push(ch.encode_utf8(&mut buf)),
        }
    }
    latex.out
}

fn with_font(e: &MathElement, body: String) -> String {
    match e.attr("mathvariant").and_then(font_command) {
        Some(font) => format!("{font}{{{body}}}"),
        None => body,
    }
}

fn identifier(e: &MathElement) -> String {
    let text = e.text();
    let text = text.trim();
    if text.chars().count() > 1 {
        if is_function_name(text) && e.attr("mathvariant").is_none() {
            return format!("\\{text}");
        }
        let font = e.attr("mathvariant").and_then(font_command).unwrap_or("\\mathrm");
        return format!("{font}{{{}}}", map_chars(text));
    }
    with_font(e, map_chars(text))
}

fn number(e: &MathElement) -> String {
    with_font(e, map_chars(e.text().trim()))
}

fn operator(e: &MathElement) -> String {
    let text = e.text();
    let text = text.trim();
    if is_function_name(text) {
        format!("\\{text}")
    } else {
        map_chars(text)
    }
}

fn text_command(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }
    if text.trim().is_empty() {
        return "\\ ".into();
    }
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '\\' => escaped.push_str("\\textbackslash{}"),
            '{' | '}' | '#' | '$' | '%' | '&' | '_' => {
                escaped.push('\\');
                escaped.push(ch);
            }
            '^' => escaped.push_str("\\^{}"),
            '~' => escaped.push_str("\\~{}"),
            _ => escaped.push(ch),
        }
    }
    format!("\\text{{{escaped}}}")
}

fn space(e: &MathElement) -> &'static str {
    if e.attr("linebreak") == Some("newline") {
        return "\\\\";
    }
    let width = e
        .attr("width")
        .and_then(|width| width.trim().strip_suffix("em"))
        .and_then(|em| em.trim().parse::<f32>().ok());
    match width {
        Some(w) if w >= 2.0 => "\\qquad",
        Some(w) if w >= 1.0 => "\\quad",
        Some(w) if w >= 0.27 => "\\;",
        Some(w) if w >= 0.22 => "\\:",
        Some(w) if w > 0.0 => "\\,",
        Some(w) if w < 0.0 => "\\!",
        _ => "\\ ",
    }
}

fn delimiter(fence: &str) -> String {
    match fence.trim() {
        "" => ".".into(),
        fence => map_chars(fence),
    }
}

fn fraction(e: &MathElement) -> Result<String> {
    let [numerator, denominator] = arguments(e)?;
    let (numerator, denominator) = (render(numerator)?, render(denominator)?);
    let thickness = e.attr("linethickness").map(str::trim);
    let zero_thickness = thickness.is_some_and(|t| {
        t.trim_end_matches(char::is_alphabetic)
            .parse::<f32>()
            .is_ok_and(|t| t == 0.0)
    });
    if zero_thickness {
        return Ok(format!("\\genfrac{{}}{{}}{{0pt}}{{}}{{{numerator}}}{{{denominator}}}"));
    }
    if e.attr("bevelled") == Some("true") {
        return Ok(format!("{}/{}", group(numerator), group(denominator)));
    }
    Ok(format!("\\frac{{{numerator}}}{{{denominator}}}"))
}

fn enclose(e: &MathElement) -> Result<String> {
    let body = render_children(e)?;
    let notation = e.attr("notation").unwrap_or("longdiv");
    let command = notation
        .split_whitespace()
        .find_map(|notation| match notation {
            "box" | "roundedbox" | "circle" => Some("\\boxed"),
            "updiagonalstrike" => Some("\\cancel"),
            "downdiagonalstrike" => Some("\\bcancel"),
            "top" => Some("\\overline"),
            "bottom" => Some("\\underline"),
            "radical" => Some("\\sqrt"),
            _ => None,
        });
    Ok(match command {
        Some(command) => format!("{command}{{{body}}}"),
        None => body,
    })
}

fn scripts(e: &MathElement) -> Result<String> {
    let (base, sub, sup) = match e.name.as_str() {
        "msub" => {
            let [base, sub] = arguments(e)?;
            (base, Some(sub), None)
        }
        "msup" => {
            let [base, sup] = arguments(e)?;
            (base, None, Some(sup))
        }
        _ => {
            let [base, sub, sup] = arguments(e)?;
            (base, Some(sub), Some(sup))
        }
    };
    let mut latex = group(render(base)?);
    attach_scripts(&mut latex, sub, sup)?;
    Ok(latex)
}

fn attach_scripts(
    latex: &mut String,
    sub: Option<&MathElement>,
    sup: Option<&MathElement>,
) -> Result<()> {
    if let Some(sub) = sub.filter(|sub| sub.name != "none") {
        latex.push('_');
        latex.push_str(&group(render(sub)?));
    }
    if let Some(sup) = sup.filter(|sup| sup.name != "none") {
        latex.push('^');
        latex.push_str(&group(render(sup)?));
    }
    Ok(())
}

/// The single character of a token element, if it has exactly one.
fn single_char(e: &MathElement) -> Option<char> {
    let text = e.text();
    let mut chars = text.trim().chars();
    match (chars.next(), chars.next()) {
        (Some(ch), None) => Some(ch),
        _ => None,
    }
}

fn under_over(e: &MathElement) -> Result<String> {
    let (base, under, over) = match e.name.as_str() {
        "mover" => {
            let [base, over] = arguments(e)?;
            (base, None, Some(over))
        }
        "munder" => {
            let [base, under] = arguments(e)?;
            (base, Some(under), None)
        }
        _ => {
            let [base, under, over] = arguments(e)?;
            (base, Some(under), Some(over))
        }
    };

    let is_token = matches!(base.name.as_str(), "mo" | "mi");
    if is_token && is_big_operator(base.text().trim()) {
        let mut latex = render(base)?;
        attach_scripts(&mut latex, under, over)?;
        return Ok(latex);
    }

    let mut latex = render(base)?;
    if let Some(under) = under {
        latex = match single_char(under).and_then(under_accent) {
            Some(accent) => format!("{accent}{{{latex}}}"),
            None => format!("\\underset{{{}}}{{{latex}}}", render(under)?),
        };
    }
    if let Some(over) = over {
        latex = match single_char(over).and_then(over_accent) {
            Some(accent) => format!("{accent}{{{latex}}}"),
            None => format!("\\overset{{{}}}{{{latex}}}", render(over)?),
        };
    }
    Ok(latex)
}

fn multiscripts(e: &MathElement) -> Result<String> {
    let mut children = e.elements();
    let base = children
        .next()
        .ok_or("`mmultiscripts` expects a base")?;

    let mut post = Vec::new();
    let mut pre = Vec::new();
    let mut in_prescripts = false;
    for child in children {
        if child.name == "mprescripts" {
            in_prescripts = true;
        } else if in_prescripts {
            pre.push(child);
        } else {
            post.push(child);
        }
    }

    let mut latex = String::new();
    for pair in pre.chunks(2) {
        latex.push_str("{}");
        attach_scripts(&mut latex, pair.first().copied(), pair.get(1).copied())?;
    }
    latex.push_str(&group(render(base)?));
    for pair in post.chunks(2) {
        attach_scripts(&mut latex, pair.first().copied(), pair.get(1).copied())?;
    }
    Ok(latex)
}

fn table(e: &MathElement) -> Result<String> {
    let mut rows = Vec::new();
    for row in e.elements() {
        let cells = match row.name.as_str() {
            "mtr" => row.elements().collect::<Vec<_>>(),
            // The first cell of a labeled row is its label.
            "mlabeledtr" => row.elements().skip(1).collect(),
            _ => continue,
        };
        let cells = cells
            .into_iter()
            .map(render_children)
            .collect::<Result<Vec<_>>>()?;
        rows.push(cells.join(" & "));
    }
    Ok(format!("\\begin{{matrix}}{}\\end{{matrix}}", rows.join(" \\\\ ")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::parse::parse;

    fn latex(source: &str) -> String {
        render_nodes(&parse(source).unwrap()).unwrap()
    }

    #[test]
    fn tokens() {
        assert_eq!(latex("<math><mi>x</mi><mo>+</mo><mn>1</mn></math>"), "x+1");
        assert_eq!(latex("<math><mi>α</mi><mi>x</mi></math>"), "\\alpha x");
        assert_eq!(latex("<math><mi>sin</mi><mi>x</mi></math>"), "\\sin x");
        assert_eq!(latex("<math><mi>abc</mi></math>"), "\\mathrm{abc}");
        assert_eq!(latex("<math><mo>≤</mo></math>"), "\\leq");
    }

    #[test]
    fn mathvariant_selects_font() {
        assert_eq!(
            latex(r#"<math><mi mathvariant="double-struck">R</mi></math>"#),
            "\\mathbb{R}"
        );
        assert_eq!(latex(r#"<math><mi mathvariant="bold">v</mi></math>"#), "\\mathbf{v}");
    }

    #[test]
    fn text_is_escaped() {
        assert_eq!(latex("<math><mtext>a_b &amp; c</mtext></math>"), "\\text{a\\_b \\& c}");
    }

    #[test]
    fn fractions_and_roots() {
        assert_eq!(
            latex("<math><mfrac><mi>a</mi><mi>b</mi></mfrac></math>"),
            "\\frac{a}{b}"
        );
        assert_eq!(
            latex("<math><msqrt><mi>x</mi><mo>+</mo><mn>1</mn></msqrt></math>"),
            "\\sqrt{x+1}"
        );
        assert_eq!(
            latex("<math><mroot><mi>x</mi><mn>3</mn></mroot></math>"),
            "\\sqrt[3]{x}"
        );
        assert_eq!(
            latex(r#"<math><mfrac linethickness="0"><mi>n</mi><mi>k</mi></mfrac></math>"#),
            "\\genfrac{}{}{0pt}{}{n}{k}"
        );
    }

    #[test]
    fn scripts_group_multi_token_arguments() {
        assert_eq!(latex("<math><msup><mi>x</mi><mn>2</mn></msup></math>"), "x^2");
        assert_eq!(
            latex("<math><msubsup><mi>x</mi><mi>i</mi><mn>10</mn></msubsup></math>"),
            "x_i^{10}"
        );
        assert_eq!(
            latex("<math><msub><mi>α</mi><mrow><mi>i</mi><mi>j</mi></mrow></msub></math>"),
            "\\alpha_{ij}"
        );
    }

    #[test]
    fn big_operators_take_limits() {
        assert_eq!(
            latex(
                "<math><munderover><mo>∑</mo><mrow><mi>i</mi><mo>=</mo><mn>1</mn></mrow>\
                 <mi>n</mi></munderover><mi>i</mi></math>"
            ),
            "\\sum_{i=1}^ni"
        );
        assert_eq!(
            latex("<math><munder><mo>lim</mo><mrow><mi>x</mi><mo>→</mo><mn>0</mn></mrow></munder></math>"),
            "\\lim_{x\\rightarrow0}"
        );
    }

    #[test]
    fn accents() {
        assert_eq!(
            latex(r#"<math><mover accent="true"><mi>x</mi><mo>^</mo></mover></math>"#),
            "\\hat{x}"
        );
        assert_eq!(
            latex("<math><munder><mrow><mi>a</mi><mi>b</mi></mrow><mo>⏟</mo></munder></math>"),
            "\\underbrace{ab}"
        );
        assert_eq!(
            latex("<math><mover><mi>x</mi><mi>y</mi></mover></math>"),
            "\\overset{y}{x}"
        );
    }

    #[test]
    fn fences() {
        assert_eq!(
            latex("<math><mfenced><mi>a</mi><mi>b</mi></mfenced></math>"),
            "\\left(a,b\\right)"
        );
        assert_eq!(
            latex(r#"<math><mfenced open="{" close=""><mi>x</mi></mfenced></math>"#),
            "\\left\\{x\\right."
        );
    }

    #[test]
    fn tables_become_matrices() {
        assert_eq!(
            latex(
                "<math><mtable><mtr><mtd><mn>1</mn></mtd><mtd><mn>0</mn></mtd></mtr>\
                 <mtr><mtd><mn>0</mn></mtd><mtd><mn>1</mn></mtd></mtr></mtable></math>"
            ),
            "\\begin{matrix}1 & 0 \\\\ 0 & 1\\end{matrix}"
        );
    }

    #[test]
    fn semantics_renders_presentation_only() {
        assert_eq!(
            latex(
                r#"<math><semantics><mi>x</mi><annotation encoding="TeX">x</annotation></semantics></math>"#
            ),
            "x"
        );
    }

    #[test]
    fn enclosures_and_spaces() {
        assert_eq!(
            latex(r#"<math><menclose notation="box"><mi>x</mi></menclose></math>"#),
            "\\boxed{x}"
        );
        assert_eq!(
            latex(r#"<math><mi>a</mi><mspace width="1em"/><mi>b</mi></math>"#),
            "a\\quad b"
        );
    }

    #[test]
    fn wrong_arity_is_an_error() {
        assert!(render_nodes(&parse("<math><mfrac><mi>a</mi></mfrac></math>").unwrap()).is_err());
    }
}
