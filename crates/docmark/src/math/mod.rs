//! MathML to LaTeX conversion for the Markdown writer.

mod latex;
mod parse;
mod symbols;

use self::parse::MathNode;
use crate::Result;

/// A formula converted to LaTeX.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Formula {
    /// The LaTeX source, without delimiters.
    pub latex: String,
    /// Whether the formula sits inside a line of text.
    pub inline: bool,
}

/// Converts a MathML formula to LaTeX.
///
/// The formula is inline when its root `math` element is marked
/// `display="inline"`, and a block otherwise.
pub fn mathml_to_latex(source: &str) -> Result<Formula> {
    let nodes = parse::parse(source)?;
    let root = nodes
        .iter()
        .find_map(MathNode::as_element)
        .ok_or("no MathML element found")?;
    let inline = root.name == "math" && root.attr("display") == Some("inline");
    Ok(Formula {
        latex: latex::render_nodes(&nodes)?,
        inline,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_attribute_selects_inline() {
        let formula =
            mathml_to_latex(r#"<math display="inline"><msup><mi>e</mi><mi>x</mi></msup></math>"#)
                .unwrap();
        assert_eq!(
            formula,
            Formula {
                latex: "e^x".into(),
                inline: true
            }
        );

        let formula = mathml_to_latex(r#"<math display="block"><mi>y</mi></math>"#).unwrap();
        assert!(!formula.inline);
        assert!(!mathml_to_latex("<math><mi>y</mi></math>").unwrap().inline);
    }

    #[test]
    fn empty_source_is_an_error() {
        assert!(mathml_to_latex("").is_err());
        assert!(mathml_to_latex("just text").is_err());
    }

    #[test]
    fn quadratic_formula() {
        let formula = mathml_to_latex(
            r#"<math xmlns="http://www.w3.org/1998/Math/MathML">
  <mi>x</mi><mo>=</mo>
  <mfrac>
    <mrow><mo>-</mo><mi>b</mi><mo>±</mo><msqrt><msup><mi>b</mi><mn>2</mn></msup><mo>-</mo><mn>4</mn><mi>a</mi><mi>c</mi></msqrt></mrow>
    <mrow><mn>2</mn><mi>a</mi></mrow>
  </mfrac>
</math>"#,
        )
        .unwrap();
        insta::assert_snapshot!(formula.latex, @r"x=\frac{-b\pm\sqrt{b^2-4ac}}{2a}");
    }
}
