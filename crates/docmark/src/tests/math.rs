use super::*;

fn formula(mathml: &str) -> Element {
    Element::document(vec![Paragraph::new(vec![Element::math(mathml)]).into()])
}

#[test]
fn inline_formula() {
    let document = formula(r#"<math display="inline"><mi>x</mi><mo>+</mo><mn>1</mn></math>"#);
    assert_eq!(md(&document), "\n\n$x+1$\n\n");
}

#[test]
fn block_formula_is_its_own_paragraph() {
    let document = formula("<math><msup><mi>x</mi><mn>2</mn></msup></math>");
    assert_eq!(md(&document), "\n\n$$x^2$$\n\n\n\n");
}

#[test]
fn html_keeps_mathml() {
    let mathml = r#"<math display="inline"><mi>x</mi></math>"#;
    assert_eq!(html(&formula(mathml)), format!("<p>{mathml}</p>"));
}

#[test]
fn malformed_formula_falls_back_to_text() {
    let document = formula("<math><mi>x</math>");
    let conversion = conv(ConvertOptions::default(), &document, Format::Markdown);
    assert_eq!(conversion.output, "\n\n<math><mi>x</math>\n\n");
    assert!(conversion.warnings.is_empty());
}

#[test]
fn fraction_in_text() {
    let document = Element::document(vec![
        Paragraph::new(vec![
            Element::text("half is "),
            Element::math(
                r#"<math display="inline"><mfrac><mn>1</mn><mn>2</mn></mfrac></math>"#,
            ),
        ])
        .into(),
    ]);
    insta::assert_snapshot!(md(&document).trim(), @r"half is $\frac{1}{2}$");
}
