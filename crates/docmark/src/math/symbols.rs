//! Lookup tables from MathML characters to LaTeX.

/// The LaTeX command for a character that is not typed as itself.
///
/// Invisible operators map to the empty string.
pub(super) fn symbol(ch: char) -> Option<&'static str> {
    Some(match ch {
        // Lowercase Greek
        'α' => "\\alpha",
        'β' => "\\beta",
        'γ' => "\\gamma",
        'δ' => "\\delta",
        'ε' => "\\varepsilon",
        'ϵ' => "\\epsilon",
        'ζ' => "\\zeta",
        'η' => "\\eta",
        'θ' => "\\theta",
        'ϑ' => "\\vartheta",
        'ι' => "\\iota",
        'κ' => "\\kappa",
        'λ' => "\\lambda",
        'μ' => "\\mu",
        'ν' => "\\nu",
        'ξ' => "\\xi",
        'ο' => "o",
        'π' => "\\pi",
        'ϖ' => "\\varpi",
        'ρ' => "\\rho",
        'ϱ' => "\\varrho",
        'σ' => "\\sigma",
        'ς' => "\\varsigma",
        'τ' => "\\tau",
        'υ' => "\\upsilon",
        'φ' => "\\varphi",
        'ϕ' => "\\phi",
        'χ' => "\\chi",
        'ψ' => "\\psi",
        'ω' => "\\omega",

        // Uppercase Greek without a Latin twin
        'Γ' => "\\Gamma",
        'Δ' => "\\Delta",
        'Θ' => "\\Theta",
        'Λ' => "\\Lambda",
        'Ξ' => "\\Xi",
        'Π' => "\\Pi",
        'Σ' => "\\Sigma",
        'Υ' => "\\Upsilon",
        'Φ' => "\\Phi",
        'Ψ' => "\\Psi",
        'Ω' => "\\Omega",

        // Letter-like
        'ℏ' => "\\hbar",
        'ℓ' => "\\ell",
        'ℵ' => "\\aleph",
        '℘' => "\\wp",
        'ℜ' => "\\Re",
        'ℑ' => "\\Im",
        'ℝ' => "\\mathbb{R}",
        'ℕ' => "\\mathbb{N}",
        'ℤ' => "\\mathbb{Z}",
        'ℚ' => "\\mathbb{Q}",
        'ℂ' => "\\mathbb{C}",
        '∂' => "\\partial",
        '∇' => "\\nabla",
        '∞' => "\\infty",
        '∅' => "\\emptyset",
        '′' => "'",
        '″' => "''",
        '°' => "^{\\circ}",

        // Binary operators
        '±' => "\\pm",
        '∓' => "\\mp",
        '×' => "\\times",
        '÷' => "\\div",
        '·' | '⋅' => "\\cdot",
        '∗' => "\\ast",
        '∘' => "\\circ",
        '∙' => "\\bullet",
        '⊕' => "\\oplus",
        '⊖' => "\\ominus",
        '⊗' => "\\otimes",
        '⊙' => "\\odot",
        '∪' => "\\cup",
        '∩' => "\\cap",
        '∧' => "\\wedge",
        '∨' => "\\vee",
        '∖' => "\\setminus",
        '−' => "-",

        // Relations
        '≤' | '⩽' => "\\leq",
        '≥' | '⩾' => "\\geq",
        '≠' => "\\neq",
        '≈' => "\\approx",
        '≡' => "\\equiv",
        '∼' => "\\sim",
        '≃' => "\\simeq",
        '≅' => "\\cong",
        '∝' => "\\propto",
        '≪' => "\\ll",
        '≫' => "\\gg",
        '∈' => "\\in",
        '∉' => "\\notin",
        '∋' => "\\ni",
        '⊂' => "\\subset",
        '⊃' => "\\supset",
        '⊆' => "\\subseteq",
        '⊇' => "\\supseteq",
        '⊥' => "\\perp",
        '∥' => "\\parallel",
        '∣' => "\\mid",
        '≺' => "\\prec",
        '≻' => "\\succ",

        // Logic
        '∀' => "\\forall",
        '∃' => "\\exists",
        '∄' => "\\nexists",
        '¬' => "\\neg",
        '∴' => "\\therefore",
        '∵' => "\\because",

        // Arrows
        '→' => "\\rightarrow",
        '←' => "\\leftarrow",
        '↔' => "\\leftrightarrow",
        '⇒' => "\\Rightarrow",
        '⇐' => "\\Leftarrow",
        '⇔' => "\\Leftrightarrow",
        '↦' => "\\mapsto",
        '↑' => "\\uparrow",
        '↓' => "\\downarrow",
        '⟶' => "\\longrightarrow",
        '⟵' => "\\longleftarrow",

        // Large operators
        '∑' => "\\sum",
        '∏' => "\\prod",
        '∐' => "\\coprod",
        '∫' => "\\int",
        '∬' => "\\iint",
        '∭' => "\\iiint",
        '∮' => "\\oint",
        '⋃' => "\\bigcup",
        '⋂' => "\\bigcap",
        '⋀' => "\\bigwedge",
        '⋁' => "\\bigvee",
        '⨁' => "\\bigoplus",
        '⨂' => "\\bigotimes",

        // Dots
        '…' => "\\ldots",
        '⋯' => "\\cdots",
        '⋮' => "\\vdots",
        '⋱' => "\\ddots",

        // Delimiters
        '⟨' | '〈' => "\\langle",
        '⟩' | '〉' => "\\rangle",
        '⌊' => "\\lfloor",
        '⌋' => "\\rfloor",
        '⌈' => "\\lceil",
        '⌉' => "\\rceil",
        '‖' => "\\|",
        '{' => "\\{",
        '}' => "\\}",

        '√' => "\\surd",
        '∠' => "\\angle",
        '△' => "\\triangle",

        // Characters special to LaTeX
        '#' => "\\#",
        '%' => "\\%",
        '&' => "\\&",
        '$' => "\\$",
        '_' => "\\_",
        '\\' => "\\backslash",
        '~' => "\\sim",
        '\u{a0}' => "~",

        // Function application, invisible times, separator and plus
        '\u{2061}' | '\u{2062}' | '\u{2063}' | '\u{2064}' => "",
        _ => return None,
    })
}

/// Whether `name` is typeset with a predefined LaTeX operator command.
pub(super) fn is_function_name(name: &str) -> bool {
    matches!(
        name,
        "sin"
            | "cos"
            | "tan"
            | "cot"
            | "sec"
            | "csc"
            | "arcsin"
            | "arccos"
            | "arctan"
            | "sinh"
            | "cosh"
            | "tanh"
            | "coth"
            | "log"
            | "ln"
            | "lg"
            | "exp"
            | "lim"
            | "limsup"
            | "liminf"
            | "max"
            | "min"
            | "sup"
            | "inf"
            | "det"
            | "dim"
            | "ker"
            | "deg"
            | "gcd"
            | "arg"
            | "hom"
            | "Pr"
    )
}

/// Whether an operator takes its limits above and below.
pub(super) fn is_big_operator(text: &str) -> bool {
    let mut chars = text.chars();
    match (chars.next(), chars.next()) {
        (Some(ch), None) => "∑∏∐∫∬∭∮⋃⋂⋀⋁⨁⨂".contains(ch),
        _ => matches!(text, "lim" | "limsup" | "liminf" | "max" | "min" | "sup" | "inf"),
    }
}

/// The accent command for a character placed over a base.
pub(super) fn over_accent(ch: char) -> Option<&'static str> {
    Some(match ch {
        '^' | 'ˆ' | '\u{302}' => "\\hat",
        '~' | '˜' | '\u{303}' => "\\tilde",
        '¯' | '‾' | '\u{304}' | '\u{305}' => "\\overline",
        '\u{20d7}' => "\\vec",
        '→' => "\\overrightarrow",
        '←' => "\\overleftarrow",
        '↔' => "\\overleftrightarrow",
        '˙' | '.' | '\u{307}' => "\\dot",
        '¨' | '\u{308}' => "\\ddot",
        'ˇ' | '\u{30c}' => "\\check",
        '´' | '\u{301}' => "\\acute",
        '`' | '\u{300}' => "\\grave",
        '˘' | '\u{306}' => "\\breve",
        '⏞' => "\\overbrace",
        _ => return None,
    })
}

/// The accent command for a character placed under a base.
pub(super) fn under_accent(ch: char) -> Option<&'static str> {
    Some(match ch {
        '_' | '¯' | '‾' | '\u{332}' => "\\underline",
        '⏟' => "\\underbrace",
        _ => return None,
    })
}

/// The font command for a `mathvariant` value.
pub(super) fn font_command(variant: &str) -> Option<&'static str> {
    Some(match variant {
        "normal" => "\\mathrm",
        "bold" => "\\mathbf",
        "italic" => "\\mathit",
        "bold-italic" => "\\boldsymbol",
        "double-struck" => "\\mathbb",
        "script" | "bold-script" => "\\mathcal",
        "fraktur" | "bold-fraktur" => "\\mathfrak",
        "sans-serif" => "\\mathsf",
        "monospace" => "\\mathtt",
        _ => return None,
    })
}

/// Named entities common in MathML beyond the XML predefined ones.
pub(super) fn named_entity(name: &str) -> Option<&'static str> {
    Some(match name {
        "nbsp" => "\u{a0}",
        "ApplyFunction" | "af" => "\u{2061}",
        "InvisibleTimes" | "it" => "\u{2062}",
        "InvisibleComma" | "ic" => "\u{2063}",
        "times" => "×",
        "minus" => "−",
        "PlusMinus" | "plusmn" => "±",
        "infin" => "∞",
        "le" => "≤",
        "ge" => "≥",
        "ne" => "≠",
        "sum" => "∑",
        "int" => "∫",
        "rarr" => "→",
        "larr" => "←",
        "alpha" => "α",
        "beta" => "β",
        "gamma" => "γ",
        "delta" => "δ",
        "theta" => "θ",
        "lambda" => "λ",
        "mu" => "μ",
        "pi" => "π",
        "sigma" => "σ",
        "phi" => "φ",
        "omega" => "ω",
        _ => return None,
    })
}
