//! Tolerant LaTeX-to-readable-text conversion.
//!
//! Turns formula markup into plain Unicode text: symbol commands become
//! glyphs, fractions flatten to `a/b`, scripts use super/subscript
//! characters where the alphabet allows. The converter is total: malformed
//! input degrades to its readable pieces, unknown commands degrade to their
//! argument or bare name, and nothing here returns an error.

pub fn latex_to_text(input: &str) -> String {
    let chars: Vec<char> = input.chars().collect();
    let mut pos = 0;
    convert_until(&chars, &mut pos, None)
}

fn convert_until(chars: &[char], pos: &mut usize, stop: Option<char>) -> String {
    let mut out = String::new();
    while *pos < chars.len() {
        if stop == Some(chars[*pos]) {
            break;
        }
        match chars[*pos] {
            '^' => {
                *pos += 1;
                let arg = convert_atom(chars, pos);
                out.push_str(&raise_script(&arg, superscript_char, '^'));
            }
            '_' => {
                *pos += 1;
                let arg = convert_atom(chars, pos);
                out.push_str(&raise_script(&arg, subscript_char, '_'));
            }
            '~' => {
                *pos += 1;
                out.push(' ');
            }
            _ => {
                let piece = convert_atom(chars, pos);
                out.push_str(&piece);
            }
        }
    }
    out
}

/// One formula atom: a brace group, a command, or a single character.
fn convert_atom(chars: &[char], pos: &mut usize) -> String {
    if *pos >= chars.len() {
        return String::new();
    }
    match chars[*pos] {
        '{' => {
            *pos += 1;
            let inner = convert_until(chars, pos, Some('}'));
            if *pos < chars.len() {
                *pos += 1;
            }
            inner
        }
        '}' => {
            // Stray close brace from malformed input.
            *pos += 1;
            String::new()
        }
        '\\' => convert_command(chars, pos),
        ch => {
            *pos += 1;
            ch.to_string()
        }
    }
}

fn convert_command(chars: &[char], pos: &mut usize) -> String {
    *pos += 1;
    let Some(&first) = chars.get(*pos) else {
        return String::new();
    };

    if !first.is_ascii_alphabetic() {
        *pos += 1;
        return match first {
            '\\' => "\n".to_string(),
            '{' | '}' | '$' | '%' | '&' | '#' | '_' => first.to_string(),
            ' ' | ',' | ';' | ':' => " ".to_string(),
            '!' | '[' | ']' | '(' | ')' => String::new(),
            other => other.to_string(),
        };
    }

    let start = *pos;
    while *pos < chars.len() && chars[*pos].is_ascii_alphabetic() {
        *pos += 1;
    }
    let name: String = chars[start..*pos].iter().collect();
    if chars.get(*pos) == Some(&'*') {
        *pos += 1;
    }

    match name.as_str() {
        "frac" | "dfrac" | "tfrac" => {
            let numerator = read_arg(chars, pos);
            let denominator = read_arg(chars, pos);
            format!("{}/{}", operand(&numerator), operand(&denominator))
        }
        "sqrt" => {
            let index = read_optional(chars, pos);
            let radicand = read_arg(chars, pos);
            let root = index
                .map(|index| raise_script(&index, superscript_char, '^'))
                .unwrap_or_default();
            format!("{root}√{}", operand(&radicand))
        }
        "text" | "textrm" | "textbf" | "textit" | "texttt" | "emph" | "mathrm" | "mathbf"
        | "mathit" | "mathsf" | "mathtt" | "mathbb" | "mathcal" | "mathfrak" | "boldsymbol"
        | "bm" | "operatorname" | "boxed" => read_arg(chars, pos),
        "hat" | "widehat" => decorate(read_arg(chars, pos), '\u{302}'),
        "bar" | "overline" => decorate(read_arg(chars, pos), '\u{304}'),
        "vec" => decorate(read_arg(chars, pos), '\u{20d7}'),
        "tilde" | "widetilde" => decorate(read_arg(chars, pos), '\u{303}'),
        "dot" => decorate(read_arg(chars, pos), '\u{307}'),
        "underline" => read_arg(chars, pos),
        "begin" | "end" => {
            let _environment = read_arg(chars, pos);
            String::new()
        }
        "left" | "right" => {
            // Sizing commands vanish; their delimiter renders itself. The
            // invisible "." delimiter is consumed outright.
            if chars.get(*pos) == Some(&'.') {
                *pos += 1;
            }
            String::new()
        }
        _ => {
            if let Some(glyph) = symbol(&name) {
                return glyph.to_string();
            }
            // Unknown command: unwrap its argument if one follows, otherwise
            // keep the bare name readable.
            if chars.get(*pos) == Some(&'{') {
                read_arg(chars, pos)
            } else {
                name
            }
        }
    }
}

fn read_arg(chars: &[char], pos: &mut usize) -> String {
    while chars.get(*pos) == Some(&' ') {
        *pos += 1;
    }
    convert_atom(chars, pos)
}

fn read_optional(chars: &[char], pos: &mut usize) -> Option<String> {
    if chars.get(*pos) != Some(&'[') {
        return None;
    }
    *pos += 1;
    let inner = convert_until(chars, pos, Some(']'));
    if *pos < chars.len() {
        *pos += 1;
    }
    Some(inner)
}

/// Parenthesizes a fraction or root operand unless it reads as one unit.
fn operand(text: &str) -> String {
    let simple = !text.is_empty() && text.chars().all(char::is_alphanumeric);
    if simple || text.chars().count() <= 1 {
        text.to_string()
    } else {
        format!("({text})")
    }
}

fn decorate(base: String, combining: char) -> String {
    if base.chars().count() == 1 {
        let mut decorated = base;
        decorated.push(combining);
        decorated
    } else {
        base
    }
}

fn raise_script(arg: &str, map: fn(char) -> Option<char>, marker: char) -> String {
    let mapped: Option<String> = arg.chars().map(map).collect();
    match mapped {
        Some(script) if !script.is_empty() => script,
        _ => {
            if arg.chars().count() <= 1 {
                format!("{marker}{arg}")
            } else {
                format!("{marker}({arg})")
            }
        }
    }
}

fn superscript_char(ch: char) -> Option<char> {
    Some(match ch {
        '0' => '⁰',
        '1' => '¹',
        '2' => '²',
        '3' => '³',
        '4' => '⁴',
        '5' => '⁵',
        '6' => '⁶',
        '7' => '⁷',
        '8' => '⁸',
        '9' => '⁹',
        '+' => '⁺',
        '-' => '⁻',
        '=' => '⁼',
        '(' => '⁽',
        ')' => '⁾',
        'n' => 'ⁿ',
        'i' => 'ⁱ',
        _ => return None,
    })
}

fn subscript_char(ch: char) -> Option<char> {
    Some(match ch {
        '0' => '₀',
        '1' => '₁',
        '2' => '₂',
        '3' => '₃',
        '4' => '₄',
        '5' => '₅',
        '6' => '₆',
        '7' => '₇',
        '8' => '₈',
        '9' => '₉',
        '+' => '₊',
        '-' => '₋',
        '=' => '₌',
        '(' => '₍',
        ')' => '₎',
        'a' => 'ₐ',
        'e' => 'ₑ',
        'h' => 'ₕ',
        'i' => 'ᵢ',
        'j' => 'ⱼ',
        'k' => 'ₖ',
        'l' => 'ₗ',
        'm' => 'ₘ',
        'n' => 'ₙ',
        'o' => 'ₒ',
        'p' => 'ₚ',
        'r' => 'ᵣ',
        's' => 'ₛ',
        't' => 'ₜ',
        'u' => 'ᵤ',
        'v' => 'ᵥ',
        'x' => 'ₓ',
        _ => return None,
    })
}

fn symbol(name: &str) -> Option<&'static str> {
    let glyph = match name {
        "alpha" => "α",
        "beta" => "β",
        "gamma" => "γ",
        "delta" => "δ",
        "epsilon" | "varepsilon" => "ε",
        "zeta" => "ζ",
        "eta" => "η",
        "theta" | "vartheta" => "θ",
        "iota" => "ι",
        "kappa" => "κ",
        "lambda" => "λ",
        "mu" => "μ",
        "nu" => "ν",
        "xi" => "ξ",
        "pi" => "π",
        "rho" | "varrho" => "ρ",
        "sigma" => "σ",
        "tau" => "τ",
        "upsilon" => "υ",
        "phi" | "varphi" => "φ",
        "chi" => "χ",
        "psi" => "ψ",
        "omega" => "ω",
        "Gamma" => "Γ",
        "Delta" => "Δ",
        "Theta" => "Θ",
        "Lambda" => "Λ",
        "Xi" => "Ξ",
        "Pi" => "Π",
        "Sigma" => "Σ",
        "Upsilon" => "Υ",
        "Phi" => "Φ",
        "Psi" => "Ψ",
        "Omega" => "Ω",
        "times" => "×",
        "div" => "÷",
        "pm" => "±",
        "mp" => "∓",
        "cdot" => "·",
        "ast" => "∗",
        "infty" => "∞",
        "leq" | "le" => "≤",
        "geq" | "ge" => "≥",
        "neq" | "ne" => "≠",
        "approx" => "≈",
        "equiv" => "≡",
        "sim" => "∼",
        "simeq" => "≃",
        "propto" => "∝",
        "to" | "rightarrow" => "→",
        "leftarrow" | "gets" => "←",
        "leftrightarrow" => "↔",
        "Rightarrow" | "implies" => "⇒",
        "Leftarrow" => "⇐",
        "Leftrightarrow" | "iff" => "⇔",
        "mapsto" => "↦",
        "uparrow" => "↑",
        "downarrow" => "↓",
        "sum" => "∑",
        "prod" => "∏",
        "int" => "∫",
        "oint" => "∮",
        "partial" => "∂",
        "nabla" => "∇",
        "in" => "∈",
        "notin" => "∉",
        "ni" => "∋",
        "subset" => "⊂",
        "supset" => "⊃",
        "subseteq" => "⊆",
        "supseteq" => "⊇",
        "cup" => "∪",
        "cap" => "∩",
        "setminus" => "∖",
        "emptyset" | "varnothing" => "∅",
        "forall" => "∀",
        "exists" => "∃",
        "neg" | "lnot" => "¬",
        "land" | "wedge" => "∧",
        "lor" | "vee" => "∨",
        "oplus" => "⊕",
        "otimes" => "⊗",
        "perp" => "⊥",
        "parallel" => "∥",
        "angle" => "∠",
        "circ" => "∘",
        "bullet" => "•",
        "star" => "⋆",
        "dagger" => "†",
        "degree" => "°",
        "prime" => "′",
        "ldots" | "dots" | "dotsc" => "…",
        "cdots" | "dotsb" => "⋯",
        "vdots" => "⋮",
        "ddots" => "⋱",
        "hbar" => "ℏ",
        "ell" => "ℓ",
        "Re" => "ℜ",
        "Im" => "ℑ",
        "aleph" => "ℵ",
        "wp" => "℘",
        "langle" => "⟨",
        "rangle" => "⟩",
        "lfloor" => "⌊",
        "rfloor" => "⌋",
        "lceil" => "⌈",
        "rceil" => "⌉",
        "quad" | "qquad" => " ",
        // Operator names render as themselves.
        "sin" | "cos" | "tan" | "cot" | "sec" | "csc" | "arcsin" | "arccos" | "arctan"
        | "sinh" | "cosh" | "tanh" | "log" | "ln" | "lg" | "exp" | "lim" | "liminf"
        | "limsup" | "min" | "max" | "sup" | "inf" | "det" | "dim" | "ker" | "deg"
        | "gcd" | "arg" | "mod" | "bmod" | "pmod" => return Some(operator_name(name)),
        _ => return None,
    };
    Some(glyph)
}

fn operator_name(name: &str) -> &'static str {
    match name {
        "sin" => "sin",
        "cos" => "cos",
        "tan" => "tan",
        "cot" => "cot",
        "sec" => "sec",
        "csc" => "csc",
        "arcsin" => "arcsin",
        "arccos" => "arccos",
        "arctan" => "arctan",
        "sinh" => "sinh",
        "cosh" => "cosh",
        "tanh" => "tanh",
        "log" => "log",
        "ln" => "ln",
        "lg" => "lg",
        "exp" => "exp",
        "lim" => "lim",
        "liminf" => "liminf",
        "limsup" => "limsup",
        "min" => "min",
        "max" => "max",
        "sup" => "sup",
        "inf" => "inf",
        "det" => "det",
        "dim" => "dim",
        "ker" => "ker",
        "deg" => "deg",
        "gcd" => "gcd",
        "arg" => "arg",
        "mod" | "bmod" | "pmod" => "mod",
        _ => "",
    }
}
