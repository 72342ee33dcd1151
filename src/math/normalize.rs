//! Answer text normalization.
//!
//! Removes presentation noise so that two answers typed differently compare
//! equal as strings: case, whitespace, math delimiters (`$…$`, `\(…\)`,
//! `\[…\]`), trailing punctuation, LaTeX/Unicode operator spellings and
//! redundant parentheses.
//!
//! Numeric surface forms are left alone: `1/2` and `0.5` stay distinct here
//! and are unified by the equivalence checker.

/// Upper bound on normalization passes.
///
/// Every rewrite shortens the string or replaces a symbol that no later
/// rewrite reintroduces, so real input settles in two or three passes.
const MAX_PASSES: usize = 32;

/// Characters that bind tightly to their neighbours (no surrounding spaces).
fn is_tight(c: char) -> bool {
    matches!(
        c,
        '+' | '-' | '*' | '/' | '^' | '=' | '(' | ')' | '<' | '>'
    )
}

/// Normalize a raw answer into its comparable form.
///
/// Total and idempotent: `normalize(&normalize(s)) == normalize(s)`.
pub fn normalize(raw: &str) -> String {
    let mut current = raw.to_string();
    for _ in 0..MAX_PASSES {
        let next = normalize_pass(&current);
        if next == current {
            return next;
        }
        current = next;
    }
    current
}

/// One rewrite pass. `normalize` repeats it until it reaches a fixed point.
fn normalize_pass(input: &str) -> String {
    let s = input.trim().to_lowercase();
    let s = strip_delimiters(&s);
    let s = strip_trailing_punctuation(&s);
    let s = rewrite_notation(&s);
    let s = tighten_whitespace(&s);
    let s = unwrap_redundant_parens(&s);
    s.trim_start_matches('+').to_string()
}

/// Strip `\(…\)` / `\[…\]` wrappers and every `$`.
///
/// `$` never carries meaning in an answer: it is either a TeX delimiter or
/// a currency sign.
fn strip_delimiters(s: &str) -> String {
    let mut s = s.to_string();
    for (open, close) in [("\\(", "\\)"), ("\\[", "\\]")] {
        if s.len() >= open.len() + close.len() && s.starts_with(open) && s.ends_with(close) {
            let inner = &s[open.len()..s.len() - close.len()];
            if !inner.contains(close) {
                s = inner.trim().to_string();
            }
        }
    }
    s.replace('$', "")
}

fn strip_trailing_punctuation(s: &str) -> String {
    s.trim_end_matches(['.', '!', '?', ';', ':', ','])
        .trim_end()
        .to_string()
}

/// Rewrite LaTeX commands and Unicode math symbols into plain ASCII notation.
fn rewrite_notation(s: &str) -> String {
    let mut s = s
        .replace("\\left", "")
        .replace("\\right", "")
        .replace("\\dfrac", "\\frac")
        .replace("\\tfrac", "\\frac");
    s = expand_fractions(&s);
    s = s
        .replace("\\cdot", "*")
        .replace("\\times", "*")
        .replace("\\div", "/")
        .replace("\\,", "")
        .replace("\\;", "")
        .replace("\\!", "")
        .replace("\\ ", " ")
        .replace("**", "^");

    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => {}
            '×' | '·' | '∙' | '⋅' => out.push('*'),
            '÷' => out.push('/'),
            '−' | '–' | '—' => out.push('-'),
            '²' => out.push_str("^2"),
            '³' => out.push_str("^3"),
            '{' => out.push('('),
            '}' => out.push(')'),
            _ => out.push(c),
        }
    }
    out
}

/// Rewrite `\frac{a}{b}` as `(a)/(b)`.
///
/// A `\frac` without two balanced brace groups is left untouched; the
/// backslash is dropped later and it degrades to the word `frac`.
fn expand_fractions(s: &str) -> String {
    const FRAC: &str = "\\frac";
    let mut out = String::with_capacity(s.len());
    let mut rest = s;

    while let Some(idx) = rest.find(FRAC) {
        out.push_str(&rest[..idx]);
        let after = &rest[idx + FRAC.len()..];
        match brace_group(after).and_then(|(num, tail)| {
            brace_group(tail).map(|(den, tail)| (num, den, tail))
        }) {
            Some((num, den, tail)) => {
                out.push('(');
                out.push_str(num);
                out.push_str(")/(");
                out.push_str(den);
                out.push(')');
                rest = tail;
            }
            None => {
                out.push_str(FRAC);
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

/// Split a leading `{…}` group (after optional spaces) off `s`.
fn brace_group(s: &str) -> Option<(&str, &str)> {
    let s = s.trim_start();
    if !s.starts_with('{') {
        return None;
    }
    let mut depth = 0usize;
    for (i, c) in s.char_indices() {
        match c {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some((&s[1..i], &s[i + 1..]));
                }
            }
            _ => {}
        }
    }
    None
}

/// Collapse whitespace runs and drop whitespace next to operators.
fn tighten_whitespace(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for word in s.split_whitespace() {
        if let (Some(prev), Some(next)) = (out.chars().last(), word.chars().next()) {
            if !is_tight(prev) && !is_tight(next) {
                out.push(' ');
            }
        }
        out.push_str(word);
    }
    out
}

/// Remove parentheses that add nothing.
///
/// Two cases: a pair wrapping the whole string, and a pair wrapping a bare
/// atom (`(2)`, `(x)`, `(0.5)`) where neither side could turn it into an
/// implicit multiplication or a function call.
fn unwrap_redundant_parens(s: &str) -> String {
    let mut chars: Vec<char> = s.chars().collect();

    while chars.len() >= 2
        && chars[0] == '('
        && matching_close(&chars, 0) == Some(chars.len() - 1)
    {
        chars = chars[1..chars.len() - 1].to_vec();
    }

    let mut out: Vec<char> = Vec::with_capacity(chars.len());
    let mut i = 0;
    while i < chars.len() {
        if chars[i] == '(' {
            if let Some(close) = matching_close(&chars, i) {
                let inner = &chars[i + 1..close];
                let before = out.last().copied();
                let after = chars.get(close + 1).copied();
                let is_atom = !inner.is_empty()
                    && inner.iter().all(|c| c.is_alphanumeric() || *c == '.');
                let glues_before = before.is_some_and(|c| c.is_alphanumeric() || c == ')' || c == '.');
                let glues_after = after.is_some_and(|c| c.is_alphanumeric() || c == '(' || c == '.');
                if is_atom && !glues_before && !glues_after {
                    out.extend_from_slice(inner);
                    i = close + 1;
                    continue;
                }
            }
        }
        out.push(chars[i]);
        i += 1;
    }

    out.into_iter().collect()
}

/// Index of the `)` matching the `(` at `open`, if balanced.
fn matching_close(chars: &[char], open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (i, c) in chars.iter().enumerate().skip(open) {
        match c {
            '(' => depth += 1,
            ')' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("   \t\n"), "");
    }

    #[test]
    fn test_case_and_whitespace() {
        assert_eq!(normalize("  The   Answer  "), "the answer");
        assert_eq!(normalize("X + 1"), "x+1");
        assert_eq!(normalize("2 x  =  6"), "2 x=6");
    }

    #[test]
    fn test_math_delimiters() {
        assert_eq!(normalize("$x+1$"), "x+1");
        assert_eq!(normalize("$$42$$"), "42");
        assert_eq!(normalize("\\(x^2\\)"), "x^2");
        assert_eq!(normalize("\\[ 3 \\]"), "3");
    }

    #[test]
    fn test_currency_sign_removed() {
        assert_eq!(normalize("$5.00"), "5.00");
    }

    #[test]
    fn test_trailing_punctuation() {
        assert_eq!(normalize("42."), "42");
        assert_eq!(normalize("x = 3!"), "x=3");
        assert_eq!(normalize("$7$."), "7");
    }

    #[test]
    fn test_unicode_operators() {
        assert_eq!(normalize("3 × 4"), "3*4");
        assert_eq!(normalize("12 ÷ 4"), "12/4");
        assert_eq!(normalize("−5"), "-5");
        assert_eq!(normalize("x²"), "x^2");
    }

    #[test]
    fn test_latex_commands() {
        assert_eq!(normalize("\\frac{1}{2}"), "1/2");
        assert_eq!(normalize("\\dfrac{x+1}{2}"), "(x+1)/2");
        assert_eq!(normalize("3 \\cdot 4"), "3*4");
        assert_eq!(normalize("x^{2}"), "x^2");
        assert_eq!(normalize("\\left(x+1\\right)"), "x+1");
    }

    #[test]
    fn test_redundant_parens() {
        assert_eq!(normalize("(5)"), "5");
        assert_eq!(normalize("((x+1))"), "x+1");
        assert_eq!(normalize("-(5)"), "-5");
        // Parentheses that mean multiplication stay
        assert_eq!(normalize("2(3)"), "2(3)");
        assert_eq!(normalize("(x+1)(x-1)"), "(x+1)(x-1)");
        assert_eq!(normalize("f(x)"), "f(x)");
    }

    #[test]
    fn test_leading_plus() {
        assert_eq!(normalize("+5"), "5");
    }

    #[test]
    fn test_fractions_and_decimals_not_unified() {
        assert_ne!(normalize("1/2"), normalize("0.5"));
    }

    #[test]
    fn test_mixed_number_keeps_space() {
        assert_eq!(normalize("3  1/2"), "3 1/2");
    }

    #[test]
    fn test_unterminated_frac_is_stable() {
        let once = normalize("\\frac{1");
        assert_eq!(normalize(&once), once);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn prop_normalize_is_idempotent(s in "[ a-zA-Z0-9+\\-*/^=().,$\\\\{}!?%×÷−²]{0,40}") {
                let once = normalize(&s);
                prop_assert_eq!(normalize(&once), once);
            }

            #[test]
            fn prop_normalize_is_idempotent_any_text(s in "\\PC{0,30}") {
                let once = normalize(&s);
                prop_assert_eq!(normalize(&once), once);
            }

            #[test]
            fn prop_normalize_has_no_outer_whitespace(s in "\\PC{0,30}") {
                let once = normalize(&s);
                prop_assert_eq!(once.trim(), once.as_str());
            }
        }
    }
}
