//! Simple algebraic forms.
//!
//! Parses normalized answers such as `2x+3`, `(x+1)(x-1)` or `2x+3=7` into
//! polynomials with exact rational coefficients over single-letter
//! variables, so reordered terms and expanded/factored forms of low
//! complexity compare equal.
//!
//! Supported: `+ - *`, division by a constant, `^` with a small non-negative
//! integer exponent, parentheses, implicit multiplication (`2x`, `3(x+1)`,
//! `xy`) and at most one `=`. Anything else (functions, roots, division by
//! a variable, words) is reported as unparsed.

use std::collections::BTreeMap;

use crate::config::EquivalenceConfig;

/// Maximum nesting depth of parentheses.
const MAX_DEPTH: usize = 32;

/// Letter runs longer than this are words, not products of variables.
const MAX_VARIABLE_RUN: usize = 2;

/// Two-letter runs that are function or constant names.
const RESERVED_WORDS: &[&str] = &["pi", "ln", "lg", "dx", "dy"];

/// Size guards for parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    /// Maximum number of terms in any intermediate polynomial.
    pub max_terms: usize,
    /// Maximum integer exponent.
    pub max_exponent: u32,
}

impl From<&EquivalenceConfig> for Limits {
    fn from(config: &EquivalenceConfig) -> Self {
        Self {
            max_terms: config.max_terms,
            max_exponent: config.max_exponent,
        }
    }
}

impl Default for Limits {
    fn default() -> Self {
        Self::from(&EquivalenceConfig::default())
    }
}

// =============================================================================
// Rational
// =============================================================================

/// Exact rational number in lowest terms with a positive denominator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rational {
    num: i128,
    den: i128,
}

impl Rational {
    /// Zero.
    pub const ZERO: Rational = Rational { num: 0, den: 1 };
    /// One.
    pub const ONE: Rational = Rational { num: 1, den: 1 };

    /// Build a reduced rational. `None` on zero denominator or overflow.
    pub fn new(num: i128, den: i128) -> Option<Self> {
        if den == 0 {
            return None;
        }
        let g = i128::try_from(gcd(num.unsigned_abs(), den.unsigned_abs())).ok()?;
        let (mut num, mut den) = (num / g, den / g);
        if den < 0 {
            num = num.checked_neg()?;
            den = den.checked_neg()?;
        }
        Some(Self { num, den })
    }

    /// Parse an unsigned decimal literal (`12`, `0.25`, `.5`) exactly.
    pub fn from_decimal(s: &str) -> Option<Self> {
        let (int_part, frac_part) = s.split_once('.').unwrap_or((s, ""));
        if int_part.is_empty() && frac_part.is_empty() {
            return None;
        }
        if !int_part.bytes().chain(frac_part.bytes()).all(|b| b.is_ascii_digit()) {
            return None;
        }
        // i128 holds 38 decimal digits
        if int_part.len() + frac_part.len() > 36 {
            return None;
        }
        let digits = format!("{int_part}{frac_part}");
        let num: i128 = digits.parse().ok()?;
        let den = 10i128.checked_pow(frac_part.len() as u32)?;
        Self::new(num, den)
    }

    /// Whether this is zero.
    pub fn is_zero(&self) -> bool {
        self.num == 0
    }

    /// The value as a non-negative integer, if it is one.
    pub fn to_non_negative_integer(&self) -> Option<u32> {
        if self.den != 1 || self.num < 0 {
            return None;
        }
        u32::try_from(self.num).ok()
    }

    fn checked_add(self, other: Self) -> Option<Self> {
        let num = self
            .num
            .checked_mul(other.den)?
            .checked_add(other.num.checked_mul(self.den)?)?;
        Self::new(num, self.den.checked_mul(other.den)?)
    }

    fn checked_mul(self, other: Self) -> Option<Self> {
        Self::new(
            self.num.checked_mul(other.num)?,
            self.den.checked_mul(other.den)?,
        )
    }

    fn checked_div(self, other: Self) -> Option<Self> {
        if other.is_zero() {
            return None;
        }
        Self::new(
            self.num.checked_mul(other.den)?,
            self.den.checked_mul(other.num)?,
        )
    }

    fn checked_neg(self) -> Option<Self> {
        Some(Self {
            num: self.num.checked_neg()?,
            den: self.den,
        })
    }
}

fn gcd(mut a: u128, mut b: u128) -> u128 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a.max(1)
}

// =============================================================================
// Polynomial
// =============================================================================

/// Variable exponents of one term, e.g. `x^2 y` → `{x: 2, y: 1}`.
type Monomial = BTreeMap<char, u32>;

/// Polynomial in canonical form: zero coefficients are never stored.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Polynomial {
    terms: BTreeMap<Monomial, Rational>,
}

impl Polynomial {
    /// Constant polynomial.
    pub fn constant(value: Rational) -> Self {
        let mut poly = Self::default();
        if !value.is_zero() {
            poly.terms.insert(Monomial::new(), value);
        }
        poly
    }

    /// Single variable.
    pub fn variable(name: char) -> Self {
        let mut mono = Monomial::new();
        mono.insert(name, 1);
        let mut poly = Self::default();
        poly.terms.insert(mono, Rational::ONE);
        poly
    }

    /// Whether this is the zero polynomial.
    pub fn is_zero(&self) -> bool {
        self.terms.is_empty()
    }

    /// The constant value, if the polynomial has no variables.
    pub fn as_constant(&self) -> Option<Rational> {
        match self.terms.len() {
            0 => Some(Rational::ZERO),
            1 => self.terms.get(&Monomial::new()).copied(),
            _ => None,
        }
    }

    fn add_term(&mut self, mono: Monomial, coeff: Rational) -> Option<()> {
        let sum = match self.terms.get(&mono) {
            Some(existing) => existing.checked_add(coeff)?,
            None => coeff,
        };
        if sum.is_zero() {
            self.terms.remove(&mono);
        } else {
            self.terms.insert(mono, sum);
        }
        Some(())
    }

    fn checked_add(&self, other: &Self, limits: &Limits) -> Option<Self> {
        let mut out = self.clone();
        for (mono, coeff) in &other.terms {
            out.add_term(mono.clone(), *coeff)?;
        }
        (out.terms.len() <= limits.max_terms).then_some(out)
    }

    fn checked_neg(&self) -> Option<Self> {
        let mut out = Self::default();
        for (mono, coeff) in &self.terms {
            out.terms.insert(mono.clone(), coeff.checked_neg()?);
        }
        Some(out)
    }

    fn checked_sub(&self, other: &Self, limits: &Limits) -> Option<Self> {
        self.checked_add(&other.checked_neg()?, limits)
    }

    fn checked_mul(&self, other: &Self, limits: &Limits) -> Option<Self> {
        let mut out = Self::default();
        for (m1, c1) in &self.terms {
            for (m2, c2) in &other.terms {
                let mut mono = m1.clone();
                for (var, exp) in m2 {
                    let entry = mono.entry(*var).or_insert(0);
                    *entry = entry.checked_add(*exp)?;
                }
                out.add_term(mono, c1.checked_mul(*c2)?)?;
                if out.terms.len() > limits.max_terms {
                    return None;
                }
            }
        }
        Some(out)
    }

    fn checked_pow(&self, exponent: u32, limits: &Limits) -> Option<Self> {
        if exponent > limits.max_exponent {
            return None;
        }
        let mut out = Self::constant(Rational::ONE);
        for _ in 0..exponent {
            out = out.checked_mul(self, limits)?;
        }
        Some(out)
    }

    fn checked_scale(&self, factor: Rational) -> Option<Self> {
        let mut out = Self::default();
        if factor.is_zero() {
            return Some(out);
        }
        for (mono, coeff) in &self.terms {
            out.terms.insert(mono.clone(), coeff.checked_mul(factor)?);
        }
        Some(out)
    }

    /// Whether `self == k * other` for some non-zero rational `k`.
    ///
    /// Two zero polynomials are multiples of each other.
    pub fn is_nonzero_multiple_of(&self, other: &Self) -> bool {
        if self.is_zero() || other.is_zero() {
            return self.is_zero() && other.is_zero();
        }
        if self.terms.len() != other.terms.len() {
            return false;
        }
        let Some((mono, other_coeff)) = other.terms.iter().next() else {
            return false;
        };
        let Some(self_coeff) = self.terms.get(mono) else {
            return false;
        };
        self_coeff
            .checked_div(*other_coeff)
            .and_then(|k| other.checked_scale(k))
            .is_some_and(|scaled| &scaled == self)
    }
}

// =============================================================================
// Algebraic forms
// =============================================================================

/// A parsed answer: an expression or an equation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AlgebraicForm {
    /// A plain expression.
    Expression(Polynomial),
    /// An equation, stored as `lhs - rhs` (implicitly `= 0`).
    Equation(Polynomial),
}

impl AlgebraicForm {
    /// Compare two forms.
    ///
    /// Expressions are equivalent when their canonical polynomials match;
    /// equations when one side-difference is a non-zero multiple of the
    /// other. An expression never compares against an equation: `None`.
    pub fn equivalent_to(&self, other: &AlgebraicForm) -> Option<bool> {
        match (self, other) {
            (Self::Expression(a), Self::Expression(b)) => Some(a == b),
            (Self::Equation(a), Self::Equation(b)) => Some(a.is_nonzero_multiple_of(b)),
            _ => None,
        }
    }
}

/// Parse a normalized answer into an algebraic form.
///
/// Returns `None` when the text is not a simple algebraic form or exceeds
/// the size limits.
pub fn parse_form(input: &str, limits: &Limits) -> Option<AlgebraicForm> {
    let tokens = tokenize(input)?;
    let mut sides = tokens.split(|t| *t == Token::Equals);
    let lhs = sides.next()?;
    let rhs = sides.next();
    if sides.next().is_some() {
        return None;
    }

    let lhs = parse_polynomial(lhs, limits)?;
    match rhs {
        None => Some(AlgebraicForm::Expression(lhs)),
        Some(rhs) => {
            let rhs = parse_polynomial(rhs, limits)?;
            Some(AlgebraicForm::Equation(lhs.checked_sub(&rhs, limits)?))
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(Rational),
    Variable(char),
    Plus,
    Minus,
    Star,
    Slash,
    Caret,
    LParen,
    RParen,
    Equals,
}

fn tokenize(input: &str) -> Option<Vec<Token>> {
    let chars: Vec<char> = input.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            ' ' => {}
            '+' => tokens.push(Token::Plus),
            '-' => tokens.push(Token::Minus),
            '*' => tokens.push(Token::Star),
            '/' => tokens.push(Token::Slash),
            '^' => tokens.push(Token::Caret),
            '(' => tokens.push(Token::LParen),
            ')' => tokens.push(Token::RParen),
            '=' => tokens.push(Token::Equals),
            '0'..='9' | '.' => {
                let start = i;
                while i + 1 < chars.len() && (chars[i + 1].is_ascii_digit() || chars[i + 1] == '.')
                {
                    i += 1;
                }
                let literal: String = chars[start..=i].iter().collect();
                tokens.push(Token::Number(Rational::from_decimal(&literal)?));
            }
            'a'..='z' => {
                let start = i;
                while i + 1 < chars.len() && chars[i + 1].is_ascii_lowercase() {
                    i += 1;
                }
                let run: String = chars[start..=i].iter().collect();
                if run.len() > MAX_VARIABLE_RUN || RESERVED_WORDS.contains(&run.as_str()) {
                    return None;
                }
                tokens.extend(run.chars().map(Token::Variable));
            }
            _ => return None,
        }
        i += 1;
    }

    (!tokens.is_empty()).then_some(tokens)
}

fn parse_polynomial(tokens: &[Token], limits: &Limits) -> Option<Polynomial> {
    let mut parser = Parser {
        tokens,
        pos: 0,
        depth: 0,
        limits,
    };
    let poly = parser.expression()?;
    (parser.pos == tokens.len()).then_some(poly)
}

/// Recursive descent over one side of a form.
///
/// ```text
/// expression := term (('+' | '-') term)*
/// term       := unary (('*' | '/' | <implicit>) unary)*
/// unary      := ('+' | '-') unary | power
/// power      := atom ('^' unary)?
/// atom       := number | variable | '(' expression ')'
/// ```
struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
    depth: usize,
    limits: &'a Limits,
}

impl Parser<'_> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<&Token> {
        let token = self.tokens.get(self.pos);
        self.pos += 1;
        token
    }

    fn expression(&mut self) -> Option<Polynomial> {
        let mut acc = self.term()?;
        loop {
            match self.peek() {
                Some(Token::Plus) => {
                    self.pos += 1;
                    let rhs = self.term()?;
                    acc = acc.checked_add(&rhs, self.limits)?;
                }
                Some(Token::Minus) => {
                    self.pos += 1;
                    let rhs = self.term()?;
                    acc = acc.checked_sub(&rhs, self.limits)?;
                }
                _ => return Some(acc),
            }
        }
    }

    fn term(&mut self) -> Option<Polynomial> {
        let mut acc = self.unary()?;
        loop {
            match self.peek() {
                Some(Token::Star) => {
                    self.pos += 1;
                    let rhs = self.unary()?;
                    acc = acc.checked_mul(&rhs, self.limits)?;
                }
                Some(Token::Slash) => {
                    self.pos += 1;
                    let divisor = self.unary()?.as_constant()?;
                    acc = acc.checked_scale(Rational::ONE.checked_div(divisor)?)?;
                }
                Some(Token::Variable(_)) | Some(Token::LParen) => {
                    let rhs = self.unary()?;
                    acc = acc.checked_mul(&rhs, self.limits)?;
                }
                _ => return Some(acc),
            }
        }
    }

    fn unary(&mut self) -> Option<Polynomial> {
        match self.peek() {
            Some(Token::Minus) => {
                self.pos += 1;
                self.nested(|p| p.unary())?.checked_neg()
            }
            Some(Token::Plus) => {
                self.pos += 1;
                self.nested(|p| p.unary())
            }
            _ => self.power(),
        }
    }

    fn power(&mut self) -> Option<Polynomial> {
        let base = self.atom()?;
        if self.peek() != Some(&Token::Caret) {
            return Some(base);
        }
        self.pos += 1;
        let exponent = self
            .nested(|p| p.unary())?
            .as_constant()?
            .to_non_negative_integer()?;
        base.checked_pow(exponent, self.limits)
    }

    fn atom(&mut self) -> Option<Polynomial> {
        match self.advance()?.clone() {
            Token::Number(value) => Some(Polynomial::constant(value)),
            Token::Variable(name) => Some(Polynomial::variable(name)),
            Token::LParen => {
                let inner = self.nested(|p| p.expression())?;
                (self.advance()? == &Token::RParen).then_some(inner)
            }
            _ => None,
        }
    }

    fn nested<T>(&mut self, f: impl FnOnce(&mut Self) -> Option<T>) -> Option<T> {
        if self.depth >= MAX_DEPTH {
            return None;
        }
        self.depth += 1;
        let out = f(self);
        self.depth -= 1;
        out
    }
}
