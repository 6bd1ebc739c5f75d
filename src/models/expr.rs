//! Sandboxed arithmetic expressions.
//!
//! Model expressions are parsed into a small AST that can only do arithmetic,
//! exponentiation and a fixed set of named functions. Identifiers are bound
//! to numbered slots through a [`SymbolTable`], so evaluation is a plain tree
//! walk over a slice of slot values:
//!
//! ```text
//! expr   := term (('+' | '-') term)*
//! term   := unary (('*' | '/') unary)*
//! unary  := ('-' | '+') unary | power
//! power  := atom (('**' | '^') unary)?
//! atom   := NUMBER | IDENT | IDENT '(' expr ')' | '(' expr ')'
//! ```

use std::collections::HashMap;
use std::fmt;

use crate::error::AppError;

/// Maps identifier names to evaluation slots.
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    slots: HashMap<String, usize>,
}

impl SymbolTable {
    /// Build a table where `names[i]` is bound to slot `i`.
    ///
    /// Returns `None` if a name repeats.
    pub fn from_names<S: AsRef<str>>(names: &[S]) -> Option<Self> {
        let mut slots = HashMap::with_capacity(names.len());
        for (slot, name) in names.iter().enumerate() {
            if slots.insert(name.as_ref().to_string(), slot).is_some() {
                return None;
            }
        }
        Some(Self { slots })
    }

    pub fn slot(&self, name: &str) -> Option<usize> {
        self.slots.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
}

impl BinOp {
    fn apply(self, a: f64, b: f64) -> f64 {
        match self {
            BinOp::Add => a + b,
            BinOp::Sub => a - b,
            BinOp::Mul => a * b,
            BinOp::Div => a / b,
            BinOp::Pow => a.powf(b),
        }
    }

    fn precedence(self) -> u8 {
        match self {
            BinOp::Add | BinOp::Sub => 1,
            BinOp::Mul | BinOp::Div => 2,
            BinOp::Pow => 4,
        }
    }

    fn symbol(self) -> &'static str {
        match self {
            BinOp::Add => " + ",
            BinOp::Sub => " - ",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Pow => "^",
        }
    }
}

/// Named functions callable from an expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Func {
    Sqrt,
    Exp,
    Ln,
    Log10,
    Sin,
    Cos,
    Tan,
    Asin,
    Acos,
    Atan,
    Sinh,
    Cosh,
    Tanh,
    Abs,
}

impl Func {
    pub fn from_name(name: &str) -> Option<Self> {
        let func = match name {
            "sqrt" => Func::Sqrt,
            "exp" => Func::Exp,
            "log" | "ln" => Func::Ln,
            "log10" => Func::Log10,
            "sin" => Func::Sin,
            "cos" => Func::Cos,
            "tan" => Func::Tan,
            "asin" => Func::Asin,
            "acos" => Func::Acos,
            "atan" => Func::Atan,
            "sinh" => Func::Sinh,
            "cosh" => Func::Cosh,
            "tanh" => Func::Tanh,
            "abs" => Func::Abs,
            _ => return None,
        };
        Some(func)
    }

    pub fn name(self) -> &'static str {
        match self {
            Func::Sqrt => "sqrt",
            Func::Exp => "exp",
            Func::Ln => "log",
            Func::Log10 => "log10",
            Func::Sin => "sin",
            Func::Cos => "cos",
            Func::Tan => "tan",
            Func::Asin => "asin",
            Func::Acos => "acos",
            Func::Atan => "atan",
            Func::Sinh => "sinh",
            Func::Cosh => "cosh",
            Func::Tanh => "tanh",
            Func::Abs => "abs",
        }
    }

    fn apply(self, v: f64) -> f64 {
        match self {
            Func::Sqrt => v.sqrt(),
            Func::Exp => v.exp(),
            Func::Ln => v.ln(),
            Func::Log10 => v.log10(),
            Func::Sin => v.sin(),
            Func::Cos => v.cos(),
            Func::Tan => v.tan(),
            Func::Asin => v.asin(),
            Func::Acos => v.acos(),
            Func::Atan => v.atan(),
            Func::Sinh => v.sinh(),
            Func::Cosh => v.cosh(),
            Func::Tanh => v.tanh(),
            Func::Abs => v.abs(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Constant {
    Pi,
    E,
}

impl Constant {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "pi" => Some(Constant::Pi),
            "E" => Some(Constant::E),
            _ => None,
        }
    }

    fn value(self) -> f64 {
        match self {
            Constant::Pi => std::f64::consts::PI,
            Constant::E => std::f64::consts::E,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Constant::Pi => "pi",
            Constant::E => "E",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number(f64),
    Constant(Constant),
    Symbol { slot: usize, name: String },
    Neg(Box<Expr>),
    Binary { op: BinOp, lhs: Box<Expr>, rhs: Box<Expr> },
    Call { func: Func, arg: Box<Expr> },
}

impl Expr {
    /// Parse `source`, resolving identifiers against `symbols`.
    pub fn parse(source: &str, symbols: &SymbolTable) -> Result<Self, AppError> {
        let tokens = tokenize(source)?;
        let mut parser = Parser {
            tokens,
            pos: 0,
            symbols,
            source,
        };
        let expr = parser.expr()?;
        if let Some(tok) = parser.peek() {
            return Err(AppError::format(format!(
                "Unexpected '{tok}' in expression '{source}'."
            )));
        }
        Ok(expr)
    }

    /// Evaluate with `slots[i]` as the value of slot `i`.
    ///
    /// # Panics
    /// Panics if the expression references a slot outside `slots`. Expressions
    /// built by [`Expr::parse`] only reference slots of their symbol table.
    pub fn eval(&self, slots: &[f64]) -> f64 {
        match self {
            Expr::Number(v) => *v,
            Expr::Constant(c) => c.value(),
            Expr::Symbol { slot, .. } => slots[*slot],
            Expr::Neg(inner) => -inner.eval(slots),
            Expr::Binary { op, lhs, rhs } => op.apply(lhs.eval(slots), rhs.eval(slots)),
            Expr::Call { func, arg } => func.apply(arg.eval(slots)),
        }
    }

    /// Highest slot referenced plus one (0 for constant expressions).
    pub fn slot_span(&self) -> usize {
        match self {
            Expr::Number(_) | Expr::Constant(_) => 0,
            Expr::Symbol { slot, .. } => slot + 1,
            Expr::Neg(inner) | Expr::Call { arg: inner, .. } => inner.slot_span(),
            Expr::Binary { lhs, rhs, .. } => lhs.slot_span().max(rhs.slot_span()),
        }
    }

    fn precedence(&self) -> u8 {
        match self {
            Expr::Binary { op, .. } => op.precedence(),
            Expr::Neg(_) => 3,
            _ => 5,
        }
    }

    fn fmt_child(&self, f: &mut fmt::Formatter<'_>, min_prec: u8) -> fmt::Result {
        if self.precedence() < min_prec {
            write!(f, "({self})")
        } else {
            write!(f, "{self}")
        }
    }
}

/// Renders a canonical, re-parseable infix form.
impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Number(v) => write!(f, "{v}"),
            Expr::Constant(c) => write!(f, "{}", c.name()),
            Expr::Symbol { name, .. } => write!(f, "{name}"),
            Expr::Neg(inner) => {
                write!(f, "-")?;
                inner.fmt_child(f, 3)
            }
            Expr::Binary { op: BinOp::Pow, lhs, rhs } => {
                lhs.fmt_child(f, 5)?;
                write!(f, "^")?;
                rhs.fmt_child(f, 3)
            }
            Expr::Binary { op, lhs, rhs } => {
                let prec = op.precedence();
                lhs.fmt_child(f, prec)?;
                write!(f, "{}", op.symbol())?;
                rhs.fmt_child(f, prec + 1)
            }
            Expr::Call { func, arg } => write!(f, "{}({arg})", func.name()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(f64),
    Ident(String),
    Plus,
    Minus,
    Star,
    Slash,
    Pow,
    LParen,
    RParen,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Number(v) => write!(f, "{v}"),
            Token::Ident(name) => write!(f, "{name}"),
            Token::Plus => write!(f, "+"),
            Token::Minus => write!(f, "-"),
            Token::Star => write!(f, "*"),
            Token::Slash => write!(f, "/"),
            Token::Pow => write!(f, "**"),
            Token::LParen => write!(f, "("),
            Token::RParen => write!(f, ")"),
        }
    }
}

fn tokenize(source: &str) -> Result<Vec<Token>, AppError> {
    let chars: Vec<char> = source.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            c if c.is_whitespace() => i += 1,
            '+' => {
                tokens.push(Token::Plus);
                i += 1;
            }
            '-' => {
                tokens.push(Token::Minus);
                i += 1;
            }
            '*' if chars.get(i + 1) == Some(&'*') => {
                tokens.push(Token::Pow);
                i += 2;
            }
            '*' => {
                tokens.push(Token::Star);
                i += 1;
            }
            '^' => {
                tokens.push(Token::Pow);
                i += 1;
            }
            '/' => {
                tokens.push(Token::Slash);
                i += 1;
            }
            '(' => {
                tokens.push(Token::LParen);
                i += 1;
            }
            ')' => {
                tokens.push(Token::RParen);
                i += 1;
            }
            c if c.is_ascii_digit() || c == '.' => {
                let start = i;
                while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                    i += 1;
                }
                // Exponent part, only when followed by digits (optionally signed).
                if i < chars.len() && (chars[i] == 'e' || chars[i] == 'E') {
                    let mut j = i + 1;
                    if j < chars.len() && (chars[j] == '+' || chars[j] == '-') {
                        j += 1;
                    }
                    if j < chars.len() && chars[j].is_ascii_digit() {
                        while j < chars.len() && chars[j].is_ascii_digit() {
                            j += 1;
                        }
                        i = j;
                    }
                }
                let text: String = chars[start..i].iter().collect();
                let value = text.parse::<f64>().map_err(|_| {
                    AppError::format(format!("Invalid number '{text}' in expression '{source}'."))
                })?;
                tokens.push(Token::Number(value));
            }
            c if c.is_alphabetic() || c == '_' => {
                let start = i;
                while i < chars.len() && (chars[i].is_alphanumeric() || chars[i] == '_') {
                    i += 1;
                }
                tokens.push(Token::Ident(chars[start..i].iter().collect()));
            }
            other => {
                return Err(AppError::format(format!(
                    "Unsupported character '{other}' in expression '{source}'."
                )));
            }
        }
    }

    Ok(tokens)
}

struct Parser<'a> {
    tokens: Vec<Token>,
    pos: usize,
    symbols: &'a SymbolTable,
    source: &'a str,
}

impl Parser<'_> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let tok = self.tokens.get(self.pos).cloned();
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    fn error(&self, what: impl fmt::Display) -> AppError {
        AppError::format(format!("{what} in expression '{}'.", self.source))
    }

    fn expr(&mut self) -> Result<Expr, AppError> {
        let mut lhs = self.term()?;
        loop {
            let op = match self.peek() {
                Some(Token::Plus) => BinOp::Add,
                Some(Token::Minus) => BinOp::Sub,
                _ => return Ok(lhs),
            };
            self.pos += 1;
            let rhs = self.term()?;
            lhs = binary(op, lhs, rhs);
        }
    }

    fn term(&mut self) -> Result<Expr, AppError> {
        let mut lhs = self.unary()?;
        loop {
            let op = match self.peek() {
                Some(Token::Star) => BinOp::Mul,
                Some(Token::Slash) => BinOp::Div,
                _ => return Ok(lhs),
            };
            self.pos += 1;
            let rhs = self.unary()?;
            lhs = binary(op, lhs, rhs);
        }
    }

    fn unary(&mut self) -> Result<Expr, AppError> {
        match self.peek() {
            Some(Token::Minus) => {
                self.pos += 1;
                Ok(Expr::Neg(Box::new(self.unary()?)))
            }
            Some(Token::Plus) => {
                self.pos += 1;
                self.unary()
            }
            _ => self.power(),
        }
    }

    fn power(&mut self) -> Result<Expr, AppError> {
        let base = self.atom()?;
        if self.peek() == Some(&Token::Pow) {
            self.pos += 1;
            let exponent = self.unary()?;
            return Ok(binary(BinOp::Pow, base, exponent));
        }
        Ok(base)
    }

    fn atom(&mut self) -> Result<Expr, AppError> {
        match self.next() {
            Some(Token::Number(v)) => Ok(Expr::Number(v)),
            Some(Token::LParen) => {
                let inner = self.expr()?;
                self.expect_rparen()?;
                Ok(inner)
            }
            Some(Token::Ident(name)) => {
                if self.peek() == Some(&Token::LParen) {
                    let func = Func::from_name(&name)
                        .ok_or_else(|| self.error(format!("Unknown function '{name}'")))?;
                    self.pos += 1;
                    let arg = self.expr()?;
                    self.expect_rparen()?;
                    return Ok(Expr::Call {
                        func,
                        arg: Box::new(arg),
                    });
                }
                if let Some(slot) = self.symbols.slot(&name) {
                    return Ok(Expr::Symbol { slot, name });
                }
                Constant::from_name(&name)
                    .map(Expr::Constant)
                    .ok_or_else(|| self.error(format!("Unknown symbol '{name}'")))
            }
            Some(tok) => Err(self.error(format!("Unexpected '{tok}'"))),
            None => Err(self.error("Unexpected end")),
        }
    }

    fn expect_rparen(&mut self) -> Result<(), AppError> {
        match self.next() {
            Some(Token::RParen) => Ok(()),
            Some(tok) => Err(self.error(format!("Expected ')' but found '{tok}'"))),
            None => Err(self.error("Missing ')'")),
        }
    }
}

fn binary(op: BinOp, lhs: Expr, rhs: Expr) -> Expr {
    Expr::Binary {
        op,
        lhs: Box::new(lhs),
        rhs: Box::new(rhs),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(names: &[&str]) -> SymbolTable {
        SymbolTable::from_names(names).unwrap()
    }

    fn eval(source: &str, names: &[&str], slots: &[f64]) -> f64 {
        Expr::parse(source, &table(names)).unwrap().eval(slots)
    }

    #[test]
    fn precedence_and_associativity() {
        assert_eq!(eval("1 + 2*3", &[], &[]), 7.0);
        assert_eq!(eval("(1 + 2)*3", &[], &[]), 9.0);
        assert_eq!(eval("8/4/2", &[], &[]), 1.0);
        assert_eq!(eval("10 - 4 - 3", &[], &[]), 3.0);
        assert_eq!(eval("2**3**2", &[], &[]), 512.0);
        assert_eq!(eval("2^3", &[], &[]), 8.0);
        assert_eq!(eval("-2**2", &[], &[]), -4.0);
        assert_eq!(eval("2**-1", &[], &[]), 0.5);
    }

    #[test]
    fn symbols_functions_and_constants() {
        let v = eval("a*sqrt(b*x + c) + d", &["x", "a", "b", "c", "d"], &[3.0, 2.0, 1.0, 1.0, 0.5]);
        assert!((v - 4.5).abs() < 1e-12);

        let v = eval("A*exp(-0.5*((x - x_0)/sigma)**2)", &["x", "A", "x_0", "sigma"], &[1.0, 3.0, 1.0, 2.0]);
        assert!((v - 3.0).abs() < 1e-12);

        assert!((eval("sin(pi/2)", &[], &[]) - 1.0).abs() < 1e-12);
        assert!((eval("log(E)", &[], &[]) - 1.0).abs() < 1e-12);
        assert!((eval("2.5e-1 + .75", &[], &[]) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn rejects_unknown_names_and_garbage() {
        let symbols = table(&["x", "a"]);
        assert!(Expr::parse("a*y", &symbols).is_err());
        assert!(Expr::parse("foo(x)", &symbols).is_err());
        assert!(Expr::parse("a*(x + 1", &symbols).is_err());
        assert!(Expr::parse("a x", &symbols).is_err());
        assert!(Expr::parse("a; x", &symbols).is_err());
        assert!(Expr::parse("", &symbols).is_err());
    }

    #[test]
    fn display_reparses_to_same_tree() {
        let symbols = table(&["t", "A", "omega", "phi", "b"]);
        for source in [
            "A*sin(omega*t + phi) + b",
            "-(t - b)^2/(2*A)",
            "(A - omega) - (phi - b)",
            "A/(omega*t)",
            "(-A)^2 + t^(phi^b)",
            "--t * -A",
        ] {
            let expr = Expr::parse(source, &symbols).unwrap();
            let printed = expr.to_string();
            let again = Expr::parse(&printed, &symbols).unwrap();
            assert_eq!(expr, again, "{source} printed as {printed}");
        }
    }

    #[test]
    fn duplicate_names_are_rejected() {
        assert!(SymbolTable::from_names(&["x", "a", "a"]).is_none());
    }
}
