//! RcDoc-based pretty-printer with termcolor annotations for [`Expr`].
//!
//! Role
//! - Convert an expression graph into an annotated document suitable for width-aware rendering.
//! - Provide colored output for terminals (TTY-aware) and plain strings for logs/tests.
//!
//! Shared subexpressions are printed at every use. Continuations of case splits are opaque and
//! printed as `<fn 0x..>` with their identity, so two splits differing only in their
//! continuation print differently.
use std::io::{self, Write};

use pretty::{FmtWrite, RcDoc, RenderAnnotated};
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use crate::expr::{ArithOp, Expr, ExprKind};

/// Styles used to annotate parts of the pretty-printed document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Style {
    Punct,
    /// Parentheses alternate intensity with nesting depth.
    Paren(u8),
    Keyword,
    Operator,
    /// Arbitrary values.
    Variable,
    /// Argument placeholders, including the head and tail of an instantiated case split.
    Binder,
    Literal,
    Field,
    /// Sorts and record names.
    Sort,
    /// Opaque continuation of a case split.
    Continuation,
}

impl Style {
    fn color_spec(self) -> ColorSpec {
        let mut spec = ColorSpec::new();
        match self {
            Style::Punct => spec.set_dimmed(true),
            Style::Paren(depth) => spec.set_dimmed(depth % 2 == 1),
            Style::Keyword => spec.set_fg(Some(Color::Cyan)).set_bold(true),
            Style::Operator => spec.set_fg(Some(Color::Yellow)),
            Style::Variable => spec.set_fg(Some(Color::Green)).set_bold(true),
            Style::Binder => spec.set_fg(Some(Color::Green)).set_underline(true),
            Style::Literal => spec.set_fg(Some(Color::Red)),
            Style::Field => spec.set_bold(true),
            Style::Sort => spec.set_fg(Some(Color::Magenta)),
            Style::Continuation => spec.set_fg(Some(Color::Blue)).set_italic(true),
        };
        spec
    }
}

type Doc = RcDoc<'static, Style>;

fn styled(style: Style, s: impl ToString) -> Doc {
    RcDoc::as_string(s.to_string()).annotate(style)
}

fn punct(s: &'static str) -> Doc {
    styled(Style::Punct, s)
}

#[inline]
fn lparen(depth: u8) -> Doc {
    RcDoc::as_string("(").annotate(Style::Paren(depth))
}

#[inline]
fn rparen(depth: u8) -> Doc {
    RcDoc::as_string(")").annotate(Style::Paren(depth))
}

fn kw(s: &'static str) -> Doc {
    styled(Style::Keyword, s)
}

fn op(s: &'static str) -> Doc {
    styled(Style::Operator, s)
}

const ATOM: u8 = u8::MAX;

fn precedence(kind: &ExprKind) -> u8 {
    match kind {
        ExprKind::If { .. } | ExprKind::Case { .. } => 1,
        ExprKind::Or(..) => 2,
        ExprKind::And(..) => 3,
        ExprKind::Eq(..) | ExprKind::Compare(..) => 4,
        ExprKind::Cons { .. } | ExprKind::Concat(..) => 5,
        ExprKind::Bitwise(..) => 6,
        ExprKind::Arith(ArithOp::Add | ArithOp::Sub, ..) => 7,
        ExprKind::Arith(ArithOp::Mul, ..) => 8,
        ExprKind::Not(_) | ExprKind::BitNot(_) => 9,
        ExprKind::FieldGet { .. } | ExprKind::FieldWith { .. } => 10,
        _ => ATOM,
    }
}

fn child(e: &Expr, parent: u8, depth: u8) -> Doc {
    let current = precedence(e.kind());
    if current != ATOM && current <= parent {
        lparen(depth)
            .append(to_doc_with_depth(e, depth + 1))
            .append(rparen(depth))
            .group()
    } else {
        to_doc_with_depth(e, depth)
    }
}

fn infix(a: &Expr, symbol: Doc, b: &Expr, prec: u8, depth: u8) -> Doc {
    child(a, prec, depth)
        .append(RcDoc::space())
        .append(symbol)
        .append(RcDoc::space())
        .append(child(b, prec, depth))
        .group()
}

fn call<'a>(name: &'static str, args: impl IntoIterator<Item = &'a Expr>, depth: u8) -> Doc {
    let args = args
        .into_iter()
        .map(|arg| to_doc_with_depth(arg, depth + 1));
    kw(name)
        .append(lparen(depth))
        .append(RcDoc::intersperse(args, punct(",").append(RcDoc::line())).nest(2))
        .append(rparen(depth))
        .group()
}

fn field_name(record: &Expr, index: usize) -> Doc {
    let name = record
        .sort()
        .as_record()
        .and_then(|r| r.fields().get(index).map(|(name, _)| name.to_string()))
        .unwrap_or_else(|| format!("#{}", index));
    styled(Style::Field, name)
}

/// Depth-aware rendering that colors parentheses by nesting level.
fn to_doc_with_depth(e: &Expr, depth: u8) -> Doc {
    let prec = precedence(e.kind());
    match e.kind() {
        ExprKind::Constant(value) => styled(Style::Literal, value),
        ExprKind::Arbitrary { var, name } => match name {
            Some(name) => styled(Style::Variable, name),
            None => styled(Style::Variable, format!("?{}", var)),
        },
        ExprKind::Argument { var } => styled(Style::Binder, format!("${}", var)),

        ExprKind::And(a, b) => infix(a, op("&&"), b, prec, depth),
        ExprKind::Or(a, b) => infix(a, op("||"), b, prec, depth),
        ExprKind::Not(a) => op("!").append(child(a, prec, depth)),
        ExprKind::If {
            guard,
            then,
            otherwise,
        } => kw("if")
            .append(RcDoc::space())
            .append(child(guard, prec, depth))
            .append(RcDoc::line())
            .append(kw("then"))
            .append(RcDoc::space())
            .append(child(then, prec, depth))
            .append(RcDoc::line())
            .append(kw("else"))
            .append(RcDoc::space())
            .append(child(otherwise, prec, depth))
            .group()
            .nest(2),

        ExprKind::Arith(o, a, b) => infix(a, op(o.symbol()), b, prec, depth),
        ExprKind::Bitwise(o, a, b) => infix(a, op(o.symbol()), b, prec, depth),
        ExprKind::BitNot(a) => op("~").append(child(a, prec, depth)),
        ExprKind::Eq(a, b) => infix(a, op("=="), b, prec, depth),
        ExprKind::Compare(o, a, b) => infix(a, op(o.symbol()), b, prec, depth),
        ExprKind::Cast(a) => kw("cast")
            .append(punct("<"))
            .append(styled(Style::Sort, e.sort()))
            .append(punct(">"))
            .append(lparen(depth))
            .append(to_doc_with_depth(a, depth + 1))
            .append(rparen(depth))
            .group(),

        ExprKind::FieldGet { record, index } => child(record, prec, depth)
            .append(punct("."))
            .append(field_name(record, *index)),
        ExprKind::FieldWith {
            record,
            index,
            value,
        } => child(record, prec, depth)
            .append(RcDoc::space())
            .append(kw("with"))
            .append(RcDoc::space())
            .append(punct("{ "))
            .append(field_name(record, *index))
            .append(punct(" = "))
            .append(to_doc_with_depth(value, depth))
            .append(punct(" }"))
            .group(),
        ExprKind::Create(fields) => {
            let name = e
                .sort()
                .as_record()
                .map(|r| r.name().to_string())
                .unwrap_or_default();
            let entries = fields
                .iter()
                .enumerate()
                .map(|(i, value)| {
                    field_name(e, i)
                        .append(punct(": "))
                        .append(to_doc_with_depth(value, depth))
                });
            styled(Style::Sort, name)
                .append(punct(" {"))
                .append(
                    RcDoc::line()
                        .append(RcDoc::intersperse(entries, punct(",").append(RcDoc::line())))
                        .nest(2),
                )
                .append(RcDoc::line())
                .append(punct("}"))
                .group()
        }

        ExprKind::Cons { head, tail } => infix(head, op("::"), tail, prec, depth),
        ExprKind::Case { seq, empty, cons } => kw("case")
            .append(RcDoc::space())
            .append(child(seq, prec, depth))
            .append(RcDoc::space())
            .append(kw("of"))
            .append(
                RcDoc::line()
                    .append(punct("[] -> "))
                    .append(child(empty, prec, depth))
                    .append(RcDoc::line())
                    .append(punct("_ :: _ -> "))
                    .append(styled(Style::Continuation, format!("<fn {:#x}>", cons.key())))
                    .nest(2),
            )
            .group(),
        ExprKind::Concat(a, b) => infix(a, op("++"), b, prec, depth),
        ExprKind::Length(s) => call("length", [s], depth),
        ExprKind::At { seq, index } => call("at", [seq, index], depth),
        ExprKind::Slice { seq, start, len } => call("slice", [seq, start, len], depth),
        ExprKind::Replace { seq, from, to } => call("replace", [seq, from, to], depth),
        ExprKind::IndexOf { seq, sub, offset } => call("index_of", [seq, sub, offset], depth),
        ExprKind::Containment(kind, seq, sub) => call((*kind).into(), [seq, sub], depth),

        ExprKind::MapGet { map, key } => call("get", [map, key], depth),
        ExprKind::MapSet { map, key, value } => call("set", [map, key, value], depth),
        ExprKind::MapDelete { map, key } => call("delete", [map, key], depth),
        ExprKind::Combine(kind, a, b) => call((*kind).into(), [a, b], depth),
    }
}

// A writer that maps Style annotations to termcolor ColorSpec on a WriteColor sink.
struct ColorWriter<'w, W: WriteColor + Write> {
    out: &'w mut W,
}

impl<'a, 'w, W: WriteColor + Write> RenderAnnotated<'a, Style> for ColorWriter<'w, W> {
    fn push_annotation(&mut self, ann: &'a Style) -> io::Result<()> {
        self.out.set_color(&ann.color_spec())
    }
    fn pop_annotation(&mut self) -> io::Result<()> {
        self.out.reset()
    }
}

impl<'w, W: WriteColor + Write> pretty::Render for ColorWriter<'w, W> {
    type Error = io::Error;
    fn write_str(&mut self, s: &str) -> io::Result<usize> {
        self.out.write_all(s.as_bytes())?;
        Ok(s.len())
    }
    fn write_str_all(&mut self, s: &str) -> io::Result<()> {
        self.out.write_all(s.as_bytes())
    }
    fn fail_doc(&self) -> Self::Error {
        io::Error::other("render failed")
    }
}

fn terminal_width() -> usize {
    term_size::dimensions().map(|(w, _)| w).unwrap_or(80)
}

impl Expr {
    /// Build an RcDoc representation of this expression with style annotations.
    pub fn pretty_doc(&self) -> RcDoc<'static, Style> {
        to_doc_with_depth(self, 0)
    }

    /// Render this expression with colors to any termcolor writer at the given width.
    pub fn pretty_render_to<W: WriteColor + Write>(&self, width: usize, out: &mut W) -> io::Result<()> {
        let mut cw = ColorWriter { out };
        self.pretty_doc().render_raw(width, &mut cw)
    }

    /// Print this expression to stdout with colors (TTY-aware), at the terminal width.
    pub fn pretty_print(&self) -> io::Result<()> {
        let stdout = StandardStream::stdout(ColorChoice::Auto);
        let mut stdout = stdout.lock();
        self.pretty_render_to(terminal_width(), &mut stdout)?;
        writeln!(stdout)
    }

    /// Format this expression into a plain string (no colors).
    pub fn pretty_string(&self, width: usize) -> String {
        let mut buf = String::new();
        let _ = self.pretty_doc().render_fmt(width, &mut buf);
        buf
    }
}

impl std::fmt::Display for Expr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut w = FmtWrite::new(f);
        self.pretty_doc().render_raw(80, &mut w)
    }
}
