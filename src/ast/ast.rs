use crate::Span;

/// Expression node. Built once by the parser, consumed once by the code
/// generator; children are owned exclusively, so the tree has no sharing and
/// no cycles.
///
/// A closed enum on purpose: the code generator matches exhaustively, so a
/// new variant fails to compile until every consumer handles it.
#[derive(Debug, Clone)]
pub enum Expr {
    Number {
        value: f64,
        span: Span,
    },
    Variable {
        name: String,
        span: Span,
    },
    Unary {
        op: char,
        operand: Box<Expr>,
        span: Span,
    },
    Binary {
        op: char,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
        span: Span,
    },
    Call {
        callee: String,
        args: Vec<Expr>,
        span: Span,
    },
    /// Both arms are mandatory; there is no single-armed `if`.
    If {
        cond: Box<Expr>,
        then_expr: Box<Expr>,
        else_expr: Box<Expr>,
        span: Span,
    },
    For {
        var_name: String,
        start: Box<Expr>,
        end: Box<Expr>,
        step: Option<Box<Expr>>,
        body: Box<Expr>,
        span: Span,
    },
    /// `var a = 1, b in body` — each binding may omit its initializer.
    Var {
        bindings: Vec<(String, Option<Expr>)>,
        body: Box<Expr>,
        span: Span,
    },
}

impl Expr {
    pub fn span(&self) -> &Span {
        match self {
            Expr::Number { span, .. } => span,
            Expr::Variable { span, .. } => span,
            Expr::Unary { span, .. } => span,
            Expr::Binary { span, .. } => span,
            Expr::Call { span, .. } => span,
            Expr::If { span, .. } => span,
            Expr::For { span, .. } => span,
            Expr::Var { span, .. } => span,
        }
    }
}

/// Function signature: name, parameter names, and — when the name encodes
/// `unary<op>` or `binary<op>` — the operator's surface syntax.
#[derive(Debug, Clone)]
pub struct Prototype {
    pub name: String,
    pub params: Vec<String>,
    pub is_operator: bool,
    pub precedence: i32,
    pub span: Span,
}

impl Prototype {
    pub fn is_unary_op(&self) -> bool {
        self.is_operator && self.params.len() == 1
    }

    pub fn is_binary_op(&self) -> bool {
        self.is_operator && self.params.len() == 2
    }

    /// The operator character an operator prototype defines. The name is
    /// `unary<op>` or `binary<op>`, so the character is the last one.
    pub fn operator_char(&self) -> char {
        debug_assert!(self.is_operator);
        self.name.chars().last().unwrap_or('\u{0}')
    }
}

#[derive(Debug, Clone)]
pub struct Function {
    pub proto: Prototype,
    pub body: Expr,
    /// A bare top-level expression wrapped in a synthetic zero-parameter
    /// function. Executed once in JIT mode, then unloaded.
    pub is_anonymous: bool,
}

/// One top-level unit of compilation.
#[derive(Debug, Clone)]
pub enum Item {
    Definition(Function),
    Extern(Prototype),
}
