//! Abstract syntax tree produced by [`crate::parser::Parser`].
//!
//! Statements and expressions are each a single tagged enum rather than a
//! class hierarchy with virtual dispatch — this lets the interpreter
//! pattern-match exhaustively (spec §9, "AST representation"). Every node
//! carries the source line of its first token for diagnostics. The tree is
//! immutable after parsing: statements own their child statements/
//! expressions by value (`Box`/`Vec`), so a [`Program`] has no lifetime
//! parameter and is `Send + Sync`.

/// A fully parsed program: its `import` statements followed by its function
/// definitions, in source order. Invariant (enforced by the parser): at
/// least one function named `transform` exists with exactly one parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub imports: Vec<ImportStatement>,
    pub functions: Vec<FunctionDef>,
}

impl Program {
    /// Looks up a top-level function definition by name.
    #[must_use]
    pub fn function(&self, name: &str) -> Option<&FunctionDef> {
        self.functions.iter().find(|f| f.name == name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImportStatement {
    pub module: String,
    pub line: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDef {
    pub name: String,
    pub params: Vec<String>,
    pub body: Vec<Stmt>,
    pub line: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Assignment {
        target: Expr,
        value: Expr,
        line: u32,
    },
    If {
        cond: Expr,
        then_body: Vec<Stmt>,
        elifs: Vec<(Expr, Vec<Stmt>)>,
        else_body: Option<Vec<Stmt>>,
        line: u32,
    },
    For {
        var: String,
        iterable: Expr,
        body: Vec<Stmt>,
        line: u32,
    },
    Return {
        value: Option<Expr>,
        line: u32,
    },
    Break {
        line: u32,
    },
    Continue {
        line: u32,
    },
    Import {
        module: String,
        line: u32,
    },
    /// A bare call expression used as a statement, e.g. `OUTPUT.append(x)`.
    Expression {
        expr: Expr,
        line: u32,
    },
}

impl Stmt {
    #[must_use]
    pub fn line(&self) -> u32 {
        match self {
            Self::Assignment { line, .. }
            | Self::If { line, .. }
            | Self::For { line, .. }
            | Self::Return { line, .. }
            | Self::Break { line }
            | Self::Continue { line }
            | Self::Import { line, .. }
            | Self::Expression { line, .. } => *line,
        }
    }
}

/// A literal number, tagged at parse time as integer or double based on the
/// presence of a decimal point in the source (spec §4.1).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NumberLiteral {
    Integer(i64),
    Double(f64),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Identifier {
        name: String,
        line: u32,
    },
    StringLiteral {
        value: String,
        line: u32,
    },
    NumberLiteral {
        value: NumberLiteral,
        line: u32,
    },
    BooleanLiteral {
        value: bool,
        line: u32,
    },
    NullLiteral {
        line: u32,
    },
    ListLiteral {
        elements: Vec<Expr>,
        line: u32,
    },
    DictLiteral {
        entries: Vec<(Expr, Expr)>,
        line: u32,
    },
    BinaryOp {
        left: Box<Expr>,
        op: BinaryOperator,
        right: Box<Expr>,
        line: u32,
    },
    UnaryOp {
        op: UnaryOperator,
        operand: Box<Expr>,
        line: u32,
    },
    AttrAccess {
        object: Box<Expr>,
        attr: String,
        safe: bool,
        line: u32,
    },
    DictAccess {
        object: Box<Expr>,
        key: Box<Expr>,
        safe: bool,
        line: u32,
    },
    MethodCall {
        object: Box<Expr>,
        name: String,
        args: Vec<Expr>,
        line: u32,
    },
    FunctionCallExpression {
        name: String,
        args: Vec<Expr>,
        line: u32,
    },
}

impl Expr {
    #[must_use]
    pub fn line(&self) -> u32 {
        match self {
            Self::Identifier { line, .. }
            | Self::StringLiteral { line, .. }
            | Self::NumberLiteral { line, .. }
            | Self::BooleanLiteral { line, .. }
            | Self::NullLiteral { line }
            | Self::ListLiteral { line, .. }
            | Self::DictLiteral { line, .. }
            | Self::BinaryOp { line, .. }
            | Self::UnaryOp { line, .. }
            | Self::AttrAccess { line, .. }
            | Self::DictAccess { line, .. }
            | Self::MethodCall { line, .. }
            | Self::FunctionCallExpression { line, .. } => *line,
        }
    }

    /// Whether this expression is a valid assignment target (spec §4.2
    /// "Lvalue rule"): an identifier, attribute access, or dict/index access.
    #[must_use]
    pub fn is_lvalue(&self) -> bool {
        matches!(self, Self::Identifier { .. } | Self::AttrAccess { .. } | Self::DictAccess { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    Add,
    Sub,
    Mul,
    Div,
    FloorDiv,
    Mod,
    Pow,
    Eq,
    NotEq,
    Lt,
    Gt,
    LtEq,
    GtEq,
    And,
    Or,
    In,
    NotIn,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOperator {
    Neg,
    Not,
}
