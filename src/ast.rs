// ABOUTME: Typed AST for expressions and statements, with stable per-node identity

use crate::token::Token;
use std::cell::Cell;
use std::rc::Rc;

thread_local! {
    static NEXT_NODE_ID: Cell<u64> = const { Cell::new(0) };
}

/// A monotonically increasing id stamped on every expression node at
/// construction time. The resolver's `locals` side table is keyed on this
/// rather than on structural equality, since the same `Variable("x")` shape
/// recurs throughout a program with different resolved depths (see
/// spec.md §9 Design Notes / Open Questions).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u64);

impl NodeId {
    fn next() -> Self {
        NEXT_NODE_ID.with(|n| {
            let id = n.get();
            n.set(id + 1);
            NodeId(id)
        })
    }
}

#[derive(Debug, Clone)]
pub enum LiteralValue {
    Number(f64),
    String(String),
    Bool(bool),
    Void,
}

#[derive(Debug, Clone)]
pub enum Expr {
    Literal {
        id: NodeId,
        value: LiteralValue,
    },
    Variable {
        id: NodeId,
        name: Token,
    },
    Assign {
        id: NodeId,
        name: Token,
        value: Box<Expr>,
    },
    Unary {
        id: NodeId,
        operator: Token,
        operand: Box<Expr>,
    },
    Binary {
        id: NodeId,
        left: Box<Expr>,
        operator: Token,
        right: Box<Expr>,
    },
    Logical {
        id: NodeId,
        left: Box<Expr>,
        operator: Token,
        right: Box<Expr>,
    },
    Grouping {
        id: NodeId,
        inner: Box<Expr>,
    },
    Call {
        id: NodeId,
        callee: Box<Expr>,
        paren: Token,
        args: Vec<Expr>,
    },
    Get {
        id: NodeId,
        object: Box<Expr>,
        name: Token,
    },
    Set {
        id: NodeId,
        object: Box<Expr>,
        name: Token,
        value: Box<Expr>,
    },
    This {
        id: NodeId,
        keyword: Token,
    },
    Super {
        id: NodeId,
        keyword: Token,
        method: Token,
    },
}

impl Expr {
    pub fn id(&self) -> NodeId {
        match self {
            Expr::Literal { id, .. }
            | Expr::Variable { id, .. }
            | Expr::Assign { id, .. }
            | Expr::Unary { id, .. }
            | Expr::Binary { id, .. }
            | Expr::Logical { id, .. }
            | Expr::Grouping { id, .. }
            | Expr::Call { id, .. }
            | Expr::Get { id, .. }
            | Expr::Set { id, .. }
            | Expr::This { id, .. }
            | Expr::Super { id, .. } => *id,
        }
    }

    pub fn literal(value: LiteralValue) -> Self {
        Expr::Literal { id: NodeId::next(), value }
    }

    pub fn variable(name: Token) -> Self {
        Expr::Variable { id: NodeId::next(), name }
    }

    pub fn assign(name: Token, value: Expr) -> Self {
        Expr::Assign { id: NodeId::next(), name, value: Box::new(value) }
    }

    pub fn unary(operator: Token, operand: Expr) -> Self {
        Expr::Unary { id: NodeId::next(), operator, operand: Box::new(operand) }
    }

    pub fn binary(left: Expr, operator: Token, right: Expr) -> Self {
        Expr::Binary { id: NodeId::next(), left: Box::new(left), operator, right: Box::new(right) }
    }

    pub fn logical(left: Expr, operator: Token, right: Expr) -> Self {
        Expr::Logical { id: NodeId::next(), left: Box::new(left), operator, right: Box::new(right) }
    }

    pub fn grouping(inner: Expr) -> Self {
        Expr::Grouping { id: NodeId::next(), inner: Box::new(inner) }
    }

    pub fn call(callee: Expr, paren: Token, args: Vec<Expr>) -> Self {
        Expr::Call { id: NodeId::next(), callee: Box::new(callee), paren, args }
    }

    pub fn get(object: Expr, name: Token) -> Self {
        Expr::Get { id: NodeId::next(), object: Box::new(object), name }
    }

    pub fn set(object: Expr, name: Token, value: Expr) -> Self {
        Expr::Set { id: NodeId::next(), object: Box::new(object), name, value: Box::new(value) }
    }

    pub fn this(keyword: Token) -> Self {
        Expr::This { id: NodeId::next(), keyword }
    }

    pub fn super_(keyword: Token, method: Token) -> Self {
        Expr::Super { id: NodeId::next(), keyword, method }
    }
}

/// A function declaration's shared shape: used both for `function` statements
/// and for class methods (each method is parsed by the same rule).
#[derive(Debug, Clone)]
pub struct FunctionDecl {
    pub name: Token,
    pub params: Vec<Token>,
    pub body: Rc<Vec<Stmt>>,
}

#[derive(Debug, Clone)]
pub enum Stmt {
    Expression(Expr),
    Print(Expr),
    Let {
        name: Token,
        initializer: Option<Expr>,
    },
    Block(Vec<Stmt>),
    If {
        condition: Expr,
        then_branch: Box<Stmt>,
        else_branch: Option<Box<Stmt>>,
    },
    While {
        condition: Expr,
        body: Box<Stmt>,
    },
    Function(Rc<FunctionDecl>),
    Return {
        keyword: Token,
        value: Option<Expr>,
    },
    Class {
        name: Token,
        superclass: Option<Expr>,
        methods: Vec<Rc<FunctionDecl>>,
    },
}
