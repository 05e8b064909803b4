// ABOUTME: Tree-walking evaluator: environments, call/return, method binding, inheritance

use crate::ast::{Expr, FunctionDecl, LiteralValue, NodeId, Stmt};
use crate::environment::Environment;
use crate::error::RuntimeError;
use crate::token::{Token, TokenType};
use crate::value::{Class, Function, Instance, NativeFunction, Value};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::time::{SystemTime, UNIX_EPOCH};

/// Non-local control transfer out of a statement sequence. Modeled as an
/// explicit signal rather than a panic or exception, so a `return` inside
/// nested blocks and loops unwinds by ordinary `?`-propagation up to the
/// call frame that's waiting for it (spec.md §9 Design Notes).
enum Signal {
    Normal,
    Return(Value),
}

fn clock() -> Value {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    Value::Number(now.as_secs_f64())
}

pub struct Interpreter {
    globals: Rc<Environment>,
    environment: RefCell<Rc<Environment>>,
    locals: HashMap<NodeId, usize>,
}

impl Interpreter {
    pub fn new() -> Self {
        let globals = Environment::new();
        globals.define(
            "clock",
            Value::Native(Rc::new(NativeFunction { name: "clock", arity: 0, func: clock })),
        );
        Interpreter {
            environment: RefCell::new(globals.clone()),
            globals,
            locals: HashMap::new(),
        }
    }

    /// Installs the `locals` side table produced by a resolver pass. The
    /// REPL re-resolves and calls this once per line, while the global
    /// environment (and thus all previously defined bindings) survives
    /// across lines untouched.
    pub fn set_locals(&mut self, locals: HashMap<NodeId, usize>) {
        self.locals = locals;
    }

    pub fn interpret(&self, statements: &[Stmt]) -> Result<(), RuntimeError> {
        for statement in statements {
            self.execute(statement)?;
        }
        Ok(())
    }

    // ===== statements =====

    fn execute(&self, stmt: &Stmt) -> Result<Signal, RuntimeError> {
        match stmt {
            Stmt::Expression(expr) => {
                self.evaluate(expr)?;
                Ok(Signal::Normal)
            }
            Stmt::Print(expr) => {
                let value = self.evaluate(expr)?;
                println!("{value}");
                Ok(Signal::Normal)
            }
            Stmt::Let { name, initializer } => {
                let value = match initializer {
                    Some(init) => self.evaluate(init)?,
                    None => Value::Void,
                };
                self.environment.borrow().define(name.lexeme.clone(), value);
                Ok(Signal::Normal)
            }
            Stmt::Block(statements) => {
                let enclosing = self.environment.borrow().clone();
                let block_env = Environment::with_parent(enclosing);
                self.execute_block(statements, block_env)
            }
            Stmt::If { condition, then_branch, else_branch } => {
                if self.evaluate(condition)?.is_truthy() {
                    self.execute(then_branch)
                } else if let Some(else_branch) = else_branch {
                    self.execute(else_branch)
                } else {
                    Ok(Signal::Normal)
                }
            }
            Stmt::While { condition, body } => {
                while self.evaluate(condition)?.is_truthy() {
                    match self.execute(body)? {
                        Signal::Normal => {}
                        signal @ Signal::Return(_) => return Ok(signal),
                    }
                }
                Ok(Signal::Normal)
            }
            Stmt::Function(decl) => {
                let function = Function {
                    declaration: decl.clone(),
                    closure: self.environment.borrow().clone(),
                    is_initializer: false,
                };
                self.environment
                    .borrow()
                    .define(decl.name.lexeme.clone(), Value::Function(Rc::new(function)));
                Ok(Signal::Normal)
            }
            Stmt::Return { value, .. } => {
                let value = match value {
                    Some(expr) => self.evaluate(expr)?,
                    None => Value::Void,
                };
                Ok(Signal::Return(value))
            }
            Stmt::Class { name, superclass, methods } => {
                self.execute_class(name, superclass.as_ref(), methods)
            }
        }
    }

    /// Executes `statements` in `env`, restoring the previously current
    /// environment on every exit path — normal completion, a propagated
    /// return, or a runtime error — so scope entry/exit stays properly
    /// nested (spec.md §5).
    fn execute_block(&self, statements: &[Stmt], env: Rc<Environment>) -> Result<Signal, RuntimeError> {
        let previous = self.environment.replace(env);
        let result = (|| {
            for statement in statements {
                match self.execute(statement)? {
                    Signal::Normal => {}
                    signal @ Signal::Return(_) => return Ok(signal),
                }
            }
            Ok(Signal::Normal)
        })();
        self.environment.replace(previous);
        result
    }

    fn execute_class(
        &self,
        name: &Token,
        superclass_expr: Option<&Expr>,
        methods: &[Rc<FunctionDecl>],
    ) -> Result<Signal, RuntimeError> {
        let superclass = match superclass_expr {
            Some(expr) => match self.evaluate(expr)? {
                Value::Class(class) => Some(class),
                _ => return Err(RuntimeError::at(superclass_name_token(expr), "Superclass must be a class.")),
            },
            None => None,
        };

        self.environment.borrow().define(name.lexeme.clone(), Value::Void);

        let mut method_env = self.environment.borrow().clone();
        if let Some(superclass) = &superclass {
            method_env = Environment::with_parent(method_env);
            method_env.define("super", Value::Class(superclass.clone()));
        }

        let mut method_map = HashMap::new();
        for method in methods {
            let function = Function {
                declaration: method.clone(),
                closure: method_env.clone(),
                is_initializer: method.name.lexeme == "construct",
            };
            method_map.insert(method.name.lexeme.clone(), function);
        }

        let class = Rc::new(Class { name: name.lexeme.clone(), superclass, methods: method_map });
        self.environment.borrow().assign(name, Value::Class(class))?;

        Ok(Signal::Normal)
    }

    // ===== expressions =====

    fn evaluate(&self, expr: &Expr) -> Result<Value, RuntimeError> {
        match expr {
            Expr::Literal { value, .. } => Ok(literal_value(value)),
            Expr::Grouping { inner, .. } => self.evaluate(inner),
            Expr::Variable { id, name } => self.lookup_variable(*id, name),
            Expr::This { id, keyword } => self.lookup_variable(*id, keyword),
            Expr::Super { id, keyword, method } => self.evaluate_super(*id, keyword, method),
            Expr::Assign { id, name, value } => {
                let value = self.evaluate(value)?;
                match self.locals.get(id) {
                    Some(&distance) => self.environment.borrow().assign_at(distance, &name.lexeme, value.clone()),
                    None => self.globals.assign(name, value.clone())?,
                }
                Ok(value)
            }
            Expr::Unary { operator, operand, .. } => self.evaluate_unary(operator, operand),
            Expr::Binary { left, operator, right, .. } => self.evaluate_binary(left, operator, right),
            Expr::Logical { left, operator, right, .. } => self.evaluate_logical(left, operator, right),
            Expr::Call { callee, paren, args, .. } => self.evaluate_call(callee, paren, args),
            Expr::Get { object, name, .. } => self.evaluate_get(object, name),
            Expr::Set { object, name, value, .. } => self.evaluate_set(object, name, value),
        }
    }

    fn lookup_variable(&self, id: NodeId, name: &Token) -> Result<Value, RuntimeError> {
        match self.locals.get(&id) {
            Some(&distance) => Ok(self.environment.borrow().get_at(distance, &name.lexeme)),
            None => self.globals.get(name),
        }
    }

    fn evaluate_super(&self, id: NodeId, keyword: &Token, method_name: &Token) -> Result<Value, RuntimeError> {
        let distance = *self
            .locals
            .get(&id)
            .unwrap_or_else(|| panic!("resolver did not record a distance for 'super'"));
        let superclass = match self.environment.borrow().get_at(distance, "super") {
            Value::Class(class) => class,
            other => panic!("resolver bound 'super' to a non-class value: {other:?}"),
        };
        let instance = self.environment.borrow().get_at(distance - 1, "this");

        match superclass.find_method(&method_name.lexeme) {
            Some(method) => Ok(Value::Function(Rc::new(method.bind(instance)))),
            None => Err(RuntimeError::at(
                keyword,
                format!("Undefined property '{}'.", method_name.lexeme),
            )),
        }
    }

    fn evaluate_unary(&self, operator: &Token, operand: &Expr) -> Result<Value, RuntimeError> {
        let right = self.evaluate(operand)?;
        match operator.kind {
            TokenType::Minus => Ok(Value::Number(-number_operand(operator, &right)?)),
            TokenType::Plus => Ok(Value::Number(number_operand(operator, &right)?)),
            TokenType::Bang => Ok(Value::Bool(!right.is_truthy())),
            other => unreachable!("unary operator {other:?} unreachable by parser construction"),
        }
    }

    fn evaluate_binary(&self, left: &Expr, operator: &Token, right: &Expr) -> Result<Value, RuntimeError> {
        let left = self.evaluate(left)?;
        let right = self.evaluate(right)?;

        match operator.kind {
            TokenType::Greater => {
                let (l, r) = number_operands(operator, &left, &right)?;
                Ok(Value::Bool(l > r))
            }
            TokenType::GreaterEqual => {
                let (l, r) = number_operands(operator, &left, &right)?;
                Ok(Value::Bool(l >= r))
            }
            TokenType::Less => {
                let (l, r) = number_operands(operator, &left, &right)?;
                Ok(Value::Bool(l < r))
            }
            TokenType::LessEqual => {
                let (l, r) = number_operands(operator, &left, &right)?;
                Ok(Value::Bool(l <= r))
            }
            TokenType::BangEqual => Ok(Value::Bool(left != right)),
            TokenType::EqualEqual => Ok(Value::Bool(left == right)),
            TokenType::Minus => {
                let (l, r) = number_operands(operator, &left, &right)?;
                Ok(Value::Number(l - r))
            }
            TokenType::Slash => {
                let (l, r) = number_operands(operator, &left, &right)?;
                Ok(Value::Number(l / r))
            }
            TokenType::Star => {
                let (l, r) = number_operands(operator, &left, &right)?;
                Ok(Value::Number(l * r))
            }
            TokenType::Plus => match (&left, &right) {
                (Value::Number(l), Value::Number(r)) => Ok(Value::Number(l + r)),
                (Value::String(l), Value::String(r)) => Ok(Value::String(format!("{l}{r}"))),
                _ => Err(RuntimeError::at(operator, "Operands must be two numbers or two strings.")),
            },
            other => unreachable!("binary operator {other:?} unreachable by parser construction"),
        }
    }

    fn evaluate_logical(&self, left: &Expr, operator: &Token, right: &Expr) -> Result<Value, RuntimeError> {
        let left = self.evaluate(left)?;
        match operator.kind {
            TokenType::Or => {
                if left.is_truthy() {
                    Ok(left)
                } else {
                    self.evaluate(right)
                }
            }
            TokenType::And => {
                if !left.is_truthy() {
                    Ok(left)
                } else {
                    self.evaluate(right)
                }
            }
            other => unreachable!("logical operator {other:?} unreachable by parser construction"),
        }
    }

    fn evaluate_call(&self, callee: &Expr, paren: &Token, args: &[Expr]) -> Result<Value, RuntimeError> {
        let callee = self.evaluate(callee)?;

        let mut arguments = Vec::with_capacity(args.len());
        for arg in args {
            arguments.push(self.evaluate(arg)?);
        }

        match callee {
            Value::Function(function) => self.check_arity(paren, function.arity(), arguments.len())
                .and_then(|_| self.call_function(&function, arguments)),
            Value::Native(native) => self
                .check_arity(paren, native.arity, arguments.len())
                .map(|_| (native.func)()),
            Value::Class(class) => self.check_arity(paren, class.arity(), arguments.len())
                .and_then(|_| self.instantiate(&class, arguments)),
            _ => Err(RuntimeError::at(paren, "Can only call functions and classes.")),
        }
    }

    fn check_arity(&self, paren: &Token, expected: usize, got: usize) -> Result<(), RuntimeError> {
        if expected != got {
            Err(RuntimeError::at(paren, format!("Expected {expected} arguments but got {got}.")))
        } else {
            Ok(())
        }
    }

    /// Executes a user-defined function's body in a fresh environment
    /// parented by its closure. Initializers (`construct`) always yield the
    /// bound `this`, regardless of whether the body returned explicitly.
    fn call_function(&self, function: &Function, arguments: Vec<Value>) -> Result<Value, RuntimeError> {
        let call_env = Environment::with_parent(function.closure.clone());
        for (param, arg) in function.declaration.params.iter().zip(arguments) {
            call_env.define(param.lexeme.clone(), arg);
        }

        let signal = self.execute_block(&function.declaration.body, call_env)?;

        if function.is_initializer {
            return Ok(function.closure.get_at(0, "this"));
        }

        match signal {
            Signal::Normal => Ok(Value::Void),
            Signal::Return(value) => Ok(value),
        }
    }

    fn instantiate(&self, class: &Rc<Class>, arguments: Vec<Value>) -> Result<Value, RuntimeError> {
        let instance = Rc::new(Instance { class: class.clone(), fields: RefCell::new(HashMap::new()) });

        if let Some(initializer) = class.find_method("construct") {
            let bound = initializer.bind(Value::Instance(instance.clone()));
            self.call_function(&bound, arguments)?;
        }

        Ok(Value::Instance(instance))
    }

    fn evaluate_get(&self, object: &Expr, name: &Token) -> Result<Value, RuntimeError> {
        match self.evaluate(object)? {
            Value::Instance(instance) => {
                if let Some(value) = instance.fields.borrow().get(&name.lexeme) {
                    return Ok(value.clone());
                }
                match instance.class.find_method(&name.lexeme) {
                    Some(method) => Ok(Value::Function(Rc::new(method.bind(Value::Instance(instance.clone()))))),
                    None => Err(RuntimeError::at(name, format!("Undefined property '{}'.", name.lexeme))),
                }
            }
            _ => Err(RuntimeError::at(name, "Only instances have properties.")),
        }
    }

    fn evaluate_set(&self, object: &Expr, name: &Token, value: &Expr) -> Result<Value, RuntimeError> {
        match self.evaluate(object)? {
            Value::Instance(instance) => {
                let value = self.evaluate(value)?;
                instance.fields.borrow_mut().insert(name.lexeme.clone(), value.clone());
                Ok(value)
            }
            _ => Err(RuntimeError::at(name, "Only instances have fields.")),
        }
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

fn literal_value(value: &LiteralValue) -> Value {
    match value {
        LiteralValue::Number(n) => Value::Number(*n),
        LiteralValue::String(s) => Value::String(s.clone()),
        LiteralValue::Bool(b) => Value::Bool(*b),
        LiteralValue::Void => Value::Void,
    }
}

fn number_operand(operator: &Token, value: &Value) -> Result<f64, RuntimeError> {
    match value {
        Value::Number(n) => Ok(*n),
        _ => Err(RuntimeError::at(operator, "Operand must be a number.")),
    }
}

fn number_operands(operator: &Token, left: &Value, right: &Value) -> Result<(f64, f64), RuntimeError> {
    match (left, right) {
        (Value::Number(l), Value::Number(r)) => Ok((*l, *r)),
        _ => Err(RuntimeError::at(operator, "Operands must be numbers.")),
    }
}

/// The superclass clause is always parsed as a bare `Variable` expression
/// (spec.md §4.2's `class_declaration` rule); used to anchor the "Superclass
/// must be a class." diagnostic at the right source line.
fn superclass_name_token(expr: &Expr) -> &Token {
    match expr {
        Expr::Variable { name, .. } => name,
        other => unreachable!("superclass clause is always a Variable expr, got {other:?}"),
    }
}
