//! Tree-walking interpreter for Unicorn scripts.

use std::cell::RefCell;
use std::collections::HashMap;
use std::io::Write;
use std::rc::Rc;

use shine_parser::ast::*;
use thiserror::Error;

use crate::env::{AssignError, BindingKind, Environment};
use crate::value::{RainbowFn, SparkleClass, SparkleInstance, Value};

/// Recursion limit for rainbow calls.
const MAX_CALL_DEPTH: usize = 200;

/// A runtime fault: the message plus the rainbow-call trace at the point
/// of failure, innermost frame first.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct RuntimeFault {
    pub message: String,
    pub trace: Vec<String>,
}

/// How a statement finished.
enum Flow {
    Normal,
    Return(Value),
}

type ExecResult = Result<Flow, RuntimeFault>;

/// Executes a parsed script. Side effects happen live; `twinkle` writes
/// through the configured sink (stdout by default).
pub struct Interpreter {
    globals: Rc<RefCell<Environment>>,
    out: Box<dyn Write>,
    call_stack: Vec<String>,
}

impl Interpreter {
    pub fn new() -> Self {
        Self {
            globals: Environment::root(),
            out: Box::new(std::io::stdout()),
            call_stack: Vec::new(),
        }
    }

    /// Redirects `twinkle` output, for embedding and tests.
    pub fn with_output(mut self, out: Box<dyn Write>) -> Self {
        self.out = out;
        self
    }

    /// Runs a whole program in the global scope.
    pub fn run(&mut self, program: &Program) -> Result<(), RuntimeFault> {
        let globals = Rc::clone(&self.globals);
        for stmt in &program.statements {
            match self.execute(stmt, &globals)? {
                Flow::Normal => {}
                Flow::Return(_) => {
                    return Err(self.fault("return outside of a rainbow"));
                }
            }
        }
        Ok(())
    }

    fn fault(&self, message: impl Into<String>) -> RuntimeFault {
        RuntimeFault {
            message: message.into(),
            trace: self
                .call_stack
                .iter()
                .rev()
                .map(|name| format!("in rainbow '{}'", name))
                .collect(),
        }
    }

    // ========================================================================
    // Statements
    // ========================================================================

    fn execute(&mut self, stmt: &Stmt, env: &Rc<RefCell<Environment>>) -> ExecResult {
        match stmt {
            Stmt::Twinkle(expr) => {
                let value = self.eval(expr, env)?;
                writeln!(self.out, "\u{2728} {} \u{2728}", value)
                    .map_err(|e| self.fault(format!("twinkle failed: {}", e)))?;
                Ok(Flow::Normal)
            }

            Stmt::Declare { kind, name, init } => {
                let value = self.eval(init, env)?;
                let binding = match kind {
                    DeclKind::Fairy => BindingKind::Fixed,
                    DeclKind::Unicorn => BindingKind::StringOnly,
                    DeclKind::Magic
                    | DeclKind::Dragon
                    | DeclKind::Pixie
                    | DeclKind::PixieDust => BindingKind::Mutable,
                };
                env.borrow_mut().define(name.clone(), value, binding);
                Ok(Flow::Normal)
            }

            Stmt::If {
                condition,
                then_branch,
                unless_branch,
            } => {
                if self.eval(condition, env)?.is_truthy() {
                    self.execute_block(then_branch, &Environment::child_of(env))
                } else if let Some(unless) = unless_branch {
                    self.execute_block(unless, &Environment::child_of(env))
                } else {
                    Ok(Flow::Normal)
                }
            }

            Stmt::Repeat { count, body } => {
                let count = self.eval(count, env)?;
                let count_type = count.type_name();
                let Value::Number(n) = count else {
                    return Err(self.fault(format!(
                        "repeat count must be a number, got {}",
                        count_type
                    )));
                };
                let iterations = if n.is_finite() && n > 0.0 {
                    n.floor() as u64
                } else {
                    0
                };
                for _ in 0..iterations {
                    match self.execute_block(body, &Environment::child_of(env))? {
                        Flow::Normal => {}
                        flow @ Flow::Return(_) => return Ok(flow),
                    }
                }
                Ok(Flow::Normal)
            }

            Stmt::Function(decl) => {
                let func = RainbowFn {
                    decl: Rc::new(decl.clone()),
                    closure: Rc::clone(env),
                    bound_this: None,
                };
                env.borrow_mut().define(
                    decl.name.clone(),
                    Value::Rainbow(Rc::new(func)),
                    BindingKind::Mutable,
                );
                Ok(Flow::Normal)
            }

            Stmt::Sparkle {
                name,
                init,
                methods,
            } => {
                let make = |decl: &FunctionDecl| {
                    Rc::new(RainbowFn {
                        decl: Rc::new(decl.clone()),
                        closure: Rc::clone(env),
                        bound_this: None,
                    })
                };
                let class = SparkleClass {
                    name: name.clone(),
                    init: init.as_ref().map(&make),
                    methods: methods.iter().map(|m| (m.name.clone(), make(m))).collect(),
                };
                env.borrow_mut().define(
                    name.clone(),
                    Value::Sparkle(Rc::new(class)),
                    BindingKind::Mutable,
                );
                Ok(Flow::Normal)
            }

            Stmt::Try {
                body,
                catch_name,
                catch_body,
                finally_body,
            } => {
                let depth = self.call_stack.len();
                let mut flow = self.execute_block(body, &Environment::child_of(env));

                if let Err(fault) = flow {
                    self.call_stack.truncate(depth);
                    let catch_env = Environment::child_of(env);
                    catch_env.borrow_mut().define(
                        catch_name.clone(),
                        Value::Str(fault.message),
                        BindingKind::Mutable,
                    );
                    flow = self.execute_block(catch_body, &catch_env);
                }

                if let Some(finally) = finally_body {
                    // A return or fault inside finally wins over the body's.
                    if let Flow::Return(v) =
                        self.execute_block(finally, &Environment::child_of(env))?
                    {
                        return Ok(Flow::Return(v));
                    }
                }

                flow
            }

            Stmt::Return(value) => {
                let value = match value {
                    Some(expr) => self.eval(expr, env)?,
                    None => Value::Null,
                };
                Ok(Flow::Return(value))
            }

            Stmt::Expression(expr) => {
                self.eval(expr, env)?;
                Ok(Flow::Normal)
            }
        }
    }

    fn execute_block(&mut self, stmts: &[Stmt], env: &Rc<RefCell<Environment>>) -> ExecResult {
        for stmt in stmts {
            match self.execute(stmt, env)? {
                Flow::Normal => {}
                flow @ Flow::Return(_) => return Ok(flow),
            }
        }
        Ok(Flow::Normal)
    }

    // ========================================================================
    // Expressions
    // ========================================================================

    fn eval(&mut self, expr: &Expr, env: &Rc<RefCell<Environment>>) -> Result<Value, RuntimeFault> {
        match expr {
            Expr::Number(n) => Ok(Value::Number(*n)),
            Expr::Str(s) => Ok(Value::Str(s.clone())),
            Expr::Bool(b) => Ok(Value::Bool(*b)),
            Expr::Null => Ok(Value::Null),

            Expr::Array(items) => {
                let mut values = Vec::with_capacity(items.len());
                for item in items {
                    values.push(self.eval(item, env)?);
                }
                Ok(Value::Array(Rc::new(RefCell::new(values))))
            }

            Expr::Variable(name) => Environment::get(env, name)
                .ok_or_else(|| self.fault(format!("Undefined variable '{}'", name))),

            Expr::This => Environment::get(env, "this")
                .ok_or_else(|| self.fault("'this' outside of a sparkle method")),

            Expr::Assign { name, value } => {
                let value = self.eval(value, env)?;
                Environment::assign(env, name, value.clone()).map_err(|e| match e {
                    AssignError::Undefined => {
                        self.fault(format!("Undefined variable '{}'", name))
                    }
                    AssignError::Fixed => {
                        self.fault(format!("Cannot re-assign fairy binding '{}'", name))
                    }
                    AssignError::NotAString => {
                        self.fault(format!("unicorn binding '{}' only accepts strings", name))
                    }
                })?;
                Ok(value)
            }

            Expr::GetProperty { object, name } => {
                let object = self.eval(object, env)?;
                match object {
                    Value::Instance(instance) => {
                        if let Some(value) = instance.borrow().fields.get(name) {
                            return Ok(value.clone());
                        }
                        let method = instance.borrow().class.methods.get(name).cloned();
                        match method {
                            Some(method) => Ok(Value::Rainbow(Rc::new(RainbowFn {
                                decl: Rc::clone(&method.decl),
                                closure: Rc::clone(&method.closure),
                                bound_this: Some(Rc::clone(&instance)),
                            }))),
                            None => {
                                let class = instance.borrow().class.name.clone();
                                Err(self.fault(format!(
                                    "Unknown property '{}' on {}",
                                    name, class
                                )))
                            }
                        }
                    }
                    Value::Array(items) if name == "length" => {
                        Ok(Value::Number(items.borrow().len() as f64))
                    }
                    Value::Str(s) if name == "length" => {
                        Ok(Value::Number(s.chars().count() as f64))
                    }
                    other => Err(self.fault(format!(
                        "Cannot read property '{}' of {}",
                        name,
                        other.type_name()
                    ))),
                }
            }

            Expr::SetProperty {
                object,
                name,
                value,
            } => {
                let object = self.eval(object, env)?;
                let object_type = object.type_name();
                let Value::Instance(instance) = object else {
                    return Err(self.fault(format!(
                        "Cannot set property '{}' on {}",
                        name, object_type
                    )));
                };
                let value = self.eval(value, env)?;
                instance
                    .borrow_mut()
                    .fields
                    .insert(name.clone(), value.clone());
                Ok(value)
            }

            Expr::Index { object, index } => {
                let object = self.eval(object, env)?;
                let index = self.eval(index, env)?;
                let (items, i) = self.array_index(object, index)?;
                let items = items.borrow();
                Ok(items[i].clone())
            }

            Expr::SetIndex {
                object,
                index,
                value,
            } => {
                let object = self.eval(object, env)?;
                let index = self.eval(index, env)?;
                let (items, i) = self.array_index(object, index)?;
                let value = self.eval(value, env)?;
                items.borrow_mut()[i] = value.clone();
                Ok(value)
            }

            Expr::Unary { op, operand } => {
                let operand = self.eval(operand, env)?;
                match op {
                    UnaryOp::Not => Ok(Value::Bool(!operand.is_truthy())),
                    UnaryOp::Neg => match operand {
                        Value::Number(n) => Ok(Value::Number(-n)),
                        other => Err(self
                            .fault(format!("Cannot negate a {}", other.type_name()))),
                    },
                }
            }

            Expr::Binary { left, op, right } => {
                let left = self.eval(left, env)?;
                let right = self.eval(right, env)?;
                self.binary(*op, left, right)
            }

            Expr::Logical { left, op, right } => {
                let left = self.eval(left, env)?;
                match op {
                    LogicalOp::And if !left.is_truthy() => Ok(left),
                    LogicalOp::Or if left.is_truthy() => Ok(left),
                    _ => self.eval(right, env),
                }
            }

            Expr::Call { callee, args } => {
                let callee = self.eval(callee, env)?;
                let mut arg_values = Vec::with_capacity(args.len());
                for arg in args {
                    arg_values.push(self.eval(arg, env)?);
                }
                match callee {
                    Value::Rainbow(func) => self.call_rainbow(&func, arg_values),
                    Value::Sparkle(class) => Err(self.fault(format!(
                        "sparkle '{}' must be created with new",
                        class.name
                    ))),
                    other => {
                        Err(self.fault(format!("Cannot call a {}", other.type_name())))
                    }
                }
            }

            Expr::New { class, args } => {
                let value = Environment::get(env, class)
                    .ok_or_else(|| self.fault(format!("Unknown sparkle '{}'", class)))?;
                let Value::Sparkle(class_rc) = value else {
                    return Err(self.fault(format!("'{}' is not a sparkle", class)));
                };
                let mut arg_values = Vec::with_capacity(args.len());
                for arg in args {
                    arg_values.push(self.eval(arg, env)?);
                }
                let instance = Rc::new(RefCell::new(SparkleInstance {
                    class: Rc::clone(&class_rc),
                    fields: HashMap::new(),
                }));
                if let Some(init) = &class_rc.init {
                    let bound = Rc::new(RainbowFn {
                        decl: Rc::clone(&init.decl),
                        closure: Rc::clone(&init.closure),
                        bound_this: Some(Rc::clone(&instance)),
                    });
                    self.call_rainbow(&bound, arg_values)?;
                }
                Ok(Value::Instance(instance))
            }
        }
    }

    fn call_rainbow(
        &mut self,
        func: &Rc<RainbowFn>,
        args: Vec<Value>,
    ) -> Result<Value, RuntimeFault> {
        if args.len() != func.decl.params.len() {
            return Err(self.fault(format!(
                "rainbow '{}' expects {} arguments, got {}",
                func.decl.name,
                func.decl.params.len(),
                args.len()
            )));
        }
        if self.call_stack.len() >= MAX_CALL_DEPTH {
            return Err(self.fault("Rainbow calls nested too deeply"));
        }

        let call_env = Environment::child_of(&func.closure);
        {
            let mut e = call_env.borrow_mut();
            if let Some(this) = &func.bound_this {
                e.define("this", Value::Instance(Rc::clone(this)), BindingKind::Fixed);
            }
            for (param, arg) in func.decl.params.iter().zip(args) {
                e.define(param.clone(), arg, BindingKind::Mutable);
            }
        }

        self.call_stack.push(func.decl.name.clone());
        let result = self.execute_block(&func.decl.body, &call_env);
        self.call_stack.pop();

        match result? {
            Flow::Return(value) => Ok(value),
            Flow::Normal => Ok(Value::Null),
        }
    }

    /// Checks an index expression pair down to (array, usize).
    fn array_index(
        &self,
        object: Value,
        index: Value,
    ) -> Result<(Rc<RefCell<Vec<Value>>>, usize), RuntimeFault> {
        let object_type = object.type_name();
        let Value::Array(items) = object else {
            return Err(self.fault(format!("Cannot index a {}", object_type)));
        };
        let index_type = index.type_name();
        let Value::Number(n) = index else {
            return Err(self.fault(format!(
                "Array index must be a number, got {}",
                index_type
            )));
        };
        let len = items.borrow().len();
        if n.fract() != 0.0 || n < 0.0 || (n as usize) >= len {
            return Err(self.fault(format!("Index {} out of bounds (length {})", n, len)));
        }
        Ok((items, n as usize))
    }

    fn binary(&self, op: BinaryOp, left: Value, right: Value) -> Result<Value, RuntimeFault> {
        match op {
            BinaryOp::Add => match (left, right) {
                (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a + b)),
                (Value::Str(a), b) => Ok(Value::Str(format!("{}{}", a, b))),
                (a, Value::Str(b)) => Ok(Value::Str(format!("{}{}", a, b))),
                (a, b) => Err(self.fault(format!(
                    "Cannot add {} and {}",
                    a.type_name(),
                    b.type_name()
                ))),
            },
            BinaryOp::Sub => self.numeric(op, left, right, |a, b| a - b),
            BinaryOp::Mul => self.numeric(op, left, right, |a, b| a * b),
            BinaryOp::Div => self.numeric(op, left, right, |a, b| a / b),
            BinaryOp::Rem => self.numeric(op, left, right, |a, b| a % b),
            BinaryOp::Eq => Ok(Value::Bool(left.equals(&right))),
            BinaryOp::Ne => Ok(Value::Bool(!left.equals(&right))),
            BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge => {
                let ordering = match (&left, &right) {
                    (Value::Number(a), Value::Number(b)) => a.partial_cmp(b),
                    (Value::Str(a), Value::Str(b)) => Some(a.cmp(b)),
                    _ => None,
                };
                let Some(ordering) = ordering else {
                    return Err(self.fault(format!(
                        "Cannot compare {} and {}",
                        left.type_name(),
                        right.type_name()
                    )));
                };
                let result = match op {
                    BinaryOp::Lt => ordering.is_lt(),
                    BinaryOp::Le => ordering.is_le(),
                    BinaryOp::Gt => ordering.is_gt(),
                    _ => ordering.is_ge(),
                };
                Ok(Value::Bool(result))
            }
        }
    }

    fn numeric(
        &self,
        op: BinaryOp,
        left: Value,
        right: Value,
        apply: impl Fn(f64, f64) -> f64,
    ) -> Result<Value, RuntimeFault> {
        match (left, right) {
            (Value::Number(a), Value::Number(b)) => Ok(Value::Number(apply(a, b))),
            (a, b) => Err(self.fault(format!(
                "Cannot apply {:?} to {} and {}",
                op,
                a.type_name(),
                b.type_name()
            ))),
        }
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shine_parser::parse_program;

    #[derive(Clone, Default)]
    struct SharedBuf(Rc<RefCell<Vec<u8>>>);

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.borrow_mut().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    fn run(source: &str) -> Result<String, RuntimeFault> {
        let program = parse_program(source).expect("script should parse");
        let buf = SharedBuf::default();
        let mut interpreter = Interpreter::new().with_output(Box::new(buf.clone()));
        interpreter.run(&program)?;
        let bytes = buf.0.borrow().clone();
        Ok(String::from_utf8(bytes).unwrap())
    }

    #[test]
    fn test_twinkle_wraps_output_in_markers() {
        assert_eq!(run(r#"twinkle "Hello";"#).unwrap(), "✨ Hello ✨\n");
    }

    #[test]
    fn test_twinkle_formats_numbers() {
        assert_eq!(run("twinkle 2 + 2;").unwrap(), "✨ 4 ✨\n");
        assert_eq!(run("twinkle 7 / 2;").unwrap(), "✨ 3.5 ✨\n");
    }

    #[test]
    fn test_fairy_is_single_assignment() {
        let fault = run(r#"fairy pi = 3.14; pi = 3;"#).unwrap_err();
        assert!(fault.message.contains("fairy"));
    }

    #[test]
    fn test_magic_and_dragon_reassign() {
        assert_eq!(
            run("magic x = 1; x = 2; dragon y = 3; y = y + 1; twinkle x + y;").unwrap(),
            "✨ 6 ✨\n"
        );
    }

    #[test]
    fn test_unicorn_accepts_only_strings() {
        let fault = run(r#"unicorn name = "Star"; name = 5;"#).unwrap_err();
        assert!(fault.message.contains("strings"));
        assert_eq!(
            run(r#"unicorn name = "Star"; name = "Moon"; twinkle name;"#).unwrap(),
            "✨ Moon ✨\n"
        );
    }

    #[test]
    fn test_pixie_and_pixie_dust() {
        assert_eq!(
            run("pixie happy = yes; pixieDust bag = [1, 2, 3]; twinkle happy; twinkle bag;")
                .unwrap(),
            "✨ true ✨\n✨ [1, 2, 3] ✨\n"
        );
    }

    #[test]
    fn test_if_unless_true_branch() {
        let out = run(r#"if (1 is 1) { twinkle "A"; } unless { twinkle "B"; }"#).unwrap();
        assert_eq!(out, "✨ A ✨\n");
    }

    #[test]
    fn test_if_unless_false_branch() {
        let out = run(r#"if (1 is 2) { twinkle "A"; } unless { twinkle "B"; }"#).unwrap();
        assert_eq!(out, "✨ B ✨\n");
    }

    #[test]
    fn test_nested_conditionals() {
        let out = run(
            r#"
            magic a = yes;
            magic b = no;
            if (a) {
                if (b) {
                    twinkle "both";
                } unless {
                    twinkle "only a";
                }
            }
            "#,
        )
        .unwrap();
        assert_eq!(out, "✨ only a ✨\n");
    }

    #[test]
    fn test_repeat_counts() {
        let out = run(
            r#"
            magic total = 0;
            repeat 4 times { total = total + 1; }
            twinkle total;
            "#,
        )
        .unwrap();
        assert_eq!(out, "✨ 4 ✨\n");
    }

    #[test]
    fn test_repeat_zero_and_negative() {
        let out = run(
            r#"
            magic hits = 0;
            repeat 0 times { hits = hits + 1; }
            repeat 0 - 3 times { hits = hits + 1; }
            twinkle hits;
            "#,
        )
        .unwrap();
        assert_eq!(out, "✨ 0 ✨\n");
    }

    #[test]
    fn test_rainbow_call_and_return() {
        let out = run(
            r#"
            rainbow double(n) { return n * 2; }
            twinkle double(21);
            "#,
        )
        .unwrap();
        assert_eq!(out, "✨ 42 ✨\n");
    }

    #[test]
    fn test_rainbow_closure() {
        let out = run(
            r#"
            magic base = 10;
            rainbow addBase(n) { return base + n; }
            base = 20;
            twinkle addBase(5);
            "#,
        )
        .unwrap();
        assert_eq!(out, "✨ 25 ✨\n");
    }

    #[test]
    fn test_rainbow_recursion() {
        let out = run(
            r#"
            rainbow fib(n) {
                if (n < 2) { return n; }
                return fib(n - 1) + fib(n - 2);
            }
            twinkle fib(10);
            "#,
        )
        .unwrap();
        assert_eq!(out, "✨ 55 ✨\n");
    }

    #[test]
    fn test_arity_mismatch_faults_with_trace() {
        let fault = run(
            r#"
            rainbow outer() { return inner(1); }
            rainbow inner(a, b) { return a + b; }
            outer();
            "#,
        )
        .unwrap_err();
        assert!(fault.message.contains("expects 2 arguments"));
        assert_eq!(fault.trace, vec!["in rainbow 'outer'"]);
    }

    #[test]
    fn test_sparkle_init_and_methods() {
        let out = run(
            r#"
            sparkle Pony {
                rainbow init(name) {
                    this.name = name;
                }
                rainbow greet() {
                    twinkle "Hello from " + this.name;
                }
            }
            magic star = new Pony("Star");
            star.greet();
            "#,
        )
        .unwrap();
        assert_eq!(out, "✨ Hello from Star ✨\n");
    }

    #[test]
    fn test_instance_fields_are_per_instance() {
        let out = run(
            r#"
            sparkle Counter {
                rainbow init() { this.count = 0; }
                rainbow bump() { this.count = this.count + 1; return this.count; }
            }
            magic a = new Counter();
            magic b = new Counter();
            a.bump(); a.bump();
            twinkle a.bump();
            twinkle b.bump();
            "#,
        )
        .unwrap();
        assert_eq!(out, "✨ 3 ✨\n✨ 1 ✨\n");
    }

    #[test]
    fn test_unknown_sparkle_faults() {
        let fault = run("magic p = new Ghost();").unwrap_err();
        assert!(fault.message.contains("Unknown sparkle 'Ghost'"));
    }

    #[test]
    fn test_try_catch_binds_message() {
        let out = run(
            r#"
            try {
                twinkle missing;
            } catch (err) {
                twinkle "caught: " + err;
            }
            "#,
        )
        .unwrap();
        assert_eq!(out, "✨ caught: Undefined variable 'missing' ✨\n");
    }

    #[test]
    fn test_finally_runs_on_both_paths() {
        let out = run(
            r#"
            try { twinkle "ok"; } catch (e) { twinkle "bad"; } finally { twinkle "cleanup"; }
            try { twinkle ghost; } catch (e) { twinkle "bad"; } finally { twinkle "cleanup"; }
            "#,
        )
        .unwrap();
        assert_eq!(out, "✨ ok ✨\n✨ cleanup ✨\n✨ bad ✨\n✨ cleanup ✨\n");
    }

    #[test]
    fn test_uncaught_fault_propagates() {
        let fault = run("twinkle ghost;").unwrap_err();
        assert!(fault.message.contains("Undefined variable 'ghost'"));
        assert!(fault.trace.is_empty());
    }

    #[test]
    fn test_is_equality_alias() {
        assert_eq!(run(r#"twinkle 3 is 3;"#).unwrap(), "✨ true ✨\n");
        assert_eq!(run(r#"twinkle "a" is "b";"#).unwrap(), "✨ false ✨\n");
    }

    #[test]
    fn test_identifier_containing_is_survives() {
        // Regression guard for the old sub-word keyword corruption.
        assert_eq!(
            run(r#"magic island = 7; twinkle island;"#).unwrap(),
            "✨ 7 ✨\n"
        );
    }

    #[test]
    fn test_logical_operators_return_operands() {
        assert_eq!(run(r#"twinkle no || "fallback";"#).unwrap(), "✨ fallback ✨\n");
        assert_eq!(run(r#"twinkle yes && "value";"#).unwrap(), "✨ value ✨\n");
    }

    #[test]
    fn test_array_index_get_set_and_length() {
        let out = run(
            r#"
            pixieDust bag = [10, 20, 30];
            bag[1] = 21;
            twinkle bag[1];
            twinkle bag.length;
            "#,
        )
        .unwrap();
        assert_eq!(out, "✨ 21 ✨\n✨ 3 ✨\n");
    }

    #[test]
    fn test_index_out_of_bounds_faults() {
        let fault = run("pixieDust bag = [1]; twinkle bag[5];").unwrap_err();
        assert!(fault.message.contains("out of bounds"));
    }

    #[test]
    fn test_string_concatenation() {
        assert_eq!(
            run(r#"twinkle "sum: " + 3;"#).unwrap(),
            "✨ sum: 3 ✨\n"
        );
    }

    #[test]
    fn test_bad_operand_types_fault() {
        let fault = run(r#"twinkle yes - 1;"#).unwrap_err();
        assert!(fault.message.contains("boolean"));
    }

    #[test]
    fn test_return_outside_rainbow_faults() {
        let fault = run("return 1;").unwrap_err();
        assert!(fault.message.contains("outside"));
    }

    #[test]
    fn test_deep_recursion_is_bounded() {
        let fault = run(
            r#"
            rainbow spiral(n) { return spiral(n + 1); }
            spiral(0);
            "#,
        )
        .unwrap_err();
        assert!(fault.message.contains("too deeply"));
    }
}
