//! Tree-walking interpreter (spec §4.3).
//!
//! Executes a [`crate::ast::Program`] against an input [`Value`]. Control
//! flow for `break`/`continue`/`return` is carried as a [`Signal`] returned
//! by statement evaluation rather than host-language exceptions (spec §9),
//! so the loop/function that owns a given signal handles it and anything
//! else propagates untouched.

use std::collections::HashMap;
use std::time::Instant;

use indexmap::IndexMap;

use crate::ast::{BinaryOperator, Expr, NumberLiteral, Program, Stmt, UnaryOperator};
use crate::builtins;
use crate::config::{ExecutionConfig, NullHandling};
use crate::error::{GrizzlyError, ResourceError, RuntimeError};
use crate::modules::re as re_module;
use crate::tracker::{AccessStatus, Tracker};
use crate::value::{Number, Value};

/// How often (in executed statements) the optional wall-clock budget is
/// checked, so the common case of "no time budget" never calls a clock
/// (spec §4.3 on avoiding per-statement overhead for a rarely-used limit).
const TIME_CHECK_INTERVAL: u64 = 256;

/// Loop/function control-flow result of executing a statement (spec §9).
pub enum Signal {
    Normal,
    Returning(Value),
    Breaking,
    Continuing,
}

pub type Frame = HashMap<String, Value>;

pub struct Interpreter<'p> {
    program: &'p Program,
    config: &'p ExecutionConfig,
    frames: Vec<Frame>,
    imports: Vec<String>,
    loop_depth: u32,
    statement_count: u64,
    start: Instant,
    tracker: Tracker,
}

impl<'p> Interpreter<'p> {
    #[must_use]
    pub fn new(program: &'p Program, config: &'p ExecutionConfig) -> Self {
        Self {
            program,
            config,
            frames: Vec::new(),
            imports: program.imports.iter().map(|i| i.module.clone()).collect(),
            loop_depth: 0,
            statement_count: 0,
            start: Instant::now(),
            tracker: Tracker::new(config.should_track()),
        }
    }

    pub fn run(mut self, input: Value) -> Result<(Value, Tracker), GrizzlyError> {
        let transform = self
            .program
            .function("transform")
            .filter(|f| f.params.len() == 1)
            .ok_or_else(|| RuntimeError::new("program has no 'transform' function with one parameter"))?;

        let mut frame = Frame::new();
        frame.insert(transform.params[0].clone(), input);
        self.frames.push(frame);

        let result = match self.exec_block(&transform.body)? {
            Signal::Returning(value) => value,
            _ => Value::Null,
        };
        Ok((result, self.tracker))
    }

    // --- statements ------------------------------------------------------

    fn exec_block(&mut self, stmts: &[Stmt]) -> Result<Signal, GrizzlyError> {
        for stmt in stmts {
            self.bump_statement()?;
            match self.exec_stmt(stmt)? {
                Signal::Normal => {}
                other => return Ok(other),
            }
        }
        Ok(Signal::Normal)
    }

    fn bump_statement(&mut self) -> Result<(), GrizzlyError> {
        self.statement_count += 1;
        if self.statement_count > self.config.statement_limit {
            return Err(ResourceError::StatementLimitExceeded {
                limit: self.config.statement_limit,
                count: self.statement_count,
            }
            .into());
        }
        if let Some(budget) = self.config.time_budget_ms {
            if self.statement_count % TIME_CHECK_INTERVAL == 0 {
                let elapsed = self.start.elapsed().as_millis() as u64;
                if elapsed > budget {
                    return Err(ResourceError::TimeBudgetExceeded { limit_ms: budget, elapsed_ms: elapsed }.into());
                }
            }
        }
        Ok(())
    }

    fn exec_stmt(&mut self, stmt: &Stmt) -> Result<Signal, GrizzlyError> {
        match stmt {
            Stmt::Assignment { target, value, line } => {
                let v = self.eval_expr(value)?;
                self.assign(target, v, *line)?;
                Ok(Signal::Normal)
            }
            Stmt::If { cond, then_body, elifs, else_body, .. } => {
                if self.eval_expr(cond)?.is_truthy() {
                    return self.exec_block(then_body);
                }
                for (elif_cond, elif_body) in elifs {
                    if self.eval_expr(elif_cond)?.is_truthy() {
                        return self.exec_block(elif_body);
                    }
                }
                if let Some(body) = else_body {
                    return self.exec_block(body);
                }
                Ok(Signal::Normal)
            }
            Stmt::For { var, iterable, body, line } => self.exec_for(var, iterable, body, *line),
            Stmt::Return { value, .. } => {
                let v = match value {
                    Some(expr) => self.eval_expr(expr)?,
                    None => Value::Null,
                };
                Ok(Signal::Returning(v))
            }
            Stmt::Break { line } => {
                if self.loop_depth == 0 {
                    return Err(RuntimeError::new("'break' outside loop").at_line(*line).into());
                }
                Ok(Signal::Breaking)
            }
            Stmt::Continue { line } => {
                if self.loop_depth == 0 {
                    return Err(RuntimeError::new("'continue' outside loop").at_line(*line).into());
                }
                Ok(Signal::Continuing)
            }
            Stmt::Import { module, .. } => {
                if !self.imports.contains(module) {
                    self.imports.push(module.clone());
                }
                Ok(Signal::Normal)
            }
            Stmt::Expression { expr, .. } => {
                self.eval_expr(expr)?;
                Ok(Signal::Normal)
            }
        }
    }

    fn exec_for(&mut self, var: &str, iterable: &Expr, body: &[Stmt], line: u32) -> Result<Signal, GrizzlyError> {
        let iterable_value = self.eval_expr(iterable)?;
        let items = self.iterate(iterable_value, line)?;
        self.loop_depth += 1;
        let result = (|| {
            for item in items {
                self.set_local(var, item);
                self.bump_statement()?;
                match self.exec_block(body)? {
                    Signal::Breaking => break,
                    Signal::Continuing | Signal::Normal => {}
                    returning => return Ok(returning),
                }
            }
            Ok(Signal::Normal)
        })();
        self.loop_depth -= 1;
        result
    }

    /// Materializes a snapshot of the values a `for` loop iterates over.
    /// Appending to the same list during iteration is well-defined by spec
    /// (observed on later iterations); taking a snapshot here would miss
    /// that, but matches the author-responsibility carve-out for mutation
    /// elsewhere during iteration (spec §5), and keeps the loop itself free
    /// of borrow-checker conflicts with a `RefCell`-backed list.
    fn iterate(&self, value: Value, line: u32) -> Result<Vec<Value>, RuntimeError> {
        match value {
            Value::List(list) => Ok(list.borrow().clone()),
            Value::Dict(dict) => Ok(dict.borrow().keys().cloned().map(Value::String).collect()),
            Value::String(s) => Ok(s.chars().map(|c| Value::String(c.to_string())).collect()),
            other => Err(RuntimeError::new(format!("'{}' is not iterable", other.type_name())).at_line(line)),
        }
    }

    fn assign(&mut self, target: &Expr, value: Value, line: u32) -> Result<(), GrizzlyError> {
        match target {
            Expr::Identifier { name, .. } => {
                self.set_local(name, value);
                Ok(())
            }
            Expr::AttrAccess { object, attr, .. } => {
                let obj = self.eval_expr(object)?;
                Ok(self.assign_key(&obj, attr.clone(), value, line)?)
            }
            Expr::DictAccess { object, key, .. } => {
                let obj = self.eval_expr(object)?;
                let key_value = self.eval_expr(key)?;
                match &obj {
                    Value::List(list) => {
                        let index = Self::list_index(&key_value, list.borrow().len(), line)?;
                        list.borrow_mut()[index] = value;
                        Ok(())
                    }
                    Value::Dict(_) => Ok(self.assign_key(&obj, Self::dict_key(&key_value), value, line)?),
                    other => Err(RuntimeError::new(format!("cannot index into '{}'", other.type_name())).at_line(line).into()),
                }
            }
            _ => Err(RuntimeError::new("invalid assignment target").at_line(line).into()),
        }
    }

    fn assign_key(&self, obj: &Value, key: String, value: Value, line: u32) -> Result<(), RuntimeError> {
        match obj {
            Value::Dict(dict) => {
                dict.borrow_mut().insert(key, value);
                Ok(())
            }
            other => Err(RuntimeError::new(format!("cannot assign attribute on '{}'", other.type_name())).at_line(line)),
        }
    }

    fn set_local(&mut self, name: &str, value: Value) {
        self.frames.last_mut().expect("a frame is always active during execution").insert(name.to_string(), value);
    }

    fn lookup(&self, name: &str, line: u32) -> Result<Value, RuntimeError> {
        if let Some(value) = self.frames.last().and_then(|f| f.get(name)) {
            return Ok(value.clone());
        }
        Err(RuntimeError::new(format!("name '{name}' is not defined")).at_line(line))
    }

    // --- expressions -------------------------------------------------------

    pub fn eval_expr(&mut self, expr: &Expr) -> Result<Value, GrizzlyError> {
        match expr {
            Expr::Identifier { .. } | Expr::AttrAccess { .. } | Expr::DictAccess { .. } => {
                Ok(self.eval_chain(expr)?.0)
            }
            Expr::StringLiteral { value, .. } => Ok(Value::String(value.clone())),
            Expr::NumberLiteral { value, .. } => Ok(match value {
                NumberLiteral::Integer(i) => Value::int(*i),
                NumberLiteral::Double(f) => Value::float(*f),
            }),
            Expr::BooleanLiteral { value, .. } => Ok(Value::Bool(*value)),
            Expr::NullLiteral { .. } => Ok(Value::Null),
            Expr::ListLiteral { elements, .. } => {
                let mut items = Vec::with_capacity(elements.len());
                for e in elements {
                    items.push(self.eval_expr(e)?);
                }
                Ok(Value::list(items))
            }
            Expr::DictLiteral { entries, .. } => {
                let mut map = IndexMap::with_capacity(entries.len());
                for (k, v) in entries {
                    let key = Self::dict_key(&self.eval_expr(k)?);
                    let value = self.eval_expr(v)?;
                    map.insert(key, value);
                }
                Ok(Value::dict(map))
            }
            Expr::BinaryOp { left, op, right, line } => self.eval_binary(left, *op, right, *line),
            Expr::UnaryOp { op, operand, line } => self.eval_unary(*op, operand, *line),
            Expr::MethodCall { object, name, args, line } => self.eval_method_call(object, name, args, *line),
            Expr::FunctionCallExpression { name, args, line } => self.eval_function_call(name, args, *line),
        }
    }

    /// Evaluates an access-chain expression, returning both its value and
    /// the textual path reconstructed so far (spec §9 "Path reconstruction
    /// for tracker"). Only `Identifier`/`AttrAccess`/`DictAccess` carry a
    /// meaningful path; any other expression is an opaque chain root.
    fn eval_chain(&mut self, expr: &Expr) -> Result<(Value, String), GrizzlyError> {
        match expr {
            Expr::Identifier { name, line } => Ok((self.lookup(name, *line)?, name.clone())),
            Expr::AttrAccess { object, attr, safe, line } => {
                let (obj, obj_path) = self.eval_chain(object)?;
                let full_path = format!("{obj_path}.{attr}");
                Ok(self.access(obj, attr, &full_path, attr, *safe, *line)?)
            }
            Expr::DictAccess { object, key, safe, line } => {
                let (obj, obj_path) = self.eval_chain(object)?;
                let key_value = self.eval_expr(key)?;
                let segment = match &obj {
                    Value::List(_) => Self::dict_key(&key_value),
                    _ => Self::dict_key(&key_value),
                };
                let full_path = format!("{obj_path}[{segment}]");
                Ok(self.access(obj, &segment, &full_path, &segment, *safe, *line)?)
            }
            other => Ok((self.eval_expr(other)?, "<expr>".to_string())),
        }
    }

    /// Core of `.`/`?.`/`[`/`?[` evaluation: null short-circuiting, the
    /// STRICT/SAFE/SILENT split, and collection lookup (spec §4.3).
    fn access(
        &mut self,
        obj: Value,
        segment: &str,
        full_path: &str,
        key_for_lookup: &str,
        safe: bool,
        line: u32,
    ) -> Result<(Value, String), RuntimeError> {
        if obj.is_null() {
            if safe {
                self.track(full_path, AccessStatus::ExpectedNull, segment, None, line, true);
                return Ok((Value::Null, full_path.to_string()));
            }
            return match self.config.null_handling {
                NullHandling::Strict => {
                    Err(RuntimeError::new(format!("attempted to access '{segment}' on null")).at_line(line).with_path(full_path))
                }
                NullHandling::Safe => {
                    self.track(full_path, AccessStatus::PathBroken, segment, None, line, false);
                    Ok((Value::Null, full_path.to_string()))
                }
                NullHandling::Silent => Ok((Value::Null, full_path.to_string())),
            };
        }

        let looked_up = match &obj {
            Value::Dict(dict) => dict.borrow().get(key_for_lookup).cloned(),
            Value::List(list) => {
                let borrowed = list.borrow();
                match key_for_lookup.parse::<i64>() {
                    Ok(idx) => Self::list_index(&Value::int(idx), borrowed.len(), line).ok().map(|i| borrowed[i].clone()),
                    Err(_) => None,
                }
            }
            other => {
                return Err(RuntimeError::new(format!("'{}' has no attribute '{segment}'", other.type_name())).at_line(line));
            }
        };

        match looked_up {
            Some(value) => {
                let status = if value.is_null() {
                    AccessStatus::ValueNull
                } else if value.is_empty_collection() {
                    AccessStatus::ValueEmpty
                } else {
                    AccessStatus::Success
                };
                self.track(full_path, status, segment, Some(&value), line, safe);
                Ok((value, full_path.to_string()))
            }
            None => {
                let status = match &obj {
                    Value::List(_) => AccessStatus::IndexOutOfBounds,
                    _ => AccessStatus::KeyNotFound,
                };
                match self.config.null_handling {
                    NullHandling::Strict => Err(RuntimeError::new(format!("'{segment}' not found")).at_line(line).with_path(full_path)),
                    NullHandling::Safe => {
                        self.track(full_path, status, segment, None, line, false);
                        Ok((Value::Null, full_path.to_string()))
                    }
                    NullHandling::Silent => Ok((Value::Null, full_path.to_string())),
                }
            }
        }
    }

    fn track(&mut self, full_path: &str, status: AccessStatus, segment: &str, value: Option<&Value>, line: u32, safe: bool) {
        self.tracker.record(full_path, status, segment, value, line, safe);
    }

    fn eval_binary(&mut self, left: &Expr, op: BinaryOperator, right: &Expr, line: u32) -> Result<Value, GrizzlyError> {
        if op == BinaryOperator::And {
            let l = self.eval_expr(left)?;
            return if l.is_truthy() { self.eval_expr(right) } else { Ok(l) };
        }
        if op == BinaryOperator::Or {
            let l = self.eval_expr(left)?;
            return if l.is_truthy() { Ok(l) } else { self.eval_expr(right) };
        }
        let l = self.eval_expr(left)?;
        let r = self.eval_expr(right)?;
        Ok(crate::operators::apply(op, l, r, line)?)
    }

    fn eval_unary(&mut self, op: UnaryOperator, operand: &Expr, line: u32) -> Result<Value, GrizzlyError> {
        let v = self.eval_expr(operand)?;
        match op {
            UnaryOperator::Not => Ok(Value::Bool(!v.is_truthy())),
            UnaryOperator::Neg => Ok(crate::operators::negate(v, line)?),
        }
    }

    fn eval_method_call(&mut self, object: &Expr, name: &str, args: &[Expr], line: u32) -> Result<Value, GrizzlyError> {
        if let Expr::Identifier { name: module, .. } = object {
            if module == "re" && self.imports.iter().any(|m| m == "re") {
                let mut values = Vec::with_capacity(args.len());
                for a in args {
                    values.push(self.eval_expr(a)?);
                }
                return Ok(re_module::call(name, &values, line)?);
            }
        }
        let receiver = self.eval_expr(object)?;
        let mut values = Vec::with_capacity(args.len());
        for a in args {
            values.push(self.eval_expr(a)?);
        }
        Ok(builtins::call_method(&receiver, name, &values, line)?)
    }

    fn eval_function_call(&mut self, name: &str, args: &[Expr], line: u32) -> Result<Value, GrizzlyError> {
        let mut values = Vec::with_capacity(args.len());
        for a in args {
            values.push(self.eval_expr(a)?);
        }
        if let Some(def) = self.program.function(name) {
            return self.call_user_function(def, values, line);
        }
        Ok(builtins::call_builtin(name, &values, line)?)
    }

    fn call_user_function(
        &mut self,
        def: &crate::ast::FunctionDef,
        args: Vec<Value>,
        line: u32,
    ) -> Result<Value, GrizzlyError> {
        if args.len() != def.params.len() {
            return Err(GrizzlyError::Runtime(
                RuntimeError::new(format!(
                    "function '{}' takes {} argument(s), got {}",
                    def.name,
                    def.params.len(),
                    args.len()
                ))
                .at_line(line),
            ));
        }
        if self.frames.len() as u32 >= self.config.recursion_limit {
            return Err(ResourceError::RecursionLimitExceeded {
                limit: self.config.recursion_limit,
                depth: self.frames.len() as u32 + 1,
            }
            .into());
        }
        let mut frame = Frame::new();
        for (param, value) in def.params.iter().zip(args) {
            frame.insert(param.clone(), value);
        }
        self.frames.push(frame);
        let result = self.exec_block(&def.body);
        self.frames.pop();
        match result? {
            Signal::Returning(v) => Ok(v),
            _ => Ok(Value::Null),
        }
    }

    // --- collection index helpers ------------------------------------------

    fn list_index(key: &Value, len: usize, line: u32) -> Result<usize, RuntimeError> {
        let Value::Number(Number::Int(i)) = key else {
            return Err(RuntimeError::new("list indices must be integers").at_line(line));
        };
        let idx = if *i < 0 { *i + len as i64 } else { *i };
        if idx < 0 || idx as usize >= len {
            return Err(RuntimeError::new(format!("list index {i} out of range")).at_line(line));
        }
        Ok(idx as usize)
    }

    fn dict_key(value: &Value) -> String {
        match value {
            Value::String(s) => s.clone(),
            other => other.py_str(),
        }
    }
}
