//! Jack AST to VM command generation.
//!
//! Walks a class tree with its own `CompileState`, producing the command
//! list for one `.vm` file. Every emitted function name and call target uses
//! the three-part `{class}.{subroutine}.{argc}` key; the argument count in a
//! method call target includes the receiver.

use crate::ast::*;
use crate::error::Result;
use crate::state::{CompileState, LabelKind, VarKind};
use crate::vm::VmWriter;

pub struct CodeGenerator {
    state: CompileState,
    vm: VmWriter,
}

impl CodeGenerator {
    /// Compile a class to its ordered VM command list.
    pub fn compile(class: &Class) -> Result<Vec<String>> {
        let mut generator = CodeGenerator {
            state: CompileState::new(),
            vm: VmWriter::new(),
        };
        generator.compile_class(class)?;
        Ok(generator.vm.into_commands())
    }

    fn compile_class(&mut self, class: &Class) -> Result<()> {
        self.state.enter_class(&class.name);

        // Class variables populate the class scope; nothing is emitted.
        for dec in &class.var_decs {
            let kind = match dec.kind {
                ClassVarKind::Static => VarKind::Static,
                ClassVarKind::Field => VarKind::Field,
            };
            for name in &dec.names {
                self.state.define(name, dec.ty.as_str(), kind);
            }
        }

        for subroutine in &class.subroutines {
            self.compile_subroutine(subroutine)?;
        }
        Ok(())
    }

    fn compile_subroutine(&mut self, sub: &SubroutineDec) -> Result<()> {
        self.state.reset_subroutine_scope();

        // Argument 0 of a method is the implicit receiver.
        if sub.kind == SubroutineKind::Method {
            self.state.reserve_argument();
        }
        self.state.set_subroutine_name(&sub.name);
        for param in &sub.params {
            self.state
                .define(&param.name, param.ty.as_str(), VarKind::Argument);
        }
        self.state.latch_subroutine_key();

        // Jack declares all locals up front, so the local count is complete
        // before any statement compiles and the header can lead.
        for dec in &sub.body.var_decs {
            for name in &dec.names {
                self.state.define(name, dec.ty.as_str(), VarKind::Local);
            }
        }

        let key = self.state.subroutine_key().to_string();
        self.vm.function(&key, self.state.count(VarKind::Local));

        match sub.kind {
            SubroutineKind::Method => {
                self.vm.push("argument", 0);
                self.vm.pop("pointer", 0);
            }
            SubroutineKind::Constructor => {
                self.vm.push("constant", self.state.count(VarKind::Field));
                self.vm.call("Memory.alloc.1", 1);
                self.vm.pop("pointer", 0);
            }
            SubroutineKind::Function => {}
        }

        self.compile_statements(&sub.body.statements)
    }

    fn compile_statements(&mut self, statements: &[Statement]) -> Result<()> {
        for statement in statements {
            self.compile_statement(statement)?;
        }
        Ok(())
    }

    fn compile_statement(&mut self, statement: &Statement) -> Result<()> {
        match statement {
            Statement::Let(s) => self.compile_let(s),
            Statement::If(s) => self.compile_if(s),
            Statement::While(s) => self.compile_while(s),
            Statement::Do(s) => self.compile_do(s),
            Statement::Return(s) => self.compile_return(s),
        }
    }

    fn compile_let(&mut self, stmt: &LetStatement) -> Result<()> {
        match &stmt.index {
            Some(index) => {
                // Address first, then the right-hand side, which is stashed
                // in temp 0 so `pointer 1` is only set once the value is
                // fully evaluated. Array accesses inside the right-hand side
                // are free to use `pointer 1` themselves.
                self.compile_expression(index)?;
                let base = self
                    .state
                    .var_access(&stmt.target, stmt.target_span, true)?;
                self.vm.raw(base);
                self.vm.arithmetic("add");
                self.compile_expression(&stmt.value)?;
                self.vm.pop("temp", 0);
                self.vm.pop("pointer", 1);
                self.vm.push("temp", 0);
                self.vm.pop("that", 0);
            }
            None => {
                self.compile_expression(&stmt.value)?;
                let target = self
                    .state
                    .var_access(&stmt.target, stmt.target_span, false)?;
                self.vm.raw(target);
            }
        }
        Ok(())
    }

    fn compile_if(&mut self, stmt: &IfStatement) -> Result<()> {
        let ordinal = self.state.fresh_label(LabelKind::If);
        let base = format!("{}.IF.{}", self.state.subroutine_key(), ordinal);

        self.compile_expression(&stmt.condition)?;
        self.vm.arithmetic("not");
        match &stmt.else_branch {
            Some(else_branch) => {
                self.vm.if_goto(&format!("{}_ELSE", base));
                self.compile_statements(&stmt.then_branch)?;
                self.vm.goto(&format!("{}_END", base));
                self.vm.label(&format!("{}_ELSE", base));
                self.compile_statements(else_branch)?;
                self.vm.label(&format!("{}_END", base));
            }
            None => {
                self.vm.if_goto(&format!("{}_END", base));
                self.compile_statements(&stmt.then_branch)?;
                self.vm.label(&format!("{}_END", base));
            }
        }
        Ok(())
    }

    fn compile_while(&mut self, stmt: &WhileStatement) -> Result<()> {
        let ordinal = self.state.fresh_label(LabelKind::While);
        let base = format!("{}.WHILE.{}", self.state.subroutine_key(), ordinal);

        self.vm.label(&format!("{}_BEGIN", base));
        self.compile_expression(&stmt.condition)?;
        self.vm.arithmetic("not");
        self.vm.if_goto(&format!("{}_END", base));
        self.compile_statements(&stmt.body)?;
        self.vm.goto(&format!("{}_BEGIN", base));
        self.vm.label(&format!("{}_END", base));
        Ok(())
    }

    fn compile_do(&mut self, stmt: &DoStatement) -> Result<()> {
        self.compile_call(&stmt.call)?;
        // The call's value is unused.
        self.vm.pop("temp", 0);
        Ok(())
    }

    fn compile_return(&mut self, stmt: &ReturnStatement) -> Result<()> {
        match &stmt.value {
            Some(value) => self.compile_expression(value)?,
            None => self.vm.push("constant", 0),
        }
        self.vm.ret();
        Ok(())
    }

    fn compile_expression(&mut self, expr: &Expression) -> Result<()> {
        self.compile_term(&expr.first)?;
        for (op, term) in &expr.rest {
            self.compile_term(term)?;
            self.compile_binary_op(*op);
        }
        Ok(())
    }

    fn compile_binary_op(&mut self, op: BinaryOp) {
        match op {
            BinaryOp::Add => self.vm.arithmetic("add"),
            BinaryOp::Sub => self.vm.arithmetic("sub"),
            BinaryOp::And => self.vm.arithmetic("and"),
            BinaryOp::Or => self.vm.arithmetic("or"),
            BinaryOp::Lt => self.vm.arithmetic("lt"),
            BinaryOp::Gt => self.vm.arithmetic("gt"),
            BinaryOp::Eq => self.vm.arithmetic("eq"),
            BinaryOp::Mul => self.vm.call("Math.multiply.2", 2),
            BinaryOp::Div => self.vm.call("Math.divide.2", 2),
        }
    }

    fn compile_term(&mut self, term: &Term) -> Result<()> {
        match term {
            Term::IntConst(n) => self.vm.push("constant", *n),

            Term::StrConst(s) => self.compile_string(s),

            Term::KeywordConst(kc) => match kc {
                KeywordConst::True => {
                    self.vm.push("constant", 1);
                    self.vm.arithmetic("neg");
                }
                KeywordConst::False | KeywordConst::Null => self.vm.push("constant", 0),
                KeywordConst::This => self.vm.push("pointer", 0),
            },

            Term::Var(name, span) => {
                let access = self.state.var_access(name, *span, true)?;
                self.vm.raw(access);
            }

            Term::Index(name, index, span) => {
                self.compile_expression(index)?;
                let base = self.state.var_access(name, *span, true)?;
                self.vm.raw(base);
                self.vm.arithmetic("add");
                self.vm.pop("pointer", 1);
                self.vm.push("that", 0);
            }

            Term::Call(call) => self.compile_call(call)?,

            Term::Paren(expr) => self.compile_expression(expr)?,

            Term::Unary(op, inner) => {
                self.compile_term(inner)?;
                match op {
                    UnaryOp::Neg => self.vm.arithmetic("neg"),
                    UnaryOp::Not => self.vm.arithmetic("not"),
                }
            }
        }
        Ok(())
    }

    /// String constants are built one character at a time on a fresh String
    /// object, using byte values (Jack strings are ASCII).
    fn compile_string(&mut self, s: &str) {
        self.vm.push("constant", s.len() as u16);
        self.vm.call("String.new.1", 1);
        for byte in s.bytes() {
            self.vm.push("constant", byte as u16);
            self.vm.call("String.appendChar.2", 2);
        }
    }

    fn compile_call(&mut self, call: &SubroutineCall) -> Result<()> {
        match &call.receiver {
            // Bare `foo(args)` is a method call on the current object.
            None => {
                self.vm.push("pointer", 0);
                for arg in &call.args {
                    self.compile_expression(arg)?;
                }
                let argc = call.args.len() as u16 + 1;
                let target = format!("{}.{}.{}", self.state.class_name(), call.name, argc);
                self.vm.call(&target, argc);
            }
            Some(receiver) => match self.state.lookup(receiver).cloned() {
                // `v.foo(args)` on a variable: a method call on v's class.
                Some(entry) => {
                    self.vm.push(entry.kind.segment(), entry.index);
                    for arg in &call.args {
                        self.compile_expression(arg)?;
                    }
                    let argc = call.args.len() as u16 + 1;
                    let target = format!("{}.{}.{}", entry.ty, call.name, argc);
                    self.vm.call(&target, argc);
                }
                // `K.foo(args)` on an unknown name: a function call on
                // class K, no receiver.
                None => {
                    for arg in &call.args {
                        self.compile_expression(arg)?;
                    }
                    let argc = call.args.len() as u16;
                    let target = format!("{}.{}.{}", receiver, call.name, argc);
                    self.vm.call(&target, argc);
                }
            },
        }
        Ok(())
    }
}
