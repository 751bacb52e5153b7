//! Recursive descent parser for the Jack grammar.
//!
//! Single pass, one token of lookahead. Input is assumed syntactically
//! valid; the first ill-formed token aborts the parse with a message naming
//! what was expected and what was found.

use crate::ast::*;
use crate::error::{CompileError, Result};
use crate::token::{Keyword, Span, SpannedToken, Token};

/// Maximum expression nesting depth before the parser bails out, bounding
/// recursion on pathological input like `((((((...))))))`.
const MAX_DEPTH: usize = 64;

pub struct Parser<'a> {
    tokens: &'a [SpannedToken],
    pos: usize,
    depth: usize,
}

impl<'a> Parser<'a> {
    pub fn new(tokens: &'a [SpannedToken]) -> Self {
        Self {
            tokens,
            pos: 0,
            depth: 0,
        }
    }

    /// Parse the token stream into a class tree.
    pub fn parse(mut self) -> Result<Class> {
        let class = self.parse_class()?;
        if let Some(t) = self.current() {
            return Err(CompileError::syntax(
                t.span,
                format!("expected end of file, found {}", t.token),
            ));
        }
        Ok(class)
    }

    // ------------------------------------------------------------------
    // Token plumbing
    // ------------------------------------------------------------------

    fn current(&self) -> Option<&SpannedToken> {
        self.tokens.get(self.pos)
    }

    fn current_span(&self) -> Span {
        self.current()
            .map(|t| t.span)
            .or_else(|| self.tokens.last().map(|t| t.span))
            .unwrap_or(Span::new(1, 1))
    }

    fn peek(&self) -> Option<&Token> {
        self.current().map(|t| &t.token)
    }

    fn peek_keyword(&self) -> Option<Keyword> {
        match self.peek() {
            Some(Token::Keyword(k)) => Some(*k),
            _ => None,
        }
    }

    fn peek_symbol(&self) -> Option<char> {
        match self.peek() {
            Some(Token::Symbol(c)) => Some(*c),
            _ => None,
        }
    }

    fn bump(&mut self) {
        self.pos += 1;
    }

    fn unexpected(&self, expected: &str) -> CompileError {
        let found = match self.current() {
            Some(t) => t.token.to_string(),
            None => "end of file".to_string(),
        };
        CompileError::syntax(
            self.current_span(),
            format!("expected {}, found {}", expected, found),
        )
    }

    fn expect_keyword(&mut self, keyword: Keyword) -> Result<()> {
        if self.peek_keyword() == Some(keyword) {
            self.bump();
            Ok(())
        } else {
            Err(self.unexpected(&format!("'{}'", keyword.as_str())))
        }
    }

    fn expect_symbol(&mut self, symbol: char) -> Result<()> {
        if self.peek_symbol() == Some(symbol) {
            self.bump();
            Ok(())
        } else {
            Err(self.unexpected(&format!("'{}'", symbol)))
        }
    }

    fn expect_identifier(&mut self) -> Result<(String, Span)> {
        let found = match self.current() {
            Some(SpannedToken {
                token: Token::Identifier(name),
                span,
            }) => Some((name.clone(), *span)),
            _ => None,
        };
        match found {
            Some(out) => {
                self.bump();
                Ok(out)
            }
            None => Err(self.unexpected("an identifier")),
        }
    }

    // ------------------------------------------------------------------
    // Grammar
    // ------------------------------------------------------------------

    /// class: 'class' className '{' classVarDec* subroutineDec* '}'
    fn parse_class(&mut self) -> Result<Class> {
        self.expect_keyword(Keyword::Class)?;
        let (name, _) = self.expect_identifier()?;
        self.expect_symbol('{')?;

        let mut var_decs = Vec::new();
        while matches!(self.peek_keyword(), Some(Keyword::Static | Keyword::Field)) {
            var_decs.push(self.parse_class_var_dec()?);
        }

        let mut subroutines = Vec::new();
        while matches!(
            self.peek_keyword(),
            Some(Keyword::Constructor | Keyword::Function | Keyword::Method)
        ) {
            subroutines.push(self.parse_subroutine_dec()?);
        }

        self.expect_symbol('}')?;

        Ok(Class {
            name,
            var_decs,
            subroutines,
        })
    }

    /// classVarDec: ('static' | 'field') type varName (',' varName)* ';'
    fn parse_class_var_dec(&mut self) -> Result<ClassVarDec> {
        let kind = match self.peek_keyword() {
            Some(Keyword::Static) => ClassVarKind::Static,
            Some(Keyword::Field) => ClassVarKind::Field,
            _ => return Err(self.unexpected("'static' or 'field'")),
        };
        self.bump();

        let ty = self.parse_type()?;
        let names = self.parse_name_list()?;
        self.expect_symbol(';')?;

        Ok(ClassVarDec { kind, ty, names })
    }

    /// type: 'int' | 'char' | 'boolean' | className
    fn parse_type(&mut self) -> Result<VarType> {
        let ty = match self.peek() {
            Some(Token::Keyword(Keyword::Int)) => VarType::Int,
            Some(Token::Keyword(Keyword::Char)) => VarType::Char,
            Some(Token::Keyword(Keyword::Boolean)) => VarType::Boolean,
            Some(Token::Identifier(name)) => VarType::Class(name.clone()),
            _ => return Err(self.unexpected("a type (int, char, boolean, or class name)")),
        };
        self.bump();
        Ok(ty)
    }

    /// varName (',' varName)*
    fn parse_name_list(&mut self) -> Result<Vec<String>> {
        let mut names = vec![self.expect_identifier()?.0];
        while self.peek_symbol() == Some(',') {
            self.bump();
            names.push(self.expect_identifier()?.0);
        }
        Ok(names)
    }

    /// subroutineDec: ('constructor'|'function'|'method') ('void'|type)
    ///                subroutineName '(' parameterList ')' subroutineBody
    fn parse_subroutine_dec(&mut self) -> Result<SubroutineDec> {
        let kind = match self.peek_keyword() {
            Some(Keyword::Constructor) => SubroutineKind::Constructor,
            Some(Keyword::Function) => SubroutineKind::Function,
            Some(Keyword::Method) => SubroutineKind::Method,
            _ => return Err(self.unexpected("'constructor', 'function', or 'method'")),
        };
        self.bump();

        let return_type = if self.peek_keyword() == Some(Keyword::Void) {
            self.bump();
            ReturnType::Void
        } else {
            ReturnType::Ty(self.parse_type()?)
        };

        let (name, _) = self.expect_identifier()?;

        self.expect_symbol('(')?;
        let params = self.parse_parameter_list()?;
        self.expect_symbol(')')?;

        let body = self.parse_subroutine_body()?;

        Ok(SubroutineDec {
            kind,
            return_type,
            name,
            params,
            body,
        })
    }

    /// parameterList: ((type varName) (',' type varName)*)?
    fn parse_parameter_list(&mut self) -> Result<Vec<Param>> {
        let mut params = Vec::new();
        if self.peek_symbol() == Some(')') {
            return Ok(params);
        }
        loop {
            let ty = self.parse_type()?;
            let (name, _) = self.expect_identifier()?;
            params.push(Param { ty, name });
            if self.peek_symbol() == Some(',') {
                self.bump();
            } else {
                break;
            }
        }
        Ok(params)
    }

    /// subroutineBody: '{' varDec* statements '}'
    fn parse_subroutine_body(&mut self) -> Result<SubroutineBody> {
        self.expect_symbol('{')?;

        let mut var_decs = Vec::new();
        while self.peek_keyword() == Some(Keyword::Var) {
            var_decs.push(self.parse_var_dec()?);
        }

        let statements = self.parse_statements()?;
        self.expect_symbol('}')?;

        Ok(SubroutineBody {
            var_decs,
            statements,
        })
    }

    /// varDec: 'var' type varName (',' varName)* ';'
    fn parse_var_dec(&mut self) -> Result<VarDec> {
        self.expect_keyword(Keyword::Var)?;
        let ty = self.parse_type()?;
        let names = self.parse_name_list()?;
        self.expect_symbol(';')?;
        Ok(VarDec { ty, names })
    }

    /// statements: statement*
    fn parse_statements(&mut self) -> Result<Vec<Statement>> {
        let mut statements = Vec::new();
        loop {
            let stmt = match self.peek_keyword() {
                Some(Keyword::Let) => Statement::Let(self.parse_let()?),
                Some(Keyword::If) => Statement::If(self.parse_if()?),
                Some(Keyword::While) => Statement::While(self.parse_while()?),
                Some(Keyword::Do) => Statement::Do(self.parse_do()?),
                Some(Keyword::Return) => Statement::Return(self.parse_return()?),
                _ => break,
            };
            statements.push(stmt);
        }
        Ok(statements)
    }

    /// letStatement: 'let' varName ('[' expression ']')? '=' expression ';'
    fn parse_let(&mut self) -> Result<LetStatement> {
        self.expect_keyword(Keyword::Let)?;
        let (target, target_span) = self.expect_identifier()?;

        let index = if self.peek_symbol() == Some('[') {
            self.bump();
            let expr = self.parse_expression()?;
            self.expect_symbol(']')?;
            Some(expr)
        } else {
            None
        };

        self.expect_symbol('=')?;
        let value = self.parse_expression()?;
        self.expect_symbol(';')?;

        Ok(LetStatement {
            target,
            target_span,
            index,
            value,
        })
    }

    /// ifStatement: 'if' '(' expression ')' '{' statements '}'
    ///              ('else' '{' statements '}')?
    fn parse_if(&mut self) -> Result<IfStatement> {
        self.expect_keyword(Keyword::If)?;
        self.expect_symbol('(')?;
        let condition = self.parse_expression()?;
        self.expect_symbol(')')?;
        self.expect_symbol('{')?;
        let then_branch = self.parse_statements()?;
        self.expect_symbol('}')?;

        let else_branch = if self.peek_keyword() == Some(Keyword::Else) {
            self.bump();
            self.expect_symbol('{')?;
            let stmts = self.parse_statements()?;
            self.expect_symbol('}')?;
            Some(stmts)
        } else {
            None
        };

        Ok(IfStatement {
            condition,
            then_branch,
            else_branch,
        })
    }

    /// whileStatement: 'while' '(' expression ')' '{' statements '}'
    fn parse_while(&mut self) -> Result<WhileStatement> {
        self.expect_keyword(Keyword::While)?;
        self.expect_symbol('(')?;
        let condition = self.parse_expression()?;
        self.expect_symbol(')')?;
        self.expect_symbol('{')?;
        let body = self.parse_statements()?;
        self.expect_symbol('}')?;
        Ok(WhileStatement { condition, body })
    }

    /// doStatement: 'do' subroutineCall ';'
    fn parse_do(&mut self) -> Result<DoStatement> {
        self.expect_keyword(Keyword::Do)?;
        let (first, span) = self.expect_identifier()?;
        let call = self.parse_call_after_name(first, span)?;
        self.expect_symbol(';')?;
        Ok(DoStatement { call })
    }

    /// returnStatement: 'return' expression? ';'
    fn parse_return(&mut self) -> Result<ReturnStatement> {
        self.expect_keyword(Keyword::Return)?;
        let value = if self.peek_symbol() == Some(';') {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.expect_symbol(';')?;
        Ok(ReturnStatement { value })
    }

    /// expression: term (op term)*
    fn parse_expression(&mut self) -> Result<Expression> {
        self.enter()?;
        let result = self.parse_expression_inner();
        self.depth -= 1;
        result
    }

    fn parse_expression_inner(&mut self) -> Result<Expression> {
        let first = self.parse_term()?;
        let mut rest = Vec::new();
        while let Some(op) = self.peek_symbol().and_then(BinaryOp::from_symbol) {
            self.bump();
            rest.push((op, self.parse_term()?));
        }
        Ok(Expression { first, rest })
    }

    fn enter(&mut self) -> Result<()> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(CompileError::syntax(
                self.current_span(),
                "expression nesting too deep",
            ));
        }
        Ok(())
    }

    /// term: integerConstant | stringConstant | keywordConstant | varName |
    ///       varName '[' expression ']' | subroutineCall |
    ///       '(' expression ')' | unaryOp term
    fn parse_term(&mut self) -> Result<Term> {
        self.enter()?;
        let result = self.parse_term_inner();
        self.depth -= 1;
        result
    }

    fn parse_term_inner(&mut self) -> Result<Term> {
        let span = self.current_span();
        match self.peek().cloned() {
            Some(Token::IntConst(n)) => {
                self.bump();
                Ok(Term::IntConst(n))
            }
            Some(Token::StrConst(s)) => {
                self.bump();
                Ok(Term::StrConst(s))
            }
            Some(Token::Keyword(k)) => {
                let constant = match k {
                    Keyword::True => KeywordConst::True,
                    Keyword::False => KeywordConst::False,
                    Keyword::Null => KeywordConst::Null,
                    Keyword::This => KeywordConst::This,
                    _ => return Err(self.unexpected("a term")),
                };
                self.bump();
                Ok(Term::KeywordConst(constant))
            }
            Some(Token::Symbol('(')) => {
                self.bump();
                let expr = self.parse_expression()?;
                self.expect_symbol(')')?;
                Ok(Term::Paren(Box::new(expr)))
            }
            Some(Token::Symbol('-')) => {
                self.bump();
                Ok(Term::Unary(UnaryOp::Neg, Box::new(self.parse_term()?)))
            }
            Some(Token::Symbol('~')) => {
                self.bump();
                Ok(Term::Unary(UnaryOp::Not, Box::new(self.parse_term()?)))
            }
            Some(Token::Identifier(name)) => {
                self.bump();
                // One token of lookahead decides between array access,
                // subroutine call, and a plain variable reference.
                match self.peek_symbol() {
                    Some('[') => {
                        self.bump();
                        let index = self.parse_expression()?;
                        self.expect_symbol(']')?;
                        Ok(Term::Index(name, Box::new(index), span))
                    }
                    Some('(') | Some('.') => {
                        Ok(Term::Call(self.parse_call_after_name(name, span)?))
                    }
                    _ => Ok(Term::Var(name, span)),
                }
            }
            _ => Err(self.unexpected("a term")),
        }
    }

    /// The tail of a subroutine call, after its leading identifier:
    /// '(' expressionList ')' | '.' subroutineName '(' expressionList ')'
    fn parse_call_after_name(&mut self, first: String, span: Span) -> Result<SubroutineCall> {
        let (receiver, name) = if self.peek_symbol() == Some('.') {
            self.bump();
            let (method, _) = self.expect_identifier()?;
            (Some(first), method)
        } else {
            (None, first)
        };

        self.expect_symbol('(')?;
        let args = self.parse_expression_list()?;
        self.expect_symbol(')')?;

        Ok(SubroutineCall {
            receiver,
            name,
            args,
            span,
        })
    }

    /// expressionList: (expression (',' expression)*)?
    fn parse_expression_list(&mut self) -> Result<Vec<Expression>> {
        let mut args = Vec::new();
        if self.peek_symbol() == Some(')') {
            return Ok(args);
        }
        loop {
            args.push(self.parse_expression()?);
            if self.peek_symbol() == Some(',') {
                self.bump();
            } else {
                break;
            }
        }
        Ok(args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::Tokenizer;

    fn parse(input: &str) -> Result<Class> {
        let tokens = Tokenizer::new(input).tokenize()?;
        Parser::new(&tokens).parse()
    }

    #[test]
    fn empty_class() {
        let class = parse("class Main { }").unwrap();
        assert_eq!(class.name, "Main");
        assert!(class.var_decs.is_empty());
        assert!(class.subroutines.is_empty());
    }

    #[test]
    fn class_var_lists() {
        let class = parse("class Point { field int x, y; static boolean debug; }").unwrap();
        assert_eq!(class.var_decs.len(), 2);
        assert_eq!(class.var_decs[0].kind, ClassVarKind::Field);
        assert_eq!(class.var_decs[0].names, vec!["x", "y"]);
        assert_eq!(class.var_decs[1].kind, ClassVarKind::Static);
        assert_eq!(class.var_decs[1].ty, VarType::Boolean);
    }

    #[test]
    fn subroutine_shapes() {
        let class = parse(
            "class Point {
                constructor Point new(int ax, int ay) { return this; }
                method int getX() { return 0; }
                function void reset() { return; }
            }",
        )
        .unwrap();
        assert_eq!(class.subroutines.len(), 3);
        let ctor = &class.subroutines[0];
        assert_eq!(ctor.kind, SubroutineKind::Constructor);
        assert_eq!(ctor.params.len(), 2);
        assert_eq!(ctor.params[1].name, "ay");
        assert_eq!(class.subroutines[1].kind, SubroutineKind::Method);
        assert_eq!(class.subroutines[2].return_type, ReturnType::Void);
    }

    #[test]
    fn empty_parameter_list() {
        let class = parse("class A { function void f() { return; } }").unwrap();
        assert!(class.subroutines[0].params.is_empty());
    }

    #[test]
    fn let_with_index() {
        let class = parse(
            "class A { function void f() { let a[i + 1] = 2; return; } }",
        )
        .unwrap();
        let stmts = &class.subroutines[0].body.statements;
        match &stmts[0] {
            Statement::Let(s) => {
                assert_eq!(s.target, "a");
                assert!(s.index.is_some());
            }
            other => panic!("expected let, got {:?}", other),
        }
    }

    #[test]
    fn if_else_and_while() {
        let class = parse(
            "class A { function void f() {
                if (x) { return; } else { return; }
                while (true) { do g(); }
                return;
            } }",
        )
        .unwrap();
        let stmts = &class.subroutines[0].body.statements;
        assert!(matches!(&stmts[0], Statement::If(s) if s.else_branch.is_some()));
        assert!(matches!(&stmts[1], Statement::While(_)));
    }

    #[test]
    fn expression_folds_left_without_precedence() {
        let class =
            parse("class A { function int f() { return 1 + 2 * 3; } }").unwrap();
        let stmts = &class.subroutines[0].body.statements;
        match &stmts[0] {
            Statement::Return(r) => {
                let expr = r.value.as_ref().unwrap();
                assert!(matches!(expr.first, Term::IntConst(1)));
                assert_eq!(expr.rest.len(), 2);
                assert_eq!(expr.rest[0].0, BinaryOp::Add);
                assert_eq!(expr.rest[1].0, BinaryOp::Mul);
            }
            other => panic!("expected return, got {:?}", other),
        }
    }

    #[test]
    fn term_disambiguation() {
        let class = parse(
            "class A { function int f() { return a + b[0] + c() + D.e(x, y); } }",
        )
        .unwrap();
        let stmts = &class.subroutines[0].body.statements;
        let Statement::Return(r) = &stmts[0] else {
            panic!("expected return");
        };
        let expr = r.value.as_ref().unwrap();
        assert!(matches!(expr.first, Term::Var(ref n, _) if n == "a"));
        assert!(matches!(expr.rest[0].1, Term::Index(ref n, _, _) if n == "b"));
        match &expr.rest[1].1 {
            Term::Call(call) => {
                assert!(call.receiver.is_none());
                assert_eq!(call.name, "c");
            }
            other => panic!("expected call, got {:?}", other),
        }
        match &expr.rest[2].1 {
            Term::Call(call) => {
                assert_eq!(call.receiver.as_deref(), Some("D"));
                assert_eq!(call.name, "e");
                assert_eq!(call.args.len(), 2);
            }
            other => panic!("expected call, got {:?}", other),
        }
    }

    #[test]
    fn unary_operators() {
        let class = parse("class A { function int f() { return -x + ~y; } }").unwrap();
        let Statement::Return(r) = &class.subroutines[0].body.statements[0] else {
            panic!("expected return");
        };
        let expr = r.value.as_ref().unwrap();
        assert!(matches!(expr.first, Term::Unary(UnaryOp::Neg, _)));
        assert!(matches!(expr.rest[0].1, Term::Unary(UnaryOp::Not, _)));
    }

    #[test]
    fn malformed_input_reports_offending_token() {
        let err = parse("class Main { function void f() { let = 5; } }").unwrap_err();
        let text = err.to_string();
        assert!(text.contains("expected an identifier"), "{}", text);
        assert!(text.contains("'='"), "{}", text);
    }

    #[test]
    fn deep_nesting_is_rejected() {
        let opens = "(".repeat(200);
        let closes = ")".repeat(200);
        let src = format!(
            "class A {{ function int f() {{ return {}1{}; }} }}",
            opens, closes
        );
        assert!(parse(&src).is_err());
    }

    #[test]
    fn trailing_tokens_are_an_error() {
        assert!(parse("class A { } class B { }").is_err());
    }
}
