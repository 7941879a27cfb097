use caret_ir::ast::{BinaryOp, ExprKind, Member, StmtKind, TypeKind};
use caret_ir::{ast, AstNode, Token, TokenKind};
use caret_lexer::Lexer;
use pretty_assertions::assert_eq;

use crate::{Flow, Goal, Interrupt, NameSite, NodeStacks, PResult, Parser, ReduceHooks, Rule};

#[derive(Default)]
struct Recorder {
    rules: Vec<Rule>,
    sites: Vec<String>,
    goals: Vec<Goal>,
    tokens: usize,
    /// Claim the first name reference whose text matches.
    claim: Option<&'static str>,
}

impl ReduceHooks for Recorder {
    fn on_goal(&mut self, goal: Goal) {
        self.goals.push(goal);
    }

    fn on_token(&mut self, _stacks: &NodeStacks, _token: Token) {
        self.tokens += 1;
    }

    fn on_reduce(&mut self, _stacks: &NodeStacks, rule: Rule) {
        self.rules.push(rule);
    }

    fn on_name(&mut self, stacks: &mut NodeStacks, site: NameSite<'_>) -> Flow {
        let (label, names) = match site {
            NameSite::TypeReference { .. } => ("TypeReference", stacks.last_type_name()),
            NameSite::NameReference => ("NameReference", stacks.last_name()),
            NameSite::MessageSend { .. } => ("MessageSend", stacks.last_name()),
            NameSite::FieldAccess { .. } => ("FieldAccess", stacks.last_name()),
            NameSite::Package { .. } => ("Package", stacks.last_name()),
            NameSite::Import { .. } => ("Import", stacks.last_name()),
            NameSite::ModuleName => ("ModuleName", stacks.last_name()),
            NameSite::RequiresModule => ("RequiresModule", stacks.last_name()),
            NameSite::ExportsPackage => ("ExportsPackage", stacks.last_name()),
            NameSite::TargetModule => ("TargetModule", stacks.last_name()),
            NameSite::ParameterName { .. } => ("ParameterName", stacks.last_name()),
            NameSite::FieldName { .. } => ("FieldName", stacks.last_name()),
            NameSite::LocalName { .. } => ("LocalName", stacks.last_name()),
            NameSite::MethodName { .. } => ("MethodName", stacks.last_name()),
        };
        let text = ast::dotted(names);
        let claimed = self.claim == Some(text.as_str()) && label == "NameReference";
        self.sites.push(format!("{label} {text}"));
        if claimed {
            Flow::Found { checkpoint: 42 }
        } else {
            Flow::Continue
        }
    }
}

fn run(source: &str, goal: Goal, diet: bool) -> (PResult<()>, NodeStacks, Recorder) {
    let mut lexer = Lexer::new(source);
    let mut stacks = NodeStacks::new();
    let mut hooks = Recorder::default();
    let result = Parser::new(&mut lexer, &mut stacks, &mut hooks)
        .with_diet(diet)
        .parse(goal);
    (result, stacks, hooks)
}

fn parse_ok(source: &str) -> (NodeStacks, Recorder) {
    let (result, stacks, hooks) = run(source, Goal::CompilationUnit, false);
    assert_eq!(result, Ok(()), "{source}");
    (stacks, hooks)
}

fn only_type(stacks: &NodeStacks) -> &ast::TypeDecl {
    match stacks.ast.last() {
        Some(AstNode::Type(decl)) => decl,
        other => panic!("expected a type, found {other:?}"),
    }
}

fn method_body<'a>(decl: &'a ast::TypeDecl, name: &str) -> &'a [ast::Stmt] {
    decl.members
        .iter()
        .find_map(|m| match m {
            Member::Method(method) if method.name.as_str() == name => method.body.as_deref(),
            _ => None,
        })
        .unwrap_or_default()
}

#[test]
fn test_parses_class_with_every_member_kind() {
    let (stacks, _) = parse_ok(
        "package a.b;\n\
         import java.util.*;\n\
         import static java.lang.Math.max;\n\
         public class X<T extends Comparable<T>> extends Base implements Runnable {\n\
           private int count = 0, other;\n\
           static { count = 1; }\n\
           { other = 2; }\n\
           X(int c) { this(c, 0); }\n\
           public void run() throws Exception { count++; }\n\
           abstract int size();\n\
           class Inner {}\n\
         }",
    );
    assert_eq!(stacks.ast.len(), 4);
    assert!(matches!(&stacks.ast[0], AstNode::Package(p) if ast::dotted(&p.name) == "a.b"));
    assert!(matches!(&stacks.ast[1], AstNode::Import(i) if i.on_demand && !i.is_static));
    assert!(matches!(&stacks.ast[2], AstNode::Import(i) if i.is_static && !i.on_demand));
    let decl = only_type(&stacks);
    assert_eq!(decl.name.as_str(), "X");
    assert_eq!(decl.type_params.len(), 1);
    assert_eq!(decl.extends.len(), 1);
    assert_eq!(decl.implements.len(), 1);
    assert_eq!(decl.members.len(), 8);
    assert!(decl.declaration_end.is_some());
    assert!(stacks.block_starts.is_empty());
    assert!(stacks.idents.is_empty());
}

#[test]
fn test_enum_constant_rule_sequence() {
    let (stacks, hooks) = parse_ok("enum E { A, B(1) { void m() {} }; int x; }");
    assert_eq!(
        hooks.rules,
        vec![
            Rule::TypeHeader(TypeKind::Enum),
            Rule::EnumConstantHeaderName,
            Rule::EnumConstantHeader { has_body: false },
            Rule::EnumConstantNoBody,
            Rule::EnumConstantHeaderName,
            Rule::EnumConstantHeader { has_body: true },
            Rule::MethodHeader,
            Rule::MethodBody,
            Rule::EnumConstantWithBody,
            Rule::TypeDeclaration,
        ]
    );
    let decl = only_type(&stacks);
    assert_eq!(decl.enum_constants.len(), 2);
    assert!(decl.enum_constants[1].body.is_some());
    assert_eq!(decl.members.len(), 1);
}

#[test]
fn test_name_sites_in_method_body() {
    let (_, hooks) = parse_ok("class X { void m() { a.b.c(); foo(1); this.bar = x; } }");
    assert_eq!(
        hooks.sites,
        vec![
            "MethodName m",
            "MessageSend a.b.c",
            "MessageSend foo",
            "FieldAccess bar",
            "NameReference x",
        ]
    );
    assert_eq!(hooks.goals, vec![Goal::CompilationUnit]);
    assert!(hooks.tokens > 20);
}

#[test]
fn test_declaration_sites() {
    let (_, hooks) = parse_ok("class X { java.util.List<String> items; X(int n, String... rest) {} }");
    assert_eq!(
        hooks.sites,
        vec![
            "TypeReference String",
            "TypeReference java.util.List",
            "FieldName items",
            "ParameterName n",
            "TypeReference String",
            "ParameterName rest",
        ]
    );
}

#[test]
fn test_local_declaration_versus_expression() {
    let (stacks, hooks) =
        parse_ok("class X { void m() { List<String> xs = new ArrayList<>(); a < b; int[] v; } }");
    let body = method_body(only_type(&stacks), "m");
    assert_eq!(body.len(), 3);
    assert!(matches!(&body[0].kind, StmtKind::Local(l) if l.ty.render() == "List<String>"));
    assert!(matches!(
        &body[1].kind,
        StmtKind::Expr(e) if matches!(e.kind, ExprKind::Binary { op: BinaryOp::Lt, .. })
    ));
    assert!(matches!(&body[2].kind, StmtKind::Local(l) if l.ty.dims == 1));
    assert!(hooks.sites.contains(&"LocalName xs".to_string()));
    assert!(hooks.rules.contains(&Rule::ClassBodyOpt));
}

#[test]
fn test_greater_than_runs_are_joined() {
    let (stacks, _) = parse_ok(
        "class X { Map<String, List<Integer>> m; void f() { x = a >> 2; y >>>= 1; z = a >= c; } }",
    );
    let decl = only_type(&stacks);
    assert!(matches!(&decl.members[0], Member::Field(f) if f.ty.render() == "Map<String, List<Integer>>"));
    let body = method_body(decl, "f");
    let ops: Vec<String> = body
        .iter()
        .map(|stmt| match &stmt.kind {
            StmtKind::Expr(ast::Expr {
                kind: ExprKind::Assign { op, value, .. },
                ..
            }) => match &value.kind {
                ExprKind::Binary { op: bin, .. } => format!("{op:?}/{bin:?}"),
                _ => format!("{op:?}"),
            },
            other => format!("{other:?}"),
        })
        .collect();
    assert_eq!(ops, vec!["Assign/Shr", "UShr", "Assign/GtEq"]);
}

#[test]
fn test_cast_and_parenthesized_expression() {
    let (stacks, _) = parse_ok("class X { void f() { s = (String) o; t = (a) + b; u = (int) -1; } }");
    let body = method_body(only_type(&stacks), "f");
    let value = |i: usize| match &body[i].kind {
        StmtKind::Expr(ast::Expr {
            kind: ExprKind::Assign { value, .. },
            ..
        }) => value.kind.clone(),
        other => panic!("{other:?}"),
    };
    assert!(matches!(value(0), ExprKind::Cast { .. }));
    assert!(matches!(value(1), ExprKind::Binary { op: BinaryOp::Add, .. }));
    assert!(matches!(value(2), ExprKind::Cast { .. }));
}

#[test]
fn test_statement_forms() {
    let (stacks, _) = parse_ok(
        "class X { void f() {\n\
           for (int i = 0; i < 10; i++) { if (i % 2 == 0) continue; else break; }\n\
           for (String s : names) out: while (true) { break out; }\n\
           switch (k) { case 1: case 2: a(); break; default: b(); }\n\
           try (Reader r = open()) { r.read(); } catch (IOException | RuntimeException e) { } finally { }\n\
           do { x--; } while (x > 0);\n\
           synchronized (this) { assert x == 0 : \"nonzero\"; }\n\
           throw new IllegalStateException();\n\
         } }",
    );
    let body = method_body(only_type(&stacks), "f");
    let kinds: Vec<&str> = body
        .iter()
        .map(|s| match s.kind {
            StmtKind::For { .. } => "for",
            StmtKind::ForEach { .. } => "foreach",
            StmtKind::Switch { .. } => "switch",
            StmtKind::Try { .. } => "try",
            StmtKind::DoWhile { .. } => "do",
            StmtKind::Synchronized { .. } => "synchronized",
            StmtKind::Throw(_) => "throw",
            _ => "other",
        })
        .collect();
    assert_eq!(
        kinds,
        vec!["for", "foreach", "switch", "try", "do", "synchronized", "throw"]
    );
    assert!(stacks.block_starts.is_empty());
}

#[test]
fn test_explicit_constructor_invocation_rule() {
    let (_, hooks) = parse_ok("class X { X() { super(1); } X(int a) { this(); } }");
    let count = hooks
        .rules
        .iter()
        .filter(|r| **r == Rule::ExplicitConstructorInvocation)
        .count();
    assert_eq!(count, 2);
}

#[test]
fn test_annotation_member_value_rules() {
    let (stacks, hooks) = parse_ok("@A(x = 1, y = {2, 3}) @B class C {}");
    assert_eq!(
        hooks.rules,
        vec![
            Rule::EnterMemberValue,
            Rule::ExitMemberValue,
            Rule::EnterMemberValue,
            Rule::ExitMemberValue,
            Rule::NormalAnnotation,
            Rule::TypeHeader(TypeKind::Class),
            Rule::TypeDeclaration,
        ]
    );
    assert_eq!(only_type(&stacks).annotations.len(), 2);
}

#[test]
fn test_anonymous_class_rules() {
    let (_, hooks) = parse_ok("class X { Object o = new Object() { public String toString() { return \"\"; } }; }");
    assert_eq!(
        hooks.rules,
        vec![
            Rule::TypeHeader(TypeKind::Class),
            Rule::ForceNoDiet,
            Rule::EnterAnonymousClassBody,
            Rule::MethodHeader,
            Rule::MethodBody,
            Rule::RestoreDiet,
            Rule::TypeDeclaration,
        ]
    );
}

#[test]
fn test_diet_skips_bodies_but_not_field_initializers() {
    let source = "class X {\n\
                    void m() { this is not java }\n\
                    static { neither is this }\n\
                    Object f = new Object() { int g() { return 1; } };\n\
                  }";
    let (result, stacks, hooks) = run(source, Goal::CompilationUnit, true);
    assert_eq!(result, Ok(()));
    let decl = only_type(&stacks);
    assert!(matches!(&decl.members[0], Member::Method(m) if m.body.as_ref().is_some_and(Vec::is_empty)));
    assert!(hooks.rules.contains(&Rule::StaticInitializer));
    let Member::Field(field) = &decl.members[2] else {
        panic!("expected a field");
    };
    let Some(ast::Expr {
        kind: ExprKind::New { body: Some(members), .. },
        ..
    }) = &field.init
    else {
        panic!("expected an anonymous class");
    };
    assert!(matches!(&members[0], Member::Method(m) if m.body.as_ref().is_some_and(|b| b.len() == 1)));
}

#[test]
fn test_stall_leaves_open_containers() {
    let (result, stacks, _) = run("class X { void foo(int a, ", Goal::CompilationUnit, false);
    assert!(matches!(result, Err(Interrupt::Stall(ref e)) if e.found == TokenKind::Eof));
    assert_eq!(stacks.ast.len(), 3);
    assert!(matches!(&stacks.ast[0], AstNode::Type(t) if t.declaration_end.is_none()));
    assert!(matches!(&stacks.ast[1], AstNode::Method(m) if m.name.as_str() == "foo" && m.declaration_end.is_none()));
    assert!(matches!(&stacks.ast[2], AstNode::Parameter(p) if p.name.as_str() == "a"));
}

#[test]
fn test_stall_inside_nested_block_keeps_block_start() {
    let source = "class X { void m() { if (x) { int a = 1; foo(";
    let (result, stacks, _) = run(source, Goal::CompilationUnit, false);
    assert!(matches!(result, Err(Interrupt::Stall(_))));
    let open = u32::try_from(source.rfind('{').unwrap_or(0)).unwrap_or(0);
    assert_eq!(stacks.block_starts.len(), 1);
    assert_eq!(stacks.block_starts[0].offset, open);
    assert!(matches!(stacks.ast.last(), Some(AstNode::Local(l)) if l.declaration_end.is_some()));
}

#[test]
fn test_for_header_opens_fake_block() {
    let (result, stacks, _) = run("class X { void m() { for (int i = 0; i <", Goal::CompilationUnit, false);
    assert!(result.is_err());
    assert_eq!(stacks.block_starts.len(), 1);
    assert!(stacks.block_starts[0].fake);
}

#[test]
fn test_hook_claim_interrupts_parse() {
    let mut lexer = Lexer::new("class X { int y = fo; int z = 2; }");
    let mut stacks = NodeStacks::new();
    let mut hooks = Recorder {
        claim: Some("fo"),
        ..Recorder::default()
    };
    let result = Parser::new(&mut lexer, &mut stacks, &mut hooks).parse(Goal::CompilationUnit);
    assert_eq!(result, Err(Interrupt::Found { checkpoint: 42 }));
    assert!(!hooks.sites.iter().any(|s| s.contains(" z")));
}

#[test]
fn test_headers_goal_closes_types_and_marks_stray_braces() {
    let (result, stacks, hooks) = run("class A { void m() { x(); } } }", Goal::Headers, true);
    assert_eq!(result, Ok(()));
    assert_eq!(hooks.rules.last(), Some(&Rule::UnmatchedCloseBrace));
    assert_eq!(stacks.ast.len(), 2);
    assert!(matches!(&stacks.ast[0], AstNode::Type(t) if t.declaration_end.is_some() && t.members.len() == 1));
    assert!(matches!(stacks.ast[1], AstNode::CloseBrace(_)));
}

#[test]
fn test_headers_goal_enum_constants_and_constructors() {
    let (result, stacks, _) = run("A(1), B; X(int a) { } int f;", Goal::Headers, true);
    assert_eq!(result, Ok(()));
    let kinds: Vec<&str> = stacks
        .ast
        .iter()
        .map(|n| match n {
            AstNode::EnumConstant(_) => "constant",
            AstNode::Method(m) if m.is_constructor() => "constructor",
            AstNode::Field(_) => "field",
            _ => "other",
        })
        .collect();
    assert_eq!(kinds, vec!["constant", "constant", "constructor", "field"]);
}

#[test]
fn test_statements_or_catch_headers_goal() {
    let (result, stacks, _) = run(
        "} catch (Exception e) { log(e); } finally { }",
        Goal::BlockStatementsOrCatchHeader,
        false,
    );
    assert_eq!(result, Ok(()));
    assert!(matches!(stacks.ast[0], AstNode::CloseBrace(_)));
    assert!(matches!(&stacks.ast[1], AstNode::Local(l) if l.name.as_str() == "e"));
    assert!(matches!(&stacks.ast[2], AstNode::Statement(s) if matches!(s.kind, StmtKind::Block(_))));
    assert_eq!(stacks.ast.len(), 4);
}

#[test]
fn test_variable_initializer_goal() {
    let (result, stacks, _) = run("{1, 2, foo()}", Goal::VariableInitializer, false);
    assert_eq!(result, Ok(()));
    assert!(matches!(
        &stacks.ast[0],
        AstNode::Statement(s) if matches!(&s.kind, StmtKind::Expr(e) if matches!(&e.kind, ExprKind::ArrayInit(v) if v.len() == 3))
    ));
}

#[test]
fn test_module_declaration_sites() {
    let (_, hooks) = parse_ok(
        "import a.B;\n\
         open module com.example {\n\
           requires transitive java.sql;\n\
           exports com.example.api to other.mod;\n\
           uses com.example.Spi;\n\
           provides com.example.Spi with com.example.Impl;\n\
         }",
    );
    assert_eq!(
        hooks.sites,
        vec![
            "Import a.B",
            "ModuleName com.example",
            "RequiresModule java.sql",
            "ExportsPackage com.example.api",
            "TargetModule other.mod",
            "TypeReference com.example.Spi",
            "TypeReference com.example.Spi",
            "TypeReference com.example.Impl",
        ]
    );
}

mod proptests {
    use proptest::prelude::*;

    use super::run;
    use crate::{Goal, Interrupt};

    const FRAGMENTS: &[&str] = &[
        "class", "X", "{", "}", "(", ")", "void", "m", "int", "=", "1", ";", ",", "new", ".",
        "<", ">", "this", "if", "else", "return", "@A", "enum", "static", "[", "]", "\"s\"",
    ];

    proptest! {
        #[test]
        fn engine_never_panics(picks in proptest::collection::vec(0..FRAGMENTS.len(), 0..40)) {
            let source: Vec<&str> = picks.iter().map(|&i| FRAGMENTS[i]).collect();
            let source = source.join(" ");
            for goal in [Goal::CompilationUnit, Goal::Headers, Goal::BlockStatementsOrCatchHeader] {
                let (result, _, _) = run(&source, goal, false);
                prop_assert!(matches!(result, Ok(()) | Err(Interrupt::Stall(_))));
            }
        }
    }
}
