//! End-to-end tests for the Jack compiler: full source files in, exact VM
//! command text out.

use jack_compiler::compile_source;

fn compile(source: &str) -> String {
    compile_source(source).expect("compilation failed")
}

fn lines(text: &str) -> Vec<&str> {
    text.lines().collect()
}

#[test]
fn constant_function() {
    let vm = compile("class A { function int seven() { return 7; } }");
    assert_eq!(vm, "function A.seven.0 0\npush constant 7\nreturn\n");
}

#[test]
fn static_store_and_void_return() {
    let vm = compile(
        "class A { static int x; function void set() { let x = 3; return; } }",
    );
    assert_eq!(
        vm,
        "function A.set.0 0\n\
         push constant 3\n\
         pop static 0\n\
         push constant 0\n\
         return\n"
    );
}

#[test]
fn constructor_with_two_fields() {
    let vm = compile(
        "class P {
            field int x, y;
            constructor P new(int a, int b) {
                let x = a;
                let y = b;
                return this;
            }
        }",
    );
    assert_eq!(
        lines(&vm),
        [
            "function P.new.2 0",
            "push constant 2",
            "call Memory.alloc.1 1",
            "pop pointer 0",
            "push argument 0",
            "pop this 0",
            "push argument 1",
            "pop this 1",
            "push pointer 0",
            "return",
        ]
    );
}

#[test]
fn do_statement_with_expression_argument() {
    let vm = compile(
        "class Main { function void main() { do Output.printInt(1 + 2); return; } }",
    );
    assert_eq!(
        lines(&vm)[1..6],
        [
            "push constant 1",
            "push constant 2",
            "add",
            "call Output.printInt.1 1",
            "pop temp 0",
        ]
    );
}

#[test]
fn first_if_in_a_subroutine_uses_ordinal_zero() {
    let vm = compile(
        "class Main { function void foo() {
            var int x;
            if (x > 0) { let x = x - 1; } else { let x = 0; }
            return;
        } }",
    );
    assert_eq!(
        lines(&vm),
        [
            "function Main.foo.0 1",
            "push local 0",
            "push constant 0",
            "gt",
            "not",
            "if-goto Main.foo.0.IF.0_ELSE",
            "push local 0",
            "push constant 1",
            "sub",
            "pop local 0",
            "goto Main.foo.0.IF.0_END",
            "label Main.foo.0.IF.0_ELSE",
            "push constant 0",
            "pop local 0",
            "label Main.foo.0.IF.0_END",
            "push constant 0",
            "return",
        ]
    );
}

#[test]
fn subroutine_keys_embed_definition_time_argument_counts() {
    let vm = compile(
        "class Calc {
            field int acc;
            constructor Calc new() { let acc = 0; return this; }
            method int add(int n) { let acc = acc + n; return acc; }
            function int twice(int a, int b) { return a + b; }
        }",
    );
    assert!(vm.contains("function Calc.new.0 0"));
    // Methods count the receiver slot.
    assert!(vm.contains("function Calc.add.2 0"));
    assert!(vm.contains("function Calc.twice.2 0"));
}

#[test]
fn nested_control_flow_keeps_labels_in_one_namespace() {
    let vm = compile(
        "class Main { function void run(int n) {
            while (n > 0) {
                if (n > 10) { let n = n - 2; } else { let n = n - 1; }
            }
            return;
        } }",
    );
    let key = "Main.run.1";
    for label in [
        format!("label {key}.WHILE.0_BEGIN"),
        format!("if-goto {key}.WHILE.0_END"),
        format!("if-goto {key}.IF.0_ELSE"),
        format!("goto {key}.IF.0_END"),
        format!("goto {key}.WHILE.0_BEGIN"),
        format!("label {key}.WHILE.0_END"),
    ] {
        assert!(vm.contains(&label), "missing '{}' in:\n{}", label, vm);
    }
    // Every if-goto/goto target has a matching label command.
    for line in vm.lines() {
        if let Some(target) = line
            .strip_prefix("goto ")
            .or_else(|| line.strip_prefix("if-goto "))
        {
            assert!(
                vm.contains(&format!("label {}", target)),
                "dangling jump target {}",
                target
            );
        }
    }
}

#[test]
fn string_literals_build_character_by_character() {
    let vm = compile("class Main { function String hi() { return \"ok\"; } }");
    assert_eq!(
        lines(&vm)[1..8],
        [
            "push constant 2",
            "call String.new.1 1",
            "push constant 111",
            "call String.appendChar.2 2",
            "push constant 107",
            "call String.appendChar.2 2",
            "return",
        ]
    );
}

#[test]
fn empty_string_literal_only_allocates() {
    let vm = compile("class Main { function String nothing() { return \"\"; } }");
    assert_eq!(
        lines(&vm)[1..4],
        ["push constant 0", "call String.new.1 1", "return"]
    );
}

#[test]
fn array_stores_survive_array_reads_on_the_rhs() {
    let vm = compile(
        "class Main { function void f() {
            var Array a, b;
            let a[b[0]] = b[a[1]];
            return;
        } }",
    );
    // The rhs read sets pointer 1, then the stashed value is written
    // through a fresh pointer 1; temp 0 bridges the two.
    let text = vm.as_str();
    let stash = text.find("pop temp 0").expect("no stash");
    let restore = text.rfind("push temp 0").expect("no restore");
    let final_store = text.rfind("pop that 0").expect("no store");
    assert!(stash < restore && restore < final_store);
}

#[test]
fn calls_inside_expressions() {
    let vm = compile(
        "class Main {
            function int f(int a) { return Main.f(a - 1) + 1; }
        }",
    );
    assert_eq!(
        lines(&vm)[1..7],
        [
            "push argument 0",
            "push constant 1",
            "sub",
            "call Main.f.1 1",
            "push constant 1",
            "add",
        ]
    );
}

#[test]
fn method_chaining_through_variables() {
    let vm = compile(
        "class Game {
            field Board board;
            method void tick() {
                do board.update(1, 2, 3);
                return;
            }
        }",
    );
    assert!(vm.contains("push this 0"));
    assert!(vm.contains("call Board.update.4 4"));
}

#[test]
fn whole_class_compiles_to_stable_output() {
    let source = "
// A tiny counter.
class Counter {
    static int instances;
    field int value;

    constructor Counter new(int start) {
        let value = start;
        let instances = instances + 1;
        return this;
    }

    method int next() {
        let value = value + 1;
        return value;
    }

    function int population() {
        return instances;
    }
}
";
    let first = compile(source);
    let second = compile(source);
    assert_eq!(first, second);
    assert!(first.contains("function Counter.new.1 0"));
    assert!(first.contains("function Counter.next.1 0"));
    assert!(first.contains("function Counter.population.0 0"));
    assert!(first.contains("push static 0"));
    assert!(first.contains("pop this 0"));
}
