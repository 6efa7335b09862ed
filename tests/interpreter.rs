mod common;

#[cfg(test)]
mod interpreter_tests {
    use rox as lox;

    use lox::error::RoxError;
    use lox::session::Mode;

    use crate::common::{run, run_ok, runtime_error, session_with_input};

    // ───────────────────────────── arithmetic ─────────────────────────────

    #[test]
    fn test_precedence() {
        let out = run_ok("println(1 + 2 * 3);\nprintln((1 + 2) * 3);");

        assert_eq!(out, "7\n9\n");
    }

    #[test]
    fn test_string_concatenation_coerces() {
        let out = run_ok("println(\"a\" + 1);\nprintln(2 + \"b\");\nprintln(\"x\" + nil);");

        assert_eq!(out, "a1\n2b\nxnil\n");
    }

    #[test]
    fn test_number_formatting() {
        let out = run_ok("println(7 % 3);\nprintln(2.5);\nprintln(-2);\nprintln(10 / 4);");

        assert_eq!(out, "1\n2.5\n-2\n2.5\n");
    }

    #[test]
    fn test_division_by_zero() {
        assert_eq!(
            runtime_error("println(10 / 0);"),
            ("Division by zero.".to_string(), 1)
        );
    }

    #[test]
    fn test_modulo_by_zero() {
        assert_eq!(
            runtime_error("\nprintln(10 % 0);"),
            ("Modulo by zero.".to_string(), 2)
        );
    }

    #[test]
    fn test_arithmetic_type_error_names_operator() {
        assert_eq!(
            runtime_error("1 - \"a\";").0,
            "Operands of '-' must be numbers."
        );
        assert_eq!(
            runtime_error("true < 1;").0,
            "Operands of '<' must be numbers."
        );
        assert_eq!(
            runtime_error("nil + 1;").0,
            "Operands must be two numbers or at least one string."
        );
        assert_eq!(runtime_error("-\"a\";").0, "Operand must be a number.");
    }

    // ──────────────────────── truthiness and logic ─────────────────────────

    #[test]
    fn test_truthiness() {
        let out = run_ok(
            "println(0 ? \"t\" : \"f\");\nprintln(\"\" ? \"t\" : \"f\");\nprintln(nil ? \"t\" : \"f\");\nprintln(false ? \"t\" : \"f\");",
        );

        assert_eq!(out, "t\nt\nf\nf\n");
    }

    #[test]
    fn test_logical_operators_return_operands() {
        let out = run_ok("println(nil or \"x\");\nprintln(1 and 2);\nprintln(false and undefined);");

        assert_eq!(out, "x\n2\nfalse\n");
    }

    #[test]
    fn test_equality() {
        let out = run_ok(
            "println(nil == nil);\nprintln(nil == false);\nprintln(1 == 1);\nprintln(\"a\" != \"a\");\nprintln([1] == [1]);\nvar l = [];\nprintln(l == l);",
        );

        assert_eq!(out, "true\nfalse\ntrue\nfalse\nfalse\ntrue\n");
    }

    #[test]
    fn test_ternary_and_comma() {
        let out = run_ok("println(false ? 1 : true ? 2 : 3);\nvar x = (1, 2);\nprintln(x);");

        assert_eq!(out, "2\n2\n");
    }

    // ───────────────────────────── variables ─────────────────────────────

    #[test]
    fn test_undefined_variable() {
        assert_eq!(
            runtime_error("println(nope);"),
            ("Undefined variable 'nope'.".to_string(), 1)
        );
        assert_eq!(
            runtime_error("nope = 1;").0,
            "Undefined variable 'nope'."
        );
    }

    #[test]
    fn test_shadowing_is_resolved_statically() {
        let out = run_ok(
            r#"
var a = "global";
{
  fun show() { println(a); }
  show();
  var a = "block";
  show();
  println(a);
}
"#,
        );

        assert_eq!(out, "global\nglobal\nblock\n");
    }

    #[test]
    fn test_increment_and_decrement() {
        let out = run_ok(
            "var i = 1;\nprintln(i++);\nprintln(i);\nprintln(++i);\nprintln(--i);\nprintln(i--);\nprintln(i);",
        );

        assert_eq!(out, "1\n2\n3\n2\n2\n1\n");
    }

    #[test]
    fn test_increment_on_property_and_local() {
        let out = run_ok(
            "class C {}\nvar c = C();\nc.n = 5;\nprintln(c.n++);\nprintln(++c.n);\n{ var j = 0; j++; println(j); }",
        );

        assert_eq!(out, "5\n7\n1\n");
    }

    #[test]
    fn test_increment_requires_number() {
        assert_eq!(
            runtime_error("var s = \"a\";\ns++;"),
            ("Operand of '++' must be a number.".to_string(), 2)
        );
    }

    // ───────────────────────────── control flow ────────────────────────────

    #[test]
    fn test_for_continue_still_runs_increment() {
        let out = run_ok(
            r#"
var s = 0;
for (var i = 0; i < 5; i++) {
  if (i == 2) continue;
  if (i == 4) break;
  s = s + i;
}
println(s);
"#,
        );

        assert_eq!(out, "4\n");
    }

    #[test]
    fn test_while_continue() {
        let out = run_ok(
            r#"
var i = 0;
var out = "";
while (i < 5) {
  i++;
  if (i % 2 == 0) continue;
  out = out + i;
}
println(out);
"#,
        );

        assert_eq!(out, "135\n");
    }

    #[test]
    fn test_break_leaves_only_innermost_loop() {
        let out = run_ok(
            r#"
for (var i = 0; i < 3; i++) {
  while (true) {
    break;
  }
  print(i);
}
println("");
"#,
        );

        assert_eq!(out, "012\n");
    }

    #[test]
    fn test_return_from_inside_loop() {
        let out = run_ok(
            "fun f() {\n  while (true) {\n    for (;;) { return \"done\"; }\n  }\n}\nprintln(f());",
        );

        assert_eq!(out, "done\n");
    }

    #[test]
    fn test_runtime_error_abandons_remaining_statements() {
        let (out, result) = run("println(1);\nprintln(1 / 0);\nprintln(2);");

        assert_eq!(out, "1\n");
        assert!(matches!(result, Err(RoxError::Runtime { line: 2, .. })));
    }

    // ───────────────────────── functions and closures ───────────────────────

    #[test]
    fn test_recursion() {
        let out = run_ok(
            "fun fib(n) { if (n < 2) return n; return fib(n - 1) + fib(n - 2); }\nprintln(fib(10));",
        );

        assert_eq!(out, "55\n");
    }

    #[test]
    fn test_function_without_return_yields_nil() {
        assert_eq!(run_ok("fun f() {}\nprintln(f());"), "nil\n");
    }

    #[test]
    fn test_shared_outer_mutation_across_calls() {
        let out = run_ok("var x = 0; { fun f() { x = x + 1; return x; } print(f()); print(f()); }");

        assert_eq!(out, "12");
    }

    #[test]
    fn test_counter_closure() {
        let out = run_ok(
            r#"
fun makeCounter() {
  var count = 0;
  fun next() {
    count++;
    return count;
  }
  return next;
}
var a = makeCounter();
var b = makeCounter();
a();
println(a());
println(b());
"#,
        );

        assert_eq!(out, "2\n1\n");
    }

    #[test]
    fn test_closures_share_loop_frame() {
        let out = run_ok(
            r#"
var fns = [];
for (var i = 0; i < 3; i++) {
  fns.add(fun () { return i; });
}
println(fns.get(0)());
println(fns.get(2)());
"#,
        );

        assert_eq!(out, "3\n3\n");
    }

    #[test]
    fn test_closures_capture_fresh_frame_per_iteration() {
        let out = run_ok(
            r#"
var fns = [];
for (var i = 0; i < 3; i++) {
  var j = i;
  fns.add(fun () { return j; });
}
println(fns.get(0)());
println(fns.get(2)());
"#,
        );

        assert_eq!(out, "0\n2\n");
    }

    #[test]
    fn test_arity_mismatch() {
        assert_eq!(
            runtime_error("fun f(a) {}\nf(1, 2);"),
            ("Expected 1 arguments but got 2.".to_string(), 2)
        );
    }

    #[test]
    fn test_calling_non_callable() {
        assert_eq!(
            runtime_error("\"x\"();").0,
            "Can only call functions and classes."
        );
    }

    // ──────────────────────────────── classes ──────────────────────────────

    #[test]
    fn test_initializer_and_fields() {
        let out = run_ok(
            r#"
class Point {
  Point(x, y) {
    this.x = x;
    this.y = y;
  }
  sum() { return this.x + this.y; }
}
var p = Point(1, 2);
println(p.sum());
println(p);
println(Point);
"#,
        );

        assert_eq!(out, "3\n<Point instance>\n<class Point>\n");
    }

    #[test]
    fn test_initializer_always_returns_instance() {
        let out = run_ok(
            "class P { P(x) { this.x = x; return; } }\nvar p = P(3);\nprintln(p.x);\nprintln(p.P(4) == p);\nprintln(p.x);",
        );

        assert_eq!(out, "3\ntrue\n4\n");
    }

    #[test]
    fn test_initializer_is_inherited() {
        let out = run_ok("class A { A(v) { this.v = v; } }\nclass B < A {}\nprintln(B(5).v);");

        assert_eq!(out, "5\n");
    }

    #[test]
    fn test_class_arity_comes_from_initializer() {
        assert_eq!(
            runtime_error("class A {}\nA(1);").0,
            "Expected 0 arguments but got 1."
        );
    }

    #[test]
    fn test_fields_shadow_methods() {
        let out = run_ok(
            "class A { m() { return \"method\"; } }\nvar a = A();\na.m = fun () { return \"field\"; };\nprintln(a.m());",
        );

        assert_eq!(out, "field\n");
    }

    #[test]
    fn test_bound_method_keeps_receiver() {
        let out = run_ok(
            "class A { A(n) { this.n = n; } get() { return this.n; } }\nvar m = A(\"kept\").get;\nprintln(m());",
        );

        assert_eq!(out, "kept\n");
    }

    #[test]
    fn test_super_dispatches_to_superclass_implementation() {
        let out = run_ok(
            r#"
class A {
  method() { return "A"; }
  describe() { return this.method(); }
}
class B < A {
  method() { return "B"; }
  test() { return super.method(); }
}
class C < B {}
println(C().test());
println(B().describe());
"#,
        );

        assert_eq!(out, "A\nB\n");
    }

    #[test]
    fn test_super_binds_current_instance() {
        let out = run_ok(
            r#"
class A { name() { return this.n; } }
class B < A {
  B(n) { this.n = n; }
  name() { return "B:" + super.name(); }
}
println(B("x").name());
"#,
        );

        assert_eq!(out, "B:x\n");
    }

    #[test]
    fn test_getters() {
        let out = run_ok(
            r#"
class Circle {
  Circle(r) { this.r = r; }
  area { return 3 * this.r * this.r; }
}
class Ring < Circle {
  area { return super.area - 1; }
}
println(Circle(2).area);
println(Ring(2).area);
"#,
        );

        assert_eq!(out, "12\n11\n");
    }

    #[test]
    fn test_static_methods() {
        let out = run_ok(
            r#"
class Math {
  static square(n) { return n * n; }
  static version { return 2; }
}
class K {
  static make() { return this(); }
}
println(Math.square(3));
println(Math.version);
println(K.make());
"#,
        );

        assert_eq!(out, "9\n2\n<K instance>\n");
    }

    #[test]
    fn test_statics_are_not_inherited_or_visible_on_instances() {
        assert_eq!(
            runtime_error("class M { static s() {} }\nclass S < M {}\nS.s();"),
            ("Undefined property 's'.".to_string(), 3)
        );
        assert_eq!(
            runtime_error("class M { static s() {} }\nM().s();").0,
            "Undefined property 's'."
        );
    }

    #[test]
    fn test_property_errors() {
        assert_eq!(
            runtime_error("class A {}\nA.x = 1;").0,
            "Can't set properties on a class."
        );
        assert_eq!(
            runtime_error("var n = 1;\nn.x;").0,
            "Only instances have properties."
        );
        assert_eq!(
            runtime_error("var n = 1;\nn.x = 1;").0,
            "Only instances have fields."
        );
        assert_eq!(
            runtime_error("class A {}\nA().missing;").0,
            "Undefined property 'missing'."
        );
    }

    #[test]
    fn test_superclass_must_be_class() {
        assert_eq!(
            runtime_error("var NotAClass = 1;\nclass B < NotAClass {}"),
            ("Superclass must be a class.".to_string(), 2)
        );
    }

    #[test]
    fn test_class_may_refer_to_itself() {
        let out = run_ok(
            "class Node { Node(next) { this.next = next; } grow() { return Node(this); } }\nprintln(Node(nil).grow().next.next);",
        );

        assert_eq!(out, "nil\n");
    }

    // ──────────────────────────────── lists ────────────────────────────────

    #[test]
    fn test_list_methods() {
        let out = run_ok(
            r#"
var xs = [1, 2];
println(xs.add(3));
println(xs.size());
println(xs.get(2));
println(xs.remove(0));
println(xs);
println([]);
"#,
        );

        assert_eq!(out, "3\n3\n3\n1\n[2, 3]\n[]\n");
    }

    #[test]
    fn test_detached_list_method_stays_bound() {
        let out = run_ok("var xs = [];\nvar add = xs.add;\nadd(\"a\");\nprintln(xs);");

        assert_eq!(out, "[a]\n");
    }

    #[test]
    fn test_cyclic_lists_print_as_ellipsis() {
        let out = run_ok(
            r#"
var a = [1];
a.add(a);
println(a);
var b = [a];
var c = [b, b];
a.add(c);
println(c);
"#,
        );

        assert_eq!(out, "[1, [...]]\n[[[1, [...], [...]]], [[1, [...], [...]]]]\n");
    }

    #[test]
    fn test_list_index_errors() {
        assert_eq!(
            runtime_error("[1].get(5);"),
            ("List index 5 out of range for size 1.".to_string(), 1)
        );
        assert_eq!(
            runtime_error("[1].get(0.5);").0,
            "List index must be an integer."
        );
        assert_eq!(
            runtime_error("[1].remove(\"0\");").0,
            "List index must be a number, got string."
        );
        assert_eq!(
            runtime_error("var xs = [];\nxs.size = 1;").0,
            "Can't set properties on a list."
        );
    }

    // ─────────────────────────── natives and output ─────────────────────────

    #[test]
    fn test_value_printing() {
        let out = run_ok(
            "fun foo() {}\nprintln(foo);\nprintln(fun () {});\nprintln(clock);\nprintln(true);\nprintln(nil);",
        );

        assert_eq!(out, "<fn foo>\n<fn lambda>\n<native fn clock>\ntrue\nnil\n");
    }

    #[test]
    fn test_print_has_no_newline() {
        assert_eq!(run_ok("print(1); print(2); println(3);"), "123\n");
    }

    #[test]
    fn test_clock_is_a_number() {
        assert_eq!(run_ok("println(clock() > 0);"), "true\n");
    }

    #[test]
    fn test_input_reads_lines() {
        let (mut session, out) = session_with_input("hello\n");

        let result = session.run(
            "var line = input();\nprintln(\"got \" + line);\nprintln(input());",
            Mode::Script,
        );

        assert!(result.is_ok());
        assert_eq!(out.contents(), "got hello\nnil\n");
    }
}
