//! Printing a reparsed program must reproduce the same text.

use rephp_parser::{format_program, parse};

fn print(source: &str) -> String {
    let result = parse(source);
    assert!(
        result.errors.is_empty(),
        "parse errors in {source:?}: {:?}",
        result.errors
    );
    format_program(&result.program)
}

fn assert_idempotent(source: &str) {
    let once = print(source);
    let twice = print(&format!("<?php {once}\n"));
    assert_eq!(once, twice, "printing is not idempotent for {source:?}");
}

#[test]
fn expressions() {
    for source in [
        "<?php 1 + 2 * 3 - 4 / 5 % 6;",
        "<?php $a = $b += $c ?? $d ?: $e;",
        "<?php $x = $a and $b or $c xor $d;",
        "<?php !$a instanceof Foo || -$b ** 2;",
        "<?php $a . $b . ($c + $d) << 2 >> 1;",
        "<?php $a ? ($b ? 1 : 2) : ($c ? 3 : 4);",
        "<?php (int) $a + (string) $b . (bool) ($c && $d);",
        "<?php @$a[0]->b?->c::$d::E::f(...$g, h: 1);",
        "<?php $$name = ${'dyn' . $x};",
        "<?php $a =& $b; $c = &$d;",
        "<?php [$a, [, $b], 'k' => $c] = $arr;",
        "<?php list('x' => $x, 'y' => list($y)) = $point;",
        "<?php clone $a->b; print $c; yield $d => $e; yield from gen();",
        "<?php $f = static fn&(int ...$n): int => array_sum($n);",
        "<?php $r = (function () { return 1; })();",
        "<?php $o = new class(1) extends Base { public $x = 1; };",
        "<?php $v = match (true) { $a > 1, $a < -1 => 'far', default => 'near' };",
        "<?php $s = <<<EOT\n  hello $name\n  EOT;",
        "<?php $t = $a ?? throw new \\RuntimeException('x');",
        "<?php $u = -(-$a) + +(+$b) - -(--$c);",
        "<?php isset($a['b'], $c->d) && empty($e) || exit(2);",
        "<?php require_once __DIR__ . '/file.php';",
        "<?php $out = `ls -l $dir` . trim(`whoami`);",
        "<?php $café = new Größe\\Ünit(\\日本\\f());",
    ] {
        assert_idempotent(source);
    }
}

#[test]
fn statements() {
    for source in [
        "<?php if ($a) echo 1; else if ($b) echo 2; else { echo 3; }",
        "<?php while ($i--) { continue 1; } do { break; } while (false);",
        "<?php for ($i = 0, $j = 1; $i < 10; $i++, $j++) ;",
        "<?php for (;;) { break; }",
        "<?php foreach ($a as $k => list($x, $y)) { }",
        "<?php switch ($a) { case 1; case 2: echo 1; break; default: }",
        "<?php global $a, $b; static $c = 1, $d; unset($a, $b[1]);",
        "<?php function &ref(array &$a, ?Foo $b = null, int|string $c = 1, A&B $d) { return $a; }",
        "<?php interface I extends A, B { public function f(): void; }",
        "<?php trait T { use U, V; private static $s; }",
        "<?php final class C extends P implements I { const A = 1, B = 2; public function __construct(protected readonly int $x) { parent::__construct(); } }",
        "<?php namespace Foo\\Bar; use A\\B, C as D; use function f\\g; use const H\\I;",
        "<?php namespace X { echo 1; } namespace { echo 2; }",
        "<?php const A = 1, B = A + 1;",
        "<?php try { f(); } catch (A|B $e) { } catch (C) { } finally { g(); }",
        "<?php declare(strict_types=1); declare(ticks=1) { tick(); }",
        "<?php goto end; echo 1; end: echo 2;",
        "<?php { ; }",
    ] {
        assert_idempotent(source);
    }
}

#[test]
fn output_has_no_open_tag_or_trailing_newline() {
    let printed = print("<?php echo 1;\n\n");
    assert_eq!(printed, "echo 1;");
}
