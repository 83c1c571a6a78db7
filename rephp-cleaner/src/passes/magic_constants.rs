//! `__DIR__` and `__FILE__` have no file to refer to in a REPL.

use rephp_parser::ast::{Expr, Literal, MagicConst, Name, NameOrExpr, Program, Spanned};

use super::{RewriteContext, RewritePass};
use crate::error::CleanError;
use crate::visit::{walk_block_mut, walk_expr_mut, VisitorMut};

/// Replaces `__DIR__` with `\getcwd()` and `__FILE__` with `''`.
pub struct MagicConstantsPass;

impl RewritePass for MagicConstantsPass {
    fn name(&self) -> &'static str {
        "magic_constants"
    }

    fn rewrite(&mut self, program: &mut Program, _cx: &mut RewriteContext<'_>) -> Result<(), CleanError> {
        walk_block_mut(&mut MagicConstants, &mut program.stmts);
        Ok(())
    }
}

struct MagicConstants;

impl VisitorMut for MagicConstants {
    fn visit_expr_mut(&mut self, expr: &mut Spanned<Expr>) {
        match expr.0 {
            Expr::MagicConst(MagicConst::Dir) => {
                expr.0 = Expr::FuncCall {
                    name: NameOrExpr::Name(Name::fully_qualified("getcwd")),
                    args: Vec::new(),
                };
            }
            Expr::MagicConst(MagicConst::File) => {
                expr.0 = Expr::Literal(Literal::String("''".to_string()));
            }
            _ => walk_expr_mut(self, expr),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::passes::test_support::rewrite;

    #[test]
    fn rewrites_file_constants() {
        assert_eq!(rewrite(&mut MagicConstantsPass, "__DIR__;"), "\\getcwd();");
        assert_eq!(rewrite(&mut MagicConstantsPass, "__FILE__;"), "'';");
        assert_eq!(
            rewrite(&mut MagicConstantsPass, "$a = [__DIR__ . '/x', fn() => __FILE__];"),
            "$a = [\\getcwd() . '/x', fn() => ''];"
        );
    }

    #[test]
    fn leaves_other_magic_constants() {
        assert_eq!(
            rewrite(&mut MagicConstantsPass, "echo __LINE__, __CLASS__;"),
            "echo __LINE__, __CLASS__;"
        );
    }
}
