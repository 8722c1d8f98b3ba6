// ============================================================================
// spark-components - Conditional Blocks
// `v-if` / `v-else-if` / `v-else` chains
// ============================================================================
//
// A chain is a `v-if` followed by any number of `v-else-if` and at most one
// `v-else`, with nothing but whitespace between the elements. The first branch
// whose condition holds renders; the rest of the chain is dropped. A
// `v-else-if` or `v-else` that does not continue a chain stands alone: the
// former is tested like a `v-if`, the latter always renders.
//
// `v-for` blocks are copied through untouched, even when the same tag also
// carries a condition; conditions inside a loop body are decided per item
// when the loop expands.
// ============================================================================

use super::blocks::find_block;
use super::evaluator::TemplateEvaluator;
use super::scope::Scope;
use crate::core::constants::{V_ELSE, V_ELSE_IF, V_FOR, V_IF};

/// Where the scan is relative to a chain
enum Chain {
    None,
    /// Inside a chain; true once a branch has rendered
    Open { taken: bool },
}

pub fn render_conditionals(evaluator: &TemplateEvaluator, template: &str, scope: &Scope) -> String {
    let mut out = String::with_capacity(template.len());
    let mut chain = Chain::None;
    let mut cursor = 0;

    while let Some(block) = find_block(template, cursor, &[V_FOR, V_IF, V_ELSE_IF, V_ELSE]) {
        let between = &template[cursor..block.start];
        let continues_chain = matches!(chain, Chain::Open { .. }) && between.trim().is_empty();
        let taken = matches!(chain, Chain::Open { taken: true });
        out.push_str(between);

        let render = |out: &mut String| {
            out.push_str(&block.render(&evaluator.evaluate(block.content, scope)));
        };
        let test = || evaluator.condition(block.value.unwrap_or_default(), scope);

        chain = match block.directive {
            V_IF => {
                let holds = test();
                if holds {
                    render(&mut out);
                }
                Chain::Open { taken: holds }
            }
            V_ELSE_IF if continues_chain && taken => Chain::Open { taken: true },
            V_ELSE_IF => {
                let holds = test();
                if holds {
                    render(&mut out);
                }
                Chain::Open { taken: holds }
            }
            V_ELSE => {
                if !(continues_chain && taken) {
                    render(&mut out);
                }
                Chain::None
            }
            _ => {
                out.push_str(&template[block.start..block.end]);
                Chain::None
            }
        };

        cursor = block.end;
    }

    out.push_str(&template[cursor..]);
    out
}
