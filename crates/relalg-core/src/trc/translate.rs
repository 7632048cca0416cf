//! The TRC-to-RA translator (C5): the recursive `rec(Φ, base, negated)`
//! procedure of spec.md §4.1.3–§4.1.5.
//!
//! `rec` carries two pieces of state down the recursion: `base`, the RA
//! subtree the current formula restricts (the cross product of every
//! relation a quantifier has opened so far), and `negated`, whether an odd
//! number of enclosing negations sit above this node. The three De Morgan
//! rewrites (`and`/`or`/`implies` under negation) and the `forAll → ¬∃¬`
//! rewrite all funnel back through `rec` with a freshly built synthetic
//! formula and `negated` reset to `false` — a single negation pattern ends
//! up reaching each predicate/quantifier leaf, which is what lets the
//! predicate rule and the existential "gate" stay this small.

use crate::catalog::Catalog;
use crate::error::TranslateError;
use crate::options::TranslateOptions;
use crate::ra::{CodeRegion, RaKind, RaNode, SemiJoinSide, Warning};
use crate::value_expr::ValueExpr;

use super::ast::{AttrRef, CompareOp, Formula, LogicalOp, Quantifier, RightOperand, TrcExpr};
use super::env::ReferenceEnvironment;

/// Translates a closed TRC expression into a relational-algebra tree.
///
/// `ast.formula` is pre-passed once to build the [`ReferenceEnvironment`]
/// (spec.md §4.1.2), then `rec` runs over it with `base` seeded from the
/// outer tuple variable's bound relation and `negated = false`.
///
/// `opts` is accepted for parity with the SQL/RA-AST entry points (spec.md
/// §6.1's single `translate(ast, catalog)` shape, generalised to carry
/// shared configuration); the TRC translator itself does not consult it or
/// raise warnings (spec.md §6.4), so the returned `Vec<Warning>` is always
/// empty.
pub fn translate_trc(
    ast: &TrcExpr,
    catalog: &dyn Catalog,
    _opts: &TranslateOptions,
) -> Result<(RaNode, Vec<Warning>), TranslateError> {
    let env = ReferenceEnvironment::build(&ast.formula)?;
    let outer_var = ast.variable.as_str();
    let base_relation_name = env.require(outer_var, ast.code_region)?.to_string();

    let translator = Translator { catalog };
    let base = translator.relation_leaf(&base_relation_name, ast.code_region)?;
    let a = translator.rec(&ast.formula, &env, Some(&base), false, outer_var)?;

    let tree = if ast.projections.is_empty() {
        a
    } else {
        let columns = ast
            .projections
            .iter()
            .map(|p| ValueExpr::column(p.clone(), Some(base_relation_name.clone())))
            .collect();
        RaNode::new(RaKind::Projection {
            child: a.boxed(),
            columns,
        })
        .with_code_region(ast.code_region)
    };
    Ok((tree, Vec::new()))
}

struct Translator<'c> {
    catalog: &'c dyn Catalog,
}

impl<'c> Translator<'c> {
    fn relation_leaf(
        &self,
        name: &str,
        code_region: Option<CodeRegion>,
    ) -> Result<RaNode, TranslateError> {
        let relation = self
            .catalog
            .lookup(name)
            .ok_or_else(|| TranslateError::UnknownRelation {
                name: name.to_string(),
                code_region,
            })?;
        Ok(RaNode::new(RaKind::Relation { relation }).with_code_region(code_region))
    }

    fn rec(
        &self,
        formula: &Formula,
        env: &ReferenceEnvironment,
        base: Option<&RaNode>,
        negated: bool,
        outer_var: &str,
    ) -> Result<RaNode, TranslateError> {
        match formula {
            Formula::RelationPredicate {
                relation,
                code_region,
                ..
            } => {
                if negated {
                    return Err(TranslateError::NegatedRelationPredicate {
                        code_region: *code_region,
                    });
                }
                self.relation_leaf(relation, *code_region)
            }
            Formula::Negation { formula, .. } => self.rec(formula, env, base, !negated, outer_var),
            Formula::LogicalExpression {
                operator,
                left,
                right,
                code_region,
            } => self.rec_logical(*operator, left, right, *code_region, env, base, negated, outer_var),
            Formula::QuantifiedExpression {
                quantifier,
                variable,
                formula: inner,
                code_region,
            } => {
                let base = base.ok_or(TranslateError::NullBase {
                    code_region: *code_region,
                })?;
                self.rec_quantified(*quantifier, variable, inner, *code_region, env, base, negated, outer_var)
            }
            Formula::Predicate {
                left,
                operator,
                right,
                code_region,
            } => {
                let base = base.ok_or(TranslateError::NullBase {
                    code_region: *code_region,
                })?;
                self.rec_predicate(left, *operator, right, *code_region, env, base, negated, outer_var)
            }
        }
    }

    /// `and`/`or`/`implies` (spec.md §4.1.4).
    ///
    /// A `RelationPredicate` as the left operand of a conjunction
    /// contributes no operation of its own — it only recorded a binding
    /// during the pre-pass, and `base` is already restricted to that
    /// relation — so `rec(R(v) ∧ Ψ, base, negated)` short-circuits straight
    /// to `rec(Ψ, base, negated)`. This shortcut only holds for `∧`: under
    /// `∨` or `→`, `R(v)` is a genuine (trivially-true) disjunct/antecedent
    /// and cannot be dropped.
    fn rec_logical(
        &self,
        operator: LogicalOp,
        left: &Formula,
        right: &Formula,
        code_region: Option<CodeRegion>,
        env: &ReferenceEnvironment,
        base: Option<&RaNode>,
        negated: bool,
        outer_var: &str,
    ) -> Result<RaNode, TranslateError> {
        if operator == LogicalOp::And && matches!(left, Formula::RelationPredicate { .. }) {
            return self.rec(right, env, base, negated, outer_var);
        }

        match operator {
            LogicalOp::Implies => {
                let synthetic = if negated {
                    Formula::LogicalExpression {
                        operator: LogicalOp::And,
                        left: Box::new(left.clone()),
                        right: Box::new(Formula::Negation {
                            formula: Box::new(right.clone()),
                            code_region,
                        }),
                        code_region,
                    }
                } else {
                    Formula::LogicalExpression {
                        operator: LogicalOp::Or,
                        left: Box::new(Formula::Negation {
                            formula: Box::new(left.clone()),
                            code_region,
                        }),
                        right: Box::new(right.clone()),
                        code_region,
                    }
                };
                self.rec(&synthetic, env, base, false, outer_var)
            }
            LogicalOp::Or => {
                if negated {
                    let synthetic = Formula::LogicalExpression {
                        operator: LogicalOp::And,
                        left: Box::new(Formula::Negation {
                            formula: Box::new(left.clone()),
                            code_region,
                        }),
                        right: Box::new(Formula::Negation {
                            formula: Box::new(right.clone()),
                            code_region,
                        }),
                        code_region,
                    };
                    self.rec(&synthetic, env, base, false, outer_var)
                } else {
                    let l = self.rec(left, env, base, false, outer_var)?;
                    let r = self.rec(right, env, base, false, outer_var)?;
                    Ok(RaNode::new(RaKind::Union {
                        left: l.boxed(),
                        right: r.boxed(),
                    })
                    .with_code_region(code_region))
                }
            }
            LogicalOp::And => {
                if negated {
                    let synthetic = Formula::LogicalExpression {
                        operator: LogicalOp::Or,
                        left: Box::new(Formula::Negation {
                            formula: Box::new(left.clone()),
                            code_region,
                        }),
                        right: Box::new(Formula::Negation {
                            formula: Box::new(right.clone()),
                            code_region,
                        }),
                        code_region,
                    };
                    self.rec(&synthetic, env, base, false, outer_var)
                } else {
                    let l = self.rec(left, env, base, false, outer_var)?;
                    let r = self.rec(right, env, base, false, outer_var)?;
                    Ok(RaNode::new(RaKind::Intersect {
                        left: l.boxed(),
                        right: r.boxed(),
                    })
                    .with_code_region(code_region))
                }
            }
        }
    }

    /// `∀`/`∃` (spec.md §4.1.4). `∀v Φ` rewrites to `¬∃v ¬Φ`, XOR-ing
    /// `negated` with `true` and wrapping `Φ` in a fresh `Negation` so the
    /// rest of the recursion only ever has to deal with `∃`.
    #[allow(clippy::too_many_arguments)]
    fn rec_quantified(
        &self,
        quantifier: Quantifier,
        variable: &str,
        inner: &Formula,
        code_region: Option<CodeRegion>,
        env: &ReferenceEnvironment,
        base: &RaNode,
        negated: bool,
        outer_var: &str,
    ) -> Result<RaNode, TranslateError> {
        match quantifier {
            Quantifier::ForAll => {
                let negated_inner = Formula::Negation {
                    formula: Box::new(inner.clone()),
                    code_region,
                };
                self.rec_exists(variable, &negated_inner, code_region, env, base, !negated, outer_var)
            }
            Quantifier::Exists => {
                self.rec_exists(variable, inner, code_region, env, base, negated, outer_var)
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn rec_exists(
        &self,
        variable: &str,
        inner: &Formula,
        code_region: Option<CodeRegion>,
        env: &ReferenceEnvironment,
        base: &RaNode,
        negated: bool,
        outer_var: &str,
    ) -> Result<RaNode, TranslateError> {
        let bound_relation_name = env.require(variable, code_region)?.to_string();
        let opened = self.relation_leaf(&bound_relation_name, code_region)?;
        let cross = RaNode::new(RaKind::CrossJoin {
            left: opened.boxed(),
            right: Box::new(base.clone()),
        })
        .with_code_region(code_region);

        if inner.mentions_variable(outer_var) {
            // Case B: correlated. The semi-join/difference idiom restricts
            // the effect of the quantifier to tuples of `base` that are
            // actually involved, instead of touching the whole relation.
            let matches = self.rec(inner, env, Some(&cross), false, outer_var)?;
            let semi = RaNode::new(RaKind::SemiJoin {
                left: Box::new(base.clone()),
                right: matches.boxed(),
                preserve: SemiJoinSide::Left,
            });
            if !negated {
                Ok(semi.with_code_region(code_region))
            } else {
                Ok(RaNode::new(RaKind::Difference {
                    left: Box::new(base.clone()),
                    right: semi.boxed(),
                })
                .with_code_region(code_region))
            }
        } else {
            // Case A: uncorrelated. `∃v Φ` does not depend on the outer
            // tuple at all, so its truth value is a single yes/no gate that
            // either keeps or empties `base` — deciding which requires
            // evaluating the subformula's cardinality at translation time.
            let matches = self.rec(inner, env, Some(&cross), false, outer_var)?;
            matches.check()?;
            let cardinality = crate::eval::cardinality(&matches)?;
            let zero = RaNode::new(RaKind::Difference {
                left: Box::new(base.clone()),
                right: Box::new(base.clone()),
            });
            let all = RaNode::new(RaKind::Union {
                left: Box::new(base.clone()),
                right: Box::new(RaNode::new(RaKind::SemiJoin {
                    left: Box::new(base.clone()),
                    right: matches.boxed(),
                    preserve: SemiJoinSide::Left,
                })),
            });
            if (cardinality > 0) != negated {
                Ok(all.with_code_region(code_region))
            } else {
                Ok(zero.with_code_region(code_region))
            }
        }
    }

    /// Comparison predicate (spec.md §4.1.5).
    ///
    /// `!=` is normalised to `not (lhs = rhs)` and re-entered through
    /// `rec` so only `Eq`/`Lt`/`Gt`/`Le`/`Ge` ever reach the code below.
    ///
    /// `negated=false` emits a direct `Selection`. `negated=true` builds
    /// the two-step semi-join idiom: `sel` is the positive selection,
    /// `t1` restricts it back down to the tuples of `E[t*]` it actually
    /// came from, and `j2` restricts `base` to the tuples that are part of
    /// some `t1` row — so the final `Difference(base, j2)` only removes
    /// tuples of `base` actually matched by the (non-negated) predicate,
    /// never tuples of an unrelated variable introduced by an enclosing
    /// cross join. When `p` mentions no column of `t*`, `j2` and `sel`
    /// coincide and the simpler `Difference(base, sel)` is used directly.
    #[allow(clippy::too_many_arguments)]
    fn rec_predicate(
        &self,
        left: &AttrRef,
        operator: CompareOp,
        right: &RightOperand,
        code_region: Option<CodeRegion>,
        env: &ReferenceEnvironment,
        base: &RaNode,
        negated: bool,
        outer_var: &str,
    ) -> Result<RaNode, TranslateError> {
        if operator == CompareOp::NotEq {
            let synthetic = Formula::Negation {
                formula: Box::new(Formula::Predicate {
                    left: left.clone(),
                    operator: CompareOp::Eq,
                    right: right.clone(),
                    code_region,
                }),
                code_region,
            };
            return self.rec(&synthetic, env, Some(base), negated, outer_var);
        }

        let positive = convert_predicate(env, left, operator, right, code_region)?;

        if !negated {
            return Ok(RaNode::new(RaKind::Selection {
                child: Box::new(base.clone()),
                predicate: positive,
            })
            .with_code_region(code_region));
        }

        let sel = RaNode::new(RaKind::Selection {
            child: Box::new(base.clone()),
            predicate: positive,
        });
        let references_outer = left.variable == outer_var
            || matches!(right, RightOperand::Attr(a) if a.variable == outer_var);

        if !references_outer {
            return Ok(RaNode::new(RaKind::Difference {
                left: Box::new(base.clone()),
                right: sel.boxed(),
            })
            .with_code_region(code_region));
        }

        let t_star_name = env.require(outer_var, code_region)?;
        let t_star_leaf = self.relation_leaf(t_star_name, code_region)?;
        let t1 = RaNode::new(RaKind::SemiJoin {
            left: t_star_leaf.boxed(),
            right: sel.boxed(),
            preserve: SemiJoinSide::Left,
        });
        let j2 = RaNode::new(RaKind::SemiJoin {
            left: Box::new(base.clone()),
            right: t1.boxed(),
            preserve: SemiJoinSide::Left,
        });
        Ok(RaNode::new(RaKind::Difference {
            left: Box::new(base.clone()),
            right: j2.boxed(),
        })
        .with_code_region(code_region))
    }
}

fn convert_predicate(
    env: &ReferenceEnvironment,
    left: &AttrRef,
    operator: CompareOp,
    right: &RightOperand,
    code_region: Option<CodeRegion>,
) -> Result<ValueExpr, TranslateError> {
    let left_alias = env.require(&left.variable, code_region)?.to_string();
    let left_expr = ValueExpr::column(left.attribute.clone(), Some(left_alias));
    let right_expr = match right {
        RightOperand::Attr(attr) => {
            let alias = env.require(&attr.variable, code_region)?.to_string();
            ValueExpr::column(attr.attribute.clone(), Some(alias))
        }
        RightOperand::Literal { data_type, value } => ValueExpr::Constant {
            data_type: *data_type,
            value: value.clone(),
        },
    };
    Ok(ValueExpr::boolean_op(operator.as_str(), vec![left_expr, right_expr]))
}
